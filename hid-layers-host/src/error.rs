use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HostError {
    #[error("USB error: {0}")]
    Usb(#[from] nusb::Error),

    #[error("USB transfer failed: {0}")]
    Transfer(#[from] nusb::transfer::TransferError),

    #[error("no raw HID interface found")]
    NoDevice,

    #[error("interface {interface} has no interrupt {direction} endpoint")]
    NoEndpoint { interface: u8, direction: &'static str },

    #[error("interface {interface} is not a raw HID interface (usage page {usage_page:#06x}, usage {usage:#04x})")]
    NotRawHid { interface: u8, usage_page: u16, usage: u16 },

    #[error("unreadable HID report descriptor")]
    BadDescriptor,

    #[error("no response within {0:?}")]
    Timeout(Duration),

    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),
}

pub type Result<T> = std::result::Result<T, HostError>;
