//! Channels shared between the hid-layers hooks and the raw HID writer

use embassy_sync::blocking_mutex::raw::RawMutex as RawMutexTrait;
pub use embassy_sync::channel;
use embassy_sync::channel::Channel;
use hid_layers_types::protocol::RawReport;

use crate::RawMutex;
use crate::hid::RawHidSender;

/// Unsolicited reports waiting to be written
pub const HID_LAYERS_CHANNEL_SIZE: usize = 4;

/// Channel for unsolicited layer state reports, from the layer hooks to the raw HID writer
pub static HID_LAYERS_REPORT_CHANNEL: Channel<RawMutex, RawReport, HID_LAYERS_CHANNEL_SIZE> = Channel::new();

impl<M: RawMutexTrait, const N: usize> RawHidSender for Channel<M, RawReport, N> {
    fn send_raw(&self, report: &RawReport) {
        if self.try_send(*report).is_err() {
            warn!("Raw HID report channel is full, report dropped");
        }
    }
}
