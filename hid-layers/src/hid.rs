//! Traits and types for raw HID reading and writing.

use core::future::Future;

use embassy_usb::class::hid::ReadError;
use embassy_usb::driver::EndpointError;
use hid_layers_types::protocol::RawReport;

#[derive(PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HidError {
    UsbReadError(ReadError),
    UsbEndpointError(EndpointError),
}

/// Write reports to the host, via USB, BLE, etc.
pub trait HidWriterTrait {
    /// The report type
    type ReportType;

    /// Write report to the host, return the number of bytes written if success.
    fn write_report(&mut self, report: Self::ReportType) -> impl Future<Output = Result<usize, HidError>>;
}

/// Read reports from the host, via USB, BLE, etc.
pub trait HidReaderTrait {
    /// The report type
    type ReportType;

    /// Read a report from the host, waits until one arrives
    fn read_report(&mut self) -> impl Future<Output = Result<Self::ReportType, HidError>>;
}

/// Fire-and-forget transmission of an unsolicited raw HID report.
///
/// It's called from synchronous hooks, so it must never block. Reports which can't be queued are dropped.
pub trait RawHidSender {
    fn send_raw(&self, report: &RawReport);
}

impl<T: RawHidSender + ?Sized> RawHidSender for &T {
    fn send_raw(&self, report: &RawReport) {
        (**self).send_raw(report)
    }
}
