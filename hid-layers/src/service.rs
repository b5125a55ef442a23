use core::cell::RefCell;

use embassy_futures::select::{Either, select};
use embassy_sync::channel::Channel;
use embassy_time::Timer;
use hid_layers_types::protocol::RawReport;

use crate::RawMutex;
use crate::hid::{HidError, HidReaderTrait, HidWriterTrait, RawHidSender};
use crate::keymap::LayerHost;
use crate::layer_report::HidLayers;

/// First byte of the response to a command which nobody handled, same as Via's `id_unhandled`
const VIA_UNHANDLED: u8 = 0xFF;

/// Serves the raw HID interface: answers host frames and forwards unsolicited layer reports.
pub struct HidLayersService<
    'a,
    RW: HidWriterTrait<ReportType = RawReport> + HidReaderTrait<ReportType = RawReport>,
    H: LayerHost,
    S: RawHidSender,
    const N: usize,
> {
    hid_layers: &'a HidLayers<S>,
    // The service borrows the layer engine only while it processes a frame
    host: &'a RefCell<H>,
    // Unsolicited reports, filled by the hid-layers hooks
    outbox: &'a Channel<RawMutex, RawReport, N>,
    pub(crate) reader_writer: RW,
}

impl<
    'a,
    RW: HidWriterTrait<ReportType = RawReport> + HidReaderTrait<ReportType = RawReport>,
    H: LayerHost,
    S: RawHidSender,
    const N: usize,
> HidLayersService<'a, RW, H, S, N>
{
    pub fn new(
        hid_layers: &'a HidLayers<S>,
        host: &'a RefCell<H>,
        outbox: &'a Channel<RawMutex, RawReport, N>,
        reader_writer: RW,
    ) -> Self {
        Self {
            hid_layers,
            host,
            outbox,
            reader_writer,
        }
    }

    pub async fn run(&mut self) {
        loop {
            if let Err(e) = self.process().await {
                error!("Process raw HID error: {:?}", e);
                Timer::after_millis(1000).await;
            }
        }
    }

    /// Wait for either a frame from the host or an unsolicited report, and write the answer
    pub async fn process(&mut self) -> Result<(), HidError> {
        match select(self.reader_writer.read_report(), self.outbox.receive()).await {
            Either::First(report) => {
                let mut report = report?;
                self.process_raw_report(&mut report);
                // Send the report back after processing, the response is written in place
                self.reader_writer.write_report(report).await?;
            }
            Either::Second(report) => {
                self.reader_writer.write_report(report).await?;
            }
        }
        Ok(())
    }

    fn process_raw_report(&self, report: &mut RawReport) {
        let mut host = self.host.borrow_mut();
        if !self.hid_layers.process_report(report, &mut *host) {
            info!("Unknown cmd: {:?}", report);
            report[0] = VIA_UNHANDLED;
        }
    }
}

pub async fn run_hid_layers_task<
    'a,
    RW: HidWriterTrait<ReportType = RawReport> + HidReaderTrait<ReportType = RawReport>,
    H: LayerHost,
    S: RawHidSender,
    const N: usize,
>(
    hid_layers: &'a HidLayers<S>,
    host: &'a RefCell<H>,
    outbox: &'a Channel<RawMutex, RawReport, N>,
    reader_writer: RW,
) {
    let mut service = HidLayersService::new(hid_layers, host, outbox, reader_writer);
    service.run().await
}
