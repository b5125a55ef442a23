use embassy_usb::Builder;
use embassy_usb::class::hid::{Config, HidBootProtocol, HidReaderWriter, HidSubclass, ReportId, RequestHandler, State};
use embassy_usb::control::OutResponse;
use embassy_usb::driver::Driver;
use hid_layers_types::protocol::{RAW_HID_REPORT_SIZE, RawReport};
use static_cell::StaticCell;
use usbd_hid::descriptor::SerializedDescriptor;

use crate::descriptor::RawHidReport;
use crate::hid::{HidError, HidReaderTrait, HidWriterTrait};

/// Add the raw HID interface to the USB device.
///
/// It should be called only once, otherwise the static state panics on the second `init()`.
pub fn add_raw_hid_reader_writer<D: Driver<'static>>(
    builder: &mut Builder<'static, D>,
) -> HidReaderWriter<'static, D, RAW_HID_REPORT_SIZE, RAW_HID_REPORT_SIZE> {
    static RAW_HID_STATE: StaticCell<State<'static>> = StaticCell::new();
    static RAW_HID_HANDLER: StaticCell<UsbRequestHandler> = StaticCell::new();

    let state = RAW_HID_STATE.init(State::new());
    let request_handler = RAW_HID_HANDLER.init(UsbRequestHandler {});

    let hid_config = Config {
        report_descriptor: RawHidReport::desc(),
        request_handler: Some(request_handler),
        poll_ms: 1,
        max_packet_size: 64,
        hid_subclass: HidSubclass::No,
        hid_boot_protocol: HidBootProtocol::None,
    };

    HidReaderWriter::new(builder, state, hid_config)
}

pub(crate) struct UsbRequestHandler {}

impl RequestHandler for UsbRequestHandler {
    fn set_report(&mut self, id: ReportId, data: &[u8]) -> OutResponse {
        info!("Set report for {:?}: {:?}", id, data);
        OutResponse::Accepted
    }
}

pub struct UsbRawHidReaderWriter<'a, 'd, D: Driver<'d>> {
    pub(crate) reader_writer: &'a mut HidReaderWriter<'d, D, RAW_HID_REPORT_SIZE, RAW_HID_REPORT_SIZE>,
}

impl<'a, 'd, D: Driver<'d>> UsbRawHidReaderWriter<'a, 'd, D> {
    pub fn new(reader_writer: &'a mut HidReaderWriter<'d, D, RAW_HID_REPORT_SIZE, RAW_HID_REPORT_SIZE>) -> Self {
        Self { reader_writer }
    }
}

impl<'d, D: Driver<'d>> HidWriterTrait for UsbRawHidReaderWriter<'_, 'd, D> {
    type ReportType = RawReport;

    async fn write_report(&mut self, report: Self::ReportType) -> Result<usize, HidError> {
        self.reader_writer
            .write(&report)
            .await
            .map_err(HidError::UsbEndpointError)?;
        Ok(RAW_HID_REPORT_SIZE)
    }
}

impl<'d, D: Driver<'d>> HidReaderTrait for UsbRawHidReaderWriter<'_, 'd, D> {
    type ReportType = RawReport;

    async fn read_report(&mut self) -> Result<Self::ReportType, HidError> {
        // Short frames are zero padded
        let mut report = [0u8; RAW_HID_REPORT_SIZE];
        let n = self
            .reader_writer
            .read(&mut report)
            .await
            .map_err(HidError::UsbReadError)?;
        trace!("Read {} bytes of raw HID report", n);
        Ok(report)
    }
}
