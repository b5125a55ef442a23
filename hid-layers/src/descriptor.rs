use usbd_hid::descriptor::generator_prelude::*;

/// Raw HID report, shared with Via/Vial.
///
/// The top level usage must stay `RAW_HID_USAGE_PAGE`/`RAW_HID_USAGE`, host tools find the
/// interface by it. Both directions carry one `RawReport`.
#[gen_hid_descriptor(
    (collection = APPLICATION, usage_page = 0xFF60, usage = 0x61) = {
        (usage = 0x62, logical_min = 0x0) = {
            #[item_settings(data,variable,absolute)] input_data=input;
        };
        (usage = 0x63, logical_min = 0x0) = {
            #[item_settings(data,variable,absolute)] output_data=output;
        };
    }
)]
pub struct RawHidReport {
    pub input_data: [u8; 32],
    pub output_data: [u8; 32],
}
