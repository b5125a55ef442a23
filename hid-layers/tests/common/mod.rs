#![allow(dead_code)]

use core::cell::RefCell;

use hid_layers::hid::RawHidSender;
use hid_layers::types::protocol::{RAW_HID_REPORT_SIZE, RawReport};

// Init logger for tests
#[ctor::ctor]
pub fn init_log() {
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init();
}

/// Keeps every unsolicited report, in order
#[derive(Default)]
pub struct RecordingSender {
    pub reports: RefCell<Vec<RawReport>>,
}

impl RecordingSender {
    pub fn count(&self) -> usize {
        self.reports.borrow().len()
    }

    pub fn last(&self) -> Option<RawReport> {
        self.reports.borrow().last().copied()
    }
}

impl RawHidSender for RecordingSender {
    fn send_raw(&self, report: &RawReport) {
        self.reports.borrow_mut().push(*report);
    }
}

/// Build a full frame, starting with `bytes`
pub fn frame(bytes: &[u8]) -> RawReport {
    let mut report = [0u8; RAW_HID_REPORT_SIZE];
    report[..bytes.len()].copy_from_slice(bytes);
    report
}
