//! Just enough of a HID report descriptor parser to find the top level usage of an interface.

use crate::error::{HostError, Result};

const ITEM_LONG: u8 = 0xFE;

const TYPE_MAIN: u8 = 0;
const TYPE_GLOBAL: u8 = 1;
const TYPE_LOCAL: u8 = 2;

const TAG_COLLECTION: u8 = 0xA;
const TAG_USAGE_PAGE: u8 = 0x0;
const TAG_USAGE: u8 = 0x0;

/// Usage page and usage of the first collection in `descriptor`.
///
/// That's what hidapi reports as `usage_page` and `usage` of an interface.
pub fn top_level_usage(descriptor: &[u8]) -> Result<(u16, u16)> {
    let mut usage_page = None;
    let mut usage = None;
    let mut rest = descriptor;

    while let Some((&prefix, tail)) = rest.split_first() {
        if prefix == ITEM_LONG {
            // bDataSize, bLongItemTag, data
            let size = *tail.first().ok_or(HostError::BadDescriptor)? as usize;
            rest = tail.get(size + 2..).ok_or(HostError::BadDescriptor)?;
            continue;
        }

        let size = match prefix & 0x03 {
            3 => 4,
            n => n as usize,
        };
        let data = tail.get(..size).ok_or(HostError::BadDescriptor)?;
        let value = data.iter().rev().fold(0u32, |acc, b| (acc << 8) | *b as u32);
        rest = &tail[size..];

        match ((prefix >> 2) & 0x03, prefix >> 4) {
            (TYPE_GLOBAL, TAG_USAGE_PAGE) => usage_page = Some(value as u16),
            // A 4 byte usage carries its own page in the high half
            (TYPE_LOCAL, TAG_USAGE) if size == 4 => {
                usage_page = Some((value >> 16) as u16);
                usage = Some(value as u16);
            }
            (TYPE_LOCAL, TAG_USAGE) => {
                usage.get_or_insert(value as u16);
            }
            (TYPE_MAIN, TAG_COLLECTION) => {
                return match (usage_page, usage) {
                    (Some(page), Some(usage)) => Ok((page, usage)),
                    _ => Err(HostError::BadDescriptor),
                };
            }
            _ => {}
        }
    }
    Err(HostError::BadDescriptor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[rustfmt::skip]
    const RAW_HID_DESCRIPTOR: &[u8] = &[
        0x06, 0x60, 0xFF,  // Usage Page (Vendor Defined 0xFF60)
        0x09, 0x61,        // Usage (0x61)
        0xA1, 0x01,        // Collection (Application)
        0x09, 0x62,        //   Usage (0x62)
        0x15, 0x00,        //   Logical Minimum (0)
        0x26, 0xFF, 0x00,  //   Logical Maximum (255)
        0x95, 0x20,        //   Report Count (32)
        0x75, 0x08,        //   Report Size (8)
        0x81, 0x02,        //   Input (Data,Var,Abs)
        0x09, 0x63,        //   Usage (0x63)
        0x15, 0x00,        //   Logical Minimum (0)
        0x26, 0xFF, 0x00,  //   Logical Maximum (255)
        0x95, 0x20,        //   Report Count (32)
        0x75, 0x08,        //   Report Size (8)
        0x91, 0x02,        //   Output (Data,Var,Abs)
        0xC0,              // End Collection
    ];

    #[rustfmt::skip]
    const KEYBOARD_DESCRIPTOR: &[u8] = &[
        0x05, 0x01,        // Usage Page (Generic Desktop Ctrls)
        0x09, 0x06,        // Usage (Keyboard)
        0xA1, 0x01,        // Collection (Application)
        0x05, 0x07,        //   Usage Page (Kbrd/Keypad)
        0x19, 0xE0,        //   Usage Minimum (0xE0)
        0x29, 0xE7,        //   Usage Maximum (0xE7)
        0x81, 0x02,        //   Input (Data,Var,Abs)
        0xC0,              // End Collection
    ];

    #[test]
    fn test_raw_hid_usage() {
        assert_eq!(top_level_usage(RAW_HID_DESCRIPTOR).unwrap(), (0xFF60, 0x61));
    }

    #[test]
    fn test_keyboard_usage() {
        assert_eq!(top_level_usage(KEYBOARD_DESCRIPTOR).unwrap(), (0x01, 0x06));
    }

    #[test]
    fn test_extended_usage() {
        // Usage (0xFF60_0061), Collection (Application)
        let descriptor = [0x0B, 0x61, 0x00, 0x60, 0xFF, 0xA1, 0x01, 0xC0];
        assert_eq!(top_level_usage(&descriptor).unwrap(), (0xFF60, 0x61));
    }

    #[test]
    fn test_long_item_is_skipped() {
        let descriptor = [0x06, 0x60, 0xFF, 0xFE, 0x02, 0x10, 0xAA, 0xBB, 0x09, 0x61, 0xA1, 0x01];
        assert_eq!(top_level_usage(&descriptor).unwrap(), (0xFF60, 0x61));
    }

    #[test]
    fn test_truncated_descriptor() {
        assert!(matches!(top_level_usage(&[0x06, 0x60]), Err(HostError::BadDescriptor)));
        assert!(matches!(top_level_usage(&[0x06, 0x60, 0xFF, 0x09, 0x61]), Err(HostError::BadDescriptor)));
        assert!(matches!(top_level_usage(&[0xA1, 0x01]), Err(HostError::BadDescriptor)));
    }
}
