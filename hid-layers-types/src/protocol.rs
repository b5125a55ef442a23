//! hid-layers protocol
//!
//! A tiny sub-protocol multiplexed on the raw HID channel of Via/Vial configurators.
//! Via uses commands `0x01`-`0x15`, Vial uses `0xFE` and Via reserves `0xFF` as "unhandled",
//! so hid-layers uses `0x88` for commands and `0x89` for responses.
//!
//! Frames are always [`RAW_HID_REPORT_SIZE`] bytes:
//!
//! | Offset | Host -> keyboard       | Keyboard -> host                         |
//! |--------|------------------------|------------------------------------------|
//! | 0      | `0x88`                 | `0x89`                                   |
//! | 1      | subcommand             | highest active layer, `0xFF` on error    |
//! | 2      | argument               | caps word flag                           |
//! | 3      | -                      | layer reporting flag                     |
//! | 4..    | zero                   | zero                                     |

use strum::FromRepr;

/// Usage page of the raw HID interface, same as qmk/vial
pub const RAW_HID_USAGE_PAGE: u16 = 0xFF60;
/// Usage id of the raw HID interface
pub const RAW_HID_USAGE: u16 = 0x61;
/// Size of every raw HID frame, in both directions
pub const RAW_HID_REPORT_SIZE: usize = 32;

/// Tag of frames sent from the host to the keyboard
pub const HID_LAYERS_IN: u8 = 0x88;
/// Tag of frames sent from the keyboard to the host
pub const HID_LAYERS_OUT: u8 = 0x89;
/// Layer byte of a response whose subcommand wasn't handled
pub const HID_LAYERS_ERROR: u8 = 0xFF;

/// A raw HID frame
pub type RawReport = [u8; RAW_HID_REPORT_SIZE];

/// hid-layers subcommands, carried in byte 1 of a `HID_LAYERS_IN` frame.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, FromRepr)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum HidLayersCommand {
    GetLayerState = 0x01,
    // Also answers with the layer state, saves a round trip
    SetReportChange = 0x02,
    InvertLayer = 0x03,
    Unhandled = 0xFF,
}

impl From<u8> for HidLayersCommand {
    fn from(value: u8) -> Self {
        Self::from_repr(value).unwrap_or(Self::Unhandled)
    }
}

/// A request from the host.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Request {
    GetLayerState,
    SetReportChange(bool),
    InvertLayer(u8),
}

impl Request {
    pub fn command(&self) -> HidLayersCommand {
        match self {
            Request::GetLayerState => HidLayersCommand::GetLayerState,
            Request::SetReportChange(_) => HidLayersCommand::SetReportChange,
            Request::InvertLayer(_) => HidLayersCommand::InvertLayer,
        }
    }

    pub fn argument(&self) -> u8 {
        match self {
            Request::GetLayerState => 0,
            Request::SetReportChange(enable) => *enable as u8,
            Request::InvertLayer(layer) => *layer,
        }
    }

    /// Encode the request as a full frame
    pub fn to_report(&self) -> RawReport {
        let mut report = [0u8; RAW_HID_REPORT_SIZE];
        report[0] = HID_LAYERS_IN;
        report[1] = self.command() as u8;
        report[2] = self.argument();
        report
    }
}

/// The bundled layer state carried in every response.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LayerSnapshot {
    /// Highest active layer
    pub layer: u8,
    pub caps_word: bool,
    /// Whether the keyboard pushes a snapshot on every state change
    pub reporting: bool,
}

impl LayerSnapshot {
    pub const fn new(layer: u8, caps_word: bool, reporting: bool) -> Self {
        Self {
            layer,
            caps_word,
            reporting,
        }
    }

    /// Write the response into `report`, clearing everything else
    pub fn write_to(&self, report: &mut RawReport) {
        report.fill(0);
        report[0] = HID_LAYERS_OUT;
        report[1] = self.layer;
        report[2] = self.caps_word as u8;
        report[3] = self.reporting as u8;
    }

    /// Write an error response into `report`. Flags are still filled.
    pub fn write_error_to(&self, report: &mut RawReport) {
        self.write_to(report);
        report[1] = HID_LAYERS_ERROR;
    }

    pub fn to_report(&self) -> RawReport {
        let mut report = [0u8; RAW_HID_REPORT_SIZE];
        self.write_to(&mut report);
        report
    }
}

/// A decoded keyboard response.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Response {
    /// State snapshot, either as a reply or pushed on change
    State(LayerSnapshot),
    /// The keyboard didn't handle the request, the flags are still valid
    Error { caps_word: bool, reporting: bool },
}

impl Response {
    /// Decode a frame from the keyboard. Returns `None` for frames of other protocols.
    ///
    /// Some HID backends strip trailing bytes, anything after the tag that's missing reads as zero.
    pub fn decode(frame: &[u8]) -> Option<Self> {
        if frame.first() != Some(&HID_LAYERS_OUT) {
            return None;
        }
        let byte = |i: usize| frame.get(i).copied().unwrap_or(0);
        let caps_word = byte(2) != 0;
        let reporting = byte(3) != 0;
        match byte(1) {
            HID_LAYERS_ERROR => Some(Response::Error { caps_word, reporting }),
            layer => Some(Response::State(LayerSnapshot::new(layer, caps_word, reporting))),
        }
    }

    pub fn reporting(&self) -> bool {
        match self {
            Response::State(s) => s.reporting,
            Response::Error { reporting, .. } => *reporting,
        }
    }

    pub fn caps_word(&self) -> bool {
        match self {
            Response::State(s) => s.caps_word,
            Response::Error { caps_word, .. } => *caps_word,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_from_u8() {
        assert_eq!(HidLayersCommand::from(0x01), HidLayersCommand::GetLayerState);
        assert_eq!(HidLayersCommand::from(0x02), HidLayersCommand::SetReportChange);
        assert_eq!(HidLayersCommand::from(0x03), HidLayersCommand::InvertLayer);
        assert_eq!(HidLayersCommand::from(0x00), HidLayersCommand::Unhandled);
        assert_eq!(HidLayersCommand::from(0x04), HidLayersCommand::Unhandled);
    }

    #[test]
    fn test_request_frame() {
        let report = Request::SetReportChange(true).to_report();
        assert_eq!(&report[..4], &[0x88, 0x02, 0x01, 0x00]);
        assert!(report[4..].iter().all(|b| *b == 0));

        let report = Request::InvertLayer(5).to_report();
        assert_eq!(&report[..3], &[0x88, 0x03, 0x05]);
    }

    #[test]
    fn test_snapshot_frame() {
        let mut report = [0xAAu8; RAW_HID_REPORT_SIZE];
        LayerSnapshot::new(2, true, false).write_to(&mut report);
        assert_eq!(&report[..4], &[0x89, 0x02, 0x01, 0x00]);
        assert!(report[4..].iter().all(|b| *b == 0));

        LayerSnapshot::new(2, false, true).write_error_to(&mut report);
        assert_eq!(&report[..4], &[0x89, 0xFF, 0x00, 0x01]);
    }

    #[test]
    fn test_decode_response() {
        let report = LayerSnapshot::new(3, false, true).to_report();
        assert_eq!(
            Response::decode(&report),
            Some(Response::State(LayerSnapshot::new(3, false, true)))
        );
        assert_eq!(
            Response::decode(&[0x89, 0xFF, 0x01]),
            Some(Response::Error {
                caps_word: true,
                reporting: false
            })
        );
        // Via frames are not ours
        assert_eq!(Response::decode(&[0x01, 0x00, 0x09]), None);
        assert_eq!(Response::decode(&[]), None);
    }
}
