//! Host side of the hid-layers raw HID sub-protocol.
//!
//! [`device`] finds and opens the raw HID interface of a keyboard, [`Client`] talks hid-layers
//! over any [`Transport`] and [`watch`] follows layer changes across reconnects.

pub mod client;
pub mod descriptor;
pub mod device;
pub mod error;
pub mod watch;

pub use client::Client;
pub use device::{Candidate, DeviceFilter, Transport, UsbTransport, candidates, hid_interfaces, open_first};
pub use error::{HostError, Result};
pub use hid_layers_types as types;
pub use watch::{follow, watch};
