//! # hid-layers types
//!
//! Type definitions shared by the keyboard firmware and the host tool.
//!
//! ## Modules
//!
//! - [`layer_state`] - Bitset of active layers
//! - [`protocol`] - The hid-layers raw HID sub-protocol: tags, subcommands and frame layout
//!
//! The firmware side lives in `hid-layers`, the host side in `hid-layers-host`.

#![no_std]

pub mod layer_state;
pub mod protocol;
