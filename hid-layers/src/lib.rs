//! # hid-layers
//!
//! Reports the active layer and caps word of a keyboard over the raw HID channel used by Via/Vial,
//! so that host tools can show which layer is active.
//!
//! The firmware reaches the extension through three hooks of [`HidLayers`]:
//! - [`HidLayers::process_report`] for raw HID frames from the host,
//! - [`HidLayers::on_layer_state_changed`] and [`HidLayers::on_caps_word_toggled`] for state changes.
//!
//! [`HidLayersService`] wires them to a USB raw HID interface.

#![cfg_attr(not(test), no_std)]

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

pub mod channel;
pub mod chordal_hold;
pub mod config;
pub mod descriptor;
pub mod hid;
pub mod keymap;
pub mod layer_report;
pub mod layout;
pub mod service;
pub mod usb;

pub use config::HidLayersConfig;
pub use hid_layers_types as types;
pub use keymap::{LayerHost, LayerObserver, LayerStack};
pub use layer_report::HidLayers;
pub use service::{HidLayersService, run_hid_layers_task};

/// Raw mutex type used by all channels
pub type RawMutex = embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
