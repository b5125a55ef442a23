use core::sync::atomic::{AtomicBool, Ordering};

use hid_layers_types::layer_state::LayerState;
use hid_layers_types::protocol::{HID_LAYERS_IN, HidLayersCommand, LayerSnapshot, RawReport};

use crate::config::HidLayersConfig;
use crate::hid::RawHidSender;
use crate::keymap::{LayerHost, LayerObserver};

/// Reports layer and caps word state over the raw HID channel.
///
/// It answers `HID_LAYERS_IN` frames in place and, once the host enabled reporting,
/// pushes a snapshot through `S` whenever the layer state or caps word changes.
///
/// All hooks run on the same executor and never overlap, so the flag needs no lock.
/// It's atomic only to make `HidLayers` usable in a `static`.
pub struct HidLayers<S: RawHidSender> {
    /// Whether layer changes are reported, off after reset
    reporting: AtomicBool,
    config: HidLayersConfig,
    sender: S,
}

impl<S: RawHidSender> HidLayers<S> {
    pub const fn new(config: HidLayersConfig, sender: S) -> Self {
        Self {
            reporting: AtomicBool::new(false),
            config,
            sender,
        }
    }

    pub fn config(&self) -> &HidLayersConfig {
        &self.config
    }

    pub fn is_reporting(&self) -> bool {
        self.reporting.load(Ordering::Relaxed)
    }

    pub fn set_reporting(&self, enabled: bool) {
        self.reporting.store(enabled, Ordering::Relaxed);
    }

    /// Bundle the given layer state with caps word and the reporting flag
    pub fn snapshot<H: LayerHost + ?Sized>(&self, state: LayerState, host: &H) -> LayerSnapshot {
        LayerSnapshot::new(
            state.highest_layer(),
            self.config.caps_word && host.is_caps_word_on(),
            self.is_reporting(),
        )
    }

    /// Layers the host may invert: the configured count, capped by what the layer engine accepts
    pub fn layer_count<H: LayerHost + ?Sized>(&self, host: &H) -> u8 {
        self.config.layer_count.min(host.layer_count())
    }

    /// Process a raw HID frame from the host.
    ///
    /// Frames of other protocols are left untouched and `false` is returned.
    /// Otherwise the frame is overwritten with the response and `true` is returned,
    /// unknown subcommands and out of range layers get `HID_LAYERS_ERROR` as layer.
    pub fn process_report<H: LayerHost + ?Sized>(&self, report: &mut RawReport, host: &mut H) -> bool {
        if report[0] != HID_LAYERS_IN {
            return false;
        }
        let command = HidLayersCommand::from(report[1]);
        let argument = report[2];
        debug!("Received hid-layers command: {:?}, argument: {}", command, argument);

        // The error response is the default, with valid flags
        self.snapshot(host.layer_state(), &*host).write_error_to(report);

        match command {
            HidLayersCommand::SetReportChange => {
                self.set_reporting(argument != 0);
                info!("Layer reporting: {}", self.is_reporting());
                // Answer with the layer state, saves the host a second request
                self.snapshot(host.layer_state(), &*host).write_to(report);
            }
            HidLayersCommand::GetLayerState => {
                self.snapshot(host.layer_state(), &*host).write_to(report);
            }
            HidLayersCommand::InvertLayer => {
                let layer_count = self.layer_count(&*host);
                if argument < layer_count {
                    // The host gets the state in this response,
                    // suppress the report triggered by the layer change
                    let reporting = self.is_reporting();
                    self.set_reporting(false);
                    host.invert_layer(argument);
                    self.set_reporting(reporting);

                    let mut snapshot = self.snapshot(host.layer_state(), &*host);
                    snapshot.layer = argument;
                    snapshot.write_to(report);
                } else {
                    warn!(
                        "Not a valid layer {}, keyboard supports only {} layers",
                        argument, layer_count
                    );
                }
            }
            HidLayersCommand::Unhandled => {
                warn!("Unknown hid-layers subcommand: {}", report[1]);
            }
        }
        true
    }

    /// Push the snapshot of `state` to the host, if reporting is on.
    ///
    /// The state is returned as is, this hook only observes.
    pub fn on_layer_state_changed<H: LayerHost + ?Sized>(&self, state: LayerState, host: &H) -> LayerState {
        if self.is_reporting() {
            self.send_snapshot(self.snapshot(state, host));
        }
        state
    }

    /// Push the current snapshot to the host, if reporting is on.
    ///
    /// `active` isn't used, the snapshot reads caps word from the host like every other report.
    pub fn on_caps_word_toggled<H: LayerHost + ?Sized>(&self, active: bool, host: &H) {
        trace!("Caps word: {}", active);
        if self.is_reporting() {
            self.send_snapshot(self.snapshot(host.layer_state(), host));
        }
    }

    fn send_snapshot(&self, snapshot: LayerSnapshot) {
        debug!("Reporting layer state: {:?}", snapshot);
        self.sender.send_raw(&snapshot.to_report());
    }
}

impl<S: RawHidSender> LayerObserver for HidLayers<S> {
    fn on_layer_state_changed<H: LayerHost + ?Sized>(&self, state: LayerState, host: &H) -> LayerState {
        HidLayers::on_layer_state_changed(self, state, host)
    }

    fn on_caps_word_toggled<H: LayerHost + ?Sized>(&self, active: bool, host: &H) {
        HidLayers::on_caps_word_toggled(self, active, host)
    }
}
