use hid_layers_types::layer_state::MAX_LAYERS;

use crate::layout::NUM_LAYER;

/// Config of the hid-layers extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HidLayersConfig {
    /// Number of layers which can be inverted by the host, `DYNAMIC_KEYMAP_LAYER_COUNT` in qmk.
    /// Never exceeds `MAX_LAYERS`, and the layer engine's own count caps it further.
    pub layer_count: u8,
    /// Whether the firmware supports caps word.
    /// When it doesn't, the caps word byte of every response stays 0.
    pub caps_word: bool,
}

impl Default for HidLayersConfig {
    fn default() -> Self {
        Self::new(NUM_LAYER as u8, true)
    }
}

impl HidLayersConfig {
    pub const fn new(layer_count: u8, caps_word: bool) -> Self {
        let layer_count = if layer_count > MAX_LAYERS { MAX_LAYERS } else { layer_count };
        Self {
            layer_count,
            caps_word,
        }
    }

    pub const fn with_layer_count(self, layer_count: u8) -> Self {
        Self::new(layer_count, self.caps_word)
    }

    pub const fn with_caps_word(self, caps_word: bool) -> Self {
        Self::new(self.layer_count, caps_word)
    }
}
