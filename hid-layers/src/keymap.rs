use hid_layers_types::layer_state::{LayerState, MAX_LAYERS};

/// The layer engine of the keyboard firmware, as seen by extensions.
pub trait LayerHost {
    /// Currently active layers
    fn layer_state(&self) -> LayerState;

    /// Number of layers the engine accepts, layers `0..layer_count()` can be inverted
    fn layer_count(&self) -> u8;

    /// Flip the given layer.
    ///
    /// Implementations must notify their `LayerObserver` synchronously, before returning.
    fn invert_layer(&mut self, layer: u8);

    /// Whether caps word is active. Firmwares without caps word keep the default.
    fn is_caps_word_on(&self) -> bool {
        false
    }
}

/// Hooks called by a `LayerHost` when its state changes.
pub trait LayerObserver {
    /// Called with the new layer state before it's stored, the returned state is the one which is stored.
    fn on_layer_state_changed<H: LayerHost + ?Sized>(&self, state: LayerState, host: &H) -> LayerState {
        let _ = host;
        state
    }

    /// Called after caps word was switched on or off
    fn on_caps_word_toggled<H: LayerHost + ?Sized>(&self, active: bool, host: &H) {
        let _ = (active, host);
    }
}

/// Observer which does nothing
impl LayerObserver for () {}

/// LayerStack represents the activation state of the keymap layers.
///
/// The conception is borrowed from qmk: every layer can be switched on independently,
/// the highest active layer (or the default layer when it's higher) is used to resolve keys.
/// Every change is reported to the observer, which can also post-process the new state.
pub struct LayerStack<'a, O: LayerObserver, const NUM_LAYER: usize> {
    /// Current state of each layer
    layer_state: LayerState,
    /// Default layer number, max: 32
    default_layer: u8,
    /// Caps word state
    caps_word: bool,
    observer: &'a O,
}

impl<'a, O: LayerObserver, const NUM_LAYER: usize> LayerStack<'a, O, NUM_LAYER> {
    pub fn new(observer: &'a O) -> Self {
        Self {
            layer_state: LayerState::EMPTY,
            default_layer: 0,
            caps_word: false,
            observer,
        }
    }

    /// Get the default layer number
    pub fn get_default_layer(&self) -> u8 {
        self.default_layer
    }

    /// Set the default layer number
    pub fn set_default_layer(&mut self, layer_num: u8) {
        if !Self::is_valid_layer(layer_num) {
            return;
        }
        self.default_layer = layer_num;
    }

    /// The layer which is used to resolve keys
    pub fn get_activated_layer(&self) -> u8 {
        let highest = self.layer_state.highest_layer();
        if self.layer_state.is_empty() || highest < self.default_layer {
            self.default_layer
        } else {
            highest
        }
    }

    /// Replace the whole layer state
    pub fn set_layer_state(&mut self, state: LayerState) {
        // Copy the reference out, so that `self` can be lent to the observer
        let observer = self.observer;
        let state = observer.on_layer_state_changed(state, &*self);
        debug!("Layer state: {:?}", state);
        self.layer_state = state;
    }

    /// Activate given layer
    pub fn activate_layer(&mut self, layer_num: u8) {
        if !Self::is_valid_layer(layer_num) {
            return;
        }
        self.set_layer_state(self.layer_state.with_layer(layer_num, true));
    }

    /// Deactivate given layer
    pub fn deactivate_layer(&mut self, layer_num: u8) {
        if !Self::is_valid_layer(layer_num) {
            return;
        }
        self.set_layer_state(self.layer_state.with_layer(layer_num, false));
    }

    /// Toggle given layer
    pub fn toggle_layer(&mut self, layer_num: u8) {
        if !Self::is_valid_layer(layer_num) {
            return;
        }
        self.set_layer_state(self.layer_state.inverted(layer_num));
    }

    /// Switch caps word on or off, the observer is notified only when it really changes
    pub fn set_caps_word(&mut self, active: bool) {
        if self.caps_word == active {
            return;
        }
        self.caps_word = active;
        let observer = self.observer;
        observer.on_caps_word_toggled(active, &*self);
    }

    pub fn toggle_caps_word(&mut self) {
        self.set_caps_word(!self.caps_word);
    }

    fn is_valid_layer(layer_num: u8) -> bool {
        if layer_num as usize >= NUM_LAYER {
            warn!(
                "Not a valid layer {}, keyboard supports only {} layers",
                layer_num, NUM_LAYER
            );
            return false;
        }
        true
    }
}

impl<O: LayerObserver, const NUM_LAYER: usize> LayerHost for LayerStack<'_, O, NUM_LAYER> {
    fn layer_state(&self) -> LayerState {
        self.layer_state
    }

    fn layer_count(&self) -> u8 {
        NUM_LAYER.min(MAX_LAYERS as usize) as u8
    }

    fn invert_layer(&mut self, layer: u8) {
        self.toggle_layer(layer)
    }

    fn is_caps_word_on(&self) -> bool {
        self.caps_word
    }
}

#[cfg(test)]
mod tests {
    use core::cell::Cell;

    use super::*;

    /// Counts notifications and keeps layer 0 always on
    #[derive(Default)]
    struct PinBaseLayer {
        layer_changes: Cell<usize>,
        caps_word_changes: Cell<usize>,
    }

    impl LayerObserver for PinBaseLayer {
        fn on_layer_state_changed<H: LayerHost + ?Sized>(&self, state: LayerState, _host: &H) -> LayerState {
            self.layer_changes.set(self.layer_changes.get() + 1);
            state.with_layer(0, true)
        }

        fn on_caps_word_toggled<H: LayerHost + ?Sized>(&self, active: bool, host: &H) {
            assert_eq!(active, host.is_caps_word_on());
            self.caps_word_changes.set(self.caps_word_changes.get() + 1);
        }
    }

    #[test]
    fn test_layer_activation() {
        let mut stack: LayerStack<'_, (), 4> = LayerStack::new(&());
        stack.activate_layer(2);
        stack.activate_layer(1);
        assert_eq!(stack.layer_state().into_bits(), 0b110);
        assert_eq!(stack.get_activated_layer(), 2);

        stack.deactivate_layer(2);
        assert_eq!(stack.get_activated_layer(), 1);

        stack.invert_layer(1);
        stack.invert_layer(3);
        assert_eq!(stack.layer_state(), LayerState::single(3));
    }

    #[test]
    fn test_layer_count() {
        let stack: LayerStack<'_, (), 4> = LayerStack::new(&());
        assert_eq!(stack.layer_count(), 4);
        let stack: LayerStack<'_, (), 40> = LayerStack::new(&());
        assert_eq!(stack.layer_count(), MAX_LAYERS);
    }

    #[test]
    fn test_invalid_layer_is_ignored() {
        let observer = PinBaseLayer::default();
        let mut stack: LayerStack<'_, _, 4> = LayerStack::new(&observer);
        stack.activate_layer(4);
        stack.toggle_layer(10);
        stack.set_default_layer(7);
        assert_eq!(stack.layer_state(), LayerState::EMPTY);
        assert_eq!(stack.get_default_layer(), 0);
        assert_eq!(observer.layer_changes.get(), 0);
    }

    #[test]
    fn test_default_layer() {
        let mut stack: LayerStack<'_, (), 4> = LayerStack::new(&());
        stack.set_default_layer(2);
        assert_eq!(stack.get_activated_layer(), 2);
        stack.activate_layer(1);
        assert_eq!(stack.get_activated_layer(), 2);
        stack.activate_layer(3);
        assert_eq!(stack.get_activated_layer(), 3);
    }

    #[test]
    fn test_observer_post_processes_state() {
        let observer = PinBaseLayer::default();
        let mut stack: LayerStack<'_, _, 4> = LayerStack::new(&observer);
        stack.activate_layer(3);
        assert_eq!(stack.layer_state().into_bits(), 0b1001);
        stack.deactivate_layer(0);
        assert!(stack.layer_state().is_on(0));
        assert_eq!(observer.layer_changes.get(), 2);
    }

    #[test]
    fn test_caps_word_notification() {
        let observer = PinBaseLayer::default();
        let mut stack: LayerStack<'_, _, 4> = LayerStack::new(&observer);
        stack.set_caps_word(true);
        stack.set_caps_word(true);
        assert!(stack.is_caps_word_on());
        stack.toggle_caps_word();
        assert!(!stack.is_caps_word_on());
        assert_eq!(observer.caps_word_changes.get(), 2);
    }
}
