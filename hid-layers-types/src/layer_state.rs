use core::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, Not};

/// Max number of layers which a `LayerState` can track
pub const MAX_LAYERS: u8 = 32;

/// Active layers of the keyboard, one bit per layer.
///
/// Layer `n` is active when bit `n` is set. The highest set bit is the layer which governs key resolution,
/// an empty state resolves to layer 0, same as qmk's `get_highest_layer`.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LayerState(u32);

impl LayerState {
    pub const EMPTY: Self = Self(0);

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn into_bits(self) -> u32 {
        self.0
    }

    /// A state in which only `layer` is active
    pub const fn single(layer: u8) -> Self {
        Self::EMPTY.with_layer(layer, true)
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Check whether the given layer is active. Layers out of range are never active.
    pub const fn is_on(self, layer: u8) -> bool {
        layer < MAX_LAYERS && self.0 & (1 << layer) != 0
    }

    /// Return a copy with `layer` switched on or off. Layers out of range are ignored.
    pub const fn with_layer(self, layer: u8, on: bool) -> Self {
        if layer >= MAX_LAYERS {
            return self;
        }
        if on {
            Self(self.0 | (1 << layer))
        } else {
            Self(self.0 & !(1 << layer))
        }
    }

    /// Return a copy with the bit of `layer` flipped. Layers out of range are ignored.
    pub const fn inverted(self, layer: u8) -> Self {
        if layer >= MAX_LAYERS {
            return self;
        }
        Self(self.0 ^ (1 << layer))
    }

    /// Index of the highest active layer, 0 when no layer is active
    pub const fn highest_layer(self) -> u8 {
        if self.0 == 0 {
            0
        } else {
            (u32::BITS - 1 - self.0.leading_zeros()) as u8
        }
    }

    /// Iterate over the indices of active layers, lowest first
    pub fn iter(self) -> impl Iterator<Item = u8> {
        (0..MAX_LAYERS).filter(move |l| self.is_on(*l))
    }
}

impl From<u32> for LayerState {
    fn from(bits: u32) -> Self {
        Self(bits)
    }
}

impl From<LayerState> for u32 {
    fn from(state: LayerState) -> Self {
        state.0
    }
}

impl BitOr for LayerState {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}
impl BitAnd for LayerState {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        Self(self.0 & rhs.0)
    }
}
impl Not for LayerState {
    type Output = Self;

    fn not(self) -> Self::Output {
        Self(!self.0)
    }
}
impl BitAndAssign for LayerState {
    fn bitand_assign(&mut self, rhs: Self) {
        *self = *self & rhs;
    }
}
impl BitOrAssign for LayerState {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = *self | rhs;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_highest_layer() {
        assert_eq!(LayerState::EMPTY.highest_layer(), 0);
        assert_eq!(LayerState::single(0).highest_layer(), 0);
        assert_eq!(LayerState::from_bits(0b1010).highest_layer(), 3);
        assert_eq!(LayerState::single(31).highest_layer(), 31);
    }

    #[test]
    fn test_invert_layer() {
        let state = LayerState::single(1);
        let state = state.inverted(4);
        assert!(state.is_on(1));
        assert!(state.is_on(4));
        let state = state.inverted(1);
        assert_eq!(state, LayerState::single(4));
        // Out of range layers don't change anything
        assert_eq!(state.inverted(32), state);
        assert!(!state.is_on(40));
    }

    #[test]
    fn test_layer_ops() {
        let a = LayerState::single(0) | LayerState::single(2);
        assert_eq!(a.into_bits(), 0b101);
        assert_eq!((a & LayerState::single(2)).into_bits(), 0b100);
        assert_eq!(a.with_layer(0, false), LayerState::single(2));

        let mut layers = [0u8; 2];
        for (i, l) in a.iter().enumerate() {
            layers[i] = l;
        }
        assert_eq!(layers, [0, 2]);
    }
}
