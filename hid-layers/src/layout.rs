//! Geometry of the Silakka54: two halves of 4x6 keys plus 3 thumb keys each.
//!
//! The matrix is laid out as the keyboard looks from above, 5 rows of 12 columns.
//! Only the middle 6 positions of the thumb row carry a key.

use crate::chordal_hold::{ChordalHoldMap, HandFlags};

pub const ROW: usize = 5;
pub const COL: usize = 12;
/// Layers of the dynamic keymap
pub const NUM_LAYER: usize = 8;

const L: HandFlags = HandFlags::Left;
const R: HandFlags = HandFlags::Right;
const X: HandFlags = HandFlags::None;

#[rustfmt::skip]
pub const CHORDAL_HOLD_LAYOUT: ChordalHoldMap<ROW, COL> = ChordalHoldMap::new([
    [L, L, L, L, L, L,    R, R, R, R, R, R],
    [L, L, L, L, L, L,    R, R, R, R, R, R],
    [L, L, L, L, L, L,    R, R, R, R, R, R],
    [L, L, L, L, L, L,    R, R, R, R, R, R],
    [X, X, X, L, L, L,    R, R, R, X, X, X],
]);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chordal_hold::KeyPos;

    #[test]
    fn test_chordal_hold_layout_follows_halves() {
        let split: ChordalHoldMap<ROW, COL> = ChordalHoldMap::split_columns();
        for row in 0..ROW as u8 {
            for col in 0..COL as u8 {
                let pos = KeyPos::new(row, col);
                let hand = CHORDAL_HOLD_LAYOUT.hand_at(pos);
                if hand != HandFlags::None {
                    assert_eq!(hand, split.hand_at(pos), "at {:?}", pos);
                }
            }
        }
    }

    #[test]
    fn test_key_count() {
        let keys = (0..ROW as u8)
            .flat_map(|row| (0..COL as u8).map(move |col| KeyPos::new(row, col)))
            .filter(|pos| CHORDAL_HOLD_LAYOUT.hand_at(*pos) != HandFlags::None)
            .count();
        assert_eq!(keys, 54);
    }

    #[test]
    fn test_thumb_cluster() {
        // Inner thumb keys of both halves
        assert!(!CHORDAL_HOLD_LAYOUT.is_same_hand(KeyPos::new(4, 5), KeyPos::new(4, 6)));
        assert!(CHORDAL_HOLD_LAYOUT.is_same_hand(KeyPos::new(4, 3), KeyPos::new(0, 0)));
        assert!(CHORDAL_HOLD_LAYOUT.is_same_hand(KeyPos::new(4, 8), KeyPos::new(3, 11)));
    }
}
