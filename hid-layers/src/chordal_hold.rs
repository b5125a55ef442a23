/// Position of a key in the matrix
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyPos {
    pub row: u8,
    pub col: u8,
}

impl KeyPos {
    pub const fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }
}

/// Which hand presses a key
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HandFlags {
    Left,
    Right,
    /// No key at this position
    None,
}

/// Hand assignment of every key, used by tap-hold to decide whether a hold is a same-hand chord.
///
/// A tap-hold key held while a key of the *opposite* hand is pressed resolves to hold,
/// a same-hand press resolves to tap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChordalHoldMap<const ROW: usize, const COL: usize> {
    matrix: [[HandFlags; COL]; ROW],
}

impl<const ROW: usize, const COL: usize> ChordalHoldMap<ROW, COL> {
    pub const fn new(matrix: [[HandFlags; COL]; ROW]) -> Self {
        Self { matrix }
    }

    /// Left half of the columns belongs to the left hand, the rest to the right hand
    pub const fn split_columns() -> Self {
        let mut matrix = [[HandFlags::None; COL]; ROW];
        let mut row = 0;
        while row < ROW {
            let mut col = 0;
            while col < COL {
                matrix[row][col] = if col < COL / 2 { HandFlags::Left } else { HandFlags::Right };
                col += 1;
            }
            row += 1;
        }
        Self { matrix }
    }

    /// Hand of the key at `pos`, `HandFlags::None` when the position is outside of the matrix
    pub fn hand_at(&self, pos: KeyPos) -> HandFlags {
        self.matrix
            .get(pos.row as usize)
            .and_then(|r| r.get(pos.col as usize))
            .copied()
            .unwrap_or(HandFlags::None)
    }

    /// Whether both keys exist and are pressed by the same hand
    pub fn is_same_hand(&self, a: KeyPos, b: KeyPos) -> bool {
        match (self.hand_at(a), self.hand_at(b)) {
            (HandFlags::None, _) | (_, HandFlags::None) => false,
            (x, y) => x == y,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_columns() {
        let map: ChordalHoldMap<2, 6> = ChordalHoldMap::split_columns();
        assert_eq!(map.hand_at(KeyPos::new(0, 0)), HandFlags::Left);
        assert_eq!(map.hand_at(KeyPos::new(1, 2)), HandFlags::Left);
        assert_eq!(map.hand_at(KeyPos::new(1, 3)), HandFlags::Right);
        assert_eq!(map.hand_at(KeyPos::new(2, 0)), HandFlags::None);
        assert_eq!(map.hand_at(KeyPos::new(0, 6)), HandFlags::None);
    }

    #[test]
    fn test_same_hand() {
        let map = ChordalHoldMap::new([[HandFlags::Left, HandFlags::None, HandFlags::Right, HandFlags::Right]]);
        assert!(map.is_same_hand(KeyPos::new(0, 2), KeyPos::new(0, 3)));
        assert!(!map.is_same_hand(KeyPos::new(0, 0), KeyPos::new(0, 3)));
        // Keys which don't exist never form a chord
        assert!(!map.is_same_hand(KeyPos::new(0, 1), KeyPos::new(0, 1)));
        assert!(!map.is_same_hand(KeyPos::new(0, 0), KeyPos::new(5, 0)));
    }
}
