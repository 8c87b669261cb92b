//! Board variants.
//!
//! Both boards share the key tables and the 6-row matrix. They differ in how
//! many column lines are wired and in where the RC5 address comes from.

/// How the RC5 system address is chosen.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AddressMap {
    /// One address regardless of the selector lines.
    Fixed(u8),
    /// Address per selector state, indexed by `line1 << 1 | line0`.
    Selector([u8; 4]),
}

impl AddressMap {
    /// Address for a selector state. Only the two low bits of `selector` are used.
    pub fn address(&self, selector: u8) -> u8 {
        match *self {
            AddressMap::Fixed(address) => address,
            AddressMap::Selector(table) => table[(selector & 0x03) as usize],
        }
    }

    /// Whether the selector lines need to be read at all.
    pub fn uses_selector(&self) -> bool {
        matches!(self, AddressMap::Selector(_))
    }
}

/// Static description of one board variant.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BoardConfig {
    pub name: &'static str,
    /// Number of row drive lines.
    pub rows: u8,
    /// Number of column sense lines.
    pub columns: u8,
    pub address_map: AddressMap,
}

impl BoardConfig {
    /// Mask covering every row drive line.
    pub const fn row_mask(&self) -> u8 {
        ((1u16 << self.rows) - 1) as u8
    }

    /// Mask covering every column sense line.
    pub const fn column_mask(&self) -> u8 {
        ((1u16 << self.columns) - 1) as u8
    }

    /// Whether a position code can be produced by this board's matrix.
    pub fn can_scan(&self, code: crate::RawScanCode) -> bool {
        code.row() < self.rows && code.columns() & !self.column_mask() == 0
    }
}

/// 6x4 matrix, address picked with two DIP switches.
///
/// | line1 | line0 | address |
/// |-------|-------|---------|
/// | 0     | 0     | 24      |
/// | 0     | 1     | 25      |
/// | 1     | 0     | 28      |
/// | 1     | 1     | 27      |
pub const DIP_SELECT: BoardConfig = BoardConfig {
    name: "dip-select",
    rows: 6,
    columns: 4,
    address_map: AddressMap::Selector([24, 25, 28, 27]),
};

/// 6x3 matrix with a hard-wired address.
pub const FIXED_ADDRESS: BoardConfig = BoardConfig {
    name: "fixed",
    rows: 6,
    columns: 3,
    address_map: AddressMap::Fixed(24),
};

/// Every known board.
pub static BOARDS: [&BoardConfig; 2] = [&DIP_SELECT, &FIXED_ADDRESS];

/// Look up a board by its name.
pub fn by_name(name: &str) -> Option<&'static BoardConfig> {
    BOARDS.iter().copied().find(|b| b.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keytab::KeyIndex;

    #[test]
    fn selector_states_give_distinct_addresses() {
        let map = DIP_SELECT.address_map;
        let addresses: [u8; 4] = core::array::from_fn(|s| map.address(s as u8));
        assert_eq!(addresses, [24, 25, 28, 27]);
        for i in 0..4 {
            for j in (i + 1)..4 {
                assert_ne!(addresses[i], addresses[j]);
            }
        }
    }

    #[test]
    fn fixed_map_ignores_selector() {
        for s in 0..4 {
            assert_eq!(FIXED_ADDRESS.address_map.address(s), 24);
        }
        assert!(!FIXED_ADDRESS.address_map.uses_selector());
    }

    #[test]
    fn masks() {
        assert_eq!(DIP_SELECT.row_mask(), 0x3F);
        assert_eq!(DIP_SELECT.column_mask(), 0x0F);
        assert_eq!(FIXED_ADDRESS.column_mask(), 0x07);
    }

    #[test]
    fn reachable_keys() {
        assert!(KeyIndex::all().all(|k| DIP_SELECT.can_scan(k.position())));
        let reachable = KeyIndex::all()
            .filter(|k| FIXED_ADDRESS.can_scan(k.position()))
            .count();
        assert_eq!(reachable, 18);
    }

    #[test]
    fn lookup_by_name() {
        assert_eq!(by_name("dip-select"), Some(&DIP_SELECT));
        assert_eq!(by_name("fixed"), Some(&FIXED_ADDRESS));
        assert_eq!(by_name("universal"), None);
    }
}
