//! Area-indexed register tables
//!
//! ENDA, RF area security and I2C protection exist once per user-memory
//! area. Instead of branching on the area number, each accessor looks its
//! target up in one of the tables below: a table maps the 1-based area
//! index to a register plus the position of the area's sub-field within
//! that register.

use super::offsets::{ENDA1, ENDA2, ENDA3, I2CSS, RFA1SS, RFA2SS, RFA3SS, RFA4SS};
use super::Register;

/// Location of one area's field within a register
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneField {
    /// Register holding the field
    pub reg: Register,
    /// Position of the field's lowest bit
    pub shift: u8,
    /// Field mask before shifting (e.g. `0b11` for a two-bit field)
    pub width_mask: u8,
}

impl ZoneField {
    /// A field spanning the whole register
    pub const fn whole(reg: Register) -> Self {
        Self {
            reg,
            shift: 0,
            width_mask: 0xFF,
        }
    }

    /// A two-bit field at `shift`
    pub const fn two_bits(reg: Register, shift: u8) -> Self {
        Self {
            reg,
            shift,
            width_mask: 0b11,
        }
    }

    /// Mask of the field in register position
    pub const fn mask(&self) -> u8 {
        self.width_mask << self.shift
    }

    /// Extract the field from a raw register value, right-aligned
    pub const fn extract(&self, raw: u8) -> u8 {
        (raw >> self.shift) & self.width_mask
    }

    /// Replace the field within `raw`, leaving every other bit untouched
    pub const fn insert(&self, raw: u8, value: u8) -> u8 {
        (raw & !self.mask()) | ((value & self.width_mask) << self.shift)
    }
}

/// A set of structurally identical per-area fields
#[derive(Debug, Clone, Copy)]
pub struct ZoneTable {
    /// Human readable name used in log messages
    pub name: &'static str,
    entries: &'static [ZoneField],
}

impl ZoneTable {
    /// Create a table whose first entry belongs to area 1
    pub const fn new(name: &'static str, entries: &'static [ZoneField]) -> Self {
        Self { name, entries }
    }

    /// Number of areas covered
    pub const fn areas(&self) -> u8 {
        self.entries.len() as u8
    }

    /// Look up the field of a 1-based area index
    pub fn lookup(&self, area: u8) -> Option<ZoneField> {
        let index = usize::from(area).checked_sub(1)?;
        self.entries.get(index).copied()
    }
}

/// Size of the blocks `ENDAx` counts in
pub const AREA_BLOCK_SIZE: u16 = 32;

/// Last byte address of an area whose `ENDAx` register holds `enda`
pub const fn area_end_address(enda: u8) -> u16 {
    enda as u16 * AREA_BLOCK_SIZE + (AREA_BLOCK_SIZE - 1)
}

/// Area end addresses, areas 1-3 (area 4 ends at the end of memory)
pub static AREA_END: ZoneTable = ZoneTable::new(
    "ENDA",
    &[
        ZoneField::whole(ENDA1),
        ZoneField::whole(ENDA2),
        ZoneField::whole(ENDA3),
    ],
);

/// RF password control, bits 0-1 of `RFAxSS`, areas 1-4
pub static RF_PASSWORD_CONTROL: ZoneTable = ZoneTable::new(
    "RF PWD_CTRL",
    &[
        ZoneField::two_bits(RFA1SS, 0),
        ZoneField::two_bits(RFA2SS, 0),
        ZoneField::two_bits(RFA3SS, 0),
        ZoneField::two_bits(RFA4SS, 0),
    ],
);

/// RF read/write protection, bits 2-3 of `RFAxSS`, areas 1-4
pub static RF_PROTECTION: ZoneTable = ZoneTable::new(
    "RF RW_PROTECTION",
    &[
        ZoneField::two_bits(RFA1SS, 2),
        ZoneField::two_bits(RFA2SS, 2),
        ZoneField::two_bits(RFA3SS, 2),
        ZoneField::two_bits(RFA4SS, 2),
    ],
);

/// I2C read/write protection, two bits per area packed in `I2CSS`
pub static I2C_PROTECTION: ZoneTable = ZoneTable::new(
    "I2CSS",
    &[
        ZoneField::two_bits(I2CSS, 0),
        ZoneField::two_bits(I2CSS, 2),
        ZoneField::two_bits(I2CSS, 4),
        ZoneField::two_bits(I2CSS, 6),
    ],
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_range() {
        assert_eq!(AREA_END.lookup(0), None);
        assert_eq!(AREA_END.lookup(1).map(|f| f.reg), Some(ENDA1));
        assert_eq!(AREA_END.lookup(3).map(|f| f.reg), Some(ENDA3));
        assert_eq!(AREA_END.lookup(4), None);

        assert_eq!(I2C_PROTECTION.lookup(0), None);
        assert_eq!(I2C_PROTECTION.lookup(4).map(|f| f.shift), Some(6));
        assert_eq!(I2C_PROTECTION.lookup(5), None);
        assert_eq!(RF_PROTECTION.areas(), 4);
    }

    #[test]
    fn test_insert_touches_only_own_field() {
        let area2 = I2C_PROTECTION.lookup(2).unwrap();
        assert_eq!(area2.insert(0b1100_1100, 0b01), 0b1100_0100);
        assert_eq!(area2.insert(0b0000_0000, 0b11), 0b0000_1100);
        // Values wider than the field are truncated
        assert_eq!(area2.insert(0b1111_1111, 0b100), 0b1111_0011);
    }

    #[test]
    fn test_extract_is_right_aligned() {
        let area4 = I2C_PROTECTION.lookup(4).unwrap();
        assert_eq!(area4.extract(0b1000_0000), 0b10);

        let rf = RF_PROTECTION.lookup(1).unwrap();
        assert_eq!(rf.extract(0b0000_1101), 0b11);
        let pwd = RF_PASSWORD_CONTROL.lookup(1).unwrap();
        assert_eq!(pwd.extract(0b0000_1101), 0b01);
    }

    #[test]
    fn test_area_end_address() {
        assert_eq!(area_end_address(0x00), 0x001F);
        assert_eq!(area_end_address(0x0F), 0x01FF);
        assert_eq!(area_end_address(0xFF), 0x1FFF);
    }

    #[test]
    fn test_whole_register_field() {
        let enda = AREA_END.lookup(2).unwrap();
        assert_eq!(enda.mask(), 0xFF);
        assert_eq!(enda.insert(0x12, 0x34), 0x34);
        assert_eq!(enda.extract(0x34), 0x34);
    }
}
