//! Register map
//!
//! The tag exposes two independent 16-bit address spaces, one per I2C
//! device address. Every named location is a [`Register`] constant in
//! [`offsets`]; bit-field layouts live in [`fields`] and the per-area
//! register tables in [`zones`].

pub mod fields;
pub mod offsets;
pub mod zones;

pub use fields::*;
pub use offsets::*;
pub use zones::{area_end_address, ZoneField, ZoneTable, AREA_BLOCK_SIZE};

use crate::bus::{SYSTEM_ADDRESS, USER_ADDRESS};

/// One of the two device address spaces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Space {
    /// User memory, dynamic registers and mailbox (device 0x53)
    User,
    /// System configuration area (device 0x57)
    System,
}

impl Space {
    /// 7-bit device address serving this space
    pub const fn device_address(self) -> u8 {
        match self {
            Space::User => USER_ADDRESS,
            Space::System => SYSTEM_ADDRESS,
        }
    }
}

/// Storage class of an addressed location
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    /// EEPROM user memory (non-volatile)
    UserMemory,
    /// Volatile dynamic registers
    Dynamic,
    /// Volatile fast-transfer mailbox buffer
    Mailbox,
    /// Non-volatile system configuration
    SystemConfig,
}

impl Region {
    /// Returns true if writes to this region program EEPROM cells
    pub const fn is_non_volatile(self) -> bool {
        matches!(self, Region::UserMemory | Region::SystemConfig)
    }
}

/// A location in one of the two address spaces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Register {
    /// Address space
    pub space: Space,
    /// Offset within the space
    pub offset: u16,
}

impl Register {
    /// A location in the user space
    pub const fn user(offset: u16) -> Self {
        Self {
            space: Space::User,
            offset,
        }
    }

    /// A location in the system configuration space
    pub const fn system(offset: u16) -> Self {
        Self {
            space: Space::System,
            offset,
        }
    }

    /// 7-bit device address for this location
    pub const fn device_address(&self) -> u8 {
        self.space.device_address()
    }

    /// Storage class of this location
    pub const fn region(&self) -> Region {
        match self.space {
            Space::System => Region::SystemConfig,
            Space::User => {
                if self.offset < DYNAMIC_START {
                    Region::UserMemory
                } else if self.offset < MAILBOX_START {
                    Region::Dynamic
                } else {
                    Region::Mailbox
                }
            }
        }
    }

    /// Returns true if writes here need an EEPROM settle delay
    pub const fn is_non_volatile(&self) -> bool {
        self.region().is_non_volatile()
    }

    /// The location `n` bytes further into the same space
    pub const fn add(&self, n: u16) -> Self {
        Self {
            space: self.space,
            offset: self.offset.wrapping_add(n),
        }
    }
}

impl core::fmt::Display for Register {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let space = match self.space {
            Space::User => "user",
            Space::System => "system",
        };
        write!(f, "{}:0x{:04X}", space, self.offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_classification() {
        assert_eq!(Register::user(0x0000).region(), Region::UserMemory);
        assert_eq!(Register::user(0x1FFF).region(), Region::UserMemory);
        assert_eq!(GPO_CTRL_DYN.region(), Region::Dynamic);
        assert_eq!(MB_LEN_DYN.region(), Region::Dynamic);
        assert_eq!(MAILBOX.region(), Region::Mailbox);
        assert_eq!(MAILBOX.add(0xFF).region(), Region::Mailbox);
        assert_eq!(I2C_PWD.region(), Region::SystemConfig);
    }

    #[test]
    fn test_volatility() {
        assert!(Register::user(0x0010).is_non_volatile());
        assert!(ENDA1.is_non_volatile());
        assert!(!RF_MNGT_DYN.is_non_volatile());
        assert!(!MAILBOX.is_non_volatile());
    }

    #[test]
    fn test_device_addresses() {
        assert_eq!(IT_STS_DYN.device_address(), 0x53);
        assert_eq!(GPO.device_address(), 0x57);
    }
}
