//! Bit-field layouts of the multi-field registers
//!
//! Single-byte registers that pack several flags are modeled with
//! `bitflags`; two-bit area fields get small enums. Extracted fields are
//! always right-shifted to their natural range before conversion.

use bitflags::bitflags;

/// Bit index of the lowest set bit in `mask`
pub const fn bit_of(mask: u8) -> u8 {
    mask.trailing_zeros() as u8
}

bitflags! {
    /// GPO interrupt source configuration (system `GPO` register)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct GpoConfig: u8 {
        /// GPO driven by the RF user command
        const RF_USER_EN      = 1 << 0;
        /// GPO signals RF activity
        const RF_ACTIVITY_EN  = 1 << 1;
        /// GPO pulses on RF interrupt command
        const RF_INTERRUPT_EN = 1 << 2;
        /// GPO signals RF field changes
        const FIELD_CHANGE_EN = 1 << 3;
        /// GPO signals RF mailbox message put
        const RF_PUT_MSG_EN   = 1 << 4;
        /// GPO signals RF mailbox message read
        const RF_GET_MSG_EN   = 1 << 5;
        /// GPO signals RF EEPROM writes
        const RF_WRITE_EN     = 1 << 6;
        /// GPO output enable
        const GPO_EN          = 1 << 7;

        /// All interrupt source bits (bits 0-6)
        const MODE = 0x7F;
    }
}

bitflags! {
    /// Energy harvesting control and status (`EH_CTRL_Dyn`)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct EnergyHarvestStatus: u8 {
        /// Energy harvesting enabled (read/write)
        const EH_EN    = 1 << 0;
        /// Energy harvesting output active
        const EH_ON    = 1 << 1;
        /// RF field present
        const FIELD_ON = 1 << 2;
        /// VCC supply present
        const VCC_ON   = 1 << 3;
    }
}

bitflags! {
    /// RF management flags (`RF_MNGT` and `RF_MNGT_Dyn`)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct RfManagement: u8 {
        /// RF commands are answered with an error
        const RF_DISABLE = 1 << 0;
        /// RF interface is fully off
        const RF_SLEEP   = 1 << 1;
    }
}

bitflags! {
    /// Interrupt source status (`IT_STS_Dyn`, cleared on read)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct InterruptStatus: u8 {
        /// RF user command received
        const RF_USER       = 1 << 0;
        /// RF activity detected
        const RF_ACTIVITY   = 1 << 1;
        /// RF interrupt command received
        const RF_INTERRUPT  = 1 << 2;
        /// RF field disappeared
        const FIELD_FALLING = 1 << 3;
        /// RF field appeared
        const FIELD_RISING  = 1 << 4;
        /// RF side put a mailbox message
        const RF_PUT_MSG    = 1 << 5;
        /// RF side read the mailbox message
        const RF_GET_MSG    = 1 << 6;
        /// RF side wrote EEPROM
        const RF_WRITE      = 1 << 7;
    }
}

bitflags! {
    /// Fast transfer mode control and status (`MB_CTRL_Dyn`)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct MailboxStatus: u8 {
        /// Mailbox enabled (read/write)
        const MB_EN            = 1 << 0;
        /// Host put a message
        const HOST_PUT_MSG     = 1 << 1;
        /// RF put a message
        const RF_PUT_MSG       = 1 << 2;
        /// Host message not read by RF before watchdog expiry
        const HOST_MISS_MSG    = 1 << 4;
        /// RF message not read by host before watchdog expiry
        const RF_MISS_MSG      = 1 << 5;
        /// Current message was put by the host
        const HOST_CURRENT_MSG = 1 << 6;
        /// Current message was put by RF
        const RF_CURRENT_MSG   = 1 << 7;
    }
}

/// GPO output enable bit in `GPO` and `GPO_CTRL_Dyn`
pub const GPO_ENABLE_BIT: u8 = bit_of(GpoConfig::GPO_EN.bits());
/// Session open bit in `I2C_SSO_Dyn`
pub const I2C_SSO_BIT: u8 = 0;
/// Energy harvesting mode bit in `EH_MODE`
pub const EH_MODE_BIT: u8 = 0;
/// Mailbox authorization bit in `MB_MODE`
pub const MB_MODE_BIT: u8 = 0;
/// Configuration lock bit in `LOCK_CFG`
pub const LOCK_CFG_BIT: u8 = 0;
/// Interrupt pulse duration field in `IT_TIME`
pub const IT_TIME_MASK: u8 = 0x07;
/// Watchdog field in `MB_WDG`
pub const MB_WDG_MASK: u8 = 0x07;
/// Capability container block 0/1 lock bits in `LOCK_CCFILE`
pub const LOCK_CCFILE_MASK: u8 = 0x03;

// Host-writable bits of the dynamic registers; everything else is
// maintained by the tag.

/// Writable bits of `GPO_CTRL_Dyn`
pub const GPO_CTRL_DYN_WRITABLE: u8 = 0xFF;
/// Writable bits of `EH_CTRL_Dyn`
pub const EH_CTRL_DYN_WRITABLE: u8 = EnergyHarvestStatus::EH_EN.bits();
/// Writable bits of `RF_MNGT_Dyn`
pub const RF_MNGT_DYN_WRITABLE: u8 = RfManagement::all().bits();
/// Writable bits of `MB_CTRL_Dyn`
pub const MB_CTRL_DYN_WRITABLE: u8 = MailboxStatus::MB_EN.bits();

/// Energy harvesting behavior after boot (`EH_MODE`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EhMode {
    /// Energy harvesting forced on at boot
    #[default]
    ForcedAtBoot,
    /// Energy harvesting enabled on demand through `EH_CTRL_Dyn`
    OnDemand,
}

impl EhMode {
    /// Decode from the register bit
    pub const fn from_bit(bit: bool) -> Self {
        if bit {
            EhMode::OnDemand
        } else {
            EhMode::ForcedAtBoot
        }
    }

    /// Register bit value
    pub const fn bit(self) -> bool {
        matches!(self, EhMode::OnDemand)
    }
}

/// RF password guarding an area (`PWD_CTRL_Ax`, bits 0-1 of `RFAxSS`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RfPasswordControl {
    /// Area not guarded by a password
    #[default]
    None,
    /// Guarded by RF password 1
    Password1,
    /// Guarded by RF password 2
    Password2,
    /// Guarded by RF password 3
    Password3,
}

impl RfPasswordControl {
    /// Decode a two-bit field value; higher bits are ignored
    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0 => RfPasswordControl::None,
            1 => RfPasswordControl::Password1,
            2 => RfPasswordControl::Password2,
            _ => RfPasswordControl::Password3,
        }
    }

    /// Two-bit field value
    pub const fn bits(self) -> u8 {
        self as u8
    }
}

/// Read/write protection of an area, for either interface
///
/// Used for the RF (`RW_PROTECTION_Ax` in `RFAxSS`) and I2C (`I2CSS`)
/// protection fields, which share the same encoding. Area 1 is always
/// readable regardless of its setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AreaProtection {
    /// Read and write always allowed
    #[default]
    Open,
    /// Read allowed, write needs an open security session
    WriteProtected,
    /// Read and write need an open security session
    ReadWriteProtected,
    /// Read needs an open security session, write forbidden
    ReadProtectedWriteForbidden,
}

impl AreaProtection {
    /// Decode a two-bit field value; higher bits are ignored
    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0 => AreaProtection::Open,
            1 => AreaProtection::WriteProtected,
            2 => AreaProtection::ReadWriteProtected,
            _ => AreaProtection::ReadProtectedWriteForbidden,
        }
    }

    /// Two-bit field value
    pub const fn bits(self) -> u8 {
        self as u8
    }
}

impl core::fmt::Display for AreaProtection {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            AreaProtection::Open => write!(f, "open"),
            AreaProtection::WriteProtected => write!(f, "write-protected"),
            AreaProtection::ReadWriteProtected => write!(f, "read/write-protected"),
            AreaProtection::ReadProtectedWriteForbidden => {
                write!(f, "read-protected, write-forbidden")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bit_of() {
        assert_eq!(bit_of(0x01), 0);
        assert_eq!(bit_of(0x80), 7);
        assert_eq!(GPO_ENABLE_BIT, 7);
    }

    #[test]
    fn test_two_bit_fields_ignore_high_bits() {
        assert_eq!(AreaProtection::from_bits(0b101), AreaProtection::WriteProtected);
        assert_eq!(RfPasswordControl::from_bits(0xFF), RfPasswordControl::Password3);
        for bits in 0..4u8 {
            assert_eq!(AreaProtection::from_bits(bits).bits(), bits);
            assert_eq!(RfPasswordControl::from_bits(bits).bits(), bits);
        }
    }

    #[test]
    fn test_gpo_mode_mask() {
        let cfg = GpoConfig::GPO_EN | GpoConfig::FIELD_CHANGE_EN;
        assert_eq!((cfg & GpoConfig::MODE).bits(), 0x08);
        assert!(cfg.contains(GpoConfig::GPO_EN));
    }

    #[test]
    fn test_writable_masks() {
        assert_eq!(EH_CTRL_DYN_WRITABLE, 0x01);
        assert_eq!(RF_MNGT_DYN_WRITABLE, 0x03);
        assert_eq!(MB_CTRL_DYN_WRITABLE, 0x01);
    }
}
