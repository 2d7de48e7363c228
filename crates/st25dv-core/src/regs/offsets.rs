//! ST25DV register offsets
//!
//! Offsets are relative to the address space of their device address.
//! Names follow the datasheet register mnemonics.

use super::Register;

// ============================================================================
// User memory
// ============================================================================

/// Last user byte of the 4 Kbit variant
pub const USER_MEM_LAST_04K: u16 = 0x01FF;
/// Last user byte of the 16 Kbit variant
pub const USER_MEM_LAST_16K: u16 = 0x07FF;
/// Last user byte of the 64 Kbit variant
pub const USER_MEM_LAST_64K: u16 = 0x1FFF;

// ============================================================================
// Dynamic registers (user space)
// ============================================================================

/// First dynamic register offset
pub const DYNAMIC_START: u16 = 0x2000;

/// GPO control: bit 7 enable, bits 0-6 interrupt source mirror
pub const GPO_CTRL_DYN: Register = Register::user(0x2000);
/// Energy harvesting control and status
pub const EH_CTRL_DYN: Register = Register::user(0x2002);
/// RF management: RF disable / RF sleep
pub const RF_MNGT_DYN: Register = Register::user(0x2003);
/// I2C security session status
pub const I2C_SSO_DYN: Register = Register::user(0x2004);
/// Interrupt status (cleared on read)
pub const IT_STS_DYN: Register = Register::user(0x2005);
/// Fast transfer mode control and status
pub const MB_CTRL_DYN: Register = Register::user(0x2006);
/// Mailbox message length minus one
pub const MB_LEN_DYN: Register = Register::user(0x2007);

// ============================================================================
// Fast transfer mailbox (user space)
// ============================================================================

/// First mailbox byte offset
pub const MAILBOX_START: u16 = 0x2008;
/// Last mailbox byte offset (inclusive)
pub const MAILBOX_LAST: u16 = 0x2107;
/// Mailbox capacity in bytes
pub const MAILBOX_SIZE: usize = (MAILBOX_LAST - MAILBOX_START) as usize + 1;
/// First mailbox byte
pub const MAILBOX: Register = Register::user(MAILBOX_START);

// ============================================================================
// System configuration (system space)
// ============================================================================

/// GPO interrupt source configuration
pub const GPO: Register = Register::system(0x0000);
/// Interrupt pulse duration
pub const IT_TIME: Register = Register::system(0x0001);
/// Energy harvesting default mode
pub const EH_MODE: Register = Register::system(0x0002);
/// RF management at boot
pub const RF_MNGT: Register = Register::system(0x0003);
/// RF area 1 security status
pub const RFA1SS: Register = Register::system(0x0004);
/// End of area 1
pub const ENDA1: Register = Register::system(0x0005);
/// RF area 2 security status
pub const RFA2SS: Register = Register::system(0x0006);
/// End of area 2
pub const ENDA2: Register = Register::system(0x0007);
/// RF area 3 security status
pub const RFA3SS: Register = Register::system(0x0008);
/// End of area 3
pub const ENDA3: Register = Register::system(0x0009);
/// RF area 4 security status
pub const RFA4SS: Register = Register::system(0x000A);
/// I2C protection of all four areas, two bits each
pub const I2CSS: Register = Register::system(0x000B);
/// Capability container write lock
pub const LOCK_CCFILE: Register = Register::system(0x000C);
/// Fast transfer mode authorization
pub const MB_MODE: Register = Register::system(0x000D);
/// Mailbox message watchdog
pub const MB_WDG: Register = Register::system(0x000E);
/// Configuration lock from RF
pub const LOCK_CFG: Register = Register::system(0x000F);
/// DSFID lock status
pub const LOCK_DSFID: Register = Register::system(0x0010);
/// AFI lock status
pub const LOCK_AFI: Register = Register::system(0x0011);
/// Data storage format identifier
pub const DSFID: Register = Register::system(0x0012);
/// Application family identifier
pub const AFI: Register = Register::system(0x0013);
/// Memory size in blocks minus one (16-bit)
pub const MEM_SIZE: Register = Register::system(0x0014);
/// Capacity code byte (upper half of MEM_SIZE)
pub const MEM_SIZE_H: Register = Register::system(0x0015);
/// Block size in bytes minus one
pub const BLK_SIZE: Register = Register::system(0x0016);
/// IC reference
pub const IC_REF: Register = Register::system(0x0017);
/// 64-bit unique identifier
pub const UID: Register = Register::system(0x0018);
/// IC revision
pub const IC_REV: Register = Register::system(0x0020);
/// 64-bit I2C password
pub const I2C_PWD: Register = Register::system(0x0900);

/// Validation code between the two password copies when presenting
pub const PWD_PRESENT_CODE: u8 = 0x09;
