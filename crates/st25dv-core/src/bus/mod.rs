//! Bus abstraction
//!
//! This module defines the addressed transaction type and the trait every
//! I2C backend implements to carry it.

mod traits;
mod transaction;

pub use traits::*;
pub use transaction::{BusTransaction, HEADER_LEN};

/// 7-bit device address for user memory, dynamic registers and mailbox
pub const USER_ADDRESS: u8 = 0x53;
/// 7-bit device address for the system configuration area
pub const SYSTEM_ADDRESS: u8 = 0x57;
