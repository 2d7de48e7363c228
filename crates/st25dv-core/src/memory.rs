//! Capacity variants and the user-memory boundary

use crate::bus::I2cBus;
use crate::codec;
use crate::error::Result;
use crate::regs::offsets::{MEM_SIZE_H, USER_MEM_LAST_04K, USER_MEM_LAST_16K, USER_MEM_LAST_64K};
use maybe_async::maybe_async;

/// Capacity code stored in `MEM_SIZE_H` by the 16 Kbit variant
pub const CAPACITY_CODE_16K: u8 = 0x01;
/// Capacity code stored in `MEM_SIZE_H` by the 64 Kbit variant
pub const CAPACITY_CODE_64K: u8 = 0x07;

/// Memory size variant of the tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum CapacityVariant {
    /// ST25DV04K: 4 Kbit (512 bytes) of user memory
    #[default]
    K04,
    /// ST25DV16K: 16 Kbit (2 KiB) of user memory
    K16,
    /// ST25DV64K: 64 Kbit (8 KiB) of user memory
    K64,
}

impl CapacityVariant {
    /// Map a capacity code byte to its variant
    ///
    /// Unknown codes fall back to the smallest variant.
    pub const fn from_code(code: u8) -> Self {
        match code {
            CAPACITY_CODE_64K => CapacityVariant::K64,
            CAPACITY_CODE_16K => CapacityVariant::K16,
            _ => CapacityVariant::K04,
        }
    }

    /// Last addressable user-memory offset (inclusive)
    pub const fn last_user_address(self) -> u16 {
        match self {
            CapacityVariant::K04 => USER_MEM_LAST_04K,
            CapacityVariant::K16 => USER_MEM_LAST_16K,
            CapacityVariant::K64 => USER_MEM_LAST_64K,
        }
    }

    /// Exclusive upper bound for byte-addressed user memory
    pub const fn user_memory_end(self) -> u16 {
        self.last_user_address() + 1
    }

    /// User memory size in bytes
    pub const fn user_memory_size(self) -> usize {
        self.user_memory_end() as usize
    }

    /// Nominal size in Kbit (4, 16 or 64)
    pub const fn size_kbit(self) -> u16 {
        match self {
            CapacityVariant::K04 => 4,
            CapacityVariant::K16 => 16,
            CapacityVariant::K64 => 64,
        }
    }

    /// Returns true if `offset` lies within user memory
    pub const fn contains(self, offset: u16) -> bool {
        offset < self.user_memory_end()
    }
}

impl core::fmt::Display for CapacityVariant {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "ST25DV{:02}K", self.size_kbit())
    }
}

/// Read the capacity code register and map it to a variant
///
/// One bus round-trip. Must run before any user-memory access; the driver
/// does this in [`St25dv::new`](crate::St25dv::new).
#[maybe_async]
pub async fn detect_capacity<B: I2cBus + ?Sized>(bus: &mut B) -> Result<CapacityVariant> {
    let code = codec::get_byte(bus, MEM_SIZE_H).await?;
    let variant = CapacityVariant::from_code(code);
    log::debug!("capacity code 0x{:02X} -> {}", code, variant);
    Ok(variant)
}
