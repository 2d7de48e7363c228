//! Error types for st25dv-core
//!
//! This module provides a no_std compatible error type that can be used
//! throughout the crate.

use core::fmt;

/// Core error type - no_std compatible, Copy for efficiency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    // Bus errors
    /// The device did not acknowledge its address or a data byte
    Nack,
    /// The bus transaction timed out
    Timeout,
    /// The device returned fewer bytes than requested
    ShortRead,
    /// Another master won arbitration on the bus
    ArbitrationLost,
    /// Any other transport failure reported by the bus backend
    BusFault,

    // Access errors
    /// Protected configuration write refused because the I2C security
    /// session is closed (strict access mode only)
    UnauthorizedWrite,
    /// Payload exceeds the target buffer or the transport limit
    PayloadTooLarge,
    /// Argument outside the range accepted by the operation
    InvalidParameter,
}

impl Error {
    /// Returns true for transport-level failures reported by the bus backend
    pub const fn is_bus_error(&self) -> bool {
        matches!(
            self,
            Self::Nack | Self::Timeout | Self::ShortRead | Self::ArbitrationLost | Self::BusFault
        )
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nack => write!(f, "device did not acknowledge"),
            Self::Timeout => write!(f, "bus transaction timed out"),
            Self::ShortRead => write!(f, "device returned fewer bytes than requested"),
            Self::ArbitrationLost => write!(f, "bus arbitration lost"),
            Self::BusFault => write!(f, "bus transfer failed"),
            Self::UnauthorizedWrite => {
                write!(f, "write refused: I2C security session is closed")
            }
            Self::PayloadTooLarge => write!(f, "payload too large"),
            Self::InvalidParameter => write!(f, "invalid parameter"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Result type alias using the core Error type
pub type Result<T> = core::result::Result<T, Error>;
