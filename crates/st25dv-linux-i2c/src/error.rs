//! Error types for Linux I2C operations

use st25dv_core::Error as CoreError;
use thiserror::Error;

/// Linux I2C specific errors
#[derive(Debug, Error)]
pub enum LinuxI2cError {
    /// Failed to open device
    #[error("Failed to open {path}: {source}")]
    OpenFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to query adapter functionality
    #[error("Failed to query adapter functionality: {0}")]
    FuncsFailed(#[source] std::io::Error),

    /// Adapter cannot issue plain I2C messages
    #[error("{0} does not support plain I2C transfers (I2C_FUNC_I2C)")]
    NotSupported(String),

    /// Transfer failed
    #[error("I2C transfer to 0x{addr:02X} failed: {source}")]
    TransferFailed {
        addr: u8,
        #[source]
        source: std::io::Error,
    },

    /// Fewer messages completed than were submitted
    #[error("I2C transfer to 0x{addr:02X} completed {done} of {total} messages")]
    Incomplete { addr: u8, done: usize, total: usize },

    /// Message longer than the i2c-dev interface can describe
    #[error("Message of {0} bytes exceeds the I2C message length limit")]
    MessageTooLong(usize),

    /// Device not specified
    #[error("No device specified. Use dev=/dev/i2c-N")]
    NoDevice,
}

impl From<LinuxI2cError> for CoreError {
    fn from(err: LinuxI2cError) -> Self {
        match err {
            LinuxI2cError::TransferFailed { source, .. } => {
                match source.raw_os_error() {
                    Some(libc::ENXIO) | Some(libc::EREMOTEIO) => CoreError::Nack,
                    Some(libc::ETIMEDOUT) => CoreError::Timeout,
                    Some(libc::EAGAIN) => CoreError::ArbitrationLost,
                    _ => CoreError::BusFault,
                }
            }
            LinuxI2cError::Incomplete { .. } => CoreError::ShortRead,
            LinuxI2cError::MessageTooLong(_) => CoreError::PayloadTooLarge,
            _ => CoreError::BusFault,
        }
    }
}

/// Result type for Linux I2C operations
pub type Result<T> = std::result::Result<T, LinuxI2cError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn transfer_error(errno: i32) -> CoreError {
        LinuxI2cError::TransferFailed {
            addr: 0x53,
            source: std::io::Error::from_raw_os_error(errno),
        }
        .into()
    }

    #[test]
    fn test_errno_mapping() {
        assert_eq!(transfer_error(libc::ENXIO), CoreError::Nack);
        assert_eq!(transfer_error(libc::EREMOTEIO), CoreError::Nack);
        assert_eq!(transfer_error(libc::ETIMEDOUT), CoreError::Timeout);
        assert_eq!(transfer_error(libc::EAGAIN), CoreError::ArbitrationLost);
        assert_eq!(transfer_error(libc::EIO), CoreError::BusFault);
    }

    #[test]
    fn test_incomplete_is_short_read() {
        let err = LinuxI2cError::Incomplete {
            addr: 0x57,
            done: 1,
            total: 2,
        };
        assert_eq!(CoreError::from(err), CoreError::ShortRead);
    }
}
