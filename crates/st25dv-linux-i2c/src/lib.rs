//! st25dv-linux-i2c - Linux i2c-dev backend
//!
//! This crate carries ST25DV transactions over the Linux `/dev/i2c-N`
//! character devices using the `I2C_RDWR` ioctl, so the offset header and
//! a read happen under one repeated start.
//!
//! # Example
//!
//! ```no_run
//! use st25dv_core::{DriverConfig, St25dv};
//! use st25dv_linux_i2c::LinuxI2c;
//!
//! let bus = LinuxI2c::open_device("/dev/i2c-1")?;
//! let mut tag = St25dv::new(bus, DriverConfig::default())?;
//! println!("{} UID {:016X}", tag.capacity(), tag.uid()?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Usage with the st25dv CLI
//!
//! ```bash
//! st25dv info -p linux_i2c:dev=/dev/i2c-1
//! st25dv read -p linux_i2c:bus=1 --offset 0 --length 64
//! ```
//!
//! # System Requirements
//!
//! - Linux kernel with `CONFIG_I2C_CHARDEV` (the `i2c-dev` module)
//! - Read/write access to `/dev/i2c-N`, usually via the `i2c` group

pub mod device;
pub mod error;

// Re-exports
pub use device::{parse_options, LinuxI2c, LinuxI2cConfig};
pub use error::{LinuxI2cError, Result};

/// Open a Linux I2C adapter and return a boxed bus
///
/// # Example Options
///
/// - `dev=/dev/i2c-1` - device path
/// - `bus=1` - shorthand for `dev=/dev/i2c-1`
pub fn open_linux_i2c(
    options: &[(&str, &str)],
) -> std::result::Result<Box<dyn st25dv_core::bus::I2cBus + Send>, Box<dyn std::error::Error>> {
    let config = parse_options(options)?;
    let bus = LinuxI2c::open(&config)?;
    Ok(Box::new(bus))
}
