//! Linux I2C device implementation
//!
//! This module provides the `LinuxI2c` struct that implements the `I2cBus`
//! trait using Linux's i2c-dev interface.

use crate::error::{LinuxI2cError, Result};

use st25dv_core::bus::{default_execute, BusTransaction, I2cBus, HEADER_LEN};
use st25dv_core::error::{Error as CoreError, Result as CoreResult};

use std::fs::{File, OpenOptions};
use std::os::unix::io::AsRawFd;

/// Linux i2c-dev ioctl definitions (from `linux/i2c-dev.h` and `linux/i2c.h`)
mod ioctl {
    use nix::{ioctl_read_bad, ioctl_write_ptr_bad};

    const I2C_FUNCS: u16 = 0x0705;
    const I2C_RDWR: u16 = 0x0707;

    /// Message is a read (slave to master)
    pub const I2C_M_RD: u16 = 0x0001;
    /// Adapter supports plain `i2c_msg` transfers
    pub const I2C_FUNC_I2C: libc::c_ulong = 0x0000_0001;

    /// Kernel `struct i2c_msg`
    #[repr(C)]
    pub struct I2cMsg {
        pub addr: u16,
        pub flags: u16,
        pub len: u16,
        pub buf: *mut u8,
    }

    /// Kernel `struct i2c_rdwr_ioctl_data`
    #[repr(C)]
    pub struct I2cRdwrData {
        pub msgs: *mut I2cMsg,
        pub nmsgs: u32,
    }

    ioctl_read_bad!(i2c_funcs, I2C_FUNCS, libc::c_ulong);
    ioctl_write_ptr_bad!(i2c_rdwr, I2C_RDWR, I2cRdwrData);
}

/// Configuration for opening a Linux I2C adapter
#[derive(Debug, Clone, Default)]
pub struct LinuxI2cConfig {
    /// Device path (e.g., "/dev/i2c-1")
    pub device: String,
}

impl LinuxI2cConfig {
    /// Create a new configuration with the given device path
    pub fn new(device: impl Into<String>) -> Self {
        Self {
            device: device.into(),
        }
    }
}

/// Linux I2C bus using the i2c-dev interface
///
/// Every transaction is a single `I2C_RDWR` call: one write message with
/// the offset header and payload, plus a read message after a repeated
/// start when the transaction reads.
pub struct LinuxI2c {
    /// File handle for the i2c-dev device
    file: File,
    /// Device path, for diagnostics
    path: String,
}

impl LinuxI2c {
    /// Open a Linux I2C adapter with the given configuration
    pub fn open(config: &LinuxI2cConfig) -> Result<Self> {
        if config.device.is_empty() {
            return Err(LinuxI2cError::NoDevice);
        }

        log::debug!("linux_i2c: Opening device {}", config.device);

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&config.device)
            .map_err(|e| LinuxI2cError::OpenFailed {
                path: config.device.clone(),
                source: e,
            })?;

        let mut funcs: libc::c_ulong = 0;
        unsafe {
            ioctl::i2c_funcs(file.as_raw_fd(), &mut funcs).map_err(|e| {
                LinuxI2cError::FuncsFailed(std::io::Error::from_raw_os_error(e as i32))
            })?;
        }
        log::debug!("linux_i2c: Adapter functionality 0x{:08X}", funcs);
        if funcs & ioctl::I2C_FUNC_I2C == 0 {
            return Err(LinuxI2cError::NotSupported(config.device.clone()));
        }

        log::info!("linux_i2c: Opened {}", config.device);

        Ok(Self {
            file,
            path: config.device.clone(),
        })
    }

    /// Open a device with default settings
    pub fn open_device(device: &str) -> Result<Self> {
        Self::open(&LinuxI2cConfig::new(device))
    }

    /// Device path this bus was opened from
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Perform one combined I2C transfer
    fn i2c_transfer(&mut self, addr: u8, write_data: &[u8], read_buf: &mut [u8]) -> Result<()> {
        let write_len = u16::try_from(write_data.len())
            .map_err(|_| LinuxI2cError::MessageTooLong(write_data.len()))?;
        let read_len = u16::try_from(read_buf.len())
            .map_err(|_| LinuxI2cError::MessageTooLong(read_buf.len()))?;

        // The kernel only reads from write buffers; the pointer is mutable
        // because `struct i2c_msg` is shared by both directions.
        let mut msgs = vec![ioctl::I2cMsg {
            addr: u16::from(addr),
            flags: 0,
            len: write_len,
            buf: write_data.as_ptr() as *mut u8,
        }];
        if !read_buf.is_empty() {
            msgs.push(ioctl::I2cMsg {
                addr: u16::from(addr),
                flags: ioctl::I2C_M_RD,
                len: read_len,
                buf: read_buf.as_mut_ptr(),
            });
        }

        let total = msgs.len();
        let data = ioctl::I2cRdwrData {
            msgs: msgs.as_mut_ptr(),
            nmsgs: total as u32,
        };

        let done = unsafe { ioctl::i2c_rdwr(self.file.as_raw_fd(), &data) }.map_err(|e| {
            LinuxI2cError::TransferFailed {
                addr,
                source: std::io::Error::from_raw_os_error(e as i32),
            }
        })?;

        if (done as usize) < total {
            return Err(LinuxI2cError::Incomplete {
                addr,
                done: done as usize,
                total,
            });
        }

        Ok(())
    }
}

impl I2cBus for LinuxI2c {
    fn max_transfer_len(&self) -> usize {
        // i2c_msg.len is 16 bits and the write message carries the header
        usize::from(u16::MAX) - HEADER_LEN
    }

    fn execute(&mut self, txn: &mut BusTransaction<'_>) -> CoreResult<()> {
        let max_len = self.max_transfer_len();
        default_execute(txn, max_len, |device, write_data, read_buf| {
            self.i2c_transfer(device, write_data, read_buf)
                .map_err(|e| {
                    log::trace!("linux_i2c: {}", e);
                    CoreError::from(e)
                })
        })
    }

    fn delay_us(&mut self, us: u32) {
        std::thread::sleep(std::time::Duration::from_micros(us as u64));
    }
}

/// Parse bus options from a list of key-value pairs
pub fn parse_options(options: &[(&str, &str)]) -> std::result::Result<LinuxI2cConfig, String> {
    let mut config = LinuxI2cConfig::default();

    for (key, value) in options {
        match *key {
            "dev" => {
                config.device = value.to_string();
            }
            "bus" => {
                let bus: u32 = value
                    .parse()
                    .map_err(|_| format!("Invalid bus number: {}", value))?;
                config.device = format!("/dev/i2c-{}", bus);
            }
            _ => {
                log::warn!("linux_i2c: Unknown option: {}={}", key, value);
            }
        }
    }

    if config.device.is_empty() {
        return Err("No device specified. Use dev=/dev/i2c-N or bus=N".to_string());
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_options_dev() {
        let config = parse_options(&[("dev", "/dev/i2c-7")]).unwrap();
        assert_eq!(config.device, "/dev/i2c-7");
    }

    #[test]
    fn test_parse_options_bus_number() {
        let config = parse_options(&[("bus", "1")]).unwrap();
        assert_eq!(config.device, "/dev/i2c-1");
        assert!(parse_options(&[("bus", "one")]).is_err());
    }

    #[test]
    fn test_parse_options_requires_device() {
        assert!(parse_options(&[]).is_err());
        assert!(parse_options(&[("speed", "100")]).is_err());
    }

    #[test]
    fn test_open_without_device_fails() {
        assert!(matches!(
            LinuxI2c::open(&LinuxI2cConfig::default()),
            Err(LinuxI2cError::NoDevice)
        ));
    }

    #[test]
    #[ignore = "needs an ST25DV on /dev/i2c-1"]
    fn test_read_capacity_code() {
        use st25dv_core::{DriverConfig, St25dv};

        let bus = LinuxI2c::open_device("/dev/i2c-1").unwrap();
        let mut tag = St25dv::new(bus, DriverConfig::default()).unwrap();
        let uid = tag.uid().unwrap();
        assert_ne!(uid, 0);
    }
}
