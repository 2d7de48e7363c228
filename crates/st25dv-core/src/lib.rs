//! st25dv-core - Register access layer for ST25DV dynamic NFC tags
//!
//! The ST25DV04K/16K/64K family exposes user EEPROM, volatile "dynamic"
//! registers, a 256-byte fast-transfer mailbox and a password-protected
//! system configuration area over two I2C device addresses. This crate
//! turns raw addressed transactions into typed register accessors and is
//! `no_std` compatible for use in embedded environments.
//!
//! # Features
//!
//! - `std` - Enable standard library support (includes `alloc`)
//! - `alloc` - Enable heap allocation for the transaction helpers
//! - `is_sync` - Compile every bus operation as a blocking call
//!
//! # Example
//!
//! ```ignore
//! use st25dv_core::{bus::I2cBus, DriverConfig, St25dv};
//!
//! fn dump_id<B: I2cBus>(bus: B) -> st25dv_core::Result<()> {
//!     let mut tag = St25dv::new(bus, DriverConfig::default())?;
//!     println!("{} UID {:016X}", tag.capacity(), tag.uid()?);
//!     if tag.present_password(0)? {
//!         tag.set_area_end(1, 0x0F)?;
//!     }
//!     Ok(())
//! }
//! ```

#![no_std]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
// Allow async fn in traits - we use maybe-async for dual sync/async support
#![allow(async_fn_in_trait)]

#[cfg(feature = "alloc")]
extern crate alloc;

#[cfg(any(feature = "std", test))]
extern crate std;

pub mod bus;
pub mod codec;
pub mod config;
pub mod device;
pub mod error;
mod mailbox;
pub mod memory;
pub mod regs;
mod security;

pub use config::{AccessMode, DriverConfig, SettleDelays, WriteTiming};
pub use device::St25dv;
pub use error::{Error, Result};
pub use memory::CapacityVariant;
