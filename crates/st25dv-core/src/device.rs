//! Typed register accessors
//!
//! This module provides `St25dv`, the driver handle that wraps an
//! `I2cBus` together with the detected capacity variant and the injected
//! `DriverConfig`. Every accessor is a fresh bus transaction; nothing read
//! from the tag is cached, because RF activity and field loss change the
//! dynamic registers behind the driver's back.
//!
//! Address validation follows a silent-clamp policy: user-memory offsets
//! past the end of memory and area indices outside a register table never
//! reach the bus. Getters return zero, setters do nothing, and a `debug`
//! log line records the rejected value. The `*_checked` user-memory
//! variants additionally report the clamp to the caller.

use crate::bus::I2cBus;
use crate::codec;
use crate::config::{AccessMode, DriverConfig, WriteTiming};
use crate::error::{Error, Result};
use crate::memory::{self, CapacityVariant};
use crate::regs::zones::{AREA_END, I2C_PROTECTION, RF_PASSWORD_CONTROL, RF_PROTECTION};
use crate::regs::{
    self, bit_of, AreaProtection, EhMode, EnergyHarvestStatus, GpoConfig, InterruptStatus,
    Register, RfManagement, RfPasswordControl, Space, ZoneTable,
};
use maybe_async::maybe_async;

/// ST25DV driver handle
///
/// # Example
///
/// ```ignore
/// use st25dv_core::{DriverConfig, St25dv};
///
/// fn greet<B: I2cBus>(bus: B) -> st25dv_core::Result<()> {
///     let mut tag = St25dv::new(bus, DriverConfig::default())?;
///     tag.write_byte(0x0000, b'h')?;
///     tag.write_byte(0x0001, b'i')?;
///     assert_eq!(tag.read_byte(0x0000)?, b'h');
///     Ok(())
/// }
/// ```
pub struct St25dv<B: I2cBus> {
    bus: B,
    capacity: CapacityVariant,
    config: DriverConfig,
}

impl<B: I2cBus> St25dv<B> {
    /// Create a driver for a tag whose capacity is already known
    ///
    /// Skips the detection round-trip of [`St25dv::new`]. The boundary is
    /// fixed for the lifetime of the handle.
    pub fn with_capacity(bus: B, capacity: CapacityVariant, config: DriverConfig) -> Self {
        Self {
            bus,
            capacity,
            config,
        }
    }

    /// Detected capacity variant
    pub fn capacity(&self) -> CapacityVariant {
        self.capacity
    }

    /// Exclusive upper bound of byte-addressed user memory
    pub fn user_memory_end(&self) -> u16 {
        self.capacity.user_memory_end()
    }

    /// Active configuration
    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// Get a reference to the underlying bus
    pub fn bus(&self) -> &B {
        &self.bus
    }

    /// Get a mutable reference to the underlying bus
    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    /// Consume the driver and return the bus
    pub fn release(self) -> B {
        self.bus
    }
}

#[maybe_async]
impl<B: I2cBus> St25dv<B> {
    /// Create a driver, detecting the capacity variant
    ///
    /// Reads the capacity code register once; the resulting user-memory
    /// boundary is never recomputed.
    pub async fn new(mut bus: B, config: DriverConfig) -> Result<Self> {
        let capacity = memory::detect_capacity(&mut bus).await?;
        log::info!(
            "{} detected ({} bytes of user memory)",
            capacity,
            capacity.user_memory_size()
        );
        Ok(Self::with_capacity(bus, capacity, config))
    }

    // =========================================================================
    // Write plumbing
    // =========================================================================

    /// Wait for EEPROM programming after writing `len` bytes at `reg`
    pub(crate) async fn settle(&mut self, reg: Register, len: usize) {
        if !reg.is_non_volatile() {
            return;
        }
        if let WriteTiming::BuiltIn(delays) = self.config.timing {
            let ms = delays.write_settle_ms(len);
            log::trace!("settle {} ms after writing {}", ms, reg);
            self.bus.delay_us(ms.saturating_mul(1000)).await;
        }
    }

    /// Fail fast on configuration writes in strict mode while locked
    pub(crate) async fn ensure_writable(&mut self, reg: Register) -> Result<()> {
        if reg.space != Space::System || self.config.access != AccessMode::Strict {
            return Ok(());
        }
        if self.is_unlocked().await? {
            Ok(())
        } else {
            log::warn!("refusing write to {}: I2C security session closed", reg);
            Err(Error::UnauthorizedWrite)
        }
    }

    async fn write_byte_at(&mut self, reg: Register, value: u8) -> Result<()> {
        self.ensure_writable(reg).await?;
        codec::set_byte(&mut self.bus, reg, value).await?;
        self.settle(reg, 1).await;
        Ok(())
    }

    async fn update_bits_at(&mut self, reg: Register, mask: u8, value: u8) -> Result<()> {
        self.ensure_writable(reg).await?;
        codec::update_bits(&mut self.bus, reg, mask, value).await?;
        self.settle(reg, 1).await;
        Ok(())
    }

    async fn set_bit_at(&mut self, reg: Register, bit: u8, set: bool) -> Result<()> {
        self.update_bits_at(reg, 1 << bit, if set { 0xFF } else { 0 }).await
    }

    pub(crate) async fn write_word64_at(&mut self, reg: Register, value: u64) -> Result<()> {
        self.ensure_writable(reg).await?;
        codec::set_word64(&mut self.bus, reg, value).await?;
        self.settle(reg, 8).await;
        Ok(())
    }

    pub(crate) async fn get_byte(&mut self, reg: Register) -> Result<u8> {
        codec::get_byte(&mut self.bus, reg).await
    }

    pub(crate) async fn get_bit(&mut self, reg: Register, bit: u8) -> Result<bool> {
        codec::get_bit(&mut self.bus, reg, bit).await
    }

    // =========================================================================
    // User memory
    // =========================================================================

    /// Read a user-memory byte, or `None` if `offset` is past the end
    ///
    /// No bus transaction is issued for an out-of-range offset.
    pub async fn read_byte_checked(&mut self, offset: u16) -> Result<Option<u8>> {
        if !self.capacity.contains(offset) {
            log::debug!(
                "read at 0x{:04X} clamped (user memory ends at 0x{:04X})",
                offset,
                self.user_memory_end()
            );
            return Ok(None);
        }
        let value = codec::get_byte(&mut self.bus, Register::user(offset)).await?;
        Ok(Some(value))
    }

    /// Read a user-memory byte; returns 0 past the end of memory
    pub async fn read_byte(&mut self, offset: u16) -> Result<u8> {
        Ok(self.read_byte_checked(offset).await?.unwrap_or(0))
    }

    /// Write a user-memory byte, returning false if `offset` is past the end
    ///
    /// No bus transaction is issued for an out-of-range offset.
    pub async fn write_byte_checked(&mut self, offset: u16, value: u8) -> Result<bool> {
        if !self.capacity.contains(offset) {
            log::debug!(
                "write at 0x{:04X} dropped (user memory ends at 0x{:04X})",
                offset,
                self.user_memory_end()
            );
            return Ok(false);
        }
        self.write_byte_at(Register::user(offset), value).await?;
        Ok(true)
    }

    /// Write a user-memory byte; silently dropped past the end of memory
    pub async fn write_byte(&mut self, offset: u16, value: u8) -> Result<()> {
        self.write_byte_checked(offset, value).await?;
        Ok(())
    }

    /// Read consecutive user-memory bytes, one transaction per byte
    ///
    /// Stops at the end of memory and returns the number of bytes read.
    pub async fn read_user(&mut self, offset: u16, buf: &mut [u8]) -> Result<usize> {
        let mut count = 0;
        for (i, slot) in buf.iter_mut().enumerate() {
            let Some(addr) = u16::try_from(i).ok().and_then(|i| offset.checked_add(i)) else {
                break;
            };
            match self.read_byte_checked(addr).await? {
                Some(value) => *slot = value,
                None => break,
            }
            count += 1;
        }
        Ok(count)
    }

    /// Write consecutive user-memory bytes, one transaction per byte
    ///
    /// Stops at the end of memory and returns the number of bytes written.
    pub async fn write_user(&mut self, offset: u16, data: &[u8]) -> Result<usize> {
        let mut count = 0;
        for (i, &value) in data.iter().enumerate() {
            let Some(addr) = u16::try_from(i).ok().and_then(|i| offset.checked_add(i)) else {
                break;
            };
            if !self.write_byte_checked(addr, value).await? {
                break;
            }
            count += 1;
        }
        Ok(count)
    }

    // =========================================================================
    // Dynamic registers
    // =========================================================================

    /// GPO output enable (`GPO_CTRL_Dyn` bit 7)
    pub async fn gpo_enabled_dyn(&mut self) -> Result<bool> {
        self.get_bit(regs::GPO_CTRL_DYN, regs::GPO_ENABLE_BIT).await
    }

    /// Enable or disable the GPO output until the next boot
    pub async fn set_gpo_enabled_dyn(&mut self, enable: bool) -> Result<()> {
        self.set_bit_at(regs::GPO_CTRL_DYN, regs::GPO_ENABLE_BIT, enable).await
    }

    /// GPO interrupt sources (`GPO_CTRL_Dyn` bits 0-6)
    pub async fn gpo_mode_dyn(&mut self) -> Result<GpoConfig> {
        let raw = self.get_byte(regs::GPO_CTRL_DYN).await?;
        Ok(GpoConfig::from_bits_truncate(raw) & GpoConfig::MODE)
    }

    /// Replace the GPO interrupt sources, keeping the enable bit
    pub async fn set_gpo_mode_dyn(&mut self, mode: GpoConfig) -> Result<()> {
        let mask = GpoConfig::MODE.bits();
        self.update_bits_at(regs::GPO_CTRL_DYN, mask, mode.bits()).await
    }

    /// Energy harvesting control and status flags
    pub async fn energy_harvest_status(&mut self) -> Result<EnergyHarvestStatus> {
        let raw = self.get_byte(regs::EH_CTRL_DYN).await?;
        Ok(EnergyHarvestStatus::from_bits_truncate(raw))
    }

    /// Energy harvesting enable (`EH_EN`)
    pub async fn eh_enabled(&mut self) -> Result<bool> {
        let bit = bit_of(EnergyHarvestStatus::EH_EN.bits());
        self.get_bit(regs::EH_CTRL_DYN, bit).await
    }

    /// Enable or disable energy harvesting
    pub async fn set_eh_enabled(&mut self, enable: bool) -> Result<()> {
        let bit = bit_of(EnergyHarvestStatus::EH_EN.bits());
        self.set_bit_at(regs::EH_CTRL_DYN, bit, enable).await
    }

    /// Energy harvesting output active (`EH_ON`)
    pub async fn eh_active(&mut self) -> Result<bool> {
        let bit = bit_of(EnergyHarvestStatus::EH_ON.bits());
        self.get_bit(regs::EH_CTRL_DYN, bit).await
    }

    /// RF field present (`FIELD_ON`)
    pub async fn rf_field_present(&mut self) -> Result<bool> {
        let bit = bit_of(EnergyHarvestStatus::FIELD_ON.bits());
        self.get_bit(regs::EH_CTRL_DYN, bit).await
    }

    /// VCC supply present (`VCC_ON`)
    pub async fn vcc_on(&mut self) -> Result<bool> {
        let bit = bit_of(EnergyHarvestStatus::VCC_ON.bits());
        self.get_bit(regs::EH_CTRL_DYN, bit).await
    }

    /// Current RF management flags
    pub async fn rf_management_dyn(&mut self) -> Result<RfManagement> {
        let raw = self.get_byte(regs::RF_MNGT_DYN).await?;
        Ok(RfManagement::from_bits_truncate(raw))
    }

    /// RF disabled until the next boot
    pub async fn rf_disabled_dyn(&mut self) -> Result<bool> {
        let bit = bit_of(RfManagement::RF_DISABLE.bits());
        self.get_bit(regs::RF_MNGT_DYN, bit).await
    }

    /// Disable or enable RF commands until the next boot
    pub async fn set_rf_disabled_dyn(&mut self, disable: bool) -> Result<()> {
        let bit = bit_of(RfManagement::RF_DISABLE.bits());
        self.set_bit_at(regs::RF_MNGT_DYN, bit, disable).await
    }

    /// RF interface asleep until the next boot
    pub async fn rf_sleep_dyn(&mut self) -> Result<bool> {
        let bit = bit_of(RfManagement::RF_SLEEP.bits());
        self.get_bit(regs::RF_MNGT_DYN, bit).await
    }

    /// Put the RF interface to sleep or wake it until the next boot
    pub async fn set_rf_sleep_dyn(&mut self, sleep: bool) -> Result<()> {
        let bit = bit_of(RfManagement::RF_SLEEP.bits());
        self.set_bit_at(regs::RF_MNGT_DYN, bit, sleep).await
    }

    /// Pending interrupt sources
    ///
    /// The tag clears `IT_STS_Dyn` when it is read, so each call returns
    /// only the events since the previous one.
    pub async fn interrupt_status(&mut self) -> Result<InterruptStatus> {
        let raw = self.get_byte(regs::IT_STS_DYN).await?;
        Ok(InterruptStatus::from_bits_truncate(raw))
    }

    // =========================================================================
    // System configuration
    // =========================================================================

    /// GPO configuration applied at boot
    pub async fn gpo_config(&mut self) -> Result<GpoConfig> {
        let raw = self.get_byte(regs::GPO).await?;
        Ok(GpoConfig::from_bits_truncate(raw))
    }

    /// Replace the whole GPO configuration
    pub async fn set_gpo_config(&mut self, config: GpoConfig) -> Result<()> {
        self.write_byte_at(regs::GPO, config.bits()).await
    }

    /// GPO output enabled at boot (`GPO` bit 7)
    pub async fn gpo_enabled(&mut self) -> Result<bool> {
        self.get_bit(regs::GPO, regs::GPO_ENABLE_BIT).await
    }

    /// Set the boot-time GPO enable, keeping the interrupt sources
    pub async fn set_gpo_enabled(&mut self, enable: bool) -> Result<()> {
        self.set_bit_at(regs::GPO, regs::GPO_ENABLE_BIT, enable).await
    }

    /// Interrupt pulse duration code (`IT_TIME` bits 0-2)
    pub async fn interrupt_pulse(&mut self) -> Result<u8> {
        Ok(self.get_byte(regs::IT_TIME).await? & regs::IT_TIME_MASK)
    }

    /// Set the interrupt pulse duration code (0-7)
    pub async fn set_interrupt_pulse(&mut self, code: u8) -> Result<()> {
        self.update_bits_at(regs::IT_TIME, regs::IT_TIME_MASK, code).await
    }

    /// Energy harvesting mode at boot
    pub async fn eh_mode(&mut self) -> Result<EhMode> {
        let bit = self.get_bit(regs::EH_MODE, regs::EH_MODE_BIT).await?;
        Ok(EhMode::from_bit(bit))
    }

    /// Set the energy harvesting mode at boot
    pub async fn set_eh_mode(&mut self, mode: EhMode) -> Result<()> {
        self.set_bit_at(regs::EH_MODE, regs::EH_MODE_BIT, mode.bit()).await
    }

    /// RF management flags applied at boot
    pub async fn rf_management(&mut self) -> Result<RfManagement> {
        let raw = self.get_byte(regs::RF_MNGT).await?;
        Ok(RfManagement::from_bits_truncate(raw))
    }

    /// RF disabled at boot
    pub async fn rf_disabled(&mut self) -> Result<bool> {
        let bit = bit_of(RfManagement::RF_DISABLE.bits());
        self.get_bit(regs::RF_MNGT, bit).await
    }

    /// Set whether RF is disabled at boot
    pub async fn set_rf_disabled(&mut self, disable: bool) -> Result<()> {
        let bit = bit_of(RfManagement::RF_DISABLE.bits());
        self.set_bit_at(regs::RF_MNGT, bit, disable).await
    }

    /// RF asleep at boot
    pub async fn rf_sleep(&mut self) -> Result<bool> {
        let bit = bit_of(RfManagement::RF_SLEEP.bits());
        self.get_bit(regs::RF_MNGT, bit).await
    }

    /// Set whether RF is asleep at boot
    pub async fn set_rf_sleep(&mut self, sleep: bool) -> Result<()> {
        let bit = bit_of(RfManagement::RF_SLEEP.bits());
        self.set_bit_at(regs::RF_MNGT, bit, sleep).await
    }

    async fn read_zone(&mut self, table: &ZoneTable, area: u8) -> Result<u8> {
        let Some(field) = table.lookup(area) else {
            log::debug!("{}: invalid area {} (1-{})", table.name, area, table.areas());
            return Ok(0);
        };
        let raw = self.get_byte(field.reg).await?;
        Ok(field.extract(raw))
    }

    async fn write_zone(&mut self, table: &ZoneTable, area: u8, value: u8) -> Result<()> {
        let Some(field) = table.lookup(area) else {
            log::debug!("{}: invalid area {} (1-{})", table.name, area, table.areas());
            return Ok(());
        };
        if field.width_mask == 0xFF {
            self.write_byte_at(field.reg, value).await
        } else {
            self.update_bits_at(field.reg, field.mask(), value << field.shift).await
        }
    }

    /// End of area `area` (1-3) in 32-byte blocks; 0 for other indices
    pub async fn area_end(&mut self, area: u8) -> Result<u8> {
        self.read_zone(&AREA_END, area).await
    }

    /// Set the end of area `area` (1-3); no-op for other indices
    pub async fn set_area_end(&mut self, area: u8, end: u8) -> Result<()> {
        self.write_zone(&AREA_END, area, end).await
    }

    /// RF password guarding area `area` (1-4)
    pub async fn rf_password_control(&mut self, area: u8) -> Result<RfPasswordControl> {
        let bits = self.read_zone(&RF_PASSWORD_CONTROL, area).await?;
        Ok(RfPasswordControl::from_bits(bits))
    }

    /// Select the RF password guarding area `area` (1-4)
    pub async fn set_rf_password_control(
        &mut self,
        area: u8,
        control: RfPasswordControl,
    ) -> Result<()> {
        self.write_zone(&RF_PASSWORD_CONTROL, area, control.bits()).await
    }

    /// RF read/write protection of area `area` (1-4)
    pub async fn rf_protection(&mut self, area: u8) -> Result<AreaProtection> {
        let bits = self.read_zone(&RF_PROTECTION, area).await?;
        Ok(AreaProtection::from_bits(bits))
    }

    /// Set the RF read/write protection of area `area` (1-4)
    pub async fn set_rf_protection(&mut self, area: u8, protection: AreaProtection) -> Result<()> {
        self.write_zone(&RF_PROTECTION, area, protection.bits()).await
    }

    /// I2C read/write protection of area `area` (1-4)
    pub async fn i2c_protection(&mut self, area: u8) -> Result<AreaProtection> {
        let bits = self.read_zone(&I2C_PROTECTION, area).await?;
        Ok(AreaProtection::from_bits(bits))
    }

    /// Set the I2C read/write protection of area `area` (1-4)
    ///
    /// Only the two bits of `area` within the shared `I2CSS` byte change.
    pub async fn set_i2c_protection(&mut self, area: u8, protection: AreaProtection) -> Result<()> {
        self.write_zone(&I2C_PROTECTION, area, protection.bits()).await
    }

    /// Capability container lock bits (bit 0: block 0, bit 1: block 1)
    pub async fn cc_file_lock(&mut self) -> Result<u8> {
        Ok(self.get_byte(regs::LOCK_CCFILE).await? & regs::LOCK_CCFILE_MASK)
    }

    /// Set the capability container lock bits
    pub async fn set_cc_file_lock(&mut self, locks: u8) -> Result<()> {
        self.update_bits_at(regs::LOCK_CCFILE, regs::LOCK_CCFILE_MASK, locks).await
    }

    /// Fast transfer mode authorized (`MB_MODE`)
    pub async fn mailbox_mode(&mut self) -> Result<bool> {
        self.get_bit(regs::MB_MODE, regs::MB_MODE_BIT).await
    }

    /// Authorize or forbid fast transfer mode
    pub async fn set_mailbox_mode(&mut self, allowed: bool) -> Result<()> {
        self.set_bit_at(regs::MB_MODE, regs::MB_MODE_BIT, allowed).await
    }

    /// Mailbox message watchdog code (`MB_WDG` bits 0-2)
    pub async fn mailbox_watchdog(&mut self) -> Result<u8> {
        Ok(self.get_byte(regs::MB_WDG).await? & regs::MB_WDG_MASK)
    }

    /// Set the mailbox message watchdog code (0-7, 0 disables)
    pub async fn set_mailbox_watchdog(&mut self, code: u8) -> Result<()> {
        self.update_bits_at(regs::MB_WDG, regs::MB_WDG_MASK, code).await
    }

    /// Configuration locked against RF changes (`LOCK_CFG`)
    pub async fn config_locked(&mut self) -> Result<bool> {
        self.get_bit(regs::LOCK_CFG, regs::LOCK_CFG_BIT).await
    }

    /// Lock or unlock the configuration against RF changes
    pub async fn set_config_locked(&mut self, locked: bool) -> Result<()> {
        self.set_bit_at(regs::LOCK_CFG, regs::LOCK_CFG_BIT, locked).await
    }

    // =========================================================================
    // Identification (read-only)
    // =========================================================================

    /// DSFID lock status
    pub async fn dsfid_lock(&mut self) -> Result<u8> {
        self.get_byte(regs::LOCK_DSFID).await
    }

    /// AFI lock status
    pub async fn afi_lock(&mut self) -> Result<u8> {
        self.get_byte(regs::LOCK_AFI).await
    }

    /// Data storage format identifier
    pub async fn dsfid(&mut self) -> Result<u8> {
        self.get_byte(regs::DSFID).await
    }

    /// Application family identifier
    pub async fn afi(&mut self) -> Result<u8> {
        self.get_byte(regs::AFI).await
    }

    /// Raw `MEM_SIZE` (number of blocks minus one)
    pub async fn mem_blocks(&mut self) -> Result<u16> {
        codec::get_word16(&mut self.bus, regs::MEM_SIZE).await
    }

    /// Raw `BLK_SIZE` (block size in bytes minus one)
    pub async fn block_size(&mut self) -> Result<u8> {
        self.get_byte(regs::BLK_SIZE).await
    }

    /// IC reference
    pub async fn ic_ref(&mut self) -> Result<u8> {
        self.get_byte(regs::IC_REF).await
    }

    /// 64-bit unique identifier
    pub async fn uid(&mut self) -> Result<u64> {
        codec::get_word64(&mut self.bus, regs::UID).await
    }

    /// IC revision
    pub async fn revision(&mut self) -> Result<u8> {
        self.get_byte(regs::IC_REV).await
    }
}
