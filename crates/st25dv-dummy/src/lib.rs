//! st25dv-dummy - In-memory ST25DV tag emulator for testing
//!
//! This crate provides a bus backend that emulates the register file of an
//! ST25DV04K/16K/64K tag in memory: user EEPROM, the dynamic registers,
//! the fast transfer mailbox, the system configuration area and the I2C
//! password with its security session. It's useful for testing and
//! development without real hardware.
//!
//! Every transaction is recorded so tests can assert on bus traffic, and
//! delays are accumulated instead of slept.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

use alloc::format;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use st25dv_core::bus::{BusTransaction, I2cBus, SYSTEM_ADDRESS, USER_ADDRESS};
use st25dv_core::error::{Error, Result};
use st25dv_core::memory::CapacityVariant;
use st25dv_core::regs::zones::{area_end_address, I2C_PROTECTION};
use st25dv_core::regs::{
    self, AreaProtection, EnergyHarvestStatus, InterruptStatus, MailboxStatus, PWD_PRESENT_CODE,
};

/// Size of the emulated system configuration area (`0x0000..=0x0027`)
pub const SYSTEM_AREA_LEN: usize = 0x28;

/// First identification register; everything from here on is read-only
const READ_ONLY_START: u16 = regs::LOCK_DSFID.offset;

/// Configuration for the emulated tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DummyConfig {
    /// Memory size variant
    pub capacity: CapacityVariant,
    /// Initial I2C password
    pub password: u64,
    /// 64-bit unique identifier
    pub uid: u64,
    /// IC reference byte
    pub ic_ref: u8,
    /// IC revision byte
    pub revision: u8,
}

impl DummyConfig {
    /// Factory defaults for the given variant
    pub fn new(capacity: CapacityVariant) -> Self {
        let ic_ref = match capacity {
            CapacityVariant::K04 => 0x24,
            CapacityVariant::K16 | CapacityVariant::K64 => 0x26,
        };
        Self {
            capacity,
            password: 0,
            uid: 0xE002_2600_1234_5678,
            ic_ref,
            revision: 0x11,
        }
    }

    /// Set the initial I2C password
    pub fn with_password(mut self, password: u64) -> Self {
        self.password = password;
        self
    }
}

impl Default for DummyConfig {
    fn default() -> Self {
        Self::new(CapacityVariant::default())
    }
}

/// Parse `key=value` backend options into a [`DummyConfig`]
///
/// Recognized keys: `size` (`4k`, `16k`, `64k`), `password` and `uid`
/// (decimal or `0x` hexadecimal).
pub fn parse_options(options: &[(&str, &str)]) -> core::result::Result<DummyConfig, String> {
    let mut config = DummyConfig::default();

    if let Some((_, size)) = options.iter().find(|(k, _)| *k == "size") {
        let capacity = match size.to_ascii_lowercase().as_str() {
            "4k" | "04k" | "4" => CapacityVariant::K04,
            "16k" | "16" => CapacityVariant::K16,
            "64k" | "64" => CapacityVariant::K64,
            other => return Err(format!("unknown size '{}' (expected 4k, 16k or 64k)", other)),
        };
        config = DummyConfig::new(capacity);
    }

    for (key, value) in options {
        match *key {
            "size" => {}
            "password" => config.password = parse_u64(value)?,
            "uid" => config.uid = parse_u64(value)?,
            other => return Err(format!("unknown option '{}'", other)),
        }
    }

    Ok(config)
}

fn parse_u64(s: &str) -> core::result::Result<u64, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid number '{}': {}", s, e))
}

/// Direction of a recorded transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionKind {
    /// Write of the offset header, then a repeated-start read
    Read,
    /// Write of the offset header followed by payload bytes
    Write,
}

/// A transaction seen by the emulator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    /// Read or write
    pub kind: TransactionKind,
    /// 7-bit device address
    pub device: u8,
    /// Register offset from the header
    pub offset: u16,
    /// Bytes written, or bytes returned for a successful read
    pub data: Vec<u8>,
}

/// Emulated ST25DV tag
pub struct DummyTag {
    config: DummyConfig,
    user: Vec<u8>,
    system: [u8; SYSTEM_AREA_LEN],
    password: u64,
    session_open: bool,
    rf_field: bool,
    gpo_ctrl_dyn: u8,
    eh_ctrl_dyn: u8,
    rf_mngt_dyn: u8,
    it_sts_dyn: u8,
    mb_ctrl_dyn: u8,
    mb_len_dyn: u8,
    mailbox: [u8; regs::MAILBOX_SIZE],
    transactions: Vec<Transaction>,
    total_delay_us: u64,
    pending_fault: Option<Error>,
}

impl DummyTag {
    /// Create a tag in its factory state, freshly powered
    pub fn new(config: DummyConfig) -> Self {
        let capacity = config.capacity;
        let mut system = [0u8; SYSTEM_AREA_LEN];

        let last_block = (capacity.last_user_address() / regs::zones::AREA_BLOCK_SIZE) as u8;
        system[regs::GPO.offset as usize] = 0x88;
        system[regs::IT_TIME.offset as usize] = 0x03;
        system[regs::EH_MODE.offset as usize] = 0x01;
        system[regs::ENDA1.offset as usize] = last_block;
        system[regs::ENDA2.offset as usize] = last_block;
        system[regs::ENDA3.offset as usize] = last_block;
        system[regs::MB_WDG.offset as usize] = 0x07;
        system[regs::DSFID.offset as usize] = 0xFF;

        // Block count minus one, stored low byte first; the high byte is
        // the capacity code.
        let blocks = (capacity.user_memory_size() / 4 - 1) as u16;
        let [lo, hi] = blocks.to_le_bytes();
        system[regs::MEM_SIZE.offset as usize] = lo;
        system[regs::MEM_SIZE_H.offset as usize] = hi;
        system[regs::BLK_SIZE.offset as usize] = 0x03;
        system[regs::IC_REF.offset as usize] = config.ic_ref;
        let uid = regs::UID.offset as usize;
        system[uid..uid + 8].copy_from_slice(&config.uid.to_be_bytes());
        system[regs::IC_REV.offset as usize] = config.revision;

        let mut tag = Self {
            user: vec![0u8; capacity.user_memory_size()],
            system,
            password: config.password,
            session_open: false,
            rf_field: false,
            gpo_ctrl_dyn: 0,
            eh_ctrl_dyn: 0,
            rf_mngt_dyn: 0,
            it_sts_dyn: 0,
            mb_ctrl_dyn: 0,
            mb_len_dyn: 0,
            mailbox: [0u8; regs::MAILBOX_SIZE],
            transactions: Vec::new(),
            total_delay_us: 0,
            pending_fault: None,
            config,
        };
        tag.reload_dynamic();
        tag
    }

    /// Create a factory-state 04K tag with password 0
    pub fn new_default() -> Self {
        Self::new(DummyConfig::default())
    }

    /// Get the configuration
    pub fn config(&self) -> &DummyConfig {
        &self.config
    }

    /// Get a reference to user memory
    pub fn user_memory(&self) -> &[u8] {
        &self.user
    }

    /// Get a mutable reference to user memory
    pub fn user_memory_mut(&mut self) -> &mut [u8] {
        &mut self.user
    }

    /// Get a reference to the system configuration area
    pub fn system_area(&self) -> &[u8] {
        &self.system
    }

    /// Get a mutable reference to the system configuration area
    ///
    /// Bypasses the security session, for setting up test fixtures.
    pub fn system_area_mut(&mut self) -> &mut [u8] {
        &mut self.system
    }

    /// Currently stored I2C password
    pub fn password(&self) -> u64 {
        self.password
    }

    /// Whether the I2C security session is open
    pub fn session_open(&self) -> bool {
        self.session_open
    }

    /// All transactions since creation or the last [`DummyTag::clear_transactions`]
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Forget recorded transactions
    pub fn clear_transactions(&mut self) {
        self.transactions.clear();
    }

    /// Sum of all requested delays, in microseconds
    pub fn total_delay_us(&self) -> u64 {
        self.total_delay_us
    }

    /// Fail the next transaction with `error`
    pub fn fail_next(&mut self, error: Error) {
        self.pending_fault = Some(error);
    }

    /// Remove and reapply power
    ///
    /// Closes the security session, discards the mailbox and pending
    /// interrupts, and reloads the dynamic registers from configuration.
    pub fn power_cycle(&mut self) {
        log::debug!("dummy: power cycle");
        self.session_open = false;
        self.reload_dynamic();
    }

    /// Bring an RF field up or down
    ///
    /// Updates `FIELD_ON` and latches the matching field interrupt.
    pub fn set_rf_field(&mut self, present: bool) {
        if self.rf_field == present {
            return;
        }
        self.rf_field = present;
        let event = if present {
            InterruptStatus::FIELD_RISING
        } else {
            InterruptStatus::FIELD_FALLING
        };
        self.it_sts_dyn |= event.bits();
        self.refresh_energy_harvesting();
    }

    /// Put a message into the mailbox from the RF side
    ///
    /// Returns false if the mailbox is disabled or already holds a message.
    pub fn rf_put_message(&mut self, message: &[u8]) -> bool {
        if !self.mailbox_enabled()
            || self.message_pending()
            || message.is_empty()
            || message.len() > regs::MAILBOX_SIZE
        {
            return false;
        }
        self.mailbox[..message.len()].copy_from_slice(message);
        self.mb_len_dyn = (message.len() - 1) as u8;
        self.mb_ctrl_dyn = MailboxStatus::MB_EN.bits()
            | MailboxStatus::RF_PUT_MSG.bits()
            | MailboxStatus::RF_CURRENT_MSG.bits();
        self.it_sts_dyn |= InterruptStatus::RF_PUT_MSG.bits();
        true
    }

    /// Take the host's message out of the mailbox from the RF side
    pub fn rf_take_message(&mut self) -> Option<Vec<u8>> {
        let status = MailboxStatus::from_bits_truncate(self.mb_ctrl_dyn);
        if !status.contains(MailboxStatus::HOST_PUT_MSG) {
            return None;
        }
        let len = usize::from(self.mb_len_dyn) + 1;
        let message = self.mailbox[..len].to_vec();
        self.mb_ctrl_dyn &= !MailboxStatus::HOST_PUT_MSG.bits();
        self.it_sts_dyn |= InterruptStatus::RF_GET_MSG.bits();
        Some(message)
    }

    /// Let the mailbox watchdog expire on the pending message
    ///
    /// An unread host message sets `HOST_MISS_MSG`, an unread RF message
    /// sets `RF_MISS_MSG`; either way the message is released. Returns
    /// false if no message was pending.
    pub fn expire_mailbox_watchdog(&mut self) -> bool {
        let status = MailboxStatus::from_bits_truncate(self.mb_ctrl_dyn);
        let missed = if status.contains(MailboxStatus::HOST_PUT_MSG) {
            MailboxStatus::HOST_MISS_MSG
        } else if status.contains(MailboxStatus::RF_PUT_MSG) {
            MailboxStatus::RF_MISS_MSG
        } else {
            return false;
        };
        let released = MailboxStatus::HOST_PUT_MSG | MailboxStatus::RF_PUT_MSG;
        self.mb_ctrl_dyn = (self.mb_ctrl_dyn & !released.bits()) | missed.bits();
        true
    }

    fn sys(&self, reg: regs::Register) -> u8 {
        self.system[reg.offset as usize]
    }

    fn reload_dynamic(&mut self) {
        self.gpo_ctrl_dyn = self.sys(regs::GPO);
        self.rf_mngt_dyn = self.sys(regs::RF_MNGT) & regs::RF_MNGT_DYN_WRITABLE;
        // EH_MODE = 0 forces harvesting on at boot
        let forced = self.sys(regs::EH_MODE) & 1 == 0;
        self.eh_ctrl_dyn = if forced {
            EnergyHarvestStatus::EH_EN.bits()
        } else {
            0
        };
        self.it_sts_dyn = 0;
        self.mb_ctrl_dyn = 0;
        self.mb_len_dyn = 0;
        self.mailbox = [0u8; regs::MAILBOX_SIZE];
        self.refresh_energy_harvesting();
    }

    fn refresh_energy_harvesting(&mut self) {
        let mut eh = EnergyHarvestStatus::from_bits_truncate(self.eh_ctrl_dyn)
            & EnergyHarvestStatus::EH_EN;
        eh |= EnergyHarvestStatus::VCC_ON;
        if self.rf_field {
            eh |= EnergyHarvestStatus::FIELD_ON;
            if eh.contains(EnergyHarvestStatus::EH_EN) {
                eh |= EnergyHarvestStatus::EH_ON;
            }
        }
        self.eh_ctrl_dyn = eh.bits();
    }

    fn mailbox_enabled(&self) -> bool {
        self.mb_ctrl_dyn & MailboxStatus::MB_EN.bits() != 0
    }

    fn message_pending(&self) -> bool {
        let pending = MailboxStatus::HOST_PUT_MSG | MailboxStatus::RF_PUT_MSG;
        MailboxStatus::from_bits_truncate(self.mb_ctrl_dyn).intersects(pending)
    }

    // =========================================================================
    // Area protection
    // =========================================================================

    fn area_of(&self, addr: u16) -> u8 {
        let ends = [regs::ENDA1, regs::ENDA2, regs::ENDA3];
        for (i, enda) in ends.iter().enumerate() {
            if addr <= area_end_address(self.sys(*enda)) {
                return i as u8 + 1;
            }
        }
        4
    }

    fn i2c_protection(&self, area: u8) -> AreaProtection {
        match I2C_PROTECTION.lookup(area) {
            Some(field) => AreaProtection::from_bits(field.extract(self.sys(field.reg))),
            None => AreaProtection::Open,
        }
    }

    fn user_readable(&self, addr: u16) -> bool {
        let area = self.area_of(addr);
        if area == 1 || self.session_open {
            return true;
        }
        matches!(
            self.i2c_protection(area),
            AreaProtection::Open | AreaProtection::WriteProtected
        )
    }

    fn user_writable(&self, addr: u16) -> bool {
        match self.i2c_protection(self.area_of(addr)) {
            AreaProtection::Open => true,
            AreaProtection::WriteProtected | AreaProtection::ReadWriteProtected => {
                self.session_open
            }
            AreaProtection::ReadProtectedWriteForbidden => false,
        }
    }

    // =========================================================================
    // User space (0x53)
    // =========================================================================

    fn read_user_space(&mut self, offset: u16, buf: &mut [u8]) -> Result<()> {
        let start = usize::from(offset);
        let end = start + buf.len();

        if end <= self.user.len() {
            if !(offset..offset + buf.len() as u16).all(|a| self.user_readable(a)) {
                log::debug!("dummy: read of protected user memory at 0x{:04X}", offset);
                return Err(Error::Nack);
            }
            buf.copy_from_slice(&self.user[start..end]);
            return Ok(());
        }

        if offset >= regs::DYNAMIC_START && offset < regs::MAILBOX_START {
            for (i, slot) in buf.iter_mut().enumerate() {
                *slot = self.read_dynamic(offset + i as u16)?;
            }
            return Ok(());
        }

        if offset >= regs::MAILBOX_START && usize::from(offset - regs::MAILBOX_START) + buf.len()
            <= regs::MAILBOX_SIZE
        {
            if !self.mailbox_enabled() {
                return Err(Error::Nack);
            }
            let pos = usize::from(offset - regs::MAILBOX_START);
            buf.copy_from_slice(&self.mailbox[pos..pos + buf.len()]);

            let msg_len = usize::from(self.mb_len_dyn) + 1;
            let rf_msg = self.mb_ctrl_dyn & MailboxStatus::RF_PUT_MSG.bits() != 0;
            if rf_msg && pos + buf.len() >= msg_len {
                self.mb_ctrl_dyn &= !MailboxStatus::RF_PUT_MSG.bits();
            }
            return Ok(());
        }

        Err(Error::Nack)
    }

    fn read_dynamic(&mut self, addr: u16) -> Result<u8> {
        let value = match addr {
            a if a == regs::GPO_CTRL_DYN.offset => self.gpo_ctrl_dyn,
            a if a == regs::EH_CTRL_DYN.offset => self.eh_ctrl_dyn,
            a if a == regs::RF_MNGT_DYN.offset => self.rf_mngt_dyn,
            a if a == regs::I2C_SSO_DYN.offset => u8::from(self.session_open),
            a if a == regs::IT_STS_DYN.offset => core::mem::take(&mut self.it_sts_dyn),
            a if a == regs::MB_CTRL_DYN.offset => self.mb_ctrl_dyn,
            a if a == regs::MB_LEN_DYN.offset => self.mb_len_dyn,
            _ => return Err(Error::Nack),
        };
        Ok(value)
    }

    fn write_user_space(&mut self, offset: u16, data: &[u8]) -> Result<()> {
        let start = usize::from(offset);
        let end = start + data.len();

        if end <= self.user.len() {
            if !(offset..offset + data.len() as u16).all(|a| self.user_writable(a)) {
                log::debug!("dummy: write to protected user memory at 0x{:04X}", offset);
                return Err(Error::Nack);
            }
            self.user[start..end].copy_from_slice(data);
            return Ok(());
        }

        if offset >= regs::DYNAMIC_START && offset < regs::MAILBOX_START {
            for (i, &value) in data.iter().enumerate() {
                self.write_dynamic(offset + i as u16, value)?;
            }
            return Ok(());
        }

        if offset == regs::MAILBOX_START {
            return self.write_mailbox(data);
        }

        Err(Error::Nack)
    }

    fn write_dynamic(&mut self, addr: u16, value: u8) -> Result<()> {
        fn merge(old: u8, new: u8, writable: u8) -> u8 {
            (old & !writable) | (new & writable)
        }

        match addr {
            a if a == regs::GPO_CTRL_DYN.offset => {
                self.gpo_ctrl_dyn = merge(self.gpo_ctrl_dyn, value, regs::GPO_CTRL_DYN_WRITABLE);
            }
            a if a == regs::EH_CTRL_DYN.offset => {
                self.eh_ctrl_dyn = merge(self.eh_ctrl_dyn, value, regs::EH_CTRL_DYN_WRITABLE);
                self.refresh_energy_harvesting();
            }
            a if a == regs::RF_MNGT_DYN.offset => {
                self.rf_mngt_dyn = merge(self.rf_mngt_dyn, value, regs::RF_MNGT_DYN_WRITABLE);
            }
            a if a == regs::MB_CTRL_DYN.offset => {
                let enable = value & MailboxStatus::MB_EN.bits() != 0;
                if !enable {
                    self.mb_ctrl_dyn = 0;
                    self.mb_len_dyn = 0;
                } else if self.sys(regs::MB_MODE) & 1 == 0 {
                    log::debug!("dummy: mailbox enable ignored, MB_MODE forbids it");
                } else {
                    self.mb_ctrl_dyn |= MailboxStatus::MB_EN.bits();
                }
            }
            a if a < regs::MAILBOX_START => {
                log::trace!("dummy: write to read-only 0x{:04X} ignored", a);
            }
            _ => return Err(Error::Nack),
        }
        Ok(())
    }

    fn write_mailbox(&mut self, data: &[u8]) -> Result<()> {
        if !self.mailbox_enabled()
            || self.message_pending()
            || data.is_empty()
            || data.len() > regs::MAILBOX_SIZE
        {
            return Err(Error::Nack);
        }
        self.mailbox[..data.len()].copy_from_slice(data);
        self.mb_len_dyn = (data.len() - 1) as u8;
        self.mb_ctrl_dyn = MailboxStatus::MB_EN.bits()
            | MailboxStatus::HOST_PUT_MSG.bits()
            | MailboxStatus::HOST_CURRENT_MSG.bits();
        Ok(())
    }

    // =========================================================================
    // System space (0x57)
    // =========================================================================

    fn read_system_space(&mut self, offset: u16, buf: &mut [u8]) -> Result<()> {
        if offset == regs::I2C_PWD.offset {
            if !self.session_open || buf.len() > 8 {
                return Err(Error::Nack);
            }
            buf.copy_from_slice(&self.password.to_be_bytes()[..buf.len()]);
            return Ok(());
        }

        let start = usize::from(offset);
        let end = start + buf.len();
        if end > SYSTEM_AREA_LEN {
            return Err(Error::Nack);
        }
        buf.copy_from_slice(&self.system[start..end]);
        Ok(())
    }

    fn write_system_space(&mut self, offset: u16, data: &[u8]) -> Result<()> {
        if offset == regs::I2C_PWD.offset {
            return self.write_password_register(data);
        }

        if !self.session_open {
            log::debug!("dummy: configuration write at 0x{:04X} while locked", offset);
            return Err(Error::Nack);
        }
        let start = usize::from(offset);
        let end = start + data.len();
        if offset >= READ_ONLY_START || end > usize::from(READ_ONLY_START) {
            return Err(Error::Nack);
        }
        self.system[start..end].copy_from_slice(data);
        Ok(())
    }

    fn write_password_register(&mut self, data: &[u8]) -> Result<()> {
        match data.len() {
            17 => {
                let (first, rest) = data.split_at(8);
                let (code, second) = rest.split_at(1);
                if code[0] != PWD_PRESENT_CODE || first != second {
                    return Err(Error::Nack);
                }
                let mut pwd = [0u8; 8];
                pwd.copy_from_slice(first);
                self.session_open = u64::from_be_bytes(pwd) == self.password;
                log::debug!(
                    "dummy: password presented, session {}",
                    if self.session_open { "open" } else { "closed" }
                );
                Ok(())
            }
            8 if self.session_open => {
                let mut pwd = [0u8; 8];
                pwd.copy_from_slice(data);
                self.password = u64::from_be_bytes(pwd);
                Ok(())
            }
            _ => Err(Error::Nack),
        }
    }

    fn dispatch(&mut self, txn: &mut BusTransaction<'_>) -> Result<()> {
        match (txn.device, txn.has_read()) {
            (USER_ADDRESS, true) => self.read_user_space(txn.offset, txn.read_buf),
            (USER_ADDRESS, false) => self.write_user_space(txn.offset, txn.write_data),
            (SYSTEM_ADDRESS, true) => self.read_system_space(txn.offset, txn.read_buf),
            (SYSTEM_ADDRESS, false) => self.write_system_space(txn.offset, txn.write_data),
            _ => Err(Error::Nack),
        }
    }
}

impl I2cBus for DummyTag {
    fn max_transfer_len(&self) -> usize {
        regs::MAILBOX_SIZE
    }

    fn execute(&mut self, txn: &mut BusTransaction<'_>) -> Result<()> {
        let result = match self.pending_fault.take() {
            Some(err) => Err(err),
            None => self.dispatch(txn),
        };

        let (kind, data) = if txn.has_read() {
            let data = if result.is_ok() {
                txn.read_buf.to_vec()
            } else {
                Vec::new()
            };
            (TransactionKind::Read, data)
        } else {
            (TransactionKind::Write, txn.write_data.to_vec())
        };
        self.transactions.push(Transaction {
            kind,
            device: txn.device,
            offset: txn.offset,
            data,
        });

        result
    }

    fn delay_us(&mut self, us: u32) {
        // No real waiting for in-memory operations
        self.total_delay_us += u64::from(us);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use st25dv_core::codec;

    #[test]
    fn test_factory_identification() {
        let mut tag = DummyTag::new(DummyConfig::new(CapacityVariant::K64));
        let mut code = [0u8; 1];
        let mut txn = BusTransaction::read(SYSTEM_ADDRESS, regs::MEM_SIZE_H.offset, &mut code);
        tag.execute(&mut txn).unwrap();
        assert_eq!(code[0], 0x07);

        let uid = codec::get_word64(&mut tag, regs::UID).unwrap();
        assert_eq!(uid, 0xE002_2600_1234_5678);
        assert_eq!(codec::get_byte(&mut tag, regs::IC_REF).unwrap(), 0x26);
    }

    #[test]
    fn test_config_write_needs_session() {
        let mut tag = DummyTag::new_default();
        let err = codec::set_byte(&mut tag, regs::ENDA1, 0x03).unwrap_err();
        assert_eq!(err, Error::Nack);

        let frame = [0u8, 0, 0, 0, 0, 0, 0, 0, 0x09, 0, 0, 0, 0, 0, 0, 0, 0];
        codec::write_bytes(&mut tag, regs::I2C_PWD, &frame).unwrap();
        assert!(tag.session_open());
        codec::set_byte(&mut tag, regs::ENDA1, 0x03).unwrap();
        assert_eq!(tag.system_area()[regs::ENDA1.offset as usize], 0x03);
    }

    #[test]
    fn test_identification_is_read_only() {
        let mut tag = DummyTag::new_default();
        tag.session_open = true;
        assert_eq!(codec::set_byte(&mut tag, regs::IC_REF, 0).unwrap_err(), Error::Nack);
    }

    #[test]
    fn test_malformed_presentation_is_refused() {
        let mut tag = DummyTag::new_default();
        let mut frame = [0u8; 17];
        frame[8] = 0x08;
        let err = codec::write_bytes(&mut tag, regs::I2C_PWD, &frame).unwrap_err();
        assert_eq!(err, Error::Nack);
        assert!(!tag.session_open());
    }

    #[test]
    fn test_interrupt_status_clears_on_read() {
        let mut tag = DummyTag::new_default();
        tag.set_rf_field(true);
        let first = codec::get_byte(&mut tag, regs::IT_STS_DYN).unwrap();
        assert_eq!(first, InterruptStatus::FIELD_RISING.bits());
        assert_eq!(codec::get_byte(&mut tag, regs::IT_STS_DYN).unwrap(), 0);
    }

    #[test]
    fn test_read_only_dynamic_bits_ignore_writes() {
        let mut tag = DummyTag::new_default();
        codec::set_byte(&mut tag, regs::EH_CTRL_DYN, 0xFF).unwrap();
        let eh = EnergyHarvestStatus::from_bits_truncate(
            codec::get_byte(&mut tag, regs::EH_CTRL_DYN).unwrap(),
        );
        assert!(eh.contains(EnergyHarvestStatus::EH_EN));
        assert!(!eh.contains(EnergyHarvestStatus::FIELD_ON));

        codec::set_byte(&mut tag, regs::I2C_SSO_DYN, 0x01).unwrap();
        assert!(!tag.session_open());
    }

    #[test]
    fn test_transactions_are_recorded() {
        let mut tag = DummyTag::new_default();
        codec::set_byte(&mut tag, regs::Register::user(0x10), 0xAB).unwrap();
        codec::get_byte(&mut tag, regs::Register::user(0x10)).unwrap();
        assert_eq!(
            tag.transactions(),
            &[
                Transaction {
                    kind: TransactionKind::Write,
                    device: USER_ADDRESS,
                    offset: 0x10,
                    data: vec![0xAB],
                },
                Transaction {
                    kind: TransactionKind::Read,
                    device: USER_ADDRESS,
                    offset: 0x10,
                    data: vec![0xAB],
                },
            ]
        );
    }

    #[test]
    fn test_parse_options() {
        let config = parse_options(&[("size", "64k"), ("password", "0x1122334455667788")]).unwrap();
        assert_eq!(config.capacity, CapacityVariant::K64);
        assert_eq!(config.password, 0x1122_3344_5566_7788);
        assert_eq!(config.ic_ref, 0x26);

        let config = parse_options(&[("password", "42"), ("size", "16k")]).unwrap();
        assert_eq!(config.capacity, CapacityVariant::K16);
        assert_eq!(config.password, 42);

        assert!(parse_options(&[("size", "2k")]).is_err());
        assert!(parse_options(&[("speed", "1")]).is_err());
        assert!(parse_options(&[("uid", "0xZZ")]).is_err());
    }
}
