//! Driver configuration
//!
//! Timing and access policy are injected at construction instead of being
//! toggled globally, so tests can run against an emulator without real
//! delays and callers that schedule their own EEPROM timing can opt out.

/// EEPROM programming granularity used to estimate pages touched
pub const EEPROM_PAGE_SIZE: usize = 4;

/// Worst-case number of EEPROM pages a write of `len` bytes can span
///
/// 1 byte touches exactly one page, 2 bytes up to two, 8 bytes up to three.
pub const fn pages_touched(len: usize) -> u32 {
    if len == 0 {
        0
    } else {
        ((len + EEPROM_PAGE_SIZE - 2) / EEPROM_PAGE_SIZE + 1) as u32
    }
}

/// Built-in delay durations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettleDelays {
    /// Maximum programming time per EEPROM page, in milliseconds
    pub page_write_ms: u32,
    /// Time the tag needs to compare a presented password, in milliseconds
    pub password_check_ms: u32,
}

impl Default for SettleDelays {
    fn default() -> Self {
        Self {
            page_write_ms: 6,
            password_check_ms: 10,
        }
    }
}

impl SettleDelays {
    /// Settle time after writing `len` bytes of non-volatile storage
    pub const fn write_settle_ms(&self, len: usize) -> u32 {
        pages_touched(len) * self.page_write_ms
    }
}

/// Who is responsible for waiting after EEPROM writes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteTiming {
    /// The driver blocks for the given durations after each write and
    /// verifies password presentation
    BuiltIn(SettleDelays),
    /// The caller manages timing; no delays are issued and password
    /// presentation is reported as successful without verification
    External,
}

impl Default for WriteTiming {
    fn default() -> Self {
        WriteTiming::BuiltIn(SettleDelays::default())
    }
}

/// How protected configuration writes are handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccessMode {
    /// Issue the write and let the tag accept or refuse it
    #[default]
    HardwareAuthority,
    /// Check the security session first and fail with
    /// [`Error::UnauthorizedWrite`](crate::Error::UnauthorizedWrite)
    /// without touching the bus when it is closed
    Strict,
}

/// Configuration for a [`St25dv`](crate::St25dv) driver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DriverConfig {
    /// Write settle behavior
    pub timing: WriteTiming,
    /// Protected write policy
    pub access: AccessMode,
}

impl DriverConfig {
    /// Set the write timing policy
    pub fn with_timing(mut self, timing: WriteTiming) -> Self {
        self.timing = timing;
        self
    }

    /// Set the protected write policy
    pub fn with_access(mut self, access: AccessMode) -> Self {
        self.access = access;
        self
    }

    /// Shorthand for [`WriteTiming::External`]
    pub fn external_timing(self) -> Self {
        self.with_timing(WriteTiming::External)
    }

    /// Shorthand for [`AccessMode::Strict`]
    pub fn strict(self) -> Self {
        self.with_access(AccessMode::Strict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pages_touched() {
        assert_eq!(pages_touched(0), 0);
        assert_eq!(pages_touched(1), 1);
        assert_eq!(pages_touched(2), 2);
        assert_eq!(pages_touched(8), 3);
    }

    #[test]
    fn test_default_settle_times() {
        let delays = SettleDelays::default();
        assert_eq!(delays.write_settle_ms(1), 6);
        assert_eq!(delays.write_settle_ms(2), 12);
        assert_eq!(delays.write_settle_ms(8), 18);
    }

    #[test]
    fn test_builder() {
        let cfg = DriverConfig::default();
        assert_eq!(cfg.access, AccessMode::HardwareAuthority);
        assert!(matches!(cfg.timing, WriteTiming::BuiltIn(_)));

        let cfg = cfg.external_timing().strict();
        assert_eq!(cfg.timing, WriteTiming::External);
        assert_eq!(cfg.access, AccessMode::Strict);
    }
}
