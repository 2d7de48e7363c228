//! I2C security session
//!
//! Configuration writes are only accepted by the tag while the I2C
//! security session is open. Presenting the 64-bit I2C password opens it;
//! presenting any other value closes it again.
//!
//! The presentation frame is the password, the validation code `0x09` and
//! the password again, written as one 17-byte transaction to the password
//! register in system space.

use crate::bus::I2cBus;
use crate::codec;
use crate::config::WriteTiming;
use crate::device::St25dv;
use crate::error::Result;
use crate::regs::{self, PWD_PRESENT_CODE};
use maybe_async::maybe_async;

/// Size of the I2C password in bytes
pub const PASSWORD_LEN: usize = 8;

/// Length of a password presentation frame
pub const PRESENT_FRAME_LEN: usize = 2 * PASSWORD_LEN + 1;

/// Build the presentation frame for `password`
pub(crate) fn present_frame(password: u64) -> [u8; PRESENT_FRAME_LEN] {
    let pwd = password.to_be_bytes();
    let mut frame = [0u8; PRESENT_FRAME_LEN];
    frame[..PASSWORD_LEN].copy_from_slice(&pwd);
    frame[PASSWORD_LEN] = PWD_PRESENT_CODE;
    frame[PASSWORD_LEN + 1..].copy_from_slice(&pwd);
    frame
}

#[maybe_async]
impl<B: I2cBus> St25dv<B> {
    /// Whether the I2C security session is open (`I2C_SSO_Dyn` bit 0)
    ///
    /// Always a live read.
    pub async fn is_unlocked(&mut self) -> Result<bool> {
        self.get_bit(regs::I2C_SSO_DYN, regs::I2C_SSO_BIT).await
    }

    /// Present `password` to open the security session
    ///
    /// With built-in timing the driver waits for the tag to compare the
    /// password and returns the resulting session state. With external
    /// timing the result is `true` without verification; call
    /// [`St25dv::is_unlocked`] once the comparison time has passed.
    ///
    /// Presentation itself is never gated by strict mode.
    pub async fn present_password(&mut self, password: u64) -> Result<bool> {
        let frame = present_frame(password);
        log::debug!("presenting I2C password");
        codec::write_bytes(self.bus_mut(), regs::I2C_PWD, &frame).await?;

        match self.config().timing {
            WriteTiming::BuiltIn(delays) => {
                let ms = delays.password_check_ms;
                self.bus_mut().delay_us(ms.saturating_mul(1000)).await;
                let open = self.is_unlocked().await?;
                log::info!(
                    "I2C security session {}",
                    if open { "open" } else { "closed" }
                );
                Ok(open)
            }
            WriteTiming::External => Ok(true),
        }
    }

    /// Close the security session
    ///
    /// Reads the current password and presents its bitwise complement.
    /// Returns whether the session is still open; under external timing
    /// this is always `false`. A session that is already closed is left
    /// alone.
    pub async fn lock(&mut self) -> Result<bool> {
        if !self.is_unlocked().await? {
            log::debug!("I2C security session already closed");
            return Ok(false);
        }
        let current = self.i2c_password().await?;
        let open = self.present_password(!current).await?;
        match self.config().timing {
            WriteTiming::BuiltIn(_) => Ok(open),
            WriteTiming::External => Ok(false),
        }
    }

    /// Read the stored I2C password (session must be open)
    pub async fn i2c_password(&mut self) -> Result<u64> {
        codec::get_word64(self.bus_mut(), regs::I2C_PWD).await
    }

    /// Store a new I2C password (session must be open)
    pub async fn set_i2c_password(&mut self, password: u64) -> Result<()> {
        log::info!("writing new I2C password");
        self.write_word64_at(regs::I2C_PWD, password).await
    }

    /// Store a new I2C password and report whether the session is still open
    pub async fn change_i2c_password(&mut self, password: u64) -> Result<bool> {
        self.set_i2c_password(password).await?;
        let open = self.is_unlocked().await?;
        if !open {
            log::warn!("I2C security session closed after password change");
        }
        Ok(open)
    }
}
