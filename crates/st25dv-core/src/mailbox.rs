//! Fast transfer mode mailbox
//!
//! A 256-byte volatile buffer shared by the I2C host and the RF reader.
//! Only one message is held at a time; `MB_CTRL_Dyn` reports who put it
//! and `MB_LEN_Dyn` holds its length minus one.

use crate::bus::I2cBus;
use crate::codec;
use crate::device::St25dv;
use crate::error::{Error, Result};
use crate::regs::{self, bit_of, MailboxStatus, MAILBOX, MAILBOX_SIZE};
use maybe_async::maybe_async;

#[maybe_async]
impl<B: I2cBus> St25dv<B> {
    /// Mailbox control and status flags
    pub async fn mailbox_status(&mut self) -> Result<MailboxStatus> {
        let raw = self.get_byte(regs::MB_CTRL_DYN).await?;
        Ok(MailboxStatus::from_bits_truncate(raw))
    }

    /// Mailbox enabled (`MB_EN`)
    pub async fn mailbox_enabled(&mut self) -> Result<bool> {
        Ok(self.mailbox_status().await?.contains(MailboxStatus::MB_EN))
    }

    /// Enable or disable the mailbox
    ///
    /// Disabling discards any pending message. Only `MB_EN` is writable;
    /// the status bits are written back unchanged.
    pub async fn set_mailbox_enabled(&mut self, enable: bool) -> Result<()> {
        let bit = bit_of(MailboxStatus::MB_EN.bits());
        codec::set_bit(self.bus_mut(), regs::MB_CTRL_DYN, bit, enable).await?;
        log::debug!("mailbox {}", if enable { "enabled" } else { "disabled" });
        Ok(())
    }

    /// Host put the current message
    pub async fn host_put_message(&mut self) -> Result<bool> {
        Ok(self.mailbox_status().await?.contains(MailboxStatus::HOST_PUT_MSG))
    }

    /// RF put the current message
    pub async fn rf_put_message(&mut self) -> Result<bool> {
        Ok(self.mailbox_status().await?.contains(MailboxStatus::RF_PUT_MSG))
    }

    /// A host message expired before RF read it
    pub async fn host_missed_message(&mut self) -> Result<bool> {
        Ok(self.mailbox_status().await?.contains(MailboxStatus::HOST_MISS_MSG))
    }

    /// An RF message expired before the host read it
    pub async fn rf_missed_message(&mut self) -> Result<bool> {
        Ok(self.mailbox_status().await?.contains(MailboxStatus::RF_MISS_MSG))
    }

    /// Raw `MB_LEN_Dyn` (message length minus one)
    pub async fn mailbox_message_size(&mut self) -> Result<u8> {
        self.get_byte(regs::MB_LEN_DYN).await
    }

    /// Length of the pending message in bytes, 0 if the mailbox is empty
    pub async fn mailbox_message_len(&mut self) -> Result<usize> {
        let status = self.mailbox_status().await?;
        if !status.intersects(MailboxStatus::HOST_PUT_MSG | MailboxStatus::RF_PUT_MSG) {
            return Ok(0);
        }
        let size = self.mailbox_message_size().await?;
        Ok(usize::from(size) + 1)
    }

    /// Read the pending message into `buf`
    ///
    /// Returns the number of bytes copied, which is the smaller of the
    /// message length and `buf.len()`. An empty mailbox issues no read of
    /// the buffer itself.
    pub async fn read_mailbox(&mut self, buf: &mut [u8]) -> Result<usize> {
        let len = self.mailbox_message_len().await?.min(buf.len());
        if len == 0 {
            return Ok(0);
        }
        codec::read_bytes(self.bus_mut(), MAILBOX, &mut buf[..len]).await?;
        Ok(len)
    }

    /// Put a message of 1 to 256 bytes into the mailbox
    ///
    /// The mailbox must be enabled and empty, otherwise the tag refuses
    /// the write with a NACK.
    pub async fn write_mailbox(&mut self, data: &[u8]) -> Result<()> {
        if data.is_empty() {
            return Err(Error::InvalidParameter);
        }
        if data.len() > MAILBOX_SIZE {
            log::debug!("mailbox message of {} bytes refused", data.len());
            return Err(Error::PayloadTooLarge);
        }
        codec::write_bytes(self.bus_mut(), MAILBOX, data).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mailbox_window() {
        assert_eq!(MAILBOX.offset, 0x2008);
        assert_eq!(MAILBOX_SIZE, 256);
        assert!(!MAILBOX.is_non_volatile());
        assert!(!MAILBOX.add(MAILBOX_SIZE as u16 - 1).is_non_volatile());
    }
}
