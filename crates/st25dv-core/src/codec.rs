//! Scalar codec
//!
//! Byte, 16-bit, 64-bit and single-bit register access built on single
//! bus transactions. Multi-byte values are always transferred most
//! significant byte first, so every getter is the exact inverse of its
//! setter.
//!
//! Uses `maybe_async` to support both sync and async modes:
//! - With `is_sync` feature: blocking/synchronous
//! - Without `is_sync` feature: async (for Embassy, WASM, tokio)
//!
//! None of these functions wait after a write; settle delays are the
//! caller's business (see [`St25dv`](crate::St25dv)).

use crate::bus::{BusTransaction, I2cBus};
use crate::error::{Error, Result};
use crate::regs::Register;
use maybe_async::maybe_async;

/// Read `buf.len()` bytes starting at `reg`
///
/// Fails with `PayloadTooLarge` if the bus cannot carry that many bytes
/// in one transaction.
#[maybe_async]
pub async fn read_bytes<B: I2cBus + ?Sized>(
    bus: &mut B,
    reg: Register,
    buf: &mut [u8],
) -> Result<()> {
    log::trace!("read {} ({} bytes)", reg, buf.len());
    if buf.len() > bus.max_transfer_len() {
        return Err(Error::PayloadTooLarge);
    }
    let mut txn = BusTransaction::read(reg.device_address(), reg.offset, buf);
    bus.execute(&mut txn).await
}

/// Write `data` starting at `reg`
#[maybe_async]
pub async fn write_bytes<B: I2cBus + ?Sized>(
    bus: &mut B,
    reg: Register,
    data: &[u8],
) -> Result<()> {
    log::trace!("write {} {:02X?}", reg, data);
    if data.len() > bus.max_transfer_len() {
        return Err(Error::PayloadTooLarge);
    }
    let mut txn = BusTransaction::write(reg.device_address(), reg.offset, data);
    bus.execute(&mut txn).await
}

/// Read one byte
#[maybe_async]
pub async fn get_byte<B: I2cBus + ?Sized>(bus: &mut B, reg: Register) -> Result<u8> {
    let mut buf = [0u8; 1];
    read_bytes(bus, reg, &mut buf).await?;
    Ok(buf[0])
}

/// Write one byte
#[maybe_async]
pub async fn set_byte<B: I2cBus + ?Sized>(bus: &mut B, reg: Register, value: u8) -> Result<()> {
    write_bytes(bus, reg, &[value]).await
}

/// Read a big-endian 16-bit value
#[maybe_async]
pub async fn get_word16<B: I2cBus + ?Sized>(bus: &mut B, reg: Register) -> Result<u16> {
    let mut buf = [0u8; 2];
    read_bytes(bus, reg, &mut buf).await?;
    Ok(u16::from_be_bytes(buf))
}

/// Write a big-endian 16-bit value
#[maybe_async]
pub async fn set_word16<B: I2cBus + ?Sized>(bus: &mut B, reg: Register, value: u16) -> Result<()> {
    write_bytes(bus, reg, &value.to_be_bytes()).await
}

/// Read a big-endian 64-bit value
#[maybe_async]
pub async fn get_word64<B: I2cBus + ?Sized>(bus: &mut B, reg: Register) -> Result<u64> {
    let mut buf = [0u8; 8];
    read_bytes(bus, reg, &mut buf).await?;
    Ok(u64::from_be_bytes(buf))
}

/// Write a big-endian 64-bit value
#[maybe_async]
pub async fn set_word64<B: I2cBus + ?Sized>(bus: &mut B, reg: Register, value: u64) -> Result<()> {
    write_bytes(bus, reg, &value.to_be_bytes()).await
}

/// Read bit `bit` (0-7) of a byte register
#[maybe_async]
pub async fn get_bit<B: I2cBus + ?Sized>(bus: &mut B, reg: Register, bit: u8) -> Result<bool> {
    let value = get_byte(bus, reg).await?;
    Ok((value >> (bit & 7)) & 1 != 0)
}

/// Replace the bits selected by `mask` with the matching bits of `value`
///
/// One read followed by one write; the byte is never cached between
/// calls. Returns the value written.
#[maybe_async]
pub async fn update_bits<B: I2cBus + ?Sized>(
    bus: &mut B,
    reg: Register,
    mask: u8,
    value: u8,
) -> Result<u8> {
    let current = get_byte(bus, reg).await?;
    let updated = (current & !mask) | (value & mask);
    set_byte(bus, reg, updated).await?;
    Ok(updated)
}

/// Set or clear bit `bit` (0-7) of a byte register (read-modify-write)
#[maybe_async]
pub async fn set_bit<B: I2cBus + ?Sized>(
    bus: &mut B,
    reg: Register,
    bit: u8,
    set: bool,
) -> Result<()> {
    let mask = 1u8 << (bit & 7);
    update_bits(bus, reg, mask, if set { mask } else { 0 }).await?;
    Ok(())
}
