//! Bus trait definitions
//!
//! These traits use `maybe_async` to support both sync and async modes.
//! - By default, traits are async (suitable for Embassy, WASM, tokio)
//! - With the `is_sync` feature, traits become synchronous

use super::BusTransaction;
use crate::error::Result;
use maybe_async::maybe_async;

/// I2C bus trait (sync or async depending on `is_sync` feature)
///
/// This trait represents a transport that can carry one addressed register
/// transaction at a time. Implementations frame the transaction themselves:
///
/// 1. Address `txn.device` for writing and send the 16-bit offset header
///    (see [`BusTransaction::encode_header`])
/// 2. If `txn.write_data` is non-empty, send it in the same write phase
/// 3. If `txn.read_buf` is non-empty, issue a repeated start and read
///    exactly `txn.read_buf.len()` bytes
///
/// A missing acknowledge maps to [`Error::Nack`](crate::Error::Nack), an
/// expired transfer to [`Error::Timeout`](crate::Error::Timeout). Backends
/// must not retry on their own; retry policy belongs to the caller.
///
/// ## Example
///
/// ```ignore
/// #[maybe_async]
/// impl I2cBus for MyController {
///     async fn execute(&mut self, txn: &mut BusTransaction<'_>) -> Result<()> {
///         let header = txn.header();
///         self.start_write(txn.device).await?;
///         self.send(&header).await?;
///         self.send(txn.write_data).await?;
///         if txn.has_read() {
///             self.restart_read(txn.device).await?;
///             self.receive(txn.read_buf).await?;
///         }
///         self.stop().await
///     }
///
///     async fn delay_us(&mut self, us: u32) {
///         embassy_time::Timer::after_micros(us as u64).await
///     }
/// }
/// ```
#[maybe_async(AFIT)]
pub trait I2cBus {
    /// Maximum number of payload bytes (excluding the offset header) the
    /// backend can move in a single transaction
    fn max_transfer_len(&self) -> usize {
        usize::MAX
    }

    /// Execute a single addressed transaction
    async fn execute(&mut self, txn: &mut BusTransaction<'_>) -> Result<()>;

    /// Delay for the specified number of microseconds
    async fn delay_us(&mut self, us: u32);
}

// Blanket impl for boxed buses to allow trait objects (sync mode only)
// In async mode, traits with async fn are not object-safe
#[cfg(all(feature = "alloc", feature = "is_sync"))]
impl I2cBus for alloc::boxed::Box<dyn I2cBus + Send> {
    fn max_transfer_len(&self) -> usize {
        (**self).max_transfer_len()
    }

    fn execute(&mut self, txn: &mut BusTransaction<'_>) -> Result<()> {
        (**self).execute(txn)
    }

    fn delay_us(&mut self, us: u32) {
        (**self).delay_us(us)
    }
}

/// Helper function for implementing `I2cBus::execute()`.
///
/// Most backends hand the controller a single write buffer (offset header
/// followed by the payload) and an optional read buffer. This function
/// checks the transfer limit, builds the write buffer and delegates the
/// actual transfer to the provided closure, which receives the device
/// address, the write buffer and the read buffer to fill directly.
///
/// # Example
///
/// ```ignore
/// fn execute(&mut self, txn: &mut BusTransaction<'_>) -> CoreResult<()> {
///     default_execute(txn, self.max_transfer_len(), |device, write_data, read_buf| {
///         self.transfer(device, write_data, read_buf)
///             .map_err(CoreError::from)
///     })
/// }
/// ```
#[cfg(feature = "alloc")]
pub fn default_execute<F>(
    txn: &mut BusTransaction<'_>,
    max_len: usize,
    transfer_fn: F,
) -> Result<()>
where
    F: FnOnce(u8, &[u8], &mut [u8]) -> Result<()>,
{
    if txn.write_data.len() > max_len || txn.read_buf.len() > max_len {
        return Err(crate::error::Error::PayloadTooLarge);
    }

    let header_len = txn.header_len();
    let mut write_data = alloc::vec![0u8; header_len + txn.write_data.len()];
    txn.encode_header(&mut write_data);
    write_data[header_len..].copy_from_slice(txn.write_data);

    transfer_fn(txn.device, &write_data, txn.read_buf)
}

/// Information about a bus backend
#[derive(Debug, Clone)]
pub struct BusInfo {
    /// Name of the backend
    pub name: &'static str,
    /// Alternative names/aliases
    pub aliases: &'static [&'static str],
    /// Description
    pub description: &'static str,
    /// Whether this backend requires elevated privileges
    pub requires_root: bool,
}
