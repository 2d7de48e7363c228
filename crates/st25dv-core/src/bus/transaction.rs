//! Addressed register transaction

/// Length of the register address header (16-bit offset, high byte first)
pub const HEADER_LEN: usize = 2;

/// A single addressed bus transaction
///
/// Designed to avoid allocation - uses slices for data.
/// The lifetime parameter `'a` ties the transaction to the buffers it
/// references. On the wire every transaction starts with the 16-bit
/// register offset (high byte first), followed either by `write_data` or,
/// after a repeated start, by a read of `read_buf.len()` bytes.
pub struct BusTransaction<'a> {
    /// 7-bit device address
    pub device: u8,

    /// Register offset within the device's address space
    pub offset: u16,

    /// Data to write after the offset
    pub write_data: &'a [u8],

    /// Buffer to read into (mutable)
    pub read_buf: &'a mut [u8],
}

impl<'a> BusTransaction<'a> {
    /// Create a read transaction of `buf.len()` bytes at `offset`
    pub fn read(device: u8, offset: u16, buf: &'a mut [u8]) -> Self {
        Self {
            device,
            offset,
            write_data: &[],
            read_buf: buf,
        }
    }

    /// Create a write transaction of `data` at `offset`
    pub fn write(device: u8, offset: u16, data: &'a [u8]) -> Self {
        Self {
            device,
            offset,
            write_data: data,
            read_buf: &mut [],
        }
    }

    /// The offset header as sent on the wire
    pub fn header(&self) -> [u8; HEADER_LEN] {
        self.offset.to_be_bytes()
    }

    /// Number of header bytes preceding the payload
    pub fn header_len(&self) -> usize {
        HEADER_LEN
    }

    /// Encode the offset header into the start of `buf`
    ///
    /// `buf` must be at least `HEADER_LEN` bytes long.
    pub fn encode_header(&self, buf: &mut [u8]) {
        buf[..HEADER_LEN].copy_from_slice(&self.header());
    }

    /// Returns true if this transaction has a read phase
    pub fn has_read(&self) -> bool {
        !self.read_buf.is_empty()
    }

    /// Returns true if this transaction carries write data
    pub fn has_write(&self) -> bool {
        !self.write_data.is_empty()
    }

    /// Total number of bytes moved on the bus, excluding the device address
    pub fn total_bytes(&self) -> usize {
        HEADER_LEN + self.write_data.len() + self.read_buf.len()
    }
}
