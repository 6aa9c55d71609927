//! I2C message structure

use bitflags::bitflags;

bitflags! {
    /// Per-message flags
    ///
    /// Numbering follows the Linux i2c-dev convention so adapters that
    /// talk to the kernel can pass the bits through unchanged.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct MsgFlags: u16 {
        /// Read direction: the adapter fills the buffer from the slave
        const RD = 1 << 0;
    }
}

impl Default for MsgFlags {
    fn default() -> Self {
        MsgFlags::empty()
    }
}

/// A single message within a bus transaction
///
/// Designed to avoid allocation - uses slices for data. The lifetime
/// parameter `'a` ties the message to the buffers it references. A
/// transaction is an ordered slice of messages issued as one bus
/// operation; every message in it carries the same slave address.
pub struct Message<'a> {
    /// 7-bit slave address
    pub addr: u8,

    /// Direction and transfer flags
    pub flags: MsgFlags,

    /// Data to send for a write-direction message
    pub write_data: &'a [u8],

    /// Buffer to fill for a read-direction message (mutable)
    pub read_buf: &'a mut [u8],
}

impl<'a> Message<'a> {
    /// Create a write-direction message
    pub fn write(addr: u8, data: &'a [u8]) -> Self {
        Self {
            addr,
            flags: MsgFlags::empty(),
            write_data: data,
            read_buf: &mut [],
        }
    }

    /// Create a read-direction message
    pub fn read(addr: u8, buf: &'a mut [u8]) -> Self {
        Self {
            addr,
            flags: MsgFlags::RD,
            write_data: &[],
            read_buf: buf,
        }
    }

    /// Whether this message reads from the slave
    pub fn is_read(&self) -> bool {
        self.flags.contains(MsgFlags::RD)
    }

    /// Number of bytes this message transfers
    pub fn len(&self) -> usize {
        if self.is_read() {
            self.read_buf.len()
        } else {
            self.write_data.len()
        }
    }

    /// Whether this message transfers no bytes
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
