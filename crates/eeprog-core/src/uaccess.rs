//! Caller-buffer bridging
//!
//! The transaction engine never hands bus adapters a caller-owned
//! buffer; it stages every transfer through a driver-owned buffer and
//! copies across the boundary. [`UserBuffer`] models that boundary the
//! way a kernel models `copy_to_user`/`copy_from_user`: the copy itself
//! can fail, and a failed copy must surface as [`Error::BadAddress`]
//! rather than a byte count.
//!
//! Plain slices implement the trait with infallible copies; test
//! doubles implement it to inject copy faults.

use crate::error::{Error, Result};

/// A caller-owned buffer with fallible copies in and out
pub trait UserBuffer {
    /// Number of bytes the caller requested
    fn len(&self) -> usize;

    /// Whether the caller requested zero bytes
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy `dst.len()` bytes out of the caller buffer
    ///
    /// Used on the write path, before any bus activity.
    fn copy_from_user(&self, dst: &mut [u8]) -> Result<()>;

    /// Copy `src` into the caller buffer
    ///
    /// Used on the read path, after the bus transaction completed.
    fn copy_to_user(&mut self, src: &[u8]) -> Result<()>;
}

impl UserBuffer for [u8] {
    fn len(&self) -> usize {
        <[u8]>::len(self)
    }

    fn copy_from_user(&self, dst: &mut [u8]) -> Result<()> {
        if dst.len() > <[u8]>::len(self) {
            return Err(Error::BadAddress);
        }
        dst.copy_from_slice(&self[..dst.len()]);
        Ok(())
    }

    fn copy_to_user(&mut self, src: &[u8]) -> Result<()> {
        if src.len() > <[u8]>::len(self) {
            return Err(Error::BadAddress);
        }
        self[..src.len()].copy_from_slice(src);
        Ok(())
    }
}
