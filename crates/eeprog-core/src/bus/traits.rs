//! Bus adapter trait definitions
//!
//! These traits use `maybe_async` to support both sync and async modes.
//! - By default, traits are async (suitable for WASM/web, Embassy, tokio)
//! - With the `is_sync` feature, traits become synchronous

use crate::bus::Message;
use crate::error::Result;
use maybe_async::maybe_async;

/// I2C master trait (sync or async depending on `is_sync` feature)
///
/// This trait represents an I2C bus controller that can execute
/// transactions against a slave. A transaction is an ordered slice of
/// [`Message`]s issued as one bus operation; the adapter must not let
/// another caller's messages slip in between them.
///
/// `bus_busy` exposes the controller's hardware busy flag. Callers that
/// need an idle bus poll it through [`crate::engine::wait_idle`], which
/// bounds the wait; implementations whose kernel or hardware already
/// serializes transfers can simply report idle.
#[maybe_async(AFIT)]
pub trait I2cMaster {
    /// Get the maximum number of bytes one message may transfer
    fn max_transfer_len(&self) -> usize;

    /// Execute one transaction
    ///
    /// Write-direction messages send `write_data`; read-direction
    /// messages fill `read_buf` completely. An error aborts the whole
    /// transaction and is reported unchanged to the caller.
    async fn transfer(&mut self, msgs: &mut [Message<'_>]) -> Result<()>;

    /// Poll the controller's busy flag
    ///
    /// Returns `true` while the controller is mid-transaction. A
    /// negative controller status surfaces as an error.
    async fn bus_busy(&mut self) -> Result<bool>;

    /// Delay for the specified number of microseconds
    async fn delay_us(&mut self, us: u32);
}

// Blanket impl for boxed masters to allow trait objects (sync mode only)
// In async mode, traits with async fn are not object-safe
#[cfg(all(feature = "alloc", feature = "is_sync"))]
impl I2cMaster for alloc::boxed::Box<dyn I2cMaster + Send> {
    fn max_transfer_len(&self) -> usize {
        (**self).max_transfer_len()
    }

    fn transfer(&mut self, msgs: &mut [Message<'_>]) -> Result<()> {
        (**self).transfer(msgs)
    }

    fn bus_busy(&mut self) -> Result<bool> {
        (**self).bus_busy()
    }

    fn delay_us(&mut self, us: u32) {
        (**self).delay_us(us)
    }
}
