//! EEPROM transaction engine
//!
//! This module implements the read and write protocols for a serial
//! EEPROM with two-byte big-endian addressing, the convention used by
//! 24-series parts: a read is a write-then-read pair (offset select,
//! then data), a write sends the offset header and payload in one
//! message.
//!
//! Uses `maybe_async` to support both sync and async modes:
//! - With `is_sync` feature: blocking/synchronous
//! - Without `is_sync` feature: async (for WASM, Embassy, tokio)
//!
//! Every operation is a bounded sequence of at most two transactions
//! plus bus-idle waits; nothing is retried here. Adapter errors pass
//! through unchanged - retry policy belongs to the adapter or to the
//! calling application.

use crate::bus::{I2cMaster, Message};
use crate::error::{Error, Result};
use crate::uaccess::UserBuffer;
use maybe_async::maybe_async;

/// Default slave address of the target part
pub const DEFAULT_SLAVE_ADDR: u8 = 0x50;

/// Default cap on bytes transferred per call
pub const DEFAULT_MAX_TRANSFER: usize = 8192;

/// Default read length when addressed reads are unsupported
pub const DEFAULT_FIXED_READ_LEN: usize = 32;

/// EEPROM protocol configuration
///
/// Every protocol constant is a field here rather than a literal in the
/// engine, so one engine serves both the addressed-read parts and the
/// fixed-read ones.
#[derive(Debug, Clone)]
pub struct EepromConfig {
    /// 7-bit slave address of the part
    pub slave_addr: u8,
    /// Cap on bytes transferred per call; longer requests are truncated
    pub max_transfer: usize,
    /// Whether the part supports offset-select writes before a read
    ///
    /// When false, every read transfers `fixed_read_len` bytes from the
    /// part's current address pointer.
    pub addressed_read: bool,
    /// Read length used when `addressed_read` is false
    pub fixed_read_len: usize,
    /// Offset used for reads that don't carry their own offset
    pub read_offset: u16,
    /// Delay between bus-idle polls, in microseconds
    pub idle_poll_us: u32,
    /// Total bus-idle wait budget, in microseconds
    pub idle_timeout_us: u32,
}

impl Default for EepromConfig {
    fn default() -> Self {
        Self {
            slave_addr: DEFAULT_SLAVE_ADDR,
            max_transfer: DEFAULT_MAX_TRANSFER,
            addressed_read: true,
            fixed_read_len: DEFAULT_FIXED_READ_LEN,
            read_offset: 0x0060,
            idle_poll_us: 10,
            idle_timeout_us: 100_000,
        }
    }
}

impl EepromConfig {
    /// Create a configuration for the given slave address
    pub fn new(slave_addr: u8) -> Self {
        Self {
            slave_addr,
            ..Default::default()
        }
    }

    /// Set the per-call transfer cap
    pub fn with_max_transfer(mut self, max_transfer: usize) -> Self {
        self.max_transfer = max_transfer;
        self
    }

    /// Enable or disable addressed reads
    pub fn with_addressed_read(mut self, addressed_read: bool) -> Self {
        self.addressed_read = addressed_read;
        self
    }

    /// Set the fixed read length for non-addressed parts
    pub fn with_fixed_read_len(mut self, len: usize) -> Self {
        self.fixed_read_len = len;
        self
    }

    /// Set the offset used for reads without an explicit offset
    pub fn with_read_offset(mut self, offset: u16) -> Self {
        self.read_offset = offset;
        self
    }

    /// Set the bus-idle poll interval and total budget
    pub fn with_idle_wait(mut self, poll_us: u32, timeout_us: u32) -> Self {
        self.idle_poll_us = poll_us;
        self.idle_timeout_us = timeout_us;
        self
    }

    /// Clamp a requested length to the per-call cap
    pub fn clamp_len(&self, requested: usize) -> usize {
        core::cmp::min(requested, self.max_transfer)
    }
}

/// Wait for the bus controller to leave its busy state
///
/// Polls the controller's busy flag with `poll_us` between polls, for
/// at most `timeout_us` in total, then gives up with [`Error::Timeout`].
/// A controller error while polling is returned as-is.
#[maybe_async]
pub async fn wait_idle<M: I2cMaster + ?Sized>(
    master: &mut M,
    poll_us: u32,
    timeout_us: u32,
) -> Result<()> {
    let max_polls = if poll_us > 0 {
        timeout_us / poll_us
    } else {
        timeout_us // Fall back to polling once per microsecond
    };

    for _ in 0..max_polls {
        if !master.bus_busy().await? {
            return Ok(());
        }
        if poll_us > 0 {
            master.delay_us(poll_us).await;
        }
    }

    Err(Error::Timeout)
}

/// Read from the part into a caller buffer
///
/// The requested length is `dst.len()`, clamped to the configured cap.
/// For addressed parts this selects `offset` with a two-byte write
/// first; otherwise the part's own address pointer decides where the
/// `fixed_read_len` bytes come from and `offset` is ignored.
///
/// The bus must be idle before anything is sent; a controller error or
/// timeout during that wait aborts the call. The drain wait after the
/// data transfer is best-effort. A failed copy into `dst` reports
/// [`Error::BadAddress`] and no byte count, even though the bus
/// transaction already succeeded.
#[cfg(feature = "alloc")]
#[maybe_async]
pub async fn read<M, U>(
    master: &mut M,
    cfg: &EepromConfig,
    offset: u16,
    dst: &mut U,
) -> Result<usize>
where
    M: I2cMaster + ?Sized,
    U: UserBuffer + ?Sized,
{
    let count = cfg.clamp_len(dst.len());
    let xfer_len = if cfg.addressed_read {
        count
    } else {
        cfg.fixed_read_len
    };

    // Staging buffer covers both the transfer and the caller copy.
    let mut staged = alloc::vec![0u8; core::cmp::max(count, xfer_len)];

    wait_idle(master, cfg.idle_poll_us, cfg.idle_timeout_us).await?;

    if cfg.addressed_read {
        let header = offset.to_be_bytes();
        log::debug!(
            "eeprom: select offset {:#06x} at addr {:#04x}",
            offset,
            cfg.slave_addr
        );
        let mut select = [Message::write(cfg.slave_addr, &header)];
        master.transfer(&mut select).await?;
        wait_idle(master, cfg.idle_poll_us, cfg.idle_timeout_us).await?;
    }

    log::debug!(
        "eeprom: read {} bytes at addr {:#04x}",
        xfer_len,
        cfg.slave_addr
    );
    let mut data = [Message::read(cfg.slave_addr, &mut staged[..xfer_len])];
    master.transfer(&mut data).await?;

    // Post-transaction drain; the data is already in hand, so a busy
    // controller here is not fatal.
    if wait_idle(master, cfg.idle_poll_us, cfg.idle_timeout_us)
        .await
        .is_err()
    {
        log::debug!("eeprom: post-read idle wait did not settle");
    }

    dst.copy_to_user(&staged[..count])?;
    Ok(count)
}

/// Write caller bytes to the part
///
/// The caller buffer is duplicated before any bus activity; a failed
/// copy aborts with [`Error::BadAddress`] and nothing is sent. The
/// duplicated bytes go out as a single write-direction message: the
/// first two bytes are the big-endian offset header, the remainder the
/// payload, framed together the way the part's page write expects.
///
/// Buffers shorter than an offset header are sent unmodified; the
/// adapter or the part rejects them, not this layer.
#[cfg(feature = "alloc")]
#[maybe_async]
pub async fn write<M, U>(master: &mut M, cfg: &EepromConfig, src: &U) -> Result<usize>
where
    M: I2cMaster + ?Sized,
    U: UserBuffer + ?Sized,
{
    let count = cfg.clamp_len(src.len());

    let mut staged = alloc::vec![0u8; count];
    src.copy_from_user(&mut staged)?;

    log::debug!(
        "eeprom: write {} bytes at addr {:#04x}",
        count,
        cfg.slave_addr
    );
    let mut msgs = [Message::write(cfg.slave_addr, &staged)];
    master.transfer(&mut msgs).await?;

    Ok(count)
}

/// Read `buf.len()` bytes starting at `offset`
///
/// Convenience wrapper over [`read`] for callers holding a plain slice.
#[cfg(feature = "alloc")]
#[maybe_async]
pub async fn read_at<M: I2cMaster + ?Sized>(
    master: &mut M,
    cfg: &EepromConfig,
    offset: u16,
    buf: &mut [u8],
) -> Result<usize> {
    read(master, cfg, offset, buf).await
}

/// Write `payload` starting at `offset`
///
/// Frames the offset header for the caller and returns the number of
/// payload bytes written (the header is not counted).
#[cfg(feature = "alloc")]
#[maybe_async]
pub async fn write_at<M: I2cMaster + ?Sized>(
    master: &mut M,
    cfg: &EepromConfig,
    offset: u16,
    payload: &[u8],
) -> Result<usize> {
    let mut framed = alloc::vec::Vec::with_capacity(2 + payload.len());
    framed.extend_from_slice(&offset.to_be_bytes());
    framed.extend_from_slice(payload);

    let sent = write(master, cfg, framed.as_slice()).await?;
    Ok(sent.saturating_sub(2))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(all(test, feature = "std", feature = "is_sync"))]
mod tests {
    use super::*;
    use crate::error::Error;
    use alloc::vec;
    use alloc::vec::Vec;

    /// What one message looked like on the wire
    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Op {
        Write(Vec<u8>),
        Read(usize),
    }

    /// A mock bus adapter that journals every message
    ///
    /// Reads are filled with an incrementing pattern so copy ordering
    /// is observable. `busy_polls` makes the busy flag report busy for
    /// that many polls; `fail_transfer` makes every transfer fail.
    struct MockBus {
        journal: Vec<Op>,
        busy_polls: u32,
        fail_transfer: Option<Error>,
        polls_seen: u32,
    }

    impl MockBus {
        fn new() -> Self {
            Self {
                journal: Vec::new(),
                busy_polls: 0,
                fail_transfer: None,
                polls_seen: 0,
            }
        }
    }

    impl I2cMaster for MockBus {
        fn max_transfer_len(&self) -> usize {
            8192
        }

        fn transfer(&mut self, msgs: &mut [Message<'_>]) -> Result<()> {
            if let Some(e) = self.fail_transfer {
                return Err(e);
            }
            for msg in msgs.iter_mut() {
                if msg.is_read() {
                    for (i, b) in msg.read_buf.iter_mut().enumerate() {
                        *b = i as u8;
                    }
                    self.journal.push(Op::Read(msg.read_buf.len()));
                } else {
                    self.journal.push(Op::Write(msg.write_data.to_vec()));
                }
            }
            Ok(())
        }

        fn bus_busy(&mut self) -> Result<bool> {
            self.polls_seen += 1;
            if self.busy_polls > 0 {
                self.busy_polls -= 1;
                return Ok(true);
            }
            Ok(false)
        }

        fn delay_us(&mut self, _us: u32) {}
    }

    /// A caller buffer whose copies always fault
    struct FaultyBuffer {
        len: usize,
    }

    impl UserBuffer for FaultyBuffer {
        fn len(&self) -> usize {
            self.len
        }

        fn copy_from_user(&self, _dst: &mut [u8]) -> Result<()> {
            Err(Error::BadAddress)
        }

        fn copy_to_user(&mut self, _src: &[u8]) -> Result<()> {
            Err(Error::BadAddress)
        }
    }

    #[test]
    fn addressed_read_selects_offset_first() {
        let mut bus = MockBus::new();
        let cfg = EepromConfig::default();
        let mut buf = [0u8; 4];

        let n = read_at(&mut bus, &cfg, 0x0060, &mut buf).unwrap();

        assert_eq!(n, 4);
        assert_eq!(
            bus.journal,
            vec![Op::Write(vec![0x00, 0x60]), Op::Read(4)]
        );
        assert_eq!(buf, [0, 1, 2, 3]);
    }

    #[test]
    fn fixed_variant_reads_fixed_len() {
        let mut bus = MockBus::new();
        let cfg = EepromConfig::default().with_addressed_read(false);
        let mut buf = [0u8; 8];

        let n = read_at(&mut bus, &cfg, 0x0000, &mut buf).unwrap();

        assert_eq!(n, 8);
        assert_eq!(bus.journal, vec![Op::Read(32)]);
    }

    #[test]
    fn read_truncates_to_cap() {
        let mut bus = MockBus::new();
        let cfg = EepromConfig::default();
        let mut buf = vec![0u8; 10_000];

        let n = read_at(&mut bus, &cfg, 0x0000, &mut buf).unwrap();

        assert_eq!(n, 8192);
        assert_eq!(bus.journal.last(), Some(&Op::Read(8192)));
    }

    #[test]
    fn write_truncates_to_cap() {
        let mut bus = MockBus::new();
        let cfg = EepromConfig::default();
        let data = vec![0xA5u8; 10_000];

        let n = write(&mut bus, &cfg, data.as_slice()).unwrap();

        assert_eq!(n, 8192);
        match &bus.journal[0] {
            Op::Write(bytes) => assert_eq!(bytes.len(), 8192),
            other => panic!("unexpected op: {:?}", other),
        }
    }

    #[test]
    fn write_frames_header_and_payload_together() {
        let mut bus = MockBus::new();
        let cfg = EepromConfig::default();
        let data = [0x00, 0x60, 0xDE, 0xAD, 0xBE, 0xEF];

        let n = write(&mut bus, &cfg, &data[..]).unwrap();

        assert_eq!(n, 6);
        assert_eq!(bus.journal, vec![Op::Write(data.to_vec())]);
    }

    #[test]
    fn write_at_frames_for_the_caller() {
        let mut bus = MockBus::new();
        let cfg = EepromConfig::default();

        let n = write_at(&mut bus, &cfg, 0x0060, &[0xDE, 0xAD, 0xBE, 0xEF]).unwrap();

        assert_eq!(n, 4);
        assert_eq!(
            bus.journal,
            vec![Op::Write(vec![0x00, 0x60, 0xDE, 0xAD, 0xBE, 0xEF])]
        );
    }

    #[test]
    fn sub_header_write_passes_through() {
        let mut bus = MockBus::new();
        let cfg = EepromConfig::default();

        let n = write(&mut bus, &cfg, &[0x42u8][..]).unwrap();

        assert_eq!(n, 1);
        assert_eq!(bus.journal, vec![Op::Write(vec![0x42])]);
    }

    #[test]
    fn transfer_error_passes_through_unchanged() {
        let mut bus = MockBus::new();
        bus.fail_transfer = Some(Error::Nak);
        let cfg = EepromConfig::default();
        let mut buf = [0u8; 4];

        assert_eq!(read_at(&mut bus, &cfg, 0, &mut buf), Err(Error::Nak));
    }

    #[test]
    fn stuck_busy_times_out_before_any_transfer() {
        let mut bus = MockBus::new();
        bus.busy_polls = u32::MAX;
        let cfg = EepromConfig::default().with_idle_wait(10, 1000);
        let mut buf = [0u8; 4];

        assert_eq!(read_at(&mut bus, &cfg, 0, &mut buf), Err(Error::Timeout));
        assert!(bus.journal.is_empty());
        // Bounded: 1000us budget at 10us per poll
        assert_eq!(bus.polls_seen, 100);
    }

    #[test]
    fn copy_failure_after_read_is_bad_address() {
        let mut bus = MockBus::new();
        let cfg = EepromConfig::default();
        let mut dst = FaultyBuffer { len: 4 };

        assert_eq!(read(&mut bus, &cfg, 0, &mut dst), Err(Error::BadAddress));
        // The bus transaction itself went through.
        assert_eq!(bus.journal.last(), Some(&Op::Read(4)));
    }

    #[test]
    fn copy_failure_before_write_means_no_bus_activity() {
        let mut bus = MockBus::new();
        let cfg = EepromConfig::default();
        let src = FaultyBuffer { len: 6 };

        assert_eq!(write(&mut bus, &cfg, &src), Err(Error::BadAddress));
        assert!(bus.journal.is_empty());
    }

    #[test]
    fn busy_then_idle_proceeds() {
        let mut bus = MockBus::new();
        bus.busy_polls = 3;
        let cfg = EepromConfig::default();
        let mut buf = [0u8; 2];

        let n = read_at(&mut bus, &cfg, 0x0010, &mut buf).unwrap();
        assert_eq!(n, 2);
    }
}
