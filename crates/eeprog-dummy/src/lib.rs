//! eeprog-dummy - In-memory EEPROM emulator for testing
//!
//! This crate provides a dummy bus adapter that emulates a two-byte
//! addressed serial EEPROM in memory. It's useful for testing and
//! development without real hardware: it models the part's address
//! pointer, NAKs wrong-address traffic, simulates a busy controller,
//! and journals every message so tests can assert on transaction
//! ordering.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "alloc")]
extern crate alloc;

#[cfg(feature = "alloc")]
use alloc::vec;
#[cfg(feature = "alloc")]
use alloc::vec::Vec;

use eeprog_core::bus::{I2cMaster, Message};
use eeprog_core::error::{Error, Result};

/// Configuration for the dummy EEPROM
#[derive(Debug, Clone)]
pub struct DummyConfig {
    /// 7-bit slave address the part answers to
    pub slave_addr: u8,
    /// Size of the emulated array in bytes
    pub size: usize,
    /// How many busy polls the controller reports after each transfer
    pub busy_polls_after_transfer: u32,
}

impl Default for DummyConfig {
    fn default() -> Self {
        Self {
            slave_addr: 0x50,
            size: 32 * 1024, // 24C256
            busy_polls_after_transfer: 0,
        }
    }
}

/// What one journaled message carried
#[cfg(feature = "alloc")]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxKind {
    /// Write-direction message with its bytes
    Write(Vec<u8>),
    /// Read-direction message with its length
    Read(usize),
}

/// One journaled message
#[cfg(feature = "alloc")]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxRecord {
    /// Slave address the message targeted
    pub addr: u8,
    /// Direction and payload
    pub kind: TxKind,
}

/// Dummy EEPROM bus adapter
///
/// Emulates the part and its bus controller in memory. A write whose
/// first two bytes are a big-endian offset moves the internal address
/// pointer and stores any following payload there; a read returns
/// bytes from the pointer and advances it. The pointer and stored data
/// wrap at the configured size, like the real parts.
#[cfg(feature = "alloc")]
pub struct DummyEeprom {
    config: DummyConfig,
    mem: Vec<u8>,
    cursor: usize,
    busy_polls: u32,
    stuck_busy: bool,
    journal: Vec<TxRecord>,
}

#[cfg(feature = "alloc")]
impl DummyEeprom {
    /// Create a new dummy EEPROM with the given configuration
    pub fn new(config: DummyConfig) -> Self {
        let mem = vec![0xFF; config.size];
        Self {
            config,
            mem,
            cursor: 0,
            busy_polls: 0,
            stuck_busy: false,
            journal: Vec::new(),
        }
    }

    /// Create a new dummy EEPROM with default configuration (24C256)
    pub fn new_default() -> Self {
        Self::new(DummyConfig::default())
    }

    /// Create a dummy EEPROM with pre-filled data
    pub fn with_data(config: DummyConfig, initial_data: &[u8]) -> Self {
        let mut part = Self::new(config);
        let len = core::cmp::min(initial_data.len(), part.mem.len());
        part.mem[..len].copy_from_slice(&initial_data[..len]);
        part
    }

    /// Get a reference to the emulated array
    pub fn data(&self) -> &[u8] {
        &self.mem
    }

    /// Get a mutable reference to the emulated array
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.mem
    }

    /// Get the configuration
    pub fn config(&self) -> &DummyConfig {
        &self.config
    }

    /// Messages seen so far, in bus order
    pub fn journal(&self) -> &[TxRecord] {
        &self.journal
    }

    /// Forget the journal
    pub fn clear_journal(&mut self) {
        self.journal.clear();
    }

    /// Pin the busy flag so every idle wait times out
    pub fn set_stuck_busy(&mut self, stuck: bool) {
        self.stuck_busy = stuck;
    }

    fn handle_write(&mut self, data: &[u8]) -> Result<()> {
        // A write must at least carry the two address bytes; the real
        // part NAKs anything shorter.
        if data.len() < 2 {
            log::debug!("dummy: NAK, write of {} bytes has no offset", data.len());
            return Err(Error::Nak);
        }

        let offset = u16::from_be_bytes([data[0], data[1]]) as usize;
        self.cursor = offset % self.config.size;

        for &byte in &data[2..] {
            self.mem[self.cursor] = byte;
            self.cursor = (self.cursor + 1) % self.config.size;
        }
        Ok(())
    }

    fn handle_read(&mut self, buf: &mut [u8]) -> Result<()> {
        for byte in buf.iter_mut() {
            *byte = self.mem[self.cursor];
            self.cursor = (self.cursor + 1) % self.config.size;
        }
        Ok(())
    }
}

#[cfg(feature = "alloc")]
impl I2cMaster for DummyEeprom {
    fn max_transfer_len(&self) -> usize {
        8192
    }

    fn transfer(&mut self, msgs: &mut [Message<'_>]) -> Result<()> {
        for msg in msgs.iter_mut() {
            let kind = if msg.is_read() {
                TxKind::Read(msg.read_buf.len())
            } else {
                TxKind::Write(msg.write_data.to_vec())
            };
            self.journal.push(TxRecord {
                addr: msg.addr,
                kind,
            });

            if msg.addr != self.config.slave_addr {
                log::debug!("dummy: NAK, no part at {:#04x}", msg.addr);
                return Err(Error::Nak);
            }

            if msg.is_read() {
                self.handle_read(msg.read_buf)?;
            } else {
                self.handle_write(msg.write_data)?;
            }
        }

        self.busy_polls = self.config.busy_polls_after_transfer;
        Ok(())
    }

    fn bus_busy(&mut self) -> Result<bool> {
        if self.stuck_busy {
            return Ok(true);
        }
        if self.busy_polls > 0 {
            self.busy_polls -= 1;
            return Ok(true);
        }
        Ok(false)
    }

    fn delay_us(&mut self, _us: u32) {
        // No delay needed for in-memory operations
    }
}

#[cfg(all(test, feature = "std"))]
mod tests {
    use super::*;
    use eeprog_core::chardev::{self, DevId, RegistrationFramework};
    use eeprog_core::engine::{self, EepromConfig};
    use eeprog_core::uaccess::UserBuffer;

    fn cfg() -> EepromConfig {
        EepromConfig::default().with_idle_wait(1, 1000)
    }

    #[test]
    fn roundtrip_scenario() {
        let mut part = DummyEeprom::new_default();
        let c = cfg();

        // Offset header 0x0060 plus four payload bytes, framed by the caller.
        let n = engine::write(&mut part, &c, &[0x00, 0x60, 0xDE, 0xAD, 0xBE, 0xEF][..]).unwrap();
        assert_eq!(n, 6);

        let mut buf = [0u8; 4];
        let n = engine::read_at(&mut part, &c, 0x0060, &mut buf).unwrap();
        assert_eq!(n, 4);
        assert_eq!(buf, [0xDE, 0xAD, 0xBE, 0xEF]);
    }

    #[test]
    fn roundtrip_large_payload() {
        let mut part = DummyEeprom::new_default();
        let c = cfg();

        let payload: Vec<u8> = (0..4096u32).map(|i| (i % 251) as u8).collect();
        let n = engine::write_at(&mut part, &c, 0x0100, &payload).unwrap();
        assert_eq!(n, payload.len());

        let mut back = vec![0u8; payload.len()];
        let n = engine::read_at(&mut part, &c, 0x0100, &mut back).unwrap();
        assert_eq!(n, payload.len());
        assert_eq!(back, payload);
    }

    #[test]
    fn oversized_write_truncates_to_cap() {
        let mut part = DummyEeprom::new_default();
        let c = cfg();

        let mut framed = vec![0u8; 10_000];
        framed[0] = 0x00;
        framed[1] = 0x00;
        for (i, b) in framed[2..].iter_mut().enumerate() {
            *b = (i % 256) as u8;
        }

        let n = engine::write(&mut part, &c, framed.as_slice()).unwrap();
        assert_eq!(n, 8192);

        // Only the capped payload landed in the array.
        assert_eq!(&part.data()[..8190], &framed[2..8192]);
        assert_eq!(part.data()[8190], 0xFF);
    }

    #[test]
    fn oversized_read_truncates_to_cap() {
        let mut part = DummyEeprom::new_default();
        let c = cfg();

        let mut buf = vec![0u8; 10_000];
        let n = engine::read_at(&mut part, &c, 0x0000, &mut buf).unwrap();
        assert_eq!(n, 8192);
        match part.journal().last() {
            Some(TxRecord {
                kind: TxKind::Read(len),
                ..
            }) => assert_eq!(*len, 8192),
            other => panic!("unexpected journal tail: {:?}", other),
        }
    }

    #[test]
    fn wrong_slave_address_naks() {
        let mut part = DummyEeprom::new_default();
        let c = EepromConfig::new(0x57).with_idle_wait(1, 1000);

        let mut buf = [0u8; 4];
        assert_eq!(
            engine::read_at(&mut part, &c, 0x0000, &mut buf),
            Err(Error::Nak)
        );
    }

    #[test]
    fn sub_header_write_is_a_bus_error_not_validation() {
        let mut part = DummyEeprom::new_default();
        let c = cfg();

        // The engine passes it through; the part NAKs it.
        assert_eq!(engine::write(&mut part, &c, &[0x42u8][..]), Err(Error::Nak));
        assert_eq!(
            part.journal(),
            &[TxRecord {
                addr: 0x50,
                kind: TxKind::Write(vec![0x42]),
            }]
        );
    }

    #[test]
    fn stuck_busy_times_out() {
        let mut part = DummyEeprom::new_default();
        part.set_stuck_busy(true);
        let c = cfg();

        let mut buf = [0u8; 4];
        assert_eq!(
            engine::read_at(&mut part, &c, 0x0000, &mut buf),
            Err(Error::Timeout)
        );
        assert!(part.journal().is_empty());
    }

    #[test]
    fn fixed_read_variant_uses_part_pointer() {
        let data: Vec<u8> = (0..64u8).collect();
        let mut part = DummyEeprom::with_data(DummyConfig::default(), &data);
        let c = cfg().with_addressed_read(false).with_fixed_read_len(32);

        let mut buf = [0u8; 8];
        let n = engine::read_at(&mut part, &c, 0x0000, &mut buf).unwrap();
        assert_eq!(n, 8);
        // Pointer starts at zero, read transfers the fixed 32 bytes.
        assert_eq!(buf, [0, 1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(
            part.journal(),
            &[TxRecord {
                addr: 0x50,
                kind: TxKind::Read(32),
            }]
        );
    }

    /// Caller buffer whose copy-in always faults
    struct FaultySink {
        len: usize,
    }

    impl UserBuffer for FaultySink {
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
    fn copy_fault_after_successful_bus_read() {
        let mut part = DummyEeprom::new_default();
        let c = cfg();

        let mut sink = FaultySink { len: 4 };
        assert_eq!(
            engine::read(&mut part, &c, 0x0000, &mut sink),
            Err(Error::BadAddress)
        );
        // The bus side completed; the failure is purely in the copy.
        assert_eq!(part.journal().len(), 2);
    }

    /// Framework stub for lifecycle-backed tests
    struct StubFramework;

    impl RegistrationFramework for StubFramework {
        fn alloc_region(&mut self, _name: &str) -> Result<DevId> {
            Ok(DevId {
                major: 240,
                minor: 0,
            })
        }

        fn release_region(&mut self, _devt: DevId) {}

        fn create_node(&mut self, _class: &str, _devt: DevId, _name: &str) -> Result<()> {
            Ok(())
        }

        fn destroy_node(&mut self, _devt: DevId) {}

        fn bind_ops(&mut self, _devt: DevId) -> Result<()> {
            Ok(())
        }

        fn unbind_ops(&mut self, _devt: DevId) {}
    }

    #[test]
    fn concurrent_reads_never_interleave_transactions() {
        let mut part = DummyEeprom::new_default();
        // Make the controller linger busy after every transfer so an
        // unserialized second caller would have a window to sneak in.
        part.config.busy_polls_after_transfer = 2;
        for b in &mut part.data_mut()[0x60..0x70] {
            *b = 0xA5;
        }

        let mut fw = StubFramework;
        let dev = chardev::register_device(
            &mut fw,
            "i2c",
            "eeprom0",
            part,
            EepromConfig::default().with_idle_wait(1, 10_000),
        )
        .unwrap();

        std::thread::scope(|s| {
            for _ in 0..2 {
                let handle = dev.open();
                s.spawn(move || {
                    for _ in 0..50 {
                        let mut buf = [0u8; 8];
                        let n = handle.read(&mut buf).unwrap();
                        assert_eq!(n, 8);
                        assert_eq!(buf, [0xA5; 8]);
                    }
                });
            }
        });

        let part = chardev::unregister_device(&mut fw, dev).expect("no handles left");

        // Every offset select is immediately followed by its own read.
        let journal = part.journal();
        assert_eq!(journal.len(), 2 * 2 * 50);
        for pair in journal.chunks(2) {
            assert_eq!(pair[0].kind, TxKind::Write(vec![0x00, 0x60]));
            assert_eq!(pair[1].kind, TxKind::Read(8));
        }
    }
}
