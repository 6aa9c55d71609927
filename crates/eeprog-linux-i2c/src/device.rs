//! Linux i2c-dev device implementation
//!
//! This module provides the `LinuxI2c` struct that implements the
//! `I2cMaster` trait using Linux's i2c-dev interface.

use crate::error::{LinuxI2cError, Result};

use eeprog_core::bus::{I2cMaster, Message};
use eeprog_core::error::{Error as CoreError, Result as CoreResult};

use std::fs::{File, OpenOptions};
use std::os::unix::io::AsRawFd;

/// Linux i2c-dev ioctl constants
mod ioctl {
    /// Query adapter functionality (unsigned long out-parameter)
    pub const I2C_FUNCS: libc::c_ulong = 0x0705;
    /// Combined read/write transfer, one stop at the end
    pub const I2C_RDWR: libc::c_ulong = 0x0707;

    /// Functionality bit: plain i2c-level commands
    pub const I2C_FUNC_I2C: libc::c_ulong = 0x0000_0001;

    /// Kernel cap on messages per I2C_RDWR call
    pub const I2C_RDWR_IOCTL_MAX_MSGS: usize = 42;

    /// Kernel cap on bytes per message (i2c-dev rejects more)
    pub const MAX_MSG_LEN: usize = 8192;
}

/// Message structure for the I2C_RDWR ioctl
/// This must match the kernel's struct i2c_msg layout
#[repr(C)]
struct I2cMsgRaw {
    addr: u16,  // __u16 addr
    flags: u16, // __u16 flags
    len: u16,   // __u16 len
    buf: *mut u8, // __u8 *buf
}

/// Argument structure for the I2C_RDWR ioctl
/// This must match the kernel's struct i2c_rdwr_ioctl_data layout
#[repr(C)]
struct I2cRdwrIoctlData {
    msgs: *mut I2cMsgRaw, // struct i2c_msg *msgs
    nmsgs: u32,           // __u32 nmsgs
}

/// Configuration for opening a Linux i2c-dev adapter
#[derive(Debug, Clone, Default)]
pub struct LinuxI2cConfig {
    /// Device path (e.g., "/dev/i2c-1")
    pub device: String,
}

impl LinuxI2cConfig {
    /// Create a new configuration with the given device path
    pub fn new(device: impl Into<String>) -> Self {
        Self {
            device: device.into(),
        }
    }
}

/// Linux I2C adapter using the i2c-dev interface
///
/// This struct implements the `I2cMaster` trait for Linux systems
/// using the `/dev/i2c-N` device interface.
#[derive(Debug)]
pub struct LinuxI2c {
    /// File handle for the i2c-dev device
    file: File,
}

impl LinuxI2c {
    /// Open a Linux i2c-dev adapter with the given configuration
    pub fn open(config: &LinuxI2cConfig) -> Result<Self> {
        if config.device.is_empty() {
            return Err(LinuxI2cError::NoDevice);
        }

        log::debug!("linux_i2c: Opening device {}", config.device);

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&config.device)
            .map_err(|e| LinuxI2cError::OpenFailed {
                path: config.device.clone(),
                source: e,
            })?;

        let fd = file.as_raw_fd();

        // The EEPROM protocol needs raw i2c messages, not SMBus emulation
        let mut funcs: libc::c_ulong = 0;
        let ret = unsafe { libc::ioctl(fd, ioctl::I2C_FUNCS, &mut funcs as *mut libc::c_ulong) };
        if ret < 0 {
            return Err(LinuxI2cError::FuncsQueryFailed(
                std::io::Error::last_os_error(),
            ));
        }
        if funcs & ioctl::I2C_FUNC_I2C == 0 {
            return Err(LinuxI2cError::PlainI2cNotSupported {
                path: config.device.clone(),
            });
        }

        log::info!(
            "linux_i2c: Opened {} (funcs {:#010x})",
            config.device,
            funcs
        );

        Ok(Self { file })
    }

    /// Open a device with default settings
    pub fn open_device(device: &str) -> Result<Self> {
        Self::open(&LinuxI2cConfig::new(device))
    }

    /// Issue one I2C_RDWR transaction
    fn rdwr(&mut self, msgs: &mut [Message<'_>]) -> Result<()> {
        if msgs.is_empty() {
            return Err(LinuxI2cError::InvalidParameter(
                "Transaction cannot be empty".into(),
            ));
        }
        if msgs.len() > ioctl::I2C_RDWR_IOCTL_MAX_MSGS {
            return Err(LinuxI2cError::TooManyMessages {
                count: msgs.len(),
                limit: ioctl::I2C_RDWR_IOCTL_MAX_MSGS,
            });
        }

        let mut raw: Vec<I2cMsgRaw> = Vec::with_capacity(msgs.len());
        for msg in msgs.iter_mut() {
            if msg.len() > ioctl::MAX_MSG_LEN {
                return Err(LinuxI2cError::InvalidParameter(format!(
                    "Message of {} bytes exceeds the {} byte kernel limit",
                    msg.len(),
                    ioctl::MAX_MSG_LEN
                )));
            }
            let (flags, len, buf) = if msg.is_read() {
                (
                    msg.flags.bits(),
                    msg.read_buf.len() as u16,
                    msg.read_buf.as_mut_ptr(),
                )
            } else {
                (
                    msg.flags.bits(),
                    msg.write_data.len() as u16,
                    msg.write_data.as_ptr() as *mut u8,
                )
            };
            raw.push(I2cMsgRaw {
                addr: msg.addr as u16,
                flags,
                len,
                buf,
            });
        }

        let mut arg = I2cRdwrIoctlData {
            msgs: raw.as_mut_ptr(),
            nmsgs: raw.len() as u32,
        };

        let fd = self.file.as_raw_fd();
        let ret = unsafe { libc::ioctl(fd, ioctl::I2C_RDWR, &mut arg as *mut I2cRdwrIoctlData) };
        if ret < 0 {
            return Err(LinuxI2cError::TransferFailed(
                std::io::Error::last_os_error(),
            ));
        }

        Ok(())
    }
}

impl I2cMaster for LinuxI2c {
    fn max_transfer_len(&self) -> usize {
        ioctl::MAX_MSG_LEN
    }

    fn transfer(&mut self, msgs: &mut [Message<'_>]) -> CoreResult<()> {
        self.rdwr(msgs).map_err(|e| {
            log::debug!("linux_i2c: transfer failed: {}", e);
            match e {
                // i2c-core reports a NAK as EREMOTEIO/ENXIO
                LinuxI2cError::TransferFailed(ref io)
                    if matches!(
                        io.raw_os_error(),
                        Some(libc::EREMOTEIO) | Some(libc::ENXIO)
                    ) =>
                {
                    CoreError::Nak
                }
                LinuxI2cError::TransferFailed(ref io)
                    if io.raw_os_error() == Some(libc::EAGAIN) =>
                {
                    CoreError::ArbitrationLost
                }
                LinuxI2cError::TransferFailed(ref io)
                    if io.raw_os_error() == Some(libc::ETIMEDOUT) =>
                {
                    CoreError::Timeout
                }
                _ => CoreError::BusError,
            }
        })
    }

    fn bus_busy(&mut self) -> CoreResult<bool> {
        // i2c-dev has no busy register; the adapter driver waits for
        // the bus inside I2C_RDWR, so from here it is always idle.
        Ok(false)
    }

    fn delay_us(&mut self, us: u32) {
        std::thread::sleep(std::time::Duration::from_micros(us as u64));
    }
}

/// Parse programmer options from a list of key-value pairs
pub fn parse_options(options: &[(&str, &str)]) -> std::result::Result<LinuxI2cConfig, String> {
    let mut config = LinuxI2cConfig::default();

    for (key, value) in options {
        match *key {
            "dev" => {
                config.device = value.to_string();
            }
            _ => {
                log::warn!("linux_i2c: Unknown option: {}={}", key, value);
            }
        }
    }

    if config.device.is_empty() {
        return Err("No device specified. Use dev=/dev/i2c-N".to_string());
    }

    Ok(config)
}
