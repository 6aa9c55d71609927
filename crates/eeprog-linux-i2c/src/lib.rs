//! eeprog-linux-i2c - Linux i2c-dev support
//!
//! This crate provides access to I2C EEPROMs through the Linux i2c-dev
//! interface at `/dev/i2c-N`.
//!
//! # Overview
//!
//! The kernel exposes each I2C adapter as a character device; the
//! `I2C_RDWR` ioctl issues a combined transaction whose messages reach
//! the wire back to back with a single stop at the end - exactly what
//! the EEPROM's write-then-read addressed read needs.
//!
//! # Example
//!
//! ```no_run
//! use eeprog_linux_i2c::LinuxI2c;
//! use eeprog_core::engine::{self, EepromConfig};
//!
//! let mut bus = LinuxI2c::open_device("/dev/i2c-1")?;
//! let cfg = EepromConfig::default();
//!
//! let mut page = [0u8; 32];
//! let n = engine::read_at(&mut bus, &cfg, 0x0000, &mut page)?;
//! println!("{:02x?}", &page[..n]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # System Requirements
//!
//! - Linux kernel with i2c-dev support enabled (`CONFIG_I2C_CHARDEV`)
//! - Read/write access to `/dev/i2c-N`
//! - May require adding the user to the `i2c` group or a udev rule

pub mod device;
pub mod error;

// Re-exports
pub use device::{parse_options, LinuxI2c, LinuxI2cConfig};
pub use error::{LinuxI2cError, Result};

/// Open a Linux i2c-dev adapter and return a boxed I2cMaster
///
/// This is a convenience function for use in the CLI device dispatch.
///
/// # Arguments
///
/// * `options` - Slice of (key, value) pairs from device string parsing
pub fn open_linux_i2c(
    options: &[(&str, &str)],
) -> std::result::Result<Box<dyn eeprog_core::bus::I2cMaster + Send>, Box<dyn std::error::Error>>
{
    let config = parse_options(options)?;
    let bus = LinuxI2c::open(&config)?;
    Ok(Box::new(bus))
}
