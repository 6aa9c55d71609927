//! eeprog-core - Core library for I2C EEPROM access
//!
//! This crate implements the transaction protocol for a serial EEPROM
//! hanging off an I2C bus: offset-header framing, write-then-read
//! addressed reads, bounded bus-idle polling, and the lifecycle of the
//! character device that exposes the part to callers. It is designed to
//! be `no_std` compatible for use in embedded environments.
//!
//! # Features
//!
//! - `std` - Enable standard library support (includes `alloc`);
//!   required for the `chardev` module together with `is_sync`
//! - `alloc` - Enable heap allocation for the transaction engine's
//!   staging buffers
//! - `is_sync` - Compile the async traits and engine as blocking code
//!
//! # Example
//!
//! ```ignore
//! use eeprog_core::{bus::I2cMaster, engine, engine::EepromConfig};
//!
//! fn dump_first_page<M: I2cMaster>(master: &mut M) {
//!     let cfg = EepromConfig::default();
//!     let mut page = [0u8; 32];
//!     match engine::read_at(master, &cfg, 0x0000, &mut page) {
//!         Ok(n) => println!("read {} bytes: {:02x?}", n, &page[..n]),
//!         Err(e) => println!("read failed: {}", e),
//!     }
//! }
//! ```

#![no_std]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
// Allow async fn in traits - we use maybe-async for dual sync/async support
#![allow(async_fn_in_trait)]

#[cfg(feature = "alloc")]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod bus;
#[cfg(all(feature = "std", feature = "is_sync"))]
pub mod chardev;
pub mod engine;
pub mod error;
pub mod uaccess;

pub use error::{Error, Result};
