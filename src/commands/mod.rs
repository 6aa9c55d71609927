//! Command implementations

pub mod dump;
pub mod read;
pub mod write;

use crate::cli::DeviceArgs;
use eeprog_core::bus::I2cMaster;
use eeprog_core::engine::EepromConfig;

/// The bus adapter a command operates on
pub type Master = Box<dyn I2cMaster + Send>;

/// Open the adapter named in the device arguments
pub fn open_master(args: &DeviceArgs) -> Result<Master, Box<dyn std::error::Error>> {
    if args.device == "dummy" {
        log::info!("Using the in-memory dummy EEPROM");
        return Ok(Box::new(eeprog_dummy::DummyEeprom::new_default()));
    }
    eeprog_linux_i2c::open_linux_i2c(&[("dev", args.device.as_str())])
}

/// Build the protocol configuration from the device arguments
pub fn eeprom_config(args: &DeviceArgs) -> EepromConfig {
    EepromConfig::new(args.addr)
}

/// Print bytes as a 16-per-row hexdump, offsets included
pub fn hexdump(base: u16, data: &[u8]) {
    for (row, chunk) in data.chunks(16).enumerate() {
        let offset = base as usize + row * 16;
        let bytes: Vec<String> = chunk.iter().map(|b| format!("{:02x}", b)).collect();
        println!("{:04x}: {}", offset, bytes.join(" "));
    }
}
