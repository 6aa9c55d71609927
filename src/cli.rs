//! CLI argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Parse a string as a hex or decimal u32
fn parse_hex_u32(s: &str) -> Result<u32, String> {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16).map_err(|e| format!("Invalid hex value: {}", e))
    } else {
        s.parse::<u32>().map_err(|e| format!("Invalid number: {}", e))
    }
}

/// Parse a string as a hex or decimal u16
pub fn parse_hex_u16(s: &str) -> Result<u16, String> {
    let v = parse_hex_u32(s)?;
    u16::try_from(v).map_err(|_| format!("Value {:#x} does not fit in 16 bits", v))
}

/// Parse a string as a hex or decimal u8
pub fn parse_hex_u8(s: &str) -> Result<u8, String> {
    let v = parse_hex_u32(s)?;
    u8::try_from(v).map_err(|_| format!("Value {:#x} does not fit in 8 bits", v))
}

/// Parse a hex byte string like "deadbeef" or "de ad be ef"
pub fn parse_hex_bytes(s: &str) -> Result<Vec<u8>, String> {
    let cleaned: String = s
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ',')
        .collect();
    let cleaned = cleaned
        .strip_prefix("0x")
        .or_else(|| cleaned.strip_prefix("0X"))
        .unwrap_or(&cleaned);

    if cleaned.len() % 2 != 0 {
        return Err("Hex string must have an even number of digits".to_string());
    }

    (0..cleaned.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&cleaned[i..i + 2], 16)
                .map_err(|e| format!("Invalid hex byte: {}", e))
        })
        .collect()
}

#[derive(Parser)]
#[command(name = "eeprog")]
#[command(author, version, about = "I2C EEPROM programmer", long_about = None)]
pub struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Adapter and slave selection shared across commands
#[derive(clap::Args, Debug, Clone)]
pub struct DeviceArgs {
    /// I2C adapter device (/dev/i2c-N), or "dummy" for the in-memory emulator
    #[arg(short = 'd', long)]
    pub device: String,

    /// EEPROM slave address
    #[arg(short = 'a', long, default_value = "0x50", value_parser = parse_hex_u8)]
    pub addr: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Read bytes from the EEPROM
    Read {
        #[command(flatten)]
        device: DeviceArgs,

        /// Byte offset to read from
        #[arg(short = 'o', long, default_value = "0x0000", value_parser = parse_hex_u16)]
        offset: u16,

        /// Number of bytes to read
        #[arg(short = 'n', long, default_value_t = 32)]
        length: usize,

        /// Write the bytes to a file instead of hexdumping them
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Write bytes to the EEPROM
    Write {
        #[command(flatten)]
        device: DeviceArgs,

        /// Byte offset to write at
        #[arg(short = 'o', long, default_value = "0x0000", value_parser = parse_hex_u16)]
        offset: u16,

        /// Bytes as a hex string (e.g. "deadbeef")
        #[arg(long, conflicts_with = "input")]
        data: Option<String>,

        /// File whose contents to write
        #[arg(short = 'i', long)]
        input: Option<PathBuf>,
    },

    /// Dump the whole part to a file
    Dump {
        #[command(flatten)]
        device: DeviceArgs,

        /// Part size in bytes
        #[arg(short = 's', long, default_value = "0x8000", value_parser = parse_hex_u32)]
        size: u32,

        /// Bytes per read transaction
        #[arg(long, default_value_t = 32)]
        page: usize,

        /// Output file
        output: PathBuf,
    },
}
