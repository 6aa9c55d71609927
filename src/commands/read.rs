//! Read command implementation

use crate::cli::DeviceArgs;
use crate::commands::{eeprom_config, hexdump, open_master};
use eeprog_core::engine;
use std::fs;
use std::path::Path;

/// Run the read command
pub fn run_read(
    args: &DeviceArgs,
    offset: u16,
    length: usize,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut master = open_master(args)?;
    let cfg = eeprom_config(args);

    let mut buf = vec![0u8; length];
    let n = engine::read_at(&mut master, &cfg, offset, &mut buf)?;

    match output {
        Some(path) => {
            fs::write(path, &buf[..n])?;
            println!("Wrote {} bytes to {}", n, path.display());
        }
        None => hexdump(offset, &buf[..n]),
    }

    Ok(())
}
