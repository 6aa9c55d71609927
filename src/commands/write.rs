//! Write command implementation

use crate::cli::{parse_hex_bytes, DeviceArgs};
use crate::commands::{eeprom_config, open_master};
use eeprog_core::engine;
use std::fs;
use std::path::Path;

/// Run the write command
pub fn run_write(
    args: &DeviceArgs,
    offset: u16,
    data: Option<&str>,
    input: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let payload = match (data, input) {
        (Some(hex), None) => parse_hex_bytes(hex)?,
        (None, Some(path)) => fs::read(path)?,
        _ => return Err("Provide the bytes with either --data or --input".into()),
    };
    if payload.is_empty() {
        return Err("Nothing to write".into());
    }

    let mut master = open_master(args)?;
    let cfg = eeprom_config(args);

    let n = engine::write_at(&mut master, &cfg, offset, &payload)?;
    println!("Wrote {} bytes at {:#06x}", n, offset);

    if n < payload.len() {
        log::warn!(
            "Payload of {} bytes was truncated to the {} byte transfer cap",
            payload.len(),
            cfg.max_transfer
        );
    }

    Ok(())
}
