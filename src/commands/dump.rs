//! Dump command implementation

use crate::cli::DeviceArgs;
use crate::commands::{eeprom_config, open_master};
use eeprog_core::engine;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Run the dump command
pub fn run_dump(
    args: &DeviceArgs,
    size: u32,
    page: usize,
    output: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    if size == 0 || size > 0x1_0000 {
        return Err(format!(
            "Part size {:#x} is outside the 2-byte address space",
            size
        )
        .into());
    }
    if page == 0 {
        return Err("Page size cannot be zero".into());
    }

    let mut master = open_master(args)?;
    let cfg = eeprom_config(args);

    let total = size as usize;
    let mut data = vec![0u8; total];

    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})")?
            .progress_chars("#>-"),
    );

    let mut offset = 0usize;
    while offset < total {
        let chunk_size = std::cmp::min(page, total - offset);
        let chunk = &mut data[offset..offset + chunk_size];

        engine::read_at(&mut master, &cfg, offset as u16, chunk)?;

        offset += chunk_size;
        pb.set_position(offset as u64);
    }
    pb.finish();

    let mut file = File::create(output)?;
    file.write_all(&data)?;

    println!("Wrote {} bytes to {}", total, output.display());

    Ok(())
}
