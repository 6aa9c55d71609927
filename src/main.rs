//! eeprog - an I2C EEPROM programmer
//!
//! Reads and writes serial EEPROMs with two-byte addressing (24C32 and
//! up) through a Linux i2c-dev adapter. The protocol engine lives in
//! `eeprog-core`; this binary is argument parsing and dispatch.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};

fn main() {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // Set log level based on verbosity
    match cli.verbose {
        0 => {} // default (info)
        1 => log::set_max_level(log::LevelFilter::Debug),
        _ => log::set_max_level(log::LevelFilter::Trace),
    }

    let result = match cli.command {
        Commands::Read {
            device,
            offset,
            length,
            output,
        } => commands::read::run_read(&device, offset, length, output.as_deref()),
        Commands::Write {
            device,
            offset,
            data,
            input,
        } => commands::write::run_write(&device, offset, data.as_deref(), input.as_deref()),
        Commands::Dump {
            device,
            size,
            page,
            output,
        } => commands::dump::run_dump(&device, size, page, &output),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
