// CLASSIFICATION: COMMUNITY
// Filename: txtdump.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-19

use clap::Parser;
use log::debug;
use std::io::{self, Write};
use std::path::PathBuf;
use txtfs::config::DEFAULT_MEM_DEVICE;
use txtfs::dump::{dump_region, parse_number};
use txtfs::registers::{TXT_PUB_CR_BASE, TXT_PUB_CR_SIZE};

#[derive(Parser)]
#[command(about = "Hex dump a physical address range (TXT public space by default)")]
struct Cli {
    /// Memory device or image to read
    #[arg(long, default_value = DEFAULT_MEM_DEVICE)]
    device: PathBuf,
    /// Start address, hex with 0x or decimal
    #[arg(long, value_parser = parse_number, default_value_t = TXT_PUB_CR_BASE)]
    base: u64,
    /// Number of bytes to dump
    #[arg(long, value_parser = parse_number, default_value_t = TXT_PUB_CR_SIZE)]
    length: u64,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match dump_region(&cli.device, cli.base, cli.length, &mut out) {
        Ok(n) => {
            let _ = out.flush();
            debug!("dumped {n} bytes from {}", cli.device.display());
        }
        Err(e) => {
            eprintln!("txtdump: {}: {e}", cli.device.display());
            std::process::exit(1);
        }
    }
}
