// CLASSIFICATION: COMMUNITY
// Filename: txtinfo.rs v0.1
// Date Modified: 2026-10-19
// Author: Lukas Bower

//! Expose the TXT registers in an in‑process namespace and print every leaf.

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use txtfs::hal::{DevMemWindow, PhysWindow, SimWindow};
use txtfs::namespace::MemNamespace;
use txtfs::{ExposeError, ExposureConfig, ExposureController};

#[derive(Parser)]
#[command(about = "Print TXT public-space registers through the exposure namespace")]
struct Cli {
    /// TOML config; defaults to $TXTFS_CONFIG or the built-in TXT layout
    #[arg(long)]
    config: Option<PathBuf>,
    /// Memory device to map
    #[arg(long)]
    device: Option<PathBuf>,
    /// Read from a simulated register bank instead of hardware
    #[arg(long)]
    sim: bool,
    /// Only print this register
    #[arg(long)]
    register: Option<String>,
}

fn run(cli: Cli) -> Result<bool, ExposeError> {
    let mut config = match &cli.config {
        Some(path) => ExposureConfig::from_file(path)?,
        None => ExposureConfig::load()?,
    };
    if let Some(device) = cli.device {
        config.mem_device = device;
    }

    let window: Arc<dyn PhysWindow> = if cli.sim {
        let sim = SimWindow::with_txt_sample(config.window(), config.registers.iter())
            .map_err(ExposeError::Mapping)?;
        Arc::new(sim)
    } else {
        Arc::new(DevMemWindow::new(&config.mem_device))
    };
    let ns = Arc::new(MemNamespace::new());
    let controller = ExposureController::from_config(&config, window, ns.clone());
    controller.initialize()?;

    let names: Vec<String> = match &cli.register {
        Some(name) if config.registers.get(name).is_none() => {
            return Err(ExposeError::UnknownRegister(name.clone()))
        }
        Some(name) => vec![name.clone()],
        None => config.registers.iter().map(|d| d.name.clone()).collect(),
    };

    let mut ok = true;
    for name in names {
        let path = config.namespace.leaf_path(&name);
        match ns.read(&path) {
            Ok(value) => print!("{path}: {value}"),
            Err(e) => {
                eprintln!("{path}: {e}");
                ok = false;
            }
        }
    }
    controller.teardown();
    Ok(ok)
}

fn main() {
    env_logger::init();
    match run(Cli::parse()) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("txtinfo: {e}");
            std::process::exit(2);
        }
    }
}
