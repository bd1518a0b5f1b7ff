// CLASSIFICATION: COMMUNITY
// Filename: test_devmem_exposure.rs v0.1
// Date Modified: 2026-10-19
// Author: Lukas Bower

#![cfg(unix)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use txtfs::hal::DevMemWindow;
use txtfs::namespace::MemNamespace;
use txtfs::{ExposureConfig, ExposureController, LifecycleState};

/// Image file standing in for physical memory: 0x2000 bytes, window at 0x1000.
fn image(name: &str) -> PathBuf {
    let mut bytes = vec![0u8; 0x2000];
    bytes[0x1000..0x1008].copy_from_slice(&0x0102_0304_0506_0708u64.to_le_bytes());
    bytes[0x1100..0x1104].copy_from_slice(&0xdead_beefu32.to_le_bytes());
    bytes[0x1008] = 0x5a;
    let path = std::env::temp_dir().join(format!("txtfs-{}-{name}.img", std::process::id()));
    fs::write(&path, bytes).unwrap();
    path
}

fn config(device: &Path) -> ExposureConfig {
    let text = "[window]\nbase = 0x1000\nsize = 0x1000\n";
    let mut cfg = ExposureConfig::from_toml_str(text).unwrap();
    cfg.mem_device = device.to_path_buf();
    cfg
}

#[test]
fn reads_registers_from_image() {
    let _ = env_logger::builder().is_test(true).try_init();
    let path = image("reads");
    let cfg = config(&path);
    let ns = Arc::new(MemNamespace::new());
    let ctl = ExposureController::from_config(&cfg, Arc::new(DevMemWindow::new(&path)), ns.clone());
    ctl.initialize().unwrap();

    assert_eq!(ns.read("txt/public/status").unwrap(), "0x0102030405060708\n");
    assert_eq!(ns.read("txt/public/error-status").unwrap(), "0x5a\n");
    assert_eq!(ns.read("txt/public/version").unwrap(), "0xdeadbeef\n");
    assert_eq!(ns.read("txt/public/error-code").unwrap(), "0x00000000\n");

    ctl.teardown();
    fs::remove_file(path).ok();
}

#[test]
fn missing_device_fails_reads_not_startup() {
    let _ = env_logger::builder().is_test(true).try_init();
    let path = std::env::temp_dir().join("txtfs-no-such-device.img");
    let cfg = config(&path);
    let ns = Arc::new(MemNamespace::new());
    let ctl = ExposureController::from_config(&cfg, Arc::new(DevMemWindow::new(&path)), ns.clone());
    ctl.initialize().unwrap();
    assert!(ns.read("txt/public/status").unwrap_err().is_mapping());
    assert_eq!(ctl.state(), LifecycleState::Ready);
}

#[test]
fn truncated_image_is_internal_error() {
    let _ = env_logger::builder().is_test(true).try_init();
    let path = std::env::temp_dir().join(format!("txtfs-{}-short.img", std::process::id()));
    fs::write(&path, vec![0u8; 0x1004]).unwrap();
    let cfg = config(&path);
    let ns = Arc::new(MemNamespace::new());
    let ctl = ExposureController::from_config(&cfg, Arc::new(DevMemWindow::new(&path)), ns.clone());
    ctl.initialize().unwrap();
    let err = ns.read("txt/public/status").unwrap_err();
    assert!(matches!(err, txtfs::ExposeError::InternalConsistency(_)), "{err:?}");
    fs::remove_file(path).ok();
}
