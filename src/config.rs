// CLASSIFICATION: COMMUNITY
// Filename: config.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-19

//! Exposure configuration.
//!
//! Defaults describe the TXT public space. A TOML file can override the
//! window, the namespace layout and the register list:
//!
//! ```toml
//! device = "/dev/mem"
//!
//! [window]
//! base = 0xfed30000
//! size = 0x10000
//!
//! [namespace]
//! root = "txt"
//! subdir = "public"
//! mode = 0o440
//!
//! [[register]]
//! name = "status"
//! offset = 0x000
//! width = 8
//! ```
//!
//! Missing sections keep their defaults. An empty register list means the
//! default seven registers.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;
use crate::namespace::{NamespaceLayout, NodeMode, DEFAULT_ROOT, DEFAULT_SUBDIR};
use crate::registers::{
    txt_registers, DescriptorTable, RegisterDescriptor, WindowLayout, TXT_PUB_CR_BASE,
    TXT_PUB_CR_SIZE,
};

/// Names a TOML file to load instead of the defaults.
pub const CONFIG_ENV: &str = "TXTFS_CONFIG";
/// Overrides the memory device path.
pub const MEM_DEVICE_ENV: &str = "TXTFS_MEM_DEVICE";
/// Memory device used when nothing else is configured.
pub const DEFAULT_MEM_DEVICE: &str = "/dev/mem";

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    device: Option<PathBuf>,
    window: Option<RawWindow>,
    namespace: Option<RawNamespace>,
    #[serde(default)]
    register: Vec<RawRegister>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawWindow {
    base: Option<u64>,
    size: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawNamespace {
    root: Option<String>,
    subdir: Option<String>,
    mode: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRegister {
    name: String,
    offset: u64,
    width: u8,
}

/// Validated configuration for one exposure subsystem.
#[derive(Debug, Clone)]
pub struct ExposureConfig {
    pub namespace: NamespaceLayout,
    pub registers: DescriptorTable,
    pub mem_device: PathBuf,
}

impl ExposureConfig {
    /// TXT public space, `txt/public`, mode `0440`, `/dev/mem`.
    pub fn txt_default() -> Result<Self, ConfigError> {
        Ok(Self {
            namespace: NamespaceLayout::default(),
            registers: DescriptorTable::txt_default()?,
            mem_device: PathBuf::from(DEFAULT_MEM_DEVICE),
        })
    }

    /// Parse and validate TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(text)?;
        Self::from_raw(raw)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Load from `TXTFS_CONFIG` if set, else the defaults, then apply
    /// `TXTFS_MEM_DEVICE`.
    pub fn load() -> Result<Self, ConfigError> {
        let mut cfg = match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => Self::txt_default()?,
        };
        if let Some(device) = std::env::var_os(MEM_DEVICE_ENV) {
            cfg.mem_device = PathBuf::from(device);
        }
        Ok(cfg)
    }

    pub fn window(&self) -> WindowLayout {
        self.registers.window()
    }

    fn from_raw(raw: RawConfig) -> Result<Self, ConfigError> {
        let w = raw.window.unwrap_or_default();
        let window = WindowLayout::new(
            w.base.unwrap_or(TXT_PUB_CR_BASE),
            w.size.unwrap_or(TXT_PUB_CR_SIZE),
        )?;

        let ns = raw.namespace.unwrap_or_default();
        let mode = match ns.mode {
            Some(bits) => NodeMode::from_octal(bits)?,
            None => NodeMode::READ_ONLY,
        };
        let namespace = NamespaceLayout::new(
            ns.root.as_deref().unwrap_or(DEFAULT_ROOT),
            ns.subdir.as_deref().unwrap_or(DEFAULT_SUBDIR),
            mode,
        )?;

        let entries = if raw.register.is_empty() {
            txt_registers()?
        } else {
            raw.register
                .iter()
                .map(|r| RegisterDescriptor::new(&r.name, r.offset, r.width))
                .collect::<Result<Vec<_>, _>>()?
        };
        let registers = DescriptorTable::new(window, entries)?;

        Ok(Self {
            namespace,
            registers,
            mem_device: raw.device.unwrap_or_else(|| PathBuf::from(DEFAULT_MEM_DEVICE)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registers::RegisterWidth;

    #[test]
    fn empty_file_is_txt_default() {
        let cfg = ExposureConfig::from_toml_str("").unwrap();
        assert_eq!(cfg.window(), WindowLayout::default());
        assert_eq!(cfg.registers.len(), 7);
        assert_eq!(cfg.namespace, NamespaceLayout::default());
        assert_eq!(cfg.mem_device, PathBuf::from("/dev/mem"));
    }

    #[test]
    fn custom_table_and_layout() {
        let cfg = ExposureConfig::from_toml_str(
            r#"
device = "/tmp/fake-mem"

[window]
base = 0x1000
size = 0x100

[namespace]
root = "sec"
subdir = "regs"
mode = 0o400

[[register]]
name = "a"
offset = 0x0
width = 2

[[register]]
name = "b"
offset = 0xf8
width = 8
"#,
        )
        .unwrap();
        assert_eq!(cfg.window().base, 0x1000);
        assert_eq!(cfg.registers.names(), vec!["a", "b"]);
        assert_eq!(cfg.registers.get("a").unwrap().width, RegisterWidth::W16);
        assert_eq!(cfg.namespace.leaf_path("b"), "sec/regs/b");
        assert_eq!(cfg.namespace.mode, NodeMode::OWNER_READ);
        assert_eq!(cfg.mem_device, PathBuf::from("/tmp/fake-mem"));
    }

    #[test]
    fn bad_width_is_configuration_error() {
        let text = "[[register]]\nname = \"x\"\noffset = 0\nwidth = 3\n";
        let err = ExposureConfig::from_toml_str(text).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidWidth { width: 3, .. }));
    }

    #[test]
    fn small_window_rejects_default_registers() {
        let err = ExposureConfig::from_toml_str("[window]\nsize = 0x100\n").unwrap_err();
        assert!(matches!(err, ConfigError::OutOfWindow { .. }));
    }

    #[test]
    fn writable_mode_and_unknown_keys_rejected() {
        assert!(matches!(
            ExposureConfig::from_toml_str("[namespace]\nmode = 0o664\n"),
            Err(ConfigError::InvalidMode(_))
        ));
        assert!(matches!(
            ExposureConfig::from_toml_str("bogus = 1\n"),
            Err(ConfigError::Parse(_))
        ));
    }
}
