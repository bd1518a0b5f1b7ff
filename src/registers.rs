// CLASSIFICATION: COMMUNITY
// Filename: registers.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-19

//! Register descriptor table for the TXT public configuration space.
//!
//! Each [`RegisterDescriptor`] names one register inside a fixed physical
//! window by byte offset and width. A [`DescriptorTable`] is validated once
//! when it is built and is immutable afterwards.

use std::collections::HashSet;
use std::fmt;

use crate::error::ConfigError;

/// Physical base of the TXT public configuration registers.
pub const TXT_PUB_CR_BASE: u64 = 0xfed3_0000;
/// Size of the TXT public configuration window.
pub const TXT_PUB_CR_SIZE: u64 = 0x1_0000;

/// The closed default register set: name, offset, width in bytes.
pub const TXT_REGISTERS: [(&str, u64, u8); 7] = [
    ("status", 0x000, 8),
    ("error-status", 0x008, 1),
    ("error-code", 0x030, 4),
    ("scratchpad", 0x0a0, 8),
    ("version", 0x100, 4),
    ("device-id", 0x110, 8),
    ("extended-error-status", 0x8f0, 8),
];

/// Fixed physical address window holding every exposed register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowLayout {
    pub base: u64,
    pub size: u64,
}

impl WindowLayout {
    /// Build a layout, rejecting windows that wrap the address space.
    pub fn new(base: u64, size: u64) -> Result<Self, ConfigError> {
        if base.checked_add(size).is_none() {
            return Err(ConfigError::WindowOverflow { base, size });
        }
        Ok(Self { base, size })
    }

    /// Window length as a host size.
    pub fn len(&self) -> usize {
        self.size as usize
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }
}

impl Default for WindowLayout {
    fn default() -> Self {
        Self {
            base: TXT_PUB_CR_BASE,
            size: TXT_PUB_CR_SIZE,
        }
    }
}

/// Byte width of a register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegisterWidth {
    W8,
    W16,
    W32,
    W64,
}

impl RegisterWidth {
    pub const fn bytes(self) -> usize {
        match self {
            RegisterWidth::W8 => 1,
            RegisterWidth::W16 => 2,
            RegisterWidth::W32 => 4,
            RegisterWidth::W64 => 8,
        }
    }

    /// Number of hex digits in the formatted value.
    pub const fn hex_digits(self) -> usize {
        self.bytes() * 2
    }
}

impl TryFrom<u8> for RegisterWidth {
    type Error = String;

    fn try_from(width: u8) -> Result<Self, Self::Error> {
        match width {
            1 => Ok(RegisterWidth::W8),
            2 => Ok(RegisterWidth::W16),
            4 => Ok(RegisterWidth::W32),
            8 => Ok(RegisterWidth::W64),
            other => Err(format!("width {other} is not one of 1, 2, 4 or 8")),
        }
    }
}

impl fmt::Display for RegisterWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bytes())
    }
}

/// Static metadata for one register.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RegisterDescriptor {
    pub name: String,
    pub offset: u64,
    pub width: RegisterWidth,
}

impl RegisterDescriptor {
    /// Build a descriptor from a raw width, as found in configuration.
    pub fn new(name: &str, offset: u64, width: u8) -> Result<Self, ConfigError> {
        let width = RegisterWidth::try_from(width).map_err(|_| ConfigError::InvalidWidth {
            name: name.to_string(),
            width,
        })?;
        Ok(Self {
            name: name.to_string(),
            offset,
            width,
        })
    }

    /// Exclusive end offset of the register inside the window.
    pub fn end(&self) -> Option<u64> {
        self.offset.checked_add(self.width.bytes() as u64)
    }
}

/// Ordered, uniquely named, validated set of descriptors.
#[derive(Debug, Clone)]
pub struct DescriptorTable {
    window: WindowLayout,
    entries: Vec<RegisterDescriptor>,
}

impl DescriptorTable {
    /// Validate `entries` against `window` and freeze them.
    pub fn new(
        window: WindowLayout,
        entries: Vec<RegisterDescriptor>,
    ) -> Result<Self, ConfigError> {
        if entries.is_empty() {
            return Err(ConfigError::EmptyTable);
        }
        let mut seen = HashSet::new();
        for d in &entries {
            validate_name(&d.name)?;
            if !seen.insert(d.name.as_str()) {
                return Err(ConfigError::DuplicateName(d.name.clone()));
            }
            match d.end() {
                Some(end) if end <= window.size => {}
                _ => {
                    return Err(ConfigError::OutOfWindow {
                        name: d.name.clone(),
                        offset: d.offset,
                        width: d.width.bytes(),
                        window: window.size,
                    })
                }
            }
        }
        Ok(Self { window, entries })
    }

    /// The seven TXT public-space registers.
    pub fn txt_default() -> Result<Self, ConfigError> {
        Self::new(WindowLayout::default(), txt_registers()?)
    }

    pub fn window(&self) -> WindowLayout {
        self.window
    }

    pub fn get(&self, name: &str) -> Option<&RegisterDescriptor> {
        self.entries.iter().find(|d| d.name == name)
    }

    pub fn get_index(&self, index: usize) -> Option<&RegisterDescriptor> {
        self.entries.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RegisterDescriptor> {
        self.entries.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|d| d.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Descriptors for [`TXT_REGISTERS`], not yet checked against a window.
pub fn txt_registers() -> Result<Vec<RegisterDescriptor>, ConfigError> {
    TXT_REGISTERS
        .iter()
        .map(|(name, offset, width)| RegisterDescriptor::new(name, *offset, *width))
        .collect()
}

/// Node names become path components, so they must be non-empty and flat.
pub fn validate_name(name: &str) -> Result<(), ConfigError> {
    if name.is_empty() || name.contains('/') || name == "." || name == ".." {
        return Err(ConfigError::InvalidName(name.to_string()));
    }
    Ok(())
}
