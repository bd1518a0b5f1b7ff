// CLASSIFICATION: COMMUNITY
// Filename: error.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-19

//! Error types shared by the register exposure subsystem.

use std::path::PathBuf;

use thiserror::Error;

use crate::lifecycle::LifecycleState;

/// Malformed configuration or descriptor metadata. Fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("register {name:?}: width {width} is not one of 1, 2, 4 or 8")]
    InvalidWidth { name: String, width: u8 },
    #[error("register {name:?}: offset {offset:#x} + width {width} exceeds window {window:#x}")]
    OutOfWindow {
        name: String,
        offset: u64,
        width: usize,
        window: u64,
    },
    #[error("duplicate register name {0:?}")]
    DuplicateName(String),
    #[error("invalid node name {0:?}")]
    InvalidName(String),
    #[error("node mode {0:#o} must be non-empty, known and read-only")]
    InvalidMode(u32),
    #[error("register table is empty")]
    EmptyTable,
    #[error("window base {base:#x} + size {size:#x} overflows the address space")]
    WindowOverflow { base: u64, size: u64 },
    #[error("failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Failures of the physical-window mapping capability.
#[derive(Debug, Error)]
pub enum WindowError {
    #[error("cannot open memory device {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("window mapping refused: {0}")]
    Refused(String),
    #[error("copy of {len} bytes at offset {offset:#x} is outside the {window:#x}-byte mapping")]
    OutOfRange {
        offset: usize,
        len: usize,
        window: usize,
    },
    #[error("copy from mapped window failed: {0}")]
    Copy(#[source] std::io::Error),
    #[error("copy from mapped window failed: {0}")]
    Fault(String),
}

/// Failures of the pseudo-filesystem registration capability.
#[derive(Debug, Error)]
pub enum NamespaceError {
    #[error("cannot create {name:?}: {reason}")]
    CreateFailed { name: String, reason: String },
    #[error("cannot create {name:?}: parent node is missing")]
    MissingParent { name: String },
    #[error("node {0:?} already exists")]
    AlreadyExists(String),
    #[error("no such node {0:?}")]
    NotFound(String),
    #[error("{0:?} is a directory")]
    IsDirectory(String),
    #[error("namespace lock poisoned")]
    LockPoisoned,
}

/// Umbrella error returned by the exposure subsystem.
#[derive(Debug, Error)]
pub enum ExposeError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),
    #[error("mapping error: {0}")]
    Mapping(#[source] WindowError),
    #[error("namespace error: {0}")]
    Namespace(#[from] NamespaceError),
    #[error("internal consistency error: {0}")]
    InternalConsistency(String),
    #[error("operation not valid in state {0:?}")]
    InvalidState(LifecycleState),
    #[error("unknown register {0:?}")]
    UnknownRegister(String),
    #[error("lifecycle lock poisoned")]
    LockPoisoned,
}

impl ExposeError {
    /// True for a failed window mapping, which is local to a single read.
    pub fn is_mapping(&self) -> bool {
        matches!(self, ExposeError::Mapping(_))
    }
}
