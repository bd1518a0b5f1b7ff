// CLASSIFICATION: COMMUNITY
// Filename: mod.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-19

//! Exposure namespace: the pseudo‑filesystem capability and node bookkeeping.
//!
//! [`Namespace`] is the registration primitive the host provides
//! (securityfs, a 9P tree, or [`MemNamespace`] in process). The node table
//! in [`table`] records exactly which entries this subsystem created.

pub mod mem;
pub mod table;

pub use mem::MemNamespace;
pub use table::{plan, NamespaceNode, NodeKind, NodeTable, PlannedNode};

use std::fmt;
use std::sync::Arc;

use bitflags::bitflags;

use crate::error::{ConfigError, ExposeError, NamespaceError};
use crate::registers::validate_name;

/// Default root directory name.
pub const DEFAULT_ROOT: &str = "txt";
/// Default sub‑directory holding the register leaves.
pub const DEFAULT_SUBDIR: &str = "public";

bitflags! {
    /// Permission bits of a namespace node, octal as in `chmod`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct NodeMode: u32 {
        const OWNER_READ  = 0o400;
        const OWNER_WRITE = 0o200;
        const OWNER_EXEC  = 0o100;
        const GROUP_READ  = 0o040;
        const GROUP_WRITE = 0o020;
        const GROUP_EXEC  = 0o010;
        const OTHER_READ  = 0o004;
        const OTHER_WRITE = 0o002;
        const OTHER_EXEC  = 0o001;
    }
}

impl NodeMode {
    /// `0440`: readable by owner and group only.
    pub const READ_ONLY: Self = Self::OWNER_READ.union(Self::GROUP_READ);
    /// Every write bit.
    pub const WRITE_MASK: Self = Self::OWNER_WRITE
        .union(Self::GROUP_WRITE)
        .union(Self::OTHER_WRITE);

    pub fn is_read_only(self) -> bool {
        !self.intersects(Self::WRITE_MASK)
    }

    /// Parse raw octal bits, rejecting unknown or write bits.
    pub fn from_octal(bits: u32) -> Result<Self, ConfigError> {
        match Self::from_bits(bits) {
            Some(mode) if mode.is_read_only() && !mode.is_empty() => Ok(mode),
            _ => Err(ConfigError::InvalidMode(bits)),
        }
    }
}

impl fmt::Display for NodeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04o}", self.bits())
    }
}

/// Callback bound to a leaf node; runs on every read of that node.
pub type ReadFn = Arc<dyn Fn() -> Result<String, ExposeError> + Send + Sync>;

/// Opaque handle for a node created by a [`Namespace`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeHandle {
    id: u64,
    path: String,
}

impl NodeHandle {
    pub fn new(id: u64, path: impl Into<String>) -> Self {
        Self {
            id,
            path: path.into(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Slash‑separated path from the namespace root.
    pub fn path(&self) -> &str {
        &self.path
    }
}

/// Pseudo‑filesystem registration capability.
pub trait Namespace: Send + Sync {
    /// Create a directory under `parent`, or at the top level for `None`.
    fn create_directory(
        &self,
        name: &str,
        parent: Option<&NodeHandle>,
    ) -> Result<NodeHandle, NamespaceError>;

    /// Create a read‑only file whose contents come from `read`.
    fn create_read_only_file(
        &self,
        name: &str,
        parent: &NodeHandle,
        mode: NodeMode,
        read: ReadFn,
    ) -> Result<NodeHandle, NamespaceError>;

    /// Remove a node. Absent or already removed nodes are ignored.
    fn remove(&self, node: &NodeHandle);
}

/// Names and permissions of the exposed tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceLayout {
    pub root: String,
    pub subdir: String,
    pub mode: NodeMode,
}

impl NamespaceLayout {
    pub fn new(root: &str, subdir: &str, mode: NodeMode) -> Result<Self, ConfigError> {
        validate_name(root)?;
        validate_name(subdir)?;
        if !mode.is_read_only() {
            return Err(ConfigError::InvalidMode(mode.bits()));
        }
        Ok(Self {
            root: root.to_string(),
            subdir: subdir.to_string(),
            mode,
        })
    }

    /// Path of the leaf for register `name`.
    pub fn leaf_path(&self, name: &str) -> String {
        format!("{}/{}/{}", self.root, self.subdir, name)
    }
}

impl Default for NamespaceLayout {
    fn default() -> Self {
        Self {
            root: DEFAULT_ROOT.to_string(),
            subdir: DEFAULT_SUBDIR.to_string(),
            mode: NodeMode::READ_ONLY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_only_mode_is_0440() {
        assert_eq!(NodeMode::READ_ONLY.bits(), 0o440);
        assert_eq!(NodeMode::READ_ONLY.to_string(), "0440");
        assert!(NodeMode::READ_ONLY.is_read_only());
    }

    #[test]
    fn writable_modes_rejected() {
        assert!(NodeMode::from_octal(0o644).is_err());
        assert!(NodeMode::from_octal(0o1000).is_err());
        assert!(NodeMode::from_octal(0).is_err());
        assert_eq!(NodeMode::from_octal(0o400).unwrap(), NodeMode::OWNER_READ);
        assert!(NamespaceLayout::new("txt", "public", NodeMode::OWNER_WRITE).is_err());
    }

    #[test]
    fn leaf_paths() {
        let layout = NamespaceLayout::default();
        assert_eq!(layout.leaf_path("status"), "txt/public/status");
    }
}
