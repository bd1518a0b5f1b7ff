// CLASSIFICATION: COMMUNITY
// Filename: lib.rs v0.1
// Date Modified: 2026-10-19
// Author: Lukas Bower

//! Root library for txtfs: TXT register exposure through a read‑only
//! pseudo‑filesystem namespace.

/// Error types for every layer.
pub mod error;

/// Register descriptors and the fixed physical window.
pub mod registers;

/// Physical window capability and its back‑ends.
pub mod hal;

/// Scoped map → copy → unmap → format reader.
pub mod reader;

/// Namespace capability, node table and the in‑memory namespace.
pub mod namespace;

/// Exposure lifecycle controller.
pub mod lifecycle;

/// TOML + environment configuration.
pub mod config;

/// Raw hex dump helper used by `txtdump`.
pub mod dump;

pub use config::ExposureConfig;
pub use error::{ConfigError, ExposeError, NamespaceError, WindowError};
pub use lifecycle::{ExposureController, LifecycleState};
pub use reader::{format_value, RegisterReader};
pub use registers::{DescriptorTable, RegisterDescriptor, RegisterWidth, WindowLayout};
