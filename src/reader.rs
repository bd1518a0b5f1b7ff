// CLASSIFICATION: COMMUNITY
// Filename: reader.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-19

//! Scoped register reader.
//!
//! One read is one full map → copy → unmap → format cycle. The raw bytes
//! live in a stack buffer owned by that call alone, and the mapping is held
//! by a [`ScopedMapping`] so it is released before formatting on every path.

use std::sync::Arc;

use log::warn;

use crate::error::{ExposeError, WindowError};
use crate::hal::{PhysWindow, ScopedMapping};
use crate::registers::{RegisterDescriptor, WindowLayout};

/// Largest supported register width in bytes.
pub const MAX_REGISTER_BYTES: usize = 8;

/// Generic reader parameterized per call by a [`RegisterDescriptor`].
#[derive(Clone)]
pub struct RegisterReader {
    window: Arc<dyn PhysWindow>,
    layout: WindowLayout,
}

impl RegisterReader {
    pub fn new(window: Arc<dyn PhysWindow>, layout: WindowLayout) -> Self {
        Self { window, layout }
    }

    pub fn layout(&self) -> WindowLayout {
        self.layout
    }

    /// Read one register and return its formatted value.
    pub fn read(&self, descriptor: &RegisterDescriptor) -> Result<String, ExposeError> {
        let mut raw = [0u8; MAX_REGISTER_BYTES];
        let width = descriptor.width.bytes();
        let value = raw
            .get_mut(..width)
            .ok_or_else(|| {
                ExposeError::InternalConsistency(format!("width {width} exceeds buffer"))
            })?;

        let copied = {
            let mapping = ScopedMapping::acquire(self.window.as_ref(), self.layout).map_err(|e| {
                warn!("map of register window failed reading {}: {}", descriptor.name, e);
                ExposeError::Mapping(e)
            })?;
            mapping.copy_from(descriptor.offset as usize, value)
        };
        copied.map_err(|e: WindowError| {
            ExposeError::InternalConsistency(format!("copy of {} failed: {}", descriptor.name, e))
        })?;

        format_value(value)
    }
}

/// Format little‑endian register bytes as `0x` + `2 * width` hex digits + `\n`.
pub fn format_value(raw: &[u8]) -> Result<String, ExposeError> {
    match raw.len() {
        1 | 2 | 4 | 8 => {
            let be: Vec<u8> = raw.iter().rev().copied().collect();
            Ok(format!("0x{}\n", hex::encode(be)))
        }
        other => Err(ExposeError::InternalConsistency(format!(
            "cannot format a {other}-byte register"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::SimWindow;
    use crate::registers::RegisterWidth;

    fn reader_over(sim: Arc<SimWindow>) -> RegisterReader {
        let layout = sim.layout();
        RegisterReader::new(sim, layout)
    }

    #[test]
    fn formats_every_width_with_leading_zeros() {
        assert_eq!(format_value(&[0x07]).unwrap(), "0x07\n");
        assert_eq!(format_value(&[0x01, 0x00]).unwrap(), "0x0001\n");
        assert_eq!(format_value(&[0x04, 0x80, 0x00, 0xc0]).unwrap(), "0xc0008004\n");
        assert_eq!(format_value(&[0u8; 8]).unwrap(), "0x0000000000000000\n");
    }

    #[test]
    fn digit_count_tracks_width() {
        let widths = [
            RegisterWidth::W8,
            RegisterWidth::W16,
            RegisterWidth::W32,
            RegisterWidth::W64,
        ];
        for width in widths {
            let raw = vec![0u8; width.bytes()];
            let text = format_value(&raw).unwrap();
            let digits = text.trim_start_matches("0x").trim_end_matches('\n');
            assert_eq!(digits.len(), width.hex_digits());
            assert!(text.ends_with('\n'));
        }
    }

    #[test]
    fn odd_width_is_internal_error() {
        let err = format_value(&[0, 0, 0]).unwrap_err();
        assert!(matches!(err, ExposeError::InternalConsistency(_)));
    }

    #[test]
    fn read_releases_mapping_on_success_and_failure() {
        let sim = Arc::new(SimWindow::new(WindowLayout::default()));
        let reader = reader_over(Arc::clone(&sim));
        let d = RegisterDescriptor::new("status", 0, 8).unwrap();
        sim.write_register(&d, 0x92).unwrap();

        assert_eq!(reader.read(&d).unwrap(), "0x0000000000000092\n");
        assert_eq!(sim.outstanding(), 0);

        sim.set_copy_fault(true);
        let err = reader.read(&d).unwrap_err();
        assert!(matches!(err, ExposeError::InternalConsistency(_)));
        assert_eq!(sim.outstanding(), 0);

        sim.set_copy_fault(false);
        sim.set_map_fault(true);
        let err = reader.read(&d).unwrap_err();
        assert!(err.is_mapping());
        assert_eq!(sim.outstanding(), 0);
        assert_eq!(sim.maps(), 2);
    }

    #[test]
    fn repeated_reads_are_stable() {
        let sim = Arc::new(SimWindow::new(WindowLayout::default()));
        let reader = reader_over(Arc::clone(&sim));
        let d = RegisterDescriptor::new("device-id", 0x110, 8).unwrap();
        sim.write_register(&d, 0x0000_0001_b002_8086).unwrap();
        let first = reader.read(&d).unwrap();
        let second = reader.read(&d).unwrap();
        assert_eq!(first, second);
        assert_eq!(first, "0x00000001b0028086\n");
    }
}
