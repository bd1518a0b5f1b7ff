// CLASSIFICATION: COMMUNITY
// Filename: devmem.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-19

//! Host back‑end reading the physical window through a memory device.
//!
//! Every `map` opens its own read‑only descriptor on the device, so two
//! concurrent reads never share file position or buffers. `unmap` closes it.

use std::fs::File;
use std::os::unix::fs::FileExt;
use std::path::{Path, PathBuf};

use log::debug;

use super::{MappedHandle, PhysWindow, WindowRegion};
use crate::config::DEFAULT_MEM_DEVICE;
use crate::error::WindowError;

/// [`PhysWindow`] over `/dev/mem` or any file laid out like physical memory.
///
/// Copies are positioned `pread`s, so the kernel picks the bus access width.
/// A register read is not guaranteed to be a single width‑sized MMIO access.
#[derive(Debug, Clone)]
pub struct DevMemWindow {
    path: PathBuf,
}

struct DevMemRegion {
    file: File,
    base: u64,
}

impl WindowRegion for DevMemRegion {
    fn read_at(&self, offset: usize, buf: &mut [u8]) -> Result<(), WindowError> {
        self.file
            .read_exact_at(buf, self.base + offset as u64)
            .map_err(WindowError::Copy)
    }
}

impl DevMemWindow {
    /// Window backed by the device or image at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Device path opened by every `map`.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for DevMemWindow {
    fn default() -> Self {
        Self::new(DEFAULT_MEM_DEVICE)
    }
}

impl PhysWindow for DevMemWindow {
    fn map(&self, base: u64, len: usize) -> Result<MappedHandle, WindowError> {
        if base.checked_add(len as u64).is_none() {
            return Err(WindowError::Refused(format!("{base:#x}+{len:#x} wraps")));
        }
        let file = File::open(&self.path).map_err(|source| WindowError::Open {
            path: self.path.clone(),
            source,
        })?;
        debug!("opened {} for {:#x}+{:#x}", self.path.display(), base, len);
        Ok(MappedHandle::new(base, len, Box::new(DevMemRegion { file, base })))
    }

    fn unmap(&self, handle: MappedHandle) {
        // Dropping the region closes the descriptor.
        drop(handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn scratch(name: &str, bytes: &[u8]) -> PathBuf {
        let path = std::env::temp_dir().join(format!("txtfs-devmem-{}-{name}", std::process::id()));
        fs::write(&path, bytes).unwrap();
        path
    }

    #[test]
    fn reads_relative_to_mapping_base() {
        let mut image = vec![0u8; 0x40];
        image[0x21] = 0xaa;
        image[0x22] = 0xbb;
        let path = scratch("base", &image);
        let win = DevMemWindow::new(&path);
        let h = win.map(0x20, 0x20).unwrap();
        let mut buf = [0u8; 2];
        win.copy_from(&h, 1, &mut buf).unwrap();
        win.unmap(h);
        assert_eq!(buf, [0xaa, 0xbb]);
        let _ = fs::remove_file(path);
    }

    #[test]
    fn missing_device_is_a_map_error() {
        let win = DevMemWindow::new("/nonexistent/txtfs/mem");
        let err = win.map(0, 8).unwrap_err();
        assert!(matches!(err, WindowError::Open { .. }));
    }

    #[test]
    fn short_device_is_a_copy_error() {
        let path = scratch("short", &[0u8; 4]);
        let win = DevMemWindow::new(&path);
        let h = win.map(0, 0x10).unwrap();
        let mut buf = [0u8; 8];
        let err = win.copy_from(&h, 0, &mut buf).unwrap_err();
        win.unmap(h);
        assert!(matches!(err, WindowError::Copy(_)));
        let _ = fs::remove_file(path);
    }
}
