// CLASSIFICATION: COMMUNITY
// Filename: mod.rs · HAL physical window v0.1
// Date Modified: 2026-10-19
// Author: Lukas Bower
//
// ─────────────────────────────────────────────────────────────
// txtfs · Hardware‑Abstraction Layer (physical window)
//
// The exposure subsystem never touches physical memory directly.
// It consumes a [`PhysWindow`] capability with three primitives:
//
//   • `map(base, len)`            – establish a view of the window
//   • `copy_from(handle, off, buf)` – copy bytes out of that view
//   • `unmap(handle)`             – release the view
//
// Back‑ends:
//
//   • `devmem` – host memory device (`/dev/mem`), one private
//                descriptor per mapping
//   • `sim`    – in‑memory register bank with fault injection
//
// [`ScopedMapping`] wraps a handle so that `unmap` runs on every
// exit path, including early returns and unwinding.
// ─────────────────────────────────────────────────────────────

#![forbid(unsafe_code)]
#![warn(missing_docs)]

#[cfg(unix)]
pub mod devmem;
pub mod sim;

#[cfg(unix)]
pub use devmem::DevMemWindow;
pub use sim::SimWindow;

use log::debug;

use crate::error::WindowError;
use crate::registers::WindowLayout;

/// Backing store behind one live mapping.
pub trait WindowRegion: Send {
    /// Fill `buf` from `offset` bytes into the mapping.
    fn read_at(&self, offset: usize, buf: &mut [u8]) -> Result<(), WindowError>;
}

/// A live view onto the physical window. Only obtainable from [`PhysWindow::map`].
pub struct MappedHandle {
    base: u64,
    len: usize,
    region: Box<dyn WindowRegion>,
}

impl MappedHandle {
    /// Wrap a back‑end region covering `[base, base + len)`.
    pub fn new(base: u64, len: usize, region: Box<dyn WindowRegion>) -> Self {
        Self { base, len, region }
    }

    /// Physical base address of the mapping.
    pub fn base(&self) -> u64 {
        self.base
    }

    /// Mapped length in bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// True for a zero‑length mapping.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl std::fmt::Debug for MappedHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MappedHandle")
            .field("base", &format_args!("{:#x}", self.base))
            .field("len", &self.len)
            .finish()
    }
}

/// Physical‑window mapping capability provided by the host platform.
pub trait PhysWindow: Send + Sync {
    /// Map `len` bytes starting at physical address `base`.
    fn map(&self, base: u64, len: usize) -> Result<MappedHandle, WindowError>;

    /// Release a mapping. Consumes the handle so it cannot be reused.
    fn unmap(&self, handle: MappedHandle);

    /// Copy `buf.len()` bytes at `offset` from a live mapping.
    fn copy_from(
        &self,
        handle: &MappedHandle,
        offset: usize,
        buf: &mut [u8],
    ) -> Result<(), WindowError> {
        match offset.checked_add(buf.len()) {
            Some(end) if end <= handle.len => handle.region.read_at(offset, buf),
            _ => Err(WindowError::OutOfRange {
                offset,
                len: buf.len(),
                window: handle.len,
            }),
        }
    }
}

/// Mapping that is released when dropped.
pub struct ScopedMapping<'w> {
    window: &'w dyn PhysWindow,
    handle: Option<MappedHandle>,
}

impl<'w> ScopedMapping<'w> {
    /// Map the whole of `layout`. Nothing needs releasing if this fails.
    pub fn acquire(window: &'w dyn PhysWindow, layout: WindowLayout) -> Result<Self, WindowError> {
        let handle = window.map(layout.base, layout.len())?;
        debug!("mapped {:#x}+{:#x}", layout.base, layout.size);
        Ok(Self {
            window,
            handle: Some(handle),
        })
    }

    /// Copy bytes from the live mapping.
    pub fn copy_from(&self, offset: usize, buf: &mut [u8]) -> Result<(), WindowError> {
        match &self.handle {
            Some(handle) => self.window.copy_from(handle, offset, buf),
            None => Err(WindowError::Fault("mapping already released".into())),
        }
    }
}

impl Drop for ScopedMapping<'_> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            debug!("unmapped {:#x}+{:#x}", handle.base, handle.len);
            self.window.unmap(handle);
        }
    }
}
