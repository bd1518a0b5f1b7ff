// CLASSIFICATION: COMMUNITY
// Filename: sim.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-19

//! In‑memory register bank implementing [`PhysWindow`].
//!
//! Used by tests, benches and `txtinfo --sim`. Counts live mappings so
//! callers can assert that nothing leaks, and can inject map or copy faults.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use super::{MappedHandle, PhysWindow, WindowRegion};
use crate::error::WindowError;
use crate::registers::{RegisterDescriptor, WindowLayout};

/// Plausible power‑on values for the default TXT registers.
const TXT_SAMPLE: [(&str, u64); 5] = [
    ("status", 0x0000_0000_0001_0092),
    ("error-code", 0xc000_8004),
    ("version", 0x8000_0000),
    ("device-id", 0x0000_0001_b002_8086),
    ("extended-error-status", 0x0000_0000_0000_0001),
];

/// Simulated physical window.
pub struct SimWindow {
    layout: WindowLayout,
    bank: Arc<RwLock<Vec<u8>>>,
    map_fault: AtomicBool,
    fail_next: AtomicUsize,
    copy_fault: Arc<AtomicBool>,
    maps: AtomicUsize,
    live: AtomicUsize,
}

struct SimRegion {
    bank: Arc<RwLock<Vec<u8>>>,
    start: usize,
    copy_fault: Arc<AtomicBool>,
}

impl WindowRegion for SimRegion {
    fn read_at(&self, offset: usize, buf: &mut [u8]) -> Result<(), WindowError> {
        if self.copy_fault.load(Ordering::SeqCst) {
            return Err(WindowError::Fault("injected copy fault".into()));
        }
        let bank = self
            .bank
            .read()
            .map_err(|_| WindowError::Fault("register bank lock poisoned".into()))?;
        let from = self.start + offset;
        let src = bank
            .get(from..from + buf.len())
            .ok_or_else(|| WindowError::Fault(format!("offset {from:#x} outside bank")))?;
        buf.copy_from_slice(src);
        Ok(())
    }
}

impl SimWindow {
    /// A zero‑filled bank covering `layout`.
    pub fn new(layout: WindowLayout) -> Self {
        Self {
            layout,
            bank: Arc::new(RwLock::new(vec![0u8; layout.len()])),
            map_fault: AtomicBool::new(false),
            fail_next: AtomicUsize::new(0),
            copy_fault: Arc::new(AtomicBool::new(false)),
            maps: AtomicUsize::new(0),
            live: AtomicUsize::new(0),
        }
    }

    /// A bank pre‑loaded with sample values for every descriptor named in
    /// [`TXT_SAMPLE`].
    pub fn with_txt_sample<'a>(
        layout: WindowLayout,
        descriptors: impl IntoIterator<Item = &'a RegisterDescriptor>,
    ) -> Result<Self, WindowError> {
        let sim = Self::new(layout);
        for d in descriptors {
            if let Some((_, value)) = TXT_SAMPLE.iter().find(|(name, _)| *name == d.name) {
                sim.write_register(d, *value)?;
            }
        }
        Ok(sim)
    }

    /// Window this bank simulates.
    pub fn layout(&self) -> WindowLayout {
        self.layout
    }

    /// Overwrite raw bytes at `offset` within the window.
    pub fn write_bytes(&self, offset: u64, bytes: &[u8]) -> Result<(), WindowError> {
        let mut bank = self
            .bank
            .write()
            .map_err(|_| WindowError::Fault("register bank lock poisoned".into()))?;
        let start = usize::try_from(offset).unwrap_or(usize::MAX);
        let dst = match start.checked_add(bytes.len()) {
            Some(end) => bank.get_mut(start..end),
            None => None,
        };
        let dst = dst.ok_or(WindowError::OutOfRange {
            offset: start,
            len: bytes.len(),
            window: self.layout.len(),
        })?;
        dst.copy_from_slice(bytes);
        Ok(())
    }

    /// Store `value` little‑endian into the register, truncated to its width.
    pub fn write_register(&self, d: &RegisterDescriptor, value: u64) -> Result<(), WindowError> {
        let bytes = value.to_le_bytes();
        self.write_bytes(d.offset, &bytes[..d.width.bytes()])
    }

    /// Refuse every `map` until cleared.
    pub fn set_map_fault(&self, on: bool) {
        self.map_fault.store(on, Ordering::SeqCst);
    }

    /// Refuse only the next `count` calls to `map`.
    pub fn fail_next_maps(&self, count: usize) {
        self.fail_next.store(count, Ordering::SeqCst);
    }

    /// Make every copy from a live mapping fail until cleared.
    pub fn set_copy_fault(&self, on: bool) {
        self.copy_fault.store(on, Ordering::SeqCst);
    }

    /// Mappings currently held.
    pub fn outstanding(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    /// Successful `map` calls since creation.
    pub fn maps(&self) -> usize {
        self.maps.load(Ordering::SeqCst)
    }

    fn take_one_shot_fault(&self) -> bool {
        self.fail_next
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

impl PhysWindow for SimWindow {
    fn map(&self, base: u64, len: usize) -> Result<MappedHandle, WindowError> {
        if self.map_fault.load(Ordering::SeqCst) || self.take_one_shot_fault() {
            return Err(WindowError::Refused("injected map fault".into()));
        }
        let inside = base >= self.layout.base
            && (base - self.layout.base)
                .checked_add(len as u64)
                .map_or(false, |end| end <= self.layout.size);
        if !inside {
            return Err(WindowError::Refused(format!(
                "{base:#x}+{len:#x} is outside the simulated window"
            )));
        }
        self.maps.fetch_add(1, Ordering::SeqCst);
        self.live.fetch_add(1, Ordering::SeqCst);
        let region = SimRegion {
            bank: Arc::clone(&self.bank),
            start: (base - self.layout.base) as usize,
            copy_fault: Arc::clone(&self.copy_fault),
        };
        Ok(MappedHandle::new(base, len, Box::new(region)))
    }

    fn unmap(&self, handle: MappedHandle) {
        self.live.fetch_sub(1, Ordering::SeqCst);
        drop(handle);
    }
}
