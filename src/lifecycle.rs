// CLASSIFICATION: COMMUNITY
// Filename: lifecycle.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-19

//! Exposure lifecycle controller.
//!
//! Owns the node table and drives the namespace collaborator through
//! `Uninitialized → Initializing → Ready → TearingDown → Uninitialized`.
//! Initialization is all‑or‑nothing: any create failure, or a panic in the
//! namespace, removes every node already created. Teardown never fails.
//!
//! Initialize and teardown hold the lifecycle mutex for their whole run, so
//! they are serialized against each other. Leaf reads go straight to the
//! bound reader and never touch that mutex.

use std::sync::{Arc, Mutex, PoisonError};

use log::{info, warn};

use crate::config::ExposureConfig;
use crate::error::ExposeError;
use crate::hal::PhysWindow;
use crate::namespace::{
    plan, Namespace, NamespaceLayout, NamespaceNode, NodeKind, NodeTable, PlannedNode, ReadFn,
};
use crate::reader::RegisterReader;
use crate::registers::{DescriptorTable, RegisterDescriptor};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Uninitialized,
    Initializing,
    Ready,
    TearingDown,
}

struct Lifecycle {
    state: LifecycleState,
    nodes: NodeTable,
}

/// Undoes a partial initialize when dropped armed, on error return or unwind.
struct Rollback<'a> {
    controller: &'a ExposureController,
    lifecycle: &'a mut Lifecycle,
    armed: bool,
}

impl Drop for Rollback<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let removed = self.controller.destroy_all(&mut self.lifecycle.nodes);
        self.lifecycle.state = LifecycleState::Uninitialized;
        warn!("initialization abandoned, removed {removed} nodes");
    }
}

/// Creates, serves and destroys the register exposure tree.
pub struct ExposureController {
    namespace: Arc<dyn Namespace>,
    reader: RegisterReader,
    table: DescriptorTable,
    layout: NamespaceLayout,
    lifecycle: Mutex<Lifecycle>,
}

impl ExposureController {
    pub fn new(
        table: DescriptorTable,
        layout: NamespaceLayout,
        window: Arc<dyn PhysWindow>,
        namespace: Arc<dyn Namespace>,
    ) -> Self {
        let reader = RegisterReader::new(window, table.window());
        let slots = plan(&layout, &table).len();
        Self {
            namespace,
            reader,
            table,
            layout,
            lifecycle: Mutex::new(Lifecycle {
                state: LifecycleState::Uninitialized,
                nodes: NodeTable::with_slots(slots),
            }),
        }
    }

    pub fn from_config(
        config: &ExposureConfig,
        window: Arc<dyn PhysWindow>,
        namespace: Arc<dyn Namespace>,
    ) -> Self {
        Self::new(config.registers.clone(), config.namespace.clone(), window, namespace)
    }

    pub fn state(&self) -> LifecycleState {
        self.lifecycle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .state
    }

    pub fn descriptors(&self) -> &DescriptorTable {
        &self.table
    }

    pub fn layout(&self) -> &NamespaceLayout {
        &self.layout
    }

    /// Snapshot of the nodes currently recorded in the node table.
    pub fn nodes(&self) -> Vec<NamespaceNode> {
        self.lifecycle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .nodes
            .iter()
            .cloned()
            .collect()
    }

    /// Create the root, the sub‑directory and one leaf per register.
    pub fn initialize(&self) -> Result<(), ExposeError> {
        let mut lc = self.lifecycle.lock().map_err(|_| ExposeError::LockPoisoned)?;
        if lc.state != LifecycleState::Uninitialized {
            return Err(ExposeError::InvalidState(lc.state));
        }
        lc.state = LifecycleState::Initializing;
        info!(
            "exposing {} registers under {}/{}",
            self.table.len(),
            self.layout.root,
            self.layout.subdir
        );

        let mut rollback = Rollback {
            controller: self,
            lifecycle: &mut *lc,
            armed: true,
        };
        for step in plan(&self.layout, &self.table) {
            let name = step.name.clone();
            if let Err(e) = self.create_node(&mut rollback.lifecycle.nodes, step) {
                warn!("creating {name} failed: {e}");
                return Err(e);
            }
        }

        rollback.armed = false;
        rollback.lifecycle.state = LifecycleState::Ready;
        info!("exposure ready ({} nodes)", rollback.lifecycle.nodes.occupied());
        Ok(())
    }

    /// Read a register by name. Only valid while `Ready`.
    pub fn read(&self, name: &str) -> Result<String, ExposeError> {
        {
            let lc = self.lifecycle.lock().map_err(|_| ExposeError::LockPoisoned)?;
            if lc.state != LifecycleState::Ready {
                return Err(ExposeError::InvalidState(lc.state));
            }
        }
        let descriptor = self
            .table
            .get(name)
            .ok_or_else(|| ExposeError::UnknownRegister(name.to_string()))?;
        self.reader.read(descriptor)
    }

    /// Remove every recorded node and return to `Uninitialized`.
    ///
    /// Also clears a poisoned lifecycle lock, so initialize works again afterwards.
    pub fn teardown(&self) {
        let mut lc = self.lifecycle.lock().unwrap_or_else(PoisonError::into_inner);
        let previous = lc.state;
        lc.state = LifecycleState::TearingDown;
        let removed = self.destroy_all(&mut lc.nodes);
        lc.state = LifecycleState::Uninitialized;
        // The table is empty and the state consistent again.
        self.lifecycle.clear_poison();
        if previous != LifecycleState::Uninitialized || removed > 0 {
            info!("exposure torn down from {previous:?} ({removed} nodes)");
        }
    }

    fn create_node(&self, nodes: &mut NodeTable, step: PlannedNode) -> Result<(), ExposeError> {
        let parent = match step.parent {
            Some(index) => Some(
                nodes
                    .get(index)
                    .map(|n| n.handle.clone())
                    .ok_or_else(|| {
                        ExposeError::InternalConsistency(format!(
                            "parent slot {index} of {} is empty",
                            step.name
                        ))
                    })?,
            ),
            None => None,
        };

        let handle = match (step.kind, &step.descriptor, &parent) {
            (NodeKind::Directory, _, _) => {
                self.namespace.create_directory(&step.name, parent.as_ref())?
            }
            (NodeKind::File, Some(d), Some(parent)) => self.namespace.create_read_only_file(
                &step.name,
                parent,
                self.layout.mode,
                self.bind(d.clone()),
            )?,
            (NodeKind::File, _, _) => {
                return Err(ExposeError::InternalConsistency(format!(
                    "leaf {} has no descriptor or parent",
                    step.name
                )))
            }
        };

        let node = NamespaceNode {
            index: step.index,
            parent_index: step.parent,
            kind: step.kind,
            bound_descriptor: step.descriptor,
            handle: handle.clone(),
        };
        if let Err(e) = nodes.set(step.index, node) {
            self.namespace.remove(&handle);
            return Err(e);
        }
        Ok(())
    }

    fn bind(&self, descriptor: RegisterDescriptor) -> ReadFn {
        let reader = self.reader.clone();
        Arc::new(move || reader.read(&descriptor))
    }

    fn destroy_all(&self, nodes: &mut NodeTable) -> usize {
        let drained = nodes.drain_reverse();
        for node in &drained {
            self.namespace.remove(&node.handle);
        }
        drained.len()
    }
}

impl Drop for ExposureController {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::SimWindow;
    use crate::namespace::MemNamespace;

    fn controller() -> (ExposureController, Arc<MemNamespace>, Arc<SimWindow>) {
        let table = DescriptorTable::txt_default().unwrap();
        let sim = Arc::new(SimWindow::with_txt_sample(table.window(), table.iter()).unwrap());
        let ns = Arc::new(MemNamespace::new());
        let ctl = ExposureController::new(
            table,
            NamespaceLayout::default(),
            sim.clone(),
            ns.clone(),
        );
        (ctl, ns, sim)
    }

    #[test]
    fn initialize_populates_tree() {
        let (ctl, ns, _) = controller();
        ctl.initialize().unwrap();
        assert_eq!(ctl.state(), LifecycleState::Ready);
        assert_eq!(ns.len(), 9);
        assert_eq!(ctl.nodes().len(), 9);
        assert!(ns.is_dir("txt/public"));
        assert!(!ns.has_orphans());
    }

    #[test]
    fn double_initialize_is_rejected() {
        let (ctl, ns, _) = controller();
        ctl.initialize().unwrap();
        let err = ctl.initialize().unwrap_err();
        assert!(matches!(err, ExposeError::InvalidState(LifecycleState::Ready)));
        assert_eq!(ns.len(), 9);
    }

    #[test]
    fn root_failure_creates_nothing() {
        let (ctl, ns, _) = controller();
        ns.fail_nth_create(1);
        let err = ctl.initialize().unwrap_err();
        assert!(matches!(err, ExposeError::Namespace(_)));
        assert!(ns.is_empty());
        assert_eq!(ctl.state(), LifecycleState::Uninitialized);
    }

    #[test]
    fn subdir_failure_removes_root() {
        let (ctl, ns, _) = controller();
        ns.fail_nth_create(2);
        assert!(ctl.initialize().is_err());
        assert!(ns.is_empty());
        assert!(ctl.nodes().is_empty());
    }

    #[test]
    fn read_requires_ready() {
        let (ctl, _, _) = controller();
        let err = ctl.read("status").unwrap_err();
        assert!(matches!(err, ExposeError::InvalidState(LifecycleState::Uninitialized)));
        ctl.initialize().unwrap();
        assert!(matches!(ctl.read("bogus"), Err(ExposeError::UnknownRegister(_))));
        assert_eq!(ctl.read("error-status").unwrap(), "0x00\n");
    }

    #[test]
    fn retry_after_failed_init_succeeds() {
        let (ctl, ns, _) = controller();
        ns.fail_create_named("version");
        assert!(ctl.initialize().is_err());
        ns.clear_faults();
        ctl.initialize().unwrap();
        assert_eq!(ns.len(), 9);
    }

    #[test]
    fn drop_tears_down() {
        let (ctl, ns, _) = controller();
        ctl.initialize().unwrap();
        drop(ctl);
        assert!(ns.is_empty());
    }
}
