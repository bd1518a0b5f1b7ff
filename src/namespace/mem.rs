// CLASSIFICATION: COMMUNITY
// Filename: mem.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-19

//! In‑process pseudo‑filesystem implementing [`Namespace`].
//!
//! Keeps a flat map of entries keyed by handle id. Reads look the callback
//! up under the lock and run it after releasing it, so concurrent readers
//! only contend for the lookup. Removing a directory removes everything
//! beneath it.

use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use log::debug;

use super::{Namespace, NodeHandle, NodeMode, ReadFn};
use crate::error::{ExposeError, NamespaceError};

enum EntryKind {
    Dir,
    File { mode: NodeMode, read: ReadFn },
}

struct Entry {
    parent: Option<u64>,
    path: String,
    kind: EntryKind,
}

#[derive(Default)]
struct Tree {
    entries: BTreeMap<u64, Entry>,
    creates: usize,
    fail_at: Option<usize>,
    fail_named: HashSet<String>,
}

impl Tree {
    fn by_path(&self, path: &str) -> Option<(u64, &Entry)> {
        self.entries
            .iter()
            .find(|(_, e)| e.path == path)
            .map(|(id, e)| (*id, e))
    }

    fn check_fault(&mut self, name: &str) -> Result<(), NamespaceError> {
        self.creates += 1;
        if self.fail_at == Some(self.creates) || self.fail_named.contains(name) {
            return Err(NamespaceError::CreateFailed {
                name: name.to_string(),
                reason: "injected fault".into(),
            });
        }
        Ok(())
    }

    fn child_path(
        &self,
        name: &str,
        parent: Option<&NodeHandle>,
    ) -> Result<(Option<u64>, String), NamespaceError> {
        let (parent_id, path) = match parent {
            None => (None, name.to_string()),
            Some(p) => match self.entries.get(&p.id()) {
                Some(Entry {
                    kind: EntryKind::Dir,
                    path,
                    ..
                }) => (Some(p.id()), format!("{path}/{name}")),
                _ => return Err(NamespaceError::MissingParent { name: name.to_string() }),
            },
        };
        if self.by_path(&path).is_some() {
            return Err(NamespaceError::AlreadyExists(path));
        }
        Ok((parent_id, path))
    }

    fn remove_subtree(&mut self, id: u64) -> usize {
        if !self.entries.contains_key(&id) {
            return 0;
        }
        let mut doomed = HashSet::from([id]);
        loop {
            let before = doomed.len();
            for (child, e) in &self.entries {
                if e.parent.map_or(false, |p| doomed.contains(&p)) {
                    doomed.insert(*child);
                }
            }
            if doomed.len() == before {
                break;
            }
        }
        for id in &doomed {
            self.entries.remove(id);
        }
        doomed.len()
    }
}

/// In‑memory exposure namespace.
#[derive(Default)]
pub struct MemNamespace {
    tree: Mutex<Tree>,
    next_id: AtomicU64,
}

impl MemNamespace {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tree>, NamespaceError> {
        self.tree.lock().map_err(|_| NamespaceError::LockPoisoned)
    }

    fn insert(
        &self,
        tree: &mut Tree,
        parent: Option<u64>,
        path: String,
        kind: EntryKind,
    ) -> NodeHandle {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        debug!("namespace: created {path}");
        tree.entries.insert(
            id,
            Entry {
                parent,
                path: path.clone(),
                kind,
            },
        );
        NodeHandle::new(id, path)
    }

    /// Read a leaf by path, invoking its bound callback.
    pub fn read(&self, path: &str) -> Result<String, ExposeError> {
        let read = {
            let tree = self.lock()?;
            match tree.by_path(path) {
                Some((_, Entry { kind: EntryKind::File { read, .. }, .. })) => read.clone(),
                Some(_) => return Err(NamespaceError::IsDirectory(path.to_string()).into()),
                None => return Err(NamespaceError::NotFound(path.to_string()).into()),
            }
        };
        read()
    }

    /// Handle of the node at `path`, if present.
    pub fn lookup(&self, path: &str) -> Option<NodeHandle> {
        let tree = self.lock().ok()?;
        tree.by_path(path).map(|(id, e)| NodeHandle::new(id, e.path.clone()))
    }

    pub fn contains(&self, path: &str) -> bool {
        self.lookup(path).is_some()
    }

    pub fn is_dir(&self, path: &str) -> bool {
        self.lock()
            .map(|t| matches!(t.by_path(path), Some((_, Entry { kind: EntryKind::Dir, .. }))))
            .unwrap_or(false)
    }

    /// Permission bits of a file node.
    pub fn mode_of(&self, path: &str) -> Option<NodeMode> {
        let tree = self.lock().ok()?;
        match tree.by_path(path) {
            Some((_, Entry { kind: EntryKind::File { mode, .. }, .. })) => Some(*mode),
            _ => None,
        }
    }

    /// Every visible path, sorted.
    pub fn paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self
            .lock()
            .map(|t| t.entries.values().map(|e| e.path.clone()).collect())
            .unwrap_or_default();
        paths.sort();
        paths
    }

    pub fn len(&self) -> usize {
        self.lock().map(|t| t.entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True if any entry's parent is missing. Never expected to hold.
    pub fn has_orphans(&self) -> bool {
        self.lock()
            .map(|t| {
                t.entries
                    .values()
                    .any(|e| e.parent.map_or(false, |p| !t.entries.contains_key(&p)))
            })
            .unwrap_or(false)
    }

    /// Drop a node as if the host removed it underneath us.
    pub fn remove_external(&self, path: &str) -> bool {
        let Ok(mut tree) = self.lock() else {
            return false;
        };
        let id = tree.by_path(path).map(|(id, _)| id);
        match id {
            Some(id) => tree.remove_subtree(id) > 0,
            None => false,
        }
    }

    /// Fail the `n`th create from now (1 = the next one).
    pub fn fail_nth_create(&self, n: usize) {
        if let Ok(mut tree) = self.lock() {
            tree.fail_at = Some(tree.creates + n);
        }
    }

    /// Fail every create of a node called `name`.
    pub fn fail_create_named(&self, name: &str) {
        if let Ok(mut tree) = self.lock() {
            tree.fail_named.insert(name.to_string());
        }
    }

    pub fn clear_faults(&self) {
        if let Ok(mut tree) = self.lock() {
            tree.fail_at = None;
            tree.fail_named.clear();
        }
    }
}

impl Namespace for MemNamespace {
    fn create_directory(
        &self,
        name: &str,
        parent: Option<&NodeHandle>,
    ) -> Result<NodeHandle, NamespaceError> {
        let mut tree = self.lock()?;
        tree.check_fault(name)?;
        let (parent_id, path) = tree.child_path(name, parent)?;
        Ok(self.insert(&mut tree, parent_id, path, EntryKind::Dir))
    }

    fn create_read_only_file(
        &self,
        name: &str,
        parent: &NodeHandle,
        mode: NodeMode,
        read: ReadFn,
    ) -> Result<NodeHandle, NamespaceError> {
        let mut tree = self.lock()?;
        tree.check_fault(name)?;
        if !mode.is_read_only() {
            return Err(NamespaceError::CreateFailed {
                name: name.to_string(),
                reason: format!("mode {mode} is writable"),
            });
        }
        let (parent_id, path) = tree.child_path(name, Some(parent))?;
        Ok(self.insert(&mut tree, parent_id, path, EntryKind::File { mode, read }))
    }

    fn remove(&self, node: &NodeHandle) {
        let mut tree = self.tree.lock().unwrap_or_else(PoisonError::into_inner);
        if tree.remove_subtree(node.id()) > 0 {
            debug!("namespace: removed {}", node.path());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn constant(text: &'static str) -> ReadFn {
        Arc::new(move || Ok(text.to_string()))
    }

    #[test]
    fn builds_and_reads_tree() {
        let ns = MemNamespace::new();
        let root = ns.create_directory("txt", None).unwrap();
        let sub = ns.create_directory("public", Some(&root)).unwrap();
        ns.create_read_only_file("status", &sub, NodeMode::READ_ONLY, constant("0x01\n"))
            .unwrap();
        assert_eq!(ns.read("txt/public/status").unwrap(), "0x01\n");
        assert_eq!(ns.mode_of("txt/public/status"), Some(NodeMode::READ_ONLY));
        assert!(ns.is_dir("txt/public"));
        assert!(matches!(
            ns.read("txt/public"),
            Err(ExposeError::Namespace(NamespaceError::IsDirectory(_)))
        ));
        assert!(matches!(
            ns.read("txt/public/nope"),
            Err(ExposeError::Namespace(NamespaceError::NotFound(_)))
        ));
    }

    #[test]
    fn remove_is_idempotent_and_recursive() {
        let ns = MemNamespace::new();
        let root = ns.create_directory("txt", None).unwrap();
        let sub = ns.create_directory("public", Some(&root)).unwrap();
        let leaf = ns
            .create_read_only_file("status", &sub, NodeMode::READ_ONLY, constant("x"))
            .unwrap();
        ns.remove(&root);
        assert!(ns.is_empty());
        assert!(!ns.has_orphans());
        ns.remove(&root);
        ns.remove(&leaf);
        assert!(ns.is_empty());
    }

    #[test]
    fn rejects_duplicates_missing_parents_and_writable_files() {
        let ns = MemNamespace::new();
        let root = ns.create_directory("txt", None).unwrap();
        assert!(matches!(
            ns.create_directory("txt", None),
            Err(NamespaceError::AlreadyExists(_))
        ));
        let ghost = NodeHandle::new(999, "ghost");
        assert!(matches!(
            ns.create_directory("x", Some(&ghost)),
            Err(NamespaceError::MissingParent { .. })
        ));
        let writable = NodeMode::OWNER_WRITE | NodeMode::OWNER_READ;
        assert!(ns
            .create_read_only_file("w", &root, writable, constant("x"))
            .is_err());
    }

    #[test]
    fn injected_faults() {
        let ns = MemNamespace::new();
        ns.fail_nth_create(2);
        let root = ns.create_directory("txt", None).unwrap();
        assert!(ns.create_directory("public", Some(&root)).is_err());
        ns.create_directory("public", Some(&root)).unwrap();

        ns.fail_create_named("status");
        assert!(ns.create_directory("status", Some(&root)).is_err());
        ns.clear_faults();
        assert!(ns.create_directory("status", Some(&root)).is_ok());
    }
}
