use std::{hash::BuildHasherDefault, sync::Arc};

use canvas3_types::{CanvasHandle, CanvasId, CanvasTag};
use indexmap::IndexMap;
use parking_lot::Mutex;
use rustc_hash::FxHasher;

use crate::util::handle_alloc::HandleAllocator;

struct RegistryInner {
    handles: HandleAllocator<CanvasTag>,
    names: IndexMap<usize, String, BuildHasherDefault<FxHasher>>,
}

impl RegistryInner {
    fn reclaim(&mut self) {
        for handle in self.handles.reclaim_delayed_handles() {
            if let Some(name) = self.names.shift_remove(&handle.idx) {
                log::debug!("Canvas {name} unregistered");
            }
        }
    }
}

/// Assigns identities and default names to canvases.
///
/// Created once by the application and passed to every canvas constructor,
/// see [`CanvasCommon::new`](crate::canvas::CanvasCommon::new). Identifiers
/// are never reused for the lifetime of the registry.
#[derive(Clone)]
pub struct CanvasRegistry {
    inner: Arc<Mutex<RegistryInner>>,
}

impl CanvasRegistry {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(RegistryInner {
                handles: HandleAllocator::new(false),
                names: IndexMap::default(),
            })),
        }
    }

    /// Registers a new canvas named `graph2d.<id in hex>`. The canvas stays
    /// registered until the last clone of the returned handle is dropped.
    pub fn register(&self) -> (CanvasHandle, String) {
        let mut inner = self.inner.lock();
        inner.reclaim();
        let handle = inner.handles.allocate();
        let name = format!("graph2d.{:x}", handle.idx);
        inner.names.insert(handle.idx, name.clone());
        log::debug!("Canvas {name} registered");
        (handle, name)
    }

    pub fn name_of(&self, id: CanvasId) -> Option<String> {
        let mut inner = self.inner.lock();
        inner.reclaim();
        inner.names.get(&id.idx).cloned()
    }

    pub fn names(&self) -> Vec<String> {
        let mut inner = self.inner.lock();
        inner.reclaim();
        inner.names.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.names().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forgets every registered canvas. Identifiers keep counting up.
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.reclaim();
        inner.names.clear();
    }
}

impl Default for CanvasRegistry {
    fn default() -> Self {
        Self::new()
    }
}
