use std::{
    marker::PhantomData,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use canvas3_types::{RawResourceHandle, ResourceHandle};
use parking_lot::Mutex;

/// Hands out [`ResourceHandle`]s and collects them again once they are dropped.
///
/// Dropped handles are not reusable straight away. They sit in a delay list
/// until the owner calls [`HandleAllocator::reclaim_delayed_handles`], which
/// is where the backing resource gets released. This keeps a handle valid for
/// the rest of the frame it was dropped in.
pub struct HandleAllocator<T> {
    max_allocated: AtomicUsize,
    /// `None` when indices must never be handed out twice.
    freelist: Option<Mutex<Vec<usize>>>,
    delay_list: Arc<Mutex<Vec<usize>>>,
    _phantom: PhantomData<T>,
}

impl<T> HandleAllocator<T> {
    pub fn new(reuse_indices: bool) -> Self {
        Self {
            max_allocated: AtomicUsize::new(0),
            freelist: reuse_indices.then(|| Mutex::new(Vec::new())),
            delay_list: Arc::new(Mutex::new(Vec::new())),
            _phantom: PhantomData,
        }
    }

    pub fn allocate(&self) -> ResourceHandle<T> {
        let maybe_idx = self.freelist.as_ref().and_then(|freelist| freelist.lock().pop());
        let idx = maybe_idx.unwrap_or_else(|| self.max_allocated.fetch_add(1, Ordering::Relaxed));

        let delay_list = Arc::clone(&self.delay_list);
        let destroy_fn = move |handle: RawResourceHandle<T>| delay_list.lock().push(handle.idx);

        ResourceHandle::new(destroy_fn, idx)
    }

    /// Returns every handle dropped since the last call, making their indices
    /// available again when reuse is enabled.
    pub fn reclaim_delayed_handles(&self) -> Vec<RawResourceHandle<T>> {
        let mut locked_delay_list = self.delay_list.lock();

        if let Some(ref freelist) = self.freelist {
            freelist.lock().extend_from_slice(&locked_delay_list);
        }
        locked_delay_list.drain(..).map(RawResourceHandle::new).collect()
    }

    /// Number of indices ever handed out.
    pub fn allocated(&self) -> usize {
        self.max_allocated.load(Ordering::Relaxed)
    }
}

impl<T> Default for HandleAllocator<T> {
    fn default() -> Self {
        Self::new(true)
    }
}

#[cfg(test)]
mod tests {
    use canvas3_types::TextureTag;

    use super::*;

    #[test]
    fn reuse_after_reclaim() {
        let alloc = HandleAllocator::<TextureTag>::new(true);
        let a = alloc.allocate();
        let b = alloc.allocate();
        assert_eq!((a.idx, b.idx), (0, 1));

        drop(a);
        // Not reusable until reclaimed.
        let c = alloc.allocate();
        assert_eq!(c.idx, 2);

        let reclaimed = alloc.reclaim_delayed_handles();
        assert_eq!(reclaimed, vec![RawResourceHandle::new(0)]);
        assert_eq!(alloc.allocate().idx, 0);
    }

    #[test]
    fn no_reuse() {
        let alloc = HandleAllocator::<TextureTag>::new(false);
        drop(alloc.allocate());
        assert_eq!(alloc.reclaim_delayed_handles().len(), 1);
        assert_eq!(alloc.allocate().idx, 1);
        assert_eq!(alloc.allocated(), 2);
    }
}
