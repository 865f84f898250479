//! Type declarations for the canvas3 2D canvas crate.
//!
//! This is reexported in the canvas3 crate proper and includes all the "surface"
//! api arguments.

use std::{fmt::Debug, hash::Hash, marker::PhantomData, ops::Deref, sync::Arc};

/// Reexport of the glam version canvas3 is using.
pub use glam;
/// Reexport of the wgpu-types version canvas3 uses for present modes and backends.
pub use wgt::{Backend, PresentMode};

mod color;
mod cursor;
mod mesh;
mod pixel_format;
mod rect;
mod variant;

pub use color::*;
pub use cursor::*;
pub use mesh::*;
pub use pixel_format::*;
pub use rect::*;
pub use variant::*;

/// Index of a texture, shader or canvas, without ownership.
///
/// Backends receive these and events carry them; the resource they name may
/// already be gone.
pub struct RawResourceHandle<T> {
    pub idx: usize,
    _phantom: PhantomData<T>,
}

impl<T> RawResourceHandle<T> {
    pub const fn new(idx: usize) -> Self {
        Self {
            idx,
            _phantom: PhantomData,
        }
    }
}

// Manual impls so that tag types need no derives.
impl<T> Debug for RawResourceHandle<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.idx)
    }
}

impl<T> Copy for RawResourceHandle<T> {}

impl<T> Clone for RawResourceHandle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> PartialEq for RawResourceHandle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.idx == other.idx
    }
}

impl<T> Eq for RawResourceHandle<T> {}

impl<T> Hash for RawResourceHandle<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.idx.hash(state);
    }
}

/// Shared ownership of a texture, shader or registered canvas.
///
/// Clones share one release callback, which runs when the last clone drops;
/// the driver uses it to queue textures for deletion and the canvas registry
/// to forget a canvas name. Render state keys compare these by index, so two
/// meshes batch together only when they use the very same texture or shader.
pub struct ResourceHandle<T> {
    release: Arc<dyn Fn(RawResourceHandle<T>) + Send + Sync>,
    raw: RawResourceHandle<T>,
}

impl<T> ResourceHandle<T> {
    pub fn new(release: impl Fn(RawResourceHandle<T>) + Send + Sync + 'static, idx: usize) -> Self {
        Self {
            release: Arc::new(release),
            raw: RawResourceHandle::new(idx),
        }
    }

    pub fn get_raw(&self) -> RawResourceHandle<T> {
        self.raw
    }
}

impl<T> Drop for ResourceHandle<T> {
    fn drop(&mut self) {
        if Arc::strong_count(&self.release) == 1 {
            (self.release)(self.raw);
        }
    }
}

impl<T> Debug for ResourceHandle<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{} ({} owners)", self.raw.idx, Arc::strong_count(&self.release))
    }
}

impl<T> Clone for ResourceHandle<T> {
    fn clone(&self) -> Self {
        Self {
            release: self.release.clone(),
            raw: self.raw,
        }
    }
}

impl<T> PartialEq for ResourceHandle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl<T> Eq for ResourceHandle<T> {}

impl<T> Hash for ResourceHandle<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl<T> Deref for ResourceHandle<T> {
    type Target = RawResourceHandle<T>;

    fn deref(&self) -> &Self::Target {
        &self.raw
    }
}

#[doc(hidden)]
pub struct TextureTag;
#[doc(hidden)]
pub struct ShaderTag;
#[doc(hidden)]
pub struct ShaderVarDomainTag;
#[doc(hidden)]
pub struct CanvasTag;

/// A texture uploaded through the driver.
pub type TextureHandle = ResourceHandle<TextureTag>;
/// A shader a mesh is drawn with. Owned by the renderer, not by canvas3.
pub type ShaderHandle = ResourceHandle<ShaderTag>;
/// The blend domain of a mesh.
pub type ShaderVarDomainHandle = ResourceHandle<ShaderVarDomainTag>;
/// Keeps a canvas registered; see `canvas3::registry::CanvasRegistry`.
pub type CanvasHandle = ResourceHandle<CanvasTag>;

/// Texture as seen by a GL backend.
pub type RawTextureHandle = RawResourceHandle<TextureTag>;
/// Canvas identity carried by resize events.
pub type CanvasId = RawResourceHandle<CanvasTag>;

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[test]
    fn handle_destroy_runs_on_last_drop() {
        let dropped = Arc::new(AtomicUsize::new(0));
        let dropped_clone = Arc::clone(&dropped);
        let handle = TextureHandle::new(
            move |_| {
                dropped_clone.fetch_add(1, Ordering::Relaxed);
            },
            3,
        );
        let clone = handle.clone();
        drop(handle);
        assert_eq!(dropped.load(Ordering::Relaxed), 0);
        drop(clone);
        assert_eq!(dropped.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn handle_equality_is_identity() {
        let a = TextureHandle::new(|_| (), 1);
        let b = TextureHandle::new(|_| (), 2);
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
        assert_eq!(a.get_raw(), RawTextureHandle::new(1));
        assert_eq!(format!("{:?}", a.get_raw()), "#1");
    }
}
