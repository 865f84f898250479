use canvas3_types::MixMode;

use crate::{
    opengl::backend::{BlendFactor, GlBackend, GlCapability},
    util::typedefs::FastHashMap,
};

/// Shadow copy of GL state. Changes that would not alter anything never
/// reach the backend.
#[derive(Debug, Default)]
pub struct GlStateCache {
    capabilities: FastHashMap<GlCapability, bool>,
    blend_func: Option<(BlendFactor, BlendFactor)>,
    forwarded: usize,
}

impl GlStateCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether the backend had to be told.
    pub fn set_capability<B: GlBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        capability: GlCapability,
        enabled: bool,
    ) -> bool {
        if self.capabilities.get(&capability) == Some(&enabled) {
            return false;
        }
        self.capabilities.insert(capability, enabled);
        backend.set_capability(capability, enabled);
        self.forwarded += 1;
        true
    }

    pub fn enable<B: GlBackend + ?Sized>(&mut self, backend: &mut B, capability: GlCapability) -> bool {
        self.set_capability(backend, capability, true)
    }

    pub fn disable<B: GlBackend + ?Sized>(&mut self, backend: &mut B, capability: GlCapability) -> bool {
        self.set_capability(backend, capability, false)
    }

    pub fn set_blend_func<B: GlBackend + ?Sized>(&mut self, backend: &mut B, src: BlendFactor, dst: BlendFactor) {
        if self.blend_func == Some((src, dst)) {
            return;
        }
        self.blend_func = Some((src, dst));
        backend.set_blend_func(src, dst);
        self.forwarded += 1;
    }

    /// Sets up blending for `mix_mode`.
    pub fn apply_mix_mode<B: GlBackend + ?Sized>(&mut self, backend: &mut B, mix_mode: MixMode) {
        let factors = match mix_mode {
            MixMode::Copy => None,
            MixMode::Alpha => Some((BlendFactor::SrcAlpha, BlendFactor::OneMinusSrcAlpha)),
            MixMode::Add => Some((BlendFactor::One, BlendFactor::One)),
            MixMode::Multiply => Some((BlendFactor::DstColor, BlendFactor::Zero)),
            MixMode::Multiply2 => Some((BlendFactor::DstColor, BlendFactor::SrcColor)),
            MixMode::Transparent => Some((BlendFactor::Zero, BlendFactor::One)),
        };
        match factors {
            Some((src, dst)) => {
                self.enable(backend, GlCapability::Blend);
                self.set_blend_func(backend, src, dst);
            }
            None => {
                self.disable(backend, GlCapability::Blend);
            }
        }
    }

    pub fn is_enabled(&self, capability: GlCapability) -> Option<bool> {
        self.capabilities.get(&capability).copied()
    }

    pub fn blend_func(&self) -> Option<(BlendFactor, BlendFactor)> {
        self.blend_func
    }

    /// Number of changes that reached the backend.
    pub fn forwarded_changes(&self) -> usize {
        self.forwarded
    }

    /// Forgets everything, e.g. after the context was recreated.
    pub fn invalidate(&mut self) {
        self.capabilities.clear();
        self.blend_func = None;
    }
}
