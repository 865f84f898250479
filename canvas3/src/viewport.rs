use canvas3_types::{glam::IVec2, Viewport};

/// Tracks the active viewport against the framebuffer it lives in, plus the
/// frame lock counter of a drawing session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewportManager {
    viewport: Viewport,
    full_framebuffer: bool,
    frame_lock: u32,
}

impl ViewportManager {
    pub fn new(framebuffer: IVec2) -> Self {
        Self {
            viewport: Viewport::full(framebuffer),
            full_framebuffer: true,
            frame_lock: 0,
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Whether the viewport was the whole framebuffer when last set.
    pub fn is_full_framebuffer(&self) -> bool {
        self.full_framebuffer
    }

    pub fn frame_lock(&self) -> u32 {
        self.frame_lock
    }

    /// State right after the driver opens: the whole framebuffer, unlocked.
    pub fn reset(&mut self, framebuffer: IVec2) {
        *self = Self::new(framebuffer);
    }

    /// Stores `viewport` as given. Callers keep it inside the framebuffer.
    pub fn set_viewport(&mut self, viewport: Viewport, framebuffer: IVec2) {
        self.viewport = viewport;
        self.full_framebuffer = viewport.covers(framebuffer);
    }

    /// Follows a framebuffer size change when the viewport was the full
    /// framebuffer. A partial viewport is left alone. Returns whether the
    /// viewport changed.
    pub fn handle_resize(&mut self, framebuffer: IVec2) -> bool {
        if !self.full_framebuffer || self.viewport.covers(framebuffer) {
            return false;
        }
        log::debug!(
            "Viewport follows framebuffer to {}x{}",
            framebuffer.x,
            framebuffer.y
        );
        self.viewport = Viewport::full(framebuffer);
        true
    }

    /// Reconciles after an explicit resize of an open canvas from `old` to
    /// `new`. Only a viewport that was exactly the old framebuffer grows.
    pub fn reconcile_resize(&mut self, old: IVec2, new: IVec2) -> bool {
        if old == new || self.viewport != Viewport::full(old) {
            return false;
        }
        self.set_viewport(Viewport::full(new), new);
        true
    }

    /// Before the canvas opens the viewport simply mirrors the framebuffer size.
    pub fn track_unopened(&mut self, framebuffer: IVec2) {
        self.viewport.width = framebuffer.x;
        self.viewport.height = framebuffer.y;
        self.full_framebuffer = self.viewport.covers(framebuffer);
    }

    pub fn begin_draw(&mut self) -> bool {
        self.frame_lock += 1;
        true
    }

    /// Ends one level of drawing. Never goes below zero.
    pub fn finish_draw(&mut self) {
        self.frame_lock = self.frame_lock.saturating_sub(1);
    }
}
