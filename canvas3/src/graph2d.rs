//! The public 2D drawing surface and the state every driver shares.

use canvas3_types::{
    find_rgb,
    glam::{IVec2, Vec2},
    get_rgba, ClipRect, PackedColor, Rgba, Variant, Viewport,
};
use image::RgbaImage;

use crate::{
    canvas::{Canvas, CanvasServices},
    clip,
    events::{Event, EventName, EventSubscription},
    font::{Font, FontCache, WriteFlags},
    viewport::ViewportManager,
    CanvasError,
};

/// A 2D drawing surface.
///
/// Drawing calls are only meaningful between [`Graphics2D::begin_draw`] and
/// [`Graphics2D::finish_draw`] on an open driver.
pub trait Graphics2D {
    fn open(&mut self) -> Result<(), CanvasError>;
    fn close(&mut self);
    fn is_open(&self) -> bool;

    /// Resizes the canvas. False when the canvas refused.
    fn resize(&mut self, width: i32, height: i32) -> bool;

    /// Reacts to the canvas having changed size on its own.
    fn handle_resize(&mut self);

    /// Events received since the last call.
    fn pending_events(&mut self) -> Vec<Event>;

    fn handle_event(&mut self, event: &Event) -> Result<bool, CanvasError> {
        match event.name {
            EventName::SystemOpen => self.open()?,
            EventName::SystemClose => self.close(),
            EventName::CanvasResize(_) => self.handle_resize(),
        }
        Ok(true)
    }

    /// Handles every pending event, returning how many there were.
    fn process_events(&mut self) -> Result<usize, CanvasError> {
        profiling::scope!("Graphics2D::process_events");
        let events = self.pending_events();
        for event in &events {
            self.handle_event(event)?;
        }
        Ok(events.len())
    }

    fn framebuffer_size(&self) -> IVec2;
    fn viewport(&self) -> Viewport;
    fn set_viewport(&mut self, viewport: Viewport);

    /// Width of the viewport.
    fn width(&self) -> i32 {
        self.viewport().width
    }

    /// Height of the viewport.
    fn height(&self) -> i32 {
        self.viewport().height
    }

    fn clip_rect(&self) -> ClipRect;
    fn set_clip_rect(&mut self, rect: ClipRect);

    fn begin_draw(&mut self) -> bool;
    fn finish_draw(&mut self);
    fn print(&mut self, area: Option<ClipRect>);

    /// Fills the viewport with `color`.
    fn clear(&mut self, color: PackedColor) {
        let viewport = self.viewport();
        self.draw_box(0, 0, viewport.width, viewport.height, color);
    }

    /// Clears in a drawing session of its own and presents the result.
    fn clear_all(&mut self, color: PackedColor) {
        if !self.begin_draw() {
            return;
        }
        self.clear(color);
        self.finish_draw();
        self.print(None);
    }

    fn draw_line(&mut self, from: Vec2, to: Vec2, color: PackedColor);
    fn draw_box(&mut self, x: i32, y: i32, width: i32, height: i32, color: PackedColor);
    fn draw_pixel(&mut self, x: i32, y: i32, color: PackedColor) {
        self.draw_pixels(&[IVec2::new(x, y)], color)
    }
    fn draw_pixels(&mut self, pixels: &[IVec2], color: PackedColor);

    /// Copies `width * height` pixels into the framebuffer at `(x, y)`.
    fn blit(&mut self, x: i32, y: i32, width: i32, height: i32, data: &[Rgba]);
    fn get_pixel(&mut self, x: i32, y: i32) -> Option<Rgba>;

    fn write(
        &mut self,
        font: &dyn Font,
        x: i32,
        y: i32,
        fg: PackedColor,
        bg: PackedColor,
        text: &str,
        flags: WriteFlags,
    );

    fn screenshot(&mut self) -> Option<RgbaImage>;

    /// System specific escape hatch. False when `command` is unknown.
    fn perform_extension(&mut self, _command: &str, _args: &[Variant]) -> bool {
        false
    }

    fn debug_command(&mut self, _command: &str) -> bool {
        false
    }

    fn hw_renderer(&self) -> Option<&str> {
        None
    }

    fn hw_gl_version(&self) -> Option<&str> {
        None
    }

    fn hw_vendor(&self) -> Option<&str> {
        None
    }

    fn find_rgb(&self, r: i32, g: i32, b: i32, a: i32) -> PackedColor {
        find_rgb(r, g, b, a)
    }

    fn get_rgb(&self, color: PackedColor) -> (u8, u8, u8) {
        let (r, g, b, _) = get_rgba(color);
        (r, g, b)
    }

    fn get_rgba(&self, color: PackedColor) -> (u8, u8, u8, u8) {
        get_rgba(color)
    }
}

/// The part of a 2D driver that does not depend on how pixels are made:
/// canvas ownership, viewport, clip rectangle, font cache and events.
pub struct Graphics2DCommon<C: Canvas> {
    canvas: C,
    viewport: ViewportManager,
    clip: ClipRect,
    open: bool,
    font_cache: Option<Box<dyn FontCache>>,
    subscription: Option<EventSubscription>,
}

impl<C: Canvas> Graphics2DCommon<C> {
    pub fn new(canvas: C) -> Self {
        let framebuffer = canvas.framebuffer_size();
        Self {
            canvas,
            viewport: ViewportManager::new(framebuffer),
            clip: ClipRect::from_size(framebuffer),
            open: false,
            font_cache: None,
            subscription: None,
        }
    }

    /// Initializes the canvas and starts listening for open, close and
    /// resize events of this canvas.
    pub fn initialize(&mut self, services: &CanvasServices) {
        self.canvas.initialize(services);
        let framebuffer = self.canvas.framebuffer_size();
        self.viewport = ViewportManager::new(framebuffer);
        self.clip = ClipRect::from_size(framebuffer);

        self.subscription = services.events.as_ref().map(|queue| {
            queue.subscribe(&[
                EventName::SystemOpen,
                EventName::SystemClose,
                EventName::CanvasResize(self.canvas.id()),
            ])
        });
    }

    pub fn open(&mut self) -> Result<(), CanvasError> {
        if self.open {
            return Ok(());
        }
        self.canvas.canvas_open()?;
        self.open = true;

        self.viewport.reset(self.canvas.framebuffer_size());
        self.set_clip_rect(ClipRect::from_size(self.viewport.viewport().size()));
        Ok(())
    }

    pub fn close(&mut self) {
        if !self.open {
            return;
        }
        self.canvas.canvas_close();
        self.font_cache = None;
        self.open = false;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn handle_resize(&mut self) {
        if self.viewport.handle_resize(self.canvas.framebuffer_size()) {
            self.reset_clip_rect();
        }
    }

    pub fn resize(&mut self, width: i32, height: i32) -> bool {
        let old = self.canvas.framebuffer_size();
        if !self.canvas.canvas_resize(width, height) {
            return false;
        }
        let new = self.canvas.framebuffer_size();

        if !self.open {
            self.viewport.track_unopened(new);
            return true;
        }
        if self.viewport.reconcile_resize(old, new) {
            self.reset_clip_rect();
        }
        true
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        self.subscription
            .as_ref()
            .map(EventSubscription::drain)
            .unwrap_or_default()
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport.viewport()
    }

    pub fn is_viewport_full_framebuffer(&self) -> bool {
        self.viewport.is_full_framebuffer()
    }

    /// Stores `viewport` unclamped and keeps the clip rectangle inside it.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport.set_viewport(viewport, self.canvas.framebuffer_size());
        if let Some(ref mut font_cache) = self.font_cache {
            font_cache.set_viewport_offset(viewport.offset());
        }
        self.set_clip_rect(self.clip);
    }

    pub fn clip_rect(&self) -> ClipRect {
        self.clip
    }

    pub fn set_clip_rect(&mut self, rect: ClipRect) {
        self.clip = clip::clamp_clip_rect(rect, self.viewport.viewport().size());
        if let Some(ref mut font_cache) = self.font_cache {
            font_cache.set_clip_rect(self.clip);
        }
    }

    fn reset_clip_rect(&mut self) {
        self.set_clip_rect(ClipRect::from_size(self.viewport.viewport().size()));
    }

    /// See [`clip::clip_line`].
    pub fn clip_line(p0: &mut Vec2, p1: &mut Vec2, bounds: ClipRect) -> bool {
        clip::clip_line(p0, p1, bounds)
    }

    pub fn begin_draw(&mut self) -> bool {
        self.viewport.begin_draw()
    }

    pub fn finish_draw(&mut self) {
        self.viewport.finish_draw()
    }

    pub fn frame_lock(&self) -> u32 {
        self.viewport.frame_lock()
    }

    #[allow(clippy::too_many_arguments)]
    pub fn write(
        &mut self,
        font: &dyn Font,
        x: i32,
        y: i32,
        fg: PackedColor,
        bg: PackedColor,
        text: &str,
        flags: WriteFlags,
    ) {
        if text.is_empty() {
            return;
        }
        match self.font_cache {
            Some(ref mut font_cache) => font_cache.write_string(font, IVec2::new(x, y), fg, bg, text, flags),
            None => log::warn!("Text output without a font cache: {text:?}"),
        }
    }

    /// Installs the font cache and brings it up to date with the clip
    /// rectangle and viewport.
    pub fn set_font_cache(&mut self, font_cache: Option<Box<dyn FontCache>>) {
        self.font_cache = font_cache;
        if let Some(ref mut font_cache) = self.font_cache {
            font_cache.set_clip_rect(self.clip);
            font_cache.set_viewport_offset(self.viewport.viewport().offset());
        }
    }

    pub fn font_cache_mut(&mut self) -> Option<&mut (dyn FontCache + 'static)> {
        self.font_cache.as_deref_mut()
    }

    pub fn canvas(&self) -> &C {
        &self.canvas
    }

    pub fn canvas_mut(&mut self) -> &mut C {
        &mut self.canvas
    }
}

impl<C: Canvas> Drop for Graphics2DCommon<C> {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use canvas3_types::glam::IVec2;

    use super::*;
    use crate::{
        canvas::CanvasCommon,
        config::ConfigManager,
        events::EventQueue,
        platform::HeadlessPlatform,
        registry::CanvasRegistry,
    };

    fn common() -> (Graphics2DCommon<CanvasCommon<HeadlessPlatform>>, EventQueue) {
        let queue = EventQueue::new();
        let mut g2d = Graphics2DCommon::new(CanvasCommon::new(HeadlessPlatform::new(), &CanvasRegistry::new()));
        g2d.initialize(&CanvasServices::new(ConfigManager::new().into_shared()).with_events(queue.clone()));
        (g2d, queue)
    }

    #[test]
    fn open_sets_full_viewport_and_clip() {
        let (mut g2d, _queue) = common();
        g2d.open().unwrap();
        assert_eq!(g2d.viewport(), Viewport::new(0, 0, 640, 480));
        assert_eq!(g2d.clip_rect(), ClipRect::new(0, 0, 640, 480));
        assert_eq!(g2d.frame_lock(), 0);
    }

    #[test]
    fn clip_rect_clamps_to_viewport() {
        let (mut g2d, _queue) = common();
        g2d.open().unwrap();
        g2d.set_clip_rect(ClipRect::new(-5, 10, 700, 300));
        assert_eq!(g2d.clip_rect(), ClipRect::new(0, 10, 640, 300));

        g2d.set_viewport(Viewport::new(10, 10, 100, 100));
        assert_eq!(g2d.clip_rect(), ClipRect::new(0, 10, 100, 100));
    }

    #[test]
    fn resize_before_open_tracks_framebuffer() {
        let (mut g2d, _queue) = common();
        assert!(g2d.resize(320, 200));
        assert_eq!(g2d.viewport().size(), IVec2::new(320, 200));
    }

    #[test]
    fn resize_after_open_needs_permission() {
        let (mut g2d, queue) = common();
        g2d.open().unwrap();
        assert!(!g2d.resize(800, 600));
        assert_eq!(g2d.viewport(), Viewport::new(0, 0, 640, 480));

        g2d.canvas_mut().allow_resize(true);
        assert!(g2d.resize(800, 600));
        assert_eq!(g2d.viewport(), Viewport::new(0, 0, 800, 600));
        assert_eq!(g2d.clip_rect(), ClipRect::new(0, 0, 800, 600));
        assert_eq!(g2d.take_events().len(), 1);
        drop(queue);
    }

    #[test]
    fn write_skips_empty_text() {
        struct NoFont;
        impl Font for NoFont {
            fn text_height(&self) -> i32 {
                0
            }
            fn dimensions(&self, _text: &str) -> IVec2 {
                IVec2::ZERO
            }
        }
        let (mut g2d, _queue) = common();
        g2d.write(&NoFont, 0, 0, 0, -1, "", WriteFlags::empty());
    }
}
