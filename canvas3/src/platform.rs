//! Hooks into the window system.
//!
//! A canvas never talks to the OS directly. Everything platform specific goes
//! through [`PlatformCanvas`], whose provided methods all mean "not supported
//! here" so a platform only implements what it can actually do.

use canvas3_types::{
    glam::{IVec2, UVec2},
    AlertKind, ClipRect, MouseCursorMode, MouseCursorShape, Rgba, WindowDecoration,
};
use image::RgbaImage;

/// What the platform needs to know to create a window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowDescriptor {
    pub title: String,
    pub size: IVec2,
    pub depth: i32,
    pub full_screen: bool,
    pub display_number: i32,
    pub refresh_rate: i32,
    pub allow_resize: bool,
    pub mouse_cursor_mode: MouseCursorMode,
}

/// Custom cursor image and hotspot.
pub struct CustomCursor<'a> {
    pub image: &'a RgbaImage,
    pub hotspot: UVec2,
    /// Foreground and background used when only a monochrome cursor is available.
    pub foreground: Rgba,
    pub background: Rgba,
}

pub trait PlatformCanvas {
    /// Creates the window. Returns false when that is not possible.
    fn open_window(&mut self, desc: &WindowDescriptor) -> bool;

    fn close_window(&mut self);

    /// Size of the usable desktop area, excluding task bars and the like.
    fn workspace_dimensions(&self) -> Option<IVec2> {
        None
    }

    /// Size of a window whose client area is `size`, including its frame.
    fn add_window_frame_dimensions(&self, _size: IVec2) -> Option<IVec2> {
        None
    }

    /// Presents the given area of the back buffer, or all of it.
    fn print(&mut self, _area: Option<ClipRect>) {}

    fn set_title(&mut self, _title: &str) {}

    fn set_icon(&mut self, _image: &RgbaImage) {}

    fn allow_resize(&mut self, _allow: bool) {}

    fn full_screen_changed(&mut self, _full_screen: bool) {}

    fn set_mouse_position(&mut self, _x: i32, _y: i32) -> bool {
        false
    }

    /// Only the plain arrow is assumed to exist everywhere.
    fn set_mouse_cursor(&mut self, shape: MouseCursorShape) -> bool {
        shape == MouseCursorShape::Arrow
    }

    fn set_custom_mouse_cursor(&mut self, _cursor: &CustomCursor<'_>) -> bool {
        false
    }

    fn set_gamma(&mut self, _gamma: f32) -> bool {
        false
    }

    fn gamma(&self) -> f32 {
        1.0
    }

    fn is_window_transparency_available(&self) -> bool {
        false
    }

    fn set_window_transparent(&mut self, _transparent: bool) -> bool {
        false
    }

    fn is_window_transparent(&self) -> bool {
        false
    }

    fn set_window_decoration(&mut self, _decoration: WindowDecoration, _enabled: bool) -> bool {
        false
    }

    /// State of a decoration. `None` lets the canvas answer from its own state.
    fn window_decoration(&self, _decoration: WindowDecoration) -> Option<bool> {
        None
    }

    fn alert(&mut self, _kind: AlertKind, _title: &str, _ok_text: &str, message: &str) {
        log::warn!("ALERT: {message}");
    }
}

/// A platform without a window system. Windows always open and nothing is
/// ever shown.
#[derive(Debug, Default)]
pub struct HeadlessPlatform {
    workspace: Option<IVec2>,
    window: Option<WindowDescriptor>,
    title: String,
}

impl HeadlessPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reports a workspace of the given size, enabling fit-to-working-area.
    pub fn with_workspace(mut self, size: IVec2) -> Self {
        self.workspace = Some(size);
        self
    }

    pub fn window(&self) -> Option<&WindowDescriptor> {
        self.window.as_ref()
    }

    pub fn title(&self) -> &str {
        &self.title
    }
}

impl PlatformCanvas for HeadlessPlatform {
    fn open_window(&mut self, desc: &WindowDescriptor) -> bool {
        self.title = desc.title.clone();
        self.window = Some(desc.clone());
        true
    }

    fn close_window(&mut self) {
        self.window = None;
    }

    fn workspace_dimensions(&self) -> Option<IVec2> {
        self.workspace
    }

    fn add_window_frame_dimensions(&self, size: IVec2) -> Option<IVec2> {
        self.workspace.map(|_| size)
    }

    fn set_title(&mut self, title: &str) {
        self.title = title.to_owned();
    }
}
