//! The canvas: owner of a framebuffer and its open/close/resize lifecycle.

mod common;

pub use common::*;

use canvas3_types::{
    glam::IVec2, AlertKind, CanvasId, ClipRect, MouseCursorMode, MouseCursorShape, OptionDescription, PresentMode,
    Variant, WindowDecoration,
};

use crate::{
    config::{CommandLine, SharedConfig},
    events::EventQueue,
    platform::{CustomCursor, PlatformCanvas},
    CanvasError,
};

/// Collaborators a canvas and driver pick up during initialization.
#[derive(Clone)]
pub struct CanvasServices {
    pub config: SharedConfig,
    pub command_line: Option<CommandLine>,
    pub events: Option<EventQueue>,
}

impl CanvasServices {
    pub fn new(config: SharedConfig) -> Self {
        Self {
            config,
            command_line: None,
            events: None,
        }
    }

    pub fn with_command_line(mut self, command_line: CommandLine) -> Self {
        self.command_line = Some(command_line);
        self
    }

    pub fn with_events(mut self, events: EventQueue) -> Self {
        self.events = Some(events);
        self
    }
}

/// Capability set of a canvas.
///
/// Implementors embed a [`CanvasCommon`] and expose it through
/// [`Canvas::common`]/[`Canvas::common_mut`]; every provided method forwards
/// to it. A specialized canvas overrides only what it does differently.
pub trait Canvas {
    type Platform: PlatformCanvas;

    fn common(&self) -> &CanvasCommon<Self::Platform>;
    fn common_mut(&mut self) -> &mut CanvasCommon<Self::Platform>;

    fn initialize(&mut self, services: &CanvasServices) {
        self.common_mut().initialize(services)
    }

    fn canvas_open(&mut self) -> Result<(), CanvasError> {
        self.common_mut().canvas_open()
    }

    fn canvas_close(&mut self) {
        self.common_mut().canvas_close()
    }

    fn canvas_resize(&mut self, width: i32, height: i32) -> bool {
        self.common_mut().canvas_resize(width, height)
    }

    fn id(&self) -> CanvasId {
        self.common().id()
    }

    fn name(&self) -> &str {
        self.common().name()
    }

    fn is_open(&self) -> bool {
        self.common().is_open()
    }

    fn framebuffer_size(&self) -> IVec2 {
        self.common().framebuffer_size()
    }

    fn color_depth(&self) -> i32 {
        self.common().color_depth()
    }

    fn is_full_screen(&self) -> bool {
        self.common().is_full_screen()
    }

    fn set_full_screen(&mut self, full_screen: bool) {
        self.common_mut().set_full_screen(full_screen)
    }

    fn allow_resize(&mut self, allow: bool) {
        self.common_mut().allow_resize(allow)
    }

    fn present_mode(&self) -> PresentMode {
        self.common().present_mode()
    }

    fn mouse_cursor_mode(&self) -> MouseCursorMode {
        self.common().mouse_cursor_mode()
    }

    fn print(&mut self, area: Option<ClipRect>) {
        self.common_mut().platform_mut().print(area)
    }

    fn set_title(&mut self, title: &str) {
        self.common_mut().set_title(title)
    }

    fn set_mouse_position(&mut self, x: i32, y: i32) -> bool {
        self.common_mut().platform_mut().set_mouse_position(x, y)
    }

    fn set_mouse_cursor(&mut self, shape: MouseCursorShape) -> bool {
        self.common_mut().platform_mut().set_mouse_cursor(shape)
    }

    fn set_custom_mouse_cursor(&mut self, cursor: &CustomCursor<'_>) -> bool {
        self.common_mut().set_custom_mouse_cursor(cursor)
    }

    fn set_gamma(&mut self, gamma: f32) -> bool {
        self.common_mut().platform_mut().set_gamma(gamma)
    }

    fn gamma(&self) -> f32 {
        self.common().platform().gamma()
    }

    fn window_decoration(&self, decoration: WindowDecoration) -> bool {
        self.common().window_decoration(decoration)
    }

    fn alert(&mut self, kind: AlertKind, title: &str, ok_text: &str, message: &str) {
        self.common_mut().platform_mut().alert(kind, title, ok_text, message)
    }

    fn option_description(&self, idx: usize) -> Option<&OptionDescription> {
        self.common().option_description(idx)
    }

    fn set_option(&mut self, id: usize, value: &Variant) -> bool {
        self.common_mut().set_option(id, value)
    }

    fn get_option(&self, id: usize) -> Option<Variant> {
        self.common().get_option(id)
    }
}

impl<P: PlatformCanvas> Canvas for CanvasCommon<P> {
    type Platform = P;

    fn common(&self) -> &CanvasCommon<P> {
        self
    }

    fn common_mut(&mut self) -> &mut CanvasCommon<P> {
        self
    }
}
