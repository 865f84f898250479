use std::mem;

use canvas3_types::{
    glam::IVec2, CanvasHandle, CanvasId, DisplayMode, MouseCursorMode, OptionDescription, PresentMode, Variant,
    VariantKind, WindowDecoration,
};

use crate::{
    canvas::CanvasServices,
    config::ConfigSource,
    events::{Event, EventOutlet},
    platform::{CustomCursor, PlatformCanvas, WindowDescriptor},
    registry::CanvasRegistry,
    CanvasError,
};

pub const DEFAULT_WINDOW_TITLE: &str = "canvas3 application";

/// Options every canvas exposes through the indexed option protocol.
pub const CANVAS_OPTIONS: [OptionDescription; 3] = [
    OptionDescription {
        id: 0,
        name: "depth",
        description: "Display depth",
        kind: VariantKind::Long,
    },
    OptionDescription {
        id: 1,
        name: "fs",
        description: "Fullscreen if available",
        kind: VariantKind::Bool,
    },
    OptionDescription {
        id: 2,
        name: "mode",
        description: "Window size or resolution",
        kind: VariantKind::String,
    },
];

/// State and behaviour shared by every canvas, parameterized over the
/// platform hooks.
pub struct CanvasCommon<P: PlatformCanvas> {
    // Keeps the canvas registered.
    _handle: CanvasHandle,
    id: CanvasId,
    name: String,
    platform: P,
    framebuffer: IVec2,
    depth: i32,
    display_number: i32,
    refresh_rate: i32,
    full_screen: bool,
    fit_to_working_area: bool,
    allow_resizing: bool,
    vsync: bool,
    mouse_cursor_mode: MouseCursorMode,
    title: String,
    open: bool,
    outlet: Option<EventOutlet>,
}

impl<P: PlatformCanvas> CanvasCommon<P> {
    pub fn new(platform: P, registry: &CanvasRegistry) -> Self {
        let (handle, name) = registry.register();
        Self {
            id: handle.get_raw(),
            _handle: handle,
            name,
            platform,
            framebuffer: IVec2::new(640, 480),
            depth: 16,
            display_number: 0,
            refresh_rate: 0,
            full_screen: false,
            fit_to_working_area: false,
            allow_resizing: false,
            vsync: false,
            mouse_cursor_mode: MouseCursorMode::On,
            title: DEFAULT_WINDOW_TITLE.to_owned(),
            open: false,
            outlet: None,
        }
    }

    /// Reads the `Video.*` settings. A `-sysmouse`/`-nosysmouse` command line
    /// option overrides `Video.SystemMouseCursor`.
    pub fn initialize(&mut self, services: &CanvasServices) {
        {
            let config = services.config.read();
            self.framebuffer = IVec2::new(
                config.get_int("Video.ScreenWidth", self.framebuffer.x),
                config.get_int("Video.ScreenHeight", self.framebuffer.y),
            );
            self.depth = config.get_int("Video.ScreenDepth", self.depth);
            self.full_screen = config.get_bool("Video.FullScreen", self.full_screen);
            self.fit_to_working_area = config.get_bool("Video.FitToWorkingArea", self.fit_to_working_area);
            self.display_number = config.get_int("Video.DisplayNumber", self.display_number);
            self.refresh_rate = config.get_int("Video.DisplayFrequency", self.refresh_rate);
            self.vsync = config.get_bool("Video.VSync", self.vsync);
            self.title = config.get_str_or("Video.WindowTitle", &self.title).to_owned();
            self.mouse_cursor_mode =
                MouseCursorMode::from_config_str(config.get_str_or("Video.SystemMouseCursor", "yes"));
        }

        if let Some(system_mouse) = services
            .command_line
            .as_ref()
            .and_then(|cmd| cmd.bool_option("-sysmouse", "-nosysmouse"))
        {
            self.mouse_cursor_mode = match system_mouse {
                true => MouseCursorMode::On,
                false => MouseCursorMode::Off,
            };
        }

        self.outlet = services.events.as_ref().map(|queue| queue.create_outlet());

        log::debug!(
            "Canvas {} initialized: {}x{}x{}, full screen {}",
            self.name,
            self.framebuffer.x,
            self.framebuffer.y,
            self.depth,
            self.full_screen
        );
    }

    pub fn canvas_open(&mut self) -> Result<(), CanvasError> {
        if self.open {
            return Ok(());
        }

        if !self.full_screen && self.fit_to_working_area {
            if let Some(size) = self.fit_size_to_working_area(self.framebuffer) {
                let allow = mem::replace(&mut self.allow_resizing, true);
                self.canvas_resize(size.x, size.y);
                self.allow_resizing = allow;
            }
        }

        let desc = self.window_descriptor();
        if !self.platform.open_window(&desc) {
            return Err(CanvasError::WindowCreation {
                name: self.name.clone(),
            });
        }

        self.open = true;
        log::debug!("Canvas {} opened", self.name);
        Ok(())
    }

    pub fn canvas_close(&mut self) {
        if !self.open {
            return;
        }
        self.platform.close_window();
        self.open = false;
        log::debug!("Canvas {} closed", self.name);
    }

    /// Before the canvas opens this only records the size. Once open it needs
    /// resizing to be allowed and announces the new size on the event bus.
    pub fn canvas_resize(&mut self, width: i32, height: i32) -> bool {
        if !self.open {
            self.framebuffer = IVec2::new(width, height);
            return true;
        }
        if !self.allow_resizing {
            return false;
        }

        self.framebuffer = IVec2::new(width, height);
        if let Some(ref outlet) = self.outlet {
            outlet.broadcast(Event::canvas_resize(self.id));
        }
        log::debug!("Canvas {} resized to {}x{}", self.name, width, height);
        true
    }

    /// Shrinks `desired` so the framed window fits the workspace. `None` when
    /// the platform cannot tell.
    pub fn fit_size_to_working_area(&self, desired: IVec2) -> Option<IVec2> {
        let workspace = self.platform.workspace_dimensions()?;
        let framed = self.platform.add_window_frame_dimensions(desired)?;

        let excess = (framed - workspace).max(IVec2::ZERO);
        Some(desired - excess)
    }

    pub fn window_descriptor(&self) -> WindowDescriptor {
        WindowDescriptor {
            title: self.title.clone(),
            size: self.framebuffer,
            depth: self.depth,
            full_screen: self.full_screen,
            display_number: self.display_number,
            refresh_rate: self.refresh_rate,
            allow_resize: self.allow_resizing,
            mouse_cursor_mode: self.mouse_cursor_mode,
        }
    }

    pub fn set_full_screen(&mut self, full_screen: bool) {
        if self.full_screen == full_screen {
            return;
        }
        self.full_screen = full_screen;
        self.platform.full_screen_changed(full_screen);
    }

    pub fn allow_resize(&mut self, allow: bool) {
        self.allow_resizing = allow;
        self.platform.allow_resize(allow);
    }

    pub fn change_depth(&mut self, depth: i32) {
        self.depth = depth;
    }

    pub fn set_title(&mut self, title: &str) {
        self.title = title.to_owned();
        self.platform.set_title(title);
    }

    pub fn set_custom_mouse_cursor(&mut self, cursor: &CustomCursor<'_>) -> bool {
        if self.mouse_cursor_mode == MouseCursorMode::Off {
            return false;
        }
        self.platform.set_custom_mouse_cursor(cursor)
    }

    /// Caption shows in a window but not full screen, unless the platform
    /// knows better.
    pub fn window_decoration(&self, decoration: WindowDecoration) -> bool {
        self.platform
            .window_decoration(decoration)
            .unwrap_or(match decoration {
                WindowDecoration::Caption => !self.full_screen,
                WindowDecoration::ClientFrame => false,
            })
    }

    pub fn option_description(&self, idx: usize) -> Option<&OptionDescription> {
        CANVAS_OPTIONS.get(idx)
    }

    /// Fails when `value` is not of the option's kind or the option rejects it.
    pub fn set_option(&mut self, id: usize, value: &Variant) -> bool {
        match (id, value) {
            (0, Variant::Long(depth)) => match i32::try_from(*depth) {
                Ok(depth) => {
                    self.change_depth(depth);
                    true
                }
                Err(_) => false,
            },
            (1, Variant::Bool(full_screen)) => {
                self.set_full_screen(*full_screen);
                true
            }
            (2, Variant::String(mode)) => match mode.parse::<DisplayMode>() {
                Ok(DisplayMode(size)) => self.canvas_resize(size.x, size.y),
                Err(e) => {
                    log::debug!("{e}");
                    false
                }
            },
            _ => false,
        }
    }

    pub fn get_option(&self, id: usize) -> Option<Variant> {
        match id {
            0 => Some(Variant::Long(self.depth as i64)),
            1 => Some(Variant::Bool(self.full_screen)),
            2 => Some(Variant::String(DisplayMode(self.framebuffer).to_string())),
            _ => None,
        }
    }

    pub fn id(&self) -> CanvasId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn framebuffer_size(&self) -> IVec2 {
        self.framebuffer
    }

    pub fn color_depth(&self) -> i32 {
        self.depth
    }

    pub fn is_full_screen(&self) -> bool {
        self.full_screen
    }

    pub fn is_resize_allowed(&self) -> bool {
        self.allow_resizing
    }

    pub fn display_number(&self) -> i32 {
        self.display_number
    }

    pub fn refresh_rate(&self) -> i32 {
        self.refresh_rate
    }

    pub fn present_mode(&self) -> PresentMode {
        match self.vsync {
            true => PresentMode::Fifo,
            false => PresentMode::Immediate,
        }
    }

    pub fn mouse_cursor_mode(&self) -> MouseCursorMode {
        self.mouse_cursor_mode
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }
}

impl<P: PlatformCanvas> Drop for CanvasCommon<P> {
    fn drop(&mut self) {
        self.canvas_close();
    }
}

#[cfg(test)]
mod tests {
    use canvas3_types::{glam::IVec2, MouseCursorShape};

    use super::*;
    use crate::{
        canvas::Canvas,
        config::{CommandLine, ConfigFile, ConfigManager, PRIORITY_APPLICATION},
        events::{EventName, EventQueue},
        platform::HeadlessPlatform,
    };

    fn services(pairs: &[(&str, &str)]) -> CanvasServices {
        let mut config = ConfigManager::new();
        config.add_layer("test", PRIORITY_APPLICATION, ConfigFile::from_pairs(pairs.iter().copied()));
        CanvasServices::new(config.into_shared())
    }

    fn canvas(platform: HeadlessPlatform) -> CanvasCommon<HeadlessPlatform> {
        CanvasCommon::new(platform, &CanvasRegistry::new())
    }

    #[test]
    fn defaults() {
        let mut canvas = canvas(HeadlessPlatform::new());
        canvas.initialize(&services(&[]));
        assert_eq!(canvas.framebuffer_size(), IVec2::new(640, 480));
        assert_eq!(canvas.color_depth(), 16);
        assert!(!canvas.is_full_screen());
        assert_eq!(canvas.mouse_cursor_mode(), MouseCursorMode::On);
        assert_eq!(canvas.present_mode(), PresentMode::Immediate);
        assert_eq!(canvas.name(), "graph2d.0");
        assert_eq!(canvas.title(), DEFAULT_WINDOW_TITLE);
    }

    #[test]
    fn config_and_command_line() {
        let mut canvas = canvas(HeadlessPlatform::new());
        let services = services(&[
            ("Video.ScreenWidth", "1024"),
            ("Video.ScreenHeight", "768"),
            ("Video.ScreenDepth", "32"),
            ("Video.VSync", "yes"),
            ("Video.SystemMouseCursor", "rgbaonly"),
        ]);
        canvas.initialize(&services);
        assert_eq!(canvas.framebuffer_size(), IVec2::new(1024, 768));
        assert_eq!(canvas.mouse_cursor_mode(), MouseCursorMode::RgbaOnly);
        assert_eq!(canvas.present_mode(), PresentMode::Fifo);

        canvas.initialize(&services.with_command_line(CommandLine::parse(["-nosysmouse"])));
        assert_eq!(canvas.mouse_cursor_mode(), MouseCursorMode::Off);
    }

    #[test]
    fn resize_before_open_always_succeeds() {
        let mut canvas = canvas(HeadlessPlatform::new());
        assert!(!canvas.is_resize_allowed());
        assert!(canvas.canvas_resize(320, 200));
        assert_eq!(canvas.framebuffer_size(), IVec2::new(320, 200));
    }

    #[test]
    fn resize_after_open_needs_permission() {
        let queue = EventQueue::new();
        let mut canvas = canvas(HeadlessPlatform::new());
        canvas.initialize(&services(&[]).with_events(queue.clone()));
        let sub = queue.subscribe(&[EventName::CanvasResize(canvas.id())]);
        canvas.canvas_open().unwrap();

        assert!(!canvas.canvas_resize(800, 600));
        assert_eq!(canvas.framebuffer_size(), IVec2::new(640, 480));
        assert_eq!(sub.pending(), 0);

        canvas.allow_resize(true);
        assert!(canvas.canvas_resize(800, 600));
        assert_eq!(canvas.framebuffer_size(), IVec2::new(800, 600));
        assert_eq!(sub.drain(), vec![Event::canvas_resize(canvas.id())]);
    }

    #[test]
    fn open_is_idempotent_and_fits_working_area() {
        let mut canvas = canvas(HeadlessPlatform::new().with_workspace(IVec2::new(600, 1000)));
        canvas.initialize(&services(&[("Video.FitToWorkingArea", "true")]));
        canvas.canvas_open().unwrap();
        assert_eq!(canvas.framebuffer_size(), IVec2::new(600, 480));
        assert!(!canvas.is_resize_allowed());
        assert!(canvas.is_open());
        canvas.canvas_open().unwrap();
        assert_eq!(canvas.platform().window().map(|w| w.size), Some(IVec2::new(600, 480)));

        canvas.canvas_close();
        canvas.canvas_close();
        assert!(!canvas.is_open());
        assert!(canvas.platform().window().is_none());
    }

    #[test]
    fn fit_without_workspace_is_skipped() {
        let mut canvas = canvas(HeadlessPlatform::new());
        canvas.initialize(&services(&[("Video.FitToWorkingArea", "true")]));
        assert_eq!(canvas.fit_size_to_working_area(IVec2::new(640, 480)), None);
        canvas.canvas_open().unwrap();
        assert_eq!(canvas.framebuffer_size(), IVec2::new(640, 480));
    }

    #[test]
    fn option_protocol() {
        let mut canvas = canvas(HeadlessPlatform::new());
        assert_eq!(canvas.option_description(2).map(|d| d.name), Some("mode"));
        assert!(canvas.option_description(3).is_none());

        assert!(canvas.set_option(0, &Variant::Long(24)));
        assert_eq!(canvas.get_option(0), Some(Variant::Long(24)));
        assert!(!canvas.set_option(0, &Variant::Bool(true)));
        assert!(canvas.set_option(1, &Variant::Bool(true)));
        assert_eq!(canvas.get_option(1), Some(Variant::Bool(true)));
        assert!(canvas.set_option(2, &Variant::String("800x600".into())));
        assert_eq!(canvas.get_option(2), Some(Variant::String("800x600".into())));
        assert!(!canvas.set_option(2, &Variant::String("huge".into())));
        assert_eq!(canvas.framebuffer_size(), IVec2::new(800, 600));
        assert!(!canvas.set_option(7, &Variant::Long(1)));
        assert_eq!(canvas.get_option(7), None);
    }

    #[test]
    fn platform_defaults() {
        let mut canvas = canvas(HeadlessPlatform::new());
        assert!(Canvas::set_mouse_cursor(&mut canvas, MouseCursorShape::Arrow));
        assert!(!Canvas::set_mouse_cursor(&mut canvas, MouseCursorShape::Wait));
        assert!(!Canvas::set_gamma(&mut canvas, 2.2));
        assert_eq!(Canvas::gamma(&canvas), 1.0);
        assert!(canvas.window_decoration(WindowDecoration::Caption));
        canvas.set_full_screen(true);
        assert!(!canvas.window_decoration(WindowDecoration::Caption));
        assert!(!canvas.window_decoration(WindowDecoration::ClientFrame));
    }
}
