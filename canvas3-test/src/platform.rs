use canvas3::{
    opengl::GlPlatform,
    platform::{PlatformCanvas, WindowDescriptor},
    types::{glam::IVec2, ClipRect, PixelFormat},
};

type FormatFilter = Box<dyn Fn(&PixelFormat) -> bool + Send>;

/// Scriptable window system.
///
/// Accepts every pixel format unless told otherwise and remembers what it
/// was asked to do.
pub struct MockPlatform {
    pub workspace: Option<IVec2>,
    /// Added to the client size to get the framed window size.
    pub frame: IVec2,
    pub fail_open: bool,
    pub window: Option<WindowDescriptor>,
    pub tried_formats: Vec<PixelFormat>,
    pub swaps: usize,
    pub prints: Vec<Option<ClipRect>>,
    pub title: String,
    accept: FormatFilter,
}

impl MockPlatform {
    pub fn new() -> Self {
        Self {
            workspace: None,
            frame: IVec2::ZERO,
            fail_open: false,
            window: None,
            tried_formats: Vec::new(),
            swaps: 0,
            prints: Vec::new(),
            title: String::new(),
            accept: Box::new(|_| true),
        }
    }

    pub fn with_workspace(mut self, workspace: IVec2, frame: IVec2) -> Self {
        self.workspace = Some(workspace);
        self.frame = frame;
        self
    }

    pub fn accepting(mut self, filter: impl Fn(&PixelFormat) -> bool + Send + 'static) -> Self {
        self.accept = Box::new(filter);
        self
    }

    pub fn failing_open(mut self) -> Self {
        self.fail_open = true;
        self
    }
}

impl Default for MockPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl PlatformCanvas for MockPlatform {
    fn open_window(&mut self, desc: &WindowDescriptor) -> bool {
        if self.fail_open {
            return false;
        }
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
        self.workspace.map(|_| size + self.frame)
    }

    fn print(&mut self, area: Option<ClipRect>) {
        self.prints.push(area);
    }

    fn set_title(&mut self, title: &str) {
        self.title = title.to_owned();
    }
}

impl GlPlatform for MockPlatform {
    fn accept_pixel_format(&mut self, format: &PixelFormat) -> bool {
        self.tried_formats.push(*format);
        (self.accept)(format)
    }

    fn swap_buffers(&mut self) {
        self.swaps += 1;
    }
}
