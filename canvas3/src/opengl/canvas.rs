use canvas3_types::{ClipRect, PixelFormat};

use crate::{
    canvas::{Canvas, CanvasCommon, CanvasServices},
    config::SharedConfig,
    opengl::picker::PixelFormatPicker,
    platform::{HeadlessPlatform, PlatformCanvas},
    registry::CanvasRegistry,
    CanvasError,
};

/// Platform hooks an OpenGL canvas needs on top of [`PlatformCanvas`].
pub trait GlPlatform: PlatformCanvas {
    /// Tries to create a context with `format`. False when the display
    /// driver does not support it.
    fn accept_pixel_format(&mut self, format: &PixelFormat) -> bool;

    fn swap_buffers(&mut self) {}
}

impl GlPlatform for HeadlessPlatform {
    fn accept_pixel_format(&mut self, _format: &PixelFormat) -> bool {
        true
    }
}

/// A canvas backed by an OpenGL context. Opening negotiates a pixel format
/// with the platform before the window is created.
pub struct GlCanvas<P: GlPlatform> {
    common: CanvasCommon<P>,
    picker: PixelFormatPicker,
    current_format: PixelFormat,
    config: Option<SharedConfig>,
}

impl<P: GlPlatform> GlCanvas<P> {
    pub fn new(platform: P, registry: &CanvasRegistry) -> Self {
        Self {
            common: CanvasCommon::new(platform, registry),
            picker: PixelFormatPicker::default(),
            current_format: PixelFormat::default(),
            config: None,
        }
    }

    /// The format the platform accepted. All zero before opening.
    pub fn current_format(&self) -> PixelFormat {
        self.current_format
    }

    pub fn multi_samples(&self) -> i32 {
        self.current_format.multi_samples()
    }

    fn choose_pixel_format(&mut self) -> Result<PixelFormat, CanvasError> {
        profiling::scope!("GlCanvas::choose_pixel_format");
        let config = self.config.as_ref().ok_or(CanvasError::NotInitialized)?;
        self.picker.reset(&*config.read(), self.common.color_depth());

        let mut attempts = 0;
        while let Some(format) = self.picker.next_format() {
            attempts += 1;
            if self.common.platform_mut().accept_pixel_format(&format) {
                return Ok(format);
            }
            log::debug!("Pixel format rejected: {format}");
        }
        Err(CanvasError::NoSuitablePixelFormat { attempts })
    }
}

impl<P: GlPlatform> Canvas for GlCanvas<P> {
    type Platform = P;

    fn common(&self) -> &CanvasCommon<P> {
        &self.common
    }

    fn common_mut(&mut self) -> &mut CanvasCommon<P> {
        &mut self.common
    }

    fn initialize(&mut self, services: &CanvasServices) {
        self.common.initialize(services);
        self.config = Some(services.config.clone());
    }

    fn canvas_open(&mut self) -> Result<(), CanvasError> {
        if self.common.is_open() {
            return Ok(());
        }

        let format = self.choose_pixel_format()?;
        self.current_format = format;
        self.common.canvas_open()?;

        let size = self.common.framebuffer_size();
        let mode = match self.common.is_full_screen() {
            true => "full screen",
            false => "windowed",
        };
        log::info!("Using {mode} mode at resolution {}x{}.", size.x, size.y);
        log::info!("Pixel format: {format}");
        if format.color_bits() < 24 {
            log::warn!(
                "Color depth is {} bits, colors will look banded. Use at least 24 bits.",
                format.color_bits()
            );
        }
        Ok(())
    }

    fn print(&mut self, _area: Option<ClipRect>) {
        self.common.platform_mut().swap_buffers();
    }
}

#[cfg(test)]
mod tests {
    use canvas3_types::PixelFormatValue;

    use super::*;
    use crate::config::{ConfigFile, ConfigManager, PRIORITY_APPLICATION};

    struct Picky {
        max_depth: i32,
        tried: Vec<PixelFormat>,
    }

    impl PlatformCanvas for Picky {
        fn open_window(&mut self, _desc: &crate::platform::WindowDescriptor) -> bool {
            true
        }

        fn close_window(&mut self) {}
    }

    impl GlPlatform for Picky {
        fn accept_pixel_format(&mut self, format: &PixelFormat) -> bool {
            self.tried.push(*format);
            format[PixelFormatValue::DepthBits] <= self.max_depth
        }
    }

    fn services() -> CanvasServices {
        let mut config = ConfigManager::new();
        config.add_layer(
            "test",
            PRIORITY_APPLICATION,
            ConfigFile::from_pairs([
                ("Video.ScreenDepth", "32"),
                ("Video.OpenGL.FormatPicker.ReductionOrder", "dc"),
                ("Video.OpenGL.FormatPicker.DepthBits", "32,24,16"),
                ("Video.OpenGL.FormatPicker.ColorBits", "32"),
            ]),
        );
        CanvasServices::new(config.into_shared())
    }

    #[test]
    fn opens_with_first_accepted_format() {
        let mut canvas = GlCanvas::new(
            Picky {
                max_depth: 24,
                tried: Vec::new(),
            },
            &CanvasRegistry::new(),
        );
        canvas.initialize(&services());
        canvas.canvas_open().unwrap();
        assert!(canvas.is_open());
        assert_eq!(canvas.current_format()[PixelFormatValue::DepthBits], 24);
        assert_eq!(canvas.common().platform().tried.len(), 2);
        assert_eq!(canvas.multi_samples(), 0);
    }

    #[test]
    fn exhaustion_fails_open() {
        let mut canvas = GlCanvas::new(
            Picky {
                max_depth: 8,
                tried: Vec::new(),
            },
            &CanvasRegistry::new(),
        );
        canvas.initialize(&services());
        assert!(matches!(
            canvas.canvas_open(),
            Err(CanvasError::NoSuitablePixelFormat { attempts: 3 })
        ));
        assert!(!canvas.is_open());
    }

    #[test]
    fn open_needs_initialize() {
        let mut canvas = GlCanvas::new(HeadlessPlatform::new(), &CanvasRegistry::new());
        assert!(matches!(canvas.canvas_open(), Err(CanvasError::NotInitialized)));
    }
}
