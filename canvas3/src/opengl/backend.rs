use canvas3_types::{glam::IVec2, ClipRect, RawTextureHandle, Rgba, Viewport};
use image::RgbaImage;

use crate::{font::FontCache, surface::MeshSurface};

/// Fixed-function switches tracked by the state cache.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum GlCapability {
    Blend,
    DepthTest,
    ScissorTest,
    Texture2D,
    CullFace,
    AlphaTest,
    Multisample,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum BlendFactor {
    Zero,
    One,
    SrcColor,
    SrcAlpha,
    OneMinusSrcAlpha,
    DstColor,
}

/// The OpenGL context underneath the driver.
///
/// Pixel positions are framebuffer pixels with a top-left origin, except for
/// [`GlBackend::read_pixels`] which follows GL and counts from the bottom.
pub trait GlBackend: MeshSurface {
    fn renderer(&self) -> Option<&str>;
    fn version(&self) -> Option<&str>;
    fn vendor(&self) -> Option<&str>;

    /// Space separated extension names, as `GL_EXTENSIONS` reports them.
    fn extensions(&self) -> &str;

    fn set_capability(&mut self, capability: GlCapability, enabled: bool);
    fn set_blend_func(&mut self, src: BlendFactor, dst: BlendFactor);

    fn set_viewport(&mut self, viewport: Viewport, framebuffer: IVec2);
    /// Scissor rectangle relative to the viewport.
    fn set_scissor(&mut self, rect: ClipRect);

    fn clear(&mut self, color: Rgba);

    /// Writes `size.x * size.y` pixels, rows top to bottom.
    fn draw_pixels(&mut self, pos: IVec2, size: IVec2, data: &[Rgba]);

    /// Reads pixels whose bottom-left corner is `pos`, rows bottom to top.
    fn read_pixels(&mut self, pos: IVec2, size: IVec2) -> Option<Vec<Rgba>>;

    fn upload_texture(&mut self, texture: RawTextureHandle, image: &RgbaImage);
    fn delete_texture(&mut self, texture: RawTextureHandle);

    fn flush(&mut self);
    fn finish(&mut self);

    /// Glyph cache drawing through this context, if the backend has one.
    fn create_font_cache(&mut self) -> Option<Box<dyn FontCache>> {
        None
    }
}
