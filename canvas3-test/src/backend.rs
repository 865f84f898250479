use std::sync::Arc;

use canvas3::{
    font::{Font, FontCache, WriteFlags},
    opengl::{BlendFactor, GlBackend, GlCapability},
    surface::MeshSurface,
    types::{
        glam::{IVec2, Vec3, Vec4},
        ClipRect, MeshType, MixMode, PackedColor, RawTextureHandle, Rgba, SimpleMesh, SimpleMeshFlags, Viewport,
    },
    util::typedefs::FastHashMap,
};
use image::RgbaImage;
use parking_lot::Mutex;

/// One mesh submission as the backend saw it.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCall {
    pub mesh_type: MeshType,
    pub vertices: Vec<Vec3>,
    pub indices: Vec<u32>,
    pub colors: Vec<Vec4>,
    pub texture: Option<RawTextureHandle>,
    pub mix_mode: MixMode,
    pub flags: SimpleMeshFlags,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextWrite {
    /// Framebuffer position.
    pub pos: IVec2,
    pub fg: PackedColor,
    pub bg: PackedColor,
    pub text: String,
    pub flags: WriteFlags,
    pub clip: ClipRect,
}

#[derive(Debug, Default)]
pub struct TextLog {
    pub writes: Vec<TextWrite>,
    pub flushes: usize,
}

/// Font cache that only records what it was asked to draw.
pub struct RecordingFontCache {
    log: Arc<Mutex<TextLog>>,
    clip: ClipRect,
    offset: IVec2,
}

impl FontCache for RecordingFontCache {
    fn write_string(
        &mut self,
        _font: &dyn Font,
        pos: IVec2,
        fg: PackedColor,
        bg: PackedColor,
        text: &str,
        flags: WriteFlags,
    ) {
        self.log.lock().writes.push(TextWrite {
            pos: pos + self.offset,
            fg,
            bg,
            text: text.to_owned(),
            flags,
            clip: self.clip,
        });
    }

    fn set_clip_rect(&mut self, clip: ClipRect) {
        self.clip = clip;
    }

    fn set_viewport_offset(&mut self, offset: IVec2) {
        self.offset = offset;
    }

    fn flush_text(&mut self) {
        self.log.lock().flushes += 1;
    }
}

/// A GL backend that keeps its framebuffer in memory and records every call.
///
/// Screen space lines, points and axis aligned quads are rasterized so reads
/// and screenshots see them; everything else is only recorded.
pub struct RecordingBackend {
    pub framebuffer: RgbaImage,
    pub draw_calls: Vec<DrawCall>,
    pub capability_changes: Vec<(GlCapability, bool)>,
    pub blend_funcs: Vec<(BlendFactor, BlendFactor)>,
    pub viewport: Viewport,
    pub scissor: ClipRect,
    pub textures: FastHashMap<usize, (u32, u32)>,
    pub deleted_textures: Vec<usize>,
    pub flushes: usize,
    pub finishes: usize,
    pub text: Arc<Mutex<TextLog>>,
    extensions: String,
    renderer: Option<String>,
    version: Option<String>,
    vendor: Option<String>,
    font_cache: bool,
}

impl RecordingBackend {
    pub fn new(size: IVec2) -> Self {
        Self {
            framebuffer: RgbaImage::new(size.x as u32, size.y as u32),
            draw_calls: Vec::new(),
            capability_changes: Vec::new(),
            blend_funcs: Vec::new(),
            viewport: Viewport::full(size),
            scissor: ClipRect::from_size(size),
            textures: FastHashMap::default(),
            deleted_textures: Vec::new(),
            flushes: 0,
            finishes: 0,
            text: Arc::new(Mutex::new(TextLog::default())),
            extensions: String::new(),
            renderer: None,
            version: None,
            vendor: None,
            font_cache: false,
        }
    }

    pub fn with_extensions(mut self, extensions: &str) -> Self {
        self.extensions = extensions.to_owned();
        self
    }

    pub fn with_hardware(mut self, vendor: &str, renderer: &str, version: &str) -> Self {
        self.vendor = Some(vendor.to_owned());
        self.renderer = Some(renderer.to_owned());
        self.version = Some(version.to_owned());
        self
    }

    pub fn with_font_cache(mut self) -> Self {
        self.font_cache = true;
        self
    }

    pub fn pixel(&self, x: i32, y: i32) -> Option<Rgba> {
        if x < 0 || y < 0 {
            return None;
        }
        self.framebuffer
            .get_pixel_checked(x as u32, y as u32)
            .map(|p| Rgba::new(p[0], p[1], p[2], p[3]))
    }

    fn put(&mut self, x: i32, y: i32, color: Rgba) {
        if x < 0 || y < 0 {
            return;
        }
        if let Some(pixel) = self.framebuffer.get_pixel_mut_checked(x as u32, y as u32) {
            *pixel = image::Rgba([color.r, color.g, color.b, color.a]);
        }
    }

    /// Writes a pixel given in viewport coordinates, honoring the scissor.
    fn plot(&mut self, x: i32, y: i32, color: Vec4) {
        if !self.scissor.contains(x, y) {
            return;
        }
        let c = (color.clamp(Vec4::ZERO, Vec4::ONE) * 255.0).round();
        let rgba = Rgba::new(c.x as u8, c.y as u8, c.z as u8, c.w as u8);
        self.put(self.viewport.left + x, self.viewport.top + y, rgba);
    }

    fn rasterize(&mut self, call: &DrawCall) {
        let color = |i: usize| call.colors.get(i).copied().unwrap_or(Vec4::ONE);
        let vertex = |i: u32| call.vertices[i as usize];
        match call.mesh_type {
            MeshType::Points => {
                for &i in &call.indices {
                    let v = vertex(i);
                    self.plot(v.x as i32, v.y as i32, color(i as usize));
                }
            }
            MeshType::Lines => {
                for pair in call.indices.chunks_exact(2) {
                    let (a, b) = (vertex(pair[0]), vertex(pair[1]));
                    let steps = (b - a).abs().max_element().ceil().max(1.0) as i32;
                    for step in 0..=steps {
                        let p = a.lerp(b, step as f32 / steps as f32);
                        self.plot(p.x.round() as i32, p.y.round() as i32, color(pair[0] as usize));
                    }
                }
            }
            MeshType::Quads => {
                for quad in call.indices.chunks_exact(4) {
                    let corners = quad.iter().map(|&i| vertex(i));
                    let min = corners.clone().fold(Vec3::splat(f32::MAX), Vec3::min);
                    let max = corners.fold(Vec3::splat(f32::MIN), Vec3::max);
                    for y in min.y as i32..max.y as i32 {
                        for x in min.x as i32..max.x as i32 {
                            self.plot(x, y, color(quad[0] as usize));
                        }
                    }
                }
            }
            _ => {}
        }
    }
}

impl MeshSurface for RecordingBackend {
    fn draw_simple_mesh(&mut self, mesh: &SimpleMesh<'_>, flags: SimpleMeshFlags) {
        let call = DrawCall {
            mesh_type: mesh.state.mesh_type,
            vertices: mesh.vertices.to_vec(),
            indices: mesh.indices.to_vec(),
            colors: mesh.colors.map(<[Vec4]>::to_vec).unwrap_or_default(),
            texture: mesh.state.texture.as_ref().map(|t| t.get_raw()),
            mix_mode: mesh.state.mix_mode,
            flags,
        };
        if flags.contains(SimpleMeshFlags::SCREENSPACE) {
            self.rasterize(&call);
        }
        self.draw_calls.push(call);
    }
}

impl GlBackend for RecordingBackend {
    fn renderer(&self) -> Option<&str> {
        self.renderer.as_deref()
    }

    fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    fn vendor(&self) -> Option<&str> {
        self.vendor.as_deref()
    }

    fn extensions(&self) -> &str {
        &self.extensions
    }

    fn set_capability(&mut self, capability: GlCapability, enabled: bool) {
        self.capability_changes.push((capability, enabled));
    }

    fn set_blend_func(&mut self, src: BlendFactor, dst: BlendFactor) {
        self.blend_funcs.push((src, dst));
    }

    fn set_viewport(&mut self, viewport: Viewport, framebuffer: IVec2) {
        let (width, height) = (framebuffer.x as u32, framebuffer.y as u32);
        if self.framebuffer.dimensions() != (width, height) {
            self.framebuffer = RgbaImage::new(width, height);
        }
        self.viewport = viewport;
    }

    fn set_scissor(&mut self, rect: ClipRect) {
        self.scissor = rect;
    }

    fn clear(&mut self, color: Rgba) {
        for pixel in self.framebuffer.pixels_mut() {
            *pixel = image::Rgba([color.r, color.g, color.b, color.a]);
        }
    }

    fn draw_pixels(&mut self, pos: IVec2, size: IVec2, data: &[Rgba]) {
        for (i, &color) in data.iter().enumerate().take((size.x * size.y).max(0) as usize) {
            let i = i as i32;
            self.put(pos.x + i % size.x, pos.y + i / size.x, color);
        }
    }

    fn read_pixels(&mut self, pos: IVec2, size: IVec2) -> Option<Vec<Rgba>> {
        let height = self.framebuffer.height() as i32;
        let mut out = Vec::with_capacity((size.x * size.y).max(0) as usize);
        for gl_y in pos.y..pos.y + size.y {
            for x in pos.x..pos.x + size.x {
                out.push(self.pixel(x, height - 1 - gl_y)?);
            }
        }
        Some(out)
    }

    fn upload_texture(&mut self, texture: RawTextureHandle, image: &RgbaImage) {
        self.textures.insert(texture.idx, image.dimensions());
    }

    fn delete_texture(&mut self, texture: RawTextureHandle) {
        self.textures.remove(&texture.idx);
        self.deleted_textures.push(texture.idx);
    }

    fn flush(&mut self) {
        self.flushes += 1;
    }

    fn finish(&mut self) {
        self.finishes += 1;
    }

    fn create_font_cache(&mut self) -> Option<Box<dyn FontCache>> {
        self.font_cache.then(|| {
            Box::new(RecordingFontCache {
                log: Arc::clone(&self.text),
                clip: self.scissor,
                offset: IVec2::ZERO,
            }) as Box<dyn FontCache>
        })
    }
}
