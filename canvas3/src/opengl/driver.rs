use canvas3_types::{
    glam::{IVec2, Mat4, Vec2, Vec3},
    ClipRect, MeshType, MixMode, PackedColor, RenderState, Rgba, SimpleMesh, SimpleMeshFlags, TextureHandle, TextureTag,
    Variant, Viewport, ZBufMode,
};
use image::RgbaImage;

use crate::{
    canvas::{Canvas, CanvasServices},
    clip,
    config::{ConfigSource, SharedConfig},
    events::Event,
    font::{Font, WriteFlags},
    graph2d::{Graphics2D, Graphics2DCommon},
    opengl::{
        backend::{GlBackend, GlCapability},
        canvas::{GlCanvas, GlPlatform},
        driver_db::{DriverDatabase, HardwareInfo},
        extensions::{ExtensionManager, ARB_MULTISAMPLE, NV_MULTISAMPLE_FILTER_HINT},
        state_cache::GlStateCache,
    },
    surface::MeshSurface,
    util::handle_alloc::HandleAllocator,
    CanvasError,
};

/// Camera space depth below which projected lines are cut.
pub const NEAR_PLANE: f32 = 0.01;

/// 2D driver drawing through an OpenGL context.
///
/// Screen space meshes handed to the backend are in viewport pixels with a
/// top-left origin.
pub struct GlGraphics2D<P: GlPlatform, B: GlBackend> {
    common: Graphics2DCommon<GlCanvas<P>>,
    backend: B,
    state_cache: GlStateCache,
    extensions: ExtensionManager,
    driver_db: DriverDatabase,
    textures: HandleAllocator<TextureTag>,
    config: Option<SharedConfig>,
    multisample_favor_quality: bool,
    render_target: bool,
}

impl<P: GlPlatform, B: GlBackend> GlGraphics2D<P, B> {
    pub fn new(canvas: GlCanvas<P>, backend: B) -> Self {
        Self {
            common: Graphics2DCommon::new(canvas),
            backend,
            state_cache: GlStateCache::new(),
            extensions: ExtensionManager::new(),
            driver_db: DriverDatabase::new(),
            textures: HandleAllocator::default(),
            config: None,
            multisample_favor_quality: false,
            render_target: false,
        }
    }

    pub fn with_driver_database(mut self, driver_db: DriverDatabase) -> Self {
        self.driver_db = driver_db;
        self
    }

    pub fn initialize(&mut self, services: &CanvasServices) {
        self.common.initialize(services);
        self.multisample_favor_quality = services
            .config
            .read()
            .get_bool("Video.OpenGL.MultisampleFavorQuality", false);
        self.config = Some(services.config.clone());
    }

    /// Uploads `image` and returns its handle. The GL texture is deleted
    /// during the first [`Graphics2D::begin_draw`] after the handle drops.
    pub fn create_texture(&mut self, image: &RgbaImage) -> TextureHandle {
        let handle = self.textures.allocate();
        self.backend.upload_texture(handle.get_raw(), image);
        handle
    }

    fn reclaim_textures(&mut self) {
        for texture in self.textures.reclaim_delayed_handles() {
            log::trace!("Deleting texture {}", texture.idx);
            self.backend.delete_texture(texture);
        }
    }

    fn sync_viewport(&mut self) {
        let framebuffer = self.common.canvas().framebuffer_size();
        self.backend.set_viewport(self.common.viewport(), framebuffer);
        self.backend.set_scissor(self.common.clip_rect());
    }

    fn draw_flat(&mut self, mesh_type: MeshType, vertices: &[Vec3], color: PackedColor) {
        let rgba = Rgba::unpack(color);
        let colors = vec![rgba.to_vec4(); vertices.len()];
        let indices: Vec<u32> = (0..vertices.len() as u32).collect();
        let state = RenderState {
            mesh_type,
            mix_mode: match rgba.a {
                255 => MixMode::Copy,
                _ => MixMode::Alpha,
            },
            ..RenderState::default()
        };
        let mesh = SimpleMesh::new(state, vertices, &indices).with_colors(&colors);
        self.draw_simple_mesh(&mesh, SimpleMeshFlags::SCREENSPACE);
    }

    fn project(&self, point: Vec3, projection: Mat4) -> Vec2 {
        let clip = projection * point.extend(1.0);
        let ndc = clip.truncate().truncate() / clip.w;
        let viewport = self.common.viewport();
        Vec2::new(
            (ndc.x + 1.0) * 0.5 * viewport.width as f32,
            (1.0 - ndc.y) * 0.5 * viewport.height as f32,
        )
    }

    /// Draws a camera space line, cut at [`NEAR_PLANE`] and projected into
    /// the viewport with `projection`.
    pub fn draw_line_projected(&mut self, v1: Vec3, v2: Vec3, projection: Mat4, color: PackedColor) {
        let (mut a, mut b) = (v1, v2);
        if a.z < NEAR_PLANE && b.z < NEAR_PLANE {
            return;
        }
        if a.z < NEAR_PLANE {
            a = a.lerp(b, (NEAR_PLANE - a.z) / (b.z - a.z));
        } else if b.z < NEAR_PLANE {
            b = b.lerp(a, (NEAR_PLANE - b.z) / (a.z - b.z));
        }
        let from = self.project(a, projection);
        let to = self.project(b, projection);
        self.draw_line(from, to, color);
    }

    /// Outlines the axis aligned box `min`..`max` in camera space.
    pub fn draw_box_projected(&mut self, min: Vec3, max: Vec3, projection: Mat4, color: PackedColor) {
        let corner = |i: usize| {
            Vec3::new(
                if i & 1 == 0 { min.x } else { max.x },
                if i & 2 == 0 { min.y } else { max.y },
                if i & 4 == 0 { min.z } else { max.z },
            )
        };
        for i in 0..8 {
            for axis in [1, 2, 4] {
                if i & axis == 0 {
                    self.draw_line_projected(corner(i), corner(i | axis), projection, color);
                }
            }
        }
    }

    pub fn uses_render_target(&self) -> bool {
        self.render_target
    }

    pub fn state_cache(&self) -> &GlStateCache {
        &self.state_cache
    }

    pub fn extensions(&self) -> &ExtensionManager {
        &self.extensions
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn common(&self) -> &Graphics2DCommon<GlCanvas<P>> {
        &self.common
    }

    pub fn common_mut(&mut self) -> &mut Graphics2DCommon<GlCanvas<P>> {
        &mut self.common
    }
}

impl<P: GlPlatform, B: GlBackend> Graphics2D for GlGraphics2D<P, B> {
    fn open(&mut self) -> Result<(), CanvasError> {
        if self.common.is_open() {
            return Ok(());
        }
        profiling::scope!("GlGraphics2D::open");
        self.common.open()?;

        self.extensions.initialize(self.backend.extensions());
        log::info!("OpenGL renderer: {}", self.backend.renderer().unwrap_or("unknown"));
        log::info!("OpenGL version: {}", self.backend.version().unwrap_or("unknown"));
        log::info!("OpenGL vendor: {}", self.backend.vendor().unwrap_or("unknown"));

        if let Some(ref config) = self.config {
            let hw = HardwareInfo {
                vendor: self.backend.vendor(),
                renderer: self.backend.renderer(),
                version: self.backend.version(),
            };
            let overridden = self.driver_db.apply(config, &hw, &self.extensions);
            if overridden > 0 {
                log::debug!("Driver database overrides {overridden} settings");
            }
        }

        self.state_cache.invalidate();
        let samples = self.common.canvas().multi_samples();
        if samples > 0 && self.extensions.has(ARB_MULTISAMPLE) {
            self.state_cache.enable(&mut self.backend, GlCapability::Multisample);
            log::info!("Multisampling with {samples} samples");
            if self.extensions.has(NV_MULTISAMPLE_FILTER_HINT) {
                let hint = match self.multisample_favor_quality {
                    true => "nicest",
                    false => "fastest",
                };
                log::debug!("Multisample filter hint: {hint}");
            }
        }

        let font_cache = self.backend.create_font_cache();
        self.common.set_font_cache(font_cache);
        self.sync_viewport();
        Ok(())
    }

    fn close(&mut self) {
        if !self.common.is_open() {
            return;
        }
        self.reclaim_textures();
        self.common.close();
        self.state_cache.invalidate();
        self.extensions.reset();
    }

    fn is_open(&self) -> bool {
        self.common.is_open()
    }

    fn resize(&mut self, width: i32, height: i32) -> bool {
        if !self.common.resize(width, height) {
            return false;
        }
        if self.common.is_open() {
            self.sync_viewport();
        }
        true
    }

    fn handle_resize(&mut self) {
        self.common.handle_resize();
        if self.common.is_open() {
            self.sync_viewport();
        }
    }

    fn pending_events(&mut self) -> Vec<Event> {
        self.common.take_events()
    }

    fn framebuffer_size(&self) -> IVec2 {
        self.common.canvas().framebuffer_size()
    }

    fn viewport(&self) -> Viewport {
        self.common.viewport()
    }

    fn set_viewport(&mut self, viewport: Viewport) {
        self.common.set_viewport(viewport);
        if self.common.is_open() {
            self.sync_viewport();
        }
    }

    fn clip_rect(&self) -> ClipRect {
        self.common.clip_rect()
    }

    fn set_clip_rect(&mut self, rect: ClipRect) {
        self.common.set_clip_rect(rect);
        if self.common.is_open() {
            self.backend.set_scissor(self.common.clip_rect());
        }
    }

    fn begin_draw(&mut self) -> bool {
        if !self.common.begin_draw() {
            return false;
        }
        if self.common.frame_lock() == 1 && self.common.is_open() {
            self.reclaim_textures();
            self.state_cache.disable(&mut self.backend, GlCapability::DepthTest);
            self.state_cache.enable(&mut self.backend, GlCapability::ScissorTest);
            self.sync_viewport();
        }
        true
    }

    fn finish_draw(&mut self) {
        self.common.finish_draw();
        if self.common.frame_lock() == 0 && self.common.is_open() {
            if let Some(font_cache) = self.common.font_cache_mut() {
                font_cache.flush_text();
            }
            self.backend.flush();
        }
    }

    fn print(&mut self, area: Option<ClipRect>) {
        if self.render_target {
            self.backend.flush();
            return;
        }
        self.common.canvas_mut().print(area);
    }

    fn draw_line(&mut self, from: Vec2, to: Vec2, color: PackedColor) {
        let Some((from, to)) = clip::clipped_line(from, to, self.common.clip_rect()) else {
            return;
        };
        self.draw_flat(MeshType::Lines, &[from.extend(0.0), to.extend(0.0)], color);
    }

    fn draw_box(&mut self, x: i32, y: i32, width: i32, height: i32, color: PackedColor) {
        let Some((x0, y0, x1, y1)) = clip_span(self.common.clip_rect(), x, y, width, height) else {
            return;
        };
        let (x0, y0, x1, y1) = (x0 as f32, y0 as f32, x1 as f32, y1 as f32);
        self.draw_flat(
            MeshType::Quads,
            &[
                Vec3::new(x0, y0, 0.0),
                Vec3::new(x1, y0, 0.0),
                Vec3::new(x1, y1, 0.0),
                Vec3::new(x0, y1, 0.0),
            ],
            color,
        );
    }

    fn draw_pixels(&mut self, pixels: &[IVec2], color: PackedColor) {
        let clip = self.common.clip_rect();
        let vertices: Vec<Vec3> = pixels
            .iter()
            .filter(|p| clip.contains(p.x, p.y))
            .map(|p| Vec3::new(p.x as f32, p.y as f32, 0.0))
            .collect();
        if vertices.is_empty() {
            return;
        }
        self.draw_flat(MeshType::Points, &vertices, color);
    }

    fn blit(&mut self, x: i32, y: i32, width: i32, height: i32, data: &[Rgba]) {
        let expected = (width.max(0) as u64) * (height.max(0) as u64);
        if width <= 0 || height <= 0 || (data.len() as u64) < expected {
            log::debug!("Ignoring blit of {width}x{height} with {} pixels", data.len());
            return;
        }
        let Some((x0, y0, x1, y1)) = clip_span(self.common.clip_rect(), x, y, width, height) else {
            return;
        };

        // Offsets into `data` are non-negative and below width * height here.
        let stride = width as usize;
        let row_len = (x1 - x0) as usize;
        let skip = (i64::from(x0) - i64::from(x)) as usize;
        let mut rows = Vec::with_capacity(row_len * (y1 - y0) as usize);
        for row in y0..y1 {
            let start = (i64::from(row) - i64::from(y)) as usize * stride + skip;
            rows.extend_from_slice(&data[start..start + row_len]);
        }

        self.state_cache.apply_mix_mode(&mut self.backend, MixMode::Copy);
        let offset = self.common.viewport().offset();
        self.backend
            .draw_pixels(offset + IVec2::new(x0, y0), IVec2::new(x1 - x0, y1 - y0), &rows);
    }

    fn get_pixel(&mut self, x: i32, y: i32) -> Option<Rgba> {
        if !self.common.is_open() {
            return None;
        }
        let viewport = self.common.viewport();
        if x < 0 || y < 0 || x >= viewport.width || y >= viewport.height {
            return None;
        }
        let framebuffer = self.framebuffer_size();
        let gl_y = framebuffer.y - 1 - (viewport.top + y);
        self.backend
            .read_pixels(IVec2::new(viewport.left + x, gl_y), IVec2::ONE)?
            .first()
            .copied()
    }

    fn write(
        &mut self,
        font: &dyn Font,
        x: i32,
        y: i32,
        fg: PackedColor,
        bg: PackedColor,
        text: &str,
        flags: WriteFlags,
    ) {
        self.common.write(font, x, y, fg, bg, text, flags);
    }

    fn screenshot(&mut self) -> Option<RgbaImage> {
        profiling::scope!("GlGraphics2D::screenshot");
        if !self.common.is_open() {
            return None;
        }
        let viewport = self.common.viewport();
        if viewport.width <= 0 || viewport.height <= 0 {
            return None;
        }
        let framebuffer = self.framebuffer_size();
        let bottom = framebuffer.y - (viewport.top + viewport.height);
        let pixels = self
            .backend
            .read_pixels(IVec2::new(viewport.left, bottom), viewport.size())?;

        let raw: Vec<u8> = bytemuck::cast_slice(&pixels).to_vec();
        let mut image = RgbaImage::from_raw(viewport.width as u32, viewport.height as u32, raw)?;
        image::imageops::flip_vertical_in_place(&mut image);
        Some(image)
    }

    fn perform_extension(&mut self, command: &str, args: &[Variant]) -> bool {
        match command.to_ascii_lowercase().as_str() {
            "flush" => {
                self.backend.flush();
                true
            }
            "finish" => {
                self.backend.finish();
                true
            }
            "glflushtext" => {
                if let Some(font_cache) = self.common.font_cache_mut() {
                    font_cache.flush_text();
                }
                true
            }
            "userendertarget" => match args.first().and_then(Variant::as_bool) {
                Some(enabled) => {
                    self.render_target = enabled;
                    true
                }
                None => false,
            },
            _ => false,
        }
    }

    fn hw_renderer(&self) -> Option<&str> {
        self.backend.renderer()
    }

    fn hw_gl_version(&self) -> Option<&str> {
        self.backend.version()
    }

    fn hw_vendor(&self) -> Option<&str> {
        self.backend.vendor()
    }
}

/// Intersects the rectangle at `(x, y)` of the given size with `clip`.
/// Returns `(x0, y0, x1, y1)` with exclusive upper bounds, or `None` when
/// nothing is left. Far edges are summed in `i64`.
fn clip_span(clip: ClipRect, x: i32, y: i32, width: i32, height: i32) -> Option<(i32, i32, i32, i32)> {
    let x0 = x.max(clip.xmin);
    let y0 = y.max(clip.ymin);
    let x1 = (i64::from(x) + i64::from(width)).min(i64::from(clip.xmax));
    let y1 = (i64::from(y) + i64::from(height)).min(i64::from(clip.ymax));
    if x1 <= i64::from(x0) || y1 <= i64::from(y0) {
        return None;
    }
    // Both now lie within the clip rectangle.
    Some((x0, y0, x1 as i32, y1 as i32))
}

impl<P: GlPlatform, B: GlBackend> MeshSurface for GlGraphics2D<P, B> {
    fn draw_simple_mesh(&mut self, mesh: &SimpleMesh<'_>, flags: SimpleMeshFlags) {
        self.state_cache.apply_mix_mode(&mut self.backend, mesh.state.mix_mode);
        self.state_cache
            .set_capability(&mut self.backend, GlCapability::Texture2D, mesh.state.texture.is_some());
        let depth_test = mesh.state.z_buf_mode != ZBufMode::None && !flags.contains(SimpleMeshFlags::SCREENSPACE);
        self.state_cache
            .set_capability(&mut self.backend, GlCapability::DepthTest, depth_test);
        self.backend.draw_simple_mesh(mesh, flags);
    }
}
