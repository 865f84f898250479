use std::f32::consts::{FRAC_PI_2, PI, TAU};

use canvas3_types::{
    find_rgb,
    glam::{Affine3A, IVec2, Vec2, Vec3, Vec4},
    MeshType, MixMode, RenderState, SimpleMesh, SimpleMeshFlags, TextureHandle, TRANSPARENT_BACKGROUND,
};

use crate::{
    font::Font,
    pen::{PenFlags, PenTarget, SharedPenCache, TextAlign},
};

/// Angle step of curved outlines, about two degrees.
pub const ARC_STEP: f32 = 0.0384;

/// Draws 2D primitives in screen space.
///
/// Every primitive builds one mesh and either submits it to the target or
/// pushes it into the attached cache.
pub struct Pen<'a> {
    target: &'a mut dyn PenTarget,
    cache: Option<SharedPenCache>,
    state: RenderState,
    /// Offset applied to text, which does not go through the mesh transform.
    translation: Vec3,
    stack: Vec<(Affine3A, Vec3)>,

    color: Vec4,
    alt_color: Vec4,
    texture: Option<TextureHandle>,
    pen_width: f32,
    flags: PenFlags,

    vertices: Vec<Vec3>,
    indices: Vec<u32>,
    colors: Vec<Vec4>,
    texcoords: Vec<Vec2>,
    line_points: Vec<Vec2>,
    /// Trailing corners of the previous thick segment.
    last: [Vec2; 2],
    auto_texture: Option<Vec2>,
}

impl<'a> Pen<'a> {
    pub fn new(target: &'a mut dyn PenTarget) -> Self {
        Self {
            target,
            cache: None,
            state: RenderState {
                mix_mode: MixMode::Alpha,
                ..RenderState::default()
            },
            translation: Vec3::ZERO,
            stack: Vec::new(),
            color: Vec4::ONE,
            alt_color: Vec4::new(0.0, 0.0, 0.0, 1.0),
            texture: None,
            pen_width: 1.0,
            flags: PenFlags::empty(),
            vertices: Vec::new(),
            indices: Vec::new(),
            colors: Vec::new(),
            texcoords: Vec::new(),
            line_points: Vec::new(),
            last: [Vec2::ZERO; 2],
            auto_texture: None,
        }
    }

    /// Sends meshes into `cache` instead of drawing them.
    pub fn set_cache(&mut self, cache: Option<SharedPenCache>) {
        self.cache = cache;
    }

    pub fn cache(&self) -> Option<&SharedPenCache> {
        self.cache.as_ref()
    }

    pub fn set_mix_mode(&mut self, mix_mode: MixMode) {
        self.state.mix_mode = mix_mode;
    }

    pub fn set_flag(&mut self, flag: PenFlags) {
        self.flags.insert(flag);
    }

    pub fn clear_flag(&mut self, flag: PenFlags) {
        self.flags.remove(flag);
    }

    pub fn flags(&self) -> PenFlags {
        self.flags
    }

    pub fn set_color(&mut self, color: Vec4) {
        self.color = color;
    }

    pub fn color(&self) -> Vec4 {
        self.color
    }

    pub fn set_alt_color(&mut self, color: Vec4) {
        self.alt_color = color;
    }

    pub fn swap_colors(&mut self) {
        std::mem::swap(&mut self.color, &mut self.alt_color);
    }

    pub fn set_texture(&mut self, texture: Option<TextureHandle>) {
        self.texture = texture;
    }

    pub fn set_pen_width(&mut self, width: f32) {
        self.pen_width = width;
    }

    pub fn transform(&self) -> Affine3A {
        self.state.object_to_world
    }

    pub fn clear_transform(&mut self) {
        self.state.object_to_world = Affine3A::IDENTITY;
        self.translation = Vec3::ZERO;
    }

    pub fn push_transform(&mut self) {
        self.stack.push((self.state.object_to_world, self.translation));
    }

    /// Restores the last pushed transform. Without one the transform is
    /// cleared.
    pub fn pop_transform(&mut self) {
        self.clear_transform();
        if let Some((transform, translation)) = self.stack.pop() {
            self.state.object_to_world = transform;
            self.translation = translation;
        }
    }

    pub fn set_origin(&mut self, origin: Vec3) {
        self.state.object_to_world.translation = origin.into();
    }

    pub fn set_transform(&mut self, transform: Affine3A) {
        self.state.object_to_world = transform;
    }

    pub fn translate(&mut self, offset: Vec3) {
        self.state.object_to_world = self.state.object_to_world * Affine3A::from_translation(offset);
        self.translation += offset;
    }

    /// Rotates around the z axis by `angle` radians.
    pub fn rotate(&mut self, angle: f32) {
        self.state.object_to_world = self.state.object_to_world * Affine3A::from_rotation_z(angle);
    }

    fn start(&mut self) {
        self.vertices.clear();
        self.indices.clear();
        self.colors.clear();
        self.texcoords.clear();
        self.line_points.clear();
        self.auto_texture = None;
    }

    fn set_auto_texture(&mut self, width: f32, height: f32) {
        self.auto_texture = Some(Vec2::new(width, height));
    }

    fn swap_if_flagged(&mut self) {
        if self.flags.contains(PenFlags::SWAP_COLORS) {
            self.swap_colors();
        }
    }

    fn add_vertex(&mut self, x: f32, y: f32) {
        self.push_vertex(Vec2::new(x, y), false);
    }

    /// Adds a corner of the shape. Outlines wider than one pixel turn each
    /// new point into a quad reaching back to the previous one.
    fn push_vertex(&mut self, point: Vec2, force: bool) {
        if force || self.flags.contains(PenFlags::FILL) || self.pen_width <= 1.0 {
            self.indices.push(self.vertices.len() as u32);
            self.vertices.push(point.extend(0.0));
            self.colors.push(self.color);

            if let Some(size) = self.auto_texture {
                if self.flags.contains(PenFlags::TEXTURE_ONLY) {
                    let uv = Vec2::select(size.cmpeq(Vec2::ZERO), Vec2::ZERO, point / size);
                    self.texcoords.push(uv);
                }
            }
        } else {
            if let Some(&previous) = self.line_points.last() {
                self.add_thick_points(previous, point);
            }
            self.line_points.push(point);
        }
    }

    fn add_thick_points(&mut self, from: Vec2, to: Vec2) {
        let angle = (to.y - from.y).atan2(to.x - from.x) - FRAC_PI_2;
        let offset = Vec2::new(angle.cos(), angle.sin()) * self.pen_width;
        let lead = match self.line_points.len() < 2 {
            true => [from + offset, from - offset],
            false => self.last,
        };

        self.push_vertex(lead[0], true);
        self.push_vertex(to + offset, true);
        self.push_vertex(to - offset, true);
        self.push_vertex(lead[1], true);

        self.last = [to + offset, to - offset];
    }

    /// `filled` when filling, otherwise an outline made of quads or a line
    /// strip depending on the pen width.
    fn mesh_type(&self, filled: MeshType) -> MeshType {
        if self.flags.contains(PenFlags::FILL) {
            filled
        } else if self.pen_width > 1.0 {
            MeshType::Quads
        } else {
            MeshType::LineStrip
        }
    }

    fn draw_mesh(&mut self, mesh_type: MeshType) {
        self.state.mesh_type = mesh_type;
        self.state.texture = match self.flags.contains(PenFlags::TEXTURE_ONLY) {
            true => self.texture.clone(),
            false => None,
        };

        let mut mesh = SimpleMesh::new(self.state.clone(), &self.vertices, &self.indices).with_colors(&self.colors);
        if !self.texcoords.is_empty() {
            mesh = mesh.with_texcoords(&self.texcoords);
        }
        match self.cache {
            Some(ref cache) => cache.lock().push_mesh(&mesh, SimpleMeshFlags::SCREENSPACE),
            None => self.target.submit_mesh(&mesh, SimpleMeshFlags::SCREENSPACE),
        }
    }

    /// Clips a line against the target area, right and bottom edges
    /// exclusive. False when nothing is left to draw.
    pub fn clip_line(&self, p1: &mut IVec2, p2: &mut IVec2) -> bool {
        if p1 == p2 {
            return false;
        }
        if p1.x < 0 && p2.x < 0 || p1.y < 0 && p2.y < 0 {
            return false;
        }
        let size = self.target.canvas_size();
        if p1.x >= size.x && p2.x >= size.x || p1.y >= size.y && p2.y >= size.y {
            return false;
        }

        fn lerp(a: i32, b: i32, t: f32) -> i32 {
            (a as f32 + t * (b - a) as f32) as i32
        }

        if p1.x < 0 || p2.x < 0 {
            let t = -(p1.x as f32) / (p2.x - p1.x) as f32;
            let clipped = IVec2::new(0, lerp(p1.y, p2.y, t));
            if p1.x < 0 {
                *p1 = clipped;
            } else {
                *p2 = clipped;
            }
        }
        if p1.x >= size.x || p2.x >= size.x {
            let t = (size.x - 1 - p1.x) as f32 / (p2.x - p1.x) as f32;
            let clipped = IVec2::new(size.x - 1, lerp(p1.y, p2.y, t));
            if p1.x >= size.x {
                *p1 = clipped;
            } else {
                *p2 = clipped;
            }
        }
        if p1.y < 0 || p2.y < 0 {
            let t = p1.y as f32 / (p1.y - p2.y) as f32;
            let clipped = IVec2::new(lerp(p1.x, p2.x, t), 0);
            if p1.y < 0 {
                *p1 = clipped;
            } else {
                *p2 = clipped;
            }
        }
        if p1.y >= size.y || p2.y >= size.y {
            let t = (p1.y - size.y + 1) as f32 / (p1.y - p2.y) as f32;
            let clipped = IVec2::new(lerp(p1.x, p2.x, t), size.y - 1);
            if p1.y >= size.y {
                *p1 = clipped;
            } else {
                *p2 = clipped;
            }
        }
        true
    }

    /// With [`PenFlags::SWAP_COLORS`] the line fades from the color to the
    /// alternate color, and the two stay swapped afterwards, so consecutive
    /// lines alternate direction.
    pub fn draw_line(&mut self, x1: i32, y1: i32, x2: i32, y2: i32) {
        let (mut p1, mut p2) = (IVec2::new(x1, y1), IVec2::new(x2, y2));
        if !self.clip_line(&mut p1, &mut p2) {
            return;
        }
        if self.pen_width > 1.0 {
            self.draw_thick_line(p1.x, p1.y, p2.x, p2.y);
            return;
        }

        self.start();
        self.add_vertex(p1.x as f32, p1.y as f32);
        self.swap_if_flagged();
        self.add_vertex(p2.x as f32, p2.y as f32);
        self.draw_mesh(MeshType::Lines);
    }

    pub fn draw_lines(&mut self, pairs: &[(Vec2, Vec2)]) {
        if self.pen_width > 1.0 {
            self.draw_thick_lines(pairs);
            return;
        }

        self.start();
        for &(from, to) in pairs {
            self.add_vertex(from.x, from.y);
            self.swap_if_flagged();
            self.add_vertex(to.x, to.y);
            self.swap_if_flagged();
        }
        self.draw_mesh(MeshType::Lines);
    }

    pub fn draw_thick_line(&mut self, x1: i32, y1: i32, x2: i32, y2: i32) {
        self.start();
        self.add_thick_points(
            Vec2::new(x1 as f32, y1 as f32),
            Vec2::new(x2 as f32, y2 as f32),
        );
        self.draw_mesh(MeshType::Quads);
    }

    /// One quad per pair.
    pub fn draw_thick_lines(&mut self, pairs: &[(Vec2, Vec2)]) {
        self.start();
        for &(from, to) in pairs {
            self.add_thick_points(from, to);
        }
        self.draw_mesh(MeshType::Quads);
    }

    pub fn draw_point(&mut self, x: i32, y: i32) {
        self.start();
        self.add_vertex(x as f32, y as f32);
        self.draw_mesh(MeshType::Points);
    }

    pub fn draw_rect(&mut self, x1: i32, y1: i32, x2: i32, y2: i32) {
        let (x1, y1, x2, y2) = (x1 as f32, y1 as f32, x2 as f32, y2 as f32);
        self.start();
        self.set_auto_texture(x2 - x1, y2 - y1);

        self.add_vertex(x1, y1);
        self.add_vertex(x2, y1);
        self.swap_if_flagged();
        self.add_vertex(x2, y2);
        self.add_vertex(x1, y2);
        self.swap_if_flagged();
        if !self.flags.contains(PenFlags::FILL) {
            self.add_vertex(x1, y1);
        }

        let mesh_type = self.mesh_type(MeshType::Quads);
        self.draw_mesh(mesh_type);
    }

    /// A rectangle with its corners cut off `miter` pixels from each edge.
    pub fn draw_mitered_rect(&mut self, x1: i32, y1: i32, x2: i32, y2: i32, miter: u32) {
        if miter == 0 {
            self.draw_rect(x1, y1, x2, y2);
            return;
        }

        let center = Vec2::new((x1 + ((x2 - x1) >> 1)) as f32, (y1 + ((y2 - y1) >> 1)) as f32);
        let miter = miter as f32;
        let (x1, y1, x2, y2) = (x1 as f32, y1 as f32, x2 as f32, y2 as f32);
        let (ym1, ym2) = (y1 + miter, y2 - miter);
        let (xm1, xm2) = (x1 + miter, x2 - miter);

        self.start();
        self.set_auto_texture(x2 - x1, y2 - y1);

        self.swap_if_flagged();
        if self.flags.contains(PenFlags::FILL) {
            self.add_vertex(center.x, center.y);
        }
        self.add_vertex(x1, ym2);
        self.swap_if_flagged();
        self.add_vertex(x1, ym1);
        self.add_vertex(xm1, y1);
        self.add_vertex(xm2, y1);
        self.add_vertex(x2, ym1);
        self.swap_if_flagged();
        self.add_vertex(x2, ym2);
        self.add_vertex(xm2, y2);
        self.add_vertex(xm1, y2);
        self.add_vertex(x1, ym2);
        self.swap_if_flagged();

        let mesh_type = self.mesh_type(MeshType::TriangleFan);
        self.draw_mesh(mesh_type);
    }

    /// A rectangle whose corners are quarter ellipses of radius `roundness`.
    pub fn draw_rounded_rect(&mut self, x1: i32, y1: i32, x2: i32, y2: i32, roundness: u32) {
        if roundness == 0 {
            self.draw_rect(x1, y1, x2, y2);
            return;
        }

        let (x1, y1, x2, y2) = (x1 as f32, y1 as f32, x2 as f32, y2 as f32);
        let (width, height) = (x2 - x1, y2 - y1);
        let r = roundness as f32;

        self.start();
        self.set_auto_texture(width, height);
        if self.flags.contains(PenFlags::FILL) {
            self.add_vertex(x1 + width / 2.0, y1 + height / 2.0);
        }

        // Bottom left, then counter clockwise in screen space.
        self.add_corner(Vec2::new(x1 + r, y2 - r), r, 3.0 * FRAC_PI_2, PI);
        self.add_vertex(x1, y2 - r);
        self.add_vertex(x1, y1 + r);

        self.add_corner(Vec2::new(x1 + r, y1 + r), r, PI, FRAC_PI_2);
        self.add_vertex(x1 + r, y1);
        self.add_vertex(x2 - r, y1);

        self.swap_if_flagged();
        self.add_corner(Vec2::new(x2 - r, y1 + r), r, FRAC_PI_2, 0.0);
        self.add_vertex(x2, y1 + r);
        self.add_vertex(x2, y2 - r);

        self.add_corner(Vec2::new(x2 - r, y2 - r), r, TAU, 3.0 * FRAC_PI_2);
        self.add_vertex(x2 - r, y2);
        self.add_vertex(x1 + r, y2);
        self.swap_if_flagged();

        let mesh_type = self.mesh_type(MeshType::TriangleFan);
        self.draw_mesh(mesh_type);
    }

    /// Walks from `from` down to (excluding) `to` in [`ARC_STEP`] steps.
    fn add_corner(&mut self, center: Vec2, radius: f32, from: f32, to: f32) {
        let mut angle = from;
        while angle > to {
            self.add_vertex(center.x + angle.cos() * radius, center.y - angle.sin() * radius);
            angle -= ARC_STEP;
        }
    }

    /// An elliptical arc fitted into the box, angles in radians. `0` to
    /// `TAU` gives a full ellipse.
    pub fn draw_arc(&mut self, x1: i32, y1: i32, x2: i32, y2: i32, start_angle: f32, end_angle: f32) {
        let (x1, x2) = (x1.min(x2), x1.max(x2));
        let (y1, y2) = (y1.min(y2), y1.max(y2));
        if (end_angle - start_angle).abs() < 0.0001 {
            return;
        }
        let (width, height) = ((x2 - x1) as f32, (y2 - y1) as f32);
        if width == 0.0 || height == 0.0 {
            return;
        }

        let radius = Vec2::new(width / 2.0, height / 2.0);
        let center = Vec2::new(x1 as f32, y1 as f32) + radius;

        self.start();
        self.set_auto_texture(width, height);
        if self.flags.contains(PenFlags::FILL) {
            self.add_vertex(center.x, center.y);
        }
        let mut angle = start_angle;
        while angle <= end_angle {
            self.add_vertex(center.x + angle.cos() * radius.x, center.y + angle.sin() * radius.y);
            angle += ARC_STEP;
        }

        let mesh_type = self.mesh_type(MeshType::TriangleFan);
        self.draw_mesh(mesh_type);
    }

    pub fn draw_triangle(&mut self, x1: i32, y1: i32, x2: i32, y2: i32, x3: i32, y3: i32) {
        self.start();
        for (x, y, uv) in [(x1, y1, Vec2::ZERO), (x2, y2, Vec2::Y), (x3, y3, Vec2::ONE)] {
            self.add_vertex(x as f32, y as f32);
            self.texcoords.push(uv);
        }
        if !self.flags.contains(PenFlags::FILL) {
            self.add_vertex(x1 as f32, y1 as f32);
        }

        let mesh_type = self.mesh_type(MeshType::Triangles);
        self.draw_mesh(mesh_type);
    }

    fn text_color(&self) -> i32 {
        let c = self.color * 255.0;
        find_rgb(c.x as i32, c.y as i32, c.z as i32, c.w as i32)
    }

    fn text_origin(&self, x: i32, y: i32) -> IVec2 {
        IVec2::new(x + self.translation.x as i32, y + self.translation.y as i32)
    }

    /// Text in the pen color with a transparent background.
    pub fn write(&mut self, font: &dyn Font, x: i32, y: i32, text: &str) {
        let pos = self.text_origin(x, y);
        let color = self.text_color();
        self.target
            .write_text(font, pos.x, pos.y, color, TRANSPARENT_BACKGROUND, text);
    }

    /// One line of text below the other.
    pub fn write_lines(&mut self, font: &dyn Font, x: i32, y: i32, lines: &[&str]) {
        let mut pos = self.text_origin(x, y);
        let color = self.text_color();
        let height = font.text_height();
        for line in lines {
            self.target
                .write_text(font, pos.x, pos.y, color, TRANSPARENT_BACKGROUND, line);
            pos.y += height;
        }
    }

    pub fn write_boxed(
        &mut self,
        font: &dyn Font,
        (x1, y1): (i32, i32),
        (x2, y2): (i32, i32),
        h_align: TextAlign,
        v_align: TextAlign,
        text: &str,
    ) {
        let size = font.dimensions(text);
        let x = align_horizontal(x1, x2, size.x, h_align);
        let y = align_vertical(y1, y2, size.y, v_align);
        self.write(font, x, y, text);
    }

    /// Aligns the block of lines as a whole vertically and every line on
    /// its own horizontally.
    pub fn write_lines_boxed(
        &mut self,
        font: &dyn Font,
        (x1, y1): (i32, i32),
        (x2, y2): (i32, i32),
        h_align: TextAlign,
        v_align: TextAlign,
        lines: &[&str],
    ) {
        let height = font.text_height();
        let mut y = align_vertical(y1, y2, height * lines.len() as i32, v_align);
        for line in lines {
            let x = align_horizontal(x1, x2, font.dimensions(line).x, h_align);
            self.write(font, x, y, line);
            y += height;
        }
    }
}

fn align_horizontal(x1: i32, x2: i32, width: i32, align: TextAlign) -> i32 {
    match align {
        TextAlign::Right => x2 - width,
        TextAlign::Center => x1 + ((x2 - x1) >> 1) - (width >> 1),
        _ => x1,
    }
}

fn align_vertical(y1: i32, y2: i32, height: i32, align: TextAlign) -> i32 {
    match align {
        TextAlign::Bottom => y2 - height,
        TextAlign::Center => y1 + ((y2 - y1) >> 1) - (height >> 1),
        _ => y1,
    }
}
