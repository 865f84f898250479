use canvas3_types::{
    glam::{Affine3A, Vec2, Vec3, Vec4},
    MeshType, MixMode, RenderState, SimpleMesh, SimpleMeshFlags,
};

use crate::{
    pen::{SharedPenCache, ARC_STEP},
    surface::MeshSurface,
};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    /// The two other axes, in cyclic order.
    const fn plane(self) -> (usize, usize) {
        let i = self.index();
        ((i + 1) % 3, (i + 2) % 3)
    }
}

/// Draws lines in object space. Meshes are never screen space.
pub struct Pen3D<'a> {
    target: &'a mut dyn MeshSurface,
    cache: Option<SharedPenCache>,
    state: RenderState,
    color: Vec4,
    local_to_object: Affine3A,

    vertices: Vec<Vec3>,
    indices: Vec<u32>,
    colors: Vec<Vec4>,
}

impl<'a> Pen3D<'a> {
    pub fn new(target: &'a mut dyn MeshSurface) -> Self {
        Self {
            target,
            cache: None,
            state: RenderState {
                mix_mode: MixMode::Alpha,
                ..RenderState::default()
            },
            color: Vec4::ONE,
            local_to_object: Affine3A::IDENTITY,
            vertices: Vec::new(),
            indices: Vec::new(),
            colors: Vec::new(),
        }
    }

    pub fn set_cache(&mut self, cache: Option<SharedPenCache>) {
        self.cache = cache;
    }

    pub fn set_mix_mode(&mut self, mix_mode: MixMode) {
        self.state.mix_mode = mix_mode;
    }

    pub fn set_color(&mut self, color: Vec4) {
        self.color = color;
    }

    /// Applied to every vertex before it is stored.
    pub fn set_local_to_object(&mut self, transform: Affine3A) {
        self.local_to_object = transform;
    }

    /// Object to world transform of the generated meshes.
    pub fn set_transform(&mut self, transform: Affine3A) {
        self.state.object_to_world = transform;
    }

    fn start(&mut self) {
        self.vertices.clear();
        self.indices.clear();
        self.colors.clear();
    }

    fn add_vertex(&mut self, v: Vec3) {
        self.indices.push(self.vertices.len() as u32);
        self.vertices.push(self.local_to_object.transform_point3(v));
        self.colors.push(self.color);
    }

    fn draw_mesh(&mut self, mesh_type: MeshType) {
        self.state.mesh_type = mesh_type;
        let mesh = SimpleMesh::new(self.state.clone(), &self.vertices, &self.indices).with_colors(&self.colors);
        match self.cache {
            Some(ref cache) => cache.lock().push_mesh(&mesh, SimpleMeshFlags::empty()),
            None => self.target.draw_simple_mesh(&mesh, SimpleMeshFlags::empty()),
        }
    }

    pub fn draw_line(&mut self, v1: Vec3, v2: Vec3) {
        self.start();
        self.add_vertex(v1);
        self.add_vertex(v2);
        self.draw_mesh(MeshType::Lines);
    }

    pub fn draw_lines(&mut self, pairs: &[(Vec3, Vec3)]) {
        self.start();
        for &(v1, v2) in pairs {
            self.add_vertex(v1);
            self.add_vertex(v2);
        }
        self.draw_mesh(MeshType::Lines);
    }

    /// The twelve edges of the box spanned by `min` and `max`.
    pub fn draw_box(&mut self, min: Vec3, max: Vec3) {
        let corner = |x: bool, y: bool, z: bool| {
            Vec3::new(
                if x { max.x } else { min.x },
                if y { max.y } else { min.y },
                if z { max.z } else { min.z },
            )
        };
        let mut pairs = Vec::with_capacity(12);
        for z in [false, true] {
            pairs.push((corner(false, false, z), corner(true, false, z)));
            pairs.push((corner(true, false, z), corner(true, true, z)));
            pairs.push((corner(true, true, z), corner(false, true, z)));
            pairs.push((corner(false, true, z), corner(false, false, z)));
        }
        for (x, y) in [(false, false), (false, true), (true, false), (true, true)] {
            pairs.push((corner(x, y, false), corner(x, y, true)));
        }
        self.draw_lines(&pairs);
    }

    /// An elliptical arc in the plane perpendicular to `axis` through `c1`,
    /// fitted into the rectangle spanned by `c1` and `c2`.
    pub fn draw_arc(&mut self, c1: Vec3, c2: Vec3, axis: Axis, start_angle: f32, end_angle: f32) {
        if (end_angle - start_angle).abs() < 0.0001 {
            return;
        }
        let (u, v) = axis.plane();
        let (lo, hi) = (c1.min(c2), c1.max(c2));
        let size = Vec2::new(hi[u] - lo[u], hi[v] - lo[v]);
        if size.x.abs() < 0.0001 || size.y.abs() < 0.0001 {
            return;
        }
        let radius = size / 2.0;
        let center = Vec2::new(lo[u], lo[v]) + radius;

        self.start();
        let mut angle = start_angle;
        while angle <= end_angle {
            let mut point = c1;
            point[u] = center.x + angle.cos() * radius.x;
            point[v] = center.y + angle.sin() * radius.y;
            self.add_vertex(point);
            angle += ARC_STEP;
        }
        self.draw_mesh(MeshType::LineStrip);
    }

    /// A cylinder along `axis` fitting the box: both end ellipses plus four
    /// connecting lines.
    pub fn draw_cylinder(&mut self, min: Vec3, max: Vec3, axis: Axis) {
        let a = axis.index();
        let (u, v) = axis.plane();
        let radius = Vec2::new(max[u] - min[u], max[v] - min[v]) / 2.0;
        let center = Vec2::new(min[u], min[v]) + radius;

        let mut ends = [[Vec3::ZERO; 4]; 2];
        for (end, height) in ends.iter_mut().zip([min[a], max[a]]) {
            let mut c1 = min;
            let mut c2 = max;
            c1[a] = height;
            c2[a] = height;
            self.draw_arc(c1, c2, axis, 0.0, std::f32::consts::TAU);

            let offsets = [
                Vec2::new(radius.x, 0.0),
                Vec2::new(0.0, radius.y),
                Vec2::new(-radius.x, 0.0),
                Vec2::new(0.0, -radius.y),
            ];
            for (point, offset) in end.iter_mut().zip(offsets) {
                *point = c1;
                point[u] = center.x + offset.x;
                point[v] = center.y + offset.y;
            }
        }
        for (bottom, top) in ends[0].into_iter().zip(ends[1]) {
            self.draw_line(bottom, top);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pen::PenCache;

    #[derive(Default)]
    struct Target {
        meshes: Vec<(MeshType, Vec<Vec3>, SimpleMeshFlags)>,
    }

    impl MeshSurface for Target {
        fn draw_simple_mesh(&mut self, mesh: &SimpleMesh<'_>, flags: SimpleMeshFlags) {
            self.meshes.push((mesh.state.mesh_type, mesh.vertices.to_vec(), flags));
        }
    }

    #[test]
    fn box_has_twelve_edges() {
        let mut target = Target::default();
        Pen3D::new(&mut target).draw_box(Vec3::ZERO, Vec3::ONE);

        let (mesh_type, vertices, flags) = &target.meshes[0];
        assert_eq!(*mesh_type, MeshType::Lines);
        assert_eq!(vertices.len(), 24);
        assert!(flags.is_empty());
        for pair in vertices.chunks(2) {
            // Every edge runs along exactly one axis.
            let delta = (pair[1] - pair[0]).abs();
            assert_eq!(delta.x + delta.y + delta.z, 1.0);
        }
    }

    #[test]
    fn local_transform_applies_to_vertices() {
        let mut target = Target::default();
        let mut pen = Pen3D::new(&mut target);
        pen.set_local_to_object(Affine3A::from_translation(Vec3::Z));
        pen.draw_line(Vec3::ZERO, Vec3::X);
        assert_eq!(target.meshes[0].1, [Vec3::Z, Vec3::new(1.0, 0.0, 1.0)]);
    }

    #[test]
    fn arc_stays_in_axis_plane() {
        let mut target = Target::default();
        let mut pen = Pen3D::new(&mut target);
        pen.draw_arc(Vec3::new(7.0, 0.0, 0.0), Vec3::new(7.0, 2.0, 4.0), Axis::X, 0.0, std::f32::consts::PI);
        pen.draw_arc(Vec3::ZERO, Vec3::new(0.0, 0.0, 1.0), Axis::X, 0.0, 1.0);

        assert_eq!(target.meshes.len(), 1);
        let (mesh_type, vertices, _) = &target.meshes[0];
        assert_eq!(*mesh_type, MeshType::LineStrip);
        assert!(vertices.iter().all(|v| v.x == 7.0));
        assert!(vertices[0].abs_diff_eq(Vec3::new(7.0, 2.0, 2.0), 1e-5));
    }

    #[test]
    fn cylinder_draws_two_rings_and_four_lines() {
        let cache = PenCache::shared();
        let mut target = Target::default();
        let mut pen = Pen3D::new(&mut target);
        pen.set_cache(Some(cache.clone()));
        pen.draw_cylinder(Vec3::ZERO, Vec3::new(2.0, 2.0, 5.0), Axis::Z);

        let cache = cache.lock();
        // Rings merge, lines merge.
        assert_eq!(cache.batch_count(), 2);
        assert_eq!(cache.batches()[1].vertex_count, 8);
        let lines = &cache.vertices()[cache.batches()[1].offset_vertices..];
        assert_eq!(lines[0], Vec3::new(2.0, 1.0, 0.0));
        assert_eq!(lines[1], Vec3::new(2.0, 1.0, 5.0));
        assert!(target.meshes.is_empty());
    }
}
