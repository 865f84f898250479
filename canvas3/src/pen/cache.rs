use std::sync::Arc;

use canvas3_types::{
    glam::{Affine3A, Vec2, Vec3, Vec4},
    RenderState, SimpleMesh, SimpleMeshFlags,
};
use parking_lot::Mutex;

use crate::surface::MeshSurface;

/// A cache several pens can push into, one at a time.
pub type SharedPenCache = Arc<Mutex<PenCache>>;

const DEFAULT_COLOR: Vec4 = Vec4::ONE;
const DEFAULT_TEXCOORD: Vec2 = Vec2::ZERO;

/// Consecutive meshes merged into one draw call.
#[derive(Debug, Clone)]
pub struct PenBatch {
    pub state: RenderState,
    pub flags: SimpleMeshFlags,
    pub offset_vertices: usize,
    pub vertex_count: usize,
    pub offset_indices: usize,
    pub index_count: usize,
}

/// Records meshes and replays them later, merging neighbours that share
/// flags and render state.
#[derive(Debug, Default)]
pub struct PenCache {
    batches: Vec<PenBatch>,
    vertices: Vec<Vec3>,
    indices: Vec<u32>,
    colors: Vec<Vec4>,
    texcoords: Vec<Vec2>,
}

impl PenCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedPenCache {
        Arc::new(Mutex::new(Self::new()))
    }

    /// Appends `mesh`, merging it into the last batch when possible.
    pub fn push_mesh(&mut self, mesh: &SimpleMesh<'_>, flags: SimpleMeshFlags) {
        let mergeable = matches!(
            self.batches.last(),
            Some(last) if last.flags == flags && last.state == mesh.state
        );
        if !mergeable {
            self.batches.push(PenBatch {
                state: mesh.state.clone(),
                flags,
                offset_vertices: self.vertices.len(),
                vertex_count: 0,
                offset_indices: self.indices.len(),
                index_count: 0,
            });
        }

        let last = self.batches.len() - 1;
        let batch = &mut self.batches[last];
        let base = batch.vertex_count as u32;
        batch.vertex_count += mesh.vertices.len();
        batch.index_count += mesh.indices.len();

        self.vertices.extend_from_slice(mesh.vertices);
        for i in 0..mesh.vertices.len() {
            let color = mesh.colors.and_then(|colors| colors.get(i)).copied();
            self.colors.push(color.unwrap_or(DEFAULT_COLOR));
            let texcoord = mesh.texcoords.and_then(|texcoords| texcoords.get(i)).copied();
            self.texcoords.push(texcoord.unwrap_or(DEFAULT_TEXCOORD));
        }
        self.indices.extend(mesh.indices.iter().map(|&index| index + base));
    }

    /// Submits every batch in push order, one draw call each.
    pub fn render<S: MeshSurface + ?Sized>(&self, surface: &mut S) {
        profiling::scope!("PenCache::render");
        for batch in &self.batches {
            let vertices = batch.offset_vertices..batch.offset_vertices + batch.vertex_count;
            let indices = batch.offset_indices..batch.offset_indices + batch.index_count;
            let mesh = SimpleMesh::new(batch.state.clone(), &self.vertices[vertices.clone()], &self.indices[indices])
                .with_colors(&self.colors[vertices.clone()])
                .with_texcoords(&self.texcoords[vertices]);
            surface.draw_simple_mesh(&mesh, batch.flags);
        }
        log::trace!("Rendered {} cached pen batches", self.batches.len());
    }

    pub fn clear(&mut self) {
        self.batches.clear();
        self.vertices.clear();
        self.indices.clear();
        self.colors.clear();
        self.texcoords.clear();
    }

    /// Moves all cached geometry by replacing every batch's world transform.
    pub fn set_transform(&mut self, transform: Affine3A) {
        for batch in &mut self.batches {
            batch.state.object_to_world = transform;
        }
    }

    pub fn batches(&self) -> &[PenBatch] {
        &self.batches
    }

    pub fn batch_count(&self) -> usize {
        self.batches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn colors(&self) -> &[Vec4] {
        &self.colors
    }

    pub fn texcoords(&self) -> &[Vec2] {
        &self.texcoords
    }
}

#[cfg(test)]
mod tests {
    use canvas3_types::{MeshType, TextureHandle};

    use super::*;

    struct Counter {
        calls: Vec<(MeshType, usize, Vec<u32>)>,
    }

    impl MeshSurface for Counter {
        fn draw_simple_mesh(&mut self, mesh: &SimpleMesh<'_>, _flags: SimpleMeshFlags) {
            self.calls
                .push((mesh.state.mesh_type, mesh.vertices.len(), mesh.indices.to_vec()));
        }
    }

    const TRI: [Vec3; 3] = [Vec3::ZERO, Vec3::X, Vec3::Y];

    fn texture(idx: usize) -> TextureHandle {
        TextureHandle::new(|_| {}, idx)
    }

    #[test]
    fn equal_state_merges() {
        let mut cache = PenCache::new();
        let mesh = SimpleMesh::new(RenderState::default(), &TRI, &[0, 1, 2]);
        cache.push_mesh(&mesh, SimpleMeshFlags::SCREENSPACE);
        cache.push_mesh(&mesh, SimpleMeshFlags::SCREENSPACE);

        assert_eq!(cache.batch_count(), 1);
        assert_eq!(cache.batches()[0].vertex_count, 6);
        assert_eq!(cache.indices(), [0, 1, 2, 3, 4, 5]);
        assert_eq!(cache.colors(), [Vec4::ONE; 6]);
        assert_eq!(cache.texcoords(), [Vec2::ZERO; 6]);
    }

    #[test]
    fn flags_or_texture_split() {
        let mut cache = PenCache::new();
        let plain = SimpleMesh::new(RenderState::default(), &TRI, &[0, 1, 2]);
        cache.push_mesh(&plain, SimpleMeshFlags::SCREENSPACE);
        cache.push_mesh(&plain, SimpleMeshFlags::empty());
        assert_eq!(cache.batch_count(), 2);

        let tex = texture(0);
        let textured = SimpleMesh::new(
            RenderState {
                texture: Some(tex.clone()),
                ..RenderState::default()
            },
            &TRI,
            &[0, 1, 2],
        );
        cache.push_mesh(&textured, SimpleMeshFlags::empty());
        cache.push_mesh(&textured, SimpleMeshFlags::empty());
        assert_eq!(cache.batch_count(), 3);

        let other = SimpleMesh::new(
            RenderState {
                texture: Some(texture(1)),
                ..RenderState::default()
            },
            &TRI,
            &[0, 1, 2],
        );
        cache.push_mesh(&other, SimpleMeshFlags::empty());
        assert_eq!(cache.batch_count(), 4);
        assert_eq!(cache.batches()[2].index_count, 6);
        assert_eq!(&cache.indices()[6..12], [0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn render_in_push_order_and_clear() {
        let mut cache = PenCache::new();
        let lines = SimpleMesh::new(
            RenderState {
                mesh_type: MeshType::Lines,
                ..RenderState::default()
            },
            &TRI[..2],
            &[0, 1],
        );
        let tris = SimpleMesh::new(RenderState::default(), &TRI, &[0, 1, 2]);
        cache.push_mesh(&tris, SimpleMeshFlags::empty());
        cache.push_mesh(&lines, SimpleMeshFlags::empty());
        cache.push_mesh(&lines, SimpleMeshFlags::empty());

        let mut counter = Counter { calls: Vec::new() };
        cache.render(&mut counter);
        assert_eq!(
            counter.calls,
            [
                (MeshType::Triangles, 3, vec![0, 1, 2]),
                (MeshType::Lines, 4, vec![0, 1, 2, 3]),
            ]
        );

        cache.clear();
        cache.clear();
        assert!(cache.is_empty());
        assert!(cache.vertices().is_empty());
    }

    #[test]
    fn set_transform_restamps_batches() {
        let mut cache = PenCache::new();
        let tris = SimpleMesh::new(RenderState::default(), &TRI, &[0, 1, 2]);
        cache.push_mesh(&tris, SimpleMeshFlags::empty());
        cache.push_mesh(&tris, SimpleMeshFlags::SCREENSPACE);

        let moved = Affine3A::from_translation(Vec3::new(5.0, 6.0, 0.0));
        cache.set_transform(moved);
        assert!(cache.batches().iter().all(|b| b.state.object_to_world == moved));

        // A mesh with the old transform no longer merges.
        cache.push_mesh(&tris, SimpleMeshFlags::SCREENSPACE);
        assert_eq!(cache.batch_count(), 3);
    }
}
