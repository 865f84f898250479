use canvas3_types::{SimpleMesh, SimpleMeshFlags};

/// Something that rasterizes meshes immediately.
pub trait MeshSurface {
    fn draw_simple_mesh(&mut self, mesh: &SimpleMesh<'_>, flags: SimpleMeshFlags);
}
