use bitflags::bitflags;
use glam::{Affine3A, Vec2, Vec3, Vec4};

use crate::{ShaderHandle, ShaderVarDomainHandle, TextureHandle};

/// Primitive topology of a mesh.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub enum MeshType {
    #[default]
    Triangles,
    TriangleStrip,
    TriangleFan,
    Points,
    PointSprites,
    Lines,
    LineStrip,
    Quads,
}

/// How incoming fragments combine with the framebuffer.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub enum MixMode {
    Copy,
    #[default]
    Alpha,
    Add,
    Multiply,
    Multiply2,
    Transparent,
}

/// Kind of alpha blending needed by a mesh's material.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub enum AlphaMode {
    #[default]
    None,
    Binary,
    Smooth,
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub struct AlphaType {
    /// Derive the alpha mode from the texture instead of `alpha_type`.
    pub auto_alpha_mode: bool,
    pub alpha_type: AlphaMode,
}

/// Depth buffer usage.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ZBufMode {
    #[default]
    None,
    Fill,
    Test,
    Use,
    Equal,
    Inverted,
}

bitflags! {
    /// Flags accompanying a [`SimpleMesh`] submission.
    #[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
    pub struct SimpleMeshFlags: u32 {
        /// Vertices are in screen pixels, not world space.
        const SCREENSPACE = 1 << 0;
    }
}

/// Everything about a mesh that decides whether it can share a draw call with
/// another one.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderState {
    pub mesh_type: MeshType,
    pub texture: Option<TextureHandle>,
    pub shader: Option<ShaderHandle>,
    pub dyn_domain: Option<ShaderVarDomainHandle>,
    pub alpha_type: AlphaType,
    pub z_buf_mode: ZBufMode,
    pub mix_mode: MixMode,
    pub object_to_world: Affine3A,
}

impl Default for RenderState {
    fn default() -> Self {
        Self {
            mesh_type: MeshType::default(),
            texture: None,
            shader: None,
            dyn_domain: None,
            alpha_type: AlphaType::default(),
            z_buf_mode: ZBufMode::default(),
            mix_mode: MixMode::default(),
            object_to_world: Affine3A::IDENTITY,
        }
    }
}

/// Borrowed bundle of geometry submitted for immediate rasterization.
#[derive(Debug, Clone)]
pub struct SimpleMesh<'a> {
    pub state: RenderState,
    pub vertices: &'a [Vec3],
    pub indices: &'a [u32],
    /// One color per vertex, white when absent.
    pub colors: Option<&'a [Vec4]>,
    /// One texture coordinate per vertex, the origin when absent.
    pub texcoords: Option<&'a [Vec2]>,
}

impl<'a> SimpleMesh<'a> {
    pub fn new(state: RenderState, vertices: &'a [Vec3], indices: &'a [u32]) -> Self {
        Self {
            state,
            vertices,
            indices,
            colors: None,
            texcoords: None,
        }
    }

    pub fn with_colors(mut self, colors: &'a [Vec4]) -> Self {
        self.colors = Some(colors);
        self
    }

    pub fn with_texcoords(mut self, texcoords: &'a [Vec2]) -> Self {
        self.texcoords = Some(texcoords);
        self
    }
}
