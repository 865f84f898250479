//! Immediate mode drawing helpers.
//!
//! A pen accumulates the vertices of one primitive, then submits them either
//! straight to its target or into a [`PenCache`] that merges consecutive
//! meshes sharing a render state.

mod cache;
mod pen2d;
mod pen3d;

pub use cache::*;
pub use pen2d::*;
pub use pen3d::*;

use bitflags::bitflags;
use canvas3_types::{glam::IVec2, PackedColor, SimpleMesh, SimpleMeshFlags};

use crate::{
    font::{Font, WriteFlags},
    graph2d::Graphics2D,
    surface::MeshSurface,
};

bitflags! {
    #[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
    pub struct PenFlags: u32 {
        /// Fill shapes instead of outlining them.
        const FILL = 1;
        /// Alternate between the color and the alternate color while building
        /// a shape, giving simple gradients.
        const SWAP_COLORS = 2;
        /// Bind the pen texture.
        const TEXTURE_ONLY = 4;
        const TEXTURE = Self::FILL.bits() | Self::TEXTURE_ONLY.bits();
    }
}

/// Placement of text inside a box.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TextAlign {
    #[default]
    Top,
    Bottom,
    Left,
    Right,
    Center,
}

/// What a 2D pen draws on.
pub trait PenTarget {
    /// Size of the drawable area, used for clipping.
    fn canvas_size(&self) -> IVec2;

    fn submit_mesh(&mut self, mesh: &SimpleMesh<'_>, flags: SimpleMeshFlags);

    fn write_text(&mut self, font: &dyn Font, x: i32, y: i32, fg: PackedColor, bg: PackedColor, text: &str);
}

impl<G: Graphics2D + MeshSurface> PenTarget for G {
    fn canvas_size(&self) -> IVec2 {
        IVec2::new(self.width(), self.height())
    }

    fn submit_mesh(&mut self, mesh: &SimpleMesh<'_>, flags: SimpleMeshFlags) {
        self.draw_simple_mesh(mesh, flags)
    }

    fn write_text(&mut self, font: &dyn Font, x: i32, y: i32, fg: PackedColor, bg: PackedColor, text: &str) {
        self.write(font, x, y, fg, bg, text, WriteFlags::empty())
    }
}
