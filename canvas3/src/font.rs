//! Interfaces to the font service. Glyph rasterization lives elsewhere.

use bitflags::bitflags;
use canvas3_types::{glam::IVec2, ClipRect, PackedColor};

bitflags! {
    /// Flags for text output.
    #[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
    pub struct WriteFlags: u32 {
        /// `y` is the baseline, not the top of the text.
        const BASELINE = 1 << 0;
        const NO_ANTIALIAS = 1 << 1;
    }
}

pub trait Font {
    /// Height of one line of text.
    fn text_height(&self) -> i32;

    /// Bounding box of `text`.
    fn dimensions(&self, text: &str) -> IVec2;

    /// Distance from the top of a line to the baseline.
    fn ascent(&self) -> i32 {
        self.text_height()
    }
}

/// Draws glyph strings into the framebuffer.
pub trait FontCache {
    fn write_string(
        &mut self,
        font: &dyn Font,
        pos: IVec2,
        fg: PackedColor,
        bg: PackedColor,
        text: &str,
        flags: WriteFlags,
    );

    fn set_clip_rect(&mut self, clip: ClipRect);

    /// Offset of the viewport inside the framebuffer.
    fn set_viewport_offset(&mut self, offset: IVec2);

    /// Pushes out any batched glyphs.
    fn flush_text(&mut self) {}
}
