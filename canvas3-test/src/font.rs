use canvas3::{font::Font, types::glam::IVec2};

/// Monospaced font with fixed glyph cells. Lines are split on `\n`.
#[derive(Debug, Copy, Clone)]
pub struct TestFont {
    pub glyph_width: i32,
    pub line_height: i32,
}

impl TestFont {
    pub const fn new(glyph_width: i32, line_height: i32) -> Self {
        Self {
            glyph_width,
            line_height,
        }
    }
}

impl Default for TestFont {
    fn default() -> Self {
        Self::new(8, 12)
    }
}

impl Font for TestFont {
    fn text_height(&self) -> i32 {
        self.line_height
    }

    fn dimensions(&self, text: &str) -> IVec2 {
        let widest = text.lines().map(|line| line.chars().count()).max().unwrap_or(0) as i32;
        let lines = text.lines().count().max(1) as i32;
        IVec2::new(widest * self.glyph_width, lines * self.line_height)
    }

    fn ascent(&self) -> i32 {
        self.line_height * 3 / 4
    }
}
