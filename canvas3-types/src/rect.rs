use std::{fmt, str::FromStr};

use glam::IVec2;
use thiserror::Error;

/// The active drawing sub-rectangle of a framebuffer.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Viewport {
    pub left: i32,
    pub top: i32,
    pub width: i32,
    pub height: i32,
}

impl Viewport {
    pub const fn new(left: i32, top: i32, width: i32, height: i32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// A viewport covering a whole framebuffer of the given size.
    pub const fn full(size: IVec2) -> Self {
        Self::new(0, 0, size.x, size.y)
    }

    pub fn offset(&self) -> IVec2 {
        IVec2::new(self.left, self.top)
    }

    pub fn size(&self) -> IVec2 {
        IVec2::new(self.width, self.height)
    }

    /// True when this viewport is exactly the whole framebuffer of `size`.
    pub fn covers(&self, size: IVec2) -> bool {
        *self == Self::full(size)
    }
}

/// Clip rectangle with inclusive `min` and exclusive `max` edges.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ClipRect {
    pub xmin: i32,
    pub ymin: i32,
    pub xmax: i32,
    pub ymax: i32,
}

impl ClipRect {
    pub const fn new(xmin: i32, ymin: i32, xmax: i32, ymax: i32) -> Self {
        Self { xmin, ymin, xmax, ymax }
    }

    pub const fn from_size(size: IVec2) -> Self {
        Self::new(0, 0, size.x, size.y)
    }

    pub fn width(&self) -> i32 {
        self.xmax - self.xmin
    }

    pub fn height(&self) -> i32 {
        self.ymax - self.ymin
    }

    pub fn is_empty(&self) -> bool {
        self.xmax <= self.xmin || self.ymax <= self.ymin
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.xmin && x < self.xmax && y >= self.ymin && y < self.ymax
    }
}

/// Framebuffer size written as `"WxH"`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct DisplayMode(pub IVec2);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModeParseError {
    #[error("display mode {0:?} is not of the form WIDTHxHEIGHT")]
    Malformed(String),
}

impl FromStr for DisplayMode {
    type Err = ModeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || ModeParseError::Malformed(s.to_owned());
        let (width, height) = s.trim().split_once(['x', 'X']).ok_or_else(malformed)?;
        let width = width.trim().parse::<i32>().map_err(|_| malformed())?;
        let height = height.trim().parse::<i32>().map_err(|_| malformed())?;
        Ok(Self(IVec2::new(width, height)))
    }
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.0.x, self.0.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_parse() {
        assert_eq!("800x600".parse(), Ok(DisplayMode(IVec2::new(800, 600))));
        assert_eq!(" 1024X768 ".parse(), Ok(DisplayMode(IVec2::new(1024, 768))));
        assert!("800".parse::<DisplayMode>().is_err());
        assert!("axb".parse::<DisplayMode>().is_err());
        assert_eq!(DisplayMode(IVec2::new(640, 480)).to_string(), "640x480");
    }

    #[test]
    fn viewport_covers() {
        let size = IVec2::new(640, 480);
        assert!(Viewport::full(size).covers(size));
        assert!(!Viewport::new(1, 0, 640, 480).covers(size));
    }
}
