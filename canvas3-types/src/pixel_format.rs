use std::{
    fmt,
    ops::{Index, IndexMut},
};

/// One axis of a [`PixelFormat`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PixelFormatValue {
    ColorBits = 0,
    AlphaBits = 1,
    DepthBits = 2,
    StencilBits = 3,
    AccumColorBits = 4,
    AccumAlphaBits = 5,
    MultiSamples = 6,
}

impl PixelFormatValue {
    pub const COUNT: usize = 7;

    pub const ALL: [Self; Self::COUNT] = [
        Self::ColorBits,
        Self::AlphaBits,
        Self::DepthBits,
        Self::StencilBits,
        Self::AccumColorBits,
        Self::AccumAlphaBits,
        Self::MultiSamples,
    ];

    /// Maps a letter of a reduction order string to its axis.
    pub fn from_order_char(c: char) -> Option<Self> {
        Some(match c {
            'c' => Self::ColorBits,
            'a' => Self::AlphaBits,
            'd' => Self::DepthBits,
            's' => Self::StencilBits,
            'C' => Self::AccumColorBits,
            'A' => Self::AccumAlphaBits,
            'm' => Self::MultiSamples,
            _ => return None,
        })
    }

    /// Human readable name, as printed in pixel format reports.
    pub const fn name(self) -> &'static str {
        match self {
            Self::ColorBits => "Color",
            Self::AlphaBits => "Alpha",
            Self::DepthBits => "Depth",
            Self::StencilBits => "Stencil",
            Self::AccumColorBits => "AccumColor",
            Self::AccumAlphaBits => "AccumAlpha",
            Self::MultiSamples => "MultiSamples",
        }
    }

    /// Suffix of the configuration keys that describe this axis.
    pub const fn config_name(self) -> &'static str {
        match self {
            Self::ColorBits => "ColorBits",
            Self::AlphaBits => "AlphaBits",
            Self::DepthBits => "DepthBits",
            Self::StencilBits => "StencilBits",
            Self::AccumColorBits => "AccumColorBits",
            Self::AccumAlphaBits => "AccumAlphaBits",
            Self::MultiSamples => "MultiSamples",
        }
    }
}

/// Bit depths requested from the display driver, indexed by [`PixelFormatValue`].
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub struct PixelFormat(pub [i32; PixelFormatValue::COUNT]);

impl PixelFormat {
    pub const fn new(values: [i32; PixelFormatValue::COUNT]) -> Self {
        Self(values)
    }

    pub fn color_bits(&self) -> i32 {
        self[PixelFormatValue::ColorBits]
    }

    pub fn multi_samples(&self) -> i32 {
        self[PixelFormatValue::MultiSamples]
    }
}

impl Index<PixelFormatValue> for PixelFormat {
    type Output = i32;

    fn index(&self, index: PixelFormatValue) -> &Self::Output {
        &self.0[index as usize]
    }
}

impl IndexMut<PixelFormatValue> for PixelFormat {
    fn index_mut(&mut self, index: PixelFormatValue) -> &mut Self::Output {
        &mut self.0[index as usize]
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, value) in PixelFormatValue::ALL.into_iter().enumerate() {
            if i != 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}: {}", value.name(), self[value])?;
        }
        Ok(())
    }
}
