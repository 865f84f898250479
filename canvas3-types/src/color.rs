use bytemuck::{Pod, Zeroable};
use glam::Vec4;

/// A color packed into a single integer.
///
/// The layout is `(255 - a) << 24 | r << 16 | g << 8 | b`. Alpha is stored
/// inverted so that `0x00RRGGBB` values are fully opaque.
pub type PackedColor = i32;

/// Packed value meaning "no background". Decomposes to transparent white.
pub const TRANSPARENT_BACKGROUND: PackedColor = -1;

/// A single 8-bit-per-channel color, laid out the way pixel buffers store it.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash, Pod, Zeroable)]
#[repr(C)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Converts to normalized floating point components.
    pub fn to_vec4(self) -> Vec4 {
        Vec4::new(self.r as f32, self.g as f32, self.b as f32, self.a as f32) / 255.0
    }

    /// Packs this color into the integer representation used by the 2D driver.
    pub fn pack(self) -> PackedColor {
        find_rgb(self.r as i32, self.g as i32, self.b as i32, self.a as i32)
    }

    /// Inverse of [`Rgba::pack`].
    pub fn unpack(color: PackedColor) -> Self {
        let (r, g, b, a) = get_rgba(color);
        Self::new(r, g, b, a)
    }
}

fn channel(value: i32) -> u32 {
    value.clamp(0, 255) as u32
}

/// Packs the given components into a [`PackedColor`].
///
/// Components outside `0..=255` are clamped before packing.
pub fn find_rgb(r: i32, g: i32, b: i32, a: i32) -> PackedColor {
    let packed = ((255 - channel(a)) << 24) | (channel(r) << 16) | (channel(g) << 8) | channel(b);
    packed as PackedColor
}

/// Packs an opaque color.
pub fn find_rgb_opaque(r: i32, g: i32, b: i32) -> PackedColor {
    find_rgb(r, g, b, 255)
}

/// Unpacks the color components, discarding alpha.
pub fn get_rgb(color: PackedColor) -> (u8, u8, u8) {
    let (r, g, b, _) = get_rgba(color);
    (r, g, b)
}

/// Unpacks all four components of a [`PackedColor`].
pub fn get_rgba(color: PackedColor) -> (u8, u8, u8, u8) {
    let bits = color as u32;
    (
        (bits >> 16) as u8,
        (bits >> 8) as u8,
        bits as u8,
        255 - (bits >> 24) as u8,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        // Every channel over its whole range, with the others at the extremes.
        for value in 0..=255 {
            for other in [0, 255] {
                for (r, g, b, a) in [
                    (value, other, other, other),
                    (other, value, other, other),
                    (other, other, value, other),
                    (other, other, other, value),
                ] {
                    let packed = find_rgb(r, g, b, a);
                    assert_eq!(get_rgba(packed), (r as u8, g as u8, b as u8, a as u8));
                    assert_eq!(get_rgb(packed), (r as u8, g as u8, b as u8));
                }
            }
        }

        // All combinations on a grid that includes 0 and 255.
        let grid = || (0..=255).step_by(17);
        for r in grid() {
            for g in grid() {
                for b in grid() {
                    for a in grid() {
                        assert_eq!(get_rgba(find_rgb(r, g, b, a)), (r as u8, g as u8, b as u8, a as u8));
                    }
                }
            }
        }
    }

    #[test]
    fn opaque_black_is_zero() {
        assert_eq!(find_rgb(0, 0, 0, 255), 0);
        assert_eq!(find_rgb_opaque(0x12, 0x34, 0x56), 0x0012_3456);
    }

    #[test]
    fn out_of_range_components_clamp() {
        assert_eq!(find_rgb(300, -5, 128, 999), find_rgb(255, 0, 128, 255));
        assert_eq!(get_rgba(find_rgb(-1, 256, 0, -20)), (0, 255, 0, 0));
    }

    #[test]
    fn minus_one_is_transparent_white() {
        assert_eq!(get_rgba(TRANSPARENT_BACKGROUND), (255, 255, 255, 0));
        assert_eq!(get_rgb(TRANSPARENT_BACKGROUND), (255, 255, 255));
    }

    #[test]
    fn rgba_pack_matches_find_rgb() {
        let color = Rgba::new(10, 20, 30, 40);
        assert_eq!(color.pack(), find_rgb(10, 20, 30, 40));
        assert_eq!(Rgba::unpack(color.pack()), color);
    }
}
