//! Clip rectangle and line clipping math.

use canvas3_types::{
    glam::{IVec2, Vec2},
    ClipRect,
};

/// Clamps every edge of `rect` into `[0, size.x]` / `[0, size.y]`.
pub fn clamp_clip_rect(rect: ClipRect, size: IVec2) -> ClipRect {
    let size = size.max(IVec2::ZERO);
    ClipRect::new(
        rect.xmin.clamp(0, size.x),
        rect.ymin.clamp(0, size.y),
        rect.xmax.clamp(0, size.x),
        rect.ymax.clamp(0, size.y),
    )
}

/// One Liang-Barsky edge test. Narrows `[t_enter, t_leave]` and returns false
/// once the segment is known to miss the rectangle.
fn clip_t(denom: f32, num: f32, t_enter: &mut f32, t_leave: &mut f32) -> bool {
    if denom > 0.0 {
        let t = num / denom;
        if t > *t_leave {
            return false;
        }
        if t > *t_enter {
            *t_enter = t;
        }
    } else if denom < 0.0 {
        let t = num / denom;
        if t < *t_enter {
            return false;
        }
        if t < *t_leave {
            *t_leave = t;
        }
    } else if num > 0.0 {
        return false;
    }
    true
}

/// Clips the segment `p0`-`p1` against `bounds`, whose right and bottom edges
/// are exclusive.
///
/// Returns true when nothing of the segment is visible. Otherwise the
/// endpoints are moved onto the visible part and false is returned.
pub fn clip_line(p0: &mut Vec2, p1: &mut Vec2, bounds: ClipRect) -> bool {
    let min = Vec2::new(bounds.xmin as f32, bounds.ymin as f32);
    let max = Vec2::new((bounds.xmax - 1) as f32, (bounds.ymax - 1) as f32);

    let delta = *p1 - *p0;
    if delta == Vec2::ZERO {
        let inside = p0.cmpge(min).all() && p0.cmple(max).all();
        return !inside;
    }

    let mut t_enter = 0.0;
    let mut t_leave = 1.0;
    let visible = clip_t(delta.x, min.x - p0.x, &mut t_enter, &mut t_leave)
        && clip_t(-delta.x, p0.x - max.x, &mut t_enter, &mut t_leave)
        && clip_t(delta.y, min.y - p0.y, &mut t_enter, &mut t_leave)
        && clip_t(-delta.y, p0.y - max.y, &mut t_enter, &mut t_leave);

    if !visible {
        return true;
    }

    let start = *p0;
    if t_leave < 1.0 {
        *p1 = start + delta * t_leave;
    }
    if t_enter > 0.0 {
        *p0 = start + delta * t_enter;
    }
    false
}

/// [`clip_line`] as a pure function. `None` when the segment is invisible.
pub fn clipped_line(mut p0: Vec2, mut p1: Vec2, bounds: ClipRect) -> Option<(Vec2, Vec2)> {
    (!clip_line(&mut p0, &mut p1, bounds)).then_some((p0, p1))
}
