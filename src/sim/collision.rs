//! Collision primitives
//!
//! All combat collision is point-vs-box: a projectile is a point, a target
//! is an axis-aligned box described by its center and half-extents, in
//! whole world pixels. The comparison is strictly `<` on both axes, so a
//! point exactly on a box edge misses. A scan over several targets stops
//! at the first hit; callers enumerate targets in the fixed order for
//! their projectile kind.

/// Half-extents of a target box, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HalfBox {
    pub half_w: i32,
    pub half_h: i32,
}

impl HalfBox {
    pub const fn new(half_w: i32, half_h: i32) -> Self {
        Self { half_w, half_h }
    }

    pub const fn square(half: i32) -> Self {
        Self { half_w: half, half_h: half }
    }
}

/// Strict proximity test: true iff the point lies strictly inside the box
/// centered at `center`.
pub fn point_hits(point: (i32, i32), center: (i32, i32), hb: HalfBox) -> bool {
    (point.0 - center.0).abs() < hb.half_w && (point.1 - center.1).abs() < hb.half_h
}

/// Horizontal-only variant used where the target's vertical extent is the
/// whole lane (captive friendly-fire and crush checks).
pub fn span_hits(point_x: i32, center_x: i32, half_w: i32) -> bool {
    (point_x - center_x).abs() < half_w
}

/// Scan targets in iteration order and return the tag of the first one the
/// point lands inside, or None. Later targets are not examined once a hit
/// is found.
pub fn first_hit<T>(
    point: (i32, i32),
    targets: impl IntoIterator<Item = (T, (i32, i32), HalfBox)>,
) -> Option<T> {
    for (tag, center, hb) in targets {
        if point_hits(point, center, hb) {
            return Some(tag);
        }
    }
    None
}
