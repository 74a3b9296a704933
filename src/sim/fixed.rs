//! Fixed-Point World Coordinates
//!
//! Every world position, velocity and the camera scalar is a signed 32-bit
//! value with 4 fractional bits ("subpixels", 16 per pixel). Keeping the
//! shifts behind one newtype means sign-extension and rounding behavior is
//! decided in exactly one place instead of scattered through the update code.
//!
//! Screen projection is `(world - camera) >> 4`; the shift is arithmetic, so
//! entities left of the camera legitimately project to negative pixels.

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

/// Fractional bits per world coordinate (16 subpixels per pixel).
pub const SUBPIXEL_BITS: u32 = 4;

/// Visible window width in pixels.
pub const SCREEN_W: i32 = 320;
/// Visible window height in pixels.
pub const SCREEN_H: i32 = 240;

/// A world-space scalar in subpixels.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Subpixel(pub i32);

impl Subpixel {
    pub const ZERO: Subpixel = Subpixel(0);

    /// Whole pixels to subpixels.
    pub const fn from_px(px: i32) -> Self {
        Subpixel(px << SUBPIXEL_BITS)
    }

    /// Subpixels to whole pixels, truncating toward negative infinity
    /// (arithmetic shift - off-left entities must stay negative).
    pub const fn to_px(self) -> i32 {
        self.0 >> SUBPIXEL_BITS
    }

    pub const fn abs(self) -> Self {
        Subpixel(self.0.abs())
    }

    /// -1, 0 or 1 depending on sign.
    pub const fn signum(self) -> i32 {
        self.0.signum()
    }

    pub fn clamp(self, min: Subpixel, max: Subpixel) -> Self {
        Subpixel(self.0.clamp(min.0, max.0))
    }

    pub fn min(self, other: Subpixel) -> Self {
        Subpixel(self.0.min(other.0))
    }

    pub fn max(self, other: Subpixel) -> Self {
        Subpixel(self.0.max(other.0))
    }
}

impl Add for Subpixel {
    type Output = Subpixel;
    fn add(self, rhs: Subpixel) -> Subpixel {
        Subpixel(self.0 + rhs.0)
    }
}

impl Sub for Subpixel {
    type Output = Subpixel;
    fn sub(self, rhs: Subpixel) -> Subpixel {
        Subpixel(self.0 - rhs.0)
    }
}

impl Neg for Subpixel {
    type Output = Subpixel;
    fn neg(self) -> Subpixel {
        Subpixel(-self.0)
    }
}

impl AddAssign for Subpixel {
    fn add_assign(&mut self, rhs: Subpixel) {
        self.0 += rhs.0;
    }
}

impl SubAssign for Subpixel {
    fn sub_assign(&mut self, rhs: Subpixel) {
        self.0 -= rhs.0;
    }
}

/// Horizontal world bounds in subpixels.
pub const WORLD_MIN_X: Subpixel = Subpixel::from_px(0);
pub const WORLD_MAX_X: Subpixel = Subpixel::from_px(4096);

/// Vertical flight envelope in subpixels (top of the aircraft sprite).
pub const CEILING_Y: Subpixel = Subpixel::from_px(40);
pub const GROUND_Y: Subpixel = Subpixel::from_px(186);

/// Project a world x to a screen pixel given the camera scalar.
pub fn world_to_screen(world_x: Subpixel, camera_x: Subpixel) -> i32 {
    (world_x - camera_x).to_px()
}

/// True if a sprite of `width_px` at this screen x overlaps the visible
/// window (with a one-sprite margin so edge clipping looks right).
pub fn on_screen(screen_x: i32, width_px: i32) -> bool {
    screen_x > -width_px && screen_x < SCREEN_W + width_px
}
