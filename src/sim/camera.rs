//! Scrolling Camera
//!
//! A single world-x scalar defining the left edge of the visible window.
//! The camera is retargeted, never interpolated: when the tracked aircraft
//! crosses a scroll-trigger band it is shifted by exactly the overshoot so
//! the aircraft sits back at the trigger edge. Nothing else may write it.

use super::config::Tunables;
use super::fixed::{Subpixel, SCREEN_W, WORLD_MAX_X, WORLD_MIN_X};

#[derive(Debug, Clone, Copy)]
pub struct Camera {
    x: Subpixel,
}

impl Camera {
    pub fn new(x: Subpixel) -> Self {
        let mut cam = Camera { x };
        cam.clamp();
        cam
    }

    pub fn x(&self) -> Subpixel {
        self.x
    }

    /// Retarget from the tracked aircraft's world x. The overshoot past a
    /// trigger edge is applied verbatim (no smoothing), then the camera is
    /// clamped to the world so the window never shows past either wall.
    ///
    /// The caller must only invoke this while the aircraft is controllable;
    /// the camera holds still through a crash.
    pub fn advance(&mut self, tracked_x: Subpixel, t: &Tunables) {
        let left = Subpixel::from_px(t.scroll_trigger_left);
        let right = Subpixel::from_px(t.scroll_trigger_right);
        let rel = tracked_x - self.x;

        if rel > right {
            self.x += rel - right;
        } else if rel < left {
            self.x += rel - left; // negative overshoot
        }
        self.clamp();
    }

    fn clamp(&mut self) {
        let max = WORLD_MAX_X - Subpixel::from_px(SCREEN_W);
        self.x = self.x.clamp(WORLD_MIN_X, max);
    }
}
