//! Explosion Effect Pools
//!
//! Purely visual, but the slots still obey the pool contract: a finished
//! animation frees its slot the tick it expires, and a saturated pool
//! silently drops the newest request rather than growing.

use super::fixed::Subpixel;
use super::pool::{Pool, Slot};

/// One explosion animation. Small blasts run 4 frames at 4 ticks each,
/// the large crash blast 5 frames at 8 ticks.
#[derive(Debug, Default)]
pub struct Blast {
    pub active: bool,
    pub x: Subpixel,
    pub y: Subpixel,
    pub frame: u16,
    timer: u32,
    total_frames: u16,
    cadence: u32,
}

impl Slot for Blast {
    fn is_free(&self) -> bool {
        !self.active
    }
}

impl Blast {
    fn start(&mut self, x: Subpixel, y: Subpixel, total_frames: u16, cadence: u32) {
        self.active = true;
        self.x = x;
        self.y = y;
        self.frame = 0;
        self.timer = cadence;
        self.total_frames = total_frames;
        self.cadence = cadence;
    }

    /// Returns false once the animation has run out.
    fn advance(&mut self) -> bool {
        self.timer -= 1;
        if self.timer == 0 {
            self.frame += 1;
            if self.frame >= self.total_frames {
                return false;
            }
            self.timer = self.cadence;
        }
        true
    }
}

#[derive(Debug, Default)]
pub struct FxPools {
    pub small: Pool<Blast, 4>,
    pub large: Pool<Blast, 1>,
}

impl FxPools {
    pub fn new() -> Self {
        Self::default()
    }

    /// 8x8 puff for captive and shell deaths. Dropped if the pool is full.
    pub fn spawn_small(&mut self, x: Subpixel, y: Subpixel) {
        if let Some(idx) = self.small.allocate() {
            self.small[idx].start(x, y, 4, 4);
        }
    }

    /// 32x16 blast for vehicle, aircraft and stronghold kills.
    pub fn spawn_large(&mut self, x: Subpixel, y: Subpixel) {
        if let Some(idx) = self.large.allocate() {
            self.large[idx].start(x, y, 5, 8);
        }
    }

    pub fn tick(&mut self) {
        for pool_slots in [self.small.as_mut_slice(), self.large.as_mut_slice()] {
            for blast in pool_slots.iter_mut().filter(|b| b.active) {
                if !blast.advance() {
                    blast.reset();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_blast_expires_after_16_ticks() {
        let mut fx = FxPools::new();
        fx.spawn_small(Subpixel::from_px(100), Subpixel::from_px(180));
        for _ in 0..15 {
            fx.tick();
            assert_eq!(fx.small.alive_count(), 1);
        }
        fx.tick();
        assert_eq!(fx.small.alive_count(), 0);
    }

    #[test]
    fn test_large_blast_frame_cadence() {
        let mut fx = FxPools::new();
        fx.spawn_large(Subpixel::ZERO, Subpixel::ZERO);
        for _ in 0..8 {
            fx.tick();
        }
        assert_eq!(fx.large[0].frame, 1);
        for _ in 0..8 {
            fx.tick();
        }
        assert_eq!(fx.large[0].frame, 2);
    }

    #[test]
    fn test_saturated_pool_drops_request() {
        let mut fx = FxPools::new();
        for i in 0..6 {
            fx.spawn_small(Subpixel::from_px(i), Subpixel::ZERO);
        }
        assert_eq!(fx.small.alive_count(), 4);
    }
}
