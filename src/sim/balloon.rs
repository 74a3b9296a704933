//! Barrage Balloon
//!
//! A drifting hazard that homes on the aircraft one pixel a tick. It is
//! released at the midpoint between the frontier stronghold pair once the
//! rescue has progressed far enough (16, 32, then 48 captives released),
//! and only while that midpoint is off-screen so it never pops into view.
//! It will not cross the home safety line and keeps a fixed clearance off
//! the ground. Shot, it falls; rammed, it takes the aircraft with it.

use super::aircraft::Aircraft;
use super::collision::{point_hits, HalfBox};
use super::config::Tunables;
use super::events::{Cue, Effect, Effects};
use super::fixed::{on_screen, Subpixel, CEILING_Y, GROUND_Y};
use super::fx::FxPools;
use super::stronghold::Stronghold;

pub const BALLOON_HALF_W: i32 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalloonState {
    /// Not aloft; timer counts down to the next release attempt.
    Waiting { timer: u32 },
    Drifting,
    /// Shot; falling out of the sky, no longer a valid round target.
    Falling,
}

#[derive(Debug)]
pub struct Balloon {
    pub state: BalloonState,
    pub x: Subpixel,
    pub y: Subpixel,
    gate_idx: usize,
}

impl Balloon {
    pub fn new() -> Self {
        Self {
            state: BalloonState::Waiting { timer: 0 },
            x: Subpixel::ZERO,
            y: Subpixel::ZERO,
            gate_idx: 0,
        }
    }

    pub fn x_px(&self) -> i32 {
        self.x.to_px()
    }

    pub fn y_px(&self) -> i32 {
        self.y.to_px()
    }

    /// Round-scan target center, only while drifting.
    pub fn shot_center(&self) -> Option<(i32, i32)> {
        match self.state {
            BalloonState::Drifting => Some((self.x_px(), self.y_px())),
            _ => None,
        }
    }

    pub fn visible(&self) -> bool {
        !matches!(self.state, BalloonState::Waiting { .. })
    }

    /// Applied from the effect queue when a round connects.
    pub fn shoot_down(&mut self) {
        if self.state == BalloonState::Drifting {
            self.state = BalloonState::Falling;
        }
    }
}

impl Default for Balloon {
    fn default() -> Self {
        Self::new()
    }
}

pub fn update_balloon(
    balloon: &mut Balloon,
    aircraft: &Aircraft,
    strongholds: &[Stronghold],
    captives_spawned: u32,
    camera_px: i32,
    effects: &mut Effects,
    fx: &mut FxPools,
    t: &Tunables,
) {
    match balloon.state {
        BalloonState::Waiting { timer } => {
            if timer > 0 {
                balloon.state = BalloonState::Waiting { timer: timer - 1 };
                return;
            }
            let gate = t.balloon_gates[balloon.gate_idx.min(2)];
            if captives_spawned < gate {
                return;
            }
            // Midpoint between the frontier stronghold pair for this gate.
            let pair = balloon.gate_idx.min(2);
            let mid = (strongholds[pair].x + strongholds[pair + 1].x) / 2;
            if on_screen(mid - camera_px, BALLOON_HALF_W * 2) {
                return;
            }
            balloon.x = Subpixel::from_px(mid);
            balloon.y = Subpixel::from_px((CEILING_Y.to_px() + GROUND_Y.to_px()) / 2);
            balloon.gate_idx += 1;
            balloon.state = BalloonState::Drifting;
        }

        BalloonState::Drifting => {
            if aircraft.alive() {
                let dx = aircraft.x_px() - balloon.x_px();
                let dy = aircraft.y_px() - balloon.y_px();
                balloon.x += Subpixel::from_px(dx.signum() * t.balloon_speed);
                balloon.y += Subpixel::from_px(dy.signum() * t.balloon_speed);
            }
            // Never past the home safety line, never below the floor.
            let max_x = Subpixel::from_px(t.home_zone_x - BALLOON_HALF_W);
            balloon.x = balloon.x.min(max_x);
            let floor = GROUND_Y - Subpixel::from_px(t.balloon_floor);
            balloon.y = balloon.y.clamp(CEILING_Y, floor);

            if aircraft.alive()
                && point_hits(
                    (aircraft.x_px(), aircraft.y_px()),
                    (balloon.x_px(), balloon.y_px()),
                    HalfBox::new(t.balloon_ram_half_w, t.balloon_ram_half_h),
                )
            {
                effects.hits.send(Effect::KillAircraft);
                balloon.state = BalloonState::Falling;
            }
        }

        BalloonState::Falling => {
            balloon.y += Subpixel::from_px(2);
            if balloon.y >= GROUND_Y {
                fx.spawn_small(balloon.x, GROUND_Y);
                effects.cues.send(Cue::SmallBlast);
                balloon.state = BalloonState::Waiting {
                    timer: t.balloon_respawn,
                };
            }
        }
    }
}
