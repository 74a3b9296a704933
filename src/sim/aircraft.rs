//! Player aircraft
//!
//! Heading changes are not instant: holding a turn key toward the opposite
//! side steps the heading one notch (through center) every `turn_duration`
//! ticks. Thrust only applies when the key matches the current heading, so
//! the craft keeps drifting on momentum through a turn. Vertical motion is
//! direct-rate: climb, dive, or a slow idle sink when neither is held.

use super::config::Tunables;
use super::fixed::{Subpixel, CEILING_Y, GROUND_Y, WORLD_MAX_X, WORLD_MIN_X};

/// Half-extents of the aircraft body in pixels.
pub const AIRCRAFT_HALF_W: i32 = 16;
pub const AIRCRAFT_HALF_H: i32 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Heading {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AircraftState {
    Alive,
    /// Shot down, spinning toward the ground.
    Crashing,
    /// Wreck cleared, waiting out the respawn delay.
    AwaitingRespawn { timer: u32 },
    /// Out of lives.
    Destroyed,
}

/// Player inputs for one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Intent {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub fire: bool,
    pub drop: bool,
}

#[derive(Debug)]
pub struct Aircraft {
    pub x: Subpixel,
    /// Center y; the bottom rests on the ground line when landed.
    pub y: Subpixel,
    pub vx: Subpixel,
    pub heading: Heading,
    pub state: AircraftState,
    pub lives: u32,
    turn_timer: u32,
    thrusting: bool,
}

impl Aircraft {
    pub fn new(t: &Tunables) -> Self {
        Self {
            x: Subpixel::from_px(t.aircraft_start_x),
            y: GROUND_Y - Subpixel::from_px(AIRCRAFT_HALF_H),
            vx: Subpixel(0),
            heading: Heading::Center,
            state: AircraftState::Alive,
            lives: t.aircraft_lives,
            turn_timer: 0,
            thrusting: false,
        }
    }

    pub fn x_px(&self) -> i32 {
        self.x.to_px()
    }

    pub fn y_px(&self) -> i32 {
        self.y.to_px()
    }

    pub fn bottom_px(&self) -> i32 {
        self.y.to_px() + AIRCRAFT_HALF_H
    }

    pub fn alive(&self) -> bool {
        matches!(self.state, AircraftState::Alive)
    }

    /// The camera only tracks a flyable aircraft.
    pub fn controllable(&self) -> bool {
        self.alive()
    }

    pub fn landed(&self) -> bool {
        self.alive() && self.bottom_px() >= GROUND_Y.to_px() && self.vx.0 == 0
    }

    /// Wide crush footprint while banked; narrow while level.
    pub fn crush_half_width(&self, t: &Tunables) -> i32 {
        match self.heading {
            Heading::Center => t.crush_half_forward,
            _ => t.crush_half_banking,
        }
    }

    /// Shot down. Captive consequences are the caller's business.
    pub fn kill(&mut self) {
        if self.alive() {
            self.state = AircraftState::Crashing;
        }
    }

    /// Advance one tick. Returns true on the tick the wreck strikes the
    /// ground, so the caller can place the explosion.
    pub fn update(&mut self, intent: Intent, t: &Tunables) -> bool {
        match self.state {
            AircraftState::Alive => {
                self.steer(intent, t);
                false
            }
            AircraftState::Crashing => {
                // Spin-fall: momentum bleeds off, altitude drops fast.
                self.vx -= Subpixel(self.vx.signum() * t.friction_subpx.min(self.vx.abs().0));
                self.y += Subpixel(t.dive_subpx);
                if self.bottom_px() >= GROUND_Y.to_px() {
                    self.y = GROUND_Y - Subpixel::from_px(AIRCRAFT_HALF_H);
                    self.lives = self.lives.saturating_sub(1);
                    self.state = AircraftState::AwaitingRespawn {
                        timer: t.respawn_delay,
                    };
                    return true;
                }
                false
            }
            AircraftState::AwaitingRespawn { timer } => {
                if timer > 1 {
                    self.state = AircraftState::AwaitingRespawn { timer: timer - 1 };
                } else if self.lives > 0 {
                    self.respawn(t);
                } else {
                    self.state = AircraftState::Destroyed;
                }
                false
            }
            AircraftState::Destroyed => false,
        }
    }

    fn respawn(&mut self, t: &Tunables) {
        self.x = Subpixel::from_px(t.aircraft_start_x);
        self.y = GROUND_Y - Subpixel::from_px(AIRCRAFT_HALF_H);
        self.vx = Subpixel(0);
        self.heading = Heading::Center;
        self.turn_timer = 0;
        self.state = AircraftState::Alive;
    }

    fn steer(&mut self, intent: Intent, t: &Tunables) {
        // Heading: holding the key away from the current facing winds up
        // the turn timer; each expiry steps one notch through center.
        let want_left = intent.left && !intent.right;
        let want_right = intent.right && !intent.left;
        let turning = (want_left && self.heading != Heading::Left)
            || (want_right && self.heading != Heading::Right);
        if turning {
            self.turn_timer += 1;
            if self.turn_timer >= t.turn_duration {
                self.turn_timer = 0;
                self.heading = match (self.heading, want_left) {
                    (Heading::Right, true) => Heading::Center,
                    (Heading::Center, true) => Heading::Left,
                    (Heading::Left, false) => Heading::Center,
                    (Heading::Center, false) => Heading::Right,
                    (h, _) => h,
                };
            }
        } else {
            self.turn_timer = 0;
        }

        // Thrust only along the current facing; otherwise coast with
        // friction.
        self.thrusting = (want_left && self.heading == Heading::Left)
            || (want_right && self.heading == Heading::Right);
        if self.thrusting {
            let dir = if self.heading == Heading::Left { -1 } else { 1 };
            self.vx += Subpixel(dir * t.accel_subpx);
            self.vx = self.vx.clamp(
                Subpixel(-t.max_speed_subpx),
                Subpixel(t.max_speed_subpx),
            );
        } else if self.vx.0 != 0 {
            let brake = t.friction_subpx.min(self.vx.abs().0);
            self.vx -= Subpixel(self.vx.signum() * brake);
        }

        // Vertical: direct rates, idle sink when airborne.
        if intent.up {
            self.y -= Subpixel(t.climb_subpx);
        } else if intent.down {
            self.y += Subpixel(t.dive_subpx);
        } else if self.bottom_px() < GROUND_Y.to_px() {
            self.y += Subpixel(t.sink_subpx);
        }
        let top_min = CEILING_Y + Subpixel::from_px(AIRCRAFT_HALF_H);
        let bottom_max = GROUND_Y - Subpixel::from_px(AIRCRAFT_HALF_H);
        self.y = self.y.clamp(top_min, bottom_max);

        self.x += self.vx;
        let min_x = WORLD_MIN_X + Subpixel::from_px(AIRCRAFT_HALF_W);
        let max_x = WORLD_MAX_X - Subpixel::from_px(AIRCRAFT_HALF_W);
        if self.x < min_x || self.x > max_x {
            self.x = self.x.clamp(min_x, max_x);
            self.vx = Subpixel(0);
        }
    }

    /// Sprite frame: 0 center, 1-3 left (idle/thrust/brake), 4-6 right,
    /// 7 while crashing.
    pub fn frame(&self) -> u16 {
        if matches!(self.state, AircraftState::Crashing) {
            return 7;
        }
        let braking = !self.thrusting && self.vx.0 != 0;
        match self.heading {
            Heading::Center => 0,
            Heading::Left => {
                if self.thrusting {
                    2
                } else if braking {
                    3
                } else {
                    1
                }
            }
            Heading::Right => {
                if self.thrusting {
                    5
                } else if braking {
                    6
                } else {
                    4
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t() -> Tunables {
        Tunables::default()
    }

    fn held_left() -> Intent {
        Intent { left: true, ..Default::default() }
    }

    #[test]
    fn test_turn_takes_turn_duration_ticks_per_notch() {
        let t = t();
        let mut a = Aircraft::new(&t);
        assert_eq!(a.heading, Heading::Center);
        for _ in 0..t.turn_duration - 1 {
            a.update(held_left(), &t);
            assert_eq!(a.heading, Heading::Center);
        }
        a.update(held_left(), &t);
        assert_eq!(a.heading, Heading::Left);
    }

    #[test]
    fn test_full_turn_passes_through_center() {
        let t = t();
        let mut a = Aircraft::new(&t);
        a.heading = Heading::Right;
        for _ in 0..t.turn_duration {
            a.update(held_left(), &t);
        }
        assert_eq!(a.heading, Heading::Center);
        for _ in 0..t.turn_duration {
            a.update(held_left(), &t);
        }
        assert_eq!(a.heading, Heading::Left);
    }

    #[test]
    fn test_speed_clamped_at_max() {
        let t = t();
        let mut a = Aircraft::new(&t);
        a.heading = Heading::Left;
        a.y = Subpixel::from_px(100);
        for _ in 0..200 {
            a.update(Intent { left: true, up: true, ..Default::default() }, &t);
        }
        assert_eq!(a.vx.0, -t.max_speed_subpx);
    }

    #[test]
    fn test_coasting_bleeds_to_landed() {
        let t = t();
        let mut a = Aircraft::new(&t);
        a.vx = Subpixel(20);
        assert!(!a.landed());
        for _ in 0..30 {
            a.update(Intent::default(), &t);
        }
        assert_eq!(a.vx.0, 0);
        assert!(a.landed());
    }

    #[test]
    fn test_idle_sink_returns_to_ground() {
        let t = t();
        let mut a = Aircraft::new(&t);
        for _ in 0..40 {
            a.update(Intent { up: true, ..Default::default() }, &t);
        }
        assert!(a.bottom_px() < GROUND_Y.to_px());
        for _ in 0..1000 {
            a.update(Intent::default(), &t);
        }
        assert!(a.landed());
    }

    #[test]
    fn test_ceiling_clamp() {
        let t = t();
        let mut a = Aircraft::new(&t);
        for _ in 0..2000 {
            a.update(Intent { up: true, ..Default::default() }, &t);
        }
        assert_eq!(a.y_px(), CEILING_Y.to_px() + AIRCRAFT_HALF_H);
    }

    #[test]
    fn test_crash_lifecycle_respawns_with_one_fewer_life() {
        let t = t();
        let mut a = Aircraft::new(&t);
        a.y = Subpixel::from_px(100);
        a.kill();
        assert!(!a.controllable());

        let mut impact = false;
        for _ in 0..100 {
            if a.update(Intent::default(), &t) {
                impact = true;
                break;
            }
        }
        assert!(impact);
        assert_eq!(a.lives, t.aircraft_lives - 1);

        for _ in 0..=t.respawn_delay {
            a.update(Intent::default(), &t);
        }
        assert!(a.alive());
        assert_eq!(a.x_px(), t.aircraft_start_x);
    }

    #[test]
    fn test_last_life_ends_destroyed() {
        let t = t();
        let mut a = Aircraft::new(&t);
        a.lives = 1;
        a.kill();
        for _ in 0..(t.respawn_delay + 100) {
            a.update(Intent::default(), &t);
        }
        assert_eq!(a.state, AircraftState::Destroyed);
    }

    #[test]
    fn test_crush_width_narrows_when_level() {
        let t = t();
        let mut a = Aircraft::new(&t);
        assert_eq!(a.crush_half_width(&t), t.crush_half_forward);
        a.heading = Heading::Right;
        assert_eq!(a.crush_half_width(&t), t.crush_half_banking);
    }
}
