//! Enemy Fighter Jet
//!
//! Punishes a passive player. Once enough captives have been released and
//! the aircraft is away from the home safety line, two loiter clocks run:
//! one while the aircraft sits on the ground, one while it hangs at high
//! altitude. Past the threshold each tick rolls a small launch chance;
//! the ground clock sends a bomber, the air clock a strafer. The jet
//! enters from off-screen at speed, makes one attack pass, then climbs
//! away and despawns at the screen edge.

use rand::rngs::StdRng;
use rand::Rng;

use super::aircraft::Aircraft;
use super::collision::{point_hits, HalfBox};
use super::config::Tunables;
use super::events::{Cue, Effect, Effects};
use super::fixed::{on_screen, Subpixel, CEILING_Y, GROUND_Y, SCREEN_W};
use super::fx::FxPools;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JetState {
    Idle,
    Strafing { fired: bool },
    Bombing { dropped: bool },
    Leaving,
}

#[derive(Debug, Default)]
pub struct JetRound {
    pub active: bool,
    pub x: Subpixel,
    pub y: Subpixel,
    pub vx: Subpixel,
}

#[derive(Debug, Default)]
pub struct JetBomb {
    pub active: bool,
    pub x: Subpixel,
    pub y: Subpixel,
    pub vx: Subpixel,
    pub vy: Subpixel,
}

#[derive(Debug)]
pub struct Jet {
    pub state: JetState,
    pub x: Subpixel,
    pub y: Subpixel,
    /// Travel direction of the current pass.
    pub dir: i32,
    pub round: JetRound,
    pub bomb: JetBomb,
    ground_loiter: u32,
    air_loiter: u32,
}

impl Jet {
    pub fn new() -> Self {
        Self {
            state: JetState::Idle,
            x: Subpixel::ZERO,
            y: Subpixel::ZERO,
            dir: 1,
            round: JetRound::default(),
            bomb: JetBomb::default(),
            ground_loiter: 0,
            air_loiter: 0,
        }
    }

    pub fn x_px(&self) -> i32 {
        self.x.to_px()
    }

    pub fn y_px(&self) -> i32 {
        self.y.to_px()
    }

    pub fn flying(&self) -> bool {
        self.state != JetState::Idle
    }

    /// Round-scan target center while airborne.
    pub fn shot_center(&self) -> Option<(i32, i32)> {
        if self.flying() {
            Some((self.x_px(), self.y_px()))
        } else {
            None
        }
    }

    /// Applied from the effect queue when the player's round connects.
    /// The in-flight weapon, if any, keeps flying.
    pub fn shoot_down(&mut self) {
        if self.flying() {
            self.state = JetState::Idle;
            self.ground_loiter = 0;
            self.air_loiter = 0;
        }
    }

    fn launch(&mut self, state: JetState, altitude_px: i32, aircraft: &Aircraft, camera_px: i32) {
        // Enter from whichever screen edge puts the attack run toward the
        // aircraft, with a margin so the entry itself is off-screen.
        let from_left = aircraft.x_px() - camera_px > SCREEN_W / 2;
        if from_left {
            self.dir = 1;
            self.x = Subpixel::from_px(camera_px - 40);
        } else {
            self.dir = -1;
            self.x = Subpixel::from_px(camera_px + SCREEN_W + 40);
        }
        self.y = Subpixel::from_px(altitude_px);
        self.state = state;
        self.ground_loiter = 0;
        self.air_loiter = 0;
    }
}

impl Default for Jet {
    fn default() -> Self {
        Self::new()
    }
}

pub fn update_jet(
    jet: &mut Jet,
    aircraft: &Aircraft,
    captives_spawned: u32,
    camera_px: i32,
    effects: &mut Effects,
    fx: &mut FxPools,
    rng: &mut StdRng,
    t: &Tunables,
) {
    match jet.state {
        JetState::Idle => {
            let hunting = captives_spawned >= t.jet_progress_gate
                && aircraft.alive()
                && aircraft.x_px() < t.home_zone_x;
            if !hunting {
                jet.ground_loiter = 0;
                jet.air_loiter = 0;
            } else {
                if aircraft.landed() {
                    jet.ground_loiter += 1;
                } else {
                    jet.ground_loiter = 0;
                }
                let high = aircraft.y_px() < GROUND_Y.to_px() - t.jet_high_altitude;
                if high {
                    jet.air_loiter += 1;
                } else {
                    jet.air_loiter = 0;
                }

                if jet.ground_loiter > t.jet_ground_loiter
                    && rng.gen_range(0..100) < t.jet_launch_chance
                {
                    jet.launch(
                        JetState::Bombing { dropped: false },
                        CEILING_Y.to_px() + 16,
                        aircraft,
                        camera_px,
                    );
                } else if jet.air_loiter > t.jet_air_loiter
                    && rng.gen_range(0..100) < t.jet_launch_chance
                {
                    jet.launch(
                        JetState::Strafing { fired: false },
                        aircraft.y_px(),
                        aircraft,
                        camera_px,
                    );
                }
            }
        }

        JetState::Strafing { fired } => {
            jet.x += Subpixel::from_px(jet.dir * t.jet_speed);
            let ahead = (aircraft.x_px() - jet.x_px()) * jet.dir;
            if !fired && ahead >= 0 && ahead < t.jet_strafe_range {
                jet.round.active = true;
                jet.round.x = jet.x;
                jet.round.y = jet.y;
                jet.round.vx = Subpixel::from_px(jet.dir * t.jet_round_speed);
                effects.cues.send(Cue::EnemyFire);
                jet.state = JetState::Leaving;
            } else if ahead < 0 {
                jet.state = JetState::Leaving;
            }
        }

        JetState::Bombing { dropped } => {
            jet.x += Subpixel::from_px(jet.dir * t.jet_speed);
            let ahead = (aircraft.x_px() - jet.x_px()) * jet.dir;
            let window = (t.jet_bomb_lead - t.jet_bomb_window)
                ..=(t.jet_bomb_lead + t.jet_bomb_window);
            if !dropped && window.contains(&ahead) {
                jet.bomb.active = true;
                jet.bomb.x = jet.x;
                jet.bomb.y = jet.y;
                jet.bomb.vx = Subpixel::from_px(jet.dir * t.jet_speed);
                jet.bomb.vy = Subpixel::ZERO;
                effects.cues.send(Cue::BombDrop);
                jet.state = JetState::Leaving;
            } else if ahead < t.jet_bomb_lead - t.jet_bomb_window {
                // Overshot the release window; give up the pass.
                jet.state = JetState::Leaving;
            }
        }

        JetState::Leaving => {
            jet.x += Subpixel::from_px(jet.dir * t.jet_speed);
            jet.y = (jet.y - Subpixel::from_px(t.jet_climb)).max(CEILING_Y);
            if !on_screen(jet.x_px() - camera_px, t.jet_half_w * 4) {
                jet.state = JetState::Idle;
            }
        }
    }

    // Weapons fly on independent of the airframe that released them.
    if jet.round.active {
        jet.round.x += jet.round.vx;
        let p = (jet.round.x.to_px(), jet.round.y.to_px());
        if aircraft.alive()
            && point_hits(
                p,
                (aircraft.x_px(), aircraft.y_px()),
                HalfBox::square(t.jet_weapon_half_box),
            )
        {
            effects.hits.send(Effect::KillAircraft);
            jet.round.active = false;
        } else if !on_screen(p.0 - camera_px, 4) {
            jet.round.active = false;
        }
    }

    if jet.bomb.active {
        jet.bomb.x += jet.bomb.vx;
        jet.bomb.vy += Subpixel(t.shell_gravity_subpx);
        jet.bomb.y += jet.bomb.vy;
        let p = (jet.bomb.x.to_px(), jet.bomb.y.to_px());
        if aircraft.alive()
            && point_hits(
                p,
                (aircraft.x_px(), aircraft.y_px()),
                HalfBox::square(t.jet_weapon_half_box),
            )
        {
            effects.hits.send(Effect::KillAircraft);
            jet.bomb.active = false;
        } else if jet.bomb.y >= GROUND_Y {
            fx.spawn_small(jet.bomb.x, GROUND_Y);
            effects.cues.send(Cue::SmallBlast);
            jet.bomb.active = false;
        }
    }
}
