//! Captive Rescue State Machine
//!
//! The richest actor in the simulation. A captive spawns from a breached
//! stronghold, runs to the aircraft when it is landed nearby (otherwise
//! mills about a wander point), boards, rides, gets dropped off in the
//! home zone, runs to the base, and either despawns as rescued or stays to
//! wave if it was the last one out of the cabin.
//!
//! Death is two-step: any kill path sets `Dying` and the slot is reaped at
//! the top of the next pass. The killing frame can therefore still read
//! the old position for the death puff without racing slot reuse.

use rand::rngs::StdRng;
use rand::Rng;

use super::aircraft::Aircraft;
use super::config::Tunables;
use super::events::{Cue, Effects};
use super::fixed::{Subpixel, GROUND_Y, WORLD_MAX_X, WORLD_MIN_X};
use super::fx::FxPools;
use super::pool::{Pool, Slot};
use super::stronghold::Stronghold;
use super::Counters;

pub const CAPTIVE_SLOTS: usize = 16;
/// Sprite is 8x16; center sits half a height above the ground line.
pub const CAPTIVE_HALF_H: i32 = 8;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CaptiveState {
    #[default]
    Inactive,
    RunningToAircraft,
    /// Climbing into the cabin; hidden, brief, uninterruptible.
    Boarding { timer: u32 },
    OnBoard,
    RunningHome,
    Waving { timer: u32 },
    /// Set by any kill path; reaped on the next pass.
    Dying,
}

#[derive(Debug, Default)]
pub struct Captive {
    pub state: CaptiveState,
    pub x: Subpixel,
    /// Facing: -1 left, 1 right, 0 standing.
    pub dir: i32,
    pub stronghold_id: usize,
    /// Dropped off last; will wave at the base instead of despawning.
    pub last_off: bool,
    wander_x: i32,
    anim_frame: u16,
    anim_timer: u32,
}

impl Slot for Captive {
    fn is_free(&self) -> bool {
        self.state == CaptiveState::Inactive
    }
}

impl Captive {
    /// On foot and outdoors: the states subject to crush, gunfire and
    /// shell splash. Boarded and boarding captives are inside the
    /// aircraft and untouchable.
    pub fn exposed(&self) -> bool {
        matches!(
            self.state,
            CaptiveState::RunningToAircraft | CaptiveState::RunningHome | CaptiveState::Waving { .. }
        )
    }

    pub fn visible(&self) -> bool {
        self.exposed() || self.state == CaptiveState::Dying
    }

    pub fn x_px(&self) -> i32 {
        self.x.to_px()
    }

    pub fn center_y_px(&self) -> i32 {
        GROUND_Y.to_px() - CAPTIVE_HALF_H
    }

    /// Kill if killable. Silently ignores invulnerable states, so a stale
    /// queued effect against a recycled or boarded slot is a no-op.
    pub fn kill(&mut self) {
        if self.exposed() {
            self.state = CaptiveState::Dying;
        }
    }

    /// 0-2 running right, 3-5 running left, 6-7 waving, 8-9 standing.
    pub fn frame(&self) -> u16 {
        match self.state {
            CaptiveState::Waving { .. } => 6 + self.anim_frame % 2,
            _ if self.dir > 0 => self.anim_frame % 3,
            _ if self.dir < 0 => 3 + self.anim_frame % 3,
            _ => 8 + self.anim_frame % 2,
        }
    }

    fn step_anim(&mut self) {
        self.anim_timer += 1;
        if self.anim_timer >= 6 {
            self.anim_timer = 0;
            self.anim_frame = self.anim_frame.wrapping_add(1);
        }
    }

    fn stand(&mut self) {
        self.dir = 0;
        self.step_anim();
    }
}

fn roll_wander(door_x: i32, rng: &mut StdRng, t: &Tunables) -> i32 {
    door_x + rng.gen_range(-t.wander_radius..=t.wander_radius)
}

/// Attempt a spawn at a stronghold door. Fails (and the stronghold's timer
/// stays armed) when the pool is saturated or another captive is standing
/// in the doorway.
pub fn try_spawn(
    pool: &mut Pool<Captive, CAPTIVE_SLOTS>,
    stronghold_id: usize,
    door_x: i32,
    rng: &mut StdRng,
    t: &Tunables,
) -> bool {
    let door_blocked = pool.iter_alive().any(|(_, c)| {
        c.exposed() && (c.x_px() - door_x).abs() < t.door_clearance
    });
    if door_blocked {
        return false;
    }
    let Some(idx) = pool.allocate() else {
        return false;
    };
    let captive = &mut pool[idx];
    captive.state = CaptiveState::RunningToAircraft;
    captive.x = Subpixel::from_px(door_x);
    captive.dir = 0;
    captive.stronghold_id = stronghold_id;
    captive.last_off = false;
    captive.wander_x = roll_wander(door_x, rng, t);
    captive.anim_frame = 0;
    captive.anim_timer = 0;
    true
}

/// Another walker strictly ahead within the minimum gap suppresses this
/// tick's step. Lower index wins ties because the pass runs left-to-right
/// over the pool.
fn move_blocked(pool: &Pool<Captive, CAPTIVE_SLOTS>, self_idx: usize, from_x: i32, dir: i32, t: &Tunables) -> bool {
    pool.iter_alive().any(|(j, other)| {
        j != self_idx
            && other.exposed()
            && (other.x_px() - from_x).signum() == dir
            && (other.x_px() - from_x).abs() < t.captive_spacing
    })
}

/// The whole per-tick captive pass: reap, crush, move, board, wave.
/// `climbing` is this tick's climb input; an actively departing aircraft
/// never crushes.
pub fn update_captives(
    pool: &mut Pool<Captive, CAPTIVE_SLOTS>,
    strongholds: &[Stronghold],
    aircraft: &Aircraft,
    climbing: bool,
    counters: &mut Counters,
    effects: &mut Effects,
    fx: &mut FxPools,
    rng: &mut StdRng,
    t: &Tunables,
) {
    // Reap last tick's deaths first so their slots are reusable below.
    for i in 0..pool.capacity() {
        if pool[i].state == CaptiveState::Dying {
            let (x, y) = (pool[i].x, Subpixel::from_px(pool[i].center_y_px()));
            counters.lost += 1;
            effects.cues.send(Cue::CaptiveLost);
            fx.spawn_small(x, y);
            pool.free(i);
        }
    }

    // Crush check, before movement so nobody dodges out of the zone the
    // same tick it forms.
    let hovering_low = aircraft.alive()
        && !aircraft.landed()
        && !climbing
        && GROUND_Y.to_px() - aircraft.bottom_px() <= t.crush_altitude_band;
    if hovering_low {
        let half = aircraft.crush_half_width(t);
        let air_x = aircraft.x_px();
        for (_, captive) in pool.iter_alive_mut() {
            if captive.exposed() && (air_x - captive.x_px()).abs() < half {
                captive.state = CaptiveState::Dying;
            }
        }
    }

    for i in 0..pool.capacity() {
        match pool[i].state {
            CaptiveState::RunningToAircraft => {
                let x_px = pool[i].x_px();
                let dx_air = aircraft.x_px() - x_px;
                let chasing =
                    aircraft.landed() && dx_air.abs() < t.sight_range;

                if chasing && dx_air.abs() < t.boarding_radius {
                    pool[i].state = CaptiveState::Boarding {
                        timer: t.boarding_ticks,
                    };
                    continue;
                }

                let target = if chasing { aircraft.x_px() } else { pool[i].wander_x };
                let dx = target - x_px;
                if dx == 0 {
                    if !chasing {
                        let door_x = strongholds[pool[i].stronghold_id].x;
                        pool[i].wander_x = roll_wander(door_x, rng, t);
                    }
                    pool[i].stand();
                    continue;
                }
                let dir = dx.signum();
                if move_blocked(pool, i, x_px, dir, t) {
                    // A wanderer walking into another walker gives up on
                    // that target; otherwise two wanderers heading at each
                    // other would suppress one another forever and clog
                    // the doorway.
                    if !chasing {
                        let door_x = strongholds[pool[i].stronghold_id].x;
                        pool[i].wander_x = roll_wander(door_x, rng, t);
                    }
                    pool[i].dir = dir;
                    pool[i].step_anim();
                    continue;
                }
                let step = dx.abs().min(t.captive_speed) * dir;
                pool[i].x += Subpixel::from_px(step);
                pool[i].x = pool[i].x.clamp(WORLD_MIN_X, WORLD_MAX_X);
                pool[i].dir = dir;
                pool[i].step_anim();
            }

            CaptiveState::Boarding { timer } => {
                if timer > 1 {
                    pool[i].state = CaptiveState::Boarding { timer: timer - 1 };
                } else {
                    pool[i].state = CaptiveState::OnBoard;
                    counters.aboard += 1;
                    effects.cues.send(Cue::Rescue);
                }
            }

            CaptiveState::RunningHome => {
                let x_px = pool[i].x_px();
                let dx = t.home_base_x - x_px;
                if dx == 0 {
                    if pool[i].last_off {
                        pool[i].state = CaptiveState::Waving {
                            timer: t.wave_duration,
                        };
                        pool[i].dir = 0;
                    } else {
                        counters.rescued += 1;
                        effects.cues.send(Cue::Rescue);
                        pool.free(i);
                    }
                    continue;
                }
                let dir = dx.signum();
                if move_blocked(pool, i, x_px, dir, t) {
                    pool[i].dir = dir;
                    pool[i].step_anim();
                    continue;
                }
                let step = dx.abs().min(t.captive_speed) * dir;
                pool[i].x += Subpixel::from_px(step);
                pool[i].dir = dir;
                pool[i].step_anim();
            }

            CaptiveState::Waving { timer } => {
                if timer > 1 {
                    pool[i].state = CaptiveState::Waving { timer: timer - 1 };
                    pool[i].step_anim();
                } else {
                    counters.rescued += 1;
                    effects.cues.send(Cue::Rescue);
                    pool.free(i);
                }
            }

            CaptiveState::Inactive | CaptiveState::OnBoard | CaptiveState::Dying => {}
        }
    }
}

/// Drop-off: while landed in the home zone with passengers, release one
/// `OnBoard` captive per interval at the aircraft's position. The final
/// one out is flagged to wave at the base.
pub fn dropoff(
    pool: &mut Pool<Captive, CAPTIVE_SLOTS>,
    aircraft: &Aircraft,
    counters: &mut Counters,
    timer: &mut u32,
    t: &Tunables,
) {
    let dropping =
        aircraft.landed() && aircraft.x_px() >= t.home_zone_x && counters.aboard > 0;
    if !dropping {
        *timer = 0;
        return;
    }
    *timer += 1;
    if *timer < t.dropoff_interval {
        return;
    }
    *timer = 0;
    let Some(i) = (0..pool.capacity()).find(|&i| pool[i].state == CaptiveState::OnBoard)
    else {
        return;
    };
    pool[i].state = CaptiveState::RunningHome;
    pool[i].x = aircraft.x;
    counters.aboard -= 1;
    pool[i].last_off = counters.aboard == 0;
}
