//! Enemy Ground Vehicles
//!
//! Tanks fielded by strongholds. A tank creeps toward the aircraft, holds
//! at standoff range, points its turret by relative bearing and lobs
//! ballistic shells using a 5-entry elevation table indexed by the slope
//! ratio to the target. Shells fly under gravity; on the way down they
//! also kill any exposed captive they pass through, so careless baiting
//! near a rescue queue gets people killed.

use super::aircraft::{Aircraft, AIRCRAFT_HALF_H, AIRCRAFT_HALF_W};
use super::captive::{Captive, CAPTIVE_SLOTS};
use super::collision::{point_hits, span_hits, HalfBox};
use super::config::Tunables;
use super::events::{Cue, Effect, Effects};
use super::fixed::{on_screen, Subpixel, GROUND_Y, WORLD_MIN_X};
use super::fx::FxPools;
use super::pool::{Pool, Slot};
use super::stronghold::Stronghold;

pub const VEHICLE_SLOTS: usize = 2;
pub const SHELL_SLOTS: usize = 2;
pub const VEHICLE_HALF_W: i32 = 12;
pub const VEHICLE_HALF_H: i32 = 8;

/// Standoff distance; closer than this the tank stops and shoots.
const STANDOFF_PX: i32 = 80;
/// Maximum firing range.
const FIRE_RANGE_PX: i32 = 240;
/// Turret swings to a side pose past this bearing offset.
const TURRET_SWING_PX: i32 = 20;

/// Muzzle velocity table, subpixels per tick, scaled by
/// `shell_velocity_factor`. Entry 0 is straight up, entry 4 near flat.
const AIM_VX: [i32; 5] = [0, 11, 23, 29, 32];
const AIM_VY: [i32; 5] = [-32, -30, -23, -13, -5];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurretPose {
    Left,
    Up,
    Right,
}

#[derive(Debug)]
pub struct Vehicle {
    pub active: bool,
    pub x: Subpixel,
    pub stronghold_id: usize,
    pub health: u32,
    pub turret: TurretPose,
    pub fire_cooldown: u32,
    offscreen_ticks: u32,
}

impl Default for Vehicle {
    fn default() -> Self {
        Self {
            active: false,
            x: Subpixel::ZERO,
            stronghold_id: 0,
            health: 0,
            turret: TurretPose::Up,
            fire_cooldown: 0,
            offscreen_ticks: 0,
        }
    }
}

impl Slot for Vehicle {
    fn is_free(&self) -> bool {
        !self.active
    }
}

impl Vehicle {
    pub fn x_px(&self) -> i32 {
        self.x.to_px()
    }

    pub fn center_y_px(&self) -> i32 {
        GROUND_Y.to_px() - VEHICLE_HALF_H
    }

    pub fn center_px(&self) -> (i32, i32) {
        (self.x_px(), self.center_y_px())
    }

    /// Turret pose index for the sprite sheet: 0 left, 1 up, 2 right.
    pub fn frame(&self) -> u16 {
        match self.turret {
            TurretPose::Left => 0,
            TurretPose::Up => 1,
            TurretPose::Right => 2,
        }
    }
}

#[derive(Debug, Default)]
pub struct Shell {
    pub active: bool,
    pub x: Subpixel,
    pub y: Subpixel,
    pub vx: Subpixel,
    pub vy: Subpixel,
    offscreen_ticks: u32,
}

impl Slot for Shell {
    fn is_free(&self) -> bool {
        !self.active
    }
}

/// Elevation table index for a target `dx` across and `dy` up. Thresholds
/// are the midpoints between adjacent table entries' vx/vy slopes, in
/// sixteenths.
fn aim_index(dx: i32, dy: i32) -> usize {
    let ratio = dx * 16 / dy.max(1);
    match ratio {
        r if r < 3 => 0,
        r if r < 11 => 1,
        r if r < 26 => 2,
        r if r < 69 => 3,
        _ => 4,
    }
}

/// Spawn vehicles for strongholds that are in range with inventory, then
/// drive, aim and fire the fielded ones. Destruction is handled by the
/// effect-application pass, not here.
pub fn update_vehicles(
    vehicles: &mut Pool<Vehicle, VEHICLE_SLOTS>,
    shells: &mut Pool<Shell, SHELL_SLOTS>,
    strongholds: &mut [Stronghold],
    aircraft: &Aircraft,
    camera_px: i32,
    effects: &mut Effects,
    t: &Tunables,
) {
    for (id, stronghold) in strongholds.iter_mut().enumerate() {
        if !stronghold.wants_vehicle(camera_px, super::fixed::SCREEN_W, t.vehicle_spawn_range) {
            continue;
        }
        let Some(idx) = vehicles.allocate() else { break };
        stronghold.confirm_vehicle_spawn();
        let v = &mut vehicles[idx];
        v.active = true;
        v.x = Subpixel::from_px(stronghold.x + VEHICLE_HALF_W * 2);
        v.stronghold_id = id;
        v.health = t.vehicle_health;
        v.turret = TurretPose::Up;
        v.fire_cooldown = t.vehicle_fire_cooldown;
        v.offscreen_ticks = 0;
    }

    for idx in 0..vehicles.capacity() {
        if vehicles[idx].is_free() {
            continue;
        }
        let dx = aircraft.x_px() - vehicles[idx].x_px();

        {
            let vehicle = &mut vehicles[idx];

            // Creep toward the aircraft, hold at standoff, never roll into
            // the home zone.
            if dx.abs() > STANDOFF_PX {
                vehicle.x += Subpixel(dx.signum() * t.vehicle_speed_subpx);
            }
            let max_x = Subpixel::from_px(t.home_zone_x - VEHICLE_HALF_W);
            vehicle.x = vehicle.x.clamp(WORLD_MIN_X, max_x);

            vehicle.turret = if dx > TURRET_SWING_PX {
                TurretPose::Right
            } else if dx < -TURRET_SWING_PX {
                TurretPose::Left
            } else {
                TurretPose::Up
            };

            if vehicle.fire_cooldown > 0 {
                vehicle.fire_cooldown -= 1;
            }
        }

        let dx = aircraft.x_px() - vehicles[idx].x_px();
        let ready = vehicles[idx].fire_cooldown == 0;
        if ready && dx.abs() < FIRE_RANGE_PX && aircraft.alive() {
            if let Some(s) = shells.allocate() {
                let muzzle_y = vehicles[idx].center_y_px() - VEHICLE_HALF_H;
                let dy = vehicles[idx].center_y_px() - aircraft.y_px();
                let i = aim_index(dx.abs(), dy);
                let shell = &mut shells[s];
                shell.active = true;
                shell.x = vehicles[idx].x;
                shell.y = Subpixel::from_px(muzzle_y);
                shell.vx = Subpixel(dx.signum() * AIM_VX[i] * t.shell_velocity_factor);
                shell.vy = Subpixel(AIM_VY[i] * t.shell_velocity_factor);
                shell.offscreen_ticks = 0;
                vehicles[idx].fire_cooldown = t.vehicle_fire_cooldown;
                effects.cues.send(Cue::EnemyFire);
            }
        }

        // Stale recycling: a vehicle the camera has left behind for long
        // enough returns to its stronghold's inventory.
        let screen_x = vehicles[idx].x_px() - camera_px;
        if on_screen(screen_x, VEHICLE_HALF_W * 2) {
            vehicles[idx].offscreen_ticks = 0;
        } else {
            vehicles[idx].offscreen_ticks += 1;
            if vehicles[idx].offscreen_ticks >= t.stale_ticks {
                strongholds[vehicles[idx].stronghold_id].vehicle_recycled();
                vehicles.free(idx);
            }
        }
    }
}

/// Ballistic shell pass: gravity, aircraft hit, the cruelty check against
/// exposed captives, ground burst. First match wins; a shell that hits
/// never also ground- or bounds-checks this tick.
pub fn update_shells(
    shells: &mut Pool<Shell, SHELL_SLOTS>,
    aircraft: &Aircraft,
    captives: &Pool<Captive, CAPTIVE_SLOTS>,
    camera_px: i32,
    effects: &mut Effects,
    fx: &mut FxPools,
    t: &Tunables,
) {
    for idx in 0..shells.capacity() {
        if shells[idx].is_free() {
            continue;
        }
        let (p, shell_y) = {
            let shell = &mut shells[idx];
            shell.x += shell.vx;
            shell.vy += Subpixel(t.shell_gravity_subpx);
            shell.y += shell.vy;
            ((shell.x.to_px(), shell.y.to_px()), shell.y)
        };

        if aircraft.alive()
            && point_hits(
                p,
                (aircraft.x_px(), aircraft.y_px()),
                HalfBox::new(AIRCRAFT_HALF_W, AIRCRAFT_HALF_H),
            )
        {
            effects.hits.send(Effect::KillAircraft);
            shells.free(idx);
            continue;
        }

        let mut hit = false;
        for (slot, captive) in captives.iter_alive() {
            if captive.exposed() && span_hits(p.0, captive.x_px(), t.captive_half_width) {
                // Vertical reach: only a shell down at body height connects.
                if (p.1 - captive.center_y_px()).abs() < super::captive::CAPTIVE_HALF_H {
                    effects.hits.send(Effect::KillCaptive { slot });
                    hit = true;
                    break;
                }
            }
        }
        if hit {
            shells.free(idx);
            continue;
        }

        if shell_y >= GROUND_Y {
            fx.spawn_small(shells[idx].x, GROUND_Y);
            effects.cues.send(Cue::SmallBlast);
            shells.free(idx);
            continue;
        }

        let screen_x = p.0 - camera_px;
        if on_screen(screen_x, 4) {
            shells[idx].offscreen_ticks = 0;
        } else {
            shells[idx].offscreen_ticks += 1;
            if shells[idx].offscreen_ticks >= t.stale_ticks {
                shells.free(idx);
            }
        }
    }
}
