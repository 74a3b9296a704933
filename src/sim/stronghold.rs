//! Stronghold Inventory
//!
//! Each stronghold holds a fixed quota of captives behind a door. Nothing
//! comes out until the door is breached (`destroyed`); after that a spawn
//! timer paces releases. The timer saturates at the threshold while the
//! doorway is blocked or the captive pool is full, so a deferred spawn
//! fires on the first tick the obstruction clears. `captives_remaining`
//! only decrements when a slot was actually allocated, which keeps the
//! conservation tally exact.
//!
//! Vehicles use an independent inventory: one fielded at a time per
//! stronghold, a cooldown after a kill, and the slot returned to inventory
//! when a stale off-screen vehicle is recycled.

use super::config::Tunables;

#[derive(Debug)]
pub struct Stronghold {
    /// Door position, world pixels.
    pub x: i32,
    pub destroyed: bool,
    pub captives_remaining: u32,
    /// Total ever released, for the conservation tally.
    pub captives_spawned: u32,
    pub vehicles_remaining: u32,
    pub vehicle_cooldown: u32,
    spawn_timer: u32,
}

impl Stronghold {
    pub fn new(x: i32, t: &Tunables) -> Self {
        Self {
            x,
            destroyed: false,
            captives_remaining: t.captives_per_stronghold,
            captives_spawned: 0,
            vehicles_remaining: t.vehicles_per_stronghold,
            vehicle_cooldown: 0,
            spawn_timer: 0,
        }
    }

    pub fn from_tunables(t: &Tunables) -> Vec<Stronghold> {
        t.stronghold_xs.iter().map(|&x| Stronghold::new(x, t)).collect()
    }

    /// Advance timers one tick. Returns true when a captive spawn should be
    /// attempted; the attempt may still fail (door blocked, pool full) and
    /// the timer stays at the threshold until it succeeds.
    pub fn tick(&mut self, t: &Tunables) -> bool {
        if self.vehicle_cooldown > 0 {
            self.vehicle_cooldown -= 1;
        }
        if !self.destroyed || self.captives_remaining == 0 {
            return false;
        }
        if self.spawn_timer < t.spawn_delay {
            self.spawn_timer += 1;
        }
        self.spawn_timer >= t.spawn_delay
    }

    /// A captive slot was allocated for this stronghold.
    pub fn confirm_spawn(&mut self) {
        debug_assert!(self.captives_remaining > 0);
        self.spawn_timer = 0;
        self.captives_remaining -= 1;
        self.captives_spawned += 1;
    }

    /// Ready to field a vehicle? The camera-range gate keeps far-off
    /// strongholds quiet; the caller checks the free vehicle slot.
    pub fn wants_vehicle(&self, camera_px: i32, screen_w: i32, range: i32) -> bool {
        self.vehicles_remaining > 0
            && self.vehicle_cooldown == 0
            && (self.x - (camera_px + screen_w / 2)).abs() <= range
    }

    pub fn confirm_vehicle_spawn(&mut self) {
        debug_assert!(self.vehicles_remaining > 0);
        self.vehicles_remaining -= 1;
    }

    /// A fielded vehicle was destroyed: the replacement returns to
    /// inventory behind a cooldown.
    pub fn vehicle_destroyed(&mut self, t: &Tunables) {
        self.vehicles_remaining += 1;
        self.vehicle_cooldown = t.vehicle_cooldown;
    }

    /// A stale off-screen vehicle was recycled: straight back to inventory,
    /// no cooldown.
    pub fn vehicle_recycled(&mut self) {
        self.vehicles_remaining += 1;
    }
}
