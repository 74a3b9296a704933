//! Player Weapons
//!
//! One cannon round and one gravity bomb slot. The round fires from the
//! nose while heading left or right, with a vertical component taken from
//! the airframe's pitch frame. Its hit scan runs in a fixed order (jet,
//! balloon, strongholds, then friendly captives) and the first match ends
//! the scan, so one round causes at most one effect per tick. The bomb
//! only releases in the center heading; it must be dropped from altitude
//! to arm against vehicles, a low toss just bursts on the dirt.

use super::aircraft::{Aircraft, Heading, AIRCRAFT_HALF_H, AIRCRAFT_HALF_W};
use super::captive::{Captive, CAPTIVE_HALF_H, CAPTIVE_SLOTS};
use super::collision::{first_hit, HalfBox};
use super::config::Tunables;
use super::events::{Cue, Effect, Effects};
use super::fixed::{on_screen, Subpixel, GROUND_Y};
use super::fx::FxPools;
use super::pool::Pool;
use super::stronghold::Stronghold;
use super::vehicle::{Vehicle, VEHICLE_HALF_H, VEHICLE_HALF_W, VEHICLE_SLOTS};

/// Minimum drop height, in pixels above the ground, for a bomb to arm
/// against the vehicle lane.
const BOMB_ARM_ALTITUDE: i32 = 48;

#[derive(Debug, Default)]
pub struct Round {
    pub active: bool,
    pub x: Subpixel,
    pub y: Subpixel,
    pub vx: Subpixel,
    pub vy: Subpixel,
}

#[derive(Debug, Default)]
pub struct Bomb {
    pub active: bool,
    pub x: Subpixel,
    pub y: Subpixel,
    pub vx: Subpixel,
    /// Dropped from high enough to reach the vehicle lane.
    pub armed: bool,
}

/// Try to fire the cannon. One round in flight at a time, side headings
/// only; pitch steers the muzzle line up or down two pixels a tick.
pub fn fire_round(round: &mut Round, aircraft: &Aircraft, effects: &mut Effects, t: &Tunables) -> bool {
    if round.active || !aircraft.alive() || aircraft.landed() || aircraft.heading == Heading::Center {
        return false;
    }
    let dir = if aircraft.heading == Heading::Left { -1 } else { 1 };
    round.active = true;
    round.x = aircraft.x + Subpixel::from_px(dir * AIRCRAFT_HALF_W);
    round.y = aircraft.y;
    round.vx = Subpixel::from_px(dir * t.round_speed);
    round.vy = Subpixel::from_px(match aircraft.frame() {
        // Nose-down thrust frames angle the shot toward the dirt,
        // nose-up braking frames lift it.
        2 | 5 => t.round_vy,
        3 | 6 => -t.round_vy,
        _ => 0,
    });
    effects.cues.send(Cue::PlayerFire);
    true
}

/// Try to release the bomb: center heading, airborne, one at a time.
pub fn drop_bomb(bomb: &mut Bomb, aircraft: &Aircraft, effects: &mut Effects) -> bool {
    if bomb.active || !aircraft.alive() || aircraft.heading != Heading::Center {
        return false;
    }
    let height = GROUND_Y.to_px() - aircraft.bottom_px();
    if height <= 0 {
        return false;
    }
    bomb.active = true;
    bomb.x = aircraft.x;
    bomb.y = aircraft.y + Subpixel::from_px(AIRCRAFT_HALF_H);
    bomb.vx = aircraft.vx;
    bomb.armed = height >= BOMB_ARM_ALTITUDE;
    effects.cues.send(Cue::BombDrop);
    true
}

/// Cannon round pass: move, then scan jet -> balloon -> strongholds ->
/// captives. Ground and screen-exit checks only run when nothing was hit.
#[allow(clippy::too_many_arguments)]
pub fn update_round(
    round: &mut Round,
    jet_center: Option<(i32, i32)>,
    balloon_center: Option<(i32, i32)>,
    strongholds: &[Stronghold],
    captives: &Pool<Captive, CAPTIVE_SLOTS>,
    camera_px: i32,
    effects: &mut Effects,
    fx: &mut FxPools,
    t: &Tunables,
) {
    if !round.active {
        return;
    }
    round.x += round.vx;
    round.y += round.vy;
    let p = (round.x.to_px(), round.y.to_px());

    let mut targets: Vec<(Effect, (i32, i32), HalfBox)> = Vec::new();
    if let Some(center) = jet_center {
        targets.push((Effect::KillJet, center, HalfBox::new(t.jet_half_w, t.jet_half_h)));
    }
    if let Some(center) = balloon_center {
        targets.push((
            Effect::DropBalloon,
            center,
            HalfBox::new(t.balloon_shot_half_w, t.balloon_shot_half_h),
        ));
    }
    for (id, s) in strongholds.iter().enumerate() {
        if !s.destroyed {
            targets.push((
                Effect::DestroyStronghold { id },
                (s.x, GROUND_Y.to_px() - t.stronghold_half_box),
                HalfBox::square(t.stronghold_half_box),
            ));
        }
    }
    for (slot, c) in captives.iter_alive() {
        if c.exposed() {
            targets.push((
                Effect::KillCaptive { slot },
                (c.x_px(), c.center_y_px()),
                HalfBox::new(t.captive_half_width, CAPTIVE_HALF_H),
            ));
        }
    }

    if let Some(effect) = first_hit(p, targets) {
        effects.hits.send(effect);
        round.active = false;
        return;
    }

    if round.y >= GROUND_Y {
        fx.spawn_small(round.x, GROUND_Y);
        effects.cues.send(Cue::SmallBlast);
        round.active = false;
        return;
    }
    if !on_screen(p.0 - camera_px, 4) {
        round.active = false;
    }
}

/// Bomb pass: straight fall with inherited momentum. Armed bombs check
/// the vehicle lane first, then exposed captives, then burst on the
/// ground line.
pub fn update_bomb(
    bomb: &mut Bomb,
    vehicles: &Pool<Vehicle, VEHICLE_SLOTS>,
    captives: &Pool<Captive, CAPTIVE_SLOTS>,
    effects: &mut Effects,
    fx: &mut FxPools,
    t: &Tunables,
) {
    if !bomb.active {
        return;
    }
    bomb.x += bomb.vx;
    bomb.y += Subpixel::from_px(t.bomb_speed);
    let p = (bomb.x.to_px(), bomb.y.to_px());

    let mut targets: Vec<(Effect, (i32, i32), HalfBox)> = Vec::new();
    if bomb.armed {
        for (slot, v) in vehicles.iter_alive() {
            targets.push((
                Effect::DamageVehicle { slot },
                v.center_px(),
                HalfBox::new(VEHICLE_HALF_W, VEHICLE_HALF_H),
            ));
        }
    }
    for (slot, c) in captives.iter_alive() {
        if c.exposed() {
            targets.push((
                Effect::KillCaptive { slot },
                (c.x_px(), c.center_y_px()),
                HalfBox::new(t.captive_half_width, CAPTIVE_HALF_H),
            ));
        }
    }

    if let Some(effect) = first_hit(p, targets) {
        effects.hits.send(effect);
        bomb.active = false;
        return;
    }

    if bomb.y >= GROUND_Y {
        fx.spawn_small(bomb.x, GROUND_Y);
        effects.cues.send(Cue::SmallBlast);
        bomb.active = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::captive::CaptiveState;

    fn t() -> Tunables {
        Tunables::default()
    }

    fn airborne_aircraft(t: &Tunables, x: i32, y: i32, heading: Heading) -> Aircraft {
        let mut a = Aircraft::new(t);
        a.x = Subpixel::from_px(x);
        a.y = Subpixel::from_px(y);
        a.heading = heading;
        a
    }

    #[test]
    fn test_no_fire_in_center_heading() {
        let t = t();
        let mut round = Round::default();
        let mut effects = Effects::new();
        let a = airborne_aircraft(&t, 1000, 100, Heading::Center);
        assert!(!fire_round(&mut round, &a, &mut effects, &t));
        assert!(!round.active);
    }

    #[test]
    fn test_no_fire_while_landed() {
        let t = t();
        let mut round = Round::default();
        let mut effects = Effects::new();
        let mut a = airborne_aircraft(&t, 1000, 100, Heading::Right);
        a.y = GROUND_Y - Subpixel::from_px(AIRCRAFT_HALF_H);
        assert!(a.landed());
        assert!(!fire_round(&mut round, &a, &mut effects, &t));
    }

    #[test]
    fn test_one_round_in_flight() {
        let t = t();
        let mut round = Round::default();
        let mut effects = Effects::new();
        let a = airborne_aircraft(&t, 1000, 100, Heading::Right);
        assert!(fire_round(&mut round, &a, &mut effects, &t));
        assert!(!fire_round(&mut round, &a, &mut effects, &t));
        assert_eq!(round.x.to_px(), 1000 + AIRCRAFT_HALF_W);
        assert_eq!(round.vx, Subpixel::from_px(t.round_speed));
    }

    #[test]
    fn test_round_breaches_stronghold() {
        let t = t();
        let mut round = Round::default();
        let mut effects = Effects::new();
        let mut fx = FxPools::new();
        let strongholds = Stronghold::from_tunables(&t);
        let captives: Pool<Captive, CAPTIVE_SLOTS> = Pool::new();

        round.active = true;
        round.x = Subpixel::from_px(strongholds[1].x - 40);
        round.y = Subpixel::from_px(GROUND_Y.to_px() - 20);
        round.vx = Subpixel::from_px(t.round_speed);

        for _ in 0..4 {
            update_round(
                &mut round, None, None, &strongholds, &captives,
                strongholds[1].x - 160, &mut effects, &mut fx, &t,
            );
        }
        assert!(!round.active);
        assert!(effects
            .hits
            .iter()
            .any(|e| *e == Effect::DestroyStronghold { id: 1 }));
    }

    #[test]
    fn test_breached_stronghold_no_longer_blocks() {
        let t = t();
        let mut round = Round::default();
        let mut effects = Effects::new();
        let mut fx = FxPools::new();
        let mut strongholds = Stronghold::from_tunables(&t);
        strongholds[1].destroyed = true;
        let captives: Pool<Captive, CAPTIVE_SLOTS> = Pool::new();

        round.active = true;
        round.x = Subpixel::from_px(strongholds[1].x - 16);
        round.y = Subpixel::from_px(GROUND_Y.to_px() - 20);
        round.vx = Subpixel::from_px(t.round_speed);

        for _ in 0..8 {
            update_round(
                &mut round, None, None, &strongholds, &captives,
                strongholds[1].x - 160, &mut effects, &mut fx, &t,
            );
        }
        // Sails straight through the open doorway.
        assert!(effects.hits.is_empty());
        assert!(round.active);
    }

    #[test]
    fn test_check_order_jet_before_stronghold() {
        let t = t();
        let mut round = Round::default();
        let mut effects = Effects::new();
        let mut fx = FxPools::new();
        let strongholds = Stronghold::from_tunables(&t);
        let captives: Pool<Captive, CAPTIVE_SLOTS> = Pool::new();

        // Jet parked right on top of an intact stronghold door.
        let jet = (strongholds[0].x, GROUND_Y.to_px() - t.stronghold_half_box);
        round.active = true;
        round.x = Subpixel::from_px(jet.0 - 4);
        round.y = Subpixel::from_px(jet.1);
        round.vx = Subpixel::from_px(t.round_speed);

        update_round(
            &mut round, Some(jet), None, &strongholds, &captives,
            jet.0 - 160, &mut effects, &mut fx, &t,
        );
        let hits: Vec<_> = effects.hits.iter().copied().collect();
        assert_eq!(hits, vec![Effect::KillJet]);
    }

    #[test]
    fn test_miss_exits_screen_without_effects() {
        let t = t();
        let mut round = Round::default();
        let mut effects = Effects::new();
        let mut fx = FxPools::new();
        let strongholds = Stronghold::from_tunables(&t);
        let captives: Pool<Captive, CAPTIVE_SLOTS> = Pool::new();

        round.active = true;
        round.x = Subpixel::from_px(700);
        round.y = Subpixel::from_px(100);
        round.vx = Subpixel::from_px(t.round_speed);

        let mut deactivations = 0;
        for _ in 0..60 {
            let was = round.active;
            update_round(
                &mut round, None, None, &strongholds, &captives, 600,
                &mut effects, &mut fx, &t,
            );
            if was && !round.active {
                deactivations += 1;
            }
        }
        assert_eq!(deactivations, 1);
        assert!(effects.hits.is_empty());
        assert_eq!(fx.small.alive_count(), 0);
    }

    #[test]
    fn test_friendly_fire_queues_kill() {
        let t = t();
        let mut round = Round::default();
        let mut effects = Effects::new();
        let mut fx = FxPools::new();
        let strongholds = Stronghold::from_tunables(&t);
        let mut captives: Pool<Captive, CAPTIVE_SLOTS> = Pool::new();
        let c = captives.allocate().unwrap();
        captives[c].state = CaptiveState::RunningToAircraft;
        captives[c].x = Subpixel::from_px(1000);

        round.active = true;
        round.x = Subpixel::from_px(1000 - t.round_speed);
        round.y = Subpixel::from_px(captives[c].center_y_px());
        round.vx = Subpixel::from_px(t.round_speed);

        update_round(
            &mut round, None, None, &strongholds, &captives, 900,
            &mut effects, &mut fx, &t,
        );
        assert!(!round.active);
        assert!(effects.hits.iter().any(|e| *e == Effect::KillCaptive { slot: c }));
    }

    #[test]
    fn test_bomb_requires_center_and_altitude_to_arm() {
        let t = t();
        let mut bomb = Bomb::default();
        let mut effects = Effects::new();

        let a = airborne_aircraft(&t, 1000, 100, Heading::Left);
        assert!(!drop_bomb(&mut bomb, &a, &mut effects));

        // High center drop arms it.
        let a = airborne_aircraft(&t, 1000, 100, Heading::Center);
        assert!(drop_bomb(&mut bomb, &a, &mut effects));
        assert!(bomb.armed);

        // A low toss releases but stays inert.
        let mut bomb = Bomb::default();
        let low_y = GROUND_Y.to_px() - AIRCRAFT_HALF_H - 10;
        let a = airborne_aircraft(&t, 1000, low_y, Heading::Center);
        assert!(drop_bomb(&mut bomb, &a, &mut effects));
        assert!(!bomb.armed);
    }

    #[test]
    fn test_armed_bomb_damages_vehicle() {
        let t = t();
        let mut bomb = Bomb::default();
        let mut effects = Effects::new();
        let mut fx = FxPools::new();
        let captives: Pool<Captive, CAPTIVE_SLOTS> = Pool::new();
        let mut vehicles: Pool<Vehicle, VEHICLE_SLOTS> = Pool::new();
        let v = vehicles.allocate().unwrap();
        vehicles[v].active = true;
        vehicles[v].x = Subpixel::from_px(1000);
        vehicles[v].health = t.vehicle_health;

        bomb.active = true;
        bomb.armed = true;
        bomb.x = Subpixel::from_px(1000);
        bomb.y = Subpixel::from_px(100);

        for _ in 0..40 {
            update_bomb(&mut bomb, &vehicles, &captives, &mut effects, &mut fx, &t);
            if !bomb.active {
                break;
            }
        }
        assert!(effects.hits.iter().any(|e| *e == Effect::DamageVehicle { slot: v }));
    }

    #[test]
    fn test_unarmed_bomb_bursts_on_ground_past_vehicle() {
        let t = t();
        let mut bomb = Bomb::default();
        let mut effects = Effects::new();
        let mut fx = FxPools::new();
        let captives: Pool<Captive, CAPTIVE_SLOTS> = Pool::new();
        let mut vehicles: Pool<Vehicle, VEHICLE_SLOTS> = Pool::new();
        let v = vehicles.allocate().unwrap();
        vehicles[v].active = true;
        vehicles[v].x = Subpixel::from_px(1000);
        vehicles[v].health = t.vehicle_health;

        bomb.active = true;
        bomb.armed = false;
        bomb.x = Subpixel::from_px(1000);
        bomb.y = Subpixel::from_px(160);

        for _ in 0..40 {
            update_bomb(&mut bomb, &vehicles, &captives, &mut effects, &mut fx, &t);
        }
        assert!(!bomb.active);
        assert!(effects.hits.is_empty());
        assert_eq!(fx.small.alive_count(), 1);
    }
}
