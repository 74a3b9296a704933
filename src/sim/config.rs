//! Balance tunables
//!
//! Every gameplay constant lives here as data rather than scattered magic
//! numbers, loaded from a human-readable RON file. Values are in whole
//! pixels unless the field name says subpixels or ticks.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Error type for tunables loading
#[derive(Debug)]
pub enum TunablesError {
    IoError(std::io::Error),
    ParseError(ron::error::SpannedError),
    SerializeError(ron::Error),
    ValidationError(String),
}

impl From<std::io::Error> for TunablesError {
    fn from(e: std::io::Error) -> Self {
        TunablesError::IoError(e)
    }
}

impl From<ron::error::SpannedError> for TunablesError {
    fn from(e: ron::error::SpannedError) -> Self {
        TunablesError::ParseError(e)
    }
}

impl From<ron::Error> for TunablesError {
    fn from(e: ron::Error) -> Self {
        TunablesError::SerializeError(e)
    }
}

impl std::fmt::Display for TunablesError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TunablesError::IoError(e) => write!(f, "IO error: {}", e),
            TunablesError::ParseError(e) => write!(f, "Parse error: {}", e),
            TunablesError::SerializeError(e) => write!(f, "Serialize error: {}", e),
            TunablesError::ValidationError(e) => write!(f, "Validation error: {}", e),
        }
    }
}

impl std::error::Error for TunablesError {}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Tunables {
    // Camera
    /// Screen-space band edges that trigger camera retargeting.
    pub scroll_trigger_left: i32,
    pub scroll_trigger_right: i32,

    // Aircraft
    pub aircraft_lives: u32,
    /// Ticks the turn key must be held before the heading flips.
    pub turn_duration: u32,
    /// Horizontal acceleration per tick, in subpixels.
    pub accel_subpx: i32,
    /// Friction per tick while coasting, in subpixels.
    pub friction_subpx: i32,
    /// Maximum horizontal speed, in subpixels (2.5 px/tick).
    pub max_speed_subpx: i32,
    /// Climb rate per tick, in subpixels.
    pub climb_subpx: i32,
    /// Dive rate per tick, in subpixels.
    pub dive_subpx: i32,
    /// Idle gravity sink per tick, in subpixels.
    pub sink_subpx: i32,
    pub aircraft_start_x: i32,
    /// Ticks between the crash explosion and the next life spawning.
    pub respawn_delay: u32,

    // Strongholds
    pub stronghold_xs: [i32; 4],
    pub captives_per_stronghold: u32,
    pub vehicles_per_stronghold: u32,
    /// Ticks between captive spawn attempts while the door is clear.
    pub spawn_delay: u32,
    /// No captive may stand within this radius of the door for a spawn.
    pub door_clearance: i32,
    pub vehicle_cooldown: u32,
    /// A stronghold only fields vehicles once the camera is this close.
    pub vehicle_spawn_range: i32,

    // Captives
    pub captive_speed: i32,
    pub captive_spacing: i32,
    pub boarding_radius: i32,
    /// Captives only notice a landed aircraft within this range.
    pub sight_range: i32,
    /// Half-width of the idle wander band around the door.
    pub wander_radius: i32,
    pub boarding_ticks: u32,
    /// Ticks between successive drop-offs while landed at home.
    pub dropoff_interval: u32,
    pub wave_duration: u32,
    pub crush_half_forward: i32,
    pub crush_half_banking: i32,
    /// Aircraft bottom must be within this of the ground to crush.
    pub crush_altitude_band: i32,

    // Home zone
    pub home_base_x: i32,
    pub home_zone_x: i32,

    // Player weapons
    pub round_speed: i32,
    pub round_vy: i32,
    pub bomb_speed: i32,
    pub stronghold_half_box: i32,
    pub captive_half_width: i32,

    // Vehicles & shells
    pub vehicle_speed_subpx: i32,
    pub vehicle_health: u32,
    pub vehicle_fire_cooldown: u32,
    /// Shell gravity per tick, in subpixels.
    pub shell_gravity_subpx: i32,
    /// Shell muzzle velocity scale applied to the aim table.
    pub shell_velocity_factor: i32,
    /// Ticks an off-screen shell or vehicle may linger before recycling.
    pub stale_ticks: u32,

    // Jet
    /// Total captives spawned before the jet starts hunting.
    pub jet_progress_gate: u32,
    pub jet_ground_loiter: u32,
    pub jet_air_loiter: u32,
    /// Per-tick launch chance once a loiter timer has elapsed, in percent.
    pub jet_launch_chance: u32,
    pub jet_speed: i32,
    pub jet_climb: i32,
    pub jet_round_speed: i32,
    pub jet_bomb_lead: i32,
    pub jet_bomb_window: i32,
    pub jet_strafe_range: i32,
    pub jet_half_w: i32,
    pub jet_half_h: i32,
    pub jet_weapon_half_box: i32,
    /// Altitude line separating ground-loiter from air-loiter, in px above
    /// the ground.
    pub jet_high_altitude: i32,

    // Balloon
    pub balloon_gates: [u32; 3],
    pub balloon_speed: i32,
    pub balloon_respawn: u32,
    /// Minimum clearance above the ground line while drifting.
    pub balloon_floor: i32,
    pub balloon_ram_half_w: i32,
    pub balloon_ram_half_h: i32,
    pub balloon_shot_half_w: i32,
    pub balloon_shot_half_h: i32,
}

impl Default for Tunables {
    fn default() -> Self {
        Self {
            scroll_trigger_left: 120,
            scroll_trigger_right: 168,

            aircraft_lives: 3,
            turn_duration: 15,
            accel_subpx: 1,
            friction_subpx: 1,
            max_speed_subpx: 2 * 16 + 8,
            climb_subpx: 16,
            dive_subpx: 32,
            sink_subpx: 8,
            aircraft_start_x: 3940,
            respawn_delay: 120,

            stronghold_xs: [200, 1200, 2200, 3200],
            captives_per_stronghold: 16,
            vehicles_per_stronghold: 1,
            spawn_delay: 60,
            door_clearance: 20,
            vehicle_cooldown: 300,
            vehicle_spawn_range: 480,

            captive_speed: 1,
            captive_spacing: 12,
            boarding_radius: 10,
            sight_range: 140,
            wander_radius: 40,
            boarding_ticks: 8,
            dropoff_interval: 30,
            wave_duration: 120,
            crush_half_forward: 10,
            crush_half_banking: 16,
            crush_altitude_band: 12,

            home_base_x: 3972,
            home_zone_x: 3800,

            round_speed: 8,
            round_vy: 2,
            bomb_speed: 4,
            stronghold_half_box: 32,
            captive_half_width: 6,

            vehicle_speed_subpx: 4,
            vehicle_health: 2,
            vehicle_fire_cooldown: 90,
            shell_gravity_subpx: 2,
            shell_velocity_factor: 3,
            stale_ticks: 600,

            jet_progress_gate: 24,
            jet_ground_loiter: 120,
            jet_air_loiter: 240,
            jet_launch_chance: 2,
            jet_speed: 4,
            jet_climb: 2,
            jet_round_speed: 6,
            jet_bomb_lead: 58,
            jet_bomb_window: 10,
            jet_strafe_range: 100,
            jet_half_w: 12,
            jet_half_h: 8,
            jet_weapon_half_box: 10,
            jet_high_altitude: 60,

            balloon_gates: [16, 32, 48],
            balloon_speed: 1,
            balloon_respawn: 300,
            balloon_floor: 32,
            balloon_ram_half_w: 12,
            balloon_ram_half_h: 16,
            balloon_shot_half_w: 8,
            balloon_shot_half_h: 24,
        }
    }
}

/// Sanity-check loaded tunables against values that would wedge or
/// overflow the simulation.
fn validate(t: &Tunables) -> Result<(), TunablesError> {
    let positive: [(&str, i32); 8] = [
        ("captive_speed", t.captive_speed),
        ("captive_spacing", t.captive_spacing),
        ("boarding_radius", t.boarding_radius),
        ("round_speed", t.round_speed),
        ("bomb_speed", t.bomb_speed),
        ("max_speed_subpx", t.max_speed_subpx),
        ("jet_speed", t.jet_speed),
        ("balloon_speed", t.balloon_speed),
    ];
    for (name, v) in positive {
        if v <= 0 {
            return Err(TunablesError::ValidationError(format!(
                "{} must be positive, got {}",
                name, v
            )));
        }
    }
    if t.scroll_trigger_left >= t.scroll_trigger_right {
        return Err(TunablesError::ValidationError(format!(
            "scroll triggers must satisfy left < right, got {} >= {}",
            t.scroll_trigger_left, t.scroll_trigger_right
        )));
    }
    let mut prev = i32::MIN;
    for x in t.stronghold_xs {
        if x <= prev {
            return Err(TunablesError::ValidationError(
                "stronghold_xs must be strictly increasing".to_string(),
            ));
        }
        prev = x;
    }
    if t.jet_launch_chance > 100 {
        return Err(TunablesError::ValidationError(format!(
            "jet_launch_chance is a percentage, got {}",
            t.jet_launch_chance
        )));
    }
    if t.home_zone_x > t.home_base_x {
        return Err(TunablesError::ValidationError(format!(
            "home_zone_x {} may not lie past home_base_x {}",
            t.home_zone_x, t.home_base_x
        )));
    }
    Ok(())
}

/// Load tunables from a RON file.
pub fn load_tunables<P: AsRef<Path>>(path: P) -> Result<Tunables, TunablesError> {
    let contents = fs::read_to_string(path)?;
    let tunables: Tunables = ron::from_str(&contents)?;
    validate(&tunables)?;
    Ok(tunables)
}

/// Save tunables to a RON file.
pub fn save_tunables<P: AsRef<Path>>(tunables: &Tunables, path: P) -> Result<(), TunablesError> {
    let config = ron::ser::PrettyConfig::new().indentor("  ".to_string());
    let ron_string = ron::ser::to_string_pretty(tunables, config)?;
    fs::write(path, ron_string)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(validate(&Tunables::default()).is_ok());
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tunables.ron");

        let mut tunables = Tunables::default();
        tunables.captive_spacing = 14;
        tunables.jet_progress_gate = 10;

        save_tunables(&tunables, &path).unwrap();
        let loaded = load_tunables(&path).unwrap();
        assert_eq!(loaded.captive_spacing, 14);
        assert_eq!(loaded.jet_progress_gate, 10);
        assert_eq!(loaded.stronghold_xs, tunables.stronghold_xs);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let loaded: Tunables = ron::from_str("(captive_spacing: 9)").unwrap();
        assert_eq!(loaded.captive_spacing, 9);
        assert_eq!(loaded.spawn_delay, Tunables::default().spawn_delay);
    }

    #[test]
    fn test_rejects_zero_speed() {
        let mut tunables = Tunables::default();
        tunables.captive_speed = 0;
        assert!(matches!(
            validate(&tunables),
            Err(TunablesError::ValidationError(_))
        ));
    }

    #[test]
    fn test_rejects_unsorted_strongholds() {
        let mut tunables = Tunables::default();
        tunables.stronghold_xs = [200, 1200, 1100, 3200];
        assert!(validate(&tunables).is_err());
    }
}
