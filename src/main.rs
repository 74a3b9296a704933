//! MEGACHOPPER: side-scrolling rescue action
//!
//! All gameplay lives in `sim`, a deterministic fixed-point simulation
//! stepped at 60 Hz. This binary is the frontend: it maps the keyboard
//! to an input `Intent`, steps the sim on a fixed-timestep accumulator,
//! draws every published sprite as a placeholder quad scaled up from the
//! 320x240 playfield, and drains the audio cues.

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

mod sim;

use macroquad::prelude::*;
use sim::aircraft::Intent;
use sim::config::{load_tunables, Tunables};
use sim::events::Cue;
use sim::fixed::{SCREEN_H, SCREEN_W};
use sim::{Simulation, SpriteId, SpriteKind, SpriteSink};

const TICK_SECS: f32 = 1.0 / 60.0;

fn window_conf() -> Conf {
    Conf {
        window_title: format!("MEGACHOPPER v{}", VERSION),
        window_width: SCREEN_W * 3,
        window_height: SCREEN_H * 3,
        window_resizable: true,
        high_dpi: true,
        ..Default::default()
    }
}

fn read_intent() -> Intent {
    Intent {
        left: is_key_down(KeyCode::A) || is_key_down(KeyCode::Left),
        right: is_key_down(KeyCode::D) || is_key_down(KeyCode::Right),
        up: is_key_down(KeyCode::W) || is_key_down(KeyCode::Up),
        down: is_key_down(KeyCode::S) || is_key_down(KeyCode::Down),
        fire: is_key_down(KeyCode::J) || is_key_down(KeyCode::Space),
        drop: is_key_down(KeyCode::K) || is_key_down(KeyCode::LeftControl),
    }
}

/// Placeholder renderer: one colored quad per sprite slot. `set_sprite`
/// is called for every slot every frame, so nothing persists between
/// frames and hidden slots simply draw nothing.
struct QuadSink {
    scale: f32,
    off_x: f32,
    off_y: f32,
}

impl QuadSink {
    fn new() -> Self {
        let scale =
            (screen_width() / SCREEN_W as f32).min(screen_height() / SCREEN_H as f32);
        Self {
            scale,
            off_x: (screen_width() - SCREEN_W as f32 * scale) / 2.0,
            off_y: (screen_height() - SCREEN_H as f32 * scale) / 2.0,
        }
    }

    /// Half-extents in playfield pixels, per sprite family.
    fn half_size(kind: SpriteKind) -> (f32, f32) {
        match kind {
            SpriteKind::Aircraft => (16.0, 8.0),
            SpriteKind::Captive => (3.0, 8.0),
            SpriteKind::Vehicle => (12.0, 8.0),
            SpriteKind::Jet => (12.0, 6.0),
            SpriteKind::Balloon => (12.0, 16.0),
            SpriteKind::Bomb | SpriteKind::JetBomb => (2.0, 4.0),
            SpriteKind::Shell | SpriteKind::Round | SpriteKind::JetRound => (2.0, 2.0),
            SpriteKind::SmallBlast => (6.0, 6.0),
            SpriteKind::LargeBlast => (14.0, 14.0),
        }
    }

    fn color(kind: SpriteKind, frame: u16) -> Color {
        match kind {
            SpriteKind::Aircraft => SKYBLUE,
            SpriteKind::Captive => {
                if (6..8).contains(&frame) {
                    GOLD
                } else {
                    BEIGE
                }
            }
            SpriteKind::Vehicle => DARKGREEN,
            SpriteKind::Jet => MAROON,
            SpriteKind::Balloon => PURPLE,
            SpriteKind::Bomb | SpriteKind::JetBomb => DARKGRAY,
            SpriteKind::Shell | SpriteKind::Round | SpriteKind::JetRound => YELLOW,
            SpriteKind::SmallBlast => ORANGE,
            SpriteKind::LargeBlast => RED,
        }
    }
}

impl SpriteSink for QuadSink {
    fn set_sprite(&mut self, id: SpriteId, screen_x: i32, screen_y: i32, frame: u16, visible: bool) {
        if !visible {
            return;
        }
        let (hw, hh) = Self::half_size(id.kind);
        draw_rectangle(
            self.off_x + (screen_x as f32 - hw) * self.scale,
            self.off_y + (screen_y as f32 - hh) * self.scale,
            hw * 2.0 * self.scale,
            hh * 2.0 * self.scale,
            Self::color(id.kind, frame),
        );
    }
}

fn draw_backdrop(sink: &QuadSink, camera_px: i32, tunables: &Tunables) {
    clear_background(Color::from_rgba(24, 20, 37, 255));
    // Ground strip.
    draw_rectangle(
        sink.off_x,
        sink.off_y + 186.0 * sink.scale,
        SCREEN_W as f32 * sink.scale,
        (SCREEN_H - 186) as f32 * sink.scale,
        Color::from_rgba(66, 55, 34, 255),
    );
    // Stronghold doors and the home base pad, world-anchored.
    for &x in &tunables.stronghold_xs {
        let sx = (x - camera_px) as f32;
        if sx > -32.0 && sx < SCREEN_W as f32 + 32.0 {
            draw_rectangle(
                sink.off_x + (sx - 32.0) * sink.scale,
                sink.off_y + 122.0 * sink.scale,
                64.0 * sink.scale,
                64.0 * sink.scale,
                GRAY,
            );
        }
    }
    let base_sx = (tunables.home_base_x - camera_px) as f32;
    draw_rectangle(
        sink.off_x + (base_sx - 40.0) * sink.scale,
        sink.off_y + 182.0 * sink.scale,
        80.0 * sink.scale,
        4.0 * sink.scale,
        DARKBLUE,
    );
}

fn draw_hud(sim: &Simulation) {
    let c = sim.counters();
    let line = format!(
        "RESCUED {:02}  ABOARD {:02}  LOST {:02}  LIVES {}",
        c.rescued,
        c.aboard,
        c.lost,
        sim.lives()
    );
    draw_text(&line, 12.0, 24.0, 26.0, WHITE);
    if sim.game_over() {
        draw_text("GAME OVER", screen_width() / 2.0 - 80.0, screen_height() / 2.0, 40.0, RED);
    } else if sim.mission_complete() {
        draw_text("MISSION COMPLETE", screen_width() / 2.0 - 130.0, screen_height() / 2.0, 40.0, GOLD);
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    // Initialize crash logging FIRST (before any other code)
    #[cfg(not(target_arch = "wasm32"))]
    crashlog::setup!(crashlog::cargo_metadata!().capitalized(), false);

    let tunables = match load_tunables("assets/tunables.ron") {
        Ok(t) => {
            println!("Loaded tunables from assets/tunables.ron");
            t
        }
        Err(e) => {
            println!("Using default tunables ({})", e);
            Tunables::default()
        }
    };

    let seed = (get_time() * 1_000_000.0) as u64;
    let mut game = Simulation::new(tunables, seed);
    let mut accumulator = 0.0f32;

    println!("=== MEGACHOPPER ===");

    loop {
        // Fixed 60 Hz steps; rendering runs at display rate.
        accumulator += get_frame_time().min(0.25);
        let intent = read_intent();
        while accumulator >= TICK_SECS {
            game.tick(intent);
            accumulator -= TICK_SECS;
        }

        for cue in game.drain_cues() {
            // Audio backend not wired up yet; log the cue stream.
            match cue {
                Cue::Rescue | Cue::CaptiveLost => println!("cue: {:?}", cue),
                _ => {}
            }
        }

        let mut sink = QuadSink::new();
        draw_backdrop(&sink, game.camera_x().to_px(), game.tunables());
        game.publish_sprites(&mut sink);
        draw_hud(&game);

        next_frame().await
    }
}
