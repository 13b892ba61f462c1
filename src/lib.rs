//! Tank Arena - simulation core for a 2D arcade tank shooter
//!
//! Core modules:
//! - `sim`: Deterministic simulation (movement, combat, spawning, progression)
//! - `tuning`: Data-driven game balance

pub mod sim;
pub mod tuning;

pub use tuning::{Tuning, TuningError};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, one arcade "frame")
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Arena dimensions
    pub const ARENA_WIDTH: f32 = 800.0;
    pub const ARENA_HEIGHT: f32 = 600.0;

    /// Base tank footprint plus the extra size every tank gets
    pub const TANK_SIZE: f32 = 40.0;
    pub const SIZE_DELTA: f32 = 15.0;
    pub const STANDARD_TANK_SIZE: f32 = TANK_SIZE + SIZE_DELTA;
    pub const BOSS_TANK_SIZE: f32 = TANK_SIZE * 1.5 + SIZE_DELTA;

    /// Bullets leave the barrel this far past the hull edge
    pub const MUZZLE_OFFSET: f32 = 10.0;
    pub const BULLET_SPEED: f32 = 8.0;
    pub const BULLET_RADIUS: f32 = 4.0;
    pub const HEAVY_BULLET_RADIUS: f32 = 6.0;

    /// Walls
    pub const WALL_SIZE: f32 = 40.0;
    pub const BORDER_THICKNESS: f32 = 20.0;
    pub const WALL_HIT_POINTS: u8 = 3;

    /// Player start position
    pub const PLAYER_START_X: f32 = ARENA_WIDTH / 2.0;
    pub const PLAYER_START_Y: f32 = ARENA_HEIGHT - 100.0;

    /// Number of enemy spawn attempts on a fresh run
    pub const INITIAL_ENEMIES: usize = 3;
    /// Number of enemy skins / boss variants the renderer knows about
    pub const ENEMY_SKINS: u8 = 5;
    pub const BOSS_VARIANTS: u8 = 4;

    /// Power-up pickup radius
    pub const POWERUP_RADIUS: f32 = 15.0;
}

/// Colours used in presentation events (0xRRGGBB)
pub mod palette {
    pub const PLAYER: u32 = 0x3498db;
    pub const ALLY: u32 = 0x27ae60;
    pub const ENEMY: u32 = 0xe74c3c;
    pub const DEBRIS: u32 = 0x8b4513;
    pub const SCORE: u32 = 0xf1c40f;
    pub const ALERT: u32 = 0xff0000;
    pub const ALLY_DOWN: u32 = 0xff5555;
    pub const HEALTH_PICKUP: u32 = 0xff5252;
    pub const SPEED_PICKUP: u32 = 0x4caf50;
}

/// Unit vector pointing along `angle`
#[inline]
pub fn heading(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

/// Angle of the vector from `from` to `to`
#[inline]
pub fn angle_between(from: Vec2, to: Vec2) -> f32 {
    let d = to - from;
    d.y.atan2(d.x)
}
