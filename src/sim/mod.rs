//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Time only advances through the delta handed to `tick`
//! - Seeded RNG only
//! - Stable iteration order (collections are walked back to front when removing)
//! - No rendering, audio or platform dependencies

pub mod combat;
pub mod director;
pub mod entities;
pub mod events;
pub mod geometry;
pub mod spawn;
pub mod state;
pub mod tick;

pub use director::Stage;
pub use entities::{
    Allegiance, Ally, Body, Bullet, Effect, Enemy, EnemyKind, FloatingText, Particle, Player,
    PowerUp, PowerUpKind, Tank, Transient, Wall,
};
pub use events::{GameEvent, Hud};
pub use geometry::Aabb;
pub use state::{GamePhase, GameState, Snapshot};
pub use tick::{FixedStep, TickInput, tick};
