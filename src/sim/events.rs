//! Presentation events emitted by the simulation
//!
//! Events never feed back into gameplay. The host drains them every tick and
//! forwards them to whatever draws text, particles or plays sounds.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Default floating text lifetime and size
pub const TEXT_DURATION_MS: u32 = 1500;
pub const TEXT_SIZE: u32 = 24;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A burst of cosmetic particles was spawned
    SpawnParticles { pos: Vec2, color: u32, count: u32 },
    /// A floating text label was spawned
    SpawnFloatingText {
        text: String,
        pos: Vec2,
        color: u32,
        duration_ms: u32,
        size: u32,
    },
    /// A short frequency sweep should be played
    PlayTone {
        start_hz: f32,
        end_hz: f32,
        duration_s: f32,
        gain: f32,
    },
}

/// Scalar values for the heads-up display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hud {
    pub health: u32,
    pub score: u64,
    pub level: u32,
}

/// Total particles requested by a batch of events with the given colour
pub fn particles_emitted(events: &[GameEvent], color: Option<u32>) -> u32 {
    events
        .iter()
        .filter_map(|e| match e {
            GameEvent::SpawnParticles { color: c, count, .. }
                if color.is_none_or(|want| want == *c) =>
            {
                Some(*count)
            }
            _ => None,
        })
        .sum()
}
