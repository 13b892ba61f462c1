//! Fixed timestep simulation tick
//!
//! Core game loop that advances simulation deterministically.

use super::combat;
use super::director;
use super::events::GameEvent;
use super::spawn;
use super::state::{GamePhase, GameState};
use crate::consts::{MAX_SUBSTEPS, SIM_DT};
use crate::palette;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Held direction keys
    pub move_left: bool,
    pub move_right: bool,
    pub move_up: bool,
    pub move_down: bool,
    /// Fire held
    pub fire: bool,
    /// Request an ally (edge-triggered)
    pub spawn_ally: bool,
    /// Pause toggle (edge-triggered)
    pub toggle_pause: bool,
    /// Start a fresh run (edge-triggered)
    pub restart: bool,
}

impl TickInput {
    /// Clear the edge-triggered commands once they have been consumed
    pub fn clear_one_shots(&mut self) {
        self.spawn_ally = false;
        self.toggle_pause = false;
        self.restart = false;
    }
}

/// Advance the game state by one step of `dt` seconds.
///
/// Returns the presentation events raised during the step.
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) -> Vec<GameEvent> {
    if input.restart {
        state.restart();
        return state.drain_events();
    }

    // Handle pause toggle
    if input.toggle_pause {
        match state.phase {
            GamePhase::Playing => {
                state.phase = GamePhase::Paused;
                return state.drain_events();
            }
            GamePhase::Paused => state.phase = GamePhase::Playing,
            GamePhase::GameOver => {}
        }
    }

    // Don't tick if paused or game over
    if state.phase != GamePhase::Playing {
        return state.drain_events();
    }

    // Time never runs backwards
    let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
    let dt_ms = f64::from(dt) * 1000.0;
    state.clock_ms += dt_ms;
    state.time_ticks += 1;
    let now = state.clock_ms;

    if input.spawn_ally {
        spawn::spawn_ally(state);
    }

    director::check_boss(state);
    spawn::respawn_walls(state);

    state.player.advance(input, now, &mut state.bullets);

    if !combat::resolve_bullets(state) {
        return state.drain_events();
    }

    let player_pos = state.player.tank.pos;
    for enemy in &mut state.enemies {
        enemy.advance(
            player_pos,
            now,
            state.level,
            &state.tuning,
            &mut state.rng,
            &mut state.bullets,
        );
    }

    // Allies, pruning the ones downed by this tick's bullets
    for i in (0..state.allies.len()).rev() {
        if !state.allies[i].tank.is_alive() {
            let ally = state.allies.remove(i);
            state.burst(ally.tank.pos, palette::ALLY, 15);
            log::debug!("Ally destroyed");
            continue;
        }
        state.allies[i].advance(
            &state.enemies,
            player_pos,
            now,
            &state.tuning,
            &mut state.bullets,
        );
    }

    combat::update_powerups(state, dt_ms);
    state.advance_cosmetics(dt_ms);

    director::check_level_up(state);
    director::roll_spawns(state);

    state.drain_events()
}

/// Fixed-timestep accumulator for hosts with a variable frame rate
#[derive(Debug, Clone, Default)]
pub struct FixedStep {
    accumulator: f32,
}

impl FixedStep {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run as many `SIM_DT` ticks as `frame_dt` seconds cover, up to
    /// `MAX_SUBSTEPS`. One-shot inputs are cleared after the first tick.
    pub fn advance(
        &mut self,
        state: &mut GameState,
        input: &mut TickInput,
        frame_dt: f32,
    ) -> Vec<GameEvent> {
        self.accumulator += frame_dt.max(0.0);

        let mut events = Vec::new();
        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            events.extend(tick(state, input, SIM_DT));
            self.accumulator -= SIM_DT;
            substeps += 1;
            input.clear_one_shots();
        }
        if substeps == MAX_SUBSTEPS {
            // Drop the backlog instead of spiralling
            self.accumulator = 0.0;
        }
        events
    }
}
