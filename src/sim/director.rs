//! Level progression, boss gating and ambient spawn rolls

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::spawn;
use super::state::GameState;
use crate::consts::{ARENA_HEIGHT, ARENA_WIDTH};
use crate::palette;

/// Which kind of level is being played
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
    Normal(u32),
    BossLevel(u32),
}

impl Stage {
    pub fn level(self) -> u32 {
        match self {
            Stage::Normal(level) | Stage::BossLevel(level) => level,
        }
    }
}

pub fn stage(state: &GameState) -> Stage {
    if state.tuning.is_boss_level(state.level) {
        Stage::BossLevel(state.level)
    } else {
        Stage::Normal(state.level)
    }
}

/// A boss level stays unresolved until its boss has appeared and died
pub fn boss_level_unresolved(state: &GameState) -> bool {
    matches!(stage(state), Stage::BossLevel(_))
        && (!state.boss_spawned || state.boss().is_some())
}

/// Bring in the boss as soon as a boss level starts
pub fn check_boss(state: &mut GameState) {
    if matches!(stage(state), Stage::BossLevel(_)) && !state.boss_spawned {
        spawn::spawn_boss(state);
    }
}

/// Level up once enough kills have been scored. Returns true on level-up.
pub fn check_level_up(state: &mut GameState) -> bool {
    if state.kills >= state.tuning.kills_per_level && !boss_level_unresolved(state) {
        level_up(state);
        true
    } else {
        false
    }
}

pub fn level_up(state: &mut GameState) {
    state.level += 1;
    state.enemy_cap = state.tuning.enemy_cap(state.level);
    state.kills = 0;

    let center = Vec2::new(ARENA_WIDTH / 2.0, ARENA_HEIGHT / 2.0);
    match stage(state) {
        Stage::BossLevel(level) => {
            state.boss_spawned = false;
            state.announce(format!("BOSS LEVEL {level}!"), center, palette::ALERT, 3000, 36);
        }
        Stage::Normal(level) => {
            state.float_text(format!("LEVEL {level}!"), center, palette::SCORE);
        }
    }
    log::info!(
        "Level {} reached (score {}, enemy cap {})",
        state.level,
        state.score,
        state.enemy_cap
    );
}

/// Per-tick chance of a new enemy and of an ambient power-up
pub fn roll_spawns(state: &mut GameState) {
    let chance = state.tuning.enemy_spawn_chance(state.level);
    if state.rng.random::<f32>() < chance && state.enemies.len() < state.enemy_cap {
        spawn::spawn_enemy(state);
    }

    if state.rng.random::<f32>() < state.tuning.powerup_ambient_chance
        && state.powerups.len() < state.tuning.max_powerups
    {
        spawn::spawn_power_up(state, false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::events::GameEvent;
    use crate::tuning::Tuning;

    fn state_at_level(level: u32) -> GameState {
        let mut state = GameState::new(7);
        state.enemies.clear();
        state.level = level;
        state.enemy_cap = state.tuning.enemy_cap(level);
        state.drain_events();
        state
    }

    #[test]
    fn test_stage_tracks_level() {
        assert_eq!(stage(&state_at_level(1)), Stage::Normal(1));
        assert_eq!(stage(&state_at_level(5)), Stage::BossLevel(5));
        assert_eq!(stage(&state_at_level(10)).level(), 10);
    }

    #[test]
    fn test_level_up_after_five_kills() {
        let mut state = state_at_level(1);
        state.kills = 4;
        assert!(!check_level_up(&mut state));
        state.kills = 5;
        assert!(check_level_up(&mut state));
        assert_eq!(state.level, 2);
        assert_eq!(state.kills, 0);
        assert_eq!(state.enemy_cap, 6);

        let events = state.drain_events();
        assert!(events.iter().any(|e| matches!(
            e,
            GameEvent::SpawnFloatingText { text, size: 24, .. } if text == "LEVEL 2!"
        )));
    }

    #[test]
    fn test_entering_boss_level_resets_flag() {
        let mut state = state_at_level(4);
        state.boss_spawned = true;
        level_up(&mut state);
        assert_eq!(stage(&state), Stage::BossLevel(5));
        assert!(!state.boss_spawned);

        let events = state.drain_events();
        assert!(events.iter().any(|e| matches!(
            e,
            GameEvent::SpawnFloatingText { text, duration_ms: 3000, size: 36, .. }
                if text == "BOSS LEVEL 5!"
        )));
    }

    #[test]
    fn test_boss_level_blocks_progress_until_boss_dies() {
        let mut state = state_at_level(5);
        state.kills = 9;
        assert!(boss_level_unresolved(&state));
        assert!(!check_level_up(&mut state));

        check_boss(&mut state);
        assert!(state.boss().is_some());
        assert!(state.boss_spawned);
        assert!(!check_level_up(&mut state));

        state.enemies.retain(|e| !e.is_boss());
        assert!(!boss_level_unresolved(&state));
        assert!(check_level_up(&mut state));
        assert_eq!(state.level, 6);
    }

    #[test]
    fn test_check_boss_spawns_once() {
        let mut state = state_at_level(5);
        check_boss(&mut state);
        check_boss(&mut state);
        assert_eq!(state.enemies.iter().filter(|e| e.is_boss()).count(), 1);

        // Killed boss does not come back on the same level
        state.enemies.clear();
        check_boss(&mut state);
        assert!(state.boss().is_none());
    }

    #[test]
    fn test_check_boss_ignores_normal_levels() {
        let mut state = state_at_level(3);
        check_boss(&mut state);
        assert!(state.enemies.is_empty());
    }

    #[test]
    fn test_enemy_cap_is_capped() {
        let mut state = state_at_level(19);
        level_up(&mut state);
        assert_eq!(state.enemy_cap, 10);
    }

    #[test]
    fn test_roll_spawns_respects_cap() {
        let tuning = Tuning {
            enemy_spawn_base_chance: 1.0,
            enemy_spawn_chance_per_level: 0.0,
            powerup_ambient_chance: 0.0,
            ..Tuning::default()
        };
        let mut state = GameState::with_tuning(11, tuning);
        state.enemies.clear();
        state.enemy_cap = 2;
        for _ in 0..200 {
            roll_spawns(&mut state);
        }
        assert!(state.enemies.len() <= 2);
        assert!(state.powerups.is_empty());
    }

    #[test]
    fn test_roll_spawns_never_with_zero_chance() {
        let tuning = Tuning {
            enemy_spawn_base_chance: 0.0,
            enemy_spawn_chance_per_level: 0.0,
            powerup_ambient_chance: 0.0,
            ..Tuning::default()
        };
        let mut state = GameState::with_tuning(11, tuning);
        state.enemies.clear();
        for _ in 0..500 {
            roll_spawns(&mut state);
        }
        assert!(state.enemies.is_empty());
    }
}
