//! Data-driven game balance
//!
//! Every gameplay number that a designer might want to tweak lives here.
//! Geometry (arena size, tank footprints) stays in [`crate::consts`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced while loading a tuning file
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("malformed tuning json: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid tuning value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Gameplay balance values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Player ===
    pub player_speed: f32,
    pub player_health: f32,
    pub player_cooldown_ms: f64,

    // === Allies ===
    pub max_allies: usize,
    pub ally_speed: f32,
    pub ally_health: f32,
    pub ally_cooldown_ms: f64,
    /// How close an idle ally follows the player
    pub ally_follow_distance: f32,

    // === Enemies ===
    pub enemy_health: f32,
    pub enemy_base_speed: f32,
    pub enemy_speed_jitter: f32,
    pub enemy_cooldown_ms: f64,
    pub enemy_retarget_ms: f64,
    /// Enemy bullets fly at this fraction of the base bullet speed
    pub enemy_bullet_speed_factor: f32,

    // === Boss ===
    pub boss_level_interval: u32,
    pub boss_base_health: f32,
    pub boss_health_per_level: f32,
    pub boss_base_speed: f32,
    pub boss_speed_jitter: f32,
    pub boss_cooldown_ms: f64,
    pub boss_turn_interval_ms: f64,
    pub boss_bullet_speed_factor: f32,
    /// Level from which the boss fires a three-way spread
    pub boss_spread_level: u32,
    pub boss_spread_angle: f32,

    // === Damage & scoring ===
    pub damage_to_enemy: f32,
    pub damage_to_player: f32,
    pub damage_to_ally: f32,
    pub heavy_damage_multiplier: f32,
    pub kill_score: u64,

    // === Progression ===
    pub kills_per_level: u32,
    pub base_enemy_cap: usize,
    pub max_enemy_cap: usize,
    pub enemy_spawn_base_chance: f32,
    pub enemy_spawn_chance_per_level: f32,

    // === Walls ===
    pub destructible_walls: usize,
    pub wall_respawn_ms: f64,
    pub wall_respawn_batch: usize,
    /// Walls never appear closer than this to the player
    pub wall_player_clearance: f32,

    // === Power-ups ===
    pub powerup_lifetime_ms: f64,
    pub powerup_pickup_grace_ms: f64,
    pub powerup_spawn_gate: f32,
    pub powerup_drop_chance: f32,
    pub powerup_ambient_chance: f32,
    pub max_powerups: usize,
    pub heal_amount: f32,
    pub speed_boost_factor: f32,
    pub speed_boost_ms: f64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            player_speed: 3.0,
            player_health: 100.0,
            player_cooldown_ms: 500.0,

            max_allies: 2,
            ally_speed: 2.0,
            ally_health: 80.0,
            ally_cooldown_ms: 800.0,
            ally_follow_distance: 60.0,

            enemy_health: 50.0,
            enemy_base_speed: 1.0,
            enemy_speed_jitter: 0.5,
            enemy_cooldown_ms: 2000.0,
            enemy_retarget_ms: 1000.0,
            enemy_bullet_speed_factor: 0.8,

            boss_level_interval: 5,
            boss_base_health: 200.0,
            boss_health_per_level: 20.0,
            boss_base_speed: 0.5,
            boss_speed_jitter: 0.5,
            boss_cooldown_ms: 1500.0,
            boss_turn_interval_ms: 1000.0,
            boss_bullet_speed_factor: 1.2,
            boss_spread_level: 10,
            boss_spread_angle: 0.3,

            damage_to_enemy: 25.0,
            damage_to_player: 10.0,
            damage_to_ally: 15.0,
            heavy_damage_multiplier: 2.0,
            kill_score: 100,

            kills_per_level: 5,
            base_enemy_cap: 5,
            max_enemy_cap: 10,
            enemy_spawn_base_chance: 0.01,
            enemy_spawn_chance_per_level: 0.002,

            destructible_walls: 15,
            wall_respawn_ms: 10_000.0,
            wall_respawn_batch: 3,
            wall_player_clearance: 100.0,

            powerup_lifetime_ms: 20_000.0,
            powerup_pickup_grace_ms: 100.0,
            powerup_spawn_gate: 0.4,
            powerup_drop_chance: 0.3,
            powerup_ambient_chance: 0.0007,
            max_powerups: 3,
            heal_amount: 30.0,
            speed_boost_factor: 1.5,
            speed_boost_ms: 10_000.0,
        }
    }
}

impl Tuning {
    /// Parse and validate tuning from JSON. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Like [`Tuning::from_json`] but falls back to defaults on any error
    pub fn from_json_or_default(json: &str) -> Self {
        match Self::from_json(json) {
            Ok(tuning) => {
                log::info!("Loaded tuning overrides");
                tuning
            }
            Err(err) => {
                log::warn!("Using default tuning: {}", err);
                Self::default()
            }
        }
    }

    pub fn to_json(&self) -> Result<String, TuningError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values the simulation cannot work with
    pub fn validate(&self) -> Result<(), TuningError> {
        fn positive(field: &'static str, value: f64) -> Result<(), TuningError> {
            if value > 0.0 && value.is_finite() {
                Ok(())
            } else {
                Err(TuningError::Invalid {
                    field,
                    reason: format!("must be positive, got {value}"),
                })
            }
        }
        fn non_negative(field: &'static str, value: f64) -> Result<(), TuningError> {
            if value >= 0.0 && value.is_finite() {
                Ok(())
            } else {
                Err(TuningError::Invalid {
                    field,
                    reason: format!("must be zero or more, got {value}"),
                })
            }
        }
        fn probability(field: &'static str, value: f32) -> Result<(), TuningError> {
            if (0.0..=1.0).contains(&value) {
                Ok(())
            } else {
                Err(TuningError::Invalid {
                    field,
                    reason: format!("must be within [0, 1], got {value}"),
                })
            }
        }

        positive("player_health", self.player_health as f64)?;
        positive("ally_health", self.ally_health as f64)?;
        positive("enemy_health", self.enemy_health as f64)?;
        positive("boss_base_health", self.boss_base_health as f64)?;
        positive("powerup_lifetime_ms", self.powerup_lifetime_ms)?;
        positive("wall_respawn_ms", self.wall_respawn_ms)?;
        positive("heavy_damage_multiplier", self.heavy_damage_multiplier as f64)?;
        positive("speed_boost_factor", self.speed_boost_factor as f64)?;
        non_negative("damage_to_enemy", self.damage_to_enemy as f64)?;
        non_negative("damage_to_player", self.damage_to_player as f64)?;
        non_negative("damage_to_ally", self.damage_to_ally as f64)?;
        non_negative("heal_amount", self.heal_amount as f64)?;
        non_negative("speed_boost_ms", self.speed_boost_ms)?;
        non_negative("player_cooldown_ms", self.player_cooldown_ms)?;
        non_negative("ally_cooldown_ms", self.ally_cooldown_ms)?;
        non_negative("enemy_cooldown_ms", self.enemy_cooldown_ms)?;
        non_negative("boss_cooldown_ms", self.boss_cooldown_ms)?;
        probability("powerup_spawn_gate", self.powerup_spawn_gate)?;
        probability("powerup_drop_chance", self.powerup_drop_chance)?;
        probability("powerup_ambient_chance", self.powerup_ambient_chance)?;
        probability("enemy_spawn_base_chance", self.enemy_spawn_base_chance)?;

        if self.boss_level_interval == 0 {
            return Err(TuningError::Invalid {
                field: "boss_level_interval",
                reason: "must be at least 1".into(),
            });
        }
        if self.kills_per_level == 0 {
            return Err(TuningError::Invalid {
                field: "kills_per_level",
                reason: "must be at least 1".into(),
            });
        }
        if self.base_enemy_cap > self.max_enemy_cap {
            return Err(TuningError::Invalid {
                field: "base_enemy_cap",
                reason: format!(
                    "{} exceeds max_enemy_cap {}",
                    self.base_enemy_cap, self.max_enemy_cap
                ),
            });
        }
        Ok(())
    }

    /// Per-tick chance of an enemy spawn at `level`
    pub fn enemy_spawn_chance(&self, level: u32) -> f32 {
        self.enemy_spawn_base_chance + level as f32 * self.enemy_spawn_chance_per_level
    }

    /// Concurrent enemy cap at `level`
    pub fn enemy_cap(&self, level: u32) -> usize {
        (self.base_enemy_cap + (level / 2) as usize).min(self.max_enemy_cap)
    }

    pub fn boss_health(&self, level: u32) -> f32 {
        self.boss_base_health + level as f32 * self.boss_health_per_level
    }

    pub fn is_boss_level(&self, level: u32) -> bool {
        level.is_multiple_of(self.boss_level_interval)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(Tuning::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "kill_score": 250 }"#).unwrap();
        assert_eq!(tuning.kill_score, 250);
        assert_eq!(tuning.max_allies, 2);
        assert_eq!(tuning.destructible_walls, 15);
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let err = Tuning::from_json("{ not json").unwrap_err();
        assert!(matches!(err, TuningError::Parse(_)));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = Tuning::from_json(r#"{ "powerup_spawn_gate": 1.5 }"#).unwrap_err();
        assert!(matches!(
            err,
            TuningError::Invalid {
                field: "powerup_spawn_gate",
                ..
            }
        ));

        let err = Tuning::from_json(r#"{ "boss_level_interval": 0 }"#).unwrap_err();
        assert!(matches!(err, TuningError::Invalid { .. }));
    }

    #[test]
    fn test_negative_damage_and_bad_effects_rejected() {
        for json in [
            r#"{ "damage_to_enemy": -25.0 }"#,
            r#"{ "damage_to_player": -1.0 }"#,
            r#"{ "damage_to_ally": -15.0 }"#,
            r#"{ "heavy_damage_multiplier": 0.0 }"#,
            r#"{ "heal_amount": -30.0 }"#,
            r#"{ "speed_boost_factor": -1.5 }"#,
            r#"{ "speed_boost_ms": -1.0 }"#,
            r#"{ "player_cooldown_ms": -500.0 }"#,
            r#"{ "boss_cooldown_ms": -1.0 }"#,
        ] {
            let err = Tuning::from_json(json).unwrap_err();
            assert!(matches!(err, TuningError::Invalid { .. }), "{json} accepted");
        }
        // Zero damage and instant cooldowns are allowed
        let tuning =
            Tuning::from_json(r#"{ "damage_to_ally": 0.0, "enemy_cooldown_ms": 0.0 }"#).unwrap();
        assert_eq!(tuning.damage_to_ally, 0.0);
    }

    #[test]
    fn test_fallback_to_default() {
        let tuning = Tuning::from_json_or_default(r#"{ "enemy_health": -1 }"#);
        assert_eq!(tuning, Tuning::default());
    }

    #[test]
    fn test_json_roundtrip_preserves_overrides() {
        let mut tuning = Tuning::default();
        tuning.max_powerups = 7;
        tuning.kills_per_level = 3;
        let json = tuning.to_json().unwrap();
        let loaded = Tuning::from_json(&json).unwrap();
        assert_eq!(loaded.max_powerups, 7);
        assert_eq!(loaded.kills_per_level, 3);
        assert_eq!(loaded.heal_amount, 30.0);
    }

    #[test]
    fn test_enemy_cap_scaling() {
        let tuning = Tuning::default();
        assert_eq!(tuning.enemy_cap(1), 5);
        assert_eq!(tuning.enemy_cap(2), 6);
        assert_eq!(tuning.enemy_cap(9), 9);
        assert_eq!(tuning.enemy_cap(10), 10);
        assert_eq!(tuning.enemy_cap(40), 10);
    }

    #[test]
    fn test_spawn_chance_and_boss_health() {
        let tuning = Tuning::default();
        assert!((tuning.enemy_spawn_chance(1) - 0.012).abs() < 1e-6);
        assert!((tuning.enemy_spawn_chance(10) - 0.03).abs() < 1e-6);
        assert_eq!(tuning.boss_health(5), 300.0);
        assert!(tuning.is_boss_level(5));
        assert!(tuning.is_boss_level(10));
        assert!(!tuning.is_boss_level(6));
    }
}
