//! Game state: the world aggregate that owns every entity
//!
//! Subsystems receive `&mut GameState` explicitly; nothing lives in globals.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::director::{self, Stage};
use super::entities::{
    Ally, Bullet, Enemy, FloatingText, Particle, Player, PowerUp, Transient, Wall,
};
use super::events::{GameEvent, Hud, TEXT_DURATION_MS, TEXT_SIZE};
use super::spawn;
use crate::consts::INITIAL_ENEMIES;
use crate::tuning::Tuning;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Frozen; ticks do nothing until unpaused
    Paused,
    /// Player destroyed; only a restart leaves this phase
    GameOver,
}

/// Complete game state (deterministic for a given seed and input stream)
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub tuning: Tuning,
    pub rng: Pcg32,
    /// Simulation clock, advanced only by the driver's delta
    pub clock_ms: f64,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub phase: GamePhase,
    pub score: u64,
    pub level: u32,
    /// Kills since the last level-up
    pub kills: u32,
    pub enemy_cap: usize,
    /// Whether this boss level has already produced its boss
    pub boss_spawned: bool,
    pub last_wall_respawn_ms: f64,
    pub player: Player,
    pub allies: Vec<Ally>,
    /// Grunts and the boss
    pub enemies: Vec<Enemy>,
    pub bullets: Vec<Bullet>,
    pub walls: Vec<Wall>,
    /// Original destructible wall positions, used for respawning
    pub wall_slots: Vec<Vec2>,
    pub powerups: Vec<PowerUp>,
    /// Visual particles (not gameplay-affecting)
    pub particles: Vec<Particle>,
    pub texts: Vec<FloatingText>,
    /// Presentation events raised during the current tick
    events: Vec<GameEvent>,
}

/// Read-only view of the world for renderers
#[derive(Debug, Serialize)]
pub struct Snapshot<'a> {
    pub phase: GamePhase,
    pub stage: Stage,
    pub hud: Hud,
    pub player: &'a Player,
    pub allies: &'a [Ally],
    pub enemies: &'a [Enemy],
    pub bullets: &'a [Bullet],
    pub walls: &'a [Wall],
    pub powerups: &'a [PowerUp],
    pub particles: &'a [Particle],
    pub texts: &'a [FloatingText],
}

impl GameState {
    /// Create a new game with default tuning
    pub fn new(seed: u64) -> Self {
        Self::with_tuning(seed, Tuning::default())
    }

    pub fn with_tuning(seed: u64, tuning: Tuning) -> Self {
        let player = Player::new(&tuning);
        let mut state = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            clock_ms: 0.0,
            time_ticks: 0,
            phase: GamePhase::Playing,
            score: 0,
            level: 1,
            kills: 0,
            enemy_cap: tuning.enemy_cap(1),
            boss_spawned: false,
            last_wall_respawn_ms: 0.0,
            player,
            allies: Vec::new(),
            enemies: Vec::new(),
            bullets: Vec::new(),
            walls: Vec::new(),
            wall_slots: Vec::new(),
            powerups: Vec::new(),
            particles: Vec::new(),
            texts: Vec::new(),
            events: Vec::new(),
            tuning,
        };
        state.populate();
        state
    }

    /// Reset everything except the RNG stream and tuning
    pub fn restart(&mut self) {
        log::info!("Restarting run (previous score {})", self.score);
        self.clock_ms = 0.0;
        self.time_ticks = 0;
        self.phase = GamePhase::Playing;
        self.score = 0;
        self.level = 1;
        self.kills = 0;
        self.enemy_cap = self.tuning.enemy_cap(1);
        self.boss_spawned = false;
        self.last_wall_respawn_ms = 0.0;
        self.player = Player::new(&self.tuning);
        self.allies.clear();
        self.enemies.clear();
        self.bullets.clear();
        self.powerups.clear();
        self.particles.clear();
        self.texts.clear();
        self.events.clear();
        self.populate();
    }

    fn populate(&mut self) {
        spawn::create_level(self);
        for _ in 0..INITIAL_ENEMIES {
            spawn::spawn_enemy(self);
        }
    }

    pub fn boss(&self) -> Option<&Enemy> {
        self.enemies.iter().find(|e| e.is_boss())
    }

    pub fn destructible_wall_count(&self) -> usize {
        self.walls.iter().filter(|w| !w.indestructible).count()
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    pub fn hud(&self) -> Hud {
        Hud {
            health: self.player.tank.health.max(0.0).ceil() as u32,
            score: self.score,
            level: self.level,
        }
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            phase: self.phase,
            stage: director::stage(self),
            hud: self.hud(),
            player: &self.player,
            allies: &self.allies,
            enemies: &self.enemies,
            bullets: &self.bullets,
            walls: &self.walls,
            powerups: &self.powerups,
            particles: &self.particles,
            texts: &self.texts,
        }
    }

    /// Spawn `count` particles at `pos` and tell the presentation layer
    pub fn burst(&mut self, pos: Vec2, color: u32, count: u32) {
        for _ in 0..count {
            let particle = Particle::random(pos, color, &mut self.rng);
            self.particles.push(particle);
        }
        self.events.push(GameEvent::SpawnParticles { pos, color, count });
    }

    /// Floating label with the default duration and size
    pub fn float_text(&mut self, text: impl Into<String>, pos: Vec2, color: u32) {
        self.announce(text, pos, color, TEXT_DURATION_MS, TEXT_SIZE);
    }

    pub fn announce(
        &mut self,
        text: impl Into<String>,
        pos: Vec2,
        color: u32,
        duration_ms: u32,
        size: u32,
    ) {
        let label = FloatingText::new(text, pos, color, duration_ms, size);
        self.events.push(GameEvent::SpawnFloatingText {
            text: label.text.clone(),
            pos,
            color,
            duration_ms,
            size,
        });
        self.texts.push(label);
    }

    pub fn play_tone(&mut self, start_hz: f32, end_hz: f32, duration_s: f32, gain: f32) {
        self.events.push(GameEvent::PlayTone {
            start_hz,
            end_hz,
            duration_s,
            gain,
        });
    }

    /// Take the events raised since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub(crate) fn advance_cosmetics(&mut self, dt_ms: f64) {
        super::entities::advance_transients(&mut self.particles, dt_ms);
        super::entities::advance_transients(&mut self.texts, dt_ms);
    }

    /// Powerups age like any other transient; kept separate because pickups
    /// must be checked between aging and removal.
    pub(crate) fn age_powerups(&mut self, dt_ms: f64) {
        for powerup in &mut self.powerups {
            powerup.advance(dt_ms);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;

    #[test]
    fn test_new_game_layout() {
        let state = GameState::new(12345);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.level, 1);
        assert_eq!(state.score, 0);
        assert_eq!(state.walls.iter().filter(|w| w.indestructible).count(), 4);
        assert!(state.destructible_wall_count() <= 15);
        assert_eq!(state.destructible_wall_count(), state.wall_slots.len());
        assert!(state.enemies.len() <= INITIAL_ENEMIES);
        assert!(state.enemies.iter().all(|e| !e.is_boss()));
        assert_eq!(
            state.player.tank.pos,
            Vec2::new(PLAYER_START_X, PLAYER_START_Y)
        );
    }

    #[test]
    fn test_same_seed_same_world() {
        let a = GameState::new(99);
        let b = GameState::new(99);
        assert_eq!(a.wall_slots, b.wall_slots);
        assert_eq!(a.enemies.len(), b.enemies.len());
        for (ea, eb) in a.enemies.iter().zip(&b.enemies) {
            assert_eq!(ea.tank.pos, eb.tank.pos);
        }
    }

    #[test]
    fn test_hud_rounds_health_up() {
        let mut state = GameState::new(1);
        state.player.tank.health = 42.5;
        state.score = 300;
        assert_eq!(
            state.hud(),
            Hud {
                health: 43,
                score: 300,
                level: 1
            }
        );
    }

    #[test]
    fn test_burst_records_event() {
        let mut state = GameState::new(1);
        state.burst(Vec2::new(10.0, 10.0), 0xabcdef, 7);
        assert_eq!(state.particles.len(), 7);
        let events = state.drain_events();
        assert_eq!(
            events,
            vec![GameEvent::SpawnParticles {
                pos: Vec2::new(10.0, 10.0),
                color: 0xabcdef,
                count: 7
            }]
        );
        assert!(state.drain_events().is_empty());
    }

    #[test]
    fn test_snapshot_serializes() {
        let state = GameState::new(3);
        let json = serde_json::to_string(&state.snapshot()).unwrap();
        assert!(json.contains("\"phase\":\"Playing\""));
        assert!(json.contains("\"walls\""));
    }
}
