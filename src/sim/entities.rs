//! Entity model: tanks, bullets, walls, pickups and cosmetic effects
//!
//! Entities are plain data plus an `advance` step. None of them hold a
//! reference to another entity; targets are looked up every tick.

use std::f32::consts::{FRAC_PI_2, PI, TAU};

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::geometry::{Aabb, clamp_to_arena};
use super::tick::TickInput;
use crate::consts::*;
use crate::tuning::Tuning;
use crate::{angle_between, heading};

/// Anything that occupies a box for collision purposes
pub trait Body {
    fn hitbox(&self) -> Aabb;
}

/// Short-lived entities that age every tick
pub trait Transient {
    /// Advance one tick; returns false once the entity should be removed
    fn advance(&mut self, dt_ms: f64) -> bool;
}

/// Advance every transient and compact out the expired ones
pub fn advance_transients<T: Transient>(items: &mut Vec<T>, dt_ms: f64) {
    items.retain_mut(|item| item.advance(dt_ms));
}

/// Shared shape of every mobile combat entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tank {
    pub pos: Vec2,
    /// Facing (radians); also the barrel direction
    pub angle: f32,
    pub size: Vec2,
    pub speed: f32,
    pub health: f32,
    pub max_health: f32,
    /// Simulation time of the last shot, `None` if it never fired
    pub last_shot_ms: Option<f64>,
    pub cooldown_ms: f64,
}

impl Tank {
    pub fn new(pos: Vec2, size: f32, speed: f32, health: f32, cooldown_ms: f64) -> Self {
        Self {
            pos,
            angle: 0.0,
            size: Vec2::splat(size),
            speed,
            health,
            max_health: health,
            last_shot_ms: None,
            cooldown_ms,
        }
    }

    #[inline]
    pub fn half(&self) -> Vec2 {
        self.size / 2.0
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }

    /// Apply damage, keeping health within `[0, max_health]`. Returns true
    /// if this killed the tank.
    pub fn take_damage(&mut self, amount: f32) -> bool {
        self.health = (self.health - amount).clamp(0.0, self.max_health);
        self.health <= 0.0
    }

    pub fn heal(&mut self, amount: f32) {
        self.health = (self.health + amount).min(self.max_health);
    }

    pub fn ready_to_fire(&self, now_ms: f64) -> bool {
        self.last_shot_ms
            .is_none_or(|last| now_ms - last > self.cooldown_ms)
    }

    /// Consume the cooldown if it has elapsed
    pub fn try_fire(&mut self, now_ms: f64) -> bool {
        if self.ready_to_fire(now_ms) {
            self.last_shot_ms = Some(now_ms);
            true
        } else {
            false
        }
    }

    /// Where a bullet fired along `angle` appears
    pub fn muzzle(&self, angle: f32) -> Vec2 {
        self.pos + heading(angle) * (self.size.x / 2.0 + MUZZLE_OFFSET)
    }

    pub fn step(&mut self, angle: f32, distance: f32) {
        self.pos += heading(angle) * distance;
    }

    pub fn clamp_to_arena(&mut self) {
        self.pos = clamp_to_arena(self.pos, self.half());
    }
}

impl Body for Tank {
    fn hitbox(&self) -> Aabb {
        Aabb::new(self.pos, self.size)
    }
}

/// Temporary multiplier on the player's base speed
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedBoost {
    pub factor: f32,
    pub expires_at_ms: f64,
}

/// What a collected power-up does to the player
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Effect {
    Heal(f32),
    SpeedMultiplier { factor: f32, duration_ms: f64 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub tank: Tank,
    pub base_speed: f32,
    pub boost: Option<SpeedBoost>,
}

impl Player {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            tank: Tank::new(
                Vec2::new(PLAYER_START_X, PLAYER_START_Y),
                STANDARD_TANK_SIZE,
                tuning.player_speed,
                tuning.player_health,
                tuning.player_cooldown_ms,
            ),
            base_speed: tuning.player_speed,
            boost: None,
        }
    }

    pub fn effective_speed(&self) -> f32 {
        match self.boost {
            Some(boost) => self.base_speed * boost.factor,
            None => self.base_speed,
        }
    }

    /// Radius used when sweeping for pickups
    pub fn pickup_radius(&self) -> f32 {
        self.tank.size.x.max(self.tank.size.y) / 2.0 * 0.8
    }

    pub fn apply_effect(&mut self, effect: Effect, now_ms: f64) {
        match effect {
            Effect::Heal(amount) => self.tank.heal(amount),
            Effect::SpeedMultiplier {
                factor,
                duration_ms,
            } => {
                // A second pickup refreshes the timer rather than stacking
                self.boost = Some(SpeedBoost {
                    factor,
                    expires_at_ms: now_ms + duration_ms,
                });
            }
        }
        self.tank.speed = self.effective_speed();
    }

    /// Move from held direction keys and fire if requested.
    ///
    /// Directions are applied left, right, up, down; the last held one
    /// decides the facing. Each move clamps only the moved axis.
    pub fn advance(&mut self, input: &TickInput, now_ms: f64, out: &mut Vec<Bullet>) {
        if self.boost.is_some_and(|b| now_ms >= b.expires_at_ms) {
            self.boost = None;
            self.tank.speed = self.effective_speed();
        }
        let speed = self.tank.speed;
        let half = self.tank.half();

        if input.move_left {
            self.tank.angle = PI;
            self.tank.pos.x = (self.tank.pos.x - speed).max(half.x);
        }
        if input.move_right {
            self.tank.angle = 0.0;
            self.tank.pos.x = (self.tank.pos.x + speed).min(ARENA_WIDTH - half.x);
        }
        if input.move_up {
            self.tank.angle = -FRAC_PI_2;
            self.tank.pos.y = (self.tank.pos.y - speed).max(half.y);
        }
        if input.move_down {
            self.tank.angle = FRAC_PI_2;
            self.tank.pos.y = (self.tank.pos.y + speed).min(ARENA_HEIGHT - half.y);
        }

        if input.fire && self.tank.try_fire(now_ms) {
            let angle = self.tank.angle;
            out.push(Bullet::new(
                self.tank.muzzle(angle),
                angle,
                BULLET_SPEED,
                BULLET_RADIUS,
                Allegiance::Friendly,
            ));
        }
    }
}

/// Friendly computer-controlled tank
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ally {
    pub tank: Tank,
}

impl Ally {
    pub fn new(pos: Vec2, tuning: &Tuning) -> Self {
        Self {
            tank: Tank::new(
                pos,
                STANDARD_TANK_SIZE,
                tuning.ally_speed,
                tuning.ally_health,
                tuning.ally_cooldown_ms,
            ),
        }
    }

    /// Chase and shoot the nearest hostile, or tag along with the player
    pub fn advance(
        &mut self,
        enemies: &[Enemy],
        player_pos: Vec2,
        now_ms: f64,
        tuning: &Tuning,
        out: &mut Vec<Bullet>,
    ) {
        let pos = self.tank.pos;
        let nearest = enemies
            .iter()
            .filter(|e| e.tank.is_alive())
            .min_by(|a, b| a.tank.pos.distance(pos).total_cmp(&b.tank.pos.distance(pos)));

        let (target, desired) = match nearest {
            Some(enemy) => (enemy.tank.pos, 0.0),
            None => (player_pos, tuning.ally_follow_distance),
        };

        let dist = pos.distance(target);
        if dist > 1.0 {
            self.tank.angle = angle_between(pos, target);
            if dist > desired {
                self.tank.step(self.tank.angle, self.tank.speed);
            }
        }

        if let Some(enemy) = nearest
            && self.tank.try_fire(now_ms)
        {
            let angle = angle_between(self.tank.pos, enemy.tank.pos);
            out.push(Bullet::new(
                self.tank.muzzle(angle),
                angle,
                BULLET_SPEED,
                BULLET_RADIUS,
                Allegiance::Friendly,
            ));
        }

        self.tank.clamp_to_arena();
    }
}

/// Behaviour variant of a hostile tank
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Regular opponent; homes in on a cached player position
    Grunt {
        skin: u8,
        target: Vec2,
        last_retarget_ms: Option<f64>,
    },
    /// Boss-level opponent; wanders and aims independently
    Boss {
        variant: u8,
        heading: f32,
        last_turn_ms: Option<f64>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub tank: Tank,
    pub kind: EnemyKind,
}

impl Enemy {
    pub fn grunt(pos: Vec2, skin: u8, speed: f32, player_pos: Vec2, tuning: &Tuning) -> Self {
        let mut tank = Tank::new(
            pos,
            STANDARD_TANK_SIZE,
            speed,
            tuning.enemy_health,
            tuning.enemy_cooldown_ms,
        );
        tank.angle = FRAC_PI_2;
        Self {
            tank,
            kind: EnemyKind::Grunt {
                skin,
                target: player_pos,
                last_retarget_ms: None,
            },
        }
    }

    pub fn boss(
        pos: Vec2,
        variant: u8,
        speed: f32,
        heading: f32,
        level: u32,
        tuning: &Tuning,
    ) -> Self {
        let mut tank = Tank::new(
            pos,
            BOSS_TANK_SIZE,
            speed,
            tuning.boss_health(level),
            tuning.boss_cooldown_ms,
        );
        tank.angle = FRAC_PI_2;
        Self {
            tank,
            kind: EnemyKind::Boss {
                variant,
                heading,
                last_turn_ms: None,
            },
        }
    }

    #[inline]
    pub fn is_boss(&self) -> bool {
        matches!(self.kind, EnemyKind::Boss { .. })
    }

    pub fn advance<R: Rng>(
        &mut self,
        player_pos: Vec2,
        now_ms: f64,
        level: u32,
        tuning: &Tuning,
        rng: &mut R,
        out: &mut Vec<Bullet>,
    ) {
        let tank = &mut self.tank;
        match &mut self.kind {
            EnemyKind::Grunt {
                target,
                last_retarget_ms,
                ..
            } => {
                if last_retarget_ms.is_none_or(|t| now_ms - t > tuning.enemy_retarget_ms) {
                    *target = player_pos;
                    *last_retarget_ms = Some(now_ms);
                }

                if tank.pos.distance(*target) > 0.0 {
                    tank.angle = angle_between(tank.pos, *target);
                    tank.step(tank.angle, tank.speed);
                }

                if tank.try_fire(now_ms) {
                    out.push(Bullet::new(
                        tank.muzzle(tank.angle),
                        tank.angle,
                        BULLET_SPEED * tuning.enemy_bullet_speed_factor,
                        BULLET_RADIUS,
                        Allegiance::Hostile,
                    ));
                }

                tank.clamp_to_arena();
            }
            EnemyKind::Boss {
                heading: course,
                last_turn_ms,
                ..
            } => {
                if last_turn_ms.is_none_or(|t| now_ms - t > tuning.boss_turn_interval_ms) {
                    *course = rng.random::<f32>() * TAU;
                    *last_turn_ms = Some(now_ms);
                }

                tank.step(*course, tank.speed);

                // Bosses stay in the upper half of the arena
                let half = tank.half();
                tank.pos.x = tank.pos.x.clamp(half.x, ARENA_WIDTH - half.x);
                tank.pos.y = tank.pos.y.clamp(half.y, ARENA_HEIGHT / 2.0);

                tank.angle = angle_between(tank.pos, player_pos);

                if tank.try_fire(now_ms) {
                    let speed = BULLET_SPEED * tuning.boss_bullet_speed_factor;
                    let mut fire = |angle: f32| {
                        out.push(
                            Bullet::new(
                                tank.muzzle(tank.angle),
                                angle,
                                speed,
                                HEAVY_BULLET_RADIUS,
                                Allegiance::Hostile,
                            )
                            .heavy(),
                        );
                    };
                    fire(tank.angle);
                    if level >= tuning.boss_spread_level {
                        fire(tank.angle - tuning.boss_spread_angle);
                        fire(tank.angle + tuning.boss_spread_angle);
                    }
                }
            }
        }
    }
}

impl Body for Enemy {
    fn hitbox(&self) -> Aabb {
        self.tank.hitbox()
    }
}

impl Body for Ally {
    fn hitbox(&self) -> Aabb {
        self.tank.hitbox()
    }
}

impl Body for Player {
    fn hitbox(&self) -> Aabb {
        self.tank.hitbox()
    }
}

/// Which side fired a bullet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Allegiance {
    /// Player or ally; hurts enemies only
    Friendly,
    /// Enemy or boss; hurts the player and allies
    Hostile,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bullet {
    pub pos: Vec2,
    pub angle: f32,
    pub speed: f32,
    pub radius: f32,
    pub owner: Allegiance,
    /// Boss rounds: bigger and hit harder
    pub heavy: bool,
}

impl Bullet {
    pub fn new(pos: Vec2, angle: f32, speed: f32, radius: f32, owner: Allegiance) -> Self {
        Self {
            pos,
            angle,
            speed,
            radius,
            owner,
            heavy: false,
        }
    }

    pub fn heavy(mut self) -> Self {
        self.heavy = true;
        self
    }

    #[inline]
    pub fn velocity(&self) -> Vec2 {
        heading(self.angle) * self.speed
    }

    /// Fixed per-tick displacement
    #[inline]
    pub fn advance(&mut self) {
        self.pos += self.velocity();
    }
}

/// Outcome of a bullet striking a wall
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WallHit {
    Absorbed,
    Damaged,
    Destroyed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wall {
    pub pos: Vec2,
    pub size: Vec2,
    pub indestructible: bool,
    pub hit_points: u8,
}

impl Wall {
    pub fn border(pos: Vec2, size: Vec2) -> Self {
        Self {
            pos,
            size,
            indestructible: true,
            hit_points: u8::MAX,
        }
    }

    pub fn destructible(pos: Vec2) -> Self {
        Self {
            pos,
            size: Vec2::splat(WALL_SIZE),
            indestructible: false,
            hit_points: WALL_HIT_POINTS,
        }
    }

    pub fn hit(&mut self) -> WallHit {
        if self.indestructible {
            return WallHit::Absorbed;
        }
        self.hit_points = self.hit_points.saturating_sub(1);
        if self.hit_points == 0 {
            WallHit::Destroyed
        } else {
            WallHit::Damaged
        }
    }

    /// Whether this wall sits on (or overlaps) a remembered slot
    pub fn covers(&self, slot: Vec2) -> bool {
        (self.pos.x - slot.x).abs() < WALL_SIZE && (self.pos.y - slot.y).abs() < WALL_SIZE
    }
}

impl Body for Wall {
    fn hitbox(&self) -> Aabb {
        Aabb::new(self.pos, self.size)
    }
}

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerUpKind {
    Health,
    Speed,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 2] = [PowerUpKind::Health, PowerUpKind::Speed];

    pub fn effect(self, tuning: &Tuning) -> Effect {
        match self {
            PowerUpKind::Health => Effect::Heal(tuning.heal_amount),
            PowerUpKind::Speed => Effect::SpeedMultiplier {
                factor: tuning.speed_boost_factor,
                duration_ms: tuning.speed_boost_ms,
            },
        }
    }

    pub fn color(self) -> u32 {
        match self {
            PowerUpKind::Health => crate::palette::HEALTH_PICKUP,
            PowerUpKind::Speed => crate::palette::SPEED_PICKUP,
        }
    }

    pub fn label(self, tuning: &Tuning) -> String {
        match self {
            PowerUpKind::Health => format!("Health +{}!", tuning.heal_amount),
            PowerUpKind::Speed => "Speed Boost!".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUp {
    pub pos: Vec2,
    pub kind: PowerUpKind,
    pub radius: f32,
    pub elapsed_ms: f64,
    pub max_lifetime_ms: f64,
    /// Set on pickup; the entity lingers briefly for the pickup effect
    pub collected_at_ms: Option<f64>,
}

impl PowerUp {
    pub fn new(pos: Vec2, kind: PowerUpKind, max_lifetime_ms: f64) -> Self {
        Self {
            pos,
            kind,
            radius: POWERUP_RADIUS,
            elapsed_ms: 0.0,
            max_lifetime_ms,
            collected_at_ms: None,
        }
    }

    #[inline]
    pub fn is_collected(&self) -> bool {
        self.collected_at_ms.is_some()
    }

    /// Uncollected and not yet expired
    pub fn is_alive(&self) -> bool {
        !self.is_collected() && self.elapsed_ms < self.max_lifetime_ms
    }
}

impl Transient for PowerUp {
    fn advance(&mut self, dt_ms: f64) -> bool {
        if !self.is_collected() {
            self.elapsed_ms += dt_ms;
        }
        self.is_alive()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub color: u32,
    /// 1 at birth, removed at 0
    pub life: f32,
    pub decay: f32,
}

impl Particle {
    pub fn random<R: Rng>(pos: Vec2, color: u32, rng: &mut R) -> Self {
        let angle = rng.random::<f32>() * TAU;
        let speed = 1.0 + rng.random::<f32>() * 3.0;
        Self {
            pos,
            vel: heading(angle) * speed,
            radius: 2.0 + rng.random::<f32>() * 3.0,
            color,
            life: 1.0,
            decay: 0.02 + rng.random::<f32>() * 0.03,
        }
    }
}

impl Transient for Particle {
    fn advance(&mut self, _dt_ms: f64) -> bool {
        self.pos += self.vel;
        self.life -= self.decay;
        self.life > 0.0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FloatingText {
    pub pos: Vec2,
    pub text: String,
    pub color: u32,
    pub drift: f32,
    pub alpha: f32,
    pub duration_ms: u32,
    pub size: u32,
}

/// Upward drift per tick
pub const TEXT_DRIFT: f32 = -0.5;
/// Alpha lost per tick
pub const TEXT_FADE: f32 = 0.01;

impl FloatingText {
    pub fn new(
        text: impl Into<String>,
        pos: Vec2,
        color: u32,
        duration_ms: u32,
        size: u32,
    ) -> Self {
        Self {
            pos,
            text: text.into(),
            color,
            drift: TEXT_DRIFT,
            alpha: 1.0,
            duration_ms,
            size,
        }
    }
}

impl Transient for FloatingText {
    fn advance(&mut self, _dt_ms: f64) -> bool {
        self.pos.y += self.drift;
        self.alpha -= TEXT_FADE;
        self.alpha > 0.0
    }
}
