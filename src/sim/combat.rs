//! Combat resolution: bullets against walls and tanks, and pickups
//!
//! Bullets are walked from the back of the list so that removing the
//! current one never shifts an entry that is still to be processed.

use glam::Vec2;
use rand::Rng;

use super::entities::{Allegiance, Body, Bullet, WallHit};
use super::geometry::{circle_vs_circle, out_of_arena};
use super::spawn;
use super::state::{GameState, GamePhase};
use crate::palette;
use crate::tuning::Tuning;

/// What a single bullet ran into this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Impact {
    /// Still flying
    None,
    OutOfBounds,
    Wall,
    Enemy,
    Player,
    Ally,
}

/// Damage a bullet deals, doubled (by default) for boss rounds
fn damage(bullet: &Bullet, base: f32, tuning: &Tuning) -> f32 {
    if bullet.heavy {
        base * tuning.heavy_damage_multiplier
    } else {
        base
    }
}

/// Advance and resolve every bullet.
///
/// Returns false if the player died, in which case the rest of the tick
/// must be skipped.
pub fn resolve_bullets(state: &mut GameState) -> bool {
    let mut i = state.bullets.len();
    while i > 0 {
        i -= 1;
        state.bullets[i].advance();
        let bullet = state.bullets[i];

        let impact = resolve_bullet(state, &bullet);
        if impact != Impact::None {
            log::trace!("{:?} bullet resolved: {:?}", bullet.owner, impact);
            state.bullets.remove(i);
        }
        if state.phase == GamePhase::GameOver {
            return false;
        }
    }
    true
}

fn resolve_bullet(state: &mut GameState, bullet: &Bullet) -> Impact {
    if out_of_arena(bullet.pos) {
        return Impact::OutOfBounds;
    }
    if hit_wall(state, bullet) {
        return Impact::Wall;
    }
    match bullet.owner {
        Allegiance::Friendly => {
            if hit_enemy(state, bullet) {
                Impact::Enemy
            } else {
                Impact::None
            }
        }
        Allegiance::Hostile => hit_friendly(state, bullet),
    }
}

/// First wall the bullet overlaps absorbs it
fn hit_wall(state: &mut GameState, bullet: &Bullet) -> bool {
    let Some(j) = state
        .walls
        .iter()
        .rposition(|wall| wall.hitbox().intersects_circle(bullet.pos, bullet.radius))
    else {
        return false;
    };

    match state.walls[j].hit() {
        WallHit::Absorbed => {}
        WallHit::Damaged => state.burst(bullet.pos, palette::DEBRIS, 5),
        WallHit::Destroyed => {
            state.burst(bullet.pos, palette::DEBRIS, 5);
            let wall = state.walls.remove(j);
            state.burst(wall.pos, palette::DEBRIS, 15);
        }
    }
    true
}

fn hit_enemy(state: &mut GameState, bullet: &Bullet) -> bool {
    let Some(j) = state
        .enemies
        .iter()
        .rposition(|enemy| enemy.hitbox().intersects_circle(bullet.pos, bullet.radius))
    else {
        return false;
    };

    let amount = damage(bullet, state.tuning.damage_to_enemy, &state.tuning);
    let killed = state.enemies[j].tank.take_damage(amount);
    state.burst(bullet.pos, palette::ENEMY, 5);

    if killed {
        let enemy = state.enemies.remove(j);
        state.score += state.tuning.kill_score;
        state.kills += 1;
        if enemy.is_boss() {
            log::info!("Boss defeated at level {}", state.level);
        }

        let pos = enemy.tank.pos;
        let label = format!("+{}", state.tuning.kill_score);
        state.burst(pos, palette::ENEMY, 20);
        state.float_text(label, pos - Vec2::new(0.0, 30.0), palette::SCORE);

        if state.rng.random::<f32>() < state.tuning.powerup_drop_chance {
            spawn::spawn_power_up(state, false);
        }
    }
    true
}

/// Hostile bullets check the player first, then each ally
fn hit_friendly(state: &mut GameState, bullet: &Bullet) -> Impact {
    if state.player.hitbox().intersects_circle(bullet.pos, bullet.radius) {
        let amount = damage(bullet, state.tuning.damage_to_player, &state.tuning);
        let killed = state.player.tank.take_damage(amount);
        state.burst(bullet.pos, palette::PLAYER, 10);
        if killed {
            state.phase = GamePhase::GameOver;
            log::info!(
                "Game over at level {} with score {}",
                state.level,
                state.score
            );
        }
        return Impact::Player;
    }

    let Some(a) = state
        .allies
        .iter()
        .rposition(|ally| {
            ally.tank.is_alive() && ally.hitbox().intersects_circle(bullet.pos, bullet.radius)
        })
    else {
        return Impact::None;
    };

    let amount = damage(bullet, state.tuning.damage_to_ally, &state.tuning);
    let downed = state.allies[a].tank.take_damage(amount);
    state.burst(bullet.pos, palette::ALLY, 10);
    if downed {
        // Removed during the ally pass
        let pos = state.allies[a].tank.pos;
        state.float_text("ALLY DOWN", pos - Vec2::new(0.0, 25.0), palette::ALLY_DOWN);
    }
    Impact::Ally
}

/// Age power-ups, apply pickups and drop spent or expired ones
pub fn update_powerups(state: &mut GameState, dt_ms: f64) {
    state.age_powerups(dt_ms);

    let now = state.clock_ms;
    let player_pos = state.player.tank.pos;
    let reach = state.player.pickup_radius();

    for i in (0..state.powerups.len()).rev() {
        let powerup = &state.powerups[i];
        if powerup.is_collected() || !powerup.is_alive() {
            continue;
        }
        if !circle_vs_circle(player_pos, reach, powerup.pos, powerup.radius) {
            continue;
        }

        let (kind, pos) = (powerup.kind, powerup.pos);
        state.powerups[i].collected_at_ms = Some(now);
        let effect = kind.effect(&state.tuning);
        state.player.apply_effect(effect, now);
        log::debug!("Collected {:?} power-up", kind);

        state.burst(pos, kind.color(), 20);
        let label = kind.label(&state.tuning);
        state.float_text(label, pos - Vec2::new(0.0, 30.0), kind.color());
        state.play_tone(800.0, 1200.0, 0.5, 0.5);
    }

    let grace = state.tuning.powerup_pickup_grace_ms;
    state.powerups.retain(|p| match p.collected_at_ms {
        Some(at) => now - at < grace,
        None => p.is_alive(),
    });
}
