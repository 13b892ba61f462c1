//! Spawning: wall layout and respawn, enemies, the boss, allies, pickups
//!
//! Positions come from rejection sampling with a fixed attempt budget. A
//! spawn that runs out of attempts silently does nothing.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;

use super::entities::{Ally, Enemy, PowerUp, PowerUpKind, Wall};
use super::geometry::circle_vs_box;
use super::state::GameState;
use crate::consts::*;
use crate::palette;

/// Probe radius used when checking a spawn point for clearance
pub const SPAWN_PROBE_RADIUS: f32 = 40.0;
/// Minimum spacing between power-ups
pub const POWERUP_SPACING: f32 = 80.0;
const ENEMY_SPAWN_ATTEMPTS: u32 = 50;
const POWERUP_SPAWN_ATTEMPTS: u32 = 30;
/// Allies appear within this offset of the player on each axis
const ALLY_SPAWN_OFFSET: f32 = 50.0;
/// Vertical extent of the enemy entry strip
const ENEMY_STRIP_HEIGHT: f32 = 100.0;
/// Spawn points keep this margin from the arena edge
const SPAWN_MARGIN: f32 = 50.0;

/// Random point in the playfield interior (above the player's home row)
fn random_field_point<R: Rng>(rng: &mut R, height: f32) -> Vec2 {
    let x = SPAWN_MARGIN + rng.random::<f32>() * (ARENA_WIDTH - 2.0 * SPAWN_MARGIN);
    let y = SPAWN_MARGIN + rng.random::<f32>() * height;
    Vec2::new(x, y)
}

/// Height of the band used for walls and pickups
fn field_height() -> f32 {
    ARENA_HEIGHT - 4.0 * SPAWN_MARGIN
}

/// Build the border and the initial destructible walls.
///
/// Every accepted destructible position is remembered as a slot.
pub fn create_level(state: &mut GameState) {
    state.walls.clear();
    state.wall_slots.clear();

    let (w, h, t) = (ARENA_WIDTH, ARENA_HEIGHT, BORDER_THICKNESS);
    state.walls.extend([
        Wall::border(Vec2::new(0.0, h / 2.0), Vec2::new(t, h)),
        Wall::border(Vec2::new(w, h / 2.0), Vec2::new(t, h)),
        Wall::border(Vec2::new(w / 2.0, 0.0), Vec2::new(w, t)),
        Wall::border(Vec2::new(w / 2.0, h), Vec2::new(w, t)),
    ]);

    let start = Vec2::new(PLAYER_START_X, PLAYER_START_Y);
    let clearance = state.tuning.wall_player_clearance;
    for _ in 0..state.tuning.destructible_walls {
        let pos = random_field_point(&mut state.rng, field_height());
        // Only reject spots that crowd the start on both axes
        if (pos.x - start.x).abs() > clearance || (pos.y - start.y).abs() > clearance {
            state.walls.push(Wall::destructible(pos));
            state.wall_slots.push(pos);
        }
    }

    log::debug!(
        "Level layout: {} destructible walls",
        state.wall_slots.len()
    );
}

/// Periodically rebuild destroyed walls on free slots away from the player
pub fn respawn_walls(state: &mut GameState) {
    let now = state.clock_ms;
    if now - state.last_wall_respawn_ms < state.tuning.wall_respawn_ms {
        return;
    }
    if state.wall_slots.is_empty() {
        return;
    }
    if state.destructible_wall_count() >= state.tuning.destructible_walls {
        state.last_wall_respawn_ms = now;
        return;
    }

    let mut free: Vec<Vec2> = state
        .wall_slots
        .iter()
        .copied()
        .filter(|&slot| !state.walls.iter().any(|wall| wall.covers(slot)))
        .collect();

    let batch = free.len().min(state.tuning.wall_respawn_batch);
    let player_pos = state.player.tank.pos;
    let mut rebuilt = 0;
    for _ in 0..batch {
        let slot = free.swap_remove(state.rng.random_range(0..free.len()));
        if slot.distance(player_pos) > state.tuning.wall_player_clearance {
            state.walls.push(Wall::destructible(slot));
            state.burst(slot, palette::DEBRIS, 10);
            rebuilt += 1;
        }
    }

    if rebuilt > 0 {
        log::debug!("Respawned {} walls", rebuilt);
    }
    state.last_wall_respawn_ms = now;
}

/// True if a circle at `pos` would overlap the player or any wall
pub fn is_position_occupied(state: &GameState, pos: Vec2, radius: f32) -> bool {
    let player = &state.player.tank;
    if pos.distance(player.pos) < radius + player.size.x / 2.0 {
        return true;
    }
    state
        .walls
        .iter()
        .any(|wall| circle_vs_box(pos, radius, wall.pos, wall.size))
}

/// Spawn a grunt in the top strip, or the boss on a boss level.
///
/// Returns true if something was spawned.
pub fn spawn_enemy(state: &mut GameState) -> bool {
    if state.tuning.is_boss_level(state.level) && !state.boss_spawned {
        return spawn_boss(state);
    }
    if state.enemies.len() >= state.enemy_cap {
        return false;
    }

    let mut found = None;
    for _ in 0..ENEMY_SPAWN_ATTEMPTS {
        let pos = random_field_point(&mut state.rng, ENEMY_STRIP_HEIGHT);
        if !is_position_occupied(state, pos, SPAWN_PROBE_RADIUS) {
            found = Some(pos);
            break;
        }
    }
    let Some(pos) = found else {
        log::debug!("No room for an enemy");
        return false;
    };

    let skin = state.rng.random_range(0..ENEMY_SKINS);
    let speed = state.tuning.enemy_base_speed
        + state.rng.random::<f32>() * state.tuning.enemy_speed_jitter;
    let enemy = Enemy::grunt(pos, skin, speed, state.player.tank.pos, &state.tuning);
    state.enemies.push(enemy);
    true
}

/// Spawn the level's boss near the top. Ignores the enemy cap.
pub fn spawn_boss(state: &mut GameState) -> bool {
    if state.boss_spawned || state.boss().is_some() {
        return false;
    }

    let x = ARENA_WIDTH / 2.0 + state.rng.random::<f32>() * 200.0 - 100.0;
    let pos = Vec2::new(x, 100.0);
    let speed =
        state.tuning.boss_base_speed + state.rng.random::<f32>() * state.tuning.boss_speed_jitter;
    let heading = state.rng.random::<f32>() * TAU;
    let variant = state.rng.random_range(0..BOSS_VARIANTS);

    let boss = Enemy::boss(pos, variant, speed, heading, state.level, &state.tuning);
    log::info!(
        "Boss spawned at level {} with {} hp",
        state.level,
        boss.tank.health
    );
    state.enemies.push(boss);
    state.boss_spawned = true;

    state.announce(
        "BOSS INCOMING!",
        Vec2::new(ARENA_WIDTH / 2.0, ARENA_HEIGHT / 2.0 - 50.0),
        palette::ALERT,
        2000,
        36,
    );
    true
}

/// Deploy an ally next to the player if under the cap
pub fn spawn_ally(state: &mut GameState) -> bool {
    if state.allies.len() >= state.tuning.max_allies {
        return false;
    }

    let player_pos = state.player.tank.pos;
    let mut offset =
        || state.rng.random::<f32>() * ALLY_SPAWN_OFFSET * 2.0 - ALLY_SPAWN_OFFSET;
    let (dx, dy) = (offset(), offset());
    let pos = Vec2::new(
        (player_pos.x + dx).clamp(TANK_SIZE, ARENA_WIDTH - TANK_SIZE),
        (player_pos.y + dy).clamp(TANK_SIZE, ARENA_HEIGHT - TANK_SIZE),
    );

    state.allies.push(Ally::new(pos, &state.tuning));
    log::debug!("Ally deployed at ({:.0}, {:.0})", pos.x, pos.y);

    state.float_text("ALLY DEPLOYED", pos - Vec2::new(0.0, 30.0), palette::ALLY);
    true
}

/// Try to drop a power-up somewhere clear.
///
/// Unforced spawns pass a probability gate first. Returns true on success.
pub fn spawn_power_up(state: &mut GameState, force: bool) -> bool {
    if !force && state.rng.random::<f32>() > state.tuning.powerup_spawn_gate {
        return false;
    }

    let kind = PowerUpKind::ALL[state.rng.random_range(0..PowerUpKind::ALL.len())];

    let mut found = None;
    for _ in 0..POWERUP_SPAWN_ATTEMPTS {
        let pos = random_field_point(&mut state.rng, field_height());
        if is_position_occupied(state, pos, SPAWN_PROBE_RADIUS) {
            continue;
        }
        let crowded = state
            .powerups
            .iter()
            .any(|p| p.pos.distance(pos) < POWERUP_SPACING);
        if !crowded {
            found = Some(pos);
            break;
        }
    }

    match found {
        Some(pos) => {
            let lifetime = state.tuning.powerup_lifetime_ms;
            state.powerups.push(PowerUp::new(pos, kind, lifetime));
            log::debug!("Spawned {:?} power-up", kind);
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entities::EnemyKind;
    use crate::tuning::Tuning;

    fn empty_state(seed: u64) -> GameState {
        let mut state = GameState::new(seed);
        state.enemies.clear();
        state.walls.retain(|w| w.indestructible);
        state
    }

    #[test]
    fn test_border_walls_seal_arena() {
        let state = GameState::new(7);
        let borders: Vec<_> = state.walls.iter().filter(|w| w.indestructible).collect();
        assert_eq!(borders.len(), 4);
        assert_eq!(borders[0].pos, Vec2::new(0.0, 300.0));
        assert_eq!(borders[0].size, Vec2::new(20.0, 600.0));
        assert_eq!(borders[2].size, Vec2::new(800.0, 20.0));
    }

    #[test]
    fn test_walls_avoid_player_start() {
        for seed in 0..20 {
            let state = GameState::new(seed);
            for slot in &state.wall_slots {
                let near_x = (slot.x - PLAYER_START_X).abs() <= 100.0;
                let near_y = (slot.y - PLAYER_START_Y).abs() <= 100.0;
                assert!(!(near_x && near_y), "wall at {slot:?} crowds the start");
            }
        }
    }

    #[test]
    fn test_enemy_spawns_in_top_strip() {
        let mut state = empty_state(11);
        for _ in 0..5 {
            assert!(spawn_enemy(&mut state));
        }
        for enemy in &state.enemies {
            assert!(enemy.tank.pos.y >= 50.0 && enemy.tank.pos.y <= 150.0);
            assert!(enemy.tank.pos.x >= 50.0 && enemy.tank.pos.x <= 750.0);
            assert!(matches!(enemy.kind, EnemyKind::Grunt { skin, .. } if skin < ENEMY_SKINS));
            assert_eq!(enemy.tank.health, 50.0);
        }
        // Cap at level 1 is 5
        assert!(!spawn_enemy(&mut state));
        assert_eq!(state.enemies.len(), 5);
    }

    #[test]
    fn test_enemy_spawn_fails_when_no_room() {
        let mut state = empty_state(2);
        // A wall covering the whole top strip
        state
            .walls
            .push(Wall::border(Vec2::new(400.0, 100.0), Vec2::new(800.0, 200.0)));
        assert!(!spawn_enemy(&mut state));
        assert!(state.enemies.is_empty());
    }

    #[test]
    fn test_boss_spawn_is_single() {
        let mut state = empty_state(5);
        state.level = 5;
        assert!(spawn_enemy(&mut state));
        assert!(!spawn_boss(&mut state));
        assert_eq!(state.enemies.iter().filter(|e| e.is_boss()).count(), 1);

        let boss = state.boss().unwrap();
        assert_eq!(boss.tank.health, 300.0);
        assert_eq!(boss.tank.size, Vec2::splat(BOSS_TANK_SIZE));
        assert!((300.0..=500.0).contains(&boss.tank.pos.x));
    }

    #[test]
    fn test_boss_ignores_enemy_cap() {
        let mut state = empty_state(6);
        for _ in 0..5 {
            spawn_enemy(&mut state);
        }
        assert_eq!(state.enemies.len(), 5);
        state.level = 5;
        assert!(spawn_enemy(&mut state));
        assert_eq!(state.enemies.len(), 6);
    }

    #[test]
    fn test_ally_cap_and_placement() {
        let mut state = empty_state(8);
        state.player.tank.pos = Vec2::new(20.0, 590.0);
        assert!(spawn_ally(&mut state));
        assert!(spawn_ally(&mut state));
        assert!(!spawn_ally(&mut state));
        assert_eq!(state.allies.len(), 2);
        for ally in &state.allies {
            assert!(ally.tank.pos.x >= TANK_SIZE && ally.tank.pos.x <= 70.0);
            assert!(ally.tank.pos.y <= ARENA_HEIGHT - TANK_SIZE);
        }
        assert_eq!(state.texts.len(), 2);
        assert_eq!(state.texts[0].text, "ALLY DEPLOYED");
    }

    #[test]
    fn test_forced_power_ups_keep_spacing() {
        let mut state = empty_state(9);
        let mut spawned = 0;
        for _ in 0..10 {
            if spawn_power_up(&mut state, true) {
                spawned += 1;
            }
        }
        assert!(spawned > 0);
        assert_eq!(state.powerups.len(), spawned);
        for (i, a) in state.powerups.iter().enumerate() {
            for b in &state.powerups[i + 1..] {
                assert!(a.pos.distance(b.pos) >= POWERUP_SPACING);
            }
            assert!(!is_position_occupied(&state, a.pos, SPAWN_PROBE_RADIUS));
        }
    }

    #[test]
    fn test_power_up_gate_rejects_when_closed() {
        let tuning = Tuning {
            powerup_spawn_gate: 0.0,
            ..Tuning::default()
        };
        let mut state = GameState::with_tuning(4, tuning);
        for _ in 0..50 {
            spawn_power_up(&mut state, false);
        }
        assert!(state.powerups.is_empty());
        assert!(spawn_power_up(&mut state, true));
    }

    #[test]
    fn test_wall_respawn_refills_free_slots() {
        let mut state = GameState::new(21);
        state.player.tank.pos = Vec2::new(-1000.0, -1000.0);
        let slots = state.wall_slots.len();
        assert!(slots >= 3);
        state.walls.retain(|w| w.indestructible);

        // Not due yet
        state.clock_ms = 9_999.0;
        respawn_walls(&mut state);
        assert_eq!(state.destructible_wall_count(), 0);

        state.clock_ms = 10_000.0;
        respawn_walls(&mut state);
        assert_eq!(state.destructible_wall_count(), 3);
        assert_eq!(state.last_wall_respawn_ms, 10_000.0);
        let events = state.drain_events();
        assert_eq!(crate::sim::events::particles_emitted(&events, Some(palette::DEBRIS)), 30);
        for wall in state.walls.iter().filter(|w| !w.indestructible) {
            assert!(state.wall_slots.contains(&wall.pos));
            assert_eq!(wall.hit_points, WALL_HIT_POINTS);
        }
    }

    #[test]
    fn test_wall_respawn_only_resets_timer_when_full() {
        let mut state = GameState::new(23);
        let mut x = 60.0;
        while state.destructible_wall_count() < state.tuning.destructible_walls {
            state.walls.push(Wall::destructible(Vec2::new(x, 60.0)));
            x += 45.0;
        }
        let walls = state.walls.len();
        state.drain_events();

        state.clock_ms = 10_000.0;
        respawn_walls(&mut state);
        assert_eq!(state.walls.len(), walls);
        assert_eq!(state.last_wall_respawn_ms, 10_000.0);
        assert!(state.drain_events().is_empty());
    }

    #[test]
    fn test_wall_respawn_without_slots_keeps_timer() {
        let mut state = GameState::new(24);
        state.walls.retain(|w| w.indestructible);
        state.wall_slots.clear();
        state.clock_ms = 10_000.0;
        respawn_walls(&mut state);
        assert_eq!(state.destructible_wall_count(), 0);
        assert_eq!(state.last_wall_respawn_ms, 0.0);
    }

    #[test]
    fn test_wall_respawn_skips_slots_near_player() {
        let mut state = GameState::new(22);
        state.walls.retain(|w| w.indestructible);
        state.wall_slots = vec![Vec2::new(200.0, 200.0)];
        state.player.tank.pos = Vec2::new(250.0, 200.0);
        state.clock_ms = 10_000.0;
        respawn_walls(&mut state);
        assert_eq!(state.destructible_wall_count(), 0);
        assert_eq!(state.last_wall_respawn_ms, 10_000.0);
    }
}
