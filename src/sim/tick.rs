//! Fixed timestep simulation tick
//!
//! One call advances the world exactly one tick, phases in a fixed order so
//! the same seed and input trace replays identically. All mutation happens
//! here; render never writes.

use std::time::Instant;

use glam::Vec2;
use rand::Rng;

use crate::input::voice::FireQueue;
use crate::sim::collision::{within_box, within_radius};
use crate::sim::projection::{Viewport, project};
use crate::sim::state::{SpokenWord, WorldState};

/// Input gathered for a single tick
#[derive(Debug, Clone)]
pub struct TickInput {
    /// Ship translation since the last tick
    pub pos_delta: Vec2,
    /// Camera rotation since the last tick
    pub rot_delta: Vec2,
    /// Latest recognized transcript fragment, if one arrived
    pub spoken: Option<String>,
    /// Timestamp fire-request ages are judged against
    pub now: Instant,
    /// Screen the world is played on
    pub viewport: Viewport,
}

impl TickInput {
    /// An idle tick: no motion, no speech
    pub fn idle(now: Instant, viewport: Viewport) -> Self {
        Self {
            pos_delta: Vec2::ZERO,
            rot_delta: Vec2::ZERO,
            spoken: None,
            now,
            viewport,
        }
    }
}

/// Advance the world by one tick
pub fn tick(world: &mut WorldState, input: &TickInput, fire_queue: &FireQueue) {
    world.tick_count += 1;

    // Ship motion
    world.ship.position += input.pos_delta;
    world.ship.camera_rotation += input.rot_delta;
    let ship_pos = world.ship.position;
    let anchor = input.viewport.center();

    // Enemy phase: walk, advance owned shots, maybe fire
    let walk_span = world.tuning.enemy_walk_span;
    let shot_speed = world.tuning.enemy_shot_speed;
    let shot_range = world.tuning.enemy_shot_range;
    let fire_chance = world.tuning.enemy_fire_chance;
    for enemy in world.enemies.iter_mut() {
        enemy.walk(&mut world.rng, walk_span);
        enemy.advance_shots(shot_speed, shot_range);
        if world.rng.random_bool(fire_chance) {
            enemy.fire();
        }
    }

    // Advance surviving player shots, cull off the top
    let player_speed = world.tuning.player_shot_speed;
    for shot in &mut world.player_shots {
        shot.advance(player_speed);
    }
    world.player_shots.retain(|s| s.pos.y >= 0.0);

    // Drain ready fire requests; new shots sit at the anchor until next tick
    // so they are drawn where they spawned
    let fired = fire_queue.pop_ready(input.now, world.tuning.fire_cooldown());
    for _ in 0..fired {
        world.spawn_player_shot(anchor);
    }
    if fired > 0 {
        log::debug!("fired {fired} queued shot(s)");
    }

    // Player shots vs enemies: shot-major, first match wins. Both sides are
    // compared as ship-relative offsets, shots against the screen anchor,
    // enemies against the ship's world position.
    let kill_radius = world.tuning.kill_radius;
    let mut shot_idx = 0;
    while shot_idx < world.player_shots.len() {
        let shot_rel = world.player_shots[shot_idx].pos - anchor;
        let hit = world
            .enemies
            .iter()
            .position(|enemy| within_radius(shot_rel, enemy.pos - ship_pos, kill_radius));
        match hit {
            Some(enemy_idx) => {
                let origin = world.enemies[enemy_idx].pos;
                world.enemies.remove(enemy_idx);
                world.player_shots.remove(shot_idx);
                world.spawn_explosion(origin);
                log::debug!("enemy down at {origin}");
            }
            None => shot_idx += 1,
        }
    }

    // Enemy shots vs the ship box; hits are cosmetic, the burst flashes at
    // the ship and the shot is spent
    let hit_box = world.tuning.ship_hit_box;
    let mut ship_hits = 0;
    for enemy in world.enemies.iter_mut() {
        let mut i = 0;
        while i < enemy.shots.len() {
            if within_box(enemy.shots[i].pos, ship_pos, hit_box) {
                enemy.shots.remove(i);
                ship_hits += 1;
            } else {
                i += 1;
            }
        }
    }
    for _ in 0..ship_hits {
        world.spawn_explosion(ship_pos);
    }
    if ship_hits > 0 {
        log::debug!("ship grazed by {ship_hits} shot(s)");
    }

    // Age explosions, including any spawned this tick
    for explosion in &mut world.explosions {
        explosion.tick();
    }
    world.explosions.retain(|e| !e.finished());

    // Spoken-word overlay
    for word in &mut world.words {
        word.tick();
    }
    world.words.retain(|w| !w.faded());
    if let Some(spoken) = &input.spoken {
        spawn_spoken_words(world, spoken, input.viewport);
    }

    // Star wrap: re-seed stars that drifted off screen back around the ship
    let rot = world.ship.camera_rotation;
    let spread = world.tuning.spawn_spread;
    for star in world.stars.iter_mut() {
        let projected = project(*star, ship_pos, rot, input.viewport);
        if !input.viewport.contains(projected.pos) {
            *star = WorldState::scatter(&mut world.rng, ship_pos, spread);
        }
    }

    // Respawn enemies up to the target count
    world.respawn_enemies();
}

/// Scatter the fragment's tokens along the lower screen edge
fn spawn_spoken_words(world: &mut WorldState, fragment: &str, viewport: Viewport) {
    for token in fragment.split_whitespace() {
        let x = world.rng.random_range(0.2..0.8) * viewport.width;
        let pos = Vec2::new(x, viewport.height - 80.0);
        world.words.push(SpokenWord::new(token.to_string(), pos));
    }
}
