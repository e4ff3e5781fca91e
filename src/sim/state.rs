//! World state and entity types
//!
//! Everything the simulation mutates lives here. All randomness flows through
//! the single world RNG, so `WorldState::new(seed, tuning)` plus an input
//! trace replays identically.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::tuning::Tuning;

/// Solid color; render applies fade alpha separately
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// The player ship
///
/// Position and camera rotation accumulate raw motion deltas without bound;
/// the projector re-centers the world on the ship every frame, so only the
/// relative values matter.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShipState {
    pub position: Vec2,
    pub camera_rotation: Vec2,
}

/// Which side fired a projectile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Owner {
    Player,
    Enemy,
}

/// Vertical travel direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Heading {
    Up,
    Down,
}

/// A projectile from either side
///
/// Player shots live on the viewport plane (spawned at the ship's screen
/// anchor), enemy shots on the world plane. Owner plus heading pin down which
/// frame a given shot moves in.
#[derive(Debug, Clone, Copy)]
pub struct Projectile {
    pub pos: Vec2,
    pub owner: Owner,
    pub heading: Heading,
}

impl Projectile {
    pub fn player(pos: Vec2) -> Self {
        Self {
            pos,
            owner: Owner::Player,
            heading: Heading::Up,
        }
    }

    pub fn enemy(pos: Vec2) -> Self {
        Self {
            pos,
            owner: Owner::Enemy,
            heading: Heading::Down,
        }
    }

    /// Move `speed` units along the heading
    pub fn advance(&mut self, speed: f32) {
        match self.heading {
            Heading::Up => self.pos.y -= speed,
            Heading::Down => self.pos.y += speed,
        }
    }
}

/// An enemy agent and the shots it owns
#[derive(Debug, Clone)]
pub struct EnemyAgent {
    pub pos: Vec2,
    pub shots: Vec<Projectile>,
}

impl EnemyAgent {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            shots: Vec::new(),
        }
    }

    /// Random-walk one step, up to `span` units per axis
    pub fn walk(&mut self, rng: &mut Pcg32, span: f32) {
        self.pos.x += rng.random_range(-span..span);
        self.pos.y += rng.random_range(-span..span);
    }

    /// Fire one shot from the current position
    pub fn fire(&mut self) {
        self.shots.push(Projectile::enemy(self.pos));
    }

    /// Advance owned shots downward, dropping those past `range`
    pub fn advance_shots(&mut self, speed: f32, range: f32) {
        for shot in &mut self.shots {
            shot.advance(speed);
        }
        self.shots.retain(|s| s.pos.y <= range);
    }
}

/// One fleck of an explosion
#[derive(Debug, Clone, Copy)]
pub struct ExplosionParticle {
    /// Displacement from the explosion origin, world units
    pub offset: Vec2,
    pub vel: Vec2,
    pub size: f32,
    pub color: Rgb,
}

impl ExplosionParticle {
    /// Roll a fresh particle: random direction, hot ember palette
    fn random(rng: &mut Pcg32) -> Self {
        let angle = rng.random_range(0.0..std::f32::consts::TAU);
        let speed = rng.random_range(2.0f32..6.0);
        Self {
            offset: Vec2::ZERO,
            vel: Vec2::new(angle.cos(), angle.sin()) * speed,
            size: rng.random_range(2.0f32..7.0),
            color: Rgb {
                r: rng.random_range(200..=255),
                g: rng.random_range(100..200),
                b: rng.random_range(0..50),
            },
        }
    }

    /// Drift outward, sink, shrink
    pub fn tick(&mut self) {
        self.offset += self.vel;
        self.vel.y += 0.1;
        self.size *= 0.98;
    }
}

/// A particle burst pinned to a world origin
#[derive(Debug, Clone)]
pub struct Explosion {
    pub origin: Vec2,
    pub particles: Vec<ExplosionParticle>,
    /// Ticks since spawn
    pub age: u32,
    /// Lifetime in ticks
    pub max_age: u32,
}

impl Explosion {
    pub fn new(origin: Vec2, rng: &mut Pcg32, particle_count: usize, max_age: u32) -> Self {
        let particles = (0..particle_count)
            .map(|_| ExplosionParticle::random(rng))
            .collect();
        Self {
            origin,
            particles,
            age: 0,
            max_age,
        }
    }

    /// Age one tick, advancing every particle
    pub fn tick(&mut self) {
        self.age += 1;
        for p in &mut self.particles {
            p.tick();
        }
    }

    /// Remaining brightness, 1.0 at spawn fading linearly to 0.0
    pub fn alpha(&self) -> f32 {
        1.0 - self.age as f32 / self.max_age as f32
    }

    pub fn finished(&self) -> bool {
        self.age >= self.max_age
    }
}

/// A recognized transcript word drifting up the screen
#[derive(Debug, Clone)]
pub struct SpokenWord {
    pub text: String,
    pub pos: Vec2,
    pub opacity: f32,
    pub scale: f32,
}

impl SpokenWord {
    pub fn new(text: String, pos: Vec2) -> Self {
        Self {
            text,
            pos,
            opacity: 1.0,
            scale: 1.0,
        }
    }

    /// Fade, grow, rise
    pub fn tick(&mut self) {
        self.opacity -= 0.01;
        self.scale += 0.005;
        self.pos.y -= 0.5;
    }

    pub fn faded(&self) -> bool {
        self.opacity <= 0.0
    }
}

/// Complete game state
///
/// Ownership is a strict tree: enemies own their shots, explosions own their
/// particles. Nothing is shared or back-referenced, so the whole world clones
/// cheaply for snapshots in tests.
#[derive(Debug, Clone)]
pub struct WorldState {
    /// Run seed, kept for logging and replays
    pub seed: u64,
    pub ship: ShipState,
    pub enemies: Vec<EnemyAgent>,
    /// Player shots, viewport plane
    pub player_shots: Vec<Projectile>,
    pub explosions: Vec<Explosion>,
    /// Background stars, world plane
    pub stars: Vec<Vec2>,
    /// Recognized-word overlay
    pub words: Vec<SpokenWord>,
    /// Ticks advanced since creation
    pub tick_count: u64,
    pub tuning: Tuning,
    /// Single RNG every entity draws from; field-visible so tick phases can
    /// split-borrow it alongside the entity vecs
    pub(super) rng: Pcg32,
}

impl WorldState {
    /// Create a world from a seed: full starfield, enemies at target count,
    /// ship at the origin
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let spread = tuning.spawn_spread;
        let stars = (0..tuning.star_count)
            .map(|_| Self::scatter(&mut rng, Vec2::ZERO, spread))
            .collect();
        let enemies = (0..tuning.enemy_target)
            .map(|_| EnemyAgent::new(Self::scatter(&mut rng, Vec2::ZERO, spread)))
            .collect();

        Self {
            seed,
            ship: ShipState::default(),
            enemies,
            player_shots: Vec::new(),
            explosions: Vec::new(),
            stars,
            words: Vec::new(),
            tick_count: 0,
            tuning,
            rng,
        }
    }

    /// Random point within ± `spread` of `center` per axis
    pub(super) fn scatter(rng: &mut Pcg32, center: Vec2, spread: f32) -> Vec2 {
        center
            + Vec2::new(
                rng.random_range(-spread..spread),
                rng.random_range(-spread..spread),
            )
    }

    /// Spawn one player shot at the ship's screen anchor
    pub fn spawn_player_shot(&mut self, anchor: Vec2) {
        self.player_shots.push(Projectile::player(anchor));
    }

    /// Spawn a particle burst at `origin`
    pub fn spawn_explosion(&mut self, origin: Vec2) {
        let burst = Explosion::new(
            origin,
            &mut self.rng,
            self.tuning.explosion_particles,
            self.tuning.explosion_max_age,
        );
        self.explosions.push(burst);
    }

    /// Top enemies back up to the target count, scattered around the ship
    pub fn respawn_enemies(&mut self) {
        while self.enemies.len() < self.tuning.enemy_target {
            let pos = Self::scatter(&mut self.rng, self.ship.position, self.tuning.spawn_spread);
            log::debug!("enemy respawned at {pos}");
            self.enemies.push(EnemyAgent::new(pos));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded_rng() -> Pcg32 {
        Pcg32::seed_from_u64(42)
    }

    #[test]
    fn new_world_is_fully_populated() {
        let w = WorldState::new(1, Tuning::default());
        assert_eq!(w.stars.len(), 1000);
        assert_eq!(w.enemies.len(), 3);
        assert!(w.player_shots.is_empty());
        assert!(w.explosions.is_empty());
        assert!(w.words.is_empty());
        assert_eq!(w.tick_count, 0);
        assert_eq!(w.ship.position, Vec2::ZERO);
    }

    #[test]
    fn same_seed_builds_identical_worlds() {
        let a = WorldState::new(99, Tuning::default());
        let b = WorldState::new(99, Tuning::default());
        assert_eq!(a.stars, b.stars);
        for (ea, eb) in a.enemies.iter().zip(&b.enemies) {
            assert_eq!(ea.pos, eb.pos);
        }
    }

    #[test]
    fn different_seeds_diverge() {
        let a = WorldState::new(1, Tuning::default());
        let b = WorldState::new(2, Tuning::default());
        assert_ne!(a.stars, b.stars);
    }

    #[test]
    fn initial_scatter_stays_within_spread() {
        let w = WorldState::new(5, Tuning::default());
        for star in &w.stars {
            assert!(star.x.abs() <= 1000.0 && star.y.abs() <= 1000.0);
        }
        for enemy in &w.enemies {
            assert!(enemy.pos.x.abs() <= 1000.0 && enemy.pos.y.abs() <= 1000.0);
        }
    }

    #[test]
    fn projectiles_advance_along_their_heading() {
        let mut up = Projectile::player(Vec2::new(400.0, 300.0));
        up.advance(10.0);
        assert_eq!(up.pos.y, 290.0);

        let mut down = Projectile::enemy(Vec2::new(0.0, 100.0));
        down.advance(10.0);
        assert_eq!(down.pos.y, 110.0);
    }

    #[test]
    fn enemy_shots_are_dropped_past_range() {
        let mut e = EnemyAgent::new(Vec2::ZERO);
        e.shots.push(Projectile::enemy(Vec2::new(0.0, 995.0)));
        e.shots.push(Projectile::enemy(Vec2::new(0.0, 100.0)));
        e.advance_shots(10.0, 1000.0);
        assert_eq!(e.shots.len(), 1);
        assert_eq!(e.shots[0].pos.y, 110.0);
    }

    #[test]
    fn enemy_walk_is_bounded_by_span() {
        let mut rng = seeded_rng();
        let mut e = EnemyAgent::new(Vec2::ZERO);
        for _ in 0..100 {
            let before = e.pos;
            e.walk(&mut rng, 2.0);
            assert!((e.pos.x - before.x).abs() <= 2.0);
            assert!((e.pos.y - before.y).abs() <= 2.0);
        }
    }

    #[test]
    fn particle_palette_and_kinematics_in_range() {
        let mut rng = seeded_rng();
        for _ in 0..200 {
            let p = ExplosionParticle::random(&mut rng);
            assert_eq!(p.offset, Vec2::ZERO);
            let speed = p.vel.length();
            assert!(speed > 2.0 - 1e-3 && speed < 6.0 + 1e-3, "speed {speed}");
            assert!((2.0..7.0).contains(&p.size));
            assert!(p.color.r >= 200);
            assert!((100..200).contains(&p.color.g));
            assert!(p.color.b < 50);
        }
    }

    #[test]
    fn particle_size_decays_two_percent_per_tick() {
        let mut rng = seeded_rng();
        let mut p = ExplosionParticle::random(&mut rng);
        p.size = 5.0;
        for _ in 0..10 {
            p.tick();
        }
        assert!((p.size - 5.0 * 0.98f32.powi(10)).abs() < 1e-4);
    }

    #[test]
    fn explosion_keeps_particle_count_and_fades_linearly() {
        let mut rng = seeded_rng();
        let mut ex = Explosion::new(Vec2::ZERO, &mut rng, 50, 60);
        assert_eq!(ex.particles.len(), 50);
        for _ in 0..30 {
            ex.tick();
        }
        assert_eq!(ex.particles.len(), 50);
        assert_eq!(ex.age, 30);
        assert!((ex.alpha() - 0.5).abs() < 1e-6);
        assert!(!ex.finished());
        for _ in 0..30 {
            ex.tick();
        }
        assert!(ex.finished());
    }

    #[test]
    fn spoken_word_fades_out_after_about_a_hundred_ticks() {
        let mut w = SpokenWord::new("pew".into(), Vec2::new(100.0, 500.0));
        let mut ticks = 0;
        while !w.faded() {
            w.tick();
            ticks += 1;
            assert!(ticks <= 102, "word never faded");
        }
        // 0.01 per tick from 1.0, allowing a float ulp either way.
        assert!(ticks >= 99);
        assert!(w.pos.y < 500.0);
        assert!(w.scale > 1.0);
    }

    #[test]
    fn respawn_tops_up_to_target_around_ship() {
        let mut w = WorldState::new(3, Tuning::default());
        w.ship.position = Vec2::new(5000.0, -2000.0);
        w.enemies.clear();
        w.respawn_enemies();
        assert_eq!(w.enemies.len(), 3);
        for e in &w.enemies {
            assert!((e.pos.x - 5000.0).abs() <= 1000.0);
            assert!((e.pos.y + 2000.0).abs() <= 1000.0);
        }
    }
}
