//! Frame composition
//!
//! Walks a world snapshot in a fixed paint order (starfield, ship, shots,
//! HUD, enemies, explosions, word overlay) and emits [`Surface`] calls.
//! Strictly read-only over the world; the thruster flicker is a hash of the
//! tick counter, not a render-time RNG roll.

use glam::Vec2;

use super::{Rgba, Surface, TextAlign};
use crate::rotate_about;
use crate::sim::projection::{Viewport, project};
use crate::sim::state::WorldState;

const HULL: Rgba = Rgba::opaque(41, 128, 185);
const WING: Rgba = Rgba::opaque(52, 152, 219);
const CANOPY: Rgba = Rgba::opaque(241, 196, 15);
const POD: Rgba = Rgba::opaque(231, 76, 60);
const FLAME: Rgba = Rgba::new(241, 196, 15, 150);
const ENEMY_HULL: Rgba = Rgba::opaque(192, 57, 43);
const ENEMY_WING: Rgba = Rgba::opaque(231, 76, 60);
const ENEMY_CANOPY: Rgba = Rgba::opaque(52, 152, 219);
const PLATE: Rgba = Rgba::new(0, 0, 0, 150);

const HUD_SIZE: f32 = 30.0;
const SPEED_SIZE: f32 = 40.0;

/// Compose one frame of `world` onto `surface`, back to front.
pub fn render<S: Surface>(world: &WorldState, viewport: Viewport, surface: &mut S) {
    surface.clear(Rgba::BLACK);

    let ship = world.ship.position;
    let rot = world.ship.camera_rotation;

    // Starfield: dot radius is the projection scale, so depth reads as size.
    for star in &world.stars {
        let p = project(*star, ship, rot, viewport);
        if viewport.contains(p.pos) {
            surface.circle(p.pos, p.scale, Rgba::WHITE);
        }
    }

    draw_ship(world, viewport, surface);

    for shot in &world.player_shots {
        surface.line(shot.pos, shot.pos - Vec2::new(0.0, 30.0), 10.0, Rgba::RED);
    }
    surface.text(
        &format!("Active shots: {}", world.player_shots.len()),
        Vec2::new(10.0, 30.0),
        HUD_SIZE,
        TextAlign::Left,
        Rgba::WHITE,
    );

    draw_speed_plate(world, viewport, surface);

    for enemy in &world.enemies {
        let p = project(enemy.pos, ship, rot, viewport);
        if !viewport.contains(p.pos) {
            continue;
        }
        let at = |v: Vec2| p.pos + v * p.scale;
        surface.polygon(
            &[
                at(Vec2::new(-20.0, 15.0)),
                at(Vec2::new(20.0, 15.0)),
                at(Vec2::new(0.0, -30.0)),
            ],
            ENEMY_HULL,
        );
        surface.polygon(
            &[
                at(Vec2::new(-20.0, 15.0)),
                at(Vec2::new(-40.0, 30.0)),
                at(Vec2::new(-15.0, 0.0)),
            ],
            ENEMY_WING,
        );
        surface.polygon(
            &[
                at(Vec2::new(20.0, 15.0)),
                at(Vec2::new(40.0, 30.0)),
                at(Vec2::new(15.0, 0.0)),
            ],
            ENEMY_WING,
        );
        surface.circle(at(Vec2::new(0.0, -5.0)), 10.0 * p.scale, ENEMY_CANOPY);
    }

    // Enemy fire projects its anchor but keeps a fixed stroke length.
    for enemy in &world.enemies {
        for shot in &enemy.shots {
            let p = project(shot.pos, ship, rot, viewport);
            surface.line(p.pos, p.pos + Vec2::new(0.0, 25.0), 8.0, Rgba::GREEN);
        }
    }

    for explosion in &world.explosions {
        let p = project(explosion.origin, ship, rot, viewport);
        let fade = explosion.alpha();
        for particle in &explosion.particles {
            surface.circle(
                p.pos + particle.offset * p.scale,
                particle.size * p.scale,
                Rgba::from(particle.color).faded(fade),
            );
        }
    }
    surface.text(
        &format!("Active explosions: {}", world.explosions.len()),
        Vec2::new(10.0, 60.0),
        HUD_SIZE,
        TextAlign::Left,
        Rgba::YELLOW,
    );

    for word in &world.words {
        surface.text(
            &word.text,
            word.pos,
            HUD_SIZE * word.scale,
            TextAlign::Center,
            Rgba::WHITE.faded(word.opacity),
        );
    }
}

/// Player ship, fixed at the viewport center and rolled against yaw.
fn draw_ship<S: Surface>(world: &WorldState, viewport: Viewport, surface: &mut S) {
    let center = viewport.center();
    let roll = (-world.ship.camera_rotation.y * 10.0).to_radians();
    let at = |v: Vec2| rotate_about(center + v, center, roll);

    surface.polygon(
        &[
            at(Vec2::new(-30.0, 20.0)),
            at(Vec2::new(30.0, 20.0)),
            at(Vec2::new(0.0, -40.0)),
        ],
        HULL,
    );
    surface.polygon(
        &[
            at(Vec2::new(-30.0, 20.0)),
            at(Vec2::new(-60.0, 40.0)),
            at(Vec2::new(-25.0, 0.0)),
        ],
        WING,
    );
    surface.polygon(
        &[
            at(Vec2::new(30.0, 20.0)),
            at(Vec2::new(60.0, 40.0)),
            at(Vec2::new(25.0, 0.0)),
        ],
        WING,
    );
    surface.circle(at(Vec2::new(0.0, -10.0)), 15.0, CANOPY);
    surface.circle(at(Vec2::new(-15.0, 25.0)), 8.0, POD);
    surface.circle(at(Vec2::new(15.0, 25.0)), 8.0, POD);

    // Thruster flame only once the ship has drifted off dead center.
    let drifting = world.ship.position.x.abs() > 5.0 || world.ship.position.y.abs() > 5.0;
    if drifting {
        let flicker = flame_flicker(world.tick_count);
        surface.polygon(
            &[
                at(Vec2::new(-20.0, 30.0)),
                at(Vec2::new(0.0, 60.0 + flicker)),
                at(Vec2::new(20.0, 30.0)),
            ],
            FLAME,
        );
    }
}

/// Speed readout over a translucent plate near the bottom edge.
fn draw_speed_plate<S: Surface>(world: &WorldState, viewport: Viewport, surface: &mut S) {
    let speed = world.ship.position.length();
    let text = format!("Speed: {speed:.1}");
    let half = approx_text_width(&text, SPEED_SIZE) / 2.0;
    let cx = viewport.width / 2.0;
    let h = viewport.height;

    surface.rounded_rect(
        Vec2::new(cx - half - 20.0, h - 80.0),
        Vec2::new(cx + half + 20.0, h),
        10.0,
        PLATE,
    );
    surface.text(
        &text,
        Vec2::new(cx, h - 40.0),
        SPEED_SIZE,
        TextAlign::Center,
        Rgba::CYAN,
    );
}

/// Half-em width estimate; surfaces carry no text metrics.
fn approx_text_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * 0.5
}

/// Per-tick jitter for the flame tip, stable within a tick.
fn flame_flicker(tick: u64) -> f32 {
    let hash = (tick as u32).wrapping_mul(2654435761);
    (hash % 20) as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::SpokenWord;
    use crate::tuning::Tuning;

    const VP: Viewport = Viewport {
        width: 800.0,
        height: 600.0,
    };

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Clear(Rgba),
        Circle(Vec2, f32, Rgba),
        Line(Vec2, Vec2, f32, Rgba),
        Polygon(Vec<Vec2>, Rgba),
        RoundedRect(Vec2, Vec2, f32, Rgba),
        Text(String, Vec2, f32, TextAlign, Rgba),
    }

    #[derive(Default)]
    struct RecordingSurface {
        calls: Vec<Call>,
    }

    impl Surface for RecordingSurface {
        fn clear(&mut self, color: Rgba) {
            self.calls.push(Call::Clear(color));
        }
        fn circle(&mut self, center: Vec2, radius: f32, color: Rgba) {
            self.calls.push(Call::Circle(center, radius, color));
        }
        fn line(&mut self, from: Vec2, to: Vec2, width: f32, color: Rgba) {
            self.calls.push(Call::Line(from, to, width, color));
        }
        fn polygon(&mut self, points: &[Vec2], color: Rgba) {
            self.calls.push(Call::Polygon(points.to_vec(), color));
        }
        fn rounded_rect(&mut self, min: Vec2, max: Vec2, corner: f32, color: Rgba) {
            self.calls.push(Call::RoundedRect(min, max, corner, color));
        }
        fn text(&mut self, text: &str, pos: Vec2, size: f32, align: TextAlign, color: Rgba) {
            self.calls
                .push(Call::Text(text.to_string(), pos, size, align, color));
        }
    }

    fn empty_world() -> WorldState {
        let tuning = Tuning {
            star_count: 0,
            enemy_target: 0,
            ..Tuning::default()
        };
        WorldState::new(7, tuning)
    }

    fn rendered(world: &WorldState) -> Vec<Call> {
        let mut surface = RecordingSurface::default();
        render(world, VP, &mut surface);
        surface.calls
    }

    fn polygons_with(calls: &[Call], color: Rgba) -> Vec<Vec<Vec2>> {
        calls
            .iter()
            .filter_map(|c| match c {
                Call::Polygon(pts, col) if *col == color => Some(pts.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn frame_opens_with_a_black_clear() {
        let calls = rendered(&empty_world());
        assert_eq!(calls[0], Call::Clear(Rgba::BLACK));
    }

    #[test]
    fn level_ship_hull_sits_at_viewport_center() {
        let calls = rendered(&empty_world());
        let hulls = polygons_with(&calls, HULL);
        assert_eq!(hulls.len(), 1);
        let c = VP.center();
        assert_eq!(
            hulls[0],
            vec![
                c + Vec2::new(-30.0, 20.0),
                c + Vec2::new(30.0, 20.0),
                c + Vec2::new(0.0, -40.0),
            ]
        );
    }

    #[test]
    fn yaw_rolls_the_hull_about_the_center() {
        let mut world = empty_world();
        world.ship.camera_rotation.y = 3.0;
        let calls = rendered(&world);

        let hulls = polygons_with(&calls, HULL);
        let roll = (-30.0f32).to_radians();
        let want = rotate_about(VP.center() + Vec2::new(-30.0, 20.0), VP.center(), roll);
        assert!((hulls[0][0] - want).length() < 1e-4);
    }

    #[test]
    fn player_shots_stroke_upward_in_red() {
        let mut world = empty_world();
        world.spawn_player_shot(Vec2::new(100.0, 200.0));
        let calls = rendered(&world);

        assert!(calls.contains(&Call::Line(
            Vec2::new(100.0, 200.0),
            Vec2::new(100.0, 170.0),
            10.0,
            Rgba::RED,
        )));
    }

    #[test]
    fn hud_reports_shot_and_explosion_counts() {
        let mut world = empty_world();
        world.spawn_player_shot(VP.center());
        world.spawn_explosion(Vec2::ZERO);
        let texts: Vec<String> = rendered(&world)
            .into_iter()
            .filter_map(|c| match c {
                Call::Text(s, ..) => Some(s),
                _ => None,
            })
            .collect();

        assert!(texts.contains(&"Active shots: 1".to_string()));
        assert!(texts.contains(&"Active explosions: 1".to_string()));
        assert!(texts.contains(&"Speed: 0.0".to_string()));
    }

    #[test]
    fn flame_appears_only_once_drifting() {
        let mut world = empty_world();
        assert!(polygons_with(&rendered(&world), FLAME).is_empty());

        world.ship.position.x = 6.0;
        assert_eq!(polygons_with(&rendered(&world), FLAME).len(), 1);
    }

    #[test]
    fn enemy_above_ship_draws_at_center_full_scale() {
        let mut world = empty_world();
        world.ship.position = Vec2::new(50.0, -20.0);
        world
            .enemies
            .push(crate::sim::state::EnemyAgent::new(world.ship.position));
        let calls = rendered(&world);

        let hulls = polygons_with(&calls, ENEMY_HULL);
        assert_eq!(hulls.len(), 1);
        assert_eq!(hulls[0][2], VP.center() + Vec2::new(0.0, -30.0));

        let canopy = calls.iter().any(|c| {
            matches!(c, Call::Circle(pos, r, col)
                if *col == ENEMY_CANOPY && *r == 10.0 && (*pos - (VP.center() + Vec2::new(0.0, -5.0))).length() < 1e-4)
        });
        assert!(canopy);
    }

    #[test]
    fn far_enemy_is_culled() {
        let mut world = empty_world();
        // rel = 4472 maximizes the projected offset (~2236 px), well outside
        // an 800-wide viewport.
        world
            .enemies
            .push(crate::sim::state::EnemyAgent::new(Vec2::new(4472.0, 0.0)));
        let calls = rendered(&world);
        assert!(polygons_with(&calls, ENEMY_HULL).is_empty());
    }

    #[test]
    fn enemy_shots_project_with_fixed_stroke() {
        let mut world = empty_world();
        let mut enemy = crate::sim::state::EnemyAgent::new(Vec2::ZERO);
        enemy.fire();
        world.enemies.push(enemy);
        let calls = rendered(&world);

        assert!(calls.contains(&Call::Line(
            VP.center(),
            VP.center() + Vec2::new(0.0, 25.0),
            8.0,
            Rgba::GREEN,
        )));
    }

    #[test]
    fn fresh_explosion_particles_draw_opaque_at_scale() {
        let mut world = empty_world();
        world.spawn_explosion(world.ship.position);
        let calls = rendered(&world);

        // Only explosion circles paint after the shot counter (no enemies here).
        let hud = calls
            .iter()
            .position(|c| matches!(c, Call::Text(s, ..) if s.starts_with("Active shots")))
            .unwrap();
        let particles = calls[hud..]
            .iter()
            .filter(|c| matches!(c, Call::Circle(_, _, col) if col.a == 255 && col.r >= 200))
            .count();
        assert_eq!(particles, world.tuning.explosion_particles);
    }

    #[test]
    fn spoken_words_scale_and_fade_with_age() {
        let mut world = empty_world();
        let mut word = SpokenWord::new("pew".into(), Vec2::new(400.0, 500.0));
        word.opacity = 0.5;
        word.scale = 2.0;
        world.words.push(word);
        let calls = rendered(&world);

        let drawn = calls.iter().any(|c| {
            matches!(c, Call::Text(s, pos, size, TextAlign::Center, col)
                if s == "pew" && *pos == Vec2::new(400.0, 500.0) && *size == 60.0 && col.a == 127)
        });
        assert!(drawn);
    }

    #[test]
    fn speed_plate_backs_the_readout() {
        let mut world = empty_world();
        world.ship.position = Vec2::new(30.0, 40.0);
        let calls = rendered(&world);

        let plate = calls.iter().position(|c| matches!(c, Call::RoundedRect(min, max, corner, col)
            if *col == PLATE && *corner == 10.0 && min.y == 520.0 && max.y == 600.0));
        let readout = calls.iter().position(|c| {
            matches!(c, Call::Text(s, pos, _, TextAlign::Center, col)
                if s == "Speed: 50.0" && *pos == Vec2::new(400.0, 560.0) && *col == Rgba::CYAN)
        });
        // Plate paints first so the text sits on top.
        assert!(plate.unwrap() < readout.unwrap());
    }
}
