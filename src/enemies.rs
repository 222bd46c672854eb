use std::f32::consts::TAU;

use bevy::prelude::*;
use rand::Rng;

use crate::arena::ArenaBounds;
use crate::config::{EnemyTuning, ObstacleTuning};
use crate::player::Player;
use crate::round_flow::{round_in_play, EnemyContact, RoundSystems};

pub struct EnemyPlugin;

impl Plugin for EnemyPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (enemy_chase_system, obstacle_wander_system, enemy_contact_system)
                .chain()
                .run_if(round_in_play)
                .before(RoundSystems),
        );
    }
}

/// Chases the player and kills on touch.
#[derive(Component, Debug, Clone)]
pub struct Enemy {
    pub move_speed: f32,
    pub swing_angle_degrees: f32,
    pub swing_speed: f32,
    pub radius: f32,
}

impl Enemy {
    pub fn from_tuning(tuning: &EnemyTuning) -> Self {
        Enemy {
            move_speed: tuning.move_speed,
            swing_angle_degrees: tuning.swing_angle_degrees,
            swing_speed: tuning.swing_speed,
            radius: 0.4,
        }
    }

    /// Blade swing offset (radians) at `elapsed` seconds: a sine wave
    /// between -swing_angle and +swing_angle.
    pub fn swing_offset(&self, elapsed: f32) -> f32 {
        (elapsed * self.swing_speed).sin() * self.swing_angle_degrees.to_radians()
    }
}

/// Wanders in a straight line, picking a new random heading on a timer.
/// Purely decorative: it neither blocks nor hurts the player or enemies.
#[derive(Component, Debug)]
pub struct Obstacle {
    pub move_speed: f32,
    pub heading: Vec3,
    pub turn_timer: Timer,
}

impl Obstacle {
    pub fn from_tuning<R: Rng + ?Sized>(tuning: &ObstacleTuning, rng: &mut R) -> Self {
        Obstacle {
            move_speed: tuning.move_speed,
            heading: random_heading(rng),
            turn_timer: Timer::from_seconds(
                tuning.direction_change_interval.max(0.1),
                TimerMode::Repeating,
            ),
        }
    }
}

/// Random unit vector on the XZ plane.
pub fn random_heading<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    let angle = rng.gen_range(0.0..TAU);
    Vec3::new(angle.cos(), 0.0, angle.sin())
}

/// Horizontal direction from `from` to `to`, or None when they're (nearly) stacked.
pub fn flat_direction(from: Vec3, to: Vec3) -> Option<Vec3> {
    let mut offset = to - from;
    offset.y = 0.0;
    if offset.length_squared() < 0.0001 {
        return None;
    }
    Some(offset.normalize())
}

/// Two upright bodies touch when their horizontal distance is under the sum of
/// their radii and they are roughly at the same height.
pub fn bodies_touch(a: Vec3, a_radius: f32, b: Vec3, b_radius: f32) -> bool {
    let horizontal = Vec2::new(a.x - b.x, a.z - b.z).length();
    horizontal < a_radius + b_radius && (a.y - b.y).abs() < 1.0
}

/// Clamps `position` into `limit` shrunk by `radius`. Returns which axes (x, z) hit an edge.
pub fn clamp_inside(position: &mut Vec3, limit: Vec2, radius: f32) -> (bool, bool) {
    let max_x = (limit.x - radius).max(0.0);
    let max_z = (limit.y - radius).max(0.0);

    let hit_x = position.x.abs() > max_x;
    let hit_z = position.z.abs() > max_z;
    position.x = position.x.clamp(-max_x, max_x);
    position.z = position.z.clamp(-max_z, max_z);
    (hit_x, hit_z)
}

/// Like `clamp_inside`, and flips the heading component that pointed out of bounds.
pub fn bounce_inside(position: &mut Vec3, heading: &mut Vec3, limit: Vec2, radius: f32) {
    let (hit_x, hit_z) = clamp_inside(position, limit, radius);
    if hit_x {
        heading.x = -heading.x;
    }
    if hit_z {
        heading.z = -heading.z;
    }
}

fn enemy_chase_system(
    time: Res<Time>,
    bounds: Res<ArenaBounds>,
    players: Query<&Transform, (With<Player>, Without<Enemy>)>,
    mut enemies: Query<(&Enemy, &mut Transform)>,
) {
    let Ok(player) = players.single() else {
        return;
    };
    let delta = time.delta_secs();
    let elapsed = time.elapsed_secs();

    for (enemy, mut transform) in &mut enemies {
        let Some(direction) = flat_direction(transform.translation, player.translation) else {
            continue;
        };

        transform.translation += direction * enemy.move_speed * delta;
        clamp_inside(&mut transform.translation, bounds.half_extents, enemy.radius);

        transform.look_to(direction, Vec3::Y);
        transform.rotate_y(enemy.swing_offset(elapsed));
    }
}

fn obstacle_wander_system(
    time: Res<Time>,
    bounds: Res<ArenaBounds>,
    mut obstacles: Query<(Entity, &mut Obstacle, &mut Transform)>,
) {
    let mut rng = rand::thread_rng();
    for (entity, mut obstacle, mut transform) in &mut obstacles {
        obstacle.turn_timer.tick(time.delta());
        if obstacle.turn_timer.just_finished() {
            obstacle.heading = random_heading(&mut rng);
            debug!("Obstacle {:?} turned to {:?}", entity, obstacle.heading);
        }

        let step = obstacle.heading * obstacle.move_speed * time.delta_secs();
        transform.translation += step;

        let mut heading = obstacle.heading;
        bounce_inside(&mut transform.translation, &mut heading, bounds.half_extents, 0.4);
        obstacle.heading = heading;

        if heading != Vec3::ZERO {
            transform.look_to(heading, Vec3::Y);
        }
    }
}

fn enemy_contact_system(
    mut commands: Commands,
    players: Query<(&Player, &Transform), Without<Enemy>>,
    enemies: Query<(&Enemy, &Transform)>,
) {
    let Ok((player, player_transform)) = players.single() else {
        return;
    };

    let caught = enemies.iter().any(|(enemy, transform)| {
        bodies_touch(
            player_transform.translation,
            player.radius,
            transform.translation,
            enemy.radius,
        )
    });
    if caught {
        commands.trigger(EnemyContact);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GameConfig, PlayerTuning, RoundConfig};
    use crate::player::GroundedOn;
    use crate::round::RoundController;
    use crate::round_flow::{RoundCommand, RoundPlugin};
    use crate::survival::{DeathCause, Outcome};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn headings_are_flat_unit_vectors() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..20 {
            let heading = random_heading(&mut rng);
            assert_eq!(heading.y, 0.0);
            assert!((heading.length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn flat_direction_ignores_height() {
        let direction = flat_direction(Vec3::ZERO, Vec3::new(3.0, 5.0, 0.0)).unwrap();
        assert_eq!(direction, Vec3::X);
        assert_eq!(flat_direction(Vec3::ZERO, Vec3::new(0.0, 2.0, 0.0)), None);
    }

    #[test]
    fn touching_needs_overlap_and_similar_height() {
        assert!(bodies_touch(Vec3::ZERO, 0.4, Vec3::new(0.7, 0.1, 0.0), 0.4));
        assert!(!bodies_touch(Vec3::ZERO, 0.4, Vec3::new(0.9, 0.0, 0.0), 0.4));
        assert!(!bodies_touch(Vec3::ZERO, 0.4, Vec3::new(0.1, -3.0, 0.0), 0.4));
    }

    #[test]
    fn bounce_flips_the_outgoing_component() {
        let mut position = Vec3::new(5.2, 0.4, 1.0);
        let mut heading = Vec3::new(0.6, 0.0, 0.8);
        bounce_inside(&mut position, &mut heading, Vec2::new(5.0, 5.0), 0.4);

        assert!((position.x - 4.6).abs() < 1e-6);
        assert_eq!(position.z, 1.0);
        assert_eq!(heading, Vec3::new(-0.6, 0.0, 0.8));
    }

    #[test]
    fn swing_stays_within_the_angle() {
        let enemy = Enemy::from_tuning(&EnemyTuning::default());
        let limit = 30f32.to_radians() + 1e-6;
        for step in 0..100 {
            assert!(enemy.swing_offset(step as f32 * 0.05).abs() <= limit);
        }
    }

    fn chase_app(enemy_at: Vec3) -> App {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, RoundPlugin, EnemyPlugin))
            .init_resource::<ButtonInput<KeyCode>>()
            .insert_resource(ArenaBounds {
                half_extents: Vec2::new(5.0, 5.0),
            })
            .insert_resource(GameConfig {
                round: RoundConfig::default(),
                ..default()
            });
        app.world_mut().spawn((
            Player::from_tuning(&PlayerTuning::default()),
            GroundedOn::default(),
            Transform::from_xyz(0.0, 0.4, 0.0),
        ));
        app.world_mut().spawn((
            Enemy::from_tuning(&EnemyTuning::default()),
            Transform::from_translation(enemy_at),
        ));
        app.update();
        app
    }

    #[test]
    fn touching_an_enemy_kills_once_the_round_runs() {
        let mut app = chase_app(Vec3::new(0.5, 0.5, 0.0));
        app.update();
        assert!(!app.world().resource::<RoundController>().round_ended());

        app.world_mut().trigger(RoundCommand::Start);
        app.update();
        app.update();

        let round = app.world().resource::<RoundController>();
        assert_eq!(round.outcome(), Outcome::Died);
        assert_eq!(round.death_cause(), Some(DeathCause::Enemy));
    }

    #[test]
    fn distant_enemy_does_not_kill() {
        let mut app = chase_app(Vec3::new(4.0, 0.5, 4.0));
        app.world_mut().trigger(RoundCommand::Start);
        app.update();

        let round = app.world().resource::<RoundController>();
        assert_eq!(round.outcome(), Outcome::InProgress);
    }
}
