use bevy::prelude::*;
use rand::Rng;

use crate::arena::Ground;
use crate::config::PlayerTuning;
use crate::round_flow::{round_in_play, GroundContact, RoundSystems};

pub struct PlayerPlugin;

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (
                (spin_toggle_system, player_move_system, player_spin_system)
                    .run_if(round_in_play),
                // Contacts are tracked even before the round starts and while
                // paused, so the round always knows whether the player is grounded.
                ground_contact_system,
                fall_system.run_if(round_in_play),
            )
                .chain()
                .before(RoundSystems),
        );
    }
}

const GRAVITY: f32 = 9.81;

#[derive(Component, Debug, Clone)]
pub struct Player {
    pub move_speed: f32,
    /// Degrees per second around Y. Space flips the sign.
    pub spin_speed_degrees: f32,
    /// Half the body height: the translation sits this far above the feet.
    pub half_height: f32,
    /// Horizontal radius used for enemy contact.
    pub radius: f32,
}

impl Player {
    pub fn from_tuning(tuning: &PlayerTuning) -> Self {
        Player {
            move_speed: tuning.move_speed,
            spin_speed_degrees: tuning.spin_speed_degrees,
            half_height: 0.4,
            radius: 0.4,
        }
    }
}

/// Ground entities the player is currently standing on.
#[derive(Component, Debug, Default)]
pub struct GroundedOn(pub Vec<Entity>);

/// Downward speed while nothing holds the player up.
#[derive(Component, Debug, Default)]
pub struct FallSpeed(pub f32);

/// Picks one element at random. None for an empty slice.
pub fn random_element<'a, T, R: Rng + ?Sized>(items: &'a [T], rng: &mut R) -> Option<&'a T> {
    if items.is_empty() {
        return None;
    }
    items.get(rng.gen_range(0..items.len()))
}

/// Unit direction on the XZ plane for the held arrow keys, or zero.
/// Up is away from the camera (-Z). Diagonals are normalised so they aren't faster.
pub fn movement_direction(left: bool, right: bool, up: bool, down: bool) -> Vec3 {
    let mut direction = Vec3::ZERO;
    if left {
        direction.x -= 1.0;
    }
    if right {
        direction.x += 1.0;
    }
    if up {
        direction.z -= 1.0;
    }
    if down {
        direction.z += 1.0;
    }
    direction.normalize_or_zero()
}

fn spin_toggle_system(keys: Res<ButtonInput<KeyCode>>, mut players: Query<&mut Player>) {
    if !keys.just_pressed(KeyCode::Space) {
        return;
    }
    for mut player in &mut players {
        player.spin_speed_degrees = -player.spin_speed_degrees;
        info!("Toggled spin direction. Spin speed now {}", player.spin_speed_degrees);
    }
}

fn player_move_system(
    keys: Res<ButtonInput<KeyCode>>,
    time: Res<Time>,
    mut players: Query<(&Player, &mut Transform)>,
) {
    let direction = movement_direction(
        keys.pressed(KeyCode::ArrowLeft),
        keys.pressed(KeyCode::ArrowRight),
        keys.pressed(KeyCode::ArrowUp),
        keys.pressed(KeyCode::ArrowDown),
    );
    if direction == Vec3::ZERO {
        return;
    }

    for (player, mut transform) in &mut players {
        transform.translation += direction * player.move_speed * time.delta_secs();
    }
}

fn player_spin_system(time: Res<Time>, mut players: Query<(&Player, &mut Transform)>) {
    for (player, mut transform) in &mut players {
        transform.rotate_y(player.spin_speed_degrees.to_radians() * time.delta_secs());
    }
}

/// Compares the grounds under the player's feet with last frame's and reports
/// each change. New contacts go out before lost ones, so stepping from one piece
/// of ground onto a touching one never looks like a fall.
fn ground_contact_system(
    mut commands: Commands,
    mut players: Query<(&Player, &Transform, &mut GroundedOn)>,
    grounds: Query<(Entity, &Transform, &Ground)>,
) {
    for (player, transform, mut grounded_on) in &mut players {
        let feet = transform.translation - Vec3::Y * player.half_height;
        let touching: Vec<Entity> = grounds
            .iter()
            .filter(|(_, ground_transform, ground)| {
                ground.supports(ground_transform.translation, feet)
            })
            .map(|(entity, _, _)| entity)
            .collect();

        let entered = touching.iter().filter(|e| !grounded_on.0.contains(e)).count();
        let exited = grounded_on.0.iter().filter(|e| !touching.contains(e)).count();
        if entered == 0 && exited == 0 {
            continue;
        }

        for _ in 0..entered {
            commands.trigger(GroundContact::Entered);
        }
        for _ in 0..exited {
            commands.trigger(GroundContact::Exited);
        }
        grounded_on.0 = touching;
    }
}

/// Drops the player while unsupported and settles them on the highest ground
/// they stand on otherwise.
fn fall_system(
    mut commands: Commands,
    time: Res<Time>,
    mut players: Query<(Entity, &Player, &GroundedOn, &mut Transform, Option<&mut FallSpeed>)>,
    grounds: Query<(&Transform, &Ground), Without<Player>>,
) {
    let delta = time.delta_secs();
    for (entity, player, grounded_on, mut transform, fall_speed) in &mut players {
        let support_top = grounded_on
            .0
            .iter()
            .filter_map(|ground| grounds.get(*ground).ok())
            .map(|(ground_transform, ground)| ground.top(ground_transform.translation))
            .reduce(f32::max);

        match (support_top, fall_speed) {
            (Some(top), fall_speed) => {
                transform.translation.y = top + player.half_height;
                if fall_speed.is_some() {
                    commands.entity(entity).remove::<FallSpeed>();
                }
            }
            (None, Some(mut fall_speed)) => {
                fall_speed.0 += GRAVITY * delta;
                transform.translation.y -= fall_speed.0 * delta;
            }
            (None, None) => {
                commands.entity(entity).insert(FallSpeed::default());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GameConfig, RoundConfig};
    use crate::round::RoundController;
    use crate::round_flow::RoundPlugin;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn arrows_map_to_the_floor_plane() {
        assert_eq!(movement_direction(false, false, false, false), Vec3::ZERO);
        assert_eq!(movement_direction(true, false, false, false), Vec3::NEG_X);
        assert_eq!(movement_direction(false, false, true, false), Vec3::NEG_Z);
        assert_eq!(movement_direction(true, true, false, false), Vec3::ZERO);

        let diagonal = movement_direction(false, true, false, true);
        assert!((diagonal.length() - 1.0).abs() < 1e-6);
        assert!(diagonal.x > 0.0 && diagonal.z > 0.0);
    }

    #[test]
    fn random_element_stays_in_the_slice() {
        let mut rng = StdRng::seed_from_u64(7);
        let empty: [u8; 0] = [];
        assert_eq!(random_element(&empty, &mut rng), None);
        assert_eq!(random_element(&[42], &mut rng), Some(&42));

        let colors = ["red", "green", "blue"];
        for _ in 0..50 {
            let picked = random_element(&colors, &mut rng).unwrap();
            assert!(colors.contains(picked));
        }
    }

    fn arena_app() -> App {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, RoundPlugin, PlayerPlugin))
            .init_resource::<ButtonInput<KeyCode>>()
            .insert_resource(GameConfig {
                round: RoundConfig {
                    round_duration: 10.0,
                    fall_grace_seconds: 1.0,
                },
                ..default()
            });
        app.world_mut().spawn((
            Ground {
                half_extents: Vec3::new(5.0, 0.25, 5.0),
            },
            Transform::from_xyz(0.0, -0.25, 0.0),
        ));
        app.world_mut().spawn((
            Player::from_tuning(&PlayerTuning::default()),
            GroundedOn::default(),
            Transform::from_xyz(0.0, 0.4, 0.0),
        ));
        app.update();
        app
    }

    fn move_player_to(app: &mut App, x: f32) {
        let mut query = app
            .world_mut()
            .query_filtered::<&mut Transform, With<Player>>();
        for mut transform in query.iter_mut(app.world_mut()) {
            transform.translation.x = x;
        }
    }

    #[test]
    fn standing_player_counts_as_grounded() {
        let mut app = arena_app();
        app.update();
        let round = app.world().resource::<RoundController>();
        assert_eq!(round.survival().ground_contacts(), 1);
        assert_eq!(round.survival().fall_timer(), None);
    }

    #[test]
    fn walking_off_the_edge_starts_the_fall_countdown() {
        let mut app = arena_app();
        app.world_mut().trigger(crate::round_flow::RoundCommand::Start);
        app.update();

        move_player_to(&mut app, 6.0);
        app.update();

        let round = app.world().resource::<RoundController>();
        assert_eq!(round.survival().ground_contacts(), 0);
        assert!(round.survival().fall_timer().is_some());
    }

    #[test]
    fn stepping_back_on_cancels_the_fall() {
        let mut app = arena_app();
        app.world_mut().trigger(crate::round_flow::RoundCommand::Start);
        app.update();

        move_player_to(&mut app, 6.0);
        app.update();
        move_player_to(&mut app, 4.0);
        app.update();

        let round = app.world().resource::<RoundController>();
        assert_eq!(round.survival().ground_contacts(), 1);
        assert_eq!(round.survival().fall_timer(), None);
    }
}
