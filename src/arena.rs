use std::f32::consts::{FRAC_PI_4, TAU};

use bevy::prelude::*;

use crate::config::GameConfig;
use crate::enemies::{Enemy, Obstacle};
use crate::player::{random_element, GroundedOn, Player};
use crate::round_flow::RoundRestarted;

pub struct ArenaPlugin;

impl Plugin for ArenaPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(ArenaBounds {
            half_extents: Vec2::new(PLATFORM_HALF_EXTENTS.x, PLATFORM_HALF_EXTENTS.z),
        })
        .add_systems(Startup, (spawn_camera_and_light, spawn_arena_system))
        .add_observer(on_round_restarted);
    }
}

const PLATFORM_HALF_EXTENTS: Vec3 = Vec3::new(5.0, 0.25, 5.0);

/// Marker: belongs to the current round. Everything with it is despawned and
/// rebuilt when the round restarts. Camera and light don't have it.
#[derive(Component)]
pub struct RoundEntity;

/// A surface the player can stand on. `half_extents` is measured from the
/// entity's translation, like a Cuboid's half size.
#[derive(Component, Debug, Clone, Copy)]
pub struct Ground {
    pub half_extents: Vec3,
}

impl Ground {
    /// Feet may sink this far below the top and still count as standing on it.
    const TOLERANCE: f32 = 0.05;

    pub fn top(&self, center: Vec3) -> f32 {
        center.y + self.half_extents.y
    }

    /// True when a point at `feet` is over this ground and not below its top.
    /// Once something has dropped below the top it can't be standing on it again.
    pub fn supports(&self, center: Vec3, feet: Vec3) -> bool {
        (feet.x - center.x).abs() <= self.half_extents.x
            && (feet.z - center.z).abs() <= self.half_extents.z
            && feet.y >= self.top(center) - Self::TOLERANCE
    }
}

/// Horizontal area (XZ half size, centred on the origin) that enemies and
/// obstacles are kept inside. The player is not confined.
#[derive(Resource, Debug, Clone, Copy)]
pub struct ArenaBounds {
    pub half_extents: Vec2,
}

fn spawn_camera_and_light(mut commands: Commands) {
    commands.spawn((
        Camera3d::default(),
        Transform::from_xyz(0.0, 11.0, 13.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    commands.spawn((
        DirectionalLight {
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(4.0, 10.0, 6.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
}

fn spawn_arena_system(
    mut commands: Commands,
    config: Option<Res<GameConfig>>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let config = config.map(|config| (*config).clone()).unwrap_or_default();
    spawn_arena(&mut commands, &config, &mut meshes, &mut materials);
}

fn on_round_restarted(
    _restarted: On<RoundRestarted>,
    mut commands: Commands,
    round_entities: Query<Entity, With<RoundEntity>>,
    config: Option<Res<GameConfig>>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    // despawn() takes the children with it (enemy blades etc.)
    for entity in &round_entities {
        commands.entity(entity).despawn();
    }

    let config = config.map(|config| (*config).clone()).unwrap_or_default();
    spawn_arena(&mut commands, &config, &mut meshes, &mut materials);
}

/// `count` points evenly spaced on a circle of `radius`, starting at `offset` radians.
pub fn ring_positions(count: u32, radius: f32, offset: f32) -> Vec<Vec2> {
    (0..count)
        .map(|i| {
            let angle = offset + TAU * i as f32 / count as f32;
            Vec2::new(angle.cos(), angle.sin()) * radius
        })
        .collect()
}

fn spawn_arena(
    commands: &mut Commands,
    config: &GameConfig,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
) {
    // Platform. Its top sits at y = 0.
    commands.spawn((
        RoundEntity,
        Ground {
            half_extents: PLATFORM_HALF_EXTENTS,
        },
        Mesh3d(meshes.add(Cuboid::from_size(PLATFORM_HALF_EXTENTS * 2.0))),
        MeshMaterial3d(materials.add(Color::srgb(0.35, 0.4, 0.35))),
        Transform::from_xyz(0.0, -PLATFORM_HALF_EXTENTS.y, 0.0),
    ));

    // Player, standing in the middle.
    let player = Player::from_tuning(&config.player);
    let (r, g, b) = random_element(&config.player.colors, &mut rand::thread_rng())
        .copied()
        .unwrap_or((1.0, 1.0, 1.0));
    info!(
        "Player spawned: colour ({}, {}, {}), move speed {}, spin speed {} deg/s",
        r, g, b, player.move_speed, player.spin_speed_degrees
    );
    commands.spawn((
        RoundEntity,
        GroundedOn::default(),
        Mesh3d(meshes.add(Cuboid::from_length(player.half_height * 2.0))),
        MeshMaterial3d(materials.add(Color::srgb(r, g, b))),
        Transform::from_xyz(0.0, player.half_height, 0.0),
        player,
    ));

    // Enemies around the edge, each with a blade sticking out front.
    let enemy_mesh = meshes.add(Cuboid::new(0.6, 1.0, 0.6));
    let blade_mesh = meshes.add(Cuboid::new(0.08, 0.08, 0.9));
    let enemy_material = materials.add(Color::srgb(0.8, 0.15, 0.15));
    let blade_material = materials.add(Color::srgb(0.85, 0.85, 0.9));
    for position in ring_positions(config.enemy.count, 4.0, FRAC_PI_4) {
        commands
            .spawn((
                RoundEntity,
                Enemy::from_tuning(&config.enemy),
                Mesh3d(enemy_mesh.clone()),
                MeshMaterial3d(enemy_material.clone()),
                Transform::from_xyz(position.x, 0.5, position.y),
            ))
            .with_children(|enemy| {
                enemy.spawn((
                    Mesh3d(blade_mesh.clone()),
                    MeshMaterial3d(blade_material.clone()),
                    Transform::from_xyz(0.4, 0.1, -0.5),
                ));
            });
    }

    // Obstacles wander between the player and the enemies. Nothing collides with them.
    let obstacle_mesh = meshes.add(Cuboid::new(0.8, 0.8, 0.8));
    let obstacle_material = materials.add(Color::srgb(0.55, 0.45, 0.3));
    let mut rng = rand::thread_rng();
    for position in ring_positions(config.obstacle.count, 2.5, 0.0) {
        commands.spawn((
            RoundEntity,
            Obstacle::from_tuning(&config.obstacle, &mut rng),
            Mesh3d(obstacle_mesh.clone()),
            MeshMaterial3d(obstacle_material.clone()),
            Transform::from_xyz(position.x, 0.4, position.y),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::PlayerPlugin;
    use crate::round::RoundController;
    use crate::round_flow::{EnemyContact, RoundCommand, RoundPlugin};

    fn platform() -> (Ground, Vec3) {
        (
            Ground {
                half_extents: Vec3::new(5.0, 0.25, 5.0),
            },
            Vec3::new(0.0, -0.25, 0.0),
        )
    }

    #[test]
    fn standing_on_the_platform() {
        let (ground, center) = platform();
        assert!(ground.supports(center, Vec3::new(0.0, 0.0, 0.0)));
        assert!(ground.supports(center, Vec3::new(4.9, 0.0, -5.0)));
    }

    #[test]
    fn past_the_edge_is_not_supported() {
        let (ground, center) = platform();
        assert!(!ground.supports(center, Vec3::new(5.1, 0.0, 0.0)));
        assert!(!ground.supports(center, Vec3::new(0.0, 0.0, -5.2)));
    }

    #[test]
    fn below_the_top_is_not_supported() {
        let (ground, center) = platform();
        assert!(ground.supports(center, Vec3::new(0.0, -0.04, 0.0)));
        assert!(!ground.supports(center, Vec3::new(0.0, -0.3, 0.0)));
    }

    #[test]
    fn ring_positions_are_on_the_circle() {
        let positions = ring_positions(4, 2.0, 0.0);
        assert_eq!(positions.len(), 4);
        for position in &positions {
            assert!((position.length() - 2.0).abs() < 1e-5);
        }
        assert!((positions[0] - Vec2::new(2.0, 0.0)).length() < 1e-5);
        assert!(ring_positions(0, 2.0, 0.0).is_empty());
    }

    fn scene_app() -> App {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, RoundPlugin, ArenaPlugin, PlayerPlugin))
            .init_resource::<Assets<Mesh>>()
            .init_resource::<Assets<StandardMaterial>>()
            .init_resource::<ButtonInput<KeyCode>>()
            .insert_resource(GameConfig::default());
        app.update();
        app
    }

    fn entities_with<T: Component>(app: &mut App) -> Vec<Entity> {
        let mut query = app.world_mut().query_filtered::<Entity, With<T>>();
        query.iter(app.world()).collect()
    }

    #[test]
    fn restart_rebuilds_the_scene_and_the_player_lands_again() {
        let mut app = scene_app();
        app.world_mut().trigger(RoundCommand::Start);
        app.update();

        let old_player = entities_with::<Player>(&mut app);
        let old_ground = entities_with::<Ground>(&mut app);
        assert_eq!(old_player.len(), 1);
        assert_eq!(old_ground.len(), 1);
        assert_eq!(
            entities_with::<RoundEntity>(&mut app).len() as u32,
            2 + GameConfig::default().enemy.count + GameConfig::default().obstacle.count
        );

        app.world_mut().trigger(EnemyContact);
        app.update();
        assert!(app.world().resource::<RoundController>().round_ended());

        app.world_mut()
            .resource_mut::<ButtonInput<KeyCode>>()
            .press(KeyCode::KeyR);
        app.update();
        {
            let mut keys = app.world_mut().resource_mut::<ButtonInput<KeyCode>>();
            keys.release(KeyCode::KeyR);
            keys.clear();
        }
        app.update();

        let new_player = entities_with::<Player>(&mut app);
        let new_ground = entities_with::<Ground>(&mut app);
        assert_eq!(new_player.len(), 1);
        assert_eq!(new_ground.len(), 1);
        assert!(app.world().get_entity(old_player[0]).is_err());
        assert!(app.world().get_entity(old_ground[0]).is_err());

        let round = app.world().resource::<RoundController>();
        assert!(!round.started());
        assert!(!round.round_ended());
        assert_eq!(round.survival().ground_contacts(), 1);
        assert_eq!(round.survival().fall_timer(), None);
    }
}
