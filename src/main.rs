use bevy::prelude::*;

fn main() {
    App::new()
        .insert_resource(ClearColor(Color::srgb(0.1, 0.12, 0.16)))
        .add_plugins((
            DefaultPlugins.set(WindowPlugin {
                primary_window: Some(Window {
                    title: "GSD Platformer".into(),
                    ..default()
                }),
                ..default()
            }),
            config::ConfigPlugin,
            round_flow::RoundPlugin,
            hud::HudPlugin,
            arena::ArenaPlugin,
            player::PlayerPlugin,
            enemies::EnemyPlugin,
        ))
        .run();
}

mod arena;
mod config;
mod enemies;
mod hud;
mod player;
mod round;
mod round_clock;
mod round_flow;
mod survival;
