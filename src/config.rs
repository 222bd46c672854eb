use bevy::prelude::*;
use serde::{Deserialize, Serialize};

pub struct ConfigPlugin;

impl Plugin for ConfigPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(PreStartup, load_config);
    }
}

/// Everything the game reads from config.ron.
///
/// Every field is #[serde(default)], so a config file only needs the values it
/// wants to change. `(round: (round_duration: 30.0))` is a complete config file.
#[derive(Resource, Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct GameConfig {
    #[serde(default)]
    pub round: RoundConfig,
    #[serde(default)]
    pub player: PlayerTuning,
    #[serde(default)]
    pub enemy: EnemyTuning,
    #[serde(default)]
    pub obstacle: ObstacleTuning,
}

/// The two knobs of the round itself. Both must be positive.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct RoundConfig {
    /// Seconds the player has to survive.
    pub round_duration: f32,
    /// Seconds the player may spend off the ground before the fall counts as death.
    pub fall_grace_seconds: f32,
}

impl Default for RoundConfig {
    fn default() -> Self {
        Self {
            round_duration: 10.0,
            fall_grace_seconds: 1.0,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct PlayerTuning {
    pub move_speed: f32,
    /// Idle spin around the vertical axis, degrees per second.
    pub spin_speed_degrees: f32,
    /// Body colours to pick from at spawn, as (r, g, b) in 0.0..=1.0.
    pub colors: Vec<(f32, f32, f32)>,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            move_speed: 3.0,
            spin_speed_degrees: 90.0,
            colors: vec![(0.2, 0.6, 1.0), (0.3, 0.9, 0.4), (1.0, 0.8, 0.2)],
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct EnemyTuning {
    pub move_speed: f32,
    pub swing_angle_degrees: f32,
    pub swing_speed: f32,
    pub count: u32,
}

impl Default for EnemyTuning {
    fn default() -> Self {
        Self {
            move_speed: 3.0,
            swing_angle_degrees: 30.0,
            swing_speed: 5.0,
            count: 2,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ObstacleTuning {
    pub move_speed: f32,
    /// Seconds between picking a new random heading.
    pub direction_change_interval: f32,
    pub count: u32,
}

impl Default for ObstacleTuning {
    fn default() -> Self {
        Self {
            move_speed: 1.5,
            direction_change_interval: 2.0,
            count: 3,
        }
    }
}

const CONFIG_FILE_NAME: &str = "config.ron";

/// Parses a config file and repairs any round values that can't work.
pub fn parse_config(contents: &str) -> Result<GameConfig, ron::error::SpannedError> {
    let mut config = ron::from_str::<GameConfig>(contents)?;
    config.round = sanitize_round(config.round);
    Ok(config)
}

/// A non-positive (or NaN/infinite) duration would end or freeze the round before it
/// starts, so each bad value falls back to its default on its own.
fn sanitize_round(round: RoundConfig) -> RoundConfig {
    let defaults = RoundConfig::default();
    let mut fixed = round;

    if !(round.round_duration.is_finite() && round.round_duration > 0.0) {
        warn!(
            "round_duration must be positive, got {}. Using {}.",
            round.round_duration, defaults.round_duration
        );
        fixed.round_duration = defaults.round_duration;
    }
    if !(round.fall_grace_seconds.is_finite() && round.fall_grace_seconds > 0.0) {
        warn!(
            "fall_grace_seconds must be positive, got {}. Using {}.",
            round.fall_grace_seconds, defaults.fall_grace_seconds
        );
        fixed.fall_grace_seconds = defaults.fall_grace_seconds;
    }
    fixed
}

/// Candidate config locations, most specific first:
/// the per-user config directory, then the working directory.
fn config_paths() -> Vec<std::path::PathBuf> {
    let mut paths = Vec::new();
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("gsd-platformer").join(CONFIG_FILE_NAME));
    }
    paths.push(std::path::PathBuf::from(CONFIG_FILE_NAME));
    paths
}

/// Reads the first config file that exists, or returns None to use defaults.
fn read_config() -> Option<GameConfig> {
    let Some(path) = config_paths().into_iter().find(|path| path.exists()) else {
        info!("No {} found. Using default settings.", CONFIG_FILE_NAME);
        return None;
    };

    match std::fs::read_to_string(&path) {
        Ok(contents) => match parse_config(&contents) {
            Ok(config) => {
                info!("Loaded config from {:?}: {:?}", path, config.round);
                Some(config)
            }
            Err(e) => {
                // Bad syntax or a wrong type somewhere. Play with defaults rather than crash.
                error!("Failed to parse {:?}: {}. Using defaults.", path, e);
                None
            }
        },
        Err(e) => {
            error!("Failed to read {:?}: {}. Using defaults.", path, e);
            None
        }
    }
}

fn load_config(mut commands: Commands) {
    let config = read_config().unwrap_or_default();
    commands.insert_resource(config);
}
