use bevy::prelude::*;

use crate::config::GameConfig;
use crate::round::RoundController;
use crate::survival::{DeathCause, Outcome};

pub struct RoundPlugin;

impl Plugin for RoundPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, setup_round_controller)
            .add_systems(
                Update,
                // Keys first so a pause pressed this frame already stops this frame's tick.
                (keyboard_command_system, round_tick_system)
                    .chain()
                    .in_set(RoundSystems),
            )
            .add_observer(on_round_command)
            .add_observer(on_ground_contact)
            .add_observer(on_enemy_contact)
            .add_observer(log_round_finished);
    }
}

/// The systems that advance the round. Gameplay systems run `.before(RoundSystems)`
/// so contacts they detect are counted in the same frame's tick.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct RoundSystems;

/// Requests coming from the keyboard or the HUD buttons.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundCommand {
    Start,
    TogglePause,
    Resume,
    Restart,
}

/// The player started or stopped touching one piece of ground.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroundContact {
    Entered,
    Exited,
}

/// The player touched an enemy.
#[derive(Event, Debug, Clone, Copy)]
pub struct EnemyContact;

/// Fired exactly once per round, when the outcome is decided.
#[derive(Event, Debug, Clone, Copy)]
pub struct RoundFinished {
    pub outcome: Outcome,
    pub cause: Option<DeathCause>,
}

/// The round was reset; anything that belongs to the old round should be rebuilt.
#[derive(Event, Debug, Clone, Copy)]
pub struct RoundRestarted;

/// Run condition: the world should move (started, not paused, not over).
pub fn round_in_play(round: Option<Res<RoundController>>) -> bool {
    round.is_some_and(|round| round.in_play())
}

fn setup_round_controller(mut commands: Commands, config: Option<Res<GameConfig>>) {
    let round_config = config.map(|config| config.round).unwrap_or_default();
    commands.insert_resource(RoundController::new(round_config));
    info!("Round ready ({}s). Press Space to start.", round_config.round_duration);
}

/// Space starts, Escape toggles pause, R restarts once the round is over.
fn keyboard_command_system(
    mut commands: Commands,
    keys: Res<ButtonInput<KeyCode>>,
    round: Res<RoundController>,
) {
    if !round.started() && !round.round_ended() {
        if keys.just_pressed(KeyCode::Space) {
            commands.trigger(RoundCommand::Start);
        }
        return;
    }

    if round.round_ended() {
        if keys.just_pressed(KeyCode::KeyR) {
            commands.trigger(RoundCommand::Restart);
        }
        return;
    }

    if keys.just_pressed(KeyCode::Escape) {
        commands.trigger(RoundCommand::TogglePause);
    }
}

fn round_tick_system(mut commands: Commands, time: Res<Time>, mut round: ResMut<RoundController>) {
    if let Some(outcome) = round.tick(time.delta_secs()) {
        commands.trigger(RoundFinished {
            outcome,
            cause: round.death_cause(),
        });
    }
}

fn on_round_command(
    command: On<RoundCommand>,
    mut commands: Commands,
    mut round: ResMut<RoundController>,
) {
    match *command {
        RoundCommand::Start => {
            if round.start() {
                info!("Round started.");
            }
        }
        RoundCommand::TogglePause => match round.toggle_pause() {
            Some(true) => info!("Round paused."),
            Some(false) => info!("Round resumed."),
            None => debug!("Pause ignored: round not running."),
        },
        RoundCommand::Resume => {
            if round.resume() {
                info!("Round resumed.");
            }
        }
        RoundCommand::Restart => {
            round.restart();
            info!("Round restarted.");
            commands.trigger(RoundRestarted);
        }
    }
}

fn on_ground_contact(contact: On<GroundContact>, mut round: ResMut<RoundController>) {
    match *contact {
        GroundContact::Entered => round.on_ground_enter(),
        GroundContact::Exited => round.on_ground_exit(),
    }
}

fn on_enemy_contact(
    _contact: On<EnemyContact>,
    mut commands: Commands,
    mut round: ResMut<RoundController>,
) {
    if let Some(outcome) = round.on_enemy_contact() {
        commands.trigger(RoundFinished {
            outcome,
            cause: round.death_cause(),
        });
    }
}

fn log_round_finished(finished: On<RoundFinished>) {
    match (finished.outcome, finished.cause) {
        (Outcome::Won, _) => info!("Player survived. You Win!"),
        (Outcome::Died, Some(DeathCause::Fell)) => info!("Player died: fell off the platform."),
        (Outcome::Died, Some(DeathCause::Enemy)) => info!("Player died: caught by an enemy."),
        (outcome, cause) => warn!("Round finished in an odd state: {:?} {:?}", outcome, cause),
    }
}
