// hud.rs - Start panel, in-game HUD, and pause panel.
//
// All three panels are spawned once at startup and then only shown or hidden.
// Systems find the pieces they drive through marker components (Panel, HudText,
// HudButton), which are attached at spawn time, so nothing is looked up by name.

use bevy::prelude::*;

use crate::round::RoundController;
use crate::round_flow::RoundCommand;

pub struct HudPlugin;

impl Plugin for HudPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_hud).add_systems(
            Update,
            (
                hud_button_system,
                sync_panels_system,
                sync_hud_text_system,
                pause_button_tint_system,
            )
                .chain(),
        );
    }
}

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    /// "Press Space to Start", shown until the round starts.
    Start,
    /// Timer, events text and pause button, shown once the round starts.
    Hud,
    /// Continue / Restart, shown while paused.
    Pause,
}

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HudText {
    Timer,
    Events,
}

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HudButton {
    Pause,
    Continue,
    Restart,
}

const BUTTON_COLOR: Color = Color::srgb(0.2, 0.3, 0.5);
const BUTTON_DISABLED_COLOR: Color = Color::srgb(0.25, 0.25, 0.25);

fn spawn_hud(mut commands: Commands) {
    // Start panel: title and instructions, centered.
    commands
        .spawn((
            Panel::Start,
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                flex_direction: FlexDirection::Column,
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                row_gap: Val::Px(24.0),
                ..default()
            },
            BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.5)),
            Visibility::Visible,
        ))
        .with_children(|parent| {
            parent.spawn((
                Text::new("GSD Platformer"),
                TextFont {
                    font_size: 72.0,
                    ..default()
                },
                TextColor(Color::WHITE),
            ));
            parent.spawn((
                Text::new("Press Space to Start"),
                TextFont {
                    font_size: 36.0,
                    ..default()
                },
                TextColor(Color::WHITE),
            ));
            parent.spawn((
                Text::new("Arrow keys to move. Stay on the platform and away from the enemies."),
                TextFont {
                    font_size: 20.0,
                    ..default()
                },
                TextColor(Color::srgb(0.8, 0.8, 0.8)),
            ));
        });

    // In-game HUD: pause button top-left, timer top-right, events text centered.
    commands
        .spawn((
            Panel::Hud,
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                ..default()
            },
            Visibility::Hidden,
        ))
        .with_children(|parent| {
            parent
                .spawn((
                    Button,
                    HudButton::Pause,
                    Node {
                        position_type: PositionType::Absolute,
                        top: Val::Px(16.0),
                        left: Val::Px(16.0),
                        width: Val::Px(120.0),
                        height: Val::Px(48.0),
                        justify_content: JustifyContent::Center,
                        align_items: AlignItems::Center,
                        ..default()
                    },
                    BackgroundColor(BUTTON_DISABLED_COLOR),
                ))
                .with_children(|button| {
                    button.spawn((
                        Text::new("Pause"),
                        TextFont {
                            font_size: 24.0,
                            ..default()
                        },
                        TextColor(Color::WHITE),
                    ));
                });

            parent.spawn((
                HudText::Timer,
                Text::new(""),
                TextFont {
                    font_size: 48.0,
                    ..default()
                },
                TextColor(Color::WHITE),
                Node {
                    position_type: PositionType::Absolute,
                    top: Val::Px(12.0),
                    right: Val::Px(24.0),
                    ..default()
                },
            ));

            parent.spawn((
                HudText::Events,
                Text::new(""),
                TextFont {
                    font_size: 64.0,
                    ..default()
                },
                TextColor(Color::WHITE),
                TextLayout::new_with_justify(Justify::Center),
            ));
        });

    // Pause panel: dims the screen, Continue and Restart stacked in the middle.
    commands
        .spawn((
            Panel::Pause,
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                flex_direction: FlexDirection::Column,
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                row_gap: Val::Px(24.0),
                ..default()
            },
            BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.6)),
            Visibility::Hidden,
        ))
        .with_children(|parent| {
            parent.spawn((
                Text::new("Paused"),
                TextFont {
                    font_size: 64.0,
                    ..default()
                },
                TextColor(Color::WHITE),
            ));
            spawn_panel_button(parent, HudButton::Continue, "Continue");
            spawn_panel_button(parent, HudButton::Restart, "Restart");
        });
}

fn spawn_panel_button(parent: &mut ChildSpawnerCommands, kind: HudButton, label: &str) {
    parent
        .spawn((
            Button,
            kind,
            Node {
                width: Val::Px(250.0),
                height: Val::Px(72.0),
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                border: UiRect::all(Val::Px(3.0)),
                ..default()
            },
            BackgroundColor(BUTTON_COLOR),
            BorderColor::all(Color::srgb(0.4, 0.5, 0.7)),
        ))
        .with_children(|button| {
            button.spawn((
                Text::new(label),
                TextFont {
                    font_size: 32.0,
                    ..default()
                },
                TextColor(Color::WHITE),
            ));
        });
}

/// Turns button clicks into round commands.
/// The pause button stays clickable in the UI sense but does nothing unless pausing
/// is allowed (the tint system greys it out at those times).
fn hud_button_system(
    mut commands: Commands,
    round: Res<RoundController>,
    buttons: Query<(&Interaction, &HudButton), Changed<Interaction>>,
) {
    for (interaction, button) in &buttons {
        if *interaction != Interaction::Pressed {
            continue;
        }
        match button {
            HudButton::Pause => {
                if round.pause_allowed() {
                    commands.trigger(RoundCommand::TogglePause);
                }
            }
            HudButton::Continue => {
                commands.trigger(RoundCommand::Resume);
            }
            HudButton::Restart => {
                commands.trigger(RoundCommand::Restart);
            }
        }
    }
}

fn panel_visible(panel: Panel, round: &RoundController) -> bool {
    match panel {
        Panel::Start => !round.started() && !round.round_ended(),
        Panel::Hud => round.started() || round.round_ended(),
        Panel::Pause => round.is_paused(),
    }
}

fn sync_panels_system(round: Res<RoundController>, mut panels: Query<(&Panel, &mut Visibility)>) {
    for (panel, mut visibility) in &mut panels {
        let wanted = if panel_visible(*panel, &round) {
            Visibility::Visible
        } else {
            Visibility::Hidden
        };
        visibility.set_if_neq(wanted);
    }
}

/// Events text shown for a finished round, e.g. "You Win!\nPress R to Restart".
pub fn events_text(round: &RoundController) -> String {
    match round.round_result_text() {
        "" => String::new(),
        result => format!("{}!\nPress R to Restart", result),
    }
}

fn sync_hud_text_system(
    round: Res<RoundController>,
    mut texts: Query<(&HudText, &mut Text)>,
    mut warned_missing: Local<bool>,
) {
    let mut found_timer = false;
    let mut found_events = false;

    for (kind, mut text) in &mut texts {
        let wanted = match kind {
            HudText::Timer => {
                found_timer = true;
                round.display_seconds().to_string()
            }
            HudText::Events => {
                found_events = true;
                events_text(&round)
            }
        };
        if text.0 != wanted {
            text.0 = wanted;
        }
    }

    if !(found_timer && found_events) && !*warned_missing {
        *warned_missing = true;
        warn!(
            "HUD is missing text nodes (timer: {}, events: {}). Round state won't be fully shown.",
            found_timer, found_events
        );
    }
}

fn pause_button_tint_system(
    round: Res<RoundController>,
    mut buttons: Query<(&HudButton, &mut BackgroundColor)>,
) {
    for (button, mut background) in &mut buttons {
        if *button != HudButton::Pause {
            continue;
        }
        let wanted = if round.pause_allowed() {
            BUTTON_COLOR
        } else {
            BUTTON_DISABLED_COLOR
        };
        background.set_if_neq(BackgroundColor(wanted));
    }
}
