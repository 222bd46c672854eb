// round.rs - The single authoritative round state.
//
// RoundController is a Resource, so there is exactly one per App. Every system that
// needs round state asks for Res<RoundController> / ResMut<RoundController> instead
// of reaching for a global "current game manager".

use bevy::prelude::*;

use crate::config::RoundConfig;
use crate::round_clock::RoundClock;
use crate::survival::{DeathCause, Outcome, SurvivalStateMachine};

#[derive(Resource, Debug, Clone, PartialEq)]
pub struct RoundController {
    config: RoundConfig,
    clock: RoundClock,
    survival: SurvivalStateMachine,
    started: bool,
    ended: bool,
    paused: bool,
}

impl RoundController {
    pub fn new(config: RoundConfig) -> Self {
        RoundController {
            config,
            clock: RoundClock::new(config.round_duration),
            survival: SurvivalStateMachine::new(config.fall_grace_seconds),
            started: false,
            ended: false,
            paused: false,
        }
    }

    #[cfg(test)]
    pub fn config(&self) -> RoundConfig {
        self.config
    }

    #[cfg(test)]
    pub fn clock(&self) -> &RoundClock {
        &self.clock
    }

    #[cfg(test)]
    pub fn survival(&self) -> &SurvivalStateMachine {
        &self.survival
    }

    #[cfg(test)]
    pub fn outcome(&self) -> Outcome {
        self.survival.outcome()
    }

    pub fn death_cause(&self) -> Option<DeathCause> {
        self.survival.death_cause()
    }

    pub fn started(&self) -> bool {
        self.started
    }

    pub fn round_ended(&self) -> bool {
        self.ended
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// True while the world should be moving: started, not paused, not over.
    pub fn in_play(&self) -> bool {
        self.started && !self.ended && !self.paused
    }

    pub fn pause_allowed(&self) -> bool {
        self.started && !self.ended
    }

    pub fn display_seconds(&self) -> u32 {
        self.clock.display_seconds()
    }

    /// "" while the round is running, otherwise the banner for how it ended.
    pub fn round_result_text(&self) -> &'static str {
        if !self.ended {
            return "";
        }
        match self.survival.outcome() {
            Outcome::Died => "You Died",
            Outcome::Won => "You Win",
            Outcome::InProgress => "",
        }
    }

    /// Returns false if the round was already started (or is over).
    pub fn start(&mut self) -> bool {
        if self.started || self.ended {
            return false;
        }
        self.started = true;
        self.paused = false;
        self.clock.resume();
        true
    }

    /// Flips between paused and running. Returns the new paused state, or
    /// `None` when pausing isn't allowed right now.
    pub fn toggle_pause(&mut self) -> Option<bool> {
        if !self.pause_allowed() {
            return None;
        }
        if self.paused {
            self.resume();
        } else {
            self.pause();
        }
        Some(self.paused)
    }

    pub fn pause(&mut self) -> bool {
        if !self.pause_allowed() || self.paused {
            return false;
        }
        self.paused = true;
        self.clock.pause();
        true
    }

    pub fn resume(&mut self) -> bool {
        if self.ended || !self.paused {
            return false;
        }
        self.paused = false;
        self.clock.resume();
        true
    }

    /// Runs one step of the round. Returns the outcome if this tick decided it.
    ///
    /// Order matters: the clock and fall countdown both advance first, then a
    /// death is checked before a win, so dying on the last tick is still a death.
    pub fn tick(&mut self, delta_seconds: f32) -> Option<Outcome> {
        if !self.started || self.ended || self.paused {
            return None;
        }

        self.clock.tick(delta_seconds);
        self.survival.tick(delta_seconds);

        if self.survival.outcome() == Outcome::Died {
            return self.finish();
        }
        if self.clock.expired() && self.survival.force_win() {
            return self.finish();
        }
        None
    }

    // Contact bookkeeping is instantaneous, so it applies even while paused
    // or before the round starts.
    pub fn on_ground_enter(&mut self) {
        self.survival.on_ground_enter();
    }

    pub fn on_ground_exit(&mut self) {
        self.survival.on_ground_exit();
    }

    /// Kills the player and ends the round on the spot. Ignored unless the
    /// round is in play: before start, while paused and after the end.
    pub fn on_enemy_contact(&mut self) -> Option<Outcome> {
        if !self.in_play() {
            return None;
        }
        if self.survival.on_enemy_contact() {
            return self.finish();
        }
        None
    }

    /// Back to the state of a freshly built controller with the same config.
    pub fn restart(&mut self) {
        *self = RoundController::new(self.config);
    }

    fn finish(&mut self) -> Option<Outcome> {
        if self.ended {
            return None;
        }
        self.ended = true;
        self.paused = false;
        self.clock.pause();
        Some(self.survival.outcome())
    }
}
