/// How the round ended for the player. `InProgress` until the first
/// (and only) transition to `Died` or `Won`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Outcome {
    #[default]
    InProgress,
    Died,
    Won,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeathCause {
    /// Off the ground for the whole grace period.
    Fell,
    /// Touched an enemy. No grace period.
    Enemy,
}

/// Tracks whether the player is still alive.
///
/// Ground contacts are counted rather than flagged because the player can
/// overlap several ground pieces at once; leaving one of them doesn't mean
/// falling. When the count hits zero a fall countdown starts, and any new
/// ground contact cancels it before it can kill.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurvivalStateMachine {
    outcome: Outcome,
    cause: Option<DeathCause>,
    ground_contacts: u32,
    /// Seconds left before a fall becomes a death. `Some` only while
    /// `ground_contacts == 0` and the outcome is still `InProgress`.
    fall_timer: Option<f32>,
    fall_grace_seconds: f32,
}

impl SurvivalStateMachine {
    pub fn new(fall_grace_seconds: f32) -> Self {
        SurvivalStateMachine {
            outcome: Outcome::InProgress,
            cause: None,
            ground_contacts: 0,
            fall_timer: None,
            fall_grace_seconds,
        }
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    pub fn death_cause(&self) -> Option<DeathCause> {
        self.cause
    }

    #[cfg(test)]
    pub fn ground_contacts(&self) -> u32 {
        self.ground_contacts
    }

    #[cfg(test)]
    pub fn fall_timer(&self) -> Option<f32> {
        self.fall_timer
    }

    pub fn on_ground_enter(&mut self) {
        self.ground_contacts += 1;
        self.fall_timer = None;
    }

    pub fn on_ground_exit(&mut self) {
        self.ground_contacts = self.ground_contacts.saturating_sub(1);
        if self.ground_contacts == 0
            && self.outcome == Outcome::InProgress
            && self.fall_timer.is_none()
        {
            self.fall_timer = Some(self.fall_grace_seconds);
        }
    }

    /// Instant death, whatever the ground or fall timer say.
    /// Returns true if this call decided the outcome.
    pub fn on_enemy_contact(&mut self) -> bool {
        self.die(DeathCause::Enemy)
    }

    /// Advances the fall countdown. Pausing is the caller's job: a paused
    /// round simply doesn't call this.
    pub fn tick(&mut self, delta_seconds: f32) {
        let Some(remaining) = self.fall_timer else {
            return;
        };
        let delta = if delta_seconds > 0.0 { delta_seconds } else { 0.0 };
        let remaining = (remaining - delta).max(0.0);

        if remaining > 0.0 {
            self.fall_timer = Some(remaining);
            return;
        }

        self.fall_timer = None;
        if self.ground_contacts == 0 {
            self.die(DeathCause::Fell);
        }
    }

    /// Declares the player the winner. Only the first terminal transition counts.
    pub fn force_win(&mut self) -> bool {
        if self.outcome != Outcome::InProgress {
            return false;
        }
        self.outcome = Outcome::Won;
        self.fall_timer = None;
        true
    }

    fn die(&mut self, cause: DeathCause) -> bool {
        if self.outcome != Outcome::InProgress {
            return false;
        }
        self.outcome = Outcome::Died;
        self.cause = Some(cause);
        self.fall_timer = None;
        true
    }
}
