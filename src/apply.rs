//! Profile activation: validate, sync basal to the pump, then commit.
//!
//! One activation drives a candidate profile through an explicit phase
//! machine: `Idle → Validating → SyncingBasal → Committing → Succeeded |
//! Failed`. Validation failures never reach the hardware; sync failures
//! never reach the configuration. The returned future resolves exactly once
//! with the outcome, and `run` consumes the activation by value, so a second
//! completion is unrepresentable. No retry and no cancellation: once the
//! sync step starts, the activation runs to a terminal phase, and a caller
//! that wants to abandon a load simply ignores the outcome.

use tracing::{debug, info, warn};

use crate::error::Result;
use crate::profile::Profile;
use crate::pump::{ActiveConfiguration, PumpDelegate};
use crate::validation::{DeviceLimits, validate};

/// Phase of one activation, in order of progression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPhase {
    /// Nothing started yet.
    Idle,
    /// Running the pure safety-bound checks.
    Validating,
    /// Waiting on the pump to confirm the basal schedule.
    SyncingBasal,
    /// Writing all four settings to the active configuration.
    Committing,
    /// Terminal: every setting committed.
    Succeeded,
    /// Terminal: no setting committed past the failing step.
    Failed,
}

/// A single profile-activation invocation.
pub struct ProfileActivation<'a, D, C> {
    profile: &'a Profile,
    limits: DeviceLimits,
    delegate: &'a D,
    config: &'a mut C,
    phase: LoadPhase,
}

impl<'a, D: PumpDelegate, C: ActiveConfiguration> ProfileActivation<'a, D, C> {
    /// Prepare an activation. Nothing runs until [`run`](Self::run).
    #[must_use]
    pub fn new(
        profile: &'a Profile,
        limits: DeviceLimits,
        delegate: &'a D,
        config: &'a mut C,
    ) -> Self {
        Self {
            profile,
            limits,
            delegate,
            config,
            phase: LoadPhase::Idle,
        }
    }

    /// The current phase.
    #[must_use]
    pub const fn phase(&self) -> LoadPhase {
        self.phase
    }

    /// Drive the activation to a terminal phase and report the outcome.
    ///
    /// Commit side effects land on the calling task after the sync `.await`,
    /// so the caller's execution context is the configuration-mutation
    /// context.
    pub async fn run(mut self) -> Result<()> {
        let name = self.profile.name.clone();
        let outcome = self.advance().await;
        match &outcome {
            Ok(()) => {
                self.phase = LoadPhase::Succeeded;
                info!(name = %name, "Profile activated");
            }
            Err(e) => {
                self.phase = LoadPhase::Failed;
                warn!(name = %name, error = %e, "Profile activation failed");
            }
        }
        outcome
    }

    async fn advance(&mut self) -> Result<()> {
        self.transition(LoadPhase::Validating);
        validate(self.profile, &self.limits)?;

        self.transition(LoadPhase::SyncingBasal);
        let confirmed = self
            .delegate
            .sync_basal_schedule(&self.profile.basal_rate_schedule)
            .await?;

        self.transition(LoadPhase::Committing);
        // Fixed commit order; the basal written is the pump's confirmed
        // schedule, not the one we asked for.
        self.config
            .apply_correction_range(self.profile.correction_range.clone());
        self.config
            .apply_carb_ratio_schedule(self.profile.carb_ratio_schedule.clone());
        self.config.apply_basal_rate_schedule(confirmed);
        self.config
            .apply_insulin_sensitivity_schedule(self.profile.insulin_sensitivity_schedule.clone());
        Ok(())
    }

    fn transition(&mut self, next: LoadPhase) {
        debug!(name = %self.profile.name, from = ?self.phase, to = ?next, "Activation phase");
        self.phase = next;
    }
}
