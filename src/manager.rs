//! Collaborator-facing facade over the store, validator, and pipeline.
//!
//! A host UI talks to [`ProfileManager`] exclusively: list and preview
//! stored profiles, snapshot the active configuration into a new record,
//! validate a candidate, and activate one through the load pipeline. The
//! manager holds no schedule state of its own; every listing re-reads
//! storage and every save re-snapshots the live configuration.

use tracing::instrument;

use crate::apply::ProfileActivation;
use crate::error::{ProfileError, Result};
use crate::profile::{Profile, ProfileReference, ProfileStore};
use crate::pump::{ActiveConfiguration, PumpDelegate};
use crate::validation::{
    CARB_RATIO_BOUNDS, CORRECTION_RANGE_BOUNDS, DeviceLimits, Guardrail,
    INSULIN_SENSITIVITY_BOUNDS, validate,
};

/// Orchestrates profile CRUD, validation, and activation for a host.
///
/// Owns the store plus the two collaborator handles (pump delegate and
/// active configuration). The store is single-writer; the host serializes
/// calls into the manager.
pub struct ProfileManager<D, C> {
    store: ProfileStore,
    delegate: D,
    config: C,
    correction_range_bounds: Guardrail,
    insulin_sensitivity_bounds: Guardrail,
    carb_ratio_bounds: Guardrail,
}

impl<D: PumpDelegate, C: ActiveConfiguration> ProfileManager<D, C> {
    /// Create a manager with the default clinical guardrails.
    #[must_use]
    pub fn new(store: ProfileStore, delegate: D, config: C) -> Self {
        Self {
            store,
            delegate,
            config,
            correction_range_bounds: CORRECTION_RANGE_BOUNDS,
            insulin_sensitivity_bounds: INSULIN_SENSITIVITY_BOUNDS,
            carb_ratio_bounds: CARB_RATIO_BOUNDS,
        }
    }

    /// Override the clinical guardrails.
    #[must_use]
    pub fn with_guardrails(
        mut self,
        correction_range: Guardrail,
        insulin_sensitivity: Guardrail,
        carb_ratio: Guardrail,
    ) -> Self {
        self.correction_range_bounds = correction_range;
        self.insulin_sensitivity_bounds = insulin_sensitivity;
        self.carb_ratio_bounds = carb_ratio;
        self
    }

    /// The backing store.
    #[must_use]
    pub fn store(&self) -> &ProfileStore {
        &self.store
    }

    /// The active configuration handle.
    #[must_use]
    pub fn config(&self) -> &C {
        &self.config
    }

    /// The pump delegate handle.
    #[must_use]
    pub fn delegate(&self) -> &D {
        &self.delegate
    }

    /// References for every stored profile, in creation order.
    pub fn list_profiles(&self) -> Vec<ProfileReference> {
        self.store.list()
    }

    /// Snapshot the active configuration under `name` and persist it,
    /// replacing any previous record with the same name.
    #[instrument(skip(self))]
    pub fn save_profile(&self, name: &str) -> Result<ProfileReference> {
        let profile = Profile::new(
            name.to_string(),
            self.config.correction_range(),
            self.config.carb_ratio_schedule(),
            self.config.basal_rate_schedule(),
            self.config.insulin_sensitivity_schedule(),
        );
        self.store.save(&profile)
    }

    /// Load the full record behind a reference, for preview.
    pub fn get_profile(&self, reference: &ProfileReference) -> Result<Profile> {
        self.store.load(reference)
    }

    /// Remove the record behind a reference.
    pub fn delete_profile(&self, reference: &ProfileReference) -> Result<()> {
        self.store.delete(reference)
    }

    /// Remove every record carrying `name` (at most one under normal
    /// operation; more only after an interrupted replacing save).
    pub fn delete_profile_named(&self, name: &str) -> Result<()> {
        let matching: Vec<ProfileReference> = self
            .store
            .list()
            .into_iter()
            .filter(|reference| reference.name == name)
            .collect();
        if matching.is_empty() {
            return Err(ProfileError::NotFound {
                key: name.to_string(),
            });
        }
        for reference in &matching {
            self.store.delete(reference)?;
        }
        Ok(())
    }

    /// The validation parameters assembled from the collaborators: pump
    /// increments, configured delivery maximum, and this manager's
    /// guardrails.
    #[must_use]
    pub fn device_limits(&self) -> DeviceLimits {
        DeviceLimits {
            supported_basal_rates: self.delegate.supported_basal_rate_increments(),
            max_basal_rate_per_hour: self.config.max_basal_rate_per_hour(),
            correction_range_bounds: self.correction_range_bounds,
            insulin_sensitivity_bounds: self.insulin_sensitivity_bounds,
            carb_ratio_bounds: self.carb_ratio_bounds,
        }
    }

    /// Check a candidate profile against the current device limits.
    pub fn validate_profile(&self, profile: &Profile) -> Result<()> {
        validate(profile, &self.device_limits())
    }

    /// Activate a profile: validate, sync basal to the pump, then commit
    /// all four settings to the active configuration.
    pub async fn load_profile(&mut self, profile: &Profile) -> Result<()> {
        let limits = self.device_limits();
        ProfileActivation::new(profile, limits, &self.delegate, &mut self.config)
            .run()
            .await
    }
}
