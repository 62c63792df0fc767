//! Profile record and reference data types.

use serde::{Deserialize, Serialize};

use crate::schedule::{CorrectionSchedule, DailySchedule, SensitivitySchedule};

/// A named snapshot of the four therapy schedules.
///
/// Immutable once constructed; a fresh value is built from the active
/// configuration for every save. Field names match the persisted record
/// format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    /// Display name; also the replace-by-name key on save.
    pub name: String,
    /// Glucose correction target ranges over the day.
    pub correction_range: CorrectionSchedule,
    /// Grams of carbohydrate covered per insulin unit over the day.
    pub carb_ratio_schedule: DailySchedule<f64>,
    /// Basal delivery rates (U/h) over the day.
    pub basal_rate_schedule: DailySchedule<f64>,
    /// Glucose drop per insulin unit over the day.
    pub insulin_sensitivity_schedule: SensitivitySchedule,
}

impl Profile {
    /// Create a new profile from the four schedules.
    #[must_use]
    pub fn new(
        name: String,
        correction_range: CorrectionSchedule,
        carb_ratio_schedule: DailySchedule<f64>,
        basal_rate_schedule: DailySchedule<f64>,
        insulin_sensitivity_schedule: SensitivitySchedule,
    ) -> Self {
        Self {
            name,
            correction_range,
            carb_ratio_schedule,
            basal_rate_schedule,
            insulin_sensitivity_schedule,
        }
    }
}

/// A lightweight handle identifying a stored record without its body.
///
/// `storage_key` is the on-disk identifier and the sole handle used for
/// load and delete; `name` is a denormalized copy kept for display. A
/// reference held across an external delete goes stale and fails with
/// `NotFound` on use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileReference {
    /// Display name copied from the record at listing time.
    pub name: String,
    /// Timestamp-derived on-disk identifier.
    pub storage_key: String,
}

impl ProfileReference {
    /// Create a reference from a name and storage key.
    #[must_use]
    pub const fn new(name: String, storage_key: String) -> Self {
        Self { name, storage_key }
    }
}
