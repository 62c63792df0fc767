//! Safety-bound validation of profiles against device limits.
//!
//! A pure check with no side effects and no storage access: the device
//! increments and the configured maximum basal rate are injected, never
//! queried, so the whole engine is deterministic under test.

use tracing::trace;

use crate::error::{ProfileError, Result};
use crate::profile::Profile;

/// Tolerance for matching a basal rate against a device increment, so a
/// rate that arrives through serialization still matches its increment.
const INCREMENT_TOLERANCE: f64 = 1e-9;

/// An absolute safety bound a value must satisfy regardless of device
/// capability. Both edges are inclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Guardrail {
    /// Inclusive lower bound.
    pub min: f64,
    /// Inclusive upper bound.
    pub max: f64,
}

impl Guardrail {
    /// Create a guardrail.
    #[must_use]
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Whether a value lies within the bound.
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Default clinical guardrail for correction range edges (mg/dL).
pub const CORRECTION_RANGE_BOUNDS: Guardrail = Guardrail::new(87.0, 180.0);

/// Default clinical guardrail for insulin sensitivity (mg/dL per U).
pub const INSULIN_SENSITIVITY_BOUNDS: Guardrail = Guardrail::new(10.0, 500.0);

/// Default clinical guardrail for carb ratio (g per U).
pub const CARB_RATIO_BOUNDS: Guardrail = Guardrail::new(2.0, 150.0);

/// Externally supplied facts a candidate profile is validated against.
///
/// `supported_basal_rates` is `None` when no device is connected or
/// configured; `max_basal_rate_per_hour` is `None` when the delivery limit
/// has never been set. Both absences are distinct, surfaced failures.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceLimits {
    /// Discrete basal rates the pump can actually be programmed to.
    pub supported_basal_rates: Option<Vec<f64>>,
    /// Configured delivery maximum (U/h).
    pub max_basal_rate_per_hour: Option<f64>,
    /// Absolute bounds for correction range edges (mg/dL).
    pub correction_range_bounds: Guardrail,
    /// Absolute bounds for insulin sensitivity (mg/dL per U).
    pub insulin_sensitivity_bounds: Guardrail,
    /// Absolute bounds for carb ratio (g per U).
    pub carb_ratio_bounds: Guardrail,
}

impl DeviceLimits {
    /// Limits with the default clinical guardrails.
    #[must_use]
    pub fn new(
        supported_basal_rates: Option<Vec<f64>>,
        max_basal_rate_per_hour: Option<f64>,
    ) -> Self {
        Self {
            supported_basal_rates,
            max_basal_rate_per_hour,
            correction_range_bounds: CORRECTION_RANGE_BOUNDS,
            insulin_sensitivity_bounds: INSULIN_SENSITIVITY_BOUNDS,
            carb_ratio_bounds: CARB_RATIO_BOUNDS,
        }
    }
}

/// Validate a candidate profile against device limits and guardrails.
///
/// Checks short-circuit at the first failure, in a fixed order so the
/// surfaced error is deterministic: device capability presence, correction
/// range, insulin sensitivity, carb ratio, maximum-basal presence, then
/// per-item basal rate (cap and increment membership). Glucose values are
/// compared in mg/dL regardless of the record's unit tag.
pub fn validate(profile: &Profile, limits: &DeviceLimits) -> Result<()> {
    let Some(supported_rates) = &limits.supported_basal_rates else {
        return Err(ProfileError::DeviceCapabilitiesUnavailable);
    };

    let bounds = &limits.correction_range_bounds;
    for item in profile.correction_range.ranges_in_mg_dl() {
        let range = item.value;
        if !bounds.contains(range.min) || !bounds.contains(range.max) {
            return Err(ProfileError::CorrectionRange {
                min: range.min,
                max: range.max,
                lower: bounds.min,
                upper: bounds.max,
            });
        }
    }

    let bounds = &limits.insulin_sensitivity_bounds;
    for item in profile.insulin_sensitivity_schedule.values_in_mg_dl() {
        if !bounds.contains(item.value) {
            return Err(ProfileError::InsulinSensitivity {
                value: item.value,
                lower: bounds.min,
                upper: bounds.max,
            });
        }
    }

    let bounds = &limits.carb_ratio_bounds;
    for &value in profile.carb_ratio_schedule.values() {
        if !bounds.contains(value) {
            return Err(ProfileError::CarbRatio {
                value,
                lower: bounds.min,
                upper: bounds.max,
            });
        }
    }

    let Some(max_rate) = limits.max_basal_rate_per_hour else {
        return Err(ProfileError::MaxBasalRateNotSet);
    };

    for &rate in profile.basal_rate_schedule.values() {
        let is_supported = supported_rates
            .iter()
            .any(|supported| (supported - rate).abs() <= INCREMENT_TOLERANCE);
        if rate > max_rate || !is_supported {
            return Err(ProfileError::BasalRate {
                value: rate,
                max: max_rate,
            });
        }
    }

    trace!(name = %profile.name, "Profile passed validation");
    Ok(())
}
