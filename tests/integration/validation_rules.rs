//! Integration tests for safety-bound validation.
//!
//! Exercises the boundary conditions and the fixed check ordering through
//! the public validate() entry point and the manager facade.

use therapy_profiles::error::ProfileError;
use therapy_profiles::schedule::{
    CorrectionSchedule, DailySchedule, GlucoseRange, GlucoseUnit, ScheduleItem,
    SensitivitySchedule,
};
use therapy_profiles::validation::{DeviceLimits, Guardrail, validate};

use crate::common::fixtures::{
    profile_with_schedules, test_increments, test_limits, valid_profile,
};

// ===== Boundary behavior =====

#[test]
fn test_correction_range_at_exact_lower_bound_passes() {
    let profile = profile_with_schedules(
        "Boundary",
        GlucoseRange::new(87.0, 110.0),
        45.0,
        10.0,
        0.5,
    );
    assert!(validate(&profile, &test_limits()).is_ok());
}

#[test]
fn test_correction_range_one_unit_below_bound_fails() {
    let profile = profile_with_schedules(
        "Boundary",
        GlucoseRange::new(86.0, 110.0),
        45.0,
        10.0,
        0.5,
    );
    assert!(matches!(
        validate(&profile, &test_limits()),
        Err(ProfileError::CorrectionRange { .. })
    ));
}

#[test]
fn test_correction_range_upper_edge() {
    let at_upper = profile_with_schedules(
        "Upper",
        GlucoseRange::new(100.0, 180.0),
        45.0,
        10.0,
        0.5,
    );
    assert!(validate(&at_upper, &test_limits()).is_ok());

    let above = profile_with_schedules(
        "Upper",
        GlucoseRange::new(100.0, 181.0),
        45.0,
        10.0,
        0.5,
    );
    assert!(matches!(
        validate(&above, &test_limits()),
        Err(ProfileError::CorrectionRange { .. })
    ));
}

#[test]
fn test_every_schedule_item_is_checked() {
    // Only the second segment is out of bounds.
    let profile = therapy_profiles::profile::Profile::new(
        "Second Segment".to_string(),
        CorrectionSchedule::mg_dl(vec![
            ScheduleItem::new(0, GlucoseRange::new(100.0, 110.0)),
            ScheduleItem::new(43_200, GlucoseRange::new(60.0, 110.0)),
        ]),
        DailySchedule::new(vec![ScheduleItem::new(0, 10.0)]),
        DailySchedule::new(vec![ScheduleItem::new(0, 0.5)]),
        SensitivitySchedule::mg_dl(vec![ScheduleItem::new(0, 45.0)]),
    );
    assert!(matches!(
        validate(&profile, &test_limits()),
        Err(ProfileError::CorrectionRange { .. })
    ));
}

// ===== Check ordering =====

#[test]
fn test_correction_range_error_wins_over_basal_error() {
    let doubly_invalid = profile_with_schedules(
        "Doubly Invalid",
        GlucoseRange::new(50.0, 110.0),
        45.0,
        10.0,
        99.0,
    );
    assert!(matches!(
        validate(&doubly_invalid, &test_limits()),
        Err(ProfileError::CorrectionRange { .. })
    ));
}

#[test]
fn test_sensitivity_error_wins_over_carb_ratio_error() {
    let profile = profile_with_schedules(
        "Ordered",
        GlucoseRange::new(100.0, 110.0),
        5.0,
        1.0,
        0.5,
    );
    assert!(matches!(
        validate(&profile, &test_limits()),
        Err(ProfileError::InsulinSensitivity { .. })
    ));
}

#[test]
fn test_missing_device_wins_over_everything() {
    let profile = profile_with_schedules(
        "No Device",
        GlucoseRange::new(50.0, 300.0),
        1.0,
        0.5,
        99.0,
    );
    let limits = DeviceLimits::new(None, None);
    assert!(matches!(
        validate(&profile, &limits),
        Err(ProfileError::DeviceCapabilitiesUnavailable)
    ));
}

// ===== Basal-specific rules =====

#[test]
fn test_missing_max_basal_rate_fails_even_with_acceptable_values() {
    let limits = DeviceLimits::new(Some(test_increments()), None);
    assert!(matches!(
        validate(&valid_profile("Capless"), &limits),
        Err(ProfileError::MaxBasalRateNotSet)
    ));
}

#[test]
fn test_basal_increment_mismatch_below_cap() {
    // 0.825 U/h is under the 2 U/h cap but not in {0.2, 0.5, 0.75, 1.0}.
    let profile = profile_with_schedules(
        "Off Grid",
        GlucoseRange::new(100.0, 110.0),
        45.0,
        10.0,
        0.825,
    );
    assert!(matches!(
        validate(&profile, &test_limits()),
        Err(ProfileError::BasalRate { .. })
    ));
}

#[test]
fn test_basal_rate_at_cap_passes() {
    let limits = DeviceLimits::new(Some(test_increments()), Some(1.0));
    let profile = profile_with_schedules(
        "At Cap",
        GlucoseRange::new(100.0, 110.0),
        45.0,
        10.0,
        1.0,
    );
    assert!(validate(&profile, &limits).is_ok());
}

// ===== Units =====

#[test]
fn test_mmol_record_validates_against_mg_dl_guardrails() {
    // 5.55 mmol/L ≈ 100 mg/dL, comfortably inside the guardrail.
    let profile = therapy_profiles::profile::Profile::new(
        "Metric".to_string(),
        CorrectionSchedule {
            unit: GlucoseUnit::MillimolesPerLiter,
            items: DailySchedule::new(vec![ScheduleItem::new(0, GlucoseRange::new(5.55, 6.1))]),
        },
        DailySchedule::new(vec![ScheduleItem::new(0, 10.0)]),
        DailySchedule::new(vec![ScheduleItem::new(0, 0.5)]),
        SensitivitySchedule {
            unit: GlucoseUnit::MillimolesPerLiter,
            items: DailySchedule::new(vec![ScheduleItem::new(0, 2.5)]),
        },
    );
    assert!(validate(&profile, &test_limits()).is_ok());
}

// ===== Custom guardrails =====

#[test]
fn test_overridden_guardrails_apply() {
    let mut limits = test_limits();
    limits.carb_ratio_bounds = Guardrail::new(5.0, 20.0);

    let profile = profile_with_schedules(
        "Tight",
        GlucoseRange::new(100.0, 110.0),
        45.0,
        4.0,
        0.5,
    );
    assert!(matches!(
        validate(&profile, &limits),
        Err(ProfileError::CarbRatio { .. })
    ));
}
