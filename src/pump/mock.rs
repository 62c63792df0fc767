//! Mock pump and configuration implementations for testing.
//!
//! Both mocks record every operation in an ordered log and support
//! assertions over it, so tests can prove not only what happened but also
//! what never happened (e.g. no hardware contact on a validation failure).
//!
//! # Example
//!
//! ```rust,ignore
//! use therapy_profiles::pump::mock::{MockPump, PumpOperation};
//!
//! let pump = MockPump::new(vec![0.05, 0.1, 0.5, 1.0]);
//! pump.fail_next_sync("pump timeout");
//! // ... drive the pipeline ...
//! assert_eq!(pump.sync_count(), 1);
//! ```

use std::sync::Mutex;

use tracing::debug;

use super::{ActiveConfiguration, PumpDelegate};
use crate::error::{ProfileError, Result};
use crate::schedule::{
    CorrectionSchedule, DailySchedule, GlucoseRange, ScheduleItem, SensitivitySchedule,
};

/// Recorded pump operation for assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PumpOperation {
    ReadIncrements,
    SyncBasalSchedule { item_count: usize },
}

/// Mock pump for testing without real hardware.
pub struct MockPump {
    increments: Option<Vec<f64>>,
    snap_step: Option<f64>,
    fail_sync: Mutex<Option<String>>,
    operations: Mutex<Vec<PumpOperation>>,
}

impl MockPump {
    /// Create a connected mock supporting the given rate increments.
    #[must_use]
    pub fn new(increments: Vec<f64>) -> Self {
        debug!(count = increments.len(), "Creating mock pump");
        Self {
            increments: Some(increments),
            snap_step: None,
            fail_sync: Mutex::new(None),
            operations: Mutex::new(Vec::new()),
        }
    }

    /// Create a mock with no connected device (capabilities unavailable).
    #[must_use]
    pub fn disconnected() -> Self {
        Self {
            increments: None,
            snap_step: None,
            fail_sync: Mutex::new(None),
            operations: Mutex::new(Vec::new()),
        }
    }

    /// Snap confirmed schedules to multiples of `step` (e.g. 0.05 U/h),
    /// simulating a pump that quantizes requested rates.
    #[must_use]
    pub fn with_snap_step(mut self, step: f64) -> Self {
        self.snap_step = Some(step);
        self
    }

    /// Make the next sync fail with the given reason.
    pub fn fail_next_sync(&self, reason: &str) {
        *self.fail_sync.lock().unwrap() = Some(reason.to_string());
    }

    /// All operations performed on this mock, in order.
    #[must_use]
    pub fn operations(&self) -> Vec<PumpOperation> {
        self.operations.lock().unwrap().clone()
    }

    /// Number of sync attempts made against this mock.
    #[must_use]
    pub fn sync_count(&self) -> usize {
        self.operations()
            .iter()
            .filter(|op| matches!(op, PumpOperation::SyncBasalSchedule { .. }))
            .count()
    }

    /// Assert the exact operation sequence.
    ///
    /// # Panics
    ///
    /// Panics with a diff-style message if the log differs.
    pub fn assert_operations(&self, expected: &[PumpOperation]) {
        let actual = self.operations();
        assert_eq!(
            actual, expected,
            "pump operation log mismatch:\n  actual:   {actual:?}\n  expected: {expected:?}"
        );
    }
}

impl PumpDelegate for MockPump {
    fn supported_basal_rate_increments(&self) -> Option<Vec<f64>> {
        self.operations
            .lock()
            .unwrap()
            .push(PumpOperation::ReadIncrements);
        self.increments.clone()
    }

    async fn sync_basal_schedule(
        &self,
        schedule: &DailySchedule<f64>,
    ) -> Result<DailySchedule<f64>> {
        self.operations
            .lock()
            .unwrap()
            .push(PumpOperation::SyncBasalSchedule {
                item_count: schedule.len(),
            });

        if let Some(reason) = self.fail_sync.lock().unwrap().take() {
            debug!(reason = %reason, "Mock pump failing sync");
            return Err(ProfileError::Sync(reason));
        }

        let confirmed = self.snap_step.map_or_else(
            || schedule.clone(),
            |step| {
                DailySchedule::new(
                    schedule
                        .items()
                        .iter()
                        .map(|item| {
                            ScheduleItem::new(
                                item.start_time_offset_seconds,
                                (item.value / step).round() * step,
                            )
                        })
                        .collect(),
                )
            },
        );
        Ok(confirmed)
    }
}

/// Recorded configuration mutation for assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOperation {
    ApplyCorrectionRange,
    ApplyCarbRatioSchedule,
    ApplyBasalRateSchedule,
    ApplyInsulinSensitivitySchedule,
}

/// Mock active configuration with an operation log.
///
/// Starts out holding a small valid set of schedules so `save_profile`
/// snapshots something sensible by default.
pub struct MockConfiguration {
    correction_range: CorrectionSchedule,
    carb_ratio_schedule: DailySchedule<f64>,
    basal_rate_schedule: DailySchedule<f64>,
    insulin_sensitivity_schedule: SensitivitySchedule,
    max_basal_rate_per_hour: Option<f64>,
    operations: Vec<ConfigOperation>,
}

impl MockConfiguration {
    /// Create a configuration with valid default schedules and a 2 U/h cap.
    #[must_use]
    pub fn new() -> Self {
        Self {
            correction_range: CorrectionSchedule::mg_dl(vec![ScheduleItem::new(
                0,
                GlucoseRange::new(100.0, 110.0),
            )]),
            carb_ratio_schedule: DailySchedule::new(vec![ScheduleItem::new(0, 10.0)]),
            basal_rate_schedule: DailySchedule::new(vec![ScheduleItem::new(0, 0.5)]),
            insulin_sensitivity_schedule: SensitivitySchedule::mg_dl(vec![ScheduleItem::new(
                0, 45.0,
            )]),
            max_basal_rate_per_hour: Some(2.0),
            operations: Vec::new(),
        }
    }

    /// Override the configured maximum basal rate.
    #[must_use]
    pub fn with_max_basal_rate(mut self, max: Option<f64>) -> Self {
        self.max_basal_rate_per_hour = max;
        self
    }

    /// Override the basal schedule the configuration starts with.
    #[must_use]
    pub fn with_basal_rate_schedule(mut self, schedule: DailySchedule<f64>) -> Self {
        self.basal_rate_schedule = schedule;
        self
    }

    /// All mutations applied to this configuration, in order.
    #[must_use]
    pub fn operations(&self) -> &[ConfigOperation] {
        &self.operations
    }

    /// Assert the exact mutation sequence.
    ///
    /// # Panics
    ///
    /// Panics with a diff-style message if the log differs.
    pub fn assert_operations(&self, expected: &[ConfigOperation]) {
        assert_eq!(
            self.operations, expected,
            "config operation log mismatch:\n  actual:   {:?}\n  expected: {expected:?}",
            self.operations
        );
    }
}

impl Default for MockConfiguration {
    fn default() -> Self {
        Self::new()
    }
}

impl ActiveConfiguration for MockConfiguration {
    fn correction_range(&self) -> CorrectionSchedule {
        self.correction_range.clone()
    }

    fn carb_ratio_schedule(&self) -> DailySchedule<f64> {
        self.carb_ratio_schedule.clone()
    }

    fn basal_rate_schedule(&self) -> DailySchedule<f64> {
        self.basal_rate_schedule.clone()
    }

    fn insulin_sensitivity_schedule(&self) -> SensitivitySchedule {
        self.insulin_sensitivity_schedule.clone()
    }

    fn max_basal_rate_per_hour(&self) -> Option<f64> {
        self.max_basal_rate_per_hour
    }

    fn apply_correction_range(&mut self, schedule: CorrectionSchedule) {
        self.correction_range = schedule;
        self.operations.push(ConfigOperation::ApplyCorrectionRange);
    }

    fn apply_carb_ratio_schedule(&mut self, schedule: DailySchedule<f64>) {
        self.carb_ratio_schedule = schedule;
        self.operations.push(ConfigOperation::ApplyCarbRatioSchedule);
    }

    fn apply_basal_rate_schedule(&mut self, schedule: DailySchedule<f64>) {
        self.basal_rate_schedule = schedule;
        self.operations.push(ConfigOperation::ApplyBasalRateSchedule);
    }

    fn apply_insulin_sensitivity_schedule(&mut self, schedule: SensitivitySchedule) {
        self.insulin_sensitivity_schedule = schedule;
        self.operations
            .push(ConfigOperation::ApplyInsulinSensitivitySchedule);
    }
}
