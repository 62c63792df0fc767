//! Hardware and configuration abstraction for the profile engine.
//!
//! This module provides trait seams over the physical pump and the live
//! therapy configuration, enabling testability without hardware. The host
//! application implements both; the engine only consumes them.

pub mod mock;

use crate::error::Result;
use crate::schedule::{CorrectionSchedule, DailySchedule, SensitivitySchedule};

/// Pump-facing operations the engine consumes.
///
/// # Implementation Notes
///
/// - `sync_basal_schedule` may take arbitrary wall-clock time; its latency
///   is bounded only by the device and transport
/// - The returned schedule is the device's confirmation and is authoritative:
///   the pump may snap requested rates to its own increments
pub trait PumpDelegate {
    /// The discrete basal rates the connected pump supports.
    ///
    /// Returns `None` when no device is connected or configured.
    fn supported_basal_rate_increments(&self) -> Option<Vec<f64>>;

    /// Program the candidate basal schedule onto the pump.
    ///
    /// # Errors
    ///
    /// Returns a sync error if the device rejects the schedule or the
    /// transport fails. The engine surfaces it verbatim without retrying.
    async fn sync_basal_schedule(&self, schedule: &DailySchedule<f64>)
    -> Result<DailySchedule<f64>>;
}

/// The live therapy configuration the engine snapshots and commits to.
///
/// Getters feed `save_profile` (a profile is a snapshot of these values);
/// appliers are the commit sink of the activation pipeline. Appliers are
/// infallible by contract: by the time the pipeline commits, every value
/// has passed validation and the basal schedule is the pump's own answer.
pub trait ActiveConfiguration {
    /// Current correction-range schedule.
    fn correction_range(&self) -> CorrectionSchedule;

    /// Current carb-ratio schedule.
    fn carb_ratio_schedule(&self) -> DailySchedule<f64>;

    /// Current basal-rate schedule.
    fn basal_rate_schedule(&self) -> DailySchedule<f64>;

    /// Current insulin-sensitivity schedule.
    fn insulin_sensitivity_schedule(&self) -> SensitivitySchedule;

    /// Configured maximum basal rate (U/h), if one has been set.
    fn max_basal_rate_per_hour(&self) -> Option<f64>;

    /// Replace the correction-range schedule.
    fn apply_correction_range(&mut self, schedule: CorrectionSchedule);

    /// Replace the carb-ratio schedule.
    fn apply_carb_ratio_schedule(&mut self, schedule: DailySchedule<f64>);

    /// Replace the basal-rate schedule.
    fn apply_basal_rate_schedule(&mut self, schedule: DailySchedule<f64>);

    /// Replace the insulin-sensitivity schedule.
    fn apply_insulin_sensitivity_schedule(&mut self, schedule: SensitivitySchedule);
}
