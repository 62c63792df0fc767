//! Profile persistence and validation engine for pump therapy schedules.
//!
//! Stores named snapshots of four time-indexed therapy schedules (correction
//! range, carb ratio, basal rate, insulin sensitivity) as individual JSON
//! records on disk, validates candidates against device and clinical safety
//! bounds, and activates a stored profile by synchronizing its basal schedule
//! with the pump before committing all four settings.
//!
//! # Modules
//!
//! - `schedule`: Time-indexed schedule value types and glucose units
//! - `profile`: Profile record, lightweight reference, and file-backed store
//! - `validation`: Pure safety-bound validation against device limits
//! - `pump`: Hardware and active-configuration traits (with mocks)
//! - `apply`: Load/sync/commit activation pipeline
//! - `manager`: Collaborator-facing facade tying the pieces together
//! - `error`: Error types with user-recoverable hints
#![forbid(unsafe_code)]

pub mod apply;
pub mod error;
pub mod logging;
pub mod manager;
pub mod profile;
pub mod pump;
pub mod schedule;
pub mod validation;
