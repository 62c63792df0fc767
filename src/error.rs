//! Error types for profile storage, validation, and activation.

use thiserror::Error;

/// Primary error type for profile engine operations.
#[derive(Error, Debug)]
pub enum ProfileError {
    // Storage errors
    #[error("Profile storage unavailable at {path}: {reason}")]
    StorageUnavailable { path: String, reason: String },

    #[error("Profile not found: {key}")]
    NotFound { key: String },

    #[error("Corrupt profile record {key}: {reason}")]
    CorruptRecord { key: String, reason: String },

    // Validation errors
    #[error("Correction range {min}-{max} mg/dL outside allowed bounds {lower}-{upper} mg/dL")]
    CorrectionRange {
        min: f64,
        max: f64,
        lower: f64,
        upper: f64,
    },

    #[error("Insulin sensitivity {value} mg/dL/U outside allowed bounds {lower}-{upper} mg/dL/U")]
    InsulinSensitivity { value: f64, lower: f64, upper: f64 },

    #[error("Carb ratio {value} g/U outside allowed bounds {lower}-{upper} g/U")]
    CarbRatio { value: f64, lower: f64, upper: f64 },

    #[error("Basal rate {value} U/h exceeds maximum {max} U/h or is not a supported pump increment")]
    BasalRate { value: f64, max: f64 },

    #[error("Maximum basal rate is not configured")]
    MaxBasalRateNotSet,

    #[error("Pump capabilities unavailable: no connected or configured device")]
    DeviceCapabilitiesUnavailable,

    // Activation errors
    #[error("Basal schedule sync failed: {0}")]
    Sync(String),

    // General errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(String),

    #[error("{0}")]
    Other(String),
}

impl ProfileError {
    /// Returns true if the error is recoverable by the user.
    pub const fn is_user_recoverable(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. }
                | Self::CorrectionRange { .. }
                | Self::InsulinSensitivity { .. }
                | Self::CarbRatio { .. }
                | Self::BasalRate { .. }
                | Self::MaxBasalRateNotSet
                | Self::DeviceCapabilitiesUnavailable
        )
    }

    /// Returns a suggestion for how to fix the error.
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::NotFound { .. } => Some("Refresh the profile list and try again"),
            Self::CorrectionRange { .. }
            | Self::InsulinSensitivity { .. }
            | Self::CarbRatio { .. } => Some("Edit the schedule to fit the allowed bounds"),
            Self::BasalRate { .. } => Some("Lower the rate or raise the maximum basal rate"),
            Self::MaxBasalRateNotSet => Some("Set a maximum basal rate in delivery limits"),
            Self::DeviceCapabilitiesUnavailable => Some("Pair a pump before loading a profile"),
            _ => None,
        }
    }
}

/// Convenience type alias for Results using ProfileError.
pub type Result<T> = std::result::Result<T, ProfileError>;
