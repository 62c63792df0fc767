//! Time-indexed therapy schedule value types.
//!
//! A daily schedule is an ordered sequence of (time-of-day offset, value)
//! pairs covering one 24-hour cycle. Ordering is established at construction;
//! offset uniqueness is the producing layer's responsibility.

use serde::{Deserialize, Serialize};

/// Seconds in one 24-hour schedule cycle.
pub const SECONDS_PER_DAY: u32 = 86_400;

/// Conversion factor from mmol/L to mg/dL for glucose concentrations.
const MMOL_L_TO_MG_DL: f64 = 18.018;

/// Glucose concentration unit tag carried by persisted glucose schedules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GlucoseUnit {
    #[serde(rename = "mg/dL")]
    MilligramsPerDeciliter,
    #[serde(rename = "mmol/L")]
    MillimolesPerLiter,
}

impl GlucoseUnit {
    /// Convert a value expressed in this unit to mg/dL.
    #[must_use]
    pub fn to_mg_dl(self, value: f64) -> f64 {
        match self {
            Self::MilligramsPerDeciliter => value,
            Self::MillimolesPerLiter => value * MMOL_L_TO_MG_DL,
        }
    }
}

/// An inclusive glucose target range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GlucoseRange {
    /// Lower edge of the range.
    pub min: f64,
    /// Upper edge of the range.
    pub max: f64,
}

impl GlucoseRange {
    /// Create a new range.
    #[must_use]
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Return the range converted from `unit` to mg/dL.
    #[must_use]
    pub fn in_mg_dl(self, unit: GlucoseUnit) -> Self {
        Self {
            min: unit.to_mg_dl(self.min),
            max: unit.to_mg_dl(self.max),
        }
    }
}

/// One entry of a daily schedule: a value taking effect at a time-of-day offset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleItem<V> {
    /// Seconds from midnight at which this value takes effect.
    pub start_time_offset_seconds: u32,
    /// The scheduled value.
    pub value: V,
}

impl<V> ScheduleItem<V> {
    /// Create a new schedule item.
    #[must_use]
    pub const fn new(start_time_offset_seconds: u32, value: V) -> Self {
        Self {
            start_time_offset_seconds,
            value,
        }
    }
}

/// An ordered sequence of schedule items covering one 24-hour cycle.
///
/// Construction sorts items by ascending offset, so the ordering invariant
/// holds for every value of this type, including values deserialized from
/// storage. Duplicate offsets are not rejected. On the wire a schedule is
/// the plain item array.
#[derive(Debug, Clone, PartialEq)]
pub struct DailySchedule<V> {
    items: Vec<ScheduleItem<V>>,
}

impl<V: Serialize> Serialize for DailySchedule<V> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.items.serialize(serializer)
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for DailySchedule<V> {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Self::new(Vec::deserialize(deserializer)?))
    }
}

impl<V> DailySchedule<V> {
    /// Create a schedule from items, sorting them by offset.
    #[must_use]
    pub fn new(mut items: Vec<ScheduleItem<V>>) -> Self {
        items.sort_by_key(|item| item.start_time_offset_seconds);
        Self { items }
    }

    /// The ordered items.
    #[must_use]
    pub fn items(&self) -> &[ScheduleItem<V>] {
        &self.items
    }

    /// Number of items in the schedule.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the schedule has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate over the scheduled values in time order.
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.items.iter().map(|item| &item.value)
    }
}

impl<V> From<Vec<ScheduleItem<V>>> for DailySchedule<V> {
    fn from(items: Vec<ScheduleItem<V>>) -> Self {
        Self::new(items)
    }
}

impl DailySchedule<f64> {
    /// Total delivered over one 24-hour cycle at these rates (units/day).
    ///
    /// Each segment runs from its offset to the next item's offset; the last
    /// segment wraps to the end of the day.
    #[must_use]
    pub fn total_per_day(&self) -> f64 {
        let mut total = 0.0;
        for (i, item) in self.items.iter().enumerate() {
            let end = self
                .items
                .get(i + 1)
                .map_or(SECONDS_PER_DAY, |next| next.start_time_offset_seconds);
            let hours = f64::from(end.saturating_sub(item.start_time_offset_seconds)) / 3600.0;
            total += item.value * hours;
        }
        total
    }
}

/// A glucose correction-range schedule with its persisted unit tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrectionSchedule {
    /// Unit the range values are expressed in.
    pub unit: GlucoseUnit,
    /// The range items.
    pub items: DailySchedule<GlucoseRange>,
}

impl CorrectionSchedule {
    /// Create a schedule with values already in mg/dL.
    #[must_use]
    pub fn mg_dl(items: Vec<ScheduleItem<GlucoseRange>>) -> Self {
        Self {
            unit: GlucoseUnit::MilligramsPerDeciliter,
            items: DailySchedule::new(items),
        }
    }

    /// The range items converted to mg/dL.
    #[must_use]
    pub fn ranges_in_mg_dl(&self) -> Vec<ScheduleItem<GlucoseRange>> {
        self.items
            .items()
            .iter()
            .map(|item| ScheduleItem::new(item.start_time_offset_seconds, item.value.in_mg_dl(self.unit)))
            .collect()
    }
}

/// An insulin-sensitivity schedule (glucose drop per insulin unit) with its
/// persisted unit tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivitySchedule {
    /// Unit the sensitivity values are expressed in (per insulin unit).
    pub unit: GlucoseUnit,
    /// The sensitivity items.
    pub items: DailySchedule<f64>,
}

impl SensitivitySchedule {
    /// Create a schedule with values already in mg/dL per unit.
    #[must_use]
    pub fn mg_dl(items: Vec<ScheduleItem<f64>>) -> Self {
        Self {
            unit: GlucoseUnit::MilligramsPerDeciliter,
            items: DailySchedule::new(items),
        }
    }

    /// The sensitivity items converted to mg/dL per unit.
    #[must_use]
    pub fn values_in_mg_dl(&self) -> Vec<ScheduleItem<f64>> {
        self.items
            .items()
            .iter()
            .map(|item| ScheduleItem::new(item.start_time_offset_seconds, self.unit.to_mg_dl(item.value)))
            .collect()
    }
}
