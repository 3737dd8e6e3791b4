pub mod dataset;

pub use dataset::{Dataset, SnapshotId};

use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;

use crate::region::RegionCode;

/// Canonical input fields of a reservation row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Address,
    Channel,
    PlanName,
    ApplicationDate,
    CheckinDate,
}

impl Field {
    pub const ALL: [Field; 5] = [
        Field::Address,
        Field::Channel,
        Field::PlanName,
        Field::ApplicationDate,
        Field::CheckinDate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Address => "address",
            Field::Channel => "channel",
            Field::PlanName => "plan_name",
            Field::ApplicationDate => "application_date",
            Field::CheckinDate => "checkin_date",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A date cell as it came out of the loader.
///
/// `Unparsable` keeps the raw text so the cell can be reported; it is never
/// treated as a date of any kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum DateField {
    Parsed(NaiveDate),
    Unparsable(String),
    Missing,
}

impl DateField {
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            DateField::Parsed(d) => Some(*d),
            _ => None,
        }
    }

    pub fn is_parsed(&self) -> bool {
        matches!(self, DateField::Parsed(_))
    }
}

impl From<NaiveDate> for DateField {
    fn from(d: NaiveDate) -> Self {
        DateField::Parsed(d)
    }
}

impl From<Option<NaiveDate>> for DateField {
    fn from(d: Option<NaiveDate>) -> Self {
        d.map_or(DateField::Missing, DateField::Parsed)
    }
}

/// One reservation row. Position in the [`Dataset`] is significant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ReservationRecord {
    pub address: Option<String>,
    /// Acquisition / referral source (流入経路).
    pub channel: Option<String>,
    pub plan_name: Option<String>,
    pub application_date: DateField,
    pub checkin_date: DateField,
}

/// A [`ReservationRecord`] with its derived fields attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnrichedRecord {
    #[serde(flatten)]
    pub record: ReservationRecord,
    pub region: Option<RegionCode>,
    /// `None` when either date is missing or unparsable; `Some(0)` is a real value.
    pub lead_time_days: Option<i64>,
}
