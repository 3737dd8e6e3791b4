pub mod date_parser;

use serde::{Deserialize, Serialize};

use crate::record::{DateField, ReservationRecord};

/// Signed whole-day difference `a - b`.
///
/// `None` if either side is not a parsed date. The result is never clamped,
/// and `delta_days(a, b) == -delta_days(b, a)`.
pub fn delta_days(a: &DateField, b: &DateField) -> Option<i64> {
    let (a, b) = (a.as_date()?, b.as_date()?);
    Some(a.signed_duration_since(b).num_days())
}

/// Which date is subtracted from which when computing a record's lead time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadTimeOrder {
    /// application date − check-in date; usually negative.
    #[default]
    ApplicationMinusCheckin,
    /// check-in date − application date; days booked in advance.
    CheckinMinusApplication,
}

impl LeadTimeOrder {
    pub fn lead_time(&self, record: &ReservationRecord) -> Option<i64> {
        match self {
            LeadTimeOrder::ApplicationMinusCheckin => {
                delta_days(&record.application_date, &record.checkin_date)
            }
            LeadTimeOrder::CheckinMinusApplication => {
                delta_days(&record.checkin_date, &record.application_date)
            }
        }
    }
}
