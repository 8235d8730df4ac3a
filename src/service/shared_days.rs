use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use crate::error::LayoutError;
use crate::models::offday::{OffdayRecord, UserId};
use crate::models::viewer::Viewer;
use crate::service::timeline::{first_day_of_month, last_day_of_month};

pub const DEFAULT_SHARED_THRESHOLD: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedDay {
    pub date: NaiveDate,
    pub names: Vec<String>,
}

/// Days of the calendar month on which at least `threshold` users other
/// than the viewer are off.
pub fn shared_days(
    records: &[OffdayRecord],
    month: NaiveDate,
    threshold: usize,
    viewer: Option<&Viewer>,
) -> Result<Vec<SharedDay>, LayoutError> {
    if threshold == 0 {
        return Err(LayoutError::ZeroThreshold);
    }
    let first = first_day_of_month(month);
    let last = last_day_of_month(month);

    let mut by_date: BTreeMap<NaiveDate, BTreeMap<UserId, &str>> = BTreeMap::new();
    for record in records {
        if record.date < first || record.date > last {
            continue;
        }
        if viewer.is_some_and(|viewer| viewer.owns(record)) {
            continue;
        }
        by_date
            .entry(record.date)
            .or_default()
            .insert(record.user_id, record.name.as_str());
    }

    let days: Vec<SharedDay> = by_date
        .into_iter()
        .filter(|(_, users)| users.len() >= threshold)
        .map(|(date, users)| SharedDay {
            date,
            names: users.into_values().map(str::to_string).collect(),
        })
        .collect();
    debug!(%first, threshold, shared = days.len(), "computed shared days");
    Ok(days)
}
