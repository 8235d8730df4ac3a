use std::collections::BTreeMap;

use chrono::{Days, NaiveDate};
use serde::Serialize;

use crate::models::offday::{OffdayRecord, UserId};
use crate::models::viewer::Viewer;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySummary {
    pub today_key: NaiveDate,
    pub tomorrow_key: NaiveDate,
    pub is_my_offday: bool,
    pub today_names: Vec<String>,
    pub tomorrow_names: Vec<String>,
}

/// Who is off on `today` and the day after.
pub fn summarize(records: &[OffdayRecord], today: NaiveDate, viewer: Option<&Viewer>) -> DaySummary {
    let tomorrow = today.checked_add_days(Days::new(1)).unwrap_or(NaiveDate::MAX);
    let is_my_offday = viewer.is_some_and(|viewer| {
        records
            .iter()
            .any(|record| record.date == today && viewer.owns(record))
    });
    DaySummary {
        today_key: today,
        tomorrow_key: tomorrow,
        is_my_offday,
        today_names: names_on(records, today),
        tomorrow_names: names_on(records, tomorrow),
    }
}

// One name per user, in user id order.
fn names_on(records: &[OffdayRecord], date: NaiveDate) -> Vec<String> {
    let users: BTreeMap<UserId, &str> = records
        .iter()
        .filter(|record| record.date == date)
        .map(|record| (record.user_id, record.name.as_str()))
        .collect();
    users.into_values().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn records() -> Vec<OffdayRecord> {
        vec![
            OffdayRecord::new(ymd(2024, 5, 1), UserId(3), "Woo"),
            OffdayRecord::new(ymd(2024, 5, 1), UserId(1), "Ko"),
            OffdayRecord::new(ymd(2024, 5, 2), UserId(1), "Ko"),
            OffdayRecord::new(ymd(2024, 5, 2), UserId(1), "Ko"),
        ]
    }

    #[test]
    fn lists_today_and_tomorrow_in_user_order() {
        let records = records();
        let viewer = Viewer::resolve("Woo", &records);
        let summary = summarize(&records, ymd(2024, 5, 1), Some(&viewer));
        assert_eq!(summary.tomorrow_key, ymd(2024, 5, 2));
        assert!(summary.is_my_offday);
        assert_eq!(summary.today_names, vec!["Ko".to_string(), "Woo".to_string()]);
        assert_eq!(summary.tomorrow_names, vec!["Ko".to_string()]);
    }

    #[test]
    fn guests_are_never_off() {
        let summary = summarize(&records(), ymd(2024, 5, 1), None);
        assert!(!summary.is_my_offday);

        let summary = summarize(&records(), ymd(2024, 5, 3), None);
        assert!(summary.today_names.is_empty());
        assert!(summary.tomorrow_names.is_empty());
    }
}
