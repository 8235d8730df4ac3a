use std::collections::BTreeMap;

use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::Serialize;
use tracing::debug;

use crate::error::LayoutError;
use crate::models::offday::{OffdayRecord, UserId};

const DAYS_PER_WEEK: u64 = 7;

/// Week-aligned span of dates shown for one month.
///
/// Always starts on the configured first weekday and covers whole weeks,
/// so `start <= end` holds for every value of this type. Grids computed at
/// the limits of `NaiveDate` drop the partial week instead of breaking this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl GridRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, LayoutError> {
        if end < start {
            return Err(LayoutError::InvertedRange { start, end });
        }
        if ((end - start).num_days() + 1) % DAYS_PER_WEEK as i64 != 0 {
            return Err(LayoutError::NotWeekAligned { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Consecutive 7-day windows from `start`.
    pub fn weeks(&self) -> Vec<Week> {
        let mut weeks = Vec::new();
        let mut cursor = Some(self.start);
        while let Some(start) = cursor.filter(|start| *start <= self.end) {
            let end = start
                .checked_add_days(Days::new(DAYS_PER_WEEK - 1))
                .unwrap_or(self.end);
            weeks.push(Week {
                index: weeks.len(),
                start,
                end,
            });
            cursor = end.checked_add_days(Days::new(1));
        }
        weeks
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Week {
    pub index: usize,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// A maximal run of consecutive off-days for one user, clipped to the grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bar {
    pub user_id: UserId,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub lane: usize,
}

/// The part of a [`Bar`] inside one grid week, placed on a 7-column row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekBar {
    pub user_id: UserId,
    pub name: String,
    pub lane: usize,
    pub week_index: usize,
    #[serde(rename = "startKey")]
    pub start: NaiveDate,
    #[serde(rename = "endKey")]
    pub end: NaiveDate,
    pub bar_start: NaiveDate,
    pub bar_end: NaiveDate,
    pub column_start: u8,
    pub column_span: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UserOffdays {
    pub name: String,
    pub dates: Vec<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthLayout {
    pub grid: GridRange,
    pub weeks: Vec<Week>,
    pub user_order: Vec<UserId>,
    pub bars: Vec<Bar>,
    pub week_bars: Vec<WeekBar>,
}

pub fn first_day_of_month(month: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(month.year(), month.month(), 1).unwrap_or(month)
}

pub fn last_day_of_month(month: NaiveDate) -> NaiveDate {
    let (year, next) = match month.month() {
        12 => (month.year() + 1, 1),
        m => (month.year(), m + 1),
    };
    NaiveDate::from_ymd_opt(year, next, 1)
        .and_then(|first| first.pred_opt())
        .unwrap_or(NaiveDate::MAX)
}

fn start_of_week(date: NaiveDate, week_start: Weekday) -> Option<NaiveDate> {
    let offset = (7 + date.weekday().num_days_from_monday() - week_start.num_days_from_monday()) % 7;
    date.checked_sub_days(Days::new(u64::from(offset)))
}

// First `week_start` on or after the earliest representable date.
fn earliest_week_start(week_start: Weekday) -> NaiveDate {
    let offset = (7 + week_start.num_days_from_monday()
        - NaiveDate::MIN.weekday().num_days_from_monday())
        % 7;
    NaiveDate::MIN + Days::new(u64::from(offset))
}

// Last day of the final whole week that fits before the latest representable date.
fn latest_week_end(week_start: Weekday) -> NaiveDate {
    start_of_week(NaiveDate::MAX, week_start)
        .and_then(|start| {
            start
                .checked_add_days(Days::new(DAYS_PER_WEEK - 1))
                .or_else(|| start.pred_opt())
        })
        .unwrap_or(NaiveDate::MAX)
}

/// Grid for the month containing `month`: from the first day of the week
/// holding the 1st to the last day of the week holding the month's last day.
///
/// In the first and last months chrono can represent, a partial week that
/// would run past the date limits is left off the grid.
pub fn compute_grid_range(month: NaiveDate, week_start: Weekday) -> GridRange {
    let start = start_of_week(first_day_of_month(month), week_start)
        .unwrap_or_else(|| earliest_week_start(week_start));
    let end = start_of_week(last_day_of_month(month), week_start)
        .and_then(|start| start.checked_add_days(Days::new(DAYS_PER_WEEK - 1)))
        .unwrap_or_else(|| latest_week_end(week_start));
    GridRange { start, end }
}

/// Groups records by user. Dates come back sorted and without duplicates;
/// the map iterates users in ascending id order.
pub fn group_by_user(records: &[OffdayRecord]) -> BTreeMap<UserId, UserOffdays> {
    let mut by_user: BTreeMap<UserId, UserOffdays> = BTreeMap::new();
    for record in records {
        let entry = by_user
            .entry(record.user_id)
            .or_insert_with(|| UserOffdays {
                name: record.name.clone(),
                dates: Vec::new(),
            });
        entry.dates.push(record.date);
    }
    for offdays in by_user.values_mut() {
        offdays.dates.sort_unstable();
        offdays.dates.dedup();
    }
    by_user
}

/// Merges one user's dates into runs of consecutive days and clips them to `grid`.
pub fn compact_to_bars(
    user_id: UserId,
    name: &str,
    dates: &[NaiveDate],
    grid: &GridRange,
    lane: usize,
) -> Vec<Bar> {
    let mut sorted = dates.to_vec();
    sorted.sort_unstable();
    sorted.dedup();

    let mut runs: Vec<(NaiveDate, NaiveDate)> = Vec::new();
    let mut cursor: Option<(NaiveDate, NaiveDate)> = None;
    for date in sorted {
        cursor = match cursor {
            None => Some((date, date)),
            Some((start, end)) if (date - end).num_days() == 1 => Some((start, date)),
            Some(run) => {
                runs.push(run);
                Some((date, date))
            }
        };
    }
    runs.extend(cursor);

    runs.into_iter()
        .filter_map(|(start, end)| {
            let start = start.max(grid.start);
            let end = end.min(grid.end);
            (start <= end).then(|| Bar {
                user_id,
                name: name.to_string(),
                start_date: start,
                end_date: end,
                lane,
            })
        })
        .collect()
}

/// Slices each bar along the grid's week boundaries.
pub fn split_by_week(grid: &GridRange, bars: &[Bar]) -> Vec<WeekBar> {
    let weeks = grid.weeks();
    let mut week_bars = Vec::new();
    for bar in bars {
        for week in &weeks {
            if bar.end_date < week.start || bar.start_date > week.end {
                continue;
            }
            let start = bar.start_date.max(week.start);
            let end = bar.end_date.min(week.end);
            week_bars.push(WeekBar {
                user_id: bar.user_id,
                name: bar.name.clone(),
                lane: bar.lane,
                week_index: week.index,
                start,
                end,
                bar_start: bar.start_date,
                bar_end: bar.end_date,
                column_start: day_offset(week.start, start) + 1,
                column_span: day_offset(start, end) + 1,
            });
        }
    }
    week_bars
}

// Both dates lie in the same week window, so the offset is 0..=6.
fn day_offset(from: NaiveDate, to: NaiveDate) -> u8 {
    (to - from).num_days() as u8
}

/// Full pipeline for one displayed month.
pub fn layout_month(records: &[OffdayRecord], month: NaiveDate, week_start: Weekday) -> MonthLayout {
    let grid = compute_grid_range(month, week_start);
    let by_user = group_by_user(records);

    let mut bars = Vec::new();
    for (lane, (user_id, offdays)) in by_user.iter().enumerate() {
        bars.extend(compact_to_bars(*user_id, &offdays.name, &offdays.dates, &grid, lane));
    }
    let week_bars = split_by_week(&grid, &bars);
    debug!(
        grid_start = %grid.start,
        grid_end = %grid.end,
        users = by_user.len(),
        bars = bars.len(),
        week_bars = week_bars.len(),
        "laid out month"
    );

    MonthLayout {
        weeks: grid.weeks(),
        grid,
        user_order: by_user.keys().copied().collect(),
        bars,
        week_bars,
    }
}
