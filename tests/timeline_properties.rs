use std::collections::BTreeSet;

use chrono::{Days, NaiveDate, Weekday};
use offdayCalendar::models::offday::{OffdayRecord, UserId};
use offdayCalendar::service::timeline::{
    compact_to_bars, compute_grid_range, layout_month, split_by_week, GridRange,
};
use proptest::prelude::*;

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn days_of(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    start.iter_days().take_while(|d| *d <= end).collect()
}

fn weekday() -> impl Strategy<Value = Weekday> {
    (0u8..7).prop_map(|n| Weekday::try_from(n).unwrap())
}

// Offsets spread from ten days before the 1st to well past the month end,
// so some runs fall partly or wholly outside the grid.
fn dates_around(month: NaiveDate, offsets: &[u64]) -> Vec<NaiveDate> {
    let base = month - Days::new(10);
    offsets.iter().map(|offset| base + Days::new(*offset)).collect()
}

proptest! {
    #[test]
    fn bars_are_maximal_runs_of_visible_dates(
        year in 1990i32..2100,
        month in 1u32..=12,
        week_start in weekday(),
        offsets in prop::collection::vec(0u64..60, 0..25),
    ) {
        let month = ymd(year, month, 1);
        let grid = compute_grid_range(month, week_start);
        let dates = dates_around(month, &offsets);
        let bars = compact_to_bars(UserId(1), "Ko", &dates, &grid, 0);

        // Covered days are exactly the visible input dates.
        let covered: BTreeSet<NaiveDate> = bars
            .iter()
            .flat_map(|bar| days_of(bar.start_date, bar.end_date))
            .collect();
        let visible: BTreeSet<NaiveDate> = dates.iter().copied().filter(|d| grid.contains(*d)).collect();
        prop_assert_eq!(covered, visible);

        // Bars are ordered, disjoint and never touch.
        for bar in &bars {
            prop_assert!(bar.start_date <= bar.end_date);
        }
        for pair in bars.windows(2) {
            prop_assert!((pair[1].start_date - pair[0].end_date).num_days() >= 2);
        }
    }

    #[test]
    fn week_slices_partition_each_bar(
        year in 1990i32..2100,
        month in 1u32..=12,
        week_start in weekday(),
        offsets in prop::collection::vec(0u64..60, 0..25),
    ) {
        let month = ymd(year, month, 1);
        let grid = compute_grid_range(month, week_start);
        let weeks = grid.weeks();
        let dates = dates_around(month, &offsets);
        let bars = compact_to_bars(UserId(1), "Ko", &dates, &grid, 0);
        let week_bars = split_by_week(&grid, &bars);

        for bar in &bars {
            let mut cursor = bar.start_date;
            for slice in week_bars
                .iter()
                .filter(|w| w.bar_start == bar.start_date && w.bar_end == bar.end_date)
            {
                prop_assert_eq!(slice.start, cursor);
                let week = &weeks[slice.week_index];
                prop_assert!(week.start <= slice.start && slice.end <= week.end);
                cursor = slice.end + Days::new(1);
            }
            prop_assert_eq!(cursor, bar.end_date + Days::new(1));
        }

        for slice in &week_bars {
            prop_assert!(slice.column_start >= 1);
            prop_assert!(slice.column_span >= 1);
            prop_assert!(slice.column_start + slice.column_span - 1 <= 7);
            let week = &weeks[slice.week_index];
            prop_assert_eq!(
                slice.start,
                week.start + Days::new(u64::from(slice.column_start - 1))
            );
        }
    }
}

#[test]
fn run_entirely_before_grid_yields_nothing() {
    let grid = compute_grid_range(ymd(2024, 1, 10), Weekday::Sun);
    let bars = compact_to_bars(
        UserId(4),
        "Woo",
        &[ymd(2023, 12, 1), ymd(2023, 12, 2), ymd(2023, 12, 3)],
        &grid,
        0,
    );
    assert!(bars.is_empty());
    assert!(split_by_week(&grid, &bars).is_empty());
}

#[test]
fn explicit_grid_range_can_be_built_from_raw_dates() {
    let grid = GridRange::new(ymd(2023, 12, 31), ymd(2024, 1, 13)).unwrap();
    assert_eq!(grid.weeks().len(), 2);
    let bars = compact_to_bars(UserId(1), "Ko", &[ymd(2024, 1, 13), ymd(2024, 1, 14)], &grid, 0);
    assert_eq!(bars.len(), 1);
    assert_eq!(bars[0].end_date, ymd(2024, 1, 13));
}

#[test]
fn month_layout_is_independent_of_record_order() {
    let mut records = vec![
        OffdayRecord::new(ymd(2024, 1, 9), UserId(3), "Yoon"),
        OffdayRecord::new(ymd(2024, 1, 6), UserId(1), "Ko"),
        OffdayRecord::new(ymd(2024, 1, 8), UserId(1), "Ko"),
        OffdayRecord::new(ymd(2024, 1, 7), UserId(1), "Ko"),
        OffdayRecord::new(ymd(2024, 1, 10), UserId(3), "Yoon"),
    ];
    let forward = layout_month(&records, ymd(2024, 1, 1), Weekday::Sun);
    records.reverse();
    let backward = layout_month(&records, ymd(2024, 1, 1), Weekday::Sun);
    assert_eq!(forward, backward);
    assert_eq!(forward.bars.len(), 2);
    assert_eq!(forward.week_bars.len(), 3);
}
