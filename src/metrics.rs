//! Reports over the calculation history.
//!
//! Every function here takes the history newest first, as kept by
//! [`HistoryStore`](crate::HistoryStore), and returns its series oldest first,
//! ready to be plotted left to right.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    domain::{CalculationResult, HourlyRate, TimeBreakdown},
    storage::HistoryEntry,
};

/// Default number of entries in a comparison series.
pub const COMPARISON_WINDOW: usize = 5;

/// Default number of entries in a trend series.
pub const TREND_WINDOW: usize = 10;

/// Changes smaller than this percentage count as stable.
pub const STABLE_THRESHOLD_PERCENT: f64 = 1.0;

const MINUTES_PER_DAY: u64 = 24 * 60;

/// One bar of the history comparison.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonPoint {
    /// The item price, as entered.
    pub label: String,
    /// Working time needed, in minutes. Working days count as 24 hours.
    pub total_working_minutes: u64,
    /// Hourly rate at the time.
    pub hourly_rate: HourlyRate,
}

impl ComparisonPoint {
    /// Working time needed, in hours.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn working_hours(&self) -> f64 {
        self.total_working_minutes as f64 / 60.0
    }
}

/// Compares the working time of the `n` most recent calculations.
///
/// Returns an empty series for an empty history.
#[must_use]
pub fn comparison_series(log: &[HistoryEntry], n: usize) -> Vec<ComparisonPoint> {
    log.iter()
        .take(n)
        .rev()
        .map(|entry| ComparisonPoint {
            label: entry.input().item_price().to_string(),
            total_working_minutes: entry.result().working_time().total_minutes(),
            hourly_rate: entry.result().hourly_rate(),
        })
        .collect()
}

/// Headline figures of a comparison series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ComparisonOverview {
    /// The longest working time in the series, in hours.
    pub max_working_hours: f64,
    /// The mean of the defined hourly rates, if there are any.
    pub average_hourly_rate: Option<f64>,
}

/// Summarises a comparison series. `None` if the series is empty.
#[must_use]
pub fn comparison_overview(series: &[ComparisonPoint]) -> Option<ComparisonOverview> {
    let max_working_hours = series
        .iter()
        .map(ComparisonPoint::working_hours)
        .reduce(f64::max)?;

    let rates: Vec<f64> = series
        .iter()
        .filter_map(|point| point.hourly_rate.value())
        .collect();

    Some(ComparisonOverview {
        max_working_hours,
        average_hourly_rate: mean(&rates),
    })
}

/// One point of the hourly rate trend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    /// Position in the series, starting at 1 for the oldest point.
    pub index: usize,
    /// Hourly rate at the time.
    pub hourly_rate: HourlyRate,
    /// When the calculation was made.
    pub date: DateTime<Utc>,
    /// The item price, as entered.
    pub item_price: String,
    /// The monthly income, as entered.
    pub monthly_income: String,
}

/// The hourly rate of the `n` most recent calculations.
#[must_use]
pub fn trend_series(log: &[HistoryEntry], n: usize) -> Vec<TrendPoint> {
    log.iter()
        .take(n)
        .rev()
        .enumerate()
        .map(|(i, entry)| TrendPoint {
            index: i + 1,
            hourly_rate: entry.result().hourly_rate(),
            date: entry.created_at(),
            item_price: entry.input().item_price().to_string(),
            monthly_income: entry.input().monthly_income().to_string(),
        })
        .collect()
}

/// Direction of the hourly rate between the first and last point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Up by at least one percent.
    Up,
    /// Down by at least one percent.
    Down,
    /// Within one percent either way.
    Stable,
}

impl Direction {
    fn classify(delta_percent: f64) -> Self {
        if delta_percent.abs() < STABLE_THRESHOLD_PERCENT {
            Self::Stable
        } else if delta_percent > 0.0 {
            Self::Up
        } else {
            Self::Down
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Stable => "stable",
        })
    }
}

/// Statistics over an hourly rate series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendSummary {
    /// The oldest rate.
    pub first: f64,
    /// The newest rate.
    pub last: f64,
    /// Change from first to last, in percent. Zero when `first` is zero.
    pub delta_percent: f64,
    /// The highest rate.
    pub max: f64,
    /// The lowest rate.
    pub min: f64,
    /// The mean rate.
    pub average: f64,
    /// Classification of `delta_percent`.
    pub direction: Direction,
}

impl TrendSummary {
    /// Summarises rates given oldest first.
    ///
    /// Returns `None` if there are fewer than two rates.
    #[must_use]
    pub fn from_rates(rates: &[f64]) -> Option<Self> {
        let &[first, .., last] = rates else {
            return None;
        };

        let delta_percent = if first == 0.0 {
            0.0
        } else {
            (last - first) / first * 100.0
        };

        Some(Self {
            first,
            last,
            delta_percent,
            max: rates.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            min: rates.iter().copied().fold(f64::INFINITY, f64::min),
            average: mean(rates)?,
            direction: Direction::classify(delta_percent),
        })
    }
}

/// Summarises a trend series.
///
/// Points with an undefined rate are left out. Returns `None` if fewer than
/// two points remain.
#[must_use]
pub fn trend_summary(series: &[TrendPoint]) -> Option<TrendSummary> {
    let rates: Vec<f64> = series
        .iter()
        .filter_map(|point| point.hourly_rate.value())
        .collect();
    TrendSummary::from_rates(&rates)
}

#[allow(clippy::cast_precision_loss)]
fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Work and non-work portions of the continuous time span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BreakdownSplit {
    /// Working time, in minutes.
    pub work_minutes: u64,
    /// The rest of the continuous span, in minutes.
    pub non_work_minutes: u64,
}

/// Splits the continuous time of a result into work and non-work time.
///
/// Both breakdowns are flattened with 24-hour days. Non-work time is clamped
/// at zero.
#[must_use]
pub const fn breakdown_split(result: &CalculationResult) -> BreakdownSplit {
    let work_minutes = result.working_time().total_minutes();
    let total_minutes = result.continuous_time().total_minutes();
    BreakdownSplit {
        work_minutes,
        non_work_minutes: total_minutes.saturating_sub(work_minutes),
    }
}

/// Formats minutes compactly, e.g. `1d 2h 5m`.
#[must_use]
pub fn format_minutes(minutes: u64) -> String {
    TimeBreakdown::from_total_minutes(minutes, MINUTES_PER_DAY).to_string()
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};
    use test_case::test_case;

    use super::*;
    use crate::{CalculationInput, compute_result};

    /// Builds a newest-first log from prices given oldest first.
    fn log(prices: &[&str]) -> Vec<HistoryEntry> {
        let start = Utc.with_ymd_and_hms(2024, 10, 1, 9, 0, 0).unwrap();
        let mut entries: Vec<_> = prices
            .iter()
            .enumerate()
            .map(|(i, price)| {
                let input = CalculationInput::new("4300", *price, "8", "5");
                let result = compute_result(&input).unwrap();
                HistoryEntry {
                    id: format!("entry-{i}"),
                    created_at: start + Duration::days(i64::try_from(i).unwrap()),
                    input,
                    result,
                }
            })
            .collect();
        entries.reverse();
        entries
    }

    fn with_rate(mut entry: HistoryEntry, rate: HourlyRate) -> HistoryEntry {
        entry.result.hourly_rate = rate;
        entry
    }

    #[test]
    fn comparison_of_empty_history_is_empty() {
        assert!(comparison_series(&[], COMPARISON_WINDOW).is_empty());
        assert!(comparison_overview(&[]).is_none());
    }

    #[test]
    fn comparison_takes_most_recent_in_chronological_order() {
        let log = log(&["10", "20", "30", "40", "50", "60", "70"]);

        let series = comparison_series(&log, COMPARISON_WINDOW);

        let labels: Vec<_> = series.iter().map(|point| point.label.as_str()).collect();
        assert_eq!(labels, ["30", "40", "50", "60", "70"]);
    }

    #[test]
    fn comparison_counts_working_minutes() {
        // 1000 at 24.81/h is 5 working days and 19 minutes
        let log = log(&["1000"]);

        let series = comparison_series(&log, COMPARISON_WINDOW);

        assert_eq!(series[0].total_working_minutes, 5 * 1440 + 19);
    }

    #[test]
    fn comparison_overview_figures() {
        let log = log(&["120", "1000"]);
        let series = comparison_series(&log, COMPARISON_WINDOW);

        let overview = comparison_overview(&series).unwrap();

        assert!((overview.max_working_hours - (5.0 * 24.0 + 19.0 / 60.0)).abs() < 1e-9);
        let rate = 4300.0 / (5.0 * 52.0 / 12.0 * 8.0);
        assert!((overview.average_hourly_rate.unwrap() - rate).abs() < 1e-9);
    }

    #[test]
    fn trend_is_indexed_from_the_oldest_point() {
        let log = log(&["10", "20", "30"]);

        let series = trend_series(&log, TREND_WINDOW);

        let indexed: Vec<_> = series
            .iter()
            .map(|point| (point.index, point.item_price.as_str()))
            .collect();
        assert_eq!(indexed, [(1, "10"), (2, "20"), (3, "30")]);
        assert!(series[0].date < series[2].date);
    }

    #[test]
    fn trend_window_limits_the_series() {
        let log = log(&["1", "2", "3", "4", "5", "6", "7", "8", "9", "10", "11", "12"]);
        let series = trend_series(&log, TREND_WINDOW);
        assert_eq!(series.len(), TREND_WINDOW);
        assert_eq!(series[0].item_price, "3");
    }

    #[test]
    fn rising_rate_is_up() {
        let summary = TrendSummary::from_rates(&[10.0, 12.0]).unwrap();
        assert!((summary.delta_percent - 20.0).abs() < 1e-9);
        assert_eq!(summary.direction, Direction::Up);
    }

    #[test]
    fn small_change_is_stable() {
        let summary = TrendSummary::from_rates(&[10.0, 10.05]).unwrap();
        assert!((summary.delta_percent - 0.5).abs() < 1e-9);
        assert_eq!(summary.direction, Direction::Stable);
    }

    #[test_case(&[20.0, 15.0], Direction::Down; "falling")]
    #[test_case(&[0.0, 15.0], Direction::Stable; "zero first rate")]
    #[test_case(&[10.0, 10.2], Direction::Up; "two percent")]
    fn classification(rates: &[f64], expected: Direction) {
        assert_eq!(
            TrendSummary::from_rates(rates).unwrap().direction,
            expected
        );
    }

    #[test]
    fn summary_statistics() {
        let summary = TrendSummary::from_rates(&[10.0, 30.0, 20.0]).unwrap();
        assert!((summary.first - 10.0).abs() < f64::EPSILON);
        assert!((summary.last - 20.0).abs() < f64::EPSILON);
        assert!((summary.max - 30.0).abs() < f64::EPSILON);
        assert!((summary.min - 10.0).abs() < f64::EPSILON);
        assert!((summary.average - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn summary_needs_two_points() {
        assert!(TrendSummary::from_rates(&[]).is_none());
        assert!(TrendSummary::from_rates(&[10.0]).is_none());
        assert!(trend_summary(&trend_series(&log(&["10"]), TREND_WINDOW)).is_none());
    }

    #[test]
    fn undefined_rates_are_skipped() {
        let mut entries = log(&["10", "20", "30"]);
        entries[1] = with_rate(entries[1].clone(), HourlyRate::Undefined);
        entries[0] = with_rate(entries[0].clone(), HourlyRate::Defined(30.0));
        entries[2] = with_rate(entries[2].clone(), HourlyRate::Defined(20.0));

        let summary = trend_summary(&trend_series(&entries, TREND_WINDOW)).unwrap();

        assert!((summary.first - 20.0).abs() < f64::EPSILON);
        assert!((summary.last - 30.0).abs() < f64::EPSILON);
        assert_eq!(summary.direction, Direction::Up);
    }

    #[test]
    fn split_of_a_short_calculation_is_all_work() {
        let result = compute_result(&CalculationInput::new("4300", "120", "8", "5")).unwrap();
        let split = breakdown_split(&result);
        assert_eq!(split.work_minutes, 290);
        assert_eq!(split.non_work_minutes, 0);
    }

    #[test]
    fn split_never_goes_negative() {
        // working days count as full days, so work time can exceed the span
        let result = compute_result(&CalculationInput::new("4300", "1000", "8", "5")).unwrap();
        let split = breakdown_split(&result);
        assert_eq!(split.work_minutes, 5 * 1440 + 19);
        assert_eq!(split.non_work_minutes, 0);
    }

    #[test_case(0, "0m"; "zero")]
    #[test_case(59, "59m"; "minutes")]
    #[test_case(1500, "1d 1h"; "day and hour")]
    fn formats_minutes(minutes: u64, expected: &str) {
        assert_eq!(format_minutes(minutes), expected);
    }
}
