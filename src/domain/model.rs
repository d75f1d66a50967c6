use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::{CalculationInput, InvalidInputError, ParsedInput};

/// Average number of weeks in a month (52 weeks spread over 12 months).
pub const WEEKS_PER_MONTH: f64 = 52.0 / 12.0;

/// Length of a calendar day, in hours.
pub const HOURS_PER_DAY: f64 = 24.0;

const MINUTES_PER_HOUR: u64 = 60;

/// Converts a calculation input into an hourly rate and work time.
///
/// # Errors
///
/// Returns an [`InvalidInputError`] if any field of the input is not a
/// positive number, if the schedule is out of range, or if the price would
/// take more than [`MAX_HOURS_NEEDED`] hours to earn.
pub fn compute_result(input: &CalculationInput) -> Result<CalculationResult, InvalidInputError> {
    let parsed = input.parse()?;

    if let Some(rate) = hourly_rate(&parsed).value() {
        let hours = parsed.item_price / rate;
        if !hours_within_reach(hours) {
            return Err(InvalidInputError::OutOfReach {
                value: input.item_price().to_string(),
                hours,
            });
        }
    }

    Ok(CalculationResult::from_parsed(&parsed))
}

/// The most hours of work a single price may amount to.
///
/// Beyond this, breakdowns can no longer be represented to the minute.
pub const MAX_HOURS_NEEDED: f64 = 1e12;

fn hours_within_reach(hours: f64) -> bool {
    hours.is_finite() && hours <= MAX_HOURS_NEEDED
}

fn hourly_rate(input: &ParsedInput) -> HourlyRate {
    let working_days_per_month = input.days_per_week * WEEKS_PER_MONTH;
    let monthly_working_hours = working_days_per_month * input.hours_per_day;

    if monthly_working_hours <= 0.0 || !monthly_working_hours.is_finite() {
        tracing::warn!(
            monthly_working_hours,
            "schedule has no working hours, hourly rate is undefined"
        );
        return HourlyRate::Undefined;
    }

    let rate = HourlyRate::new(input.monthly_income / monthly_working_hours);
    if !rate.is_defined() {
        tracing::warn!("hourly rate is not a finite positive number");
    }
    rate
}

/// Income earned per hour worked.
///
/// A degenerate schedule (no working hours at all) has no meaningful rate.
/// Rather than letting an infinite or NaN value leak into the history, such a
/// rate is represented as [`HourlyRate::Undefined`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "Option<f64>", into = "Option<f64>")]
pub enum HourlyRate {
    /// A finite, strictly positive rate.
    Defined(f64),
    /// The rate could not be computed.
    Undefined,
}

impl HourlyRate {
    /// Wraps a raw rate, mapping non-finite and non-positive values to
    /// [`HourlyRate::Undefined`].
    #[must_use]
    pub fn new(rate: f64) -> Self {
        if rate.is_finite() && rate > 0.0 {
            Self::Defined(rate)
        } else {
            Self::Undefined
        }
    }

    /// The rate, if it is defined.
    #[must_use]
    pub const fn value(self) -> Option<f64> {
        match self {
            Self::Defined(rate) => Some(rate),
            Self::Undefined => None,
        }
    }

    /// Whether the rate is defined.
    #[must_use]
    pub const fn is_defined(self) -> bool {
        matches!(self, Self::Defined(_))
    }
}

impl From<Option<f64>> for HourlyRate {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Self::Undefined, Self::new)
    }
}

impl From<HourlyRate> for Option<f64> {
    fn from(rate: HourlyRate) -> Self {
        rate.value()
    }
}

impl fmt::Display for HourlyRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Defined(rate) => write!(f, "{rate:.2}"),
            Self::Undefined => f.write_str("undefined"),
        }
    }
}

/// An amount of time split into days, hours and minutes.
///
/// The length of a "day" depends on the breakdown: 24 hours for continuous
/// time, the scheduled working hours for working time. The hours component
/// is always shorter than a day and minutes never exceed 59.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeBreakdown {
    /// Whole days.
    pub days: u64,
    /// Whole hours after the last full day.
    pub hours: u32,
    /// Minutes after the last full hour.
    pub minutes: u32,
}

impl TimeBreakdown {
    /// Nothing at all.
    pub const ZERO: Self = Self {
        days: 0,
        hours: 0,
        minutes: 0,
    };

    /// Splits a number of hours into days of `day_length` hours.
    ///
    /// The amount is rounded to the nearest minute first, so rounding can
    /// never produce "60m" or a full day's worth of hours: the overflow is
    /// carried into the next unit.
    #[must_use]
    pub fn from_hours(hours: f64, day_length: f64) -> Self {
        Self::from_total_minutes(to_minutes(hours), to_minutes(day_length).max(1))
    }

    /// Splits a number of minutes into days of `day_minutes` minutes.
    ///
    /// # Panics
    ///
    /// Panics if `day_minutes` is zero.
    #[must_use]
    pub fn from_total_minutes(total: u64, day_minutes: u64) -> Self {
        let days = total / day_minutes;
        let rest = total % day_minutes;
        Self {
            days,
            hours: u32::try_from(rest / MINUTES_PER_HOUR).unwrap_or(u32::MAX),
            minutes: u32::try_from(rest % MINUTES_PER_HOUR).unwrap_or(u32::MAX),
        }
    }

    /// Flattens the breakdown to minutes, counting each day as 24 hours.
    ///
    /// Saturates at `u64::MAX`.
    #[must_use]
    pub const fn total_minutes(&self) -> u64 {
        self.days
            .saturating_mul(24 * MINUTES_PER_HOUR)
            .saturating_add(self.hours as u64 * MINUTES_PER_HOUR)
            .saturating_add(self.minutes as u64)
    }

    /// Whether every component is zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.days == 0 && self.hours == 0 && self.minutes == 0
    }
}

/// Rounds a non-negative number of hours to whole minutes.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_minutes(hours: f64) -> u64 {
    // saturating float-to-int cast: NaN maps to 0, huge values to u64::MAX
    (hours * 60.0).round().max(0.0) as u64
}

impl fmt::Display for TimeBreakdown {
    /// Compact form such as `1d 4h 50m`. Zero components are left out, and an
    /// empty breakdown is shown as `0m`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::with_capacity(3);
        if self.days > 0 {
            parts.push(format!("{}d", self.days));
        }
        if self.hours > 0 {
            parts.push(format!("{}h", self.hours));
        }
        if self.minutes > 0 || parts.is_empty() {
            parts.push(format!("{}m", self.minutes));
        }
        f.write_str(&parts.join(" "))
    }
}

/// The outcome of converting a price into work time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationResult {
    pub(crate) hourly_rate: HourlyRate,
    pub(crate) continuous_time: TimeBreakdown,
    pub(crate) working_time: TimeBreakdown,
}

impl CalculationResult {
    /// Runs the conversion on already validated numbers.
    ///
    /// 1. working days per month = days per week × 52 / 12
    /// 2. monthly working hours = working days per month × hours per day
    /// 3. hourly rate = monthly income / monthly working hours
    /// 4. hours needed = item price / hourly rate
    ///
    /// The hours needed are then split into 24-hour days (continuous time) and
    /// into working days (working time).
    ///
    /// If the schedule amounts to no working hours, or the price would take
    /// more than [`MAX_HOURS_NEEDED`] hours to earn, the rate is
    /// [`HourlyRate::Undefined`] and both breakdowns are zero.
    #[must_use]
    pub fn from_parsed(input: &ParsedInput) -> Self {
        let hourly_rate = hourly_rate(input);
        let Some(rate) = hourly_rate.value() else {
            return Self::undefined();
        };

        let hours_needed = input.item_price / rate;
        if !hours_within_reach(hours_needed) {
            tracing::warn!(hours_needed, "price is out of reach, result is undefined");
            return Self::undefined();
        }

        Self {
            hourly_rate,
            continuous_time: TimeBreakdown::from_hours(hours_needed, HOURS_PER_DAY),
            working_time: TimeBreakdown::from_hours(hours_needed, input.hours_per_day),
        }
    }

    const fn undefined() -> Self {
        Self {
            hourly_rate: HourlyRate::Undefined,
            continuous_time: TimeBreakdown::ZERO,
            working_time: TimeBreakdown::ZERO,
        }
    }

    /// Creates a result from its parts.
    ///
    /// This does not check that the parts are consistent with each other; it
    /// is meant for rebuilding results that were computed earlier.
    #[must_use]
    pub const fn new(
        hourly_rate: HourlyRate,
        continuous_time: TimeBreakdown,
        working_time: TimeBreakdown,
    ) -> Self {
        Self {
            hourly_rate,
            continuous_time,
            working_time,
        }
    }

    /// Income earned per hour worked.
    #[must_use]
    pub const fn hourly_rate(&self) -> HourlyRate {
        self.hourly_rate
    }

    /// Time to earn the price if every hour of every day were paid.
    #[must_use]
    pub const fn continuous_time(&self) -> TimeBreakdown {
        self.continuous_time
    }

    /// Time to earn the price counting only scheduled working hours.
    ///
    /// Days in this breakdown are working days.
    #[must_use]
    pub const fn working_time(&self) -> TimeBreakdown {
        self.working_time
    }
}
