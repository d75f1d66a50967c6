use std::fmt;

use serde::{Deserialize, Serialize};

/// Upper bound on the number of working days in a week.
pub const MAX_DAYS_PER_WEEK: f64 = 7.0;

/// Upper bound on the number of working hours in a day.
pub const MAX_HOURS_PER_DAY: f64 = 24.0;

/// The four values a calculation is made from, exactly as they were entered.
///
/// The raw strings are preserved so that a calculation can be shown again the
/// way the user typed it, and so that two calculations can be compared for
/// equality without floating point noise ("8" and "8.0" are different
/// inputs). Use [`CalculationInput::parse`] to obtain validated numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationInput {
    monthly_income: String,
    item_price: String,
    hours_per_day: String,
    days_per_week: String,
}

impl CalculationInput {
    /// Creates an input from the raw values entered by the user.
    ///
    /// No validation happens here. See [`CalculationInput::parse`].
    #[must_use]
    pub fn new(
        monthly_income: impl Into<String>,
        item_price: impl Into<String>,
        hours_per_day: impl Into<String>,
        days_per_week: impl Into<String>,
    ) -> Self {
        Self {
            monthly_income: monthly_income.into(),
            item_price: item_price.into(),
            hours_per_day: hours_per_day.into(),
            days_per_week: days_per_week.into(),
        }
    }

    /// The monthly income, as entered.
    #[must_use]
    pub fn monthly_income(&self) -> &str {
        &self.monthly_income
    }

    /// The price of the item, as entered.
    #[must_use]
    pub fn item_price(&self) -> &str {
        &self.item_price
    }

    /// The number of working hours per day, as entered.
    #[must_use]
    pub fn hours_per_day(&self) -> &str {
        &self.hours_per_day
    }

    /// The number of working days per week, as entered.
    #[must_use]
    pub fn days_per_week(&self) -> &str {
        &self.days_per_week
    }

    /// Validates the raw values and converts them to numbers.
    ///
    /// Surrounding whitespace is ignored.
    ///
    /// # Errors
    ///
    /// Returns an [`InvalidInputError`] for the first field that is not a
    /// finite number, is not strictly positive, or exceeds its upper bound
    /// (7 days per week, 24 hours per day).
    pub fn parse(&self) -> Result<ParsedInput, InvalidInputError> {
        let monthly_income = parse_positive(Field::MonthlyIncome, &self.monthly_income, None)?;
        let item_price = parse_positive(Field::ItemPrice, &self.item_price, None)?;
        let hours_per_day = parse_positive(
            Field::HoursPerDay,
            &self.hours_per_day,
            Some(MAX_HOURS_PER_DAY),
        )?;
        let days_per_week = parse_positive(
            Field::DaysPerWeek,
            &self.days_per_week,
            Some(MAX_DAYS_PER_WEEK),
        )?;

        Ok(ParsedInput {
            monthly_income,
            item_price,
            hours_per_day,
            days_per_week,
        })
    }
}

fn parse_positive(field: Field, raw: &str, max: Option<f64>) -> Result<f64, InvalidInputError> {
    let value: f64 = raw
        .trim()
        .parse()
        .ok()
        .filter(|value: &f64| value.is_finite())
        .ok_or_else(|| InvalidInputError::NotANumber {
            field,
            value: raw.to_string(),
        })?;

    if value <= 0.0 {
        return Err(InvalidInputError::NotPositive {
            field,
            value: raw.to_string(),
        });
    }

    if let Some(max) = max {
        if value > max {
            return Err(InvalidInputError::OutOfRange {
                field,
                value: raw.to_string(),
                max,
            });
        }
    }

    Ok(value)
}

/// Validated numeric view of a [`CalculationInput`].
///
/// Every field is finite and strictly positive, `hours_per_day` is at most 24
/// and `days_per_week` is at most 7.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParsedInput {
    /// Net income earned per month.
    pub monthly_income: f64,
    /// Price of the item being considered.
    pub item_price: f64,
    /// Scheduled working hours per day.
    pub hours_per_day: f64,
    /// Scheduled working days per week.
    pub days_per_week: f64,
}

/// Identifies one of the input fields in error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// The monthly income.
    MonthlyIncome,
    /// The item price.
    ItemPrice,
    /// Working hours per day.
    HoursPerDay,
    /// Working days per week.
    DaysPerWeek,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::MonthlyIncome => "monthly income",
            Self::ItemPrice => "item price",
            Self::HoursPerDay => "hours per day",
            Self::DaysPerWeek => "days per week",
        };
        f.write_str(name)
    }
}

/// Error returned when a calculation input cannot be used.
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum InvalidInputError {
    /// The value is empty, not a number, or not finite.
    #[error("{field} '{value}' is not a number")]
    NotANumber {
        /// The offending field.
        field: Field,
        /// The raw value.
        value: String,
    },

    /// The value is zero or negative.
    #[error("{field} must be greater than zero, got '{value}'")]
    NotPositive {
        /// The offending field.
        field: Field,
        /// The raw value.
        value: String,
    },

    /// The value exceeds the upper bound for the field.
    #[error("{field} must be at most {max}, got '{value}'")]
    OutOfRange {
        /// The offending field.
        field: Field,
        /// The raw value.
        value: String,
        /// The largest accepted value.
        max: f64,
    },

    /// The item price would take too long to earn to be broken down.
    #[error("item price '{value}' would take {hours:.3e} hours of work to earn")]
    OutOfReach {
        /// The raw item price.
        value: String,
        /// The hours of work the price amounts to.
        hours: f64,
    },
}

impl InvalidInputError {
    /// The field that failed validation.
    #[must_use]
    pub const fn field(&self) -> Field {
        match self {
            Self::NotANumber { field, .. }
            | Self::NotPositive { field, .. }
            | Self::OutOfRange { field, .. } => *field,
            Self::OutOfReach { .. } => Field::ItemPrice,
        }
    }
}
