// Serialized form of history entries.
//
// The stored document is a JSON array of flat records, using the same field
// names as the browser version of the calculator so that existing histories
// can be imported. Every record is validated before it is trusted.

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    domain::{CalculationInput, CalculationResult, HourlyRate, TimeBreakdown},
    storage::HistoryEntry,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EntryData {
    id: String,
    timestamp: Timestamp,
    monthly_income: String,
    item_price: String,
    hours_per_day: String,
    days_per_week: String,
    result: ResultData,
}

/// Creation time, either as an RFC 3339 string or as epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
enum Timestamp {
    Iso(String),
    EpochMillis(i64),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResultData {
    days: u64,
    hours: u32,
    minutes: u32,
    working_days: u64,
    working_hours: u32,
    working_minutes: u32,
    hourly_rate: Option<f64>,
}

/// Reasons a stored record is rejected.
#[derive(Debug, thiserror::Error, PartialEq)]
pub(crate) enum InvalidEntry {
    #[error("entry has an empty id")]
    EmptyId,

    #[error("invalid timestamp '{0}'")]
    Timestamp(String),

    #[error("invalid input: {0}")]
    Input(#[from] crate::domain::InvalidInputError),

    #[error("{0} is out of range")]
    Range(&'static str),

    #[error("hourly rate {0} is not a positive number")]
    Rate(f64),
}

impl Timestamp {
    fn to_datetime(&self) -> Result<DateTime<Utc>, InvalidEntry> {
        match self {
            Self::Iso(s) => DateTime::parse_from_rfc3339(s)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|_| InvalidEntry::Timestamp(s.clone())),
            Self::EpochMillis(ms) => Utc
                .timestamp_millis_opt(*ms)
                .single()
                .ok_or_else(|| InvalidEntry::Timestamp(ms.to_string())),
        }
    }
}

impl From<&HistoryEntry> for EntryData {
    fn from(entry: &HistoryEntry) -> Self {
        let input = &entry.input;
        let result = &entry.result;
        let continuous = result.continuous_time();
        let working = result.working_time();

        Self {
            id: entry.id.clone(),
            timestamp: Timestamp::Iso(
                entry
                    .created_at
                    .to_rfc3339_opts(SecondsFormat::Millis, true),
            ),
            monthly_income: input.monthly_income().to_string(),
            item_price: input.item_price().to_string(),
            hours_per_day: input.hours_per_day().to_string(),
            days_per_week: input.days_per_week().to_string(),
            result: ResultData {
                days: continuous.days,
                hours: continuous.hours,
                minutes: continuous.minutes,
                working_days: working.days,
                working_hours: working.hours,
                working_minutes: working.minutes,
                hourly_rate: result.hourly_rate().value(),
            },
        }
    }
}

impl TryFrom<EntryData> for HistoryEntry {
    type Error = InvalidEntry;

    fn try_from(data: EntryData) -> Result<Self, Self::Error> {
        if data.id.trim().is_empty() {
            return Err(InvalidEntry::EmptyId);
        }

        let created_at = data.timestamp.to_datetime()?;

        let input = CalculationInput::new(
            data.monthly_income,
            data.item_price,
            data.hours_per_day,
            data.days_per_week,
        );
        let parsed = input.parse()?;

        let r = data.result;
        if r.hours > 23 {
            return Err(InvalidEntry::Range("hours"));
        }
        if r.minutes > 59 {
            return Err(InvalidEntry::Range("minutes"));
        }
        if f64::from(r.working_hours) >= parsed.hours_per_day {
            return Err(InvalidEntry::Range("working hours"));
        }
        if r.working_minutes > 59 {
            return Err(InvalidEntry::Range("working minutes"));
        }

        let hourly_rate = match r.hourly_rate {
            None => HourlyRate::Undefined,
            Some(rate) => match HourlyRate::new(rate) {
                HourlyRate::Undefined => return Err(InvalidEntry::Rate(rate)),
                defined => defined,
            },
        };

        let result = CalculationResult::new(
            hourly_rate,
            TimeBreakdown {
                days: r.days,
                hours: r.hours,
                minutes: r.minutes,
            },
            TimeBreakdown {
                days: r.working_days,
                hours: r.working_hours,
                minutes: r.working_minutes,
            },
        );

        Ok(Self {
            id: data.id,
            created_at,
            input,
            result,
        })
    }
}
