//! Rendering of calculations shared by several commands

use serde_json::json;
use worktime::{
    CalculationInput, CalculationResult, Config, HistoryEntry, TimeBreakdown,
    metrics::breakdown_split, metrics::format_minutes,
};

use super::terminal::{Colorize, money};

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

/// Prints a calculation with its three headline figures.
pub fn print_calculation(config: &Config, input: &CalculationInput, result: &CalculationResult) {
    let symbol = &config.currency_symbol;
    let rate = money(symbol, result.hourly_rate());

    println!(
        "{:<13} {} {}",
        "Work time",
        format!("{:<12}", result.working_time().to_string()).success(),
        "actual working hours".dim()
    );
    println!(
        "{:<13} {} {}",
        "Total time",
        format!("{:<12}", result.continuous_time().to_string()).info(),
        "if working 24/7".dim()
    );
    println!(
        "{:<13} {:<12} {}",
        "Hourly rate",
        rate,
        "per hour worked".dim()
    );
    println!();

    if result.hourly_rate().is_defined() {
        println!(
            "To afford {} you need to work {}.",
            money(symbol, input.item_price()),
            spell_out(result.working_time())
        );
    } else {
        println!(
            "{}",
            "The schedule has no working hours, so no hourly rate can be derived.".warning()
        );
    }
    println!(
        "{}",
        format!(
            "Based on {} hours/day, {} days/week schedule",
            input.hours_per_day(),
            input.days_per_week()
        )
        .dim()
    );

    let split = breakdown_split(result);
    if split.non_work_minutes > 0 {
        println!(
            "{}",
            format!(
                "Time breakdown: {} work, {} off",
                format_minutes(split.work_minutes),
                format_minutes(split.non_work_minutes)
            )
            .dim()
        );
    }
}

/// "2 days, 3 hours, and 15 minutes", leaving out zero units.
fn spell_out(time: TimeBreakdown) -> String {
    let mut parts = Vec::with_capacity(3);
    if time.days > 0 {
        parts.push(format!("{} {}", time.days, plural(time.days, "day")));
    }
    if time.hours > 0 {
        let hours = u64::from(time.hours);
        parts.push(format!("{hours} {}", plural(hours, "hour")));
    }
    if time.minutes > 0 || parts.is_empty() {
        let minutes = u64::from(time.minutes);
        parts.push(format!("{minutes} {}", plural(minutes, "minute")));
    }

    match parts.as_slice() {
        [only] => only.clone(),
        [first, second] => format!("{first} and {second}"),
        [init @ .., last] => format!("{}, and {last}", init.join(", ")),
        [] => String::new(),
    }
}

fn plural(count: u64, unit: &str) -> String {
    if count == 1 {
        unit.to_string()
    } else {
        format!("{unit}s")
    }
}

/// One line per entry: position, price, working time, rate, when.
pub fn entry_line(config: &Config, position: usize, entry: &HistoryEntry) -> String {
    let symbol = &config.currency_symbol;
    format!(
        "{:>3} {:<10} {:>12} {:>12}  {}",
        format!("#{position}"),
        money(symbol, entry.input().item_price()),
        entry.result().working_time().to_string(),
        format!("{}/hr", money(symbol, entry.result().hourly_rate())),
        entry
            .created_at()
            .with_timezone(&chrono::Local)
            .format("%Y-%m-%d %H:%M")
            .to_string()
            .dim()
    )
}

pub fn entry_json(entry: &HistoryEntry) -> serde_json::Value {
    json!({
        "id": entry.id(),
        "timestamp": entry.created_at(),
        "input": entry.input(),
        "result": entry.result(),
    })
}
