use std::path::Path;

use anyhow::Context;
use clap::Parser;
use serde_json::json;
use tracing::instrument;
use worktime::{CalculationInput, Config, compute_result};

use super::{
    Session,
    report::{OutputFormat, print_calculation},
    terminal::Colorize,
};

#[derive(Debug, Parser, Default)]
#[command(about = "Convert a price into work time")]
pub struct Calc {
    /// Net monthly income
    #[arg(long, short)]
    income: Option<String>,

    /// Price of the item
    #[arg(long, short)]
    price: Option<String>,

    /// Working hours per day
    #[arg(long)]
    hours: Option<String>,

    /// Working days per week
    #[arg(long)]
    days: Option<String>,

    /// Output format (table, json)
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,
}

impl Calc {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, data_dir: &Path) -> anyhow::Result<()> {
        let Session {
            config,
            mut history,
        } = Session::open(data_dir);

        let output = self.output;
        let input = self.resolve(history.most_recent().map(|entry| entry.input()), &config)?;
        let result = compute_result(&input).context("Cannot calculate work time")?;

        let outcome = history.record_calculation(input.clone(), result);
        if let Some(e) = &outcome.persist_error {
            eprintln!(
                "{}",
                format!("⚠️  Calculation not saved: {e}").warning()
            );
        }

        match output {
            OutputFormat::Json => {
                let value = json!({
                    "input": input,
                    "result": result,
                    "recorded": outcome.was_recorded,
                });
                println!("{}", serde_json::to_string_pretty(&value)?);
            }
            OutputFormat::Table => {
                print_calculation(&config, &input, &result);
                if !outcome.was_recorded {
                    println!("{}", "Same as the previous calculation, not added to history.".dim());
                }
            }
        }

        Ok(())
    }

    /// Fills in missing values from the previous input, then from the
    /// configured defaults. Income and price have no default.
    fn resolve(
        self,
        previous: Option<&CalculationInput>,
        config: &Config,
    ) -> anyhow::Result<CalculationInput> {
        let income = self
            .income
            .or_else(|| previous.map(|input| input.monthly_income().to_string()))
            .context("No monthly income given, pass --income")?;
        let price = self
            .price
            .or_else(|| previous.map(|input| input.item_price().to_string()))
            .context("No item price given, pass --price")?;
        let hours = self
            .hours
            .or_else(|| previous.map(|input| input.hours_per_day().to_string()))
            .unwrap_or_else(|| config.default_hours_per_day().to_string());
        let days = self
            .days
            .or_else(|| previous.map(|input| input.days_per_week().to_string()))
            .unwrap_or_else(|| config.default_days_per_week().to_string());

        Ok(CalculationInput::new(income, price, hours, days))
    }
}
