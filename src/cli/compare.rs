use std::path::Path;

use clap::Parser;
use serde_json::json;
use tracing::instrument;
use worktime::metrics::{comparison_overview, comparison_series};

use super::{
    Session,
    report::OutputFormat,
    terminal::{Colorize, bar, bar_width, money},
};

/// Columns taken by the label and figures around each bar.
const RESERVED_COLUMNS: usize = 30;

#[derive(Debug, Parser, Default)]
#[command(about = "Compare the working time of recent calculations")]
pub struct Compare {
    /// Number of calculations to compare [default: from config]
    #[arg(short = 'n', long)]
    count: Option<usize>,

    /// Output format (table, json)
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,
}

impl Compare {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, data_dir: &Path) -> anyhow::Result<()> {
        let Session { config, history } = Session::open(data_dir);
        let count = self.count.unwrap_or_else(|| config.comparison_window());

        let series = comparison_series(history.entries(), count);
        let overview = comparison_overview(&series);

        if let OutputFormat::Json = self.output {
            let value = json!({ "series": series, "overview": overview });
            println!("{}", serde_json::to_string_pretty(&value)?);
            return Ok(());
        }

        let Some(overview) = overview else {
            println!("No calculations to compare yet.");
            return Ok(());
        };

        let symbol = &config.currency_symbol;
        let width = bar_width(RESERVED_COLUMNS);

        println!("Working time, oldest first");
        println!();
        for point in &series {
            println!(
                "{:<10} {} {:>8.1}h",
                money(symbol, &point.label),
                format!(
                    "{:<width$}",
                    bar(point.working_hours(), overview.max_working_hours, width)
                )
                .info(),
                point.working_hours(),
            );
        }
        println!();

        match overview.average_hourly_rate {
            Some(rate) => println!(
                "Average hourly rate: {}",
                money(symbol, format!("{rate:.2}")).success()
            ),
            None => println!("{}", "Average hourly rate: undefined".dim()),
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn compare_on_empty_history_succeeds() {
        let tmp = TempDir::new().unwrap();
        Compare::default().run(tmp.path()).unwrap();
    }
}
