use std::path::Path;

use clap::Parser;
use serde_json::json;
use tracing::instrument;
use worktime::metrics::{Direction, trend_series, trend_summary};

use super::{
    Session,
    report::OutputFormat,
    terminal::{Colorize, money},
};

#[derive(Debug, Parser, Default)]
#[command(about = "Show how the hourly rate evolved")]
pub struct Trend {
    /// Number of calculations to include [default: from config]
    #[arg(short = 'n', long)]
    count: Option<usize>,

    /// Output format (table, json)
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,
}

impl Trend {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, data_dir: &Path) -> anyhow::Result<()> {
        let Session { config, history } = Session::open(data_dir);
        let count = self.count.unwrap_or_else(|| config.trend_window());

        let series = trend_series(history.entries(), count);
        let summary = trend_summary(&series);

        if let OutputFormat::Json = self.output {
            let value = json!({ "series": series, "summary": summary });
            println!("{}", serde_json::to_string_pretty(&value)?);
            return Ok(());
        }

        let Some(summary) = summary else {
            println!(
                "Need more calculations to show a trend (at least 2, have {}).",
                series.len()
            );
            return Ok(());
        };

        let symbol = &config.currency_symbol;
        for point in &series {
            println!(
                "{:>4} {}  {:>12}  {}",
                format!("#{}", point.index),
                point
                    .date
                    .with_timezone(&chrono::Local)
                    .format("%Y-%m-%d")
                    .to_string()
                    .dim(),
                format!("{}/hr", money(symbol, point.hourly_rate)),
                format!("for {}", money(symbol, &point.item_price)).dim()
            );
        }
        println!();

        let delta = format!("{} {:+.1}%", summary.direction, summary.delta_percent);
        let delta = match summary.direction {
            Direction::Up => delta.success(),
            Direction::Down => delta.warning(),
            Direction::Stable => delta.dim(),
        };
        println!("Trend:   {delta}");
        println!(
            "Range:   {} to {}",
            money(symbol, format!("{:.2}", summary.min)),
            money(symbol, format!("{:.2}", summary.max))
        );
        println!(
            "Average: {}",
            money(symbol, format!("{:.2}", summary.average))
        );

        Ok(())
    }
}
