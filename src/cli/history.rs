use std::path::Path;

use clap::Parser;
use tracing::instrument;

use super::{
    Session,
    report::{OutputFormat, entry_json, entry_line},
    terminal::{Colorize, is_narrow, money},
};

#[derive(Debug, Parser, Default)]
#[command(about = "List past calculations, newest first")]
pub struct History {
    /// Output format (table, json)
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,
}

impl History {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, data_dir: &Path) -> anyhow::Result<()> {
        let Session { config, history } = Session::open(data_dir);

        if let OutputFormat::Json = self.output {
            let entries: Vec<_> = history.entries().iter().map(entry_json).collect();
            println!("{}", serde_json::to_string_pretty(&entries)?);
            return Ok(());
        }

        if history.is_empty() {
            println!("No calculations yet.");
            return Ok(());
        }

        println!(
            "Calculation history ({} of {})",
            history.len(),
            history.capacity()
        );
        println!("{}", "──────────────────────────".dim());

        let symbol = &config.currency_symbol;
        for (i, entry) in history.entries().iter().enumerate() {
            if is_narrow() {
                // Stacked output for narrow terminals
                println!(
                    "#{} {} → {} ({}/hr)",
                    i + 1,
                    money(symbol, entry.input().item_price()),
                    entry.result().working_time(),
                    money(symbol, entry.result().hourly_rate())
                );
            } else {
                println!("{}", entry_line(&config, i + 1, entry));
            }
        }

        println!();
        println!("{}", "Run 'worktime show <#>' for details.".dim());
        Ok(())
    }
}
