use std::path::Path;

use clap::Parser;
use tracing::instrument;
use worktime::{Config, FileStore, HistoryEntry, HistoryStore};

use super::{
    Session,
    report::{OutputFormat, entry_json, print_calculation},
    terminal::{Colorize, money},
};

#[derive(Debug, Parser, Default)]
#[command(about = "Show the most recent calculation")]
pub struct Last {
    /// Output format (table, json)
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,
}

impl Last {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, data_dir: &Path) -> anyhow::Result<()> {
        let Session { config, history } = Session::open(data_dir);

        let Some(entry) = history.most_recent() else {
            println!("No calculations yet. Start with 'worktime calc --income <INCOME> --price <PRICE>'.");
            return Ok(());
        };

        output_entry(&config, entry, self.output)
    }
}

#[derive(Debug, Parser)]
#[command(about = "Display a past calculation")]
pub struct Show {
    /// Position in the history (1 is the most recent), or an entry id
    entry: String,

    /// Output format (table, json)
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,
}

impl Show {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, data_dir: &Path) -> anyhow::Result<()> {
        let Session { config, history } = Session::open(data_dir);

        let Some(entry) = lookup(&history, &self.entry) else {
            anyhow::bail!("No calculation matches '{}'", self.entry);
        };

        output_entry(&config, entry, self.output)
    }
}

/// Finds an entry by 1-based position, or by id if the key is not a number.
fn lookup<'a>(history: &'a HistoryStore<FileStore>, key: &str) -> Option<&'a HistoryEntry> {
    let key = key.trim().trim_start_matches('#');
    match key.parse::<usize>() {
        Ok(position) => position
            .checked_sub(1)
            .and_then(|index| history.entries().get(index)),
        Err(_) => history.find(key),
    }
}

fn output_entry(config: &Config, entry: &HistoryEntry, output: OutputFormat) -> anyhow::Result<()> {
    match output {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&entry_json(entry))?);
        }
        OutputFormat::Table => {
            let input = entry.input();
            println!(
                "{} {}",
                money(&config.currency_symbol, input.item_price()).info(),
                format!(
                    "on {} income, calculated {}",
                    money(&config.currency_symbol, input.monthly_income()),
                    entry
                        .created_at()
                        .with_timezone(&chrono::Local)
                        .format("%Y-%m-%d %H:%M")
                )
                .dim()
            );
            println!("{}", format!("id {}", entry.id()).dim());
            println!();
            print_calculation(config, input, entry.result());
        }
    }
    Ok(())
}
