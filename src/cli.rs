use std::path::{Path, PathBuf};

mod calc;
mod clear;
mod compare;
mod history;
mod report;
mod show;
mod terminal;
mod trend;

use calc::Calc;
use clap::ArgAction;
use clear::Clear;
use compare::Compare;
use history::History;
use show::{Last, Show};
use tracing::instrument;
use trend::Trend;
use worktime::{Config, FileStore, HistoryStore};

/// Name of the configuration file inside the data directory.
const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// The directory holding the history and configuration
    #[arg(short, long, default_value = ".worktime", global = true)]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);

        self.command
            .unwrap_or(Command::Last(Last::default()))
            .run(&self.data_dir)
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// Convert a price into work time and record it (alias: c)
    ///
    /// Values left out are taken from the most recent calculation, then from
    /// the configured defaults.
    #[command(visible_alias = "c")]
    Calc(Calc),

    /// Show the most recent calculation (default)
    Last(Last),

    /// List past calculations, newest first
    History(History),

    /// Show a past calculation
    Show(Show),

    /// Compare the working time of recent calculations
    Compare(Compare),

    /// Show how the hourly rate evolved
    Trend(Trend),

    /// Delete all past calculations
    Clear(Clear),

    /// Write a default configuration file
    Init,
}

impl Command {
    fn run(self, data_dir: &Path) -> anyhow::Result<()> {
        match self {
            Self::Calc(command) => command.run(data_dir)?,
            Self::Last(command) => command.run(data_dir)?,
            Self::History(command) => command.run(data_dir)?,
            Self::Show(command) => command.run(data_dir)?,
            Self::Compare(command) => command.run(data_dir)?,
            Self::Trend(command) => command.run(data_dir)?,
            Self::Clear(command) => command.run(data_dir)?,
            Self::Init => init(data_dir)?,
        }
        Ok(())
    }
}

#[instrument]
fn init(data_dir: &Path) -> anyhow::Result<()> {
    let config_path = data_dir.join(CONFIG_FILE);
    if config_path.exists() {
        anyhow::bail!(
            "Already initialized (found existing {})",
            config_path.display()
        );
    }

    std::fs::create_dir_all(data_dir)
        .map_err(|e| anyhow::anyhow!("Failed to create {}: {e}", data_dir.display()))?;

    Config::default()
        .save(&config_path)
        .map_err(|e| anyhow::anyhow!("Failed to create {CONFIG_FILE}: {e}"))?;

    println!("Initialized work-time calculator in {}", data_dir.display());
    println!("  Created: {CONFIG_FILE}");
    println!();
    println!("Next steps:");
    println!("  worktime calc --income 4300 --price 120");

    Ok(())
}

/// The configuration and history found in a data directory.
pub struct Session {
    pub config: Config,
    pub history: HistoryStore<FileStore>,
}

impl Session {
    /// Opens the data directory.
    ///
    /// A missing or unreadable configuration falls back to the defaults, and
    /// unreadable history starts over empty. Neither is an error.
    pub fn open(data_dir: &Path) -> Self {
        let config = load_config(data_dir);
        let history = HistoryStore::with_capacity(
            FileStore::new(data_dir.to_path_buf()),
            config.history_capacity(),
        );
        Self { config, history }
    }
}

fn load_config(data_dir: &Path) -> Config {
    let path = data_dir.join(CONFIG_FILE);
    Config::load(&path).unwrap_or_else(|e| {
        tracing::debug!("Failed to load config: {e}");
        Config::default()
    })
}
