use std::path::Path;

use clap::Parser;
use tracing::instrument;

use super::{Session, terminal::Colorize};

#[derive(Debug, Parser)]
#[command(about = "Delete all past calculations")]
pub struct Clear {
    /// Skip confirmation prompt
    #[arg(long, short)]
    yes: bool,
}

impl Clear {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, data_dir: &Path) -> anyhow::Result<()> {
        let Session { mut history, .. } = Session::open(data_dir);

        // an empty log may stand for a discarded corrupt document, which is
        // overwritten all the same
        if !self.yes && !history.is_empty() {
            let proceed = dialoguer::Confirm::new()
                .with_prompt(format!("Delete {} calculation(s)?", history.len()))
                .default(false)
                .interact()?;
            if !proceed {
                println!("Cancelled");
                return Ok(());
            }
        }

        let count = history.len();
        history.clear_history()?;

        println!(
            "{}",
            format!("✅ Deleted {count} calculation(s)").success()
        );
        Ok(())
    }
}
