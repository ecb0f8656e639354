use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::OutputPaths;
use crate::db::StateTracker;
use crate::errors::AppResult;
use crate::ui::messages::{info, success, warning};
use crate::utils::path::output_dir as resolve_output_dir;
use std::io::{self, Write};

/// Handle the `reset` subcommand
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Reset { output_dir, yes } = cmd {
        let output_dir = resolve_output_dir(output_dir.as_deref(), &cfg.output_dir);
        let paths = OutputPaths::new(cfg, &output_dir);

        if !paths.state.exists() {
            info("No processing state to clear.");
            return Ok(());
        }

        if !*yes && !confirm(&format!(
            "Clear the processing state in {}? [y/N]: ",
            paths.state.display()
        ))? {
            warning("Reset cancelled.");
            return Ok(());
        }

        let mut tracker = StateTracker::open(&paths.state)?;
        tracker.reset()?;
        success("Processing state cleared: the next run will reprocess every export.");
    }

    Ok(())
}

fn confirm(prompt: &str) -> AppResult<bool> {
    print!("{prompt}");
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;
    let ans = answer.trim().to_ascii_lowercase();

    Ok(ans == "y" || ans == "yes")
}
