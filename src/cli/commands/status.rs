use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::OutputPaths;
use crate::db::StateTracker;
use crate::errors::AppResult;
use crate::ui::messages::{header, info};
use crate::utils::path::output_dir as resolve_output_dir;
use crate::utils::table::{Column, Table};

/// Handle the `status` subcommand
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Status { output_dir } = cmd {
        let output_dir = resolve_output_dir(output_dir.as_deref(), &cfg.output_dir);
        let paths = OutputPaths::new(cfg, &output_dir);

        if !paths.state.exists() {
            info(format!(
                "No processing state at {}: nothing processed yet.",
                paths.state.display()
            ));
            return Ok(());
        }

        let tracker = StateTracker::open(&paths.state)?;
        let files = tracker.processed_files()?;

        header(format!("Processed files ({})", paths.state.display()));

        if files.is_empty() {
            info("No files processed yet.");
            return Ok(());
        }

        let mut table = Table::new(vec![
            Column::new("File"),
            Column::new("Records"),
            Column::new("Processed at"),
        ]);

        let mut total = 0;
        for f in &files {
            total += f.record_count;
            table.add_row(vec![
                f.file_name.clone(),
                f.record_count.to_string(),
                f.processed_at.clone(),
            ]);
        }

        print!("{}", table.render());
        println!();
        info(format!("{} file(s), {} raw record(s)", files.len(), total));
    }

    Ok(())
}
