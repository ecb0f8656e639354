use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::OutputPaths;
use crate::db::StateTracker;
use crate::db::log::recent_logs;
use crate::errors::AppResult;
use crate::ui::messages::{header, info};
use crate::utils::path::output_dir as resolve_output_dir;
use crate::utils::table::{Column, Table};

/// Handle the `log` subcommand
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Log { output_dir, limit } = cmd {
        let output_dir = resolve_output_dir(output_dir.as_deref(), &cfg.output_dir);
        let paths = OutputPaths::new(cfg, &output_dir);

        if !paths.state.exists() {
            info("No run log yet.");
            return Ok(());
        }

        let tracker = StateTracker::open(&paths.state)?;
        let entries = recent_logs(tracker.conn(), *limit)?;

        header("Internal log");

        let mut table = Table::new(vec![
            Column::new("#"),
            Column::new("Date"),
            Column::new("Operation"),
            Column::new("Message"),
        ]);

        for e in entries.iter().rev() {
            let date = chrono::DateTime::parse_from_rfc3339(&e.date)
                .map(|dt| dt.format("%F %T").to_string())
                .unwrap_or_else(|_| e.date.clone());

            let op_target = if e.target.is_empty() {
                e.operation.clone()
            } else {
                format!("{} ({})", e.operation, e.target)
            };

            table.add_row(vec![e.id.to_string(), date, op_target, e.message.clone()]);
        }

        if table.is_empty() {
            info("Log is empty.");
        } else {
            print!("{}", table.render());
        }
    }

    Ok(())
}
