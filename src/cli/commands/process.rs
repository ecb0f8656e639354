use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::{OutputPaths, Pipeline, RunOptions, RunReport};
use crate::errors::{AppError, AppResult, exit_code};
use crate::mapping::{CommandSuggester, NoopSuggester, SessionCatalog, SessionNameSuggester};
use crate::ui::messages::{error, header, info, success, warning};
use crate::utils::date::{parse_date, today};
use crate::utils::path::output_dir as resolve_output_dir;
use std::time::Duration;

/// Handle the `process` subcommand. Returns the exit status of the run.
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<i32> {
    let Commands::Process {
        input_dir,
        output_dir,
        full_refresh,
        no_suggest,
        review,
        as_of,
        xlsx,
    } = cmd
    else {
        return Ok(exit_code::SUCCESS);
    };

    let as_of = match as_of {
        Some(s) => parse_date(s).ok_or_else(|| AppError::InvalidDate(s.clone()))?,
        None => today(),
    };

    let output_dir = resolve_output_dir(output_dir.as_deref(), &cfg.output_dir);
    let paths = OutputPaths::new(cfg, &output_dir);
    let catalog = SessionCatalog::load(&paths.mappings, &paths.types)?;

    let command_suggester = CommandSuggester::new(
        cfg.suggester.command.clone(),
        Duration::from_secs(cfg.suggester.timeout_secs),
    );
    let suggester: &dyn SessionNameSuggester =
        if !*no_suggest && (cfg.suggester.enabled || *review) {
            &command_suggester
        } else {
            &NoopSuggester
        };

    let options = RunOptions {
        input_dir: input_dir.clone(),
        output_dir,
        full_refresh: *full_refresh,
        review: *review,
        as_of,
        xlsx: *xlsx,
    };

    if *full_refresh {
        info("Full refresh: every export will be reprocessed.");
    }

    let mut pipeline = Pipeline::new(cfg, catalog, suggester);
    let report = pipeline.run(&options)?;

    print_report(&report);

    if report.is_partial() {
        Ok(exit_code::PARTIAL)
    } else {
        Ok(exit_code::SUCCESS)
    }
}

fn print_report(report: &RunReport) {
    header("Run summary");

    info(format!(
        "{} export(s) found, {} new, {} already processed",
        report.discovered,
        report.processed.len(),
        report.skipped
    ));

    for name in &report.processed {
        success(format!("Processed {name}"));
    }

    for (raw, parsed) in &report.suggested {
        info(format!("Suggested mapping: '{raw}' → '{parsed}'"));
    }

    for w in report.warnings() {
        warning(w);
    }

    if report.superseded > 0 {
        info(format!(
            "{} record(s) already present in an older export were ignored",
            report.superseded
        ));
    }
    if report.future_excluded > 0 {
        info(format!(
            "{} record(s) for sessions not yet held were left out",
            report.future_excluded
        ));
    }

    info(format!(
        "{} attendance row(s), {} session(s)",
        report.detail_rows, report.sessions
    ));
    for failure in &report.failures {
        error(failure);
    }
    if report.is_partial() {
        warning(format!(
            "{} file(s) could not be parsed; they will be retried on the next run",
            report.failures.len()
        ));
    }
}
