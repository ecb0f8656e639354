//! One processing run: discover, parse, persist, map, merge, aggregate, write.

use crate::config::Config;
use crate::core::aggregate::summarize;
use crate::core::merge::{MergeConflict, SourceBatch, merge_oldest_wins};
use crate::db::{StateTracker, StoredBatch};
use crate::db::log::{OP_PROCESS, write_log};
use crate::errors::{AppError, AppResult, FileError, SuggestError};
use crate::export::{write_detail_csv, write_report_xlsx, write_summary_csv};
use crate::ingest::{ParsedFile, discover_files, find_new_files, parse_file};
use crate::mapping::{SessionCatalog, SessionNameSuggester, review_suggestions};
use crate::models::{AttendanceRecord, SessionDefinition, SourceFile};
use crate::utils::date::today;
use chrono::{Datelike, NaiveDate};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Forget the processed-file state before this run.
    pub full_refresh: bool,
    /// Ask the user to confirm suggestions and persist the approved ones.
    pub review: bool,
    /// Sessions on or after this date are left out of the outputs.
    pub as_of: NaiveDate,
    /// Also write the XLSX report.
    pub xlsx: bool,
}

impl RunOptions {
    pub fn new(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            full_refresh: false,
            review: false,
            as_of: today(),
            xlsx: false,
        }
    }
}

/// Where a run reads and writes its files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub detail: PathBuf,
    pub summary: PathBuf,
    pub report: PathBuf,
    pub state: PathBuf,
    pub mappings: PathBuf,
    pub types: PathBuf,
}

impl OutputPaths {
    pub fn new(cfg: &Config, output_dir: &Path) -> Self {
        Self {
            detail: Config::resolve(output_dir, &cfg.detail_file),
            summary: Config::resolve(output_dir, &cfg.summary_file),
            report: Config::resolve(output_dir, &cfg.report_file),
            state: Config::resolve(output_dir, &cfg.state_file),
            mappings: Config::resolve(output_dir, &cfg.mappings_file),
            types: Config::resolve(output_dir, &cfg.types_file),
        }
    }
}

/// Non-fatal findings of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunWarning {
    UnmappedSession(String),
    Uncategorized(String),
    SuggestionService(SuggestError),
    Conflict(MergeConflict),
}

impl fmt::Display for RunWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunWarning::UnmappedSession(label) => {
                write!(f, "UnmappedSessionWarning: '{label}' has no mapping; kept as is")
            }
            RunWarning::Uncategorized(name) => write!(f, "Session '{name}' has no category"),
            RunWarning::SuggestionService(e) => write!(f, "{e}"),
            RunWarning::Conflict(c) => write!(f, "Conflicting attendance: {c}"),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RunReport {
    /// Input files found in the input directory.
    pub discovered: usize,
    /// Files parsed and recorded by this run.
    pub processed: Vec<String>,
    /// Files already recorded by an earlier run.
    pub skipped: usize,
    pub failures: Vec<FileError>,
    /// Mappings proposed by the suggester and used for this run.
    pub suggested: BTreeMap<String, String>,
    pub unmapped: BTreeSet<String>,
    pub uncategorized: BTreeSet<String>,
    pub suggestion_errors: Vec<SuggestError>,
    pub conflicts: Vec<MergeConflict>,
    /// Records dropped because a previous export already had the key.
    pub superseded: usize,
    /// Records dropped because the session is not in the past.
    pub future_excluded: usize,
    pub detail_rows: usize,
    pub sessions: usize,
    pub outputs: Vec<PathBuf>,
}

impl RunReport {
    /// Outputs were written but some files failed.
    pub fn is_partial(&self) -> bool {
        !self.failures.is_empty()
    }

    pub fn warnings(&self) -> Vec<RunWarning> {
        let mut out: Vec<RunWarning> = self
            .unmapped
            .iter()
            .cloned()
            .map(RunWarning::UnmappedSession)
            .collect();
        out.extend(self.uncategorized.iter().cloned().map(RunWarning::Uncategorized));
        out.extend(
            self.suggestion_errors
                .iter()
                .cloned()
                .map(RunWarning::SuggestionService),
        );
        out.extend(self.conflicts.iter().cloned().map(RunWarning::Conflict));
        out
    }
}

pub struct Pipeline<'a> {
    cfg: &'a Config,
    catalog: SessionCatalog,
    suggester: &'a dyn SessionNameSuggester,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        cfg: &'a Config,
        catalog: SessionCatalog,
        suggester: &'a dyn SessionNameSuggester,
    ) -> Self {
        Self {
            cfg,
            catalog,
            suggester,
        }
    }

    pub fn run(&mut self, opts: &RunOptions) -> AppResult<RunReport> {
        let paths = OutputPaths::new(self.cfg, &opts.output_dir);
        let mut report = RunReport::default();

        let files = discover_files(&opts.input_dir, self.cfg)?;
        if files.is_empty() {
            return Err(AppError::NoInputFiles(opts.input_dir.clone()));
        }
        report.discovered = files.len();

        let mut tracker = StateTracker::open(&paths.state)?;
        let already = if opts.full_refresh {
            BTreeSet::new()
        } else {
            tracker.load()?
        };

        let pending = find_new_files(&files, &already);
        report.skipped = files.len() - pending.len();
        info!(
            discovered = files.len(),
            pending = pending.len(),
            full_refresh = opts.full_refresh,
            "starting run"
        );

        let parsed = parse_pending(&pending, &mut report.failures);

        if !pending.is_empty() && parsed.is_empty() {
            return Err(AppError::NoFilesParsed(std::mem::take(&mut report.failures)));
        }

        if opts.full_refresh {
            tracker.reset()?;
        }
        for (source, file) in &parsed {
            tracker.record(source, &file.records)?;
            report.processed.push(source.file_name().to_string());
        }

        let stored = tracker.load_batches()?;
        if stored.is_empty() {
            return Err(AppError::NoFilesParsed(std::mem::take(&mut report.failures)));
        }

        let labels: BTreeSet<String> = stored
            .iter()
            .flat_map(|b| b.records.iter().map(|r| r.raw_label.clone()))
            .collect();

        self.apply_name_suggestions(&labels, opts, &paths, &mut report)?;
        self.apply_category_suggestions(&labels, opts, &paths, &mut report)?;

        let definitions: Vec<SessionDefinition> = distinct_sessions(&stored)
            .into_iter()
            .map(|def| self.catalog.canonicalize(def))
            .collect();

        // Skipped labels were acknowledged on purpose.
        report.uncategorized = definitions
            .iter()
            .filter(|d| d.category.is_none() && !self.catalog.is_skipped(&d.raw_label))
            .map(|d| d.canonical_name.clone())
            .collect();

        let batches: Vec<SourceBatch> = stored
            .into_iter()
            .map(|b| SourceBatch {
                records: b
                    .records
                    .into_iter()
                    .map(|r| {
                        AttendanceRecord::new(
                            r.member,
                            self.catalog.canonical_name(&r.raw_label),
                            r.session_date,
                            r.attended,
                            b.source.clone(),
                        )
                    })
                    .collect(),
                source: b.source,
            })
            .collect();

        let outcome = merge_oldest_wins(batches);
        report.conflicts = outcome.conflicts;
        report.superseded = outcome.superseded;

        let merged = outcome.records.len();
        let records: Vec<AttendanceRecord> = if self.cfg.exclude_future_sessions {
            outcome
                .records
                .into_iter()
                .filter(|r| r.session_date < opts.as_of)
                .collect()
        } else {
            outcome.records
        };
        report.future_excluded = merged - records.len();

        let summaries = summarize(&records);
        report.detail_rows = records.len();
        report.sessions = summaries.len();

        let delimiter = self.cfg.delimiter_byte();
        write_detail_csv(&paths.detail, &records, delimiter)?;
        write_summary_csv(&paths.summary, &summaries, delimiter)?;
        report.outputs.push(paths.detail.clone());
        report.outputs.push(paths.summary.clone());

        if opts.xlsx {
            write_report_xlsx(&paths.report, &records, &summaries, &definitions)?;
            report.outputs.push(paths.report.clone());
        }

        write_log(
            tracker.conn(),
            OP_PROCESS,
            &opts.input_dir.display().to_string(),
            &format!(
                "{} new file(s), {} failed, {} rows, {} sessions",
                report.processed.len(),
                report.failures.len(),
                report.detail_rows,
                report.sessions
            ),
        )?;

        Ok(report)
    }

    fn apply_name_suggestions(
        &mut self,
        labels: &BTreeSet<String>,
        opts: &RunOptions,
        paths: &OutputPaths,
        report: &mut RunReport,
    ) -> AppResult<()> {
        let unmapped = self.catalog.find_unmapped(labels.iter().map(String::as_str));

        if !unmapped.is_empty() && self.suggester.is_enabled() {
            match self
                .suggester
                .suggest_names(&unmapped, &self.catalog.canonical_names())
            {
                Ok(suggestions) => {
                    let suggestions = keep_relevant(suggestions, &unmapped);

                    if opts.review && !suggestions.is_empty() {
                        let outcome = review_suggestions(
                            &suggestions,
                            &mut io::stdin().lock(),
                            &mut io::stdout(),
                        )?;

                        let mut changed = false;
                        for (raw, parsed) in &outcome.approved {
                            changed |= self.catalog.add_mapping(raw, parsed);
                        }
                        for raw in &outcome.skipped {
                            changed |= self.catalog.skip(raw);
                        }
                        if changed {
                            self.catalog.save_mappings(&paths.mappings)?;
                        }
                        report.suggested = outcome.approved;
                    } else {
                        for (raw, parsed) in &suggestions {
                            self.catalog.add_mapping(raw, parsed);
                        }
                        report.suggested = suggestions;
                    }
                }
                Err(e) => {
                    info!("{e}");
                    report.suggestion_errors.push(e);
                }
            }
        }

        report.unmapped = self.catalog.find_unmapped(labels.iter().map(String::as_str));
        for label in &report.unmapped {
            info!(label = %label, "unmapped session label");
        }
        Ok(())
    }

    fn apply_category_suggestions(
        &mut self,
        labels: &BTreeSet<String>,
        opts: &RunOptions,
        paths: &OutputPaths,
        report: &mut RunReport,
    ) -> AppResult<()> {
        let uncategorized = self
            .catalog
            .find_uncategorized(labels.iter().map(String::as_str));

        // Categories only make sense once there is a set to choose from.
        if !uncategorized.is_empty()
            && self.suggester.is_enabled()
            && !self.catalog.categories().is_empty()
        {
            match self
                .suggester
                .suggest_categories(&uncategorized, self.catalog.categories())
            {
                Ok(suggestions) => {
                    let suggestions = keep_relevant(suggestions, &uncategorized);

                    let accepted = if opts.review && !suggestions.is_empty() {
                        review_suggestions(&suggestions, &mut io::stdin().lock(), &mut io::stdout())?
                            .approved
                    } else {
                        suggestions
                    };

                    let mut changed = false;
                    for (name, category) in &accepted {
                        changed |= self.catalog.add_category(name, category);
                    }
                    if opts.review && changed {
                        self.catalog.save_types(&paths.types)?;
                    }
                }
                Err(e) => {
                    info!("{e}");
                    report.suggestion_errors.push(e);
                }
            }
        }

        Ok(())
    }
}

/// Parse every pending file, collecting failures instead of stopping.
fn parse_pending(pending: &[SourceFile], failures: &mut Vec<FileError>) -> Vec<(SourceFile, ParsedFile)> {
    let mut parsed = Vec::with_capacity(pending.len());

    for source in pending {
        match parse_file(source) {
            Ok(file) => {
                debug!(
                    file = source.file_name(),
                    members = file.member_count(),
                    sessions = file.sessions.len(),
                    "file parsed"
                );
                parsed.push((source.clone(), file));
            }
            Err(e) => {
                info!("{e}");
                failures.push(e);
            }
        }
    }

    parsed
}

/// One definition per distinct (raw label, date) among the stored records.
fn distinct_sessions(stored: &[StoredBatch]) -> Vec<SessionDefinition> {
    let seen: BTreeSet<(&str, NaiveDate)> = stored
        .iter()
        .flat_map(|b| b.records.iter())
        .map(|r| (r.raw_label.as_str(), r.session_date))
        .collect();

    seen.into_iter()
        .map(|(label, date)| SessionDefinition::unresolved(label, date, date.weekday()))
        .collect()
}

/// Drop answers for keys that were not asked about, and empty values.
fn keep_relevant(
    suggestions: BTreeMap<String, String>,
    asked: &BTreeSet<String>,
) -> BTreeMap<String, String> {
    suggestions
        .into_iter()
        .map(|(k, v)| (k, v.trim().to_string()))
        .filter(|(k, v)| asked.contains(k) && !v.is_empty())
        .collect()
}
