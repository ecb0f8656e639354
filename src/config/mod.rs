use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// How merge precedence between input files is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Precedence {
    /// Month/year embedded in the file name.
    #[default]
    Filename,
    /// File modification time.
    Modified,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggesterConfig {
    /// Off by default: unmapped labels are only reported.
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_suggester_command")]
    pub command: String,
    #[serde(default = "default_suggester_timeout")]
    pub timeout_secs: u64,
}

impl Default for SuggesterConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            command: default_suggester_command(),
            timeout_secs: default_suggester_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    #[serde(default = "default_detail_file")]
    pub detail_file: String,
    #[serde(default = "default_summary_file")]
    pub summary_file: String,
    #[serde(default = "default_report_file")]
    pub report_file: String,
    #[serde(default = "default_state_file")]
    pub state_file: String,
    #[serde(default = "default_mappings_file")]
    pub mappings_file: String,
    #[serde(default = "default_types_file")]
    pub types_file: String,
    #[serde(default = "default_file_pattern")]
    pub file_pattern: String,
    #[serde(default)]
    pub precedence: Precedence,
    #[serde(default = "default_true")]
    pub exclude_future_sessions: bool,
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub suggester: SuggesterConfig,
}

fn default_output_dir() -> String {
    "output_data".to_string()
}
fn default_detail_file() -> String {
    "spond.csv".to_string()
}
fn default_summary_file() -> String {
    "session_attendance.csv".to_string()
}
fn default_report_file() -> String {
    "attendance_report.xlsx".to_string()
}
fn default_state_file() -> String {
    ".spond_state.sqlite".to_string()
}
fn default_mappings_file() -> String {
    "session_name_mappings.csv".to_string()
}
fn default_types_file() -> String {
    "session_types.csv".to_string()
}
fn default_file_pattern() -> String {
    r"(?i)^spond_attendance_([a-z]+)_(\d{2})\.xlsx$".to_string()
}
fn default_true() -> bool {
    true
}
fn default_delimiter() -> char {
    ','
}
fn default_log_level() -> String {
    "warn".to_string()
}
fn default_suggester_command() -> String {
    "claude".to_string()
}
fn default_suggester_timeout() -> u64 {
    60
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            detail_file: default_detail_file(),
            summary_file: default_summary_file(),
            report_file: default_report_file(),
            state_file: default_state_file(),
            mappings_file: default_mappings_file(),
            types_file: default_types_file(),
            file_pattern: default_file_pattern(),
            precedence: Precedence::default(),
            exclude_future_sessions: default_true(),
            delimiter: default_delimiter(),
            log_level: default_log_level(),
            suggester: SuggesterConfig::default(),
        }
    }
}

impl Config {
    /// Return the standard configuration directory depending on the platform
    pub fn config_dir() -> PathBuf {
        if cfg!(target_os = "windows") {
            let appdata = env::var("APPDATA").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(appdata).join("spond-attendance")
        } else {
            let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
            home.join(".spond-attendance")
        }
    }

    /// Return the full path of the default config file
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("spond-attendance.conf")
    }

    /// Load configuration.
    ///
    /// - `Some(path)`: the file must exist.
    /// - `None`: the default config file, or built-in defaults when absent.
    pub fn load(custom: Option<&Path>) -> AppResult<Self> {
        let path = match custom {
            Some(p) if !p.exists() => {
                return Err(AppError::Config(format!(
                    "configuration file not found: {}",
                    p.display()
                )));
            }
            Some(p) => p.to_path_buf(),
            None => Self::config_file(),
        };

        if !path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(&path)?;
        if content.trim().is_empty() {
            return Ok(Config::default());
        }

        let cfg: Config = serde_yaml::from_str(&content)?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> AppResult<()> {
        if !self.delimiter.is_ascii() || self.delimiter == '\n' || self.delimiter == '"' {
            return Err(AppError::Config(format!(
                "delimiter must be a single ASCII character other than newline or quote, got {:?}",
                self.delimiter
            )));
        }
        regex::Regex::new(&self.file_pattern)
            .map_err(|e| AppError::Config(format!("invalid file_pattern: {e}")))?;
        Ok(())
    }

    /// Resolve a configured file name against the output directory.
    /// Absolute paths are kept as they are.
    pub fn resolve(output_dir: &Path, name: &str) -> PathBuf {
        let p = crate::utils::path::expand_tilde(name);
        if p.is_absolute() { p } else { output_dir.join(p) }
    }

    /// Field delimiter as a byte; `validate` guarantees it is ASCII.
    pub fn delimiter_byte(&self) -> u8 {
        if self.delimiter.is_ascii() {
            self.delimiter as u8
        } else {
            b','
        }
    }

    pub fn to_yaml(&self) -> AppResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}
