//! Path utilities: expand ~ and resolve the output directory.

use std::path::{Path, PathBuf};

pub fn expand_tilde(path: &str) -> PathBuf {
    if path.starts_with("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(path.trim_start_matches("~/"));
    }
    PathBuf::from(path)
}

/// Output directory: CLI override first, then the configured value.
pub fn output_dir(cli_override: Option<&Path>, configured: &str) -> PathBuf {
    match cli_override {
        Some(p) => p.to_path_buf(),
        None => expand_tilde(configured),
    }
}
