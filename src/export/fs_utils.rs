// src/export/fs_utils.rs

use crate::errors::{AppError, AppResult};
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Sibling temporary path: `dir/.name.tmp`.
fn temp_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(".");
    name.push(path.file_name().unwrap_or_default());
    name.push(".tmp");
    path.with_file_name(name)
}

/// Write `path` through a sibling temporary file renamed into place, so a
/// reader never sees a half-written output.
///
/// Any failure is reported as [`AppError::OutputWrite`] and the temporary
/// file is removed.
pub(crate) fn write_atomically<F>(path: &Path, write: F) -> AppResult<()>
where
    F: FnOnce(&mut dyn Write) -> io::Result<()>,
{
    let tmp = temp_path(path);

    let result = (|| -> io::Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let mut out = BufWriter::new(File::create(&tmp)?);
        write(&mut out)?;
        let file = out.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()?;
        drop(file);

        fs::rename(&tmp, path)
    })();

    result.map_err(|source| {
        let _ = fs::remove_file(&tmp);
        AppError::OutputWrite {
            path: path.to_path_buf(),
            source,
        }
    })
}
