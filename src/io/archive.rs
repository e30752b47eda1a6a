//! Upload unpacking into a request-scoped workspace.
//!
//! A `Workspace` owns a uniquely named temporary directory. Dropping it (on
//! success, on `?` early returns, or while unwinding) removes everything the
//! request wrote, so concurrent and failed requests never leak files.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use zip::ZipArchive;

use crate::error::AppError;

/// Extensions (lowercase) treated as spreadsheets.
pub const SPREADSHEET_EXTENSIONS: [&str; 5] = ["xlsx", "xlsm", "xls", "ods", "csv"];

const UPLOAD_FILE: &str = "upload.zip";
const CONTENTS_DIR: &str = "contents";

/// Temporary directory holding one request's archive and its contents.
#[derive(Debug)]
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    /// Create a fresh workspace, under `root` if given.
    pub fn create(root: Option<&Path>) -> Result<Self, AppError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("kpif-");
        let dir = match root {
            Some(root) => {
                fs::create_dir_all(root).map_err(|e| {
                    AppError::pipeline(format!("failed to create workspace root '{}': {e}", root.display()))
                })?;
                builder.tempdir_in(root)
            }
            None => builder.tempdir(),
        }
        .map_err(|e| AppError::pipeline(format!("failed to create workspace: {e}")))?;

        tracing::debug!(path = %dir.path().display(), "workspace created");
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Directory the archive is extracted into.
    pub fn contents_dir(&self) -> PathBuf {
        self.dir.path().join(CONTENTS_DIR)
    }

    /// Remove the workspace now and report cleanup failures.
    ///
    /// Dropping the workspace also removes it, silently.
    pub fn close(self) -> std::io::Result<()> {
        let path = self.dir.path().to_path_buf();
        self.dir.close()?;
        tracing::debug!(path = %path.display(), "workspace removed");
        Ok(())
    }
}

/// Write the archive into the workspace, extract it, and list spreadsheets.
pub fn unpack_archive(bytes: &[u8], workspace: &Workspace) -> Result<Vec<PathBuf>, AppError> {
    if bytes.is_empty() {
        return Err(AppError::input("No archive uploaded (empty upload)"));
    }

    let upload_path = workspace.path().join(UPLOAD_FILE);
    fs::write(&upload_path, bytes)
        .map_err(|e| AppError::pipeline(format!("failed to store upload: {e}")))?;

    let file = File::open(&upload_path)
        .map_err(|e| AppError::pipeline(format!("failed to reopen upload: {e}")))?;
    let mut archive = ZipArchive::new(file).map_err(|e| AppError::input(format!("Invalid archive: {e}")))?;

    let contents = workspace.contents_dir();
    fs::create_dir_all(&contents)
        .map_err(|e| AppError::pipeline(format!("failed to create extraction directory: {e}")))?;

    // `extract` rejects entries whose paths escape the target directory.
    archive
        .extract(&contents)
        .map_err(|e| AppError::input(format!("Invalid archive: {e}")))?;

    let files = find_spreadsheets(&contents)?;
    tracing::info!(entries = archive.len(), spreadsheets = files.len(), "archive extracted");

    if files.is_empty() {
        return Err(AppError::input("No spreadsheet files found in archive"));
    }
    Ok(files)
}

/// Recursively list spreadsheet files under `root`, sorted by path.
pub fn find_spreadsheets(root: &Path) -> Result<Vec<PathBuf>, AppError> {
    let mut out = Vec::new();
    collect_spreadsheets(root, &mut out)?;
    out.sort();
    Ok(out)
}

fn collect_spreadsheets(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), AppError> {
    let entries = fs::read_dir(dir)
        .map_err(|e| AppError::pipeline(format!("failed to list '{}': {e}", dir.display())))?;

    for entry in entries {
        let entry = entry.map_err(|e| AppError::pipeline(format!("failed to list '{}': {e}", dir.display())))?;
        let path = entry.path();
        let file_type = entry
            .file_type()
            .map_err(|e| AppError::pipeline(format!("failed to stat '{}': {e}", path.display())))?;

        if file_type.is_dir() {
            collect_spreadsheets(&path, out)?;
        } else if file_type.is_file() && is_spreadsheet(&path) {
            out.push(path);
        }
    }
    Ok(())
}

/// Case-insensitive extension check.
pub fn is_spreadsheet(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            SPREADSHEET_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}
