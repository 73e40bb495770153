//! Records shared by the organizer and cleaner reports.

use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};

/// A single file that could not be moved or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileFailure {
    pub path: PathBuf,
    pub reason: String,
}

impl FileFailure {
    pub fn new(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

/// Returns the final component of a path for display, falling back to the
/// whole path when it has none.
pub(crate) fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// Collects the regular files among the listed entries of `directory`, sorted.
///
/// Entries that cannot be read are recorded in `failures` against the
/// directory and skipped.
pub(crate) fn collect_files<I>(
    directory: &Path,
    entries: I,
    failures: &mut Vec<FileFailure>,
) -> Vec<PathBuf>
where
    I: IntoIterator<Item = io::Result<PathBuf>>,
{
    let mut files = Vec::new();
    for entry in entries {
        match entry {
            Ok(path) if path.is_file() => files.push(path),
            Ok(_) => {}
            Err(e) => {
                log::warn!("could not read entry in {}: {}", directory.display(), e);
                failures.push(FileFailure::new(directory, e));
            }
        }
    }
    files.sort();
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_collect_files_records_unreadable_entries() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        fs::write(dir.join("b.txt"), "b").unwrap();
        fs::write(dir.join("a.txt"), "a").unwrap();
        fs::create_dir(dir.join("sub")).unwrap();

        let entries = vec![
            Ok(dir.join("b.txt")),
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied")),
            Ok(dir.join("sub")),
            Ok(dir.join("a.txt")),
        ];
        let mut failures = Vec::new();

        let files = collect_files(dir, entries, &mut failures);

        assert_eq!(files, vec![dir.join("a.txt"), dir.join("b.txt")]);
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].path, dir);
        assert!(failures[0].reason.contains("denied"));
    }

    #[test]
    fn test_display_name_uses_last_component() {
        assert_eq!(display_name(Path::new("a/b/frame.jpg")), "frame.jpg");
        assert_eq!(display_name(Path::new("/")), "/");
    }
}
