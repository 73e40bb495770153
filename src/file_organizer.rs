//! Sorting loose split files into the `images/` and `labels/` directories.
//!
//! The organizer only looks at the direct children of a split directory.
//! Subdirectories, including `images/` and `labels/` themselves, are never
//! descended into, so running it on an organized split changes nothing.

use crate::config::DatasetRules;
use crate::layout::{DatasetRoot, Role, Split};
use crate::report::{FileFailure, collect_files, display_name};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// A single file moved into a role directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Operation {
    pub original_path: PathBuf,
    pub new_path: PathBuf,
    pub role: Role,
}

/// Errors that can occur while organizing a split.
#[derive(Debug)]
pub enum OrganizeError {
    /// Failed to create a role directory.
    DirectoryCreationFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to list the split directory.
    ReadDirFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    /// A file with the same name already exists in the role directory.
    DestinationExists { source: PathBuf, destination: PathBuf },
    /// The path has no file name component.
    MissingFileName { path: PathBuf },
    /// Failed to move a file to its role directory.
    FileMoveFailure {
        source: PathBuf,
        destination: PathBuf,
        source_error: std::io::Error,
    },
}

impl std::fmt::Display for OrganizeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DirectoryCreationFailed { path, source } => {
                write!(f, "Falha ao criar a pasta {}: {}", path.display(), source)
            }
            Self::ReadDirFailed { path, source } => {
                write!(f, "Falha ao listar a pasta {}: {}", path.display(), source)
            }
            Self::DestinationExists {
                source,
                destination,
            } => {
                write!(
                    f,
                    "Não foi possível mover {}: {} já existe",
                    source.display(),
                    destination.display()
                )
            }
            Self::MissingFileName { path } => {
                write!(f, "Caminho sem nome de arquivo: {}", path.display())
            }
            Self::FileMoveFailure {
                source,
                destination,
                source_error,
            } => {
                write!(
                    f,
                    "Falha ao mover {} para {}: {}",
                    source.display(),
                    destination.display(),
                    source_error
                )
            }
        }
    }
}

impl std::error::Error for OrganizeError {}

/// Result type for file organization operations.
pub type OrganizeResult<T> = Result<T, OrganizeError>;

/// What happened to one split directory.
#[derive(Debug, Clone, Default, Serialize)]
pub struct OrganizeReport {
    pub split_dir: PathBuf,
    pub moved: Vec<Operation>,
    /// Files left in place because of an exclusion rule.
    pub excluded: Vec<String>,
    pub failures: Vec<FileFailure>,
}

impl OrganizeReport {
    fn new(split_dir: &Path) -> Self {
        Self {
            split_dir: split_dir.to_path_buf(),
            ..Default::default()
        }
    }

    pub fn moved_count(&self, role: Role) -> usize {
        self.moved.iter().filter(|op| op.role == role).count()
    }

    pub fn images_moved(&self) -> usize {
        self.moved_count(Role::Images)
    }

    pub fn labels_moved(&self) -> usize {
        self.moved_count(Role::Labels)
    }
}

/// Outcome for one split of a dataset-wide run.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SplitOrganizeOutcome {
    Organized(OrganizeReport),
    /// The split directory does not exist; skipped.
    Missing,
    /// The split could not be prepared or listed; other splits still ran.
    Failed { reason: String },
}

#[derive(Debug, Serialize)]
pub struct SplitOrganize {
    pub split: Split,
    pub path: PathBuf,
    pub outcome: SplitOrganizeOutcome,
}

/// Report of organizing every split under a dataset root.
#[derive(Debug, Serialize)]
pub struct DatasetOrganizeReport {
    pub root: PathBuf,
    pub started_at: DateTime<Utc>,
    pub splits: Vec<SplitOrganize>,
}

impl DatasetOrganizeReport {
    pub fn total_moved(&self, role: Role) -> usize {
        self.organized().map(|report| report.moved_count(role)).sum()
    }

    pub fn failure_count(&self) -> usize {
        self.organized().map(|report| report.failures.len()).sum()
    }

    /// Splits that were skipped because their directory is missing.
    pub fn missing_splits(&self) -> impl Iterator<Item = &SplitOrganize> {
        self.splits
            .iter()
            .filter(|entry| matches!(entry.outcome, SplitOrganizeOutcome::Missing))
    }

    fn organized(&self) -> impl Iterator<Item = &OrganizeReport> {
        self.splits.iter().filter_map(|entry| match &entry.outcome {
            SplitOrganizeOutcome::Organized(report) => Some(report),
            _ => None,
        })
    }
}

/// Moves dataset files into role subdirectories.
pub struct FileOrganizer;

impl FileOrganizer {
    /// Creates `images/` and `labels/` under the split directory if absent.
    pub fn ensure_role_dirs(split_dir: &Path) -> OrganizeResult<()> {
        for role in Role::ALL {
            let role_dir = split_dir.join(role.dir_name());
            fs::create_dir_all(&role_dir).map_err(|e| OrganizeError::DirectoryCreationFailed {
                path: role_dir.clone(),
                source: e,
            })?;
        }
        Ok(())
    }

    /// Moves a file into the role directory of `split_dir`, keeping its name.
    ///
    /// An existing file at the destination is never overwritten; the move
    /// fails with [`OrganizeError::DestinationExists`] instead. When the role
    /// directory lives on another filesystem the file is copied and the
    /// original removed.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use dataset_tidy::file_organizer::FileOrganizer;
    /// use dataset_tidy::layout::Role;
    /// use std::path::Path;
    ///
    /// let op = FileOrganizer::move_to_role(
    ///     Path::new("datasets/training"),
    ///     Path::new("datasets/training/frame_001.jpg"),
    ///     Role::Images,
    /// );
    /// match op {
    ///     Ok(op) => println!("Moved to {}", op.new_path.display()),
    ///     Err(e) => eprintln!("{}", e),
    /// }
    /// ```
    pub fn move_to_role(split_dir: &Path, file_path: &Path, role: Role) -> OrganizeResult<Operation> {
        let file_name = file_path
            .file_name()
            .ok_or_else(|| OrganizeError::MissingFileName {
                path: file_path.to_path_buf(),
            })?;

        let role_dir = split_dir.join(role.dir_name());
        let destination_path = role_dir.join(file_name);

        if destination_path.symlink_metadata().is_ok() {
            return Err(OrganizeError::DestinationExists {
                source: file_path.to_path_buf(),
                destination: destination_path,
            });
        }

        relocate(file_path, &destination_path).map_err(|e| OrganizeError::FileMoveFailure {
            source: file_path.to_path_buf(),
            destination: destination_path.clone(),
            source_error: e,
        })?;

        log::debug!(
            "moved {} -> {}",
            file_path.display(),
            destination_path.display()
        );

        Ok(Operation {
            original_path: file_path.to_path_buf(),
            new_path: destination_path,
            role,
        })
    }

    /// Organizes the direct children of one split directory.
    ///
    /// The caller checks that `split_dir` exists. Role directories are
    /// created first; a failure there, or in listing the split, is returned
    /// as an error. Failures on individual files are recorded in the report
    /// and the remaining files are still processed.
    pub fn organize_split(split_dir: &Path, rules: &DatasetRules) -> OrganizeResult<OrganizeReport> {
        Self::ensure_role_dirs(split_dir)?;

        let entries = fs::read_dir(split_dir).map_err(|e| OrganizeError::ReadDirFailed {
            path: split_dir.to_path_buf(),
            source: e,
        })?;

        let mut report = OrganizeReport::new(split_dir);
        let files = collect_files(
            split_dir,
            entries.map(|entry| entry.map(|entry| entry.path())),
            &mut report.failures,
        );

        let classifier = rules.classifier();
        for path in files {
            let Some(role) = classifier.classify(&path) else {
                continue;
            };

            if !rules.filters.should_include(&path) {
                log::debug!("excluded by filter: {}", path.display());
                report.excluded.push(display_name(&path));
                continue;
            }

            match Self::move_to_role(split_dir, &path, role) {
                Ok(operation) => report.moved.push(operation),
                Err(e) => {
                    log::warn!("{}", e);
                    report.failures.push(FileFailure::new(&path, e));
                }
            }
        }

        Ok(report)
    }
}

/// Renames `from` to `to`, falling back to copy-then-delete across filesystems.
fn relocate(from: &Path, to: &Path) -> io::Result<()> {
    match fs::rename(from, to) {
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            log::debug!("{} crosses devices, copying instead", from.display());
            copy_then_remove(from, to)
        }
        other => other,
    }
}

fn copy_then_remove(from: &Path, to: &Path) -> io::Result<()> {
    fs::copy(from, to)?;
    if let Err(e) = fs::remove_file(from) {
        // Leave a single copy behind.
        let _ = fs::remove_file(to);
        return Err(e);
    }
    Ok(())
}

/// Organizes every present split under the dataset root, in fixed order.
///
/// Missing split directories are recorded and skipped. A split that cannot be
/// prepared is recorded as failed and the remaining splits still run.
pub fn organize_dataset(root: &DatasetRoot, rules: &DatasetRules) -> DatasetOrganizeReport {
    let started_at = Utc::now();
    let mut splits = Vec::with_capacity(Split::ALL.len());

    for split in Split::ALL {
        let path = root.split_dir(&rules.layout, split);
        let outcome = if !path.is_dir() {
            log::warn!("split directory {} not found, skipping", path.display());
            SplitOrganizeOutcome::Missing
        } else {
            match FileOrganizer::organize_split(&path, rules) {
                Ok(report) => SplitOrganizeOutcome::Organized(report),
                Err(e) => {
                    log::warn!("{}", e);
                    SplitOrganizeOutcome::Failed {
                        reason: e.to_string(),
                    }
                }
            }
        };
        splits.push(SplitOrganize {
            split,
            path,
            outcome,
        });
    }

    DatasetOrganizeReport {
        root: root.resolved().to_path_buf(),
        started_at,
        splits,
    }
}
