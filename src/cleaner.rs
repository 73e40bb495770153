//! Purging generated artifacts from a dataset.
//!
//! Role files are matched only at exactly `<split>/images` and
//! `<split>/labels` depth, while cache artifacts are searched for recursively
//! under the whole root.

use crate::config::DatasetRules;
use crate::confirm::Confirmation;
use crate::file_category::ExtensionSet;
use crate::layout::{DatasetError, DatasetRoot, Role, Split};
use crate::report::{FileFailure, collect_files, display_name};
use chrono::{DateTime, Utc};
use glob::Pattern;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Options for a dataset-wide clear.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClearOptions {
    /// Report what would be deleted without deleting anything.
    pub simulate: bool,
    /// Do not ask for confirmation before a real run.
    pub skip_confirmation: bool,
}

/// Result of clearing one role directory.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RoleClearReport {
    pub directory: PathBuf,
    /// The directory did not exist; nothing was matched.
    pub missing: bool,
    /// Names of files deleted, or that would be deleted when simulating.
    pub matched: Vec<String>,
    pub failures: Vec<FileFailure>,
}

impl RoleClearReport {
    pub fn count(&self) -> usize {
        self.matched.len()
    }
}

/// Result of the recursive cache search.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheClearReport {
    pub root: PathBuf,
    pub matched: Vec<PathBuf>,
    pub failures: Vec<FileFailure>,
}

impl CacheClearReport {
    pub fn count(&self) -> usize {
        self.matched.len()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SplitClearReport {
    pub split: Split,
    pub images: RoleClearReport,
    pub labels: RoleClearReport,
}

impl SplitClearReport {
    pub fn role(&self, role: Role) -> &RoleClearReport {
        match role {
            Role::Images => &self.images,
            Role::Labels => &self.labels,
        }
    }

    pub fn count(&self) -> usize {
        self.images.count() + self.labels.count()
    }
}

/// Report of a completed dataset-wide clear.
#[derive(Debug, Clone, Serialize)]
pub struct ClearReport {
    pub root: PathBuf,
    pub simulate: bool,
    pub started_at: DateTime<Utc>,
    pub splits: Vec<SplitClearReport>,
    pub caches: CacheClearReport,
}

impl ClearReport {
    /// Files deleted, or that would have been deleted when simulating.
    pub fn total(&self) -> usize {
        self.splits.iter().map(SplitClearReport::count).sum::<usize>() + self.caches.count()
    }

    pub fn failure_count(&self) -> usize {
        self.splits
            .iter()
            .map(|s| s.images.failures.len() + s.labels.failures.len())
            .sum::<usize>()
            + self.caches.failures.len()
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ClearOutcome {
    /// The operator declined the confirmation; nothing was deleted.
    Cancelled,
    Completed(ClearReport),
}

pub struct Cleaner;

impl Cleaner {
    /// Deletes the direct file entries of `directory` whose extension is in
    /// `extensions`. A missing directory yields an empty report flagged as
    /// missing.
    pub fn clear_role_files(
        directory: &Path,
        extensions: &ExtensionSet,
        simulate: bool,
    ) -> RoleClearReport {
        let mut report = RoleClearReport {
            directory: directory.to_path_buf(),
            ..Default::default()
        };

        if !directory.is_dir() {
            log::warn!("directory {} not found, skipping", directory.display());
            report.missing = true;
            return report;
        }

        let entries = match fs::read_dir(directory) {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!("could not list {}: {}", directory.display(), e);
                report.failures.push(FileFailure::new(directory, e));
                return report;
            }
        };

        let files = collect_files(
            directory,
            entries.map(|entry| entry.map(|entry| entry.path())),
            &mut report.failures,
        );

        for path in files.into_iter().filter(|path| extensions.matches(path)) {
            match remove_unless_simulating(&path, simulate) {
                Ok(()) => report.matched.push(display_name(&path)),
                Err(failure) => report.failures.push(failure),
            }
        }

        report
    }

    /// Recursively finds every file under `root` whose name ends with
    /// `suffix` and deletes it unless simulating.
    pub fn clear_caches(root: &Path, suffix: &str, simulate: bool) -> CacheClearReport {
        let mut report = CacheClearReport {
            root: root.to_path_buf(),
            ..Default::default()
        };

        let pattern = format!(
            "{}/**/*{}",
            Pattern::escape(&root.to_string_lossy()),
            Pattern::escape(suffix)
        );

        let paths = match glob::glob(&pattern) {
            Ok(paths) => paths,
            Err(e) => {
                log::warn!("invalid cache pattern {}: {}", pattern, e);
                report.failures.push(FileFailure::new(root, e));
                return report;
            }
        };

        let mut caches = Vec::new();
        for entry in paths {
            match entry {
                Ok(path) if path.is_file() => caches.push(path),
                Ok(_) => {}
                Err(e) => {
                    log::warn!("cache search error: {}", e);
                    let failure = FileFailure::new(e.path(), e.error());
                    report.failures.push(failure);
                }
            }
        }

        if caches.is_empty() {
            log::debug!("no cache files found under {}", root.display());
        }

        for path in caches {
            match remove_unless_simulating(&path, simulate) {
                Ok(()) => report.matched.push(path),
                Err(failure) => report.failures.push(failure),
            }
        }

        report
    }

    /// Clears role files of every split, then cache artifacts under the root.
    ///
    /// The root is validated before anything else. Unless simulating or
    /// `skip_confirmation` is set, `confirmation` is asked with the resolved
    /// absolute root and a negative answer cancels the run with no deletions.
    ///
    /// # Errors
    ///
    /// Returns a [`DatasetError`] if the root is missing or not a directory.
    pub fn clear_dataset(
        root: &Path,
        options: ClearOptions,
        rules: &DatasetRules,
        confirmation: &mut dyn Confirmation,
    ) -> Result<ClearOutcome, DatasetError> {
        let root = DatasetRoot::open(root)?;

        if !options.simulate && !options.skip_confirmation && !confirmation.confirm(root.resolved())
        {
            log::debug!("clear of {} cancelled by operator", root.resolved().display());
            return Ok(ClearOutcome::Cancelled);
        }

        let started_at = Utc::now();
        let splits = Split::ALL
            .into_iter()
            .map(|split| SplitClearReport {
                split,
                images: Self::clear_role_files(
                    &root.role_dir(&rules.layout, split, Role::Images),
                    &rules.clear_images,
                    options.simulate,
                ),
                labels: Self::clear_role_files(
                    &root.role_dir(&rules.layout, split, Role::Labels),
                    &rules.labels,
                    options.simulate,
                ),
            })
            .collect();

        let caches = Self::clear_caches(root.path(), &rules.cache_suffix, options.simulate);

        Ok(ClearOutcome::Completed(ClearReport {
            root: root.resolved().to_path_buf(),
            simulate: options.simulate,
            started_at,
            splits,
            caches,
        }))
    }
}

fn remove_unless_simulating(path: &Path, simulate: bool) -> Result<(), FileFailure> {
    if simulate {
        log::debug!("would delete {}", path.display());
        return Ok(());
    }

    fs::remove_file(path).map_err(|e| {
        log::warn!("failed to delete {}: {}", path.display(), e);
        FileFailure::new(path, e)
    })?;
    log::debug!("deleted {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::confirm::FixedConfirmation;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, b"x").unwrap();
    }

    #[test]
    fn test_clear_role_files_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let report = Cleaner::clear_role_files(
            &temp_dir.path().join("images"),
            &ExtensionSet::default_images(),
            false,
        );

        assert!(report.missing);
        assert_eq!(report.count(), 0);
        assert!(report.failures.is_empty());
    }

    #[test]
    fn test_clear_role_files_matches_extensions_only() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        for name in ["a.jpg", "b.PNG", "c.txt", "d.webp"] {
            touch(&dir.join(name));
        }
        touch(&dir.join("nested").join("e.jpg"));

        let report = Cleaner::clear_role_files(dir, &ExtensionSet::default_images(), false);

        assert_eq!(report.matched, vec!["a.jpg".to_string(), "b.PNG".to_string()]);
        assert!(!dir.join("a.jpg").exists());
        assert!(!dir.join("b.PNG").exists());
        assert!(dir.join("c.txt").exists());
        assert!(dir.join("d.webp").exists());
        assert!(dir.join("nested").join("e.jpg").exists());
    }

    #[test]
    fn test_clear_role_files_simulate_keeps_files() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        touch(&dir.join("a.txt"));
        touch(&dir.join("b.txt"));

        let report = Cleaner::clear_role_files(dir, &ExtensionSet::default_labels(), true);

        assert_eq!(report.count(), 2);
        assert!(dir.join("a.txt").exists());
        assert!(dir.join("b.txt").exists());
    }

    #[test]
    fn test_clear_caches_is_recursive() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        touch(&root.join("labels.cache"));
        touch(&root.join("training").join("labels").join("deep").join("x.cache"));
        touch(&root.join("training").join("labels").join("keep.txt"));

        let report = Cleaner::clear_caches(root, ".cache", false);

        assert_eq!(report.count(), 2);
        assert!(!root.join("labels.cache").exists());
        assert!(
            !root
                .join("training")
                .join("labels")
                .join("deep")
                .join("x.cache")
                .exists()
        );
        assert!(root.join("training").join("labels").join("keep.txt").exists());
    }

    #[test]
    fn test_clear_caches_ignores_directories_named_like_caches() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir(root.join("dir.cache")).unwrap();

        let report = Cleaner::clear_caches(root, ".cache", false);

        assert_eq!(report.count(), 0);
        assert!(root.join("dir.cache").is_dir());
    }

    #[test]
    fn test_clear_dataset_declined_deletes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        touch(&root.join("training").join("images").join("a.jpg"));

        let mut confirmation = FixedConfirmation::decline();
        let outcome = Cleaner::clear_dataset(
            root,
            ClearOptions::default(),
            &DatasetRules::default(),
            &mut confirmation,
        )
        .unwrap();

        assert!(matches!(outcome, ClearOutcome::Cancelled));
        assert_eq!(confirmation.asked().len(), 1);
        assert!(confirmation.asked()[0].is_absolute());
        assert!(root.join("training").join("images").join("a.jpg").exists());
    }

    #[test]
    fn test_clear_dataset_simulate_never_asks() {
        let temp_dir = TempDir::new().unwrap();
        let mut confirmation = FixedConfirmation::decline();

        let outcome = Cleaner::clear_dataset(
            temp_dir.path(),
            ClearOptions {
                simulate: true,
                skip_confirmation: false,
            },
            &DatasetRules::default(),
            &mut confirmation,
        )
        .unwrap();

        assert!(confirmation.asked().is_empty());
        match outcome {
            ClearOutcome::Completed(report) => {
                assert!(report.simulate);
                assert_eq!(report.total(), 0);
            }
            ClearOutcome::Cancelled => panic!("simulate run should not be cancelled"),
        }
    }

    #[test]
    fn test_clear_dataset_missing_root_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let mut confirmation = FixedConfirmation::accept();

        let result = Cleaner::clear_dataset(
            &temp_dir.path().join("missing"),
            ClearOptions::default(),
            &DatasetRules::default(),
            &mut confirmation,
        );

        assert!(matches!(result, Err(DatasetError::RootNotFound { .. })));
        assert!(confirmation.asked().is_empty());
    }
}
