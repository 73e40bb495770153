//! Canonical on-disk layout of a dataset.
//!
//! A dataset root holds one directory per split, and every organized split
//! holds an `images/` and a `labels/` directory:
//!
//! ```text
//! <root>/
//!   training/   images/   labels/
//!   validation/ images/   labels/
//!   test/       images/   labels/
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// One of the three fixed dataset partitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Split {
    Training,
    Validation,
    Test,
}

impl Split {
    /// All splits, in processing order.
    pub const ALL: [Split; 3] = [Split::Training, Split::Validation, Split::Test];

    /// Returns the directory name used when no configuration overrides it.
    ///
    /// # Examples
    ///
    /// ```
    /// use dataset_tidy::layout::Split;
    ///
    /// assert_eq!(Split::Training.default_dir_name(), "training");
    /// assert_eq!(Split::Test.default_dir_name(), "test");
    /// ```
    pub fn default_dir_name(&self) -> &'static str {
        match self {
            Split::Training => "training",
            Split::Validation => "validation",
            Split::Test => "test",
        }
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.default_dir_name())
    }
}

/// Sub-classification of the files inside a split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Images,
    Labels,
}

impl Role {
    pub const ALL: [Role; 2] = [Role::Images, Role::Labels];

    /// Returns the subdirectory name for this role. These names are part of
    /// the layout consumed by training tooling and are not configurable.
    pub fn dir_name(&self) -> &'static str {
        match self {
            Role::Images => "images",
            Role::Labels => "labels",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// Directory name of each split under the dataset root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitLayout {
    pub training: String,
    pub validation: String,
    pub test: String,
}

impl SplitLayout {
    pub fn dir_name(&self, split: Split) -> &str {
        match split {
            Split::Training => &self.training,
            Split::Validation => &self.validation,
            Split::Test => &self.test,
        }
    }
}

impl Default for SplitLayout {
    fn default() -> Self {
        Self {
            training: Split::Training.default_dir_name().to_string(),
            validation: Split::Validation.default_dir_name().to_string(),
            test: Split::Test.default_dir_name().to_string(),
        }
    }
}

/// Errors raised while validating a dataset root. Any of these aborts the
/// requested operation before anything on disk is touched.
#[derive(Debug)]
pub enum DatasetError {
    /// The root path does not exist.
    RootNotFound { path: PathBuf },
    /// The root path exists but is not a directory.
    RootNotADirectory { path: PathBuf },
    /// The root path could not be inspected.
    RootUnreadable {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl fmt::Display for DatasetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RootNotFound { path } => {
                write!(f, "O diretório '{}' não foi encontrado.", path.display())
            }
            Self::RootNotADirectory { path } => {
                write!(f, "O caminho '{}' não é um diretório.", path.display())
            }
            Self::RootUnreadable { path, source } => {
                write!(
                    f,
                    "Não foi possível acessar o diretório '{}': {}",
                    path.display(),
                    source
                )
            }
        }
    }
}

impl std::error::Error for DatasetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::RootUnreadable { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// A validated dataset root directory.
#[derive(Debug, Clone)]
pub struct DatasetRoot {
    path: PathBuf,
    resolved: PathBuf,
}

impl DatasetRoot {
    /// Validates that `path` exists and is a directory.
    ///
    /// # Errors
    ///
    /// Returns a [`DatasetError`] when the path is missing, is not a
    /// directory, or cannot be inspected.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let path = path.as_ref();
        let metadata = fs::metadata(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                DatasetError::RootNotFound {
                    path: path.to_path_buf(),
                }
            } else {
                DatasetError::RootUnreadable {
                    path: path.to_path_buf(),
                    source: e,
                }
            }
        })?;

        if !metadata.is_dir() {
            return Err(DatasetError::RootNotADirectory {
                path: path.to_path_buf(),
            });
        }

        let resolved = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());

        Ok(Self {
            path: path.to_path_buf(),
            resolved,
        })
    }

    /// The path as given by the caller.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The absolute, symlink-free path of the root.
    pub fn resolved(&self) -> &Path {
        &self.resolved
    }

    pub fn split_dir(&self, layout: &SplitLayout, split: Split) -> PathBuf {
        self.path.join(layout.dir_name(split))
    }

    pub fn role_dir(&self, layout: &SplitLayout, split: Split, role: Role) -> PathBuf {
        self.split_dir(layout, split).join(role.dir_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_split_order_is_fixed() {
        assert_eq!(
            Split::ALL,
            [Split::Training, Split::Validation, Split::Test]
        );
    }

    #[test]
    fn test_role_dir_names() {
        assert_eq!(Role::Images.dir_name(), "images");
        assert_eq!(Role::Labels.dir_name(), "labels");
    }

    #[test]
    fn test_custom_split_layout() {
        let layout = SplitLayout {
            training: "treino".to_string(),
            validation: "validacao".to_string(),
            test: "teste".to_string(),
        };
        assert_eq!(layout.dir_name(Split::Training), "treino");
        assert_eq!(layout.dir_name(Split::Validation), "validacao");
        assert_eq!(layout.dir_name(Split::Test), "teste");
    }

    #[test]
    fn test_open_existing_root() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = DatasetRoot::open(temp_dir.path()).expect("Root should open");

        assert_eq!(root.path(), temp_dir.path());
        assert!(root.resolved().is_absolute());
        assert_eq!(
            root.role_dir(&SplitLayout::default(), Split::Validation, Role::Labels),
            temp_dir.path().join("validation").join("labels")
        );
    }

    #[test]
    fn test_open_missing_root() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let missing = temp_dir.path().join("nope");

        let result = DatasetRoot::open(&missing);
        assert!(matches!(result, Err(DatasetError::RootNotFound { .. })));
    }

    #[test]
    fn test_open_file_as_root() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let file = temp_dir.path().join("dataset.yaml");
        fs::write(&file, "path: datasets").expect("Failed to write file");

        let result = DatasetRoot::open(&file);
        assert!(matches!(result, Err(DatasetError::RootNotADirectory { .. })));
    }
}
