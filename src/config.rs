//! Dataset layout, extension and filtering configuration.
//!
//! Configuration is optional: every field has a built-in default that matches
//! the canonical layout. A TOML file can rename the split directories, change
//! the extension sets and protect files from the organizer.
//!
//! # Configuration File Format
//!
//! ```toml
//! [dataset.splits]
//! training = "treino"
//! validation = "validacao"
//! test = "teste"
//!
//! [extensions]
//! images = ["jpg", "jpeg", "png"]
//! clear_images = ["jpg", "jpeg", "png", "bmp", "webp"]
//! labels = ["txt"]
//! cache_suffix = ".cache"
//!
//! [filters.exclude]
//! filenames = ["classes.txt"]
//! patterns = ["*_backup.*"]
//! regex = []
//! ```

use crate::file_category::{
    CACHE_SUFFIX, CLEARABLE_IMAGE_EXTENSIONS, ExtensionSet, IMAGE_EXTENSIONS, LABEL_EXTENSIONS,
    RoleClassifier,
};
use crate::layout::{Split, SplitLayout};
use glob::Pattern;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the per-project configuration file looked up in the current directory.
pub const LOCAL_CONFIG_FILE: &str = ".datasettidy.toml";

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// Configuration file not found at the specified path.
    ConfigNotFound(PathBuf),
    /// Invalid TOML syntax or structure.
    ConfigInvalid(String),
    /// Invalid glob pattern provided.
    InvalidGlobPattern(String),
    /// Invalid regex pattern provided with the actual error reason.
    InvalidRegexPattern { pattern: String, reason: String },
    /// An extension list resolved to no usable extension.
    EmptyExtensionSet(&'static str),
    /// The cache suffix is empty or contains a path separator.
    InvalidCacheSuffix(String),
    /// A split directory name is empty, contains a separator or is reused.
    InvalidSplitName { split: Split, name: String },
    /// IO error while reading configuration.
    IoError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ConfigNotFound(path) => {
                write!(f, "Arquivo de configuração não encontrado: {}", path.display())
            }
            ConfigError::ConfigInvalid(msg) => write!(f, "Configuração inválida: {}", msg),
            ConfigError::InvalidGlobPattern(pattern) => {
                write!(f, "Padrão glob inválido '{}'", pattern)
            }
            ConfigError::InvalidRegexPattern { pattern, reason } => {
                write!(f, "Expressão regular inválida '{}': {}", pattern, reason)
            }
            ConfigError::EmptyExtensionSet(field) => {
                write!(f, "A lista de extensões '{}' não pode ser vazia", field)
            }
            ConfigError::InvalidCacheSuffix(suffix) => {
                write!(f, "Sufixo de cache inválido '{}'", suffix)
            }
            ConfigError::InvalidSplitName { split, name } => {
                write!(f, "Nome de pasta inválido para '{}': '{}'", split, name)
            }
            ConfigError::IoError(msg) => write!(f, "Erro ao ler configuração: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Root of the TOML configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TidyConfig {
    #[serde(default)]
    pub dataset: DatasetSection,

    #[serde(default)]
    pub extensions: ExtensionRules,

    #[serde(default)]
    pub filters: FilterRules,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatasetSection {
    /// Directory name of each split under the dataset root.
    #[serde(default)]
    pub splits: SplitLayout,
}

/// Extension lists per role, written with or without the leading dot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtensionRules {
    /// Extensions the organizer moves into `images/`.
    pub images: Vec<String>,
    /// Extensions the cleaner deletes from `images/`.
    pub clear_images: Vec<String>,
    /// Extensions moved into and deleted from `labels/`.
    pub labels: Vec<String>,
    /// File name suffix of cache artifacts, searched recursively.
    pub cache_suffix: String,
}

impl Default for ExtensionRules {
    fn default() -> Self {
        Self {
            images: to_strings(IMAGE_EXTENSIONS),
            clear_images: to_strings(CLEARABLE_IMAGE_EXTENSIONS),
            labels: to_strings(LABEL_EXTENSIONS),
            cache_suffix: CACHE_SUFFIX.to_string(),
        }
    }
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

/// Opt-in organizer exclusions. Empty by default, in which case every file
/// with a known extension is moved.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterRules {
    /// Files matching these rules are left in place by the organizer.
    #[serde(default)]
    pub exclude: ExcludeRules,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExcludeRules {
    /// Exact filenames to leave alone (e.g., "classes.txt").
    #[serde(default)]
    pub filenames: Vec<String>,

    /// Glob patterns, matched against the file name and the full path.
    #[serde(default)]
    pub patterns: Vec<String>,

    /// Regex patterns, matched against the file name.
    #[serde(default)]
    pub regex: Vec<String>,
}

impl TidyConfig {
    /// Load configuration from a file, with fallback to defaults.
    ///
    /// Attempts to load configuration in the following order:
    /// 1. If `config_path` is provided, load from that file
    /// 2. Look for `.datasettidy.toml` in the current directory
    /// 3. Look for `~/.config/dataset-tidy/config.toml` in home directory
    /// 4. Fall back to default configuration
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration file is explicitly provided but
    /// cannot be read, or if any discovered file fails to parse.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        let local_config = PathBuf::from(LOCAL_CONFIG_FILE);
        if local_config.exists() {
            return Self::load_from_file(&local_config);
        }

        if let Ok(home) = std::env::var("HOME") {
            let home_config = PathBuf::from(home)
                .join(".config")
                .join("dataset-tidy")
                .join("config.toml");
            if home_config.exists() {
                return Self::load_from_file(&home_config);
            }
        }

        Ok(Self::default())
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        log::debug!("loaded configuration from {}", path.display());

        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ConfigInvalid(e.to_string()))
    }

    /// Validate the configuration and turn it into matching rules.
    ///
    /// # Errors
    ///
    /// Returns an error for empty extension lists, a bad cache suffix, unusable
    /// split names, or invalid glob/regex patterns.
    pub fn compile(self) -> Result<DatasetRules, ConfigError> {
        validate_layout(&self.dataset.splits)?;

        let organize_images = non_empty_set(&self.extensions.images, "images")?;
        let clear_images = non_empty_set(&self.extensions.clear_images, "clear_images")?;
        let labels = non_empty_set(&self.extensions.labels, "labels")?;

        let cache_suffix = self.extensions.cache_suffix.trim().to_string();
        if cache_suffix.is_empty() || cache_suffix.contains(['/', '\\']) {
            return Err(ConfigError::InvalidCacheSuffix(
                self.extensions.cache_suffix.clone(),
            ));
        }

        Ok(DatasetRules {
            layout: self.dataset.splits,
            organize_images,
            clear_images,
            labels,
            cache_suffix,
            filters: CompiledFilters::new(self.filters.exclude)?,
        })
    }
}

fn non_empty_set(values: &[String], field: &'static str) -> Result<ExtensionSet, ConfigError> {
    let set = ExtensionSet::new(values);
    if set.is_empty() {
        return Err(ConfigError::EmptyExtensionSet(field));
    }
    Ok(set)
}

fn validate_layout(layout: &SplitLayout) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();
    for split in Split::ALL {
        let name = layout.dir_name(split);
        let invalid = name.trim().is_empty()
            || name.contains(['/', '\\'])
            || name == "."
            || name == ".."
            || !seen.insert(name);
        if invalid {
            return Err(ConfigError::InvalidSplitName {
                split,
                name: name.to_string(),
            });
        }
    }
    Ok(())
}

/// Validated rules used by the organizer and cleaner.
#[derive(Debug, Clone)]
pub struct DatasetRules {
    pub layout: SplitLayout,
    pub organize_images: ExtensionSet,
    pub clear_images: ExtensionSet,
    pub labels: ExtensionSet,
    pub cache_suffix: String,
    pub filters: CompiledFilters,
}

impl DatasetRules {
    /// Classifier used when sorting loose files.
    pub fn classifier(&self) -> RoleClassifier {
        RoleClassifier::new(self.organize_images.clone(), self.labels.clone())
    }
}

impl Default for DatasetRules {
    fn default() -> Self {
        Self {
            layout: SplitLayout::default(),
            organize_images: ExtensionSet::default_images(),
            clear_images: ExtensionSet::default_clear_images(),
            labels: ExtensionSet::default_labels(),
            cache_suffix: CACHE_SUFFIX.to_string(),
            filters: CompiledFilters::default(),
        }
    }
}

/// Pre-compiled exclusion rules.
#[derive(Debug, Clone, Default)]
pub struct CompiledFilters {
    exclude_filenames: HashSet<String>,
    exclude_patterns: Vec<Pattern>,
    exclude_regexes: Vec<Regex>,
}

impl CompiledFilters {
    fn new(rules: ExcludeRules) -> Result<Self, ConfigError> {
        let exclude_patterns = rules
            .patterns
            .iter()
            .map(|pattern| {
                Pattern::new(pattern).map_err(|_| ConfigError::InvalidGlobPattern(pattern.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let exclude_regexes = rules
            .regex
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|e| ConfigError::InvalidRegexPattern {
                    pattern: pattern.clone(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            exclude_filenames: rules.filenames.into_iter().collect(),
            exclude_patterns,
            exclude_regexes,
        })
    }

    /// Returns false if the file matches any exclusion rule.
    pub fn should_include(&self, file_path: &Path) -> bool {
        let file_name = file_path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();

        if self.exclude_filenames.contains(file_name.as_ref()) {
            return false;
        }

        let pattern_hit = self
            .exclude_patterns
            .iter()
            .any(|pattern| pattern.matches(&file_name) || pattern.matches_path(file_path));
        if pattern_hit {
            return false;
        }

        !self
            .exclude_regexes
            .iter()
            .any(|regex| regex.is_match(&file_name))
    }

    pub fn is_empty(&self) -> bool {
        self.exclude_filenames.is_empty()
            && self.exclude_patterns.is_empty()
            && self.exclude_regexes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn filters(rules: ExcludeRules) -> CompiledFilters {
        CompiledFilters::new(rules).unwrap()
    }

    #[test]
    fn test_default_config_compiles_to_default_rules() {
        let rules = TidyConfig::default().compile().unwrap();
        let defaults = DatasetRules::default();

        assert_eq!(rules.layout, defaults.layout);
        assert_eq!(rules.organize_images, defaults.organize_images);
        assert_eq!(rules.clear_images, defaults.clear_images);
        assert_eq!(rules.labels, defaults.labels);
        assert_eq!(rules.cache_suffix, ".cache");
        assert!(rules.filters.is_empty());
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = TidyConfig::from_toml_str("").unwrap();
        assert_eq!(config.dataset.splits, SplitLayout::default());
        assert_eq!(config.extensions.labels, vec![".txt".to_string()]);
    }

    #[test]
    fn test_partial_toml_overrides_fields() {
        let config = TidyConfig::from_toml_str(
            r#"
            [dataset.splits]
            training = "treino"

            [extensions]
            images = ["JPG", "tif"]
            "#,
        )
        .unwrap();
        let rules = config.compile().unwrap();

        assert_eq!(rules.layout.dir_name(Split::Training), "treino");
        assert_eq!(rules.layout.dir_name(Split::Validation), "validation");
        assert!(rules.organize_images.contains("tif"));
        assert!(!rules.organize_images.contains("png"));
        assert!(rules.clear_images.contains("png"));
    }

    #[test]
    fn test_invalid_toml_is_reported() {
        let result = TidyConfig::from_toml_str("[extensions\nimages = 3");
        assert!(matches!(result, Err(ConfigError::ConfigInvalid(_))));
    }

    #[test]
    fn test_empty_extension_list_rejected() {
        let mut config = TidyConfig::default();
        config.extensions.labels = vec![" ".to_string()];
        assert!(matches!(
            config.compile(),
            Err(ConfigError::EmptyExtensionSet("labels"))
        ));
    }

    #[test]
    fn test_bad_cache_suffix_rejected() {
        let mut config = TidyConfig::default();
        config.extensions.cache_suffix = "sub/.cache".to_string();
        assert!(matches!(
            config.compile(),
            Err(ConfigError::InvalidCacheSuffix(_))
        ));

        let mut config = TidyConfig::default();
        config.extensions.cache_suffix = String::new();
        assert!(config.compile().is_err());
    }

    #[test]
    fn test_duplicate_split_names_rejected() {
        let mut config = TidyConfig::default();
        config.dataset.splits.test = "validation".to_string();
        assert!(matches!(
            config.compile(),
            Err(ConfigError::InvalidSplitName {
                split: Split::Test,
                ..
            })
        ));
    }

    #[test]
    fn test_explicit_missing_config_file() {
        let temp_dir = TempDir::new().unwrap();
        let result = TidyConfig::load(Some(&temp_dir.path().join("missing.toml")));
        assert!(matches!(result, Err(ConfigError::ConfigNotFound(_))));
    }

    #[test]
    fn test_load_explicit_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("tidy.toml");
        fs::write(&path, "[dataset.splits]\ntest = \"teste\"\n").unwrap();

        let config = TidyConfig::load(Some(&path)).unwrap();
        assert_eq!(config.dataset.splits.test, "teste");
    }

    #[test]
    fn test_exclude_exact_filename() {
        let compiled = filters(ExcludeRules {
            filenames: vec!["classes.txt".to_string()],
            ..Default::default()
        });

        assert!(!compiled.should_include(Path::new("train/classes.txt")));
        assert!(compiled.should_include(Path::new("train/frame_001.txt")));
    }

    #[test]
    fn test_exclude_glob_on_file_name() {
        let compiled = filters(ExcludeRules {
            patterns: vec!["*_backup.*".to_string()],
            ..Default::default()
        });

        assert!(!compiled.should_include(Path::new("/data/training/img_backup.jpg")));
        assert!(compiled.should_include(Path::new("/data/training/img.jpg")));
    }

    #[test]
    fn test_exclude_regex() {
        let compiled = filters(ExcludeRules {
            regex: vec![r"^tmp_.*\.png$".to_string()],
            ..Default::default()
        });

        assert!(!compiled.should_include(Path::new("tmp_01.png")));
        assert!(compiled.should_include(Path::new("frame_tmp_01.png")));
    }

    #[test]
    fn test_invalid_patterns_return_errors() {
        let glob = CompiledFilters::new(ExcludeRules {
            patterns: vec!["[invalid".to_string()],
            ..Default::default()
        });
        assert!(matches!(glob, Err(ConfigError::InvalidGlobPattern(_))));

        let regex = CompiledFilters::new(ExcludeRules {
            regex: vec!["[invalid(".to_string()],
            ..Default::default()
        });
        assert!(matches!(regex, Err(ConfigError::InvalidRegexPattern { .. })));
    }
}
