//! Extension-based classification of dataset files.
//!
//! Files are sorted into roles purely by their extension. Matching is
//! case-insensitive: every extension is stored lower-cased and dot-prefixed,
//! and a path's extension is normalized the same way before lookup.
//!
//! # Examples
//!
//! ```
//! use dataset_tidy::file_category::RoleClassifier;
//! use dataset_tidy::layout::Role;
//! use std::path::Path;
//!
//! let classifier = RoleClassifier::default();
//! assert_eq!(classifier.classify(Path::new("frame.PNG")), Some(Role::Images));
//! assert_eq!(classifier.classify(Path::new("frame.txt")), Some(Role::Labels));
//! assert_eq!(classifier.classify(Path::new("notes.xml")), None);
//! ```

use crate::layout::Role;
use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;

/// Image extensions moved into `images/` by the organizer.
pub const IMAGE_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png"];

/// Image extensions purged from `images/` by the cleaner.
pub const CLEARABLE_IMAGE_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png", ".bmp", ".webp"];

/// Label extensions, shared by the organizer and the cleaner.
pub const LABEL_EXTENSIONS: &[&str] = &[".txt"];

/// File name suffix of cache artifacts left behind by training tooling.
pub const CACHE_SUFFIX: &str = ".cache";

/// An immutable set of normalized file extensions.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExtensionSet {
    extensions: BTreeSet<String>,
}

impl ExtensionSet {
    /// Builds a set from raw extensions such as `"JPG"`, `".png"` or `"txt"`.
    /// Blank entries are ignored.
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            extensions: extensions
                .into_iter()
                .filter_map(|ext| Self::normalize(ext.as_ref()))
                .collect(),
        }
    }

    pub fn default_images() -> Self {
        Self::new(IMAGE_EXTENSIONS)
    }

    pub fn default_clear_images() -> Self {
        Self::new(CLEARABLE_IMAGE_EXTENSIONS)
    }

    pub fn default_labels() -> Self {
        Self::new(LABEL_EXTENSIONS)
    }

    /// Lower-cases and dot-prefixes an extension.
    ///
    /// ```
    /// use dataset_tidy::file_category::ExtensionSet;
    ///
    /// assert_eq!(ExtensionSet::normalize("JPG"), Some(".jpg".to_string()));
    /// assert_eq!(ExtensionSet::normalize(".Txt"), Some(".txt".to_string()));
    /// assert_eq!(ExtensionSet::normalize("  "), None);
    /// ```
    pub fn normalize(extension: &str) -> Option<String> {
        let trimmed = extension.trim().trim_start_matches('.');
        if trimmed.is_empty() {
            return None;
        }
        Some(format!(".{}", trimmed.to_lowercase()))
    }

    pub fn contains(&self, extension: &str) -> bool {
        Self::normalize(extension).is_some_and(|ext| self.extensions.contains(&ext))
    }

    /// Returns true if the path's extension belongs to this set.
    pub fn matches(&self, path: &Path) -> bool {
        path.extension()
            .map(|ext| self.contains(&ext.to_string_lossy()))
            .unwrap_or(false)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.extensions.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }
}

impl fmt::Display for ExtensionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined: Vec<&str> = self.iter().collect();
        write!(f, "{{{}}}", joined.join(", "))
    }
}

/// Maps files to the role directory they belong in.
#[derive(Debug, Clone)]
pub struct RoleClassifier {
    images: ExtensionSet,
    labels: ExtensionSet,
}

impl RoleClassifier {
    pub fn new(images: ExtensionSet, labels: ExtensionSet) -> Self {
        Self { images, labels }
    }

    /// Returns the role for a file, or `None` when the file should be left
    /// where it is. Images win if an extension appears in both sets.
    pub fn classify(&self, path: &Path) -> Option<Role> {
        if self.images.matches(path) {
            Some(Role::Images)
        } else if self.labels.matches(path) {
            Some(Role::Labels)
        } else {
            None
        }
    }
}

impl Default for RoleClassifier {
    fn default() -> Self {
        Self::new(
            ExtensionSet::default_images(),
            ExtensionSet::default_labels(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_variants() {
        assert_eq!(ExtensionSet::normalize("png"), Some(".png".to_string()));
        assert_eq!(ExtensionSet::normalize(".PNG"), Some(".png".to_string()));
        assert_eq!(ExtensionSet::normalize(" .Jpeg "), Some(".jpeg".to_string()));
        assert_eq!(ExtensionSet::normalize("."), None);
        assert_eq!(ExtensionSet::normalize(""), None);
    }

    #[test]
    fn test_set_deduplicates_after_normalizing() {
        let set = ExtensionSet::new(["jpg", ".JPG", "Jpg", ""]);
        assert_eq!(set.len(), 1);
        assert!(set.contains("jpg"));
    }

    #[test]
    fn test_matches_is_case_insensitive() {
        let set = ExtensionSet::default_images();
        assert!(set.matches(Path::new("a.jpg")));
        assert!(set.matches(Path::new("b.PNG")));
        assert!(set.matches(Path::new("dir/c.JpEg")));
        assert!(!set.matches(Path::new("d.gif")));
        assert!(!set.matches(Path::new("noext")));
        assert!(!set.matches(Path::new(".png")));
    }

    #[test]
    fn test_only_last_extension_counts() {
        let set = ExtensionSet::default_labels();
        assert!(set.matches(Path::new("frame.jpg.txt")));
        assert!(!set.matches(Path::new("frame.txt.bak")));
    }

    #[test]
    fn test_clear_set_extends_organize_set() {
        let organize = ExtensionSet::default_images();
        let clear = ExtensionSet::default_clear_images();
        assert!(organize.iter().all(|ext| clear.contains(ext)));
        assert!(clear.contains("bmp"));
        assert!(clear.contains("webp"));
        assert!(!organize.contains("bmp"));
    }

    #[test]
    fn test_classify_defaults() {
        let classifier = RoleClassifier::default();
        assert_eq!(classifier.classify(Path::new("a.jpg")), Some(Role::Images));
        assert_eq!(classifier.classify(Path::new("b.PNG")), Some(Role::Images));
        assert_eq!(classifier.classify(Path::new("c.txt")), Some(Role::Labels));
        assert_eq!(classifier.classify(Path::new("C.TXT")), Some(Role::Labels));
        assert_eq!(classifier.classify(Path::new("d.xml")), None);
        assert_eq!(classifier.classify(Path::new("e.bmp")), None);
    }

    #[test]
    fn test_display_lists_sorted_extensions() {
        let set = ExtensionSet::new(["png", "jpg"]);
        assert_eq!(set.to_string(), "{.jpg, .png}");
    }
}
