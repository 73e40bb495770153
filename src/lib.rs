//! dataset-tidy - curation of YOLO-style datasets on disk
//!
//! This library sorts loose image and label files of each dataset split into
//! `images/` and `labels/` directories, and purges generated artifacts (images,
//! labels and `.cache` files) with dry-run and confirmation safeguards.

pub mod cleaner;
pub mod cli;
pub mod config;
pub mod confirm;
pub mod file_category;
pub mod file_organizer;
pub mod layout;
pub mod output;
pub mod report;

pub use cleaner::{ClearOptions, ClearOutcome, ClearReport, Cleaner};
pub use config::{ConfigError, DatasetRules, TidyConfig};
pub use confirm::{Confirmation, FixedConfirmation, PromptConfirmation};
pub use file_category::{ExtensionSet, RoleClassifier};
pub use file_organizer::{DatasetOrganizeReport, FileOrganizer, OrganizeReport, organize_dataset};
pub use layout::{DatasetError, DatasetRoot, Role, Split, SplitLayout};

pub use cli::{Cli, DatasetCommand, OutputMode, run_cli, run_command};
