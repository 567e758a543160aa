//! homesort - sort loose files in your home folders
//!
//! This library classifies files by subject keywords or file extension and
//! moves them into `Subjects/...` or `File Types/...` subdirectories of the
//! folder they were found in, under timestamped names that never overwrite.

pub mod cli;
pub mod config;
pub mod file_category;
pub mod file_organizer;
pub mod logging;
pub mod output;

pub use config::{ConfigError, OrganizerConfig, RuleSet};
pub use file_category::{Classifier, Destination, ExtensionTable, Subject, SubjectTaxonomy, Topic};
pub use file_organizer::{FileOrganizer, OrganizeError, OrganizeResult, Placement};

pub use cli::{RootReport, RunReport, run, run_cli};
