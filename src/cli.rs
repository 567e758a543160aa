//! Command-line driver for homesort.
//!
//! This module walks the configured roots in order, lists the loose files in
//! each one, classifies them and hands them to the placer. A failure for one
//! file is reported and the run moves on; nothing here aborts early.

use crate::config::{ConfigError, OrganizerConfig};
use crate::file_category::Classifier;
use crate::file_organizer::{FileOrganizer, Placement};
use crate::output::OutputFormatter;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// A loose file found directly inside a root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDescriptor {
    /// The name of the file.
    pub name: String,
    /// The full path to the file.
    pub path: PathBuf,
}

/// Outcome of organizing one root directory.
#[derive(Debug, Clone, Default)]
pub struct RootReport {
    pub root: PathBuf,
    /// Files that were moved.
    pub moved: Vec<Placement>,
    /// Files that could not be moved, with the reason.
    pub failed: Vec<(PathBuf, String)>,
    /// Set when the root itself could not be listed.
    pub listing_error: Option<String>,
}

/// Outcome of a whole run. Roots that were absent do not appear.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub roots: Vec<RootReport>,
}

impl RunReport {
    /// Total number of files moved across all roots.
    pub fn moved_count(&self) -> usize {
        self.roots.iter().map(|r| r.moved.len()).sum()
    }

    /// Total number of files that failed to move across all roots.
    pub fn failed_count(&self) -> usize {
        self.roots.iter().map(|r| r.failed.len()).sum()
    }
}

/// Runs homesort over the current user's folders with the built-in rules.
///
/// # Errors
///
/// Returns an error only if the configuration cannot be built. File-level
/// failures are printed and collected in the returned report.
///
/// # Examples
///
/// ```no_run
/// use homesort::cli::run_cli;
///
/// match run_cli() {
///     Ok(report) => println!("{} files moved", report.moved_count()),
///     Err(e) => eprintln!("Error: {}", e),
/// }
/// ```
pub fn run_cli() -> Result<RunReport, ConfigError> {
    let config = OrganizerConfig::load()?;
    Ok(run(&config))
}

/// Organizes every configured root in order, then prints the completion notice.
pub fn run(config: &OrganizerConfig) -> RunReport {
    let mut report = RunReport::default();

    for root in &config.roots {
        if let Some(root_report) = organize_root(root, &config.classifier) {
            report.roots.push(root_report);
        }
    }

    OutputFormatter::completed();
    tracing::debug!(
        moved = report.moved_count(),
        failed = report.failed_count(),
        "run finished"
    );
    report
}

/// Organizes the loose files of a single root.
///
/// Returns `None` without printing anything when the root does not exist or
/// is not a directory.
pub fn organize_root(root: &Path, classifier: &Classifier) -> Option<RootReport> {
    if !root.exists() {
        tracing::debug!(root = %root.display(), "root missing, skipping");
        return None;
    }
    if !root.is_dir() {
        tracing::warn!(root = %root.display(), "root is not a directory, skipping");
        return None;
    }

    OutputFormatter::root_banner(root);
    let mut report = RootReport {
        root: root.to_path_buf(),
        ..Default::default()
    };

    let files = match list_files(root) {
        Ok(files) => files,
        Err(e) => {
            OutputFormatter::root_failed(root, &e);
            report.listing_error = Some(e.to_string());
            return Some(report);
        }
    };

    for file in files {
        let destination = classifier.classify(&file.name);
        let destination_dir = root.join(destination.subpath());

        match FileOrganizer::place(&file.path, &destination_dir) {
            Ok(placement) => {
                OutputFormatter::moved(&placement.source, &placement.destination);
                report.moved.push(placement);
            }
            Err(e) => {
                OutputFormatter::move_failed(&file.path, &e);
                report.failed.push((file.path, e.to_string()));
            }
        }
    }

    Some(report)
}

/// Lists the regular files directly inside `root`, sorted by name.
///
/// Directories are never included, so files already organized into
/// subdirectories are left alone on later runs.
pub fn list_files(root: &Path) -> io::Result<Vec<FileDescriptor>> {
    let mut files: Vec<FileDescriptor> = fs::read_dir(root)?
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!(root = %root.display(), error = %e, "skipping unreadable entry");
                None
            }
        })
        .filter_map(|entry| {
            let path = entry.path();
            // Follows symlinks, so a link to a file counts as a file.
            if !path.is_file() {
                return None;
            }
            Some(FileDescriptor {
                name: entry.file_name().to_string_lossy().into_owned(),
                path,
            })
        })
        .collect();

    files.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(files)
}
