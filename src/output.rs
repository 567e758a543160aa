//! Output formatting and styling module.
//!
//! All console output of an organizing run goes through `OutputFormatter`,
//! so the wording of each line lives in one place.

use colored::*;
use std::fmt::Display;
use std::path::Path;

/// Text printed after every root has been processed.
pub const COMPLETION_MESSAGE: &str = "All files have been organized successfully!";

/// Manages all CLI output with consistent styling and formatting.
///
/// This struct provides methods for:
/// - Root banners (bold, with 📂)
/// - Move results (`Moved:` in green, `Error moving` in red)
/// - The final completion notice (green with ✅)
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints the banner that opens a root directory.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use homesort::output::OutputFormatter;
    /// use std::path::Path;
    /// OutputFormatter::root_banner(Path::new("/home/me/Downloads"));
    /// ```
    pub fn root_banner(root: &Path) {
        println!("\n📂 {} {}", "Organizing files in:".bold(), root.display());
    }

    /// Prints `Moved: <source> → <destination>`.
    pub fn moved(source: &Path, destination: &Path) {
        println!(
            "{} {} → {}",
            "Moved:".green(),
            source.display(),
            destination.display()
        );
    }

    /// Prints `Error moving '<source>': <error>`.
    pub fn move_failed(source: &Path, error: &dyn Display) {
        println!("{} '{}': {}", "Error moving".red(), source.display(), error);
    }

    /// Prints a failure to read a root directory.
    pub fn root_failed(root: &Path, error: &dyn Display) {
        println!("{} '{}': {}", "Error reading".red(), root.display(), error);
    }

    /// Prints an error message in red with an X mark.
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints the completion notice.
    pub fn completed() {
        println!("\n✅ {}", COMPLETION_MESSAGE.green());
    }
}
