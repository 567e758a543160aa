//! File placement: moving a file into its destination directory.
//!
//! This module creates destination directories as needed, names the moved
//! file after its modification time so same-named files never clobber each
//! other, and performs the move. Every failure comes back as an
//! `OrganizeError` so the caller decides how to report it.

use crate::file_category::split_extension;
use chrono::{DateTime, Local, TimeZone};
use std::ffi::{OsStr, OsString};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

/// Format of the timestamp prefix on moved files.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Upper bound on ` (n)` suffixes tried before giving up on a name.
const MAX_NAME_SUFFIX: u32 = 10_000;

/// Records a single completed move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    /// Where the file was found.
    pub source: PathBuf,
    /// Where the file now lives.
    pub destination: PathBuf,
}

/// Errors that can occur while placing a file.
#[derive(Debug, Error)]
pub enum OrganizeError {
    /// Failed to create a destination directory.
    #[error("failed to create directory {}: {source}", .path.display())]
    DirectoryCreationFailed { path: PathBuf, source: io::Error },

    /// Failed to read the source file's modification time.
    #[error("failed to read modification time of {}: {source}", .path.display())]
    MetadataUnavailable { path: PathBuf, source: io::Error },

    /// The modification time cannot be expressed as a local date.
    #[error("modification time of {} is out of range", .path.display())]
    TimestampOutOfRange { path: PathBuf },

    /// The source path has no file name component.
    #[error("{} has no file name", .0.display())]
    InvalidFileName(PathBuf),

    /// Every candidate name in the destination directory is taken.
    #[error("no free file name for {} in {}", .name, .directory.display())]
    NoFreeName { directory: PathBuf, name: String },

    /// Failed to move the file.
    #[error("failed to move {} to {}: {source}", .from.display(), .to.display())]
    FileMoveFailure {
        from: PathBuf,
        to: PathBuf,
        source: io::Error,
    },
}

/// Result type for file placement operations.
pub type OrganizeResult<T> = Result<T, OrganizeError>;

/// Moves files into destination directories.
pub struct FileOrganizer;

impl FileOrganizer {
    /// Moves `source` into `destination_dir` under a timestamped name.
    ///
    /// The directory (and any missing parents) is created first. The new name
    /// is `<YYYY-MM-DD_HH-MM-SS>-<original name>` using the file's local
    /// modification time. If that name is taken, ` (1)`, ` (2)`, ... is added
    /// before the extension, so an existing file is never overwritten.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use homesort::file_organizer::FileOrganizer;
    /// use std::path::Path;
    ///
    /// let result = FileOrganizer::place(
    ///     Path::new("/home/me/Downloads/vacation.mp4"),
    ///     Path::new("/home/me/Downloads/File Types/Videos"),
    /// );
    ///
    /// match result {
    ///     Ok(p) => println!("Moved: {} → {}", p.source.display(), p.destination.display()),
    ///     Err(e) => eprintln!("Error moving: {}", e),
    /// }
    /// ```
    pub fn place(source: &Path, destination_dir: &Path) -> OrganizeResult<Placement> {
        Self::ensure_dir(destination_dir)?;

        let modified = fs::metadata(source)
            .and_then(|metadata| metadata.modified())
            .map_err(|e| OrganizeError::MetadataUnavailable {
                path: source.to_path_buf(),
                source: e,
            })?;

        let file_name = source
            .file_name()
            .ok_or_else(|| OrganizeError::InvalidFileName(source.to_path_buf()))?;

        let target_name = timestamped_name(file_name, modified).ok_or_else(|| {
            OrganizeError::TimestampOutOfRange {
                path: source.to_path_buf(),
            }
        })?;
        let destination = Self::free_target(destination_dir, &target_name)?;

        move_file(source, &destination, modified).map_err(|e| OrganizeError::FileMoveFailure {
            from: source.to_path_buf(),
            to: destination.clone(),
            source: e,
        })?;

        tracing::debug!(
            source = %source.display(),
            destination = %destination.display(),
            "file placed"
        );

        Ok(Placement {
            source: source.to_path_buf(),
            destination,
        })
    }

    /// Creates `path` and all missing parents. Succeeds if it already exists.
    pub fn ensure_dir(path: &Path) -> OrganizeResult<()> {
        fs::create_dir_all(path).map_err(|e| OrganizeError::DirectoryCreationFailed {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Returns the first unused path for `name` inside `directory`.
    fn free_target(directory: &Path, name: &OsStr) -> OrganizeResult<PathBuf> {
        let candidate = directory.join(name);
        if is_free(&candidate) {
            return Ok(candidate);
        }

        for n in 1..=MAX_NAME_SUFFIX {
            let candidate = directory.join(suffixed_name(name, n));
            if is_free(&candidate) {
                tracing::warn!(
                    taken = %directory.join(name).display(),
                    using = %candidate.display(),
                    "destination name taken, adding suffix"
                );
                return Ok(candidate);
            }
        }

        Err(OrganizeError::NoFreeName {
            directory: directory.to_path_buf(),
            name: name.to_string_lossy().into_owned(),
        })
    }
}

/// No entry of any kind (dangling symlinks included) exists at `path`.
fn is_free(path: &Path) -> bool {
    fs::symlink_metadata(path).is_err()
}

/// Converts a modification time to local time, or `None` if chrono cannot
/// represent it.
pub fn local_time(modified: SystemTime) -> Option<DateTime<Local>> {
    let (secs, nanos) = match modified.duration_since(UNIX_EPOCH) {
        Ok(after) => (i64::try_from(after.as_secs()).ok()?, after.subsec_nanos()),
        Err(before) => {
            let before = before.duration();
            let secs = i64::try_from(before.as_secs()).ok()?;
            match before.subsec_nanos() {
                0 => (-secs, 0),
                n => (-secs - 1, 1_000_000_000 - n),
            }
        }
    };
    Local.timestamp_opt(secs, nanos).earliest()
}

/// Formats a modification time as `YYYY-MM-DD_HH-MM-SS` in local time.
pub fn timestamp_label(modified: SystemTime) -> Option<String> {
    local_time(modified).map(|time| time.format(TIMESTAMP_FORMAT).to_string())
}

/// Builds `<timestamp>-<file_name>`.
pub fn timestamped_name(file_name: &OsStr, modified: SystemTime) -> Option<OsString> {
    let mut name = OsString::from(timestamp_label(modified)?);
    name.push("-");
    name.push(file_name);
    Some(name)
}

/// Inserts ` (n)` before the extension, or appends it to non-UTF-8 names.
fn suffixed_name(name: &OsStr, n: u32) -> OsString {
    match name.to_str() {
        Some(name) => {
            let (stem, extension) = split_extension(name);
            OsString::from(format!("{} ({}){}", stem, n, extension))
        }
        None => {
            let mut suffixed = name.to_os_string();
            suffixed.push(format!(" ({})", n));
            suffixed
        }
    }
}

/// Renames, falling back to copy + delete across file systems.
fn move_file(source: &Path, destination: &Path, modified: SystemTime) -> io::Result<()> {
    match fs::rename(source, destination) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            tracing::debug!(source = %source.display(), "rename crosses devices, copying");
            copy_then_remove(source, destination, modified)
        }
        Err(e) => Err(e),
    }
}

/// Copies `source` to `destination` keeping its mtime, then removes the source.
///
/// `destination` must be free beforehand. On any failure whatever was
/// written there is removed again, so the source stays the only copy.
fn copy_then_remove(source: &Path, destination: &Path, modified: SystemTime) -> io::Result<()> {
    let result = fs::copy(source, destination)
        .and_then(|_| fs::File::options().write(true).open(destination))
        .and_then(|copied| copied.set_modified(modified))
        .and_then(|()| fs::remove_file(source));

    if let Err(e) = &result {
        if !is_free(destination) {
            if let Err(cleanup) = fs::remove_file(destination) {
                tracing::warn!(
                    destination = %destination.display(),
                    error = %cleanup,
                    "could not remove partial copy"
                );
            }
        }
        tracing::debug!(source = %source.display(), error = %e, "copy fallback failed");
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    /// tmpfs keeps far-future mtimes that disk file systems clamp.
    fn scratch_base() -> PathBuf {
        let shm = PathBuf::from("/dev/shm");
        if shm.is_dir() {
            shm
        } else {
            std::env::temp_dir()
        }
    }

    fn fixed_time() -> SystemTime {
        let local = Local
            .with_ymd_and_hms(2023, 5, 17, 14, 3, 9)
            .single()
            .expect("unambiguous local time");
        SystemTime::from(local)
    }

    fn write_with_mtime(path: &Path, content: &str, modified: SystemTime) {
        fs::write(path, content).expect("Failed to write test file");
        let file = fs::File::options()
            .write(true)
            .open(path)
            .expect("Failed to open test file");
        file.set_modified(modified).expect("Failed to set mtime");
    }

    #[test]
    fn test_timestamp_label_format() {
        assert_eq!(
            timestamp_label(fixed_time()).as_deref(),
            Some("2023-05-17_14-03-09")
        );
    }

    #[test]
    fn test_timestamped_name() {
        let name = timestamped_name(OsStr::new("report.pdf"), fixed_time());
        assert_eq!(name, Some(OsString::from("2023-05-17_14-03-09-report.pdf")));
    }

    #[test]
    fn test_timestamp_label_before_epoch() {
        let before = UNIX_EPOCH - Duration::from_millis(1500);
        let expected = Local
            .timestamp_opt(-2, 500_000_000)
            .earliest()
            .unwrap()
            .format(TIMESTAMP_FORMAT)
            .to_string();
        assert_eq!(timestamp_label(before), Some(expected));
    }

    #[test]
    fn test_timestamp_label_far_future_is_none() {
        let far_future = UNIX_EPOCH + Duration::from_secs(1 << 50);
        assert_eq!(timestamp_label(far_future), None);
        assert!(timestamped_name(OsStr::new("a.txt"), far_future).is_none());
    }

    #[test]
    fn test_place_far_future_mtime_is_an_error() {
        let temp_dir = TempDir::new_in(scratch_base()).expect("Failed to create temp directory");
        let source = temp_dir.path().join("a_weird.txt");
        fs::write(&source, "weird").unwrap();
        let far_future = UNIX_EPOCH + Duration::from_secs(1 << 50);
        // Rejected or clamped by some file systems; the stored value decides.
        let _ = fs::File::options()
            .write(true)
            .open(&source)
            .unwrap()
            .set_modified(far_future);
        let stored = fs::metadata(&source).unwrap().modified().unwrap();

        let destination_dir = temp_dir.path().join("out");
        let result = FileOrganizer::place(&source, &destination_dir);

        if timestamp_label(stored).is_none() {
            match result {
                Err(OrganizeError::TimestampOutOfRange { path }) => assert_eq!(path, source),
                other => panic!("expected out of range error, got {:?}", other),
            }
            assert!(source.exists());
            assert_eq!(fs::read_dir(&destination_dir).unwrap().count(), 0);
        } else {
            assert!(result.is_ok());
        }
    }

    #[test]
    fn test_suffixed_name_goes_before_extension() {
        let name = OsString::from("2023-05-17_14-03-09-report.pdf");
        assert_eq!(
            suffixed_name(&name, 2),
            OsString::from("2023-05-17_14-03-09-report (2).pdf")
        );
        let bare = OsString::from("2023-05-17_14-03-09-Makefile");
        assert_eq!(
            suffixed_name(&bare, 1),
            OsString::from("2023-05-17_14-03-09-Makefile (1)")
        );
    }

    #[test]
    fn test_ensure_dir_is_idempotent() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let nested = temp_dir.path().join("File Types").join("Programming").join("Python Scripts");

        FileOrganizer::ensure_dir(&nested).expect("first call");
        FileOrganizer::ensure_dir(&nested).expect("second call");
        assert!(nested.is_dir());
    }

    #[test]
    fn test_ensure_dir_fails_when_file_in_the_way() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let blocker = temp_dir.path().join("Subjects");
        fs::write(&blocker, "not a directory").unwrap();

        let result = FileOrganizer::ensure_dir(&blocker.join("resume"));
        assert!(matches!(
            result,
            Err(OrganizeError::DirectoryCreationFailed { .. })
        ));
    }

    #[test]
    fn test_place_moves_with_timestamp_prefix() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let source = temp_dir.path().join("vacation.mp4");
        write_with_mtime(&source, "video", fixed_time());

        let destination_dir = temp_dir.path().join("File Types").join("Videos");
        let placement = FileOrganizer::place(&source, &destination_dir).expect("Failed to place");

        assert!(!source.exists());
        assert_eq!(
            placement.destination,
            destination_dir.join("2023-05-17_14-03-09-vacation.mp4")
        );
        assert_eq!(fs::read_to_string(&placement.destination).unwrap(), "video");
        assert_eq!(placement.source, source);
    }

    #[test]
    fn test_place_never_overwrites_same_name_and_time() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let destination_dir = temp_dir.path().join("out");
        let first_dir = temp_dir.path().join("a");
        let second_dir = temp_dir.path().join("b");
        fs::create_dir(&first_dir).unwrap();
        fs::create_dir(&second_dir).unwrap();

        let first = first_dir.join("notes.txt");
        let second = second_dir.join("notes.txt");
        write_with_mtime(&first, "first", fixed_time());
        write_with_mtime(&second, "second", fixed_time());

        let a = FileOrganizer::place(&first, &destination_dir).unwrap();
        let b = FileOrganizer::place(&second, &destination_dir).unwrap();

        assert_ne!(a.destination, b.destination);
        assert_eq!(
            b.destination,
            destination_dir.join("2023-05-17_14-03-09-notes (1).txt")
        );
        assert_eq!(fs::read_to_string(&a.destination).unwrap(), "first");
        assert_eq!(fs::read_to_string(&b.destination).unwrap(), "second");
    }

    #[test]
    fn test_place_distinct_times_get_distinct_names() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let destination_dir = temp_dir.path().join("out");

        let first = temp_dir.path().join("notes.txt");
        write_with_mtime(&first, "old", fixed_time());
        let a = FileOrganizer::place(&first, &destination_dir).unwrap();

        let later = fixed_time() + Duration::from_secs(61);
        write_with_mtime(&first, "new", later);
        let b = FileOrganizer::place(&first, &destination_dir).unwrap();

        assert_eq!(
            b.destination,
            destination_dir.join("2023-05-17_14-04-10-notes.txt")
        );
        assert_eq!(fs::read_to_string(&a.destination).unwrap(), "old");
        assert_eq!(fs::read_to_string(&b.destination).unwrap(), "new");
    }

    #[test]
    fn test_place_missing_source_is_an_error() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let missing = temp_dir.path().join("gone.txt");

        let result = FileOrganizer::place(&missing, &temp_dir.path().join("out"));
        match result {
            Err(OrganizeError::MetadataUnavailable { path, .. }) => assert_eq!(path, missing),
            other => panic!("expected metadata error, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_place_does_not_replace_dangling_symlink() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let destination_dir = temp_dir.path().join("out");
        fs::create_dir(&destination_dir).unwrap();

        let link = destination_dir.join("2023-05-17_14-03-09-notes.txt");
        std::os::unix::fs::symlink(temp_dir.path().join("nowhere"), &link).unwrap();

        let source = temp_dir.path().join("notes.txt");
        write_with_mtime(&source, "notes", fixed_time());
        let placement = FileOrganizer::place(&source, &destination_dir).unwrap();

        assert_eq!(
            placement.destination,
            destination_dir.join("2023-05-17_14-03-09-notes (1).txt")
        );
        assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
    }

    #[test]
    fn test_copy_then_remove_moves_content_and_mtime() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let source = temp_dir.path().join("clip.mov");
        let destination = temp_dir.path().join("2023-05-17_14-03-09-clip.mov");
        write_with_mtime(&source, "frames", fixed_time());

        copy_then_remove(&source, &destination, fixed_time()).expect("copy fallback");

        assert!(!source.exists());
        assert_eq!(fs::read_to_string(&destination).unwrap(), "frames");
        assert_eq!(
            fs::metadata(&destination).unwrap().modified().unwrap(),
            fixed_time()
        );
    }

    #[test]
    fn test_copy_then_remove_failure_leaves_no_copy() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        // A directory cannot be copied as a file.
        let source = temp_dir.path().join("folder.zip");
        fs::create_dir(&source).unwrap();
        let destination = temp_dir.path().join("2023-05-17_14-03-09-folder.zip");

        assert!(copy_then_remove(&source, &destination, fixed_time()).is_err());
        assert!(source.is_dir());
        assert!(fs::symlink_metadata(&destination).is_err());
    }
}
