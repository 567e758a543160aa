//! Filename classification into subject and file-type destinations.
//!
//! This module decides where a file belongs from its name alone. Subject
//! keywords are tried first, in declaration order; when none match, the file
//! extension is looked up in the extension table; anything left over lands in
//! `File Types/Other`. Nothing here touches the file system.
//!
//! # Examples
//!
//! ```
//! use homesort::file_category::{Classifier, ExtensionTable, Subject, SubjectTaxonomy};
//!
//! let taxonomy = SubjectTaxonomy::new(vec![Subject::with_keywords("resume", ["resume", "cv"])]);
//! let mut extensions = ExtensionTable::new();
//! extensions.insert(".mp4", "Videos");
//!
//! let classifier = Classifier::new(taxonomy, extensions);
//! assert_eq!(classifier.classify("Resume_John.pdf").subpath().to_str(), Some("Subjects/resume"));
//! assert_eq!(classifier.classify("clip.MP4").subpath().to_str(), Some("File Types/Videos"));
//! assert_eq!(classifier.classify("notes.xyz").subpath().to_str(), Some("File Types/Other"));
//! ```

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

/// Top-level folder for keyword matches.
pub const SUBJECTS_DIR: &str = "Subjects";
/// Top-level folder for extension-based categories.
pub const FILE_TYPES_DIR: &str = "File Types";
/// Catch-all category for unmapped extensions.
pub const OTHER_CATEGORY: &str = "Other";

/// A named group of keywords inside a nested subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topic {
    pub name: String,
    keywords: Vec<String>,
}

impl Topic {
    pub fn new<I, S>(name: impl Into<String>, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            name: name.into(),
            keywords: lowercase_all(keywords),
        }
    }

    fn matches(&self, file_lower: &str) -> bool {
        contains_any(file_lower, &self.keywords)
    }
}

/// How a subject recognizes its files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubjectMatcher {
    /// Flat keyword set; matches land in `Subjects/<subject>`.
    Keywords(Vec<String>),
    /// Ordered sub-topics; matches land in `Subjects/<subject>/<topic>`.
    Topics(Vec<Topic>),
}

/// One entry of the subject taxonomy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subject {
    pub name: String,
    pub matcher: SubjectMatcher,
}

impl Subject {
    /// Creates a subject with a flat keyword set.
    pub fn with_keywords<I, S>(name: impl Into<String>, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            name: name.into(),
            matcher: SubjectMatcher::Keywords(lowercase_all(keywords)),
        }
    }

    /// Creates a subject split into ordered sub-topics.
    pub fn with_topics(name: impl Into<String>, topics: Vec<Topic>) -> Self {
        Self {
            name: name.into(),
            matcher: SubjectMatcher::Topics(topics),
        }
    }

    /// Returns the matching destination, or `None` if no keyword hits.
    fn find(&self, file_lower: &str) -> Option<Destination> {
        match &self.matcher {
            SubjectMatcher::Keywords(keywords) => {
                contains_any(file_lower, keywords).then(|| Destination::Subject {
                    subject: self.name.clone(),
                    topic: None,
                })
            }
            SubjectMatcher::Topics(topics) => topics
                .iter()
                .find(|topic| topic.matches(file_lower))
                .map(|topic| Destination::Subject {
                    subject: self.name.clone(),
                    topic: Some(topic.name.clone()),
                }),
        }
    }
}

/// Subjects in priority order. The first subject (and first topic within it)
/// with a keyword contained in the filename wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubjectTaxonomy {
    subjects: Vec<Subject>,
}

impl SubjectTaxonomy {
    pub fn new(subjects: Vec<Subject>) -> Self {
        Self { subjects }
    }

    pub fn subjects(&self) -> &[Subject] {
        &self.subjects
    }

    /// Finds the first subject destination for a filename, case-insensitively.
    pub fn find(&self, filename: &str) -> Option<Destination> {
        let file_lower = filename.to_lowercase();
        self.subjects
            .iter()
            .find_map(|subject| subject.find(&file_lower))
    }
}

/// Maps lowercase extensions (with leading dot) to category labels.
///
/// A label may contain `/` to describe a nested destination such as
/// `Programming/Python Scripts`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtensionTable {
    categories: HashMap<String, String>,
}

impl ExtensionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an extension mapping, returning the category it replaced.
    ///
    /// A missing leading dot is added, so `"py"` and `".py"` are the same key.
    pub fn insert(&mut self, extension: &str, category: impl Into<String>) -> Option<String> {
        self.categories
            .insert(normalize_extension(extension), category.into())
    }

    /// Looks up the category for an extension such as `".PDF"`.
    pub fn category_for(&self, extension: &str) -> Option<&str> {
        self.categories
            .get(&normalize_extension(extension))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

/// Where a file should go, relative to the root it was found in.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Destination {
    /// Keyword match: `Subjects/<subject>[/<topic>]`.
    Subject {
        subject: String,
        topic: Option<String>,
    },
    /// Extension match: `File Types/<category>`.
    FileType(String),
    /// No match at all: `File Types/Other`.
    Other,
}

impl Destination {
    /// Returns the relative directory path for this destination.
    pub fn subpath(&self) -> PathBuf {
        let mut path = PathBuf::new();
        match self {
            Destination::Subject { subject, topic } => {
                path.push(SUBJECTS_DIR);
                path.push(subject);
                if let Some(topic) = topic {
                    path.push(topic);
                }
            }
            Destination::FileType(category) => {
                path.push(FILE_TYPES_DIR);
                for segment in category.split('/').filter(|s| !s.is_empty()) {
                    path.push(segment);
                }
            }
            Destination::Other => {
                path.push(FILE_TYPES_DIR);
                path.push(OTHER_CATEGORY);
            }
        }
        path
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Destination::Subject { subject, topic } => match topic {
                Some(topic) => write!(f, "{}/{}/{}", SUBJECTS_DIR, subject, topic),
                None => write!(f, "{}/{}", SUBJECTS_DIR, subject),
            },
            Destination::FileType(category) => write!(f, "{}/{}", FILE_TYPES_DIR, category),
            Destination::Other => write!(f, "{}/{}", FILE_TYPES_DIR, OTHER_CATEGORY),
        }
    }
}

/// Pure filename classifier over immutable rule tables.
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    taxonomy: SubjectTaxonomy,
    extensions: ExtensionTable,
}

impl Classifier {
    pub fn new(taxonomy: SubjectTaxonomy, extensions: ExtensionTable) -> Self {
        Self {
            taxonomy,
            extensions,
        }
    }

    pub fn taxonomy(&self) -> &SubjectTaxonomy {
        &self.taxonomy
    }

    pub fn extensions(&self) -> &ExtensionTable {
        &self.extensions
    }

    /// Determines the destination for a filename.
    ///
    /// The strategy is:
    /// 1. Subject keywords, in taxonomy order (case-insensitive substring)
    /// 2. Extension category, case-insensitive
    /// 3. `Destination::Other`
    ///
    /// This never fails.
    pub fn classify(&self, filename: &str) -> Destination {
        if let Some(destination) = self.taxonomy.find(filename) {
            tracing::debug!(filename, %destination, "subject keyword matched");
            return destination;
        }

        let extension = extension_of(filename);
        let destination = match self.extensions.category_for(&extension) {
            Some(category) if !extension.is_empty() => Destination::FileType(category.to_string()),
            _ => Destination::Other,
        };
        tracing::debug!(filename, extension = %extension, %destination, "classified by extension");
        destination
    }
}

/// Returns the lowercase extension of a filename including its dot, or an
/// empty string. Leading dots belong to the name, so `.bashrc` has none.
pub fn extension_of(filename: &str) -> String {
    split_extension(filename).1.to_lowercase()
}

/// Splits a filename into stem and extension (with dot), preserving case.
pub fn split_extension(filename: &str) -> (&str, &str) {
    let leading = filename.len() - filename.trim_start_matches('.').len();
    match filename[leading..].rfind('.') {
        Some(index) => filename.split_at(leading + index),
        None => (filename, ""),
    }
}

fn normalize_extension(extension: &str) -> String {
    let lower = extension.to_lowercase();
    if lower.is_empty() || lower.starts_with('.') {
        lower
    } else {
        format!(".{}", lower)
    }
}

fn lowercase_all<I, S>(keywords: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    keywords
        .into_iter()
        .map(|keyword| keyword.as_ref().to_lowercase())
        .collect()
}

fn contains_any(file_lower: &str, keywords: &[String]) -> bool {
    keywords
        .iter()
        .any(|keyword| !keyword.is_empty() && file_lower.contains(keyword.as_str()))
}
