//! Built-in organization rules and root directories.
//!
//! The rule tables ship inside the binary as a TOML document
//! (`default_rules.toml`) and are compiled once at startup into the
//! immutable structures the classifier works with. Nothing is read from disk.
//!
//! # Rules Format
//!
//! ```toml
//! roots = ["Desktop", "Downloads"]
//!
//! [[subjects]]
//! name = "resume"
//! keywords = ["resume", "cv"]
//!
//! [[subjects]]
//! name = "school"
//!
//! [[subjects.topics]]
//! name = "math"
//! keywords = ["math", "algebra"]
//!
//! [[file_types]]
//! category = "Programming/Python Scripts"
//! extensions = [".py"]
//! ```
//!
//! Subjects and topics are arrays so their declaration order is preserved;
//! that order is the match priority.

use crate::file_category::{Classifier, ExtensionTable, Subject, SubjectTaxonomy, Topic};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// The rules compiled into the binary.
pub const DEFAULT_RULES: &str = include_str!("default_rules.toml");

/// Errors that can occur while building the organizer configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Invalid TOML syntax or structure.
    #[error("invalid rules: {0}")]
    Invalid(#[from] toml::de::Error),
    /// The same extension was assigned to two categories.
    #[error("extension '{extension}' is mapped to both '{first}' and '{second}'")]
    DuplicateExtension {
        extension: String,
        first: String,
        second: String,
    },
    /// A subject must have either keywords or topics, not both or neither.
    #[error("subject '{0}' must define exactly one of `keywords` or `topics`")]
    AmbiguousSubject(String),
    /// Empty keywords would match every filename.
    #[error("empty keyword in '{0}'")]
    EmptyKeyword(String),
    /// An extension entry without any text after the dot.
    #[error("empty extension in category '{0}'")]
    EmptyExtension(String),
    /// The home directory could not be determined.
    #[error("could not determine the home directory")]
    HomeNotFound,
}

/// Raw rules document, as deserialized from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct RuleSet {
    /// Root folder names, relative to the home directory.
    #[serde(default)]
    pub roots: Vec<String>,

    #[serde(default)]
    pub subjects: Vec<SubjectRule>,

    #[serde(default)]
    pub file_types: Vec<FileTypeRule>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubjectRule {
    pub name: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub topics: Vec<TopicRule>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TopicRule {
    pub name: String,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FileTypeRule {
    pub category: String,
    pub extensions: Vec<String>,
}

impl RuleSet {
    /// Parses a rules document.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if the TOML is malformed.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Parses the rules shipped with the binary.
    pub fn builtin() -> Result<Self, ConfigError> {
        Self::parse(DEFAULT_RULES)
    }

    /// Builds the ordered subject taxonomy, validating every entry.
    pub fn taxonomy(&self) -> Result<SubjectTaxonomy, ConfigError> {
        let subjects = self
            .subjects
            .iter()
            .map(|rule| -> Result<Subject, ConfigError> {
                match (rule.keywords.is_empty(), rule.topics.is_empty()) {
                    (false, true) => {
                        check_keywords(&rule.name, &rule.keywords)?;
                        Ok(Subject::with_keywords(&rule.name, &rule.keywords))
                    }
                    (true, false) => {
                        let topics = rule
                            .topics
                            .iter()
                            .map(|topic| -> Result<Topic, ConfigError> {
                                let label = format!("{}/{}", rule.name, topic.name);
                                check_keywords(&label, &topic.keywords)?;
                                Ok(Topic::new(&topic.name, &topic.keywords))
                            })
                            .collect::<Result<Vec<_>, _>>()?;
                        Ok(Subject::with_topics(&rule.name, topics))
                    }
                    _ => Err(ConfigError::AmbiguousSubject(rule.name.clone())),
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(SubjectTaxonomy::new(subjects))
    }

    /// Builds the extension table. Each extension may appear only once.
    pub fn extension_table(&self) -> Result<ExtensionTable, ConfigError> {
        let mut table = ExtensionTable::new();
        for rule in &self.file_types {
            for extension in &rule.extensions {
                if extension.trim_start_matches('.').is_empty() {
                    return Err(ConfigError::EmptyExtension(rule.category.clone()));
                }
                if let Some(first) = table.insert(extension, rule.category.clone()) {
                    return Err(ConfigError::DuplicateExtension {
                        extension: extension.to_lowercase(),
                        first,
                        second: rule.category.clone(),
                    });
                }
            }
        }
        Ok(table)
    }

    /// Compiles taxonomy and extension table into a classifier.
    pub fn classifier(&self) -> Result<Classifier, ConfigError> {
        Ok(Classifier::new(self.taxonomy()?, self.extension_table()?))
    }

    /// Resolves the root names against a home directory, keeping their order.
    pub fn roots_under(&self, home: &Path) -> Vec<PathBuf> {
        self.roots.iter().map(|name| home.join(name)).collect()
    }
}

fn check_keywords(label: &str, keywords: &[String]) -> Result<(), ConfigError> {
    if keywords.iter().any(|keyword| keyword.is_empty()) {
        return Err(ConfigError::EmptyKeyword(label.to_string()));
    }
    Ok(())
}

/// Everything one organizing run needs: the roots to scan and the classifier.
#[derive(Debug, Clone)]
pub struct OrganizerConfig {
    pub roots: Vec<PathBuf>,
    pub classifier: Classifier,
}

impl OrganizerConfig {
    /// Loads the built-in rules with roots under the current user's home.
    ///
    /// # Errors
    ///
    /// Returns an error if the built-in rules are invalid or the home
    /// directory cannot be determined.
    pub fn load() -> Result<Self, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::HomeNotFound)?;
        Self::for_home(&home)
    }

    /// Loads the built-in rules with roots under `home`.
    pub fn for_home(home: &Path) -> Result<Self, ConfigError> {
        let rules = RuleSet::builtin()?;
        Ok(Self {
            roots: rules.roots_under(home),
            classifier: rules.classifier()?,
        })
    }

    /// Loads the built-in rules but scans the given roots instead.
    pub fn with_roots(roots: Vec<PathBuf>) -> Result<Self, ConfigError> {
        let rules = RuleSet::builtin()?;
        Ok(Self {
            roots,
            classifier: rules.classifier()?,
        })
    }
}
