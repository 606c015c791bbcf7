//! Error types for the palimpsest configuration library.
//!
//! Errors carry source location tracking (which file, which environment
//! variable) and accumulate through stillwater's `NonEmptyVec` and
//! `Semigroup` so one bad input never hides the others.

use std::fmt;

use stillwater::{NonEmptyVec, Semigroup};

/// Location where a configuration value originated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    /// Name of the source (e.g., "config.yaml", "env:APP_HOST")
    pub source: String,
    /// Line number in the source (1-indexed), if applicable
    pub line: Option<u32>,
    /// Column number in the source (1-indexed), if applicable
    pub column: Option<u32>,
}

impl SourceLocation {
    /// Create a new source location with just a source name.
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            line: None,
            column: None,
        }
    }

    /// Add a line number to this location.
    pub fn with_line(mut self, line: u32) -> Self {
        self.line = Some(line);
        self
    }

    /// Add a column number to this location.
    pub fn with_column(mut self, column: u32) -> Self {
        self.column = Some(column);
        self
    }

    /// Create a location for an environment variable.
    pub fn env(var_name: &str) -> Self {
        Self::new(format!("env:{}", var_name))
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.line, self.column) {
            (Some(line), Some(col)) => write!(f, "{}:{}:{}", self.source, line, col),
            (Some(line), None) => write!(f, "{}:{}", self.source, line),
            _ => write!(f, "{}", self.source),
        }
    }
}

/// Kinds of source loading errors.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceErrorKind {
    /// Source file was not found
    NotFound { path: String },
    /// Source file could not be read or written
    IoError { message: String },
    /// Source content could not be parsed
    ParseError {
        message: String,
        line: Option<u32>,
        column: Option<u32>,
    },
}

impl fmt::Display for SourceErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceErrorKind::NotFound { path } => write!(f, "file not found: {}", path),
            SourceErrorKind::IoError { message } => write!(f, "I/O error: {}", message),
            SourceErrorKind::ParseError {
                message,
                line,
                column,
            } => {
                write!(f, "parse error: {}", message)?;
                if let Some(l) = line {
                    write!(f, " at line {}", l)?;
                    if let Some(c) = column {
                        write!(f, ", column {}", c)?;
                    }
                }
                Ok(())
            }
        }
    }
}

/// Errors that can occur while loading, binding, or overwriting
/// configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A configuration source failed to load or persist
    SourceError {
        source_name: String,
        kind: SourceErrorKind,
    },

    /// An environment variable matched a field but its value could not be
    /// coerced into the field's type
    CoerceError {
        key: String,
        source_location: SourceLocation,
        message: String,
    },

    /// An overwrite entry could not be merged into the target structure
    OverwriteError {
        key: String,
        source_name: String,
        message: String,
    },

    /// The config file's extension maps to no known decoder
    UnknownExtension { path: String, extension: String },
}

impl ConfigError {
    /// Get the key or path that this error relates to, if any.
    pub fn key(&self) -> Option<&str> {
        match self {
            ConfigError::CoerceError { key, .. } => Some(key),
            ConfigError::OverwriteError { key, .. } => Some(key),
            ConfigError::SourceError { .. } => None,
            ConfigError::UnknownExtension { .. } => None,
        }
    }

    /// Whether this error reports a missing file.
    ///
    /// Callers use this to implement "defaults if the file is absent": a
    /// missing config or overwrites file is routine, a malformed one is not.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ConfigError::SourceError {
                kind: SourceErrorKind::NotFound { .. },
                ..
            }
        )
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::SourceError { source_name, kind } => {
                write!(f, "{}: {}", source_name, kind)
            }
            ConfigError::CoerceError {
                key,
                source_location,
                message,
            } => {
                write!(f, "[{}] '{}': {}", source_location, key, message)
            }
            ConfigError::OverwriteError {
                key,
                source_name,
                message,
            } => {
                write!(f, "{}: overwrite \"{}\": {}", source_name, key, message)
            }
            ConfigError::UnknownExtension { path, extension } => {
                write!(f, "{}: unknown file extension {:?}", path, extension)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// A non-empty collection of configuration errors.
///
/// Uses `NonEmptyVec` from stillwater to guarantee at least one error
/// exists. This prevents the "empty error list" anti-pattern and enables
/// safe `first()`.
#[derive(Debug, Clone)]
pub struct ConfigErrors(pub NonEmptyVec<ConfigError>);

impl ConfigErrors {
    /// Create from a single error.
    pub fn single(error: ConfigError) -> Self {
        Self(NonEmptyVec::singleton(error))
    }

    /// Try to create from a vec, returning None if empty.
    pub fn from_vec(errors: Vec<ConfigError>) -> Option<Self> {
        NonEmptyVec::from_vec(errors).map(Self)
    }

    /// Get the first error (always exists).
    pub fn first(&self) -> &ConfigError {
        self.0.head()
    }

    /// Number of errors.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if empty (always false, but required for API consistency).
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Iterate over errors.
    pub fn iter(&self) -> impl Iterator<Item = &ConfigError> {
        self.0.iter()
    }

    /// Whether every contained error reports a missing file.
    ///
    /// In practice a not-found condition surfaces alone, so this is the
    /// collection-level counterpart of [`ConfigError::is_not_found`].
    pub fn is_not_found(&self) -> bool {
        self.iter().all(ConfigError::is_not_found)
    }
}

impl Semigroup for ConfigErrors {
    fn combine(self, other: Self) -> Self {
        Self(self.0.combine(other.0))
    }
}

impl From<ConfigError> for ConfigErrors {
    fn from(error: ConfigError) -> Self {
        Self::single(error)
    }
}

impl IntoIterator for ConfigErrors {
    type Item = ConfigError;
    type IntoIter = std::vec::IntoIter<ConfigError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_vec().into_iter()
    }
}

impl fmt::Display for ConfigErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Configuration errors ({}):", self.len())?;
        for error in self.iter() {
            writeln!(f, "  {}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ConfigErrors {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_location_display() {
        let loc = SourceLocation::new("config.yaml");
        assert_eq!(format!("{}", loc), "config.yaml");

        let loc = SourceLocation::new("config.yaml").with_line(10);
        assert_eq!(format!("{}", loc), "config.yaml:10");

        let loc = SourceLocation::new("config.yaml")
            .with_line(10)
            .with_column(5);
        assert_eq!(format!("{}", loc), "config.yaml:10:5");
    }

    #[test]
    fn test_source_location_env() {
        let loc = SourceLocation::env("APP_HOST");
        assert_eq!(loc.source, "env:APP_HOST");
    }

    #[test]
    fn test_config_error_key() {
        let err = ConfigError::CoerceError {
            key: "LISTEN".to_string(),
            source_location: SourceLocation::env("APP_LISTEN"),
            message: "invalid integer".to_string(),
        };
        assert_eq!(err.key(), Some("LISTEN"));

        let err = ConfigError::UnknownExtension {
            path: "config.ini".to_string(),
            extension: ".ini".to_string(),
        };
        assert_eq!(err.key(), None);
    }

    #[test]
    fn test_is_not_found() {
        let missing = ConfigError::SourceError {
            source_name: "local.json".to_string(),
            kind: SourceErrorKind::NotFound {
                path: "local.json".to_string(),
            },
        };
        assert!(missing.is_not_found());
        assert!(ConfigErrors::single(missing).is_not_found());

        let io = ConfigError::SourceError {
            source_name: "local.json".to_string(),
            kind: SourceErrorKind::IoError {
                message: "permission denied".to_string(),
            },
        };
        assert!(!io.is_not_found());
        assert!(!ConfigErrors::single(io).is_not_found());
    }

    #[test]
    fn test_config_errors_combine() {
        let e1 = ConfigErrors::single(ConfigError::UnknownExtension {
            path: "a.ini".to_string(),
            extension: ".ini".to_string(),
        });
        let e2 = ConfigErrors::single(ConfigError::CoerceError {
            key: "PORT".to_string(),
            source_location: SourceLocation::env("APP_PORT"),
            message: "invalid integer".to_string(),
        });
        let combined = e1.combine(e2);
        assert_eq!(combined.len(), 2);
    }

    #[test]
    fn test_config_errors_display_lists_each() {
        let errors = ConfigErrors::from_vec(vec![
            ConfigError::CoerceError {
                key: "PORT".to_string(),
                source_location: SourceLocation::env("APP_PORT"),
                message: "invalid integer: x".to_string(),
            },
            ConfigError::OverwriteError {
                key: "a.b".to_string(),
                source_name: "local.json".to_string(),
                message: "expected object".to_string(),
            },
        ])
        .unwrap();

        let rendered = format!("{}", errors);
        assert!(rendered.contains("Configuration errors (2):"));
        assert!(rendered.contains("[env:APP_PORT] 'PORT': invalid integer: x"));
        assert!(rendered.contains("local.json: overwrite \"a.b\": expected object"));
    }
}
