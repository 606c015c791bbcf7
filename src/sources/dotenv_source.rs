//! Dotenv import: seed the environment snapshot from a `.env` file.
//!
//! Line-oriented `KEY=value` format. Blank lines and `#` comments are
//! ignored; everything else must contain a `=`. Both sides are trimmed.

use std::path::Path;

use crate::env::ConfigEnv;
use crate::error::{ConfigError, ConfigErrors, SourceErrorKind};

/// Parse dotenv content into name/value pairs.
///
/// A line without `=` is a hard parse error carrying the line number.
pub fn parse_dotenv(content: &str, source_name: &str) -> Result<Vec<(String, String)>, ConfigError> {
    let mut pairs = Vec::new();
    for (index, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some(eq) = line.find('=') else {
            return Err(ConfigError::SourceError {
                source_name: source_name.to_string(),
                kind: SourceErrorKind::ParseError {
                    message: format!("bad line {:?}: missing '='", line),
                    line: Some(index as u32 + 1),
                    column: None,
                },
            });
        };
        let name = line[..eq].trim().to_string();
        let value = line[eq + 1..].trim().to_string();
        pairs.push((name, value));
    }
    Ok(pairs)
}

/// Read the dotenv file at `path` and import each pair into the snapshot.
///
/// A missing file surfaces as a not-found error; the session tolerates that
/// one, so a project without a `.env` file just skips this stage.
pub fn load_dotenv(path: &Path, env: &dyn ConfigEnv) -> Result<(), ConfigErrors> {
    let source_name = path.display().to_string();
    let content = env.read_file(path).map_err(|e| {
        let kind = if e.kind() == std::io::ErrorKind::NotFound {
            SourceErrorKind::NotFound {
                path: source_name.clone(),
            }
        } else {
            SourceErrorKind::IoError {
                message: e.to_string(),
            }
        };
        ConfigErrors::single(ConfigError::SourceError {
            source_name: source_name.clone(),
            kind,
        })
    })?;

    let pairs = parse_dotenv(&content, &source_name).map_err(ConfigErrors::single)?;
    tracing::debug!(file = %source_name, count = pairs.len(), "imported dotenv variables");
    for (name, value) in pairs {
        env.set_env(&name, &value);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::MockEnv;

    #[test]
    fn test_parse_basic_pairs() {
        let pairs = parse_dotenv("A=1\nB=two\n", ".env").unwrap();
        assert_eq!(
            pairs,
            vec![
                ("A".to_string(), "1".to_string()),
                ("B".to_string(), "two".to_string()),
            ]
        );
    }

    #[test]
    fn test_parse_skips_blanks_and_comments() {
        let content = "\n# comment\n  \nA=1\n  # indented comment\n";
        let pairs = parse_dotenv(content, ".env").unwrap();
        assert_eq!(pairs, vec![("A".to_string(), "1".to_string())]);
    }

    #[test]
    fn test_parse_trims_both_sides() {
        let pairs = parse_dotenv("  KEY =  value with spaces  \n", ".env").unwrap();
        assert_eq!(
            pairs,
            vec![("KEY".to_string(), "value with spaces".to_string())]
        );
    }

    #[test]
    fn test_parse_value_may_contain_equals() {
        let pairs = parse_dotenv("URL=postgres://u:p@host/db?a=b\n", ".env").unwrap();
        assert_eq!(pairs[0].1, "postgres://u:p@host/db?a=b");
    }

    #[test]
    fn test_parse_missing_equals_is_error() {
        let err = parse_dotenv("A=1\nbroken line\n", ".env").unwrap_err();
        match err {
            ConfigError::SourceError {
                kind: SourceErrorKind::ParseError { line, .. },
                ..
            } => assert_eq!(line, Some(2)),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_load_sets_variables_in_snapshot() {
        let env = MockEnv::new().with_file(".env", "APP_LISTEN=:8080\n");
        load_dotenv(Path::new(".env"), &env).unwrap();
        assert_eq!(env.get_env("APP_LISTEN"), Some(":8080".to_string()));
    }

    #[test]
    fn test_load_missing_file_is_not_found() {
        let env = MockEnv::new();
        let errors = load_dotenv(Path::new(".env"), &env).unwrap_err();
        assert!(errors.is_not_found());
    }
}
