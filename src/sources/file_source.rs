//! Config file loading with extension-based decoder dispatch.
//!
//! The extension picks the decoder; every format funnels into a
//! `serde_json::Value` document that is then deep-merged over the target,
//! so defaults survive for fields the file does not mention. YAML and TOML
//! support sit behind the `yaml` and `toml` cargo features; with a feature
//! off its extensions report as unknown.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::env::ConfigEnv;
use crate::error::{ConfigError, ConfigErrors, SourceErrorKind};
use crate::merge;

/// Load the config file at `path` and merge it into `target`.
///
/// A missing file surfaces as a distinguished not-found error; the session
/// decides whether that is fatal.
pub fn load_file<T>(target: &mut T, path: &Path, env: &dyn ConfigEnv) -> Result<(), ConfigErrors>
where
    T: Serialize + DeserializeOwned,
{
    let source_name = path.display().to_string();

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();

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

    let document = decode(&content, extension, &source_name)?;
    tracing::debug!(file = %source_name, format = extension, "loaded config file");
    merge::merge_document(target, document, &source_name).map_err(ConfigErrors::single)
}

fn decode(content: &str, extension: &str, source_name: &str) -> Result<Value, ConfigErrors> {
    match extension {
        "json" => serde_json::from_str(content).map_err(|e| {
            parse_error(
                source_name,
                e.to_string(),
                Some(e.line() as u32),
                Some(e.column() as u32),
            )
        }),
        #[cfg(feature = "yaml")]
        "yaml" | "yml" => serde_yaml::from_str(content).map_err(|e| {
            let location = e.location();
            parse_error(
                source_name,
                e.to_string(),
                location.as_ref().map(|l| l.line() as u32),
                location.as_ref().map(|l| l.column() as u32),
            )
        }),
        #[cfg(feature = "toml")]
        "toml" => toml::from_str(content)
            .map_err(|e| parse_error(source_name, e.to_string(), None, None)),
        other => Err(ConfigErrors::single(ConfigError::UnknownExtension {
            path: source_name.to_string(),
            extension: format!(".{}", other),
        })),
    }
}

fn parse_error(
    source_name: &str,
    message: String,
    line: Option<u32>,
    column: Option<u32>,
) -> ConfigErrors {
    ConfigErrors::single(ConfigError::SourceError {
        source_name: source_name.to_string(),
        kind: SourceErrorKind::ParseError {
            message,
            line,
            column,
        },
    })
}
