//! The overwrites ledger: dot-path keys mapped to JSON patch values.
//!
//! The ledger is both the patch set applied over the other sources and the
//! durable record written back to the overwrites file. It is backed by a
//! `BTreeMap`, so iteration — and therefore patch application and the
//! persisted key order — is always lexicographically sorted, independent of
//! how callers assembled their input.

use std::collections::BTreeMap;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use stillwater::Semigroup;

use crate::env::ConfigEnv;
use crate::error::{ConfigError, ConfigErrors, SourceErrorKind};
use crate::merge;

/// The set of currently active runtime overwrites.
///
/// Invariant: no two entries stand in an ancestor/descendant relationship.
/// [`record`](Overwrites::record) maintains this by evicting every key
/// nested under a newly written one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Overwrites(BTreeMap<String, Value>);

impl Overwrites {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an overwrite at `key`, evicting descendants.
    ///
    /// Every existing entry whose key begins with `key + "."` is removed: a
    /// broader overwrite supersedes the narrower ones beneath it, so a stale
    /// partial overwrite can never resurface over a coarser-grained one. The
    /// eviction is a literal dot-joined prefix match and runs after the
    /// insert, so recording a key over itself is harmless.
    pub fn record(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        let child_prefix = format!("{}.", key);
        self.0.insert(key, value);
        self.0.retain(|k, _| !k.starts_with(&child_prefix));
    }

    /// Get the patch value recorded at `key`, if any.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Whether an entry exists at exactly `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the ledger has no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate entries in sorted key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Apply every entry to `target` in sorted key order.
    ///
    /// Per-entry failures are collected, not short-circuited: one bad entry
    /// must not block the others from applying, and all failures are
    /// reported jointly.
    pub fn apply_all<T>(&self, target: &mut T, source_name: &str) -> Result<(), ConfigErrors>
    where
        T: Serialize + DeserializeOwned,
    {
        let mut errors: Option<ConfigErrors> = None;
        for (key, value) in self.iter() {
            if let Err(e) = merge::apply(target, key, value, source_name) {
                errors = Some(match errors {
                    Some(prior) => prior.combine(e),
                    None => e,
                });
            }
        }
        match errors {
            Some(errors) => Err(errors),
            None => Ok(()),
        }
    }

    /// Load the ledger from `path` and apply it to `target`.
    ///
    /// A missing file surfaces as a distinguished not-found error so callers
    /// can treat it as "no overwrites yet". Application errors are collected
    /// per key and returned jointly.
    pub fn load<T>(
        target: &mut T,
        path: &Path,
        env: &dyn ConfigEnv,
    ) -> Result<Self, ConfigErrors>
    where
        T: Serialize + DeserializeOwned,
    {
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

        let ledger: Overwrites = serde_json::from_str(&content).map_err(|e| {
            ConfigErrors::single(ConfigError::SourceError {
                source_name: source_name.clone(),
                kind: SourceErrorKind::ParseError {
                    message: e.to_string(),
                    line: Some(e.line() as u32),
                    column: Some(e.column() as u32),
                },
            })
        })?;

        ledger.apply_all(target, &source_name)?;
        Ok(ledger)
    }

    /// Serialize the ledger and wholly replace the file at `path`.
    ///
    /// `BTreeMap` serialization keeps the key order stable, so repeated
    /// persists of the same ledger produce byte-identical files and clean
    /// diffs.
    pub fn persist(&self, path: &Path, env: &dyn ConfigEnv) -> Result<(), ConfigErrors> {
        let source_name = path.display().to_string();
        // Ledger values are plain JSON; serialization cannot fail.
        let content =
            serde_json::to_string_pretty(self).expect("ledger is always serializable");
        env.write_file(path, &content).map_err(|e| {
            ConfigErrors::single(ConfigError::SourceError {
                source_name,
                kind: SourceErrorKind::IoError {
                    message: e.to_string(),
                },
            })
        })
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Overwrites {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl IntoIterator for Overwrites {
    type Item = (String, Value);
    type IntoIter = std::collections::btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
