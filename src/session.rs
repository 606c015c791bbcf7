//! The configuration session: one typed value, every source layered onto it.
//!
//! `Config<T>` owns the target structure and orchestrates the fixed read
//! order: dotenv import, environment binding, config file, persisted
//! overwrites. The overwrites ledger is applied last and therefore always
//! wins; runtime `overwrite` calls feed the same ledger and persist it.
//!
//! The session is synchronous and single-threaded. Callers who overwrite
//! from several threads serialize those calls themselves.

use std::ops::{Deref, DerefMut};
use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::bind::Bind;
use crate::env::{ConfigEnv, RealEnv};
use crate::error::ConfigErrors;
use crate::overwrites::Overwrites;
use crate::sources::{load_dotenv, load_file, Env};

/// Builder for a [`Config`] session.
#[derive(Debug)]
pub struct ConfigBuilder<T> {
    value: T,
    env_prefix: Option<String>,
    file: Option<PathBuf>,
    overwrites_file: Option<PathBuf>,
    dotenv_file: Option<PathBuf>,
}

impl<T> ConfigBuilder<T> {
    /// Bind environment variables carrying this prefix.
    ///
    /// Without a prefix the environment stage is skipped entirely.
    pub fn env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = Some(prefix.into());
        self
    }

    /// Load this config file during [`Config::read`].
    pub fn file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    /// Persist and reload runtime overwrites through this file.
    pub fn overwrites_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.overwrites_file = Some(path.into());
        self
    }

    /// Import this dotenv file before the environment pass.
    ///
    /// Defaults to `.env`; a missing file is tolerated.
    pub fn dotenv_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.dotenv_file = Some(path.into());
        self
    }

    /// Skip the environment binding stage.
    pub fn skip_env(mut self) -> Self {
        self.env_prefix = None;
        self
    }

    /// Skip the dotenv import stage.
    pub fn skip_dotenv(mut self) -> Self {
        self.dotenv_file = None;
        self
    }

    /// Finish building the session.
    pub fn build(self) -> Config<T> {
        Config {
            value: self.value,
            env_prefix: self.env_prefix,
            file: self.file,
            overwrites_file: self.overwrites_file,
            dotenv_file: self.dotenv_file,
            used_env_keys: Vec::new(),
            overwrites: Overwrites::new(),
        }
    }
}

/// A configuration session around a typed value.
///
/// # Example
///
/// ```ignore
/// let mut config = Config::builder(AppConfig::default())
///     .env_prefix("APP_")
///     .file("config.yaml")
///     .overwrites_file("local.json")
///     .build();
/// config.read()?;
/// println!("listening on {}", config.listen);
/// ```
#[derive(Debug)]
pub struct Config<T> {
    value: T,
    env_prefix: Option<String>,
    file: Option<PathBuf>,
    overwrites_file: Option<PathBuf>,
    dotenv_file: Option<PathBuf>,
    used_env_keys: Vec<String>,
    overwrites: Overwrites,
}

impl<T> Config<T> {
    /// Start building a session around `initial`, typically the defaults.
    pub fn builder(initial: T) -> ConfigBuilder<T> {
        ConfigBuilder {
            value: initial,
            env_prefix: None,
            file: None,
            overwrites_file: None,
            dotenv_file: Some(PathBuf::from(".env")),
        }
    }

    /// Borrow the configured value.
    pub fn get(&self) -> &T {
        &self.value
    }

    /// Unwrap the session, keeping only the value.
    pub fn into_inner(self) -> T {
        self.value
    }

    /// The fully prefixed environment variable names consumed by the last
    /// [`read`](Config::read).
    pub fn used_env_keys(&self) -> &[String] {
        &self.used_env_keys
    }

    /// The currently active overwrites ledger.
    pub fn overwrites(&self) -> &Overwrites {
        &self.overwrites
    }
}

impl<T> Config<T>
where
    T: Bind + Serialize + DeserializeOwned,
{
    /// Read every configured source against the process environment.
    pub fn read(&mut self) -> Result<(), ConfigErrors> {
        self.read_with_env(&RealEnv)
    }

    /// Read every configured source, in fixed precedence order.
    ///
    /// Dotenv import first (missing file tolerated), then environment
    /// binding, then the config file, then the persisted overwrites, which
    /// land last and therefore take precedence over everything else.
    pub fn read_with_env(&mut self, env: &dyn ConfigEnv) -> Result<(), ConfigErrors> {
        if let Some(path) = &self.dotenv_file {
            match load_dotenv(path, env) {
                Ok(()) => {}
                Err(errors) if errors.is_not_found() => {
                    tracing::debug!(file = %path.display(), "no dotenv file, skipping");
                }
                Err(errors) => return Err(errors),
            }
        }

        if let Some(prefix) = &self.env_prefix {
            let source = Env::prefix(prefix.clone());
            self.used_env_keys = source.bind(&mut self.value, env)?;
            let unused = source.unused_keys(&self.used_env_keys, env);
            if !unused.is_empty() {
                tracing::warn!(vars = ?unused, "environment variables matched no field");
            }
        }

        if let Some(path) = &self.file {
            load_file(&mut self.value, path, env)?;
        }

        if let Some(path) = &self.overwrites_file {
            match Overwrites::load(&mut self.value, path, env) {
                Ok(ledger) => {
                    tracing::debug!(
                        file = %path.display(),
                        entries = ledger.len(),
                        "applied persisted overwrites"
                    );
                    self.overwrites = ledger;
                }
                Err(errors) if errors.is_not_found() => {
                    self.overwrites = Overwrites::new();
                }
                Err(errors) => return Err(errors),
            }
        }

        Ok(())
    }

    /// Apply runtime overwrites and persist the updated ledger.
    pub fn overwrite<I, K>(&mut self, entries: I) -> Result<(), ConfigErrors>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        self.overwrite_with_env(entries, &RealEnv)
    }

    /// Apply runtime overwrites against an injected environment.
    ///
    /// Entries apply in sorted key order; each applied entry is recorded
    /// into the ledger, evicting stale descendants. An apply failure aborts
    /// before the persist step, so the file on disk never reflects a batch
    /// that did not fully apply. An empty batch is a no-op and touches no
    /// file.
    pub fn overwrite_with_env<I, K>(
        &mut self,
        entries: I,
        env: &dyn ConfigEnv,
    ) -> Result<(), ConfigErrors>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let batch: Overwrites = entries.into_iter().collect();
        if batch.is_empty() {
            tracing::debug!("empty overwrite batch, nothing to do");
            return Ok(());
        }

        let source_name = self
            .overwrites_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "overwrite".to_string());
        for (key, value) in batch.iter() {
            crate::merge::apply(&mut self.value, key, value, &source_name)?;
            self.overwrites.record(key.clone(), value.clone());
        }

        if let Some(path) = &self.overwrites_file {
            self.overwrites.persist(path, env)?;
            tracing::debug!(
                file = %path.display(),
                entries = self.overwrites.len(),
                "persisted overwrites"
            );
        }
        Ok(())
    }

    /// The prefixed environment variables the last read left unconsumed.
    pub fn unused_env_keys(&self) -> Vec<String> {
        self.unused_env_keys_with_env(&RealEnv)
    }

    /// Unconsumed prefixed variables, enumerated from an injected
    /// environment.
    pub fn unused_env_keys_with_env(&self, env: &dyn ConfigEnv) -> Vec<String> {
        match &self.env_prefix {
            Some(prefix) => {
                Env::prefix(prefix.clone()).unused_keys(&self.used_env_keys, env)
            }
            None => Vec::new(),
        }
    }
}

impl<T> Deref for Config<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T> DerefMut for Config<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.value
    }
}
