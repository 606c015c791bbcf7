//! ConfigEnv trait for testable I/O.
//!
//! This module provides the `ConfigEnv` trait that abstracts file system and
//! environment variable access, enabling dependency injection for testing.
//! The core never reads `std::env` or the file system directly; everything
//! flows through this trait, so the whole load/overwrite cycle can run
//! against an in-memory [`MockEnv`].

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// Environment trait for configuration I/O operations.
///
/// # Example
///
/// ```ignore
/// // Production
/// let mut config = Config::builder(AppConfig::default())
///     .env_prefix("APP_")
///     .build();
/// config.read()?; // uses RealEnv
///
/// // Testing
/// let env = MockEnv::new()
///     .with_file("config.yaml", "listen: \":8080\"")
///     .with_env("APP_HOSTNAME", "test.example.com");
/// config.read_with_env(&env)?;
/// ```
pub trait ConfigEnv: Send + Sync {
    /// Read a file's contents as a UTF-8 string.
    ///
    /// # Errors
    ///
    /// Returns `io::Error` if:
    /// - File does not exist (`ErrorKind::NotFound`)
    /// - File is not valid UTF-8
    /// - Permission denied
    /// - Other I/O errors
    fn read_file(&self, path: &Path) -> io::Result<String>;

    /// Write a file, wholly replacing any previous content.
    ///
    /// Used to persist the overwrites ledger.
    fn write_file(&self, path: &Path, content: &str) -> io::Result<()>;

    /// Check if a file exists.
    fn file_exists(&self, path: &Path) -> bool;

    /// Get an environment variable by name.
    ///
    /// Returns `None` if the variable is not set.
    fn get_env(&self, name: &str) -> Option<String>;

    /// Set an environment variable.
    ///
    /// Used by the dotenv import; the variables become visible to the
    /// subsequent environment pass through the same snapshot.
    fn set_env(&self, name: &str, value: &str);

    /// Get all environment variables matching a prefix.
    ///
    /// Returns tuples of (full_name, value).
    fn env_vars_with_prefix(&self, prefix: &str) -> Vec<(String, String)>;
}

/// Production environment using standard library I/O.
///
/// This is a zero-cost abstraction - all methods are simple wrappers
/// around std functions.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealEnv;

impl RealEnv {
    /// Create a new real environment.
    pub fn new() -> Self {
        Self
    }
}

impl ConfigEnv for RealEnv {
    fn read_file(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn write_file(&self, path: &Path, content: &str) -> io::Result<()> {
        std::fs::write(path, content)
    }

    fn file_exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn get_env(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }

    fn set_env(&self, name: &str, value: &str) {
        std::env::set_var(name, value);
    }

    fn env_vars_with_prefix(&self, prefix: &str) -> Vec<(String, String)> {
        std::env::vars()
            .filter(|(k, _)| k.starts_with(prefix))
            .collect()
    }
}

/// Mock file state for testing.
#[derive(Debug, Clone)]
enum MockFile {
    Content(String),
    NotFound,
    PermissionDenied,
}

/// Mock environment for testing configuration loading.
///
/// Files and variables live in `BTreeMap`s so enumeration order is
/// deterministic, which keeps assertions on consumed-key lists stable.
///
/// # Example
///
/// ```
/// use palimpsest::env::MockEnv;
///
/// let env = MockEnv::new()
///     .with_file("config.json", r#"{"listen": ":9090"}"#)
///     .with_env("APP_HOSTNAME", "prod.example.com")
///     .with_env("APP_LISTEN", ":8080");
/// ```
#[derive(Debug, Default)]
pub struct MockEnv {
    files: RwLock<BTreeMap<PathBuf, MockFile>>,
    env_vars: RwLock<BTreeMap<String, String>>,
}

impl MockEnv {
    /// Create a new empty mock environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file with content.
    ///
    /// The path can be relative or absolute.
    pub fn with_file(self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        self.files
            .write()
            .unwrap()
            .insert(path.into(), MockFile::Content(content.into()));
        self
    }

    /// Add a file that will return "not found" error.
    ///
    /// Useful for testing optional file handling.
    pub fn with_missing_file(self, path: impl Into<PathBuf>) -> Self {
        self.files
            .write()
            .unwrap()
            .insert(path.into(), MockFile::NotFound);
        self
    }

    /// Add a file that will return "permission denied" error.
    pub fn with_unreadable_file(self, path: impl Into<PathBuf>) -> Self {
        self.files
            .write()
            .unwrap()
            .insert(path.into(), MockFile::PermissionDenied);
        self
    }

    /// Set an environment variable.
    pub fn with_env(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.env_vars
            .write()
            .unwrap()
            .insert(name.into(), value.into());
        self
    }

    /// Set multiple environment variables from an iterator.
    pub fn with_envs<I, K, V>(self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut env_vars = self.env_vars.write().unwrap();
        for (k, v) in vars {
            env_vars.insert(k.into(), v.into());
        }
        drop(env_vars);
        self
    }

    /// Mutate the mock environment after creation.
    ///
    /// Useful for tests that modify files during execution.
    pub fn set_file(&self, path: impl Into<PathBuf>, content: impl Into<String>) {
        self.files
            .write()
            .unwrap()
            .insert(path.into(), MockFile::Content(content.into()));
    }

    /// Remove a file from the mock environment.
    pub fn remove_file(&self, path: impl AsRef<Path>) {
        self.files.write().unwrap().remove(path.as_ref());
    }

    /// Remove an environment variable.
    pub fn remove_env(&self, name: &str) {
        self.env_vars.write().unwrap().remove(name);
    }
}

impl ConfigEnv for MockEnv {
    fn read_file(&self, path: &Path) -> io::Result<String> {
        let files = self.files.read().unwrap();

        match files.get(path) {
            Some(MockFile::Content(content)) => Ok(content.clone()),
            Some(MockFile::NotFound) | None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("mock file not found: {}", path.display()),
            )),
            Some(MockFile::PermissionDenied) => Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("mock permission denied: {}", path.display()),
            )),
        }
    }

    fn write_file(&self, path: &Path, content: &str) -> io::Result<()> {
        let mut files = self.files.write().unwrap();
        if let Some(MockFile::PermissionDenied) = files.get(path) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("mock permission denied: {}", path.display()),
            ));
        }
        files.insert(path.to_path_buf(), MockFile::Content(content.to_string()));
        Ok(())
    }

    fn file_exists(&self, path: &Path) -> bool {
        let files = self.files.read().unwrap();
        matches!(files.get(path), Some(MockFile::Content(_)))
    }

    fn get_env(&self, name: &str) -> Option<String> {
        self.env_vars.read().unwrap().get(name).cloned()
    }

    fn set_env(&self, name: &str, value: &str) {
        self.env_vars
            .write()
            .unwrap()
            .insert(name.to_string(), value.to_string());
    }

    fn env_vars_with_prefix(&self, prefix: &str) -> Vec<(String, String)> {
        self.env_vars
            .read()
            .unwrap()
            .iter()
            .filter(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}
