//! Layered configuration binding with persistent runtime overwrites.
//!
//! A `palimpsest` configuration is written in layers: the defaults you
//! construct, a `.env` import, prefixed environment variables, a config
//! file, and finally a ledger of runtime overwrites that is persisted to
//! disk and survives restarts. Each layer only covers what it actually
//! mentions; everything underneath shows through.
//!
//! # Example
//!
//! ```
//! use palimpsest::{Bind, Config, env::MockEnv};
//! use serde::{Deserialize, Serialize};
//! use serde_json::json;
//!
//! #[derive(Bind, Serialize, Deserialize)]
//! #[serde(default)]
//! struct AppConfig {
//!     listen: String,
//!     hostname: String,
//! }
//!
//! impl Default for AppConfig {
//!     fn default() -> Self {
//!         Self { listen: ":80".into(), hostname: "example.com".into() }
//!     }
//! }
//!
//! # fn main() -> Result<(), palimpsest::ConfigErrors> {
//! let env = MockEnv::new()
//!     .with_env("APP_LISTEN", ":8080")
//!     .with_file("config.json", r#"{"hostname": "prod.example.com"}"#);
//!
//! let mut config = Config::builder(AppConfig::default())
//!     .env_prefix("APP_")
//!     .file("config.json")
//!     .overwrites_file("local.json")
//!     .build();
//! config.read_with_env(&env)?;
//! assert_eq!(config.listen, ":8080");
//! assert_eq!(config.hostname, "prod.example.com");
//!
//! // Runtime overwrites beat every other source and persist to local.json.
//! config.overwrite_with_env([("listen", json!(":9090"))], &env)?;
//! assert_eq!(config.listen, ":9090");
//! # Ok(())
//! # }
//! ```
//!
//! # Structure binding
//!
//! `#[derive(Bind)]` maps environment variable suffixes onto fields: the
//! source key is the upper-cased field name (or `#[bind(rename = "...")]`),
//! `_` separates nesting levels, and `#[bind(skip)]` hides a field from
//! binding entirely. `Option<T>` subtrees are allocated only when a variable
//! actually addresses them.
//!
//! # Testability
//!
//! All I/O flows through the [`ConfigEnv`](env::ConfigEnv) trait. Production
//! code uses [`RealEnv`](env::RealEnv) implicitly via [`Config::read`];
//! tests inject a [`MockEnv`](env::MockEnv) and never touch process state.

pub mod bind;
pub mod coerce;
pub mod env;
pub mod error;
pub mod merge;
pub mod overwrites;
pub mod session;
pub mod sources;

pub use bind::{split_key, Bind};
pub use coerce::CoerceError;
pub use env::{ConfigEnv, MockEnv, RealEnv};
pub use error::{ConfigError, ConfigErrors, SourceErrorKind, SourceLocation};
pub use overwrites::Overwrites;
pub use session::{Config, ConfigBuilder};
pub use sources::{load_dotenv, load_file, Env};

/// Derive a [`Bind`] implementation for a struct with named fields.
#[cfg(feature = "derive")]
pub use palimpsest_derive::Bind;
