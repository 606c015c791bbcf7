//! Environment variable binding source.
//!
//! Enumerates prefixed variables from the injected snapshot and binds each
//! one onto the target structure through the [`Bind`] resolver, using `_`
//! as the nesting separator: `APP_DATABASE_HOST` walks `DATABASE`, then
//! `HOST`.
//!
//! A variable that matches the prefix but resolves to no field is silently
//! ignored; it only shows up in the unused-keys diagnostic. A variable that
//! resolves but fails to coerce is collected as an error, and binding
//! continues: one bad variable must not block the others.

use crate::bind::Bind;
use crate::env::ConfigEnv;
use crate::error::{ConfigError, ConfigErrors, SourceLocation};

/// Separator between nesting levels in environment variable names.
pub const ENV_SEPARATOR: char = '_';

/// Environment variable binding source.
///
/// # Example
///
/// ```ignore
/// let mut used = Env::prefix("APP_").bind(&mut config, &env)?;
/// ```
#[derive(Debug, Clone)]
pub struct Env {
    prefix: String,
}

impl Env {
    /// Create an env source with the given prefix.
    ///
    /// Variables whose names start with the prefix become binding
    /// candidates; the prefix is stripped before resolution.
    pub fn prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Bind every prefixed variable onto `target`.
    ///
    /// Returns the fully prefixed names that were consumed, in enumeration
    /// order. Coercion failures accumulate and are returned jointly after
    /// the pass completes.
    pub fn bind<T: Bind>(
        &self,
        target: &mut T,
        env: &dyn ConfigEnv,
    ) -> Result<Vec<String>, ConfigErrors> {
        let mut used = Vec::new();
        let mut errors: Vec<ConfigError> = Vec::new();

        for (name, value) in env.env_vars_with_prefix(&self.prefix) {
            let key = &name[self.prefix.len()..];
            match target.bind_text(key, ENV_SEPARATOR, &value) {
                Ok(true) => {
                    tracing::trace!(var = %name, "bound environment variable");
                    used.push(name);
                }
                Ok(false) => {}
                Err(e) => errors.push(ConfigError::CoerceError {
                    key: key.to_string(),
                    source_location: SourceLocation::env(&name),
                    message: e.to_string(),
                }),
            }
        }

        match ConfigErrors::from_vec(errors) {
            Some(errors) => Err(errors),
            None => Ok(used),
        }
    }

    /// The prefixed variables that matched no field during the last pass.
    ///
    /// Computed by set-subtracting the consumed names from every variable
    /// currently carrying the prefix. Useful for flagging typos in
    /// deployment environments.
    pub fn unused_keys(&self, used: &[String], env: &dyn ConfigEnv) -> Vec<String> {
        env.env_vars_with_prefix(&self.prefix)
            .into_iter()
            .map(|(name, _)| name)
            .filter(|name| !used.contains(name))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coerce::CoerceError;
    use crate::env::MockEnv;

    // Hand-rolled Bind impl so this module's tests do not depend on the
    // derive macro; the derived code has the same shape.
    #[derive(Debug, Default, PartialEq)]
    struct Server {
        listen: String,
        port: u16,
        database: Option<Database>,
    }

    #[derive(Debug, Default, PartialEq)]
    struct Database {
        host: String,
    }

    impl Bind for Server {
        fn bind_text(&mut self, key: &str, sep: char, value: &str) -> Result<bool, CoerceError> {
            if key.is_empty() {
                return Err(CoerceError::Unsupported(std::any::type_name::<Self>()));
            }
            if let Some(rest) = crate::bind::split_key(key, "LISTEN", sep) {
                if self.listen.bind_text(rest, sep, value)? {
                    return Ok(true);
                }
            }
            if let Some(rest) = crate::bind::split_key(key, "PORT", sep) {
                if self.port.bind_text(rest, sep, value)? {
                    return Ok(true);
                }
            }
            if let Some(rest) = crate::bind::split_key(key, "DATABASE", sep) {
                if self.database.bind_text(rest, sep, value)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
    }

    impl Bind for Database {
        fn bind_text(&mut self, key: &str, sep: char, value: &str) -> Result<bool, CoerceError> {
            if key.is_empty() {
                return Err(CoerceError::Unsupported(std::any::type_name::<Self>()));
            }
            if let Some(rest) = crate::bind::split_key(key, "HOST", sep) {
                if self.host.bind_text(rest, sep, value)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
    }

    #[test]
    fn test_bind_flat_and_nested() {
        let env = MockEnv::new()
            .with_env("APP_LISTEN", ":8080")
            .with_env("APP_DATABASE_HOST", "db.internal")
            .with_env("OTHER_LISTEN", "ignored");

        let mut server = Server::default();
        let used = Env::prefix("APP_").bind(&mut server, &env).unwrap();

        assert_eq!(server.listen, ":8080");
        assert_eq!(
            server.database,
            Some(Database {
                host: "db.internal".to_string()
            })
        );
        assert_eq!(used, vec!["APP_DATABASE_HOST", "APP_LISTEN"]);
    }

    #[test]
    fn test_unmatched_variable_is_not_an_error() {
        let env = MockEnv::new()
            .with_env("APP_LISTEN", ":8080")
            .with_env("APP_NO_SUCH_FIELD", "whatever");

        let mut server = Server::default();
        let source = Env::prefix("APP_");
        let used = source.bind(&mut server, &env).unwrap();

        assert_eq!(used, vec!["APP_LISTEN"]);
        assert_eq!(
            source.unused_keys(&used, &env),
            vec!["APP_NO_SUCH_FIELD"]
        );
    }

    #[test]
    fn test_coerce_errors_accumulate_and_do_not_block() {
        let env = MockEnv::new()
            .with_env("APP_LISTEN", ":8080")
            .with_env("APP_PORT", "not-a-port");

        let mut server = Server::default();
        let errors = Env::prefix("APP_").bind(&mut server, &env).unwrap_err();

        assert_eq!(errors.len(), 1);
        match errors.first() {
            ConfigError::CoerceError {
                key,
                source_location,
                ..
            } => {
                assert_eq!(key, "PORT");
                assert_eq!(source_location.source, "env:APP_PORT");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        // The good variable still bound.
        assert_eq!(server.listen, ":8080");
    }

    #[test]
    fn test_no_allocation_for_unmatched_optional_subtree() {
        let env = MockEnv::new().with_env("APP_DATABASE_FLAVOR", "mysql");

        let mut server = Server::default();
        let used = Env::prefix("APP_").bind(&mut server, &env).unwrap();
        assert!(used.is_empty());
        assert_eq!(server.database, None);
    }
}
