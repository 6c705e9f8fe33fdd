//! Configuration loading and management
//!
//! Settings come from a YAML file or from environment variables (after
//! `.env` has been loaded by the binary). Both paths end in
//! [`AppConfig::validate`].

use crate::core::error::ConfigError;
use crate::core::service::WordUniqueness;
use crate::core::vocabulary::MarkerSet;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Token lifetime in development
pub const DEV_TOKEN_TTL_SECS: u64 = 5 * 60;

/// Token lifetime otherwise
pub const PROD_TOKEN_TTL_SECS: u64 = 12 * 60 * 60;

/// Longest accepted token lifetime
pub const MAX_TOKEN_TTL_SECS: u64 = 30 * 24 * 60 * 60;

/// Minimum secret key length in production
pub const MIN_PROD_SECRET_LEN: usize = 32;

/// Origins allowed by CORS in development
pub const DEV_ORIGINS: &[&str] = &["http://localhost", "http://localhost:5273"];

/// Deployment mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "development" | "dev" => Some(Environment::Development),
            "production" | "prod" => Some(Environment::Production),
            _ => None,
        }
    }

    pub fn is_development(&self) -> bool {
        matches!(self, Environment::Development)
    }
}

/// How bulk imports treat invalid items
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportPolicy {
    /// First failure aborts the import, nothing is stored
    #[default]
    Atomic,
    /// Valid items are stored, invalid ones are reported
    Partial,
}

impl ImportPolicy {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "atomic" => Some(ImportPolicy::Atomic),
            "partial" => Some(ImportPolicy::Partial),
            _ => None,
        }
    }
}

/// Complete application configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub environment: Environment,

    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Key used to sign access tokens
    pub secret_key: String,

    /// The single configured principal
    pub username: String,

    /// Salted hash produced by `tomostudy hash-password`
    pub password_hash: String,

    pub api_key: String,

    /// Allowed CORS origin outside development
    #[serde(default)]
    pub allow_origin: Option<String>,

    /// Overrides the environment-dependent token lifetime
    #[serde(default)]
    pub token_ttl_secs: Option<u64>,

    #[serde(default)]
    pub word_uniqueness: WordUniqueness,

    #[serde(default)]
    pub marker_values: MarkerSet,

    #[serde(default)]
    pub import_policy: ImportPolicy,

    /// Defaults to enabled in development only
    #[serde(default)]
    pub export_enabled: Option<bool>,

    #[serde(default = "default_true")]
    pub revoke_on_logout: bool,
}

fn default_bind_addr() -> String {
    "127.0.0.1:8000".to_string()
}

fn default_true() -> bool {
    true
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("environment", &self.environment)
            .field("bind_addr", &self.bind_addr)
            .field("secret_key", &"<redacted>")
            .field("username", &self.username)
            .field("password_hash", &"<redacted>")
            .field("api_key", &"<redacted>")
            .field("allow_origin", &self.allow_origin)
            .field("token_ttl_secs", &self.token_ttl_secs)
            .field("word_uniqueness", &self.word_uniqueness)
            .field("marker_values", &self.marker_values)
            .field("import_policy", &self.import_policy)
            .field("export_enabled", &self.export_enabled)
            .field("revoke_on_logout", &self.revoke_on_logout)
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError {
            file: Some(path.display().to_string()),
            message: e.to_string(),
        })
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load configuration from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &str| {
            lookup(name).ok_or_else(|| ConfigError::MissingField {
                field: name.to_string(),
            })
        };

        Ok(Self {
            environment: parse_var(&lookup, "APP_ENV", Environment::parse)?.unwrap_or_default(),
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(default_bind_addr),
            secret_key: required("SECRET_KEY")?,
            username: required("USER_NAME")?,
            password_hash: required("USER_PASSWORD_HASH")?,
            api_key: required("API_KEY")?,
            allow_origin: lookup("ALLOW_ORIGIN"),
            token_ttl_secs: parse_var(&lookup, "TOKEN_TTL_SECS", |v| v.parse().ok())?,
            word_uniqueness: parse_var(&lookup, "WORD_UNIQUENESS", WordUniqueness::parse)?
                .unwrap_or_default(),
            marker_values: parse_var(&lookup, "MARKER_VALUES", MarkerSet::parse)?
                .unwrap_or_default(),
            import_policy: parse_var(&lookup, "IMPORT_POLICY", ImportPolicy::parse)?
                .unwrap_or_default(),
            export_enabled: parse_var(&lookup, "EXPORT_ENABLED", parse_bool)?,
            revoke_on_logout: parse_var(&lookup, "REVOKE_ON_LOGOUT", parse_bool)?
                .unwrap_or(true),
        })
    }

    /// Reject configurations the server must not start with
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("secret_key", &self.secret_key),
            ("username", &self.username),
            ("password_hash", &self.password_hash),
            ("api_key", &self.api_key),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    message: "must not be empty".to_string(),
                });
            }
        }

        if !self.environment.is_development() {
            if self.secret_key.len() < MIN_PROD_SECRET_LEN {
                return Err(ConfigError::InvalidValue {
                    field: "secret_key".to_string(),
                    message: format!("must be at least {MIN_PROD_SECRET_LEN} bytes in production"),
                });
            }
            if self.allow_origin.as_deref().is_none_or(str::is_empty) {
                return Err(ConfigError::MissingField {
                    field: "allow_origin".to_string(),
                });
            }
        }

        match self.token_ttl_secs {
            Some(0) => {
                return Err(ConfigError::InvalidValue {
                    field: "token_ttl_secs".to_string(),
                    message: "must be positive".to_string(),
                });
            }
            Some(secs) if secs > MAX_TOKEN_TTL_SECS => {
                return Err(ConfigError::InvalidValue {
                    field: "token_ttl_secs".to_string(),
                    message: format!("must be at most {MAX_TOKEN_TTL_SECS} seconds"),
                });
            }
            _ => {}
        }

        Ok(())
    }

    pub fn token_ttl(&self) -> chrono::Duration {
        let secs = self.token_ttl_secs.unwrap_or(if self.environment.is_development() {
            DEV_TOKEN_TTL_SECS
        } else {
            PROD_TOKEN_TTL_SECS
        });
        let secs = secs.min(MAX_TOKEN_TTL_SECS) as i64;
        chrono::Duration::seconds(secs)
    }

    pub fn export_allowed(&self) -> bool {
        self.export_enabled
            .unwrap_or(self.environment.is_development())
    }

    pub fn cors_origins(&self) -> Vec<String> {
        if self.environment.is_development() {
            DEV_ORIGINS.iter().map(|o| o.to_string()).collect()
        } else {
            self.allow_origin.iter().cloned().collect()
        }
    }

    /// Whether the session cookie carries the `Secure` attribute
    pub fn secure_cookies(&self) -> bool {
        !self.environment.is_development()
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_var<F, T>(
    lookup: &F,
    name: &str,
    parse: impl Fn(&str) -> Option<T>,
) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(None),
        Some(raw) => parse(raw.trim()).map(Some).ok_or_else(|| ConfigError::InvalidValue {
            field: name.to_string(),
            message: format!("unrecognized value '{raw}'"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    const YAML: &str = r#"
secret_key: "dev-secret"
username: "admin"
password_hash: "$argon2id$v=19$m=8,t=1,p=1$c2FsdHNhbHQ$ZGlnZXN0ZGlnZXN0"
api_key: "key"
"#;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    fn base_vars() -> Vec<(&'static str, &'static str)> {
        vec![
            ("SECRET_KEY", "dev-secret"),
            ("USER_NAME", "admin"),
            ("USER_PASSWORD_HASH", "$argon2id$v=19$m=8,t=1,p=1$c2FsdHNhbHQ$ZGlnZXN0ZGlnZXN0"),
            ("API_KEY", "key"),
        ]
    }

    #[test]
    fn test_yaml_defaults() {
        let config = AppConfig::from_yaml_str(YAML).unwrap();

        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.bind_addr, "127.0.0.1:8000");
        assert_eq!(config.word_uniqueness, WordUniqueness::PerLanguage);
        assert_eq!(config.marker_values, MarkerSet::Standard);
        assert_eq!(config.import_policy, ImportPolicy::Atomic);
        assert!(config.revoke_on_logout);
        assert!(config.export_allowed());
        assert_eq!(config.token_ttl(), chrono::Duration::seconds(300));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_yaml_file_loading() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{YAML}").unwrap();
        writeln!(file, "word_uniqueness: global").unwrap();
        writeln!(file, "marker_values: extended").unwrap();

        let config = AppConfig::from_yaml_file(file.path()).unwrap();
        assert_eq!(config.word_uniqueness, WordUniqueness::Global);
        assert_eq!(config.marker_values, MarkerSet::Extended);
    }

    #[test]
    fn test_yaml_file_parse_error_names_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "secret_key: [unclosed").unwrap();

        let err = AppConfig::from_yaml_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { file: Some(_), .. }));
    }

    #[test]
    fn test_missing_file() {
        let err = AppConfig::from_yaml_file("/definitely/not/here.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_from_lookup() {
        let mut vars = base_vars();
        vars.push(("APP_ENV", "production"));
        vars.push(("ALLOW_ORIGIN", "https://tomostudy.example"));
        vars.push(("IMPORT_POLICY", "partial"));
        vars.push(("REVOKE_ON_LOGOUT", "false"));

        let config = AppConfig::from_lookup(lookup(&vars)).unwrap();
        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.import_policy, ImportPolicy::Partial);
        assert!(!config.revoke_on_logout);
        assert!(!config.export_allowed());
        assert_eq!(config.token_ttl(), chrono::Duration::hours(12));
        assert_eq!(config.cors_origins(), vec!["https://tomostudy.example"]);
    }

    #[test]
    fn test_from_lookup_missing_variable() {
        let vars = vec![("SECRET_KEY", "s")];
        let err = AppConfig::from_lookup(lookup(&vars)).unwrap_err();
        assert!(matches!(err, ConfigError::MissingField { ref field } if field == "USER_NAME"));
    }

    #[test]
    fn test_from_lookup_bad_value() {
        let mut vars = base_vars();
        vars.push(("WORD_UNIQUENESS", "sometimes"));
        let err = AppConfig::from_lookup(lookup(&vars)).unwrap_err();
        assert!(
            matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "WORD_UNIQUENESS")
        );
    }

    #[test]
    fn test_ttl_override() {
        let mut vars = base_vars();
        vars.push(("TOKEN_TTL_SECS", "1"));
        let config = AppConfig::from_lookup(lookup(&vars)).unwrap();
        assert_eq!(config.token_ttl(), chrono::Duration::seconds(1));
    }

    #[test]
    fn test_validate_bounds_token_ttl() {
        let mut config = AppConfig::from_yaml_str(YAML).unwrap();
        config.token_ttl_secs = Some(0);
        assert!(config.validate().is_err());

        config.token_ttl_secs = Some(1_000_000_000_000_000);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { ref field, .. }) if field == "token_ttl_secs"
        ));

        config.token_ttl_secs = Some(MAX_TOKEN_TTL_SECS);
        assert!(config.validate().is_ok());
        assert_eq!(config.token_ttl(), chrono::Duration::days(30));
    }

    #[test]
    fn test_validate_rejects_short_production_secret() {
        let mut config = AppConfig::from_yaml_str(YAML).unwrap();
        config.environment = Environment::Production;
        config.allow_origin = Some("https://tomostudy.example".into());
        assert!(config.validate().is_err());

        config.secret_key = "x".repeat(MIN_PROD_SECRET_LEN);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_credentials() {
        let mut config = AppConfig::from_yaml_str(YAML).unwrap();
        config.api_key = "  ".into();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { ref field, .. }) if field == "api_key"
        ));
    }

    #[test]
    fn test_development_cors_origins() {
        let config = AppConfig::from_yaml_str(YAML).unwrap();
        assert_eq!(
            config.cors_origins(),
            vec!["http://localhost", "http://localhost:5273"]
        );
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = AppConfig::from_yaml_str(YAML).unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("dev-secret"));
        assert!(debug.contains("admin"));
    }
}
