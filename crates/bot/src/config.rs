//! Bot configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `BOT_TOKEN` - Telegram bot token (or `BOT_TOKEN_FILE` pointing at a file with it)
//!
//! ## Optional
//! - `DATABASE_URL` - Full `postgres://` URL, or just a host name (default: localhost)
//! - `PORT` - `PostgreSQL` port when `DATABASE_URL` is a host (default: 5432)
//! - `POSTGRES_USER` / `POSTGRES_PASSWORD` - Credentials when `DATABASE_URL` is a host
//! - `POSTGRES_DB_NAME` - Database name when `DATABASE_URL` is a host (default: `party_finder_bot`)
//! - `DATABASE_MAX_CONNECTIONS` - Pool size (default: 10)
//! - `AUTO_MIGRATE` - Run migrations at startup (default: true)
//! - `ADMIN_TELEGRAM_IDS` - Comma-separated Telegram ids granted admin at startup
//! - `BOT_POLL_TIMEOUT_SECS` - Long-poll timeout (default: 10)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` / `SENTRY_TRACES_SAMPLE_RATE` - Sampling (default: 1.0)

use std::collections::HashMap;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use party_finder_core::{AdminConfiguration, TelegramId};

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;
const DEFAULT_DB_HOST: &str = "localhost";
const DEFAULT_DB_PORT: &str = "5432";
const DEFAULT_DB_NAME: &str = "party_finder_bot";
const DEFAULT_POLL_TIMEOUT_SECS: &str = "10";
const DEFAULT_MAX_CONNECTIONS: &str = "10";

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "xxx",
    "todo",
    "insert",
    "put-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Bot application configuration.
#[derive(Clone)]
pub struct BotConfig {
    /// Telegram bot token
    pub bot_token: SecretString,
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// Maximum pooled database connections
    pub database_max_connections: u32,
    /// Whether to apply migrations at startup
    pub auto_migrate: bool,
    /// Telegram ids granted admin at startup, in configured order
    pub admins: AdminConfiguration,
    /// Long-poll timeout for `getUpdates`
    pub poll_timeout: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
    /// Non-fatal problems found while loading (skipped admin ids, weak token).
    ///
    /// Loading happens before logging is set up, so the caller logs these.
    pub warnings: Vec<String>,
}

impl std::fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotConfig")
            .field("bot_token", &"[REDACTED]")
            .field("database_url", &"[REDACTED]")
            .field("database_max_connections", &self.database_max_connections)
            .field("auto_migrate", &self.auto_migrate)
            .field("admins", &self.admins)
            .field("poll_timeout", &self.poll_timeout)
            .field("sentry_dsn", &self.sentry_dsn.as_ref().map(|_| "[SET]"))
            .field("sentry_environment", &self.sentry_environment)
            .field("warnings", &self.warnings)
            .finish_non_exhaustive()
    }
}

/// Source of configuration values, keyed by variable name.
trait Lookup {
    fn get(&self, key: &str) -> Option<String>;
}

impl<F> Lookup for F
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, key: &str) -> Option<String> {
        self(key).filter(|v| !v.is_empty())
    }
}

impl BotConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the bot token is missing or a value is invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key: &str| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key/value source.
    ///
    /// Empty values are treated as unset.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the bot token is missing or a value is invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut warnings = Vec::new();

        let bot_token = get_bot_token(&lookup)?;
        if let Err(e) = validate_secret_strength(bot_token.expose_secret(), "BOT_TOKEN") {
            warnings.push(format!("BOT_TOKEN validation warning: {e}"));
        }

        let database_url = database_url(&lookup)?;
        let database_max_connections = parse_env(
            &lookup,
            "DATABASE_MAX_CONNECTIONS",
            DEFAULT_MAX_CONNECTIONS,
        )?;
        let auto_migrate = parse_bool(&lookup, "AUTO_MIGRATE", true)?;
        let (admins, skipped) = parse_admin_ids(lookup.get("ADMIN_TELEGRAM_IDS").as_deref());
        warnings.extend(skipped);
        let poll_timeout = Duration::from_secs(parse_env(
            &lookup,
            "BOT_POLL_TIMEOUT_SECS",
            DEFAULT_POLL_TIMEOUT_SECS,
        )?);

        let sentry_dsn = lookup.get("SENTRY_DSN");
        let sentry_environment = lookup.get("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = lookup
            .get("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = lookup
            .get("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);

        Ok(Self {
            bot_token,
            database_url,
            database_max_connections,
            auto_migrate,
            admins,
            poll_timeout,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
            warnings,
        })
    }
}

/// Load only the database URL from the environment (for CLI tools).
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` if `PORT` is not a number.
pub fn database_url_from_env() -> Result<SecretString, ConfigError> {
    let _ = dotenvy::dotenv();
    database_url(&|key: &str| std::env::var(key).ok())
}

/// Load only the admin list from the environment (for CLI tools).
///
/// Skipped entries are logged; call this after tracing is initialized.
#[must_use]
pub fn admins_from_env() -> AdminConfiguration {
    let _ = dotenvy::dotenv();
    let (admins, skipped) = parse_admin_ids(std::env::var("ADMIN_TELEGRAM_IDS").ok().as_deref());
    for warning in skipped {
        tracing::warn!("{warning}");
    }
    admins
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get the bot token from `BOT_TOKEN`, falling back to the file named by `BOT_TOKEN_FILE`.
fn get_bot_token(lookup: &impl Lookup) -> Result<SecretString, ConfigError> {
    if let Some(token) = lookup.get("BOT_TOKEN") {
        return Ok(SecretString::from(token.trim().to_owned()));
    }

    if let Some(path) = lookup.get("BOT_TOKEN_FILE") {
        let contents = std::fs::read_to_string(&path).map_err(|e| {
            ConfigError::InvalidEnvVar("BOT_TOKEN_FILE".to_string(), format!("{path}: {e}"))
        })?;
        let token = contents.trim();
        if token.is_empty() {
            return Err(ConfigError::InvalidEnvVar(
                "BOT_TOKEN_FILE".to_string(),
                format!("{path} is empty"),
            ));
        }
        return Ok(SecretString::from(token.to_owned()));
    }

    Err(ConfigError::MissingEnvVar("BOT_TOKEN".to_string()))
}

/// Build the database URL.
///
/// A `DATABASE_URL` containing a scheme is used as-is; otherwise it is a host
/// name combined with `PORT`, `POSTGRES_USER`, `POSTGRES_PASSWORD` and
/// `POSTGRES_DB_NAME`.
fn database_url(lookup: &impl Lookup) -> Result<SecretString, ConfigError> {
    let raw = lookup
        .get("DATABASE_URL")
        .unwrap_or_else(|| DEFAULT_DB_HOST.to_string());
    if raw.contains("://") {
        return Ok(SecretString::from(raw));
    }

    let port: u16 = parse_env(lookup, "PORT", DEFAULT_DB_PORT)?;
    let user = lookup.get("POSTGRES_USER").unwrap_or_default();
    let password = lookup.get("POSTGRES_PASSWORD").unwrap_or_default();
    let db_name = lookup
        .get("POSTGRES_DB_NAME")
        .unwrap_or_else(|| DEFAULT_DB_NAME.to_string());

    let credentials = match (user.is_empty(), password.is_empty()) {
        (true, _) => String::new(),
        (false, true) => format!("{}@", urlencoding::encode(&user)),
        (false, false) => format!(
            "{}:{}@",
            urlencoding::encode(&user),
            urlencoding::encode(&password)
        ),
    };

    Ok(SecretString::from(format!(
        "postgres://{credentials}{raw}:{port}/{}",
        urlencoding::encode(&db_name)
    )))
}

/// Parse a comma-separated list of Telegram ids.
///
/// Blank entries are ignored. Unparsable entries are skipped and returned as
/// warnings alongside the list.
fn parse_admin_ids(raw: Option<&str>) -> (AdminConfiguration, Vec<String>) {
    let Some(raw) = raw else {
        return (AdminConfiguration::empty(), Vec::new());
    };

    let mut skipped = Vec::new();
    let admins = raw
        .split(',')
        .filter(|part| !part.trim().is_empty())
        .filter_map(|part| match TelegramId::parse(part) {
            Ok(id) => Some(id),
            Err(e) => {
                skipped.push(format!("Skipping ADMIN_TELEGRAM_IDS entry: {e}"));
                None
            }
        })
        .collect();
    (admins, skipped)
}

/// Parse an environment variable with a default value.
fn parse_env<T>(lookup: &impl Lookup, key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    lookup
        .get(key)
        .unwrap_or_else(|| default.to_string())
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Parse a boolean flag (`true/false`, `1/0`, `yes/no`).
fn parse_bool(lookup: &impl Lookup, key: &str, default: bool) -> Result<bool, ConfigError> {
    let Some(value) = lookup.get(key) else {
        return Ok(default);
    };
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("expected a boolean, got '{other}'"),
        )),
    }
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1})"
            ),
        ));
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    const TOKEN: &str = "7123456789:AAH4kq9Zr2mXw8Lp0VbN3sT6yUe1Jc5dGfQ";

    #[test]
    fn test_missing_token_is_fatal() {
        let err = BotConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref k) if k == "BOT_TOKEN"));
    }

    #[test]
    fn test_empty_token_counts_as_missing() {
        let err = BotConfig::from_lookup(lookup(&[("BOT_TOKEN", "")])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(_)));
    }

    #[test]
    fn test_defaults() {
        let config = BotConfig::from_lookup(lookup(&[("BOT_TOKEN", TOKEN)])).unwrap();
        assert_eq!(config.bot_token.expose_secret(), TOKEN);
        assert_eq!(
            config.database_url.expose_secret(),
            "postgres://localhost:5432/party_finder_bot"
        );
        assert_eq!(config.database_max_connections, 10);
        assert!(config.auto_migrate);
        assert!(config.admins.is_empty());
        assert_eq!(config.poll_timeout, Duration::from_secs(10));
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_full_database_url_used_verbatim() {
        let config = BotConfig::from_lookup(lookup(&[
            ("BOT_TOKEN", TOKEN),
            ("DATABASE_URL", "postgres://bot:pw@db.internal/pfb"),
            ("PORT", "6543"),
        ]))
        .unwrap();
        assert_eq!(
            config.database_url.expose_secret(),
            "postgres://bot:pw@db.internal/pfb"
        );
    }

    #[test]
    fn test_database_url_from_host_parts() {
        let config = BotConfig::from_lookup(lookup(&[
            ("BOT_TOKEN", TOKEN),
            ("DATABASE_URL", "db"),
            ("PORT", "6543"),
            ("POSTGRES_USER", "bot"),
            ("POSTGRES_PASSWORD", "p@ss word"),
            ("POSTGRES_DB_NAME", "games"),
        ]))
        .unwrap();
        assert_eq!(
            config.database_url.expose_secret(),
            "postgres://bot:p%40ss%20word@db:6543/games"
        );
    }

    #[test]
    fn test_invalid_port() {
        let err = BotConfig::from_lookup(lookup(&[("BOT_TOKEN", TOKEN), ("PORT", "abc")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref k, _) if k == "PORT"));
    }

    #[test]
    fn test_admin_ids_parsed_in_order() {
        let config = BotConfig::from_lookup(lookup(&[
            ("BOT_TOKEN", TOKEN),
            ("ADMIN_TELEGRAM_IDS", " 42, 7 ,oops,,42, 100"),
        ]))
        .unwrap();
        let ids: Vec<i64> = config.admins.iter().map(|id| id.as_i64()).collect();
        assert_eq!(ids, vec![42, 7, 100]);
    }

    #[test]
    fn test_skipped_admin_ids_are_reported() {
        let config = BotConfig::from_lookup(lookup(&[
            ("BOT_TOKEN", TOKEN),
            ("ADMIN_TELEGRAM_IDS", "42,oops, ,7"),
        ]))
        .unwrap();
        assert_eq!(config.admins.len(), 2);
        assert_eq!(config.warnings.len(), 1);
        assert!(config.warnings[0].contains("ADMIN_TELEGRAM_IDS"));
        assert!(config.warnings[0].contains("oops"));
    }

    #[test]
    fn test_clean_config_has_no_warnings() {
        let config = BotConfig::from_lookup(lookup(&[
            ("BOT_TOKEN", TOKEN),
            ("ADMIN_TELEGRAM_IDS", "42,7"),
        ]))
        .unwrap();
        assert!(config.warnings.is_empty());
    }

    #[test]
    fn test_weak_token_is_a_warning_not_an_error() {
        let config =
            BotConfig::from_lookup(lookup(&[("BOT_TOKEN", "your-bot-token-here")])).unwrap();
        assert_eq!(config.warnings.len(), 1);
        assert!(config.warnings[0].starts_with("BOT_TOKEN validation warning"));
        assert!(!config.warnings[0].contains("your-bot-token-here"));
    }

    #[test]
    fn test_auto_migrate_flag() {
        let config =
            BotConfig::from_lookup(lookup(&[("BOT_TOKEN", TOKEN), ("AUTO_MIGRATE", "false")]))
                .unwrap();
        assert!(!config.auto_migrate);

        let err = BotConfig::from_lookup(lookup(&[("BOT_TOKEN", TOKEN), ("AUTO_MIGRATE", "maybe")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));
    }

    #[test]
    fn test_token_file_fallback() {
        let path = std::env::temp_dir().join(format!("pfb-token-{}", std::process::id()));
        std::fs::write(&path, format!("{TOKEN}\n")).unwrap();

        let config = BotConfig::from_lookup(lookup(&[(
            "BOT_TOKEN_FILE",
            path.to_str().unwrap(),
        )]))
        .unwrap();
        assert_eq!(config.bot_token.expose_secret(), TOKEN);

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_token_file_missing() {
        let err = BotConfig::from_lookup(lookup(&[(
            "BOT_TOKEN_FILE",
            "/nonexistent/party-finder/token",
        )]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref k, _) if k == "BOT_TOKEN_FILE"));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = BotConfig::from_lookup(lookup(&[
            ("BOT_TOKEN", TOKEN),
            ("DATABASE_URL", "postgres://bot:hunter2@db/pfb"),
        ]))
        .unwrap();
        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains(TOKEN));
        assert!(!debug_output.contains("hunter2"));
    }

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("your-bot-token-here", "BOT_TOKEN");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength("1111111111:aaaaaaaaaaaaaaaa", "BOT_TOKEN");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_secret_strength_real_token() {
        assert!(validate_secret_strength(TOKEN, "BOT_TOKEN").is_ok());
    }
}
