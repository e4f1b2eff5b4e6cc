//! Server configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`).

use std::net::SocketAddr;
use std::path::PathBuf;

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

impl LogFormat {
    /// Parses `LOG_FORMAT`; anything other than `json` means text.
    #[must_use]
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Text,
        }
    }
}

/// Top-level server configuration.
///
/// Loaded once at startup via [`ServerConfig::from_env`].
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Socket address to bind the HTTP server to (e.g. `0.0.0.0:8080`).
    pub listen_addr: SocketAddr,

    /// PostgreSQL connection string.
    pub database_url: String,

    /// Maximum number of database connections in the pool.
    pub database_max_connections: u32,

    /// Minimum idle connections in the pool.
    pub database_min_connections: u32,

    /// Timeout in seconds for acquiring a database connection.
    pub database_connect_timeout_secs: u64,

    /// When `false`, puzzle records live in memory and are lost on restart.
    pub persistence_enabled: bool,

    /// Flat directory that uploaded images are written to and served from.
    pub upload_dir: PathBuf,

    /// Largest accepted request body, in bytes.
    pub max_upload_bytes: usize,

    /// Seconds a request may run before it is answered with 408.
    pub request_timeout_secs: u64,

    /// Log output format.
    pub log_format: LogFormat,
}

impl ServerConfig {
    /// Loads configuration from environment variables.
    ///
    /// Falls back to sensible defaults when a variable is not set.
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// `DATABASE_URL` wins when set; otherwise the URL is assembled from
    /// `DB_HOST`, `DB_PORT`, `DB_USER`, `DB_PASSWORD` and `DB_NAME`.
    ///
    /// # Errors
    ///
    /// Returns an error if `LISTEN_ADDR` (or `PORT`) is set but cannot be
    /// parsed.
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();

        let listen_addr: SocketAddr = match std::env::var("LISTEN_ADDR") {
            Ok(addr) => addr.parse()?,
            Err(_) => {
                let port: u16 = std::env::var("PORT")
                    .unwrap_or_else(|_| "8080".to_string())
                    .parse()?;
                SocketAddr::from(([0, 0, 0, 0], port))
            }
        };

        let database_url = std::env::var("DATABASE_URL").unwrap_or_else(|_| database_url_from_parts());

        let database_max_connections = parse_env("DATABASE_MAX_CONNECTIONS", 10);
        let database_min_connections = parse_env("DATABASE_MIN_CONNECTIONS", 1);
        let database_connect_timeout_secs = parse_env("DATABASE_CONNECT_TIMEOUT_SECS", 5);

        let persistence_enabled = parse_env_bool("PERSISTENCE_ENABLED", true);

        let upload_dir = std::env::var("UPLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("uploads"));
        let max_upload_bytes = parse_env("MAX_UPLOAD_BYTES", 10 * 1024 * 1024);
        let request_timeout_secs = parse_env("REQUEST_TIMEOUT_SECS", 30);
        let log_format = LogFormat::parse(std::env::var("LOG_FORMAT").ok().as_deref());

        Ok(Self {
            listen_addr,
            database_url,
            database_max_connections,
            database_min_connections,
            database_connect_timeout_secs,
            persistence_enabled,
            upload_dir,
            max_upload_bytes,
            request_timeout_secs,
            log_format,
        })
    }
}

/// Assembles a PostgreSQL URL from the individual `DB_*` variables.
fn database_url_from_parts() -> String {
    let host = env_or("DB_HOST", "localhost");
    let port = env_or("DB_PORT", "5432");
    let user = env_or("DB_USER", "postgres");
    let password = env_or("DB_PASSWORD", "");
    let name = env_or("DB_NAME", "puzzle_db");
    build_database_url(&host, &port, &user, &password, &name)
}

fn build_database_url(host: &str, port: &str, user: &str, password: &str, name: &str) -> String {
    if password.is_empty() {
        format!("postgres://{user}@{host}:{port}/{name}?sslmode=disable")
    } else {
        format!("postgres://{user}:{password}@{host}:{port}/{name}?sslmode=disable")
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Parses an environment variable as `T`, returning `default` on missing
/// or invalid values.
fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Parses an environment variable as a boolean. Accepts `"true"`, `"1"`,
/// `"false"`, `"0"` (case-insensitive). Returns `default` otherwise.
fn parse_env_bool(key: &str, default: bool) -> bool {
    match std::env::var(key).ok().map(|v| v.to_ascii_lowercase()).as_deref() {
        Some("true" | "1") => true,
        Some("false" | "0") => false,
        _ => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_without_password() {
        assert_eq!(
            build_database_url("localhost", "5432", "postgres", "", "puzzle_db"),
            "postgres://postgres@localhost:5432/puzzle_db?sslmode=disable"
        );
    }

    #[test]
    fn url_with_password() {
        assert_eq!(
            build_database_url("db", "6543", "app", "s3cret", "puzzles"),
            "postgres://app:s3cret@db:6543/puzzles?sslmode=disable"
        );
    }

    #[test]
    fn parse_env_falls_back_on_missing() {
        let value: u32 = parse_env("PUZZLE_TRACKER_TEST_UNSET_VARIABLE", 7);
        assert_eq!(value, 7);
        assert!(parse_env_bool("PUZZLE_TRACKER_TEST_UNSET_VARIABLE", true));
    }

    #[test]
    fn log_format_parsing() {
        assert_eq!(LogFormat::parse(Some("json")), LogFormat::Json);
        assert_eq!(LogFormat::parse(Some(" JSON ")), LogFormat::Json);
        assert_eq!(LogFormat::parse(Some("pretty")), LogFormat::Text);
        assert_eq!(LogFormat::parse(None), LogFormat::Text);
    }
}
