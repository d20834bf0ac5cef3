// ⚙️ Configuration - environment variables with defaults
//
// Read once at startup. Blank values count as unset.

use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_CORS_ORIGINS: &str = "*";
pub const DEFAULT_CORS_METHODS: &str = "GET,POST,DELETE";
pub const DEFAULT_CORS_HEADERS: &str = "Accept,Authorization,Content-Type";
pub const DEFAULT_DATABASE_PATH: &str = "swift_directory.db";
pub const DEFAULT_CSV_PATH: &str = "SWIFT_CODES.csv";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Log output shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub cors_allowed_origins: Vec<String>,
    pub cors_allowed_methods: Vec<String>,
    pub cors_allowed_headers: Vec<String>,
    pub database_path: PathBuf,
    pub csv_path: PathBuf,
    pub import_on_start: bool,
    /// Bearer token for write routes; empty disables writes entirely
    pub api_token: String,
    pub bind_addr: String,
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Config::from_lookup(|_| None)
    }
}

impl Config {
    pub fn from_env() -> Self {
        Config::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source; used by tests to avoid touching the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str, default: &str| -> String {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        Config {
            cors_allowed_origins: split_list(&get("CORS_ALLOWED_ORIGINS", DEFAULT_CORS_ORIGINS)),
            cors_allowed_methods: split_list(&get("CORS_ALLOWED_METHODS", DEFAULT_CORS_METHODS)),
            cors_allowed_headers: split_list(&get("CORS_ALLOWED_HEADERS", DEFAULT_CORS_HEADERS)),
            database_path: PathBuf::from(get("DATABASE_PATH", DEFAULT_DATABASE_PATH)),
            csv_path: PathBuf::from(get("CSV_PATH", DEFAULT_CSV_PATH)),
            import_on_start: parse_bool(&get("IMPORT_ON_START", "true")),
            api_token: get("API_TOKEN", ""),
            bind_addr: get("BIND_ADDR", DEFAULT_BIND_ADDR),
            log_format: get("LOG_FORMAT", "pretty").parse().unwrap_or_default(),
        }
    }

    pub fn writes_enabled(&self) -> bool {
        !self.api_token.is_empty()
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_bool(raw: &str) -> bool {
    !matches!(raw.to_ascii_lowercase().as_str(), "0" | "false" | "no" | "off")
}
