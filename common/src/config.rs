//! Service configuration.
//!
//! Values come from environment variables. Binaries load an optional `.env`
//! file first, so the process environment always wins over the file.

use std::time::Duration;

/// Default bind port of the gateway.
pub const DEFAULT_PORT: u16 = 9876;

const DEFAULT_HOST: &str = "0.0.0.0";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "text" | "pretty" => Some(LogFormat::Text),
            "json" => Some(LogFormat::Json),
            _ => None,
        }
    }
}

/// Runtime configuration of a service.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Service name used in logs.
    pub service_name: String,
    /// Bind address.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Upper bound on connect plus execute time per request. `None` leaves
    /// requests unbounded.
    pub statement_timeout: Option<Duration>,
    /// Log output format.
    pub log_format: LogFormat,
    /// Values that were present but unusable, for the caller to log once a
    /// subscriber is installed.
    pub warnings: Vec<String>,
}

impl AppConfig {
    /// Loads configuration from the process environment.
    pub fn load_with_service(service_name: &str) -> Self {
        Self::from_lookup(service_name, |key| std::env::var(key).ok())
    }

    /// Loads configuration through an arbitrary key lookup.
    ///
    /// Unparseable values fall back to their defaults and are recorded in
    /// `warnings` rather than aborting startup.
    pub fn from_lookup<F>(service_name: &str, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut warnings = Vec::new();

        let host = lookup("SERVER_HOST")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = match lookup("SERVER_PORT") {
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                warnings.push(format!("SERVER_PORT 无效 ({raw})，使用默认端口 {DEFAULT_PORT}"));
                DEFAULT_PORT
            }),
            None => DEFAULT_PORT,
        };

        let statement_timeout = lookup("STATEMENT_TIMEOUT_SECS").and_then(|raw| {
            match raw.trim().parse::<u64>() {
                Ok(0) => None,
                Ok(secs) => Some(Duration::from_secs(secs)),
                Err(_) => {
                    warnings.push(format!("STATEMENT_TIMEOUT_SECS 无效 ({raw})，不设超时"));
                    None
                }
            }
        });

        let log_format = match lookup("LOG_FORMAT") {
            Some(raw) => LogFormat::parse(&raw).unwrap_or_else(|| {
                warnings.push(format!("LOG_FORMAT 无效 ({raw})，使用 text"));
                LogFormat::Text
            }),
            None => LogFormat::default(),
        };

        Self {
            service_name: service_name.to_string(),
            host,
            port,
            statement_timeout,
            log_format,
            warnings,
        }
    }

    /// `host:port` string for binding.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
