//! Server configuration from environment variables

use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(60 * 60);

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub port: u16,
    pub db_path: PathBuf,
    /// Upper bound on a single question provider call
    pub provider_timeout: Option<Duration>,
    /// Sessions untouched for longer than this are dropped
    pub session_ttl: Duration,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Self {
        let port = var("TWENTYQ_PORT")
            .and_then(|p| p.trim().parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let db_path = var("TWENTYQ_DB_PATH").map_or_else(
            || {
                let home = var("HOME").unwrap_or_else(|| "/tmp".to_string());
                PathBuf::from(home).join(".twenty-questions").join("stats.db")
            },
            PathBuf::from,
        );

        let provider_timeout = var("TWENTYQ_PROVIDER_TIMEOUT_SECS")
            .and_then(|s| s.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);

        let session_ttl = var("TWENTYQ_SESSION_TTL_SECS")
            .and_then(|s| s.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map_or(DEFAULT_SESSION_TTL, Duration::from_secs);

        Self {
            port,
            db_path,
            provider_timeout,
            session_ttl,
        }
    }
}
