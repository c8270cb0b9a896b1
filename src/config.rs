//! Server configuration.
//!
//! Read once from the environment at startup and carried inside the
//! application context; nothing reads environment variables after that.

use std::time::Duration;

/// Tunables for the server, queue, and cache.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server name advertised during capability negotiation.
    pub server_name: String,
    /// HTTP port.
    pub port: u16,
    /// Fixed worker count for the execution queue.
    pub max_workers: usize,
    /// Bounded task queue capacity.
    pub max_queue_size: usize,
    /// How long `submit` waits for queue space before failing fast.
    pub admission_timeout: Duration,
    /// Per-invocation execution timeout.
    pub execution_timeout: Duration,
    /// Config cache TTL.
    pub cache_ttl: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            server_name: "multimcp".to_string(),
            port: 8080,
            max_workers: 20,
            max_queue_size: 200,
            admission_timeout: Duration::from_secs(5),
            execution_timeout: Duration::from_secs(180),
            cache_ttl: Duration::from_secs(300),
        }
    }
}

impl ServerConfig {
    /// Build a configuration from environment variables, falling back to
    /// defaults for anything unset or unparsable.
    ///
    /// - `PORT`
    /// - `TOOL_MAX_WORKERS`
    /// - `TOOL_QUEUE_SIZE`
    /// - `TOOL_ADMISSION_TIMEOUT` (seconds)
    /// - `TOOL_EXECUTION_TIMEOUT` (seconds)
    /// - `CONFIG_CACHE_TTL` (seconds)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_name: defaults.server_name.clone(),
            port: env_parse("PORT", defaults.port),
            max_workers: env_parse("TOOL_MAX_WORKERS", defaults.max_workers),
            max_queue_size: env_parse("TOOL_QUEUE_SIZE", defaults.max_queue_size),
            admission_timeout: Duration::from_secs(env_parse(
                "TOOL_ADMISSION_TIMEOUT",
                defaults.admission_timeout.as_secs(),
            )),
            execution_timeout: Duration::from_secs(env_parse(
                "TOOL_EXECUTION_TIMEOUT",
                defaults.execution_timeout.as_secs(),
            )),
            cache_ttl: Duration::from_secs(env_parse(
                "CONFIG_CACHE_TTL",
                defaults.cache_ttl.as_secs(),
            )),
        }
    }
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    match std::env::var(name) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            log::warn!("ignoring unparsable {name}");
            default
        }),
        Err(_) => default,
    }
}
