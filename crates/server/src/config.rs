use serde::Deserialize;
use taskwire_email::EmailConfig;

/// Top-level configuration for the taskwire server, loaded from a TOML file.
#[derive(Debug, Deserialize, Default)]
pub struct TaskwireConfig {
    /// HTTP bind configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Event publisher retry/buffer configuration.
    #[serde(default)]
    pub publisher: PublisherConfig,
    /// Notification dispatcher retry configuration.
    #[serde(default)]
    pub dispatcher: DispatcherConfig,
    /// Idempotency ledger configuration.
    #[serde(default)]
    pub ledger: LedgerConfig,
    /// Reminder scheduler configuration.
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    /// Email channel configuration.
    #[serde(default)]
    pub email: EmailChannelConfig,
}

/// HTTP server bind configuration.
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Maximum time to wait for in-flight requests to finish during
    /// graceful shutdown.
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_seconds: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            shutdown_timeout_seconds: default_shutdown_timeout(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_owned()
}

fn default_port() -> u16 {
    8080
}

fn default_shutdown_timeout() -> u64 {
    30
}

/// Event publisher retry budget and fallback buffer.
#[derive(Debug, Deserialize)]
pub struct PublisherConfig {
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default)]
    pub enable_buffer: bool,
    #[serde(default = "default_max_buffer_size")]
    pub max_buffer_size: usize,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            enable_buffer: false,
            max_buffer_size: default_max_buffer_size(),
        }
    }
}

fn default_max_retries() -> u32 {
    3
}

fn default_max_buffer_size() -> usize {
    1_000
}

/// Notification dispatcher retry/backoff.
#[derive(Debug, Deserialize)]
pub struct DispatcherConfig {
    #[serde(default = "default_dispatcher_attempts")]
    pub max_retry_attempts: u32,
    #[serde(default = "default_backoff_base")]
    pub retry_backoff_base: u64,
    #[serde(default = "default_backoff_max")]
    pub retry_backoff_max: u64,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            max_retry_attempts: default_dispatcher_attempts(),
            retry_backoff_base: default_backoff_base(),
            retry_backoff_max: default_backoff_max(),
        }
    }
}

fn default_dispatcher_attempts() -> u32 {
    3
}

fn default_backoff_base() -> u64 {
    2
}

fn default_backoff_max() -> u64 {
    300
}

/// Idempotency ledger TTL.
#[derive(Debug, Deserialize)]
pub struct LedgerConfig {
    #[serde(default = "default_ttl_hours")]
    pub ttl_hours: i64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            ttl_hours: default_ttl_hours(),
        }
    }
}

fn default_ttl_hours() -> i64 {
    taskwire_ledger::DEFAULT_TTL_HOURS
}

/// Reminder scheduler cron cadence.
#[derive(Debug, Deserialize)]
pub struct SchedulerConfig {
    #[serde(default = "default_tick_interval")]
    pub tick_interval_seconds: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_interval_seconds: default_tick_interval(),
        }
    }
}

fn default_tick_interval() -> u64 {
    300
}

/// Email channel configuration. Disabled by default so a bare config file
/// does not try to dial an SMTP server that does not exist.
#[derive(Debug, Deserialize, Default)]
pub struct EmailChannelConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub smtp: EmailConfig,
}
