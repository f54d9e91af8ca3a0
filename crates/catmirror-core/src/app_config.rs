use std::net::SocketAddr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    /// Root of the inventory API, e.g. `https://api.moysklad.ru/api/remap/1.2`.
    pub source_base_url: String,
    /// Bearer token for the inventory API. Absence is reported when a sync
    /// job tries to build its client, not at startup.
    pub source_token: Option<String>,
    pub source_page_limit: u32,
    pub source_request_timeout_secs: u64,
    pub source_max_retries: u32,
    pub source_retry_backoff_base_ms: u64,
    pub storage_url: String,
    pub storage_key: String,
    pub storage_bucket: String,
    pub sync_interval_secs: u64,
    pub sync_startup_delay_secs: u64,
    pub sync_stage_pause_ms: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("database_url", &"[redacted]")
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("source_base_url", &self.source_base_url)
            .field(
                "source_token",
                &self.source_token.as_ref().map(|_| "[redacted]"),
            )
            .field("source_page_limit", &self.source_page_limit)
            .field(
                "source_request_timeout_secs",
                &self.source_request_timeout_secs,
            )
            .field("source_max_retries", &self.source_max_retries)
            .field(
                "source_retry_backoff_base_ms",
                &self.source_retry_backoff_base_ms,
            )
            .field("storage_url", &self.storage_url)
            .field("storage_key", &"[redacted]")
            .field("storage_bucket", &self.storage_bucket)
            .field("sync_interval_secs", &self.sync_interval_secs)
            .field("sync_startup_delay_secs", &self.sync_startup_delay_secs)
            .field("sync_stage_pause_ms", &self.sync_stage_pause_ms)
            .finish()
    }
}
