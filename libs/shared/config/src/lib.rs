use std::env;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_port: u16,
    pub push_gateway_url: String,
    pub push_gateway_api_key: String,
    pub push_send_timeout_secs: u64,
    pub dispatcher_workers: usize,
    pub dispatcher_batch_size: usize,
    pub dispatcher_poll_secs: u64,
    pub trigger_timeout_secs: u64,
    pub max_trigger_attempts: i32,
    pub reminder_lead_hours: i64,
    pub reminder_window_minutes: i64,
    pub reminder_interval_secs: u64,
    pub reminder_chunk_size: usize,
    pub retention_days: i64,
    pub retention_batch_size: usize,
    pub retention_interval_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            bind_port: parse_env("PORT", 3000),
            push_gateway_url: env::var("PUSH_GATEWAY_URL").unwrap_or_else(|_| {
                warn!("PUSH_GATEWAY_URL not set, using empty value");
                String::new()
            }),
            push_gateway_api_key: env::var("PUSH_GATEWAY_API_KEY").unwrap_or_else(|_| {
                warn!("PUSH_GATEWAY_API_KEY not set, using empty value");
                String::new()
            }),
            push_send_timeout_secs: parse_env("PUSH_SEND_TIMEOUT_SECS", 10),
            dispatcher_workers: parse_env("DISPATCHER_WORKERS", 10),
            dispatcher_batch_size: parse_env("DISPATCHER_BATCH_SIZE", 50),
            dispatcher_poll_secs: parse_env("DISPATCHER_POLL_SECS", 15),
            trigger_timeout_secs: parse_env("TRIGGER_TIMEOUT_SECS", 30),
            max_trigger_attempts: parse_env("MAX_TRIGGER_ATTEMPTS", 5),
            reminder_lead_hours: parse_env("REMINDER_LEAD_HOURS", 24),
            reminder_window_minutes: parse_env("REMINDER_WINDOW_MINUTES", 60),
            reminder_interval_secs: parse_env("REMINDER_INTERVAL_SECS", 3600),
            reminder_chunk_size: parse_env("REMINDER_CHUNK_SIZE", 50),
            retention_days: parse_env("RETENTION_DAYS", 7),
            retention_batch_size: parse_env("RETENTION_BATCH_SIZE", 500),
            retention_interval_secs: parse_env("RETENTION_INTERVAL_SECS", 604_800),
        };

        if !config.is_push_configured() {
            warn!("Push gateway not fully configured - notifications will fail to send");
        }

        config
    }

    pub fn is_push_configured(&self) -> bool {
        !self.push_gateway_url.is_empty() && !self.push_gateway_api_key.is_empty()
    }
}

fn parse_env<T: std::str::FromStr + Copy>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            warn!("{} has invalid value {:?}, using default", key, raw);
            default
        }),
        Err(_) => default,
    }
}
