// libs/notification-cell/src/models.rs
use thiserror::Error;

use shared_config::AppConfig;
use shared_store::StoreError;

/// Delivery failures split by whether a later pass can succeed. `Validation`
/// is permanent; the token and gateway variants are transient and go through
/// the retry counter.
#[derive(Error, Debug)]
pub enum NotificationError {
    #[error("invalid trigger: {0}")]
    Validation(String),

    #[error("no token")]
    MissingToken,

    #[error("token registry error: {0}")]
    Registry(String),

    #[error("push gateway error: {0}")]
    Gateway(String),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl NotificationError {
    pub fn is_permanent(&self) -> bool {
        matches!(self, NotificationError::Validation(_))
    }
}

#[derive(Debug, Clone)]
pub struct DispatcherSettings {
    pub workers: usize,
    pub batch_size: usize,
    pub trigger_timeout_secs: u64,
    pub max_attempts: i32,
}

impl DispatcherSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            workers: config.dispatcher_workers,
            batch_size: config.dispatcher_batch_size,
            trigger_timeout_secs: config.trigger_timeout_secs,
            max_attempts: config.max_trigger_attempts,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReminderSettings {
    pub lead_hours: i64,
    pub window_minutes: i64,
    pub chunk_size: usize,
}

impl ReminderSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            lead_hours: config.reminder_lead_hours,
            window_minutes: config.reminder_window_minutes,
            chunk_size: config.reminder_chunk_size,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RetentionSettings {
    pub retention_days: i64,
    pub batch_size: usize,
}

impl RetentionSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            retention_days: config.retention_days,
            batch_size: config.retention_batch_size,
        }
    }
}
