// libs/notification-cell/src/lib.rs
pub mod jobs;
pub mod models;
pub mod services;

pub use models::{DispatcherSettings, NotificationError, ReminderSettings, RetentionSettings};
pub use services::dispatcher::NotificationDispatcher;
pub use services::push::PushClient;
pub use services::reminder::ReminderScheduler;
pub use services::retention::RetentionCleaner;
