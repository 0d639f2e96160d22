// libs/notification-cell/src/jobs.rs
use std::sync::Arc;

use tokio::time::{interval, sleep, Duration};
use tracing::info;

use shared_config::AppConfig;
use shared_store::SchedulingStore;

use crate::services::dispatcher::NotificationDispatcher;
use crate::services::reminder::ReminderScheduler;
use crate::services::retention::RetentionCleaner;

/// Dispatcher loop: run a pass, then wait for either a trigger-append nudge
/// or the poll interval before the next one. A pass that resolved work loops
/// straight back so a backlog drains without waiting; a pass that only
/// deferred waits, giving transient conditions (a token registered moments
/// after booking, a gateway blip) time to clear between attempts.
pub async fn run_dispatcher(
    dispatcher: Arc<NotificationDispatcher>,
    store: Arc<SchedulingStore>,
    config: Arc<AppConfig>,
) {
    info!(
        "Notification dispatcher started (poll every {}s)",
        config.dispatcher_poll_secs
    );
    let poll = Duration::from_secs(config.dispatcher_poll_secs);

    loop {
        let resolved = dispatcher.run_pass().await;
        if resolved == 0 {
            tokio::select! {
                _ = store.trigger_notify().notified() => {}
                _ = sleep(poll) => {}
            }
        }
    }
}

pub async fn run_reminder_timer(scheduler: Arc<ReminderScheduler>, config: Arc<AppConfig>) {
    info!(
        "Reminder timer started (firing every {}s)",
        config.reminder_interval_secs
    );
    let mut ticker = interval(Duration::from_secs(config.reminder_interval_secs));

    loop {
        ticker.tick().await;
        scheduler.fire_due().await;
    }
}

pub async fn run_retention_timer(cleaner: Arc<RetentionCleaner>, config: Arc<AppConfig>) {
    info!(
        "Retention sweep started (every {}s, {} day window)",
        config.retention_interval_secs, config.retention_days
    );
    let mut ticker = interval(Duration::from_secs(config.retention_interval_secs));

    loop {
        ticker.tick().await;
        cleaner.sweep().await;
    }
}
