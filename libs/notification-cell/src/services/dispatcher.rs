// libs/notification-cell/src/services/dispatcher.rs
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use futures::StreamExt;
use tokio::time::{timeout, Duration};
use tracing::{debug, error, instrument, warn};

use shared_models::appointment::AppointmentStatus;
use shared_models::external::{Clock, PushGateway, PushTokenRegistry};
use shared_models::notification::NotificationTrigger;
use shared_store::SchedulingStore;

use crate::models::{DispatcherSettings, NotificationError};
use crate::services::reminder::ReminderScheduler;

/// Consumes unprocessed notification triggers in claim-based passes. Each
/// pass claims a batch, fans it out over a bounded number of workers and
/// resolves every trigger as completed, deferred, permanently failed or
/// released for redrive. Failures stay per-trigger; one bad record never
/// stops the batch.
pub struct NotificationDispatcher {
    store: Arc<SchedulingStore>,
    tokens: Arc<dyn PushTokenRegistry>,
    gateway: Arc<dyn PushGateway>,
    reminders: Arc<ReminderScheduler>,
    clock: Arc<dyn Clock>,
    settings: DispatcherSettings,
}

impl NotificationDispatcher {
    pub fn new(
        store: Arc<SchedulingStore>,
        tokens: Arc<dyn PushTokenRegistry>,
        gateway: Arc<dyn PushGateway>,
        reminders: Arc<ReminderScheduler>,
        clock: Arc<dyn Clock>,
        settings: DispatcherSettings,
    ) -> Self {
        Self {
            store,
            tokens,
            gateway,
            reminders,
            clock,
            settings,
        }
    }

    /// One dispatch pass. Returns how many triggers were resolved, meaning
    /// completed or permanently failed. Deferred and released triggers do
    /// not count: they must wait out the poll interval before the next
    /// attempt, so the job loop treats a pass that only deferred as idle.
    #[instrument(skip(self))]
    pub async fn run_pass(&self) -> usize {
        let batch = self.store.claim_triggers(self.settings.batch_size).await;
        if batch.is_empty() {
            return 0;
        }

        debug!("Claimed {} trigger(s) for dispatch", batch.len());
        let budget = Duration::from_secs(self.settings.trigger_timeout_secs);
        let resolved = AtomicUsize::new(0);

        futures::stream::iter(batch)
            .for_each_concurrent(self.settings.workers, |trigger| {
                let resolved = &resolved;
                async move {
                    match timeout(budget, self.process_trigger(&trigger)).await {
                        Ok(Ok(())) => {
                            resolved.fetch_add(1, Ordering::Relaxed);
                        }
                        Ok(Err(e)) => {
                            if self.record_failure(&trigger, e).await {
                                resolved.fetch_add(1, Ordering::Relaxed);
                            }
                        }
                        Err(_) => {
                            warn!(
                                "Trigger {} timed out after {}s, releasing for redrive",
                                trigger.id, self.settings.trigger_timeout_secs
                            );
                            self.store.release_trigger(trigger.id).await;
                        }
                    }
                }
            })
            .await;

        resolved.into_inner()
    }

    async fn process_trigger(&self, trigger: &NotificationTrigger) -> Result<(), NotificationError> {
        if trigger.appointment_id.is_nil()
            || trigger.patient_id.is_nil()
            || trigger.doctor_id.is_nil()
        {
            return Err(NotificationError::Validation(
                "trigger carries nil identifiers".to_string(),
            ));
        }

        // A new booking notifies the doctor; every later transition notifies
        // the patient.
        let recipient = match trigger.trigger_type {
            AppointmentStatus::Pending => trigger.doctor_id,
            _ => trigger.patient_id,
        };

        let token = self
            .tokens
            .get_token(recipient)
            .await
            .map_err(|e| NotificationError::Registry(e.to_string()))?
            .ok_or(NotificationError::MissingToken)?;

        let (title, body) = payload_for(trigger);
        let mut data = HashMap::new();
        data.insert("appointment_id".to_string(), trigger.appointment_id.to_string());
        data.insert("trigger_type".to_string(), trigger.trigger_type.to_string());

        let delivery_id = self
            .gateway
            .send(&token, title, &body, data)
            .await
            .map_err(|e| NotificationError::Gateway(e.to_string()))?;

        // Reminder scheduling happens before the trigger flips to processed;
        // a crash between the two redrives the trigger and the idempotent
        // insert absorbs the duplicate.
        if trigger.trigger_type == AppointmentStatus::Confirmed {
            let appointment = self.store.get_appointment(trigger.appointment_id).await?;
            self.reminders.schedule(&appointment).await?;
        }

        self.store
            .complete_trigger(trigger.id, self.clock.now(), delivery_id)
            .await?;
        debug!("Trigger {} delivered to {}", trigger.id, recipient);
        Ok(())
    }

    /// Returns whether the trigger was resolved (permanently failed) rather
    /// than deferred for a later pass.
    async fn record_failure(&self, trigger: &NotificationTrigger, error: NotificationError) -> bool {
        if error.is_permanent() {
            warn!("Trigger {} failed permanently: {}", trigger.id, error);
            if let Err(e) = self.store.fail_trigger(trigger.id, error.to_string()).await {
                error!("Could not record failure for trigger {}: {}", trigger.id, e);
            }
            return true;
        }

        match self.store.defer_trigger(trigger.id, error.to_string()).await {
            Ok(attempts) if attempts >= self.settings.max_attempts => {
                warn!(
                    "Trigger {} exhausted {} attempts, giving up: {}",
                    trigger.id, attempts, error
                );
                let retry_error = format!("retry limit reached after {} attempts: {}", attempts, error);
                if let Err(e) = self.store.fail_trigger(trigger.id, retry_error).await {
                    error!("Could not record failure for trigger {}: {}", trigger.id, e);
                }
                true
            }
            Ok(attempts) => {
                debug!(
                    "Trigger {} deferred (attempt {}/{}): {}",
                    trigger.id, attempts, self.settings.max_attempts, error
                );
                false
            }
            Err(e) => {
                error!("Could not defer trigger {}: {}", trigger.id, e);
                false
            }
        }
    }
}

fn payload_for(trigger: &NotificationTrigger) -> (&'static str, String) {
    let when = format!("{} at {}", trigger.appointment_date, trigger.start_time);
    match trigger.trigger_type {
        AppointmentStatus::Pending => (
            "New appointment request",
            format!("{} requested an appointment on {}", trigger.patient_name, when),
        ),
        AppointmentStatus::Confirmed => (
            "Appointment confirmed",
            format!(
                "Your appointment with {} on {} is confirmed",
                trigger.doctor_name, when
            ),
        ),
        AppointmentStatus::Completed => (
            "Appointment completed",
            format!("Your visit with {} on {} is complete", trigger.doctor_name, when),
        ),
        AppointmentStatus::Cancelled => (
            "Appointment cancelled",
            format!(
                "Your appointment with {} on {} was cancelled",
                trigger.doctor_name, when
            ),
        ),
        AppointmentStatus::NoShow => (
            "Missed appointment",
            format!(
                "You missed your appointment with {} on {}",
                trigger.doctor_name, when
            ),
        ),
    }
}
