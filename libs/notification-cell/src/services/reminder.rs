// libs/notification-cell/src/services/reminder.rs
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use appointment_cell::services::lifecycle::ReminderCancellation;
use shared_models::appointment::{Appointment, AppointmentStatus};
use shared_models::external::{Clock, ExternalError, PushGateway, PushTokenRegistry};
use shared_models::notification::{ReminderStatus, ScheduledReminder};
use shared_store::{SchedulingStore, StoreError};

use crate::models::{NotificationError, ReminderSettings};

/// Lead-time reminders for confirmed appointments. Scheduling is idempotent
/// per appointment so a redriven confirmation trigger cannot stack duplicates;
/// firing refetches the appointment and cancels the reminder when the status
/// moved on since it was scheduled.
pub struct ReminderScheduler {
    store: Arc<SchedulingStore>,
    tokens: Arc<dyn PushTokenRegistry>,
    gateway: Arc<dyn PushGateway>,
    clock: Arc<dyn Clock>,
    settings: ReminderSettings,
}

impl ReminderScheduler {
    pub fn new(
        store: Arc<SchedulingStore>,
        tokens: Arc<dyn PushTokenRegistry>,
        gateway: Arc<dyn PushGateway>,
        clock: Arc<dyn Clock>,
        settings: ReminderSettings,
    ) -> Self {
        Self {
            store,
            tokens,
            gateway,
            clock,
            settings,
        }
    }

    /// Schedule the reminder for a confirmed appointment. Returns whether a
    /// new reminder was actually inserted; a fire time already in the past
    /// and an existing live reminder both resolve to `false`.
    pub async fn schedule(&self, appointment: &Appointment) -> Result<bool, NotificationError> {
        let now = self.clock.now();
        let fire_at = appointment.starts_at() - Duration::hours(self.settings.lead_hours);

        if fire_at <= now {
            debug!(
                "Appointment {} starts within the reminder lead time, skipping reminder",
                appointment.id
            );
            return Ok(false);
        }

        let reminder = ScheduledReminder {
            id: Uuid::new_v4(),
            appointment_id: appointment.id,
            appointment_date: appointment.date,
            start_time: appointment.start_time,
            patient_id: appointment.patient_id,
            doctor_id: appointment.doctor_id,
            patient_name: appointment.patient_name.clone(),
            doctor_name: appointment.doctor_name.clone(),
            fire_at,
            status: ReminderStatus::Scheduled,
            reason: None,
            created_at: now,
        };

        let inserted = self.store.insert_reminder(reminder).await;
        if inserted {
            info!(
                "Reminder scheduled for appointment {} firing at {}",
                appointment.id, fire_at
            );
        } else {
            debug!(
                "Appointment {} already has a live reminder, not duplicating",
                appointment.id
            );
        }
        Ok(inserted)
    }

    /// One pass over reminders due inside the configured window. Returns the
    /// number of reminders sent.
    #[instrument(skip(self))]
    pub async fn fire_due(&self) -> usize {
        let now = self.clock.now();
        let until = now + Duration::minutes(self.settings.window_minutes);
        let due = self.store.due_reminders(until).await;

        if due.is_empty() {
            return 0;
        }
        debug!("{} reminder(s) due before {}", due.len(), until);

        let mut sent = 0;
        for chunk in due.chunks(self.settings.chunk_size) {
            for reminder in chunk {
                match self.fire_one(reminder).await {
                    Ok(true) => sent += 1,
                    Ok(false) => {}
                    Err(e) => {
                        warn!("Failed to fire reminder {}: {}", reminder.id, e);
                    }
                }
            }
        }

        if sent > 0 {
            info!("Sent {} appointment reminder(s)", sent);
        }
        sent
    }

    async fn fire_one(&self, reminder: &ScheduledReminder) -> Result<bool, NotificationError> {
        // The appointment may have moved on since the reminder was scheduled.
        let appointment = match self.store.get_appointment(reminder.appointment_id).await {
            Ok(appointment) => appointment,
            Err(StoreError::AppointmentNotFound) => {
                self.store
                    .cancel_reminder(reminder.id, "appointment not found".to_string())
                    .await?;
                return Ok(false);
            }
            Err(other) => return Err(other.into()),
        };

        if appointment.status != AppointmentStatus::Confirmed {
            self.store
                .cancel_reminder(reminder.id, format!("appointment {}", appointment.status))
                .await?;
            debug!(
                "Reminder {} cancelled, appointment {} is {}",
                reminder.id, appointment.id, appointment.status
            );
            return Ok(false);
        }

        // Patient and doctor are independent recipients; a missing token on
        // one side never blocks the other. A registry or gateway failure is
        // transient, so the reminder stays Scheduled and the next run
        // retries it; the other recipient may see a duplicate push then.
        let patient_body = format!(
            "Reminder: your appointment with {} is on {} at {}",
            reminder.doctor_name, reminder.appointment_date, reminder.start_time
        );
        let doctor_body = format!(
            "Reminder: {} is scheduled on {} at {}",
            reminder.patient_name, reminder.appointment_date, reminder.start_time
        );
        let patient_send = self.send_to(reminder, reminder.patient_id, &patient_body).await;
        let doctor_send = self.send_to(reminder, reminder.doctor_id, &doctor_body).await;
        patient_send?;
        doctor_send?;

        self.store.mark_reminder_sent(reminder.id).await?;
        Ok(true)
    }

    async fn send_to(
        &self,
        reminder: &ScheduledReminder,
        recipient: Uuid,
        body: &str,
    ) -> Result<(), NotificationError> {
        let token = match self.tokens.get_token(recipient).await {
            Ok(Some(token)) => token,
            Ok(None) => {
                debug!(
                    "No push token for {} on reminder {}, skipping recipient",
                    recipient, reminder.id
                );
                return Ok(());
            }
            Err(e) => return Err(NotificationError::Registry(e.to_string())),
        };

        let mut data = HashMap::new();
        data.insert("appointment_id".to_string(), reminder.appointment_id.to_string());
        data.insert("kind".to_string(), "reminder".to_string());

        self.gateway
            .send(&token, "Upcoming appointment", body, data)
            .await
            .map_err(|e| NotificationError::Gateway(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl ReminderCancellation for ReminderScheduler {
    async fn cancel_for_appointment(
        &self,
        appointment_id: Uuid,
        reason: &str,
    ) -> Result<usize, ExternalError> {
        let cancelled = self
            .store
            .cancel_reminders_for_appointment(appointment_id, reason)
            .await;
        Ok(cancelled)
    }
}
