// libs/appointment-cell/src/services/lifecycle.rs
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_models::appointment::{Appointment, AppointmentStatus};
use shared_models::external::{Clock, ExternalError};
use shared_store::{SchedulingStore, StoreError};

use crate::models::AppointmentError;

/// Proactive reminder cancellation, invoked on terminal transitions. The
/// notification cell plugs its scheduler in here; tests can record calls.
#[async_trait]
pub trait ReminderCancellation: Send + Sync {
    async fn cancel_for_appointment(
        &self,
        appointment_id: Uuid,
        reason: &str,
    ) -> Result<usize, ExternalError>;
}

/// Hook for wiring the lifecycle before the notification cell exists, and
/// for tests that only exercise the transition graph.
pub struct NoReminderCancellation;

#[async_trait]
impl ReminderCancellation for NoReminderCancellation {
    async fn cancel_for_appointment(&self, _: Uuid, _: &str) -> Result<usize, ExternalError> {
        Ok(0)
    }
}

pub struct AppointmentLifecycleService {
    store: Arc<SchedulingStore>,
    clock: Arc<dyn Clock>,
    reminder_hook: Arc<dyn ReminderCancellation>,
}

const MAX_CAS_ATTEMPTS: u32 = 3;

impl AppointmentLifecycleService {
    pub fn new(
        store: Arc<SchedulingStore>,
        clock: Arc<dyn Clock>,
        reminder_hook: Arc<dyn ReminderCancellation>,
    ) -> Self {
        Self {
            store,
            clock,
            reminder_hook,
        }
    }

    /// All valid next statuses for a given current status.
    pub fn valid_transitions(&self, current: &AppointmentStatus) -> Vec<AppointmentStatus> {
        match current {
            AppointmentStatus::Pending => {
                vec![AppointmentStatus::Confirmed, AppointmentStatus::Cancelled]
            }
            AppointmentStatus::Confirmed => vec![
                AppointmentStatus::Completed,
                AppointmentStatus::Cancelled,
                AppointmentStatus::NoShow,
            ],
            // Terminal states - no transitions allowed
            AppointmentStatus::Completed
            | AppointmentStatus::Cancelled
            | AppointmentStatus::NoShow => vec![],
        }
    }

    pub fn validate_status_transition(
        &self,
        current: &AppointmentStatus,
        new: &AppointmentStatus,
    ) -> Result<(), AppointmentError> {
        if !self.valid_transitions(current).contains(new) {
            warn!("Invalid status transition attempted: {} -> {}", current, new);
            return Err(AppointmentError::InvalidTransition {
                from: *current,
                to: *new,
            });
        }
        Ok(())
    }

    /// Apply one status transition. The status flip and the trigger append
    /// commit together; a compare-and-set on the current status keeps
    /// transitions on a single appointment strictly ordered even with
    /// concurrent callers. On a terminal transition the reminder hook runs
    /// before returning, and its failure is logged, never propagated - a
    /// missing reminder cancellation must not fail the status change.
    pub async fn transition(
        &self,
        appointment_id: Uuid,
        to: AppointmentStatus,
    ) -> Result<Appointment, AppointmentError> {
        let mut attempt = 0;
        loop {
            attempt += 1;

            let current = self
                .store
                .get_appointment(appointment_id)
                .await
                .map_err(|e| match e {
                    StoreError::AppointmentNotFound => AppointmentError::NotFound,
                    other => AppointmentError::DatabaseError(other.to_string()),
                })?;
            self.validate_status_transition(&current.status, &to)?;

            match self
                .store
                .transition_appointment(appointment_id, current.status, to, self.clock.now())
                .await
            {
                Ok((appointment, trigger)) => {
                    info!(
                        "Appointment {} transitioned {} -> {} (trigger {})",
                        appointment_id, current.status, to, trigger.id
                    );

                    if matches!(to, AppointmentStatus::Cancelled | AppointmentStatus::Completed) {
                        let reason = format!("appointment {}", to);
                        match self
                            .reminder_hook
                            .cancel_for_appointment(appointment_id, &reason)
                            .await
                        {
                            Ok(cancelled) if cancelled > 0 => {
                                debug!(
                                    "Cancelled {} reminder(s) for appointment {}",
                                    cancelled, appointment_id
                                );
                            }
                            Ok(_) => {}
                            Err(e) => {
                                warn!(
                                    "Reminder cancellation failed for appointment {}: {}",
                                    appointment_id, e
                                );
                            }
                        }
                    }

                    return Ok(appointment);
                }
                Err(StoreError::StatusConflict { current, .. }) if attempt < MAX_CAS_ATTEMPTS => {
                    debug!(
                        "Transition race on appointment {} (now {}), re-validating",
                        appointment_id, current
                    );
                }
                Err(StoreError::StatusConflict { current, .. }) => {
                    return Err(AppointmentError::InvalidTransition { from: current, to });
                }
                Err(e) => return Err(AppointmentError::DatabaseError(e.to_string())),
            }
        }
    }
}
