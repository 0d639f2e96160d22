use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::appointment::{Appointment, AppointmentStatus};

/// Append-only record of one appointment-status transition, consumed by the
/// notification pipeline. Only the processing bookkeeping fields
/// (`processed`, `retry_count`, `sent_at`, `delivery_id`, `error`) are
/// mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationTrigger {
    pub id: Uuid,
    pub trigger_type: AppointmentStatus,
    pub appointment_id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub patient_name: String,
    pub doctor_name: String,
    pub appointment_date: NaiveDate,
    pub start_time: NaiveTime,
    pub processed: bool,
    pub retry_count: i32,
    pub delivery_id: Option<String>,
    pub sent_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl NotificationTrigger {
    /// Snapshot the appointment fields that notification bodies need.
    pub fn for_transition(appointment: &Appointment, to: AppointmentStatus, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            trigger_type: to,
            appointment_id: appointment.id,
            patient_id: appointment.patient_id,
            doctor_id: appointment.doctor_id,
            patient_name: appointment.patient_name.clone(),
            doctor_name: appointment.doctor_name.clone(),
            appointment_date: appointment.date,
            start_time: appointment.start_time,
            processed: false,
            retry_count: 0,
            delivery_id: None,
            sent_at: None,
            error: None,
            created_at: now,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledReminder {
    pub id: Uuid,
    pub appointment_id: Uuid,
    pub appointment_date: NaiveDate,
    pub start_time: NaiveTime,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub patient_name: String,
    pub doctor_name: String,
    pub fire_at: DateTime<Utc>,
    pub status: ReminderStatus,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderStatus {
    Scheduled,
    Sent,
    Cancelled,
}

impl ReminderStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ReminderStatus::Sent | ReminderStatus::Cancelled)
    }
}

impl fmt::Display for ReminderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReminderStatus::Scheduled => write!(f, "scheduled"),
            ReminderStatus::Sent => write!(f, "sent"),
            ReminderStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}
