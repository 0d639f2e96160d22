use shared_models::appointment::AppointmentStatus;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("No slot starts at the requested time")]
    SlotNotFound,

    #[error("Slot is no longer available")]
    SlotUnavailable,

    #[error("Slots for a date must be non-overlapping")]
    OverlappingSlots,

    #[error("Appointment not found")]
    AppointmentNotFound,

    #[error("Appointment status changed concurrently: expected {expected}, found {current}")]
    StatusConflict {
        expected: AppointmentStatus,
        current: AppointmentStatus,
    },

    #[error("Notification trigger not found")]
    TriggerNotFound,

    #[error("Scheduled reminder not found")]
    ReminderNotFound,
}
