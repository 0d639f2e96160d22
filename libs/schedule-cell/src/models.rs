// libs/schedule-cell/src/models.rs
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use shared_models::slot::{SlotType, TimeSlot};
use shared_store::StoreError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateScheduleRequest {
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub duration_minutes: i32,
    pub slot_type: SlotType,
}

/// Regenerate the slots whose start falls within `[range_start, range_end)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplaceRangeRequest {
    pub range_start: NaiveTime,
    pub range_end: NaiveTime,
    pub duration_minutes: i32,
    pub slot_type: SlotType,
}

#[derive(Debug, Clone)]
pub struct CreatedSchedule {
    pub slots: Vec<TimeSlot>,
    /// Slots from the previous collection that were already claimed by an
    /// appointment and got wiped by the regeneration.
    pub removed_booked: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplaceRangeResponse {
    pub removed: usize,
    /// Deleted slots that were already claimed by an appointment. A non-zero
    /// value means booked appointments may have been orphaned.
    pub removed_booked: usize,
    pub inserted: usize,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum ScheduleError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}
