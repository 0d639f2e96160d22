use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single bookable interval in a doctor's day. Immutable once generated,
/// except for the `available` flag which the booking claim flips.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub duration_minutes: i32,
    pub slot_type: SlotType,
    pub available: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotType {
    Consult,
    FollowUp,
    Urgent,
}

impl fmt::Display for SlotType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotType::Consult => write!(f, "consult"),
            SlotType::FollowUp => write!(f, "follow_up"),
            SlotType::Urgent => write!(f, "urgent"),
        }
    }
}
