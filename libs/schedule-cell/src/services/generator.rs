// libs/schedule-cell/src/services/generator.rs
use chrono::{Duration, NaiveTime};

use shared_models::slot::{SlotType, TimeSlot};

/// Pure slot generation: turns a working-hour range into consecutive
/// fixed-length bookable slots.
pub struct ScheduleGenerator;

impl ScheduleGenerator {
    pub fn new() -> Self {
        Self
    }

    /// An inverted or empty range produces no slots rather than an error.
    /// A trailing interval shorter than `duration_minutes` is dropped.
    pub fn generate(
        &self,
        start: NaiveTime,
        end: NaiveTime,
        duration_minutes: i32,
        slot_type: SlotType,
    ) -> Vec<TimeSlot> {
        let mut slots = Vec::new();
        if start >= end || duration_minutes <= 0 {
            return slots;
        }

        let step = Duration::minutes(duration_minutes as i64);
        let mut cursor = start;
        loop {
            let (slot_end, rolled_over) = cursor.overflowing_add_signed(step);
            if rolled_over != 0 || slot_end > end {
                break;
            }
            slots.push(TimeSlot {
                start_time: cursor,
                end_time: slot_end,
                duration_minutes,
                slot_type,
                available: true,
            });
            cursor = slot_end;
        }

        slots
    }
}

impl Default for ScheduleGenerator {
    fn default() -> Self {
        Self::new()
    }
}
