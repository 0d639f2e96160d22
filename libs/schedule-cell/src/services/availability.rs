// libs/schedule-cell/src/services/availability.rs
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, warn};
use uuid::Uuid;

use shared_models::slot::TimeSlot;
use shared_store::{RangeReplacement, SchedulingStore};

use crate::models::{CreatedSchedule, CreateScheduleRequest, ReplaceRangeRequest, ScheduleError};
use crate::services::generator::ScheduleGenerator;

pub struct AvailabilityService {
    store: Arc<SchedulingStore>,
    generator: ScheduleGenerator,
}

impl AvailabilityService {
    pub fn new(store: Arc<SchedulingStore>) -> Self {
        Self {
            store,
            generator: ScheduleGenerator::new(),
        }
    }

    /// Generate and persist the slot collection for one doctor-date. A
    /// regeneration replaces whatever was stored, claimed slots included;
    /// the count is surfaced and logged like `replace_range` does.
    pub async fn create_schedule(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
        request: CreateScheduleRequest,
    ) -> Result<CreatedSchedule, ScheduleError> {
        debug!("Creating schedule for doctor {} on {}", doctor_id, date);

        let slots = self.generator.generate(
            request.start_time,
            request.end_time,
            request.duration_minutes,
            request.slot_type,
        );
        let removed_booked = self.store.put_slots(doctor_id, date, slots.clone()).await?;

        if removed_booked > 0 {
            warn!(
                "Schedule regeneration for doctor {} on {} deleted {} booked slot(s); \
                 existing appointments on that date may be orphaned",
                doctor_id, date, removed_booked
            );
        }

        debug!("Stored {} slots for doctor {} on {}", slots.len(), doctor_id, date);
        Ok(CreatedSchedule { slots, removed_booked })
    }

    /// Current availability, reflecting claims made up to this read.
    pub async fn list_available(&self, doctor_id: Uuid, date: NaiveDate) -> Vec<TimeSlot> {
        self.store.list_available(doctor_id, date).await
    }

    /// Regenerate the slots in a time window. Slots already claimed by an
    /// appointment are deleted along with the rest of the window, which can
    /// orphan a confirmed appointment; the count is surfaced and logged so
    /// the caller sees it happen.
    pub async fn replace_range(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
        request: ReplaceRangeRequest,
    ) -> Result<RangeReplacement, ScheduleError> {
        let new_slots = self.generator.generate(
            request.range_start,
            request.range_end,
            request.duration_minutes,
            request.slot_type,
        );

        let outcome = self
            .store
            .replace_range(doctor_id, date, request.range_start, request.range_end, new_slots)
            .await?;

        if outcome.removed_claimed > 0 {
            warn!(
                "Range replacement for doctor {} on {} deleted {} booked slot(s); \
                 existing appointments in [{}, {}) may be orphaned",
                doctor_id, date, outcome.removed_claimed, request.range_start, request.range_end
            );
        }

        Ok(outcome)
    }
}
