// libs/notification-cell/src/services/retention.rs
use std::sync::Arc;

use chrono::Duration;
use tracing::{debug, info, instrument};

use shared_models::external::Clock;
use shared_store::SchedulingStore;

use crate::models::RetentionSettings;

/// Purges fully-processed triggers and terminal reminders past the retention
/// window, in bounded batches so one sweep never holds the store for long.
pub struct RetentionCleaner {
    store: Arc<SchedulingStore>,
    clock: Arc<dyn Clock>,
    settings: RetentionSettings,
}

impl RetentionCleaner {
    pub fn new(
        store: Arc<SchedulingStore>,
        clock: Arc<dyn Clock>,
        settings: RetentionSettings,
    ) -> Self {
        Self {
            store,
            clock,
            settings,
        }
    }

    /// One sweep. Returns (triggers purged, reminders purged).
    #[instrument(skip(self))]
    pub async fn sweep(&self) -> (usize, usize) {
        let cutoff = self.clock.now() - Duration::days(self.settings.retention_days);
        debug!("Retention sweep with cutoff {}", cutoff);

        let mut triggers = 0;
        loop {
            let purged = self
                .store
                .purge_processed_triggers(cutoff, self.settings.batch_size)
                .await;
            triggers += purged;
            if purged < self.settings.batch_size {
                break;
            }
        }

        let mut reminders = 0;
        loop {
            let purged = self
                .store
                .purge_terminal_reminders(cutoff, self.settings.batch_size)
                .await;
            reminders += purged;
            if purged < self.settings.batch_size {
                break;
            }
        }

        if triggers > 0 || reminders > 0 {
            info!(
                "Retention sweep removed {} trigger(s) and {} reminder(s)",
                triggers, reminders
            );
        }
        (triggers, reminders)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use uuid::Uuid;

    use shared_models::external::Clock;
    use shared_models::slot::{SlotType, TimeSlot};
    use shared_store::AppointmentDraft;

    struct FixedClock(DateTime<Utc>);

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.0
        }
    }

    #[tokio::test]
    async fn sweep_removes_old_processed_triggers_and_keeps_live_ones() {
        let store = Arc::new(SchedulingStore::new());
        let doctor_id = Uuid::new_v4();
        let date = (Utc::now() + Duration::days(30)).date_naive();

        store
            .put_slots(
                doctor_id,
                date,
                vec![
                    TimeSlot {
                        start_time: "10:00:00".parse().unwrap(),
                        end_time: "10:30:00".parse().unwrap(),
                        duration_minutes: 30,
                        slot_type: SlotType::Consult,
                        available: true,
                    },
                    TimeSlot {
                        start_time: "11:00:00".parse().unwrap(),
                        end_time: "11:30:00".parse().unwrap(),
                        duration_minutes: 30,
                        slot_type: SlotType::Consult,
                        available: true,
                    },
                ],
            )
            .await
            .unwrap();

        let draft = || AppointmentDraft {
            patient_id: Uuid::new_v4(),
            patient_name: "Jordan Reyes".to_string(),
            doctor_name: "Dr. Amaya Okafor".to_string(),
            address: "12 Harbor Lane".to_string(),
        };

        // Old, processed: purgeable.
        let created_old = Utc::now() - Duration::days(30);
        let (_, old_trigger) = store
            .book_slot(doctor_id, date, "10:00:00".parse().unwrap(), draft(), created_old)
            .await
            .unwrap();
        store
            .complete_trigger(old_trigger.id, created_old, "delivery-1".to_string())
            .await
            .unwrap();

        // Old but unprocessed: must survive the sweep.
        let (live_appointment, _live_trigger) = store
            .book_slot(doctor_id, date, "11:00:00".parse().unwrap(), draft(), created_old)
            .await
            .unwrap();

        let cleaner = RetentionCleaner::new(
            Arc::clone(&store),
            Arc::new(FixedClock(Utc::now())),
            RetentionSettings {
                retention_days: 7,
                batch_size: 500,
            },
        );

        let (triggers, reminders) = cleaner.sweep().await;
        assert_eq!(triggers, 1);
        assert_eq!(reminders, 0);

        assert!(store.triggers_for_appointment(old_trigger.appointment_id).await.is_empty());
        assert_eq!(store.triggers_for_appointment(live_appointment.id).await.len(), 1);
    }

    #[tokio::test]
    async fn sweep_drains_in_batches() {
        let store = Arc::new(SchedulingStore::new());
        let doctor_id = Uuid::new_v4();
        let date = (Utc::now() + Duration::days(30)).date_naive();
        let created_old = Utc::now() - Duration::days(30);

        let slots: Vec<TimeSlot> = (0..5)
            .map(|i| TimeSlot {
                start_time: chrono::NaiveTime::from_hms_opt(9 + i, 0, 0).unwrap(),
                end_time: chrono::NaiveTime::from_hms_opt(9 + i, 30, 0).unwrap(),
                duration_minutes: 30,
                slot_type: SlotType::Consult,
                available: true,
            })
            .collect();
        store.put_slots(doctor_id, date, slots.clone()).await.unwrap();

        for slot in &slots {
            let (_, trigger) = store
                .book_slot(
                    doctor_id,
                    date,
                    slot.start_time,
                    AppointmentDraft {
                        patient_id: Uuid::new_v4(),
                        patient_name: "Jordan Reyes".to_string(),
                        doctor_name: "Dr. Amaya Okafor".to_string(),
                        address: "12 Harbor Lane".to_string(),
                    },
                    created_old,
                )
                .await
                .unwrap();
            store
                .complete_trigger(trigger.id, created_old, "delivery".to_string())
                .await
                .unwrap();
        }

        // Batch size 2 forces three purge rounds.
        let cleaner = RetentionCleaner::new(
            Arc::clone(&store),
            Arc::new(FixedClock(Utc::now())),
            RetentionSettings {
                retention_days: 7,
                batch_size: 2,
            },
        );

        let (triggers, _) = cleaner.sweep().await;
        assert_eq!(triggers, 5);
    }
}
