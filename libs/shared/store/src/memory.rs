//! In-memory rendering of the scheduling storage layer.
//!
//! Every consistency contract the cells rely on — the booking claim, the
//! status compare-and-set, the dispatcher's claim protocol, reminder flips —
//! is a single method that holds the write guard for its whole
//! read-then-conditional-write, so no partial state is ever observable.
//! Multiple dispatcher workers and booking callers share one store; none of
//! the services layer their own locks on top.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use tokio::sync::{Notify, RwLock};
use uuid::Uuid;

use shared_models::appointment::{Appointment, AppointmentStatus};
use shared_models::notification::{NotificationTrigger, ReminderStatus, ScheduledReminder};
use shared_models::slot::TimeSlot;

use crate::error::StoreError;

/// Everything the booking claim needs besides the slot itself. Names and
/// address are directory snapshots taken by the coordinator before the
/// atomic section.
#[derive(Debug, Clone)]
pub struct AppointmentDraft {
    pub patient_id: Uuid,
    pub patient_name: String,
    pub doctor_name: String,
    pub address: String,
}

/// Outcome of a range replacement. `removed_claimed` counts deleted slots
/// that were already booked; callers surface it rather than the store
/// second-guessing the operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeReplacement {
    pub removed: usize,
    pub removed_claimed: usize,
    pub inserted: usize,
}

#[derive(Default)]
struct StoreInner {
    slots: HashMap<(Uuid, NaiveDate), Vec<TimeSlot>>,
    appointments: HashMap<Uuid, Appointment>,
    triggers: HashMap<Uuid, NotificationTrigger>,
    claimed_triggers: HashSet<Uuid>,
    reminders: HashMap<Uuid, ScheduledReminder>,
}

pub struct SchedulingStore {
    inner: RwLock<StoreInner>,
    trigger_notify: Notify,
}

impl Default for SchedulingStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SchedulingStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(StoreInner::default()),
            trigger_notify: Notify::new(),
        }
    }

    /// Nudged on every trigger append so the dispatcher loop can react to
    /// new work without waiting out its poll interval.
    pub fn trigger_notify(&self) -> &Notify {
        &self.trigger_notify
    }

    // ==========================================================================
    // SLOTS
    // ==========================================================================

    /// Replace the full slot collection for one doctor-date. Claimed slots
    /// in the previous collection are wiped like any other; the count comes
    /// back to the caller.
    pub async fn put_slots(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
        mut slots: Vec<TimeSlot>,
    ) -> Result<usize, StoreError> {
        slots.sort_by_key(|s| s.start_time);
        ensure_non_overlapping(&slots)?;

        let mut inner = self.inner.write().await;
        let replaced_claimed = inner
            .slots
            .get(&(doctor_id, date))
            .map(|existing| existing.iter().filter(|s| !s.available).count())
            .unwrap_or(0);
        inner.slots.insert((doctor_id, date), slots);
        Ok(replaced_claimed)
    }

    pub async fn list_slots(&self, doctor_id: Uuid, date: NaiveDate) -> Vec<TimeSlot> {
        let inner = self.inner.read().await;
        inner
            .slots
            .get(&(doctor_id, date))
            .cloned()
            .unwrap_or_default()
    }

    pub async fn list_available(&self, doctor_id: Uuid, date: NaiveDate) -> Vec<TimeSlot> {
        let inner = self.inner.read().await;
        inner
            .slots
            .get(&(doctor_id, date))
            .map(|slots| slots.iter().filter(|s| s.available).cloned().collect())
            .unwrap_or_default()
    }

    /// Delete slots whose start falls in `[range_start, range_end)` and
    /// insert `new_slots` in their place. Claimed slots inside the range are
    /// deleted like any other; the count comes back to the caller.
    pub async fn replace_range(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
        range_start: NaiveTime,
        range_end: NaiveTime,
        new_slots: Vec<TimeSlot>,
    ) -> Result<RangeReplacement, StoreError> {
        let mut inner = self.inner.write().await;
        let existing = inner.slots.entry((doctor_id, date)).or_default();

        let in_range =
            |s: &TimeSlot| s.start_time >= range_start && s.start_time < range_end;
        let removed = existing.iter().filter(|s| in_range(s)).count();
        let removed_claimed = existing
            .iter()
            .filter(|s| in_range(s) && !s.available)
            .count();

        let mut replaced: Vec<TimeSlot> = existing
            .iter()
            .filter(|s| !in_range(s))
            .cloned()
            .collect();
        let inserted = new_slots.len();
        replaced.extend(new_slots);
        replaced.sort_by_key(|s| s.start_time);
        ensure_non_overlapping(&replaced)?;

        *existing = replaced;
        Ok(RangeReplacement {
            removed,
            removed_claimed,
            inserted,
        })
    }

    // ==========================================================================
    // BOOKING CLAIM
    // ==========================================================================

    /// The slot claim: re-read the availability flag, flip it, persist the
    /// new `Pending` appointment and append its transition trigger, all
    /// under one write guard. Concurrent racers for the same slot see
    /// exactly one success; losers get `SlotUnavailable`.
    pub async fn book_slot(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
        slot_start: NaiveTime,
        draft: AppointmentDraft,
        now: DateTime<Utc>,
    ) -> Result<(Appointment, NotificationTrigger), StoreError> {
        let mut inner = self.inner.write().await;

        let slots = inner
            .slots
            .get_mut(&(doctor_id, date))
            .ok_or(StoreError::SlotNotFound)?;
        let slot = slots
            .iter_mut()
            .find(|s| s.start_time == slot_start)
            .ok_or(StoreError::SlotNotFound)?;

        if !slot.available {
            return Err(StoreError::SlotUnavailable);
        }
        slot.available = false;
        let end_time = slot.end_time;

        let appointment = Appointment {
            id: Uuid::new_v4(),
            doctor_id,
            patient_id: draft.patient_id,
            patient_name: draft.patient_name,
            doctor_name: draft.doctor_name,
            address: draft.address,
            date,
            start_time: slot_start,
            end_time,
            status: AppointmentStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        let trigger =
            NotificationTrigger::for_transition(&appointment, AppointmentStatus::Pending, now);

        inner.appointments.insert(appointment.id, appointment.clone());
        inner.triggers.insert(trigger.id, trigger.clone());
        drop(inner);

        self.trigger_notify.notify_waiters();
        Ok((appointment, trigger))
    }

    // ==========================================================================
    // APPOINTMENTS
    // ==========================================================================

    pub async fn get_appointment(&self, id: Uuid) -> Result<Appointment, StoreError> {
        let inner = self.inner.read().await;
        inner
            .appointments
            .get(&id)
            .cloned()
            .ok_or(StoreError::AppointmentNotFound)
    }

    /// Compare-and-set status transition plus trigger append in one unit.
    /// Fails with `StatusConflict` if another transition won the race, so
    /// transitions on a single appointment are strictly ordered.
    pub async fn transition_appointment(
        &self,
        id: Uuid,
        expected: AppointmentStatus,
        to: AppointmentStatus,
        now: DateTime<Utc>,
    ) -> Result<(Appointment, NotificationTrigger), StoreError> {
        let mut inner = self.inner.write().await;

        let appointment = inner
            .appointments
            .get_mut(&id)
            .ok_or(StoreError::AppointmentNotFound)?;
        if appointment.status != expected {
            return Err(StoreError::StatusConflict {
                expected,
                current: appointment.status,
            });
        }

        appointment.status = to;
        appointment.updated_at = now;
        let snapshot = appointment.clone();
        let trigger = NotificationTrigger::for_transition(&snapshot, to, now);
        inner.triggers.insert(trigger.id, trigger.clone());
        drop(inner);

        self.trigger_notify.notify_waiters();
        Ok((snapshot, trigger))
    }

    // ==========================================================================
    // TRIGGER CLAIM PROTOCOL
    // ==========================================================================

    /// Atomically claim up to `limit` unprocessed triggers for processing.
    /// Claimed triggers are invisible to other workers until completed,
    /// deferred or released.
    pub async fn claim_triggers(&self, limit: usize) -> Vec<NotificationTrigger> {
        let mut inner = self.inner.write().await;
        let mut due: Vec<NotificationTrigger> = inner
            .triggers
            .values()
            .filter(|t| !t.processed && !inner.claimed_triggers.contains(&t.id))
            .cloned()
            .collect();
        due.sort_by_key(|t| t.created_at);
        due.truncate(limit);

        for trigger in &due {
            inner.claimed_triggers.insert(trigger.id);
        }
        due
    }

    /// Put a claimed trigger back untouched, e.g. after a processing
    /// timeout. A later pass redrives it.
    pub async fn release_trigger(&self, id: Uuid) {
        let mut inner = self.inner.write().await;
        inner.claimed_triggers.remove(&id);
    }

    /// Successful delivery: flip `processed`, record the send.
    pub async fn complete_trigger(
        &self,
        id: Uuid,
        sent_at: DateTime<Utc>,
        delivery_id: String,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let trigger = inner.triggers.get_mut(&id).ok_or(StoreError::TriggerNotFound)?;
        trigger.processed = true;
        trigger.sent_at = Some(sent_at);
        trigger.delivery_id = Some(delivery_id);
        trigger.error = None;
        inner.claimed_triggers.remove(&id);
        Ok(())
    }

    /// Permanent failure: processed with the error recorded, never retried.
    pub async fn fail_trigger(&self, id: Uuid, error: String) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let trigger = inner.triggers.get_mut(&id).ok_or(StoreError::TriggerNotFound)?;
        trigger.processed = true;
        trigger.error = Some(error);
        inner.claimed_triggers.remove(&id);
        Ok(())
    }

    /// Transient failure: left unprocessed for a later pass, retry counted.
    /// Returns the new retry count so the caller can enforce its cap.
    pub async fn defer_trigger(&self, id: Uuid, error: String) -> Result<i32, StoreError> {
        let mut inner = self.inner.write().await;
        let trigger = inner.triggers.get_mut(&id).ok_or(StoreError::TriggerNotFound)?;
        trigger.retry_count += 1;
        trigger.error = Some(error);
        let retries = trigger.retry_count;
        inner.claimed_triggers.remove(&id);
        Ok(retries)
    }

    pub async fn triggers_for_appointment(&self, appointment_id: Uuid) -> Vec<NotificationTrigger> {
        let inner = self.inner.read().await;
        let mut triggers: Vec<NotificationTrigger> = inner
            .triggers
            .values()
            .filter(|t| t.appointment_id == appointment_id)
            .cloned()
            .collect();
        triggers.sort_by_key(|t| t.created_at);
        triggers
    }

    // ==========================================================================
    // REMINDERS
    // ==========================================================================

    /// Insert a reminder unless a live scheduled one already exists for the
    /// appointment. Idempotence here keeps trigger redrives from stacking
    /// duplicate reminders.
    pub async fn insert_reminder(&self, reminder: ScheduledReminder) -> bool {
        let mut inner = self.inner.write().await;
        let already_scheduled = inner.reminders.values().any(|r| {
            r.appointment_id == reminder.appointment_id && r.status == ReminderStatus::Scheduled
        });
        if already_scheduled {
            return false;
        }
        inner.reminders.insert(reminder.id, reminder);
        true
    }

    /// Scheduled reminders with `fire_at` up to and including `until`.
    pub async fn due_reminders(&self, until: DateTime<Utc>) -> Vec<ScheduledReminder> {
        let inner = self.inner.read().await;
        let mut due: Vec<ScheduledReminder> = inner
            .reminders
            .values()
            .filter(|r| r.status == ReminderStatus::Scheduled && r.fire_at <= until)
            .cloned()
            .collect();
        due.sort_by_key(|r| r.fire_at);
        due
    }

    pub async fn mark_reminder_sent(&self, id: Uuid) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let reminder = inner.reminders.get_mut(&id).ok_or(StoreError::ReminderNotFound)?;
        reminder.status = ReminderStatus::Sent;
        Ok(())
    }

    pub async fn cancel_reminder(&self, id: Uuid, reason: String) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let reminder = inner.reminders.get_mut(&id).ok_or(StoreError::ReminderNotFound)?;
        reminder.status = ReminderStatus::Cancelled;
        reminder.reason = Some(reason);
        Ok(())
    }

    /// Proactive cancellation hook target: flips every scheduled reminder
    /// for the appointment. Returns how many were cancelled.
    pub async fn cancel_reminders_for_appointment(
        &self,
        appointment_id: Uuid,
        reason: &str,
    ) -> usize {
        let mut inner = self.inner.write().await;
        let mut cancelled = 0;
        for reminder in inner.reminders.values_mut() {
            if reminder.appointment_id == appointment_id
                && reminder.status == ReminderStatus::Scheduled
            {
                reminder.status = ReminderStatus::Cancelled;
                reminder.reason = Some(reason.to_string());
                cancelled += 1;
            }
        }
        cancelled
    }

    pub async fn reminders_for_appointment(&self, appointment_id: Uuid) -> Vec<ScheduledReminder> {
        let inner = self.inner.read().await;
        let mut reminders: Vec<ScheduledReminder> = inner
            .reminders
            .values()
            .filter(|r| r.appointment_id == appointment_id)
            .cloned()
            .collect();
        reminders.sort_by_key(|r| r.created_at);
        reminders
    }

    // ==========================================================================
    // RETENTION
    // ==========================================================================

    /// Delete processed triggers created before `cutoff`, at most `limit`
    /// per call so a single sweep stays bounded.
    pub async fn purge_processed_triggers(&self, cutoff: DateTime<Utc>, limit: usize) -> usize {
        let mut inner = self.inner.write().await;
        let victims: Vec<Uuid> = inner
            .triggers
            .values()
            .filter(|t| t.processed && t.created_at < cutoff)
            .map(|t| t.id)
            .take(limit)
            .collect();
        for id in &victims {
            inner.triggers.remove(id);
        }
        victims.len()
    }

    /// Delete sent/cancelled reminders created before `cutoff`, bounded by
    /// `limit`.
    pub async fn purge_terminal_reminders(&self, cutoff: DateTime<Utc>, limit: usize) -> usize {
        let mut inner = self.inner.write().await;
        let victims: Vec<Uuid> = inner
            .reminders
            .values()
            .filter(|r| r.status.is_terminal() && r.created_at < cutoff)
            .map(|r| r.id)
            .take(limit)
            .collect();
        for id in &victims {
            inner.reminders.remove(id);
        }
        victims.len()
    }
}

fn ensure_non_overlapping(slots: &[TimeSlot]) -> Result<(), StoreError> {
    for window in slots.windows(2) {
        if window[1].start_time < window[0].end_time {
            return Err(StoreError::OverlappingSlots);
        }
    }
    Ok(())
}
