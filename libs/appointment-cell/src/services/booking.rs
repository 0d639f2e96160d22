// libs/appointment-cell/src/services/booking.rs
use std::sync::Arc;

use tracing::{debug, info, warn};

use shared_models::appointment::Appointment;
use shared_models::external::{Clock, Directory, ExternalError};
use shared_store::{AppointmentDraft, SchedulingStore, StoreError};

use crate::models::{AppointmentError, BookSlotRequest};

/// Converts an available slot plus a booking request into a confirmed
/// appointment record. The directory snapshot happens before the atomic
/// claim; the claim itself is a single all-or-nothing store call, so the
/// coordinator never trusts client-side availability.
pub struct BookingCoordinator {
    store: Arc<SchedulingStore>,
    directory: Arc<dyn Directory>,
    clock: Arc<dyn Clock>,
}

impl BookingCoordinator {
    pub fn new(
        store: Arc<SchedulingStore>,
        directory: Arc<dyn Directory>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            directory,
            clock,
        }
    }

    pub async fn book(&self, request: BookSlotRequest) -> Result<Appointment, AppointmentError> {
        debug!(
            "Booking slot {} on {} for patient {} with doctor {}",
            request.start_time, request.date, request.patient_id, request.doctor_id
        );

        self.validate_request(&request)?;

        // Snapshot names and address now; the appointment record and every
        // notification body downstream reuse them without further lookups.
        let doctor = self
            .directory
            .get_doctor(request.doctor_id)
            .await
            .map_err(|e| match e {
                ExternalError::NotFound(_) => AppointmentError::DoctorNotFound,
                ExternalError::Unavailable(msg) => AppointmentError::ExternalService(msg),
            })?;
        let patient = self
            .directory
            .get_patient(request.patient_id)
            .await
            .map_err(|e| match e {
                ExternalError::NotFound(_) => AppointmentError::PatientNotFound,
                ExternalError::Unavailable(msg) => AppointmentError::ExternalService(msg),
            })?;

        let draft = AppointmentDraft {
            patient_id: request.patient_id,
            patient_name: patient.name,
            doctor_name: doctor.name,
            address: doctor.address,
        };

        let (appointment, _trigger) = self
            .store
            .book_slot(
                request.doctor_id,
                request.date,
                request.start_time,
                draft,
                self.clock.now(),
            )
            .await
            .map_err(|e| match e {
                StoreError::SlotNotFound => AppointmentError::SlotNotFound,
                StoreError::SlotUnavailable => {
                    warn!(
                        "Slot {} on {} for doctor {} was claimed concurrently",
                        request.start_time, request.date, request.doctor_id
                    );
                    AppointmentError::SlotUnavailable
                }
                other => AppointmentError::DatabaseError(other.to_string()),
            })?;

        info!(
            "Appointment {} booked for patient {} with doctor {}",
            appointment.id, appointment.patient_id, appointment.doctor_id
        );
        Ok(appointment)
    }

    pub async fn get_appointment(&self, id: uuid::Uuid) -> Result<Appointment, AppointmentError> {
        self.store.get_appointment(id).await.map_err(|e| match e {
            StoreError::AppointmentNotFound => AppointmentError::NotFound,
            other => AppointmentError::DatabaseError(other.to_string()),
        })
    }

    fn validate_request(&self, request: &BookSlotRequest) -> Result<(), AppointmentError> {
        if request.patient_id.is_nil() {
            return Err(AppointmentError::Validation("patient_id must be set".to_string()));
        }
        if request.doctor_id.is_nil() {
            return Err(AppointmentError::Validation("doctor_id must be set".to_string()));
        }
        Ok(())
    }
}
