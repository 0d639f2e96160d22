use uuid::Uuid;

use crate::auth::{Actor, Role};
use crate::error::AppError;

/// Single authorization decision point for the core. Handlers ask it one
/// question instead of comparing role strings inline.
#[derive(Debug, Clone, Copy, Default)]
pub struct PolicyEngine;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ManageSchedule,
    BookAppointment,
    TransitionAppointment,
    ManageDirectory,
    ManagePushToken,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    DoctorSchedule { doctor_id: Uuid },
    Booking { patient_id: Uuid },
    Appointment { doctor_id: Uuid },
    Directory,
    PushToken { user_id: Uuid },
}

impl PolicyEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn authorize(&self, actor: &Actor, action: Action, resource: &Resource) -> Result<(), AppError> {
        if actor.role == Role::Admin {
            return Ok(());
        }

        let allowed = match (action, resource) {
            (Action::ManageSchedule, Resource::DoctorSchedule { doctor_id }) => {
                actor.role == Role::Doctor && actor.id == *doctor_id
            }
            (Action::BookAppointment, Resource::Booking { patient_id }) => {
                actor.role == Role::Patient && actor.id == *patient_id
            }
            (Action::TransitionAppointment, Resource::Appointment { doctor_id }) => {
                actor.role == Role::Doctor && actor.id == *doctor_id
            }
            (Action::ManageDirectory, Resource::Directory) => false,
            (Action::ManagePushToken, Resource::PushToken { user_id }) => actor.id == *user_id,
            _ => false,
        };

        if allowed {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!(
                "{} {} is not allowed to perform this action",
                actor.role, actor.id
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actor(role: Role) -> Actor {
        Actor {
            id: Uuid::new_v4(),
            role,
        }
    }

    #[test]
    fn admin_is_allowed_everything() {
        let policy = PolicyEngine::new();
        let admin = actor(Role::Admin);
        assert!(policy
            .authorize(&admin, Action::ManageDirectory, &Resource::Directory)
            .is_ok());
        assert!(policy
            .authorize(
                &admin,
                Action::ManageSchedule,
                &Resource::DoctorSchedule { doctor_id: Uuid::new_v4() }
            )
            .is_ok());
    }

    #[test]
    fn doctor_manages_only_own_schedule() {
        let policy = PolicyEngine::new();
        let doctor = actor(Role::Doctor);
        assert!(policy
            .authorize(
                &doctor,
                Action::ManageSchedule,
                &Resource::DoctorSchedule { doctor_id: doctor.id }
            )
            .is_ok());
        assert!(policy
            .authorize(
                &doctor,
                Action::ManageSchedule,
                &Resource::DoctorSchedule { doctor_id: Uuid::new_v4() }
            )
            .is_err());
    }

    #[test]
    fn patient_books_only_for_self() {
        let policy = PolicyEngine::new();
        let patient = actor(Role::Patient);
        assert!(policy
            .authorize(
                &patient,
                Action::BookAppointment,
                &Resource::Booking { patient_id: patient.id }
            )
            .is_ok());
        assert!(policy
            .authorize(
                &patient,
                Action::BookAppointment,
                &Resource::Booking { patient_id: Uuid::new_v4() }
            )
            .is_err());
    }
}
