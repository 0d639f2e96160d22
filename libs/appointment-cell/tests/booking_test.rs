use std::sync::Arc;

use assert_matches::assert_matches;
use chrono::{NaiveDate, NaiveTime};
use uuid::Uuid;

use appointment_cell::models::{AppointmentError, BookSlotRequest};
use appointment_cell::services::booking::BookingCoordinator;
use directory_cell::services::directory::DirectoryService;
use shared_models::appointment::AppointmentStatus;
use shared_models::external::{DoctorRecord, PatientRecord, SystemClock};
use shared_models::slot::{SlotType, TimeSlot};
use shared_store::SchedulingStore;

struct Fixture {
    store: Arc<SchedulingStore>,
    coordinator: Arc<BookingCoordinator>,
    doctor_id: Uuid,
    date: NaiveDate,
}

async fn fixture() -> Fixture {
    let store = Arc::new(SchedulingStore::new());
    let directory = Arc::new(DirectoryService::new());
    let doctor_id = Uuid::new_v4();

    directory
        .upsert_doctor(DoctorRecord {
            id: doctor_id,
            name: "Dr. Amaya Okafor".to_string(),
            address: "12 Harbor Lane".to_string(),
            specialization: "General Practice".to_string(),
        })
        .await;

    let date = NaiveDate::from_ymd_opt(2026, 9, 17).unwrap();
    let slots: Vec<TimeSlot> = (0..4)
        .map(|i| {
            let start = NaiveTime::from_hms_opt(10 + i, 0, 0).unwrap();
            TimeSlot {
                start_time: start,
                end_time: NaiveTime::from_hms_opt(10 + i, 30, 0).unwrap(),
                duration_minutes: 30,
                slot_type: SlotType::Consult,
                available: true,
            }
        })
        .collect();
    store.put_slots(doctor_id, date, slots).await.unwrap();

    let coordinator = Arc::new(BookingCoordinator::new(
        Arc::clone(&store),
        Arc::clone(&directory) as Arc<dyn shared_models::external::Directory>,
        Arc::new(SystemClock),
    ));

    Fixture {
        store,
        coordinator,
        doctor_id,
        date,
    }
}

#[tokio::test]
async fn booking_snapshots_directory_fields() {
    let store = Arc::new(SchedulingStore::new());
    let directory = Arc::new(DirectoryService::new());
    let doctor_id = Uuid::new_v4();
    let patient_id = Uuid::new_v4();

    directory
        .upsert_doctor(DoctorRecord {
            id: doctor_id,
            name: "Dr. Amaya Okafor".to_string(),
            address: "12 Harbor Lane".to_string(),
            specialization: "Cardiology".to_string(),
        })
        .await;
    directory
        .upsert_patient(PatientRecord {
            id: patient_id,
            name: "Jordan Reyes".to_string(),
        })
        .await;

    let date = NaiveDate::from_ymd_opt(2026, 9, 17).unwrap();
    store
        .put_slots(
            doctor_id,
            date,
            vec![TimeSlot {
                start_time: "10:00:00".parse().unwrap(),
                end_time: "10:30:00".parse().unwrap(),
                duration_minutes: 30,
                slot_type: SlotType::Consult,
                available: true,
            }],
        )
        .await
        .unwrap();

    let coordinator = BookingCoordinator::new(
        Arc::clone(&store),
        Arc::clone(&directory) as Arc<dyn shared_models::external::Directory>,
        Arc::new(SystemClock),
    );

    let appointment = coordinator
        .book(BookSlotRequest {
            patient_id,
            doctor_id,
            date,
            start_time: "10:00:00".parse().unwrap(),
        })
        .await
        .unwrap();

    assert_eq!(appointment.status, AppointmentStatus::Pending);
    assert_eq!(appointment.patient_name, "Jordan Reyes");
    assert_eq!(appointment.doctor_name, "Dr. Amaya Okafor");
    assert_eq!(appointment.address, "12 Harbor Lane");
    assert_eq!(appointment.end_time, "10:30:00".parse::<NaiveTime>().unwrap());

    // Booking emits the initial pending trigger, addressed to the doctor
    // by the dispatcher.
    let triggers = store.triggers_for_appointment(appointment.id).await;
    assert_eq!(triggers.len(), 1);
    assert_eq!(triggers[0].trigger_type, AppointmentStatus::Pending);
}

#[tokio::test]
async fn unknown_patient_cannot_book() {
    let fixture = fixture().await;

    let result = fixture
        .coordinator
        .book(BookSlotRequest {
            patient_id: Uuid::new_v4(),
            doctor_id: fixture.doctor_id,
            date: fixture.date,
            start_time: "10:00:00".parse().unwrap(),
        })
        .await;

    assert_matches!(result, Err(AppointmentError::PatientNotFound));

    // The slot is untouched by the failed booking.
    let available = fixture.store.list_available(fixture.doctor_id, fixture.date).await;
    assert_eq!(available.len(), 4);
}

#[tokio::test]
async fn concurrent_bookings_for_one_slot_have_a_single_winner() {
    let store = Arc::new(SchedulingStore::new());
    let directory = Arc::new(DirectoryService::new());
    let doctor_id = Uuid::new_v4();

    directory
        .upsert_doctor(DoctorRecord {
            id: doctor_id,
            name: "Dr. Amaya Okafor".to_string(),
            address: "12 Harbor Lane".to_string(),
            specialization: "General Practice".to_string(),
        })
        .await;

    let date = NaiveDate::from_ymd_opt(2026, 9, 17).unwrap();
    store
        .put_slots(
            doctor_id,
            date,
            vec![TimeSlot {
                start_time: "10:00:00".parse().unwrap(),
                end_time: "10:30:00".parse().unwrap(),
                duration_minutes: 30,
                slot_type: SlotType::Consult,
                available: true,
            }],
        )
        .await
        .unwrap();

    let coordinator = Arc::new(BookingCoordinator::new(
        Arc::clone(&store),
        Arc::clone(&directory) as Arc<dyn shared_models::external::Directory>,
        Arc::new(SystemClock),
    ));

    let mut handles = Vec::new();
    for _ in 0..8 {
        let coordinator = Arc::clone(&coordinator);
        let directory = Arc::clone(&directory);
        handles.push(tokio::spawn(async move {
            let patient_id = Uuid::new_v4();
            directory
                .upsert_patient(PatientRecord {
                    id: patient_id,
                    name: "Jordan Reyes".to_string(),
                })
                .await;
            coordinator
                .book(BookSlotRequest {
                    patient_id,
                    doctor_id,
                    date,
                    start_time: "10:00:00".parse().unwrap(),
                })
                .await
        }));
    }

    let mut winners = 0;
    let mut losers = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => winners += 1,
            Err(AppointmentError::SlotUnavailable) => losers += 1,
            Err(other) => panic!("unexpected booking error: {}", other),
        }
    }

    assert_eq!(winners, 1);
    assert_eq!(losers, 7);

    let available = store.list_available(doctor_id, date).await;
    assert!(available.is_empty());
}
