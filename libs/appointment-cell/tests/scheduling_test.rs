use std::sync::Arc;
use std::time::Duration as StdDuration;

use assert_matches::assert_matches;
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use futures::future::join_all;
use uuid::Uuid;

use appointment_cell::services::conflict::intervals_overlap;
use appointment_cell::store::AppointmentStore;
use appointment_cell::{
    Appointment, AppointmentError, AppointmentStatus, DoctorLocks, InMemoryAppointmentStore,
    NotificationClient, NotificationDispatcher, ScheduleAppointmentRequest, SchedulingCoordinator,
    UpdateAppointmentRequest,
};
use doctor_cell::{Doctor, DoctorRegistry, NewDoctor, Specialty};
use patient_cell::{Patient, PatientRegistry, RegisterPatientRequest};
use shared_utils::clock::ManualClock;

fn eight_am() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 2, 8, 0, 0).unwrap()
}

fn ten_am() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 2, 10, 0, 0).unwrap()
}

struct TestSetup {
    coordinator: Arc<SchedulingCoordinator>,
    store: Arc<InMemoryAppointmentStore>,
    patients: Arc<PatientRegistry>,
    doctors: Arc<DoctorRegistry>,
    clock: Arc<ManualClock>,
    patient: Patient,
    doctor: Doctor,
}

impl TestSetup {
    async fn new() -> Self {
        let clock = Arc::new(ManualClock::at(eight_am()));
        let store = InMemoryAppointmentStore::shared();
        let patients = Arc::new(PatientRegistry::new());
        let doctors = Arc::new(DoctorRegistry::new());

        let patient = patients
            .register(RegisterPatientRequest {
                full_name_en: "John Doe".to_string(),
                full_name_ar: "جون دو".to_string(),
                email: "john.doe@example.com".to_string(),
                mobile_number: "+96650000000".to_string(),
                date_of_birth: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
                national_id: "1000000001".to_string(),
            })
            .await
            .unwrap();

        let doctor = doctors
            .register(NewDoctor {
                name_en: "Dr. Ahmed Hassan".to_string(),
                name_ar: "د. أحمد حسن".to_string(),
                specialty: Specialty::Cardiology,
                years_of_experience: 15,
                consultation_duration_minutes: 30,
            })
            .await;

        // The gateway address points nowhere; delivery failures are logged
        // and dropped, which is exactly the contract under test.
        let notifier =
            NotificationDispatcher::spawn(NotificationClient::new("http://127.0.0.1:9"), 16);

        let coordinator = Arc::new(SchedulingCoordinator::new(
            store.clone(),
            patients.clone(),
            doctors.clone(),
            notifier,
            clock.clone(),
            StdDuration::from_secs(5),
        ));

        Self {
            coordinator,
            store,
            patients,
            doctors,
            clock,
            patient,
            doctor,
        }
    }

    fn booking_at(&self, start: DateTime<Utc>) -> ScheduleAppointmentRequest {
        ScheduleAppointmentRequest {
            patient_id: self.patient.id,
            doctor_id: self.doctor.id,
            start_time: start,
            reason: Some("Chest pain follow-up".to_string()),
        }
    }

    async fn active_appointments(&self, doctor_id: Uuid) -> Vec<Appointment> {
        self.store
            .find_by_doctor(doctor_id)
            .await
            .into_iter()
            .filter(|a| a.blocks_calendar())
            .collect()
    }
}

fn status_update(status: AppointmentStatus) -> UpdateAppointmentRequest {
    UpdateAppointmentRequest {
        status: Some(status),
        ..Default::default()
    }
}

#[tokio::test]
async fn schedule_creates_scheduled_appointment_with_doctor_duration() {
    let setup = TestSetup::new().await;

    let appointment = setup.coordinator.schedule(setup.booking_at(ten_am())).await.unwrap();

    assert_eq!(appointment.status, AppointmentStatus::Scheduled);
    assert_eq!(appointment.duration_minutes, 30);
    assert_eq!(appointment.end_time(), ten_am() + Duration::minutes(30));
    assert_eq!(appointment.reason.as_deref(), Some("Chest pain follow-up"));

    let stored = setup.store.find_by_id(appointment.id).await.unwrap();
    assert_eq!(stored.start_time, ten_am());
}

#[tokio::test]
async fn schedule_requires_existing_patient_and_doctor() {
    let setup = TestSetup::new().await;

    let mut request = setup.booking_at(ten_am());
    request.patient_id = Uuid::new_v4();
    assert_matches!(
        setup.coordinator.schedule(request).await,
        Err(AppointmentError::PatientNotFound)
    );

    let mut request = setup.booking_at(ten_am());
    request.doctor_id = Uuid::new_v4();
    assert_matches!(
        setup.coordinator.schedule(request).await,
        Err(AppointmentError::DoctorNotFound)
    );
}

#[tokio::test]
async fn soft_deleted_patient_cannot_book() {
    let setup = TestSetup::new().await;

    setup.patients.soft_delete(setup.patient.id).await.unwrap();

    assert_matches!(
        setup.coordinator.schedule(setup.booking_at(ten_am())).await,
        Err(AppointmentError::PatientNotFound)
    );
}

#[tokio::test]
async fn booking_in_the_past_is_rejected() {
    let setup = TestSetup::new().await;

    let result = setup
        .coordinator
        .schedule(setup.booking_at(eight_am() - Duration::hours(1)))
        .await;

    assert_matches!(result, Err(AppointmentError::InvalidTime(_)));
}

#[tokio::test]
async fn overlapping_booking_is_rejected() {
    let setup = TestSetup::new().await;

    setup.coordinator.schedule(setup.booking_at(ten_am())).await.unwrap();

    // [10:15, 10:45) against the committed [10:00, 10:30).
    let result = setup
        .coordinator
        .schedule(setup.booking_at(ten_am() + Duration::minutes(15)))
        .await;

    assert_matches!(result, Err(AppointmentError::ConflictDetected));
    assert_eq!(setup.active_appointments(setup.doctor.id).await.len(), 1);
}

#[tokio::test]
async fn back_to_back_bookings_both_succeed() {
    let setup = TestSetup::new().await;

    setup.coordinator.schedule(setup.booking_at(ten_am())).await.unwrap();
    setup
        .coordinator
        .schedule(setup.booking_at(ten_am() + Duration::minutes(30)))
        .await
        .unwrap();

    assert_eq!(setup.active_appointments(setup.doctor.id).await.len(), 2);
}

#[tokio::test]
async fn cancelled_appointment_frees_its_slot() {
    let setup = TestSetup::new().await;

    let first = setup.coordinator.schedule(setup.booking_at(ten_am())).await.unwrap();
    setup
        .coordinator
        .reschedule(first.id, status_update(AppointmentStatus::Cancelled))
        .await
        .unwrap();

    let second = setup.coordinator.schedule(setup.booking_at(ten_am())).await.unwrap();
    assert_eq!(second.start_time, ten_am());
}

#[tokio::test]
async fn reschedule_does_not_conflict_with_own_slot() {
    let setup = TestSetup::new().await;

    let appointment = setup.coordinator.schedule(setup.booking_at(ten_am())).await.unwrap();

    let update = UpdateAppointmentRequest {
        start_time: Some(ten_am() + Duration::minutes(5)),
        ..Default::default()
    };
    let updated = setup.coordinator.reschedule(appointment.id, update).await.unwrap();

    assert_eq!(updated.start_time, ten_am() + Duration::minutes(5));
}

#[tokio::test]
async fn reschedule_into_another_appointment_conflicts() {
    let setup = TestSetup::new().await;

    setup.coordinator.schedule(setup.booking_at(ten_am())).await.unwrap();
    let movable = setup
        .coordinator
        .schedule(setup.booking_at(ten_am() + Duration::hours(2)))
        .await
        .unwrap();

    let update = UpdateAppointmentRequest {
        start_time: Some(ten_am() + Duration::minutes(10)),
        ..Default::default()
    };
    let result = setup.coordinator.reschedule(movable.id, update).await;

    assert_matches!(result, Err(AppointmentError::ConflictDetected));

    // The losing update left the record untouched.
    let unchanged = setup.store.find_by_id(movable.id).await.unwrap();
    assert_eq!(unchanged.start_time, ten_am() + Duration::hours(2));
}

#[tokio::test]
async fn status_only_update_skips_the_conflict_check() {
    let setup = TestSetup::new().await;

    // Seed two overlapping records straight into the store, as legacy data
    // the coordinator never admitted.
    let first = Appointment {
        id: Uuid::new_v4(),
        patient_id: setup.patient.id,
        doctor_id: setup.doctor.id,
        start_time: ten_am(),
        duration_minutes: 30,
        status: AppointmentStatus::Scheduled,
        reason: None,
        created_at: eight_am(),
        updated_at: eight_am(),
    };
    let mut second = first.clone();
    second.id = Uuid::new_v4();
    second.start_time = ten_am() + Duration::minutes(10);
    setup.store.save(first.clone()).await;
    setup.store.save(second.clone()).await;

    // Confirming does not move the interval, so it passes.
    let confirmed = setup
        .coordinator
        .reschedule(first.id, status_update(AppointmentStatus::Confirmed))
        .await
        .unwrap();
    assert_eq!(confirmed.status, AppointmentStatus::Confirmed);

    // Re-asserting the same start time does run the check and trips over
    // the overlapping neighbour.
    let update = UpdateAppointmentRequest {
        start_time: Some(first.start_time + Duration::minutes(1)),
        ..Default::default()
    };
    assert_matches!(
        setup.coordinator.reschedule(first.id, update).await,
        Err(AppointmentError::ConflictDetected)
    );
}

#[tokio::test]
async fn reschedule_of_unknown_appointment_is_not_found() {
    let setup = TestSetup::new().await;

    let result = setup
        .coordinator
        .reschedule(Uuid::new_v4(), status_update(AppointmentStatus::Confirmed))
        .await;

    assert_matches!(result, Err(AppointmentError::NotFound));
}

#[tokio::test]
async fn reschedule_into_the_past_is_rejected() {
    let setup = TestSetup::new().await;

    let appointment = setup.coordinator.schedule(setup.booking_at(ten_am())).await.unwrap();
    setup.clock.advance(Duration::hours(5));

    let update = UpdateAppointmentRequest {
        start_time: Some(ten_am() + Duration::hours(1)),
        ..Default::default()
    };
    let result = setup.coordinator.reschedule(appointment.id, update).await;

    assert_matches!(result, Err(AppointmentError::InvalidTime(_)));
}

#[tokio::test]
async fn concurrent_bookings_for_the_same_slot_admit_exactly_one() {
    let setup = TestSetup::new().await;

    let attempts: Vec<_> = (0..2)
        .map(|_| {
            let coordinator = setup.coordinator.clone();
            let request = setup.booking_at(ten_am());
            tokio::spawn(async move { coordinator.schedule(request).await })
        })
        .collect();

    let outcomes: Vec<_> = join_all(attempts)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    let successes = outcomes.iter().filter(|o| o.is_ok()).count();
    let conflicts = outcomes
        .iter()
        .filter(|o| matches!(o, Err(AppointmentError::ConflictDetected)))
        .count();

    assert_eq!(successes, 1);
    assert_eq!(conflicts, 1);
    assert_eq!(setup.active_appointments(setup.doctor.id).await.len(), 1);
}

#[tokio::test]
async fn concurrent_bookings_leave_a_pairwise_disjoint_calendar() {
    let setup = TestSetup::new().await;

    // Twelve contenders over three mutually overlapping start times.
    let starts = [0i64, 15, 30];
    let attempts: Vec<_> = (0..12)
        .map(|i| {
            let coordinator = setup.coordinator.clone();
            let request = setup.booking_at(ten_am() + Duration::minutes(starts[i % 3]));
            tokio::spawn(async move { coordinator.schedule(request).await })
        })
        .collect();

    let outcomes: Vec<_> = join_all(attempts)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    assert!(outcomes.iter().any(|o| o.is_ok()));

    let mut active = setup.active_appointments(setup.doctor.id).await;
    active.sort_by_key(|a| a.start_time);

    for pair in active.windows(2) {
        assert!(
            !intervals_overlap(
                pair[0].start_time,
                pair[0].end_time(),
                pair[1].start_time,
                pair[1].end_time()
            ),
            "overlapping committed appointments: {} and {}",
            pair[0].start_time,
            pair[1].start_time
        );
    }
}

#[tokio::test]
async fn bookings_for_different_doctors_do_not_interact() {
    let setup = TestSetup::new().await;

    let second_doctor = setup
        .doctors
        .register(NewDoctor {
            name_en: "Dr. Sara Nouri".to_string(),
            name_ar: "د. سارة نوري".to_string(),
            specialty: Specialty::GeneralPractice,
            years_of_experience: 8,
            consultation_duration_minutes: 15,
        })
        .await;

    setup.coordinator.schedule(setup.booking_at(ten_am())).await.unwrap();

    let mut request = setup.booking_at(ten_am());
    request.doctor_id = second_doctor.id;
    let other = setup.coordinator.schedule(request).await.unwrap();

    // The second doctor's duration, not the first's, shapes the slot.
    assert_eq!(other.duration_minutes, 15);
}

#[tokio::test]
async fn contended_doctor_lock_surfaces_busy_instead_of_hanging() {
    let locks = DoctorLocks::new();
    let doctor_id = Uuid::new_v4();

    let guard = locks
        .acquire(doctor_id, StdDuration::from_millis(100))
        .await
        .unwrap();

    let result = locks.acquire(doctor_id, StdDuration::from_millis(50)).await;
    assert_matches!(result, Err(AppointmentError::SchedulerBusy));

    // Other doctors are untouched by the contention.
    assert!(locks
        .acquire(Uuid::new_v4(), StdDuration::from_millis(50))
        .await
        .is_ok());

    drop(guard);
    assert!(locks
        .acquire(doctor_id, StdDuration::from_millis(50))
        .await
        .is_ok());
}
