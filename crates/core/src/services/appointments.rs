//! Appointment booking and lifecycle.
//!
//! Booking is the one operation with a race worth closing: the conflict check
//! ("does an active appointment already hold this doctor, date, and time?")
//! and the insert run under a single collection write guard, so two
//! concurrent requests for the same slot cannot both succeed.

use std::sync::Arc;

use chrono::{Datelike, NaiveDate, NaiveTime, Utc};
use uuid::Uuid;

use crate::models::{
    Appointment, AppointmentDetail, AppointmentListQuery, AppointmentStats, AppointmentStatus,
    BookAppointmentRequest, Role, StatusUpdateRequest, UpdateAppointmentRequest,
    DEFAULT_DURATION_MINUTES, MAX_DURATION_MINUTES, MIN_DURATION_MINUTES,
};
use crate::pagination::{paginate, Page};
use crate::services::scheduling::derive_slots;
use crate::store::Store;
use crate::{ClinicError, ClinicResult};

pub struct AppointmentService {
    store: Arc<Store>,
}

impl AppointmentService {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    /// Books an appointment.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the doctor or patient does not exist
    /// - `Forbidden` if a patient books for someone else's patient record
    /// - `InvalidInput` for an out-of-range duration
    /// - `Conflict` if an active appointment already holds the slot
    pub fn book(
        &self,
        actor_user_id: Uuid,
        actor_role: Role,
        req: BookAppointmentRequest,
    ) -> ClinicResult<AppointmentDetail> {
        self.store
            .doctors
            .get(req.doctor_id)?
            .ok_or(ClinicError::NotFound("Doctor"))?;
        let patient = self
            .store
            .patients
            .get(req.patient_id)?
            .ok_or(ClinicError::NotFound("Patient"))?;

        if actor_role == Role::Patient && patient.user_id != actor_user_id {
            return Err(ClinicError::Forbidden(
                "You can only book appointments for yourself".into(),
            ));
        }

        let duration = req.duration.unwrap_or(DEFAULT_DURATION_MINUTES);
        if !(MIN_DURATION_MINUTES..=MAX_DURATION_MINUTES).contains(&duration) {
            return Err(ClinicError::InvalidInput(format!(
                "duration must be between {} and {} minutes",
                MIN_DURATION_MINUTES, MAX_DURATION_MINUTES
            )));
        }

        let now = Utc::now();
        let appointment = Appointment {
            id: Uuid::new_v4(),
            patient_id: req.patient_id,
            doctor_id: req.doctor_id,
            appointment_date: req.appointment_date,
            appointment_time: req.appointment_time,
            duration,
            appointment_type: req.appointment_type.unwrap_or_default(),
            status: AppointmentStatus::Scheduled,
            reason: req
                .reason
                .unwrap_or_else(|| "General consultation".into()),
            symptoms: req.symptoms.unwrap_or_default(),
            notes: req.notes,
            is_virtual: req.is_virtual.unwrap_or(false),
            meeting_link: None,
            cancellation_reason: None,
            cancelled_by: None,
            cancellation_date: None,
            created_at: now,
            updated_at: now,
        };

        let inserted = self.store.appointments.insert_unless(
            appointment.clone(),
            |existing| {
                existing.doctor_id == appointment.doctor_id
                    && existing.appointment_date == appointment.appointment_date
                    && existing.appointment_time == appointment.appointment_time
                    && existing.status.blocks_slot()
            },
        )?;
        if !inserted {
            return Err(ClinicError::Conflict("Time slot is already booked".into()));
        }

        super::appointment_detail(&self.store, appointment)
    }

    /// A patient's own appointments, filtered and paginated.
    pub fn list_for_patient(
        &self,
        patient_id: Uuid,
        query: &AppointmentListQuery,
    ) -> ClinicResult<Page<AppointmentDetail>> {
        self.list_where(|a| a.patient_id == patient_id, query)
    }

    /// A doctor's schedule, filtered and paginated.
    pub fn list_for_doctor(
        &self,
        doctor_id: Uuid,
        query: &AppointmentListQuery,
    ) -> ClinicResult<Page<AppointmentDetail>> {
        self.list_where(|a| a.doctor_id == doctor_id, query)
    }

    fn list_where<F>(
        &self,
        owner: F,
        query: &AppointmentListQuery,
    ) -> ClinicResult<Page<AppointmentDetail>>
    where
        F: Fn(&Appointment) -> bool,
    {
        let today = Utc::now().date_naive();
        let mut appointments = self.store.appointments.find(|a| {
            owner(a)
                && query.status.map_or(true, |s| a.status == s)
                && query.date.map_or(true, |d| a.appointment_date == d)
                && (!query.upcoming.unwrap_or(false)
                    || (a.appointment_date >= today && a.status.blocks_slot()))
        })?;
        super::sort_appointments(&mut appointments);

        let page = paginate(appointments, query.page, query.limit);
        let mut items = Vec::with_capacity(page.items.len());
        for appointment in page.items {
            items.push(super::appointment_detail(&self.store, appointment)?);
        }

        Ok(Page {
            items,
            total: page.total,
            total_pages: page.total_pages,
            current_page: page.current_page,
        })
    }

    /// Fetches one appointment; only the two parties and admins may see it.
    pub fn get(
        &self,
        actor_user_id: Uuid,
        actor_role: Role,
        id: Uuid,
    ) -> ClinicResult<AppointmentDetail> {
        let appointment = self
            .store
            .appointments
            .get(id)?
            .ok_or(ClinicError::NotFound("Appointment"))?;
        self.authorize(actor_user_id, actor_role, &appointment)?;
        super::appointment_detail(&self.store, appointment)
    }

    /// Reschedule / annotate. Doctors may only touch their own appointments;
    /// admins may touch any.
    pub fn update(
        &self,
        actor_user_id: Uuid,
        actor_role: Role,
        id: Uuid,
        req: UpdateAppointmentRequest,
    ) -> ClinicResult<AppointmentDetail> {
        let appointment = self
            .store
            .appointments
            .get(id)?
            .ok_or(ClinicError::NotFound("Appointment"))?;

        if actor_role != Role::Admin {
            let doctor = self
                .store
                .doctors
                .get(appointment.doctor_id)?
                .ok_or(ClinicError::NotFound("Doctor"))?;
            if doctor.user_id != actor_user_id {
                return Err(ClinicError::Forbidden("Access denied".into()));
            }
        }

        if let Some(duration) = req.duration {
            if !(MIN_DURATION_MINUTES..=MAX_DURATION_MINUTES).contains(&duration) {
                return Err(ClinicError::InvalidInput(format!(
                    "duration must be between {} and {} minutes",
                    MIN_DURATION_MINUTES, MAX_DURATION_MINUTES
                )));
            }
        }

        // Rescheduling must not land on a slot another active appointment
        // already holds.
        let new_date = req.appointment_date.unwrap_or(appointment.appointment_date);
        let new_time = req.appointment_time.unwrap_or(appointment.appointment_time);
        if (new_date, new_time)
            != (appointment.appointment_date, appointment.appointment_time)
        {
            let held = self.store.appointments.find_one(|existing| {
                existing.id != id
                    && existing.doctor_id == appointment.doctor_id
                    && existing.appointment_date == new_date
                    && existing.appointment_time == new_time
                    && existing.status.blocks_slot()
            })?;
            if held.is_some() {
                return Err(ClinicError::Conflict("Time slot is already booked".into()));
            }
        }

        let updated = self
            .store
            .appointments
            .update(id, |a| {
                if let Some(v) = req.appointment_date {
                    a.appointment_date = v;
                }
                if let Some(v) = req.appointment_time {
                    a.appointment_time = v;
                }
                if let Some(v) = req.duration {
                    a.duration = v;
                }
                if let Some(v) = req.appointment_type {
                    a.appointment_type = v;
                }
                if let Some(v) = req.status {
                    a.status = v;
                }
                if let Some(v) = req.reason.clone() {
                    a.reason = v;
                }
                if let Some(v) = req.symptoms.clone() {
                    a.symptoms = v;
                }
                if let Some(v) = req.notes.clone() {
                    a.notes = Some(v);
                }
                if let Some(v) = req.is_virtual {
                    a.is_virtual = v;
                }
                if let Some(v) = req.meeting_link.clone() {
                    a.meeting_link = Some(v);
                }
                a.updated_at = Utc::now();
            })?
            .ok_or(ClinicError::NotFound("Appointment"))?;

        super::appointment_detail(&self.store, updated)
    }

    /// Status transition. Cancellation keeps the record and stamps the
    /// cancellation metadata; the slot is freed because a cancelled status no
    /// longer blocks it.
    pub fn update_status(
        &self,
        actor_user_id: Uuid,
        actor_role: Role,
        id: Uuid,
        req: StatusUpdateRequest,
    ) -> ClinicResult<AppointmentDetail> {
        let appointment = self
            .store
            .appointments
            .get(id)?
            .ok_or(ClinicError::NotFound("Appointment"))?;
        self.authorize(actor_user_id, actor_role, &appointment)?;

        let updated = self
            .store
            .appointments
            .update(id, |a| {
                a.status = req.status;
                if req.status == AppointmentStatus::Cancelled {
                    a.cancellation_reason = req.cancellation_reason.clone();
                    a.cancelled_by = Some(req.cancelled_by.unwrap_or(actor_role.into()));
                    a.cancellation_date = Some(Utc::now());
                }
                a.updated_at = Utc::now();
            })?
            .ok_or(ClinicError::NotFound("Appointment"))?;

        super::appointment_detail(&self.store, updated)
    }

    /// Hard delete, admin only at the API layer.
    pub fn delete(&self, id: Uuid) -> ClinicResult<()> {
        if !self.store.appointments.remove(id)? {
            return Err(ClinicError::NotFound("Appointment"));
        }
        Ok(())
    }

    /// The bookable half-hour start times for a doctor on a given date.
    ///
    /// Booked means an appointment at that exact time whose status still holds
    /// the slot; a 60-minute booking blocks only its own start time.
    pub fn available_slots(
        &self,
        doctor_id: Uuid,
        date: Option<NaiveDate>,
    ) -> ClinicResult<Vec<NaiveTime>> {
        let date = date.ok_or_else(|| {
            ClinicError::InvalidInput("Date parameter is required".into())
        })?;
        let doctor = self
            .store
            .doctors
            .get(doctor_id)?
            .ok_or(ClinicError::NotFound("Doctor"))?;

        let booked: Vec<NaiveTime> = self
            .store
            .appointments
            .find(|a| {
                a.doctor_id == doctor_id
                    && a.appointment_date == date
                    && a.status.blocks_slot()
            })?
            .into_iter()
            .map(|a| a.appointment_time)
            .collect();

        Ok(derive_slots(doctor.availability.day(date.weekday()), &booked))
    }

    /// System-wide counters for the admin dashboard.
    pub fn overview_stats(&self) -> ClinicResult<AppointmentStats> {
        let today = Utc::now().date_naive();

        Ok(AppointmentStats {
            total_appointments: self.store.appointments.len()?,
            today_appointments: self
                .store
                .appointments
                .count(|a| a.appointment_date == today)?,
            upcoming_appointments: self
                .store
                .appointments
                .count(|a| a.appointment_date >= today && a.status.blocks_slot())?,
            completed_appointments: self
                .store
                .appointments
                .count(|a| a.status == AppointmentStatus::Completed)?,
        })
    }

    fn authorize(
        &self,
        actor_user_id: Uuid,
        actor_role: Role,
        appointment: &Appointment,
    ) -> ClinicResult<()> {
        match actor_role {
            Role::Admin => Ok(()),
            Role::Doctor => {
                let owns = self
                    .store
                    .doctors
                    .get(appointment.doctor_id)?
                    .is_some_and(|d| d.user_id == actor_user_id);
                if owns {
                    Ok(())
                } else {
                    Err(ClinicError::Forbidden("Access denied".into()))
                }
            }
            Role::Patient => {
                let owns = self
                    .store
                    .patients
                    .get(appointment.patient_id)?
                    .is_some_and(|p| p.user_id == actor_user_id);
                if owns {
                    Ok(())
                } else {
                    Err(ClinicError::Forbidden("Access denied".into()))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DayWindow, Doctor, Patient, User, WeeklyAvailability};
    use tempfile::TempDir;

    fn seed_user(store: &Store, role: Role) -> User {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: format!("{}@example.com", Uuid::new_v4()),
            password_hash: String::new(),
            password_salt: String::new(),
            first_name: "Test".into(),
            last_name: "User".into(),
            role,
            phone: None,
            date_of_birth: None,
            gender: None,
            address: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        store.users.insert(user.clone()).unwrap();
        user
    }

    fn seed_doctor(store: &Store) -> Doctor {
        let user = seed_user(store, Role::Doctor);
        let now = Utc::now();
        let window = DayWindow {
            available: true,
            start: NaiveTime::from_hms_opt(9, 0, 0),
            end: NaiveTime::from_hms_opt(17, 0, 0),
        };
        let doctor = Doctor {
            id: Uuid::new_v4(),
            user_id: user.id,
            specialization: "General Medicine".into(),
            license_number: "LIC-1".into(),
            experience: 3,
            consultation_fee: 40.0,
            bio: None,
            availability: WeeklyAvailability {
                monday: window.clone(),
                tuesday: window.clone(),
                wednesday: window.clone(),
                thursday: window.clone(),
                friday: window.clone(),
                saturday: window.clone(),
                sunday: window,
            },
            rating: 0.0,
            total_reviews: 0,
            is_verified: true,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        store.doctors.insert(doctor.clone()).unwrap();
        doctor
    }

    fn seed_patient(store: &Store) -> Patient {
        let user = seed_user(store, Role::Patient);
        let now = Utc::now();
        let patient = Patient {
            id: Uuid::new_v4(),
            user_id: user.id,
            blood_group: None,
            height: None,
            weight: None,
            emergency_contact: None,
            medical_history: Vec::new(),
            allergies: Vec::new(),
            current_medications: Vec::new(),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        store.patients.insert(patient.clone()).unwrap();
        patient
    }

    fn booking(patient: &Patient, doctor: &Doctor, time: NaiveTime) -> BookAppointmentRequest {
        BookAppointmentRequest {
            patient_id: patient.id,
            doctor_id: doctor.id,
            appointment_date: NaiveDate::from_ymd_opt(2030, 6, 3).unwrap(),
            appointment_time: time,
            duration: None,
            appointment_type: None,
            reason: Some("checkup".into()),
            symptoms: None,
            notes: None,
            is_virtual: None,
        }
    }

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn same_slot_same_doctor_is_rejected() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(Store::open(dir.path()).unwrap());
        let doctor = seed_doctor(&store);
        let alice = seed_patient(&store);
        let bob = seed_patient(&store);

        let svc = AppointmentService::new(store);
        svc.book(alice.user_id, Role::Patient, booking(&alice, &doctor, t(10, 0)))
            .unwrap();
        let second = svc.book(bob.user_id, Role::Patient, booking(&bob, &doctor, t(10, 0)));
        assert!(matches!(second, Err(ClinicError::Conflict(_))));
    }

    #[test]
    fn same_slot_different_doctor_succeeds() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(Store::open(dir.path()).unwrap());
        let doc_a = seed_doctor(&store);
        let doc_b = seed_doctor(&store);
        let patient = seed_patient(&store);

        let svc = AppointmentService::new(store);
        svc.book(patient.user_id, Role::Patient, booking(&patient, &doc_a, t(10, 0)))
            .unwrap();
        svc.book(patient.user_id, Role::Patient, booking(&patient, &doc_b, t(10, 0)))
            .unwrap();
    }

    #[test]
    fn patient_cannot_book_for_another_patient() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(Store::open(dir.path()).unwrap());
        let doctor = seed_doctor(&store);
        let alice = seed_patient(&store);
        let bob = seed_patient(&store);

        let svc = AppointmentService::new(store);
        let denied = svc.book(bob.user_id, Role::Patient, booking(&alice, &doctor, t(9, 0)));
        assert!(matches!(denied, Err(ClinicError::Forbidden(_))));
    }

    #[test]
    fn out_of_range_duration_is_rejected() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(Store::open(dir.path()).unwrap());
        let doctor = seed_doctor(&store);
        let patient = seed_patient(&store);

        let svc = AppointmentService::new(store);
        let mut req = booking(&patient, &doctor, t(10, 0));
        req.duration = Some(MAX_DURATION_MINUTES + 1);
        assert!(matches!(
            svc.book(patient.user_id, Role::Patient, req),
            Err(ClinicError::InvalidInput(_))
        ));
    }

    #[test]
    fn reschedule_onto_held_slot_is_rejected() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(Store::open(dir.path()).unwrap());
        let doctor = seed_doctor(&store);
        let patient = seed_patient(&store);

        let svc = AppointmentService::new(store);
        svc.book(patient.user_id, Role::Patient, booking(&patient, &doctor, t(10, 0)))
            .unwrap();
        let second = svc
            .book(patient.user_id, Role::Patient, booking(&patient, &doctor, t(11, 0)))
            .unwrap();

        let moved = svc.update(
            doctor.user_id,
            Role::Doctor,
            second.appointment.id,
            UpdateAppointmentRequest {
                appointment_time: Some(t(10, 0)),
                ..Default::default()
            },
        );
        assert!(matches!(moved, Err(ClinicError::Conflict(_))));

        // A free slot is still fine.
        svc.update(
            doctor.user_id,
            Role::Doctor,
            second.appointment.id,
            UpdateAppointmentRequest {
                appointment_time: Some(t(12, 0)),
                ..Default::default()
            },
        )
        .unwrap();
    }

    #[test]
    fn cancelled_slot_becomes_bookable_again() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(Store::open(dir.path()).unwrap());
        let doctor = seed_doctor(&store);
        let patient = seed_patient(&store);

        let svc = AppointmentService::new(store);
        let first = svc
            .book(patient.user_id, Role::Patient, booking(&patient, &doctor, t(11, 0)))
            .unwrap();
        svc.update_status(
            patient.user_id,
            Role::Patient,
            first.appointment.id,
            StatusUpdateRequest {
                status: AppointmentStatus::Cancelled,
                cancellation_reason: Some("conflict".into()),
                cancelled_by: None,
            },
        )
        .unwrap();

        svc.book(patient.user_id, Role::Patient, booking(&patient, &doctor, t(11, 0)))
            .unwrap();
    }

    #[test]
    fn cancellation_preserves_record_and_metadata() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(Store::open(dir.path()).unwrap());
        let doctor = seed_doctor(&store);
        let patient = seed_patient(&store);

        let svc = AppointmentService::new(store.clone());
        let booked = svc
            .book(patient.user_id, Role::Patient, booking(&patient, &doctor, t(14, 0)))
            .unwrap();
        let cancelled = svc
            .update_status(
                patient.user_id,
                Role::Patient,
                booked.appointment.id,
                StatusUpdateRequest {
                    status: AppointmentStatus::Cancelled,
                    cancellation_reason: Some("feeling better".into()),
                    cancelled_by: None,
                },
            )
            .unwrap();

        assert_eq!(cancelled.appointment.status, AppointmentStatus::Cancelled);
        assert_eq!(
            cancelled.appointment.cancellation_reason.as_deref(),
            Some("feeling better")
        );
        assert!(cancelled.appointment.cancellation_date.is_some());
        // The record still exists in the store.
        assert!(store
            .appointments
            .get(booked.appointment.id)
            .unwrap()
            .is_some());
    }

    #[test]
    fn available_slots_exclude_booked_times() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(Store::open(dir.path()).unwrap());
        let doctor = seed_doctor(&store);
        let patient = seed_patient(&store);

        let svc = AppointmentService::new(store);
        let date = NaiveDate::from_ymd_opt(2030, 6, 3).unwrap();
        let mut req = booking(&patient, &doctor, t(9, 30));
        req.appointment_date = date;
        svc.book(patient.user_id, Role::Patient, req).unwrap();

        let slots = svc.available_slots(doctor.id, Some(date)).unwrap();
        assert!(slots.contains(&t(9, 0)));
        assert!(!slots.contains(&t(9, 30)));
        assert!(slots.contains(&t(10, 0)));
    }

    #[test]
    fn available_slots_require_a_date() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(Store::open(dir.path()).unwrap());
        let doctor = seed_doctor(&store);

        let svc = AppointmentService::new(store);
        assert!(matches!(
            svc.available_slots(doctor.id, None),
            Err(ClinicError::InvalidInput(_))
        ));
    }

    #[test]
    fn listings_are_chronological() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(Store::open(dir.path()).unwrap());
        let doctor = seed_doctor(&store);
        let patient = seed_patient(&store);

        let svc = AppointmentService::new(store);
        svc.book(patient.user_id, Role::Patient, booking(&patient, &doctor, t(15, 0)))
            .unwrap();
        svc.book(patient.user_id, Role::Patient, booking(&patient, &doctor, t(9, 0)))
            .unwrap();

        let page = svc
            .list_for_patient(patient.id, &AppointmentListQuery::default())
            .unwrap();
        assert_eq!(page.items[0].appointment.appointment_time, t(9, 0));
        assert_eq!(page.items[1].appointment.appointment_time, t(15, 0));
    }

    #[test]
    fn outsider_cannot_read_an_appointment() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(Store::open(dir.path()).unwrap());
        let doctor = seed_doctor(&store);
        let patient = seed_patient(&store);
        let outsider = seed_patient(&store);

        let svc = AppointmentService::new(store);
        let booked = svc
            .book(patient.user_id, Role::Patient, booking(&patient, &doctor, t(9, 0)))
            .unwrap();

        assert!(matches!(
            svc.get(outsider.user_id, Role::Patient, booked.appointment.id),
            Err(ClinicError::Forbidden(_))
        ));
        assert!(svc
            .get(doctor.user_id, Role::Doctor, booked.appointment.id)
            .is_ok());
    }
}
