//! Prescription issuance and lookup.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::models::{
    NewPrescriptionRequest, Prescription, PrescriptionDetail, PrescriptionListQuery,
    PrescriptionStatus, Role, UpdatePrescriptionRequest,
};
use crate::pagination::{paginate, Page};
use crate::store::Store;
use crate::{ClinicError, ClinicResult};

pub struct PrescriptionService {
    store: Arc<Store>,
}

impl PrescriptionService {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    /// Issues a prescription from the doctor behind `doctor_user_id`.
    ///
    /// The prescription number is assigned here and never changes; it is the
    /// identifier that appears on the printed document.
    pub fn create(
        &self,
        doctor_user_id: Uuid,
        req: NewPrescriptionRequest,
    ) -> ClinicResult<PrescriptionDetail> {
        let doctor = self
            .store
            .doctors
            .find_one(|d| d.user_id == doctor_user_id)?
            .ok_or(ClinicError::NotFound("Doctor profile"))?;
        self.store
            .patients
            .get(req.patient_id)?
            .ok_or(ClinicError::NotFound("Patient"))?;

        if req.diagnosis.trim().is_empty() {
            return Err(ClinicError::InvalidInput("diagnosis is required".into()));
        }
        if req.medicines.is_empty() {
            return Err(ClinicError::InvalidInput(
                "at least one medicine is required".into(),
            ));
        }

        let now = Utc::now();
        let number = format!(
            "PRES-{}-{}",
            now.timestamp_millis(),
            self.store.prescriptions.len()? + 1
        );

        let prescription = Prescription {
            id: Uuid::new_v4(),
            doctor_id: doctor.id,
            patient_id: req.patient_id,
            prescription_number: number,
            prescription_date: now,
            diagnosis: req.diagnosis,
            symptoms: req.symptoms.unwrap_or_default(),
            medications: req.medicines,
            instructions: req.instructions,
            follow_up_date: req.follow_up_date,
            status: PrescriptionStatus::Active,
            notes: req.notes,
            created_at: now,
            updated_at: now,
        };
        self.store.prescriptions.insert(prescription.clone())?;

        super::prescription_detail(&self.store, prescription)
    }

    /// Prescriptions written by a doctor, newest first.
    pub fn list_for_doctor(
        &self,
        doctor_id: Uuid,
        query: &PrescriptionListQuery,
    ) -> ClinicResult<Page<PrescriptionDetail>> {
        self.list_where(|p| p.doctor_id == doctor_id, query)
    }

    /// Prescriptions issued to a patient, newest first.
    pub fn list_for_patient(
        &self,
        patient_id: Uuid,
        query: &PrescriptionListQuery,
    ) -> ClinicResult<Page<PrescriptionDetail>> {
        self.list_where(|p| p.patient_id == patient_id, query)
    }

    fn list_where<F>(
        &self,
        owner: F,
        query: &PrescriptionListQuery,
    ) -> ClinicResult<Page<PrescriptionDetail>>
    where
        F: Fn(&Prescription) -> bool,
    {
        let mut prescriptions = self.store.prescriptions.find(|p| {
            owner(p)
                && query.status.map_or(true, |s| p.status == s)
                && query.patient_id.map_or(true, |id| p.patient_id == id)
        })?;
        prescriptions.sort_by(|a, b| b.prescription_date.cmp(&a.prescription_date));

        let page = paginate(prescriptions, query.page, query.limit);
        let mut items = Vec::with_capacity(page.items.len());
        for prescription in page.items {
            items.push(super::prescription_detail(&self.store, prescription)?);
        }

        Ok(Page {
            items,
            total: page.total,
            total_pages: page.total_pages,
            current_page: page.current_page,
        })
    }

    /// Fetches one prescription; only the prescriber, the patient, and admins
    /// may see it.
    pub fn get(
        &self,
        actor_user_id: Uuid,
        actor_role: Role,
        id: Uuid,
    ) -> ClinicResult<PrescriptionDetail> {
        let prescription = self
            .store
            .prescriptions
            .get(id)?
            .ok_or(ClinicError::NotFound("Prescription"))?;
        self.authorize(actor_user_id, actor_role, &prescription)?;
        super::prescription_detail(&self.store, prescription)
    }

    /// Amends a prescription. Only the prescribing doctor may do this.
    pub fn update(
        &self,
        doctor_user_id: Uuid,
        id: Uuid,
        req: UpdatePrescriptionRequest,
    ) -> ClinicResult<PrescriptionDetail> {
        let prescription = self
            .store
            .prescriptions
            .get(id)?
            .ok_or(ClinicError::NotFound("Prescription"))?;
        self.require_prescriber(doctor_user_id, &prescription)?;

        if let Some(medicines) = &req.medicines {
            if medicines.is_empty() {
                return Err(ClinicError::InvalidInput(
                    "at least one medicine is required".into(),
                ));
            }
        }

        let updated = self
            .store
            .prescriptions
            .update(id, |p| {
                if let Some(v) = req.diagnosis.clone() {
                    p.diagnosis = v;
                }
                if let Some(v) = req.symptoms.clone() {
                    p.symptoms = v;
                }
                if let Some(v) = req.medicines.clone() {
                    p.medications = v;
                }
                if let Some(v) = req.instructions.clone() {
                    p.instructions = Some(v);
                }
                if let Some(v) = req.follow_up_date {
                    p.follow_up_date = Some(v);
                }
                if let Some(v) = req.notes.clone() {
                    p.notes = Some(v);
                }
                if let Some(v) = req.status {
                    p.status = v;
                }
                p.updated_at = Utc::now();
            })?
            .ok_or(ClinicError::NotFound("Prescription"))?;

        super::prescription_detail(&self.store, updated)
    }

    /// Withdraws a prescription: status goes to cancelled, the record stays.
    /// Only the prescribing doctor may do this.
    pub fn cancel(&self, doctor_user_id: Uuid, id: Uuid) -> ClinicResult<PrescriptionDetail> {
        let prescription = self
            .store
            .prescriptions
            .get(id)?
            .ok_or(ClinicError::NotFound("Prescription"))?;
        self.require_prescriber(doctor_user_id, &prescription)?;

        let updated = self
            .store
            .prescriptions
            .update(id, |p| {
                p.status = PrescriptionStatus::Cancelled;
                p.updated_at = Utc::now();
            })?
            .ok_or(ClinicError::NotFound("Prescription"))?;

        super::prescription_detail(&self.store, updated)
    }

    fn require_prescriber(
        &self,
        doctor_user_id: Uuid,
        prescription: &Prescription,
    ) -> ClinicResult<()> {
        let owns = self
            .store
            .doctors
            .get(prescription.doctor_id)?
            .is_some_and(|d| d.user_id == doctor_user_id);
        if owns {
            Ok(())
        } else {
            Err(ClinicError::Forbidden("Access denied".into()))
        }
    }

    fn authorize(
        &self,
        actor_user_id: Uuid,
        actor_role: Role,
        prescription: &Prescription,
    ) -> ClinicResult<()> {
        match actor_role {
            Role::Admin => Ok(()),
            Role::Doctor => self.require_prescriber(actor_user_id, prescription),
            Role::Patient => {
                let owns = self
                    .store
                    .patients
                    .get(prescription.patient_id)?
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
    use crate::models::{Doctor, MedicationEntry, Patient, User, WeeklyAvailability};
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
        let doctor = Doctor {
            id: Uuid::new_v4(),
            user_id: user.id,
            specialization: "General Medicine".into(),
            license_number: "LIC-1".into(),
            experience: 3,
            consultation_fee: 40.0,
            bio: None,
            availability: WeeklyAvailability::default(),
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

    fn medicine(name: &str) -> MedicationEntry {
        MedicationEntry {
            name: name.into(),
            dosage: "500mg".into(),
            frequency: "twice daily".into(),
            duration: "7 days".into(),
            instructions: None,
            quantity: 14,
        }
    }

    fn request(patient: &Patient) -> NewPrescriptionRequest {
        NewPrescriptionRequest {
            patient_id: patient.id,
            diagnosis: "Sinusitis".into(),
            symptoms: None,
            medicines: vec![medicine("Amoxicillin")],
            instructions: None,
            follow_up_date: None,
            notes: None,
        }
    }

    #[test]
    fn create_assigns_a_prescription_number() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(Store::open(dir.path()).unwrap());
        let doctor = seed_doctor(&store);
        let patient = seed_patient(&store);

        let svc = PrescriptionService::new(store);
        let created = svc.create(doctor.user_id, request(&patient)).unwrap();

        assert!(created
            .prescription
            .prescription_number
            .starts_with("PRES-"));
        assert_eq!(created.prescription.status, PrescriptionStatus::Active);
    }

    #[test]
    fn create_requires_at_least_one_medicine() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(Store::open(dir.path()).unwrap());
        let doctor = seed_doctor(&store);
        let patient = seed_patient(&store);

        let svc = PrescriptionService::new(store);
        let mut req = request(&patient);
        req.medicines.clear();
        assert!(matches!(
            svc.create(doctor.user_id, req),
            Err(ClinicError::InvalidInput(_))
        ));
    }

    #[test]
    fn only_the_prescriber_may_amend() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(Store::open(dir.path()).unwrap());
        let doctor = seed_doctor(&store);
        let other_doctor = seed_doctor(&store);
        let patient = seed_patient(&store);

        let svc = PrescriptionService::new(store);
        let created = svc.create(doctor.user_id, request(&patient)).unwrap();

        let denied = svc.update(
            other_doctor.user_id,
            created.prescription.id,
            UpdatePrescriptionRequest {
                notes: Some("note".into()),
                ..Default::default()
            },
        );
        assert!(matches!(denied, Err(ClinicError::Forbidden(_))));
    }

    #[test]
    fn patient_sees_own_prescription_but_not_others() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(Store::open(dir.path()).unwrap());
        let doctor = seed_doctor(&store);
        let patient = seed_patient(&store);
        let outsider = seed_patient(&store);

        let svc = PrescriptionService::new(store);
        let created = svc.create(doctor.user_id, request(&patient)).unwrap();

        assert!(svc
            .get(patient.user_id, Role::Patient, created.prescription.id)
            .is_ok());
        assert!(matches!(
            svc.get(outsider.user_id, Role::Patient, created.prescription.id),
            Err(ClinicError::Forbidden(_))
        ));
    }

    #[test]
    fn cancel_keeps_the_record() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(Store::open(dir.path()).unwrap());
        let doctor = seed_doctor(&store);
        let patient = seed_patient(&store);

        let svc = PrescriptionService::new(store.clone());
        let created = svc.create(doctor.user_id, request(&patient)).unwrap();
        let cancelled = svc.cancel(doctor.user_id, created.prescription.id).unwrap();

        assert_eq!(cancelled.prescription.status, PrescriptionStatus::Cancelled);
        assert!(store
            .prescriptions
            .get(created.prescription.id)
            .unwrap()
            .is_some());
    }

    #[test]
    fn listings_are_newest_first_and_filterable() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(Store::open(dir.path()).unwrap());
        let doctor = seed_doctor(&store);
        let patient = seed_patient(&store);

        let svc = PrescriptionService::new(store);
        let first = svc.create(doctor.user_id, request(&patient)).unwrap();
        let second = svc.create(doctor.user_id, request(&patient)).unwrap();
        svc.cancel(doctor.user_id, first.prescription.id).unwrap();

        let all = svc
            .list_for_doctor(doctor.id, &PrescriptionListQuery::default())
            .unwrap();
        assert_eq!(all.total, 2);
        assert_eq!(all.items[0].prescription.id, second.prescription.id);

        let active = svc
            .list_for_doctor(
                doctor.id,
                &PrescriptionListQuery {
                    status: Some(PrescriptionStatus::Active),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(active.total, 1);
    }
}
