//! Patient lookup and the admin-facing patient roster.

use std::sync::Arc;

use uuid::Uuid;

use crate::models::{Patient, PatientListQuery, PatientProfile};
use crate::pagination::{paginate, Page};
use crate::store::Store;
use crate::{ClinicError, ClinicResult};

pub struct PatientService {
    store: Arc<Store>,
}

impl PatientService {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    /// The patient record belonging to a user account.
    pub fn for_user(&self, user_id: Uuid) -> ClinicResult<Patient> {
        self.store
            .patients
            .find_one(|p| p.user_id == user_id)?
            .ok_or(ClinicError::NotFound("Patient profile"))
    }

    pub fn get(&self, id: Uuid) -> ClinicResult<PatientProfile> {
        let patient = self
            .store
            .patients
            .get(id)?
            .ok_or(ClinicError::NotFound("Patient"))?;
        super::patient_profile(&self.store, patient)?.ok_or(ClinicError::NotFound("Patient"))
    }

    /// Roster of active patients, searchable by name or email, newest first.
    pub fn list(&self, query: &PatientListQuery) -> ClinicResult<Page<PatientProfile>> {
        let patients = self.store.patients.find(|p| p.is_active)?;

        let mut profiles = Vec::with_capacity(patients.len());
        for patient in patients {
            if let Some(profile) = super::patient_profile(&self.store, patient)? {
                profiles.push(profile);
            }
        }

        if let Some(search) = &query.search {
            let needle = search.to_lowercase();
            profiles.retain(|p| {
                p.user.first_name.to_lowercase().contains(&needle)
                    || p.user.last_name.to_lowercase().contains(&needle)
                    || p.user.email.contains(&needle)
            });
        }

        profiles.sort_by(|a, b| b.patient.created_at.cmp(&a.patient.created_at));

        Ok(paginate(profiles, query.page, query.limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Role, User};
    use chrono::Utc;
    use tempfile::TempDir;

    fn seed_patient(store: &Store, first_name: &str, email: &str) -> Patient {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: email.into(),
            password_hash: String::new(),
            password_salt: String::new(),
            first_name: first_name.into(),
            last_name: "Tester".into(),
            role: Role::Patient,
            phone: None,
            date_of_birth: None,
            gender: None,
            address: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        store.users.insert(user.clone()).unwrap();

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

    #[test]
    fn search_matches_name_or_email() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(Store::open(dir.path()).unwrap());
        seed_patient(&store, "Maria", "maria@example.com");
        seed_patient(&store, "Noah", "noah@example.com");

        let svc = PatientService::new(store);

        let by_name = svc
            .list(&PatientListQuery {
                search: Some("mar".into()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(by_name.total, 1);
        assert_eq!(by_name.items[0].user.first_name, "Maria");

        let by_email = svc
            .list(&PatientListQuery {
                search: Some("noah@".into()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(by_email.total, 1);
    }

    #[test]
    fn for_user_resolves_patient_record() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(Store::open(dir.path()).unwrap());
        let patient = seed_patient(&store, "Maria", "maria@example.com");

        let svc = PatientService::new(store);
        assert_eq!(svc.for_user(patient.user_id).unwrap().id, patient.id);
        assert!(matches!(
            svc.for_user(Uuid::new_v4()),
            Err(ClinicError::NotFound("Patient profile"))
        ));
    }
}
