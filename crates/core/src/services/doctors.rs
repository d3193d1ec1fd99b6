//! Doctor directory, availability management, and dashboard counters.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::models::{
    AppointmentStatus, Doctor, DoctorListQuery, DoctorProfile, DoctorStats, Role,
    WeeklyAvailability,
};
use crate::pagination::{paginate, Page};
use crate::store::Store;
use crate::{ClinicError, ClinicResult};

pub struct DoctorService {
    store: Arc<Store>,
}

impl DoctorService {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    /// Public directory listing: active doctors, optionally narrowed by
    /// specialization or a free-text search, best-rated first.
    pub fn list(&self, query: &DoctorListQuery) -> ClinicResult<Page<DoctorProfile>> {
        let doctors = self.store.doctors.find(|d| d.is_active)?;

        let mut profiles = Vec::with_capacity(doctors.len());
        for doctor in doctors {
            if let Some(profile) = super::doctor_profile(&self.store, doctor)? {
                profiles.push(profile);
            }
        }

        if let Some(specialization) = &query.specialization {
            let needle = specialization.to_lowercase();
            profiles.retain(|p| p.doctor.specialization.to_lowercase() == needle);
        }
        if let Some(search) = &query.search {
            let needle = search.to_lowercase();
            profiles.retain(|p| {
                p.user.first_name.to_lowercase().contains(&needle)
                    || p.user.last_name.to_lowercase().contains(&needle)
                    || p.doctor.specialization.to_lowercase().contains(&needle)
            });
        }

        profiles.sort_by(|a, b| {
            b.doctor
                .rating
                .total_cmp(&a.doctor.rating)
                .then(b.doctor.experience.cmp(&a.doctor.experience))
        });

        Ok(paginate(profiles, query.page, query.limit))
    }

    pub fn get(&self, id: Uuid) -> ClinicResult<DoctorProfile> {
        let doctor = self
            .store
            .doctors
            .get(id)?
            .ok_or(ClinicError::NotFound("Doctor"))?;
        super::doctor_profile(&self.store, doctor)?.ok_or(ClinicError::NotFound("Doctor"))
    }

    /// The doctor record belonging to a user account.
    pub fn for_user(&self, user_id: Uuid) -> ClinicResult<Doctor> {
        self.store
            .doctors
            .find_one(|d| d.user_id == user_id)?
            .ok_or(ClinicError::NotFound("Doctor profile"))
    }

    /// Replaces a doctor's weekly booking windows. Only the doctor themself or
    /// an admin may do this.
    pub fn update_availability(
        &self,
        actor_user_id: Uuid,
        actor_role: Role,
        doctor_id: Uuid,
        availability: WeeklyAvailability,
    ) -> ClinicResult<Doctor> {
        let doctor = self
            .store
            .doctors
            .get(doctor_id)?
            .ok_or(ClinicError::NotFound("Doctor"))?;

        if actor_role != Role::Admin && doctor.user_id != actor_user_id {
            return Err(ClinicError::Forbidden("Access denied".into()));
        }

        self.store
            .doctors
            .update(doctor_id, |d| {
                d.availability = availability;
                d.updated_at = Utc::now();
            })?
            .ok_or(ClinicError::NotFound("Doctor"))
    }

    /// Dashboard counters for one doctor.
    pub fn stats(&self, doctor_id: Uuid) -> ClinicResult<DoctorStats> {
        let doctor = self
            .store
            .doctors
            .get(doctor_id)?
            .ok_or(ClinicError::NotFound("Doctor"))?;
        let today = Utc::now().date_naive();

        let total_appointments = self
            .store
            .appointments
            .count(|a| a.doctor_id == doctor.id)?;
        let completed_appointments = self.store.appointments.count(|a| {
            a.doctor_id == doctor.id && a.status == AppointmentStatus::Completed
        })?;
        let today_appointments = self
            .store
            .appointments
            .count(|a| a.doctor_id == doctor.id && a.appointment_date == today)?;

        Ok(DoctorStats {
            total_appointments,
            completed_appointments,
            today_appointments,
            rating: doctor.rating,
            experience: doctor.experience,
            total_reviews: doctor.total_reviews,
        })
    }

    /// Distinct specializations across active doctors, sorted.
    pub fn specializations(&self) -> ClinicResult<Vec<String>> {
        let mut specializations: Vec<String> = self
            .store
            .doctors
            .find(|d| d.is_active)?
            .into_iter()
            .map(|d| d.specialization)
            .collect();
        specializations.sort();
        specializations.dedup();
        Ok(specializations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{User, WeeklyAvailability};
    use tempfile::TempDir;

    fn seed_user(store: &Store, role: Role) -> User {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: format!("{}@example.com", Uuid::new_v4()),
            password_hash: String::new(),
            password_salt: String::new(),
            first_name: "Alex".into(),
            last_name: "Smith".into(),
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

    fn seed_doctor(store: &Store, specialization: &str, rating: f64) -> Doctor {
        let user = seed_user(store, Role::Doctor);
        let now = Utc::now();
        let doctor = Doctor {
            id: Uuid::new_v4(),
            user_id: user.id,
            specialization: specialization.into(),
            license_number: "LIC-1".into(),
            experience: 5,
            consultation_fee: 50.0,
            bio: None,
            availability: WeeklyAvailability::default(),
            rating,
            total_reviews: 0,
            is_verified: true,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        store.doctors.insert(doctor.clone()).unwrap();
        doctor
    }

    #[test]
    fn list_orders_by_rating_and_filters_specialization() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(Store::open(dir.path()).unwrap());
        seed_doctor(&store, "Cardiology", 3.5);
        let best = seed_doctor(&store, "Cardiology", 4.8);
        seed_doctor(&store, "Dermatology", 5.0);

        let svc = DoctorService::new(store);
        let page = svc
            .list(&DoctorListQuery {
                specialization: Some("cardiology".into()),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(page.total, 2);
        assert_eq!(page.items[0].doctor.id, best.id);
    }

    #[test]
    fn availability_update_is_owner_or_admin_only() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(Store::open(dir.path()).unwrap());
        let doctor = seed_doctor(&store, "Cardiology", 4.0);
        let stranger = seed_user(&store, Role::Doctor);

        let svc = DoctorService::new(store);
        let denied = svc.update_availability(
            stranger.id,
            Role::Doctor,
            doctor.id,
            WeeklyAvailability::default(),
        );
        assert!(matches!(denied, Err(ClinicError::Forbidden(_))));

        let allowed = svc.update_availability(
            doctor.user_id,
            Role::Doctor,
            doctor.id,
            WeeklyAvailability::default(),
        );
        assert!(allowed.is_ok());
    }

    #[test]
    fn specializations_are_distinct_and_sorted() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(Store::open(dir.path()).unwrap());
        seed_doctor(&store, "Dermatology", 4.0);
        seed_doctor(&store, "Cardiology", 4.0);
        seed_doctor(&store, "Cardiology", 3.0);

        let svc = DoctorService::new(store);
        assert_eq!(
            svc.specializations().unwrap(),
            vec!["Cardiology".to_string(), "Dermatology".to_string()]
        );
    }

    #[test]
    fn unknown_doctor_is_not_found() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(Store::open(dir.path()).unwrap());
        let svc = DoctorService::new(store);
        assert!(matches!(
            svc.get(Uuid::new_v4()),
            Err(ClinicError::NotFound("Doctor"))
        ));
    }
}
