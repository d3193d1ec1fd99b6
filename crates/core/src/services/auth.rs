//! Registration, login, and profile management.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::auth::{hash_password, issue_token, verify_password};
use crate::models::{
    Doctor, Patient, PublicUser, RegisterRequest, Role, RoleProfile, UpdateProfileRequest, User,
    WeeklyAvailability,
};
use crate::store::Store;
use crate::types::{EmailAddress, NonEmptyText};
use crate::{ClinicConfig, ClinicError, ClinicResult};

const MIN_PASSWORD_LEN: usize = 6;

pub struct AuthService {
    cfg: Arc<ClinicConfig>,
    store: Arc<Store>,
}

impl AuthService {
    pub fn new(cfg: Arc<ClinicConfig>, store: Arc<Store>) -> Self {
        Self { cfg, store }
    }

    /// Registers a new account and its role-specific profile, returning the
    /// public user view and a freshly issued token.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` for a malformed email, short password, or missing name
    /// - `Conflict` if the email is already registered
    pub fn register(&self, req: RegisterRequest) -> ClinicResult<(PublicUser, String)> {
        let email = EmailAddress::parse(&req.email)?;
        if req.password.len() < MIN_PASSWORD_LEN {
            return Err(ClinicError::InvalidInput(format!(
                "password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }
        let first_name = NonEmptyText::new(req.first_name)?;
        let last_name = NonEmptyText::new(req.last_name)?;

        let role = req.role.unwrap_or(Role::Patient);
        let (password_hash, password_salt) = hash_password(&req.password);
        let now = Utc::now();

        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash,
            password_salt,
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            role,
            phone: req.phone.clone(),
            date_of_birth: req.date_of_birth,
            gender: req.gender.clone(),
            address: req.address.clone(),
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        // Uniqueness check and insert happen under one write guard.
        let inserted = self
            .store
            .users
            .insert_unless(user.clone(), |existing| existing.email == user.email)?;
        if !inserted {
            return Err(ClinicError::Conflict("User already exists".into()));
        }

        let profile_written = match role {
            Role::Doctor => {
                let doctor = Doctor {
                    id: Uuid::new_v4(),
                    user_id: user.id,
                    specialization: req
                        .specialization
                        .unwrap_or_else(|| "General Medicine".into()),
                    license_number: req
                        .license_number
                        .unwrap_or_else(|| format!("LIC-{}", now.timestamp_millis())),
                    experience: req.experience.unwrap_or(0),
                    consultation_fee: 0.0,
                    bio: None,
                    availability: WeeklyAvailability::default(),
                    rating: 0.0,
                    total_reviews: 0,
                    is_verified: false,
                    is_active: true,
                    created_at: now,
                    updated_at: now,
                };
                self.store.doctors.insert(doctor)
            }
            Role::Patient => {
                let patient = Patient {
                    id: Uuid::new_v4(),
                    user_id: user.id,
                    blood_group: req.blood_group,
                    height: req.height,
                    weight: req.weight,
                    emergency_contact: None,
                    medical_history: Vec::new(),
                    allergies: Vec::new(),
                    current_medications: Vec::new(),
                    is_active: true,
                    created_at: now,
                    updated_at: now,
                };
                self.store.patients.insert(patient)
            }
            // No separate profile document; the role on the user is enough.
            Role::Admin => Ok(()),
        };

        // An account without its role profile is unusable; undo the user
        // insert rather than leave it behind.
        if let Err(err) = profile_written {
            if let Err(rollback) = self.store.users.remove(user.id) {
                tracing::error!("failed to remove user after profile write error: {rollback}");
            }
            return Err(err);
        }

        let token = self.issue_token_for(&user)?;
        Ok((user.to_public(), token))
    }

    /// Verifies credentials and issues a token.
    ///
    /// Unknown email and wrong password both report `InvalidCredentials`;
    /// which of the two failed is not client-visible.
    pub fn login(&self, email: &str, password: &str) -> ClinicResult<(PublicUser, String)> {
        let email = EmailAddress::parse(email)?;
        let user = self
            .store
            .users
            .find_one(|u| u.email == email.as_str())?
            .ok_or(ClinicError::InvalidCredentials)?;

        if !verify_password(password, &user.password_hash, &user.password_salt) {
            return Err(ClinicError::InvalidCredentials);
        }

        let token = self.issue_token_for(&user)?;
        Ok((user.to_public(), token))
    }

    /// The user's public view plus whichever role profile it carries.
    pub fn profile(&self, user_id: Uuid) -> ClinicResult<(PublicUser, Option<RoleProfile>)> {
        let user = self
            .store
            .users
            .get(user_id)?
            .ok_or(ClinicError::NotFound("User"))?;

        let profile = match user.role {
            Role::Doctor => self
                .store
                .doctors
                .find_one(|d| d.user_id == user.id)?
                .map(|doctor| super::doctor_profile(&self.store, doctor))
                .transpose()?
                .flatten()
                .map(RoleProfile::Doctor),
            Role::Patient => self
                .store
                .patients
                .find_one(|p| p.user_id == user.id)?
                .map(|patient| super::patient_profile(&self.store, patient))
                .transpose()?
                .flatten()
                .map(RoleProfile::Patient),
            Role::Admin => None,
        };

        Ok((user.to_public(), profile))
    }

    /// Partial update of the identity record and the role profile. Absent
    /// fields are untouched.
    pub fn update_profile(
        &self,
        user_id: Uuid,
        req: UpdateProfileRequest,
    ) -> ClinicResult<PublicUser> {
        let user = self
            .store
            .users
            .update(user_id, |user| {
                if let Some(v) = req.first_name.clone() {
                    user.first_name = v;
                }
                if let Some(v) = req.last_name.clone() {
                    user.last_name = v;
                }
                if let Some(v) = req.phone.clone() {
                    user.phone = Some(v);
                }
                if let Some(v) = req.date_of_birth {
                    user.date_of_birth = Some(v);
                }
                if let Some(v) = req.gender.clone() {
                    user.gender = Some(v);
                }
                if let Some(v) = req.address.clone() {
                    user.address = Some(v);
                }
                user.updated_at = Utc::now();
            })?
            .ok_or(ClinicError::NotFound("User"))?;

        match user.role {
            Role::Doctor => {
                if let Some(doctor) = self.store.doctors.find_one(|d| d.user_id == user.id)? {
                    self.store.doctors.update(doctor.id, |d| {
                        if let Some(v) = req.specialization.clone() {
                            d.specialization = v;
                        }
                        if let Some(v) = req.experience {
                            d.experience = v;
                        }
                        if let Some(v) = req.bio.clone() {
                            d.bio = Some(v);
                        }
                        if let Some(v) = req.consultation_fee {
                            d.consultation_fee = v;
                        }
                        d.updated_at = Utc::now();
                    })?;
                }
            }
            Role::Patient => {
                if let Some(patient) = self.store.patients.find_one(|p| p.user_id == user.id)? {
                    self.store.patients.update(patient.id, |p| {
                        if let Some(v) = req.blood_group {
                            p.blood_group = Some(v);
                        }
                        if let Some(v) = req.height {
                            p.height = Some(v);
                        }
                        if let Some(v) = req.weight {
                            p.weight = Some(v);
                        }
                        if let Some(v) = req.emergency_contact.clone() {
                            p.emergency_contact = Some(v);
                        }
                        p.updated_at = Utc::now();
                    })?;
                }
            }
            Role::Admin => {}
        }

        Ok(user.to_public())
    }

    fn issue_token_for(&self, user: &User) -> ClinicResult<String> {
        issue_token(
            self.cfg.token_secret(),
            user.id,
            &user.email,
            user.role,
            self.cfg.token_ttl_hours(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::verify_token;
    use tempfile::TempDir;

    fn service(dir: &TempDir) -> AuthService {
        let cfg = Arc::new(
            ClinicConfig::new(dir.path().to_path_buf(), "test-secret".into(), 24).unwrap(),
        );
        let store = Arc::new(Store::open(dir.path()).unwrap());
        AuthService::new(cfg, store)
    }

    fn register_request(email: &str, role: Role) -> RegisterRequest {
        RegisterRequest {
            email: email.into(),
            password: "secret1".into(),
            first_name: "Jane".into(),
            last_name: "Doe".into(),
            role: Some(role),
            phone: None,
            date_of_birth: None,
            gender: None,
            address: None,
            specialization: None,
            license_number: None,
            experience: None,
            blood_group: None,
            height: None,
            weight: None,
        }
    }

    #[test]
    fn register_issues_token_with_requested_role() {
        let dir = TempDir::new().unwrap();
        let svc = service(&dir);

        let (user, token) = svc
            .register(register_request("jane@example.com", Role::Doctor))
            .unwrap();
        assert_eq!(user.role, Role::Doctor);

        let claims = verify_token(b"test-secret", &token).unwrap();
        assert_eq!(claims.role, Role::Doctor);
        assert_eq!(claims.sub, user.id);
    }

    #[test]
    fn duplicate_email_is_rejected_on_second_attempt() {
        let dir = TempDir::new().unwrap();
        let svc = service(&dir);

        svc.register(register_request("jane@example.com", Role::Patient))
            .unwrap();
        let second = svc.register(register_request("jane@example.com", Role::Patient));
        assert!(matches!(second, Err(ClinicError::Conflict(_))));
    }

    #[test]
    fn registering_doctor_creates_doctor_profile() {
        let dir = TempDir::new().unwrap();
        let svc = service(&dir);

        let (user, _) = svc
            .register(register_request("doc@example.com", Role::Doctor))
            .unwrap();

        let doctor = svc
            .store
            .doctors
            .find_one(|d| d.user_id == user.id)
            .unwrap()
            .expect("doctor profile should exist");
        assert_eq!(doctor.specialization, "General Medicine");
    }

    #[test]
    fn failed_profile_write_rolls_back_the_user() {
        let dir = TempDir::new().unwrap();
        // A directory squatting on the doctors collection path makes the
        // profile write fail after the user insert has succeeded.
        std::fs::create_dir(dir.path().join("doctors.json")).unwrap();
        let svc = service(&dir);

        let denied = svc.register(register_request("doc@example.com", Role::Doctor));
        assert!(matches!(denied, Err(ClinicError::FileWrite(_))));
        assert!(svc.store.users.is_empty().unwrap());
    }

    #[test]
    fn short_password_is_rejected() {
        let dir = TempDir::new().unwrap();
        let svc = service(&dir);

        let mut req = register_request("jane@example.com", Role::Patient);
        req.password = "short".into();
        assert!(matches!(
            svc.register(req),
            Err(ClinicError::InvalidInput(_))
        ));
    }

    #[test]
    fn login_rejects_wrong_password_and_unknown_email_alike() {
        let dir = TempDir::new().unwrap();
        let svc = service(&dir);
        svc.register(register_request("jane@example.com", Role::Patient))
            .unwrap();

        assert!(matches!(
            svc.login("jane@example.com", "wrong-pass"),
            Err(ClinicError::InvalidCredentials)
        ));
        assert!(matches!(
            svc.login("nobody@example.com", "secret1"),
            Err(ClinicError::InvalidCredentials)
        ));
    }

    #[test]
    fn login_succeeds_with_correct_credentials() {
        let dir = TempDir::new().unwrap();
        let svc = service(&dir);
        svc.register(register_request("jane@example.com", Role::Patient))
            .unwrap();

        let (user, token) = svc.login("Jane@Example.com", "secret1").unwrap();
        assert_eq!(user.email, "jane@example.com");
        assert!(verify_token(b"test-secret", &token).is_ok());
    }

    #[test]
    fn profile_returns_role_profile() {
        let dir = TempDir::new().unwrap();
        let svc = service(&dir);
        let (user, _) = svc
            .register(register_request("pat@example.com", Role::Patient))
            .unwrap();

        let (public, profile) = svc.profile(user.id).unwrap();
        assert_eq!(public.id, user.id);
        assert!(matches!(profile, Some(RoleProfile::Patient(_))));
    }

    #[test]
    fn update_profile_touches_user_and_role_profile() {
        let dir = TempDir::new().unwrap();
        let svc = service(&dir);
        let (user, _) = svc
            .register(register_request("doc@example.com", Role::Doctor))
            .unwrap();

        let req = UpdateProfileRequest {
            first_name: Some("Janet".into()),
            specialization: Some("Cardiology".into()),
            consultation_fee: Some(120.0),
            ..Default::default()
        };
        let updated = svc.update_profile(user.id, req).unwrap();
        assert_eq!(updated.first_name, "Janet");

        let doctor = svc
            .store
            .doctors
            .find_one(|d| d.user_id == user.id)
            .unwrap()
            .unwrap();
        assert_eq!(doctor.specialization, "Cardiology");
        assert_eq!(doctor.consultation_fee, 120.0);
    }
}
