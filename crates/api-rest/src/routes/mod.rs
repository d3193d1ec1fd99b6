//! Route modules, one per resource. Each exposes a `router()` merged under
//! `/api` by [`crate::build_router`].

pub mod admin;
pub mod appointments;
pub mod auth;
pub mod doctors;
pub mod health;
pub mod medicines;
pub mod messages;
pub mod patients;
pub mod prescriptions;
