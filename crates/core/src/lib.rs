//! # Clinic Core
//!
//! Core business logic for the clinic management system.
//!
//! This crate contains pure data operations and persistence:
//! - Record types for the seven collections (users, doctors, patients,
//!   appointments, prescriptions, medicines, messages)
//! - A JSON-file-backed document store
//! - Domain services, one per record family
//! - Bearer-token and password-digest primitives
//!
//! **No API concerns**: HTTP servers, routing, and the JSON response envelope
//! belong in `api-rest`.

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod pagination;
pub mod services;
pub mod store;
pub mod types;

pub use config::ClinicConfig;
pub use error::{ClinicError, ClinicResult};
pub use pagination::Page;
pub use store::Store;
pub use types::{EmailAddress, NonEmptyText};
