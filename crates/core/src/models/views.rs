//! Populated views: records joined with the documents they reference, in the
//! shape list and detail endpoints return them.

use serde::Serialize;
use utoipa::ToSchema;

use super::appointment::Appointment;
use super::doctor::Doctor;
use super::message::Message;
use super::patient::Patient;
use super::prescription::Prescription;
use super::user::PublicUser;

/// A doctor record with its user populated.
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct DoctorProfile {
    #[serde(flatten)]
    pub doctor: Doctor,
    pub user: PublicUser,
}

/// A patient record with its user populated.
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct PatientProfile {
    #[serde(flatten)]
    pub patient: Patient,
    pub user: PublicUser,
}

/// Whichever role profile a user carries. Admins carry none.
#[derive(Clone, Debug, Serialize, ToSchema)]
#[serde(untagged)]
pub enum RoleProfile {
    Doctor(DoctorProfile),
    Patient(PatientProfile),
}

/// An appointment with both parties populated.
///
/// The referenced profiles are optional: an appointment survives its doctor
/// or patient record disappearing, and listings must not fail on a dangling
/// reference.
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct AppointmentDetail {
    #[serde(flatten)]
    pub appointment: Appointment,
    pub patient: Option<PatientProfile>,
    pub doctor: Option<DoctorProfile>,
}

/// A prescription with prescriber and patient populated.
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct PrescriptionDetail {
    #[serde(flatten)]
    pub prescription: Prescription,
    pub doctor: Option<DoctorProfile>,
    pub patient: Option<PatientProfile>,
}

/// A message with sender and receiver populated.
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct MessageDetail {
    #[serde(flatten)]
    pub message: Message,
    pub sender: Option<PublicUser>,
    pub receiver: Option<PublicUser>,
}
