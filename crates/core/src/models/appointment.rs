use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::store::Document;
use super::user::Role;

pub const DEFAULT_DURATION_MINUTES: u32 = 30;
pub const MIN_DURATION_MINUTES: u32 = 15;
pub const MAX_DURATION_MINUTES: u32 = 120;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum AppointmentType {
    #[default]
    Consultation,
    FollowUp,
    Emergency,
    Routine,
    Specialist,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum AppointmentStatus {
    #[default]
    Scheduled,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
    NoShow,
}

impl AppointmentStatus {
    /// Statuses that hold a slot. Cancelled and no-show appointments free
    /// their slot for rebooking.
    pub fn blocks_slot(self) -> bool {
        matches!(self, AppointmentStatus::Scheduled | AppointmentStatus::Confirmed)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CancelledBy {
    Patient,
    Doctor,
    Admin,
}

impl From<Role> for CancelledBy {
    fn from(role: Role) -> Self {
        match role {
            Role::Patient => CancelledBy::Patient,
            Role::Doctor => CancelledBy::Doctor,
            Role::Admin => CancelledBy::Admin,
        }
    }
}

/// A booked (or historical) appointment. Cancellation never deletes the
/// record; it sets status plus the cancellation metadata.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub appointment_date: NaiveDate,
    #[serde(with = "super::time_hm")]
    #[schema(value_type = String, example = "09:30")]
    pub appointment_time: NaiveTime,
    pub duration: u32,
    #[serde(rename = "type")]
    pub appointment_type: AppointmentType,
    pub status: AppointmentStatus,
    pub reason: String,
    #[serde(default)]
    pub symptoms: Vec<String>,
    pub notes: Option<String>,
    pub is_virtual: bool,
    pub meeting_link: Option<String>,
    pub cancellation_reason: Option<String>,
    pub cancelled_by: Option<CancelledBy>,
    pub cancellation_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document for Appointment {
    const COLLECTION: &'static str = "appointments";

    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Clone, Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookAppointmentRequest {
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub appointment_date: NaiveDate,
    #[serde(with = "super::time_hm")]
    #[schema(value_type = String, example = "09:30")]
    pub appointment_time: NaiveTime,
    pub duration: Option<u32>,
    #[serde(rename = "type")]
    pub appointment_type: Option<AppointmentType>,
    pub reason: Option<String>,
    pub symptoms: Option<Vec<String>>,
    pub notes: Option<String>,
    pub is_virtual: Option<bool>,
}

#[derive(Clone, Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAppointmentRequest {
    pub appointment_date: Option<NaiveDate>,
    #[serde(with = "super::time_hm::option", default)]
    #[schema(value_type = Option<String>, example = "10:00")]
    pub appointment_time: Option<NaiveTime>,
    pub duration: Option<u32>,
    #[serde(rename = "type")]
    pub appointment_type: Option<AppointmentType>,
    pub status: Option<AppointmentStatus>,
    pub reason: Option<String>,
    pub symptoms: Option<Vec<String>>,
    pub notes: Option<String>,
    pub is_virtual: Option<bool>,
    pub meeting_link: Option<String>,
}

#[derive(Clone, Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdateRequest {
    pub status: AppointmentStatus,
    pub cancellation_reason: Option<String>,
    pub cancelled_by: Option<CancelledBy>,
}

/// Filters for appointment listings. `upcoming` restricts to today-or-later
/// appointments still holding a slot; `date` restricts to a single day.
#[derive(Clone, Debug, Default, Deserialize, ToSchema)]
pub struct AppointmentListQuery {
    pub status: Option<AppointmentStatus>,
    pub date: Option<NaiveDate>,
    pub upcoming: Option<bool>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Clone, Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentStats {
    pub total_appointments: u64,
    pub today_appointments: u64,
    pub upcoming_appointments: u64,
    pub completed_appointments: u64,
}
