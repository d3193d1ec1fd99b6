//! Record types for the seven collections, plus the request/query structs and
//! populated views the services exchange with the API layer.
//!
//! Wire names are camelCase throughout. Fields the document database treated
//! as implicitly optional are explicit `Option<T>` here.

pub mod appointment;
pub mod doctor;
pub mod medicine;
pub mod message;
pub mod patient;
pub mod prescription;
pub mod user;
pub mod views;

pub use appointment::{
    Appointment, AppointmentListQuery, AppointmentStats, AppointmentStatus, AppointmentType,
    BookAppointmentRequest, CancelledBy, StatusUpdateRequest, UpdateAppointmentRequest,
    DEFAULT_DURATION_MINUTES, MAX_DURATION_MINUTES, MIN_DURATION_MINUTES,
};
pub use doctor::{
    DayWindow, Doctor, DoctorListQuery, DoctorStats, UpdateAvailabilityRequest,
    WeeklyAvailability,
};
pub use medicine::{
    DosageForm, Medicine, MedicineCategory, MedicineListQuery, NewMedicineRequest,
    StockUpdateRequest, UpdateMedicineRequest, DEFAULT_LOW_STOCK_THRESHOLD,
};
pub use message::{
    Message, MessagePriority, MessageType, SendMessageRequest,
};
pub use patient::{
    Allergy, AllergySeverity, BloodGroup, ConditionStatus, EmergencyContact, MedicalHistoryEntry,
    Patient, PatientListQuery, PatientMedication,
};
pub use prescription::{
    MedicationEntry, NewPrescriptionRequest, Prescription, PrescriptionListQuery,
    PrescriptionStatus, UpdatePrescriptionRequest,
};
pub use user::{
    LoginRequest, PublicUser, RegisterRequest, Role, UpdateProfileRequest, User,
};
pub use views::{
    AppointmentDetail, DoctorProfile, MessageDetail, PatientProfile, PrescriptionDetail,
    RoleProfile,
};

/// Serde helpers for `HH:MM` time-of-day strings.
///
/// Appointment times and availability windows are stored and transmitted as
/// `HH:MM`; chrono's default `NaiveTime` format carries seconds, which the
/// wire format never does.
pub mod time_hm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%H:%M";

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&raw, FORMAT).map_err(serde::de::Error::custom)
    }

    pub mod option {
        use chrono::NaiveTime;
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            time: &Option<NaiveTime>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match time {
                Some(t) => serializer.serialize_some(&t.format(super::FORMAT).to_string()),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<NaiveTime>, D::Error> {
            let raw = Option::<String>::deserialize(deserializer)?;
            raw.map(|s| NaiveTime::parse_from_str(&s, super::FORMAT))
                .transpose()
                .map_err(serde::de::Error::custom)
        }
    }
}
