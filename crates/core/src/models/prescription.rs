use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::store::Document;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PrescriptionStatus {
    #[default]
    Active,
    Completed,
    Cancelled,
}

/// One prescribed medication line.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MedicationEntry {
    pub name: String,
    pub dosage: String,
    pub frequency: String,
    pub duration: String,
    #[serde(default)]
    pub instructions: Option<String>,
    pub quantity: u32,
}

/// A digital prescription issued by a doctor to a patient.
///
/// `prescription_number` is the human-readable identifier assigned at
/// creation time; it is what appears on the printed document.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Prescription {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub patient_id: Uuid,
    pub prescription_number: String,
    pub prescription_date: DateTime<Utc>,
    pub diagnosis: String,
    #[serde(default)]
    pub symptoms: Vec<String>,
    pub medications: Vec<MedicationEntry>,
    pub instructions: Option<String>,
    pub follow_up_date: Option<NaiveDate>,
    pub status: PrescriptionStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document for Prescription {
    const COLLECTION: &'static str = "prescriptions";

    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Clone, Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewPrescriptionRequest {
    pub patient_id: Uuid,
    pub diagnosis: String,
    pub symptoms: Option<Vec<String>>,
    pub medicines: Vec<MedicationEntry>,
    pub instructions: Option<String>,
    pub follow_up_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePrescriptionRequest {
    pub diagnosis: Option<String>,
    pub symptoms: Option<Vec<String>>,
    pub medicines: Option<Vec<MedicationEntry>>,
    pub instructions: Option<String>,
    pub follow_up_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub status: Option<PrescriptionStatus>,
}

#[derive(Clone, Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PrescriptionListQuery {
    pub status: Option<PrescriptionStatus>,
    pub patient_id: Option<Uuid>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}
