use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::store::Document;

pub const DEFAULT_LOW_STOCK_THRESHOLD: u32 = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MedicineCategory {
    Antibiotic,
    Painkiller,
    Vitamin,
    Supplement,
    Prescription,
    Otc,
    Other,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DosageForm {
    Tablet,
    Capsule,
    Liquid,
    Injection,
    Cream,
    Ointment,
    Drops,
    Inhaler,
    Other,
}

/// Catalog item in the medicine store. Stock is a plain counter with no
/// reservation semantics; deletion is a soft deactivate.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Medicine {
    pub id: Uuid,
    pub name: String,
    pub generic_name: Option<String>,
    pub brand: Option<String>,
    pub category: MedicineCategory,
    pub description: Option<String>,
    pub dosage_form: Option<DosageForm>,
    pub strength: Option<String>,
    pub price: f64,
    pub stock_quantity: u32,
    pub prescription_required: bool,
    #[serde(default)]
    pub side_effects: Vec<String>,
    #[serde(default)]
    pub contraindications: Vec<String>,
    pub manufacturer: Option<String>,
    pub expiry_date: Option<NaiveDate>,
    pub is_active: bool,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document for Medicine {
    const COLLECTION: &'static str = "medicines";

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Medicine {
    pub fn is_available(&self) -> bool {
        self.stock_quantity > 0
    }
}

#[derive(Clone, Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewMedicineRequest {
    pub name: String,
    pub generic_name: Option<String>,
    pub brand: Option<String>,
    pub category: MedicineCategory,
    pub description: Option<String>,
    pub dosage_form: Option<DosageForm>,
    pub strength: Option<String>,
    pub price: f64,
    pub stock_quantity: Option<u32>,
    pub prescription_required: Option<bool>,
    pub side_effects: Option<Vec<String>>,
    pub contraindications: Option<Vec<String>>,
    pub manufacturer: Option<String>,
    pub expiry_date: Option<NaiveDate>,
    pub tags: Option<Vec<String>>,
}

#[derive(Clone, Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMedicineRequest {
    pub name: Option<String>,
    pub generic_name: Option<String>,
    pub brand: Option<String>,
    pub category: Option<MedicineCategory>,
    pub description: Option<String>,
    pub dosage_form: Option<DosageForm>,
    pub strength: Option<String>,
    pub price: Option<f64>,
    pub stock_quantity: Option<u32>,
    pub prescription_required: Option<bool>,
    pub side_effects: Option<Vec<String>>,
    pub contraindications: Option<Vec<String>>,
    pub manufacturer: Option<String>,
    pub expiry_date: Option<NaiveDate>,
    pub tags: Option<Vec<String>>,
}

#[derive(Clone, Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockUpdateRequest {
    pub stock_quantity: u32,
}

#[derive(Clone, Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MedicineListQuery {
    pub search: Option<String>,
    pub category: Option<MedicineCategory>,
    pub prescription_required: Option<bool>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub in_stock: Option<bool>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}
