//! Patient roster and the authenticated patient's own record.

use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use clinic_core::models::{PatientListQuery, PatientProfile};
use clinic_core::pagination::Page;
use clinic_core::services::PatientService;

use crate::error::ApiResult;
use crate::extract::AuthUser;
use crate::AppState;

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PatientListRes {
    pub success: bool,
    pub patients: Vec<PatientProfile>,
    pub total_pages: u64,
    pub current_page: u64,
    pub total: u64,
}

impl From<Page<PatientProfile>> for PatientListRes {
    fn from(page: Page<PatientProfile>) -> Self {
        Self {
            success: true,
            patients: page.items,
            total_pages: page.total_pages,
            current_page: page.current_page,
            total: page.total,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct PatientRes {
    pub success: bool,
    pub patient: PatientProfile,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/patients", get(list))
        .route("/patients/me", get(me))
        .route("/patients/:id", get(get_patient))
}

#[utoipa::path(
    get,
    path = "/api/patients",
    responses(
        (status = 200, description = "Active patients, newest first", body = PatientListRes)
    )
)]
#[axum::debug_handler]
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<PatientListQuery>,
) -> ApiResult<Json<PatientListRes>> {
    let page = PatientService::new(state.store.clone()).list(&query)?;
    Ok(Json(page.into()))
}

#[utoipa::path(
    get,
    path = "/api/patients/me",
    responses(
        (status = 200, description = "The authenticated patient's record", body = PatientRes),
        (status = 403, description = "Caller is not a patient"),
        (status = 404, description = "No patient profile for this account")
    )
)]
#[axum::debug_handler]
pub async fn me(State(state): State<AppState>, auth: AuthUser) -> ApiResult<Json<PatientRes>> {
    auth.require_patient()?;
    let service = PatientService::new(state.store.clone());
    let patient = service.for_user(auth.id())?;
    let profile = service.get(patient.id)?;
    Ok(Json(PatientRes {
        success: true,
        patient: profile,
    }))
}

#[utoipa::path(
    get,
    path = "/api/patients/{id}",
    responses(
        (status = 200, description = "One patient, populated", body = PatientRes),
        (status = 404, description = "Patient not found")
    )
)]
#[axum::debug_handler]
pub async fn get_patient(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<PatientRes>> {
    let patient = PatientService::new(state.store.clone()).get(id)?;
    Ok(Json(PatientRes {
        success: true,
        patient,
    }))
}
