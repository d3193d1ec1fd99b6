//! Prescription issuance and lookup.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use clinic_core::models::{
    NewPrescriptionRequest, PrescriptionDetail, PrescriptionListQuery, UpdatePrescriptionRequest,
};
use clinic_core::pagination::Page;
use clinic_core::services::{DoctorService, PatientService, PrescriptionService};

use crate::error::ApiResult;
use crate::extract::AuthUser;
use crate::AppState;

#[derive(Serialize, ToSchema)]
pub struct PrescriptionRes {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub prescription: PrescriptionDetail,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PrescriptionListRes {
    pub success: bool,
    pub prescriptions: Vec<PrescriptionDetail>,
    pub total_pages: u64,
    pub current_page: u64,
    pub total: u64,
}

impl From<Page<PrescriptionDetail>> for PrescriptionListRes {
    fn from(page: Page<PrescriptionDetail>) -> Self {
        Self {
            success: true,
            prescriptions: page.items,
            total_pages: page.total_pages,
            current_page: page.current_page,
            total: page.total,
        }
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/prescriptions", post(create))
        .route("/prescriptions/doctor", get(list_for_current_doctor))
        .route("/prescriptions/patient", get(list_for_current_patient))
        .route("/prescriptions/patient/:patientId", get(list_by_patient))
        .route(
            "/prescriptions/:id",
            get(get_prescription)
                .put(update_prescription)
                .delete(cancel_prescription),
        )
}

#[utoipa::path(
    post,
    path = "/api/prescriptions",
    request_body = NewPrescriptionRequest,
    responses(
        (status = 201, description = "Prescription issued", body = PrescriptionRes),
        (status = 400, description = "Missing diagnosis or empty medicine list"),
        (status = 403, description = "Caller is not a doctor"),
        (status = 404, description = "Patient not found")
    )
)]
#[axum::debug_handler]
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<NewPrescriptionRequest>,
) -> ApiResult<(StatusCode, Json<PrescriptionRes>)> {
    auth.require_doctor()?;
    let prescription = PrescriptionService::new(state.store.clone()).create(auth.id(), req)?;

    tracing::info!(
        prescription_number = %prescription.prescription.prescription_number,
        "prescription issued"
    );

    Ok((
        StatusCode::CREATED,
        Json(PrescriptionRes {
            success: true,
            message: Some("Prescription created successfully".into()),
            prescription,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/prescriptions/doctor",
    responses(
        (status = 200, description = "Prescriptions written by the authenticated doctor", body = PrescriptionListRes),
        (status = 403, description = "Caller is not a doctor")
    )
)]
#[axum::debug_handler]
pub async fn list_for_current_doctor(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<PrescriptionListQuery>,
) -> ApiResult<Json<PrescriptionListRes>> {
    auth.require_doctor()?;
    let doctor = DoctorService::new(state.store.clone()).for_user(auth.id())?;
    let page =
        PrescriptionService::new(state.store.clone()).list_for_doctor(doctor.id, &query)?;
    Ok(Json(page.into()))
}

#[utoipa::path(
    get,
    path = "/api/prescriptions/patient",
    responses(
        (status = 200, description = "Prescriptions issued to the authenticated patient", body = PrescriptionListRes),
        (status = 403, description = "Caller is not a patient")
    )
)]
#[axum::debug_handler]
pub async fn list_for_current_patient(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<PrescriptionListQuery>,
) -> ApiResult<Json<PrescriptionListRes>> {
    auth.require_patient()?;
    let patient = PatientService::new(state.store.clone()).for_user(auth.id())?;
    let page =
        PrescriptionService::new(state.store.clone()).list_for_patient(patient.id, &query)?;
    Ok(Json(page.into()))
}

#[utoipa::path(
    get,
    path = "/api/prescriptions/patient/{patientId}",
    responses(
        (status = 200, description = "Prescriptions issued to one patient", body = PrescriptionListRes),
        (status = 403, description = "Caller is not a doctor")
    )
)]
#[axum::debug_handler]
pub async fn list_by_patient(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(patient_id): Path<Uuid>,
    Query(query): Query<PrescriptionListQuery>,
) -> ApiResult<Json<PrescriptionListRes>> {
    auth.require_doctor()?;
    let page =
        PrescriptionService::new(state.store.clone()).list_for_patient(patient_id, &query)?;
    Ok(Json(page.into()))
}

#[utoipa::path(
    get,
    path = "/api/prescriptions/{id}",
    responses(
        (status = 200, description = "One prescription, populated", body = PrescriptionRes),
        (status = 403, description = "Caller is neither prescriber nor patient"),
        (status = 404, description = "Prescription not found")
    )
)]
#[axum::debug_handler]
pub async fn get_prescription(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<PrescriptionRes>> {
    let prescription =
        PrescriptionService::new(state.store.clone()).get(auth.id(), auth.role(), id)?;
    Ok(Json(PrescriptionRes {
        success: true,
        message: None,
        prescription,
    }))
}

#[utoipa::path(
    put,
    path = "/api/prescriptions/{id}",
    request_body = UpdatePrescriptionRequest,
    responses(
        (status = 200, description = "Prescription amended", body = PrescriptionRes),
        (status = 403, description = "Caller is not the prescribing doctor"),
        (status = 404, description = "Prescription not found")
    )
)]
#[axum::debug_handler]
pub async fn update_prescription(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdatePrescriptionRequest>,
) -> ApiResult<Json<PrescriptionRes>> {
    auth.require_doctor()?;
    let prescription = PrescriptionService::new(state.store.clone()).update(auth.id(), id, req)?;
    Ok(Json(PrescriptionRes {
        success: true,
        message: Some("Prescription updated successfully".into()),
        prescription,
    }))
}

#[utoipa::path(
    delete,
    path = "/api/prescriptions/{id}",
    responses(
        (status = 200, description = "Prescription cancelled; the record is retained", body = PrescriptionRes),
        (status = 403, description = "Caller is not the prescribing doctor"),
        (status = 404, description = "Prescription not found")
    )
)]
#[axum::debug_handler]
pub async fn cancel_prescription(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<PrescriptionRes>> {
    auth.require_doctor()?;
    let prescription = PrescriptionService::new(state.store.clone()).cancel(auth.id(), id)?;
    Ok(Json(PrescriptionRes {
        success: true,
        message: Some("Prescription cancelled".into()),
        prescription,
    }))
}
