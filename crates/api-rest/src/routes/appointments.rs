//! Booking and the appointment lifecycle.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, patch, post, put};
use axum::{Json, Router};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use clinic_core::models::{
    AppointmentDetail, AppointmentListQuery, AppointmentStats, BookAppointmentRequest, Role,
    StatusUpdateRequest, UpdateAppointmentRequest,
};
use clinic_core::pagination::Page;
use clinic_core::services::{AppointmentService, DoctorService, PatientService};

use crate::error::ApiResult;
use crate::extract::AuthUser;
use crate::AppState;

#[derive(Serialize, ToSchema)]
pub struct AppointmentRes {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub appointment: AppointmentDetail,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentListRes {
    pub success: bool,
    pub appointments: Vec<AppointmentDetail>,
    pub total_pages: u64,
    pub current_page: u64,
    pub total: u64,
}

impl From<Page<AppointmentDetail>> for AppointmentListRes {
    fn from(page: Page<AppointmentDetail>) -> Self {
        Self {
            success: true,
            appointments: page.items,
            total_pages: page.total_pages,
            current_page: page.current_page,
            total: page.total,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct AppointmentStatsRes {
    pub success: bool,
    pub stats: AppointmentStats,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/appointments", post(book))
        .route("/appointments/doctor", get(list_for_current_doctor))
        .route("/appointments/patient", get(list_for_current_patient))
        .route("/appointments/doctor/:doctorId", get(list_by_doctor))
        .route("/appointments/patient/:patientId", get(list_by_patient))
        .route("/appointments/stats/overview", get(overview_stats))
        .route("/appointments/:id", get(get_appointment))
        .route("/appointments/:id", put(update_appointment))
        .route("/appointments/:id/status", patch(update_status))
        .route("/appointments/:id", delete(delete_appointment))
}

#[utoipa::path(
    post,
    path = "/api/appointments",
    request_body = BookAppointmentRequest,
    responses(
        (status = 201, description = "Appointment booked", body = AppointmentRes),
        (status = 400, description = "Validation failure or slot already booked"),
        (status = 403, description = "Booking for someone else's patient record"),
        (status = 404, description = "Doctor or patient not found")
    )
)]
#[axum::debug_handler]
pub async fn book(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<BookAppointmentRequest>,
) -> ApiResult<(StatusCode, Json<AppointmentRes>)> {
    let service = AppointmentService::new(state.store.clone());
    let appointment = service.book(auth.id(), auth.role(), req)?;

    tracing::info!(
        appointment_id = %appointment.appointment.id,
        doctor_id = %appointment.appointment.doctor_id,
        "appointment booked"
    );

    Ok((
        StatusCode::CREATED,
        Json(AppointmentRes {
            success: true,
            message: Some("Appointment booked successfully".into()),
            appointment,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/appointments/doctor",
    responses(
        (status = 200, description = "The authenticated doctor's schedule", body = AppointmentListRes),
        (status = 403, description = "Caller is not a doctor")
    )
)]
#[axum::debug_handler]
pub async fn list_for_current_doctor(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<AppointmentListQuery>,
) -> ApiResult<Json<AppointmentListRes>> {
    auth.require_doctor()?;
    let doctor = DoctorService::new(state.store.clone()).for_user(auth.id())?;
    let page = AppointmentService::new(state.store.clone()).list_for_doctor(doctor.id, &query)?;
    Ok(Json(page.into()))
}

#[utoipa::path(
    get,
    path = "/api/appointments/patient",
    responses(
        (status = 200, description = "The authenticated patient's appointments", body = AppointmentListRes),
        (status = 403, description = "Caller is not a patient")
    )
)]
#[axum::debug_handler]
pub async fn list_for_current_patient(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<AppointmentListQuery>,
) -> ApiResult<Json<AppointmentListRes>> {
    auth.require_patient()?;
    let patient = PatientService::new(state.store.clone()).for_user(auth.id())?;
    let page = AppointmentService::new(state.store.clone()).list_for_patient(patient.id, &query)?;
    Ok(Json(page.into()))
}

#[utoipa::path(
    get,
    path = "/api/appointments/doctor/{doctorId}",
    responses(
        (status = 200, description = "A doctor's schedule", body = AppointmentListRes)
    )
)]
#[axum::debug_handler]
pub async fn list_by_doctor(
    State(state): State<AppState>,
    Path(doctor_id): Path<Uuid>,
    Query(query): Query<AppointmentListQuery>,
) -> ApiResult<Json<AppointmentListRes>> {
    let page = AppointmentService::new(state.store.clone()).list_for_doctor(doctor_id, &query)?;
    Ok(Json(page.into()))
}

#[utoipa::path(
    get,
    path = "/api/appointments/patient/{patientId}",
    responses(
        (status = 200, description = "A patient's appointments", body = AppointmentListRes)
    )
)]
#[axum::debug_handler]
pub async fn list_by_patient(
    State(state): State<AppState>,
    Path(patient_id): Path<Uuid>,
    Query(query): Query<AppointmentListQuery>,
) -> ApiResult<Json<AppointmentListRes>> {
    let page = AppointmentService::new(state.store.clone()).list_for_patient(patient_id, &query)?;
    Ok(Json(page.into()))
}

#[utoipa::path(
    get,
    path = "/api/appointments/stats/overview",
    responses(
        (status = 200, description = "System-wide appointment counters", body = AppointmentStatsRes)
    )
)]
#[axum::debug_handler]
pub async fn overview_stats(
    State(state): State<AppState>,
) -> ApiResult<Json<AppointmentStatsRes>> {
    let stats = AppointmentService::new(state.store.clone()).overview_stats()?;
    Ok(Json(AppointmentStatsRes {
        success: true,
        stats,
    }))
}

#[utoipa::path(
    get,
    path = "/api/appointments/{id}",
    responses(
        (status = 200, description = "One appointment, populated", body = AppointmentRes),
        (status = 403, description = "Caller is not a party to the appointment"),
        (status = 404, description = "Appointment not found")
    )
)]
#[axum::debug_handler]
pub async fn get_appointment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<AppointmentRes>> {
    let appointment = AppointmentService::new(state.store.clone()).get(auth.id(), auth.role(), id)?;
    Ok(Json(AppointmentRes {
        success: true,
        message: None,
        appointment,
    }))
}

#[utoipa::path(
    put,
    path = "/api/appointments/{id}",
    request_body = UpdateAppointmentRequest,
    responses(
        (status = 200, description = "Appointment updated", body = AppointmentRes),
        (status = 403, description = "Caller does not own the appointment"),
        (status = 404, description = "Appointment not found")
    )
)]
#[axum::debug_handler]
pub async fn update_appointment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateAppointmentRequest>,
) -> ApiResult<Json<AppointmentRes>> {
    let appointment =
        AppointmentService::new(state.store.clone()).update(auth.id(), auth.role(), id, req)?;
    Ok(Json(AppointmentRes {
        success: true,
        message: Some("Appointment updated successfully".into()),
        appointment,
    }))
}

#[utoipa::path(
    patch,
    path = "/api/appointments/{id}/status",
    request_body = StatusUpdateRequest,
    responses(
        (status = 200, description = "Status updated", body = AppointmentRes),
        (status = 403, description = "Caller is not a party to the appointment"),
        (status = 404, description = "Appointment not found")
    )
)]
#[axum::debug_handler]
pub async fn update_status(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<StatusUpdateRequest>,
) -> ApiResult<Json<AppointmentRes>> {
    let appointment =
        AppointmentService::new(state.store.clone()).update_status(auth.id(), auth.role(), id, req)?;
    Ok(Json(AppointmentRes {
        success: true,
        message: Some("Appointment status updated".into()),
        appointment,
    }))
}

#[utoipa::path(
    delete,
    path = "/api/appointments/{id}",
    responses(
        (status = 200, description = "Appointment deleted"),
        (status = 403, description = "Caller does not own the appointment"),
        (status = 404, description = "Appointment not found")
    )
)]
#[axum::debug_handler]
pub async fn delete_appointment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    let service = AppointmentService::new(state.store.clone());
    if auth.role() != Role::Admin {
        auth.require_doctor()?;
        // Ownership check: the service only yields the appointment to a party.
        service.get(auth.id(), auth.role(), id)?;
    }
    service.delete(id)?;

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Appointment deleted successfully"
    })))
}
