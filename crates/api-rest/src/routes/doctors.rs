//! Doctor directory, availability, and slot lookup.

use axum::extract::{Path, Query, State};
use axum::routing::{get, put};
use axum::{Json, Router};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use clinic_core::models::time_hm::FORMAT as TIME_FORMAT;
use clinic_core::models::{
    AppointmentListQuery, Doctor, DoctorListQuery, DoctorProfile, DoctorStats,
    UpdateAvailabilityRequest,
};
use clinic_core::pagination::Page;
use clinic_core::services::{AppointmentService, DoctorService};

use crate::error::ApiResult;
use crate::extract::AuthUser;
use crate::routes::appointments::AppointmentListRes;
use crate::AppState;

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DoctorListRes {
    pub success: bool,
    pub doctors: Vec<DoctorProfile>,
    pub total_pages: u64,
    pub current_page: u64,
    pub total: u64,
}

impl From<Page<DoctorProfile>> for DoctorListRes {
    fn from(page: Page<DoctorProfile>) -> Self {
        Self {
            success: true,
            doctors: page.items,
            total_pages: page.total_pages,
            current_page: page.current_page,
            total: page.total,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct DoctorRes {
    pub success: bool,
    pub doctor: DoctorProfile,
}

#[derive(Serialize, ToSchema)]
pub struct DoctorRecordRes {
    pub success: bool,
    pub message: String,
    pub doctor: Doctor,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SlotsRes {
    pub success: bool,
    pub date: NaiveDate,
    pub available_slots: Vec<String>,
}

#[derive(Serialize, ToSchema)]
pub struct SpecializationsRes {
    pub success: bool,
    pub specializations: Vec<String>,
}

#[derive(Serialize, ToSchema)]
pub struct DoctorStatsRes {
    pub success: bool,
    pub stats: DoctorStats,
}

#[derive(Deserialize, ToSchema)]
pub struct SlotsQuery {
    #[schema(value_type = Option<String>, example = "2025-06-02")]
    pub date: Option<NaiveDate>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/doctors", get(list))
        .route("/doctors/specializations/list", get(specializations))
        .route("/doctors/me", get(me))
        .route("/doctors/:id", get(get_doctor))
        .route("/doctors/:id/available-slots", get(available_slots))
        .route("/doctors/:id/appointments", get(doctor_appointments))
        .route("/doctors/:id/stats", get(stats))
        .route("/doctors/:id/availability", put(update_availability))
}

#[utoipa::path(
    get,
    path = "/api/doctors",
    responses(
        (status = 200, description = "Active doctors, best rated first", body = DoctorListRes)
    )
)]
#[axum::debug_handler]
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<DoctorListQuery>,
) -> ApiResult<Json<DoctorListRes>> {
    let page = DoctorService::new(state.store.clone()).list(&query)?;
    Ok(Json(page.into()))
}

#[utoipa::path(
    get,
    path = "/api/doctors/specializations/list",
    responses(
        (status = 200, description = "Distinct specializations", body = SpecializationsRes)
    )
)]
#[axum::debug_handler]
pub async fn specializations(
    State(state): State<AppState>,
) -> ApiResult<Json<SpecializationsRes>> {
    let specializations = DoctorService::new(state.store.clone()).specializations()?;
    Ok(Json(SpecializationsRes {
        success: true,
        specializations,
    }))
}

#[utoipa::path(
    get,
    path = "/api/doctors/me",
    responses(
        (status = 200, description = "The authenticated doctor's profile", body = DoctorRes),
        (status = 403, description = "Caller is not a doctor"),
        (status = 404, description = "No doctor profile for this account")
    )
)]
#[axum::debug_handler]
pub async fn me(State(state): State<AppState>, auth: AuthUser) -> ApiResult<Json<DoctorRes>> {
    auth.require_doctor()?;
    let service = DoctorService::new(state.store.clone());
    let doctor = service.for_user(auth.id())?;
    let profile = service.get(doctor.id)?;
    Ok(Json(DoctorRes {
        success: true,
        doctor: profile,
    }))
}

#[utoipa::path(
    get,
    path = "/api/doctors/{id}",
    responses(
        (status = 200, description = "One doctor, populated", body = DoctorRes),
        (status = 404, description = "Doctor not found")
    )
)]
#[axum::debug_handler]
pub async fn get_doctor(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<DoctorRes>> {
    let doctor = DoctorService::new(state.store.clone()).get(id)?;
    Ok(Json(DoctorRes {
        success: true,
        doctor,
    }))
}

#[utoipa::path(
    get,
    path = "/api/doctors/{id}/available-slots",
    responses(
        (status = 200, description = "Bookable half-hour start times for the date", body = SlotsRes),
        (status = 400, description = "Missing date parameter"),
        (status = 404, description = "Doctor not found")
    )
)]
#[axum::debug_handler]
pub async fn available_slots(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<SlotsQuery>,
) -> ApiResult<Json<SlotsRes>> {
    let slots = AppointmentService::new(state.store.clone()).available_slots(id, query.date)?;
    // a missing date has already been rejected above
    let date = query.date.unwrap_or_default();

    Ok(Json(SlotsRes {
        success: true,
        date,
        available_slots: slots
            .iter()
            .map(|t| t.format(TIME_FORMAT).to_string())
            .collect(),
    }))
}

#[utoipa::path(
    get,
    path = "/api/doctors/{id}/appointments",
    responses(
        (status = 200, description = "A doctor's schedule", body = AppointmentListRes)
    )
)]
#[axum::debug_handler]
pub async fn doctor_appointments(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<AppointmentListQuery>,
) -> ApiResult<Json<AppointmentListRes>> {
    let page = AppointmentService::new(state.store.clone()).list_for_doctor(id, &query)?;
    Ok(Json(page.into()))
}

#[utoipa::path(
    get,
    path = "/api/doctors/{id}/stats",
    responses(
        (status = 200, description = "Dashboard counters for one doctor", body = DoctorStatsRes),
        (status = 404, description = "Doctor not found")
    )
)]
#[axum::debug_handler]
pub async fn stats(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<DoctorStatsRes>> {
    let stats = DoctorService::new(state.store.clone()).stats(id)?;
    Ok(Json(DoctorStatsRes {
        success: true,
        stats,
    }))
}

#[utoipa::path(
    put,
    path = "/api/doctors/{id}/availability",
    request_body = UpdateAvailabilityRequest,
    responses(
        (status = 200, description = "Availability replaced", body = DoctorRecordRes),
        (status = 403, description = "Caller is neither this doctor nor an admin"),
        (status = 404, description = "Doctor not found")
    )
)]
#[axum::debug_handler]
pub async fn update_availability(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateAvailabilityRequest>,
) -> ApiResult<Json<DoctorRecordRes>> {
    let doctor = DoctorService::new(state.store.clone()).update_availability(
        auth.id(),
        auth.role(),
        id,
        req.availability,
    )?;

    Ok(Json(DoctorRecordRes {
        success: true,
        message: "Availability updated successfully".into(),
        doctor,
    }))
}
