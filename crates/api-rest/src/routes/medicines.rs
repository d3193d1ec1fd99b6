//! Medicine catalog and stock management.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, patch, post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use clinic_core::models::{
    Medicine, MedicineCategory, MedicineListQuery, NewMedicineRequest, StockUpdateRequest,
    UpdateMedicineRequest,
};
use clinic_core::pagination::Page;
use clinic_core::services::MedicineService;

use crate::error::ApiResult;
use crate::extract::AuthUser;
use crate::AppState;

#[derive(Serialize, ToSchema)]
pub struct MedicineRes {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub medicine: Medicine,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MedicineListRes {
    pub success: bool,
    pub medicines: Vec<Medicine>,
    pub total_pages: u64,
    pub current_page: u64,
    pub total: u64,
}

impl From<Page<Medicine>> for MedicineListRes {
    fn from(page: Page<Medicine>) -> Self {
        Self {
            success: true,
            medicines: page.items,
            total_pages: page.total_pages,
            current_page: page.current_page,
            total: page.total,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct CategoriesRes {
    pub success: bool,
    pub categories: Vec<MedicineCategory>,
}

#[derive(Serialize, ToSchema)]
pub struct LowStockRes {
    pub success: bool,
    pub medicines: Vec<Medicine>,
}

#[derive(Deserialize, ToSchema)]
pub struct LowStockQuery {
    pub threshold: Option<u32>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/medicines", get(list).post(create))
        .route("/medicines/categories/list", get(categories))
        .route("/medicines/stock/low", get(low_stock))
        .route("/medicines/:id", get(get_medicine))
        .route("/medicines/:id", put(update_medicine))
        .route("/medicines/:id", delete(deactivate))
        .route("/medicines/:id/stock", patch(update_stock))
}

#[utoipa::path(
    get,
    path = "/api/medicines",
    responses(
        (status = 200, description = "Catalog listing, alphabetical", body = MedicineListRes)
    )
)]
#[axum::debug_handler]
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<MedicineListQuery>,
) -> ApiResult<Json<MedicineListRes>> {
    let page = MedicineService::new(state.store.clone()).list(&query)?;
    Ok(Json(page.into()))
}

#[utoipa::path(
    get,
    path = "/api/medicines/categories/list",
    responses(
        (status = 200, description = "Categories present in the catalog", body = CategoriesRes)
    )
)]
#[axum::debug_handler]
pub async fn categories(State(state): State<AppState>) -> ApiResult<Json<CategoriesRes>> {
    let categories = MedicineService::new(state.store.clone()).categories()?;
    Ok(Json(CategoriesRes {
        success: true,
        categories,
    }))
}

#[utoipa::path(
    get,
    path = "/api/medicines/stock/low",
    responses(
        (status = 200, description = "Medicines at or below the stock threshold", body = LowStockRes)
    )
)]
#[axum::debug_handler]
pub async fn low_stock(
    State(state): State<AppState>,
    Query(query): Query<LowStockQuery>,
) -> ApiResult<Json<LowStockRes>> {
    let medicines = MedicineService::new(state.store.clone()).low_stock(query.threshold)?;
    Ok(Json(LowStockRes {
        success: true,
        medicines,
    }))
}

#[utoipa::path(
    get,
    path = "/api/medicines/{id}",
    responses(
        (status = 200, description = "One medicine", body = MedicineRes),
        (status = 404, description = "Medicine not found")
    )
)]
#[axum::debug_handler]
pub async fn get_medicine(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MedicineRes>> {
    let medicine = MedicineService::new(state.store.clone()).get(id)?;
    Ok(Json(MedicineRes {
        success: true,
        message: None,
        medicine,
    }))
}

#[utoipa::path(
    post,
    path = "/api/medicines",
    request_body = NewMedicineRequest,
    responses(
        (status = 201, description = "Medicine added to the catalog", body = MedicineRes),
        (status = 400, description = "Validation failure"),
        (status = 403, description = "Caller is not an admin")
    )
)]
#[axum::debug_handler]
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<NewMedicineRequest>,
) -> ApiResult<(StatusCode, Json<MedicineRes>)> {
    auth.require_admin()?;
    let medicine = MedicineService::new(state.store.clone()).create(req)?;
    Ok((
        StatusCode::CREATED,
        Json(MedicineRes {
            success: true,
            message: Some("Medicine created successfully".into()),
            medicine,
        }),
    ))
}

#[utoipa::path(
    put,
    path = "/api/medicines/{id}",
    request_body = UpdateMedicineRequest,
    responses(
        (status = 200, description = "Medicine updated", body = MedicineRes),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "Medicine not found")
    )
)]
#[axum::debug_handler]
pub async fn update_medicine(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateMedicineRequest>,
) -> ApiResult<Json<MedicineRes>> {
    auth.require_admin()?;
    let medicine = MedicineService::new(state.store.clone()).update(id, req)?;
    Ok(Json(MedicineRes {
        success: true,
        message: Some("Medicine updated successfully".into()),
        medicine,
    }))
}

#[utoipa::path(
    delete,
    path = "/api/medicines/{id}",
    responses(
        (status = 200, description = "Medicine deactivated; the record is retained", body = MedicineRes),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "Medicine not found")
    )
)]
#[axum::debug_handler]
pub async fn deactivate(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MedicineRes>> {
    auth.require_admin()?;
    let medicine = MedicineService::new(state.store.clone()).deactivate(id)?;
    Ok(Json(MedicineRes {
        success: true,
        message: Some("Medicine deleted successfully".into()),
        medicine,
    }))
}

#[utoipa::path(
    patch,
    path = "/api/medicines/{id}/stock",
    request_body = StockUpdateRequest,
    responses(
        (status = 200, description = "Stock counter replaced", body = MedicineRes),
        (status = 404, description = "Medicine not found")
    )
)]
#[axum::debug_handler]
pub async fn update_stock(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<StockUpdateRequest>,
) -> ApiResult<Json<MedicineRes>> {
    let medicine = MedicineService::new(state.store.clone()).update_stock(id, req.stock_quantity)?;
    Ok(Json(MedicineRes {
        success: true,
        message: Some("Stock updated successfully".into()),
        medicine,
    }))
}
