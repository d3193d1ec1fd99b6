//! Admin-only user management.

use axum::extract::{Path, State};
use axum::routing::put;
use axum::{Json, Router};
use uuid::Uuid;

use clinic_core::models::UpdateProfileRequest;
use clinic_core::services::AuthService;

use crate::error::ApiResult;
use crate::extract::AuthUser;
use crate::routes::auth::UserRes;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/admin/users/:userId/profile", put(update_user_profile))
}

#[utoipa::path(
    put,
    path = "/api/admin/users/{userId}/profile",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "User profile updated", body = UserRes),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "User not found")
    )
)]
#[axum::debug_handler]
pub async fn update_user_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<Uuid>,
    Json(req): Json<UpdateProfileRequest>,
) -> ApiResult<Json<UserRes>> {
    auth.require_admin()?;
    let service = AuthService::new(state.cfg.clone(), state.store.clone());
    let user = service.update_profile(user_id, req)?;

    tracing::info!(user_id = %user.id, admin_id = %auth.id(), "admin updated user profile");

    Ok(Json(UserRes {
        success: true,
        message: "Profile updated successfully".into(),
        user,
    }))
}
