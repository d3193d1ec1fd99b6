//! Registration, login, and the authenticated user's own profile.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use utoipa::ToSchema;

use clinic_core::models::{
    LoginRequest, PublicUser, RegisterRequest, RoleProfile, UpdateProfileRequest,
};
use clinic_core::services::AuthService;

use crate::error::ApiResult;
use crate::extract::AuthUser;
use crate::AppState;

#[derive(Serialize, ToSchema)]
pub struct AuthRes {
    pub success: bool,
    pub message: String,
    pub token: String,
    pub user: PublicUser,
}

#[derive(Serialize, ToSchema)]
pub struct ProfileRes {
    pub success: bool,
    pub user: PublicUser,
    pub profile: Option<RoleProfile>,
}

#[derive(Serialize, ToSchema)]
pub struct UserRes {
    pub success: bool,
    pub message: String,
    pub user: PublicUser,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/profile", get(profile).put(update_profile))
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = AuthRes),
        (status = 400, description = "Validation failure or duplicate email")
    )
)]
#[axum::debug_handler]
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<AuthRes>)> {
    let service = AuthService::new(state.cfg.clone(), state.store.clone());
    let (user, token) = service.register(req)?;

    tracing::info!(user_id = %user.id, role = %user.role, "registered new account");

    Ok((
        StatusCode::CREATED,
        Json(AuthRes {
            success: true,
            message: "User registered successfully".into(),
            token,
            user,
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = AuthRes),
        (status = 401, description = "Invalid credentials")
    )
)]
#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<AuthRes>> {
    let service = AuthService::new(state.cfg.clone(), state.store.clone());
    let (user, token) = service.login(&req.email, &req.password)?;

    Ok(Json(AuthRes {
        success: true,
        message: "Login successful".into(),
        token,
        user,
    }))
}

#[utoipa::path(
    get,
    path = "/api/auth/profile",
    responses(
        (status = 200, description = "Current user with role profile", body = ProfileRes),
        (status = 401, description = "Missing token")
    )
)]
#[axum::debug_handler]
pub async fn profile(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<ProfileRes>> {
    let service = AuthService::new(state.cfg.clone(), state.store.clone());
    let (user, profile) = service.profile(auth.id())?;

    Ok(Json(ProfileRes {
        success: true,
        user,
        profile,
    }))
}

#[utoipa::path(
    put,
    path = "/api/auth/profile",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = UserRes),
        (status = 401, description = "Missing token")
    )
)]
#[axum::debug_handler]
pub async fn update_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<UpdateProfileRequest>,
) -> ApiResult<Json<UserRes>> {
    let service = AuthService::new(state.cfg.clone(), state.store.clone());
    let user = service.update_profile(auth.id(), req)?;

    Ok(Json(UserRes {
        success: true,
        message: "Profile updated successfully".into(),
        user,
    }))
}
