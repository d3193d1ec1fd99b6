//! Bearer-token extraction and role predicates.
//!
//! Handlers take an [`AuthUser`] argument where authentication is required and
//! call the role predicate they need. Authorization is an explicit check in
//! the handler body, not a middleware chain, so each route's guard is visible
//! at the route itself.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use uuid::Uuid;

use clinic_core::auth::verify_token;
use clinic_core::models::{Role, User};
use clinic_core::ClinicError;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// The authenticated caller: token claims resolved back to a live user record.
pub struct AuthUser {
    pub user: User,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(ClinicError::MissingToken)?;
        let token = header
            .strip_prefix("Bearer ")
            .ok_or(ClinicError::MissingToken)?;

        let claims = verify_token(state.cfg.token_secret(), token)?;

        // A valid signature is not enough: the account must still exist and
        // be active.
        let user = state
            .store
            .users
            .get(claims.sub)?
            .ok_or(ClinicError::InvalidToken)?;
        if !user.is_active {
            return Err(ClinicError::Forbidden("Account is deactivated".into()).into());
        }

        Ok(AuthUser { user })
    }
}

impl AuthUser {
    pub fn id(&self) -> Uuid {
        self.user.id
    }

    pub fn role(&self) -> Role {
        self.user.role
    }

    pub fn require_doctor(&self) -> ApiResult<()> {
        self.require(Role::Doctor)
    }

    pub fn require_patient(&self) -> ApiResult<()> {
        self.require(Role::Patient)
    }

    pub fn require_admin(&self) -> ApiResult<()> {
        self.require(Role::Admin)
    }

    fn require(&self, role: Role) -> ApiResult<()> {
        if self.user.role == role {
            Ok(())
        } else {
            Err(ClinicError::Forbidden("Access denied".into()).into())
        }
    }
}
