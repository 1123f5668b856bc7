//! Authenticated-identity extractor for Axum handlers.
//!
//! Authentication is terminated upstream (gateway / auth service,
//! outside this core); the gateway injects the verified identity as an
//! `x-user-id` header. This extractor only parses and requires it --
//! ownership checks against job rows happen in the handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

use reelforge_core::error::CoreError;

use crate::error::AppError;
use crate::state::AppState;

/// Header carrying the gateway-verified user id.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Authenticated user identity for a request.
///
/// Use this as an extractor parameter in any handler that requires an
/// identity:
///
/// ```ignore
/// async fn my_handler(user: AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(user_id = %user.user_id, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The user's id as verified by the upstream gateway.
    pub user_id: Uuid,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(format!(
                    "Missing {USER_ID_HEADER} header"
                )))
            })?;

        let user_id = header.parse::<Uuid>().map_err(|_| {
            AppError::Core(CoreError::Unauthorized(format!(
                "Invalid {USER_ID_HEADER} header"
            )))
        })?;

        Ok(AuthUser { user_id })
    }
}
