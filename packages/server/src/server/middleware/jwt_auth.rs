use crate::common::AccountId;
use crate::domains::auth::JwtService;
use crate::server::app::AppState;
use crate::server::error::ApiError;
use axum::{
    async_trait, extract::FromRequestParts, http::request::Parts, middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::debug;

/// Authenticated user information from JWT
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub telegram_id: String,
    pub account_id: AccountId,
    pub is_admin: bool,
}

/// An `AuthUser` whose token carries the admin flag and whose Telegram id
/// is still listed in `ADMIN_TELEGRAM_IDS`.
#[derive(Clone, Debug)]
pub struct AdminUser(pub AuthUser);

/// JWT authentication middleware
///
/// Extracts JWT token from Authorization header, verifies it, and adds
/// AuthUser to request extensions.
/// If no token or invalid token, request continues without AuthUser; protected
/// handlers reject it through the `AuthUser` extractor.
pub async fn jwt_auth_middleware(
    jwt_service: Arc<JwtService>,
    mut request: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let auth_user = extract_auth_user(&request, &jwt_service);

    if let Some(user) = auth_user {
        debug!(
            "Authenticated user: {} (admin: {})",
            user.account_id, user.is_admin
        );
        request.extensions_mut().insert(user);
    } else {
        debug!("No valid authentication token");
    }

    next.run(request).await
}

/// Extract and verify JWT token from request
fn extract_auth_user(
    request: &axum::http::Request<axum::body::Body>,
    jwt_service: &JwtService,
) -> Option<AuthUser> {
    let auth_header = request.headers().get("authorization")?;
    let auth_str = auth_header.to_str().ok()?;

    // Extract token (handle both "Bearer <token>" and raw token)
    let token = auth_str.strip_prefix("Bearer ").unwrap_or(auth_str);

    let claims = jwt_service.verify_token(token).ok()?;

    Some(AuthUser {
        telegram_id: claims.sub,
        account_id: claims.account_id,
        is_admin: claims.is_admin,
    })
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or(ApiError::Unauthorized)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        let still_listed = parts
            .extensions
            .get::<AppState>()
            .is_some_and(|app| app.deps.is_admin(&user.telegram_id));

        if user.is_admin && still_listed {
            Ok(AdminUser(user))
        } else {
            Err(ApiError::Forbidden)
        }
    }
}
