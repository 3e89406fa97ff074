use axum::{
    extract::State,
    Json,
    routing::post,
    Router,
};
use serde::{Deserialize, Serialize};
use jsonwebtoken::{encode, Header, EncodingKey};
use chrono::{Utc, Duration};
use tarmac_core::User;
use tracing::info;
use crate::{state::AppState, error::AppError, middleware::auth::{CustomerClaims, CUSTOMER_ROLE}};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub handle: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/auth/login", post(log_in))
}

async fn log_in(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let user = state.users.log_in(&req.handle, &req.password).await?
        .ok_or_else(|| AppError::AuthenticationError("Invalid handle or password".to_string()))?;

    let expires_at = i64::try_from(state.auth.expiration)
        .ok()
        .and_then(Duration::try_seconds)
        .and_then(|ttl| Utc::now().checked_add_signed(ttl))
        .ok_or_else(|| AppError::InternalServerError(format!("Token lifetime of {}s is out of range", state.auth.expiration)))?;

    let claims = CustomerClaims {
        sub: user.id.to_string(),
        handle: user.handle.clone(),
        role: CUSTOMER_ROLE.to_owned(),
        exp: expires_at.timestamp() as usize,
    };

    let token = encode(&Header::default(), &claims, &EncodingKey::from_secret(state.auth.secret.as_bytes()))
        .map_err(|e| AppError::InternalServerError(format!("Token encoding failed: {}", e)))?;

    info!(user_id = user.id, "User logged in");
    Ok(Json(AuthResponse { token, user }))
}
