use axum::{
    extract::{FromRef, State},
    routing::post,
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::auth::dto::{LoginRequest, TokenResponse};
use crate::auth::jwt::JwtKeys;
use crate::auth::password::verify_password;
use crate::error::ApiError;
use crate::state::AppState;
use crate::users::repo::User;

pub fn login_routes() -> Router<AppState> {
    Router::new().route("/login_check", post(login_check))
}

/// POST /api/login_check
///
/// Unknown email is a 404, a wrong password a 401. The two cases are kept
/// distinct on purpose; see DESIGN.md.
#[instrument(skip(state, payload))]
pub async fn login_check(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let user = User::find_by_email(&state.db, &payload.email)
        .await?
        .ok_or_else(|| {
            warn!(email = %payload.email, "login unknown email");
            ApiError::NotFound
        })?;

    let ok = verify_password(&payload.password, &user.password_hash).map_err(ApiError::Internal)?;
    if !ok {
        warn!(email = %payload.email, user_id = %user.id, "login invalid password");
        return Err(ApiError::BadCredentials);
    }

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(&user.email).map_err(ApiError::Internal)?;

    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok(Json(TokenResponse { token }))
}
