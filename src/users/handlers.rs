use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use crate::auth::extractors::AuthUser;
use crate::cheeses::repo::CheeseListing;
use crate::error::ApiError;
use crate::pagination::{PageQuery, PaginatedResponse, PaginationMeta, PAGE_SIZE};
use crate::state::AppState;
use crate::users::dto::{RegisterRequest, UpdateUserRequest, UserItemRead, UserRead};
use crate::users::repo::User;
use crate::users::service;

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(register).get(list_users))
        .route("/users/:id", get(get_user).put(update_user))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, HeaderMap, Json<UserRead>), ApiError> {
    let user = service::register_user(&state.db, &payload.email, &payload.password).await?;

    let mut headers = HeaderMap::new();
    if let Ok(location) = format!("/api/users/{}", user.id).parse() {
        headers.insert(axum::http::header::LOCATION, location);
    }
    Ok((StatusCode::CREATED, headers, Json(UserRead::from(&user))))
}

#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
) -> Result<Json<PaginatedResponse<UserRead>>, ApiError> {
    let users = User::page(&state.db, PAGE_SIZE, page.offset()).await?;
    let total = User::count(&state.db).await?;
    Ok(Json(PaginatedResponse {
        data: users.iter().map(UserRead::from).collect(),
        pagination: PaginationMeta::new(page.page(), total),
    }))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<UserItemRead>, ApiError> {
    let user = User::find_by_id(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound)?;
    let titles = CheeseListing::titles_by_owner(&state.db, user.id).await?;

    Ok(Json(UserItemRead {
        id: user.id,
        email: user.email,
        cheese_listings: titles,
    }))
}

#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<UserRead>, ApiError> {
    if caller.id != id {
        return Err(ApiError::Forbidden);
    }
    let user = service::change_email(&state.db, id, &payload.email).await?;
    Ok(Json(UserRead::from(&user)))
}
