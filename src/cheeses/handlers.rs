use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::auth::extractors::{AdminUser, AuthUser};
use crate::cheeses::dto::{
    build_new_cheese, owner_violation, select_properties, update_violations, CheeseCollectionItem,
    CheeseItem, CheeseWrite,
};
use crate::cheeses::format::{csv_document, html_document, negotiate, Format};
use crate::cheeses::query::ListQuery;
use crate::cheeses::repo::CheeseListing;
use crate::cheeses::text::nl2br;
use crate::error::ApiError;
use crate::pagination::{PaginatedResponse, PaginationMeta, PAGE_SIZE};
use crate::state::AppState;
use crate::users::repo::User;

const COLLECTION_FIELDS: [&str; 5] = ["id", "title", "shortDescription", "price", "createdAtAgo"];

pub fn cheese_routes() -> Router<AppState> {
    Router::new()
        .route("/cheeses", get(list_cheeses).post(create_cheese))
        .route(
            "/cheeses/:id",
            get(get_cheese).put(update_cheese).delete(delete_cheese),
        )
        // legacy item path kept from the first public revision of the API
        .route("/icheeses/:id", get(get_cheese))
}

/// GET /api/cheeses
///
/// Paginated collection, 10 per page, with boolean/partial/range filters
/// and `properties[]` field selection. The representation is negotiated
/// from the Accept header: JSON, HTML or CSV.
#[instrument(skip(state, headers))]
pub async fn list_cheeses(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Response, ApiError> {
    let query = ListQuery::from_pairs(&pairs);
    let rows = CheeseListing::page(&state.db, &query.filter, PAGE_SIZE, query.offset()).await?;
    let total = CheeseListing::count(&state.db, &query.filter).await?;

    let now = OffsetDateTime::now_utc();
    let mut items = Vec::with_capacity(rows.len());
    for row in &rows {
        let value = serde_json::to_value(CheeseCollectionItem::from_row(row, now))
            .map_err(|e| ApiError::Internal(e.into()))?;
        items.push(select_properties(value, &query.properties));
    }

    let fields: Vec<String> = if query.properties.is_empty() {
        COLLECTION_FIELDS.iter().map(|f| f.to_string()).collect()
    } else {
        query.properties.clone()
    };

    let accept = headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok());
    let response = match negotiate(accept) {
        Format::Json => Json(PaginatedResponse {
            data: items,
            pagination: PaginationMeta::new(query.page, total),
        })
        .into_response(),
        Format::Csv => {
            let body = csv_document(&fields, &items).map_err(ApiError::Internal)?;
            ([(header::CONTENT_TYPE, "text/csv")], body).into_response()
        }
        Format::Html => {
            let body = html_document(&fields, &items);
            (
                [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
                body,
            )
                .into_response()
        }
    };
    Ok(response)
}

/// POST /api/cheeses, authenticated callers only.
#[instrument(skip(state, payload))]
pub async fn create_cheese(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Json(payload): Json<CheeseWrite>,
) -> Result<(StatusCode, HeaderMap, Json<CheeseItem>), ApiError> {
    let owner_exists = match payload.owner {
        Some(owner_id) => User::exists(&state.db, owner_id).await?,
        None => true,
    };
    let new = build_new_cheese(payload, owner_exists).map_err(ApiError::Validation)?;

    let row = CheeseListing::create(&state.db, new.owner, &new.title, &new.description, new.price)
        .await?;
    let owner = User::find_by_id(&state.db, row.owner_id)
        .await?
        .ok_or(ApiError::NotFound)?;

    info!(listing_id = %row.id, owner_id = %row.owner_id, caller_id = %caller.id, "cheese listing created");

    let mut location = HeaderMap::new();
    if let Ok(value) = format!("/api/cheeses/{}", row.id).parse() {
        location.insert(header::LOCATION, value);
    }
    let item = CheeseItem::from_row(&row, &owner, OffsetDateTime::now_utc(), false);
    Ok((StatusCode::CREATED, location, Json(item)))
}

/// GET /api/cheeses/{id} (also served at /api/icheeses/{id}).
///
/// Open to anonymous callers; an admin bearer token additionally reveals
/// the publication flag.
#[instrument(skip(state, admin))]
pub async fn get_cheese(
    State(state): State<AppState>,
    admin: Option<AdminUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<CheeseItem>, ApiError> {
    let row = CheeseListing::find(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound)?;
    let owner = User::find_by_id(&state.db, row.owner_id)
        .await?
        .ok_or(ApiError::NotFound)?;

    let item = CheeseItem::from_row(&row, &owner, OffsetDateTime::now_utc(), admin.is_some());
    Ok(Json(item))
}

/// PUT /api/cheeses/{id}
///
/// Fields absent from the payload keep their stored values; the merged
/// state is validated like a creation. `isPublished` and `createdAt` are
/// not writable.
#[instrument(skip(state, payload))]
pub async fn update_cheese(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CheeseWrite>,
) -> Result<Json<CheeseItem>, ApiError> {
    let existing = CheeseListing::find(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound)?;

    let title = payload.title.unwrap_or(existing.title);
    let description = match payload.description {
        Some(raw) => nl2br(&raw),
        None => existing.description,
    };
    let price = payload.price.unwrap_or(existing.price);
    let owner_id = payload.owner.unwrap_or(existing.owner_id);

    let mut violations = update_violations(&title);
    if payload.owner.is_some() && !User::exists(&state.db, owner_id).await? {
        violations.push(owner_violation());
    }
    if !violations.is_empty() {
        return Err(ApiError::Validation(violations));
    }

    let row = CheeseListing::update(&state.db, id, owner_id, &title, &description, price).await?;
    let owner = User::find_by_id(&state.db, row.owner_id)
        .await?
        .ok_or(ApiError::NotFound)?;

    info!(listing_id = %row.id, "cheese listing updated");
    let item = CheeseItem::from_row(&row, &owner, OffsetDateTime::now_utc(), false);
    Ok(Json(item))
}

/// DELETE /api/cheeses/{id}, administrative role required.
#[instrument(skip(state, admin))]
pub async fn delete_cheese(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let affected = CheeseListing::delete(&state.db, id).await?;
    if affected == 0 {
        return Err(ApiError::NotFound);
    }
    info!(listing_id = %id, admin_id = %admin.id, "cheese listing deleted");
    Ok(StatusCode::NO_CONTENT)
}
