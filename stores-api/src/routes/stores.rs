/// Store endpoints
///
/// - `GET /store` - List stores with their items and tags
/// - `POST /store` - Create a store
/// - `GET /store/:store_id` - Get one store
/// - `PUT /store/:store_id` - Rename a store, or create it under that ID
/// - `DELETE /store/:store_id` - Delete a store with its items and tags

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::{PlainItem, PlainTag},
};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use stores_shared::models::{Item, Store, Tag};
use validator::Validate;

const DUPLICATE_NAME: &str = "A store with that name already exists.";

/// Store with its items and tags
#[derive(Debug, Serialize, Deserialize)]
pub struct StoreResponse {
    pub id: i64,
    pub name: String,
    pub items: Vec<PlainItem>,
    pub tags: Vec<PlainTag>,
}

/// Body for both create and upsert
#[derive(Debug, Deserialize, Validate)]
pub struct StoreRequest {
    #[validate(length(min = 1, max = 50, message = "Store name must be 1-50 characters"))]
    pub name: String,
}

pub(crate) fn store_not_found() -> ApiError {
    ApiError::NotFound("Store not found.".to_string())
}

pub async fn list_stores(State(state): State<AppState>) -> ApiResult<Json<Vec<StoreResponse>>> {
    let stores = Store::list(&state.db).await?;

    let mut items: HashMap<i64, Vec<PlainItem>> = HashMap::new();
    for item in Item::list(&state.db).await? {
        items.entry(item.store_id).or_default().push(item.into());
    }

    let mut tags: HashMap<i64, Vec<PlainTag>> = HashMap::new();
    for tag in Tag::list(&state.db).await? {
        tags.entry(tag.store_id).or_default().push(tag.into());
    }

    let response = stores
        .into_iter()
        .map(|store| StoreResponse {
            items: items.remove(&store.id).unwrap_or_default(),
            tags: tags.remove(&store.id).unwrap_or_default(),
            id: store.id,
            name: store.name,
        })
        .collect();

    Ok(Json(response))
}

/// # Errors
///
/// - `409 Conflict`: Name already taken
pub async fn create_store(
    State(state): State<AppState>,
    payload: Result<Json<StoreRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<StoreResponse>)> {
    let Json(req) = payload?;
    req.validate()?;

    let store = Store::create(&state.db, &req.name)
        .await
        .map_err(|e| ApiError::from(e).on_conflict(DUPLICATE_NAME))?;

    tracing::debug!(store_id = store.id, name = %store.name, "Store created");

    Ok((
        StatusCode::CREATED,
        Json(StoreResponse {
            id: store.id,
            name: store.name,
            items: Vec::new(),
            tags: Vec::new(),
        }),
    ))
}

pub async fn get_store(
    State(state): State<AppState>,
    Path(store_id): Path<i64>,
) -> ApiResult<Json<StoreResponse>> {
    let store = Store::find_by_id(&state.db, store_id)
        .await?
        .ok_or_else(store_not_found)?;

    let items = Item::list_by_store(&state.db, store.id).await?;
    let tags = Tag::list_by_store(&state.db, store.id).await?;

    Ok(Json(StoreResponse {
        id: store.id,
        name: store.name,
        items: items.into_iter().map(PlainItem::from).collect(),
        tags: tags.into_iter().map(PlainTag::from).collect(),
    }))
}

/// Renames the store if it exists, otherwise creates it with this ID
///
/// # Errors
///
/// - `409 Conflict`: Name already taken by another store
pub async fn upsert_store(
    State(state): State<AppState>,
    Path(store_id): Path<i64>,
    payload: Result<Json<StoreRequest>, JsonRejection>,
) -> ApiResult<Json<Store>> {
    let Json(req) = payload?;
    req.validate()?;

    let conflict = |e: sqlx::Error| ApiError::from(e).on_conflict(DUPLICATE_NAME);

    let mut tx = state.db.begin().await?;
    let store = match Store::rename(&mut *tx, store_id, &req.name)
        .await
        .map_err(conflict)?
    {
        Some(store) => store,
        None => Store::create_with_id(&mut *tx, store_id, &req.name)
            .await
            .map_err(conflict)?,
    };
    tx.commit().await?;

    Ok(Json(store))
}

/// Deletes the store; its items, tags and their links go with it
pub async fn delete_store(
    State(state): State<AppState>,
    Path(store_id): Path<i64>,
) -> ApiResult<StatusCode> {
    if !Store::delete(&state.db, store_id).await? {
        return Err(store_not_found());
    }

    tracing::info!(store_id, "Store deleted");

    Ok(StatusCode::NO_CONTENT)
}
