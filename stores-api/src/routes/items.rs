/// Item endpoints
///
/// - `GET /item` - List items with their store and tags
/// - `POST /item` - Create an item in an existing store
/// - `GET /item/:item_id` - Get one item
/// - `PUT /item/:item_id` - Update an item, or create it under that ID
/// - `DELETE /item/:item_id` - Delete an item (admin only)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidationErrorDetail},
    routes::{stores::store_not_found, MessageResponse, PlainStore, PlainTag},
};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use stores_shared::{
    auth::{authorization::require_admin, middleware::AuthContext},
    models::{CreateItem, Item, Store, Tag, UpdateItem},
};
use validator::Validate;

/// Item with its store and tags
#[derive(Debug, Serialize, Deserialize)]
pub struct ItemResponse {
    pub id: i64,
    pub name: String,
    pub price: f64,
    pub store: PlainStore,
    pub tags: Vec<PlainTag>,
}

impl ItemResponse {
    fn new(item: Item, store: PlainStore, tags: Vec<PlainTag>) -> Self {
        Self {
            id: item.id,
            name: item.name,
            price: item.price,
            store,
            tags,
        }
    }
}

/// Create item request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateItemRequest {
    #[validate(length(min = 1, message = "Item name is required"))]
    pub name: String,

    pub price: f64,

    pub store_id: i64,
}

/// Upsert item request
///
/// All fields are optional when the item exists. To create, `name`, `price`
/// and `store_id` are required, plus `store.name` if that store does not
/// exist yet.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpsertItemRequest {
    #[validate(length(min = 1, message = "Item name must not be empty"))]
    pub name: Option<String>,

    pub price: Option<f64>,

    pub store_id: Option<i64>,

    /// Placeholder store created along with the item
    pub store: Option<PlaceholderStore>,
}

#[derive(Debug, Deserialize)]
pub struct PlaceholderStore {
    pub name: String,
}

fn item_not_found() -> ApiError {
    ApiError::NotFound("Item not found.".to_string())
}

fn dangling_store(item: &Item) -> ApiError {
    ApiError::InternalError(format!(
        "Item {} references missing store {}",
        item.id, item.store_id
    ))
}

fn missing_field(field: &str) -> ValidationErrorDetail {
    ValidationErrorDetail {
        field: field.to_string(),
        message: format!("{} is required to create an item", field),
    }
}

pub async fn list_items(State(state): State<AppState>) -> ApiResult<Json<Vec<ItemResponse>>> {
    let items = Item::list(&state.db).await?;

    let stores: HashMap<i64, PlainStore> = Store::list(&state.db)
        .await?
        .into_iter()
        .map(|store| (store.id, store.into()))
        .collect();

    let tags: HashMap<i64, PlainTag> = Tag::list(&state.db)
        .await?
        .into_iter()
        .map(|tag| (tag.id, tag.into()))
        .collect();

    let mut item_tags: HashMap<i64, Vec<PlainTag>> = HashMap::new();
    for link in Tag::list_links(&state.db).await? {
        if let Some(tag) = tags.get(&link.tag_id) {
            item_tags.entry(link.item_id).or_default().push(tag.clone());
        }
    }

    let response = items
        .into_iter()
        .map(|item| {
            let store = stores
                .get(&item.store_id)
                .cloned()
                .ok_or_else(|| dangling_store(&item))?;
            let tags = item_tags.remove(&item.id).unwrap_or_default();
            Ok(ItemResponse::new(item, store, tags))
        })
        .collect::<ApiResult<Vec<_>>>()?;

    Ok(Json(response))
}

/// # Errors
///
/// - `404 Not Found`: `store_id` does not name a store
pub async fn create_item(
    State(state): State<AppState>,
    payload: Result<Json<CreateItemRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<ItemResponse>)> {
    let Json(req) = payload?;
    req.validate()?;

    let store = Store::find_by_id(&state.db, req.store_id)
        .await?
        .ok_or_else(store_not_found)?;

    let item = Item::create(
        &state.db,
        CreateItem {
            name: req.name,
            price: req.price,
            store_id: store.id,
        },
    )
    .await?;

    tracing::debug!(item_id = item.id, store_id = store.id, "Item created");

    Ok((
        StatusCode::CREATED,
        Json(ItemResponse::new(item, store.into(), Vec::new())),
    ))
}

pub async fn get_item(
    State(state): State<AppState>,
    Path(item_id): Path<i64>,
) -> ApiResult<Json<ItemResponse>> {
    let item = Item::find_by_id(&state.db, item_id)
        .await?
        .ok_or_else(item_not_found)?;

    let store = Store::find_by_id(&state.db, item.store_id)
        .await?
        .ok_or_else(|| dangling_store(&item))?;

    let tags = Tag::list_by_item(&state.db, item.id).await?;

    Ok(Json(ItemResponse::new(
        item,
        store.into(),
        tags.into_iter().map(PlainTag::from).collect(),
    )))
}

/// Updates the item if it exists, otherwise creates it with this ID
///
/// A missing store is created from `store.name` in the same transaction.
///
/// # Errors
///
/// - `400 Bad Request`: Creating into a missing store without `store.name`
/// - `404 Not Found`: Moving an existing item to a missing store
/// - `409 Conflict`: Placeholder store name already taken
/// - `422 Unprocessable Entity`: Creating without name, price or store_id
pub async fn upsert_item(
    State(state): State<AppState>,
    Path(item_id): Path<i64>,
    payload: Result<Json<UpsertItemRequest>, JsonRejection>,
) -> ApiResult<Json<Item>> {
    let Json(req) = payload?;
    req.validate()?;

    let mut tx = state.db.begin().await?;

    let item = if let Some(existing) = Item::find_by_id(&mut *tx, item_id).await? {
        if let Some(store_id) = req.store_id {
            Store::find_by_id(&mut *tx, store_id)
                .await?
                .ok_or_else(store_not_found)?;
        }

        let update = UpdateItem {
            name: req.name,
            price: req.price,
            store_id: req.store_id,
        };

        if update.is_empty() {
            return Ok(Json(existing));
        }

        let item = Item::update(&mut *tx, item_id, update)
            .await?
            .ok_or_else(item_not_found)?;

        if req.store_id.is_some_and(|store_id| store_id != existing.store_id) {
            let dropped = Tag::unlink_foreign_tags(&mut *tx, item.id).await?;
            if dropped > 0 {
                tracing::debug!(item_id, dropped, "Dropped tags from previous store");
            }
        }

        item
    } else {
        let (name, price, store_id) = match (req.name, req.price, req.store_id) {
            (Some(name), Some(price), Some(store_id)) => (name, price, store_id),
            (name, price, store_id) => {
                let mut missing = Vec::new();
                if name.is_none() {
                    missing.push(missing_field("name"));
                }
                if price.is_none() {
                    missing.push(missing_field("price"));
                }
                if store_id.is_none() {
                    missing.push(missing_field("store_id"));
                }
                return Err(ApiError::ValidationError(missing));
            }
        };

        if Store::find_by_id(&mut *tx, store_id).await?.is_none() {
            let placeholder = req
                .store
                .map(|store| store.name)
                .filter(|name| !name.is_empty() && name.chars().count() <= 50)
                .ok_or_else(|| {
                    ApiError::BadRequest(
                        "store.name (1-50 characters) is required to create the store.".to_string(),
                    )
                })?;

            Store::create_with_id(&mut *tx, store_id, &placeholder)
                .await
                .map_err(|e| {
                    ApiError::from(e).on_conflict("A store with that name already exists.")
                })?;

            tracing::debug!(store_id, "Placeholder store created");
        }

        Item::create_with_id(
            &mut *tx,
            item_id,
            CreateItem {
                name,
                price,
                store_id,
            },
        )
        .await?
    };

    tx.commit().await?;

    Ok(Json(item))
}

/// # Errors
///
/// - `401 Unauthorized`: Caller is not an admin
/// - `404 Not Found`: No such item
pub async fn delete_item(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(item_id): Path<i64>,
) -> ApiResult<Json<MessageResponse>> {
    require_admin(&auth)?;

    if !Item::delete(&state.db, item_id).await? {
        return Err(item_not_found());
    }

    tracing::info!(item_id, deleted_by = auth.user_id, "Item deleted");

    Ok(Json(MessageResponse::new("Item deleted.")))
}
