/// Tag endpoints
///
/// - `GET /store/:store_id/tag` - List a store's tags
/// - `POST /store/:store_id/tag` - Create a tag in a store
/// - `GET /tag/:tag_id` - Get one tag with its items
/// - `DELETE /tag/:tag_id` - Delete a tag that no item carries
/// - `POST /item/:item_id/tag/:tag_id` - Attach a tag to an item
/// - `DELETE /item/:item_id/tag/:tag_id` - Detach a tag from an item
///
/// Links only ever join an item and a tag of the same store.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::{stores::store_not_found, PlainItem, PlainStore, PlainTag},
};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use sqlx::SqliteConnection;
use stores_shared::models::{Item, Store, Tag};
use validator::Validate;

/// Tag with its store and items
#[derive(Debug, Serialize, Deserialize)]
pub struct TagResponse {
    pub id: i64,
    pub name: String,
    pub store: PlainStore,
    pub items: Vec<PlainItem>,
}

/// Create tag request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTagRequest {
    #[validate(length(min = 1, max = 80, message = "Tag name must be 1-80 characters"))]
    pub name: String,
}

/// Response for a removed link
#[derive(Debug, Serialize, Deserialize)]
pub struct UnlinkResponse {
    pub message: String,
    pub item: PlainItem,
    pub tag: PlainTag,
}

/// Response for a deleted tag, returned with 202
#[derive(Debug, Serialize, Deserialize)]
pub struct TagDeletedResponse {
    pub message: String,
}

fn tag_not_found() -> ApiError {
    ApiError::NotFound("Tag not found.".to_string())
}

fn item_not_found() -> ApiError {
    ApiError::NotFound("Item not found.".to_string())
}

fn different_stores() -> ApiError {
    ApiError::BadRequest("Item and tag belong to different stores.".to_string())
}

/// Builds the nested view of a tag
async fn tag_response(conn: &mut SqliteConnection, tag: Tag) -> ApiResult<TagResponse> {
    let store = Store::find_by_id(&mut *conn, tag.store_id)
        .await?
        .ok_or_else(|| {
            ApiError::InternalError(format!(
                "Tag {} references missing store {}",
                tag.id, tag.store_id
            ))
        })?;

    let items = Item::list_by_tag(&mut *conn, tag.id).await?;

    Ok(TagResponse {
        id: tag.id,
        name: tag.name,
        store: store.into(),
        items: items.into_iter().map(PlainItem::from).collect(),
    })
}

/// Loads both ends of a link, rejecting pairs from different stores
async fn load_link_ends(
    conn: &mut SqliteConnection,
    item_id: i64,
    tag_id: i64,
) -> ApiResult<(Item, Tag)> {
    let item = Item::find_by_id(&mut *conn, item_id)
        .await?
        .ok_or_else(item_not_found)?;
    let tag = Tag::find_by_id(&mut *conn, tag_id)
        .await?
        .ok_or_else(tag_not_found)?;

    if item.store_id != tag.store_id {
        return Err(different_stores());
    }

    Ok((item, tag))
}

pub async fn list_store_tags(
    State(state): State<AppState>,
    Path(store_id): Path<i64>,
) -> ApiResult<Json<Vec<TagResponse>>> {
    let mut conn = state.db.acquire().await?;

    Store::find_by_id(&mut *conn, store_id)
        .await?
        .ok_or_else(store_not_found)?;

    let tags = Tag::list_by_store(&mut *conn, store_id).await?;

    let mut response = Vec::with_capacity(tags.len());
    for tag in tags {
        response.push(tag_response(&mut conn, tag).await?);
    }

    Ok(Json(response))
}

/// # Errors
///
/// - `404 Not Found`: No such store
/// - `409 Conflict`: The store already has a tag with this name
pub async fn create_tag(
    State(state): State<AppState>,
    Path(store_id): Path<i64>,
    payload: Result<Json<CreateTagRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<TagResponse>)> {
    const DUPLICATE: &str = "A tag with that name already exists in that store.";

    let Json(req) = payload?;
    req.validate()?;

    let store = Store::find_by_id(&state.db, store_id)
        .await?
        .ok_or_else(store_not_found)?;

    if Tag::find_by_store_and_name(&state.db, store_id, &req.name)
        .await?
        .is_some()
    {
        return Err(ApiError::Conflict(DUPLICATE.to_string()));
    }

    let tag = Tag::create(&state.db, store_id, &req.name)
        .await
        .map_err(|e| ApiError::from(e).on_conflict(DUPLICATE))?;

    tracing::debug!(tag_id = tag.id, store_id, "Tag created");

    Ok((
        StatusCode::CREATED,
        Json(TagResponse {
            id: tag.id,
            name: tag.name,
            store: store.into(),
            items: Vec::new(),
        }),
    ))
}

pub async fn get_tag(
    State(state): State<AppState>,
    Path(tag_id): Path<i64>,
) -> ApiResult<Json<TagResponse>> {
    let mut conn = state.db.acquire().await?;

    let tag = Tag::find_by_id(&mut *conn, tag_id)
        .await?
        .ok_or_else(tag_not_found)?;

    Ok(Json(tag_response(&mut conn, tag).await?))
}

/// # Errors
///
/// - `400 Bad Request`: The tag is still attached to an item
/// - `404 Not Found`: No such tag
pub async fn delete_tag(
    State(state): State<AppState>,
    Path(tag_id): Path<i64>,
) -> ApiResult<(StatusCode, Json<TagDeletedResponse>)> {
    if !Tag::delete_unlinked(&state.db, tag_id).await? {
        // Nothing deleted: either the tag is gone or it is still linked
        Tag::find_by_id(&state.db, tag_id)
            .await?
            .ok_or_else(tag_not_found)?;

        return Err(ApiError::BadRequest(
            "Could not delete tag. Make sure tag is not associated with any items, then try again."
                .to_string(),
        ));
    }

    tracing::info!(tag_id, "Tag deleted");

    Ok((
        StatusCode::ACCEPTED,
        Json(TagDeletedResponse {
            message: "Tag deleted.".to_string(),
        }),
    ))
}

/// # Errors
///
/// - `400 Bad Request`: Different stores, or already linked
/// - `404 Not Found`: No such item or tag
pub async fn link_tag(
    State(state): State<AppState>,
    Path((item_id, tag_id)): Path<(i64, i64)>,
) -> ApiResult<(StatusCode, Json<TagResponse>)> {
    let mut tx = state.db.begin().await?;

    let (_, tag) = load_link_ends(&mut tx, item_id, tag_id).await?;

    if !Tag::link_item(&mut *tx, item_id, tag_id).await? {
        return Err(ApiError::BadRequest(
            "Item is already linked to this tag.".to_string(),
        ));
    }

    let response = tag_response(&mut tx, tag).await?;
    tx.commit().await?;

    tracing::debug!(item_id, tag_id, "Tag linked to item");

    Ok((StatusCode::CREATED, Json(response)))
}

/// The store check runs before the link check, so a cross-store pair is
/// rejected whether or not a link row exists.
///
/// # Errors
///
/// - `400 Bad Request`: Different stores, or not linked
/// - `404 Not Found`: No such item or tag
pub async fn unlink_tag(
    State(state): State<AppState>,
    Path((item_id, tag_id)): Path<(i64, i64)>,
) -> ApiResult<Json<UnlinkResponse>> {
    let mut tx = state.db.begin().await?;

    let (item, tag) = load_link_ends(&mut tx, item_id, tag_id).await?;

    if !Tag::unlink_item(&mut *tx, item_id, tag_id).await? {
        return Err(ApiError::BadRequest(
            "Item is not linked to this tag.".to_string(),
        ));
    }

    tx.commit().await?;

    tracing::debug!(item_id, tag_id, "Tag unlinked from item");

    Ok(Json(UnlinkResponse {
        message: "Item removed from tag.".to_string(),
        item: item.into(),
        tag: tag.into(),
    }))
}
