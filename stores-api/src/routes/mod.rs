/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Registration, login, logout and token refresh
/// - `users`: User lookup and admin deletion
/// - `stores`: Store CRUD
/// - `items`: Item CRUD
/// - `tags`: Per-store tags and item/tag links
///
/// The `Plain*` views are the flat shapes used when one resource is nested
/// inside another, so responses never recurse.

pub mod auth;
pub mod health;
pub mod items;
pub mod stores;
pub mod tags;
pub mod users;

use serde::{Deserialize, Serialize};
use stores_shared::models::{Item, Store, Tag};

/// Store without its relations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlainStore {
    pub id: i64,
    pub name: String,
}

impl From<Store> for PlainStore {
    fn from(store: Store) -> Self {
        Self {
            id: store.id,
            name: store.name,
        }
    }
}

/// Item without its relations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlainItem {
    pub id: i64,
    pub name: String,
    pub price: f64,
}

impl From<Item> for PlainItem {
    fn from(item: Item) -> Self {
        Self {
            id: item.id,
            name: item.name,
            price: item.price,
        }
    }
}

/// Tag without its relations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlainTag {
    pub id: i64,
    pub name: String,
}

impl From<Tag> for PlainTag {
    fn from(tag: Tag) -> Self {
        Self {
            id: tag.id,
            name: tag.name,
        }
    }
}

/// Response for simple acknowledgements, e.g. `{"message": "Item deleted."}`
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
