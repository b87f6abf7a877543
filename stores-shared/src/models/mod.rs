/// Database models
///
/// Each model owns its SQL. Functions accept any SQLite executor so they can
/// run against the pool or inside a transaction (`&mut *tx`).
///
/// # Models
///
/// - `store`: Stores, which own items and tags
/// - `item`: Priced items belonging to a store
/// - `tag`: Per-store tags and the item/tag association
/// - `user`: User accounts with Argon2id password hashes

pub mod item;
pub mod store;
pub mod tag;
pub mod user;

pub use item::{CreateItem, Item, UpdateItem};
pub use store::Store;
pub use tag::{ItemTag, Tag};
pub use user::{CreateUser, User};
