//! Inventory catalog with self-maintaining categories.
//!
//! Items carry a free-text category label on input. The write path maps each
//! label onto a single canonical [`Category`], creating it on first use, and
//! categories can only be deleted once no item references them.

pub mod categories;
pub mod config;
pub mod db;
pub mod error;
pub mod http;
pub mod id;
pub mod items;
pub mod logging;
pub mod migrate;
pub mod model;
pub mod repo;
pub mod seed;
pub mod state;
pub mod time;
pub mod util;
pub mod validate;

pub use categories::{delete_category, list_categories, resolve_category};
pub use error::{AppError, AppResult, ErrorKind};
pub use items::{create_item, delete_item, get_item, list_items, list_items_vec, update_item};
pub use model::{Category, Item, ItemDetail, ItemFields, ItemSummary};
pub use validate::{validate_item, ValidationError};
