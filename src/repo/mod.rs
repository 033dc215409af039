//! Raw store access. Functions here speak `sqlx::Error`; callers in
//! [`crate::categories`] and [`crate::items`] attach operation context.

pub mod categories;
pub mod items;

pub const CATEGORIES_TABLE: &str = "categories";
pub const ITEMS_TABLE: &str = "items";
