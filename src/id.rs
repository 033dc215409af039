use uuid::Uuid;

use crate::{error::STORE_CAST, AppError, AppResult};

/// Fresh record identifier. UUIDv7 keeps insertion order roughly sortable.
pub fn new_uuid_v7() -> String {
    Uuid::now_v7().to_string()
}

/// Parse a caller-supplied record id into its canonical form.
///
/// A value that is not a UUID can never name a stored record; it is reported
/// as a store cast failure rather than as a missing record.
#[allow(clippy::result_large_err)]
pub fn parse_record_id(value: &str, table: &str) -> AppResult<String> {
    Uuid::parse_str(value.trim())
        .map(|id| id.to_string())
        .map_err(|err| {
            AppError::new(
                STORE_CAST,
                format!("Cast to id failed for value \"{value}\" in {table}"),
            )
            .with_context("table", table.to_string())
            .with_context("value", value.to_string())
            .with_context("error", err.to_string())
        })
}
