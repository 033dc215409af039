use sqlx::SqlitePool;

/// Shared handles for request handlers.
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
}

impl AppState {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool_clone(&self) -> SqlitePool {
        self.pool.clone()
    }
}
