use std::sync::Arc;

use sqlx::SqlitePool;

use crate::validation::Schema;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub schema: Arc<Schema>,
}
