mod from_row;
mod schema;
pub mod queries;

pub use schema::init_db;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

pub type DbPool = Pool<SqliteConnectionManager>;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    /// Session lifetime in seconds for newly issued tokens.
    pub session_ttl_secs: i64,
}

pub fn create_pool(database_path: &str) -> Result<DbPool, r2d2::Error> {
    // Foreign keys are per-connection in SQLite, so every pooled connection
    // needs the pragma for ON DELETE CASCADE to hold.
    let manager = SqliteConnectionManager::file(database_path)
        .with_init(|conn| conn.execute_batch("PRAGMA foreign_keys = ON;"));
    Pool::builder().max_size(10).build(manager)
}
