//! Repository layer for database operations

pub mod books;
pub mod catalog;
pub mod users;

use sqlx::{Pool, Postgres};

/// Main repository struct holding database connection pool.
///
/// Each domain adds its methods through its own `impl Repository` block.
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}
