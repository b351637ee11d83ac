//! Genre model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::catalog::{CatalogEntity, NamedEntity, NAMED_SORTABLE};

/// Genre record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Genre {
    pub id: i64,
    /// Unique among genres (checked by the service, not by a table constraint)
    pub name: String,
    pub description: Option<String>,
    pub created_by: i64,
    pub updated_by: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CatalogEntity for Genre {
    const TABLE: &'static str = "genres";
    const LABEL: &'static str = "Genre";
    const SEARCH_COLUMN: &'static str = "name";
    const SORTABLE: &'static [&'static str] = NAMED_SORTABLE;
    const DEFAULT_LIMIT: i64 = 10;

    fn id(&self) -> i64 {
        self.id
    }
}

impl NamedEntity for Genre {
    const UNIQUE_NAME: bool = true;
}
