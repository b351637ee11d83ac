//! Author model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::catalog::{CatalogEntity, NamedEntity, NAMED_SORTABLE};

/// Author record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Author {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub created_by: i64,
    pub updated_by: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CatalogEntity for Author {
    const TABLE: &'static str = "authors";
    const LABEL: &'static str = "Author";
    const SEARCH_COLUMN: &'static str = "name";
    const SORTABLE: &'static [&'static str] = NAMED_SORTABLE;
    const DEFAULT_LIMIT: i64 = 10;

    fn id(&self) -> i64 {
        self.id
    }
}

impl NamedEntity for Author {
    // Several authors may share a name
    const UNIQUE_NAME: bool = false;
}
