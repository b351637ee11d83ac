//! Book ↔ genre association

use chrono::{DateTime, Utc};
use indexmap::IndexSet;
use serde::Serialize;
use utoipa::ToSchema;

use super::genre::Genre;

/// Association audit columns
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct GenrePivot {
    pub book_id: i64,
    pub genre_id: i64,
    pub created_by: i64,
    pub updated_by: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Genre attached to a book, with the association row
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct BookGenre {
    #[serde(flatten)]
    pub genre: Genre,
    pub pivot: GenrePivot,
}

/// Rows to remove and to add so a book's genres equal the requested set
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenreSyncPlan {
    pub attach: Vec<i64>,
    pub detach: Vec<i64>,
}

impl GenreSyncPlan {
    pub fn is_noop(&self) -> bool {
        self.attach.is_empty() && self.detach.is_empty()
    }
}

/// Diff the current association set against the requested one.
///
/// Genres present in both are left alone so their original stamps survive.
/// Duplicates in `requested` collapse to one row.
pub fn plan_genre_sync(current: &[i64], requested: &[i64]) -> GenreSyncPlan {
    let current: IndexSet<i64> = current.iter().copied().collect();
    let requested: IndexSet<i64> = requested.iter().copied().collect();

    GenreSyncPlan {
        attach: requested.difference(&current).copied().collect(),
        detach: current.difference(&requested).copied().collect(),
    }
}
