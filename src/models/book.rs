//! Book model and related types

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::{
    audit::AuditFields,
    author::Author,
    book_genre::BookGenre,
    catalog::{blank_to_none, CatalogEntity, ID_NOT_INTEGER_MESSAGE},
    loose::{flag_field, int_field, int_list_field, LooseFlag, LooseInt},
    user::{User, UserProfile},
};
use crate::error::{AppError, AppResult, FieldErrors};

pub const AUTHOR_ID_NOT_INTEGER_MESSAGE: &str = "The author id field must be an integer.";
pub const STATUS_NOT_FLAG_MESSAGE: &str = "The status field must be true or false.";
pub const GENRES_NOT_IDS_MESSAGE: &str = "The genres field must contain genre ids.";

/// Book record as stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub author_id: i64,
    pub short_description: Option<String>,
    pub description: Option<String>,
    /// Blob store path of the cover image
    pub cover_image: Option<String>,
    pub status: bool,
    pub created_by: i64,
    pub updated_by: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CatalogEntity for Book {
    const TABLE: &'static str = "books";
    const LABEL: &'static str = "Book";
    const SEARCH_COLUMN: &'static str = "title";
    const SORTABLE: &'static [&'static str] = &[
        "id",
        "title",
        "slug",
        "author_id",
        "status",
        "created_at",
        "updated_at",
    ];
    const DEFAULT_LIMIT: i64 = 12;

    fn id(&self) -> i64 {
        self.id
    }
}

/// Book as returned by the API
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookResource {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub author_id: i64,
    pub author: Option<Author>,
    pub short_description: Option<String>,
    pub description: Option<String>,
    /// Blob store path of the cover image
    pub cover_image: Option<String>,
    /// Public URL of the cover image
    pub cover_image_url: Option<String>,
    /// Only present when genres were loaded (single book views)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genres: Option<Vec<BookGenre>>,
    pub status: bool,
    pub created_by: i64,
    pub updated_by: i64,
    /// Account that created the book
    pub created_by_user: Option<UserProfile>,
    /// Account that last changed the book
    pub updated_by_user: Option<UserProfile>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BookResource {
    pub fn new(
        book: Book,
        author: Option<Author>,
        genres: Option<Vec<BookGenre>>,
        cover_image_url: Option<String>,
    ) -> Self {
        Self {
            id: book.id,
            title: book.title,
            slug: book.slug,
            author_id: book.author_id,
            author,
            short_description: book.short_description,
            description: book.description,
            cover_image: book.cover_image,
            cover_image_url,
            genres,
            status: book.status,
            created_by: book.created_by,
            updated_by: book.updated_by,
            created_by_user: None,
            updated_by_user: None,
            created_at: book.created_at,
            updated_at: book.updated_at,
        }
    }

    /// Embed the creating and updating accounts found in `users`
    pub fn with_audit_users(mut self, users: &HashMap<i64, User>) -> Self {
        self.created_by_user = users.get(&self.created_by).map(|u| UserProfile::new(u, None));
        self.updated_by_user = users.get(&self.updated_by).map(|u| UserProfile::new(u, None));
        self
    }
}

/// Book fields exactly as submitted, before numbers and flags are read
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookForm {
    pub id: Option<LooseInt>,
    pub title: Option<String>,
    pub slug: Option<String>,
    pub author_id: Option<LooseInt>,
    pub short_description: Option<String>,
    pub description: Option<String>,
    pub status: Option<LooseFlag>,
    pub genres: Option<Vec<LooseInt>>,
}

/// Create / update request fields for a book.
///
/// Arrives either as JSON or as multipart form fields (the cover image is
/// always a separate multipart file part). Numbers may be sent as strings;
/// values that cannot be read are kept in `rejected` and reported with the
/// other field errors.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(from = "BookForm")]
pub struct BookInput {
    /// Book to update or delete; ignored on create
    pub id: Option<i64>,
    #[validate(
        required(message = "The title field is required."),
        length(max = 255, message = "The title field must not be greater than 255 characters.")
    )]
    pub title: Option<String>,
    #[validate(
        required(message = "The slug field is required."),
        length(max = 255, message = "The slug field must not be greater than 255 characters.")
    )]
    pub slug: Option<String>,
    #[validate(required(message = "The author id field is required."))]
    pub author_id: Option<i64>,
    #[validate(length(
        max = 255,
        message = "The short description field must not be greater than 255 characters."
    ))]
    pub short_description: Option<String>,
    pub description: Option<String>,
    /// `true`/`false`, `1`/`0`
    pub status: Option<bool>,
    /// Genre ids; when present (even empty) the book's genres are synchronized to this set
    pub genres: Option<Vec<i64>>,
    #[serde(skip)]
    pub rejected: FieldErrors,
}

impl From<BookForm> for BookInput {
    fn from(form: BookForm) -> Self {
        let mut rejected = FieldErrors::new();
        let id = int_field(form.id, "id", ID_NOT_INTEGER_MESSAGE, &mut rejected);
        let author_id = int_field(form.author_id, "author_id", AUTHOR_ID_NOT_INTEGER_MESSAGE, &mut rejected);
        let status = flag_field(form.status, "status", STATUS_NOT_FLAG_MESSAGE, &mut rejected);
        let genres = int_list_field(form.genres, "genres", GENRES_NOT_IDS_MESSAGE, &mut rejected);

        Self {
            id,
            title: form.title,
            slug: form.slug,
            author_id,
            short_description: form.short_description,
            description: form.description,
            status,
            genres,
            rejected,
        }
    }
}

impl BookInput {
    /// Rule violations plus values that could not be read; an unreadable
    /// value reports its own message instead of "required"
    pub fn field_errors(&self) -> FieldErrors {
        let mut errors = match self.validate() {
            Ok(()) => FieldErrors::new(),
            Err(e) => FieldErrors::from(e),
        };
        errors.merge(self.rejected.clone());
        errors
    }

    /// Blank strings count as missing
    pub fn normalized(self) -> Self {
        Self {
            title: blank_to_none(self.title),
            slug: blank_to_none(self.slug),
            short_description: blank_to_none(self.short_description),
            description: blank_to_none(self.description),
            ..self
        }
    }
}

/// Validated values written to the books table
#[derive(Debug, Clone)]
pub struct BookDraft {
    pub title: String,
    pub slug: String,
    pub author_id: i64,
    pub short_description: Option<String>,
    pub description: Option<String>,
    pub status: Option<bool>,
    /// New cover path; `None` keeps the stored one on update
    pub cover_image: Option<String>,
    pub audit: AuditFields,
}

impl BookDraft {
    pub fn from_input(
        input: &BookInput,
        cover_image: Option<String>,
        audit: AuditFields,
    ) -> AppResult<Self> {
        let missing = |field: &str| AppError::Internal(format!("validated book input lacks {}", field));

        Ok(Self {
            title: input.title.clone().ok_or_else(|| missing("title"))?,
            slug: input.slug.clone().ok_or_else(|| missing("slug"))?,
            author_id: input.author_id.ok_or_else(|| missing("author_id"))?,
            short_description: input.short_description.clone(),
            description: input.description.clone(),
            status: input.status,
            cover_image,
            audit,
        })
    }
}
