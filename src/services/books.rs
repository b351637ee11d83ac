//! Book management: validation, cover images and genre synchronization

use std::collections::HashMap;

use chrono::Utc;

use super::covers::{CoverImages, CoverUpload, ImageKind};
use crate::{
    error::AppResult,
    models::{
        AuditFields, Author, Book, BookDraft, BookInput, BookResource, CatalogEntity, Genre, ListQuery, Page,
        User,
    },
    repository::Repository,
};

pub const SLUG_TAKEN_MESSAGE: &str = "The slug has already been taken.";
pub const UNKNOWN_AUTHOR_MESSAGE: &str = "The selected author id is invalid.";
pub const UNKNOWN_GENRES_MESSAGE: &str = "The selected genres are invalid.";

#[derive(Clone)]
pub struct BookService {
    repository: Repository,
    covers: CoverImages,
    max_page_size: i64,
}

impl BookService {
    pub fn new(repository: Repository, covers: CoverImages, max_page_size: i64) -> Self {
        Self {
            repository,
            covers,
            max_page_size,
        }
    }

    /// One page of books, each with its author
    pub async fn list(&self, query: &ListQuery) -> AppResult<Page<BookResource>> {
        let params = query.resolve::<Book>(self.max_page_size)?;
        let (books, total) = self.repository.catalog_list::<Book>(&params).await?;

        let mut author_ids: Vec<i64> = books.iter().map(|b| b.author_id).collect();
        author_ids.sort_unstable();
        author_ids.dedup();
        let authors: HashMap<i64, Author> = self
            .repository
            .catalog_find_many::<Author>(&author_ids)
            .await?
            .into_iter()
            .map(|a| (a.id, a))
            .collect();

        let user_ids: Vec<i64> = books.iter().flat_map(|b| [b.created_by, b.updated_by]).collect();
        let users = self.audit_users(user_ids).await?;

        let data = books
            .into_iter()
            .map(|book| {
                let author = authors.get(&book.author_id).cloned();
                let url = self.covers.url(book.cover_image.as_deref());
                BookResource::new(book, author, None, url).with_audit_users(&users)
            })
            .collect();

        Ok(Page::new(data, &params, total))
    }

    /// A book with its author and genres
    pub async fn view(&self, id: i64) -> AppResult<BookResource> {
        let book = self
            .repository
            .catalog_find::<Book>(id)
            .await?
            .ok_or_else(Book::not_found)?;
        self.resource(book).await
    }

    pub async fn create(
        &self,
        input: BookInput,
        cover: Option<CoverUpload>,
        acting_user_id: i64,
    ) -> AppResult<BookResource> {
        let input = input.normalized();
        let cover_kind = self.validate(&input, cover.as_ref(), None).await?;

        let cover_path = match (cover, cover_kind) {
            (Some(upload), Some(kind)) => Some(self.covers.store(upload, kind).await?),
            _ => None,
        };

        let draft = BookDraft::from_input(&input, cover_path.clone(), AuditFields::created(acting_user_id, Utc::now()))?;
        let book = match self.repository.books_create(&draft, input.genres.as_deref()).await {
            Ok(book) => book,
            Err(e) => {
                warn_orphan(cover_path.as_deref());
                return Err(e);
            }
        };

        tracing::info!("Book {} ({}) created by user {}", book.id, book.slug, acting_user_id);
        self.resource(book).await
    }

    /// Fields are validated before the book is looked up
    pub async fn update(
        &self,
        input: BookInput,
        cover: Option<CoverUpload>,
        acting_user_id: i64,
    ) -> AppResult<BookResource> {
        let input = input.normalized();
        let cover_kind = self.validate(&input, cover.as_ref(), input.id).await?;

        let id = input.id.ok_or_else(Book::not_found)?;
        let existing = self
            .repository
            .catalog_find::<Book>(id)
            .await?
            .ok_or_else(Book::not_found)?;

        let cover_path = match (cover, cover_kind) {
            (Some(upload), Some(kind)) => Some(
                self.covers
                    .replace(existing.cover_image.as_deref(), upload, kind)
                    .await?,
            ),
            _ => None,
        };

        let draft = BookDraft::from_input(&input, cover_path.clone(), AuditFields::updated(acting_user_id, Utc::now()))?;
        let book = match self
            .repository
            .books_update(id, &draft, input.genres.as_deref())
            .await
        {
            Ok(Some(book)) => book,
            Ok(None) => {
                warn_orphan(cover_path.as_deref());
                return Err(Book::not_found());
            }
            Err(e) => {
                warn_orphan(cover_path.as_deref());
                return Err(e);
            }
        };

        tracing::info!("Book {} updated by user {}", book.id, acting_user_id);
        self.resource(book).await
    }

    /// Remove the book and its genre rows, then its cover
    pub async fn delete(&self, id: Option<i64>) -> AppResult<i64> {
        let id = id.ok_or_else(Book::not_found)?;
        let book = self
            .repository
            .catalog_find::<Book>(id)
            .await?
            .ok_or_else(Book::not_found)?;

        if !self.repository.books_delete(id).await? {
            return Err(Book::not_found());
        }

        if let Some(path) = book.cover_image.as_deref() {
            self.covers.discard(path).await;
        }

        tracing::info!("Book {} deleted", id);
        Ok(id)
    }

    /// Collect every field error; returns the cover's file type when one was sent
    async fn validate(
        &self,
        input: &BookInput,
        cover: Option<&CoverUpload>,
        exclude_id: Option<i64>,
    ) -> AppResult<Option<ImageKind>> {
        let mut errors = input.field_errors();

        if let Some(slug) = input.slug.as_deref() {
            if self
                .repository
                .catalog_value_taken::<Book>("slug", slug, exclude_id)
                .await?
            {
                errors.add("slug", SLUG_TAKEN_MESSAGE);
            }
        }

        if let Some(author_id) = input.author_id {
            if !self.repository.catalog_exists::<Author>(author_id).await? {
                errors.add("author_id", UNKNOWN_AUTHOR_MESSAGE);
            }
        }

        if let Some(genres) = input.genres.as_deref() {
            let missing = self.repository.catalog_missing::<Genre>(genres).await?;
            if !missing.is_empty() {
                tracing::debug!("Unknown genre ids {:?}", missing);
                errors.add("genres", UNKNOWN_GENRES_MESSAGE);
            }
        }

        let mut kind = None;
        if let Some(upload) = cover {
            match self.covers.validate(upload) {
                Ok(k) => kind = Some(k),
                Err(messages) => {
                    for message in messages {
                        errors.add("cover_image", message);
                    }
                }
            }
        }

        errors.into_result()?;
        Ok(kind)
    }

    async fn resource(&self, book: Book) -> AppResult<BookResource> {
        let author = self.repository.catalog_find::<Author>(book.author_id).await?;
        let genres = self.repository.books_genres(book.id).await?;
        let users = self.audit_users(vec![book.created_by, book.updated_by]).await?;
        let url = self.covers.url(book.cover_image.as_deref());
        Ok(BookResource::new(book, author, Some(genres), url).with_audit_users(&users))
    }

    async fn audit_users(&self, mut ids: Vec<i64>) -> AppResult<HashMap<i64, User>> {
        ids.sort_unstable();
        ids.dedup();
        let users = self.repository.users_find_many(&ids).await?;
        Ok(users.into_iter().map(|u| (u.id, u)).collect())
    }
}

fn warn_orphan(path: Option<&str>) {
    if let Some(path) = path {
        tracing::warn!("Book write failed, cover image {} is orphaned", path);
    }
}
