//! Book and book ↔ genre methods on Repository

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection};

use super::Repository;
use crate::{
    error::AppResult,
    models::{plan_genre_sync, AuditFields, Book, BookDraft, BookGenre, Genre, GenrePivot},
};

/// Internal row structure for genre + association queries
#[derive(Debug, FromRow)]
struct BookGenreRow {
    id: i64,
    name: String,
    description: Option<String>,
    created_by: i64,
    updated_by: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    pivot_book_id: i64,
    pivot_created_by: i64,
    pivot_updated_by: i64,
    pivot_created_at: DateTime<Utc>,
    pivot_updated_at: DateTime<Utc>,
}

impl From<BookGenreRow> for BookGenre {
    fn from(row: BookGenreRow) -> Self {
        BookGenre {
            pivot: GenrePivot {
                book_id: row.pivot_book_id,
                genre_id: row.id,
                created_by: row.pivot_created_by,
                updated_by: row.pivot_updated_by,
                created_at: row.pivot_created_at,
                updated_at: row.pivot_updated_at,
            },
            genre: Genre {
                id: row.id,
                name: row.name,
                description: row.description,
                created_by: row.created_by,
                updated_by: row.updated_by,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
        }
    }
}

/// Make the book's genre rows match `requested`.
///
/// Rows kept from before are not touched; new rows carry `audit`'s
/// `updated_by` / `updated_at` as both creation and modification stamps.
pub async fn sync_book_genres(
    conn: &mut PgConnection,
    book_id: i64,
    requested: &[i64],
    audit: &AuditFields,
) -> AppResult<()> {
    let current: Vec<i64> = sqlx::query_scalar("SELECT genre_id FROM book_genre WHERE book_id = $1")
        .bind(book_id)
        .fetch_all(&mut *conn)
        .await?;

    let plan = plan_genre_sync(&current, requested);
    if plan.is_noop() {
        return Ok(());
    }

    if !plan.detach.is_empty() {
        sqlx::query("DELETE FROM book_genre WHERE book_id = $1 AND genre_id = ANY($2)")
            .bind(book_id)
            .bind(&plan.detach)
            .execute(&mut *conn)
            .await?;
    }

    if !plan.attach.is_empty() {
        sqlx::query(
            r#"
            INSERT INTO book_genre (book_id, genre_id, created_by, updated_by, created_at, updated_at)
            SELECT $1, genre_id, $3, $3, COALESCE($4, NOW()), COALESCE($4, NOW())
            FROM UNNEST($2::BIGINT[]) AS genre_id
            "#,
        )
        .bind(book_id)
        .bind(&plan.attach)
        .bind(audit.updated_by)
        .bind(audit.updated_at)
        .execute(&mut *conn)
        .await?;
    }

    tracing::debug!(
        "Synced genres of book {}: +{:?} -{:?}",
        book_id,
        plan.attach,
        plan.detach
    );
    Ok(())
}

impl Repository {
    /// Insert a book, then sync its genres when a list was supplied, in one transaction
    pub async fn books_create(&self, draft: &BookDraft, genres: Option<&[i64]>) -> AppResult<Book> {
        let mut tx = self.pool.begin().await?;

        let book = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (title, slug, author_id, short_description, description, status,
                               cover_image, created_by, updated_by, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, COALESCE($6, TRUE), $7, $8, $9,
                    COALESCE($10, NOW()), COALESCE($11, NOW()))
            RETURNING *
            "#,
        )
        .bind(&draft.title)
        .bind(&draft.slug)
        .bind(draft.author_id)
        .bind(&draft.short_description)
        .bind(&draft.description)
        .bind(draft.status)
        .bind(&draft.cover_image)
        .bind(draft.audit.created_by)
        .bind(draft.audit.updated_by)
        .bind(draft.audit.created_at)
        .bind(draft.audit.updated_at)
        .fetch_one(&mut *tx)
        .await?;

        if let Some(genres) = genres {
            sync_book_genres(&mut *tx, book.id, genres, &draft.audit).await?;
        }

        tx.commit().await?;
        Ok(book)
    }

    /// Update a book and sync its genres in one transaction.
    ///
    /// Optional columns that were not supplied keep their stored value.
    /// Returns `None` (and writes nothing) when the book does not exist.
    pub async fn books_update(
        &self,
        id: i64,
        draft: &BookDraft,
        genres: Option<&[i64]>,
    ) -> AppResult<Option<Book>> {
        let mut tx = self.pool.begin().await?;

        let book = sqlx::query_as::<_, Book>(
            r#"
            UPDATE books
            SET title = $1,
                slug = $2,
                author_id = $3,
                short_description = COALESCE($4, short_description),
                description = COALESCE($5, description),
                status = COALESCE($6, status),
                cover_image = COALESCE($7, cover_image),
                updated_by = $8,
                updated_at = COALESCE($9, NOW())
            WHERE id = $10
            RETURNING *
            "#,
        )
        .bind(&draft.title)
        .bind(&draft.slug)
        .bind(draft.author_id)
        .bind(&draft.short_description)
        .bind(&draft.description)
        .bind(draft.status)
        .bind(&draft.cover_image)
        .bind(draft.audit.updated_by)
        .bind(draft.audit.updated_at)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(book) = book else {
            tx.rollback().await?;
            return Ok(None);
        };

        if let Some(genres) = genres {
            sync_book_genres(&mut *tx, book.id, genres, &draft.audit).await?;
        }

        tx.commit().await?;
        Ok(Some(book))
    }

    /// Genres attached to a book, each with its association row, in attach order
    pub async fn books_genres(&self, book_id: i64) -> AppResult<Vec<BookGenre>> {
        let rows = sqlx::query_as::<_, BookGenreRow>(
            r#"
            SELECT g.id, g.name, g.description, g.created_by, g.updated_by, g.created_at, g.updated_at,
                   bg.book_id AS pivot_book_id,
                   bg.created_by AS pivot_created_by,
                   bg.updated_by AS pivot_updated_by,
                   bg.created_at AS pivot_created_at,
                   bg.updated_at AS pivot_updated_at
            FROM book_genre bg
            JOIN genres g ON g.id = bg.genre_id
            WHERE bg.book_id = $1
            ORDER BY bg.id
            "#,
        )
        .bind(book_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(BookGenre::from).collect())
    }

    /// Delete a book's genre rows, then the book, in one transaction; `false` when no book matched
    pub async fn books_delete(&self, id: i64) -> AppResult<bool> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM book_genre WHERE book_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        tx.commit().await?;
        Ok(true)
    }
}
