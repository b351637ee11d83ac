//! Data models for Libris

pub mod audit;
pub mod author;
pub mod book;
pub mod book_genre;
pub mod catalog;
pub mod genre;
pub mod loose;
pub mod pagination;
pub mod user;

// Re-export commonly used types
pub use audit::{stamp_audit, AuditFields};
pub use author::Author;
pub use book::{Book, BookDraft, BookForm, BookInput, BookResource};
pub use book_genre::{plan_genre_sync, BookGenre, GenrePivot, GenreSyncPlan};
pub use catalog::{CatalogEntity, NamedDraft, NamedEntity, NamedForm, NamedInput};
pub use genre::Genre;
pub use loose::{LooseFlag, LooseInt, Parsed};
pub use pagination::{AuthorPage, BookPage, GenrePage, ListParams, ListQuery, Page, PageMeta, SortOrder};
pub use user::{AccessToken, LoginRequest, User, UserProfile, UserStatus};
