//! Business logic services

pub mod auth;
pub mod books;
pub mod catalog;
pub mod covers;
pub mod storage;

use std::sync::Arc;

use crate::{
    config::AppConfig,
    models::{Author, Genre},
    repository::Repository,
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub auth: auth::AuthService,
    pub authors: catalog::NamedCatalogService<Author>,
    pub genres: catalog::NamedCatalogService<Genre>,
    pub books: books::BookService,
}

impl Services {
    /// Create all services with the given repository and blob store
    pub fn new(repository: Repository, config: &AppConfig, blobs: Arc<dyn storage::BlobStore>) -> Self {
        let max_page_size = config.catalog.max_page_size;
        let covers = covers::CoverImages::new(blobs, config.storage.max_upload_size_kb);

        Self {
            auth: auth::AuthService::new(repository.clone(), config.auth.clone()),
            authors: catalog::NamedCatalogService::new(repository.clone(), max_page_size),
            genres: catalog::NamedCatalogService::new(repository.clone(), max_page_size),
            books: books::BookService::new(repository, covers, max_page_size),
        }
    }
}
