//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, authors, books, genres, health};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Libris API",
        version = "0.1.0",
        description = "Library catalog REST API: authors, genres and books"
    ),
    servers(
        (url = "/api", description = "API")
    ),
    paths(
        // Health
        health::health_check,
        // Auth
        auth::login,
        auth::current_user,
        // Authors
        authors::list_authors,
        authors::view_author,
        authors::store_author,
        authors::update_author,
        authors::delete_author,
        // Genres
        genres::list_genres,
        genres::view_genre,
        genres::store_genre,
        genres::update_genre,
        genres::delete_genre,
        // Books
        books::list_books,
        books::list_books_authenticated,
        books::view_book,
        books::store_book,
        books::update_book,
        books::delete_book,
    ),
    components(
        schemas(
            crate::models::LoginRequest,
            crate::models::UserProfile,
            crate::models::Author,
            crate::models::Genre,
            crate::models::NamedInput,
            crate::models::BookInput,
            crate::models::BookResource,
            crate::models::BookGenre,
            crate::models::GenrePivot,
            crate::models::PageMeta,
            crate::models::AuthorPage,
            crate::models::GenrePage,
            crate::models::BookPage,
            crate::models::ListQuery,
            super::DeleteRequest,
            super::DeletedResponse,
            health::HealthResponse,
            crate::error::ErrorResponse,
        )
    ),
    modifiers(&BearerSecurity),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "authors", description = "Author management"),
        (name = "genres", description = "Genre management"),
        (name = "books", description = "Book management")
    )
)]
pub struct ApiDoc;

/// Registers the `bearer_auth` scheme referenced by protected paths
struct BearerSecurity;

impl Modify for BearerSecurity {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
            );
        }
    }
}

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_catalog_paths() {
        let doc = ApiDoc::openapi();
        for path in ["/login", "/authors", "/genres/update", "/books/view/{id}", "/books/get"] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }

        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
        assert!(components.schemas.contains_key("BookPage"));
    }
}
