//! API handlers for Libris REST endpoints

pub mod auth;
pub mod authors;
pub mod books;
pub mod genres;
pub mod health;
pub mod openapi;

use axum::{
    async_trait,
    extract::{DefaultBodyLimit, FromRequest, FromRequestParts},
    http::request::Parts,
    routing::{get, post},
    Router,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use serde::{Deserialize, Serialize};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    models::{catalog::ID_NOT_INTEGER_MESSAGE, LooseInt, Parsed, User},
    AppState,
};

/// User resolved from the request's bearer token
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: User,
    /// Plain token that authenticated the request
    pub token: String,
}

/// Extractor for the authenticated user from a personal access token
pub struct AuthenticatedUser(pub CurrentUser);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|e| AppError::Unauthenticated(e.to_string()))?;

        let token = bearer.token().to_string();
        let user = state.services.auth.resolve_token(&token).await?;

        Ok(AuthenticatedUser(CurrentUser { user, token }))
    }
}

/// JSON body whose rejections use the API error envelope
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct JsonBody<T>(pub T);

/// Query string whose rejections use the API error envelope
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct QueryParams<T>(pub T);

/// Path parameters whose rejections use the API error envelope
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct PathParam<T>(pub T);

/// Success envelope
#[derive(Debug, Serialize)]
pub struct DataResponse<T> {
    pub data: T,
}

impl<T> DataResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// Delete request body
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct DeleteRequest {
    /// Number, or text holding one
    #[schema(value_type = Option<i64>)]
    pub id: Option<LooseInt>,
}

impl DeleteRequest {
    /// Record to delete; `None` when no id was sent
    pub fn id(&self) -> AppResult<Option<i64>> {
        match self.id.as_ref().map(LooseInt::parse) {
            None | Some(Parsed::Missing) => Ok(None),
            Some(Parsed::Value(id)) => Ok(Some(id)),
            Some(Parsed::Invalid) => Err(AppError::invalid("id", ID_NOT_INTEGER_MESSAGE)),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeletedResponse {
    pub id: i64,
    pub deleted: bool,
}

impl DeletedResponse {
    pub fn new(id: i64) -> Self {
        Self { id, deleted: true }
    }
}

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let body_limit = state.config.body_limit_bytes();
    let storage_root = state.config.storage.root.clone();

    let api = Router::new()
        .route("/health", get(health::health_check))
        // Authentication
        .route("/login", post(auth::login))
        .route("/auth/user", get(auth::current_user))
        // Authors
        .route("/authors", get(authors::list_authors))
        .route("/authors/view/:id", get(authors::view_author))
        .route("/authors/store", post(authors::store_author))
        .route("/authors/update", post(authors::update_author))
        .route("/authors/delete", post(authors::delete_author))
        // Genres
        .route("/genres", get(genres::list_genres))
        .route("/genres/view/:id", get(genres::view_genre))
        .route("/genres/store", post(genres::store_genre))
        .route("/genres/update", post(genres::update_genre))
        .route("/genres/delete", post(genres::delete_genre))
        // Books
        .route("/books", get(books::list_books))
        .route("/books/get", get(books::list_books_authenticated))
        .route("/books/view/:id", get(books::view_book))
        .route("/books/store", post(books::store_book))
        .route("/books/update", post(books::update_book))
        .route("/books/delete", post(books::delete_book))
        .with_state(state);

    Router::new()
        .nest("/api", api)
        .nest_service("/storage", ServeDir::new(storage_root))
        .merge(openapi::create_openapi_router())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
