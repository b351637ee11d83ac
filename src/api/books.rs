//! Book API endpoints

use axum::{
    async_trait,
    extract::{FromRequest, Request, State},
    http::{header::CONTENT_TYPE, StatusCode},
    Json,
};
use axum_extra::extract::Multipart;

use crate::{
    error::{AppError, AppResult},
    models::{BookForm, BookInput, BookPage, BookResource, ListQuery, LooseFlag, LooseInt, Page},
    services::covers::CoverUpload,
    AppState,
};

use super::{AuthenticatedUser, DataResponse, DeleteRequest, DeletedResponse, JsonBody, PathParam, QueryParams};

/// Book create / update body, sent as JSON or as `multipart/form-data`.
///
/// Only multipart bodies can carry a `cover_image` file. Genres are sent as
/// repeated `genres[]` (or `genres`) parts in multipart form.
pub struct BookPayload {
    pub input: BookInput,
    pub cover: Option<CoverUpload>,
}

#[async_trait]
impl FromRequest<AppState> for BookPayload {
    type Rejection = AppError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.starts_with("multipart/form-data"))
            .unwrap_or(false);

        if !is_multipart {
            let JsonBody(input) = JsonBody::<BookInput>::from_request(req, state).await?;
            return Ok(BookPayload { input, cover: None });
        }

        let multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        read_multipart(multipart).await
    }
}

async fn read_multipart(mut multipart: Multipart) -> AppResult<BookPayload> {
    let mut form = BookForm::default();
    let mut cover = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Failed to read multipart data: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();

        if name == "cover_image" {
            let file_name = field.file_name().map(|s| s.to_string());
            let content_type = field.content_type().map(|s| s.to_string());
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(format!("Failed to read cover image: {}", e)))?;

            // Browsers send an empty part when no file was chosen
            if bytes.is_empty() && file_name.as_deref().map_or(true, str::is_empty) {
                continue;
            }
            cover = Some(CoverUpload {
                file_name,
                content_type,
                bytes: bytes.to_vec(),
            });
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read field {}: {}", name, e)))?;

        match name.as_str() {
            "id" => form.id = Some(LooseInt::Text(value)),
            "title" => form.title = Some(value),
            "slug" => form.slug = Some(value),
            "author_id" => form.author_id = Some(LooseInt::Text(value)),
            "short_description" => form.short_description = Some(value),
            "description" => form.description = Some(value),
            "status" => form.status = Some(LooseFlag::Text(value)),
            "genres" | "genres[]" => form
                .genres
                .get_or_insert_with(Vec::new)
                .push(LooseInt::Text(value)),
            other => tracing::debug!("Ignoring multipart field {}", other),
        }
    }

    Ok(BookPayload {
        input: form.into(),
        cover,
    })
}

/// List books
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    params(ListQuery),
    responses(
        (status = 200, description = "Paginated books with their authors", body = BookPage),
        (status = 422, description = "Unknown sort field or order", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_books(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<ListQuery>,
) -> AppResult<Json<Page<BookResource>>> {
    let page = state.services.books.list(&query).await?;
    Ok(Json(page))
}

/// List books (authenticated)
#[utoipa::path(
    get,
    path = "/books/get",
    tag = "books",
    security(("bearer_auth" = [])),
    params(ListQuery),
    responses(
        (status = 200, description = "Paginated books with their authors", body = BookPage),
        (status = 401, description = "Missing or invalid token", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_books_authenticated(
    State(state): State<AppState>,
    AuthenticatedUser(_current): AuthenticatedUser,
    QueryParams(query): QueryParams<ListQuery>,
) -> AppResult<Json<Page<BookResource>>> {
    let page = state.services.books.list(&query).await?;
    Ok(Json(page))
}

/// Get book by ID, with author and genres
#[utoipa::path(
    get,
    path = "/books/view/{id}",
    tag = "books",
    params(("id" = i64, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book, wrapped in `data`", body = BookResource),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn view_book(
    State(state): State<AppState>,
    PathParam(id): PathParam<i64>,
) -> AppResult<Json<DataResponse<BookResource>>> {
    let book = state.services.books.view(id).await?;
    Ok(Json(DataResponse::new(book)))
}

/// Create book
#[utoipa::path(
    post,
    path = "/books/store",
    tag = "books",
    security(("bearer_auth" = [])),
    request_body(content = BookInput, description = "JSON, or multipart/form-data with an optional `cover_image` file"),
    responses(
        (status = 201, description = "Book created, wrapped in `data`", body = BookResource),
        (status = 422, description = "Invalid input", body = crate::error::ErrorResponse)
    )
)]
pub async fn store_book(
    State(state): State<AppState>,
    AuthenticatedUser(current): AuthenticatedUser,
    payload: BookPayload,
) -> AppResult<(StatusCode, Json<DataResponse<BookResource>>)> {
    let book = state
        .services
        .books
        .create(payload.input, payload.cover, current.user.id)
        .await?;
    Ok((StatusCode::CREATED, Json(DataResponse::new(book))))
}

/// Update book (id in body)
#[utoipa::path(
    post,
    path = "/books/update",
    tag = "books",
    security(("bearer_auth" = [])),
    request_body(content = BookInput, description = "JSON, or multipart/form-data with an optional `cover_image` file"),
    responses(
        (status = 200, description = "Book updated, wrapped in `data`", body = BookResource),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse),
        (status = 422, description = "Invalid input", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_book(
    State(state): State<AppState>,
    AuthenticatedUser(current): AuthenticatedUser,
    payload: BookPayload,
) -> AppResult<Json<DataResponse<BookResource>>> {
    let book = state
        .services
        .books
        .update(payload.input, payload.cover, current.user.id)
        .await?;
    Ok(Json(DataResponse::new(book)))
}

/// Delete book (id in body), its genre links and its cover image
#[utoipa::path(
    post,
    path = "/books/delete",
    tag = "books",
    security(("bearer_auth" = [])),
    request_body = DeleteRequest,
    responses(
        (status = 200, description = "Book deleted", body = DeletedResponse),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_book(
    State(state): State<AppState>,
    AuthenticatedUser(current): AuthenticatedUser,
    JsonBody(request): JsonBody<DeleteRequest>,
) -> AppResult<Json<DataResponse<DeletedResponse>>> {
    let id = state.services.books.delete(request.id()?).await?;
    tracing::debug!("Book {} removed by user {}", id, current.user.id);
    Ok(Json(DataResponse::new(DeletedResponse::new(id))))
}
