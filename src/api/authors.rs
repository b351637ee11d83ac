//! Author API endpoints

use axum::{extract::State, http::StatusCode, Json};

use crate::{
    error::AppResult,
    models::{Author, AuthorPage, ListQuery, NamedInput, Page},
};

use super::{AuthenticatedUser, DataResponse, DeleteRequest, DeletedResponse, JsonBody, PathParam, QueryParams};

/// List authors
#[utoipa::path(
    get,
    path = "/authors",
    tag = "authors",
    params(ListQuery),
    responses(
        (status = 200, description = "Paginated authors", body = AuthorPage),
        (status = 422, description = "Unknown sort field or order", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_authors(
    State(state): State<crate::AppState>,
    QueryParams(query): QueryParams<ListQuery>,
) -> AppResult<Json<Page<Author>>> {
    let page = state.services.authors.list(&query).await?;
    Ok(Json(page))
}

/// Get author by ID
#[utoipa::path(
    get,
    path = "/authors/view/{id}",
    tag = "authors",
    params(("id" = i64, Path, description = "Author ID")),
    responses(
        (status = 200, description = "Author, wrapped in `data`", body = Author),
        (status = 404, description = "Author not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn view_author(
    State(state): State<crate::AppState>,
    PathParam(id): PathParam<i64>,
) -> AppResult<Json<DataResponse<Author>>> {
    let author = state.services.authors.view(id).await?;
    Ok(Json(DataResponse::new(author)))
}

/// Create author
#[utoipa::path(
    post,
    path = "/authors/store",
    tag = "authors",
    security(("bearer_auth" = [])),
    request_body = NamedInput,
    responses(
        (status = 201, description = "Author created, wrapped in `data`", body = Author),
        (status = 422, description = "Invalid input", body = crate::error::ErrorResponse)
    )
)]
pub async fn store_author(
    State(state): State<crate::AppState>,
    AuthenticatedUser(current): AuthenticatedUser,
    JsonBody(input): JsonBody<NamedInput>,
) -> AppResult<(StatusCode, Json<DataResponse<Author>>)> {
    let author = state.services.authors.create(input, current.user.id).await?;
    Ok((StatusCode::CREATED, Json(DataResponse::new(author))))
}

/// Update author (id in body)
#[utoipa::path(
    post,
    path = "/authors/update",
    tag = "authors",
    security(("bearer_auth" = [])),
    request_body = NamedInput,
    responses(
        (status = 200, description = "Author updated, wrapped in `data`", body = Author),
        (status = 404, description = "Author not found", body = crate::error::ErrorResponse),
        (status = 422, description = "Invalid input", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_author(
    State(state): State<crate::AppState>,
    AuthenticatedUser(current): AuthenticatedUser,
    JsonBody(input): JsonBody<NamedInput>,
) -> AppResult<Json<DataResponse<Author>>> {
    let author = state.services.authors.update(input, current.user.id).await?;
    Ok(Json(DataResponse::new(author)))
}

/// Delete author (id in body)
#[utoipa::path(
    post,
    path = "/authors/delete",
    tag = "authors",
    security(("bearer_auth" = [])),
    request_body = DeleteRequest,
    responses(
        (status = 200, description = "Author deleted", body = DeletedResponse),
        (status = 404, description = "Author not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Author still has books", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_author(
    State(state): State<crate::AppState>,
    AuthenticatedUser(current): AuthenticatedUser,
    JsonBody(request): JsonBody<DeleteRequest>,
) -> AppResult<Json<DataResponse<DeletedResponse>>> {
    let id = state.services.authors.delete(request.id()?).await?;
    tracing::debug!("Author {} removed by user {}", id, current.user.id);
    Ok(Json(DataResponse::new(DeletedResponse::new(id))))
}
