//! Genre API endpoints

use axum::{extract::State, http::StatusCode, Json};

use crate::{
    error::AppResult,
    models::{Genre, GenrePage, ListQuery, NamedInput, Page},
};

use super::{AuthenticatedUser, DataResponse, DeleteRequest, DeletedResponse, JsonBody, PathParam, QueryParams};

/// List genres
#[utoipa::path(
    get,
    path = "/genres",
    tag = "genres",
    params(ListQuery),
    responses(
        (status = 200, description = "Paginated genres", body = GenrePage),
        (status = 422, description = "Unknown sort field or order", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_genres(
    State(state): State<crate::AppState>,
    QueryParams(query): QueryParams<ListQuery>,
) -> AppResult<Json<Page<Genre>>> {
    let page = state.services.genres.list(&query).await?;
    Ok(Json(page))
}

/// Get genre by ID
#[utoipa::path(
    get,
    path = "/genres/view/{id}",
    tag = "genres",
    params(("id" = i64, Path, description = "Genre ID")),
    responses(
        (status = 200, description = "Genre, wrapped in `data`", body = Genre),
        (status = 404, description = "Genre not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn view_genre(
    State(state): State<crate::AppState>,
    PathParam(id): PathParam<i64>,
) -> AppResult<Json<DataResponse<Genre>>> {
    let genre = state.services.genres.view(id).await?;
    Ok(Json(DataResponse::new(genre)))
}

/// Create genre
#[utoipa::path(
    post,
    path = "/genres/store",
    tag = "genres",
    security(("bearer_auth" = [])),
    request_body = NamedInput,
    responses(
        (status = 201, description = "Genre created, wrapped in `data`", body = Genre),
        (status = 422, description = "Invalid input", body = crate::error::ErrorResponse)
    )
)]
pub async fn store_genre(
    State(state): State<crate::AppState>,
    AuthenticatedUser(current): AuthenticatedUser,
    JsonBody(input): JsonBody<NamedInput>,
) -> AppResult<(StatusCode, Json<DataResponse<Genre>>)> {
    let genre = state.services.genres.create(input, current.user.id).await?;
    Ok((StatusCode::CREATED, Json(DataResponse::new(genre))))
}

/// Update genre (id in body)
#[utoipa::path(
    post,
    path = "/genres/update",
    tag = "genres",
    security(("bearer_auth" = [])),
    request_body = NamedInput,
    responses(
        (status = 200, description = "Genre updated, wrapped in `data`", body = Genre),
        (status = 404, description = "Genre not found", body = crate::error::ErrorResponse),
        (status = 422, description = "Invalid input", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_genre(
    State(state): State<crate::AppState>,
    AuthenticatedUser(current): AuthenticatedUser,
    JsonBody(input): JsonBody<NamedInput>,
) -> AppResult<Json<DataResponse<Genre>>> {
    let genre = state.services.genres.update(input, current.user.id).await?;
    Ok(Json(DataResponse::new(genre)))
}

/// Delete genre (id in body)
#[utoipa::path(
    post,
    path = "/genres/delete",
    tag = "genres",
    security(("bearer_auth" = [])),
    request_body = DeleteRequest,
    responses(
        (status = 200, description = "Genre deleted", body = DeletedResponse),
        (status = 404, description = "Genre not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Genre still attached to books", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_genre(
    State(state): State<crate::AppState>,
    AuthenticatedUser(current): AuthenticatedUser,
    JsonBody(request): JsonBody<DeleteRequest>,
) -> AppResult<Json<DataResponse<DeletedResponse>>> {
    let id = state.services.genres.delete(request.id()?).await?;
    tracing::debug!("Genre {} removed by user {}", id, current.user.id);
    Ok(Json(DataResponse::new(DeletedResponse::new(id))))
}
