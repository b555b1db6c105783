use crate::api::{conflict_on_unique, ApiError, ErrorResponse};
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::models::NewFavorite;
use crate::schema::{favorites, recipes};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

/// The created favorite association
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FavoriteView {
    pub id: Uuid,
    pub recipe_id: Uuid,
}

#[utoipa::path(
    post,
    path = "/api/recipes/{id}/favorite",
    tag = "favorites",
    params(
        ("id" = Uuid, Path, description = "Recipe ID")
    ),
    responses(
        (status = 201, description = "Recipe added to favorites", body = FavoriteView),
        (status = 404, description = "Recipe not found", body = ErrorResponse),
        (status = 409, description = "Recipe already favorited", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn add_favorite(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_conn!(pool);

    let exists: bool = diesel::select(diesel::dsl::exists(
        recipes::table.filter(recipes::id.eq(id)),
    ))
    .get_result(&mut conn)
    .map_err(|e| {
        tracing::error!("Failed to check recipe existence: {}", e);
        ApiError::internal()
    })?;
    if !exists {
        return Err(ApiError::not_found("Recipe not found"));
    }

    let favorite_id: Uuid = diesel::insert_into(favorites::table)
        .values(&NewFavorite {
            user_id: user.id,
            recipe_id: id,
        })
        .returning(favorites::id)
        .get_result(&mut conn)
        .map_err(|e| conflict_on_unique(e, "Recipe is already in favorites."))?;

    Ok((
        StatusCode::CREATED,
        Json(FavoriteView {
            id: favorite_id,
            recipe_id: id,
        }),
    ))
}

#[utoipa::path(
    delete,
    path = "/api/recipes/{id}/favorite",
    tag = "favorites",
    params(
        ("id" = Uuid, Path, description = "Recipe ID")
    ),
    responses(
        (status = 204, description = "Recipe removed from favorites"),
        (status = 404, description = "Recipe not favorited", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn remove_favorite(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_conn!(pool);

    let deleted = diesel::delete(
        favorites::table
            .filter(favorites::user_id.eq(user.id))
            .filter(favorites::recipe_id.eq(id)),
    )
    .execute(&mut conn)
    .map_err(|e: DieselError| {
        tracing::error!("Failed to remove favorite: {}", e);
        ApiError::internal()
    })?;

    if deleted == 0 {
        return Err(ApiError::not_found("No recipe in favorites."));
    }

    Ok(StatusCode::NO_CONTENT)
}
