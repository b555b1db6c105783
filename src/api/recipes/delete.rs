use crate::api::{ApiError, ErrorResponse};
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::schema::recipes;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use std::sync::Arc;
use uuid::Uuid;

use super::update::ensure_can_mutate;

#[utoipa::path(
    delete,
    path = "/api/recipes/{id}",
    tag = "recipes",
    params(
        ("id" = Uuid, Path, description = "Recipe ID")
    ),
    responses(
        (status = 204, description = "Recipe deleted"),
        (status = 403, description = "Not the author", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_recipe(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_conn!(pool);

    let author_id: Uuid = recipes::table
        .find(id)
        .select(recipes::author_id)
        .first(&mut conn)
        .map_err(|e| match e {
            DieselError::NotFound => ApiError::not_found("Recipe not found"),
            e => {
                tracing::error!("Failed to fetch recipe: {}", e);
                ApiError::internal()
            }
        })?;

    ensure_can_mutate(&user, author_id)?;

    // Association rows (ingredients, tags, cart/favorite memberships) go with
    // it via ON DELETE CASCADE
    diesel::delete(recipes::table.find(id))
        .execute(&mut conn)
        .map_err(|e| {
            tracing::error!("Failed to delete recipe: {}", e);
            ApiError::internal()
        })?;

    Ok(StatusCode::NO_CONTENT)
}
