use crate::api::{ApiError, ErrorResponse};
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::models::Recipe;
use crate::schema::{recipes, users};
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use diesel::prelude::*;
use std::sync::Arc;
use uuid::Uuid;

use super::view::{load_recipe_views, RecipeView};

#[utoipa::path(
    get,
    path = "/api/recipes/{id}",
    tag = "recipes",
    params(
        ("id" = Uuid, Path, description = "Recipe ID")
    ),
    responses(
        (status = 200, description = "Recipe", body = RecipeView),
        (status = 404, description = "Recipe not found", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_recipe(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_conn!(pool);

    let row: (Recipe, String) = recipes::table
        .inner_join(users::table)
        .filter(recipes::id.eq(id))
        .select((Recipe::as_select(), users::username))
        .first(&mut conn)
        .map_err(|e| match e {
            diesel::result::Error::NotFound => ApiError::not_found("Recipe not found"),
            e => {
                tracing::error!("Failed to fetch recipe: {}", e);
                ApiError::internal()
            }
        })?;

    let mut views = load_recipe_views(&mut conn, user.id, vec![row]).map_err(|e| {
        tracing::error!("Failed to load recipe details: {}", e);
        ApiError::internal()
    })?;

    // load_recipe_views returns exactly one view for one input row
    let view = views.pop().ok_or_else(ApiError::internal)?;

    Ok(Json(view))
}
