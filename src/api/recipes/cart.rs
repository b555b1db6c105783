use crate::api::{conflict_on_unique, ApiError, ErrorResponse};
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::models::NewCartRecipe;
use crate::schema::{cart_recipes, carts, recipes};
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

/// The created cart membership association
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CartMembershipView {
    pub id: Uuid,
    pub recipe_id: Uuid,
}

fn recipe_must_exist(conn: &mut PgConnection, recipe_id: Uuid) -> Result<(), ApiError> {
    let exists: bool = diesel::select(diesel::dsl::exists(
        recipes::table.filter(recipes::id.eq(recipe_id)),
    ))
    .get_result(conn)
    .map_err(|e| {
        tracing::error!("Failed to check recipe existence: {}", e);
        ApiError::internal()
    })?;

    if !exists {
        return Err(ApiError::not_found("Recipe not found"));
    }
    Ok(())
}

fn cart_id_for_user(conn: &mut PgConnection, user_id: Uuid) -> Result<Uuid, ApiError> {
    // Every account gets its cart at signup; a missing row is a provisioning bug
    carts::table
        .filter(carts::user_id.eq(user_id))
        .select(carts::id)
        .first(conn)
        .map_err(|e| {
            tracing::error!("No cart row for user {}: {}", user_id, e);
            ApiError::internal()
        })
}

#[utoipa::path(
    post,
    path = "/api/recipes/{id}/cart",
    tag = "cart",
    params(
        ("id" = Uuid, Path, description = "Recipe ID")
    ),
    responses(
        (status = 201, description = "Recipe added to shopping cart", body = CartMembershipView),
        (status = 404, description = "Recipe not found", body = ErrorResponse),
        (status = 409, description = "Recipe already in cart", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn add_to_cart(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_conn!(pool);

    recipe_must_exist(&mut conn, id)?;
    let cart_id = cart_id_for_user(&mut conn, user.id)?;

    // No pre-check for an existing row: the uniqueness constraint is the
    // arbiter, so two racing adds produce exactly one row and one Conflict
    let membership_id: Uuid = diesel::insert_into(cart_recipes::table)
        .values(&NewCartRecipe {
            cart_id,
            recipe_id: id,
        })
        .returning(cart_recipes::id)
        .get_result(&mut conn)
        .map_err(|e| conflict_on_unique(e, "The recipe is already in your shopping cart."))?;

    Ok((
        StatusCode::CREATED,
        Json(CartMembershipView {
            id: membership_id,
            recipe_id: id,
        }),
    ))
}

#[utoipa::path(
    delete,
    path = "/api/recipes/{id}/cart",
    tag = "cart",
    params(
        ("id" = Uuid, Path, description = "Recipe ID")
    ),
    responses(
        (status = 204, description = "Recipe removed from shopping cart"),
        (status = 404, description = "Recipe not in cart", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn remove_from_cart(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_conn!(pool);

    let cart_id = cart_id_for_user(&mut conn, user.id)?;

    let deleted = diesel::delete(
        cart_recipes::table
            .filter(cart_recipes::cart_id.eq(cart_id))
            .filter(cart_recipes::recipe_id.eq(id)),
    )
    .execute(&mut conn)
    .map_err(|e: DieselError| {
        tracing::error!("Failed to remove recipe from cart: {}", e);
        ApiError::internal()
    })?;

    if deleted == 0 {
        return Err(ApiError::not_found("No recipe in shopping cart."));
    }

    Ok(StatusCode::NO_CONTENT)
}
