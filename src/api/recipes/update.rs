use crate::api::{ApiError, ErrorResponse};
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::models::{NewRecipeIngredient, NewRecipeTag, User};
use crate::schema::{recipe_ingredients, recipe_tags, recipes};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use axum::Json;
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use std::sync::Arc;
use uuid::Uuid;

use super::create::{map_association_error, validate_recipe_fields, CreateRecipeRequest};

pub(super) fn ensure_can_mutate(user: &User, author_id: Uuid) -> Result<(), ApiError> {
    if user.id != author_id && !user.is_admin {
        return Err(ApiError::forbidden(
            "Only the author or an administrator can modify this recipe",
        ));
    }
    Ok(())
}

#[utoipa::path(
    put,
    path = "/api/recipes/{id}",
    tag = "recipes",
    params(
        ("id" = Uuid, Path, description = "Recipe ID")
    ),
    request_body = CreateRecipeRequest,
    responses(
        (status = 200, description = "Recipe updated"),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 403, description = "Not the author", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_recipe(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<Uuid>,
    Json(request): Json<CreateRecipeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_recipe_fields(&request.name, request.cooking_time_minutes, &request.ingredients)?;

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

    // Scalar fields and association rows are replaced atomically
    let result: Result<(), DieselError> = conn.transaction(|conn| {
        diesel::update(recipes::table.find(id))
            .set((
                recipes::name.eq(request.name.trim()),
                recipes::description.eq(&request.description),
                recipes::cooking_time_minutes.eq(request.cooking_time_minutes),
                recipes::image_url.eq(request.image_url.as_deref()),
            ))
            .execute(conn)?;

        diesel::delete(recipe_ingredients::table.filter(recipe_ingredients::recipe_id.eq(id)))
            .execute(conn)?;
        let ingredient_rows: Vec<NewRecipeIngredient> = request
            .ingredients
            .iter()
            .map(|i| NewRecipeIngredient {
                recipe_id: id,
                ingredient_id: i.id,
                amount: i.amount,
            })
            .collect();
        diesel::insert_into(recipe_ingredients::table)
            .values(&ingredient_rows)
            .execute(conn)?;

        diesel::delete(recipe_tags::table.filter(recipe_tags::recipe_id.eq(id))).execute(conn)?;
        if !request.tags.is_empty() {
            let tag_rows: Vec<NewRecipeTag> = request
                .tags
                .iter()
                .map(|tag_id| NewRecipeTag {
                    recipe_id: id,
                    tag_id: *tag_id,
                })
                .collect();
            diesel::insert_into(recipe_tags::table)
                .values(&tag_rows)
                .execute(conn)?;
        }

        Ok(())
    });

    result.map_err(map_association_error)?;

    Ok(StatusCode::OK)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user(id: Uuid, is_admin: bool) -> User {
        User {
            id,
            username: "u".to_string(),
            password_hash: String::new(),
            is_admin,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn author_can_mutate() {
        let id = Uuid::new_v4();
        assert!(ensure_can_mutate(&user(id, false), id).is_ok());
    }

    #[test]
    fn admin_can_mutate_anyones_recipe() {
        assert!(ensure_can_mutate(&user(Uuid::new_v4(), true), Uuid::new_v4()).is_ok());
    }

    #[test]
    fn stranger_cannot_mutate() {
        let err = ensure_can_mutate(&user(Uuid::new_v4(), false), Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));
    }
}
