use crate::api::{ApiError, ErrorResponse};
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::models::{NewRecipe, NewRecipeIngredient, NewRecipeTag};
use crate::schema::{recipe_ingredients, recipe_tags, recipes};
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use super::validate::{validate_amount, validate_cooking_time};

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RecipeIngredientInput {
    /// Ingredient catalog id
    pub id: Uuid,
    pub amount: i32,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateRecipeRequest {
    pub name: String,
    pub description: String,
    pub cooking_time_minutes: i32,
    pub image_url: Option<String>,
    pub ingredients: Vec<RecipeIngredientInput>,
    #[serde(default)]
    pub tags: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CreateRecipeResponse {
    pub id: Uuid,
}

pub(super) fn validate_recipe_fields(
    name: &str,
    cooking_time_minutes: i32,
    ingredients: &[RecipeIngredientInput],
) -> Result<(), ApiError> {
    if name.trim().is_empty() {
        return Err(ApiError::validation("name", "Name cannot be empty"));
    }
    validate_cooking_time(cooking_time_minutes)?;
    if ingredients.is_empty() {
        return Err(ApiError::validation(
            "ingredients",
            "At least one ingredient is required",
        ));
    }
    for ingredient in ingredients {
        validate_amount(ingredient.amount)?;
    }
    Ok(())
}

/// Map association-insert failures: an unknown ingredient or tag id trips the
/// foreign key, which is a caller mistake rather than a server fault.
pub(super) fn map_association_error(e: DieselError) -> ApiError {
    match e {
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
            ApiError::validation("ingredients", "Unknown ingredient or tag reference")
        }
        e => {
            tracing::error!("Failed to save recipe: {}", e);
            ApiError::internal()
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/recipes",
    tag = "recipes",
    request_body = CreateRecipeRequest,
    responses(
        (status = 201, description = "Recipe created successfully", body = CreateRecipeResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_recipe(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Json(request): Json<CreateRecipeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_recipe_fields(&request.name, request.cooking_time_minutes, &request.ingredients)?;

    let mut conn = get_conn!(pool);

    // Recipe plus its association rows are created atomically
    let result: Result<Uuid, DieselError> = conn.transaction(|conn| {
        let recipe_id: Uuid = diesel::insert_into(recipes::table)
            .values(&NewRecipe {
                author_id: user.id,
                name: request.name.trim(),
                description: &request.description,
                cooking_time_minutes: request.cooking_time_minutes,
                image_url: request.image_url.as_deref(),
            })
            .returning(recipes::id)
            .get_result(conn)?;

        let ingredient_rows: Vec<NewRecipeIngredient> = request
            .ingredients
            .iter()
            .map(|i| NewRecipeIngredient {
                recipe_id,
                ingredient_id: i.id,
                amount: i.amount,
            })
            .collect();
        diesel::insert_into(recipe_ingredients::table)
            .values(&ingredient_rows)
            .execute(conn)?;

        if !request.tags.is_empty() {
            let tag_rows: Vec<NewRecipeTag> = request
                .tags
                .iter()
                .map(|tag_id| NewRecipeTag {
                    recipe_id,
                    tag_id: *tag_id,
                })
                .collect();
            diesel::insert_into(recipe_tags::table)
                .values(&tag_rows)
                .execute(conn)?;
        }

        Ok(recipe_id)
    });

    let recipe_id = result.map_err(map_association_error)?;

    Ok((
        StatusCode::CREATED,
        Json(CreateRecipeResponse { id: recipe_id }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(amount: i32) -> RecipeIngredientInput {
        RecipeIngredientInput {
            id: Uuid::new_v4(),
            amount,
        }
    }

    #[test]
    fn accepts_a_recipe_at_the_cooking_time_ceiling() {
        assert!(validate_recipe_fields("Stew", 600, &[input(100)]).is_ok());
    }

    #[test]
    fn rejects_cooking_time_out_of_bounds() {
        assert!(validate_recipe_fields("Stew", 601, &[input(100)]).is_err());
        assert!(validate_recipe_fields("Stew", 0, &[input(100)]).is_err());
    }

    #[test]
    fn rejects_empty_ingredient_list() {
        let err = validate_recipe_fields("Stew", 30, &[]).unwrap_err();
        assert!(matches!(
            err,
            ApiError::Validation {
                field: Some("ingredients"),
                ..
            }
        ));
    }

    #[test]
    fn rejects_out_of_bounds_amount() {
        assert!(validate_recipe_fields("Stew", 30, &[input(0)]).is_err());
        assert!(validate_recipe_fields("Stew", 30, &[input(10001)]).is_err());
    }

    #[test]
    fn foreign_key_violation_is_a_validation_error() {
        let e = DieselError::DatabaseError(
            DatabaseErrorKind::ForeignKeyViolation,
            Box::new("violates foreign key constraint".to_string()),
        );
        assert!(matches!(
            map_association_error(e),
            ApiError::Validation { .. }
        ));
    }
}
