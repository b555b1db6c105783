//! Shared response shape for recipe reads, with the per-viewer
//! `is_favorited` / `is_in_shopping_cart` flags.

use crate::models::Recipe;
use crate::schema::{cart_recipes, carts, favorites, ingredients, recipe_ingredients, recipe_tags, tags};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use std::collections::HashSet;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecipeAuthorView {
    pub id: Uuid,
    pub username: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecipeTagView {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecipeIngredientView {
    /// Ingredient catalog id
    pub id: Uuid,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i32,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecipeView {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub cooking_time_minutes: i32,
    pub image_url: Option<String>,
    pub author: RecipeAuthorView,
    pub tags: Vec<RecipeTagView>,
    pub ingredients: Vec<RecipeIngredientView>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
    pub created_at: DateTime<Utc>,
}

/// Assemble full views for the given (recipe, author username) rows, with
/// membership flags computed for `viewer_id`. Associations are batch-loaded
/// in one query per table regardless of how many recipes are passed.
pub fn load_recipe_views(
    conn: &mut PgConnection,
    viewer_id: Uuid,
    recipes: Vec<(Recipe, String)>,
) -> Result<Vec<RecipeView>, diesel::result::Error> {
    if recipes.is_empty() {
        return Ok(Vec::new());
    }

    let recipe_ids: Vec<Uuid> = recipes.iter().map(|(r, _)| r.id).collect();

    let tag_rows: Vec<(Uuid, Uuid, String, String)> = recipe_tags::table
        .inner_join(tags::table)
        .filter(recipe_tags::recipe_id.eq_any(&recipe_ids))
        .select((recipe_tags::recipe_id, tags::id, tags::name, tags::slug))
        .order(tags::name.asc())
        .load(conn)?;

    let ingredient_rows: Vec<(Uuid, Uuid, String, String, i32)> = recipe_ingredients::table
        .inner_join(ingredients::table)
        .filter(recipe_ingredients::recipe_id.eq_any(&recipe_ids))
        .select((
            recipe_ingredients::recipe_id,
            ingredients::id,
            ingredients::name,
            ingredients::measurement_unit,
            recipe_ingredients::amount,
        ))
        .order(recipe_ingredients::id.asc())
        .load(conn)?;

    let favorited: HashSet<Uuid> = favorites::table
        .filter(favorites::user_id.eq(viewer_id))
        .filter(favorites::recipe_id.eq_any(&recipe_ids))
        .select(favorites::recipe_id)
        .load::<Uuid>(conn)?
        .into_iter()
        .collect();

    let in_cart: HashSet<Uuid> = cart_recipes::table
        .inner_join(carts::table)
        .filter(carts::user_id.eq(viewer_id))
        .filter(cart_recipes::recipe_id.eq_any(&recipe_ids))
        .select(cart_recipes::recipe_id)
        .load::<Uuid>(conn)?
        .into_iter()
        .collect();

    let views = recipes
        .into_iter()
        .map(|(recipe, author_username)| {
            let tags = tag_rows
                .iter()
                .filter(|(recipe_id, ..)| *recipe_id == recipe.id)
                .map(|(_, id, name, slug)| RecipeTagView {
                    id: *id,
                    name: name.clone(),
                    slug: slug.clone(),
                })
                .collect();

            let ingredients = ingredient_rows
                .iter()
                .filter(|(recipe_id, ..)| *recipe_id == recipe.id)
                .map(|(_, id, name, unit, amount)| RecipeIngredientView {
                    id: *id,
                    name: name.clone(),
                    measurement_unit: unit.clone(),
                    amount: *amount,
                })
                .collect();

            RecipeView {
                id: recipe.id,
                name: recipe.name,
                description: recipe.description,
                cooking_time_minutes: recipe.cooking_time_minutes,
                image_url: recipe.image_url,
                author: RecipeAuthorView {
                    id: recipe.author_id,
                    username: author_username,
                },
                tags,
                ingredients,
                is_favorited: favorited.contains(&recipe.id),
                is_in_shopping_cart: in_cart.contains(&recipe.id),
                created_at: recipe.created_at,
            }
        })
        .collect();

    Ok(views)
}
