//! Shopping-cart core: reading a user's cart snapshot, aggregating
//! ingredient amounts across its recipes, and rendering the exportable
//! spreadsheet.

pub mod aggregate;
pub mod export;
pub mod xlsx;

use crate::schema::{cart_recipes, carts, ingredients, recipe_ingredients, recipes, users};
use diesel::prelude::*;
use uuid::Uuid;

/// One (ingredient, amount) pair belonging to one recipe in a user's cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    pub ingredient: String,
    pub unit: String,
    pub amount: u32,
}

/// A recipe in a user's cart with its ingredient line items, in insertion order.
#[derive(Debug, Clone)]
pub struct CartRecipe {
    pub id: Uuid,
    pub name: String,
    pub author: String,
    pub description: String,
    pub cooking_time_minutes: i32,
    pub lines: Vec<CartLine>,
}

/// Fetch the recipes currently in `user_id`'s cart, ordered by publication
/// time, each with its ingredient line items. Returns an empty vec for an
/// empty cart; the caller decides whether that is an error.
pub fn fetch_cart_lines(
    conn: &mut PgConnection,
    user_id: Uuid,
) -> Result<Vec<CartRecipe>, diesel::result::Error> {
    let recipe_rows: Vec<(Uuid, String, String, String, i32)> = cart_recipes::table
        .inner_join(carts::table)
        .inner_join(recipes::table.inner_join(users::table))
        .filter(carts::user_id.eq(user_id))
        .select((
            recipes::id,
            recipes::name,
            users::username,
            recipes::description,
            recipes::cooking_time_minutes,
        ))
        .order((recipes::created_at.asc(), recipes::id.asc()))
        .load(conn)?;

    if recipe_rows.is_empty() {
        return Ok(Vec::new());
    }

    let recipe_ids: Vec<Uuid> = recipe_rows.iter().map(|(id, ..)| *id).collect();

    // One query for all line items, grouped in memory per recipe
    let line_rows: Vec<(Uuid, String, String, i32)> = recipe_ingredients::table
        .inner_join(ingredients::table)
        .filter(recipe_ingredients::recipe_id.eq_any(&recipe_ids))
        .select((
            recipe_ingredients::recipe_id,
            ingredients::name,
            ingredients::measurement_unit,
            recipe_ingredients::amount,
        ))
        .order(recipe_ingredients::id.asc())
        .load(conn)?;

    let mut cart: Vec<CartRecipe> = recipe_rows
        .into_iter()
        .map(
            |(id, name, author, description, cooking_time_minutes)| CartRecipe {
                id,
                name,
                author,
                description,
                cooking_time_minutes,
                lines: Vec::new(),
            },
        )
        .collect();

    for (recipe_id, ingredient, unit, amount) in line_rows {
        if let Some(recipe) = cart.iter_mut().find(|r| r.id == recipe_id) {
            recipe.lines.push(CartLine {
                ingredient,
                unit,
                // amounts are constrained to 1..=10000 by the schema
                amount: amount.max(0) as u32,
            });
        }
    }

    Ok(cart)
}
