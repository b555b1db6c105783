use crate::api::{ApiError, ErrorResponse};
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::models::Recipe;
use crate::schema::{cart_recipes, carts, favorites, recipe_tags, recipes, tags, users};
use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::view::{load_recipe_views, RecipeView};

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecipesListResponse {
    pub recipes: Vec<RecipeView>,
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct RecipesListQuery {
    /// Only recipes by this author
    pub author: Option<Uuid>,
    /// Only recipes carrying the tag with this slug
    pub tag: Option<String>,
    /// `true`: only recipes the caller has favorited
    pub is_favorited: Option<bool>,
    /// `true`: only recipes in the caller's shopping cart
    pub is_in_shopping_cart: Option<bool>,
}

/// Membership flags narrow the list only when explicitly `true`; absent and
/// `false` both mean "don't filter".
fn narrows(flag: Option<bool>) -> bool {
    flag == Some(true)
}

#[utoipa::path(
    get,
    path = "/api/recipes",
    tag = "recipes",
    params(RecipesListQuery),
    responses(
        (status = 200, description = "Recipes in publication order", body = RecipesListResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_recipes(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Query(query): Query<RecipesListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_conn!(pool);

    let mut db_query = recipes::table
        .inner_join(users::table)
        .select((Recipe::as_select(), users::username))
        .order((recipes::created_at.asc(), recipes::id.asc()))
        .into_boxed();

    if let Some(author_id) = query.author {
        db_query = db_query.filter(recipes::author_id.eq(author_id));
    }

    if let Some(slug) = query.tag.as_deref().filter(|s| !s.is_empty()) {
        let tagged = recipe_tags::table
            .inner_join(tags::table)
            .filter(tags::slug.eq(slug.to_owned()))
            .select(recipe_tags::recipe_id);
        db_query = db_query.filter(recipes::id.eq_any(tagged));
    }

    if narrows(query.is_favorited) {
        let favorited = favorites::table
            .filter(favorites::user_id.eq(user.id))
            .select(favorites::recipe_id);
        db_query = db_query.filter(recipes::id.eq_any(favorited));
    }

    if narrows(query.is_in_shopping_cart) {
        let in_cart = cart_recipes::table
            .inner_join(carts::table)
            .filter(carts::user_id.eq(user.id))
            .select(cart_recipes::recipe_id);
        db_query = db_query.filter(recipes::id.eq_any(in_cart));
    }

    let rows: Vec<(Recipe, String)> = db_query.load(&mut conn).map_err(|e| {
        tracing::error!("Failed to list recipes: {}", e);
        ApiError::internal()
    })?;

    let views = load_recipe_views(&mut conn, user.id, rows).map_err(|e| {
        tracing::error!("Failed to load recipe details: {}", e);
        ApiError::internal()
    })?;

    Ok(Json(RecipesListResponse { recipes: views }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn all_filters_default_to_absent() {
        let q: RecipesListQuery = serde_json::from_value(json!({})).unwrap();
        assert!(q.author.is_none());
        assert!(q.tag.is_none());
        assert!(q.is_favorited.is_none());
        assert!(q.is_in_shopping_cart.is_none());
    }

    #[test]
    fn membership_flags_narrow_only_when_true() {
        assert!(narrows(Some(true)));
        assert!(!narrows(Some(false)));
        assert!(!narrows(None));
    }

    #[test]
    fn filters_deserialize_together() {
        let q: RecipesListQuery = serde_json::from_value(json!({
            "tag": "breakfast",
            "is_favorited": true,
            "is_in_shopping_cart": false,
        }))
        .unwrap();
        assert_eq!(q.tag.as_deref(), Some("breakfast"));
        assert_eq!(q.is_favorited, Some(true));
        assert_eq!(q.is_in_shopping_cart, Some(false));
    }
}
