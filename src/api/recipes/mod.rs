pub mod cart;
pub mod create;
pub mod delete;
pub mod download;
pub mod favorite;
pub mod get;
pub mod list;
pub mod update;
pub mod validate;
pub mod view;

use crate::AppState;
use axum::routing::{get as get_method, post};
use axum::Router;
use utoipa::OpenApi;

/// Returns the router for /api/recipes endpoints
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get_method(list::list_recipes).post(create::create_recipe),
        )
        .route(
            "/download-shopping-cart",
            get_method(download::download_shopping_cart),
        )
        .route(
            "/{id}",
            get_method(get::get_recipe)
                .put(update::update_recipe)
                .delete(delete::delete_recipe),
        )
        .route(
            "/{id}/cart",
            post(cart::add_to_cart).delete(cart::remove_from_cart),
        )
        .route(
            "/{id}/favorite",
            post(favorite::add_favorite).delete(favorite::remove_favorite),
        )
}

#[derive(OpenApi)]
#[openapi(
    paths(
        list::list_recipes,
        create::create_recipe,
        get::get_recipe,
        update::update_recipe,
        delete::delete_recipe,
        cart::add_to_cart,
        cart::remove_from_cart,
        favorite::add_favorite,
        favorite::remove_favorite,
        download::download_shopping_cart,
    ),
    components(schemas(
        create::CreateRecipeRequest,
        create::RecipeIngredientInput,
        create::CreateRecipeResponse,
        list::RecipesListResponse,
        view::RecipeView,
        view::RecipeAuthorView,
        view::RecipeIngredientView,
        view::RecipeTagView,
        cart::CartMembershipView,
        favorite::FavoriteView,
    ))
)]
pub struct ApiDoc;
