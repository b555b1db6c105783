pub mod get;
pub mod me;
pub mod subscribe;
pub mod subscriptions;

use crate::AppState;
use axum::routing::{get as get_method, post};
use axum::Router;
use utoipa::OpenApi;

/// Returns the router for /api/users endpoints
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/subscriptions", get_method(subscriptions::list_subscriptions))
        .route("/me", get_method(me::get_me))
        .route("/{id}", get_method(get::get_user))
        .route(
            "/{id}/subscribe",
            post(subscribe::subscribe).delete(subscribe::unsubscribe),
        )
}

#[derive(OpenApi)]
#[openapi(
    paths(
        get::get_user,
        me::get_me,
        subscribe::subscribe,
        subscribe::unsubscribe,
        subscriptions::list_subscriptions,
    ),
    components(schemas(get::UserProfileView, subscriptions::SubscriptionsResponse))
)]
pub struct ApiDoc;
