use crate::api::{ApiError, ErrorResponse};
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::schema::{recipes, subscriptions, users};
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use diesel::prelude::*;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

/// Output shape for viewing an existing profile. Distinct from
/// `UserCreatedView`: no token, plus the viewer-relative subscription flag.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserProfileView {
    pub id: Uuid,
    pub username: String,
    pub is_subscribed: bool,
    pub recipes_count: i64,
}

#[utoipa::path(
    get,
    path = "/api/users/{id}",
    tag = "users",
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User profile", body = UserProfileView),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_user(
    AuthUser(viewer): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_conn!(pool);

    let (user_id, username): (Uuid, String) = users::table
        .find(id)
        .select((users::id, users::username))
        .first(&mut conn)
        .map_err(|e| match e {
            diesel::result::Error::NotFound => ApiError::not_found("User not found"),
            e => {
                tracing::error!("Failed to fetch user: {}", e);
                ApiError::internal()
            }
        })?;

    let is_subscribed: bool = diesel::select(diesel::dsl::exists(
        subscriptions::table
            .filter(subscriptions::subscriber_id.eq(viewer.id))
            .filter(subscriptions::author_id.eq(user_id)),
    ))
    .get_result(&mut conn)
    .map_err(|e| {
        tracing::error!("Failed to check subscription: {}", e);
        ApiError::internal()
    })?;

    let recipes_count: i64 = recipes::table
        .filter(recipes::author_id.eq(user_id))
        .count()
        .get_result(&mut conn)
        .map_err(|e| {
            tracing::error!("Failed to count recipes: {}", e);
            ApiError::internal()
        })?;

    Ok(Json(UserProfileView {
        id: user_id,
        username,
        is_subscribed,
        recipes_count,
    }))
}
