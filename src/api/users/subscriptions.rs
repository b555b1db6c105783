use crate::api::{ApiError, ErrorResponse};
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::schema::{recipes, subscriptions, users};
use axum::{extract::State, response::IntoResponse, Json};
use diesel::prelude::*;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use super::get::UserProfileView;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SubscriptionsResponse {
    pub authors: Vec<UserProfileView>,
}

#[utoipa::path(
    get,
    path = "/api/users/subscriptions",
    tag = "subscriptions",
    responses(
        (status = 200, description = "Authors the caller subscribes to", body = SubscriptionsResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_subscriptions(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_conn!(pool);

    let authors: Vec<(Uuid, String)> = subscriptions::table
        .inner_join(users::table.on(users::id.eq(subscriptions::author_id)))
        .filter(subscriptions::subscriber_id.eq(user.id))
        .select((users::id, users::username))
        .order(users::username.asc())
        .load(&mut conn)
        .map_err(|e| {
            tracing::error!("Failed to list subscriptions: {}", e);
            ApiError::internal()
        })?;

    if authors.is_empty() {
        return Ok(Json(SubscriptionsResponse {
            authors: Vec::new(),
        }));
    }

    let author_ids: Vec<Uuid> = authors.iter().map(|(id, _)| *id).collect();

    let counts: HashMap<Uuid, i64> = recipes::table
        .filter(recipes::author_id.eq_any(&author_ids))
        .group_by(recipes::author_id)
        .select((recipes::author_id, diesel::dsl::count(recipes::id)))
        .load::<(Uuid, i64)>(&mut conn)
        .map_err(|e| {
            tracing::error!("Failed to count recipes: {}", e);
            ApiError::internal()
        })?
        .into_iter()
        .collect();

    let views = authors
        .into_iter()
        .map(|(id, username)| UserProfileView {
            id,
            username,
            is_subscribed: true,
            recipes_count: counts.get(&id).copied().unwrap_or(0),
        })
        .collect();

    Ok(Json(SubscriptionsResponse { authors: views }))
}
