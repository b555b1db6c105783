use crate::api::{ApiError, ErrorResponse};
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::models::User;
use crate::schema::recipes;
use axum::{extract::State, response::IntoResponse, Json};
use diesel::prelude::*;
use std::sync::Arc;

use super::get::UserProfileView;

/// `is_subscribed` is viewer-relative and self-subscription is forbidden,
/// so one's own profile always reads false.
fn own_profile(user: &User, recipes_count: i64) -> UserProfileView {
    UserProfileView {
        id: user.id,
        username: user.username.clone(),
        is_subscribed: false,
        recipes_count,
    }
}

#[utoipa::path(
    get,
    path = "/api/users/me",
    tag = "users",
    responses(
        (status = 200, description = "The caller's own profile", body = UserProfileView),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_me(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_conn!(pool);

    let recipes_count: i64 = recipes::table
        .filter(recipes::author_id.eq(user.id))
        .count()
        .get_result(&mut conn)
        .map_err(|e| {
            tracing::error!("Failed to count recipes: {}", e);
            ApiError::internal()
        })?;

    Ok(Json(own_profile(&user, recipes_count)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    #[test]
    fn own_profile_is_never_subscribed() {
        let user = User {
            id: Uuid::new_v4(),
            username: "alice".to_string(),
            password_hash: String::new(),
            is_admin: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let view = own_profile(&user, 3);
        assert_eq!(view.id, user.id);
        assert_eq!(view.username, "alice");
        assert!(!view.is_subscribed);
        assert_eq!(view.recipes_count, 3);
    }
}
