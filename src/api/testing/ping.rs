use crate::api::ErrorResponse;
use crate::auth::AuthUser;
use crate::models::User;
use axum::{response::IntoResponse, Json};
use serde::Serialize;
use utoipa::ToSchema;

/// Echoes who the token resolved to, so a client can smoke-test its auth
/// wiring end to end.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PingResponse {
    pub message: String,
    pub username: String,
}

fn pong_for(user: &User) -> PingResponse {
    PingResponse {
        message: "pong".to_string(),
        username: user.username.clone(),
    }
}

#[utoipa::path(
    get,
    path = "/api/test/ping",
    tag = "testing",
    responses(
        (status = 200, description = "Authenticated ping response", body = PingResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn ping(AuthUser(user): AuthUser) -> impl IntoResponse {
    Json(pong_for(&user))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    #[test]
    fn response_names_the_authenticated_user() {
        let user = User {
            id: Uuid::new_v4(),
            username: "alice".to_string(),
            password_hash: String::new(),
            is_admin: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let response = pong_for(&user);
        assert_eq!(response.message, "pong");
        assert_eq!(response.username, "alice");
    }
}
