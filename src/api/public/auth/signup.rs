use crate::api::{ApiError, ErrorResponse};
use crate::auth::{create_session, hash_password};
use crate::db::DbPool;
use crate::get_conn;
use crate::models::{NewCart, NewUser, User};
use crate::schema::{carts, users};
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SignupRequest {
    pub username: String,
    pub password: String,
}

/// Output shape for a freshly created account. Deliberately distinct from
/// `UserProfileView`: this one carries the session token and nothing else.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserCreatedView {
    pub id: Uuid,
    pub username: String,
    pub token: String,
}

#[utoipa::path(
    post,
    path = "/api/auth/signup",
    tag = "auth",
    request_body(content = SignupRequest, example = json!({"username": "user", "password": "password"})),
    responses(
        (status = 201, description = "User created successfully", body = UserCreatedView),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 409, description = "Username already exists", body = ErrorResponse)
    )
)]
pub async fn signup(
    State(pool): State<Arc<DbPool>>,
    Json(req): Json<SignupRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let username = req.username.trim();
    if username.is_empty() {
        return Err(ApiError::validation("username", "Username cannot be empty"));
    }
    if username.len() > 150 {
        return Err(ApiError::validation(
            "username",
            "Username must be 150 characters or fewer",
        ));
    }
    if req.password.is_empty() {
        return Err(ApiError::validation("password", "Password cannot be empty"));
    }

    let mut conn = get_conn!(pool);

    let password_hash = hash_password(&req.password).map_err(|e| {
        tracing::error!("Failed to hash password: {}", e);
        ApiError::internal()
    })?;

    // User, their empty cart, and the first session are created atomically.
    // Cart provisioning is an explicit step of account creation, not a
    // side-effect hook: if it fails the whole signup rolls back.
    let result: Result<(User, String), diesel::result::Error> = conn.transaction(|conn| {
        let user: User = diesel::insert_into(users::table)
            .values(&NewUser {
                username,
                password_hash: &password_hash,
            })
            .returning(User::as_returning())
            .get_result(conn)?;

        diesel::insert_into(carts::table)
            .values(&NewCart { user_id: user.id })
            .execute(conn)?;

        let token = create_session(conn, user.id)?;

        Ok((user, token))
    });

    let (user, token) = match result {
        Ok(created) => created,
        Err(diesel::result::Error::DatabaseError(
            diesel::result::DatabaseErrorKind::UniqueViolation,
            _,
        )) => return Err(ApiError::conflict("Username already exists")),
        Err(e) => {
            tracing::error!("Failed to create user: {}", e);
            return Err(ApiError::internal());
        }
    };

    Ok((
        StatusCode::CREATED,
        Json(UserCreatedView {
            id: user.id,
            username: user.username,
            token,
        }),
    ))
}
