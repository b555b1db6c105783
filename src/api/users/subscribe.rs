use crate::api::{ApiError, ErrorResponse};
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::models::NewSubscription;
use crate::schema::{subscriptions, users};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use std::sync::Arc;
use uuid::Uuid;

use super::get::UserProfileView;

/// First rejection layer for self-subscription; the database CHECK
/// constraint is the second.
fn reject_self_subscription(subscriber_id: Uuid, author_id: Uuid) -> Result<(), ApiError> {
    if subscriber_id == author_id {
        return Err(ApiError::validation(
            "author",
            "You cannot subscribe to yourself.",
        ));
    }
    Ok(())
}

fn map_subscription_insert_error(e: DieselError) -> ApiError {
    match e {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            ApiError::conflict("You have already subscribed to this author.")
        }
        // Constraint-level backstop for the self-subscription rule
        DieselError::DatabaseError(DatabaseErrorKind::CheckViolation, _) => {
            ApiError::validation("author", "You cannot subscribe to yourself.")
        }
        e => {
            tracing::error!("Failed to create subscription: {}", e);
            ApiError::internal()
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/users/{id}/subscribe",
    tag = "subscriptions",
    params(
        ("id" = Uuid, Path, description = "Author user ID")
    ),
    responses(
        (status = 201, description = "Subscribed to author", body = UserProfileView),
        (status = 400, description = "Cannot subscribe to yourself", body = ErrorResponse),
        (status = 404, description = "Author not found", body = ErrorResponse),
        (status = 409, description = "Already subscribed", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn subscribe(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    reject_self_subscription(user.id, id)?;

    let mut conn = get_conn!(pool);

    let (author_id, author_username): (Uuid, String) = users::table
        .find(id)
        .select((users::id, users::username))
        .first(&mut conn)
        .map_err(|e| match e {
            DieselError::NotFound => ApiError::not_found("Author not found"),
            e => {
                tracing::error!("Failed to fetch author: {}", e);
                ApiError::internal()
            }
        })?;

    diesel::insert_into(subscriptions::table)
        .values(&NewSubscription {
            subscriber_id: user.id,
            author_id,
        })
        .execute(&mut conn)
        .map_err(map_subscription_insert_error)?;

    let recipes_count: i64 = crate::schema::recipes::table
        .filter(crate::schema::recipes::author_id.eq(author_id))
        .count()
        .get_result(&mut conn)
        .map_err(|e| {
            tracing::error!("Failed to count recipes: {}", e);
            ApiError::internal()
        })?;

    Ok((
        StatusCode::CREATED,
        Json(UserProfileView {
            id: author_id,
            username: author_username,
            is_subscribed: true,
            recipes_count,
        }),
    ))
}

#[utoipa::path(
    delete,
    path = "/api/users/{id}/subscribe",
    tag = "subscriptions",
    params(
        ("id" = Uuid, Path, description = "Author user ID")
    ),
    responses(
        (status = 204, description = "Unsubscribed from author"),
        (status = 404, description = "Not subscribed", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn unsubscribe(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_conn!(pool);

    let deleted = diesel::delete(
        subscriptions::table
            .filter(subscriptions::subscriber_id.eq(user.id))
            .filter(subscriptions::author_id.eq(id)),
    )
    .execute(&mut conn)
    .map_err(|e| {
        tracing::error!("Failed to remove subscription: {}", e);
        ApiError::internal()
    })?;

    if deleted == 0 {
        return Err(ApiError::not_found("You are not subscribed to this author."));
    }

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn self_subscription_is_rejected_before_any_db_work() {
        let id = Uuid::new_v4();
        let err = reject_self_subscription(id, id).unwrap_err();
        assert!(matches!(
            err,
            ApiError::Validation {
                field: Some("author"),
                ..
            }
        ));
    }

    #[test]
    fn distinct_users_pass_the_self_check() {
        assert!(reject_self_subscription(Uuid::new_v4(), Uuid::new_v4()).is_ok());
    }

    #[test]
    fn check_violation_maps_to_the_same_validation_error() {
        let e = DieselError::DatabaseError(
            DatabaseErrorKind::CheckViolation,
            Box::new("cannot_subscribe_to_self".to_string()),
        );
        assert!(matches!(
            map_subscription_insert_error(e),
            ApiError::Validation { .. }
        ));
    }

    #[test]
    fn unique_violation_maps_to_conflict() {
        let e = DieselError::DatabaseError(
            DatabaseErrorKind::UniqueViolation,
            Box::new("unique_subscription".to_string()),
        );
        assert!(matches!(
            map_subscription_insert_error(e),
            ApiError::Conflict(_)
        ));
    }
}
