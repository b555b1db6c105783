pub mod ingredients;
pub mod public;
pub mod recipes;
pub mod tags;
pub mod testing;
pub mod users;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use serde::Serialize;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{OpenApi, ToSchema};

/// Shared error response used by all endpoints
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

/// Error taxonomy for user-input-driven failures. Every variant renders as
/// `{"error": "<message>"}` with the matching status; storage-layer constraint
/// violations are translated into it rather than leaking raw diesel errors.
#[derive(Debug, PartialEq)]
pub enum ApiError {
    /// Referenced recipe/user/association is absent (404)
    NotFound(String),
    /// Duplicate membership add, or a race lost on a uniqueness constraint (409)
    Conflict(String),
    /// Out-of-bounds or malformed input, scoped to a field when one applies (400)
    Validation {
        field: Option<&'static str>,
        message: String,
    },
    /// Caller requires a non-empty collection and got an empty one (400)
    EmptyResult(String),
    /// Authenticated but not allowed to touch this resource (403)
    Forbidden(String),
    /// Unexpected failure; details are logged, the client gets a generic message (500)
    Internal,
}

impl ApiError {
    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        ApiError::Validation {
            field: Some(field),
            message: message.into(),
        }
    }

    pub fn empty(message: impl Into<String>) -> Self {
        ApiError::EmptyResult(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn internal() -> Self {
        ApiError::Internal
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m),
            ApiError::Conflict(m) => (StatusCode::CONFLICT, m),
            ApiError::Validation { message, .. } => (StatusCode::BAD_REQUEST, message),
            ApiError::EmptyResult(m) => (StatusCode::BAD_REQUEST, m),
            ApiError::Forbidden(m) => (StatusCode::FORBIDDEN, m),
            ApiError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

/// Translate an insert error from a uniqueness-constrained membership table.
/// The losing side of a racing duplicate add surfaces as `Conflict` with the
/// given message; anything else is logged and becomes `Internal`.
pub fn conflict_on_unique(e: DieselError, conflict_message: &str) -> ApiError {
    match e {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            ApiError::conflict(conflict_message)
        }
        e => {
            tracing::error!("Membership insert failed: {}", e);
            ApiError::internal()
        }
    }
}

/// Generate the complete OpenAPI spec by merging all module specs
pub fn openapi() -> utoipa::openapi::OpenApi {
    // Base spec with shared components and security
    #[derive(OpenApi)]
    #[openapi(components(schemas(ErrorResponse)))]
    struct BaseApi;

    let mut spec = BaseApi::openapi();

    // Add security scheme
    if let Some(components) = spec.components.as_mut() {
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }

    // Merge in each module's spec
    let modules: Vec<utoipa::openapi::OpenApi> = vec![
        public::ApiDoc::openapi(),
        testing::ApiDoc::openapi(),
        ingredients::ApiDoc::openapi(),
        tags::ApiDoc::openapi(),
        recipes::ApiDoc::openapi(),
        users::ApiDoc::openapi(),
    ];

    for module_spec in modules {
        // Merge paths
        spec.paths.paths.extend(module_spec.paths.paths);

        // Merge components (schemas)
        if let Some(module_components) = module_spec.components {
            if let Some(spec_components) = spec.components.as_mut() {
                spec_components.schemas.extend(module_components.schemas);
            }
        }
    }

    spec
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unique_violation() -> DieselError {
        DieselError::DatabaseError(
            DatabaseErrorKind::UniqueViolation,
            Box::new("duplicate key value violates unique constraint".to_string()),
        )
    }

    #[test]
    fn unique_violation_becomes_conflict() {
        let err = conflict_on_unique(unique_violation(), "Recipe is already in your shopping cart.");
        assert_eq!(
            err,
            ApiError::Conflict("Recipe is already in your shopping cart.".to_string())
        );
    }

    #[test]
    fn other_database_errors_become_internal() {
        let err = conflict_on_unique(DieselError::NotFound, "unused");
        assert_eq!(err, ApiError::Internal);
    }
}
