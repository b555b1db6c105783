use crate::api::{ApiError, ErrorResponse};
use crate::auth::AuthUser;
use crate::cart::aggregate::aggregate;
use crate::cart::export::{
    render_workbook, ExportMode, SHOPPING_LIST_FILENAME, XLSX_CONTENT_TYPE,
};
use crate::cart::fetch_cart_lines;
use crate::db::DbPool;
use crate::get_conn;
use axum::{
    body::Body,
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportModeParam {
    #[default]
    Flat,
    Detailed,
}

impl From<ExportModeParam> for ExportMode {
    fn from(mode: ExportModeParam) -> Self {
        match mode {
            ExportModeParam::Flat => ExportMode::Flat,
            ExportModeParam::Detailed => ExportMode::Detailed,
        }
    }
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct DownloadQuery {
    /// "flat" (default): one row per recipe; "detailed": per-recipe blocks
    /// with indexed ingredient rows
    #[serde(default)]
    #[param(inline, value_type = Option<String>)]
    pub mode: ExportModeParam,
}

#[utoipa::path(
    get,
    path = "/api/recipes/download-shopping-cart",
    tag = "cart",
    params(DownloadQuery),
    responses(
        (status = 200, description = "Shopping list spreadsheet (.xlsx)", content_type = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"),
        (status = 400, description = "Shopping cart is empty", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn download_shopping_cart(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Query(query): Query<DownloadQuery>,
) -> Result<Response, ApiError> {
    let mut conn = get_conn!(pool);

    let cart = fetch_cart_lines(&mut conn, user.id).map_err(|e| {
        tracing::error!("Failed to read shopping cart: {}", e);
        ApiError::internal()
    })?;

    // Policy: exporting an empty cart is a client error, not an empty file
    if cart.is_empty() {
        return Err(ApiError::empty("Shopping cart is empty."));
    }

    let all_lines = cart.iter().flat_map(|recipe| recipe.lines.iter());
    let totals = aggregate(all_lines)
        .map_err(|e| ApiError::validation("amount", e.to_string()))?;

    let workbook = render_workbook(&cart, &totals, query.mode.into()).map_err(|e| {
        tracing::error!("Failed to render shopping list workbook: {}", e);
        ApiError::internal()
    })?;

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, XLSX_CONTENT_TYPE)
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", SHOPPING_LIST_FILENAME),
        )
        .body(Body::from(workbook))
        .map_err(|e| {
            tracing::error!("Failed to build export response: {}", e);
            ApiError::internal()
        })
}
