use crate::api::{ApiError, ErrorResponse};
use crate::db::DbPool;
use crate::get_conn;
use crate::models::Ingredient;
use crate::schema::ingredients;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct IngredientView {
    pub id: Uuid,
    pub name: String,
    pub measurement_unit: String,
}

impl From<Ingredient> for IngredientView {
    fn from(i: Ingredient) -> Self {
        IngredientView {
            id: i.id,
            name: i.name,
            measurement_unit: i.measurement_unit,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct IngredientsListResponse {
    pub ingredients: Vec<IngredientView>,
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct IngredientsListQuery {
    /// Case-insensitive name prefix filter
    pub name: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/ingredients",
    tag = "ingredients",
    params(IngredientsListQuery),
    responses(
        (status = 200, description = "Ingredient catalog", body = IngredientsListResponse),
        (status = 500, description = "Internal error", body = ErrorResponse)
    )
)]
pub async fn list_ingredients(
    State(pool): State<Arc<DbPool>>,
    Query(query): Query<IngredientsListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_conn!(pool);

    let mut db_query = ingredients::table
        .select(Ingredient::as_select())
        .order(ingredients::name.asc())
        .into_boxed();

    if let Some(prefix) = query.name.as_deref().filter(|p| !p.is_empty()) {
        let escaped = prefix.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_");
        db_query = db_query.filter(ingredients::name.ilike(format!("{}%", escaped)));
    }

    let rows = db_query.load::<Ingredient>(&mut conn).map_err(|e| {
        tracing::error!("Failed to list ingredients: {}", e);
        ApiError::internal()
    })?;

    Ok(Json(IngredientsListResponse {
        ingredients: rows.into_iter().map(IngredientView::from).collect(),
    }))
}
