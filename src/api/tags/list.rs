use crate::api::{ApiError, ErrorResponse};
use crate::db::DbPool;
use crate::get_conn;
use crate::models::Tag;
use crate::schema::tags;
use axum::{extract::State, response::IntoResponse, Json};
use diesel::prelude::*;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TagView {
    pub id: Uuid,
    pub name: String,
    pub color: String,
    pub slug: String,
}

impl From<Tag> for TagView {
    fn from(t: Tag) -> Self {
        TagView {
            id: t.id,
            name: t.name,
            color: t.color,
            slug: t.slug,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TagsListResponse {
    pub tags: Vec<TagView>,
}

#[utoipa::path(
    get,
    path = "/api/tags",
    tag = "tags",
    responses(
        (status = 200, description = "List of tags", body = TagsListResponse),
        (status = 500, description = "Internal error", body = ErrorResponse)
    )
)]
pub async fn list_tags(State(pool): State<Arc<DbPool>>) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_conn!(pool);

    let rows = tags::table
        .select(Tag::as_select())
        .order(tags::name.asc())
        .load::<Tag>(&mut conn)
        .map_err(|e| {
            tracing::error!("Failed to list tags: {}", e);
            ApiError::internal()
        })?;

    Ok(Json(TagsListResponse {
        tags: rows.into_iter().map(TagView::from).collect(),
    }))
}
