//! Item endpoints: create, edit, delete and tag members.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use api_types::item::{ItemCreated, ItemMembers, ItemUpdate};

use crate::{ServerError, room_code, server::ServerState};

/// Add a blank item (no name, zero cost, nobody tagged).
pub async fn add(
    State(state): State<ServerState>,
    Path(code): Path<String>,
) -> Result<(StatusCode, Json<ItemCreated>), ServerError> {
    let id = state.engine.add_item(&room_code(&code)?).await?;
    Ok((StatusCode::CREATED, Json(ItemCreated { id })))
}

pub async fn update(
    State(state): State<ServerState>,
    Path((code, item_id)): Path<(String, Uuid)>,
    Json(payload): Json<ItemUpdate>,
) -> Result<StatusCode, ServerError> {
    if payload.name.is_none() && payload.cost.is_none() {
        return Err(ServerError::Generic("name or cost required".to_string()));
    }
    state
        .engine
        .update_item(
            &room_code(&code)?,
            item_id,
            payload.name.as_deref(),
            payload.cost,
        )
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete(
    State(state): State<ServerState>,
    Path((code, item_id)): Path<(String, Uuid)>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .delete_item(&room_code(&code)?, item_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Tag members to an item. Ids that are not room members are ignored.
pub async fn tag(
    State(state): State<ServerState>,
    Path((code, item_id)): Path<(String, Uuid)>,
    Json(payload): Json<ItemMembers>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .add_members_to_item(&room_code(&code)?, item_id, &payload.member_ids)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn untag(
    State(state): State<ServerState>,
    Path((code, item_id)): Path<(String, Uuid)>,
    Json(payload): Json<ItemMembers>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .remove_members_from_item(&room_code(&code)?, item_id, &payload.member_ids)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
