//! Room membership endpoints.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use api_types::member::{MembersCreated, MembersNew};

use crate::{ServerError, room_code, server::ServerState};

pub async fn add(
    State(state): State<ServerState>,
    Path(code): Path<String>,
    Json(payload): Json<MembersNew>,
) -> Result<(StatusCode, Json<MembersCreated>), ServerError> {
    if payload.names.is_empty() {
        return Err(ServerError::Generic("names required".to_string()));
    }
    let ids = state
        .engine
        .add_members(&room_code(&code)?, &payload.names)
        .await?;
    Ok((StatusCode::CREATED, Json(MembersCreated { ids })))
}

/// Remove a member; it is untagged from every item of the room too.
pub async fn remove(
    State(state): State<ServerState>,
    Path((code, member_id)): Path<(String, Uuid)>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .remove_member(&room_code(&code)?, member_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
