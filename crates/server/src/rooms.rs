//! Room API endpoints

use api_types::{
    item::ItemView,
    member::MemberView,
    room::{RoomCreated, RoomSummary, RoomView, RoomsResponse, TotalUpdate},
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::Room;

use crate::{ServerError, room_code, server::ServerState};

fn room_view(room: &Room) -> RoomView {
    RoomView {
        id: room.id,
        code: room.code.to_string(),
        created_at: room.created_at,
        total: room.total,
        subtotal: room.subtotal(),
        members: room
            .members
            .iter()
            .map(|member| MemberView {
                id: member.id,
                name: member.name.clone(),
            })
            .collect(),
        items: room
            .items
            .iter()
            .map(|item| ItemView {
                id: item.id,
                name: item.name.clone(),
                cost: item.cost,
                member_ids: item.member_ids.iter().copied().collect(),
            })
            .collect(),
    }
}

/// Handle requests for creating a new, empty `Room`
pub async fn room_new(
    State(state): State<ServerState>,
) -> Result<(StatusCode, Json<RoomCreated>), ServerError> {
    let room = state.engine.create_room().await?;
    Ok((
        StatusCode::CREATED,
        Json(RoomCreated {
            code: room.code.to_string(),
        }),
    ))
}

/// Handle requests for listing live rooms
pub async fn list(State(state): State<ServerState>) -> Json<RoomsResponse> {
    let rooms = state
        .engine
        .rooms()
        .await
        .into_iter()
        .map(|room| RoomSummary {
            code: room.code.to_string(),
            created_at: room.created_at,
            members: room.members.into_iter().map(|member| member.name).collect(),
        })
        .collect();

    Json(RoomsResponse { rooms })
}

pub async fn get(
    State(state): State<ServerState>,
    Path(code): Path<String>,
) -> Result<Json<RoomView>, ServerError> {
    let room = state.engine.room(&room_code(&code)?).await?;
    Ok(Json(room_view(&room)))
}

pub async fn delete(
    State(state): State<ServerState>,
    Path(code): Path<String>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_room(&room_code(&code)?).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn update_total(
    State(state): State<ServerState>,
    Path(code): Path<String>,
    Json(payload): Json<TotalUpdate>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .update_total(&room_code(&code)?, payload.total)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
