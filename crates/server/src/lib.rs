use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::{EngineError, RoomCode};

use serde::Serialize;
pub use server::{ServerState, router, run_with_listener};

mod items;
mod members;
mod rooms;
mod server;
mod split;

pub mod types {
    pub mod room {
        pub use api_types::room::{RoomCreated, RoomSummary, RoomView, RoomsResponse, TotalUpdate};
        pub use engine::Room;
    }

    pub mod member {
        pub use api_types::member::{MemberView, MembersCreated, MembersNew};
    }

    pub mod item {
        pub use api_types::item::{ItemCreated, ItemMembers, ItemUpdate, ItemView};
    }

    pub mod split {
        pub use api_types::split::{BillView, SplitView, WarningView};
    }
}

#[derive(Debug)]
pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::ExistingKey(_) => StatusCode::CONFLICT,
        EngineError::InvalidCode(_) => StatusCode::BAD_REQUEST,
        EngineError::InvalidAmount(_) | EngineError::InvalidName(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => (status_for_engine_error(&err), err.to_string()),
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };
        if status.is_server_error() {
            tracing::error!("request failed: {error}");
        } else {
            tracing::debug!(%status, "request rejected: {error}");
        }

        (status, Json(Error { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

/// Parse the `{code}` path segment.
fn room_code(raw: &str) -> Result<RoomCode, ServerError> {
    Ok(raw.parse()?)
}
