use std::{future::Future, sync::Arc};

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::{items, members, rooms, split};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

pub fn router(engine: Arc<Engine>) -> Router {
    let state = ServerState { engine };

    Router::new()
        .route("/rooms", get(rooms::list).post(rooms::room_new))
        .route("/rooms/{code}", get(rooms::get).delete(rooms::delete))
        .route("/rooms/{code}/total", put(rooms::update_total))
        .route("/rooms/{code}/split", get(split::get))
        .route("/rooms/{code}/members", post(members::add))
        .route(
            "/rooms/{code}/members/{member_id}",
            axum::routing::delete(members::remove),
        )
        .route("/rooms/{code}/items", post(items::add))
        .route(
            "/rooms/{code}/items/{item_id}",
            axum::routing::patch(items::update).delete(items::delete),
        )
        .route(
            "/rooms/{code}/items/{item_id}/members",
            post(items::tag).delete(items::untag),
        )
        .with_state(state)
}

/// Serve until `shutdown` resolves, then finish in-flight requests.
pub async fn run_with_listener<F>(
    engine: Arc<Engine>,
    listener: tokio::net::TcpListener,
    shutdown: F,
) -> Result<(), std::io::Error>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(engine))
        .with_graceful_shutdown(shutdown)
        .await
}
