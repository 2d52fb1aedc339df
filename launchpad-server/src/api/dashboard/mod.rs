mod handler;

use axum::Router;
use axum::routing::get;

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest(
        "/api/dashboard",
        Router::new().route("/", get(handler::dashboard)),
    )
}
