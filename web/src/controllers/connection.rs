use axum::{Json, Router, routing::get};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{middlewares::session::LinkSession, state::AppState};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionStatus {
    pub status: bool,
}

pub struct ConnectionController;

impl ConnectionController {
    pub fn router() -> Router<AppState> {
        Router::new().route(
            "/api/is_user_connected",
            get(ConnectionController::is_user_connected),
        )
    }

    /// Whether this browser has linked a bank account. Never fails, an
    /// unreadable session counts as not linked.
    pub async fn is_user_connected(session: LinkSession) -> Json<ConnectionStatus> {
        let status = session.is_linked().await.unwrap_or_else(|err| {
            warn!("could not read session, reporting as not connected: {:?}", err);
            false
        });

        tracing::debug!(status, "connection checked");

        Json(ConnectionStatus { status })
    }
}
