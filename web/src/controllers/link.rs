use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    routing::{get, post},
};
use linkproxy_plaid::{LinkTokenCreateRequest, LinkTokenCreateResponse};
use serde::{Deserialize, Serialize};

use crate::{
    controllers::redacted, error::Result, middlewares::session::LinkSession, state::AppState,
};

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ExchangePublicToken {
    pub public_token: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ExchangedToken {
    pub access_token: String,
    pub item_id: String,
    /// Always `null`, failures are reported through the error response.
    pub error: Option<String>,
    pub status: bool,
}

pub struct LinkController;

impl LinkController {
    pub fn router() -> Router<AppState> {
        Router::new()
            .route("/api/create_link_token", get(LinkController::create_link_token))
            .route(
                "/api/exchange_public_token",
                post(LinkController::exchange_public_token),
            )
    }

    /// Creates a link token for this browser, identified by its session id.
    ///
    /// Leaves any stored access token untouched.
    pub async fn create_link_token(
        State(state): State<AppState>,
        session: LinkSession,
    ) -> Result<Json<LinkTokenCreateResponse>> {
        let client_user_id = session.id().await?;
        let plaid_config = &state.config.plaid;

        let request = LinkTokenCreateRequest::new(&plaid_config.client_name, client_user_id)
            .with_android_package_name(plaid_config.android_package_name.clone())
            .with_redirect_uri(plaid_config.redirect_uri.clone());

        let response = state.plaid.link_token_create(&request).await?;

        tracing::info!(expiration = %response.expiration, "link token created");

        Ok(Json(response))
    }

    /// Exchanges the public token from Plaid Link and keeps the resulting
    /// access token in the session, replacing any earlier one.
    pub async fn exchange_public_token(
        State(state): State<AppState>,
        session: LinkSession,
        payload: Result<Json<ExchangePublicToken>, JsonRejection>,
    ) -> Result<Json<ExchangedToken>> {
        let Json(ExchangePublicToken { public_token }) = payload?;

        let exchanged = state.plaid.item_public_token_exchange(&public_token).await?;

        session.store_access_token(&exchanged.access_token).await?;

        tracing::info!(
            item_id = %exchanged.item_id,
            access_token = %redacted(&exchanged.access_token),
            "public token exchanged"
        );

        Ok(Json(ExchangedToken {
            access_token: exchanged.access_token,
            item_id: exchanged.item_id,
            error: None,
            status: true,
        }))
    }
}
