//! Per-browser session state.
//!
//! A session holds the Plaid access token of the bank account linked from that
//! browser, plus the time it was started once its id is handed out. Sessions
//! live in memory and are gone after a restart or once they expire.

use axum::{extract::FromRequestParts, http::request::Parts};
use chrono::Utc;
use tower_sessions::{
    Expiry, MemoryStore, Session, SessionManagerLayer,
    cookie::{SameSite, time::Duration},
    service::SignedCookie,
};

use crate::{error::Error, state::AppState};

/// Session key the access token is stored under.
pub const ACCESS_TOKEN_KEY: &str = "access_token";
/// Unix timestamp written when a session is first given an id.
///
/// An empty session never gets a cookie, so without it the id would be lost
/// after the request.
pub const STARTED_AT_KEY: &str = "started_at";

pub type SessionLayer = SessionManagerLayer<MemoryStore, SignedCookie>;

/// ------------------------------------------------------------------------
/// A convenience struct to build the session layer.
/// ------------------------------------------------------------------------
/// # Returns
///
/// The session layer middleware for our router, backed by an in-memory
/// store and a signed cookie.
///
/// ------------------------------------------------------------------------
pub struct SessionManager {
    pub session_layer: SessionLayer,
}

impl SessionManager {
    pub fn new(app_state: &AppState) -> Self {
        let config = &app_state.config.session;

        let session_layer = SessionManagerLayer::new(MemoryStore::default())
            .with_name(config.cookie_name.clone())
            .with_secure(config.secure)
            .with_same_site(SameSite::Lax)
            .with_expiry(Expiry::OnInactivity(Duration::days(config.expiry_days)))
            .with_signed(app_state.session_key.clone());

        Self { session_layer }
    }
}

/// Extractor over the current browser session.
#[derive(Debug, Clone)]
pub struct LinkSession {
    session: Session,
}

impl LinkSession {
    /// The access token stored by a previous public token exchange.
    pub async fn access_token(&self) -> Result<Option<String>, Error> {
        Ok(self.session.get::<String>(ACCESS_TOKEN_KEY).await?)
    }

    pub async fn is_linked(&self) -> Result<bool, Error> {
        Ok(self.access_token().await?.is_some())
    }

    /// Replaces whatever access token the session held before.
    pub async fn store_access_token(&self, access_token: &str) -> Result<(), Error> {
        self.session.insert(ACCESS_TOKEN_KEY, access_token).await?;
        Ok(())
    }

    /// The session id, persisting a fresh session first so it has one and
    /// the browser keeps it.
    pub async fn id(&self) -> Result<String, Error> {
        if self.session.id().is_none() {
            self.session
                .insert(STARTED_AT_KEY, Utc::now().timestamp())
                .await?;
            self.session.save().await?;
        }

        self.session
            .id()
            .map(|id| id.to_string())
            .ok_or(Error::SessionUnavailable("session has no id after saving"))
    }
}

impl<S> FromRequestParts<S> for LinkSession
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|(_, message)| Error::SessionUnavailable(message))?;

        Ok(Self { session })
    }
}

/// Extractor for handlers that need a linked bank account.
///
/// Rejects with [`Error::MissingAccessToken`] before any Plaid call is made.
#[derive(Debug, Clone)]
pub struct LinkedSession {
    pub access_token: String,
}

impl<S> FromRequestParts<S> for LinkedSession
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let access_token = LinkSession::from_request_parts(parts, state)
            .await?
            .access_token()
            .await?
            .ok_or(Error::MissingAccessToken)?;

        Ok(Self { access_token })
    }
}
