use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use color_eyre::eyre;
use serde::Serialize;
use tracing::{error, warn};

pub type Result<T, E = Error> = color_eyre::Result<T, E>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Failed to load configuration: {0}")]
    Config(#[from] linkproxy_config::Error),
    /// The configured session secret cannot sign cookies
    ///
    /// Fails the boot, never reaches a handler.
    #[error("session secret must be at least 64 bytes")]
    SessionSecret,
    /// No bank account has been linked in this session
    ///
    /// Return a `401 Unauthorized` response when a handler needs the access token.
    #[error("no access token in session, link an account first")]
    MissingAccessToken,
    /// A call to Plaid failed.
    ///
    /// Return `400 Bad Request` when Plaid rejected the input, `502 Bad Gateway` otherwise.
    #[error("plaid request failed")]
    Plaid(#[from] linkproxy_plaid::Error),
    /// Plaid returned an item that is not tied to any institution.
    ///
    /// Return `502 Bad Gateway`, the upstream answer is unusable.
    #[error("item {0} has no institution")]
    MissingInstitution(String),
    /// The session could not be read or written.
    ///
    /// Return `500 Internal Server Error` on a session store error.
    #[error("session store error")]
    Session(#[from] tower_sessions::session::Error),
    /// The session extractor is missing, i.e. the session layer is not installed.
    ///
    /// Return `500 Internal Server Error`.
    #[error("session unavailable: {0}")]
    SessionUnavailable(&'static str),
    /// The frontend could not be served.
    ///
    /// Fails the boot, never reaches a handler.
    #[error("could not initialize static assets")]
    StaticAssets(#[from] linkproxy_ui::Error),

    #[error(transparent)]
    JsonRejection(#[from] JsonRejection),
    /// Enumerate any possible app arrors here.
    ///
    /// Return `500 Internal Server Error` on a `eyre::Error`.
    #[error("Error: {0}")]
    Unexpected(#[from] eyre::Error),
}

/// The body of every error response.
#[derive(Serialize)]
struct ErrorBody {
    status: bool,
    error: String,
}

impl Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::MissingAccessToken => StatusCode::UNAUTHORIZED,
            Error::Plaid(err) if err.is_invalid_input() => StatusCode::BAD_REQUEST,
            Error::Plaid(_) => StatusCode::BAD_GATEWAY,
            Error::MissingInstitution(_) => StatusCode::BAD_GATEWAY,
            Error::JsonRejection(rejection) => rejection.status(),
            Error::Session(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::SessionUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::SessionSecret => StatusCode::INTERNAL_SERVER_ERROR,
            Error::StaticAssets(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The message shown to the caller.
    fn public_message(&self) -> String {
        match self {
            Error::MissingAccessToken => self.to_string(),
            Error::JsonRejection(rejection) => rejection.body_text(),
            Error::Plaid(linkproxy_plaid::Error::Api { error, .. }) => error
                .display_message
                .clone()
                .unwrap_or_else(|| error.error_message.clone()),
            Error::Plaid(_) => "the bank data provider could not be reached".to_string(),
            Error::MissingInstitution(_) => "the linked item has no institution".to_string(),
            _ => "internal server error".to_string(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::MissingAccessToken => {
                warn!("rejected request without a linked account");
            }
            Error::Plaid(ref err) => {
                error!(
                    code = err.error_code().unwrap_or("none"),
                    "an error occured while calling plaid: {:?}", err
                );
            }
            Error::MissingInstitution(ref item_id) => {
                error!(%item_id, "plaid returned an item without an institution");
            }
            Error::JsonRejection(ref err) => {
                warn!("an error occured while parsing json: {:?}", err);
            }
            Error::Session(ref err) => {
                error!("an error occured while accessing the session: {:?}", err);
            }
            Error::SessionUnavailable(ref err) => {
                error!("session layer missing: {}", err);
            }
            Error::SessionSecret => {
                error!("invalid session secret");
            }
            Error::StaticAssets(ref err) => {
                error!("an error occured while serving static assets: {:?}", err);
            }
            Error::Config(ref err) => {
                error!("an error occured while loading configuration: {:?}", err);
            }
            Error::Unexpected(ref err) => {
                error!("an internal server error occured: {:?}", err);
            }
        }

        let body = ErrorBody {
            status: false,
            error: self.public_message(),
        };

        (self.status_code(), Json(body)).into_response()
    }
}
