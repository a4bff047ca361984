pub mod models;

use core::time;

use linkproxy_config::PlaidConfig;
use reqwest::{
    Client, StatusCode,
    header::{HeaderMap, HeaderValue, InvalidHeaderValue},
};
use serde::{Serialize, de::DeserializeOwned};

pub use models::*;

/// The API version every request is pinned to.
pub const PLAID_VERSION: &str = "2020-09-14";

#[derive(Clone)]
pub struct PlaidClient {
    http_client: Client,
    base_url: String,
    client_id: String,
}

// Manual implementation of Debug for PlaidClient, the secret only lives in the default headers
impl std::fmt::Debug for PlaidClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaidClient")
            .field("base_url", &self.base_url)
            .field("client_id", &self.client_id)
            .field("secret", &"[redacted]")
            .finish()
    }
}

impl PlaidClient {
    pub fn new(config: &PlaidConfig) -> Result<Self, Error> {
        let timeout = time::Duration::from_millis(config.timeout);

        let mut headers = HeaderMap::new();
        headers.insert("PLAID-CLIENT-ID", HeaderValue::from_str(&config.client_id)?);
        let mut secret = HeaderValue::from_str(&config.secret)?;
        secret.set_sensitive(true);
        headers.insert("PLAID-SECRET", secret);
        headers.insert("Plaid-Version", HeaderValue::from_static(PLAID_VERSION));

        let http_client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http_client,
            base_url: config.base_url().trim_end_matches('/').to_string(),
            client_id: config.client_id.clone(),
        })
    }

    /// Creates a short-lived token used to open Plaid Link in the browser.
    pub async fn link_token_create(
        &self,
        request: &LinkTokenCreateRequest,
    ) -> Result<LinkTokenCreateResponse, Error> {
        self.post("/link/token/create", request).await
    }

    /// Swaps the public token handed out by Plaid Link for a long-lived access token.
    pub async fn item_public_token_exchange(
        &self,
        public_token: &str,
    ) -> Result<ItemPublicTokenExchangeResponse, Error> {
        self.post(
            "/item/public_token/exchange",
            &PublicTokenExchangeRequest { public_token },
        )
        .await
    }

    pub async fn item_get(&self, access_token: &str) -> Result<ItemGetResponse, Error> {
        self.post("/item/get", &AccessTokenRequest { access_token })
            .await
    }

    pub async fn institutions_get_by_id(
        &self,
        institution_id: &str,
        country_codes: &[CountryCode],
    ) -> Result<InstitutionsGetByIdResponse, Error> {
        self.post(
            "/institutions/get_by_id",
            &InstitutionsGetByIdRequest {
                institution_id,
                country_codes,
            },
        )
        .await
    }

    pub async fn transactions_get(
        &self,
        request: &TransactionsGetRequest,
    ) -> Result<TransactionsGetResponse, Error> {
        self.post("/transactions/get", request).await
    }

    pub async fn accounts_balance_get(
        &self,
        access_token: &str,
    ) -> Result<AccountsBalanceGetResponse, Error> {
        self.post("/accounts/balance/get", &AccessTokenRequest { access_token })
            .await
    }

    pub async fn identity_get(&self, access_token: &str) -> Result<IdentityGetResponse, Error> {
        self.post("/identity/get", &AccessTokenRequest { access_token })
            .await
    }

    async fn post<B, T>(&self, endpoint: &str, body: &B) -> Result<T, Error>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, endpoint);

        tracing::debug!(%url, "calling plaid");

        let res = self.http_client.post(url).json(body).send().await?;

        let status = res.status();
        let bytes = res.bytes().await?;

        if !status.is_success() {
            return Err(match serde_json::from_slice::<PlaidApiError>(&bytes) {
                Ok(error) => Error::Api { status, error },
                Err(_) => Error::Status(status),
            });
        }

        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    // Plaid answered with its error object
    #[error("plaid responded with {status}: {error}")]
    Api {
        status: StatusCode,
        #[source]
        error: PlaidApiError,
    },
    // Plaid answered with a non-2xx status and no readable error object
    #[error("plaid responded with {0}")]
    Status(StatusCode),
    // A response body did not match the expected record
    #[error("could not decode plaid response")]
    Decode(#[from] serde_json::Error),
    // The configured credentials cannot be sent as headers
    #[error("invalid plaid credentials header")]
    Header(#[from] InvalidHeaderValue),
    // A reqwest error occurred
    #[error("reqwest error")]
    Request(#[from] reqwest::Error),
}

impl Error {
    /// The Plaid error code, e.g. `INVALID_PUBLIC_TOKEN`, when Plaid sent one.
    pub fn error_code(&self) -> Option<&str> {
        match self {
            Error::Api { error, .. } => Some(error.error_code.as_str()),
            _ => None,
        }
    }

    /// Whether Plaid rejected the request itself rather than failing to serve it.
    pub fn is_invalid_input(&self) -> bool {
        match self {
            Error::Api { error, .. } => {
                matches!(error.error_type.as_str(), "INVALID_INPUT" | "INVALID_REQUEST")
            }
            _ => false,
        }
    }
}
