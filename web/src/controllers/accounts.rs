use axum::{Json, Router, extract::State, routing::get};
use linkproxy_plaid::{
    Account, DateWindow, Owner, TransactionsGetRequest, TransactionsGetResponse,
};

use crate::{error::Result, middlewares::session::LinkedSession, state::AppState};

/// Transactions are listed for this many days up to and including today.
pub const TRANSACTION_WINDOW_DAYS: u64 = 30;
/// Only the first page is ever fetched.
pub const TRANSACTION_PAGE_SIZE: u32 = 10;

pub struct AccountsController;

impl AccountsController {
    pub fn router() -> Router<AppState> {
        Router::new()
            .route("/api/transactions", get(AccountsController::transactions))
            .route("/api/accountBalance", get(AccountsController::account_balance))
            .route("/api/userInfo", get(AccountsController::user_info))
    }

    pub async fn transactions(
        State(state): State<AppState>,
        LinkedSession { access_token }: LinkedSession,
    ) -> Result<Json<TransactionsGetResponse>> {
        let window = DateWindow::trailing_days(state.clock.today(), TRANSACTION_WINDOW_DAYS);
        let request = TransactionsGetRequest::new(access_token, window, TRANSACTION_PAGE_SIZE);

        let response = state.plaid.transactions_get(&request).await?;

        tracing::debug!(
            start = %window.start,
            end = %window.end,
            returned = response.transactions.len(),
            total = response.total_transactions,
            "transactions fetched"
        );

        Ok(Json(response))
    }

    pub async fn account_balance(
        State(state): State<AppState>,
        LinkedSession { access_token }: LinkedSession,
    ) -> Result<Json<Vec<Account>>> {
        let accounts = state.plaid.accounts_balance_get(&access_token).await?.accounts;

        tracing::debug!(accounts = accounts.len(), "balances fetched");

        Ok(Json(accounts))
    }

    /// Owners of every linked account as one flat list.
    pub async fn user_info(
        State(state): State<AppState>,
        LinkedSession { access_token }: LinkedSession,
    ) -> Result<Json<Vec<Owner>>> {
        let owners = state.plaid.identity_get(&access_token).await?.into_owners();

        tracing::debug!(owners = owners.len(), "identity fetched");

        Ok(Json(owners))
    }
}
