use axum::{Json, Router, extract::State, routing::get};
use linkproxy_plaid::CountryCode;
use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    middlewares::session::LinkedSession,
    state::AppState,
};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct BankName {
    pub name: String,
}

pub struct InstitutionController;

impl InstitutionController {
    pub fn router() -> Router<AppState> {
        Router::new().route(
            "/api/get_bank_name",
            get(InstitutionController::get_bank_name),
        )
    }

    /// Name of the institution behind the linked item.
    pub async fn get_bank_name(
        State(state): State<AppState>,
        LinkedSession { access_token }: LinkedSession,
    ) -> Result<Json<BankName>> {
        let item = state.plaid.item_get(&access_token).await?.item;

        let institution_id = item
            .institution_id
            .ok_or(Error::MissingInstitution(item.item_id))?;

        let institution = state
            .plaid
            .institutions_get_by_id(&institution_id, &[CountryCode::US])
            .await?
            .institution;

        tracing::info!(%institution_id, name = %institution.name, "institution resolved");

        Ok(Json(BankName {
            name: institution.name,
        }))
    }
}
