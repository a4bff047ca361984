//! Request and response records for the Plaid endpoints the proxy forwards to.
//!
//! Fields the proxy reads (or the frontend depends on) are typed. Everything
//! else a response carries is kept in an `extra` map so that re-serializing a
//! record hands the caller the same payload Plaid returned.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Fields of a payload that have no typed counterpart.
pub type Extra = Map<String, Value>;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Product {
    Auth,
    Transactions,
    Identity,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountryCode {
    US,
}

// ------------------------------------------------------------------------
// link/token/create
// ------------------------------------------------------------------------

#[derive(Serialize, Debug, Clone)]
pub struct LinkTokenUser {
    pub client_user_id: String,
}

#[derive(Serialize, Debug, Clone)]
pub struct LinkTokenCreateRequest {
    pub client_name: String,
    pub language: String,
    pub country_codes: Vec<CountryCode>,
    pub user: LinkTokenUser,
    pub products: Vec<Product>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub android_package_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_uri: Option<String>,
}

impl LinkTokenCreateRequest {
    /// A US, English link token for auth, transactions and identity.
    pub fn new(client_name: impl Into<String>, client_user_id: impl Into<String>) -> Self {
        Self {
            client_name: client_name.into(),
            language: "en".to_string(),
            country_codes: vec![CountryCode::US],
            user: LinkTokenUser {
                client_user_id: client_user_id.into(),
            },
            products: vec![Product::Auth, Product::Transactions, Product::Identity],
            android_package_name: None,
            redirect_uri: None,
        }
    }

    pub fn with_android_package_name(mut self, name: Option<String>) -> Self {
        self.android_package_name = name;
        self
    }

    pub fn with_redirect_uri(mut self, uri: Option<String>) -> Self {
        self.redirect_uri = uri;
        self
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LinkTokenCreateResponse {
    pub link_token: String,
    pub expiration: String,
    pub request_id: String,
    #[serde(flatten)]
    pub extra: Extra,
}

// ------------------------------------------------------------------------
// item/public_token/exchange
// ------------------------------------------------------------------------

#[derive(Serialize, Debug)]
pub(crate) struct PublicTokenExchangeRequest<'a> {
    pub public_token: &'a str,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct ItemPublicTokenExchangeResponse {
    pub access_token: String,
    pub item_id: String,
    pub request_id: String,
}

// ------------------------------------------------------------------------
// item/get and institutions/get_by_id
// ------------------------------------------------------------------------

#[derive(Serialize, Debug)]
pub(crate) struct AccessTokenRequest<'a> {
    pub access_token: &'a str,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Item {
    pub item_id: String,
    /// Absent for items created without an institution, e.g. manual micro-deposits.
    pub institution_id: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ItemGetResponse {
    pub item: Item,
    pub request_id: String,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Serialize, Debug)]
pub(crate) struct InstitutionsGetByIdRequest<'a> {
    pub institution_id: &'a str,
    pub country_codes: &'a [CountryCode],
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Institution {
    pub institution_id: String,
    pub name: String,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct InstitutionsGetByIdResponse {
    pub institution: Institution,
    pub request_id: String,
}

// ------------------------------------------------------------------------
// accounts, balances and identity
// ------------------------------------------------------------------------

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Balances {
    pub available: Option<f64>,
    pub current: Option<f64>,
    pub limit: Option<f64>,
    pub iso_currency_code: Option<String>,
    pub unofficial_currency_code: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Account {
    pub account_id: String,
    pub name: String,
    pub mask: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    pub subtype: Option<String>,
    pub balances: Balances,
    /// Only populated by `identity/get`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub owners: Vec<Owner>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ContactPoint {
    pub data: String,
    pub primary: Option<bool>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct AddressData {
    pub street: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Address {
    pub data: AddressData,
    pub primary: Option<bool>,
}

/// An account holder as reported by `identity/get`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Owner {
    #[serde(default)]
    pub names: Vec<String>,
    #[serde(default)]
    pub phone_numbers: Vec<ContactPoint>,
    #[serde(default)]
    pub emails: Vec<ContactPoint>,
    #[serde(default)]
    pub addresses: Vec<Address>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AccountsBalanceGetResponse {
    pub accounts: Vec<Account>,
    pub item: Item,
    pub request_id: String,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct IdentityGetResponse {
    pub accounts: Vec<Account>,
    pub item: Item,
    pub request_id: String,
    #[serde(flatten)]
    pub extra: Extra,
}

impl IdentityGetResponse {
    /// All owners of all accounts, in account order and then owner order.
    pub fn into_owners(self) -> Vec<Owner> {
        self.accounts
            .into_iter()
            .flat_map(|account| account.owners)
            .collect()
    }
}

// ------------------------------------------------------------------------
// transactions/get
// ------------------------------------------------------------------------

/// An inclusive range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    /// The window `[end - days, end]`.
    pub fn trailing_days(end: NaiveDate, days: u64) -> Self {
        Self {
            start: end - Days::new(days),
            end,
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct TransactionsGetOptions {
    pub count: u32,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct TransactionsGetRequest {
    pub access_token: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub options: TransactionsGetOptions,
}

impl TransactionsGetRequest {
    pub fn new(access_token: impl Into<String>, window: DateWindow, count: u32) -> Self {
        Self {
            access_token: access_token.into(),
            start_date: window.start,
            end_date: window.end,
            options: TransactionsGetOptions { count },
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Transaction {
    pub transaction_id: String,
    pub account_id: String,
    pub amount: f64,
    pub iso_currency_code: Option<String>,
    pub date: NaiveDate,
    pub name: Option<String>,
    pub pending: bool,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TransactionsGetResponse {
    pub accounts: Vec<Account>,
    pub transactions: Vec<Transaction>,
    pub total_transactions: u64,
    pub item: Item,
    pub request_id: String,
    #[serde(flatten)]
    pub extra: Extra,
}

// ------------------------------------------------------------------------
// errors
// ------------------------------------------------------------------------

/// The error object Plaid returns with every non-2xx response.
#[derive(thiserror::Error, Serialize, Deserialize, Debug, Clone, PartialEq)]
#[error("{error_type} {error_code}: {error_message}")]
pub struct PlaidApiError {
    pub error_type: String,
    pub error_code: String,
    pub error_message: String,
    pub display_message: Option<String>,
    pub request_id: Option<String>,
}
