//! One controller per group of `/api` endpoints.
//!
//! Every controller exposes a `router()` that is merged in [`crate::router`].

pub mod accounts;
pub mod connection;
pub mod institution;
pub mod link;

/// Shortens a token to its last few characters so it can be logged.
pub(crate) fn redacted(token: &str) -> String {
    let tail: String = token
        .chars()
        .rev()
        .take(4)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();

    format!("…{}", tail)
}
