//! CRM API client used by the `crmsync` CLI.
//!
//! Implements the engine's `KeyLookup` and `BatchWriter` seams over the
//! CRM's object search and v4 batch association endpoints, and resolves
//! credentials from flags, environment, and the saved auth file.
//!
//! No retries. No async runtime.

mod auth;
mod client;

pub use auth::{
    auth_file_path, load_auth, load_auth_from, resolve_credentials, resolve_from, Credentials,
    API_BASE_ENV, DEFAULT_API_BASE, TOKEN_ENV,
};
pub use client::{
    association_body, interpret_write, next_page_after, parse_multi_status, parse_search_results, search_body, HubClient,
    HubError,
};
