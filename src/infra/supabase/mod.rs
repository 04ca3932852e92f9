//! Adapters for the hosted backend: REST record store and auth endpoints.

mod auth;
mod client;
mod rest;

pub use auth::SupabaseAuth;
pub use client::SupabaseClient;
pub use rest::SupabaseStore;
