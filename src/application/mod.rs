//! Application services orchestrating the record store, cache and auth gate.

pub mod admin;
pub mod auth;
pub mod contact;
pub mod error;
pub mod repos;
pub mod sections;

#[cfg(test)]
pub(crate) mod test_support;
