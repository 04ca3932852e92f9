//! KNOXS content service.
//!
//! Public sections and the admin panel read and write a hosted record store
//! through one query cache; the auth gate decides who reaches the panel.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
