//! Infrastructure adapters: backend clients, HTTP surfaces and telemetry.

pub mod backend;
pub mod error;
pub mod http;
pub mod memory;
pub mod supabase;
pub mod telemetry;
