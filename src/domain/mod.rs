//! Domain layer types and invariants.

pub mod defaults;
pub mod drafts;
pub mod entities;
pub mod types;
pub mod validation;
