//! HTTP surfaces: the public site API and the admin listener.

mod admin;
mod error;
mod middleware;
mod public;
mod state;

pub use admin::{build_admin_router, require_admin};
pub use error::{ApiError, ApiErrorBody, ApiErrorMessage, codes};
pub use middleware::RequestContext;
pub use public::build_router;
pub use state::{AdminState, HttpState};
