//! KNOXS query cache
//!
//! One in-memory cache of collection reads shared by the public section
//! readers and the admin panel:
//!
//! - entries are keyed by `(collection, shape)`, see [`QueryKey`];
//! - concurrent reads of a loading key share a single store call;
//! - a mutation invalidates every shape of its collection at once.
//!
//! ## Configuration
//!
//! ```toml
//! [cache]
//! enabled = true
//! ```

mod config;
mod keys;
pub(crate) mod lock;
mod store;

pub use config::CacheConfig;
pub use keys::{QueryKey, QueryShape};
pub use store::{QueryCache, QueryState};
