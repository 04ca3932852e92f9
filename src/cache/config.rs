//! Cache configuration.
//!
//! Controlled by the `[cache]` table of `knoxs.toml`.

#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Retain fetched results. When off, fetches are still shared between
    /// concurrent callers but every later read goes to the store.
    pub enabled: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl From<&crate::config::CacheSettings> for CacheConfig {
    fn from(settings: &crate::config::CacheSettings) -> Self {
        Self {
            enabled: settings.enabled,
        }
    }
}
