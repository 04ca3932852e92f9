use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Url};

use crate::infra::error::InfraError;

/// Shared HTTP plumbing for the hosted REST and auth endpoints.
#[derive(Clone, Debug)]
pub struct SupabaseClient {
    http: Client,
    base: Url,
    anon_key: String,
}

impl SupabaseClient {
    pub fn new(
        url: &str,
        anon_key: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, InfraError> {
        let mut base = Url::parse(url)
            .map_err(|err| InfraError::configuration(format!("invalid backend url `{url}`: {err}")))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let mut builder = Client::builder().user_agent(Self::user_agent());
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|err| InfraError::backend(format!("failed to build http client: {err}")))?;

        Ok(Self {
            http,
            base,
            anon_key: anon_key.into(),
        })
    }

    pub fn user_agent() -> &'static str {
        concat!("knoxs/", env!("CARGO_PKG_VERSION"))
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Resolve `path` against the base and append `query`.
    pub fn url(&self, path: &str, query: &[(&str, &str)]) -> Result<Url, url::ParseError> {
        let mut url = self.base.join(path)?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    /// Request carrying the project key, authorized as `bearer` or as the
    /// anonymous role.
    pub fn request(&self, method: Method, url: Url, bearer: Option<&str>) -> RequestBuilder {
        self.http
            .request(method, url)
            .header("apikey", self.anon_key.as_str())
            .bearer_auth(bearer.unwrap_or(self.anon_key.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_gains_trailing_slash() {
        let client =
            SupabaseClient::new("https://project.supabase.co/sub", "anon", None).expect("client");
        assert_eq!(client.base().as_str(), "https://project.supabase.co/sub/");

        let url = client
            .url("rest/v1/gallery_images", &[("select", "*"), ("order", "display_order.asc")])
            .expect("url");
        assert_eq!(
            url.as_str(),
            "https://project.supabase.co/sub/rest/v1/gallery_images?select=*&order=display_order.asc"
        );
    }

    #[test]
    fn rejects_invalid_url() {
        assert!(matches!(
            SupabaseClient::new("not a url", "anon", None),
            Err(InfraError::Configuration { .. })
        ));
    }
}
