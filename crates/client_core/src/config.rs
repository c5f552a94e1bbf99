use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use url::Url;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Where the catalog service lives and how long a single request may take.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    base_url: String,
    api_path: String,
    pub request_timeout: Duration,
}

impl GatewayConfig {
    pub fn new(base_url: &str, api_path: &str) -> Result<Self> {
        let parsed = Url::parse(base_url.trim())
            .with_context(|| format!("invalid catalog base url: {base_url}"))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(anyhow!(
                "catalog base url must start with http:// or https://: {base_url}"
            ));
        }

        let api_path = api_path.trim().trim_matches('/');
        if api_path.is_empty() {
            return Err(anyhow!("catalog api path must not be empty"));
        }

        Ok(Self {
            base_url: parsed.as_str().trim_end_matches('/').to_string(),
            api_path: api_path.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        })
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn api_path(&self) -> &str {
        &self.api_path
    }

    pub fn signin_url(&self) -> String {
        format!("{}/v2/admin/signin", self.base_url)
    }

    pub fn user_check_url(&self) -> String {
        format!("{}/v2/api/user/check", self.base_url)
    }

    pub fn products_url(&self) -> String {
        format!("{}/v2/api/{}/admin/products", self.base_url, self.api_path)
    }

    /// The id is appended as one percent-encoded path segment.
    pub fn product_url(&self, id: Option<&str>) -> String {
        let collection = format!("{}/v2/api/{}/admin/product", self.base_url, self.api_path);
        let Some(id) = id else {
            return collection;
        };
        let mut url = match Url::parse(&collection) {
            Ok(url) => url,
            Err(_) => return format!("{collection}/{id}"),
        };
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.push(id);
        }
        url.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_endpoint_urls_from_base_and_path() {
        let config = GatewayConfig::new("https://api.example.test/", "/shop/").expect("config");
        assert_eq!(config.base_url(), "https://api.example.test");
        assert_eq!(config.signin_url(), "https://api.example.test/v2/admin/signin");
        assert_eq!(
            config.user_check_url(),
            "https://api.example.test/v2/api/user/check"
        );
        assert_eq!(
            config.products_url(),
            "https://api.example.test/v2/api/shop/admin/products"
        );
        assert_eq!(
            config.product_url(Some("X")),
            "https://api.example.test/v2/api/shop/admin/product/X"
        );
        assert_eq!(
            config.product_url(None),
            "https://api.example.test/v2/api/shop/admin/product"
        );
    }

    #[test]
    fn product_id_is_escaped_as_a_single_segment() {
        let config = GatewayConfig::new("https://api.example.test", "shop").expect("config");
        assert_eq!(
            config.product_url(Some("a/b c?d")),
            "https://api.example.test/v2/api/shop/admin/product/a%2Fb%20c%3Fd"
        );
    }

    #[test]
    fn rejects_non_http_base_and_empty_path() {
        assert!(GatewayConfig::new("ftp://api.example.test", "shop").is_err());
        assert!(GatewayConfig::new("not a url", "shop").is_err());
        assert!(GatewayConfig::new("http://localhost:1", " / ").is_err());
    }
}
