// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use reqwest::header::{self, HeaderMap, HeaderValue};
use url::Url;

use crate::config::CrawlerConfig;
use crate::error::{AppError, Result};

/// Create the shared asynchronous HTTP client.
///
/// The client carries the configured default cookies on every request; some
/// sites only serve article pages once a consent cookie is present.
pub fn create_client(config: &CrawlerConfig) -> Result<reqwest::Client> {
    let mut headers = HeaderMap::new();
    if !config.default_cookies.is_empty() {
        let cookie = config
            .default_cookies
            .iter()
            .map(|c| format!("{}={}", c.name, c.value))
            .collect::<Vec<_>>()
            .join("; ");
        let value = HeaderValue::from_str(&cookie)
            .map_err(|e| AppError::config(format!("invalid default cookie header: {e}")))?;
        headers.insert(header::COOKIE, value);
    }

    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .default_headers(headers)
        .build()?;
    Ok(client)
}

/// Fetch a page, following redirects.
///
/// Returns the final URL after redirects together with the body. Non-2xx
/// responses are an error; redelivery policy is left to the job transport.
pub async fn fetch_page(client: &reqwest::Client, url: &str) -> Result<(Url, String)> {
    let response = client.get(url).send().await?.error_for_status()?;
    let final_url = response.url().clone();
    let body = response.text().await?;
    Ok((final_url, body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CookieDef;

    #[test]
    fn test_create_client_with_cookies() {
        let config = CrawlerConfig::default();
        assert!(!config.default_cookies.is_empty());
        assert!(create_client(&config).is_ok());
    }

    #[test]
    fn test_create_client_rejects_bad_cookie() {
        let mut config = CrawlerConfig::default();
        config.default_cookies = vec![CookieDef {
            name: "broken".to_string(),
            value: "line\nbreak".to_string(),
        }];
        assert!(create_client(&config).is_err());
    }
}
