//! HTTP client for the inventory (MoySklad remap 1.2) JSON API.
//!
//! Every request carries the bearer token from [`SourceConfig`]; nothing is
//! read from process-global state. List endpoints are walked with
//! `limit`/`offset` until a short page or the reported total is reached.

use std::time::Duration;

use catmirror_core::AppConfig;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Client, Url};
use serde_json::Value;

use crate::error::SourceError;
use crate::retry::retry_with_backoff;
use crate::types::{
    Listing, PriceTier, PriceTierMap, SourceWarehouse, StockReportRow, StockSubject, WarehouseMap,
};

/// Upper bound on pages fetched for a single collection.
const MAX_PAGES: usize = 500;

const ACCEPT_JSON: &str = "application/json;charset=utf-8";

/// Connection settings for [`SourceClient`].
#[derive(Clone)]
pub struct SourceConfig {
    pub base_url: String,
    pub token: Option<String>,
    pub page_limit: u32,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub backoff_base_ms: u64,
}

impl SourceConfig {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            base_url: config.source_base_url.clone(),
            token: config.source_token.clone(),
            page_limit: config.source_page_limit,
            timeout_secs: config.source_request_timeout_secs,
            max_retries: config.source_max_retries,
            backoff_base_ms: config.source_retry_backoff_base_ms,
        }
    }
}

impl std::fmt::Debug for SourceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceConfig")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "[redacted]"))
            .field("page_limit", &self.page_limit)
            .field("timeout_secs", &self.timeout_secs)
            .field("max_retries", &self.max_retries)
            .field("backoff_base_ms", &self.backoff_base_ms)
            .finish()
    }
}

/// Builds the headers sent with every source request.
///
/// # Errors
///
/// Returns [`SourceError::MissingToken`] when `token` is absent or blank and
/// [`SourceError::InvalidToken`] when it cannot be encoded as a header.
pub fn auth_headers(token: Option<&str>) -> Result<HeaderMap, SourceError> {
    let token = token
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(SourceError::MissingToken)?;

    let mut bearer =
        HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| SourceError::InvalidToken)?;
    bearer.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, bearer);
    headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_JSON));
    Ok(headers)
}

/// Authenticated client for the inventory API.
pub struct SourceClient {
    client: Client,
    /// Always ends with exactly one `/` so relative endpoints join beneath it.
    base_url: Url,
    page_limit: u32,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl SourceClient {
    /// # Errors
    ///
    /// Returns [`SourceError::MissingToken`] or [`SourceError::InvalidToken`]
    /// before anything is sent, [`SourceError::InvalidUrl`] for a bad base URL,
    /// or [`SourceError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &SourceConfig) -> Result<Self, SourceError> {
        let headers = auth_headers(config.token.as_deref())?;

        let normalised = format!("{}/", config.base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| SourceError::InvalidUrl {
            url: config.base_url.clone(),
            reason: e.to_string(),
        })?;

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("catmirror/0.1 (catalog-sync)")
            .build()?;

        Ok(Self {
            client,
            base_url,
            page_limit: config.page_limit.clamp(1, 1000),
            max_retries: config.max_retries,
            backoff_base_ms: config.backoff_base_ms,
        })
    }

    /// Canonical href of an entity, as it appears in `meta.href` links.
    #[must_use]
    pub fn entity_href(&self, subject: StockSubject, id: &str) -> String {
        format!(
            "{}/entity/{}/{id}",
            self.base_url.as_str().trim_end_matches('/'),
            subject.as_str()
        )
    }

    /// Fetches every row of a list endpoint, following pagination.
    ///
    /// `endpoint` is relative to the base URL, e.g. `entity/productfolder`.
    ///
    /// # Errors
    ///
    /// Any page failing (after retries) fails the whole collection; there are
    /// no partial results. Returns [`SourceError::PaginationLimit`] if the
    /// collection does not end within the page guard.
    pub async fn fetch_collection(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> Result<Vec<Value>, SourceError> {
        let limit = u64::from(self.page_limit);
        let mut offset: u64 = 0;
        let mut collected = Vec::new();

        for _ in 0..MAX_PAGES {
            let mut url = self.endpoint_url(endpoint)?;
            {
                let mut pairs = url.query_pairs_mut();
                for (k, v) in params {
                    pairs.append_pair(k, v);
                }
                pairs.append_pair("limit", &limit.to_string());
                pairs.append_pair("offset", &offset.to_string());
            }

            let body = self.get_json(&url).await?;
            let listing: Listing =
                serde_json::from_value(body).map_err(|e| SourceError::Parse {
                    context: format!("{endpoint} (offset={offset})"),
                    source: e,
                })?;

            match listing {
                Listing::Bare(rows) => {
                    collected.extend(rows);
                    return Ok(collected);
                }
                Listing::Page { meta, rows } => {
                    let count = rows.len() as u64;
                    collected.extend(rows);
                    offset += count;

                    let total = meta.and_then(|m| m.size);
                    tracing::debug!(endpoint, offset, ?total, "source: fetched page");
                    if count < limit || total.is_some_and(|t| offset >= t) {
                        return Ok(collected);
                    }
                }
            }
        }

        Err(SourceError::PaginationLimit {
            endpoint: endpoint.to_owned(),
            max_pages: MAX_PAGES,
        })
    }

    /// Fetches the JSON document behind an absolute `meta.href`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::InvalidUrl`], [`SourceError::Http`],
    /// [`SourceError::Status`], or [`SourceError::Parse`].
    pub async fn fetch_related(&self, href: &str) -> Result<Value, SourceError> {
        let url = self.with_page_limit(parse_absolute(href)?);
        self.get_json(&url).await
    }

    /// Downloads raw bytes (image content) from an absolute URL with the same
    /// credentials as every other request.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::InvalidUrl`], [`SourceError::Http`], or
    /// [`SourceError::Status`].
    pub async fn fetch_bytes(&self, href: &str) -> Result<Vec<u8>, SourceError> {
        let url = parse_absolute(href)?;
        let client = &self.client;
        retry_with_backoff(self.max_retries, self.backoff_base_ms, move || {
            let url = url.clone();
            async move {
                let response = client.get(url).header(ACCEPT, "*/*").send().await?;
                let response = check_status(response)?;
                Ok(response.bytes().await?.to_vec())
            }
        })
        .await
    }

    /// Price-tier id to name, from company settings.
    ///
    /// # Errors
    ///
    /// Fails if the request fails or the body is not a list; individual
    /// malformed tiers are skipped.
    pub async fn fetch_price_tiers(&self) -> Result<PriceTierMap, SourceError> {
        let endpoint = "context/companysettings/pricetype";
        let url = self.with_page_limit(self.endpoint_url(endpoint)?);
        let body = self.get_json(&url).await?;
        let rows = match serde_json::from_value::<Listing>(body).map_err(|e| {
            SourceError::Parse {
                context: endpoint.to_owned(),
                source: e,
            }
        })? {
            Listing::Bare(rows) | Listing::Page { rows, .. } => rows,
        };

        Ok(rows
            .into_iter()
            .filter_map(|row| parse_or_skip::<PriceTier>(row, endpoint))
            .map(|tier| (tier.id, tier.name))
            .collect())
    }

    /// Warehouse id to name.
    ///
    /// # Errors
    ///
    /// Fails if the collection cannot be fetched; individual malformed
    /// warehouses are skipped.
    pub async fn fetch_warehouses(&self) -> Result<WarehouseMap, SourceError> {
        let endpoint = "entity/store";
        let rows = self.fetch_collection(endpoint, &[]).await?;
        Ok(rows
            .into_iter()
            .filter_map(|row| parse_or_skip::<SourceWarehouse>(row, endpoint))
            .map(|w| (w.id, w.name))
            .collect())
    }

    /// Per-store stock report rows for one product or variant.
    ///
    /// # Errors
    ///
    /// Fails if the report cannot be fetched.
    pub async fn fetch_stock_report(
        &self,
        subject: StockSubject,
        id: &str,
    ) -> Result<Vec<StockReportRow>, SourceError> {
        let endpoint = "report/stock/bystore";
        let filter = format!("{}={}", subject.as_str(), self.entity_href(subject, id));
        let rows = self
            .fetch_collection(endpoint, &[("filter", &filter)])
            .await?;
        Ok(rows
            .into_iter()
            .filter_map(|row| parse_or_skip::<StockReportRow>(row, endpoint))
            .collect())
    }

    fn endpoint_url(&self, endpoint: &str) -> Result<Url, SourceError> {
        self.base_url
            .join(endpoint.trim_start_matches('/'))
            .map_err(|e| SourceError::InvalidUrl {
                url: endpoint.to_owned(),
                reason: e.to_string(),
            })
    }

    /// GET with retries, a 2xx check, and JSON parsing.
    /// Adds `limit=<page_limit>` unless the link already carries one.
    fn with_page_limit(&self, mut url: Url) -> Url {
        if !url.query_pairs().any(|(key, _)| key == "limit") {
            url.query_pairs_mut()
                .append_pair("limit", &self.page_limit.to_string());
        }
        url
    }

    async fn get_json(&self, url: &Url) -> Result<Value, SourceError> {
        let client = &self.client;
        retry_with_backoff(self.max_retries, self.backoff_base_ms, move || {
            let url = url.clone();
            async move {
                let response = client.get(url.clone()).send().await?;
                let response = check_status(response)?;
                let body = response.text().await?;
                serde_json::from_str(&body).map_err(|e| SourceError::Parse {
                    context: url.path().to_owned(),
                    source: e,
                })
            }
        })
        .await
    }
}

fn check_status(response: reqwest::Response) -> Result<reqwest::Response, SourceError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(SourceError::Status {
            status: status.as_u16(),
            url: response.url().path().to_owned(),
        })
    }
}

fn parse_absolute(href: &str) -> Result<Url, SourceError> {
    Url::parse(href).map_err(|e| SourceError::InvalidUrl {
        url: href.to_owned(),
        reason: e.to_string(),
    })
}

fn parse_or_skip<T: serde::de::DeserializeOwned>(row: Value, endpoint: &str) -> Option<T> {
    match serde_json::from_value::<T>(row) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            tracing::warn!(endpoint, error = %e, "source: skipping malformed row");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(base_url: &str, token: Option<&str>) -> SourceConfig {
        SourceConfig {
            base_url: base_url.to_owned(),
            token: token.map(str::to_owned),
            page_limit: 1000,
            timeout_secs: 5,
            max_retries: 0,
            backoff_base_ms: 0,
        }
    }

    #[test]
    fn auth_headers_set_bearer_and_accept() {
        let headers = auth_headers(Some("secret")).expect("headers");
        assert_eq!(headers[AUTHORIZATION], "Bearer secret");
        assert!(headers[AUTHORIZATION].is_sensitive());
        assert_eq!(headers[ACCEPT], ACCEPT_JSON);
    }

    #[test]
    fn auth_headers_reject_missing_or_blank_token() {
        assert!(matches!(auth_headers(None), Err(SourceError::MissingToken)));
        assert!(matches!(
            auth_headers(Some("   ")),
            Err(SourceError::MissingToken)
        ));
    }

    #[test]
    fn auth_headers_reject_unencodable_token() {
        assert!(matches!(
            auth_headers(Some("bad\ntoken")),
            Err(SourceError::InvalidToken)
        ));
    }

    #[test]
    fn new_fails_without_token() {
        let err = SourceClient::new(&config("https://api.example.test/api/remap/1.2", None));
        assert!(matches!(err, Err(SourceError::MissingToken)));
    }

    #[test]
    fn endpoint_url_joins_beneath_base_path() {
        let client = SourceClient::new(&config(
            "https://api.example.test/api/remap/1.2/",
            Some("t"),
        ))
        .expect("client");
        let url = client.endpoint_url("entity/productfolder").expect("url");
        assert_eq!(
            url.as_str(),
            "https://api.example.test/api/remap/1.2/entity/productfolder"
        );
    }

    #[test]
    fn entity_href_matches_meta_links() {
        let client = SourceClient::new(&config("https://api.example.test/api/remap/1.2", Some("t")))
            .expect("client");
        assert_eq!(
            client.entity_href(StockSubject::Variant, "v-1"),
            "https://api.example.test/api/remap/1.2/entity/variant/v-1"
        );
    }

    #[test]
    fn debug_redacts_token() {
        let rendered = format!("{:?}", config("https://x", Some("secret")));
        assert!(!rendered.contains("secret"));
    }
}
