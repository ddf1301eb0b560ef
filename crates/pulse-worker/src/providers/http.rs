//! JSON-over-HTTP client for the AI gateway.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use pulse_core::config::ProviderConfig;
use pulse_core::error::{AppError, ErrorKind};
use pulse_core::result::AppResult;

use super::{
    DiscoveredSource, NewsSummarizer, NewsSummary, NewsSummaryRequest, OgImageFetcher,
    PatchSummarizer, PatchSummary, PatchSummaryRequest, ReleaseDiscoverer,
    ReleaseDiscoveryOutcome, ReturnEvaluator, ReturnMatchRequest, ReturnVerdict,
    SeasonalCandidate, SeasonalDiscoverer, SeasonalDiscovery, SeasonalDiscoveryRequest,
    SourceDiscoverer, SourceDiscoveryRequest,
};

/// Provider implementation calling the AI gateway over HTTP.
#[derive(Debug, Clone)]
pub struct HttpProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpProvider {
    /// Build a client from the providers section of the configuration.
    pub fn new(config: &ProviderConfig) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| {
                AppError::with_source(ErrorKind::Configuration, "Failed to build HTTP client", e)
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> AppResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}/{}", self.base_url, path);
        tracing::debug!(%url, "Calling AI gateway");

        let mut request = self.client.post(&url).json(body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        request
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| external_error(path, e))?
            .json::<T>()
            .await
            .map_err(|e| external_error(path, e))
    }
}

fn external_error(path: &str, err: reqwest::Error) -> AppError {
    AppError::with_source(
        ErrorKind::ExternalService,
        format!("AI gateway call '{path}' failed: {err}"),
        err,
    )
}

#[async_trait]
impl PatchSummarizer for HttpProvider {
    async fn summarize_patch(&self, request: &PatchSummaryRequest) -> AppResult<PatchSummary> {
        self.post_json("summaries/patch", request).await
    }
}

#[async_trait]
impl SourceDiscoverer for HttpProvider {
    async fn discover_source(
        &self,
        request: &SourceDiscoveryRequest,
    ) -> AppResult<DiscoveredSource> {
        self.post_json("discovery/source", request).await
    }
}

#[async_trait]
impl NewsSummarizer for HttpProvider {
    async fn summarize_news(&self, request: &NewsSummaryRequest) -> AppResult<NewsSummary> {
        self.post_json("summaries/news", request).await
    }
}

#[async_trait]
impl SeasonalDiscoverer for HttpProvider {
    async fn discover_seasonal(
        &self,
        request: &SeasonalDiscoveryRequest,
    ) -> AppResult<SeasonalDiscovery> {
        let raw: serde_json::Value = self.post_json("discovery/seasonal", request).await?;
        let candidates: Vec<SeasonalCandidate> = match raw.get("candidates") {
            Some(candidates) => serde_json::from_value(candidates.clone())?,
            None => Vec::new(),
        };
        Ok(SeasonalDiscovery { candidates, raw })
    }
}

#[async_trait]
impl ReturnEvaluator for HttpProvider {
    async fn evaluate_return(&self, request: &ReturnMatchRequest) -> AppResult<ReturnVerdict> {
        self.post_json("matching/return", request).await
    }
}

#[async_trait]
impl ReleaseDiscoverer for HttpProvider {
    async fn discover_releases(&self, subject_id: Uuid) -> AppResult<ReleaseDiscoveryOutcome> {
        self.post_json(
            "discovery/releases",
            &serde_json::json!({ "subject_id": subject_id }),
        )
        .await
    }
}

#[async_trait]
impl OgImageFetcher for HttpProvider {
    async fn fetch_og_image(&self, page_url: &str) -> AppResult<Option<String>> {
        let response = self
            .client
            .get(page_url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| external_error("og:image", e))?;
        let page = response.url().clone();
        let html = response
            .text()
            .await
            .map_err(|e| external_error("og:image", e))?;

        Ok(extract_og_image(&html).and_then(|content| resolve_image_url(&page, &content)))
    }
}

/// Resolve a possibly relative image reference against the page it came from.
fn resolve_image_url(page: &reqwest::Url, content: &str) -> Option<String> {
    page.join(content).ok().map(String::from)
}

/// Find the image declared by the page's Open Graph meta tags.
///
/// The first `og:image` wins; `og:image:secure_url` is used when no
/// `og:image` tag carries a value.
pub fn extract_og_image(html: &str) -> Option<String> {
    let lower = html.to_ascii_lowercase();
    let mut secure_url = None;
    let mut offset = 0;

    while let Some(start) = lower[offset..].find("<meta") {
        let body_start = offset + start + "<meta".len();
        let body_end = lower[body_start..]
            .find('>')
            .map_or(lower.len(), |end| body_start + end);
        offset = body_end;

        let body = &html[body_start..body_end];
        if !body.starts_with(|c: char| c.is_ascii_whitespace() || c == '/') {
            continue;
        }

        let attributes = parse_attributes(body);
        let Some(content) = attribute(&attributes, "content") else {
            continue;
        };
        if declares(&attributes, "og:image") {
            return Some(content.to_string());
        }
        if secure_url.is_none() && declares(&attributes, "og:image:secure_url") {
            secure_url = Some(content.to_string());
        }
    }

    secure_url
}

fn declares(attributes: &[(String, String)], key: &str) -> bool {
    attributes.iter().any(|(name, value)| {
        (name == "property" || name == "name") && value.trim().eq_ignore_ascii_case(key)
    })
}

fn attribute<'a>(attributes: &'a [(String, String)], name: &str) -> Option<&'a str> {
    attributes
        .iter()
        .find(|(attr, _)| attr == name)
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
}

/// Split a tag body into `(lowercased name, value)` pairs.
///
/// Whitespace around `=` is allowed; values may be double-, single- or
/// unquoted.
fn parse_attributes(body: &str) -> Vec<(String, String)> {
    let bytes = body.as_bytes();
    let skip_whitespace = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        i
    };

    let mut attributes = Vec::new();
    let mut i = 0;
    loop {
        i = skip_whitespace(i);
        if i >= bytes.len() {
            break;
        }
        if bytes[i] == b'/' {
            i += 1;
            continue;
        }

        let name_start = i;
        while i < bytes.len() && !bytes[i].is_ascii_whitespace() && !matches!(bytes[i], b'=' | b'/')
        {
            i += 1;
        }
        let name = body[name_start..i].to_ascii_lowercase();

        i = skip_whitespace(i);
        if bytes.get(i) != Some(&b'=') {
            attributes.push((name, String::new()));
            continue;
        }
        i = skip_whitespace(i + 1);

        let value = match bytes.get(i) {
            Some(&quote) if quote == b'"' || quote == b'\'' => {
                let value_start = i + 1;
                let value_end = body[value_start..]
                    .find(char::from(quote))
                    .map_or(body.len(), |end| value_start + end);
                i = (value_end + 1).min(body.len());
                &body[value_start..value_end]
            }
            _ => {
                let value_start = i;
                while i < bytes.len() && !bytes[i].is_ascii_whitespace() {
                    i += 1;
                }
                &body[value_start..i]
            }
        };
        attributes.push((name, value.to_string()));
    }

    attributes
}
