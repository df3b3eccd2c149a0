use std::time::Duration;

use chrono::DateTime;
use serde::Deserialize;
use tracing::debug;

use super::classify::{ExtractError, FetchFailure, RateLimitSignature};
use super::retry::{retry_with_backoff, RetryPolicy};
use super::text::{normalize_whitespace, truncate_chars};
use super::types::{PostRecord, DEFAULT_LABEL};
use crate::config::Config;
use crate::url::{parse_post_url, ParsedPostUrl};

/// Fallback user agent when the configured list is empty
const FALLBACK_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// How much of an unparseable body to keep in the error message
const BODY_SNIPPET_CHARS: usize = 200;

/// Builds the shared HTTP client used for metadata requests
///
/// # Arguments
///
/// * `config` - Application configuration with timeouts and user agents
///
/// # Returns
///
/// * `Ok(Client)` - Configured HTTP client
/// * `Err(PostcapError)` - If the client could not be constructed
pub fn build_http_client(config: &Config) -> crate::Result<reqwest::Client> {
    let user_agent = config
        .browser
        .user_agents
        .first()
        .cloned()
        .unwrap_or_else(|| FALLBACK_USER_AGENT.to_string());

    let client = reqwest::Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(config.fetch.request_timeout_secs))
        .connect_timeout(Duration::from_secs(config.fetch.connect_timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()?;

    Ok(client)
}

/// Fetches post metadata from the platform's JSON endpoint
pub struct MetadataClient {
    http: reqwest::Client,
    base_url: String,
}

impl MetadataClient {
    pub fn new(config: &Config) -> crate::Result<Self> {
        Ok(Self {
            http: build_http_client(config)?,
            base_url: config.source.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Runs one fetch attempt for the given post
    ///
    /// Every way this can go wrong is folded into a classified
    /// [`FetchFailure`] so the retry layer can decide what to do with it.
    pub async fn fetch_post(&self, post: &ParsedPostUrl) -> Result<PostRecord, FetchFailure> {
        let endpoint = format!("{}/{}/{}/", self.base_url, post.section, post.shortcode);
        debug!("Fetching post metadata from {}", endpoint);

        let response = self
            .http
            .get(&endpoint)
            .query(&[("__a", "1"), ("__d", "dis")])
            .send()
            .await
            .map_err(classify_transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(classify_status(status));
        }

        let body = response.text().await.map_err(classify_transport)?;
        let payload: PostPayload = serde_json::from_str(&body).map_err(|_| {
            FetchFailure::unclassified(format!(
                "Unexpected response body: {}",
                truncate_chars(body.trim(), BODY_SNIPPET_CHARS)
            ))
        })?;

        build_record(post, payload)
    }
}

/// High-level extraction entry point combining parsing, fetching, and retries
pub struct PostExtractor {
    client: MetadataClient,
    policy: RetryPolicy,
    signature: RateLimitSignature,
}

impl PostExtractor {
    pub fn new(config: &Config) -> crate::Result<Self> {
        Ok(Self {
            client: MetadataClient::new(config)?,
            policy: RetryPolicy::from_config(&config.fetch),
            signature: RateLimitSignature::from_config(&config.rate_limit),
        })
    }

    /// Extracts a single post, retrying transient failures
    ///
    /// # Arguments
    ///
    /// * `label` - Human-assigned name stored on the resulting record
    /// * `url` - The post URL as the user supplied it
    pub async fn extract(&self, label: &str, url: &str) -> Result<PostRecord, ExtractError> {
        let parsed =
            parse_post_url(url).map_err(|e| FetchFailure::invalid_input(e.to_string()))?;

        let mut record = retry_with_backoff(&self.policy, &self.signature, || {
            self.client.fetch_post(&parsed)
        })
        .await?;

        record.label = label.to_string();
        Ok(record)
    }
}

fn classify_status(status: reqwest::StatusCode) -> FetchFailure {
    match status.as_u16() {
        404 | 410 => FetchFailure::not_found(format!("Post not found (HTTP {})", status.as_u16())),
        401 => FetchFailure::forbidden("Login required (HTTP 401)"),
        429 => FetchFailure::rate_limited("Rate limited (HTTP 429)"),
        403 => FetchFailure::unclassified("HTTP 403 Forbidden"),
        code if (500..600).contains(&code) => {
            FetchFailure::unclassified(format!("Server error (HTTP {})", code))
        }
        code => FetchFailure::unclassified(format!("Unexpected response (HTTP {})", code)),
    }
}

fn classify_transport(err: reqwest::Error) -> FetchFailure {
    if err.is_timeout() {
        FetchFailure::transport(format!("Request timed out: {}", err))
    } else if err.is_connect() {
        FetchFailure::transport(format!("Connection failed: {}", err))
    } else {
        FetchFailure::transport(err.to_string())
    }
}

fn build_record(post: &ParsedPostUrl, payload: PostPayload) -> Result<PostRecord, FetchFailure> {
    if payload.require_login == Some(true) {
        return Err(FetchFailure::forbidden(
            "The server requires a login to serve this post",
        ));
    }
    if payload.status.as_deref() == Some("fail") {
        let message = payload
            .message
            .unwrap_or_else(|| "request marked as failed".to_string());
        return Err(FetchFailure::unclassified(message));
    }

    let media = payload
        .graphql
        .and_then(|envelope| envelope.shortcode_media)
        .ok_or_else(|| FetchFailure::not_found("Response carried no media node"))?;

    let caption_text = media
        .edge_media_to_caption
        .edges
        .first()
        .map(|edge| normalize_whitespace(&edge.node.text))
        .unwrap_or_default();

    let author_handle = match media.owner {
        Some(owner) if !owner.username.is_empty() => owner.username,
        _ => "unknown".to_string(),
    };

    let media_count = media
        .edge_sidecar_to_children
        .map(|children| children.edges.len() as u32)
        .filter(|count| *count > 0)
        .unwrap_or(1);

    Ok(PostRecord {
        label: DEFAULT_LABEL.to_string(),
        source_url: post.canonical_url.clone(),
        caption_text,
        author_handle,
        like_count: media.edge_media_preview_like.count,
        published_at: media
            .taken_at_timestamp
            .and_then(|ts| DateTime::from_timestamp(ts, 0)),
        media_count,
        is_video: media.is_video,
    })
}

#[derive(Debug, Deserialize)]
struct PostPayload {
    graphql: Option<GraphqlEnvelope>,
    require_login: Option<bool>,
    status: Option<String>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GraphqlEnvelope {
    shortcode_media: Option<ShortcodeMedia>,
}

#[derive(Debug, Deserialize)]
struct ShortcodeMedia {
    #[serde(default)]
    edge_media_to_caption: EdgeCollection,
    owner: Option<Owner>,
    #[serde(default)]
    edge_media_preview_like: LikeCount,
    taken_at_timestamp: Option<i64>,
    edge_sidecar_to_children: Option<EdgeCollection>,
    #[serde(default)]
    is_video: bool,
}

#[derive(Debug, Default, Deserialize)]
struct EdgeCollection {
    #[serde(default)]
    edges: Vec<Edge>,
}

#[derive(Debug, Deserialize)]
struct Edge {
    #[serde(default)]
    node: CaptionNode,
}

#[derive(Debug, Default, Deserialize)]
struct CaptionNode {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct Owner {
    #[serde(default)]
    username: String,
}

#[derive(Debug, Default, Deserialize)]
struct LikeCount {
    #[serde(default)]
    count: u64,
}
