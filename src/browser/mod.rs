//! Headless-browser extraction path
//!
//! Fallback for posts the JSON endpoint will not serve. Every URL gets a
//! fresh browser: launch, navigate, snapshot the rendered HTML, tear down.
//! The snapshot is then mined for a caption by [`strategy`], which never
//! touches the network.

mod session;
mod strategy;

pub use session::BrowserSession;
pub use strategy::recover_record;

use thiserror::Error;
use tracing::info;

use crate::config::Config;
use crate::extract::PostRecord;
use crate::url::parse_post_url;

#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("Not a supported post URL: {0}")]
    InvalidUrl(String),

    #[error("Failed to launch browser: {0}")]
    Launch(String),

    #[error("Browser protocol error: {0}")]
    Cdp(#[from] chromiumoxide::error::CdpError),

    #[error("Navigation to {url} did not complete within {seconds}s")]
    NavigationTimeout { url: String, seconds: u64 },

    #[error("Page produced no usable document")]
    EmptyDocument,
}

/// Extracts one post through a disposable browser session
///
/// The session is torn down whether or not the page loads, so worker pools
/// never leak Chromium processes.
pub async fn extract_post(
    config: &Config,
    label: &str,
    url: &str,
) -> Result<PostRecord, BrowserError> {
    let parsed = parse_post_url(url).map_err(|e| BrowserError::InvalidUrl(e.to_string()))?;

    session::polite_jitter(&config.browser).await;

    let session = BrowserSession::launch(&config.browser).await?;
    info!("Browser session up for {}", parsed.canonical_url);
    let fetched = session
        .fetch_page_html(&parsed.canonical_url, &config.browser)
        .await;
    session.shutdown().await;

    let html = fetched?;
    Ok(recover_record(
        &html,
        label,
        &parsed.canonical_url,
        &config.browser,
    ))
}
