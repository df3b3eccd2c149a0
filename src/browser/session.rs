use std::time::Duration;

use chromiumoxide::browser::{Browser, BrowserConfig as ChromeConfig};
use chromiumoxide::Page;
use futures::StreamExt;
use rand::seq::SliceRandom;
use rand::Rng;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::BrowserError;
use crate::config::BrowserConfig;

/// How often to re-check the page for rendered content
const CONTENT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Elements whose presence means the post body has rendered
const CONTENT_MARKERS: &[&str] = &[
    "meta[property='og:description']",
    "article h1",
    "div[data-testid='post-caption']",
    "span._ap3a",
];

/// One disposable headless-browser instance
///
/// Owns the Chromium process and the event handler task driving it. Call
/// [`BrowserSession::shutdown`] when done; dropping the session without it
/// can leave the child process running until the handler notices.
pub struct BrowserSession {
    browser: Browser,
    handler_task: JoinHandle<()>,
}

impl BrowserSession {
    /// Launches a fresh headless browser with a randomized user agent
    pub async fn launch(config: &BrowserConfig) -> Result<Self, BrowserError> {
        let mut builder = ChromeConfig::builder().no_sandbox().window_size(1280, 900);
        if let Some(user_agent) = pick_user_agent(config) {
            builder = builder.arg(format!("--user-agent={}", user_agent));
        }
        let launch_config = builder.build().map_err(BrowserError::Launch)?;

        let (browser, mut handler) = Browser::launch(launch_config).await?;
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        Ok(Self {
            browser,
            handler_task,
        })
    }

    /// Navigates to the URL and returns the rendered page HTML
    ///
    /// Navigation is bounded by the configured timeout. After it completes,
    /// the page is polled for known content markers for up to the content
    /// wait; if none show up the snapshot is taken anyway and the recovery
    /// strategies make of it what they can.
    pub async fn fetch_page_html(
        &self,
        url: &str,
        config: &BrowserConfig,
    ) -> Result<String, BrowserError> {
        let navigation = async {
            let page = self.browser.new_page(url).await?;
            page.wait_for_navigation().await?;
            Ok::<_, BrowserError>(page)
        };

        let page = tokio::time::timeout(
            Duration::from_secs(config.navigation_timeout_secs),
            navigation,
        )
        .await
        .map_err(|_| BrowserError::NavigationTimeout {
            url: url.to_string(),
            seconds: config.navigation_timeout_secs,
        })??;

        wait_for_content(&page, config).await;

        let html = page.content().await?;
        if html.trim().is_empty() {
            return Err(BrowserError::EmptyDocument);
        }
        Ok(html)
    }

    /// Closes the browser and stops its event handler
    pub async fn shutdown(mut self) {
        if let Err(e) = self.browser.close().await {
            warn!("Browser did not close cleanly: {}", e);
        }
        let _ = self.browser.wait().await;
        self.handler_task.abort();
    }
}

/// Sleeps a random interval so launches do not land in lockstep
pub async fn polite_jitter(config: &BrowserConfig) {
    let wait_ms = if config.jitter_max_ms > config.jitter_min_ms {
        rand::thread_rng().gen_range(config.jitter_min_ms..=config.jitter_max_ms)
    } else {
        config.jitter_min_ms
    };
    if wait_ms > 0 {
        debug!("Jittering {}ms before launch", wait_ms);
        tokio::time::sleep(Duration::from_millis(wait_ms)).await;
    }
}

fn pick_user_agent(config: &BrowserConfig) -> Option<String> {
    config.user_agents.choose(&mut rand::thread_rng()).cloned()
}

async fn wait_for_content(page: &Page, config: &BrowserConfig) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(config.content_wait_secs);
    loop {
        for marker in CONTENT_MARKERS {
            if page.find_element(*marker).await.is_ok() {
                return;
            }
        }
        if tokio::time::Instant::now() >= deadline {
            debug!("Content wait elapsed without a known marker");
            return;
        }
        tokio::time::sleep(CONTENT_POLL_INTERVAL).await;
    }
}
