use scraper::{Html, Selector};
use tracing::debug;

use crate::config::BrowserConfig;
use crate::extract::{normalize_whitespace, PostRecord};

/// DOM selectors tried for caption text, in order of trust
///
/// The class-based entry tracks the platform's current obfuscated caption
/// span and will need updating when their frontend build rotates names.
const CAPTION_MARKUP_SELECTORS: &[&str] = &[
    "article h1",
    "div[data-testid='post-caption'] span",
    "span._ap3a",
];

/// Builds a [`PostRecord`] from a rendered page snapshot
///
/// This never fails: a page with no recoverable caption still yields a
/// record carrying the configured placeholder, since a video post with an
/// empty description is a perfectly normal outcome. Counters the rendered
/// page does not expose stay at their defaults.
pub fn recover_record(
    html: &str,
    label: &str,
    url: &str,
    config: &BrowserConfig,
) -> PostRecord {
    let document = Html::parse_document(html);

    let caption_text = find_caption(&document, config).unwrap_or_else(|| {
        debug!("No caption recovered for {}, using placeholder", url);
        config.placeholder_caption.clone()
    });

    let author_handle = find_author(&document).unwrap_or_else(|| "unknown".to_string());

    PostRecord {
        label: label.to_string(),
        source_url: url.to_string(),
        caption_text,
        author_handle,
        like_count: 0,
        published_at: None,
        media_count: 1,
        is_video: detect_video(&document),
    }
}

/// Tries each recovery strategy in order and keeps the first good candidate
///
/// The order goes share metadata, plain meta description, visible markup,
/// and finally the document title. Candidates shorter than the configured
/// minimum are noise (like a bare "Instagram" title) and are skipped.
fn find_caption(document: &Html, config: &BrowserConfig) -> Option<String> {
    let mut candidates = Vec::new();

    if let Some(content) = meta_content(document, "meta[property='og:description']") {
        candidates.push(strip_share_preamble(&content));
    }
    if let Some(content) = meta_content(document, "meta[name='description']") {
        candidates.push(content);
    }
    for selector in CAPTION_MARKUP_SELECTORS {
        if let Some(text) = element_text(document, selector) {
            candidates.push(text);
        }
    }
    if let Some(title) = meta_content(document, "meta[property='og:title']")
        .or_else(|| element_text(document, "title"))
    {
        candidates.push(strip_share_preamble(&title));
    }

    candidates
        .into_iter()
        .map(|candidate| normalize_whitespace(&candidate))
        .find(|candidate| candidate.chars().count() >= config.min_caption_length)
}

fn find_author(document: &Html) -> Option<String> {
    let title = meta_content(document, "meta[property='og:title']")?;
    parse_author(&title)
}

/// Pulls an author handle out of a share title
///
/// Titles look like `Jane Doe (@janedoe) on Instagram: "..."`. The
/// parenthesized handle wins when present; otherwise the display name
/// before " on Instagram" is used.
fn parse_author(title: &str) -> Option<String> {
    if let Some(start) = title.find("(@") {
        let rest = &title[start + 2..];
        if let Some(end) = rest.find(')') {
            let handle = rest[..end].trim();
            if !handle.is_empty() {
                return Some(handle.to_string());
            }
        }
    }

    let position = title.find(" on Instagram")?;
    let name = title[..position].trim();
    (!name.is_empty()).then(|| name.to_string())
}

fn detect_video(document: &Html) -> bool {
    meta_content(document, "meta[property='og:video']").is_some()
        || meta_content(document, "meta[property='og:video:url']").is_some()
        || meta_content(document, "meta[property='og:type']")
            .map(|kind| kind.contains("video"))
            .unwrap_or(false)
}

/// Cuts the "N likes, M comments - author on date:" preamble off share text
fn strip_share_preamble(content: &str) -> String {
    for (open, close) in [(": \"", "\""), (": \u{201c}", "\u{201d}")] {
        if let Some(index) = content.find(open) {
            let caption = &content[index + open.len()..];
            return caption.trim_end_matches(close).to_string();
        }
    }
    content.to_string()
}

fn meta_content(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    let element = document.select(&selector).next()?;
    let content = element.value().attr("content")?.trim();
    if content.is_empty() {
        None
    } else {
        Some(content.to_string())
    }
}

fn element_text(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    let element = document.select(&selector).next()?;
    let text = element.text().collect::<String>();
    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> BrowserConfig {
        BrowserConfig::default()
    }

    fn recover(html: &str) -> PostRecord {
        recover_record(html, "Test", "https://www.instagram.com/p/ABC/", &config())
    }

    #[test]
    fn test_caption_from_og_description_with_preamble() {
        let html = r#"<html><head>
            <meta property="og:description" content="120 likes, 4 comments - janedoe on May 1, 2024: &quot;Morning light over the harbor&quot;">
        </head><body></body></html>"#;

        let record = recover(html);
        assert_eq!(record.caption_text, "Morning light over the harbor");
    }

    #[test]
    fn test_caption_from_og_description_without_preamble() {
        let html = r#"<html><head>
            <meta property="og:description" content="Just the caption itself">
        </head><body></body></html>"#;

        assert_eq!(recover(html).caption_text, "Just the caption itself");
    }

    #[test]
    fn test_caption_falls_back_to_meta_description() {
        let html = r#"<html><head>
            <meta name="description" content="A plain description caption">
        </head><body></body></html>"#;

        assert_eq!(recover(html).caption_text, "A plain description caption");
    }

    #[test]
    fn test_caption_from_article_heading() {
        let html = r#"<html><body>
            <article><h1>Weekend in the mountains with friends</h1></article>
        </body></html>"#;

        assert_eq!(
            recover(html).caption_text,
            "Weekend in the mountains with friends"
        );
    }

    #[test]
    fn test_caption_from_testid_container() {
        let html = r#"<html><body>
            <div data-testid="post-caption"><span>Caption lives here</span></div>
        </body></html>"#;

        assert_eq!(recover(html).caption_text, "Caption lives here");
    }

    #[test]
    fn test_caption_from_obfuscated_span() {
        let html = r#"<html><body>
            <span class="_ap3a _aaco">Obfuscated class caption</span>
        </body></html>"#;

        assert_eq!(recover(html).caption_text, "Obfuscated class caption");
    }

    #[test]
    fn test_caption_falls_back_to_title() {
        let html = r#"<html><head>
            <title>Jane Doe on Instagram: "Caption from the title tag"</title>
        </head><body></body></html>"#;

        assert_eq!(recover(html).caption_text, "Caption from the title tag");
    }

    #[test]
    fn test_short_candidates_are_skipped() {
        // og:description is below the minimum length, markup wins
        let html = r#"<html><head>
            <meta property="og:description" content="Hi">
        </head><body>
            <article><h1>The real caption text</h1></article>
        </body></html>"#;

        assert_eq!(recover(html).caption_text, "The real caption text");
    }

    #[test]
    fn test_placeholder_when_nothing_recoverable() {
        let record = recover("<html><body><p>x</p></body></html>");
        assert_eq!(record.caption_text, "[video content]");
        assert_eq!(record.author_handle, "unknown");
    }

    #[test]
    fn test_caption_whitespace_is_normalized() {
        let html = r#"<html><body>
            <article><h1>  spread    across
            lines  </h1></article>
        </body></html>"#;

        assert_eq!(recover(html).caption_text, "spread across lines");
    }

    #[test]
    fn test_author_from_parenthesized_handle() {
        let html = r#"<html><head>
            <meta property="og:title" content="Jane Doe (@janedoe) on Instagram: &quot;hello&quot;">
        </head></html>"#;

        assert_eq!(recover(html).author_handle, "janedoe");
    }

    #[test]
    fn test_author_from_display_name() {
        let html = r#"<html><head>
            <meta property="og:title" content="Jane Doe on Instagram: &quot;hello&quot;">
        </head></html>"#;

        assert_eq!(recover(html).author_handle, "Jane Doe");
    }

    #[test]
    fn test_author_unknown_without_share_title() {
        let html = r#"<html><head><title>Instagram</title></head></html>"#;
        assert_eq!(recover(html).author_handle, "unknown");
    }

    #[test]
    fn test_video_detection_from_og_video() {
        let html = r#"<html><head>
            <meta property="og:video" content="https://cdn.example.com/v.mp4">
        </head></html>"#;

        assert!(recover(html).is_video);
    }

    #[test]
    fn test_video_detection_from_og_type() {
        let html = r#"<html><head>
            <meta property="og:type" content="video.other">
        </head></html>"#;

        assert!(recover(html).is_video);
    }

    #[test]
    fn test_photo_post_is_not_video() {
        let html = r#"<html><head>
            <meta property="og:type" content="article">
        </head></html>"#;

        assert!(!recover(html).is_video);
    }

    #[test]
    fn test_rendered_page_defaults() {
        let record = recover("<html></html>");
        assert_eq!(record.like_count, 0);
        assert_eq!(record.published_at, None);
        assert_eq!(record.media_count, 1);
        assert_eq!(record.label, "Test");
        assert_eq!(record.source_url, "https://www.instagram.com/p/ABC/");
    }

    #[test]
    fn test_curly_quote_preamble_stripping() {
        assert_eq!(
            strip_share_preamble("Jane on Instagram: \u{201c}hello world\u{201d}"),
            "hello world"
        );
    }
}
