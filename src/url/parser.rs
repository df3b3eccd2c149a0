use crate::{UrlError, UrlResult};
use url::Url;

/// Path sections that denote an individual post
const POST_SECTIONS: &[&str] = &["p", "reel", "tv"];

/// Hosts recognized as the post platform
const SUPPORTED_HOSTS: &[&str] = &["instagram.com", "www.instagram.com"];

/// A validated post URL broken into its meaningful parts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPostUrl {
    /// The path section the post lives under ("p", "reel", or "tv")
    pub section: String,

    /// The short opaque identifier naming the post
    pub shortcode: String,

    /// Canonical form of the post URL
    pub canonical_url: String,
}

/// Validates a post URL and extracts its identifier
///
/// A post URL must use HTTP(S), point at a supported host, and have a path
/// of the form `/<section>/<identifier>[/...]` where the section is one of
/// `p`, `reel`, or `tv` and the identifier contains only ASCII
/// alphanumerics, `_`, and `-`.
///
/// # Arguments
///
/// * `input` - The URL string to validate
///
/// # Returns
///
/// * `Ok(ParsedPostUrl)` - The validated URL parts
/// * `Err(UrlError)` - What made the URL unacceptable
///
/// # Examples
///
/// ```
/// use postcap::url::parse_post_url;
///
/// let parsed = parse_post_url("https://www.instagram.com/p/Cx1yzAbCdEf/").unwrap();
/// assert_eq!(parsed.shortcode, "Cx1yzAbCdEf");
/// assert_eq!(parsed.section, "p");
///
/// assert!(parse_post_url("https://www.instagram.com/some_user/").is_err());
/// ```
pub fn parse_post_url(input: &str) -> UrlResult<ParsedPostUrl> {
    let trimmed = input.trim();
    let url = Url::parse(trimmed).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    let host = url.host_str().ok_or(UrlError::MissingHost)?.to_lowercase();
    if !SUPPORTED_HOSTS.contains(&host.as_str()) {
        return Err(UrlError::UnsupportedHost(host));
    }

    let mut segments = url
        .path_segments()
        .ok_or_else(|| UrlError::NotAPost(trimmed.to_string()))?
        .filter(|s| !s.is_empty());

    let section = match segments.next() {
        Some(s) if POST_SECTIONS.contains(&s) => s,
        _ => return Err(UrlError::NotAPost(trimmed.to_string())),
    };

    let shortcode = segments
        .next()
        .ok_or_else(|| UrlError::InvalidIdentifier("identifier is missing".to_string()))?;

    if !shortcode
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(UrlError::InvalidIdentifier(shortcode.to_string()));
    }

    Ok(ParsedPostUrl {
        section: section.to_string(),
        shortcode: shortcode.to_string(),
        canonical_url: format!("https://{}/{}/{}/", host, section, shortcode),
    })
}

/// Convenience check for whether a string is a valid post URL
pub fn is_post_url(input: &str) -> bool {
    parse_post_url(input).is_ok()
}
