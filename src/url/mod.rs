//! URL validation and identifier extraction
//!
//! Accepts the post URL shapes the platform serves (`/p/`, `/reel/`, `/tv/`)
//! and rejects everything else before any network work happens.

mod parser;

pub use parser::{is_post_url, parse_post_url, ParsedPostUrl};
