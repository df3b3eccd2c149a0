/// Collapses all runs of whitespace into single spaces
///
/// Newlines, tabs, and repeated spaces inside caption text all become one
/// space, and leading/trailing whitespace disappears. Applying the function
/// twice gives the same result as applying it once.
///
/// # Examples
///
/// ```
/// use postcap::extract::normalize_whitespace;
///
/// assert_eq!(normalize_whitespace("  a\n\tb   c "), "a b c");
/// ```
pub fn normalize_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Shortens a string to at most `max_chars` characters
///
/// Cuts on character boundaries, so multi-byte text never produces an
/// invalid slice. Appends an ellipsis marker when anything was removed.
pub fn truncate_chars(input: &str, max_chars: usize) -> String {
    if input.chars().count() <= max_chars {
        return input.to_string();
    }
    let kept: String = input.chars().take(max_chars).collect();
    format!("{}...", kept)
}
