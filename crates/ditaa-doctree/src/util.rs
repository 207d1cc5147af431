//! Shared URI and escaping helpers.

/// Compute a relative URI from a document to a path (RFC 3986).
///
/// Both `from` and `to` are `/`-separated paths relative to the output root.
/// The last segment of `from` is the document itself; the base is the
/// directory before it.
///
/// # Examples
///
/// ```
/// use ditaa_doctree::relative_uri;
///
/// assert_eq!(relative_uri("index", "_images"), "_images");
/// assert_eq!(relative_uri("guide/intro", "_images"), "../_images");
/// assert_eq!(relative_uri("guide/intro", "guide/img"), "img");
/// ```
#[must_use]
pub fn relative_uri(from: &str, to: &str) -> String {
    let from_segs: Vec<&str> = from.split('/').filter(|s| !s.is_empty() && *s != ".").collect();
    let to_segs: Vec<&str> = to.split('/').filter(|s| !s.is_empty() && *s != ".").collect();

    // Trailing slash means `from` is a directory, not a document
    let from_dir = if from.ends_with('/') || from_segs.is_empty() {
        &from_segs[..]
    } else {
        &from_segs[..from_segs.len() - 1]
    };

    let common = from_dir
        .iter()
        .zip(&to_segs)
        .take_while(|(a, b)| a == b)
        .count();

    let result = format!(
        "{}{}",
        "../".repeat(from_dir.len() - common),
        to_segs[common..].join("/")
    );
    if result.is_empty() {
        "./".to_owned()
    } else {
        result
    }
}

/// Join a file name onto a relative directory URI.
#[must_use]
pub fn join_uri(base: &str, file: &str) -> String {
    if base.is_empty() {
        file.to_owned()
    } else if base.ends_with('/') {
        format!("{base}{file}")
    } else {
        format!("{base}/{file}")
    }
}

/// Escape text for use in HTML content and double-quoted attributes.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
