//! Directive argument parsing.
//!
//! Parses the `[argument]{#id .class key="value" --flag}` syntax from directives.

/// Parsed arguments from directive syntax.
///
/// Represents the bracket argument and attributes of a directive line:
/// `::name[argument]{#id .class key="value" --flag}`
///
/// Attributes keep their source order. A bare key (no `=`) is stored with a
/// `None` value.
///
/// # Example
///
/// ```
/// use ditaa_doctree::directive::DirectiveArgs;
///
/// let args = DirectiveArgs::parse("flow.ditaa", r#"#fig-1 .wide alt="Flow" --no-shadows"#);
/// assert_eq!(args.content, "flow.ditaa");
/// assert_eq!(args.id, Some("fig-1".to_string()));
/// assert_eq!(args.classes, vec!["wide"]);
/// assert_eq!(args.get("alt"), Some("Flow"));
/// assert!(args.has("--no-shadows"));
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DirectiveArgs {
    /// Argument from brackets: `[argument]` (empty string if not provided).
    pub content: String,
    /// ID from attributes: `{#id}`.
    pub id: Option<String>,
    /// Classes from attributes: `{.class1 .class2}`.
    pub classes: Vec<String>,
    /// Attributes in source order: `key="value"` or bare `key`.
    pub attrs: Vec<(String, Option<String>)>,
}

impl DirectiveArgs {
    /// Parse argument and attributes string into structured arguments.
    ///
    /// # Arguments
    ///
    /// * `content` - The argument from brackets `[argument]`
    /// * `attrs_str` - The attributes string from braces `{...}` (without braces)
    #[must_use]
    pub fn parse(content: &str, attrs_str: &str) -> Self {
        let mut args = Self {
            content: content.to_owned(),
            ..Default::default()
        };

        let mut remaining = attrs_str.trim();

        while !remaining.is_empty() {
            if let Some(rest) = remaining.strip_prefix('#') {
                let (id, rest) = split_shorthand(rest);
                args.id = Some(id.to_owned());
                remaining = rest;
            } else if let Some(rest) = remaining.strip_prefix('.') {
                let (class, rest) = split_shorthand(rest);
                args.classes.push(class.to_owned());
                remaining = rest;
            } else if let Some((key, value, rest)) = parse_attribute(remaining) {
                args.attrs.push((key.to_owned(), value.map(str::to_owned)));
                remaining = rest;
            } else {
                // Skip unrecognized character
                let skip = remaining.chars().next().map_or(1, char::len_utf8);
                remaining = &remaining[skip..];
            }
            remaining = remaining.trim_start();
        }

        args
    }

    /// Get an attribute value by key (`None` for missing keys and bare flags).
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == key)
            .and_then(|(_, v)| v.as_deref())
    }

    /// Whether an attribute with this key is present, with or without a value.
    #[must_use]
    pub fn has(&self, key: &str) -> bool {
        self.attrs.iter().any(|(k, _)| k == key)
    }
}

/// Split `#id` / `.class` shorthand at the next whitespace, `.` or `#`.
fn split_shorthand(s: &str) -> (&str, &str) {
    let end = s
        .find(|c: char| c.is_whitespace() || c == '.' || c == '#')
        .unwrap_or(s.len());
    s.split_at(end)
}

/// Parse one attribute: `key="value"`, `key='value'`, `key=value` or bare `key`.
///
/// Returns `(key, value, rest)`.
fn parse_attribute(s: &str) -> Option<(&str, Option<&str>, &str)> {
    let key_end = s
        .find(|c: char| c.is_whitespace() || c == '=')
        .unwrap_or(s.len());
    let key = &s[..key_end];
    if key.is_empty() {
        return None;
    }

    let Some(after_eq) = s[key_end..].strip_prefix('=') else {
        return Some((key, None, &s[key_end..]));
    };

    for quote in ['"', '\''] {
        if let Some(quoted) = after_eq.strip_prefix(quote) {
            let end = quoted.find(quote)?;
            return Some((key, Some(&quoted[..end]), &quoted[end + 1..]));
        }
    }

    let end = after_eq.find(char::is_whitespace).unwrap_or(after_eq.len());
    Some((key, Some(&after_eq[..end]), &after_eq[end..]))
}
