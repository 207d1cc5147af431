//! Directive line parsing.
//!
//! Block directives occupy whole lines:
//! - leaf: `::name[argument]{attrs}`
//! - container start: `:::name[argument]{attrs}`
//! - container end: `:::`

use super::DirectiveArgs;

/// Directive recognised on a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ParsedDirective {
    /// Leaf directive: `::name[argument]{attrs}`
    Leaf { name: String, args: DirectiveArgs },
    /// Container opening: `:::name[argument]{attrs}`
    ContainerStart {
        name: String,
        args: DirectiveArgs,
        colon_count: usize,
    },
    /// Container closing: `:::`
    ContainerEnd { colon_count: usize },
}

/// Parse a whole line as a block directive.
///
/// Returns `None` if the line is ordinary text. Anything other than
/// whitespace after the closing `}` (or `]`, or the name) disqualifies the
/// line, so prose that merely starts with colons is left alone.
pub(crate) fn parse_directive_line(line: &str) -> Option<ParsedDirective> {
    let trimmed = line.trim();
    let colon_count = trimmed.chars().take_while(|&c| c == ':').count();
    if colon_count < 2 {
        return None;
    }

    let after_colons = trimmed[colon_count..].trim_start();

    if after_colons.is_empty() {
        return (colon_count >= 3).then_some(ParsedDirective::ContainerEnd { colon_count });
    }

    let name_end = after_colons
        .find(|c: char| c == '[' || c == '{' || c.is_whitespace())
        .unwrap_or(after_colons.len());
    let name = &after_colons[..name_end];
    if !is_valid_directive_name(name) {
        return None;
    }

    let rest = &after_colons[name_end..];
    let (content, rest) = take_delimited(rest, '[', ']')?;
    let (attrs, rest) = take_delimited(rest, '{', '}')?;
    if !rest.trim().is_empty() {
        return None;
    }

    let args = DirectiveArgs::parse(content, attrs);
    let name = name.to_owned();

    Some(if colon_count == 2 {
        ParsedDirective::Leaf { name, args }
    } else {
        ParsedDirective::ContainerStart {
            name,
            args,
            colon_count,
        }
    })
}

/// Check if a name is a valid directive name.
///
/// Valid names contain only alphanumeric characters, hyphens, and underscores.
fn is_valid_directive_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
}

/// Take an optional `open ... close` group from the start of `s`, handling nesting.
///
/// Returns the inner text (empty if the group is absent) and the remainder,
/// or `None` if the group is opened but never closed.
fn take_delimited(s: &str, open: char, close: char) -> Option<(&str, &str)> {
    if !s.starts_with(open) {
        return Some(("", s));
    }

    let mut depth = 0usize;
    for (i, c) in s.char_indices() {
        if c == open {
            depth += 1;
        } else if c == close {
            depth -= 1;
            if depth == 0 {
                return Some((&s[open.len_utf8()..i], &s[i + close.len_utf8()..]));
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leaf_with_argument_and_attrs() {
        let parsed = parse_directive_line(r#"::ditaa[flow.ditaa]{alt="Flow"}"#).unwrap();
        let ParsedDirective::Leaf { name, args } = parsed else {
            panic!("expected leaf, got {parsed:?}");
        };
        assert_eq!(name, "ditaa");
        assert_eq!(args.content, "flow.ditaa");
        assert_eq!(args.get("alt"), Some("Flow"));
    }

    #[test]
    fn test_container_start() {
        let parsed = parse_directive_line(":::ditaa{--scale=2}").unwrap();
        assert!(matches!(
            parsed,
            ParsedDirective::ContainerStart { ref name, colon_count: 3, .. } if name == "ditaa"
        ));
    }

    #[test]
    fn test_container_start_with_space_and_more_colons() {
        let parsed = parse_directive_line("::::  ditaa").unwrap();
        assert!(matches!(
            parsed,
            ParsedDirective::ContainerStart { colon_count: 4, .. }
        ));
    }

    #[test]
    fn test_container_end() {
        assert_eq!(
            parse_directive_line("  :::  "),
            Some(ParsedDirective::ContainerEnd { colon_count: 3 })
        );
        assert_eq!(parse_directive_line("::"), None);
    }

    #[test]
    fn test_trailing_text_is_not_a_directive() {
        assert_eq!(parse_directive_line("::ditaa[a.ditaa] and more"), None);
        assert_eq!(parse_directive_line(":ditaa[a.ditaa]"), None);
        assert_eq!(parse_directive_line("Note:: something"), None);
    }

    #[test]
    fn test_unclosed_group_is_not_a_directive() {
        assert_eq!(parse_directive_line("::ditaa[flow.ditaa"), None);
        assert_eq!(parse_directive_line(":::ditaa{alt=x"), None);
    }

    #[test]
    fn test_nested_brackets() {
        let parsed = parse_directive_line("::ditaa[a[1].ditaa]").unwrap();
        let ParsedDirective::Leaf { args, .. } = parsed else {
            panic!("expected leaf");
        };
        assert_eq!(args.content, "a[1].ditaa");
    }

    #[test]
    fn test_invalid_name() {
        assert_eq!(parse_directive_line("::dit/aa"), None);
    }
}
