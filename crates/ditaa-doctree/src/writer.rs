//! Output writers for resolved documents.
//!
//! Markdown output keeps the source text and turns image nodes into image
//! references. HTML output writes image nodes as `{{DIAGRAM_n}}` placeholder
//! paragraphs and converts the Markdown with `pulldown-cmark`; the events of
//! each placeholder paragraph, found by its source offset, are swapped for the
//! `<img>` markup. Author text that happens to contain the same string is left
//! alone.

use std::fmt::Write as _;

use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd, html};

use crate::util::escape_html;
use crate::{Document, ImageNode, ImageOptions, Node};

/// Output format of the build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    #[default]
    Html,
    Markdown,
}

impl OutputFormat {
    /// Parse a format name (`html` or `markdown`).
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "html" => Some(Self::Html),
            "markdown" => Some(Self::Markdown),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Markdown => "markdown",
        }
    }

    /// File extension of written documents.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Markdown => "md",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Render a document in the given format.
///
/// Diagram placeholders still present in the tree are written as fenced
/// `ditaa` code blocks.
#[must_use]
pub fn render_document(doc: &Document, format: OutputFormat) -> String {
    match format {
        OutputFormat::Html => render_html_page(doc),
        OutputFormat::Markdown => render_markdown(doc),
    }
}

fn render_markdown(doc: &Document) -> String {
    let mut out = String::new();
    // A block image ends its paragraph: following text starts a new one
    let mut after_block = false;
    for node in &doc.nodes {
        match node {
            Node::Markdown(text) => {
                if after_block && !text.starts_with('\n') {
                    out.push('\n');
                }
                push_text(&mut out, text);
                after_block = false;
            }
            Node::Diagram(diagram) => {
                push_code_block(&mut out, &diagram.code);
                after_block = false;
            }
            Node::Image(image) => {
                let inline = image.options.inline.is_some();
                if !inline {
                    ensure_blank_line(&mut out);
                }
                out.push_str(&markdown_image(image));
                out.push('\n');
                after_block = !inline;
            }
        }
    }
    out
}

fn ensure_blank_line(out: &mut String) {
    if out.is_empty() || out.ends_with("\n\n") {
        return;
    }
    out.push_str(if out.ends_with('\n') { "\n" } else { "\n\n" });
}

fn markdown_image(image: &ImageNode) -> String {
    let alt = escape_link_text(image.options.alt.as_deref().unwrap_or_default());
    let uri = link_destination(&image.uri);
    let reference = match image.options.title.as_deref() {
        Some(title) => format!(
            "![{alt}]({uri} \"{}\")",
            title.replace('\\', "\\\\").replace('"', "\\\"")
        ),
        None => format!("![{alt}]({uri})"),
    };
    match image.options.target.as_deref() {
        Some(target) => format!("[{reference}]({})", link_destination(target)),
        None => reference,
    }
}

/// Backslash-escape characters that would end or nest link text.
fn escape_link_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '[' | ']') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Write a link destination, using the `<...>` form when it contains
/// whitespace, parentheses or angle brackets.
fn link_destination(dest: &str) -> String {
    if !dest.contains(|c: char| c.is_whitespace() || matches!(c, '(' | ')' | '<' | '>')) {
        return dest.to_owned();
    }
    let mut out = String::with_capacity(dest.len() + 2);
    out.push('<');
    for c in dest.chars() {
        match c {
            '<' | '>' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            '\n' | '\r' => out.push_str("%0A"),
            _ => out.push(c),
        }
    }
    out.push('>');
    out
}

/// Image markup waiting for its placeholder paragraph.
struct Placeholder {
    /// Byte offset of the placeholder line in the generated Markdown.
    offset: usize,
    html: String,
    inline: bool,
}

fn render_html_body(doc: &Document) -> String {
    let mut markdown = String::new();
    let mut placeholders = Vec::new();

    for node in &doc.nodes {
        match node {
            Node::Markdown(text) => push_text(&mut markdown, text),
            Node::Diagram(diagram) => push_code_block(&mut markdown, &diagram.code),
            Node::Image(image) => {
                markdown.push('\n');
                let offset = markdown.len();
                let _ = write!(markdown, "{{{{DIAGRAM_{}}}}}\n\n", placeholders.len());

                let img = html_image(image);
                let inline = image.options.inline.is_some();
                let html = if inline {
                    img
                } else {
                    format!("<div class=\"diagram\">{img}</div>\n")
                };
                placeholders.push(Placeholder {
                    offset,
                    html,
                    inline,
                });
            }
        }
    }

    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    let parser = Parser::new_ext(&markdown, options);

    let mut events = Vec::new();
    // Placeholder paragraph currently being replaced
    let mut open: Option<&Placeholder> = None;
    for (event, range) in parser.into_offset_iter() {
        if let Some(placeholder) = open {
            if matches!(event, Event::End(TagEnd::Paragraph)) {
                open = None;
                if placeholder.inline {
                    events.push(event);
                }
            }
            continue;
        }
        if matches!(event, Event::Start(Tag::Paragraph))
            && let Some(placeholder) = placeholders.iter().find(|p| p.offset == range.start)
        {
            open = Some(placeholder);
            if placeholder.inline {
                events.push(event);
                events.push(Event::InlineHtml(placeholder.html.clone().into()));
            } else {
                events.push(Event::Html(placeholder.html.clone().into()));
            }
            continue;
        }
        events.push(event);
    }

    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, events.into_iter());
    out
}

fn html_image(image: &ImageNode) -> String {
    let opts = &image.options;
    let mut img = format!("<img src=\"{}\"", escape_html(&image.uri));

    let alt = opts.alt.as_deref().unwrap_or(&image.uri);
    let _ = write!(img, " alt=\"{}\"", escape_html(alt));
    if let Some(title) = &opts.title {
        let _ = write!(img, " title=\"{}\"", escape_html(title));
    }
    for (attr, value) in [("width", &opts.width), ("height", &opts.height)] {
        if let Some(value) = value {
            let value = scaled_length(value, opts.scale.as_deref());
            let _ = write!(img, " {attr}=\"{}\"", escape_html(&value));
        }
    }
    if let Some(name) = &opts.name {
        let _ = write!(img, " id=\"{}\"", escape_html(name));
    }
    let classes = class_list(opts);
    if !classes.is_empty() {
        let _ = write!(img, " class=\"{}\"", escape_html(&classes));
    }
    img.push('>');

    match &opts.target {
        Some(target) => format!("<a href=\"{}\">{img}</a>", escape_html(target)),
        None => img,
    }
}

fn class_list(opts: &ImageOptions) -> String {
    let mut classes: Vec<String> = opts
        .class
        .as_deref()
        .unwrap_or_default()
        .split_whitespace()
        .map(str::to_owned)
        .collect();
    if let Some(align) = opts.align.as_deref().filter(|a| !a.is_empty()) {
        classes.push(format!("align-{align}"));
    }
    classes.join(" ")
}

/// Apply a percentage `scale` to a length such as `300` or `12.5em`.
///
/// Lengths or scales that are not numeric are returned unchanged.
fn scaled_length(value: &str, scale: Option<&str>) -> String {
    let Some(factor) = scale.and_then(|s| s.trim().trim_end_matches('%').parse::<f64>().ok())
    else {
        return value.to_owned();
    };
    let value = value.trim();
    let split = value
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(value.len());
    let (number, unit) = value.split_at(split);
    match number.parse::<f64>() {
        Ok(n) => format!("{}{unit}", n * factor / 100.0),
        Err(_) => value.to_owned(),
    }
}

fn push_text(out: &mut String, text: &str) {
    out.push_str(text);
    if !text.is_empty() && !text.ends_with('\n') {
        out.push('\n');
    }
}

fn push_code_block(out: &mut String, code: &str) {
    let _ = write!(out, "```ditaa\n{}\n```\n", code.trim_end_matches('\n'));
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    use super::*;
    use crate::DiagramNode;
    use pretty_assertions::assert_eq;

    fn image(uri: &str, options: ImageOptions) -> Node {
        Node::Image(ImageNode {
            uri: uri.to_owned(),
            candidates: BTreeMap::from([("*".to_owned(), PathBuf::from("/out").join(uri))]),
            options,
        })
    }

    fn options(pairs: &[(&str, &str)]) -> ImageOptions {
        let mut options = ImageOptions::default();
        for (name, value) in pairs {
            assert!(options.set(name, *value));
        }
        options
    }

    fn doc(nodes: Vec<Node>) -> Document {
        let mut doc = Document::new("guide/intro");
        doc.nodes = nodes;
        doc
    }

    #[test]
    fn test_output_format_names() {
        assert_eq!(OutputFormat::parse("html"), Some(OutputFormat::Html));
        assert_eq!(OutputFormat::parse("markdown"), Some(OutputFormat::Markdown));
        assert_eq!(OutputFormat::parse("pdf"), None);
        assert_eq!(OutputFormat::Markdown.extension(), "md");
        assert_eq!(OutputFormat::Html.to_string(), "html");
    }

    #[test]
    fn test_html_block_image() {
        let doc = doc(vec![
            Node::Markdown("# Title\n".to_owned()),
            image("../_images/ditaa-ab.png", options(&[("alt", "flow")])),
        ]);
        assert_eq!(
            render_html_body(&doc),
            "<h1>Title</h1>\n<div class=\"diagram\"><img src=\"../_images/ditaa-ab.png\" alt=\"flow\"></div>\n"
        );
    }

    #[test]
    fn test_html_inline_image_stays_in_paragraph() {
        let doc = doc(vec![image("a.png", options(&[("inline", "")]))]);
        assert_eq!(
            render_html_body(&doc),
            "<p><img src=\"a.png\" alt=\"a.png\"></p>\n"
        );
    }

    #[test]
    fn test_placeholder_text_in_author_content_is_kept() {
        let doc = doc(vec![
            Node::Markdown("Writers emit `{{DIAGRAM_0}}` markers.\n\n{{DIAGRAM_0}}\n".to_owned()),
            image("a.png", ImageOptions::default()),
        ]);
        assert_eq!(
            render_html_body(&doc),
            "<p>Writers emit <code>{{DIAGRAM_0}}</code> markers.</p>\n<p>{{DIAGRAM_0}}</p>\n\
             <div class=\"diagram\"><img src=\"a.png\" alt=\"a.png\"></div>\n"
        );
    }

    #[test]
    fn test_html_images_keep_document_order() {
        let doc = doc(vec![
            image("a.png", ImageOptions::default()),
            Node::Markdown("between\n".to_owned()),
            image("b.png", options(&[("inline", "")])),
        ]);
        assert_eq!(
            render_html_body(&doc),
            "<div class=\"diagram\"><img src=\"a.png\" alt=\"a.png\"></div>\n\
             <p>between</p>\n<p><img src=\"b.png\" alt=\"b.png\"></p>\n"
        );
    }

    #[test]
    fn test_html_image_attributes() {
        let opts = options(&[
            ("name", "fig-1"),
            ("class", "wide dark"),
            ("align", "center"),
            ("title", "Flow \"v2\""),
            ("width", "200"),
            ("height", "10em"),
            ("scale", "150"),
            ("target", "https://example.com/?a=1&b=2"),
        ]);
        let html = html_image(&ImageNode {
            uri: "x.png".to_owned(),
            candidates: BTreeMap::new(),
            options: opts,
        });
        assert_eq!(
            html,
            "<a href=\"https://example.com/?a=1&amp;b=2\"><img src=\"x.png\" alt=\"x.png\" \
             title=\"Flow &quot;v2&quot;\" width=\"300\" height=\"15em\" id=\"fig-1\" \
             class=\"wide dark align-center\"></a>"
        );
    }

    #[test]
    fn test_scaled_length() {
        assert_eq!(scaled_length("200", Some("50")), "100");
        assert_eq!(scaled_length("75px", Some("50%")), "37.5px");
        assert_eq!(scaled_length("auto", Some("50")), "auto");
        assert_eq!(scaled_length("200", Some("big")), "200");
        assert_eq!(scaled_length("200", None), "200");
    }

    #[test]
    fn test_html_page_skeleton() {
        let page = render_document(&doc(vec![Node::Markdown("text\n".to_owned())]), OutputFormat::Html);
        assert!(page.starts_with("<!DOCTYPE html>\n"));
        assert!(page.contains("<title>guide/intro</title>"));
        assert!(page.contains("<body>\n<p>text</p>\n</body>"));
    }

    #[test]
    fn test_markdown_output() {
        let doc = doc(vec![
            Node::Markdown("before\n".to_owned()),
            image("../_images/ditaa-ab.png", options(&[("alt", "flow")])),
            Node::Markdown("after\n".to_owned()),
        ]);
        assert_eq!(
            render_document(&doc, OutputFormat::Markdown),
            "before\n\n![flow](../_images/ditaa-ab.png)\n\nafter\n"
        );
    }

    #[test]
    fn test_markdown_image_with_title_and_target() {
        let node = ImageNode {
            uri: "a.png".to_owned(),
            candidates: BTreeMap::new(),
            options: options(&[("title", "T"), ("target", "big.png")]),
        };
        assert_eq!(markdown_image(&node), "[![](a.png \"T\")](big.png)");
    }

    #[test]
    fn test_markdown_image_escapes_text_and_destinations() {
        let node = ImageNode {
            uri: "../_images/flow v2.png".to_owned(),
            candidates: BTreeMap::new(),
            options: options(&[
                ("alt", "see [1]"),
                ("title", r#"a "b" \c"#),
                ("target", "docs/flow_(v2).html"),
            ]),
        };
        assert_eq!(
            markdown_image(&node),
            r#"[![see \[1\]](<../_images/flow v2.png> "a \"b\" \\c")](<docs/flow_(v2).html>)"#
        );
    }

    #[test]
    fn test_unresolved_diagram_written_as_code() {
        let doc = doc(vec![Node::Diagram(DiagramNode {
            code: "+--+\n|A |\n+--+\n".to_owned(),
            renderer_options: Vec::new(),
            image_options: ImageOptions::default(),
            line: 1,
        })]);
        assert_eq!(
            render_document(&doc, OutputFormat::Markdown),
            "```ditaa\n+--+\n|A |\n+--+\n```\n"
        );
    }
}
