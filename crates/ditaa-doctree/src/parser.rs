//! Document parser.
//!
//! Splits Markdown source into a [`Document`] tree, expanding registered
//! block directives into nodes.

use std::io;
use std::path::{Path, PathBuf};

use crate::directive::{
    BlockDirective, DirectiveArgs, DirectiveBlock, DirectiveContext, FenceTracker,
    ParsedDirective, parse_directive_line,
};
use crate::{Document, Node};

/// Type alias for the file reading callback function.
pub type ReadFileFn = dyn Fn(&Path) -> io::Result<String> + Send;

/// Configuration for the document parser.
pub struct DocumentParserConfig {
    /// Base directory for resolving relative paths (the document's directory).
    pub base_dir: PathBuf,
    /// Documentation source root for `/`-prefixed paths.
    ///
    /// Default: derived from `base_dir` and the docname
    pub source_dir: Option<PathBuf>,
    /// Path to the source file being parsed (if known).
    pub source_path: Option<PathBuf>,
    /// Callback to read files from the file system.
    ///
    /// Default: `std::fs::read_to_string`
    pub read_file: Option<Box<ReadFileFn>>,
}

impl Default for DocumentParserConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentParserConfig {
    /// Create a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            base_dir: PathBuf::from("."),
            source_dir: None,
            source_path: None,
            read_file: None,
        }
    }

    /// Configuration for a document read from `source_path`.
    ///
    /// The base directory becomes the file's parent directory.
    #[must_use]
    pub fn for_source(source_path: impl Into<PathBuf>) -> Self {
        let source_path = source_path.into();
        let base_dir = source_path
            .parent()
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        Self::new()
            .with_base_dir(base_dir)
            .with_source_path(source_path)
    }

    /// Set the base directory for resolving relative paths.
    #[must_use]
    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = base_dir.into();
        self
    }

    /// Set the documentation source root.
    #[must_use]
    pub fn with_source_dir(mut self, source_dir: impl Into<PathBuf>) -> Self {
        self.source_dir = Some(source_dir.into());
        self
    }

    /// Set the source file path.
    #[must_use]
    pub fn with_source_path(mut self, source_path: impl Into<PathBuf>) -> Self {
        self.source_path = Some(source_path.into());
        self
    }

    /// Set the file reading callback.
    #[must_use]
    pub fn with_read_file<F>(mut self, read_file: F) -> Self
    where
        F: Fn(&Path) -> io::Result<String> + Send + 'static,
    {
        self.read_file = Some(Box::new(read_file));
        self
    }

    fn read_file(&self) -> &dyn Fn(&Path) -> io::Result<String> {
        self.read_file.as_ref().map_or_else(
            || &default_read_file as &dyn Fn(&Path) -> io::Result<String>,
            |f| f.as_ref(),
        )
    }
}

/// Default file reading function.
fn default_read_file(path: &Path) -> io::Result<String> {
    std::fs::read_to_string(path)
}

/// Parser turning Markdown with block directives into a [`Document`].
///
/// Lines that are not directives registered with
/// [`with_directive`](Self::with_directive) pass through as Markdown,
/// including the syntax of unknown directives. Directive syntax inside
/// fenced code blocks is ignored.
///
/// # Example
///
/// ```
/// use ditaa_doctree::{DocumentParser, Node};
///
/// let mut parser = DocumentParser::new();
/// let doc = parser.parse("index", "# Title\n\n:::note\nunknown directives pass through\n:::\n");
/// assert_eq!(doc.nodes.len(), 1);
/// assert!(matches!(&doc.nodes[0], Node::Markdown(md) if md.contains(":::note")));
/// ```
pub struct DocumentParser {
    config: DocumentParserConfig,
    directives: Vec<Box<dyn BlockDirective>>,
}

impl Default for DocumentParser {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentParser {
    /// Create a new parser with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(DocumentParserConfig::default())
    }

    /// Create a new parser with custom configuration.
    #[must_use]
    pub fn with_config(config: DocumentParserConfig) -> Self {
        Self {
            config,
            directives: Vec::new(),
        }
    }

    /// Register a block directive handler.
    #[must_use]
    pub fn with_directive<D: BlockDirective + 'static>(mut self, handler: D) -> Self {
        self.directives.push(Box::new(handler));
        self
    }

    /// Parse `input` as the document `docname`.
    #[must_use]
    pub fn parse(&mut self, docname: &str, input: &str) -> Document {
        let mut doc = Document::new(docname);
        doc.source_path.clone_from(&self.config.source_path);

        let lines: Vec<&str> = input.lines().collect();
        let mut fence = FenceTracker::new();
        let mut markdown = String::new();
        let mut idx = 0;

        while idx < lines.len() {
            let line = lines[idx];
            let line_num = idx + 1;
            idx += 1;

            fence.update(line);
            if fence.in_fence() {
                push_line(&mut markdown, line);
                continue;
            }

            let Some((handler_idx, name, args, colon_count)) = self.match_directive(line) else {
                push_line(&mut markdown, line);
                continue;
            };

            let content = match colon_count {
                Some(open_colons) => {
                    let (content, consumed, closed) = take_container_body(&lines[idx..], open_colons);
                    idx += consumed;
                    if !closed {
                        self.warn(
                            &mut doc,
                            line_num,
                            &format!("unclosed container directive :::{name} (missing closing :::)"),
                        );
                    }
                    content
                }
                None => Vec::new(),
            };

            flush_markdown(&mut doc, &mut markdown);
            self.run_directive(&mut doc, handler_idx, DirectiveBlock { args, content }, line_num);
        }

        flush_markdown(&mut doc, &mut markdown);
        doc
    }

    /// Match a line against the registered directives.
    ///
    /// Returns the handler index, name, arguments and, for containers, the
    /// opening colon count.
    fn match_directive(&self, line: &str) -> Option<(usize, String, DirectiveArgs, Option<usize>)> {
        let (name, args, colon_count) = match parse_directive_line(line)? {
            ParsedDirective::Leaf { name, args } => (name, args, None),
            ParsedDirective::ContainerStart {
                name,
                args,
                colon_count,
            } => (name, args, Some(colon_count)),
            ParsedDirective::ContainerEnd { .. } => return None,
        };
        let handler_idx = self.directives.iter().position(|h| h.name() == name)?;
        Some((handler_idx, name, args, colon_count))
    }

    fn run_directive(
        &mut self,
        doc: &mut Document,
        handler_idx: usize,
        block: DirectiveBlock,
        line_num: usize,
    ) {
        let read_file = self.config.read_file();
        let mut ctx =
            DirectiveContext::new(&doc.docname, &self.config.base_dir, line_num, read_file);
        if let Some(source_dir) = &self.config.source_dir {
            ctx = ctx.with_source_dir(source_dir);
        }

        let result = self.directives[handler_idx].run(block, &mut ctx);
        let dependencies = ctx.into_dependencies();

        for dep in dependencies {
            if !doc.dependencies.contains(&dep) {
                doc.dependencies.push(dep);
            }
        }

        match result {
            Ok(nodes) => doc.nodes.extend(nodes),
            Err(e) => {
                let message = e.to_string();
                self.warn(doc, line_num, &message);
            }
        }
    }

    fn warn(&self, doc: &mut Document, line_num: usize, message: &str) {
        let warning = match &self.config.source_path {
            Some(path) => format!("{}:{line_num}: {message}", path.display()),
            None => format!("{}:{line_num}: {message}", doc.docname),
        };
        tracing::warn!("{warning}");
        doc.warnings.push(warning);
    }
}

/// Collect container content up to the closing line.
///
/// The closing line must have at least as many colons as the opening one.
/// Returns the content, the number of lines consumed (including the closing
/// line) and whether the container was closed.
fn take_container_body(lines: &[&str], open_colons: usize) -> (Vec<String>, usize, bool) {
    let mut content = Vec::new();
    for (i, line) in lines.iter().enumerate() {
        if let Some(ParsedDirective::ContainerEnd { colon_count }) = parse_directive_line(line)
            && colon_count >= open_colons
        {
            return (content, i + 1, true);
        }
        content.push((*line).to_owned());
    }
    (content, lines.len(), false)
}

fn push_line(markdown: &mut String, line: &str) {
    markdown.push_str(line);
    markdown.push('\n');
}

fn flush_markdown(doc: &mut Document, markdown: &mut String) {
    if !markdown.is_empty() {
        doc.nodes.push(Node::Markdown(std::mem::take(markdown)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directive::{DirectiveContext, DirectiveError};
    use pretty_assertions::assert_eq;

    /// Echoes its argument and content; fails on an `error` attribute.
    struct Echo;

    impl BlockDirective for Echo {
        fn name(&self) -> &'static str {
            "echo"
        }

        fn run(
            &mut self,
            block: DirectiveBlock,
            ctx: &mut DirectiveContext,
        ) -> Result<Vec<Node>, DirectiveError> {
            if block.args.has("error") {
                return Err(DirectiveError::Empty {
                    directive: "echo".to_owned(),
                });
            }
            if let Some(arg) = block.argument() {
                ctx.note_dependency(ctx.resolve_path(arg));
            }
            Ok(vec![Node::Markdown(format!(
                "[{}|{}]",
                block.args.content,
                block.content.join(",")
            ))])
        }
    }

    fn markdown(s: &str) -> Node {
        Node::Markdown(s.to_owned())
    }

    #[test]
    fn test_plain_markdown_single_node() {
        let doc = DocumentParser::new().parse("index", "# Title\n\nText");
        assert_eq!(doc.nodes, vec![markdown("# Title\n\nText\n")]);
        assert!(doc.warnings.is_empty());
    }

    #[test]
    fn test_container_directive_splits_markdown() {
        let mut parser = DocumentParser::new().with_directive(Echo);
        let doc = parser.parse("index", "before\n:::echo\na\nb\n:::\nafter\n");

        assert_eq!(
            doc.nodes,
            vec![markdown("before\n"), markdown("[|a,b]"), markdown("after\n")]
        );
    }

    #[test]
    fn test_leaf_directive_with_dependency() {
        let config = DocumentParserConfig::new().with_base_dir("docs/guide");
        let mut parser = DocumentParser::with_config(config).with_directive(Echo);
        let doc = parser.parse("guide/intro", "::echo[flow.ditaa]\n");

        assert_eq!(doc.nodes, vec![markdown("[flow.ditaa|]")]);
        assert_eq!(doc.dependencies, vec![PathBuf::from("docs/guide/flow.ditaa")]);
    }

    #[test]
    fn test_longer_opening_needs_longer_closing() {
        let mut parser = DocumentParser::new().with_directive(Echo);
        let doc = parser.parse("index", "::::echo\nx\n:::\ny\n::::\n");
        assert_eq!(doc.nodes, vec![markdown("[|x,:::,y]")]);
    }

    #[test]
    fn test_unclosed_container_consumes_rest_and_warns() {
        let mut parser = DocumentParser::new().with_directive(Echo);
        let doc = parser.parse("index", "intro\n:::echo\nx\ny");

        assert_eq!(doc.nodes, vec![markdown("intro\n"), markdown("[|x,y]")]);
        assert_eq!(doc.warnings.len(), 1);
        assert!(doc.warnings[0].starts_with("index:2: unclosed"));
    }

    #[test]
    fn test_directive_error_becomes_warning() {
        let mut parser = DocumentParser::new().with_directive(Echo);
        let doc = parser.parse("guide", "text\n\n::echo{error}\n");

        assert_eq!(doc.nodes, vec![markdown("text\n\n")]);
        assert_eq!(doc.warnings.len(), 1);
        assert!(doc.warnings[0].starts_with("guide:3: empty directive"));
    }

    #[test]
    fn test_warning_uses_source_path_when_known() {
        let config = DocumentParserConfig::for_source("docs/index.md");
        let mut parser = DocumentParser::with_config(config).with_directive(Echo);
        let doc = parser.parse("index", "::echo{error}");
        assert!(doc.warnings[0].starts_with("docs/index.md:1:"));
        assert_eq!(doc.source_path, Some(PathBuf::from("docs/index.md")));
    }

    #[test]
    fn test_directive_inside_fence_is_untouched() {
        let mut parser = DocumentParser::new().with_directive(Echo);
        let input = "```markdown\n:::echo\nx\n:::\n```\n";
        let doc = parser.parse("index", input);
        assert_eq!(doc.nodes, vec![markdown(input)]);
    }

    #[test]
    fn test_unregistered_directive_passes_through() {
        let mut parser = DocumentParser::new().with_directive(Echo);
        let doc = parser.parse("index", ":::note\ntext\n:::\n");
        assert_eq!(doc.nodes, vec![markdown(":::note\ntext\n:::\n")]);
    }

    #[test]
    fn test_for_source_uses_parent_dir() {
        let config = DocumentParserConfig::for_source("docs/guide/intro.md");
        assert_eq!(config.base_dir, PathBuf::from("docs/guide"));
    }
}
