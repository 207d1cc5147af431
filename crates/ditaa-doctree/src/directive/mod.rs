//! Pluggable block directives.
//!
//! A block directive turns a directive line (and, for containers, the lines
//! up to the closing `:::`) into document tree nodes during parsing.
//!
//! # Syntax
//!
//! - **Leaf**: `::name[argument]{attrs}` on a line of its own
//! - **Container**: `:::name[argument]{attrs}`, content lines, then `:::`
//!
//! Both forms reach the handler as a [`DirectiveBlock`]; a leaf simply has no
//! content lines.
//!
//! # Example
//!
//! ```
//! use ditaa_doctree::directive::{BlockDirective, DirectiveBlock, DirectiveContext, DirectiveError};
//! use ditaa_doctree::{DocumentParser, Node};
//!
//! struct Shout;
//!
//! impl BlockDirective for Shout {
//!     fn name(&self) -> &str { "shout" }
//!
//!     fn run(&mut self, block: DirectiveBlock, _ctx: &mut DirectiveContext) -> Result<Vec<Node>, DirectiveError> {
//!         Ok(vec![Node::Markdown(block.content.join("\n").to_uppercase())])
//!     }
//! }
//!
//! let mut parser = DocumentParser::new().with_directive(Shout);
//! let doc = parser.parse("index", ":::shout\nhello\n:::\n");
//! assert!(matches!(&doc.nodes[0], Node::Markdown(s) if s == "HELLO"));
//! ```

mod args;
mod context;
mod fence;
mod parser;

use std::path::PathBuf;

pub use args::DirectiveArgs;
pub use context::DirectiveContext;
pub(crate) use fence::FenceTracker;
pub(crate) use parser::{ParsedDirective, parse_directive_line};

use crate::Node;

/// A directive invocation handed to a [`BlockDirective`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectiveBlock {
    /// Bracket argument and attributes.
    pub args: DirectiveArgs,
    /// Content lines between the opening and closing container lines
    /// (empty for leaf directives).
    pub content: Vec<String>,
}

impl DirectiveBlock {
    /// The bracket argument, if one was given.
    #[must_use]
    pub fn argument(&self) -> Option<&str> {
        let arg = self.args.content.trim();
        (!arg.is_empty()).then_some(arg)
    }
}

/// Malformed directive invocation.
///
/// Reported as a warning at the directive's location; the directive
/// produces no nodes and the build carries on.
#[derive(Debug, thiserror::Error)]
pub enum DirectiveError {
    #[error("{directive} directive cannot have both content and a filename argument")]
    ContentAndArgument { directive: String },

    #[error("external {directive} file {} not found or reading it failed: {source}", path.display())]
    ReadFile {
        directive: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("empty directive: ignoring {directive} directive without content")]
    Empty { directive: String },

    #[error("unknown option '{option}' for {directive} directive")]
    UnknownOption { directive: String, option: String },

    #[error("option '{option}' of {directive} directive does not take a value")]
    UnexpectedValue { directive: String, option: String },

    #[error("option '{option}' of {directive} directive requires a value")]
    MissingValue { directive: String, option: String },
}

/// Handler for a block directive.
///
/// Handlers are registered with
/// [`DocumentParser::with_directive`](crate::DocumentParser::with_directive)
/// and matched by [`name`](Self::name).
pub trait BlockDirective: Send {
    /// Directive name matched against `::name` / `:::name`.
    fn name(&self) -> &str;

    /// Expand the directive into document nodes.
    ///
    /// # Errors
    ///
    /// Returns [`DirectiveError`] for malformed invocations.
    fn run(
        &mut self,
        block: DirectiveBlock,
        ctx: &mut DirectiveContext,
    ) -> Result<Vec<Node>, DirectiveError>;
}
