//! Document tree and block directive host.
//!
//! This crate parses Markdown documents into a flat [`Document`] tree,
//! expanding registered block directives into nodes, and writes resolved
//! trees out as HTML or Markdown.
//!
//! # Architecture
//!
//! - [`DocumentParser`] splits source text into Markdown and directive blocks
//!   and hands each block to its [`BlockDirective`](directive::BlockDirective)
//! - Directives produce [`Node`]s; a later pass may substitute them (for
//!   example a [`DiagramNode`] becomes an [`ImageNode`] once rendered)
//! - [`render_document`] writes the resolved tree in an [`OutputFormat`]
//!
//! # Example
//!
//! ```
//! use ditaa_doctree::{DocumentParser, OutputFormat, render_document};
//!
//! let doc = DocumentParser::new().parse("index", "# Hello\n\n**Bold** text");
//! let html = render_document(&doc, OutputFormat::Html);
//! assert!(html.contains("<h1>Hello</h1>"));
//! ```

pub mod directive;
mod node;
mod parser;
mod util;
mod writer;

pub use node::{DiagramNode, Document, ImageNode, ImageOptions, Node};
pub use parser::{DocumentParser, DocumentParserConfig, ReadFileFn};
pub use util::{escape_html, join_uri, relative_uri};
pub use writer::{OutputFormat, render_document};
