//! ditaa diagram support.
//!
//! This crate provides the `ditaa` block directive and renders its diagrams
//! to PNG images with the external `ditaa` executable, caching each image
//! under a hash of its inputs.
//!
//! # Architecture
//!
//! - [`DitaaDirective`] turns directive blocks into diagram placeholders
//! - [`RenderCache`] renders a diagram unless its image already exists
//! - [`resolve_diagrams`] replaces the placeholders of a document with images
//! - [`BuildSession`] carries state shared by one build pass
//!
//! # Example
//!
//! ```no_run
//! use ditaa_diagrams::{BuildSession, DitaaDirective, RenderCache, resolve_diagrams};
//! use ditaa_doctree::{DocumentParser, OutputFormat, render_document};
//!
//! let mut doc = DocumentParser::new()
//!     .with_directive(DitaaDirective::new())
//!     .parse("index", ":::ditaa\n+---+\n| A |\n+---+\n:::\n");
//!
//! let cache = RenderCache::new("_build/_images", "_images");
//! let mut session = BuildSession::new();
//! resolve_diagrams(&mut doc, &cache, &mut session)?;
//!
//! let html = render_document(&doc, OutputFormat::Html);
//! # Ok::<(), ditaa_diagrams::RenderError>(())
//! ```

mod cache;
mod consts;
mod directive;
mod process;
mod render;
mod resolve;
mod session;

pub use cache::DiagramKey;
pub use directive::DitaaDirective;
pub use process::{CapturedOutput, ProcessError, run_with_input};
pub use render::{RenderCache, RenderError, RenderedImage};
pub use resolve::resolve_diagrams;
pub use session::BuildSession;
