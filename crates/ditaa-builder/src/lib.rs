//! Documentation build driver.
//!
//! Walks a source directory for Markdown documents, expands their `ditaa`
//! directives, renders the diagrams and writes every document in the
//! configured output format.
//!
//! # Example
//!
//! ```no_run
//! use ditaa_builder::{BuildConfig, SiteBuilder};
//! use ditaa_diagrams::BuildSession;
//!
//! let builder = SiteBuilder::new(BuildConfig::new("docs", "_build"));
//! let report = builder.build(&mut BuildSession::new())?;
//! println!("{} documents, {} diagrams rendered", report.documents, report.rendered);
//! # Ok::<(), ditaa_builder::BuildError>(())
//! ```

mod builder;
mod scanner;

pub use builder::{BuildConfig, BuildError, BuildReport, SiteBuilder};
