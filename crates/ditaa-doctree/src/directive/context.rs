//! Directive processing context.
//!
//! Provides file system access, source location and dependency tracking to
//! directive handlers.

use std::io;
use std::path::{Path, PathBuf};

/// Context provided to directive handlers for file system access and source location.
///
/// Created by [`DocumentParser`](crate::DocumentParser) for each directive.
/// Files registered with [`note_dependency`](Self::note_dependency) end up in
/// [`Document::dependencies`](crate::Document::dependencies), so a watching
/// build can rebuild the document when they change.
///
/// # Example
///
/// ```
/// use std::path::Path;
/// use ditaa_doctree::directive::DirectiveContext;
///
/// let read = |path: &Path| std::fs::read_to_string(path);
/// let ctx = DirectiveContext::new("guide/intro", Path::new("docs/guide"), 42, &read);
///
/// let resolved = ctx.resolve_path("diagrams/flow.ditaa");
/// assert_eq!(resolved, Path::new("docs/guide/diagrams/flow.ditaa"));
///
/// // A leading `/` is relative to the documentation source root
/// let shared = ctx.resolve_path("/diagrams/flow.ditaa");
/// assert_eq!(shared, Path::new("docs/diagrams/flow.ditaa"));
/// ```
pub struct DirectiveContext<'a> {
    /// Document name (`/`-separated, no extension).
    pub docname: &'a str,
    /// Base directory for resolving relative paths (the document's directory).
    pub base_dir: &'a Path,
    /// Documentation source root, when known.
    source_dir: Option<&'a Path>,
    /// Line number where the directive appears (1-indexed).
    pub line: usize,
    /// Callback to read a file from the file system.
    pub read_file: &'a dyn Fn(&Path) -> io::Result<String>,
    dependencies: Vec<PathBuf>,
}

impl<'a> DirectiveContext<'a> {
    /// Create a context for a directive at `line` of `docname`.
    #[must_use]
    pub fn new(
        docname: &'a str,
        base_dir: &'a Path,
        line: usize,
        read_file: &'a dyn Fn(&Path) -> io::Result<String>,
    ) -> Self {
        Self {
            docname,
            base_dir,
            source_dir: None,
            line,
            read_file,
            dependencies: Vec::new(),
        }
    }

    /// Set the documentation source root used for `/`-prefixed paths.
    #[must_use]
    pub fn with_source_dir(mut self, source_dir: &'a Path) -> Self {
        self.source_dir = Some(source_dir);
        self
    }

    /// Documentation source root.
    ///
    /// Without an explicit root, it is the base directory with one level
    /// removed per `/` in the docname.
    #[must_use]
    pub fn source_dir(&self) -> &'a Path {
        self.source_dir.unwrap_or_else(|| {
            let depth = self.docname.matches('/').count();
            self.base_dir.ancestors().nth(depth).unwrap_or(self.base_dir)
        })
    }

    /// Resolve a file argument.
    ///
    /// Paths starting with `/` are relative to the source root, anything
    /// else to the document's directory.
    #[must_use]
    pub fn resolve_path(&self, path: &str) -> PathBuf {
        match path.strip_prefix('/') {
            Some(rooted) => self.source_dir().join(rooted.trim_start_matches('/')),
            None => self.base_dir.join(path),
        }
    }

    /// Read a file using the context's read_file callback.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub fn read(&self, path: &Path) -> io::Result<String> {
        (self.read_file)(path)
    }

    /// Record that the document's output depends on `path`.
    pub fn note_dependency(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        if !self.dependencies.contains(&path) {
            self.dependencies.push(path);
        }
    }

    /// Files registered so far.
    #[must_use]
    pub fn dependencies(&self) -> &[PathBuf] {
        &self.dependencies
    }

    pub(crate) fn into_dependencies(self) -> Vec<PathBuf> {
        self.dependencies
    }
}
