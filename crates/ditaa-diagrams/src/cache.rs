//! Diagram cache key computation.
//!
//! Provides [`DiagramKey`] for computing content-based hashes used as cache keys.

use sha2::{Digest, Sha256};

/// Diagram parameters for cache key computation.
///
/// Contains every input that affects the rendered image. Used to compute a
/// content-based hash naming the cached files.
#[derive(Debug, Clone, Copy)]
pub struct DiagramKey<'a> {
    /// Diagram markup.
    pub source: &'a str,
    /// Per-diagram renderer option tokens.
    pub options: &'a [String],
    /// Renderer executable.
    pub command: &'a str,
    /// Global renderer arguments.
    pub args: &'a [String],
}

impl DiagramKey<'_> {
    /// Compute a content hash for this diagram key.
    ///
    /// # Hash Format
    ///
    /// Lowercase hex SHA-256 of the source, the debug form of the option
    /// list, the command and the debug form of the global argument list,
    /// concatenated in that order.
    #[must_use]
    pub fn compute_hash(&self) -> String {
        let content = format!(
            "{}{:?}{}{:?}",
            self.source, self.options, self.command, self.args
        );
        let mut hasher = Sha256::new();
        hasher.update(content.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// File stem shared by the cached input and image: `{prefix}-{hash}`.
    #[must_use]
    pub fn file_stem(&self, prefix: &str) -> String {
        format!("{prefix}-{}", self.compute_hash())
    }
}
