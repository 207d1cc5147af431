//! Render-and-cache of ditaa diagrams.
//!
//! [`RenderCache`] names each diagram by a hash of everything that affects
//! its rendering and only runs the renderer when the image for that name is
//! missing.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use ditaa_doctree::{join_uri, relative_uri};

use crate::cache::DiagramKey;
use crate::consts::{ANY_FORMAT, IMAGE_EXTENSION, INPUT_EXTENSION};
use ditaa_config::{DEFAULT_COMMAND, DEFAULT_PREFIX};
use crate::process::{ProcessError, run_with_input};
use crate::session::BuildSession;

/// Fatal failure to render a diagram.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// The renderer ran and exited with a nonzero status.
    #[error("ditaa exited with error:\n[stderr]\n{stderr}\n[stdout]\n{stdout}")]
    Failed { stderr: String, stdout: String },

    #[error("cannot create image directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write diagram input {}: {source}", path.display())]
    WriteInput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Process(#[from] ProcessError),
}

/// A rendered (or previously cached) diagram image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedImage {
    /// URI of the image relative to the requesting document.
    pub uri: String,
    /// Path of the image file.
    pub path: PathBuf,
}

impl RenderedImage {
    /// Format-keyed candidates for an image node.
    #[must_use]
    pub fn candidates(&self) -> BTreeMap<String, PathBuf> {
        BTreeMap::from([(ANY_FORMAT.to_owned(), self.path.clone())])
    }
}

/// Content-addressed diagram renderer.
///
/// # Configuration
///
/// Create the cache with the image directory, then configure using builder
/// methods:
/// - [`command`](Self::command): renderer executable (default: `ditaa`)
/// - [`args`](Self::args): arguments passed before the per-diagram options
/// - [`log_enabled`](Self::log_enabled): log each actual render (default: on)
/// - [`prefix`](Self::prefix): file name prefix (default: `ditaa`)
///
/// # Example
///
/// ```no_run
/// use ditaa_diagrams::{BuildSession, RenderCache};
///
/// let cache = RenderCache::new("/site/_build/_images", "_images")
///     .args(vec!["--scale".to_owned(), "2".to_owned()]);
/// let mut session = BuildSession::new();
///
/// if let Some(image) = cache.render("+---+\n| A |\n+---+", &[], "guide/intro", &mut session)? {
///     assert!(image.uri.starts_with("../_images/ditaa-"));
/// }
/// # Ok::<(), ditaa_diagrams::RenderError>(())
/// ```
#[derive(Debug, Clone)]
pub struct RenderCache {
    /// Directory images are written to.
    image_dir: PathBuf,
    /// Image directory relative to the output root, `/`-separated.
    image_uri_dir: String,
    command: String,
    args: Vec<String>,
    log_enabled: bool,
    prefix: String,
}

impl RenderCache {
    /// Create a cache writing to `image_dir`, which documents reach at
    /// `image_uri_dir` relative to the output root.
    #[must_use]
    pub fn new(image_dir: impl Into<PathBuf>, image_uri_dir: impl Into<String>) -> Self {
        Self {
            image_dir: image_dir.into(),
            image_uri_dir: image_uri_dir.into(),
            command: DEFAULT_COMMAND.to_owned(),
            args: Vec::new(),
            log_enabled: true,
            prefix: DEFAULT_PREFIX.to_owned(),
        }
    }

    /// Set the renderer executable.
    #[must_use]
    pub fn command(mut self, command: impl Into<String>) -> Self {
        self.command = command.into();
        self
    }

    /// Set arguments passed to every renderer invocation.
    #[must_use]
    pub fn args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    /// Enable or disable logging of actual renders.
    #[must_use]
    pub fn log_enabled(mut self, enabled: bool) -> Self {
        self.log_enabled = enabled;
        self
    }

    /// Set the file name prefix.
    #[must_use]
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Render `code` with the per-diagram `options` for document `docname`.
    ///
    /// Returns the cached image when it already exists. Otherwise the markup
    /// is written to `{prefix}-{hash}.ditaa`, and the renderer is run in the
    /// image directory as `command args.. options.. input output`, with the
    /// markup also on stdin.
    ///
    /// Returns `Ok(None)` when the renderer executable cannot be found; the
    /// first such call in `session` records a warning.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError`] if the renderer fails or the files cannot be
    /// written.
    pub fn render(
        &self,
        code: &str,
        options: &[String],
        docname: &str,
        session: &mut BuildSession,
    ) -> Result<Option<RenderedImage>, RenderError> {
        let key = DiagramKey {
            source: code,
            options,
            command: &self.command,
            args: &self.args,
        };
        let stem = key.file_stem(&self.prefix);
        let output_name = format!("{stem}.{IMAGE_EXTENSION}");
        let input_name = format!("{stem}.{INPUT_EXTENSION}");
        let output_path = self.image_dir.join(&output_name);

        let image = RenderedImage {
            uri: join_uri(&relative_uri(docname, &self.image_uri_dir), &output_name),
            path: output_path,
        };

        if image.path.exists() {
            tracing::debug!(docname, file = %output_name, "ditaa diagram cached");
            session.record_cache_hit();
            return Ok(Some(image));
        }

        fs::create_dir_all(&self.image_dir).map_err(|source| RenderError::CreateDir {
            path: self.image_dir.clone(),
            source,
        })?;
        let input_path = self.image_dir.join(&input_name);
        fs::write(&input_path, code).map_err(|source| RenderError::WriteInput {
            path: input_path,
            source,
        })?;

        let mut cmd_args = Vec::with_capacity(self.args.len() + options.len() + 2);
        cmd_args.extend_from_slice(&self.args);
        cmd_args.extend_from_slice(options);
        cmd_args.push(input_name);
        cmd_args.push(output_name.clone());

        if self.log_enabled {
            tracing::info!(docname, file = %output_name, "rendering ditaa diagram");
        }

        let output = match run_with_input(&self.command, &cmd_args, &self.image_dir, code.as_bytes()) {
            Ok(output) => output,
            Err(e) if e.is_not_found() => {
                if session.note_renderer_missing() {
                    session.warn(format!(
                        "ditaa command {:?} cannot be run (needed for ditaa output), \
                         check the ditaa.command setting or DITAA_CMD",
                        self.command
                    ));
                }
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        if !output.success() {
            return Err(RenderError::Failed {
                stderr: output.stderr,
                stdout: output.stdout,
            });
        }

        session.record_render();
        Ok(Some(image))
    }
}
