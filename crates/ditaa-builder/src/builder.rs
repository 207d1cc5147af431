//! Documentation site builder.

use std::fs;
use std::path::{Path, PathBuf};

use ditaa_config::{Config, DEFAULT_COMMAND, DEFAULT_IMAGE_DIR, DEFAULT_PREFIX};
use ditaa_diagrams::{BuildSession, DitaaDirective, RenderCache, RenderError, resolve_diagrams};
use ditaa_doctree::{Document, DocumentParser, DocumentParserConfig, OutputFormat, render_document};

use crate::scanner::{Scanner, SourceRef};

/// Configuration for a documentation build.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Directory containing the Markdown sources.
    pub source_dir: PathBuf,
    /// Directory the output is written to.
    pub output_dir: PathBuf,
    pub format: OutputFormat,
    /// Image directory relative to `output_dir`, `/`-separated.
    pub image_dir: String,
    /// Prefix of cached diagram file names.
    pub prefix: String,
    /// Renderer executable.
    pub command: String,
    /// Arguments passed to every renderer invocation.
    pub args: Vec<String>,
    /// Log each diagram render.
    pub log_enabled: bool,
}

impl BuildConfig {
    /// Create a configuration with default renderer settings.
    #[must_use]
    pub fn new(source_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
            output_dir: output_dir.into(),
            format: OutputFormat::Html,
            image_dir: DEFAULT_IMAGE_DIR.to_owned(),
            prefix: DEFAULT_PREFIX.to_owned(),
            command: DEFAULT_COMMAND.to_owned(),
            args: Vec::new(),
            log_enabled: true,
        }
    }

    #[must_use]
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Set the renderer executable and its global arguments.
    #[must_use]
    pub fn with_renderer(mut self, command: impl Into<String>, args: Vec<String>) -> Self {
        self.command = command.into();
        self.args = args;
        self
    }
}

impl From<&Config> for BuildConfig {
    fn from(config: &Config) -> Self {
        let docs = &config.docs_resolved;
        let ditaa = &config.ditaa_resolved;
        Self {
            source_dir: docs.source_dir.clone(),
            output_dir: docs.output_dir.clone(),
            format: OutputFormat::parse(&docs.format).unwrap_or_default(),
            image_dir: ditaa.image_dir.clone(),
            prefix: ditaa.prefix.clone(),
            command: ditaa.command.clone(),
            args: ditaa.args.clone(),
            log_enabled: ditaa.log_enabled,
        }
    }
}

/// Error returned by the site builder.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("source directory not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{docname}: {source}")]
    Render {
        docname: String,
        #[source]
        source: RenderError,
    },
}

/// Summary of a finished build.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BuildReport {
    /// Documents written.
    pub documents: usize,
    /// Diagrams rendered in the session.
    pub rendered: usize,
    /// Diagrams served from existing images in the session.
    pub cache_hits: usize,
    /// Parse warnings followed by session warnings.
    pub warnings: Vec<String>,
    /// Files the documents depend on besides their sources.
    pub dependencies: Vec<PathBuf>,
}

/// Builds a documentation tree: parses every source document, renders its
/// diagrams and writes the result.
pub struct SiteBuilder {
    config: BuildConfig,
}

impl SiteBuilder {
    #[must_use]
    pub fn new(config: BuildConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Run a build pass.
    ///
    /// Documents are processed one at a time in docname order. Counters in
    /// the report are taken from `session`, so they cover every pass the
    /// session has seen.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError`] if the sources cannot be read, output cannot be
    /// written, or a diagram fails to render. The first render failure aborts
    /// the build.
    pub fn build(&self, session: &mut BuildSession) -> Result<BuildReport, BuildError> {
        let source_dir = absolute(&self.config.source_dir);
        let output_dir = absolute(&self.config.output_dir);
        if !source_dir.is_dir() {
            return Err(BuildError::SourceNotFound(source_dir));
        }

        let cache = RenderCache::new(output_dir.join(&self.config.image_dir), self.config.image_dir.clone())
            .command(self.config.command.clone())
            .args(self.config.args.clone())
            .log_enabled(self.config.log_enabled)
            .prefix(self.config.prefix.clone());

        let sources = Scanner::new(source_dir.clone())
            .exclude(output_dir.clone())
            .scan();
        tracing::info!(
            source_dir = %source_dir.display(),
            documents = sources.len(),
            "building documentation"
        );

        let mut report = BuildReport::default();
        for source in &sources {
            let doc = self.build_document(source, &source_dir, &output_dir, &cache, session)?;
            report.documents += 1;
            report.warnings.extend(doc.warnings);
            for dep in doc.dependencies {
                if !report.dependencies.contains(&dep) {
                    report.dependencies.push(dep);
                }
            }
        }

        report.rendered = session.rendered();
        report.cache_hits = session.cache_hits();
        report.warnings.extend(session.warnings().iter().cloned());
        tracing::info!(
            documents = report.documents,
            rendered = report.rendered,
            cache_hits = report.cache_hits,
            "build finished"
        );
        Ok(report)
    }

    fn build_document(
        &self,
        source: &SourceRef,
        source_dir: &Path,
        output_dir: &Path,
        cache: &RenderCache,
        session: &mut BuildSession,
    ) -> Result<Document, BuildError> {
        let text = fs::read_to_string(&source.path).map_err(|e| BuildError::Read {
            path: source.path.clone(),
            source: e,
        })?;

        let config = DocumentParserConfig::for_source(&source.path).with_source_dir(source_dir);
        let mut parser = DocumentParser::with_config(config).with_directive(DitaaDirective::new());
        let mut doc = parser.parse(&source.docname, &text);

        resolve_diagrams(&mut doc, cache, session).map_err(|e| BuildError::Render {
            docname: source.docname.clone(),
            source: e,
        })?;

        let format = self.config.format;
        let out_path = output_dir.join(format!("{}.{}", source.docname, format.extension()));
        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent).map_err(|e| BuildError::Write {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        fs::write(&out_path, render_document(&doc, format)).map_err(|e| BuildError::Write {
            path: out_path.clone(),
            source: e,
        })?;
        tracing::debug!(docname = %source.docname, path = %out_path.display(), "wrote document");

        Ok(doc)
    }
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(all(test, unix))]
mod tests {
    use std::path::Path;

    use super::*;
    use pretty_assertions::assert_eq;

    const GUIDE: &str = "# Guide\n\n:::ditaa{alt=\"Flow\"}\n+---+\n| A |\n+---+\n:::\n\nText.\n";

    /// Renderer stub run as `sh script`; logs one line per call.
    fn renderer(dir: &Path, body: &str) -> (String, Vec<String>) {
        let script = dir.join("renderer.sh");
        let log = dir.join("calls.log");
        fs::write(
            &script,
            format!(
                "echo x >> '{}'\nfor a in \"$@\"; do out=$a; done\n{body}\n",
                log.display()
            ),
        )
        .unwrap();
        ("sh".to_owned(), vec![script.display().to_string()])
    }

    fn site(dir: &Path) -> BuildConfig {
        let docs = dir.join("docs");
        fs::create_dir_all(docs.join("guide")).unwrap();
        fs::write(docs.join("index.md"), "# Home\n").unwrap();
        fs::write(docs.join("guide/intro.md"), GUIDE).unwrap();
        let (command, args) = renderer(dir, "cat > \"$out\"");
        BuildConfig::new(&docs, docs.join("_build")).with_renderer(command, args)
    }

    fn calls(dir: &Path) -> usize {
        fs::read_to_string(dir.join("calls.log"))
            .map(|s| s.lines().count())
            .unwrap_or_default()
    }

    #[test]
    fn test_build_writes_html_with_images() {
        let dir = tempfile::tempdir().unwrap();
        let config = site(dir.path());
        let output = config.output_dir.clone();

        let report = SiteBuilder::new(config).build(&mut BuildSession::new()).unwrap();

        assert_eq!(report.documents, 2);
        assert_eq!(report.rendered, 1);
        assert!(report.warnings.is_empty());
        assert!(output.join("index.html").exists());

        let html = fs::read_to_string(output.join("guide/intro.html")).unwrap();
        assert!(html.contains("<div class=\"diagram\"><img src=\"../_images/ditaa-"), "{html}");
        assert!(html.contains("alt=\"Flow\""));
        assert!(html.contains("<p>Text.</p>"));

        let images: Vec<_> = fs::read_dir(output.join("_images")).unwrap().collect();
        assert_eq!(images.len(), 2, "png and ditaa input");
    }

    #[test]
    fn test_rebuild_uses_cache() {
        let dir = tempfile::tempdir().unwrap();
        let builder = SiteBuilder::new(site(dir.path()));

        builder.build(&mut BuildSession::new()).unwrap();
        let report = builder.build(&mut BuildSession::new()).unwrap();

        assert_eq!(report.rendered, 0);
        assert_eq!(report.cache_hits, 1);
        assert_eq!(calls(dir.path()), 1);
    }

    #[test]
    fn test_markdown_output() {
        let dir = tempfile::tempdir().unwrap();
        let config = site(dir.path()).with_format(OutputFormat::Markdown);
        let output = config.output_dir.clone();

        SiteBuilder::new(config).build(&mut BuildSession::new()).unwrap();

        let md = fs::read_to_string(output.join("guide/intro.md")).unwrap();
        assert!(md.starts_with("# Guide\n\n![Flow](../_images/ditaa-"), "{md}");
        assert!(md.ends_with(".png)\n\nText.\n"), "{md}");
    }

    #[test]
    fn test_missing_renderer_drops_diagrams() {
        let dir = tempfile::tempdir().unwrap();
        let config = site(dir.path()).with_renderer("ditaa-docs-missing-renderer", Vec::new());
        let output = config.output_dir.clone();

        let report = SiteBuilder::new(config).build(&mut BuildSession::new()).unwrap();

        assert_eq!(report.warnings.len(), 1);
        let html = fs::read_to_string(output.join("guide/intro.html")).unwrap();
        assert!(!html.contains("<img"));
        assert!(html.contains("<h1>Guide</h1>\n<p>Text.</p>"), "{html}");
    }

    #[test]
    fn test_render_failure_aborts_build() {
        let dir = tempfile::tempdir().unwrap();
        let config = site(dir.path());
        let (command, args) = renderer(dir.path(), "echo 'bad syntax' >&2\nexit 1");
        let config = config.with_renderer(command, args);

        let err = SiteBuilder::new(config).build(&mut BuildSession::new()).unwrap_err();

        assert!(matches!(&err, BuildError::Render { docname, .. } if docname == "guide/intro"));
    }

    #[test]
    fn test_parse_warnings_and_dependencies_reported() {
        let dir = tempfile::tempdir().unwrap();
        let config = site(dir.path());
        let docs = config.source_dir.clone();
        fs::write(docs.join("index.md"), "# Home\n\n::ditaa[missing.ditaa]\n").unwrap();

        let report = SiteBuilder::new(config).build(&mut BuildSession::new()).unwrap();

        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("missing.ditaa"));
        assert_eq!(report.dependencies, vec![absolute(&docs).join("missing.ditaa")]);
    }

    #[test]
    fn test_rooted_file_argument_from_nested_document() {
        let dir = tempfile::tempdir().unwrap();
        let config = site(dir.path());
        let docs = config.source_dir.clone();
        fs::create_dir_all(docs.join("shared")).unwrap();
        fs::write(docs.join("shared/box.ditaa"), "+---+\n|Box|\n+---+\n").unwrap();
        fs::write(docs.join("guide/intro.md"), "::ditaa[/shared/box.ditaa]\n").unwrap();

        let report = SiteBuilder::new(config).build(&mut BuildSession::new()).unwrap();

        assert!(report.warnings.is_empty(), "{:?}", report.warnings);
        assert_eq!(report.rendered, 1);
        assert_eq!(report.dependencies, vec![absolute(&docs).join("shared/box.ditaa")]);
    }

    #[test]
    fn test_new_uses_config_defaults() {
        let config = BuildConfig::new("docs", "_build");
        let defaults = ditaa_config::DitaaConfig::default();
        assert_eq!(config.image_dir, defaults.image_dir);
        assert_eq!(config.prefix, defaults.prefix);
        assert_eq!(config.command, defaults.command);
        assert_eq!(config.args, defaults.args);
        assert_eq!(config.log_enabled, defaults.log_enabled);
    }

    #[test]
    fn test_missing_source_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config = BuildConfig::new(dir.path().join("nope"), dir.path().join("out"));
        let err = SiteBuilder::new(config).build(&mut BuildSession::new()).unwrap_err();
        assert!(matches!(err, BuildError::SourceNotFound(_)));
    }
}
