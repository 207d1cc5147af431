//! Per-build state.

/// State shared by every render call of one build pass.
///
/// Replaces process-wide state: the "renderer missing" warning is issued at
/// most once per session, and a watch loop starts each pass with a fresh
/// session (or calls [`reset`](Self::reset)).
#[derive(Debug, Default)]
pub struct BuildSession {
    renderer_missing_warned: bool,
    warnings: Vec<String>,
    rendered: usize,
    cache_hits: usize,
}

impl BuildSession {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget everything recorded so far.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Record a missing renderer.
    ///
    /// Returns `true` the first time it is called in this session, when the
    /// caller should warn.
    pub fn note_renderer_missing(&mut self) -> bool {
        !std::mem::replace(&mut self.renderer_missing_warned, true)
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!("{message}");
        self.warnings.push(message);
    }

    #[must_use]
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub(crate) fn record_render(&mut self) {
        self.rendered += 1;
    }

    pub(crate) fn record_cache_hit(&mut self) {
        self.cache_hits += 1;
    }

    /// Diagrams rendered by running the renderer.
    #[must_use]
    pub fn rendered(&self) -> usize {
        self.rendered
    }

    /// Diagrams served from an existing image.
    #[must_use]
    pub fn cache_hits(&self) -> usize {
        self.cache_hits
    }
}
