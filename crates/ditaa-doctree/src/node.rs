//! Document tree.
//!
//! A parsed document is a flat sequence of [`Node`]s. Directive placeholders
//! ([`DiagramNode`]) are replaced by [`ImageNode`]s during resolution, before
//! the document is written.

use std::collections::BTreeMap;
use std::path::PathBuf;

/// A parsed document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    /// Document name: path relative to the source root, `/`-separated,
    /// without extension (e.g. `guide/intro`).
    pub docname: String,
    /// Source file, if the document was read from disk.
    pub source_path: Option<PathBuf>,
    /// Nodes in document order.
    pub nodes: Vec<Node>,
    /// Files the document's output depends on besides its own source.
    pub dependencies: Vec<PathBuf>,
    /// Warnings reported while parsing.
    pub warnings: Vec<String>,
}

impl Document {
    /// Create an empty document.
    #[must_use]
    pub fn new(docname: impl Into<String>) -> Self {
        Self {
            docname: docname.into(),
            ..Self::default()
        }
    }

    /// Number of unresolved diagram placeholders.
    #[must_use]
    pub fn pending_diagrams(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, Node::Diagram(_)))
            .count()
    }
}

/// A node of the document tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Markdown source passed through to the writer.
    Markdown(String),
    /// Diagram placeholder awaiting rendering.
    Diagram(DiagramNode),
    /// Image reference.
    Image(ImageNode),
}

/// Placeholder for a diagram to be rendered during resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramNode {
    /// Raw diagram markup.
    pub code: String,
    /// Renderer flag tokens in directive order (flag, then value if any).
    pub renderer_options: Vec<String>,
    /// Presentation options for the resulting image.
    pub image_options: ImageOptions,
    /// Line of the directive in the source document.
    pub line: usize,
}

/// Reference to a rendered image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageNode {
    /// URI relative to the document's output location.
    pub uri: String,
    /// Image file per output format; `"*"` matches any format.
    pub candidates: BTreeMap<String, PathBuf>,
    /// Presentation options.
    pub options: ImageOptions,
}

/// Image presentation options.
///
/// All values are kept as written; the writer interprets them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageOptions {
    pub name: Option<String>,
    pub class: Option<String>,
    pub alt: Option<String>,
    pub title: Option<String>,
    pub height: Option<String>,
    pub width: Option<String>,
    /// Uniform scaling factor in percent.
    pub scale: Option<String>,
    pub align: Option<String>,
    /// Link target for the image.
    pub target: Option<String>,
    /// Emit the image without its block wrapper.
    pub inline: Option<String>,
}

impl ImageOptions {
    /// Recognised option names, in declaration order.
    pub const NAMES: &'static [&'static str] = &[
        "name", "class", "alt", "title", "height", "width", "scale", "align", "target", "inline",
    ];

    /// Set an option by name.
    ///
    /// Returns `false` (and changes nothing) if `name` is not an image option.
    pub fn set(&mut self, name: &str, value: impl Into<String>) -> bool {
        let Some(slot) = self.slot_mut(name) else {
            return false;
        };
        *slot = Some(value.into());
        true
    }

    /// Get an option by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        let value = match name {
            "name" => &self.name,
            "class" => &self.class,
            "alt" => &self.alt,
            "title" => &self.title,
            "height" => &self.height,
            "width" => &self.width,
            "scale" => &self.scale,
            "align" => &self.align,
            "target" => &self.target,
            "inline" => &self.inline,
            _ => return None,
        };
        value.as_deref()
    }

    /// Iterate over the options that are set, in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        Self::NAMES
            .iter()
            .filter_map(|&name| self.get(name).map(|value| (name, value)))
    }

    fn slot_mut(&mut self, name: &str) -> Option<&mut Option<String>> {
        Some(match name {
            "name" => &mut self.name,
            "class" => &mut self.class,
            "alt" => &mut self.alt,
            "title" => &mut self.title,
            "height" => &mut self.height,
            "width" => &mut self.width,
            "scale" => &mut self.scale,
            "align" => &mut self.align,
            "target" => &mut self.target,
            "inline" => &mut self.inline,
            _ => return None,
        })
    }
}
