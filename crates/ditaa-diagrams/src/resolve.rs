//! Substitution of diagram placeholders with rendered images.

use ditaa_doctree::{Document, ImageNode, Node};

use crate::render::{RenderCache, RenderError};
use crate::session::BuildSession;

/// Render every diagram placeholder of `doc` and substitute it in place.
///
/// A rendered diagram becomes an [`ImageNode`]; a diagram that cannot be
/// rendered because the renderer is missing is removed from the document.
///
/// # Errors
///
/// Returns the first [`RenderError`]. The failing placeholder and all later
/// ones are left untouched.
pub fn resolve_diagrams(
    doc: &mut Document,
    cache: &RenderCache,
    session: &mut BuildSession,
) -> Result<(), RenderError> {
    let mut resolved = Vec::with_capacity(doc.nodes.len());
    let mut nodes = std::mem::take(&mut doc.nodes).into_iter();

    while let Some(node) = nodes.next() {
        let Node::Diagram(diagram) = node else {
            resolved.push(node);
            continue;
        };

        match cache.render(&diagram.code, &diagram.renderer_options, &doc.docname, session) {
            Ok(Some(image)) => resolved.push(Node::Image(ImageNode {
                candidates: image.candidates(),
                uri: image.uri,
                options: diagram.image_options,
            })),
            Ok(None) => {
                tracing::debug!(docname = %doc.docname, line = diagram.line, "dropping ditaa diagram");
            }
            Err(e) => {
                resolved.push(Node::Diagram(diagram));
                resolved.extend(nodes);
                doc.nodes = resolved;
                return Err(e);
            }
        }
    }

    doc.nodes = resolved;
    Ok(())
}
