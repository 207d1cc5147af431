//! The `ditaa` block directive.
//!
//! Markup is given either inline:
//!
//! ```text
//! :::ditaa{--no-shadows alt="Request flow"}
//! +--------+   +-------+
//! | Client |-->| Proxy |
//! +--------+   +-------+
//! :::
//! ```
//!
//! or as a file relative to the document, `::ditaa[diagrams/flow.ditaa]`.
//! Attributes starting with `--` are renderer options; the rest are image
//! presentation options.

use ditaa_doctree::directive::{BlockDirective, DirectiveBlock, DirectiveContext, DirectiveError};
use ditaa_doctree::{DiagramNode, ImageOptions, Node};

use crate::consts::{DIRECTIVE_NAME, RENDERER_FLAGS, RENDERER_VALUE_OPTIONS};

/// Handler producing a [`DiagramNode`] per `ditaa` directive.
///
/// Register it with
/// [`DocumentParser::with_directive`](ditaa_doctree::DocumentParser::with_directive).
#[derive(Debug, Default, Clone, Copy)]
pub struct DitaaDirective;

impl DitaaDirective {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl BlockDirective for DitaaDirective {
    fn name(&self) -> &str {
        DIRECTIVE_NAME
    }

    fn run(
        &mut self,
        block: DirectiveBlock,
        ctx: &mut DirectiveContext,
    ) -> Result<Vec<Node>, DirectiveError> {
        let has_content = block.content.iter().any(|line| !line.trim().is_empty());

        let code = match block.argument() {
            Some(_) if has_content => {
                return Err(DirectiveError::ContentAndArgument {
                    directive: DIRECTIVE_NAME.to_owned(),
                });
            }
            Some(file) => {
                let path = ctx.resolve_path(file);
                ctx.note_dependency(&path);
                ctx.read(&path).map_err(|source| DirectiveError::ReadFile {
                    directive: DIRECTIVE_NAME.to_owned(),
                    path,
                    source,
                })?
            }
            None => block.content.join("\n"),
        };

        if code.trim().is_empty() {
            return Err(DirectiveError::Empty {
                directive: DIRECTIVE_NAME.to_owned(),
            });
        }

        let (renderer_options, image_options) = classify_options(&block)?;

        Ok(vec![Node::Diagram(DiagramNode {
            code,
            renderer_options,
            image_options,
            line: ctx.line,
        })])
    }
}

/// Split directive attributes into renderer tokens and image options.
fn classify_options(block: &DirectiveBlock) -> Result<(Vec<String>, ImageOptions), DirectiveError> {
    let mut renderer_options = Vec::new();
    let mut image_options = ImageOptions::default();

    if let Some(id) = &block.args.id {
        image_options.name = Some(id.clone());
    }

    for (key, value) in &block.args.attrs {
        if key.starts_with("--") {
            push_renderer_option(&mut renderer_options, key, value.as_deref())?;
        } else if !image_options.set(key, value.clone().unwrap_or_default()) {
            return Err(unknown_option(key));
        }
    }

    if !block.args.classes.is_empty() {
        let mut classes: Vec<&str> = image_options
            .class
            .as_deref()
            .map(|c| c.split_whitespace().collect())
            .unwrap_or_default();
        classes.extend(block.args.classes.iter().map(String::as_str));
        image_options.class = Some(classes.join(" "));
    }

    Ok((renderer_options, image_options))
}

fn push_renderer_option(
    tokens: &mut Vec<String>,
    key: &str,
    value: Option<&str>,
) -> Result<(), DirectiveError> {
    if RENDERER_FLAGS.contains(&key) {
        if value.is_some() {
            return Err(DirectiveError::UnexpectedValue {
                directive: DIRECTIVE_NAME.to_owned(),
                option: key.to_owned(),
            });
        }
        tokens.push(key.to_owned());
    } else if RENDERER_VALUE_OPTIONS.contains(&key) {
        let Some(value) = value.filter(|v| !v.is_empty()) else {
            return Err(DirectiveError::MissingValue {
                directive: DIRECTIVE_NAME.to_owned(),
                option: key.to_owned(),
            });
        };
        tokens.push(key.to_owned());
        tokens.push(value.to_owned());
    } else {
        return Err(unknown_option(key));
    }
    Ok(())
}

fn unknown_option(key: &str) -> DirectiveError {
    DirectiveError::UnknownOption {
        directive: DIRECTIVE_NAME.to_owned(),
        option: key.to_owned(),
    }
}
