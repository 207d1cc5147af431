//! Internal constants for the ditaa directive and renderer.

/// Directive name.
pub const DIRECTIVE_NAME: &str = "ditaa";

/// Renderer options that take no value.
pub const RENDERER_FLAGS: &[&str] = &[
    "--no-antialias",
    "--no-separation",
    "--html",
    "--overwrite",
    "--round-corners",
    "--no-shadows",
    "--transparent",
    "--fixed-slope",
];

/// Renderer options followed by a value token.
pub const RENDERER_VALUE_OPTIONS: &[&str] = &["--background", "--encoding", "--scale", "--tabs"];

/// Extension of the rendered image.
pub const IMAGE_EXTENSION: &str = "png";

/// Extension of the cached markup copy.
pub const INPUT_EXTENSION: &str = "ditaa";

/// Candidate key matching every output format.
pub const ANY_FORMAT: &str = "*";
