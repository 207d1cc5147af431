//! Environment variable expansion for configuration strings.
//!
//! Only the braced forms are recognised:
//! - `${VAR}` expands to the value of VAR and fails when VAR is unset
//! - `${VAR:-default}` falls back to `default` when VAR is unset

use crate::ConfigError;

/// Expand `${VAR}` references in a single configuration value.
///
/// Strings without `${` are returned unchanged, so bare `$VAR` and literal
/// dollar signs in renderer arguments survive untouched.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    shellexpand::env_with_context(value, |var| -> Result<Option<String>, UnsetVar> {
        std::env::var(var).map(Some).map_err(|_| UnsetVar {
            name: var.to_owned(),
        })
    })
    .map(std::borrow::Cow::into_owned)
    .map_err(|e| ConfigError::EnvVar {
        field: field.to_owned(),
        message: format!("${{{}}} not set", e.cause.name),
    })
}

/// Expand every entry of a list value, reporting the failing index.
pub(crate) fn expand_env_list(values: &[String], field: &str) -> Result<Vec<String>, ConfigError> {
    values
        .iter()
        .enumerate()
        .map(|(i, value)| expand_env(value, &format!("{field}[{i}]")))
        .collect()
}

/// Lookup failure for an unset variable.
struct UnsetVar {
    name: String,
}
