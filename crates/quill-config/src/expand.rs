//! `${VAR}` and `${VAR:-default}` expansion for configuration strings.

use std::borrow::Cow;

use crate::ConfigError;

/// Expand variable references in `value` from the process environment.
///
/// `field` names the config key in the error, e.g. `site.name`.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    expand_with(value, field, |var| std::env::var(var).ok())
}

/// Expand variable references, resolving names through `lookup`.
///
/// Values without `${` are returned untouched, so a bare `$` in a URL or a
/// handle survives.
fn expand_with<F>(value: &str, field: &str, lookup: F) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    shellexpand::env_with_context(value, |var| -> Result<Option<String>, Unset> {
        lookup(var).map(Some).ok_or_else(|| Unset(var.to_owned()))
    })
    .map(Cow::into_owned)
    .map_err(|e| ConfigError::EnvVar {
        field: field.to_owned(),
        message: format!("${{{}}} not set", e.cause.0),
    })
}

/// Name of a variable with no value and no default.
struct Unset(String);
