//! `.env` file rendering.
//!
//! Values made only of "safe" characters are written bare. Everything else is
//! double-quoted with `\`, `"` and newlines escaped, and `$` doubled so the
//! compose tool performs no interpolation on secret material.

use std::borrow::Cow;
use std::fmt::Write as _;

use crate::domain::env::EnvMap;

fn is_bare_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '/' | ':' | '@' | '+' | '-' | ',')
}

/// Quote a value for the env file, borrowing when no quoting is needed.
#[must_use]
pub fn quote_value(value: &str) -> Cow<'_, str> {
    if value.chars().all(is_bare_char) {
        return Cow::Borrowed(value);
    }
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '$' => out.push_str("$$"),
            c => out.push(c),
        }
    }
    out.push('"');
    Cow::Owned(out)
}

/// Render the full env file body, one `KEY=value` line per variable.
#[must_use]
pub fn render_env_file(project: &str, env: &EnvMap) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# Generated by stackctl for project '{project}'. Do not edit.");
    let _ = writeln!(out, "# Contains secret values: keep this file private.");
    for var in env.iter() {
        let _ = writeln!(out, "{}={}", var.key, quote_value(&var.value));
    }
    out
}
