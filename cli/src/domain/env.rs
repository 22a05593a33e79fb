//! Environment assembly: secrets, catalog interpolation, derived connection
//! variables.
//!
//! Pure functions only. The host environment is passed in as a lookup
//! closure so this module never touches `std::env`.

use std::collections::HashMap;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use crate::domain::error::EnvError;
use crate::domain::manifest::{ENV_KEY_RE, Manifest, ServiceRole};

/// Placeholder shown instead of secret-derived values.
pub const REDACTED: &str = "********";

/// RFC 3986 userinfo and path segment: everything except unreserved
/// characters is encoded.
const URL_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

const DATABASE_PORT: u16 = 5432;
const CACHE_PORT: u16 = 6379;

// ── EnvMap ───────────────────────────────────────────────────────────────────

/// A single assembled variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvVar {
    pub key: String,
    pub value: String,
    /// Value came from (or interpolates) a secret.
    pub secret: bool,
}

/// Insertion-ordered variable map that remembers which values are
/// secret-derived.
///
/// Overriding a key replaces its value in place; the key keeps the position
/// of its first insertion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvMap {
    vars: Vec<EnvVar>,
    index: HashMap<String, usize>,
}

impl EnvMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or override a variable. Returns `true` if a previous value was
    /// replaced.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>, secret: bool) -> bool {
        let key = key.into();
        let value = value.into();
        if let Some(&i) = self.index.get(&key) {
            self.vars[i].value = value;
            self.vars[i].secret = secret;
            return true;
        }
        self.index.insert(key.clone(), self.vars.len());
        self.vars.push(EnvVar { key, value, secret });
        false
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.index.get(key).map(|&i| self.vars[i].value.as_str())
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    #[must_use]
    pub fn is_secret(&self, key: &str) -> bool {
        self.index.get(key).is_some_and(|&i| self.vars[i].secret)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Number of secret-derived variables.
    #[must_use]
    pub fn secret_count(&self) -> usize {
        self.vars.iter().filter(|v| v.secret).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EnvVar> {
        self.vars.iter()
    }

    /// `(key, value)` pairs with secret values replaced by [`REDACTED`].
    #[must_use]
    pub fn redacted(&self) -> Vec<(&str, &str)> {
        self.vars
            .iter()
            .map(|v| {
                let shown = if v.secret { REDACTED } else { v.value.as_str() };
                (v.key.as_str(), shown)
            })
            .collect()
    }

    /// `(key, value)` pairs for display: real values when `show_secrets`,
    /// otherwise [`EnvMap::redacted`].
    #[must_use]
    pub fn shown(&self, show_secrets: bool) -> Vec<(&str, &str)> {
        if show_secrets {
            self.vars
                .iter()
                .map(|v| (v.key.as_str(), v.value.as_str()))
                .collect()
        } else {
            self.redacted()
        }
    }
}

// ── Template parsing ─────────────────────────────────────────────────────────

/// One piece of a catalog value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'a> {
    Literal(&'a str),
    /// `$$` escape.
    Dollar,
    /// `${secret:KEY}`
    Secret(&'a str),
    /// `${env:KEY}`
    Host(&'a str),
    /// `${var:KEY}`
    Var(&'a str),
}

/// Split a catalog value into literal text and references.
///
/// A `$` that is not followed by `$` or `{` is literal.
///
/// # Errors
///
/// Returns [`EnvError::BadReference`] for an unterminated `${`, an unknown
/// reference kind, or a key that is not a valid variable name.
pub fn parse_template<'a>(var: &str, template: &'a str) -> Result<Vec<Segment<'a>>, EnvError> {
    let mut segments = Vec::new();
    let mut rest = template;

    while let Some(pos) = rest.find('$') {
        let after = &rest[pos + 1..];
        if after.starts_with('$') {
            push_literal(&mut segments, &rest[..pos]);
            segments.push(Segment::Dollar);
            rest = &after[1..];
        } else if let Some(body) = after.strip_prefix('{') {
            push_literal(&mut segments, &rest[..pos]);
            let Some(end) = body.find('}') else {
                return Err(bad_reference(var, &rest[pos..]));
            };
            let inner = &body[..end];
            segments.push(parse_reference(var, inner)?);
            rest = &body[end + 1..];
        } else {
            push_literal(&mut segments, &rest[..=pos]);
            rest = after;
        }
    }
    push_literal(&mut segments, rest);
    Ok(segments)
}

fn push_literal<'a>(segments: &mut Vec<Segment<'a>>, text: &'a str) {
    if !text.is_empty() {
        segments.push(Segment::Literal(text));
    }
}

fn parse_reference<'a>(var: &str, inner: &'a str) -> Result<Segment<'a>, EnvError> {
    let Some((kind, key)) = inner.split_once(':') else {
        return Err(bad_reference(var, &format!("${{{inner}}}")));
    };
    if !ENV_KEY_RE.is_match(key) {
        return Err(bad_reference(var, &format!("${{{inner}}}")));
    }
    match kind {
        "secret" => Ok(Segment::Secret(key)),
        "env" => Ok(Segment::Host(key)),
        "var" => Ok(Segment::Var(key)),
        _ => Err(bad_reference(var, &format!("${{{inner}}}"))),
    }
}

fn bad_reference(var: &str, reference: &str) -> EnvError {
    EnvError::BadReference {
        var: var.to_string(),
        reference: reference.to_string(),
    }
}

// ── Assembly ─────────────────────────────────────────────────────────────────

/// Build the full environment for the stack.
///
/// Layers, later winning:
/// 1. every fetched secret;
/// 2. the manifest catalog, interpolated in declaration order;
/// 3. derived database/cache connection variables, only where the key is
///    still unset.
///
/// # Errors
///
/// Returns an [`EnvError`] for any unresolved or malformed reference, or if
/// the database password variable is missing.
pub fn assemble(
    manifest: &Manifest,
    secrets: &EnvMap,
    host_env: &impl Fn(&str) -> Option<String>,
) -> Result<EnvMap, EnvError> {
    let mut env = EnvMap::new();
    for var in secrets.iter() {
        env.insert(var.key.clone(), var.value.clone(), true);
    }

    for (key, template) in manifest.env.iter() {
        let (value, secret) = interpolate(key, template, secrets, &env, host_env)?;
        env.insert(key, value, secret);
    }

    add_derived(manifest, &mut env)?;
    Ok(env)
}

fn interpolate(
    var: &str,
    template: &str,
    secrets: &EnvMap,
    env: &EnvMap,
    host_env: &impl Fn(&str) -> Option<String>,
) -> Result<(String, bool), EnvError> {
    let mut out = String::with_capacity(template.len());
    let mut secret = false;

    for segment in parse_template(var, template)? {
        match segment {
            Segment::Literal(text) => out.push_str(text),
            Segment::Dollar => out.push('$'),
            Segment::Secret(key) => {
                let value = secrets.get(key).ok_or_else(|| EnvError::UnresolvedSecret {
                    var: var.to_string(),
                    key: key.to_string(),
                })?;
                out.push_str(value);
                secret = true;
            }
            Segment::Host(key) => {
                let value = host_env(key).ok_or_else(|| EnvError::UnresolvedHostVar {
                    var: var.to_string(),
                    key: key.to_string(),
                })?;
                out.push_str(&value);
            }
            Segment::Var(key) => {
                let value = env.get(key).ok_or_else(|| EnvError::UnresolvedVar {
                    var: var.to_string(),
                    key: key.to_string(),
                })?;
                out.push_str(value);
                secret |= env.is_secret(key);
            }
        }
    }
    Ok((out, secret))
}

fn add_derived(manifest: &Manifest, env: &mut EnvMap) -> Result<(), EnvError> {
    let db = &manifest.services.database;

    let Some(password) = env.get(&db.password_key).map(str::to_owned) else {
        return Err(EnvError::MissingPassword {
            key: db.password_key.clone(),
        });
    };
    let password_secret = env.is_secret(&db.password_key);

    set_default(env, "POSTGRES_USER", &db.user, false);
    set_default(env, "POSTGRES_DB", &db.name, false);
    set_default(env, "POSTGRES_PASSWORD", &password, password_secret);

    // The catalog may override the container's user or database; the URL
    // must follow what the database container is actually given.
    let user = env.get("POSTGRES_USER").unwrap_or(&db.user).to_owned();
    let name = env.get("POSTGRES_DB").unwrap_or(&db.name).to_owned();
    let url_secret =
        password_secret || env.is_secret("POSTGRES_USER") || env.is_secret("POSTGRES_DB");

    let url = format!(
        "postgres://{}:{}@{}:{DATABASE_PORT}/{}",
        utf8_percent_encode(&user, URL_COMPONENT),
        utf8_percent_encode(&password, URL_COMPONENT),
        ServiceRole::Database.as_str(),
        utf8_percent_encode(&name, URL_COMPONENT),
    );
    set_default(env, "DATABASE_URL", &url, url_secret);
    set_default(
        env,
        "REDIS_URL",
        &format!("redis://{}:{CACHE_PORT}/0", ServiceRole::Cache.as_str()),
        false,
    );
    Ok(())
}

fn set_default(env: &mut EnvMap, key: &str, value: &str, secret: bool) {
    if !env.contains_key(key) {
        env.insert(key, value, secret);
    }
}

// ── Unit tests ───────────────────────────────────────────────────────────────
