//! Infrastructure implementations of the `SecretStore` port.
//!
//! Cloud stores are reached through their official CLIs, so whatever
//! credentials the operator already configured (profiles, SSO, workload
//! identity) apply unchanged.

use anyhow::{Context, Result};

use crate::application::ports::{CommandRunner, SecretStore};
use crate::domain::error::SecretError;
use crate::domain::manifest::{SecretProvider, SecretsConfig};

const AWS: &str = "aws";
const GCLOUD: &str = "gcloud";

/// Prefix of process variables read by the `env` provider.
pub const ENV_SECRET_PREFIX: &str = "STACKCTL_SECRET_";

fn fetch_error(name: &str, output: &std::process::Output) -> anyhow::Error {
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    let detail = if stderr.is_empty() {
        format!("exit status {:?}", output.status.code())
    } else {
        stderr
    };
    SecretError::Fetch {
        name: name.to_string(),
        detail,
    }
    .into()
}

/// Both CLIs terminate the value with a single newline.
fn strip_newline(mut value: String) -> String {
    if value.ends_with('\n') {
        value.pop();
        if value.ends_with('\r') {
            value.pop();
        }
    }
    value
}

// ── AWS Secrets Manager ───────────────────────────────────────────────────────

/// `aws secretsmanager get-secret-value`.
pub struct AwsCliSecretStore<R> {
    runner: R,
    region: Option<String>,
}

impl<R: CommandRunner> AwsCliSecretStore<R> {
    pub fn new(runner: R, region: Option<String>) -> Self {
        Self { runner, region }
    }
}

impl<R: CommandRunner> SecretStore for AwsCliSecretStore<R> {
    async fn fetch(&self, name: &str) -> Result<String> {
        let mut args = vec![
            "secretsmanager",
            "get-secret-value",
            "--secret-id",
            name,
            "--query",
            "SecretString",
            "--output",
            "text",
        ];
        if let Some(region) = &self.region {
            args.extend(["--region", region.as_str()]);
        }
        let output = self
            .runner
            .run(AWS, &args)
            .await
            .with_context(|| format!("running {AWS} for secret '{name}'"))?;
        if !output.status.success() {
            return Err(fetch_error(name, &output));
        }
        Ok(strip_newline(String::from_utf8_lossy(&output.stdout).into_owned()))
    }
}

// ── Google Secret Manager ─────────────────────────────────────────────────────

/// `gcloud secrets versions access latest`.
pub struct GcloudSecretStore<R> {
    runner: R,
    project: Option<String>,
}

impl<R: CommandRunner> GcloudSecretStore<R> {
    pub fn new(runner: R, project: Option<String>) -> Self {
        Self { runner, project }
    }
}

impl<R: CommandRunner> SecretStore for GcloudSecretStore<R> {
    async fn fetch(&self, name: &str) -> Result<String> {
        let secret_arg = format!("--secret={name}");
        let project_arg = self.project.as_ref().map(|p| format!("--project={p}"));
        let mut args = vec!["secrets", "versions", "access", "latest", secret_arg.as_str()];
        if let Some(p) = &project_arg {
            args.push(p);
        }
        let output = self
            .runner
            .run(GCLOUD, &args)
            .await
            .with_context(|| format!("running {GCLOUD} for secret '{name}'"))?;
        if !output.status.success() {
            return Err(fetch_error(name, &output));
        }
        Ok(strip_newline(String::from_utf8_lossy(&output.stdout).into_owned()))
    }
}

// ── Process environment ───────────────────────────────────────────────────────

/// Variable name the `env` provider reads for a secret: the name upper-cased,
/// non-alphanumerics replaced by `_`, prefixed with `STACKCTL_SECRET_`.
#[must_use]
pub fn env_var_name(secret: &str) -> String {
    let suffix: String = secret
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect();
    format!("{ENV_SECRET_PREFIX}{suffix}")
}

/// Reads secrets from variables via a lookup function.
pub struct EnvSecretStore<F> {
    lookup: F,
}

impl<F: Fn(&str) -> Option<String>> EnvSecretStore<F> {
    pub fn new(lookup: F) -> Self {
        Self { lookup }
    }
}

impl EnvSecretStore<fn(&str) -> Option<String>> {
    /// Store backed by the real process environment.
    #[must_use]
    pub fn from_process() -> Self {
        Self::new(|key| std::env::var(key).ok())
    }
}

impl<F: Fn(&str) -> Option<String>> SecretStore for EnvSecretStore<F> {
    async fn fetch(&self, name: &str) -> Result<String> {
        let var = env_var_name(name);
        (self.lookup)(&var).ok_or_else(|| {
            SecretError::MissingEnv {
                name: name.to_string(),
                var,
            }
            .into()
        })
    }
}

// ── Provider dispatch ─────────────────────────────────────────────────────────

/// The store selected by the manifest's `secrets.provider`.
pub enum ProviderSecretStore<R> {
    Aws(AwsCliSecretStore<R>),
    Gcloud(GcloudSecretStore<R>),
    Env(EnvSecretStore<fn(&str) -> Option<String>>),
}

impl<R: CommandRunner> ProviderSecretStore<R> {
    pub fn from_config(config: &SecretsConfig, runner: R) -> Self {
        match config.provider {
            SecretProvider::Aws => Self::Aws(AwsCliSecretStore::new(runner, config.region.clone())),
            SecretProvider::Gcloud => {
                Self::Gcloud(GcloudSecretStore::new(runner, config.project.clone()))
            }
            SecretProvider::Env => Self::Env(EnvSecretStore::from_process()),
        }
    }
}

impl<R: CommandRunner> SecretStore for ProviderSecretStore<R> {
    async fn fetch(&self, name: &str) -> Result<String> {
        match self {
            Self::Aws(store) => store.fetch(name).await,
            Self::Gcloud(store) => store.fetch(name).await,
            Self::Env(store) => store.fetch(name).await,
        }
    }
}
