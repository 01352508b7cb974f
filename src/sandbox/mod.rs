//! Sandbox deployment layer.
//!
//! Defines the [`SandboxDeployer`] trait and the [`FileMapping`] /
//! [`DeploymentResult`] types it works with. The only implementation is
//! [`codesandbox::CodeSandboxClient`], which talks to the CodeSandbox "define"
//! API (token from `CODESANDBOX_API_TOKEN`, optional).

pub mod codesandbox;
pub mod error;
pub mod title;

pub use codesandbox::{deploy_to_codesandbox, deploy_with_config, CodeSandboxClient};
pub use error::DeployError;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single file inside a sandbox.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SandboxFile {
    pub content: String,
    /// When true, `content` is a URL the provider downloads the file from.
    #[serde(rename = "isBinary", default, skip_serializing_if = "is_false")]
    pub is_binary: bool,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl SandboxFile {
    /// A plain text file.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_binary: false,
        }
    }

    /// A binary file hosted at `url`.
    pub fn binary_url(url: impl Into<String>) -> Self {
        Self {
            content: url.into(),
            is_binary: true,
        }
    }
}

/// Relative path → file. Sorted so payloads are deterministic.
pub type FileMapping = BTreeMap<String, SandboxFile>;

/// A sandbox the provider accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deployment {
    pub sandbox_id: String,
    pub embed_url: String,
    pub preview_url: String,
    /// Title resolved for this deployment. Not sent to the provider.
    pub title: String,
}

/// Outcome of one deployment attempt.
#[derive(Debug)]
pub enum DeploymentResult {
    Success(Deployment),
    Failure(DeployError),
}

impl DeploymentResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn deployment(&self) -> Option<&Deployment> {
        match self {
            Self::Success(d) => Some(d),
            Self::Failure(_) => None,
        }
    }

    pub fn sandbox_id(&self) -> Option<&str> {
        self.deployment().map(|d| d.sandbox_id.as_str())
    }

    pub fn preview_url(&self) -> Option<&str> {
        self.deployment().map(|d| d.preview_url.as_str())
    }

    pub fn embed_url(&self) -> Option<&str> {
        self.deployment().map(|d| d.embed_url.as_str())
    }

    /// Human-readable failure message, `None` on success.
    pub fn error_message(&self) -> Option<String> {
        match self {
            Self::Success(_) => None,
            Self::Failure(e) => Some(e.to_string()),
        }
    }

    pub fn into_result(self) -> Result<Deployment, DeployError> {
        self.into()
    }
}

impl From<Result<Deployment, DeployError>> for DeploymentResult {
    fn from(result: Result<Deployment, DeployError>) -> Self {
        match result {
            Ok(d) => Self::Success(d),
            Err(e) => Self::Failure(e),
        }
    }
}

impl From<DeploymentResult> for Result<Deployment, DeployError> {
    fn from(result: DeploymentResult) -> Self {
        match result {
            DeploymentResult::Success(d) => Ok(d),
            DeploymentResult::Failure(e) => Err(e),
        }
    }
}

/// Deploy interface of this crate, implemented by [`CodeSandboxClient`].
///
/// Callers that want to stub out the network depend on this trait.
/// Implementations perform exactly one outbound request per call and fold
/// every failure into [`DeploymentResult::Failure`].
#[async_trait]
pub trait SandboxDeployer: Send + Sync {
    /// Create a sandbox from `files`. `title` falls back to a synthesized one.
    async fn deploy(&self, files: &FileMapping, title: Option<&str>) -> DeploymentResult;
}
