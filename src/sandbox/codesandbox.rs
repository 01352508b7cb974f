//! CodeSandbox provider — HTTP client for the sandbox "define" API.
//!
//! One `deploy` call is one POST of `{"files": …}`. The response's
//! `sandbox_id` is turned into an embed URL and a share URL.

use super::error::DeployError;
use super::title::{self, Clock};
use super::{Deployment, DeploymentResult, FileMapping, SandboxDeployer};
use crate::config::DeployConfig;
use async_trait::async_trait;
use serde::Serialize;

/// Query string appended to embed URLs.
pub const EMBED_QUERY: &str = "fontsize=14&hidenavigation=1&theme=dark&view=preview";

/// Request body of the define endpoint.
#[derive(Serialize)]
struct DefineRequest<'a> {
    files: &'a FileMapping,
}

/// HTTP client for the CodeSandbox define API.
pub struct CodeSandboxClient {
    config: DeployConfig,
    http: reqwest::Client,
    clock: Clock,
}

impl CodeSandboxClient {
    pub fn new(config: DeployConfig) -> Result<Self, DeployError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .redirect(reqwest::redirect::Policy::none())
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| DeployError::Unexpected(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            config,
            http,
            clock: title::system_clock(),
        })
    }

    /// Client with default settings and the token from `CODESANDBOX_API_TOKEN`.
    pub fn from_env() -> Result<Self, DeployError> {
        Self::new(DeployConfig::from_env())
    }

    /// Replace the time source used for default titles.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &DeployConfig {
        &self.config
    }

    pub fn embed_url(&self, sandbox_id: &str) -> String {
        format!(
            "{}/{sandbox_id}?{EMBED_QUERY}",
            self.config.embed_base_url.trim_end_matches('/')
        )
    }

    pub fn preview_url(&self, sandbox_id: &str) -> String {
        format!(
            "{}/{sandbox_id}",
            self.config.share_base_url.trim_end_matches('/')
        )
    }

    async fn try_deploy(
        &self,
        files: &FileMapping,
        title: Option<&str>,
    ) -> Result<Deployment, DeployError> {
        // The define API has no title field; the title stays local.
        let title = title::resolve_title(title, &self.config.title_prefix, &self.clock);

        let mut request = self
            .http
            .post(&self.config.api_url)
            .json(&DefineRequest { files });
        if let Some(token) = &self.config.api_token {
            request = request.header("Authorization", format!("Bearer {token}"));
        }

        let resp = request.send().await?;
        let status = resp.status();
        let body_text = resp.text().await?;

        if !status.is_success() {
            return Err(DeployError::rejected(status.as_u16(), &body_text));
        }

        let parsed: serde_json::Value =
            serde_json::from_str(&body_text).map_err(|_| DeployError::MalformedResponse)?;
        let sandbox_id = extract_sandbox_id(&parsed)?;

        Ok(Deployment {
            embed_url: self.embed_url(&sandbox_id),
            preview_url: self.preview_url(&sandbox_id),
            sandbox_id,
            title,
        })
    }
}

#[async_trait]
impl SandboxDeployer for CodeSandboxClient {
    async fn deploy(&self, files: &FileMapping, title: Option<&str>) -> DeploymentResult {
        self.try_deploy(files, title).await.into()
    }
}

/// Pull a non-empty `sandbox_id` out of the response object.
fn extract_sandbox_id(parsed: &serde_json::Value) -> Result<String, DeployError> {
    let Some(object) = parsed.as_object() else {
        return Err(DeployError::Unexpected(format!(
            "Unexpected response from API: expected a JSON object, got {parsed}"
        )));
    };

    match object.get("sandbox_id") {
        Some(serde_json::Value::String(id)) if !id.is_empty() => Ok(id.clone()),
        Some(serde_json::Value::Number(n)) if n.as_f64() != Some(0.0) => Ok(n.to_string()),
        _ => Err(DeployError::IncompleteResponse),
    }
}

/// Deploy `files` with a one-off client built from `config`.
///
/// Never fails: client construction errors come back as
/// [`DeploymentResult::Failure`] like any other problem.
pub async fn deploy_with_config(
    config: DeployConfig,
    files: &FileMapping,
    title: Option<&str>,
) -> DeploymentResult {
    match CodeSandboxClient::new(config) {
        Ok(client) => client.deploy(files, title).await,
        Err(e) => DeploymentResult::Failure(e),
    }
}

/// Deploy `files` with default settings and the token from the environment.
pub async fn deploy_to_codesandbox(files: &FileMapping, title: Option<&str>) -> DeploymentResult {
    deploy_with_config(DeployConfig::from_env(), files, title).await
}
