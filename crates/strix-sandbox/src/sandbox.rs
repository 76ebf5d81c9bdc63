//! A single sandbox handle: one container, one bearer token, one base URL.

use serde::{Deserialize, Serialize};
use strix_core::ids::{AgentId, SandboxId};
use strix_crypto::BearerToken;

use crate::SandboxError;

/// A running sandbox: one container per scan, reachable over HTTP.
pub struct Sandbox {
    /// This sandbox's ID.
    pub id: SandboxId,
    /// The underlying Docker container ID.
    pub container_id: String,
    /// Bearer token presented on every request to this sandbox's worker.
    pub token: BearerToken,
    /// Base URL of the container's worker HTTP server (e.g.
    /// `http://127.0.0.1:PORT`).
    pub base_url: String,
    http: reqwest::Client,
}

/// `{ok: true, result} | {ok: false, error: {kind, message}}`, per §6.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ToolCallResponse {
    /// Successful execution.
    Ok {
        /// Always `true` on this variant.
        ok: bool,
        /// The tool's textual result.
        result: String,
    },
    /// Failed execution.
    Err {
        /// Always `false` on this variant.
        ok: bool,
        /// Structured error detail.
        error: ToolCallError,
    },
}

/// The `{kind, message}` error shape returned by a worker.
#[derive(Debug, Deserialize, Serialize)]
pub struct ToolCallError {
    /// Machine-readable error kind.
    pub kind: String,
    /// Human-readable detail.
    pub message: String,
}

#[derive(Serialize)]
struct ExecuteRequest<'a> {
    agent_id: &'a str,
    tool: &'a str,
    args: serde_json::Value,
}

#[derive(Serialize)]
struct RegisterAgentRequest<'a> {
    agent_id: &'a str,
}

#[derive(Deserialize)]
struct RegisterAgentResponse {
    worker_id: String,
}

impl Sandbox {
    pub(crate) fn new(
        id: SandboxId,
        container_id: String,
        token: BearerToken,
        base_url: String,
    ) -> Self {
        Self {
            id,
            container_id,
            token,
            base_url,
            http: reqwest::Client::new(),
        }
    }

    /// `GET /health` once, returning whether the worker answered 200.
    pub async fn probe_health(&self) -> bool {
        self.http
            .get(format!("{}/health", self.base_url))
            .bearer_auth(self.token.as_str())
            .send()
            .await
            .is_ok_and(|resp| resp.status().is_success())
    }

    /// `POST /register_agent {agent_id}` — forks a dedicated worker process
    /// so tool state (a browser session, a shell) is isolated per agent.
    ///
    /// # Errors
    ///
    /// Returns [`SandboxError::WorkerRegistrationFailed`] on any transport
    /// or non-success response.
    pub async fn register_agent(&self, agent_id: &AgentId) -> Result<String, SandboxError> {
        let resp = self
            .http
            .post(format!("{}/register_agent", self.base_url))
            .bearer_auth(self.token.as_str())
            .json(&RegisterAgentRequest {
                agent_id: agent_id.as_str(),
            })
            .send()
            .await
            .map_err(|e| SandboxError::WorkerRegistrationFailed(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(SandboxError::WorkerRegistrationFailed(format!(
                "status {}",
                resp.status()
            )));
        }

        let body: RegisterAgentResponse = resp
            .json()
            .await
            .map_err(|e| SandboxError::WorkerRegistrationFailed(e.to_string()))?;
        Ok(body.worker_id)
    }

    /// `POST /execute {agent_id, tool, args}` against the agent's registered
    /// worker.
    ///
    /// # Errors
    ///
    /// Returns [`SandboxError::Transport`] for connection-level failures
    /// (retryable by the caller per §4.2) and [`SandboxError::ExecutionFailed`]
    /// if the worker itself reports an error.
    pub async fn execute(
        &self,
        agent_id: &AgentId,
        tool: &str,
        args: serde_json::Value,
    ) -> Result<String, SandboxError> {
        let resp = self
            .http
            .post(format!("{}/execute", self.base_url))
            .bearer_auth(self.token.as_str())
            .json(&ExecuteRequest {
                agent_id: agent_id.as_str(),
                tool,
                args,
            })
            .send()
            .await
            .map_err(|e| SandboxError::Transport(e.to_string()))?;

        let body: ToolCallResponse = resp
            .json()
            .await
            .map_err(|e| SandboxError::Transport(e.to_string()))?;

        match body {
            ToolCallResponse::Ok { result, .. } => Ok(result),
            ToolCallResponse::Err { error, .. } => Err(SandboxError::ExecutionFailed(format!(
                "{}: {}",
                error.kind, error.message
            ))),
        }
    }
}
