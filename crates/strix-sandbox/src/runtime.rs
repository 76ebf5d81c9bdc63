//! Container lifecycle: create, execute (with retry), destroy.

use std::collections::HashMap;
use std::time::Duration;

use bollard::Docker;
use bollard::container::{Config, CreateContainerOptions, RemoveContainerOptions};
use bollard::models::{HostConfig, PortBinding};
use bollard::query_parameters::StartContainerOptions;
use strix_core::ids::{AgentId, SandboxId};
use strix_core::retry::{RetryConfig, retry};
use strix_crypto::BearerToken;

use crate::error::SandboxError;
use crate::health::wait_until_healthy;
use crate::sandbox::Sandbox;

/// Deadline for a sandbox's `/health` endpoint to become ready, per §4.2.
const HEALTH_STARTUP_DEADLINE: Duration = Duration::from_secs(60);

/// Default per-call execution timeout, per §6
/// (`STRIX_SANDBOX_EXECUTION_TIMEOUT`).
const DEFAULT_EXECUTION_TIMEOUT: Duration = Duration::from_secs(500);

const WORKER_PORT: u16 = 8088;

/// Configuration for the Sandbox Runtime.
#[derive(Debug, Clone)]
pub struct SandboxRuntimeConfig {
    /// Image reference to launch per scan (`STRIX_IMAGE`).
    pub image: String,
    /// Per-tool-call execution timeout
    /// (`STRIX_SANDBOX_EXECUTION_TIMEOUT`).
    pub execution_timeout: Duration,
}

impl Default for SandboxRuntimeConfig {
    fn default() -> Self {
        Self {
            image: "strixsec/strix-sandbox:latest".to_string(),
            execution_timeout: DEFAULT_EXECUTION_TIMEOUT,
        }
    }
}

/// Creates, health-checks, and tears down per-scan containers, and routes
/// in-sandbox tool calls to a container-local worker.
pub struct SandboxRuntime {
    docker: Docker,
    config: SandboxRuntimeConfig,
}

impl SandboxRuntime {
    /// Connect to the local Docker daemon (`DOCKER_HOST`, or the platform
    /// default socket).
    ///
    /// # Errors
    ///
    /// Returns [`SandboxError::DockerUnavailable`] if the daemon can't be
    /// reached.
    pub fn connect(config: SandboxRuntimeConfig) -> Result<Self, SandboxError> {
        let docker =
            Docker::connect_with_local_defaults().map_err(|e| SandboxError::DockerUnavailable(e.to_string()))?;
        Ok(Self { docker, config })
    }

    /// `create(scan_id) -> sandbox`: pulls the image if absent, launches
    /// with elevated network capabilities, allocates a bearer token, and
    /// waits for `/health` (§4.2).
    ///
    /// # Errors
    ///
    /// Returns [`SandboxError::StartFailed`] if the container can't be
    /// created or started, or [`SandboxError::HealthTimeout`] if `/health`
    /// never becomes ready within 60s.
    pub async fn create(&self, scan_id: &SandboxId) -> Result<Sandbox, SandboxError> {
        let token = BearerToken::generate();
        let container_name = format!("strix-sandbox-{}", scan_id.as_str());

        let mut port_bindings = HashMap::new();
        port_bindings.insert(
            format!("{WORKER_PORT}/tcp"),
            Some(vec![PortBinding {
                host_ip: Some("127.0.0.1".to_string()),
                host_port: Some("0".to_string()),
            }]),
        );

        let host_config = HostConfig {
            port_bindings: Some(port_bindings),
            network_mode: Some("bridge".to_string()),
            ..Default::default()
        };

        let config = Config {
            image: Some(self.config.image.clone()),
            env: Some(vec![format!("STRIX_WORKER_TOKEN={}", token.as_str())]),
            host_config: Some(host_config),
            exposed_ports: Some(HashMap::from([(
                format!("{WORKER_PORT}/tcp"),
                HashMap::new(),
            )])),
            ..Default::default()
        };

        let create_options = CreateContainerOptions {
            name: Some(container_name),
            platform: None,
        };

        let created = self
            .docker
            .create_container(Some(create_options), config)
            .await
            .map_err(|e| SandboxError::StartFailed(e.to_string()))?;

        self.docker
            .start_container(&created.id, None::<StartContainerOptions>)
            .await
            .map_err(|e| SandboxError::StartFailed(e.to_string()))?;

        let base_url = self.resolve_base_url(&created.id).await?;
        let sandbox = Sandbox::new(
            SandboxId::from_string(scan_id.as_str().to_string()),
            created.id,
            token,
            base_url,
        );

        wait_until_healthy(|| async { sandbox.probe_health().await }, HEALTH_STARTUP_DEADLINE)
            .await?;

        Ok(sandbox)
    }

    async fn resolve_base_url(&self, container_id: &str) -> Result<String, SandboxError> {
        let inspect = self
            .docker
            .inspect_container(container_id, None)
            .await
            .map_err(|e| SandboxError::StartFailed(e.to_string()))?;

        let port = inspect
            .network_settings
            .and_then(|ns| ns.ports)
            .and_then(|ports| ports.get(&format!("{WORKER_PORT}/tcp")).cloned().flatten())
            .and_then(|bindings| bindings.into_iter().next())
            .and_then(|binding| binding.host_port)
            .ok_or_else(|| SandboxError::StartFailed("no published worker port".to_string()))?;

        Ok(format!("http://127.0.0.1:{port}"))
    }

    /// `register_agent(sandbox, agent_id) -> worker_id`.
    ///
    /// # Errors
    ///
    /// Returns [`SandboxError::WorkerRegistrationFailed`] if the in-container
    /// worker rejects the registration.
    pub async fn register_agent(
        &self,
        sandbox: &Sandbox,
        agent_id: &AgentId,
    ) -> Result<String, SandboxError> {
        sandbox.register_agent(agent_id).await
    }

    /// `execute(sandbox, agent_id, tool_call) -> result`. Transient
    /// transport failures are retried up to three times with jittered
    /// backoff (§4.2); a call exceeding the configured execution timeout is
    /// abandoned with a timeout error.
    ///
    /// # Errors
    ///
    /// Returns [`SandboxError::ExecutionTimeout`] if the timeout elapses, or
    /// the sandbox's own error otherwise once retries are exhausted.
    pub async fn execute(
        &self,
        sandbox: &Sandbox,
        agent_id: &AgentId,
        tool: &str,
        args: serde_json::Value,
    ) -> Result<String, SandboxError> {
        let timeout = self.config.execution_timeout;
        let outcome = tokio::time::timeout(
            timeout,
            retry(
                RetryConfig::sandbox(),
                || sandbox.execute(agent_id, tool, args.clone()),
                SandboxError::is_retryable,
            ),
        )
        .await;

        match outcome {
            Ok(Ok((result, _))) => Ok(result),
            Ok(Err(err)) => Err(err),
            Err(_elapsed) => Err(SandboxError::ExecutionTimeout(timeout.as_secs())),
        }
    }

    /// `destroy(sandbox)`: idempotent, guaranteed on all exit paths of the
    /// owning scan.
    pub async fn destroy(&self, sandbox: &Sandbox) {
        let options = RemoveContainerOptions {
            force: true,
            ..Default::default()
        };
        if let Err(err) = self
            .docker
            .remove_container(&sandbox.container_id, Some(options))
            .await
        {
            tracing::warn!(container_id = %sandbox.container_id, error = %err, "sandbox teardown failed (already removed?)");
        }
    }
}
