//! Docker implementation of the container engine boundary using bollard.

use std::collections::HashMap;

use bollard::container::{
    Config, CreateContainerOptions, ListContainersOptions, RemoveContainerOptions,
    StartContainerOptions, StopContainerOptions,
};
use bollard::image::CreateImageOptions;
use bollard::models::{ContainerSummary, HostConfig, PortBinding, PortTypeEnum};
use bollard::Docker;
use futures::StreamExt;

use async_trait::async_trait;

use super::endpoint::EngineEndpoint;
use super::{ContainerEngine, ContainerHandle, ContainerSpec, ContainerState, PublishedPort};
use crate::error::EngineError;

/// Connection timeout for engine requests, in seconds.
const CONNECT_TIMEOUT_SECS: u64 = 120;

/// Grace period before a stop escalates to SIGKILL, in seconds.
const STOP_GRACE_SECS: i64 = 10;

/// Docker engine client wrapping bollard.
pub struct DockerEngine {
    docker: Docker,
}

impl DockerEngine {
    /// Connects to the Docker daemon over the resolved endpoint.
    pub fn connect(endpoint: &EngineEndpoint) -> Result<Self, EngineError> {
        let docker = match endpoint {
            #[cfg(unix)]
            EngineEndpoint::Unix(addr) => {
                Docker::connect_with_unix(addr, CONNECT_TIMEOUT_SECS, bollard::API_DEFAULT_VERSION)
            }
            #[cfg(windows)]
            EngineEndpoint::NamedPipe(addr) => Docker::connect_with_named_pipe(
                addr,
                CONNECT_TIMEOUT_SECS,
                bollard::API_DEFAULT_VERSION,
            ),
            #[allow(unreachable_patterns)]
            other => {
                return Err(EngineError::Api(format!(
                    "endpoint {:?} is not usable on this host",
                    other.address()
                )))
            }
        }
        .map_err(|e| EngineError::Api(format!("failed to connect: {e}")))?;

        Ok(Self { docker })
    }

    /// Wraps an existing bollard client.
    pub fn from_docker(docker: Docker) -> Self {
        Self { docker }
    }
}

#[async_trait]
impl ContainerEngine for DockerEngine {
    async fn ensure_image(&self, image: &str, tag: &str) -> Result<(), EngineError> {
        let reference = format!("{image}:{tag}");
        if self.docker.inspect_image(&reference).await.is_ok() {
            tracing::debug!(image = %reference, "Image already present");
            return Ok(());
        }

        tracing::info!(image = %reference, "Pulling image");
        let options = CreateImageOptions {
            from_image: image,
            tag,
            ..Default::default()
        };

        let mut stream = self.docker.create_image(Some(options), None, None);
        while let Some(progress) = stream.next().await {
            progress.map_err(classify)?;
        }

        Ok(())
    }

    async fn list_containers(&self) -> Result<Vec<ContainerHandle>, EngineError> {
        let options = ListContainersOptions::<String> {
            all: true,
            ..Default::default()
        };

        let summaries = self
            .docker
            .list_containers(Some(options))
            .await
            .map_err(classify)?;

        Ok(summaries.into_iter().map(handle_from_summary).collect())
    }

    async fn create_container(&self, spec: &ContainerSpec) -> Result<ContainerHandle, EngineError> {
        let port_key = format!("{}/tcp", spec.port);

        let mut exposed_ports = HashMap::new();
        exposed_ports.insert(port_key.clone(), HashMap::new());

        let mut port_bindings = HashMap::new();
        port_bindings.insert(
            port_key,
            Some(vec![PortBinding {
                host_ip: None,
                host_port: Some(spec.port.to_string()),
            }]),
        );

        let config = Config {
            image: Some(spec.image.clone()),
            env: if spec.env.is_empty() {
                None
            } else {
                Some(spec.env.clone())
            },
            exposed_ports: Some(exposed_ports),
            host_config: Some(HostConfig {
                port_bindings: Some(port_bindings),
                ..Default::default()
            }),
            ..Default::default()
        };

        let options = CreateContainerOptions {
            name: spec.name.clone(),
            platform: None,
        };

        let response = self
            .docker
            .create_container(Some(options), config)
            .await
            .map_err(classify)?;

        Ok(ContainerHandle {
            id: response.id,
            name: spec.name.clone(),
            state: ContainerState::Created,
            ports: vec![PublishedPort {
                container_port: spec.port,
                host_port: Some(spec.port),
                protocol: "tcp".to_string(),
            }],
        })
    }

    async fn start_container(&self, id: &str) -> Result<(), EngineError> {
        self.docker
            .start_container(id, None::<StartContainerOptions<String>>)
            .await
            .map_err(classify)
    }

    async fn stop_container(&self, id: &str) -> Result<(), EngineError> {
        let options = StopContainerOptions { t: STOP_GRACE_SECS };

        self.docker
            .stop_container(id, Some(options))
            .await
            .map_err(classify)
    }

    async fn remove_container(&self, id: &str) -> Result<(), EngineError> {
        let options = RemoveContainerOptions {
            force: true,
            v: true,
            ..Default::default()
        };

        self.docker
            .remove_container(id, Some(options))
            .await
            .map_err(classify)
    }
}

/// Converts an engine container summary into a domain handle, stripping the
/// leading slash Docker adds to declared names.
fn handle_from_summary(summary: ContainerSummary) -> ContainerHandle {
    let name = summary
        .names
        .unwrap_or_default()
        .first()
        .map(|n| n.trim_start_matches('/').to_string())
        .unwrap_or_default();

    let state = summary
        .state
        .as_deref()
        .map(ContainerState::parse)
        .unwrap_or_else(|| ContainerState::Unknown(String::new()));

    let ports = summary
        .ports
        .unwrap_or_default()
        .into_iter()
        .map(|p| PublishedPort {
            container_port: p.private_port,
            host_port: p.public_port,
            protocol: match p.typ {
                Some(PortTypeEnum::UDP) => "udp".to_string(),
                Some(PortTypeEnum::SCTP) => "sctp".to_string(),
                _ => "tcp".to_string(),
            },
        })
        .collect();

    ContainerHandle {
        id: summary.id.unwrap_or_default(),
        name,
        state,
        ports,
    }
}

/// Classifies a raw bollard error into the engine error taxonomy.
fn classify(error: bollard::errors::Error) -> EngineError {
    match error {
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } => {
            if message.contains("port is already allocated")
                || message.contains("address already in use")
            {
                EngineError::PortInUse(message)
            } else if status_code == 409 {
                EngineError::NameInUse(message)
            } else if status_code == 404 {
                EngineError::NotFound(message)
            } else {
                EngineError::Api(message)
            }
        }
        other => EngineError::Api(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bollard::models::Port;

    fn server_error(status_code: u16, message: &str) -> bollard::errors::Error {
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message: message.to_string(),
        }
    }

    #[test]
    fn test_classify_port_conflict() {
        let err = classify(server_error(
            500,
            "driver failed programming external connectivity on endpoint sqlserver: \
             Bind for 0.0.0.0:1433 failed: port is already allocated",
        ));
        assert!(matches!(err, EngineError::PortInUse(_)));
    }

    #[test]
    fn test_classify_address_in_use() {
        let err = classify(server_error(500, "listen tcp4 0.0.0.0:5432: bind: address already in use"));
        assert!(matches!(err, EngineError::PortInUse(_)));
    }

    #[test]
    fn test_classify_name_conflict() {
        let err = classify(server_error(
            409,
            "Conflict. The container name \"/sqlserver\" is already in use",
        ));
        assert!(matches!(err, EngineError::NameInUse(_)));
    }

    #[test]
    fn test_classify_not_found() {
        let err = classify(server_error(404, "No such container: deadbeef"));
        assert!(matches!(err, EngineError::NotFound(_)));
    }

    #[test]
    fn test_classify_other_server_error() {
        let err = classify(server_error(500, "internal error"));
        assert!(matches!(err, EngineError::Api(_)));
    }

    #[test]
    fn test_handle_from_summary_strips_name_prefix() {
        let summary = ContainerSummary {
            id: Some("abc123".to_string()),
            names: Some(vec!["/sqlserver".to_string()]),
            state: Some("running".to_string()),
            ports: Some(vec![Port {
                ip: Some("0.0.0.0".to_string()),
                private_port: 1433,
                public_port: Some(1433),
                typ: Some(PortTypeEnum::TCP),
            }]),
            ..Default::default()
        };

        let handle = handle_from_summary(summary);
        assert_eq!(handle.name, "sqlserver");
        assert_eq!(handle.id, "abc123");
        assert!(handle.state.is_running());
        assert!(handle.publishes_host_port(1433));
    }

    #[test]
    fn test_handle_from_summary_empty_fields() {
        let handle = handle_from_summary(ContainerSummary::default());
        assert!(handle.name.is_empty());
        assert!(handle.ports.is_empty());
        assert!(!handle.state.is_running());
    }
}
