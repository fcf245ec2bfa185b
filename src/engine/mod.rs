//! Container engine boundary.
//!
//! The provisioning logic talks to the engine through the [`ContainerEngine`]
//! trait so the whole lifecycle can be exercised against a scripted engine in
//! tests. The production implementation lives in [`docker`] and wraps the
//! bollard client; [`endpoint`] resolves how to reach the local daemon.

pub mod docker;
pub mod endpoint;

use async_trait::async_trait;

use crate::error::EngineError;

pub use docker::DockerEngine;
pub use endpoint::EngineEndpoint;

/// State of a container as reported by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerState {
    Created,
    Running,
    Paused,
    Restarting,
    Exited,
    Dead,
    Unknown(String),
}

impl ContainerState {
    /// Parses the engine's state string.
    pub fn parse(state: &str) -> Self {
        match state {
            "created" => Self::Created,
            "running" => Self::Running,
            "paused" => Self::Paused,
            "restarting" => Self::Restarting,
            "exited" => Self::Exited,
            "dead" => Self::Dead,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// Whether the container process is currently up.
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }
}

/// A port published by a container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedPort {
    /// Port inside the container.
    pub container_port: u16,
    /// Bound host port, if published.
    pub host_port: Option<u16>,
    /// Protocol, usually "tcp".
    pub protocol: String,
}

/// A live or previously-live container known to the engine.
#[derive(Debug, Clone)]
pub struct ContainerHandle {
    /// Engine-assigned identifier.
    pub id: String,
    /// Declared name, without the engine's leading slash.
    pub name: String,
    /// Last observed state.
    pub state: ContainerState,
    /// Ports the container publishes.
    pub ports: Vec<PublishedPort>,
}

impl ContainerHandle {
    /// Whether this container publishes `port` as a tcp host port.
    pub fn publishes_host_port(&self, port: u16) -> bool {
        self.ports
            .iter()
            .any(|p| p.host_port == Some(port) && p.protocol == "tcp")
    }
}

/// Specification for a new container: image reference, logical name,
/// environment, and the single port published 1:1 on the host.
#[derive(Debug, Clone)]
pub struct ContainerSpec {
    /// Full image reference including the tag.
    pub image: String,
    /// Logical container name.
    pub name: String,
    /// Environment variables as ordered KEY=VALUE strings.
    pub env: Vec<String>,
    /// Container port, bound to the identical host port.
    pub port: u16,
}

/// Operations the provisioner needs from a container engine.
#[async_trait]
pub trait ContainerEngine: Send + Sync {
    /// Ensures `image:tag` is available locally, pulling it if absent.
    /// Blocks until the pull completes. Idempotent when already present;
    /// registry and network failures surface unchanged.
    async fn ensure_image(&self, image: &str, tag: &str) -> Result<(), EngineError>;

    /// Lists all containers known to the engine, including stopped ones.
    async fn list_containers(&self) -> Result<Vec<ContainerHandle>, EngineError>;

    /// Creates a container from `spec` and returns its handle.
    async fn create_container(&self, spec: &ContainerSpec) -> Result<ContainerHandle, EngineError>;

    /// Starts the container with the given id.
    async fn start_container(&self, id: &str) -> Result<(), EngineError>;

    /// Stops the container with the given id.
    async fn stop_container(&self, id: &str) -> Result<(), EngineError>;

    /// Force-removes the container with the given id, regardless of state.
    async fn remove_container(&self, id: &str) -> Result<(), EngineError>;
}

#[cfg(test)]
pub(crate) mod mock {
    //! Scripted in-memory engine used by the provisioning tests.

    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::{ContainerEngine, ContainerHandle, ContainerSpec, ContainerState, PublishedPort};
    use crate::error::EngineError;

    #[derive(Default)]
    pub struct MockState {
        pub containers: Vec<ContainerHandle>,
        pub ensured_images: Vec<String>,
        pub created_specs: Vec<ContainerSpec>,
        pub start_calls: Vec<String>,
        pub stop_calls: Vec<String>,
        pub remove_calls: Vec<String>,
        /// Errors consumed by successive `start_container` calls before the
        /// start is allowed to succeed.
        pub start_errors: VecDeque<EngineError>,
        next_id: u32,
    }

    #[derive(Default)]
    pub struct MockEngine {
        pub state: Mutex<MockState>,
    }

    impl MockEngine {
        pub fn new() -> Self {
            Self::default()
        }

        /// Seeds an existing container.
        pub fn with_container(
            self,
            id: &str,
            name: &str,
            state: ContainerState,
            host_port: Option<u16>,
        ) -> Self {
            let ports = host_port
                .map(|p| {
                    vec![PublishedPort {
                        container_port: p,
                        host_port: Some(p),
                        protocol: "tcp".to_string(),
                    }]
                })
                .unwrap_or_default();
            self.state.lock().unwrap().containers.push(ContainerHandle {
                id: id.to_string(),
                name: name.to_string(),
                state,
                ports,
            });
            self
        }

        /// Scripts the next start attempt to fail with `error`.
        pub fn fail_next_start(self, error: EngineError) -> Self {
            self.state.lock().unwrap().start_errors.push_back(error);
            self
        }

        pub fn container_named(&self, name: &str) -> Option<ContainerHandle> {
            self.state
                .lock()
                .unwrap()
                .containers
                .iter()
                .find(|c| c.name == name)
                .cloned()
        }
    }

    #[async_trait]
    impl ContainerEngine for MockEngine {
        async fn ensure_image(&self, image: &str, tag: &str) -> Result<(), EngineError> {
            self.state
                .lock()
                .unwrap()
                .ensured_images
                .push(format!("{image}:{tag}"));
            Ok(())
        }

        async fn list_containers(&self) -> Result<Vec<ContainerHandle>, EngineError> {
            Ok(self.state.lock().unwrap().containers.clone())
        }

        async fn create_container(
            &self,
            spec: &ContainerSpec,
        ) -> Result<ContainerHandle, EngineError> {
            let mut state = self.state.lock().unwrap();
            if state.containers.iter().any(|c| c.name == spec.name) {
                return Err(EngineError::NameInUse(spec.name.clone()));
            }
            state.next_id += 1;
            let handle = ContainerHandle {
                id: format!("mock-{}", state.next_id),
                name: spec.name.clone(),
                state: ContainerState::Created,
                ports: vec![PublishedPort {
                    container_port: spec.port,
                    host_port: Some(spec.port),
                    protocol: "tcp".to_string(),
                }],
            };
            state.created_specs.push(spec.clone());
            state.containers.push(handle.clone());
            Ok(handle)
        }

        async fn start_container(&self, id: &str) -> Result<(), EngineError> {
            let mut state = self.state.lock().unwrap();
            state.start_calls.push(id.to_string());
            if let Some(err) = state.start_errors.pop_front() {
                return Err(err);
            }
            let container = state
                .containers
                .iter_mut()
                .find(|c| c.id == id)
                .ok_or_else(|| EngineError::NotFound(id.to_string()))?;
            container.state = ContainerState::Running;
            Ok(())
        }

        async fn stop_container(&self, id: &str) -> Result<(), EngineError> {
            let mut state = self.state.lock().unwrap();
            state.stop_calls.push(id.to_string());
            let container = state
                .containers
                .iter_mut()
                .find(|c| c.id == id)
                .ok_or_else(|| EngineError::NotFound(id.to_string()))?;
            container.state = ContainerState::Exited;
            Ok(())
        }

        async fn remove_container(&self, id: &str) -> Result<(), EngineError> {
            let mut state = self.state.lock().unwrap();
            state.remove_calls.push(id.to_string());
            let before = state.containers.len();
            state.containers.retain(|c| c.id != id);
            if state.containers.len() == before {
                return Err(EngineError::NotFound(id.to_string()));
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_parsing() {
        assert_eq!(ContainerState::parse("running"), ContainerState::Running);
        assert_eq!(ContainerState::parse("created"), ContainerState::Created);
        assert_eq!(ContainerState::parse("exited"), ContainerState::Exited);
        assert!(matches!(
            ContainerState::parse("weird"),
            ContainerState::Unknown(_)
        ));
        assert!(ContainerState::Running.is_running());
        assert!(!ContainerState::Exited.is_running());
    }

    #[test]
    fn test_publishes_host_port() {
        let handle = ContainerHandle {
            id: "abc".to_string(),
            name: "db".to_string(),
            state: ContainerState::Running,
            ports: vec![
                PublishedPort {
                    container_port: 5432,
                    host_port: Some(5432),
                    protocol: "tcp".to_string(),
                },
                PublishedPort {
                    container_port: 9000,
                    host_port: None,
                    protocol: "tcp".to_string(),
                },
            ],
        };

        assert!(handle.publishes_host_port(5432));
        assert!(!handle.publishes_host_port(9000));
        assert!(!handle.publishes_host_port(1433));
    }
}
