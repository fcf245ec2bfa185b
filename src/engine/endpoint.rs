//! Resolution of the local container engine endpoint.
//!
//! Pure lookup from the host OS to the conventional daemon address: a Unix
//! domain socket on Linux and macOS, a named pipe on Windows.

use crate::error::ProvisionError;

/// Conventional Unix socket address of the Docker daemon.
const UNIX_SOCKET: &str = "unix:///var/run/docker.sock";

/// Conventional named pipe address of the Docker daemon on Windows.
const NAMED_PIPE: &str = "npipe:////./pipe/docker_engine";

/// Address of the local container engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEndpoint {
    /// Unix domain socket path.
    Unix(String),
    /// Windows named pipe path.
    NamedPipe(String),
}

impl EngineEndpoint {
    /// The raw address string.
    pub fn address(&self) -> &str {
        match self {
            Self::Unix(addr) | Self::NamedPipe(addr) => addr,
        }
    }
}

/// Resolves the engine endpoint for the OS the process is running on.
pub fn resolve() -> Result<EngineEndpoint, ProvisionError> {
    resolve_for(std::env::consts::OS)
}

/// Resolves the engine endpoint for a given OS identifier (as reported by
/// `std::env::consts::OS`). Fails for platforms with no known convention.
pub fn resolve_for(os: &str) -> Result<EngineEndpoint, ProvisionError> {
    match os {
        "linux" | "macos" => Ok(EngineEndpoint::Unix(UNIX_SOCKET.to_string())),
        "windows" => Ok(EngineEndpoint::NamedPipe(NAMED_PIPE.to_string())),
        other => Err(ProvisionError::UnsupportedPlatform {
            os: other.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_platforms_resolve_non_empty() {
        for os in ["linux", "macos", "windows"] {
            let endpoint = resolve_for(os).unwrap();
            assert!(!endpoint.address().is_empty(), "empty address for {os}");
        }
    }

    #[test]
    fn test_unix_platforms_use_socket() {
        assert_eq!(
            resolve_for("linux").unwrap(),
            EngineEndpoint::Unix("unix:///var/run/docker.sock".to_string())
        );
        assert_eq!(resolve_for("macos").unwrap(), resolve_for("linux").unwrap());
    }

    #[test]
    fn test_windows_uses_named_pipe() {
        let endpoint = resolve_for("windows").unwrap();
        assert!(matches!(endpoint, EngineEndpoint::NamedPipe(_)));
        assert!(endpoint.address().starts_with("npipe://"));
    }

    #[test]
    fn test_unsupported_platform_fails() {
        let err = resolve_for("freebsd").unwrap_err();
        assert!(matches!(
            err,
            ProvisionError::UnsupportedPlatform { ref os } if os == "freebsd"
        ));
    }
}
