use std::path::Path;

/// Default TCP port of the scheduling endpoint.
pub const DEFAULT_PORT: u16 = 5555;

/// Endpoint of the request/reply channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transport {
    /// Unix domain socket under `/tmp/fahrplan/` for same-host clients.
    Ipc(String),

    /// TCP for networked clients.
    Tcp { host: String, port: u16 },
}

impl Transport {
    /// An IPC transport with the given socket name.
    pub fn ipc(name: &str) -> Self {
        Self::Ipc(name.to_string())
    }

    /// A TCP transport with the given host and port.
    pub fn tcp(host: impl Into<String>, port: u16) -> Self {
        Self::Tcp {
            host: host.into(),
            port,
        }
    }

    /// The ZeroMQ endpoint address string.
    pub fn endpoint(&self) -> String {
        match self {
            Self::Ipc(name) => format!("ipc:///tmp/fahrplan/{name}.sock"),
            Self::Tcp { host, port } => format!("tcp://{host}:{port}"),
        }
    }

    /// For IPC transports, ensure the socket's parent directory exists.
    ///
    /// ZeroMQ requires the directory to exist before binding an IPC
    /// socket. No-op for TCP.
    pub fn ensure_ipc_dir(&self) -> std::io::Result<()> {
        if let Self::Ipc(_) = self {
            let endpoint = self.endpoint();
            let path = endpoint.strip_prefix("ipc://").unwrap_or(&endpoint);
            if let Some(parent) = Path::new(path).parent() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Ok(())
    }

    /// Remove a stale IPC socket file left over from a previous run.
    ///
    /// A leftover `.sock` file causes `EADDRINUSE` on the next bind.
    /// No-op for TCP or when no file exists.
    pub fn remove_stale_socket(&self) -> std::io::Result<()> {
        if let Self::Ipc(_) = self {
            let endpoint = self.endpoint();
            let path = endpoint.strip_prefix("ipc://").unwrap_or(&endpoint);
            match std::fs::remove_file(path) {
                Ok(()) => {
                    tracing::debug!(path, "removed stale IPC socket");
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }
}

impl Default for Transport {
    fn default() -> Self {
        Self::tcp("0.0.0.0", DEFAULT_PORT)
    }
}

impl std::fmt::Display for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.endpoint())
    }
}
