//! RPC endpoint addresses

use std::fmt;
use std::net::{SocketAddr, ToSocketAddrs};
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::DetectError;

/// Where the gRPC server listens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RpcEndpoint {
    Tcp(SocketAddr),
    Unix(PathBuf),
}

impl FromStr for RpcEndpoint {
    type Err = DetectError;

    /// Accepts `host:port`, `tcp://host:port`, `unix:/path`, `unix:///path`
    /// and `ipc:///path`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || DetectError::config(format!("invalid rpcEndpoint {:?}", s));

        let unix_path = ["ipc://", "unix://", "unix:"]
            .iter()
            .find_map(|prefix| s.strip_prefix(prefix));
        if let Some(path) = unix_path {
            if path.is_empty() {
                return Err(invalid());
            }
            return Ok(RpcEndpoint::Unix(PathBuf::from(path)));
        }

        let host_port = s.strip_prefix("tcp://").unwrap_or(s);
        if host_port.is_empty() {
            return Err(invalid());
        }
        let addr = host_port
            .to_socket_addrs()
            .map_err(|_| invalid())?
            .next()
            .ok_or_else(invalid)?;
        Ok(RpcEndpoint::Tcp(addr))
    }
}

impl fmt::Display for RpcEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RpcEndpoint::Tcp(addr) => write!(f, "tcp://{}", addr),
            RpcEndpoint::Unix(path) => write!(f, "unix:{}", path.display()),
        }
    }
}
