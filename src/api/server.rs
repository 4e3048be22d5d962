//! gRPC server binding and graceful shutdown

use std::time::Duration;

use anyhow::{Context, Result};
use tonic::transport::server::TcpIncoming;
use tonic::transport::Server as TonicServer;
use tracing::info;

use super::endpoint::RpcEndpoint;
use super::grpc::GrpcHandler;
use crate::service::Lifecycle;

/// Transport keep-alive settings derived from the heartbeat interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeepAlive {
    pub interval: Duration,
    pub timeout: Duration,
}

impl KeepAlive {
    pub fn from_heartbeat(heartbeat: Duration) -> Self {
        Self {
            interval: heartbeat,
            timeout: heartbeat * 3,
        }
    }
}

/// Serve `handler` on `endpoint` until the host starts stopping.
///
/// Marks the host `Serving` once bound. In-flight calls are cut off at their
/// next image boundary by the service layer.
pub async fn serve(
    endpoint: &RpcEndpoint,
    handler: GrpcHandler,
    keep_alive: KeepAlive,
    lifecycle: Lifecycle,
) -> Result<()> {
    let mut builder = TonicServer::builder()
        .http2_keepalive_interval(Some(keep_alive.interval))
        .http2_keepalive_timeout(Some(keep_alive.timeout));
    let router = builder.add_service(handler.into_server());

    let shutdown = {
        let lifecycle = lifecycle.clone();
        async move { lifecycle.stopping().await }
    };

    match endpoint {
        RpcEndpoint::Tcp(addr) => {
            let listener = tokio::net::TcpListener::bind(addr)
                .await
                .with_context(|| format!("Failed to bind {}", endpoint))?;
            let incoming = TcpIncoming::from_listener(listener, true, Some(keep_alive.interval))
                .map_err(|e| anyhow::anyhow!("Failed to configure {}: {}", endpoint, e))?;
            lifecycle.serving();
            info!("gRPC API listening on {}", endpoint);

            router
                .serve_with_incoming_shutdown(incoming, shutdown)
                .await
                .context("gRPC server failed")?;
        }
        RpcEndpoint::Unix(path) => {
            remove_stale_socket(path)?;
            let listener = tokio::net::UnixListener::bind(path)
                .with_context(|| format!("Failed to bind {}", endpoint))?;
            lifecycle.serving();
            info!("gRPC API listening on {}", endpoint);

            let served = router
                .serve_with_incoming_shutdown(
                    tokio_stream::wrappers::UnixListenerStream::new(listener),
                    shutdown,
                )
                .await
                .context("gRPC server failed");
            let _ = std::fs::remove_file(path);
            served?;
        }
    }

    info!("gRPC server stopped accepting calls");
    Ok(())
}

fn remove_stale_socket(path: &std::path::Path) -> Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => {
            info!("Removed stale socket {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).with_context(|| format!("Failed to remove stale socket {}", path.display())),
    }
}
