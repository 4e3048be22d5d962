//! API module - gRPC handler, endpoint parsing and server binding

pub mod endpoint;
pub mod grpc;
pub mod server;

pub use endpoint::RpcEndpoint;
pub use grpc::GrpcHandler;
pub use server::{serve, KeepAlive};
