//! Service layer module

pub mod detect_service;
pub mod lifecycle;
pub mod types;

pub use detect_service::DetectService;
pub use lifecycle::{HostState, Lifecycle};
pub use types::*;
