//! Alarm Frame Detection Service Library

pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod pipeline;
pub mod service;
pub mod types;

pub use config::Config;
pub use error::{DetectError, DetectResult};
