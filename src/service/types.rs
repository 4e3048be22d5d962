//! Service layer types

use std::collections::HashMap;

use super::lifecycle::HostState;

/// Health check result
#[derive(Debug, Clone)]
pub struct HealthResult {
    pub healthy: bool,
    pub version: String,
    pub state: &'static str,
    pub models_loaded: HashMap<String, bool>,
}

impl HealthResult {
    pub fn new(state: HostState, models_loaded: HashMap<String, bool>) -> Self {
        Self {
            healthy: state == HostState::Serving,
            version: env!("CARGO_PKG_VERSION").to_string(),
            state: state.as_str(),
            models_loaded,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_healthy_only_while_serving() {
        let models = HashMap::from([("objects".to_string(), true)]);
        let health = HealthResult::new(HostState::Serving, models.clone());
        assert!(health.healthy);
        assert_eq!(health.state, "serving");
        assert_eq!(health.version, env!("CARGO_PKG_VERSION"));

        let health = HealthResult::new(HostState::Stopping, models);
        assert!(!health.healthy);
        assert_eq!(health.state, "stopping");
    }
}
