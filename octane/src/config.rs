use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Connection parameters for one Octane shared space + workspace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OctaneConfig {
    pub server_url: String,
    pub shared_space: String,
    pub workspace: String,
    pub client_id: String,
    pub client_secret: String,
    pub timeout: Duration,
}

impl OctaneConfig {
    pub fn new(
        server_url: impl Into<String>,
        shared_space: impl Into<String>,
        workspace: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            server_url: server_url.into(),
            shared_space: shared_space.into(),
            workspace: workspace.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Workspace-scoped API prefix, relative to the server URL.
    pub fn api_path(&self) -> String {
        format!(
            "/api/shared_spaces/{}/workspaces/{}",
            self.shared_space, self.workspace
        )
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.server_url.is_empty() {
            return Err("Server URL cannot be empty".to_string());
        }

        if !self.server_url.starts_with("http://") && !self.server_url.starts_with("https://") {
            return Err("Server URL must start with http:// or https://".to_string());
        }

        if self.shared_space.is_empty() || self.workspace.is_empty() {
            return Err("Shared space and workspace ids cannot be empty".to_string());
        }

        if self.client_id.is_empty() || self.client_secret.is_empty() {
            return Err("Client id and client secret cannot be empty".to_string());
        }

        if self.timeout.is_zero() {
            return Err("Timeout must be greater than 0".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> OctaneConfig {
        OctaneConfig::new("https://octane.example.com", "1001", "1002", "id", "secret")
    }

    #[test]
    fn test_valid_config() {
        let config = config();
        assert!(config.validate().is_ok());
        assert_eq!(
            config.api_path(),
            "/api/shared_spaces/1001/workspaces/1002"
        );
    }

    #[test]
    fn test_config_validation() {
        let mut config = config();
        config.server_url = "".to_string();
        assert!(config.validate().is_err());

        config.server_url = "octane.example.com".to_string();
        assert!(config.validate().is_err());

        let mut config = self::config();
        config.shared_space = "".to_string();
        assert!(config.validate().is_err());

        let mut config = self::config();
        config.client_secret = "".to_string();
        assert!(config.validate().is_err());

        let mut config = self::config();
        config.timeout = Duration::from_secs(0);
        assert!(config.validate().is_err());
    }
}
