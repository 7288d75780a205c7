/// Server configuration
use crate::error::{Result, ServerError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_server")]
    pub server: ServerSettings,

    #[serde(default = "default_storage")]
    pub storage: StorageSettings,

    #[serde(default = "default_auth")]
    pub auth: AuthSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageSettings {
    #[serde(default = "default_object_store_path")]
    pub object_store_path: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthSettings {
    /// Bearer token required for upload/delete. No default: must be set.
    #[serde(default)]
    pub admin_token: String,
}

impl ServerConfig {
    /// Load configuration from file and environment
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut settings = config::Config::builder();

        // Load from config file if it exists
        let config_path = PathBuf::from(config_path.unwrap_or("config.toml"));
        if config_path.exists() {
            settings = settings.add_source(config::File::from(config_path));
        }

        // Override with environment variables (prefixed with ATELIER_).
        // Nesting uses a double underscore so multi-word keys survive:
        // ATELIER_AUTH__ADMIN_TOKEN -> auth.admin_token
        settings = settings.add_source(
            config::Environment::with_prefix("ATELIER")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = settings
            .build()
            .map_err(|e| ServerError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| ServerError::Config(e.to_string()))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.auth.admin_token.is_empty() {
            return Err(ServerError::Config(
                "Admin token is required (set ATELIER_AUTH__ADMIN_TOKEN)".to_string(),
            ));
        }

        Ok(())
    }
}

// Default values
fn default_server() -> ServerSettings {
    ServerSettings {
        host: default_host(),
        port: default_port(),
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_storage() -> StorageSettings {
    StorageSettings {
        object_store_path: default_object_store_path(),
    }
}

fn default_object_store_path() -> PathBuf {
    PathBuf::from("./data/objects")
}

fn default_auth() -> AuthSettings {
    AuthSettings {
        admin_token: String::new(),
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            server: default_server(),
            storage: default_storage(),
            auth: default_auth(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_complete_but_invalid_without_token() {
        let config = ServerConfig::default();
        assert_eq!(config.server.port, 8080);
        assert!(config.validate().is_err());
    }

    #[test]
    fn environment_overrides_reach_nested_keys() {
        std::env::set_var("ATELIER_AUTH__ADMIN_TOKEN", "from-env");
        std::env::set_var("ATELIER_STORAGE__OBJECT_STORE_PATH", "/tmp/atelier-objects");
        let config = ServerConfig::load(Some("no-such-config.toml")).unwrap();
        std::env::remove_var("ATELIER_AUTH__ADMIN_TOKEN");
        std::env::remove_var("ATELIER_STORAGE__OBJECT_STORE_PATH");

        assert_eq!(config.auth.admin_token, "from-env");
        assert_eq!(
            config.storage.object_store_path,
            PathBuf::from("/tmp/atelier-objects")
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validates_with_token() {
        let mut config = ServerConfig::default();
        config.auth.admin_token = "secret".to_string();
        assert!(config.validate().is_ok());
    }
}
