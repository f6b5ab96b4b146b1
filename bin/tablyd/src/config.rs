//! Server configuration — loaded from a TOML context file.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use menu::suggest::SuggestConfig;

/// Full server configuration.
///
/// ```toml
/// [server]
/// listen = "0.0.0.0:8080"
/// base_url = "http://192.168.1.10:8080"
///
/// [storage]
/// data_dir = "/var/lib/tably"
///
/// [suggest]
/// endpoint = "https://text.example.com/v1/generate"
/// api_key = "..."
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub storage: StorageSection,

    /// Absent ⇒ the description-suggestion endpoint always answers empty.
    #[serde(default)]
    pub suggest: Option<SuggestConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSection {
    /// Listen address for the HTTP server.
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Public base URL used to build per-table share links.
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            base_url: default_base_url(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageSection {
    /// Directory holding the embedded database.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for StorageSection {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

fn default_listen() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

impl ServerConfig {
    /// Resolve a context name or path to a config file path.
    ///
    /// A bare name resolves to `/etc/tably/<name>.toml`; anything containing
    /// a `/` or `.` is used as a path directly.
    pub fn resolve_path(name_or_path: &str) -> PathBuf {
        if name_or_path.contains('/') || name_or_path.contains('.') {
            PathBuf::from(name_or_path)
        } else {
            PathBuf::from(format!("/etc/tably/{name_or_path}.toml"))
        }
    }

    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("cannot read {}: {e}", path.display()))?;
        let config: ServerConfig = toml::from_str(&text)
            .map_err(|e| anyhow::anyhow!("cannot parse {}: {e}", path.display()))?;
        Ok(config)
    }
}
