use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use apipub_core::ReconcilerSettings;
use apipub_http::Endpoint;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub control_plane: ControlPlaneConfig,
    #[serde(default)]
    pub object_store: ObjectStoreConfig,
    #[serde(default)]
    pub template: TemplateConfig,
    #[serde(default)]
    pub publisher: PublisherConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.server.port == 0 {
            return Err("server.port must be > 0".into());
        }
        Endpoint::parse(&self.control_plane.endpoint)
            .map_err(|e| format!("control_plane.endpoint: {e}"))?;
        if self.control_plane.region.trim().is_empty() {
            return Err("control_plane.region must not be empty".into());
        }
        if self.control_plane.timeout_ms == 0 {
            return Err("control_plane.timeout_ms must be > 0".into());
        }
        Endpoint::parse(&self.object_store.endpoint)
            .map_err(|e| format!("object_store.endpoint: {e}"))?;
        if self.object_store.timeout_ms == 0 {
            return Err("object_store.timeout_ms must be > 0".into());
        }
        if self.template.path.as_os_str().is_empty() {
            return Err("template.path must not be empty".into());
        }
        let lvl = self.logging.level.to_ascii_lowercase();
        let valid_levels = ["trace", "debug", "info", "warn", "error", "off"];
        if !valid_levels.contains(&lvl.as_str()) {
            return Err(format!("logging.level must be one of {valid_levels:?}"));
        }
        Ok(())
    }

    pub fn addr(&self) -> SocketAddr {
        use std::net::{IpAddr, Ipv4Addr};
        let host: IpAddr = self
            .server
            .host
            .parse()
            .unwrap_or(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)));
        SocketAddr::from((host, self.server.port))
    }

    pub fn reconciler_settings(&self) -> ReconcilerSettings {
        let settings = ReconcilerSettings::new(&self.template.path, &self.control_plane.region);
        match &self.publisher.scratch_dir {
            Some(dir) => settings.with_scratch_dir(dir),
            None => settings,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".into()
}
fn default_port() -> u16 {
    8080
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlPlaneConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Region embedded in integration invocation paths.
    #[serde(default = "default_region")]
    pub region: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for ControlPlaneConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            region: default_region(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl ControlPlaneConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectStoreConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for ObjectStoreConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl ObjectStoreConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

fn default_endpoint() -> String {
    "http://localhost:4566".into()
}
fn default_region() -> String {
    "us-east-1".into()
}
fn default_timeout_ms() -> u64 {
    30_000
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateConfig {
    #[serde(default = "default_template_path")]
    pub path: PathBuf,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            path: default_template_path(),
        }
    }
}

fn default_template_path() -> PathBuf {
    PathBuf::from("templates/api_definition.yaml")
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PublisherConfig {
    /// Staging directory for documentation; the system temp dir when unset.
    #[serde(default)]
    pub scratch_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".into()
}

pub mod loader {
    use super::AppConfig;
    use config::{Config, Environment, File};
    use std::path::PathBuf;

    pub const DEFAULT_CONFIG_PATH: &str = "apipub.toml";

    pub fn load_config(path: Option<&str>) -> Result<AppConfig, String> {
        let mut builder = Config::builder();

        // The region the process runs in is the default target region.
        if let Ok(region) = std::env::var("AWS_REGION")
            && !region.is_empty()
        {
            builder = builder
                .set_default("control_plane.region", region)
                .map_err(|e| format!("config build error: {e}"))?;
        }

        let pathbuf = PathBuf::from(path.unwrap_or(DEFAULT_CONFIG_PATH));
        if pathbuf.exists() {
            builder = builder.add_source(File::from(pathbuf));
        }
        // Environment variable overrides, e.g., APIPUB__CONTROL_PLANE__ENDPOINT=http://...
        builder = builder.add_source(
            Environment::with_prefix("APIPUB")
                .try_parsing(true)
                .separator("__"),
        );
        let cfg = builder
            .build()
            .map_err(|e| format!("config build error: {e}"))?;
        let merged: AppConfig = cfg
            .try_deserialize()
            .map_err(|e| format!("config deserialize error: {e}"))?;
        merged.validate()?;
        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let cfg = AppConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.addr().port(), 8080);
        assert_eq!(
            cfg.template.path,
            PathBuf::from("templates/api_definition.yaml")
        );
    }

    #[test]
    fn test_validate_rejects_bad_endpoint() {
        let mut cfg = AppConfig::default();
        cfg.control_plane.endpoint = "not a url".into();
        let err = cfg.validate().unwrap_err();
        assert!(err.starts_with("control_plane.endpoint"));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut cfg = AppConfig::default();
        cfg.object_store.timeout_ms = 0;
        assert_eq!(
            cfg.validate().unwrap_err(),
            "object_store.timeout_ms must be > 0"
        );
    }

    #[test]
    fn test_validate_rejects_unknown_level() {
        let mut cfg = AppConfig::default();
        cfg.logging.level = "loud".into();
        assert!(cfg.validate().unwrap_err().starts_with("logging.level"));
    }

    #[test]
    fn test_reconciler_settings_use_scratch_dir() {
        let mut cfg = AppConfig::default();
        cfg.control_plane.region = "eu-west-1".into();
        cfg.publisher.scratch_dir = Some(PathBuf::from("/var/tmp/apipub"));

        let settings = cfg.reconciler_settings();
        assert_eq!(settings.region, "eu-west-1");
        assert_eq!(settings.scratch_dir, PathBuf::from("/var/tmp/apipub"));
        assert_eq!(
            settings.template.path(),
            std::path::Path::new("templates/api_definition.yaml")
        );
    }
}
