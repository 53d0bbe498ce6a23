use anyhow::anyhow;
use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub frontend: FrontendConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "0.0.0.0".into(), port: 3000, worker_threads: Some(4) }
    }
}

/// What to do when the data file exists but cannot be parsed.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OnCorrupt {
    /// Log a warning and carry on with an empty document.
    #[default]
    Reset,
    /// Refuse to serve the request.
    Fail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_file")]
    pub data_file: String,
    #[serde(default)]
    pub on_corrupt: OnCorrupt,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { data_file: default_data_file(), on_corrupt: OnCorrupt::Reset }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    #[serde(default = "default_ttl_hours")]
    pub ttl_hours: u64,
    #[serde(default)]
    pub secure_cookie: bool,
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: default_cookie_name(),
            ttl_hours: default_ttl_hours(),
            secure_cookie: false,
            sweep_interval_secs: default_sweep_interval(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FrontendConfig {
    #[serde(default = "default_frontend_dir")]
    pub dir: String,
}

impl Default for FrontendConfig {
    fn default() -> Self {
        Self { dir: default_frontend_dir() }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self { format: default_log_format() }
    }
}

fn default_data_file() -> String { "data/db.json".into() }
fn default_cookie_name() -> String { "sid".into() }
fn default_ttl_hours() -> u64 { 24 }
fn default_sweep_interval() -> u64 { 600 }
fn default_frontend_dir() -> String { "public".into() }
fn default_log_format() -> String { "compact".into() }

pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    parse(&content)
}

pub fn parse(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    /// Load `config.toml` (or `CONFIG_PATH`), falling back to defaults when the
    /// file is absent, then apply env overrides and validate.
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = match load_default() {
            Ok(cfg) => cfg,
            Err(e) if is_missing_file(&e) => AppConfig::default(),
            Err(e) => return Err(e),
        };
        cfg.apply_env();
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    /// `PORT`/`SERVER_HOST`/`DATA_FILE` win over the file.
    pub fn apply_env(&mut self) {
        if let Some(port) = std::env::var("PORT").ok().and_then(|p| p.parse::<u16>().ok()) {
            self.server.port = port;
        }
        if let Ok(host) = std::env::var("SERVER_HOST") {
            self.server.host = host;
        }
        if let Ok(file) = std::env::var("DATA_FILE") {
            self.storage.data_file = file;
        }
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.storage.validate()?;
        self.session.validate()?;
        if self.frontend.dir.trim().is_empty() {
            self.frontend.dir = default_frontend_dir();
        }
        Ok(())
    }
}

fn is_missing_file(e: &anyhow::Error) -> bool {
    e.downcast_ref::<std::io::Error>()
        .map(|io| io.kind() == std::io::ErrorKind::NotFound)
        .unwrap_or(false)
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = "0.0.0.0".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be in 1..=65535"));
        }
        if let Some(w) = self.worker_threads {
            if w == 0 { self.worker_threads = Some(4); }
        } else {
            self.worker_threads = Some(4);
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl StorageConfig {
    fn validate(&self) -> Result<()> {
        if self.data_file.trim().is_empty() {
            return Err(anyhow!("storage.data_file is empty"));
        }
        Ok(())
    }
}

impl SessionConfig {
    fn validate(&mut self) -> Result<()> {
        if self.ttl_hours == 0 {
            return Err(anyhow!("session.ttl_hours must be >= 1"));
        }
        if self.cookie_name.trim().is_empty() {
            self.cookie_name = default_cookie_name();
        }
        if self.sweep_interval_secs == 0 {
            self.sweep_interval_secs = default_sweep_interval();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() -> Result<()> {
        let mut cfg = parse("")?;
        cfg.normalize_and_validate()?;
        assert_eq!(cfg.server.port, 3000);
        assert_eq!(cfg.storage.data_file, "data/db.json");
        assert_eq!(cfg.storage.on_corrupt, OnCorrupt::Reset);
        assert_eq!(cfg.session.cookie_name, "sid");
        assert_eq!(cfg.session.ttl_hours, 24);
        assert_eq!(cfg.frontend.dir, "public");
        Ok(())
    }

    #[test]
    fn sections_are_read() -> Result<()> {
        let cfg = parse(
            r#"
            [server]
            host = "127.0.0.1"
            port = 8081

            [storage]
            data_file = "/tmp/x.json"
            on_corrupt = "fail"

            [session]
            ttl_hours = 2
            "#,
        )?;
        assert_eq!(cfg.server.bind_addr(), "127.0.0.1:8081");
        assert_eq!(cfg.storage.on_corrupt, OnCorrupt::Fail);
        assert_eq!(cfg.session.ttl_hours, 2);
        assert_eq!(cfg.session.cookie_name, "sid");
        Ok(())
    }

    #[test]
    fn zero_port_rejected() -> Result<()> {
        let mut cfg = parse("[server]\nhost = \"\"\nport = 0\n")?;
        assert!(cfg.normalize_and_validate().is_err());
        Ok(())
    }

    #[test]
    fn zero_ttl_rejected() -> Result<()> {
        let mut cfg = parse("[session]\nttl_hours = 0\n")?;
        assert!(cfg.normalize_and_validate().is_err());
        Ok(())
    }

    #[test]
    fn missing_file_is_detected() {
        let err = load_from_file("/nonexistent/config.toml").unwrap_err();
        assert!(is_missing_file(&err));
    }
}
