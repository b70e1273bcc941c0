// Configuration module entry point
// Loads application configuration and holds the shared runtime state

mod state;
mod types;

use std::net::SocketAddr;

// Re-export public types
pub use state::AppState;
pub use types::{
    Config, HttpConfig, LogLevel, LoggingConfig, PerformanceConfig, ServerConfig, SiteConfig,
    StorageConfig,
};

/// Config file looked up when no path is given on the command line
pub const DEFAULT_CONFIG_PATH: &str = "config";

/// Environment variable prefix, e.g. `GUESTBOOK_SERVER__PORT`
const ENV_PREFIX: &str = "GUESTBOOK";

impl Config {
    /// Load configuration from specified file path (extension optional)
    ///
    /// The file is not required. Environment variables prefixed with
    /// `GUESTBOOK_` override it, using `__` between sections and keys
    /// (`GUESTBOOK_SERVER__PORT=8080`).
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        Self::load_with_env(config_path, None)
    }

    /// Same as `load_from`, reading overrides from `env` instead of the
    /// process environment when given
    pub fn load_with_env(
        config_path: &str,
        env: Option<config::Map<String, String>>,
    ) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .source(env),
            )
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("storage.path", "storage/data.json")?
            .set_default("site.root", ".")?
            .set_default("site.index_page", "index.html")?
            .set_default("site.message_page", "message.html")?
            .set_default("site.error_page", "error.html")?
            .set_default("site.permissive_static", false)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("http.server_name", "guestbook/0.1")?
            .set_default("http.max_body_size", 1_048_576)? // 1MB
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::Path;

    #[test]
    fn test_defaults_without_file() {
        let cfg = Config::load_from("no-such-config-file").unwrap();
        assert_eq!(cfg.server.port, 3000);
        assert_eq!(cfg.storage.path, Path::new("storage/data.json"));
        assert_eq!(cfg.site.root, Path::new("."));
        assert_eq!(cfg.site.index_page, "index.html");
        assert!(cfg.site.read_template.is_none());
        assert!(!cfg.site.permissive_static);
        assert!(cfg.performance.max_connections.is_none());
        assert_eq!(cfg.logging.level, LogLevel::Info);
        assert_eq!(
            cfg.get_socket_addr().unwrap(),
            "0.0.0.0:3000".parse().unwrap()
        );
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("guestbook.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "[server]\nport = 8081\n\n[storage]\npath = \"db/messages.json\"\n\n[site]\nread_template = \"output.html\""
        )
        .unwrap();

        let cfg = Config::load_from(path.to_str().unwrap()).unwrap();
        assert_eq!(cfg.server.port, 8081);
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.storage.path, Path::new("db/messages.json"));
        assert_eq!(cfg.site.read_template.as_deref(), Some("output.html"));
    }

    #[test]
    fn test_env_overrides_file_and_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("guestbook.toml");
        std::fs::write(&path, "[server]\nport = 8081\n\n[storage]\npath = \"db/messages.json\"\n")
            .unwrap();

        let env: config::Map<String, String> = [
            ("GUESTBOOK_SERVER__PORT", "8089"),
            ("GUESTBOOK_STORAGE__PATH", "x/y.json"),
            ("GUESTBOOK_SITE__PERMISSIVE_STATIC", "true"),
            ("GUESTBOOK_LOGGING__LEVEL", "warn"),
            ("OTHER_SERVER__PORT", "1"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let cfg = Config::load_with_env(path.to_str().unwrap(), Some(env)).unwrap();
        assert_eq!(cfg.server.port, 8089);
        assert_eq!(cfg.storage.path, Path::new("x/y.json"));
        assert!(cfg.site.permissive_static);
        assert_eq!(cfg.logging.level, LogLevel::Warn);
        // untouched keys keep their defaults
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.http.max_body_size, 1_048_576);
    }

    #[test]
    fn test_unknown_log_level_is_rejected() {
        let env: config::Map<String, String> =
            std::iter::once(("GUESTBOOK_LOGGING__LEVEL".to_string(), "loud".to_string()))
                .collect();
        assert!(Config::load_with_env("no-such-config-file", Some(env)).is_err());
    }

    #[test]
    fn test_invalid_host_is_reported() {
        let mut cfg = Config::load_from("no-such-config-file").unwrap();
        cfg.server.host = "not a host".to_string();
        assert!(cfg.get_socket_addr().is_err());
    }
}
