use super::types::ServerConfig;
use std::fs;
use std::path::Path;

const VALID_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];
const VALID_FORMATS: [&str; 2] = ["compact", "json"];

impl ServerConfig {
    /// Load configuration from a TOML file.
    ///
    /// Environment overrides are applied and the result validated.
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| anyhow::anyhow!("Failed to read config file: {}", e))?;

        let mut config: ServerConfig = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config file: {}", e))?;

        config.finalize()?;

        Ok(config)
    }

    /// Load `path` if it exists, otherwise start from defaults.
    ///
    /// Returns the config and whether the file was found.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> anyhow::Result<(Self, bool)> {
        if path.as_ref().exists() {
            return Ok((Self::from_file(path)?, true));
        }
        let mut config = ServerConfig::default();
        config.finalize()?;
        Ok((config, false))
    }

    /// Apply environment overrides, then validate.
    pub fn finalize(&mut self) -> anyhow::Result<()> {
        self.apply_env_overrides()?;
        self.validate()
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - HRMS_SERVER_HOST: Override server.host
    /// - HRMS_SERVER_PORT: Override server.port (legacy: PORT)
    /// - HRMS_DATABASE_PATH: Override database.path (legacy: DATABASE_URL, `sqlite://` prefix allowed)
    /// - HRMS_DB_MAX_CONNECTIONS: Override database.max_connections
    /// - HRMS_LOG_LEVEL: Override logging.level
    /// - HRMS_LOG_TO_CONSOLE: Override logging.log_to_console
    pub fn apply_env_overrides(&mut self) -> anyhow::Result<()> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    /// Same as [`apply_env_overrides`](Self::apply_env_overrides) with an
    /// explicit variable lookup.
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> anyhow::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("HRMS_SERVER_HOST") {
            self.server.host = host;
        }

        if let Some(port_str) = lookup("HRMS_SERVER_PORT") {
            self.server.port = port_str
                .parse()
                .map_err(|_| anyhow::anyhow!("Invalid HRMS_SERVER_PORT value: {}", port_str))?;
        } else if let Some(port_str) = lookup("PORT") {
            // Legacy fallback
            self.server.port = port_str
                .parse()
                .map_err(|_| anyhow::anyhow!("Invalid PORT value: {}", port_str))?;
        }

        if let Some(path) = lookup("HRMS_DATABASE_PATH") {
            self.database.path = path;
        } else if let Some(url) = lookup("DATABASE_URL") {
            // Legacy fallback
            self.database.path = strip_sqlite_scheme(&url).to_string();
        }

        if let Some(max) = lookup("HRMS_DB_MAX_CONNECTIONS") {
            self.database.max_connections = max
                .parse()
                .map_err(|_| anyhow::anyhow!("Invalid HRMS_DB_MAX_CONNECTIONS value: {}", max))?;
        }

        if let Some(level) = lookup("HRMS_LOG_LEVEL") {
            self.logging.level = level.to_lowercase();
        }

        if let Some(val) = lookup("HRMS_LOG_TO_CONSOLE") {
            let val = val.to_lowercase();
            self.logging.log_to_console = val == "true" || val == "1" || val == "yes";
        }

        Ok(())
    }

    /// Validate configuration settings
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.server.port == 0 {
            return Err(anyhow::anyhow!("Server port cannot be 0"));
        }

        if self.database.path.trim().is_empty() {
            return Err(anyhow::anyhow!("database.path cannot be empty"));
        }

        if self.database.max_connections == 0 {
            return Err(anyhow::anyhow!("database.max_connections cannot be 0"));
        }

        if !VALID_LEVELS.contains(&self.logging.level.as_str()) {
            return Err(anyhow::anyhow!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                VALID_LEVELS.join(", ")
            ));
        }

        if !VALID_FORMATS.contains(&self.logging.format.as_str()) {
            return Err(anyhow::anyhow!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                VALID_FORMATS.join(", ")
            ));
        }

        for (target, level) in &self.logging.targets {
            if !VALID_LEVELS.contains(&level.as_str()) {
                return Err(anyhow::anyhow!(
                    "Invalid log level '{}' for target '{}'. Must be one of: {}",
                    level,
                    target,
                    VALID_LEVELS.join(", ")
                ));
            }
        }

        Ok(())
    }
}

fn strip_sqlite_scheme(url: &str) -> &str {
    url.strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))
        .unwrap_or(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = ServerConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_port() {
        let mut config = ServerConfig::default();
        config.server.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_log_level() {
        let mut config = ServerConfig::default();
        config.logging.level = "invalid".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_pool_size_rejected() {
        let mut config = ServerConfig::default();
        config.database.max_connections = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_override_server_port_prefers_new_name() {
        let mut config = ServerConfig::default();
        config
            .apply_overrides_from(lookup_from(&[("HRMS_SERVER_PORT", "9090"), ("PORT", "7070")]))
            .unwrap();
        assert_eq!(config.server.port, 9090);
    }

    #[test]
    fn test_override_legacy_port() {
        let mut config = ServerConfig::default();
        config
            .apply_overrides_from(lookup_from(&[("PORT", "7070")]))
            .unwrap();
        assert_eq!(config.server.port, 7070);
    }

    #[test]
    fn test_override_bad_port_is_error() {
        let mut config = ServerConfig::default();
        let result = config.apply_overrides_from(lookup_from(&[("PORT", "eighty")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_override_database_url_strips_scheme() {
        let mut config = ServerConfig::default();
        config
            .apply_overrides_from(lookup_from(&[("DATABASE_URL", "sqlite:///var/lib/hrms.db")]))
            .unwrap();
        assert_eq!(config.database.path, "/var/lib/hrms.db");
    }

    #[test]
    fn test_override_log_to_console() {
        let mut config = ServerConfig::default();
        config
            .apply_overrides_from(lookup_from(&[("HRMS_LOG_TO_CONSOLE", "false")]))
            .unwrap();
        assert!(!config.logging.log_to_console);

        config
            .apply_overrides_from(lookup_from(&[("HRMS_LOG_TO_CONSOLE", "YES")]))
            .unwrap();
        assert!(config.logging.log_to_console);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[server]
port = 9000

[database]
path = "/tmp/hrms-test.sqlite3"
max_connections = 3

[logging]
level = "debug"

[logging.targets]
hrms_store = "trace"
"#
        )
        .unwrap();

        let config: ServerConfig =
            toml::from_str(&std::fs::read_to_string(file.path()).unwrap()).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.database.max_connections, 3);
        assert!(config.database.read_only);
        assert_eq!(config.logging.targets.get("hrms_store").unwrap(), "trace");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_example_config_parses() {
        let config: ServerConfig =
            toml::from_str(include_str!("../../../../config.example.toml")).unwrap();
        assert_eq!(config.database.max_connections, 8);
        assert!(config.security.cors.allowed_origins.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let (config, from_file) =
            ServerConfig::load_or_default(dir.path().join("absent.toml")).unwrap();
        assert!(!from_file);
        assert_eq!(config.server.host, "127.0.0.1");
    }

    #[test]
    fn test_invalid_target_level_rejected() {
        let mut config = ServerConfig::default();
        config
            .logging
            .targets
            .insert("hrms_store".to_string(), "loud".to_string());
        assert!(config.validate().is_err());
    }
}
