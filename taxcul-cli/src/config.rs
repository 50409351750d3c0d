//! `taxcul.toml` loading and the flag > environment > file > default merge.
//!
//! ```toml
//! api_url = "https://api.taxcul.co.zw/api"
//!
//! [session]
//! backend = "file"                      # or "memory"
//! location = "/home/rudo/.taxcul/session.toml"
//!
//! [logging]
//! level = "info"
//! file = "/tmp/taxcul.log"
//! console = true
//! ```

use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use taxcul_core::api::StoreConfig;
use taxcul_http::ClientConfig;
use thiserror::Error;

pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Overrides the config file location.
pub const CONFIG_ENV: &str = "TAXCUL_CONFIG";
/// Overrides `api_url` from the config file.
pub const API_URL_ENV: &str = "TAXCUL_API_URL";

const DATA_DIR: &str = ".taxcul";
const CONFIG_FILE: &str = "taxcul.toml";
const SESSION_FILE: &str = "session.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config file '{}': {message}", path.display())]
    Parse { path: PathBuf, message: String },
}

/// The contents of `taxcul.toml`. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub api_url: Option<String>,
    pub session: SessionSection,
    pub logging: LoggingSection,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionSection {
    pub backend: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingSection {
    pub level: Option<String>,
    pub file: Option<PathBuf>,
    pub console: Option<bool>,
}

impl FileConfig {
    pub fn from_toml(
        content: &str,
        path: &Path,
    ) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Reads `path`; a missing file is an error only when `required`.
    pub fn load(
        path: &Path,
        required: bool,
    ) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::from_toml(&content, path),
            Err(e) if e.kind() == io::ErrorKind::NotFound && !required => {
                tracing::debug!(path = %path.display(), "no config file; using defaults");
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}

/// Where the config file is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigLocation {
    pub path: PathBuf,
    /// Set when the user named the file, so it must exist.
    pub required: bool,
}

impl ConfigLocation {
    /// `--config`, then `TAXCUL_CONFIG`, then `~/.taxcul/taxcul.toml`.
    pub fn locate(
        flag: Option<PathBuf>,
        env: Option<String>,
        home: Option<&Path>,
    ) -> Option<Self> {
        if let Some(path) = flag {
            return Some(Self {
                path,
                required: true,
            });
        }
        if let Some(path) = non_empty(env) {
            return Some(Self {
                path: PathBuf::from(path),
                required: true,
            });
        }
        home.map(|home| Self {
            path: home.join(DATA_DIR).join(CONFIG_FILE),
            required: false,
        })
    }
}

/// Values given on the command line or in the environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub api_url_flag: Option<String>,
    pub api_url_env: Option<String>,
    pub log_level: Option<String>,
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingSettings {
    pub level: String,
    pub file: Option<PathBuf>,
    pub console: bool,
}

/// Fully resolved runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub client: ClientConfig,
    pub logging: LoggingSettings,
}

impl Settings {
    /// Merges `file` with `overrides`.
    ///
    /// Without a home directory the default session store is in memory, so
    /// a login lasts for one command only.
    pub fn resolve(
        file: FileConfig,
        overrides: &Overrides,
        home: Option<&Path>,
    ) -> Self {
        let api_url = non_empty(overrides.api_url_flag.clone())
            .or_else(|| non_empty(overrides.api_url_env.clone()))
            .or_else(|| non_empty(file.api_url))
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let default_session_file =
            home.map(|home| home.join(DATA_DIR).join(SESSION_FILE).display().to_string());
        let session = match non_empty(file.session.backend) {
            Some(backend) if backend == "file" => StoreConfig {
                location: non_empty(file.session.location)
                    .or(default_session_file)
                    .unwrap_or_default(),
                backend,
            },
            Some(backend) => StoreConfig {
                backend,
                location: file.session.location.unwrap_or_default(),
            },
            None => match default_session_file {
                Some(location) => StoreConfig {
                    backend: "file".to_string(),
                    location,
                },
                None => StoreConfig::default(),
            },
        };

        let logging = LoggingSettings {
            level: non_empty(overrides.log_level.clone())
                .or_else(|| non_empty(file.logging.level))
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            file: overrides.log_file.clone().or(file.logging.file),
            console: file.logging.console.unwrap_or(true),
        };

        Self {
            client: ClientConfig { api_url, session },
            logging,
        }
    }
}

/// Locates, reads and resolves the configuration for this process.
pub fn load_settings(
    config_flag: Option<PathBuf>,
    overrides: &Overrides,
) -> Result<Settings, ConfigError> {
    let home = dirs::home_dir();
    let file = match ConfigLocation::locate(
        config_flag,
        std::env::var(CONFIG_ENV).ok(),
        home.as_deref(),
    ) {
        Some(location) => FileConfig::load(&location.path, location.required)?,
        None => FileConfig::default(),
    };
    Ok(Settings::resolve(file, overrides, home.as_deref()))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use pretty_assertions::assert_eq;

    use super::*;

    fn home() -> PathBuf {
        PathBuf::from("/home/rudo")
    }

    fn temp_file(contents: &str) -> PathBuf {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        let path = std::env::temp_dir().join(format!(
            "taxcul-config-{}-{}.toml",
            std::process::id(),
            COUNTER.fetch_add(1, Ordering::SeqCst)
        ));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn defaults_without_file_or_overrides() {
        let settings = Settings::resolve(FileConfig::default(), &Overrides::default(), Some(&home()));

        assert_eq!(settings.client.api_url, DEFAULT_API_URL);
        assert_eq!(settings.client.session.backend, "file");
        assert_eq!(
            PathBuf::from(&settings.client.session.location),
            home().join(".taxcul").join("session.toml")
        );
        assert_eq!(
            settings.logging,
            LoggingSettings {
                level: "info".to_string(),
                file: None,
                console: true,
            }
        );
    }

    #[test]
    fn no_home_falls_back_to_memory_session() {
        let settings = Settings::resolve(FileConfig::default(), &Overrides::default(), None);

        assert_eq!(settings.client.session, StoreConfig::default());
    }

    #[test]
    fn flag_beats_env_beats_file() {
        let file = FileConfig {
            api_url: Some("http://file.test/api".to_string()),
            ..Default::default()
        };
        let mut overrides = Overrides {
            api_url_flag: Some("http://flag.test/api".to_string()),
            api_url_env: Some("http://env.test/api".to_string()),
            ..Default::default()
        };

        let url = |o: &Overrides| Settings::resolve(file.clone(), o, None).client.api_url;

        assert_eq!(url(&overrides), "http://flag.test/api");
        overrides.api_url_flag = None;
        assert_eq!(url(&overrides), "http://env.test/api");
        overrides.api_url_env = Some("  ".to_string());
        assert_eq!(url(&overrides), "http://file.test/api");
    }

    #[test]
    fn parses_full_file() {
        let path = Path::new("taxcul.toml");
        let file = FileConfig::from_toml(
            r#"
api_url = "https://api.taxcul.co.zw/api"

[session]
backend = "memory"

[logging]
level = "debug"
file = "/tmp/taxcul.log"
console = false
"#,
            path,
        )
        .unwrap();

        let settings = Settings::resolve(
            file,
            &Overrides {
                log_level: Some("warn".to_string()),
                ..Default::default()
            },
            Some(&home()),
        );

        assert_eq!(settings.client.api_url, "https://api.taxcul.co.zw/api");
        assert_eq!(settings.client.session, StoreConfig::default());
        assert_eq!(settings.logging.level, "warn");
        assert_eq!(settings.logging.file, Some(PathBuf::from("/tmp/taxcul.log")));
        assert!(!settings.logging.console);
    }

    #[test]
    fn file_backend_without_location_uses_home() {
        let file = FileConfig {
            session: SessionSection {
                backend: Some("file".to_string()),
                location: None,
            },
            ..Default::default()
        };

        let settings = Settings::resolve(file, &Overrides::default(), Some(&home()));

        assert!(settings.client.session.location.ends_with("session.toml"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = FileConfig::from_toml("api_uri = \"x\"", Path::new("bad.toml")).unwrap_err();

        let ConfigError::Parse { path, message } = err else {
            panic!("expected a parse error, got {err:?}");
        };
        assert_eq!(path, PathBuf::from("bad.toml"));
        assert!(message.contains("api_uri"), "got: {message}");
    }

    #[test]
    fn locate_prefers_flag_then_env() {
        let flag = ConfigLocation::locate(
            Some(PathBuf::from("/etc/taxcul.toml")),
            Some("/env/taxcul.toml".to_string()),
            Some(&home()),
        )
        .unwrap();
        assert_eq!(flag.path, PathBuf::from("/etc/taxcul.toml"));
        assert!(flag.required);

        let env = ConfigLocation::locate(None, Some("/env/taxcul.toml".to_string()), Some(&home()))
            .unwrap();
        assert_eq!(env.path, PathBuf::from("/env/taxcul.toml"));

        let default = ConfigLocation::locate(None, None, Some(&home())).unwrap();
        assert_eq!(default.path, home().join(".taxcul").join("taxcul.toml"));
        assert!(!default.required);

        assert_eq!(ConfigLocation::locate(None, None, None), None);
    }

    #[test]
    fn missing_default_file_is_not_an_error() {
        let path = std::env::temp_dir().join("taxcul-config-does-not-exist.toml");

        assert_eq!(FileConfig::load(&path, false).unwrap(), FileConfig::default());
        assert!(matches!(
            FileConfig::load(&path, true),
            Err(ConfigError::Io { .. })
        ));
    }

    #[test]
    fn loads_file_from_disk() {
        let path = temp_file("api_url = \"http://disk.test/api\"\n");

        let file = FileConfig::load(&path, true).unwrap();

        assert_eq!(file.api_url.as_deref(), Some("http://disk.test/api"));
        std::fs::remove_file(path).unwrap();
    }
}
