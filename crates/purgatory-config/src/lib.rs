//! Layered TOML configuration for Password Purgatory.
//!
//! Reads configuration from multiple sources with precedence:
//! CLI flags > env vars > config file > defaults

use purgatory_types::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Minutes after the first attempt during which new attempts are recorded.
pub const DEFAULT_WINDOW_MINUTES: u32 = 15;

/// The MailChannels transactional send endpoint.
pub const DEFAULT_MAIL_ENDPOINT: &str = "https://api.mailchannels.net/tx/v1/send";

/// Public page where a session's attempts are shown.
pub const DEFAULT_VIEW_URL: &str = "https://passwordpurgatory.com/get-hell";

/// Resolved configuration, passed explicitly into the store and engine.
#[derive(Debug, Clone)]
pub struct PurgatoryConfig {
    /// Key required to reserve new sessions. `None` means reservation is locked.
    pub api_key: Option<String>,
    /// Retention window in minutes; `None` records attempts forever.
    pub window_minutes: Option<u32>,
    /// Whether rendered views carry page title/description metadata.
    pub page_metadata: bool,
    pub data_dir: PathBuf,
    pub config_dir: PathBuf,
    pub notification: NotificationConfig,
}

/// Which notification sink fires when a session receives its first attempt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    #[default]
    None,
    Log,
    MailChannels,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationConfig {
    pub sink: SinkKind,
    pub endpoint: String,
    pub view_url: String,
    pub to_email: Option<String>,
    pub to_name: Option<String>,
    pub from_email: Option<String>,
    pub from_name: Option<String>,
}

/// Settings that can be read from a TOML config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingsFile {
    #[serde(default)]
    pub api: ApiSettings,
    #[serde(default)]
    pub session: SessionSettings,
    #[serde(default)]
    pub notification: NotificationSettings,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiSettings {
    pub key: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionSettings {
    pub window_minutes: Option<u32>,
    pub freeze_after_window: Option<bool>,
    pub page_metadata: Option<bool>,
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotificationSettings {
    #[serde(default)]
    pub sink: SinkKind,
    pub endpoint: Option<String>,
    pub view_url: Option<String>,
    pub to_email: Option<String>,
    pub to_name: Option<String>,
    pub from_email: Option<String>,
    pub from_name: Option<String>,
}

/// CLI overrides that take highest precedence.
///
/// The API key has no override here: it is a secret and is read from the
/// environment or the config file only.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub window_minutes: Option<u32>,
    pub data_dir: Option<PathBuf>,
}

impl PurgatoryConfig {
    /// Load configuration from all sources, applying precedence rules.
    ///
    /// Precedence (highest to lowest):
    /// 1. CLI flags
    /// 2. Environment variables
    /// 3. Config file (~/.purgatory/config.toml)
    /// 4. Defaults
    pub fn load(overrides: CliOverrides) -> Result<Self, ConfigError> {
        let config_dir = config_dir();
        let settings = load_settings_file(&config_dir.join("config.toml"));
        Self::resolve(config_dir, settings, overrides, |name| std::env::var(name).ok())
    }

    /// Merge already-read settings with overrides and an environment lookup.
    pub fn resolve(
        config_dir: PathBuf,
        settings: SettingsFile,
        overrides: CliOverrides,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let api_key = env("PURGATORY_API_KEY").or(settings.api.key);

        let env_window = match env("PURGATORY_WINDOW_MINUTES") {
            Some(raw) => Some(raw.trim().parse::<u32>().map_err(|e| {
                ConfigError::InvalidValue {
                    key: "PURGATORY_WINDOW_MINUTES".into(),
                    message: e.to_string(),
                }
            })?),
            None => None,
        };
        let minutes = overrides
            .window_minutes
            .or(env_window)
            .or(settings.session.window_minutes)
            .unwrap_or(DEFAULT_WINDOW_MINUTES);
        if minutes == 0 {
            return Err(ConfigError::InvalidValue {
                key: "window_minutes".into(),
                message: "must be at least 1".into(),
            });
        }
        let window_minutes = if settings.session.freeze_after_window.unwrap_or(true) {
            Some(minutes)
        } else {
            None
        };

        let data_dir = overrides
            .data_dir
            .or_else(|| env("PURGATORY_DATA_DIR").map(PathBuf::from))
            .or(settings.session.data_dir)
            .unwrap_or_else(|| config_dir.join("sessions"));

        let notification = resolve_notification(settings.notification)?;

        Ok(PurgatoryConfig {
            api_key,
            window_minutes,
            page_metadata: settings.session.page_metadata.unwrap_or(true),
            data_dir,
            config_dir,
            notification,
        })
    }
}

fn resolve_notification(settings: NotificationSettings) -> Result<NotificationConfig, ConfigError> {
    if settings.sink == SinkKind::MailChannels {
        for (key, value) in [
            ("notification.to_email", &settings.to_email),
            ("notification.from_email", &settings.from_email),
        ] {
            if value.is_none() {
                return Err(ConfigError::MissingKey { key: key.into() });
            }
        }
    }

    Ok(NotificationConfig {
        sink: settings.sink,
        endpoint: settings
            .endpoint
            .unwrap_or_else(|| DEFAULT_MAIL_ENDPOINT.to_string()),
        view_url: settings
            .view_url
            .unwrap_or_else(|| DEFAULT_VIEW_URL.to_string()),
        to_email: settings.to_email,
        to_name: settings.to_name,
        from_email: settings.from_email,
        from_name: settings.from_name,
    })
}

/// Get the Purgatory config directory path (~/.purgatory/).
pub fn config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("PURGATORY_CONFIG_DIR") {
        return PathBuf::from(dir);
    }
    dirs_next::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".purgatory")
}

/// Load and parse a TOML settings file, returning defaults on any error.
pub fn load_settings_file(path: &Path) -> SettingsFile {
    match std::fs::read_to_string(path) {
        Ok(content) => toml::from_str(&content).unwrap_or_else(|e| {
            tracing::warn!("Failed to parse {}: {}", path.display(), e);
            SettingsFile::default()
        }),
        Err(_) => SettingsFile::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn resolve_default(settings: SettingsFile) -> PurgatoryConfig {
        PurgatoryConfig::resolve(
            PathBuf::from("/tmp/purgatory"),
            settings,
            CliOverrides::default(),
            no_env,
        )
        .unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = resolve_default(SettingsFile::default());
        assert!(config.api_key.is_none());
        assert_eq!(config.window_minutes, Some(DEFAULT_WINDOW_MINUTES));
        assert!(config.page_metadata);
        assert_eq!(config.data_dir, PathBuf::from("/tmp/purgatory/sessions"));
        assert_eq!(config.notification.sink, SinkKind::None);
        assert_eq!(config.notification.endpoint, DEFAULT_MAIL_ENDPOINT);
    }

    #[test]
    fn test_settings_toml_parse() {
        let toml_str = r#"
[api]
key = "secret"

[session]
window_minutes = 30
page_metadata = false

[notification]
sink = "mailchannels"
to_email = "troy@example.com"
to_name = "Troy"
from_email = "noreply@example.com"
"#;
        let settings: SettingsFile = toml::from_str(toml_str).unwrap();
        let config = resolve_default(settings);
        assert_eq!(config.api_key.as_deref(), Some("secret"));
        assert_eq!(config.window_minutes, Some(30));
        assert!(!config.page_metadata);
        assert_eq!(config.notification.sink, SinkKind::MailChannels);
        assert_eq!(config.notification.to_name.as_deref(), Some("Troy"));
    }

    #[test]
    fn test_freeze_disabled_clears_window() {
        let settings: SettingsFile = toml::from_str(
            r#"
[session]
freeze_after_window = false
"#,
        )
        .unwrap();
        assert_eq!(resolve_default(settings).window_minutes, None);
    }

    #[test]
    fn test_precedence_cli_over_env_over_file() {
        let settings: SettingsFile = toml::from_str(
            r#"
[api]
key = "from-file"

[session]
window_minutes = 5
"#,
        )
        .unwrap();

        let env = |name: &str| match name {
            "PURGATORY_API_KEY" => Some("from-env".to_string()),
            "PURGATORY_WINDOW_MINUTES" => Some("10".to_string()),
            _ => None,
        };
        let config = PurgatoryConfig::resolve(
            PathBuf::from("/tmp/purgatory"),
            settings.clone(),
            CliOverrides::default(),
            env,
        )
        .unwrap();
        assert_eq!(config.api_key.as_deref(), Some("from-env"));
        assert_eq!(config.window_minutes, Some(10));

        let config = PurgatoryConfig::resolve(
            PathBuf::from("/tmp/purgatory"),
            settings,
            CliOverrides {
                window_minutes: Some(20),
                data_dir: Some(PathBuf::from("/srv/hell")),
            },
            env,
        )
        .unwrap();
        assert_eq!(config.api_key.as_deref(), Some("from-env"));
        assert_eq!(config.window_minutes, Some(20));
        assert_eq!(config.data_dir, PathBuf::from("/srv/hell"));
    }

    #[test]
    fn test_zero_window_rejected() {
        let result = PurgatoryConfig::resolve(
            PathBuf::from("/tmp/purgatory"),
            SettingsFile::default(),
            CliOverrides {
                window_minutes: Some(0),
                ..CliOverrides::default()
            },
            no_env,
        );
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_bad_env_window_rejected() {
        let env = |name: &str| (name == "PURGATORY_WINDOW_MINUTES").then(|| "soon".to_string());
        let result = PurgatoryConfig::resolve(
            PathBuf::from("/tmp/purgatory"),
            SettingsFile::default(),
            CliOverrides::default(),
            env,
        );
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_mailchannels_requires_addresses() {
        let settings: SettingsFile = toml::from_str(
            r#"
[notification]
sink = "mailchannels"
to_email = "troy@example.com"
"#,
        )
        .unwrap();
        let result = PurgatoryConfig::resolve(
            PathBuf::from("/tmp/purgatory"),
            settings,
            CliOverrides::default(),
            no_env,
        );
        assert!(matches!(result, Err(ConfigError::MissingKey { .. })));
    }

    #[test]
    fn test_unparseable_file_falls_back_to_defaults() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "[session\nwindow_minutes = ").unwrap();
        let settings = load_settings_file(&path);
        assert!(settings.session.window_minutes.is_none());
    }

    #[test]
    fn test_missing_file_is_default() {
        let tmp = tempfile::TempDir::new().unwrap();
        let settings = load_settings_file(&tmp.path().join("absent.toml"));
        assert!(settings.api.key.is_none());
    }
}
