//! qrgen runtime configuration handling

use crate::error::{Error, Result};
use crate::qr::{DEFAULT_BASE_URL, ErrorCorrection, QrSize};
use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Top-level configuration structure persisted to disk or environment
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QrgenConfig {
    /// Render service connection settings
    pub service: ServiceOptions,
    /// Where and how rendered images are saved
    pub download: DownloadOptions,
    /// Form defaults and presentation
    pub ui: UiOptions,
    /// Logging configuration
    pub logging: LoggingOptions,
}

impl QrgenConfig {
    /// Load configuration from an explicit path or fall back to discovered defaults.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let mut config = if let Some(path) = explicit_path {
            Self::from_file(path)?
        } else if let Some(path) = Self::discover_file()? {
            tracing::info!("Using configuration file: {}", path.display());
            Self::from_file(&path)?
        } else {
            tracing::debug!("No qrgen.toml / qrgen.yaml found, using defaults");
            Self::default()
        };

        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Attempt to locate a configuration file in common locations.
    fn discover_file() -> Result<Option<PathBuf>> {
        let cwd =
            env::current_dir().map_err(|e| Error::Config(format!("Failed to read cwd: {e}")))?;
        for candidate in ["qrgen.toml", "qrgen.yaml", "qrgen.yml"] {
            let path = cwd.join(candidate);
            if path.exists() {
                return Ok(Some(path));
            }
        }

        if let Some(xdg_config) = env::var_os("XDG_CONFIG_HOME") {
            let base = PathBuf::from(xdg_config).join("qrgen");
            for candidate in ["config.toml", "config.yaml"] {
                let path = base.join(candidate);
                if path.exists() {
                    return Ok(Some(path));
                }
            }
        }

        Ok(None)
    }

    /// Read configuration from a concrete file path.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {e}", path.display())))?;

        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("")
            .to_ascii_lowercase()
            .as_str()
        {
            "toml" => toml::from_str(&contents).map_err(|e| {
                Error::Config(format!("Failed to parse TOML {}: {e}", path.display()))
            }),
            "yaml" | "yml" => serde_yaml::from_str(&contents).map_err(|e| {
                Error::Config(format!("Failed to parse YAML {}: {e}", path.display()))
            }),
            other => Err(Error::Config(format!(
                "Unsupported config format '{}', expected toml/yaml",
                other
            ))),
        }
    }

    /// Apply environment variable overrides after file/default loading.
    fn apply_env_overrides(&mut self) -> Result<()> {
        self.service.apply_env_overrides();
        self.download.apply_env_overrides();
        self.ui.apply_env_overrides()?;
        self.logging.apply_env_overrides();
        Ok(())
    }
}

/// Render service connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceOptions {
    /// Base URL the `data`/`size`/`ecc` query is appended to
    pub base_url: String,
    /// Whole-request timeout in seconds
    pub timeout_secs: u64,
    /// `User-Agent` header sent with every request
    pub user_agent: String,
}

impl Default for ServiceOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 15,
            user_agent: concat!("qrgen/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ServiceOptions {
    pub(crate) fn apply_env_overrides(&mut self) {
        if let Ok(url) = env::var("QRGEN_SERVICE_URL") {
            self.base_url = url;
        }
        if let Ok(timeout) = env::var("QRGEN_SERVICE_TIMEOUT") {
            if let Ok(parsed) = timeout.parse::<u64>() {
                self.timeout_secs = parsed.max(1);
            }
        }
        if let Ok(agent) = env::var("QRGEN_USER_AGENT") {
            self.user_agent = agent;
        }
    }
}

/// Download destination settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadOptions {
    /// Directory saved images are written to
    pub output_dir: PathBuf,
    /// Fetch the image URL again when saving instead of reusing rendered bytes
    pub refetch: bool,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            refetch: true,
        }
    }
}

impl DownloadOptions {
    pub(crate) fn apply_env_overrides(&mut self) {
        if let Ok(dir) = env::var("QRGEN_OUTPUT_DIR") {
            if !dir.trim().is_empty() {
                self.output_dir = PathBuf::from(dir);
            }
        }
        if let Ok(refetch) = env::var("QRGEN_DOWNLOAD_REFETCH") {
            if let Some(flag) = parse_flag(&refetch) {
                self.refetch = flag;
            }
        }
    }
}

/// Form defaults and presentation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiOptions {
    /// Theme installed on startup
    pub theme: Theme,
    /// Initial size selection
    pub size: QrSize,
    /// Initial error correction selection
    pub error_correction: ErrorCorrection,
    /// Draw the rendered image in the terminal
    pub preview: bool,
}

impl Default for UiOptions {
    fn default() -> Self {
        Self {
            theme: Theme::Light,
            size: QrSize::Medium,
            error_correction: ErrorCorrection::M,
            preview: true,
        }
    }
}

impl UiOptions {
    pub(crate) fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(theme) = env::var("QRGEN_THEME") {
            self.theme = theme.parse().map_err(Error::Config)?;
        }
        if let Ok(size) = env::var("QRGEN_SIZE") {
            self.size = size.parse().map_err(Error::Config)?;
        }
        if let Ok(ecc) = env::var("QRGEN_ECC") {
            self.error_correction = ecc.parse().map_err(Error::Config)?;
        }
        if let Ok(preview) = env::var("QRGEN_PREVIEW") {
            if let Some(flag) = parse_flag(&preview) {
                self.preview = flag;
            }
        }
        Ok(())
    }
}

/// Structured logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingOptions {
    /// Default log level (overridable via `QRGEN_LOG_LEVEL`)
    pub level: String,
    /// Optional log file path for teeing structured logs
    pub file: Option<PathBuf>,
    /// Force ANSI colors in terminal logging
    pub color: bool,
    /// Enable periodic metrics summaries over tracing
    pub metrics: bool,
    /// Interval in seconds for emitting aggregated metrics when enabled
    pub metrics_interval_secs: u64,
    /// Optional log rotation strategy applied to `file`
    pub rotation: Option<LogRotation>,
}

impl Default for LoggingOptions {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            file: None,
            color: true,
            metrics: false,
            metrics_interval_secs: 60,
            rotation: None,
        }
    }
}

impl LoggingOptions {
    pub(crate) fn apply_env_overrides(&mut self) {
        if let Ok(level) = env::var("QRGEN_LOG_LEVEL") {
            self.level = level;
        }
        if let Ok(file) = env::var("QRGEN_LOG_FILE") {
            self.file = Some(PathBuf::from(file));
        }
        if let Ok(color) = env::var("QRGEN_LOG_COLOR") {
            if let Some(flag) = parse_flag(&color) {
                self.color = flag;
            }
        }
        if let Ok(metrics) = env::var("QRGEN_LOG_METRICS") {
            if let Some(flag) = parse_flag(&metrics) {
                self.metrics = flag;
            }
        }
        if let Ok(interval) = env::var("QRGEN_LOG_METRICS_INTERVAL") {
            if let Ok(value) = interval.parse::<u64>() {
                self.metrics_interval_secs = value.max(5);
            }
        }
        if let Ok(rotation) = env::var("QRGEN_LOG_ROTATION") {
            if let Some(parsed) = LogRotation::from_str(&rotation) {
                self.rotation = Some(parsed);
            }
        }
    }
}

/// Supported log rotation policies for file sinks
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    /// Rotate log files once per hour
    Hourly,
    /// Rotate log files once per day
    Daily,
}

impl LogRotation {
    fn from_str(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "hourly" => Some(Self::Hourly),
            "daily" => Some(Self::Daily),
            _ => None,
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = QrgenConfig::default();
        assert_eq!(config.service.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.service.timeout_secs, 15);
        assert!(config.download.refetch);
        assert_eq!(config.ui.size, QrSize::Medium);
        assert_eq!(config.ui.error_correction, ErrorCorrection::M);
        assert_eq!(config.ui.theme, Theme::Light);
    }

    #[test]
    fn test_parse_partial_toml() {
        let config: QrgenConfig = toml::from_str(
            r#"
            [service]
            base_url = "http://localhost:9000/qr"

            [ui]
            theme = "dark"
            size = "large"
            error_correction = "H"

            [logging]
            rotation = "daily"
            "#,
        )
        .unwrap();

        assert_eq!(config.service.base_url, "http://localhost:9000/qr");
        assert_eq!(config.service.timeout_secs, 15);
        assert_eq!(config.ui.theme, Theme::Dark);
        assert_eq!(config.ui.size, QrSize::Large);
        assert_eq!(config.ui.error_correction, ErrorCorrection::H);
        assert_eq!(config.logging.rotation, Some(LogRotation::Daily));
        assert!(config.ui.preview);
    }

    #[test]
    fn test_parse_yaml() {
        let config: QrgenConfig = serde_yaml::from_str(
            "download:\n  output_dir: /tmp/codes\n  refetch: false\nui:\n  preview: false\n",
        )
        .unwrap();
        assert_eq!(config.download.output_dir, PathBuf::from("/tmp/codes"));
        assert!(!config.download.refetch);
        assert!(!config.ui.preview);
    }

    #[test]
    fn test_from_file_rejects_unknown_extension() {
        let path = env::temp_dir().join(format!("qrgen-{}.ini", uuid::Uuid::new_v4()));
        fs::write(&path, "x=1").unwrap();
        let err = QrgenConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag("ON"), Some(true));
        assert_eq!(parse_flag(" no "), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }
}
