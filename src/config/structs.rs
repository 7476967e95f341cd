use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{PocketlinkError, Result};

/// Default configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "pocketlink.toml";

/// 应用配置
///
/// 优先级：ENV > TOML 文件 > 默认值
/// ENV 前缀：PL，分隔符：__
/// 示例：PL__SHORTENER__CODE_LENGTH=8
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub shortener: ShortenerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Loads from `path` (optional file) and the environment, then validates.
    pub fn load(path: Option<&str>) -> Result<Self> {
        use config::{Config, Environment, File};

        let path = path.unwrap_or(DEFAULT_CONFIG_PATH);

        let settings = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix("PL")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: AppConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let s = &self.shortener;

        if s.code_length == 0 {
            return Err(PocketlinkError::config("shortener.code_length must be at least 1"));
        }
        if s.max_code_length < s.code_length {
            return Err(PocketlinkError::config(format!(
                "shortener.max_code_length ({}) must not be less than code_length ({})",
                s.max_code_length, s.code_length
            )));
        }
        if s.max_attempts_per_length == 0 {
            return Err(PocketlinkError::config(
                "shortener.max_attempts_per_length must be at least 1",
            ));
        }
        if !(s.default_validity_minutes.is_finite() && s.default_validity_minutes > 0.0) {
            return Err(PocketlinkError::config(
                "shortener.default_validity_minutes must be a positive number",
            ));
        }
        if s.max_batch_size == 0 {
            return Err(PocketlinkError::config("shortener.max_batch_size must be at least 1"));
        }
        if url::Url::parse(&s.base_url).is_err() {
            return Err(PocketlinkError::config(format!(
                "shortener.base_url is not a valid URL: '{}'",
                s.base_url
            )));
        }
        if self.storage.backend == StorageBackend::File && self.storage.path.trim().is_empty() {
            return Err(PocketlinkError::config(
                "storage.path is required for the file backend",
            ));
        }
        if !matches!(self.logging.format.as_str(), "text" | "json") {
            return Err(PocketlinkError::config(format!(
                "logging.format must be 'text' or 'json', got '{}'",
                self.logging.format
            )));
        }

        Ok(())
    }

    /// 生成示例 TOML 配置文件
    pub fn generate_sample_config() -> String {
        toml::to_string_pretty(&Self::default())
            .unwrap_or_else(|e| format!("# Error generating sample config: {}", e))
    }

    /// 保存配置到 TOML 文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)?;

        if let Some(parent) = path.as_ref().parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    File,
    Memory,
}

/// Record Store 配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    #[serde(default = "default_storage_path")]
    pub path: String,
}

/// 短链接生成配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShortenerConfig {
    /// Base URL that short codes resolve under, e.g. `http://localhost:3000`.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_validity_minutes")]
    pub default_validity_minutes: f64,
    #[serde(default = "default_code_length")]
    pub code_length: usize,
    #[serde(default = "default_max_attempts_per_length")]
    pub max_attempts_per_length: u32,
    #[serde(default = "default_max_code_length")]
    pub max_code_length: usize,
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: usize,
}

impl ShortenerConfig {
    /// Joins `base_url` and `shortcode` with exactly one slash.
    pub fn short_url(&self, shortcode: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), shortcode)
    }
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default = "default_enable_rotation")]
    pub enable_rotation: bool,
    #[serde(default = "default_max_backups")]
    pub max_backups: u32,
    /// Number of recent entries mirrored into the record store.
    #[serde(default = "default_mirror_capacity")]
    pub mirror_capacity: usize,
}

// ============================================================
// Default value functions
// ============================================================

fn default_storage_path() -> String {
    "pocketlink.json".to_string()
}

fn default_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_validity_minutes() -> f64 {
    30.0
}

fn default_code_length() -> usize {
    6
}

fn default_max_attempts_per_length() -> u32 {
    16
}

fn default_max_code_length() -> usize {
    12
}

fn default_max_batch_size() -> usize {
    5
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_enable_rotation() -> bool {
    false
}

fn default_max_backups() -> u32 {
    5
}

fn default_mirror_capacity() -> usize {
    100
}

// ============================================================
// Default implementations
// ============================================================

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            path: default_storage_path(),
        }
    }
}

impl Default for ShortenerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            default_validity_minutes: default_validity_minutes(),
            code_length: default_code_length(),
            max_attempts_per_length: default_max_attempts_per_length(),
            max_code_length: default_max_code_length(),
            max_batch_size: default_max_batch_size(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
            enable_rotation: default_enable_rotation(),
            max_backups: default_max_backups(),
            mirror_capacity: default_mirror_capacity(),
        }
    }
}
