use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variables checked for the backend credential, in order.
pub const API_KEY_ENV_VARS: &[&str] = &["GEMINI_API_KEY", "API_KEY"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlamConfig {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub models: ModelsConfig,

    #[serde(default)]
    pub request: RequestConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Gemini API key. Overridden by `GEMINI_API_KEY` / `API_KEY`.
    #[serde(default)]
    pub key: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsConfig {
    #[serde(default = "default_image_model")]
    pub image_model: String,

    #[serde(default = "default_text_model")]
    pub text_model: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestConfig {
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Where exported panels are written.
    #[serde(default = "default_download_dir")]
    pub download_dir: PathBuf,
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}
fn default_image_model() -> String {
    "gemini-2.5-flash-image-preview".to_string()
}
fn default_text_model() -> String {
    "gemini-2.5-flash".to_string()
}
fn default_timeout() -> u64 {
    120
}
fn default_download_dir() -> PathBuf {
    dirs::picture_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("slamstory")
}

impl Default for SlamConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            models: ModelsConfig::default(),
            request: RequestConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            key: String::new(),
            base_url: default_base_url(),
        }
    }
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            image_model: default_image_model(),
            text_model: default_text_model(),
        }
    }
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            download_dir: default_download_dir(),
        }
    }
}

impl SlamConfig {
    /// Load config from ~/.config/slamstory/config.toml, creating defaults if missing.
    pub fn load() -> crate::error::Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    /// Load config from an explicit path, writing defaults there if it does not exist.
    pub fn load_from(config_path: &Path) -> crate::error::Result<Self> {
        if config_path.exists() {
            let contents = std::fs::read_to_string(config_path).map_err(|e| {
                crate::error::StoryError::Config(format!("Failed to read config: {e}"))
            })?;
            let config: SlamConfig = toml::from_str(&contents).map_err(|e| {
                crate::error::StoryError::Config(format!("Failed to parse config: {e}"))
            })?;
            Ok(config)
        } else {
            let config = SlamConfig::default();
            config.save_to(config_path)?;
            Ok(config)
        }
    }

    /// Save config to disk.
    pub fn save_to(&self, config_path: &Path) -> crate::error::Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self).map_err(|e| {
            crate::error::StoryError::Config(format!("Failed to serialize config: {e}"))
        })?;
        std::fs::write(config_path, contents)?;
        Ok(())
    }

    /// Get the config file path.
    pub fn config_path() -> crate::error::Result<PathBuf> {
        let config_dir = dirs::config_dir().ok_or_else(|| {
            crate::error::StoryError::Config("Could not determine config directory".into())
        })?;
        Ok(config_dir.join("slamstory").join("config.toml"))
    }

    /// The backend credential: environment first, then the config file.
    pub fn api_key(&self) -> crate::error::Result<String> {
        let from_env = API_KEY_ENV_VARS
            .iter()
            .filter_map(|name| std::env::var(name).ok())
            .find(|value| !value.trim().is_empty());

        match from_env {
            Some(key) => Ok(key.trim().to_string()),
            None if !self.api.key.trim().is_empty() => Ok(self.api.key.trim().to_string()),
            None => Err(crate::error::StoryError::Config(format!(
                "No API key configured. Set {} or api.key in the config file.",
                API_KEY_ENV_VARS[0]
            ))),
        }
    }
}
