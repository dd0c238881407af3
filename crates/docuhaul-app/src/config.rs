//! Configuration management for docuhaul
//!
//! Config stored at: ~/.config/docuhaul/config.json

use docuhaul_ai::AiConfig;
use docuhaul_types::{ConfigError, OutputFormat, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable that overrides the configured webhook secret
pub const WEBHOOK_SECRET_ENV: &str = "DOCUHAUL_WEBHOOK_SECRET";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// AI backend to use (gemini, claude, codex)
    #[serde(default = "default_backend")]
    pub backend: String,

    /// Model name override (optional)
    #[serde(default)]
    pub model: Option<String>,

    /// Full AI command line override (optional)
    #[serde(default)]
    pub ai_command: Option<String>,

    /// Data directory override
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    /// Default output format (json, table)
    #[serde(default)]
    pub output_format: OutputFormat,

    /// Shared secret for payment webhook signatures
    #[serde(default)]
    pub webhook_secret: Option<String>,

    /// AI documents a free account may generate
    #[serde(default = "default_free_document_quota")]
    pub free_document_quota: u32,

    /// Port for `serve`
    #[serde(default = "default_server_port")]
    pub server_port: u16,

    /// Path to manufacturer.toml
    #[serde(default)]
    pub manufacturer_profile: Option<PathBuf>,
}

fn default_backend() -> String {
    "gemini".to_string()
}

fn default_free_document_quota() -> u32 {
    3
}

fn default_server_port() -> u16 {
    8080
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            model: None,
            ai_command: None,
            data_dir: None,
            output_format: OutputFormat::default(),
            webhook_secret: None,
            free_document_quota: default_free_document_quota(),
            server_port: default_server_port(),
            manufacturer_profile: None,
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or(ConfigError::NotFound)?
            .join("docuhaul");
        Ok(config_dir)
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    /// Get the data directory (documents.json, accounts.json)
    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(ref dir) = self.data_dir {
            return Ok(dir.clone());
        }

        let data_dir = dirs::data_dir()
            .ok_or(ConfigError::NotFound)?
            .join("docuhaul");
        Ok(data_dir)
    }

    /// Webhook secret, environment first
    pub fn webhook_secret(&self) -> Option<String> {
        std::env::var(WEBHOOK_SECRET_ENV)
            .ok()
            .or_else(|| self.webhook_secret.clone())
            .filter(|s| !s.trim().is_empty())
    }

    pub fn ai_config(&self) -> AiConfig {
        AiConfig::default()
            .with_backend(&self.backend)
            .with_model(self.model.clone())
            .with_command(self.ai_command.clone())
    }

    /// Load config from file, or create default
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&content)
                .map_err(|e| ConfigError::ParseError(format!("{}: {}", path.display(), e)))?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

impl std::fmt::Display for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "DocuHaul Configuration")?;
        writeln!(f, "======================")?;
        writeln!(f)?;
        writeln!(f, "Backend:         {}", self.backend)?;
        writeln!(
            f,
            "Model:           {}",
            self.model.as_deref().unwrap_or("(default)")
        )?;
        writeln!(f, "AI command:      {}", self.ai_config().command_line())?;
        writeln!(
            f,
            "Data dir:        {}",
            self.data_dir()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|_| "(error)".to_string())
        )?;
        writeln!(f, "Output format:   {}", self.output_format)?;
        writeln!(f, "Free quota:      {}", self.free_document_quota)?;
        writeln!(f, "Server port:     {}", self.server_port)?;
        writeln!(
            f,
            "Webhook secret:  {}",
            if self.webhook_secret().is_some() { "(set)" } else { "(not set)" }
        )?;
        writeln!(
            f,
            "Manufacturer:    {}",
            self.manufacturer_profile
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "(none)".to_string())
        )?;

        if let Ok(path) = Self::config_path() {
            writeln!(f)?;
            writeln!(f, "Config file:     {}", path.display())?;
        }

        Ok(())
    }
}
