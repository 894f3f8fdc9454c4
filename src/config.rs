//! Configuration handling for the wizard

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

pub const ENV_FORMS_ENDPOINT: &str = "CONTACT_WIZARD_FORMS_ENDPOINT";
pub const ENV_CLOUDINARY_CLOUD: &str = "CONTACT_WIZARD_CLOUDINARY_CLOUD";
pub const ENV_UPLOAD_PRESET: &str = "CONTACT_WIZARD_UPLOAD_PRESET";

const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_NOTIFICATION_TTL_SECS: u64 = 4;
const DEFAULT_UPLOAD_FOLDER: &str = "website-forms";

/// User configuration for the wizard
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct WizardConfig {
    /// URL the form payload is POSTed to
    pub forms_endpoint: String,
    pub cloudinary_cloud_name: String,
    pub cloudinary_upload_preset: String,
    /// Root folder for uploaded attachments; each flow adds a subfolder
    pub upload_folder: String,
    /// Bound on each upload and submission call
    pub request_timeout_secs: u64,
    /// How long notifications stay on screen
    pub notification_ttl_secs: u64,
    /// Static copy strings from the CMS, keyed by copy key
    pub copy: HashMap<String, String>,
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            forms_endpoint: String::new(),
            cloudinary_cloud_name: String::new(),
            cloudinary_upload_preset: String::new(),
            upload_folder: DEFAULT_UPLOAD_FOLDER.to_string(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            notification_ttl_secs: DEFAULT_NOTIFICATION_TTL_SECS,
            copy: HashMap::new(),
        }
    }
}

impl WizardConfig {
    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("io", "contact-wizard", "contact-wizard")
            .map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Load configuration from the default location, then apply env overrides
    pub fn load() -> Result<Self> {
        let mut config = match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path)?,
            _ => {
                debug!("No config file found, using defaults");
                Self::default()
            }
        };
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load configuration from an explicit file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config at {}", path.display()))?;
        let config: WizardConfig = serde_json::from_str(&content)
            .with_context(|| format!("Invalid config at {}", path.display()))?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Overlay values from the environment onto the file values
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(endpoint) = lookup(ENV_FORMS_ENDPOINT) {
            self.forms_endpoint = endpoint;
        }
        if let Some(cloud) = lookup(ENV_CLOUDINARY_CLOUD) {
            self.cloudinary_cloud_name = cloud;
        }
        if let Some(preset) = lookup(ENV_UPLOAD_PRESET) {
            self.cloudinary_upload_preset = preset;
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn notification_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.notification_ttl_secs as i64)
    }
}
