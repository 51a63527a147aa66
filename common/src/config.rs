use serde::Deserialize;
use std::{error::Error, fs};
use url::Url;

pub const DEFAULT_ADMIN_URL: &str = "http://localhost:5174/api/orders/update";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct CommonConfig {
    pub project_name: String,
    pub database_url: String,
}

/// Which persistence backend the order API runs against.
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    #[default]
    Database,
    Memory,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct BackendConfig {
    pub server_address: String,
    pub log_level: String,
    #[serde(default)]
    pub allowed_origins: Vec<String>,
    #[serde(default)]
    pub storage: StorageKind,
}

#[derive(Debug, Deserialize, Clone)]
pub struct NotifierConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_admin_url")]
    pub admin_url: Url,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            admin_url: default_admin_url(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct CartConfig {
    #[serde(default = "default_cookie_max_age")]
    pub cookie_max_age_secs: i64,
    #[serde(default = "default_true")]
    pub secure_cookies: bool,
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            cookie_max_age_secs: default_cookie_max_age(),
            secure_cookies: true,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    pub common: CommonConfig,
    pub backend: BackendConfig,
    #[serde(default)]
    pub notifier: NotifierConfig,
    #[serde(default)]
    pub cart: CartConfig,
}

impl Config {
    pub fn load(config_path: &str) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let contents = fs::read_to_string(config_path)?;
        Self::from_yaml(&contents)
    }

    pub fn from_yaml(contents: &str) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let config = serde_yml::from_str(contents)?;
        Ok(config)
    }

    /// `DATABASE_URL` and `ADMIN_NOTIFY_URL` take precedence over the file.
    pub fn apply_env_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        if let Some(database_url) = lookup("DATABASE_URL").filter(|v| !v.is_empty()) {
            self.common.database_url = database_url;
        }
        if let Some(admin_url) = lookup("ADMIN_NOTIFY_URL").filter(|v| !v.is_empty()) {
            self.notifier.admin_url = Url::parse(&admin_url)?;
        }
        Ok(())
    }
}

fn default_true() -> bool {
    true
}

fn default_cookie_max_age() -> i64 {
    3600
}

fn default_admin_url() -> Url {
    Url::parse(DEFAULT_ADMIN_URL).expect("default admin url is valid")
}
