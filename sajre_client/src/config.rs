use crate::api::DEFAULT_BASE_URL;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

pub const ENVIRONMENT_VAR: &str = "SAJRE_APP_ENVIRONMENT";
pub const API_URL_VAR: &str = "VITE_API_URL";

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub api: ApiSettings,
    pub storage: StorageSettings,
    pub auth: AuthSettings,
    pub dashboard: DashboardSettings,
    pub log: LogSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl ApiSettings {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.filter(|s| *s > 0).map(Duration::from_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageSettings {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthSettings {
    /// Logins with this email try the admin endpoint first. Empty disables it.
    #[serde(default)]
    pub admin_email: String,
    pub password_hash_cost: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardSettings {
    pub mentor_poll_secs: u64,
}

impl DashboardSettings {
    pub fn mentor_poll_interval(&self) -> Duration {
        Duration::from_secs(self.mentor_poll_secs.max(1))
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LogSettings {
    pub level: String,
}

impl AppConfig {
    /// Defaults, then `config/base.toml`, then `config/<environment>.toml`,
    /// then `SAJRE__SECTION__KEY` variables, then `VITE_API_URL`.
    pub fn new() -> Result<Self, config::ConfigError> {
        let base_path = std::env::current_dir().map_err(|e| config::ConfigError::Foreign(Box::new(e)))?;
        let config_dir = base_path.join("config");

        let app_environment: Environment = std::env::var(ENVIRONMENT_VAR)
            .unwrap_or_else(|_| "local".into())
            .try_into()
            .map_err(config::ConfigError::Message)?;

        Self::build(&config_dir, app_environment, std::env::var(API_URL_VAR).ok())
    }

    pub fn build(
        config_dir: &std::path::Path,
        environment: Environment,
        api_url_override: Option<String>,
    ) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder()
            .set_default("api.base_url", DEFAULT_BASE_URL)?
            .set_default("storage.path", ".sajre/storage.json")?
            .set_default("auth.admin_email", "")?
            .set_default("auth.password_hash_cost", i64::from(bcrypt::DEFAULT_COST))?
            .set_default("dashboard.mentor_poll_secs", 30_i64)?
            .set_default("log.level", "info")?
            .add_source(config::File::from(config_dir.join("base")).required(false))
            .add_source(config::File::from(config_dir.join(environment.as_str())).required(false))
            .add_source(config::Environment::with_prefix("SAJRE").separator("__"));

        if let Some(url) = api_url_override.filter(|u| !u.trim().is_empty()) {
            builder = builder.set_override("api.base_url", url)?;
        }

        builder.build()?.try_deserialize()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Local,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Production => "production",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            other => Err(format!(
                "{} is not a supported environment. Use either `local` or `production`",
                other
            )),
        }
    }
}
