use crate::error::ConfigError;

use std::env;

pub const DEFAULT_BOLNA_BASE_URL: &str = "https://api.bolna.ai";
pub const DEFAULT_GROQ_MODEL: &str = "llama-3.1-8b-instant";
pub const DEFAULT_TEMPLATE_NAME: &str = "welcome3";
pub const DEFAULT_PORT: u16 = 3000;

/// Environment-derived configuration, read once at startup and passed by
/// reference from there. A missing required value is fatal; nothing
/// downstream can work without it.
#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub bolna_base_url: String,
    pub bolna_agent_id: String,
    pub bolna_api_key: String,
    pub groq_api_key: String,
    pub groq_model: String,
    pub msg91_api_key: String,
    pub msg91_number: String,
    pub msg91_template_name: String,
    pub port: u16,
    pub sync_interval_minutes: Option<u64>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            database_url: required("DATABASE_URL")?,
            bolna_base_url: env::var("BOLNA_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BOLNA_BASE_URL.to_string()),
            bolna_agent_id: required("BOLNA_AGENT_ID")?,
            bolna_api_key: required("BOLNA_API_KEY")?,
            groq_api_key: required("GROQ_API_KEY")?,
            groq_model: env::var("GROQ_MODEL").unwrap_or_else(|_| DEFAULT_GROQ_MODEL.to_string()),
            msg91_api_key: required("MSG91_API_KEY")?,
            msg91_number: required("MSG91_NUMBER")?,
            msg91_template_name: env::var("MSG91_TEMPLATE_NAME")
                .unwrap_or_else(|_| DEFAULT_TEMPLATE_NAME.to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_PORT),
            // zero would make the scheduler's interval panic; treat it as
            // "no scheduled sync", same as unset or unparseable
            sync_interval_minutes: env::var("SYNC_INTERVAL_MINUTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|&minutes| minutes > 0),
        })
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError(name))
}
