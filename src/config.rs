use serde::Deserialize;
use std::str::FromStr;

/// What to do when the enrichment service answers with text that is not a JSON object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MalformedResponsePolicy {
    /// Store a lead with every enrichment field empty.
    #[default]
    Blank,
    /// Fail the lead like a transport error.
    Fail,
}

impl FromStr for MalformedResponsePolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "blank" => Ok(Self::Blank),
            "fail" => Ok(Self::Fail),
            other => anyhow::bail!(
                "MALFORMED_RESPONSE_POLICY must be 'blank' or 'fail', got '{}'",
                other
            ),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub gemini_base_url: String,
    /// `None` leaves enrichment calls without a client timeout.
    pub gemini_timeout_secs: Option<u64>,
    /// Wipe every lead when the store opens.
    pub reset_on_start: bool,
    pub malformed_policy: MalformedResponsePolicy,
    /// Enrichment calls in flight during a batch import.
    pub batch_concurrency: usize,
    /// Offset applied to `created_at` in CSV exports.
    pub export_utc_offset_hours: i32,
}

pub const DEFAULT_DATABASE_URL: &str = "sqlite://leads.db";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-3-pro-preview";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self::from_lookup(|key| std::env::var(key).ok())?;

        // Never log the API key
        tracing::info!("Configuration loaded successfully");
        tracing::debug!("Database URL: {}", config.database_url);
        tracing::debug!(
            "Gemini: {} via {}",
            config.gemini_model,
            config.gemini_base_url
        );
        if config.reset_on_start {
            tracing::warn!("RESET_LEADS_ON_START is set: stored leads are wiped on every start");
        }
        tracing::debug!("Server Port: {}", config.port);

        Ok(config)
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let config = Self {
            database_url: {
                let url = var("DB_URL")
                    .or_else(|| var("DATABASE_URL"))
                    .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());
                if !url.starts_with("sqlite:") {
                    anyhow::bail!("DB_URL must start with sqlite:");
                }
                url
            },
            port: var("PORT")
                .unwrap_or_else(|| "3000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            gemini_api_key: var("GEMINI_API_KEY")
                .ok_or_else(|| anyhow::anyhow!("GEMINI_API_KEY environment variable required"))?,
            gemini_model: var("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            gemini_base_url: {
                let url = var("GEMINI_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string());
                if !url.starts_with("http://") && !url.starts_with("https://") {
                    anyhow::bail!("GEMINI_BASE_URL must start with http:// or https://");
                }
                url.trim_end_matches('/').to_string()
            },
            gemini_timeout_secs: var("GEMINI_TIMEOUT_SECS")
                .map(|v| {
                    v.parse::<u64>()
                        .ok()
                        .filter(|secs| *secs > 0)
                        .ok_or_else(|| {
                            anyhow::anyhow!("GEMINI_TIMEOUT_SECS must be a positive number")
                        })
                })
                .transpose()?,
            reset_on_start: var("RESET_LEADS_ON_START")
                .map(|v| parse_bool(&v))
                .transpose()?
                .unwrap_or(false),
            malformed_policy: var("MALFORMED_RESPONSE_POLICY")
                .map(|v| v.parse::<MalformedResponsePolicy>())
                .transpose()?
                .unwrap_or_default(),
            batch_concurrency: var("BATCH_CONCURRENCY")
                .map(|v| {
                    v.parse::<usize>()
                        .ok()
                        .filter(|n| *n >= 1)
                        .ok_or_else(|| anyhow::anyhow!("BATCH_CONCURRENCY must be at least 1"))
                })
                .transpose()?
                .unwrap_or(1),
            export_utc_offset_hours: var("EXPORT_UTC_OFFSET_HOURS")
                .map(|v| {
                    v.parse::<i32>()
                        .ok()
                        .filter(|h| (-23..=23).contains(h))
                        .ok_or_else(|| {
                            anyhow::anyhow!("EXPORT_UTC_OFFSET_HOURS must be between -23 and 23")
                        })
                })
                .transpose()?
                .unwrap_or(-3),
        };

        Ok(config)
    }
}

fn parse_bool(value: &str) -> anyhow::Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => anyhow::bail!("expected a boolean, got '{}'", other),
    }
}
