use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: Option<String>,
    pub api_keys: String,
    pub allow_pending_override: bool,
    pub allow_lock_override: bool,
    pub read_retries: u32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            host: std::env::var("HOST").context("Cannot load HOST env variable")?,
            port: std::env::var("PORT")
                .context("Cannot load PORT env variable")?
                .parse()
                .context("PORT must be a number")?,
            database_url: std::env::var("DATABASE_URL")
                .ok()
                .filter(|url| !url.trim().is_empty()),
            api_keys: std::env::var("API_KEYS").unwrap_or_default(),
            allow_pending_override: bool_var("ALLOW_PENDING_OVERRIDE")?,
            allow_lock_override: bool_var("ALLOW_LOCK_OVERRIDE")?,
            read_retries: match std::env::var("READ_RETRIES") {
                Ok(raw) => raw.parse().context("READ_RETRIES must be a number")?,
                Err(_) => 2,
            },
        })
    }
}

fn bool_var(name: &str) -> Result<bool> {
    match std::env::var(name) {
        Err(_) => Ok(false),
        Ok(raw) => parse_bool(&raw).with_context(|| format!("{} must be a boolean", name)),
    }
}

fn parse_bool(raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "" | "0" | "false" | "no" | "off" => Ok(false),
        other => anyhow::bail!("unrecognised boolean '{}'", other),
    }
}
