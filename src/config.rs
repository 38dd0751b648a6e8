use anyhow::Context;
use std::str::FromStr;

const DEFAULT_SERVER_PORT: u16 = 3000;
const DEFAULT_AUTHORS_API_URL: &str = "http://127.0.0.1:8080/api";

#[derive(Debug)]
pub struct Config {
    authors_api_url: String,
    server_port: u16,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let authors_api_url =
            load_env_or("AUTHORS_API_URL", DEFAULT_AUTHORS_API_URL.to_string())?;
        let server_port = load_env_or("SERVER_PORT", DEFAULT_SERVER_PORT)?;
        Ok(Self {
            authors_api_url,
            server_port,
        })
    }

    #[must_use]
    pub fn authors_api_url(&self) -> &str {
        &self.authors_api_url
    }

    #[must_use]
    pub const fn server_port(&self) -> u16 {
        self.server_port
    }
}

fn load_env_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    <T as FromStr>::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(val) => parse_env(key, &val),
        Err(std::env::VarError::NotPresent) => Ok(default),
        Err(err) => {
            Err(err).with_context(|| format!("Failed to load environment variable {key}"))
        }
    }
}

fn parse_env<T>(key: &str, val: &str) -> anyhow::Result<T>
where
    T: FromStr,
    <T as FromStr>::Err: std::error::Error + Send + Sync + 'static,
{
    val.parse::<T>()
        .with_context(|| format!("Failed to parse environment variable {key}"))
}
