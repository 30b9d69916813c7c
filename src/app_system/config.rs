use std::{env, fmt::Display, str::FromStr};
use tracing::{info, warn};

pub struct Config {
    pub port: u16,
    /// Shared secret for verifying identity-webhook signatures. Optional so
    /// the service can come up without it; the webhook answers 500 until it
    /// is configured.
    pub webhook_secret: Option<String>,
}

impl Config {
    pub fn load() -> Self {
        Self {
            port: try_load("PORT", "8080"),
            webhook_secret: var("CLERK_WEBHOOK_SECRET").ok(),
        }
    }
}

fn var(key: &str) -> Result<String, ()> {
    env::var(key).map_err(|_| {
        warn!("Environment variable {key} not found, using default");
    })
}

fn try_load<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    var(key)
        .unwrap_or_else(|_| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e| {
            warn!("Invalid {key} value: {e}");
        })
        .expect("Environment misconfigured!")
}
