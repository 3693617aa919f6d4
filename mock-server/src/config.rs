use std::{env, path::PathBuf, str::FromStr};

use tracing::{info, warn};

pub struct Config {
    pub port: u16,
    /// JSON array of filing rows served instead of the bundled sample.
    pub fixture: Option<PathBuf>,
}

impl Config {
    pub fn load() -> Self {
        Self {
            port: try_load("PORT", 3000),
            fixture: env::var("LCA_FIXTURE").ok().map(PathBuf::from),
        }
    }
}

fn try_load<T: FromStr + std::fmt::Display>(key: &str, default: T) -> T {
    let Ok(raw) = env::var(key) else {
        info!("{key} not set, using default: {default}");
        return default;
    };
    raw.parse().unwrap_or_else(|_| {
        warn!("Invalid {key} value {raw:?}, using default: {default}");
        default
    })
}
