use std::{fs, path::Path};

use anyhow::Context;
use log::debug;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Host name of the SMTP relay to authenticate against
    pub smtp_relay: String,

    /// Overrides the relay's default port (465 implicit TLS, 587 with STARTTLS)
    pub smtp_port: Option<u16>,

    /// Upgrade a plain connection with STARTTLS instead of connecting over TLS
    pub smtp_starttls: bool,

    /// Subject line of every list email
    pub subject: String,

    /// First line of the body, the items follow one per line
    pub body_heading: String,

    /// Drop items that are empty after trimming instead of sending blank lines
    pub skip_blank_items: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            smtp_relay: "smtp.gmail.com".to_string(),
            smtp_port: None,
            smtp_starttls: false,
            subject: "Your List".to_string(),
            body_heading: "Here is your list:".to_string(),
            skip_blank_items: false,
        }
    }
}

impl Config {
    pub fn load_from(config_path: &Path) -> anyhow::Result<Config> {
        debug!("Loading Config from: {config_path:?}");
        let file_contents = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read contents of {config_path:?}"))?;
        let result = serde_json::from_str(&file_contents)
            .with_context(|| format!("Failed to parse contents of {config_path:?}"))?;
        Ok(result)
    }

    /// Uses the file if one was given otherwise the built-in defaults
    pub fn load_or_default(config_path: Option<&Path>) -> anyhow::Result<Config> {
        match config_path {
            Some(path) => Self::load_from(path),
            None => {
                debug!("No config file specified using defaults");
                Ok(Self::default())
            }
        }
    }
}
