// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bridge configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{BridgeError, Result};

/// Loopback address the service binds to. Deliberately not configurable.
pub const BIND_HOST: [u8; 4] = [127, 0, 0, 1];

/// Default port the browser client expects.
pub const DEFAULT_PORT: u16 = 8080;

/// Default number of job events retained in memory.
pub const DEFAULT_HISTORY_CAPACITY: usize = 200;

/// Default per-subscriber mailbox depth for the live log stream.
pub const DEFAULT_MAILBOX_SIZE: usize = 8;

/// Upper bound on `history_capacity`.
pub const MAX_HISTORY_CAPACITY: usize = 100_000;

/// Upper bound on `mailbox_size`.
pub const MAX_MAILBOX_SIZE: usize = 4096;

const CONFIG_DIR: &str = "graham-bridge";
const CONFIG_FILE: &str = "config.json";

/// Runtime settings for the bridge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// TCP port on 127.0.0.1.
    pub port: u16,
    /// Maximum job events kept for replay (oldest evicted first).
    pub history_capacity: usize,
    /// Live events buffered per console connection before drops begin.
    pub mailbox_size: usize,
    /// CUPS submit command.
    pub lp_command: String,
    /// CUPS queue listing command.
    pub lpstat_command: String,
    /// Embosser framing rules. Empty means the built-in table.
    pub embossers: Vec<EmbosserProfileConfig>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            mailbox_size: DEFAULT_MAILBOX_SIZE,
            lp_command: "lp".into(),
            lpstat_command: "lpstat".into(),
            embossers: Vec::new(),
        }
    }
}

/// One embosser family entry as written in the config file.
///
/// Byte sequences are hex strings, e.g. `"1b40"` for `ESC @`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbosserProfileConfig {
    pub family: String,
    /// Case-insensitive substring matched against the queue name.
    pub name_pattern: String,
    #[serde(default)]
    pub preamble_hex: String,
    #[serde(default)]
    pub trailer_hex: String,
}

impl EmbosserProfileConfig {
    pub fn preamble(&self) -> Result<Vec<u8>> {
        decode_hex_field(&self.family, "preamble_hex", &self.preamble_hex)
    }

    pub fn trailer(&self) -> Result<Vec<u8>> {
        decode_hex_field(&self.family, "trailer_hex", &self.trailer_hex)
    }
}

fn decode_hex_field(family: &str, field: &str, value: &str) -> Result<Vec<u8>> {
    let compact: String = value.chars().filter(|c| !c.is_whitespace()).collect();
    hex::decode(&compact)
        .map_err(|e| BridgeError::Config(format!("embosser {family}: {field}: {e}")))
}

impl BridgeConfig {
    /// Read a JSON config file. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .map_err(|e| BridgeError::Config(format!("{}: {e}", path.display())))?;
        let config: Self = serde_json::from_str(&data)
            .map_err(|e| BridgeError::Config(format!("{}: {e}", path.display())))?;
        config.validate()?;
        info!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Load from an explicit path, else the per-user default location, else defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match default_config_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => {
                debug!("no configuration file, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Reject settings the service cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.lp_command.trim().is_empty() || self.lpstat_command.trim().is_empty() {
            return Err(BridgeError::Config("print commands must not be empty".into()));
        }
        if !(1..=MAX_HISTORY_CAPACITY).contains(&self.history_capacity) {
            return Err(BridgeError::Config(format!(
                "history_capacity must be between 1 and {MAX_HISTORY_CAPACITY}, got {}",
                self.history_capacity
            )));
        }
        if !(1..=MAX_MAILBOX_SIZE).contains(&self.mailbox_size) {
            return Err(BridgeError::Config(format!(
                "mailbox_size must be between 1 and {MAX_MAILBOX_SIZE}, got {}",
                self.mailbox_size
            )));
        }
        for profile in &self.embossers {
            if profile.name_pattern.trim().is_empty() {
                return Err(BridgeError::Config(format!(
                    "embosser {}: name_pattern must not be empty",
                    profile.family
                )));
            }
            profile.preamble()?;
            profile.trailer()?;
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> std::net::SocketAddr {
        std::net::SocketAddr::from((BIND_HOST, self.port))
    }
}

/// `$XDG_CONFIG_HOME/graham-bridge/config.json`, falling back to `~/.config`.
pub fn default_config_path() -> Option<PathBuf> {
    let base = if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        PathBuf::from(xdg)
    } else if let Ok(appdata) = std::env::var("APPDATA") {
        PathBuf::from(appdata)
    } else {
        PathBuf::from(std::env::var("HOME").ok()?).join(".config")
    };
    Some(base.join(CONFIG_DIR).join(CONFIG_FILE))
}
