// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command-line flags. Each flag overrides the matching config file value.

use std::path::PathBuf;

use clap::Parser;
use graham_core::config::BridgeConfig;
use graham_core::error::Result;

#[derive(Debug, Parser)]
#[command(
    name = "graham-bridge",
    about = "Loopback bridge that prints Braille Ready Format jobs to local embossers",
    version
)]
pub struct Cli {
    /// JSON config file. Defaults to `<config dir>/graham-bridge/config.json`.
    #[arg(long, env = "GRAHAM_CONFIG")]
    pub config: Option<PathBuf>,

    /// TCP port on 127.0.0.1.
    #[arg(long, env = "GRAHAM_PORT")]
    pub port: Option<u16>,

    /// Number of job events kept for replay.
    #[arg(long, env = "GRAHAM_HISTORY_CAPACITY")]
    pub history_capacity: Option<usize>,

    /// Events buffered per log-stream client before deliveries are dropped.
    #[arg(long, env = "GRAHAM_MAILBOX_SIZE")]
    pub mailbox_size: Option<usize>,
}

impl Cli {
    /// Loads the config file (or defaults) and layers the flags on top.
    pub fn resolve_config(&self) -> Result<BridgeConfig> {
        let mut config = BridgeConfig::resolve(self.config.as_deref())?;
        self.apply(&mut config);
        config.validate()?;
        Ok(config)
    }

    pub fn apply(&self, config: &mut BridgeConfig) {
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(capacity) = self.history_capacity {
            config.history_capacity = capacity;
        }
        if let Some(size) = self.mailbox_size {
            config.mailbox_size = size;
        }
    }
}
