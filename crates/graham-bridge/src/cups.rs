// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// CUPS backend for Linux and macOS.
//
// Jobs go through the `lp` command in raw mode so CUPS runs no filters over
// the BRF bytes. The payload is staged in a uniquely named temporary file that
// is removed when the handle drops, on every exit path.

#![cfg(unix)]

use std::io::Write;
use std::process::{Command, Output};

use graham_core::error::{BridgeError, Result};
use tracing::{debug, info, warn};

use crate::embosser::EmbosserTable;
use crate::traits::PrintBackend;

const TEMP_PREFIX: &str = "graham-";
const TEMP_SUFFIX: &str = ".brf";

/// Raw printing through the CUPS command-line tools.
#[derive(Debug, Clone)]
pub struct CupsBackend {
    lp_command: String,
    lpstat_command: String,
    embossers: EmbosserTable,
}

impl Default for CupsBackend {
    fn default() -> Self {
        Self::new("lp", "lpstat", EmbosserTable::builtin())
    }
}

impl CupsBackend {
    pub fn new(
        lp_command: impl Into<String>,
        lpstat_command: impl Into<String>,
        embossers: EmbosserTable,
    ) -> Self {
        Self {
            lp_command: lp_command.into(),
            lpstat_command: lpstat_command.into(),
            embossers,
        }
    }

    fn run_lpstat(&self, args: &[&str]) -> Option<String> {
        let output = Command::new(&self.lpstat_command).args(args).output();
        match output {
            Ok(out) if out.status.success() => Some(String::from_utf8_lossy(&out.stdout).into_owned()),
            Ok(out) => {
                debug!(
                    command = %self.lpstat_command,
                    ?args,
                    status = %out.status,
                    "lpstat exited unsuccessfully"
                );
                None
            }
            Err(e) => {
                debug!(command = %self.lpstat_command, ?args, error = %e, "lpstat could not be run");
                None
            }
        }
    }
}

impl PrintBackend for CupsBackend {
    fn name(&self) -> &str {
        "cups"
    }

    fn send(&self, printer: &str, data: &[u8]) -> Result<()> {
        let framed = self.embossers.frame(printer, data);

        let mut staged = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .suffix(TEMP_SUFFIX)
            .tempfile()
            .map_err(|e| BridgeError::TempFile(format!("create temp file: {e}")))?;
        staged
            .write_all(&framed)
            .and_then(|()| staged.flush())
            .map_err(|e| BridgeError::TempFile(format!("write temp file: {e}")))?;

        debug!(
            printer,
            path = %staged.path().display(),
            bytes = framed.len(),
            "submitting raw job to CUPS"
        );

        let output = Command::new(&self.lp_command)
            .arg("-d")
            .arg(printer)
            .arg("-o")
            .arg("raw")
            .arg(staged.path())
            .output()
            .map_err(|source| BridgeError::CommandSpawn {
                command: self.lp_command.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(BridgeError::CommandFailed {
                command: self.lp_command.clone(),
                status: output.status.to_string(),
                output: combined_output(&output),
            });
        }

        info!(printer, bytes = framed.len(), reply = %combined_output(&output), "CUPS accepted job");
        Ok(())
    }

    fn list_printers(&self) -> Result<Vec<String>> {
        let listing = self
            .run_lpstat(&["-a"])
            .or_else(|| self.run_lpstat(&[]));

        match listing {
            Some(text) => Ok(parse_lpstat(&text)),
            None => {
                warn!("no CUPS queue listing available, reporting no printers");
                Ok(Vec::new())
            }
        }
    }
}

/// stdout followed by stderr, trimmed.
fn combined_output(output: &Output) -> String {
    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    text.push_str(&String::from_utf8_lossy(&output.stderr));
    text.trim().to_string()
}

/// First field of every non-empty `lpstat` line, de-duplicated in order.
///
/// `lpstat -a` lines look like `Embosser accepting requests since ...`.
pub fn parse_lpstat(text: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for name in text.lines().filter_map(|line| line.split_whitespace().next()) {
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}
