// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for the bridge.

use thiserror::Error;

/// Top-level error type for all bridge operations.
///
/// The `Display` text of every variant is what the browser shows the user, so
/// backend variants carry the full detail (command output, Win32 message).
#[derive(Debug, Error)]
pub enum BridgeError {
    // -- Request validation --
    #[error("{0}")]
    InvalidRequest(String),

    // -- OS dispatch --
    #[error("temporary file error: {0}")]
    TempFile(String),

    #[error("failed to run {command}: {source}")]
    CommandSpawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{command} command failed: {status}\noutput: {output}")]
    CommandFailed {
        command: String,
        status: String,
        output: String,
    },

    #[error("print spooler error: {0}")]
    Spooler(String),

    #[error("printing is not available on this platform")]
    PlatformUnavailable,

    // -- Startup / plumbing --
    #[error("configuration error: {0}")]
    Config(String),

    #[error("cannot listen on {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl BridgeError {
    /// Whether the error was raised before any OS interaction took place.
    pub fn is_malformed_request(&self) -> bool {
        matches!(self, Self::InvalidRequest(_))
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, BridgeError>;
