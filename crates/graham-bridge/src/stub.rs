// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Stub backend for targets with neither CUPS nor the Win32 spooler.
//
// Sending returns `PlatformUnavailable`; listing reports no queues.

use graham_core::error::{BridgeError, Result};

use crate::traits::PrintBackend;

/// No-op backend returned on unsupported platforms.
#[derive(Debug, Clone, Copy, Default)]
pub struct StubBackend;

impl PrintBackend for StubBackend {
    fn name(&self) -> &str {
        "unsupported (stub)"
    }

    fn send(&self, printer: &str, _data: &[u8]) -> Result<()> {
        tracing::warn!(printer, "PrintBackend::send called on stub backend");
        Err(BridgeError::PlatformUnavailable)
    }

    fn list_printers(&self) -> Result<Vec<String>> {
        Ok(Vec::new())
    }
}
