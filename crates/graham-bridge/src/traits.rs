// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-agnostic trait definition for the OS print subsystem.
//
// Exactly one implementation is compiled per target. The two OS facilities
// (CUPS command line, Win32 spooler) never coexist in one process.

use graham_core::error::Result;

/// Deliver raw bytes to a named OS print queue and list the queues.
///
/// Both methods block for the duration of the OS call. Async callers must run
/// them on a blocking pool (`tokio::task::spawn_blocking`).
pub trait PrintBackend: Send + Sync {
    /// Short human-readable name (e.g. "cups", "windows-spooler").
    fn name(&self) -> &str;

    /// Send `data` unmodified to the queue named `printer`.
    ///
    /// Embosser framing for the queue's family is applied here and nowhere
    /// else. Failures are terminal; the backend never retries.
    fn send(&self, printer: &str, data: &[u8]) -> Result<()>;

    /// Names of the queues the OS knows about. No queues is `Ok(vec![])`.
    fn list_printers(&self) -> Result<Vec<String>>;
}
