// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Print pipeline: validated request -> OS backend -> journal.
//
// Attempt states: Received -> Validated -> Dispatched -> Succeeded | Failed.
// There is no retry edge; the caller decides whether to resubmit. Every
// dispatched attempt is recorded exactly once, success or failure.

use std::sync::Arc;

use graham_bridge::PrintBackend;
use graham_core::error::{BridgeError, Result};
use graham_core::types::{AttemptState, JobDraft, JobEvent, PrintJobRequest};
use tracing::{debug, info, instrument, warn};

use crate::journal::JobJournal;
use crate::test_page::TEST_PAGE;

/// Result of one dispatched attempt: the recorded event and the backend outcome.
#[derive(Debug)]
pub struct JobOutcome {
    pub event: JobEvent,
    pub result: Result<()>,
}

/// Shared handle to the backend and the journal. Cheap to clone.
#[derive(Clone)]
pub struct PrintService {
    backend: Arc<dyn PrintBackend>,
    journal: Arc<JobJournal>,
}

impl PrintService {
    pub fn new(backend: Arc<dyn PrintBackend>, journal: Arc<JobJournal>) -> Self {
        Self { backend, journal }
    }

    pub fn journal(&self) -> &Arc<JobJournal> {
        &self.journal
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Dispatch a validated request and record the attempt.
    ///
    /// The OS call runs on the blocking pool and is not cancellable once
    /// started.
    #[instrument(skip_all, fields(printer = %request.printer, bytes = request.payload.len()))]
    pub async fn submit(&self, request: PrintJobRequest) -> JobOutcome {
        debug!(state = ?AttemptState::Validated, "print attempt");
        let PrintJobRequest { printer, payload } = request;
        let payload: Arc<[u8]> = payload.into();

        let backend = Arc::clone(&self.backend);
        let target = printer.clone();
        let data = Arc::clone(&payload);
        debug!(state = ?AttemptState::Dispatched, backend = backend.name(), "print attempt");
        let result = tokio::task::spawn_blocking(move || backend.send(&target, &data))
            .await
            .unwrap_or_else(|e| Err(BridgeError::Internal(format!("print task failed: {e}"))));

        let event = self
            .journal
            .record(JobDraft::from_attempt(&printer, &payload, &result));

        match &result {
            Ok(()) => info!(
                id = event.id,
                state = ?AttemptState::Succeeded,
                "print job delivered"
            ),
            Err(e) => warn!(
                id = event.id,
                state = ?AttemptState::Failed,
                error = %e,
                "print job failed"
            ),
        }

        JobOutcome { event, result }
    }

    /// Validate a printer name and send the fixed self-test page.
    pub async fn print_test_page(&self, printer: impl Into<String>) -> Result<JobOutcome> {
        let request = PrintJobRequest::new(printer, TEST_PAGE.to_vec())?;
        Ok(self.submit(request).await)
    }

    /// Queue names known to the OS. A backend failure reads as no queues.
    pub async fn printers(&self) -> Vec<String> {
        let backend = Arc::clone(&self.backend);
        match tokio::task::spawn_blocking(move || backend.list_printers()).await {
            Ok(Ok(names)) => names,
            Ok(Err(e)) => {
                warn!(error = %e, "printer enumeration failed");
                Vec::new()
            }
            Err(e) => {
                warn!(error = %e, "printer enumeration task failed");
                Vec::new()
            }
        }
    }
}
