// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the print bridge.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{BridgeError, Result};
use crate::preview;

/// Monotonic job event identifier, unique for the process lifetime.
pub type JobId = u64;

/// Body of `POST /print`.
#[derive(Debug, Clone, Deserialize)]
pub struct PrintBody {
    #[serde(default)]
    pub printer: String,
    /// Base64 (standard alphabet, padded) BRF bytes.
    #[serde(default)]
    pub data: String,
}

/// Body of `POST /testprint`.
#[derive(Debug, Clone, Deserialize)]
pub struct TestPrintBody {
    #[serde(default)]
    pub printer: String,
}

/// A validated print request. Lives for one HTTP request only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintJobRequest {
    pub printer: String,
    pub payload: Vec<u8>,
}

impl PrintJobRequest {
    /// Validate a printer name and raw payload.
    pub fn new(printer: impl Into<String>, payload: Vec<u8>) -> Result<Self> {
        let printer = printer.into();
        if printer.trim().is_empty() {
            return Err(BridgeError::InvalidRequest("printer name required".into()));
        }
        Ok(Self { printer, payload })
    }

    /// Validate the wire form: non-empty printer name and decodable base64.
    pub fn from_base64(printer: impl Into<String>, data: &str) -> Result<Self> {
        let printer = printer.into();
        if printer.trim().is_empty() {
            return Err(BridgeError::InvalidRequest("printer name required".into()));
        }
        let payload = STANDARD
            .decode(data.trim())
            .map_err(|e| BridgeError::InvalidRequest(format!("invalid base64 data: {e}")))?;
        Ok(Self { printer, payload })
    }
}

impl TryFrom<PrintBody> for PrintJobRequest {
    type Error = BridgeError;

    fn try_from(body: PrintBody) -> Result<Self> {
        Self::from_base64(body.printer, &body.data)
    }
}

/// Lifecycle of a single print attempt. There is no retry edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttemptState {
    Received,
    Validated,
    Dispatched,
    Succeeded,
    Failed,
}

impl AttemptState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

/// Everything about a completed attempt except its sequence number.
///
/// The journal stamps the id when the draft is recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobDraft {
    pub time: DateTime<Utc>,
    pub printer: String,
    pub bytes: usize,
    pub brf_text: String,
    pub hex_dump: String,
    pub error: String,
}

impl JobDraft {
    /// Build a draft from the original payload and the backend outcome.
    pub fn from_attempt(printer: &str, payload: &[u8], outcome: &Result<()>) -> Self {
        Self {
            time: Utc::now(),
            printer: printer.to_string(),
            bytes: payload.len(),
            brf_text: preview::text_preview(payload),
            hex_dump: preview::hex_dump(payload),
            error: match outcome {
                Ok(()) => String::new(),
                Err(e) => e.to_string(),
            },
        }
    }
}

/// One recorded print attempt. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobEvent {
    pub id: JobId,
    pub time: DateTime<Utc>,
    pub printer: String,
    pub bytes: usize,
    /// First `TEXT_PREVIEW_BYTES` of the payload as text.
    pub brf_text: String,
    /// First `HEX_PREVIEW_BYTES` of the payload as an annotated hex dump.
    pub hex_dump: String,
    /// Empty on success.
    pub error: String,
}

impl JobEvent {
    pub fn from_draft(id: JobId, draft: JobDraft) -> Self {
        Self {
            id,
            time: draft.time,
            printer: draft.printer,
            bytes: draft.bytes,
            brf_text: draft.brf_text,
            hex_dump: draft.hex_dump,
            error: draft.error,
        }
    }

    pub fn succeeded(&self) -> bool {
        self.error.is_empty()
    }
}
