// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Per-family embosser framing.
//
// Some embossers boot into a graphics mode and need a vendor mode-switch
// sequence before the BRF payload, plus a form feed to close the job. The
// family is picked from the queue name; unknown queues get the payload as is.

use std::borrow::Cow;

use graham_core::config::EmbosserProfileConfig;
use graham_core::error::Result;
use tracing::debug;

/// ASCII form feed: end of page / end of job for most embossers.
pub const FORM_FEED: u8 = 0x0c;

/// `ESC @`: printer reset. Drops the device back into text mode.
pub const ESC_RESET: [u8; 2] = [0x1b, 0x40];

/// Framing rule for one embosser family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbosserProfile {
    pub family: String,
    /// Lowercase substring matched against the lowercased queue name.
    pattern: String,
    pub preamble: Vec<u8>,
    pub trailer: Vec<u8>,
}

impl EmbosserProfile {
    pub fn new(
        family: impl Into<String>,
        pattern: &str,
        preamble: Vec<u8>,
        trailer: Vec<u8>,
    ) -> Self {
        Self {
            family: family.into(),
            pattern: pattern.to_lowercase(),
            preamble,
            trailer,
        }
    }

    fn matches(&self, printer_lower: &str) -> bool {
        printer_lower.contains(&self.pattern)
    }

    fn is_passthrough(&self) -> bool {
        self.preamble.is_empty() && self.trailer.is_empty()
    }
}

/// Ordered list of profiles; first match wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbosserTable {
    profiles: Vec<EmbosserProfile>,
}

impl Default for EmbosserTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl EmbosserTable {
    /// Families known to need framing.
    pub fn builtin() -> Self {
        Self {
            profiles: vec![
                EmbosserProfile::new("ViewPlus", "viewplus", ESC_RESET.to_vec(), vec![FORM_FEED]),
                EmbosserProfile::new("Index", "index", Vec::new(), vec![FORM_FEED]),
            ],
        }
    }

    /// Build from configuration; an empty list keeps the built-in table.
    pub fn from_config(entries: &[EmbosserProfileConfig]) -> Result<Self> {
        if entries.is_empty() {
            return Ok(Self::builtin());
        }
        let profiles = entries
            .iter()
            .map(|entry| {
                Ok(EmbosserProfile::new(
                    entry.family.clone(),
                    &entry.name_pattern,
                    entry.preamble()?,
                    entry.trailer()?,
                ))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { profiles })
    }

    pub fn profile_for(&self, printer: &str) -> Option<&EmbosserProfile> {
        let lower = printer.to_lowercase();
        self.profiles.iter().find(|p| p.matches(&lower))
    }

    /// Wrap `data` in the preamble/trailer of the queue's family.
    ///
    /// Borrows when there is nothing to add so large jobs are not copied.
    pub fn frame<'a>(&self, printer: &str, data: &'a [u8]) -> Cow<'a, [u8]> {
        match self.profile_for(printer) {
            Some(profile) if !profile.is_passthrough() => {
                debug!(
                    printer,
                    family = %profile.family,
                    preamble = profile.preamble.len(),
                    trailer = profile.trailer.len(),
                    "applying embosser framing"
                );
                let mut framed =
                    Vec::with_capacity(profile.preamble.len() + data.len() + profile.trailer.len());
                framed.extend_from_slice(&profile.preamble);
                framed.extend_from_slice(data);
                framed.extend_from_slice(&profile.trailer);
                Cow::Owned(framed)
            }
            _ => Cow::Borrowed(data),
        }
    }
}
