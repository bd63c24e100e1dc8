// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Graham Bridge — OS print backends.
//
// This crate is the single place where job bytes cross into the operating
// system's print subsystem. The backend is chosen at compile time: CUPS on
// Unix, the Win32 spooler on Windows, a stub everywhere else.

pub mod embosser;
pub mod stub;
pub mod traits;

#[cfg(unix)]
pub mod cups;

#[cfg(windows)]
pub mod spooler;

pub use embosser::{EmbosserProfile, EmbosserTable};
pub use traits::PrintBackend;

use graham_core::config::BridgeConfig;
use graham_core::error::Result;

/// Build the backend for the target operating system from configuration.
///
/// RETURNS: a boxed trait object so callers never name the concrete type.
pub fn platform_backend(config: &BridgeConfig) -> Result<Box<dyn PrintBackend>> {
    let embossers = EmbosserTable::from_config(&config.embossers)?;

    #[cfg(unix)]
    {
        Ok(Box::new(cups::CupsBackend::new(
            config.lp_command.clone(),
            config.lpstat_command.clone(),
            embossers,
        )))
    }
    #[cfg(windows)]
    {
        Ok(Box::new(spooler::SpoolerBackend::new(embossers)))
    }
    #[cfg(not(any(unix, windows)))]
    {
        let _ = embossers;
        Ok(Box::new(stub::StubBackend))
    }
}
