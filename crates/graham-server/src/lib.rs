// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Graham Bridge HTTP service.
//
// The service listens on 127.0.0.1 only. CORS is wide open because the
// browser editor runs on arbitrary origins; the loopback bind is the
// security boundary, not the CORS policy.

pub mod cli;
pub mod console;
pub mod cors;
pub mod routes;
pub mod stream;

pub use routes::{AppState, AppStateInner, router};
