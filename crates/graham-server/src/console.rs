// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The diagnostic console served at `/`.
//
// A single self-contained page: it polls `/status`, lists `/printers`, can
// send a `/testprint`, and renders the live `/log-stream`.

pub const CONSOLE_HTML: &str = include_str!("../assets/console.html");
