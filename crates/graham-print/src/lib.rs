// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Graham Print — the job event journal and the print pipeline that ties the
// OS backend from `graham-bridge` to it.

pub mod journal;
pub mod service;
pub mod test_page;

pub use journal::{JobJournal, Subscription};
pub use service::{JobOutcome, PrintService};
pub use test_page::TEST_PAGE;
