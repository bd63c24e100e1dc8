// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// `GET /log-stream`: Server-Sent Events of job events, replay then live.
//
// The journal subscription lives inside the response stream. When the client
// disconnects axum drops the stream, the subscription drops with it and its
// mailbox is unregistered.

use std::convert::Infallible;
use std::time::Duration;

use async_stream::stream;
use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures_util::Stream;
use graham_print::Subscription;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::routes::AppState;

const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(15);

pub async fn log_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let subscription = state.service.journal().subscribe();
    Sse::new(job_events(subscription, state.shutdown.clone()))
        .keep_alive(KeepAlive::new().interval(KEEP_ALIVE_INTERVAL))
}

/// One `data: <JobEvent JSON>` frame per event until shutdown.
pub fn job_events(
    mut subscription: Subscription,
    mut shutdown: watch::Receiver<bool>,
) -> impl Stream<Item = Result<Event, Infallible>> {
    stream! {
        loop {
            let next = tokio::select! {
                event = subscription.next() => event,
                () = shutdown_requested(&mut shutdown) => None,
            };
            let Some(event) = next else {
                debug!(subscriber = subscription.id(), "log stream closing");
                break;
            };
            match Event::default().json_data(&event) {
                Ok(frame) => yield Ok(frame),
                Err(e) => warn!(id = event.id, error = %e, "could not encode job event"),
            }
        }
    }
}

/// Resolves once the shutdown flag is set. A dropped sender never resolves.
async fn shutdown_requested(shutdown: &mut watch::Receiver<bool>) {
    while !*shutdown.borrow_and_update() {
        if shutdown.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}
