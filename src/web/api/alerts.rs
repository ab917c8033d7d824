use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use futures::Stream;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::watch;

use crate::web::state::AppState;

#[utoipa::path(
    get,
    path = "/api/alerts",
    tag = "alerts",
    responses((status = 200, description = "Server-sent `alert` events, one JSON Alert each"))
)]
pub async fn stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let alerts = state.dashboard.subscribe_alerts();
    let shutdown = state.shutdown.clone();

    // Ends on shutdown so graceful shutdown is not held open by subscribers.
    let events = futures::stream::unfold(
        (alerts, shutdown),
        |(mut alerts, mut shutdown)| async move {
            loop {
                let received = tokio::select! {
                    received = alerts.recv() => received,
                    _ = stopping(&mut shutdown) => return None,
                };
                match received {
                    Ok(alert) => {
                        let event = Event::default().event("alert").json_data(&alert);
                        return Some((event, (alerts, shutdown)));
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        log::warn!("alert stream lagged, {} alerts dropped", skipped);
                    }
                    Err(RecvError::Closed) => return None,
                }
            }
        },
    );

    Sse::new(events).keep_alive(KeepAlive::default())
}

/// Resolves once shutdown is requested. Never resolves if the signal is gone.
async fn stopping(shutdown: &mut watch::Receiver<bool>) {
    let requested = shutdown.wait_for(|stopping| *stopping).await.is_ok();
    if !requested {
        std::future::pending::<()>().await;
    }
}
