//! Server-Sent Events stream for live proposal updates
//!
//! Subscribers receive `proposal-received` events as they happen; there is
//! no replay for late subscribers.

use std::time::Duration;

use actix_web::{get, web, HttpResponse};
use futures::stream::{self, StreamExt};
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::{BroadcastStream, IntervalStream};

use crate::service::EventBroadcaster;

const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(15);

/// Subscribe to live proposal events
#[utoipa::path(
    get,
    path = "/api/events",
    responses(
        (status = 200, description = "text/event-stream of proposal-received events")
    ),
    tag = "events"
)]
#[get("/api/events")]
pub async fn stream_events(events: web::Data<EventBroadcaster>) -> HttpResponse {
    let receiver = events.subscribe();

    let event_stream = BroadcastStream::new(receiver).filter_map(|event| {
        futures::future::ready(match event {
            Ok(event) => match serde_json::to_string(&event) {
                Ok(data) => Some(Ok::<web::Bytes, actix_web::Error>(web::Bytes::from(
                    format!("event: proposal-received\ndata: {data}\n\n"),
                ))),
                Err(e) => {
                    tracing::error!(error = %e, "Failed to serialize proposal event");
                    None
                }
            },
            Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Event subscriber lagged; missed events are dropped");
                None
            }
        })
    });

    let keep_alive = IntervalStream::new(tokio::time::interval(KEEP_ALIVE_INTERVAL)).map(|_| {
        Ok::<web::Bytes, actix_web::Error>(web::Bytes::from_static(b": keep-alive\n\n"))
    });

    HttpResponse::Ok()
        .content_type("text/event-stream")
        .insert_header(("Cache-Control", "no-cache"))
        .streaming(stream::select(event_stream, keep_alive))
}

/// Configure the event stream route
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(stream_events);
}
