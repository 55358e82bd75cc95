use std::convert::Infallible;
use std::time::Duration;

use axum::extract::{Query, State};
use axum::response::sse::{Event as SseEvent, Sse};
use futures::stream::Stream;
use tokio::time::{Instant, interval_at};
use tokio_stream::StreamExt;
use tokio_stream::wrappers::{IntervalStream, WatchStream};

use crate::api::{RoomQuery, resolve_room_id};
use crate::broadcast::Snapshot;
use crate::error::AppError;
use crate::state::{AppState, ConnectionGuard};

enum Frame {
    State(Snapshot),
    Ping,
}

impl Frame {
    fn into_event(self) -> SseEvent {
        match self {
            Frame::State(json) => SseEvent::default().event("state").data(json.as_ref()),
            Frame::Ping => SseEvent::default().event("ping").data("{}"),
        }
    }
}

/// GET /api/room/events: `state` on connect and after every change, plus a
/// periodic `ping`.
pub async fn room_events(
    State(state): State<AppState>,
    Query(query): Query<RoomQuery>,
) -> Result<Sse<impl Stream<Item = Result<SseEvent, Infallible>>>, AppError> {
    let room_id = resolve_room_id(query.room_id.as_deref(), &state.config.default_room_id)?;

    let max_sse = state.config.limits.max_sse_subscribers;
    let Some(guard) = ConnectionGuard::try_acquire(&state.sse_subscriber_count, max_sse) else {
        tracing::warn!(max = max_sse, "SSE subscriber limit reached");
        return Err(AppError::Unavailable(
            "Too many event stream subscribers".to_string(),
        ));
    };

    // Read the snapshot and subscribe under one lock so no publish slips between.
    let (subscription, rx) = {
        let mut rooms = state.rooms.write().await;
        let initial: Snapshot = serde_json::to_string(&rooms.snapshot(&room_id))
            .map_err(|e| AppError::Internal(format!("failed to serialize room: {e}")))?
            .into();
        state.broadcaster.subscribe(&room_id, initial)
    };

    let period = Duration::from_secs(state.config.stream.keep_alive_secs);
    let pings = IntervalStream::new(interval_at(Instant::now() + period, period)).map(|_| Frame::Ping);
    // Yields the current snapshot first, then the newest one after each publish.
    let states = WatchStream::new(rx).map(Frame::State);

    let stream = states.merge(pings).map(move |frame| {
        let _held = (&guard, &subscription);
        Ok(frame.into_event())
    });

    Ok(Sse::new(stream))
}
