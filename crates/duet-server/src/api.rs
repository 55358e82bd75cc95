use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::response::Json;
use serde::Deserialize;

use duet_core::role::Role;
use duet_core::signal::SignalKind;
use duet_race::RacerUpdate;
use duet_tables::moves::{Destination, Source};

use crate::error::AppError;
use crate::room::Room;
use crate::state::AppState;

const MAX_ROOM_ID_LEN: usize = 64;
const MAX_PARTICIPANT_ID_LEN: usize = 128;
const MAX_ITEM_ID_LEN: usize = 64;

/// `?roomId=` on the read and stream endpoints.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomQuery {
    pub room_id: Option<String>,
}

/// Body of `POST /api/room`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionRequest {
    #[serde(default)]
    pub room_id: Option<String>,
    pub participant_id: String,
    #[serde(flatten)]
    pub action: RoomAction,
}

/// The action-specific part of a request, tagged by `action`.
#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum RoomAction {
    Join {
        role: Role,
    },
    Leave,
    SyncRacer {
        role: Role,
        #[serde(default)]
        state: RacerUpdate,
    },
    CollectItem {
        role: Role,
        item_id: String,
    },
    Roll {
        role: Role,
    },
    Move {
        role: Role,
        from: Source,
        to: Destination,
    },
    Restart {
        role: Role,
    },
    Signal {
        role: Role,
        to_participant_id: String,
        #[serde(rename = "type")]
        kind: SignalKind,
        #[serde(default)]
        payload: serde_json::Value,
    },
}

impl RoomAction {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Join { .. } => "join",
            Self::Leave => "leave",
            Self::SyncRacer { .. } => "syncRacer",
            Self::CollectItem { .. } => "collectItem",
            Self::Roll { .. } => "roll",
            Self::Move { .. } => "move",
            Self::Restart { .. } => "restart",
            Self::Signal { .. } => "signal",
        }
    }
}

/// Rules every room id must satisfy, including the configured default.
pub fn check_room_id(id: &str) -> Result<(), String> {
    if id.is_empty() {
        return Err("must not be empty".to_string());
    }
    if id.chars().count() > MAX_ROOM_ID_LEN {
        return Err(format!("exceeds {MAX_ROOM_ID_LEN} chars"));
    }
    if id.chars().any(char::is_control) {
        return Err("contains control characters".to_string());
    }
    Ok(())
}

/// Trimmed room id, or `default` when none was given.
pub fn resolve_room_id(requested: Option<&str>, default: &str) -> Result<String, AppError> {
    let id = requested.unwrap_or(default).trim();
    check_room_id(id).map_err(|e| AppError::InvalidRequest(format!("roomId {e}")))?;
    Ok(id.to_string())
}

fn validate_participant(field: &str, id: &str) -> Result<(), AppError> {
    if id.is_empty() {
        return Err(AppError::InvalidRequest(format!("{field} must not be empty")));
    }
    if id.chars().count() > MAX_PARTICIPANT_ID_LEN {
        return Err(AppError::InvalidRequest(format!(
            "{field} exceeds {MAX_PARTICIPANT_ID_LEN} chars"
        )));
    }
    Ok(())
}

/// Trim surrounding whitespace from participant ids so `"alice "` and
/// `"alice"` name the same seat holder.
fn normalize_request(req: &mut ActionRequest) {
    trim_in_place(&mut req.participant_id);
    if let RoomAction::Signal {
        to_participant_id, ..
    } = &mut req.action
    {
        trim_in_place(to_participant_id);
    }
}

fn trim_in_place(value: &mut String) {
    let trimmed = value.trim();
    if trimmed.len() != value.len() {
        *value = trimmed.to_string();
    }
}

/// Field checks serde cannot express.
fn validate_request(req: &ActionRequest, max_payload_bytes: usize) -> Result<(), AppError> {
    validate_participant("participantId", &req.participant_id)?;
    match &req.action {
        RoomAction::CollectItem { item_id, .. } if item_id.len() > MAX_ITEM_ID_LEN => Err(
            AppError::InvalidRequest(format!("itemId exceeds {MAX_ITEM_ID_LEN} chars")),
        ),
        RoomAction::Signal {
            to_participant_id,
            payload,
            ..
        } => {
            validate_participant("toParticipantId", to_participant_id)?;
            let size = serde_json::to_vec(payload)
                .map_err(|e| AppError::InvalidRequest(format!("payload not serializable: {e}")))?
                .len();
            if size > max_payload_bytes {
                return Err(AppError::InvalidRequest(format!(
                    "payload exceeds {max_payload_bytes} bytes"
                )));
            }
            Ok(())
        },
        _ => Ok(()),
    }
}

/// GET /api/room: current snapshot without mutation.
pub async fn get_room(
    State(state): State<AppState>,
    Query(query): Query<RoomQuery>,
) -> Result<Json<Room>, AppError> {
    let room_id = resolve_room_id(query.room_id.as_deref(), &state.config.default_room_id)?;
    let mut rooms = state.rooms.write().await;
    Ok(Json(rooms.snapshot(&room_id)))
}

/// POST /api/room: apply one action and return the resulting snapshot.
pub async fn post_action(
    State(state): State<AppState>,
    body: Result<Json<ActionRequest>, JsonRejection>,
) -> Result<Json<Room>, AppError> {
    let Json(mut req) = body.map_err(|e| AppError::InvalidRequest(e.body_text()))?;
    let room_id = resolve_room_id(req.room_id.as_deref(), &state.config.default_room_id)?;
    normalize_request(&mut req);
    validate_request(&req, state.config.limits.max_signal_payload_bytes)?;

    let action = req.action.name();
    let participant = req.participant_id.as_str();

    // Publish under the write lock so subscribers see snapshots in mutation order.
    let mut rooms = state.rooms.write().await;
    let result = match req.action {
        RoomAction::Join { role } => rooms.join(&room_id, role, participant),
        RoomAction::Leave => rooms.leave(&room_id, participant),
        RoomAction::SyncRacer { role, state: update } => {
            rooms.sync_racer(&room_id, role, participant, &update)
        },
        RoomAction::CollectItem { role, item_id } => {
            rooms.collect_item(&room_id, role, participant, &item_id)
        },
        RoomAction::Roll { role } => rooms.roll(&room_id, role, participant),
        RoomAction::Move { role, from, to } => {
            rooms.play_move(&room_id, role, participant, from, to)
        },
        RoomAction::Restart { role } => rooms.restart(&room_id, role, participant),
        RoomAction::Signal {
            role,
            to_participant_id,
            kind,
            payload,
        } => rooms.relay_signal(&room_id, role, participant, &to_participant_id, kind, payload),
    };

    let outcome = result.inspect_err(|e| {
        tracing::debug!(room = %room_id, participant, action, error = %e, "Action rejected");
    })?;
    if outcome.mutated {
        let delivered = state.broadcaster.publish(&outcome.room);
        tracing::debug!(room = %room_id, action, delivered, "Published snapshot");
    }
    drop(rooms);

    Ok(Json(outcome.room))
}
