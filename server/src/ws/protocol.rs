//! Wire format for live updates pushed to WebSocket clients.
//!
//! Every frame is a JSON text message `{"action": ..., "data": ...}`. Clients
//! branch on `action`: `create` and `update` carry a full event projection,
//! `delete` carries only `{"event_id": n}`.

use serde::{Deserialize, Serialize};

use crate::events::projection::EventPublic;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Create,
    Update,
    Delete,
}

/// Payload of a notification, resolved by the mutation that produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum NotificationData {
    Event(EventPublic),
    Removed { event_id: i64 },
}

/// A state change broadcast to every live connection after a committed mutation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub action: Action,
    pub data: NotificationData,
}

impl Notification {
    pub fn created(event: EventPublic) -> Self {
        Self {
            action: Action::Create,
            data: NotificationData::Event(event),
        }
    }

    pub fn updated(event: EventPublic) -> Self {
        Self {
            action: Action::Update,
            data: NotificationData::Event(event),
        }
    }

    pub fn deleted(event_id: i64) -> Self {
        Self {
            action: Action::Delete,
            data: NotificationData::Removed { event_id },
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
