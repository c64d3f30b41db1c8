use crate::models::{NotificationPayload, ProcessingItem};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Inbound message envelope. The server tags every frame with a `type`
/// field; anything this client does not recognize decodes as `Unknown` and
/// is ignored upstream.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    #[serde(rename = "processing_status")]
    ProcessingStatus { items: Vec<ProcessingItem> },
    #[serde(rename = "notification")]
    Notification { notification: NotificationPayload },
    #[serde(other)]
    Unknown,
}

/// Outbound messages. Fire-and-forget: no acknowledgement is expected for
/// either variant.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    #[serde(rename = "ping")]
    Ping,
    #[serde(rename = "delete_item")]
    DeleteItem {
        #[serde(rename = "itemId")]
        item_id: String,
    },
}

/// Decode one inbound frame. Malformed payloads are logged and dropped;
/// they never tear down the connection.
pub fn decode_frame(text: &str) -> Option<ServerMessage> {
    match serde_json::from_str::<ServerMessage>(text) {
        Ok(message) => Some(message),
        Err(err) => {
            warn!("Dropping undecodable frame: {}", err);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_processing_status() {
        let text = r#"{
            "type": "processing_status",
            "items": [{
                "id": "a",
                "title": "t",
                "type": "movie",
                "status": {
                    "cached": false, "added": false, "mounted": false,
                    "symlinked": false, "imported": false,
                    "status": "Downloading", "progress": 10
                },
                "progress": 10
            }]
        }"#;
        match decode_frame(text) {
            Some(ServerMessage::ProcessingStatus { items }) => {
                assert_eq!(items.len(), 1);
                assert_eq!(items[0].id, "a");
            }
            other => panic!("unexpected decode: {:?}", other),
        }
    }

    #[test]
    fn decodes_notification() {
        let text = r#"{
            "type": "notification",
            "notification": { "type": "error", "title": "Import failed", "message": "boom" }
        }"#;
        match decode_frame(text) {
            Some(ServerMessage::Notification { notification }) => {
                assert_eq!(notification.title, "Import failed");
            }
            other => panic!("unexpected decode: {:?}", other),
        }
    }

    #[test]
    fn unrecognized_type_is_ignored_not_an_error() {
        let decoded = decode_frame(r#"{"type": "heartbeat_ack"}"#);
        assert!(matches!(decoded, Some(ServerMessage::Unknown)));
    }

    #[test]
    fn malformed_json_is_dropped() {
        assert!(decode_frame("{not json").is_none());
    }

    #[test]
    fn client_messages_serialize_to_wire_format() {
        let ping = serde_json::to_string(&ClientMessage::Ping).unwrap();
        assert_eq!(ping, r#"{"type":"ping"}"#);

        let delete = serde_json::to_string(&ClientMessage::DeleteItem {
            item_id: "abc".into(),
        })
        .unwrap();
        assert_eq!(delete, r#"{"type":"delete_item","itemId":"abc"}"#);
    }
}
