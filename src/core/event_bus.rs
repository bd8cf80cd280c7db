use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::mpsc;

use crate::domain::execution::BlockStatus;

/// Journey events: state transitions observed by the engine, in order.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JourneyEvent {
    /// Block entered.
    BlockEntered {
        run_id: String,
        block_id: String,
        attempt: u32,
        timestamp: DateTime<Utc>,
    },

    /// Block finished (completed, failed or skipped).
    BlockFinished {
        run_id: String,
        block_id: String,
        status: BlockStatus,
        score: Option<f64>,
        timestamp: DateTime<Utc>,
    },

    /// Outgoing edge chosen.
    EdgeSelected {
        run_id: String,
        from: String,
        to: String,
        timestamp: DateTime<Utc>,
    },

    RunCompleted {
        run_id: String,
        timestamp: DateTime<Utc>,
    },

    RunAbandoned {
        run_id: String,
        reason: String,
        timestamp: DateTime<Utc>,
    },
}

impl JourneyEvent {
    pub fn run_id(&self) -> &str {
        match self {
            JourneyEvent::BlockEntered { run_id, .. }
            | JourneyEvent::BlockFinished { run_id, .. }
            | JourneyEvent::EdgeSelected { run_id, .. }
            | JourneyEvent::RunCompleted { run_id, .. }
            | JourneyEvent::RunAbandoned { run_id, .. } => run_id,
        }
    }
}

/// Event sender.
pub type EventSender = mpsc::UnboundedSender<JourneyEvent>;

/// Event receiver.
pub type EventReceiver = mpsc::UnboundedReceiver<JourneyEvent>;

/// Create an event channel.
pub fn create_event_channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}

/// Convert a unix-seconds timestamp from a [`TimeProvider`](super::TimeProvider).
pub fn timestamp_from_secs(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_event_channel_delivers_in_order() {
        let (tx, mut rx) = create_event_channel();
        let ts = timestamp_from_secs(1_700_000_000);
        tx.send(JourneyEvent::BlockEntered {
            run_id: "r1".into(),
            block_id: "intro".into(),
            attempt: 1,
            timestamp: ts,
        })
        .unwrap();
        tx.send(JourneyEvent::RunCompleted {
            run_id: "r1".into(),
            timestamp: ts,
        })
        .unwrap();

        let first = rx.recv().await.unwrap();
        assert!(matches!(first, JourneyEvent::BlockEntered { attempt: 1, .. }));
        let second = rx.recv().await.unwrap();
        assert_eq!(second.run_id(), "r1");
        assert!(matches!(second, JourneyEvent::RunCompleted { .. }));
    }

    #[test]
    fn test_event_serialization() {
        let event = JourneyEvent::EdgeSelected {
            run_id: "r1".into(),
            from: "quiz".into(),
            to: "review".into(),
            timestamp: timestamp_from_secs(0),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "edge_selected");
        assert_eq!(json["to"], "review");
    }
}
