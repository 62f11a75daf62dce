//! # Analysis Event Bus
//!
//! Broadcasts structured notifications around each batch analysis run so that
//! query and reporting layers can refresh their view of the program model.
//!
//! ## Event Flow
//!
//! ```text
//! ┌─────────────────┐    ┌──────────────┐    ┌─────────────────┐
//! │   Analyzer      │    │  Event Bus   │    │   Consumers     │
//! │                 │───▶│  (Broadcast) │───▶│   • Query layer │
//! │ • Batch started │    │              │    │   • Reporting   │
//! │ • Batch done    │    │              │    │                 │
//! │ • Batch failed  │    │              │    │                 │
//! └─────────────────┘    └──────────────┘    └─────────────────┘
//! ```
//!
//! ## Event-Bus vs Logging
//!
//! Logging describes *what the analyzer is doing*. Events describe *what a batch
//! has produced*, with enough state for a consumer to act on it.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::{self, Sender};

use crate::types::{session_info::SessionInfo, totals::AnalysisTotals};
pub mod types;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "payload")]
pub enum AnalysisEvent {
    Batch(BatchAnalysisEvent),
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status")]
pub enum BatchAnalysisEvent {
    Started(BatchAnalysisStarted),
    Completed(BatchAnalysisCompleted),
    Failed(BatchAnalysisFailed),
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct BatchAnalysisStarted {
    pub session: SessionInfo,
    pub source: Option<String>,
    pub classes_to_merge: usize,
    pub started_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct BatchAnalysisCompleted {
    pub session: SessionInfo,
    pub source: Option<String>,
    pub classes_added: usize,
    pub classes_overridden: usize,
    pub methods_linked: usize,
    pub totals: AnalysisTotals,
    pub completed_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct BatchAnalysisFailed {
    pub session: SessionInfo,
    pub source: Option<String>,
    pub error: String,
    pub failed_at: DateTime<Utc>,
}

pub fn source_label(source: Option<&Path>) -> Option<String> {
    source.map(|path| path.to_string_lossy().to_string())
}

#[derive(Clone, Debug)]
pub struct EventBus {
    sender: Sender<AnalysisEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(1024);
        Self { sender }
    }

    pub fn send(&self, event: &AnalysisEvent) {
        if self.sender.send(event.clone()).is_err() {
            // No receivers: nobody is listening, which is fine.
            tracing::info!("No receivers for event bus, ignoring event: {:?}", &event);
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AnalysisEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started() -> AnalysisEvent {
        AnalysisEvent::Batch(BatchAnalysisEvent::Started(BatchAnalysisStarted {
            session: SessionInfo {
                session_id: "session-1".to_string(),
                ..Default::default()
            },
            source: Some("/tmp/app".to_string()),
            classes_to_merge: 3,
            started_at: Utc::now(),
        }))
    }

    #[tokio::test]
    async fn test_subscriber_receives_events_in_order() {
        let bus = EventBus::new();
        let mut receiver = bus.subscribe();

        let event = started();
        bus.send(&event);

        let received = receiver.recv().await.expect("event should be delivered");
        assert_eq!(received, event);
    }

    #[test]
    fn test_send_without_subscribers_is_not_an_error() {
        let bus = EventBus::default();
        bus.send(&started());
    }

    #[test]
    fn test_event_serializes_with_type_and_status_tags() {
        let json = serde_json::to_value(started()).unwrap();

        assert_eq!(json["type"], "Batch");
        assert_eq!(json["payload"]["status"], "Started");
        assert_eq!(json["payload"]["classes_to_merge"], 3);
    }
}
