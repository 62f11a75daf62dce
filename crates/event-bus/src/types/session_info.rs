use serde::{Deserialize, Serialize};

/// Identifies the analysis session that produced an event, with the size of its
/// accumulated program model at the time the event was sent.
#[derive(Serialize, Deserialize, Default, Clone, Debug, PartialEq, Eq)]
pub struct SessionInfo {
    pub session_id: String,
    pub known_classes: usize,
    pub known_methods: usize,
    pub known_fields: usize,
}
