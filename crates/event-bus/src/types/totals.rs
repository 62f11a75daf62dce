use serde::{Deserialize, Serialize};

/// Running totals of a session, copied into completion events for progress reporting.
#[derive(Serialize, Deserialize, Default, Clone, Copy, Debug, PartialEq, Eq)]
pub struct AnalysisTotals {
    pub indexed_classes: usize,
    pub indexed_methods: usize,
    pub indexed_fields: usize,
    pub instructions: usize,
    pub method_calls: usize,
    pub field_calls: usize,
}
