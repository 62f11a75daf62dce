use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, Utc};
use event_bus::types::totals::AnalysisTotals;
use serde::{Deserialize, Serialize};

use crate::model::MissingEntity;
use crate::program::ProgramDatabase;

/// Running totals of one analysis session. They only grow; a new session starts from zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counters {
    pub indexed_classes: usize,
    pub indexed_methods: usize,
    pub indexed_fields: usize,
    /// Every instruction visited by the linker, `nop` operands included.
    pub instructions: usize,
    pub method_calls: usize,
    pub field_calls: usize,
}

impl From<Counters> for AnalysisTotals {
    fn from(counters: Counters) -> Self {
        AnalysisTotals {
            indexed_classes: counters.indexed_classes,
            indexed_methods: counters.indexed_methods,
            indexed_fields: counters.indexed_fields,
            instructions: counters.instructions,
            method_calls: counters.method_calls,
            field_calls: counters.field_calls,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatisticsMetadata {
    pub analyzer_version: String,
    pub timestamp: DateTime<Utc>,
    pub session_id: String,
    pub analysis_duration_seconds: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseSizes {
    pub classes: usize,
    pub fields: usize,
    pub methods: usize,
    pub packages: usize,
    pub calls: usize,
    pub strings: usize,
    pub missing: usize,
    pub parse_errors: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingBreakdown {
    pub classes: usize,
    pub fields: usize,
    pub methods: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisStatistics {
    pub metadata: StatisticsMetadata,
    pub counters: Counters,
    pub sizes: DatabaseSizes,
    pub missing: MissingBreakdown,
}

impl AnalysisStatistics {
    pub fn new(
        session_id: String,
        duration: Duration,
        counters: Counters,
        db: &ProgramDatabase,
    ) -> Self {
        let mut missing = MissingBreakdown::default();
        for entity in db.missing() {
            match entity {
                MissingEntity::Class(_) => missing.classes += 1,
                MissingEntity::Field(_) => missing.fields += 1,
                MissingEntity::Method(_) => missing.methods += 1,
            }
        }

        Self {
            metadata: StatisticsMetadata {
                analyzer_version: env!("CARGO_PKG_VERSION").to_string(),
                timestamp: Utc::now(),
                session_id,
                analysis_duration_seconds: duration.as_secs_f64(),
            },
            counters,
            sizes: DatabaseSizes {
                classes: db.classes().len(),
                fields: db.fields().len(),
                methods: db.methods().len(),
                packages: db.packages().len(),
                calls: db.calls().len(),
                strings: db.strings().len(),
                missing: db.missing().len(),
                parse_errors: db.parse_errors().len(),
            },
            missing,
        }
    }

    pub fn export_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}
