use std::fs;
use std::path::Path;
use std::time::Instant;

use chrono::Utc;
use event_bus::types::session_info::SessionInfo;
use event_bus::{
    AnalysisEvent, BatchAnalysisCompleted, BatchAnalysisEvent, BatchAnalysisFailed,
    BatchAnalysisStarted, EventBus, source_label,
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::batch::BatchDatabase;
use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::linking::InstructionLinker;
use crate::merge::{MergeReport, Merger};
use crate::model::{ClassId, FieldRef, FieldView, MethodId, MethodRef, MethodView, Tag, TagCategory};
use crate::parsing::{ClassFileSource, ClassParser};
use crate::program::ProgramDatabase;
use crate::resolution::Resolver;
use crate::stats::{AnalysisStatistics, Counters};
use crate::tagging::{EntityRef, TaggableCollection};

/// One analysis session: the accumulated program model, its running totals
/// and the notification hook fired around every batch.
///
/// Callers serialize access; a merge must not overlap with queries.
pub struct Analyzer {
    session_id: String,
    config: AnalysisConfig,
    db: ProgramDatabase,
    counters: Counters,
    event_bus: Option<EventBus>,
    started_at: Instant,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new(AnalysisConfig::default())
    }
}

impl Analyzer {
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            session_id: Uuid::new_v4().to_string(),
            config,
            db: ProgramDatabase::new(),
            counters: Counters::default(),
            event_bus: None,
            started_at: Instant::now(),
        }
    }

    pub fn with_event_bus(mut self, event_bus: EventBus) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn database(&self) -> &ProgramDatabase {
        &self.db
    }

    pub fn counters(&self) -> Counters {
        self.counters
    }

    pub fn session_info(&self) -> SessionInfo {
        SessionInfo {
            session_id: self.session_id.clone(),
            known_classes: self.db.classes().len(),
            known_methods: self.db.methods().len(),
            known_fields: self.db.fields().len(),
        }
    }

    /// Merges `batch` into the program model. Resolution and linking are
    /// best-effort, so this never fails; anomalies are logged.
    pub fn analyze_batch(&mut self, batch: BatchDatabase) -> MergeReport {
        let source = source_label(batch.source.as_deref());
        self.notify(BatchAnalysisEvent::Started(BatchAnalysisStarted {
            session: self.session_info(),
            source: source.clone(),
            classes_to_merge: batch.len(),
            started_at: Utc::now(),
        }));

        let report = Merger::new(&mut self.db, &mut self.counters, &self.config).merge(batch);

        self.notify(BatchAnalysisEvent::Completed(BatchAnalysisCompleted {
            session: self.session_info(),
            source,
            classes_added: report.classes_added,
            classes_overridden: report.classes_overridden,
            methods_linked: report.methods_linked,
            totals: self.counters.into(),
            completed_at: Utc::now(),
        }));
        report
    }

    /// Parses every accepted file below `path` and merges the result as one batch.
    /// Files that cannot be read or parsed are skipped.
    pub fn analyze_path<P: ClassParser>(&mut self, path: &Path, parser: &P) -> Result<MergeReport> {
        let source = match ClassFileSource::from_path(path, &self.config) {
            Ok(source) => source,
            Err(e) => {
                self.notify(BatchAnalysisEvent::Failed(BatchAnalysisFailed {
                    session: self.session_info(),
                    source: source_label(Some(path)),
                    error: e.to_string(),
                    failed_at: Utc::now(),
                }));
                return Err(e);
            }
        };
        info!(path = %path.display(), files = source.files.len(), "Analyzing path");

        let mut batch = BatchDatabase::with_source(path);
        for file in &source.files {
            let content = match fs::read_to_string(file) {
                Ok(content) => content,
                Err(e) => {
                    warn!(file = %file.display(), "Could not read class file: {}", e);
                    continue;
                }
            };
            match parser.parse(&content) {
                Ok(unit) => batch.add_class(unit),
                Err(e) => warn!(file = %file.display(), "Could not parse class file: {}", e),
            }
        }

        Ok(self.analyze_batch(batch))
    }

    /// Registers an empty class that is known to exist but was never parsed.
    pub fn add_class_from_fqcn(&mut self, fqcn: &str) -> ClassId {
        self.db.add_class(fqcn)
    }

    pub fn resolve_type(&mut self, fqcn: &str) -> ClassId {
        Resolver::new(&mut self.db).resolve_type(fqcn)
    }

    pub fn resolve_field(&mut self, reference: &FieldRef) -> FieldView {
        Resolver::new(&mut self.db).resolve_field(reference)
    }

    pub fn resolve_method(&mut self, reference: &MethodRef, is_static_call: bool) -> MethodView {
        Resolver::new(&mut self.db).resolve_method(reference, is_static_call)
    }

    pub fn link_method(&mut self, method: MethodId) -> Result<()> {
        InstructionLinker::new(&mut self.db, &mut self.counters)
            .with_slow_threshold(self.config.slow_method_threshold_ms)
            .link_method(method)
    }

    pub fn tag_all(&mut self, tag: impl Into<Tag>) -> usize {
        self.db.tag_all(&tag.into())
    }

    pub fn tag_all_as_internal(&mut self) -> usize {
        self.db.tag_all_as_internal()
    }

    pub fn tag_all_if<P>(&mut self, predicate: P, tag: impl Into<Tag>) -> usize
    where
        P: FnMut(&str, EntityRef<'_>) -> bool,
    {
        self.db.tag_all_if(predicate, &tag.into())
    }

    pub fn tag_if<P>(&mut self, collection: TaggableCollection, predicate: P, tag: impl Into<Tag>) -> usize
    where
        P: FnMut(&str, EntityRef<'_>) -> bool,
    {
        self.db.tag_if(collection, predicate, &tag.into())
    }

    pub fn add_tag_category(&mut self, name: &str, tags: Vec<String>) {
        self.db.add_tag_category(name, tags);
    }

    pub fn tag_categories(&self) -> impl Iterator<Item = &TagCategory> {
        self.db.tag_categories().values()
    }

    pub fn statistics(&self) -> AnalysisStatistics {
        AnalysisStatistics::new(
            self.session_id.clone(),
            self.started_at.elapsed(),
            self.counters,
            &self.db,
        )
    }

    fn notify(&self, event: BatchAnalysisEvent) {
        if let Some(bus) = &self.event_bus {
            bus.send(&AnalysisEvent::Batch(event));
        }
    }
}
