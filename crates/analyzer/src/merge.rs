//! Folds a batch of freshly parsed classes into the accumulated database.
//!
//! Phase 1 settles identity, hierarchy, members and packages for the whole
//! batch. Only then does phase 2 link instructions, so a class resolving an
//! inherited member always sees the merged hierarchy of every other class in
//! the batch, whatever their iteration order.

use rustc_hash::FxHashSet;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::batch::{BatchDatabase, ClassUnit, FieldDef, MethodDef};
use crate::config::AnalysisConfig;
use crate::linking::InstructionLinker;
use crate::model::{Class, ClassId, Link, MethodId, MissingEntity, TypeLink};
use crate::program::ProgramDatabase;
use crate::resolution::Resolver;
use crate::stats::Counters;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MergeReport {
    pub classes_added: usize,
    pub classes_overridden: usize,
    pub methods_linked: usize,
    /// Re-merged classes whose declared superclass or interfaces changed.
    pub require_remap: Vec<String>,
}

struct BatchEntry {
    class: ClassId,
    overridden: bool,
    /// Declared superclass or interfaces changed on re-merge.
    remap: bool,
    unit: ClassUnit,
}

pub struct Merger<'a> {
    db: &'a mut ProgramDatabase,
    counters: &'a mut Counters,
    config: &'a AnalysisConfig,
}

impl<'a> Merger<'a> {
    pub fn new(
        db: &'a mut ProgramDatabase,
        counters: &'a mut Counters,
        config: &'a AnalysisConfig,
    ) -> Self {
        Self {
            db,
            counters,
            config,
        }
    }

    pub fn merge(&mut self, batch: BatchDatabase) -> MergeReport {
        let mut report = MergeReport::default();
        info!(classes = batch.len(), "Merging batch into program database");

        let mut entries = self.register_identities(batch, &mut report);

        let mut to_link: Vec<(ClassId, Vec<MethodId>)> = Vec::with_capacity(entries.len());
        for entry in &mut entries {
            let methods = if entry.overridden {
                self.reconcile(entry, &mut report)
            } else {
                self.populate(entry)
            };
            to_link.push((entry.class, methods));
        }

        for entry in &entries {
            self.db.attach_to_package(entry.class);
            let supers = self.linearize(entry.class);
            self.db.class_mut(entry.class).supers = supers;
        }
        let remapped: Vec<ClassId> = entries.iter().filter(|e| e.remap).map(|e| e.class).collect();
        if !remapped.is_empty() {
            self.remap_hierarchy(&remapped);
        }
        info!(classes = self.db.classes().len(), "Program database size");

        report.methods_linked = self.link(&to_link);

        info!(
            methods = self.counters.indexed_methods,
            fields = self.counters.indexed_fields,
            instructions = self.counters.instructions,
            method_calls = self.counters.method_calls,
            field_calls = self.counters.field_calls,
            "Batch merged"
        );
        report
    }

    /// Registers every unknown class of the batch before any hierarchy or
    /// member work, so references between batch classes find real classes
    /// instead of creating placeholders.
    fn register_identities(
        &mut self,
        batch: BatchDatabase,
        report: &mut MergeReport,
    ) -> Vec<BatchEntry> {
        let mut entries = Vec::with_capacity(batch.len());
        for (fqcn, unit) in batch.classes {
            match self.db.class_by_name(&fqcn) {
                Some(class) => {
                    debug!(fqcn = %fqcn, "Class already known, reconciling");
                    report.classes_overridden += 1;
                    entries.push(BatchEntry {
                        class,
                        overridden: true,
                        remap: false,
                        unit,
                    });
                }
                None => {
                    let class = self.db.class_arena.alloc(Class::from_unit(&unit));
                    self.db.classes.insert(fqcn, class);
                    report.classes_added += 1;
                    self.counters.indexed_classes += 1;
                    entries.push(BatchEntry {
                        class,
                        overridden: false,
                        remap: false,
                        unit,
                    });
                }
            }
        }
        entries
    }

    /// First definition of a class: resolve its declared hierarchy and attach its members.
    fn populate(&mut self, entry: &mut BatchEntry) -> Vec<MethodId> {
        let class = entry.class;
        let mut resolver = Resolver::new(self.db);
        let extends = entry
            .unit
            .extends
            .as_deref()
            .map(|name| Link::Resolved(resolver.resolve_type(name)));
        let implements: Vec<TypeLink> = entry
            .unit
            .implements
            .iter()
            .map(|name| Link::Resolved(resolver.resolve_type(name)))
            .collect();

        let target = self.db.class_mut(class);
        target.extends = extends;
        target.implements = implements;

        for def in std::mem::take(&mut entry.unit.fields) {
            self.db.register_field(class, def);
            self.counters.indexed_fields += 1;
        }

        let mut methods = Vec::with_capacity(entry.unit.methods.len());
        for def in std::mem::take(&mut entry.unit.methods) {
            methods.push(self.db.register_method(class, def));
            self.counters.indexed_methods += 1;
        }
        methods
    }

    /// Re-definition of a known class: update the existing instance in place.
    /// Returns the methods whose body must be (re)linked.
    fn reconcile(&mut self, entry: &mut BatchEntry, report: &mut MergeReport) -> Vec<MethodId> {
        let class = entry.class;
        let unit = &mut entry.unit;

        if self.db.class(class).is_missing() {
            debug!(fqcn = %unit.fqcn, "Upgrading placeholder class to its definition");
            self.db.clear_missing(MissingEntity::Class(class));
            self.counters.indexed_classes += 1;
        }
        let target = self.db.class_mut(class);
        target.modifiers = unit.modifiers;
        if unit.source_file.is_some() {
            target.source_file = unit.source_file.clone();
        }

        let mut remap = false;
        if self.db.superclass_name(class) != unit.extends {
            let extends = unit
                .extends
                .as_deref()
                .map(|name| Link::Resolved(Resolver::new(self.db).resolve_type(name)));
            self.db.class_mut(class).extends = extends;
            remap = true;
        }

        if self.interface_names(class) != unit.implements {
            let mut resolver = Resolver::new(self.db);
            let implements: Vec<TypeLink> = unit
                .implements
                .iter()
                .map(|name| Link::Resolved(resolver.resolve_type(name)))
                .collect();
            self.db.class_mut(class).implements = implements;
            remap = true;
        }
        if remap {
            report.require_remap.push(unit.fqcn.clone());
            entry.remap = true;
        }

        for def in std::mem::take(&mut unit.fields) {
            self.merge_field(class, def);
        }

        let mut methods = Vec::new();
        for def in std::mem::take(&mut unit.methods) {
            if let Some(method) = self.merge_method(class, def) {
                methods.push(method);
            }
        }
        methods
    }

    fn merge_field(&mut self, class: ClassId, def: FieldDef) {
        let signature = def.signature(&self.db.class(class).fqcn);
        let Some(&existing) = self.db.class(class).fields.get(&signature) else {
            self.db.register_field(class, def);
            self.counters.indexed_fields += 1;
            return;
        };

        let placeholder = self.db.field(existing).tags.is_missing();
        if placeholder {
            self.db.clear_missing(MissingEntity::Field(existing));
        }
        if placeholder || self.db.field(existing).differs_from(&def) {
            debug!(signature = %signature, "Refreshing field");
            self.db.field_mut(existing).refresh(def);
            self.counters.indexed_fields += 1;
        }
    }

    /// Returns the method when its body has to be linked.
    fn merge_method(&mut self, class: ClassId, def: MethodDef) -> Option<MethodId> {
        let signature = def.signature(&self.db.class(class).fqcn);
        let Some(&existing) = self.db.class(class).methods.get(&signature) else {
            let method = self.db.register_method(class, def);
            self.counters.indexed_methods += 1;
            return Some(method);
        };

        let placeholder = self.db.method(existing).tags.is_missing();
        if placeholder {
            self.db.clear_missing(MissingEntity::Method(existing));
        }
        if placeholder || self.db.method(existing).differs_from(&def) {
            debug!(signature = %signature, "Refreshing method");
            self.db.method_mut(existing).refresh(def);
            self.counters.indexed_methods += 1;
            return Some(existing);
        }
        None
    }

    fn interface_names(&self, class: ClassId) -> Vec<String> {
        self.db
            .class(class)
            .implements
            .iter()
            .map(|link| match link {
                Link::Resolved(id) => self.db.class(*id).fqcn.clone(),
                Link::Unresolved(reference) => reference.name.clone(),
            })
            .collect()
    }

    /// Superclass chain of `class`, nearest first. An ancestor missing from
    /// the database or a cycle truncates the chain.
    fn linearize(&self, class: ClassId) -> Vec<ClassId> {
        let mut supers = Vec::new();
        let mut visited = FxHashSet::default();
        visited.insert(class);

        let mut current = class;
        while let Some(name) = self.db.superclass_name(current) {
            let Some(parent) = self.db.class_by_name(&name) else {
                warn!(
                    class = %self.db.class(class).fqcn,
                    ancestor = %name,
                    "Superclass not found in program database, truncating hierarchy"
                );
                break;
            };
            if !visited.insert(parent) {
                warn!(class = %self.db.class(class).fqcn, ancestor = %name, "Inheritance cycle detected");
                break;
            }
            supers.push(parent);
            current = parent;
        }
        supers
    }

    /// Drops the inherited views cached for `remapped` classes and every class
    /// below them, and rebuilds the superclass chains of the latter. The next
    /// lookup through any of them walks the new hierarchy.
    fn remap_hierarchy(&mut self, remapped: &[ClassId]) {
        let affected: Vec<ClassId> = self
            .db
            .all_classes()
            .filter(|(id, class)| {
                remapped.contains(id) || class.supers.iter().any(|s| remapped.contains(s))
            })
            .map(|(id, _)| id)
            .collect();

        for class in affected {
            let dropped = self.db.forget_inherited(class);
            let supers = self.linearize(class);
            self.db.class_mut(class).supers = supers;
            debug!(class = %self.db.class(class).fqcn, dropped, "Hierarchy changed, inherited views dropped");
        }
    }

    fn link(&mut self, to_link: &[(ClassId, Vec<MethodId>)]) -> usize {
        let total = to_link.len();
        let interval = self.config.progress_interval.max(1);
        let mut linked = 0;

        for (done, (class, methods)) in to_link.iter().enumerate() {
            let mut linker = InstructionLinker::new(self.db, self.counters)
                .with_slow_threshold(self.config.slow_method_threshold_ms);
            for &method in methods {
                match linker.link_method(method) {
                    Ok(()) => linked += 1,
                    Err(e) => warn!("Could not link method: {}", e),
                }
            }

            let done = done + 1;
            if done % interval == 0 || done == total {
                info!(
                    "{}/{} classes linked ({})",
                    done,
                    total,
                    self.db.class(*class).fqcn
                );
            }
        }
        linked
    }
}
