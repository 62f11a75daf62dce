use std::fs;

use event_bus::{AnalysisEvent, BatchAnalysisEvent, EventBus};
use tempfile::TempDir;
use tracing_test::traced_test;

use crate::Analyzer;
use crate::batch::{BatchDatabase, ClassUnit, FieldDef, MethodDef};
use crate::config::{AnalysisConfig, AnalysisConfigBuilder};
use crate::error::AnalysisError;
use crate::model::{
    AccessKind, Callee, FieldRef, Instruction, InvokeKind, Member, MethodRef, Modifiers, Operand,
};
use crate::parsing::JsonClassParser;

fn invoke(owner: &str, name: &str, descriptor: &str) -> Instruction {
    Instruction::new(
        "invoke-virtual",
        Operand::invoke(InvokeKind::Virtual, MethodRef::new(owner, name, descriptor)),
    )
}

fn scenario_batch() -> BatchDatabase {
    vec![
        ClassUnit::new("com.app.A").with_method(
            MethodDef::new("foo", "()V")
                .with_modifiers(Modifiers::public())
                .with_instructions(vec![Instruction::new("return-void", Operand::Nop)]),
        ),
        ClassUnit::new("com.app.B").extending("com.app.A").with_method(
            MethodDef::new("bar", "()V").with_instructions(vec![
                invoke("com.app.A", "foo", "()V"),
                Instruction::new("return-void", Operand::Nop),
            ]),
        ),
    ]
    .into_iter()
    .collect()
}

#[test]
fn test_subclass_call_scenario() {
    let mut analyzer = Analyzer::default();

    analyzer.analyze_batch(scenario_batch());

    let db = analyzer.database();
    let a = db.class_by_name("com.app.A").expect("A should be registered");
    let b = db.class_by_name("com.app.B").expect("B should be registered");
    assert_eq!(db.class(b).supers, vec![a]);

    let bar = db.method_view("com.app.B.bar()V").unwrap().member;
    let foo = db.method_view("com.app.A.foo()V").unwrap().member;
    let calls: Vec<_> = db.calls().iter().collect();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].caller, bar);
    assert!(matches!(calls[0].callee, Callee::Method(view) if view.member == foo));
}

#[test]
fn test_unparsed_platform_class_scenario() {
    let mut analyzer = Analyzer::default();
    let batch: BatchDatabase = std::iter::once(ClassUnit::new("com.app.Greeter").with_method(
        MethodDef::new("greet", "()V").with_instructions(vec![
            Instruction::new("const-string", Operand::string("hello")),
            invoke("java.lang.String", "length", "()I"),
        ]),
    ))
    .collect();

    analyzer.analyze_batch(batch);

    let db = analyzer.database();
    let string = db.class_by_name("java.lang.String").expect("Placeholder should exist");
    assert!(db.class(string).is_missing());
    assert_eq!(db.class(string).tags.names(), vec!["missing"]);
    assert!(
        db.missing()
            .iter()
            .any(|m| *m == crate::model::MissingEntity::Class(string))
    );

    let package = db.package_by_name("java.lang").expect("Package should exist");
    assert!(db.package(package).children.contains(&string));
    assert_eq!(db.strings().len(), 1);
}

#[test]
fn test_changed_body_scenario() {
    let mut analyzer = Analyzer::default();
    let unit = |body: Vec<Instruction>| -> BatchDatabase {
        std::iter::once(
            ClassUnit::new("com.app.Service")
                .with_method(MethodDef::new("start", "()V").with_instructions(body)),
        )
        .collect()
    };

    analyzer.analyze_batch(unit(vec![invoke("android.util.Log", "d", "()V")]));
    let service = analyzer.database().class_by_name("com.app.Service").unwrap();

    analyzer.analyze_batch(unit(vec![invoke("android.util.Log", "e", "()V")]));

    let db = analyzer.database();
    assert_eq!(db.class_by_name("com.app.Service"), Some(service));
    assert_eq!(db.class(service).methods.len(), 1);
    let start = db.method_view("com.app.Service.start()V").unwrap().member;
    let targets: Vec<_> = db
        .method(start)
        .instructions()
        .filter_map(|i| match &i.operand {
            Operand::Invoke(invocation) => invocation.target.resolved(),
            _ => None,
        })
        .map(|view| db.method(view.member).name.clone())
        .collect();
    assert_eq!(targets, vec!["e".to_string()]);
    assert_eq!(db.calls().len(), 1);
}

#[test]
fn test_merge_idempotence_through_session() {
    let mut analyzer = Analyzer::default();

    analyzer.analyze_batch(scenario_batch());
    let counters = analyzer.counters();
    let calls = analyzer.database().calls().len();

    analyzer.analyze_batch(scenario_batch());

    assert_eq!(analyzer.counters(), counters);
    assert_eq!(analyzer.database().calls().len(), calls);
    assert_eq!(analyzer.database().classes().len(), 2);
}

#[test]
fn test_user_tag_named_missing_keeps_definitions_real() {
    let mut analyzer = Analyzer::default();
    analyzer.analyze_batch(scenario_batch());
    let counters = analyzer.counters();

    let tagged = analyzer.tag_all("missing");

    assert_eq!(tagged, 4, "two classes and two methods");
    let db = analyzer.database();
    let a = db.class_by_name("com.app.A").unwrap();
    assert!(!db.class(a).is_missing());
    assert!(db.class(a).tags.contains("missing"));
    assert!(db.missing().is_empty());

    let report = analyzer.analyze_batch(scenario_batch());

    assert_eq!(analyzer.counters(), counters);
    assert_eq!(report.methods_linked, 0);
}

#[test]
fn test_counters_match_input() {
    let mut analyzer = Analyzer::default();
    let body = vec![
        Instruction::new("const/4", Operand::Nop),
        invoke("com.ext.Api", "call", "()V"),
        invoke("com.ext.Api", "call", "()V"),
        Instruction::new(
            "sget",
            Operand::field(AccessKind::Get, true, FieldRef::new("com.ext.Api", "LEVEL", "I")),
        ),
        Instruction::new("new-instance", Operand::type_use("com.ext.Api")),
    ];
    let batch: BatchDatabase = std::iter::once(
        ClassUnit::new("com.app.Main")
            .with_field(FieldDef::new("ready", "Z"))
            .with_method(MethodDef::new("main", "()V").with_instructions(body)),
    )
    .collect();

    analyzer.analyze_batch(batch);

    let counters = analyzer.counters();
    assert_eq!(counters.instructions, 5);
    assert_eq!(counters.method_calls, 2);
    assert_eq!(counters.field_calls, 1);
    assert_eq!(counters.indexed_fields, 1);
    assert_eq!(analyzer.database().calls().len(), 4);

    // The two calls share one placeholder.
    let call = analyzer.database().method_view("com.ext.Api.call()V").unwrap().member;
    assert_eq!(analyzer.database().method(call).callers.len(), 2);
}

#[test]
fn test_visibility_through_session_resolution() {
    let mut analyzer = Analyzer::default();
    let batch: BatchDatabase = vec![
        ClassUnit::new("com.app.A")
            .with_field(FieldDef::new("x", "I").with_modifiers(Modifiers::private()))
            .with_field(FieldDef::new("y", "I").with_modifiers(Modifiers::protected())),
        ClassUnit::new("com.app.B").extending("com.app.A"),
    ]
    .into_iter()
    .collect();
    analyzer.analyze_batch(batch);

    let a = analyzer.database().class_by_name("com.app.A").unwrap();
    let b = analyzer.database().class_by_name("com.app.B").unwrap();

    let x = analyzer.resolve_field(&FieldRef::new("com.app.B", "x", "I"));
    assert!(analyzer.database().field(x.member).is_missing());
    assert_eq!(x.enclosing_class, b);

    let y = analyzer.resolve_field(&FieldRef::new("com.app.B", "y", "I"));
    assert_eq!(analyzer.database().field(y.member).name, "y");
    assert_eq!(y.declaring_class, a);
    assert_eq!(y.enclosing_class, b);
}

#[test]
fn test_add_class_from_fqcn_is_not_missing() {
    let mut analyzer = Analyzer::default();

    let activity = analyzer.add_class_from_fqcn("android.app.Activity");

    assert_eq!(analyzer.resolve_type("android.app.Activity"), activity);
    let db = analyzer.database();
    assert!(!db.class(activity).is_missing());
    assert!(db.missing().is_empty());
    assert!(db.package_by_name("android.app").is_some());
}

#[test]
fn test_tag_categories_are_kept() {
    let mut analyzer = Analyzer::default();

    analyzer.add_tag_category("network", vec!["http".to_string(), "socket".to_string()]);
    analyzer.add_tag_category("storage", vec!["sqlite".to_string()]);

    let names: Vec<_> = analyzer.tag_categories().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["network", "storage"]);
}

#[test]
fn test_link_method_rejects_foreign_handle() {
    let mut analyzer = Analyzer::default();

    let result = analyzer.link_method(crate::model::MethodId::from_usize(3));

    assert!(matches!(result, Err(AnalysisError::UnknownMethod { .. })));
}

#[traced_test]
#[test]
fn test_analyze_path_reads_units_and_skips_bad_files() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    fs::create_dir_all(root.join("com/app")).unwrap();

    for unit in [
        ClassUnit::new("com.app.A").with_method(MethodDef::new("foo", "()V")),
        ClassUnit::new("com.app.B").extending("com.app.A"),
    ] {
        let name = unit.fqcn.rsplit('.').next().unwrap().to_string();
        fs::write(
            root.join(format!("com/app/{name}.json")),
            serde_json::to_string_pretty(&unit).unwrap(),
        )
        .unwrap();
    }
    fs::write(root.join("com/app/Broken.json"), "{ not a unit").unwrap();
    fs::write(root.join("com/app/notes.txt"), "ignored").unwrap();

    let mut analyzer = Analyzer::default();
    let report = analyzer
        .analyze_path(root, &JsonClassParser)
        .expect("Analysis should succeed");

    assert_eq!(report.classes_added, 2);
    assert!(logs_contain("Could not parse class file"));
    let db = analyzer.database();
    let b = db.class_by_name("com.app.B").unwrap();
    assert_eq!(db.class(b).supers.len(), 1);
}

#[traced_test]
#[test]
fn test_missing_superclass_chain_is_logged() {
    let mut analyzer = Analyzer::default();

    analyzer.analyze_batch(
        std::iter::once(ClassUnit::new("com.app.Loop").extending("com.app.Loop")).collect(),
    );

    let db = analyzer.database();
    let looped = db.class_by_name("com.app.Loop").unwrap();
    assert!(db.class(looped).supers.is_empty());
    assert!(logs_contain("Inheritance cycle detected"));
}

#[tokio::test]
async fn test_events_wrap_each_batch() {
    let bus = EventBus::new();
    let mut receiver = bus.subscribe();
    let mut analyzer = Analyzer::default().with_event_bus(bus);

    let mut batch = scenario_batch();
    batch.source = Some("/tmp/app/smali".into());
    analyzer.analyze_batch(batch);

    let started = receiver.recv().await.expect("Started event");
    let completed = receiver.recv().await.expect("Completed event");

    match started {
        AnalysisEvent::Batch(BatchAnalysisEvent::Started(started)) => {
            assert_eq!(started.classes_to_merge, 2);
            assert_eq!(started.source.as_deref(), Some("/tmp/app/smali"));
            assert_eq!(started.session.session_id, analyzer.session_id());
        }
        other => panic!("Expected a started event, got {other:?}"),
    }
    match completed {
        AnalysisEvent::Batch(BatchAnalysisEvent::Completed(completed)) => {
            assert_eq!(completed.classes_added, 2);
            assert_eq!(completed.totals.method_calls, 1);
            assert_eq!(completed.session.known_classes, 2);
        }
        other => panic!("Expected a completed event, got {other:?}"),
    }
}

#[tokio::test]
async fn test_missing_root_emits_failure() {
    let bus = EventBus::new();
    let mut receiver = bus.subscribe();
    let config: AnalysisConfig = AnalysisConfigBuilder::build(true, 0);
    let mut analyzer = Analyzer::new(config).with_event_bus(bus);

    let result = analyzer.analyze_path(
        std::path::Path::new("/nonexistent/analysis/root"),
        &JsonClassParser,
    );

    assert!(matches!(result, Err(AnalysisError::SourceNotFound { .. })));
    match receiver.recv().await.expect("Failed event") {
        AnalysisEvent::Batch(BatchAnalysisEvent::Failed(failed)) => {
            assert!(failed.error.contains("/nonexistent/analysis/root"));
        }
        other => panic!("Expected a failed event, got {other:?}"),
    }
}

#[test]
fn test_statistics_export() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("statistics.json");
    let mut analyzer = Analyzer::default();
    analyzer.analyze_batch(scenario_batch());

    let statistics = analyzer.statistics();
    statistics.export_to_file(&path).unwrap();

    assert_eq!(statistics.sizes.classes, 2);
    assert_eq!(statistics.counters.method_calls, 1);
    let content = fs::read_to_string(&path).unwrap();
    assert!(content.contains(analyzer.session_id()));
}
