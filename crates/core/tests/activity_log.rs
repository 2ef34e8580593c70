use activitylog_core::activity::{
    ActivityError, ActivityLog, ActivityLogOptions, PopulatedActivity,
};
use activitylog_core::models::ModelRegistry;
use activitylog_core::schema::{FieldSchema, FieldType, RecordSchema};
use activitylog_core::store::{
    Document, DocumentQuery, DocumentStore, MemoryStore, SqliteStore,
};
use chrono::{Duration, Utc};
use serde_json::{Value, json};
use tempfile::tempdir;

fn registry() -> ModelRegistry {
    ModelRegistry::from_collections([("Post", "posts"), ("User", "users")]).unwrap()
}

fn memory_log() -> ActivityLog<MemoryStore> {
    ActivityLog::new(MemoryStore::new(), registry(), ActivityLogOptions::default()).unwrap()
}

fn sqlite_log() -> ActivityLog<SqliteStore> {
    let store = SqliteStore::open_in_memory().unwrap();
    ActivityLog::new(store, registry(), ActivityLogOptions::default()).unwrap()
}

fn create<S: DocumentStore>(log: &ActivityLog<S>, kind: &str, field: &str, value: &str) -> Document {
    let model = log.model(kind).unwrap();
    let mut fields = serde_json::Map::new();
    fields.insert(field.to_string(), Value::from(value));
    model.create(fields).unwrap()
}

fn refetch<S: DocumentStore>(log: &ActivityLog<S>, doc: &Document) -> Document {
    log.model(&doc.kind).unwrap().find_by_id(doc.id.as_ref().unwrap()).unwrap().unwrap()
}

fn descriptions(found: &[PopulatedActivity]) -> Vec<&str> {
    found.iter().map(|a| a.record.description().unwrap_or_default()).collect()
}

/// Runs a scenario once per store implementation.
macro_rules! on_both_stores {
    ($($name:ident => $scenario:ident;)*) => {
        mod memory {
            $(#[test] fn $name() { super::$scenario(&super::memory_log()); })*
        }
        mod sqlite {
            $(#[test] fn $name() { super::$scenario(&super::sqlite_log()); })*
        }
    };
}

on_both_stores! {
    default_log_name_applied => default_log_name_applied;
    subject_resolves_to_persisted_entity => subject_resolves_to_persisted_entity;
    omitted_subject_resolves_to_none => omitted_subject_resolves_to_none;
    invalid_subject_leaves_record_unchanged => invalid_subject_leaves_record_unchanged;
    end_to_end_latest_activity => end_to_end_latest_activity;
    log_twice_keeps_identity => log_twice_keeps_identity;
    every_read_is_populated => every_read_is_populated;
    dangling_reference_resolves_to_none => dangling_reference_resolves_to_none;
    prune_removes_only_old_activities => prune_removes_only_old_activities;
    scopes_filter_newest_first => scopes_filter_newest_first;
    prune_with_huge_day_count_keeps_everything => prune_with_huge_day_count_keeps_everything;
    filters_compare_json_types => filters_compare_json_types;
    huge_limit_returns_every_match => huge_limit_returns_every_match;
}

fn default_log_name_applied<S: DocumentStore>(log: &ActivityLog<S>) {
    let mut record = log.new_activity();
    assert_eq!(record.log_name(), "default");

    record.log(log, "first").unwrap();
    let stored = log.latest().unwrap().unwrap();
    assert_eq!(stored.record.log_name(), "default");
}

fn subject_resolves_to_persisted_entity<S: DocumentStore>(log: &ActivityLog<S>) {
    let post = create(log, "Post", "title", "new title");

    let mut record = log.new_activity();
    record.performed_on(&post).unwrap();
    assert_eq!(record.subject_id(), post.id.as_ref());
    assert_eq!(record.subject_type(), Some("Post"));

    record.log(log, "touched").unwrap();
    let stored = log.latest().unwrap().unwrap();
    assert_eq!(stored.subject(), Some(&refetch(log, &post)));
}

fn omitted_subject_resolves_to_none<S: DocumentStore>(log: &ActivityLog<S>) {
    log.new_activity().performed_on(None).unwrap().log(log, "nothing").unwrap();

    let stored = log.latest().unwrap().unwrap();
    assert!(stored.record.subject_ref().is_none());
    assert!(stored.subject().is_none());
    assert!(stored.causer().is_none());
}

fn invalid_subject_leaves_record_unchanged<S: DocumentStore>(log: &ActivityLog<S>) {
    let mut record = log.new_activity();
    let before = record.clone();

    let err = record.performed_on(&Document::new("Post")).unwrap_err();
    assert!(matches!(err, ActivityError::InvalidArgument { .. }));
    assert_eq!(record, before);
}

fn end_to_end_latest_activity<S: DocumentStore>(log: &ActivityLog<S>) {
    let post = create(log, "Post", "title", "new title");
    let user = create(log, "User", "name", "test user");

    log.new_activity()
        .performed_on(&post)
        .unwrap()
        .caused_by(&user)
        .unwrap()
        .with_property("key", "value")
        .log(log, "did X")
        .unwrap();

    let latest = log.latest().unwrap().expect("an activity");
    assert_eq!(latest.record.description(), Some("did X"));
    assert_eq!(latest.subject().unwrap().get("title"), Some(&json!("new title")));
    assert_eq!(latest.causer().unwrap().get("name"), Some(&json!("test user")));
    assert_eq!(
        Value::Object(latest.record.properties().unwrap().clone()),
        json!({"key": "value"})
    );
}

fn log_twice_keeps_identity<S: DocumentStore>(log: &ActivityLog<S>) {
    let mut record = log.new_activity();
    record.log(log, "first").unwrap();
    let id = record.id().cloned().unwrap();

    record.with_property("retry", true).log(log, "second").unwrap();

    assert_eq!(record.id(), Some(&id));
    assert_eq!(log.activities().count(&DocumentQuery::new()).unwrap(), 1);
    let stored = log.find_by_id(&id).unwrap().unwrap();
    assert_eq!(stored.record.description(), Some("second"));
    assert_eq!(stored.record.get_extra_property("retry").unwrap(), Some(&json!(true)));
}

fn every_read_is_populated<S: DocumentStore>(log: &ActivityLog<S>) {
    let post = create(log, "Post", "title", "p");
    let user = create(log, "User", "name", "u");

    let mut record = log.new_activity();
    record.on(&post).unwrap().by(&user).unwrap().log(log, "read me").unwrap();
    let id = record.id().cloned().unwrap();

    let by_id = log.find_by_id(&id).unwrap().unwrap();
    let one = log.find_one(&DocumentQuery::new().filter("description", "read me")).unwrap().unwrap();
    let many = log.find(&DocumentQuery::new()).unwrap();

    for found in [&by_id, &one, &many[0]] {
        assert_eq!(found.subject().and_then(|d| d.get_str("title")), Some("p"));
        assert_eq!(found.causer().and_then(|d| d.get_str("name")), Some("u"));
    }
}

fn dangling_reference_resolves_to_none<S: DocumentStore>(log: &ActivityLog<S>) {
    let post = create(log, "Post", "title", "short lived");
    log.new_activity().performed_on(&post).unwrap().log(log, "then deleted").unwrap();

    let posts = log.model("Post").unwrap();
    assert_eq!(posts.delete(&DocumentQuery::new()).unwrap(), 1);

    let stored = log.latest().unwrap().unwrap();
    assert_eq!(stored.record.subject_type(), Some("Post"));
    assert!(stored.subject().is_none());
}

fn prune_removes_only_old_activities<S: DocumentStore>(log: &ActivityLog<S>) {
    let activities = log.activities();
    let mut old = activities.build();
    old.set("description", "long ago");
    old.created_at = Some(Utc::now() - Duration::days(400));
    activities.save(&mut old).unwrap();

    log.new_activity().log(log, "recent").unwrap();

    assert_eq!(log.prune(365).unwrap(), 1);
    let left = log.find(&DocumentQuery::new()).unwrap();
    assert_eq!(descriptions(&left), vec!["recent"]);
}

fn scopes_filter_newest_first<S: DocumentStore>(log: &ActivityLog<S>) {
    let a = create(log, "Post", "title", "a");
    let b = create(log, "Post", "title", "b");
    let user = create(log, "User", "name", "u");

    log.new_activity().performed_on(&a).unwrap().log(log, "a1").unwrap();
    log.new_activity().performed_on(&b).unwrap().caused_by(&user).unwrap().log(log, "b1").unwrap();
    log.new_activity().use_log("audit").performed_on(&a).unwrap().log(log, "a2").unwrap();

    assert_eq!(descriptions(&log.for_subject(&a).unwrap()), vec!["a2", "a1"]);
    assert_eq!(descriptions(&log.by_causer(&user).unwrap()), vec!["b1"]);
    assert_eq!(descriptions(&log.in_log("audit").unwrap()), vec!["a2"]);
    assert_eq!(descriptions(&log.in_log("default").unwrap()), vec!["b1", "a1"]);
}

fn prune_with_huge_day_count_keeps_everything<S: DocumentStore>(log: &ActivityLog<S>) {
    log.new_activity().log(log, "kept").unwrap();

    assert_eq!(log.prune(u32::MAX).unwrap(), 0);
    assert_eq!(log.prune(1_000_000).unwrap(), 0);
    assert_eq!(descriptions(&log.find(&DocumentQuery::new()).unwrap()), vec!["kept"]);
}

fn filters_compare_json_types<S: DocumentStore>(log: &ActivityLog<S>) {
    let store = log.store();
    let mut one = Document::new("Flag").with_field("flag", 1);
    let mut yes = Document::new("Flag").with_field("flag", true);
    let mut real = Document::new("Flag").with_field("flag", 1.5);
    store.save("flags", &mut one).unwrap();
    store.save("flags", &mut yes).unwrap();
    store.save("flags", &mut real).unwrap();

    let count = |value: Value| store.count("flags", &DocumentQuery::new().filter("flag", value)).unwrap();
    assert_eq!(count(json!(true)), 1);
    assert_eq!(count(json!(false)), 0);
    assert_eq!(count(json!(1)), 1);
    assert_eq!(count(json!(1.0)), 0);
    assert_eq!(count(json!(1.5)), 1);
    assert_eq!(count(json!("1")), 0);
}

fn huge_limit_returns_every_match<S: DocumentStore>(log: &ActivityLog<S>) {
    log.new_activity().log(log, "first").unwrap();
    log.new_activity().log(log, "second").unwrap();

    let found = log.find(&DocumentQuery::new().newest_first().limit(usize::MAX)).unwrap();
    assert_eq!(descriptions(&found), vec!["second", "first"]);
}

#[test]
fn unknown_subject_kind_rejected_on_write() {
    let log = memory_log();
    log.new_activity().log(&log, "good one").unwrap();

    let mut comment = Document::new("Comment").with_field("body", "hi");
    log.store().save("comments", &mut comment).unwrap();

    let mut record = log.new_activity();
    record.performed_on(&comment).unwrap();
    let err = record.log(&log, "commented").unwrap_err();
    assert!(matches!(err, ActivityError::UnknownKind(k) if k == "Comment"));
    assert!(record.id().is_none());

    let all = log.find(&DocumentQuery::new()).unwrap();
    assert_eq!(descriptions(&all), vec!["good one"]);
}

#[test]
fn custom_base_schema_fields_are_validated_and_kept() {
    let mut base = RecordSchema::new();
    base.add_field("ip", FieldSchema::new(FieldType::String).required());
    let log = ActivityLog::with_schema(
        MemoryStore::new(),
        registry(),
        ActivityLogOptions { default_log_name: "audit".into(), collection: "events".into() },
        base,
    )
    .unwrap();

    let mut record = log.new_activity();
    let err = record.log(&log, "no ip").unwrap_err();
    assert!(matches!(err, ActivityError::Schema(_)));
    assert!(record.id().is_none());

    record.set_field("ip", "10.0.0.1").log(&log, "with ip").unwrap();
    let stored = log.latest().unwrap().unwrap();
    assert_eq!(stored.record.log_name(), "audit");
    assert_eq!(stored.record.field("ip"), Some(&json!("10.0.0.1")));
    assert_eq!(log.store().find("events", &DocumentQuery::new()).unwrap().len(), 1);
}

#[test]
fn sqlite_activities_survive_reopen() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("activity.db");

    {
        let log = ActivityLog::new(
            SqliteStore::open(&path).unwrap(),
            registry(),
            ActivityLogOptions::default(),
        )
        .unwrap();
        let post = create(&log, "Post", "title", "kept");
        log.new_activity().performed_on(&post).unwrap().log(&log, "persisted").unwrap();
    }

    let log = ActivityLog::new(
        SqliteStore::open(&path).unwrap(),
        registry(),
        ActivityLogOptions::default(),
    )
    .unwrap();
    let stored = log.latest().unwrap().unwrap();
    assert_eq!(stored.record.description(), Some("persisted"));
    assert_eq!(stored.subject().and_then(|d| d.get_str("title")), Some("kept"));
}
