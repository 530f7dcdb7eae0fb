use dorudb::doc;
use dorudb::errors::ErrorKind;
use dorudb_int_test::test_util::{cleanup, create_test_context, insert_test_documents, run_test};
use serde_json::{json, Value};
use std::fs;
use std::path::Path;

fn index_file(root: &str, name: &str) -> Value {
    let text = fs::read_to_string(Path::new(root).join(name)).unwrap();
    serde_json::from_str(&text).unwrap()
}

#[test]
fn test_rebuild_index_scenario() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            insert_test_documents(&db, "tasks")?;

            assert_eq!(db.rebuild_index("tasks", "status", None)?, 3);
            assert!(db.has_index("tasks", "status"));
            assert_eq!(
                fs::read_to_string(Path::new(ctx.path()).join("tasks.status")).unwrap(),
                r#"{"kv":{"closed":2,"open":[1,3]}}"#
            );
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_rebuild_empty_collection() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            assert_eq!(db.rebuild_index("tasks", "status", None)?, 0);
            assert_eq!(index_file(ctx.path(), "tasks.status"), json!({ "kv": {} }));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_index_options_are_preserved() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            insert_test_documents(&db, "tasks")?;
            db.rebuild_index("tasks", "status", Some(json!({ "owner": "ops" })))?;

            let created = db.create("tasks", doc! { "status": "blocked" })?;
            db.update_index("tasks", "status", &[created])?;
            db.rebuild_index("tasks", "status", None)?;

            let file = index_file(ctx.path(), "tasks.status");
            assert_eq!(file["options"], json!({ "owner": "ops" }));
            assert_eq!(file["kv"]["blocked"], json!(4));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_update_index_is_idempotent() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            let stored = insert_test_documents(&db, "tasks")?;
            db.rebuild_index("tasks", "status", None)?;
            let before = index_file(ctx.path(), "tasks.status");

            db.update_index("tasks", "status", &stored)?;
            db.update_index("tasks", "status", &stored)?;
            assert_eq!(index_file(ctx.path(), "tasks.status"), before);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_update_index_merges_ids() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            db.rebuild_index("tasks", "status", None)?;

            let a = db.create("tasks", doc! { "status": "open" })?;
            db.update_index("tasks", "status", &[a])?;
            assert_eq!(index_file(ctx.path(), "tasks.status")["kv"]["open"], json!(1));

            let b = db.create("tasks", doc! { "status": "open" })?;
            let c = db.create("tasks", doc! { "status": "open" })?;
            db.update_index("tasks", "status", &[b, c])?;
            assert_eq!(
                index_file(ctx.path(), "tasks.status")["kv"]["open"],
                json!([1, 2, 3])
            );
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_update_index_value_requires_objects() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            db.rebuild_index("tasks", "status", None)?;

            db.update_index_value("tasks", "status", &json!({ "id": 9, "status": "open" }))?;
            db.update_index_value("tasks", "status", &json!([{ "id": 10, "status": "open" }]))?;
            assert_eq!(
                index_file(ctx.path(), "tasks.status")["kv"]["open"],
                json!([9, 10])
            );

            let err = db
                .update_index_value("tasks", "status", &json!("open"))
                .unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::InvalidInput);
            assert_eq!(err.message(), "Input must be an object or an array of objects.");
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_update_untracked_index_is_noop() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            let stored = insert_test_documents(&db, "tasks")?;
            db.update_index("tasks", "status", &stored)?;
            assert!(!Path::new(ctx.path()).join("tasks.status").exists());
            assert!(!db.has_index("tasks", "status"));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_writes_do_not_touch_indices() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            insert_test_documents(&db, "tasks")?;
            db.rebuild_index("tasks", "status", None)?;
            let before = index_file(ctx.path(), "tasks.status");

            db.create("tasks", doc! { "status": "open" })?;
            db.update("tasks", doc! { "id": 1, "status": "closed" })?;
            db.delete("tasks", 2u64)?;
            assert_eq!(index_file(ctx.path(), "tasks.status"), before);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_remove_index() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            insert_test_documents(&db, "tasks")?;
            db.rebuild_index("tasks", "status", None)?;

            db.remove_index("tasks", "status")?;
            assert!(!db.has_index("tasks", "status"));
            assert!(!Path::new(ctx.path()).join("tasks.status").exists());

            // already gone
            db.remove_index("tasks", "status")?;
            assert!(!ctx.reopen()?.has_index("tasks", "status"));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_numeric_and_mixed_keys_are_sorted() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            for priority in [json!(10), json!(9), json!("high"), json!(true), json!(2.5)] {
                let mut document = dorudb::collection::Document::new();
                document.put("priority", priority)?;
                db.create("tasks", document)?;
            }
            db.rebuild_index("tasks", "priority", None)?;

            assert_eq!(
                fs::read_to_string(Path::new(ctx.path()).join("tasks.priority")).unwrap(),
                r#"{"kv":{"true":4,"2.5":5,"9":2,"10":1,"high":3}}"#
            );
            Ok(())
        },
        cleanup,
    )
}
