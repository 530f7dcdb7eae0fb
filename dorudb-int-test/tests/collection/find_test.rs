use dorudb::collection::{limit_to, offset_by, where_filter, FindOptions};
use dorudb::doc;
use dorudb::filter::{field, Filter};
use dorudb_int_test::test_util::{cleanup, create_test_context, ids, insert_test_documents, run_test};
use std::fs;
use std::path::Path;

#[test]
fn test_find_all_without_filter() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            insert_test_documents(&db, "tasks")?;

            let all = db.find_all("tasks", &FindOptions::new())?;
            assert_eq!(ids(&all), vec![1, 2, 3]);

            let missing = db.find_all("nothing", &FindOptions::new())?;
            assert!(missing.is_empty());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_invert_offset_and_limit() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            for i in 0..10 {
                db.create("items", doc! { "n": i })?;
            }

            let inverted = db.find_all("items", &FindOptions::new().invert())?;
            assert_eq!(ids(&inverted), vec![10, 9, 8, 7, 6, 5, 4, 3, 2, 1]);

            let page = db.find_all("items", &offset_by(2).limit(3))?;
            assert_eq!(ids(&page), vec![3, 4, 5]);

            let page = db.find_all("items", &offset_by(2).limit(3).invert())?;
            assert_eq!(ids(&page), vec![8, 7, 6]);

            let tail = db.find_all("items", &offset_by(8))?;
            assert_eq!(ids(&tail), vec![9, 10]);

            assert!(db.find_all("items", &limit_to(0))?.is_empty());
            assert!(db.find_all("items", &offset_by(20))?.is_empty());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_filter_exact_match() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            insert_test_documents(&db, "tasks")?;

            let open = db.find_all("tasks", &where_filter(field("status").eq("open")))?;
            assert_eq!(ids(&open), vec![1, 3]);

            let none = db.find_all("tasks", &where_filter(field("status").eq("archived")))?;
            assert!(none.is_empty());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_filter_terms_are_anded() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            insert_test_documents(&db, "tasks")?;

            let filter = field("status").eq("open").and(field("priority").gt(2));
            let found = db.find_all("tasks", &where_filter(filter))?;
            assert_eq!(ids(&found), vec![3]);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_filter_with_predicate() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            insert_test_documents(&db, "tasks")?;

            let filter = Filter::new().matching("title", |v| {
                v.as_str().is_some_and(|s| s.contains("e"))
            });
            let found = db.find_all("tasks", &where_filter(filter).invert())?;
            assert_eq!(ids(&found), vec![3, 1]);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_filter_pagination_counts_matches() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            for i in 1..=10 {
                db.create("items", doc! { "even": i % 2 == 0 })?;
            }

            let options = where_filter(field("even").eq(true)).offset(1).limit(2);
            assert_eq!(ids(&db.find_all("items", &options)?), vec![4, 6]);

            let options = where_filter(field("even").eq(true)).offset(1).limit(2).invert();
            assert_eq!(ids(&db.find_all("items", &options)?), vec![8, 6]);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_missing_field_compares_as_null() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            db.create("tasks", doc! { "owner": "kim" })?;
            db.create("tasks", doc! { "title": "unowned" })?;
            db.create("tasks", doc! { "owner": null })?;

            let found = db.find_all("tasks", &where_filter(field("owner").eq(serde_json::Value::Null)))?;
            assert_eq!(ids(&found), vec![2, 3]);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_numeric_equality_is_loose() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            db.create("points", doc! { "score": 1 })?;
            db.create("points", doc! { "score": 1.0 })?;
            db.create("points", doc! { "score": "1" })?;

            let found = db.find_all("points", &where_filter(field("score").eq(1)))?;
            assert_eq!(ids(&found), vec![1, 2]);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_find_returns_first_match() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            insert_test_documents(&db, "tasks")?;

            let first = db.find("tasks", &where_filter(field("status").eq("open")))?;
            assert_eq!(first.and_then(|d| d.id().ok().flatten()), Some(1));

            let last = db.find("tasks", &where_filter(field("status").eq("open")).invert())?;
            assert_eq!(last.and_then(|d| d.id().ok().flatten()), Some(3));

            assert!(db.find("tasks", &where_filter(field("status").eq("x")))?.is_none());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_unreadable_documents_are_skipped() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            insert_test_documents(&db, "tasks")?;

            let dir = Path::new(ctx.path()).join("tasks");
            fs::write(dir.join("0000000002"), b"").unwrap();
            fs::write(dir.join(".swap"), b"{}").unwrap();

            let all = db.find_all("tasks", &FindOptions::new())?;
            assert_eq!(ids(&all), vec![1, 3]);
            assert_eq!(db.find_by_id("tasks", 2)?, None);

            let open = db.find_all("tasks", &where_filter(field("status").eq("open")))?;
            assert_eq!(ids(&open), vec![1, 3]);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_explain_full_scan() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            insert_test_documents(&db, "tasks")?;
            assert_eq!(db.explain(), None);

            db.find_all("tasks", &where_filter(field("status").eq("open")).explain())?;
            assert_eq!(db.explain().as_deref(), Some("Full scan: no index used"));
            Ok(())
        },
        cleanup,
    )
}
