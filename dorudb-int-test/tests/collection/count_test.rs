use dorudb::collection::{where_filter, FindOptions};
use dorudb::doc;
use dorudb::errors::ErrorKind;
use dorudb::filter::field;
use dorudb::Doru;
use dorudb_int_test::test_util::{cleanup, create_test_context, insert_test_documents, random_path, run_test};
use std::fs;

#[test]
fn test_count_without_filter() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            assert_eq!(db.count("tasks", &FindOptions::new())?, 0);

            insert_test_documents(&db, "tasks")?;
            assert_eq!(db.count("tasks", &FindOptions::new())?, 3);
            assert_eq!(db.count("tasks", &FindOptions::new().limit(1).offset(1))?, 3);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_count_scan_uses_all_terms() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            insert_test_documents(&db, "tasks")?;

            assert_eq!(db.count("tasks", &where_filter(field("status").eq("open")))?, 2);

            let both = field("status").eq("open").and(field("priority").eq(3));
            assert_eq!(db.count("tasks", &where_filter(both))?, 1);

            let none = field("status").eq("closed").and(field("priority").eq(3));
            assert_eq!(db.count("tasks", &where_filter(none))?, 0);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_count_with_index() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            insert_test_documents(&db, "tasks")?;
            db.rebuild_index("tasks", "status", None)?;

            let options = where_filter(field("status").eq("open")).explain();
            assert_eq!(db.count("tasks", &options)?, 2);
            assert_eq!(db.explain().as_deref(), Some("Index used: status"));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_count_without_scan_fallback() {
    let path = random_path();
    let db = Doru::builder()
        .path(&path)
        .count_scan_fallback(false)
        .open()
        .unwrap();
    db.create("tasks", doc! { "status": "open", "owner": "kim" }).unwrap();
    db.rebuild_index("tasks", "status", None).unwrap();

    assert_eq!(db.count("tasks", &FindOptions::new()).unwrap(), 1);
    assert_eq!(
        db.count("tasks", &where_filter(field("status").eq("open"))).unwrap(),
        1
    );

    let err = db
        .count("tasks", &where_filter(field("owner").eq("kim")))
        .unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::UnsupportedQuery);

    let two_terms = field("status").eq("open").and(field("owner").eq("kim"));
    let err = db.count("tasks", &where_filter(two_terms)).unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::UnsupportedQuery);

    fs::remove_dir_all(path).unwrap();
}
