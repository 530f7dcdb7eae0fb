use dorudb::common::{document_key, FileLock, LockMode, LockPolicy};
use dorudb::doc;
use dorudb::errors::ErrorKind;
use dorudb_int_test::test_util::{cleanup, create_test_context, run_test};
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

/// Holds `mode` on `path` from another thread until the returned sender is
/// used or dropped.
fn hold_lock(path: PathBuf, mode: LockMode) -> (mpsc::Sender<()>, thread::JoinHandle<()>) {
    let (locked_tx, locked_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel::<()>();

    let handle = thread::spawn(move || {
        let file = match mode {
            LockMode::Shared => File::open(&path).unwrap(),
            LockMode::Exclusive => OpenOptions::new().write(true).open(&path).unwrap(),
        };
        let policy = LockPolicy::new(10, Duration::from_millis(5));
        let _lock = FileLock::acquire(&file, mode, &policy, "holder").unwrap();
        locked_tx.send(()).unwrap();
        let _ = release_rx.recv();
    });

    locked_rx.recv().unwrap();
    (release_tx, handle)
}

#[test]
fn test_read_times_out_under_exclusive_lock() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            db.create("tasks", doc! { "title": "locked" })?;
            let path = Path::new(ctx.path()).join("tasks").join(document_key(1));

            let (release, holder) = hold_lock(path, LockMode::Exclusive);
            let err = db.find_by_id("tasks", 1).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::LockTimeout);
            assert!(err.is_transient());
            assert!(err.message().starts_with("Read lock timeout exceeded on"));

            release.send(()).unwrap();
            holder.join().unwrap();

            awaitility::at_most(Duration::from_secs(2))
                .until(|| matches!(db.find_by_id("tasks", 1), Ok(Some(_))));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_write_times_out_under_shared_lock() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            db.create("tasks", doc! { "title": "read by someone" })?;
            let path = Path::new(ctx.path()).join("tasks").join(document_key(1));

            let (release, holder) = hold_lock(path, LockMode::Shared);
            assert!(db.find_by_id("tasks", 1)?.is_some());

            let err = db
                .update("tasks", doc! { "id": 1, "title": "rewritten" })
                .unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::LockTimeout);
            assert!(err.message().starts_with("Write lock timeout exceeded on"));

            drop(release);
            holder.join().unwrap();

            db.update("tasks", doc! { "id": 1, "title": "rewritten" })?;
            let stored = db.find_by_id("tasks", 1)?.unwrap();
            assert_eq!(stored.get("title"), Some(&serde_json::json!("rewritten")));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_index_read_times_out_under_exclusive_lock() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            db.create("tasks", doc! { "status": "open" })?;
            db.rebuild_index("tasks", "status", None)?;
            let path = Path::new(ctx.path()).join("tasks.status");

            let (release, holder) = hold_lock(path, LockMode::Exclusive);
            let options = dorudb::collection::where_filter(dorudb::filter::field("status").eq("open"));
            let err = db.find_all("tasks", &options).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::LockTimeout);

            release.send(()).unwrap();
            holder.join().unwrap();
            assert_eq!(db.find_all("tasks", &options)?.len(), 1);
            Ok(())
        },
        cleanup,
    )
}
