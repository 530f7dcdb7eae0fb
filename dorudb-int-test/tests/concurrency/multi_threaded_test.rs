use dorudb::collection::{where_filter, FindOptions};
use dorudb::doc;
use dorudb::filter::field;
use dorudb::Doru;
use dorudb_int_test::test_util::{cleanup, create_test_context, ids, run_test};
use std::collections::HashSet;
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

const THREADS: usize = 8;
const PER_THREAD: usize = 25;

fn patient_handle(path: &str) -> dorudb::errors::DoruResult<Doru> {
    Doru::builder()
        .path(path)
        .lock_attempts(500)
        .lock_poll_interval(Duration::from_millis(2))
        .open()
}

#[test]
fn test_concurrent_creates_get_distinct_ids() {
    run_test(
        create_test_context,
        |ctx| {
            let db = patient_handle(ctx.path())?;
            let barrier = Arc::new(Barrier::new(THREADS));

            let handles: Vec<_> = (0..THREADS)
                .map(|t| {
                    let db = db.clone();
                    let barrier = barrier.clone();
                    thread::spawn(move || {
                        barrier.wait();
                        (0..PER_THREAD)
                            .map(|i| {
                                db.create("events", doc! { "thread": t, "seq": i })
                                    .unwrap()
                                    .id()
                                    .unwrap()
                                    .unwrap()
                            })
                            .collect::<Vec<u64>>()
                    })
                })
                .collect();

            let mut seen = HashSet::new();
            for handle in handles {
                for id in handle.join().unwrap() {
                    assert!(seen.insert(id), "id {} handed out twice", id);
                }
            }

            let total = (THREADS * PER_THREAD) as u64;
            assert_eq!(seen, (1..=total).collect::<HashSet<u64>>());
            assert_eq!(db.count("events", &FindOptions::new())?, THREADS * PER_THREAD);
            assert_eq!(
                db.count("events", &where_filter(field("thread").eq(3)))?,
                PER_THREAD
            );
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_readers_never_see_partial_writes() {
    run_test(
        create_test_context,
        |ctx| {
            let db = patient_handle(ctx.path())?;
            let payload = "x".repeat(4096);
            db.create("state", doc! { "n": 0, "payload": payload.clone() })?;

            let barrier = Arc::new(Barrier::new(5));
            let writer = {
                let db = db.clone();
                let barrier = barrier.clone();
                let payload = payload.clone();
                thread::spawn(move || {
                    barrier.wait();
                    for n in 1..=50 {
                        db.update("state", doc! { "id": 1, "n": n, "payload": payload.clone() })
                            .unwrap();
                    }
                })
            };

            let readers: Vec<_> = (0..4)
                .map(|_| {
                    let db = db.clone();
                    let barrier = barrier.clone();
                    thread::spawn(move || {
                        barrier.wait();
                        for _ in 0..50 {
                            let document = db.find_by_id("state", 1).unwrap().unwrap();
                            assert!(document.get("n").and_then(|n| n.as_u64()).is_some());
                            assert_eq!(
                                document.get("payload").and_then(|p| p.as_str()).map(str::len),
                                Some(4096)
                            );
                        }
                    })
                })
                .collect();

            writer.join().unwrap();
            for reader in readers {
                reader.join().unwrap();
            }

            let last = db.find_by_id("state", 1)?.unwrap();
            assert_eq!(last.get("n"), Some(&serde_json::json!(50)));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_two_handles_share_documents() {
    run_test(
        create_test_context,
        |ctx| {
            let first = ctx.db();
            let second = ctx.reopen()?;

            first.create("notes", doc! { "text": "from first" })?;
            let seen = second.find_all("notes", &FindOptions::new())?;
            assert_eq!(ids(&seen), vec![1]);

            second.create("notes", doc! { "id": 2, "text": "from second" })?;
            assert_eq!(ids(&first.find_all("notes", &FindOptions::new())?), vec![1, 2]);
            Ok(())
        },
        cleanup,
    )
}
