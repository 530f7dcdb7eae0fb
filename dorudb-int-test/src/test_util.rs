use dorudb::collection::Document;
use dorudb::doc;
use dorudb::errors::{DoruError, DoruResult, ErrorKind};
use dorudb::Doru;
use std::backtrace::Backtrace;
use std::time::{Duration, Instant};
use std::{env, fs, thread};

/// Runs `test` between `before` and `after`, retrying a failed run.
///
/// `after` runs even when the test body returns an error. Panics once every
/// attempt has failed.
pub fn run_test<T, B, A>(before: B, test: T, after: A)
where
    T: Fn(TestContext) -> DoruResult<()> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
    B: Fn() -> DoruResult<TestContext> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
    A: Fn(TestContext) -> DoruResult<()> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
{
    const MAX_RETRIES: u32 = 3;
    let mut last_error: Option<String> = None;

    for attempt in 1..=MAX_RETRIES {
        let start_time = Instant::now();

        let result = std::panic::catch_unwind(|| {
            let backtrace = Backtrace::capture();
            match before() {
                Ok(ctx) => match test(ctx.clone()) {
                    Ok(_) => after(ctx)
                        .map_err(|e| (format!("After run failed: {:?}", e), backtrace.to_string())),
                    Err(e) => {
                        let _ = after(ctx);
                        Err((format!("Test failed: {:?}", e), backtrace.to_string()))
                    }
                },
                Err(e) => Err((format!("Before run failed: {:?}", e), backtrace.to_string())),
            }
        });

        let elapsed = start_time.elapsed();
        let error = match result {
            Ok(Ok(_)) => return,
            Ok(Err((e, bt))) => {
                if !bt.is_empty() && !bt.contains("disabled") {
                    eprintln!("Backtrace:\n{}", bt);
                }
                e
            }
            Err(panic_err) => {
                if let Some(s) = panic_err.downcast_ref::<&str>() {
                    format!("Panic: {}", s)
                } else if let Some(s) = panic_err.downcast_ref::<String>() {
                    format!("Panic: {}", s)
                } else {
                    "Panic: unknown payload".to_string()
                }
            }
        };

        if attempt < MAX_RETRIES {
            eprintln!(
                "\n========== Test Attempt {}/{} Failed (took {:?}) ==========",
                attempt, MAX_RETRIES, elapsed
            );
            eprintln!("Error: {}", error);
            thread::sleep(Duration::from_millis(100 * attempt as u64));
        }
        last_error = Some(error);
    }

    panic!(
        "Test failed after {} attempts. Last error: {}",
        MAX_RETRIES,
        last_error.unwrap_or_default()
    );
}

#[derive(Clone)]
pub struct TestContext {
    path: String,
    db: Doru,
}

impl TestContext {
    pub fn new(path: String, db: Doru) -> Self {
        Self { path, db }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn db(&self) -> Doru {
        self.db.clone()
    }

    /// Opens a second, independent handle on the same root.
    pub fn reopen(&self) -> DoruResult<Doru> {
        Doru::open(&self.path)
    }
}

pub fn random_path() -> String {
    let id = uuid::Uuid::new_v4();
    env::temp_dir()
        .join(format!("dorudb-{}", id))
        .to_string_lossy()
        .to_string()
}

pub fn create_test_context() -> DoruResult<TestContext> {
    let path = random_path();
    let db = Doru::builder()
        .path(&path)
        .lock_attempts(5)
        .lock_poll_interval(Duration::from_millis(5))
        .open()?;
    Ok(TestContext::new(path, db))
}

/// Removes the store directory of `ctx`, retrying briefly on failure.
pub fn cleanup(ctx: TestContext) -> DoruResult<()> {
    let path = ctx.path().to_string();
    drop(ctx);

    for retry in 0..5u64 {
        if !std::path::Path::new(&path).exists() {
            return Ok(());
        }
        match fs::remove_dir_all(&path) {
            Ok(_) => return Ok(()),
            Err(e) if retry < 4 => {
                eprintln!("Warning: cleanup of {} failed: {}", path, e);
                thread::sleep(Duration::from_millis(20 * (retry + 1)));
            }
            Err(e) => {
                return Err(DoruError::new(
                    &format!("Failed to remove test store {}: {}", path, e),
                    ErrorKind::IOError,
                ))
            }
        }
    }
    Ok(())
}

/// Three tasks: 1 open, 2 closed, 3 open.
pub fn create_test_docs() -> Vec<Document> {
    vec![
        doc! { "title": "write parser", "status": "open", "priority": 2 },
        doc! { "title": "fix build", "status": "closed", "priority": 1 },
        doc! { "title": "release", "status": "open", "priority": 3 },
    ]
}

pub fn insert_test_documents(db: &Doru, collection: &str) -> DoruResult<Vec<Document>> {
    create_test_docs()
        .into_iter()
        .map(|document| db.create(collection, document))
        .collect()
}

/// Extracts the IDs of `documents`, in order.
pub fn ids(documents: &[Document]) -> Vec<u64> {
    documents
        .iter()
        .filter_map(|d| d.id().ok().flatten())
        .collect()
}
