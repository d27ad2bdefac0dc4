//! Stress tests for concurrent use of the pipeline
//!
//! These tests verify:
//! - Scope disposal runs once no matter how many threads race on it
//! - Concurrent file writes never lose or interleave lines
//! - Concurrent scopes on one logger stay consistent

use parking_lot::Mutex;
use scyber_log::{
    log, FileSink, Keyed, Log, LogLevel, LogRecord, Logger, Result, ScopeGuard, Sink, State,
    TextFormatter,
};
use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use tempfile::TempDir;

const THREADS: usize = 8;
const MESSAGES_PER_THREAD: usize = 250;

#[derive(Clone, Default)]
struct CountingSink {
    count: Arc<AtomicUsize>,
    max_scopes: Arc<Mutex<usize>>,
}

impl Keyed for CountingSink {
    fn key(&self) -> &str {
        "counting"
    }
}

impl Sink for CountingSink {
    fn write(&self, _message: &str, record: &LogRecord) -> Result<()> {
        self.count.fetch_add(1, Ordering::SeqCst);
        let mut max = self.max_scopes.lock();
        *max = (*max).max(record.scopes.len());
        Ok(())
    }
}

/// Disposal from many threads at once removes the scope exactly once
#[test]
fn test_concurrent_dispose() {
    let logger = Logger::builder("Stress").build();
    let guard: Arc<ScopeGuard> = Arc::new(logger.begin_scope(State::from("shared")).unwrap());
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let guard = Arc::clone(&guard);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                guard.dispose()
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Thread panicked").expect("dispose failed");
    }
    assert!(logger.active_scopes().is_empty());
}

/// Lines written concurrently to one file all arrive intact
#[test]
fn test_concurrent_file_writes() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let template = format!("{}/stress/{{1}}.log", temp_dir.path().display());
    let sink = FileSink::new(template).expect("Failed to create file sink");
    let logger = Arc::new(
        Logger::builder("Stress")
            .formatter(TextFormatter::new())
            .sink(sink)
            .build(),
    );

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let logger = Arc::clone(&logger);
            thread::spawn(move || {
                for i in 0..MESSAGES_PER_THREAD {
                    log!(logger, LogLevel::Info, "thread {Thread} message {Index}", t, i)
                        .expect("Failed to log");
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    let content = fs::read_to_string(temp_dir.path().join("stress").join("Stress.log"))
        .expect("Failed to read log file");
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), THREADS * MESSAGES_PER_THREAD);
    assert!(lines
        .iter()
        .all(|line| line.contains("Stress - thread ") && line.contains(" message ")));
}

/// Threads opening and closing their own scopes never corrupt the table
#[test]
fn test_concurrent_scopes() {
    let sink = CountingSink::default();
    let logger = Arc::new(Logger::builder("Stress").sink(sink.clone()).build());

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let logger = Arc::clone(&logger);
            thread::spawn(move || {
                for i in 0..MESSAGES_PER_THREAD {
                    let _scope = logger
                        .begin_scope(State::from(format!("{}-{}", t, i)))
                        .expect("Failed to begin scope");
                    log!(logger, LogLevel::Debug, "working").expect("Failed to log");
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    assert_eq!(
        sink.count.load(Ordering::SeqCst),
        THREADS * MESSAGES_PER_THREAD
    );
    let max = *sink.max_scopes.lock();
    assert!((1..=THREADS).contains(&max));
    assert!(logger.active_scopes().is_empty());
}
