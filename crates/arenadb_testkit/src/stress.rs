//! Stress helpers for concurrent table access.

use crate::records::Note;
use arenadb_core::Table;
use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Outcome of a stress run.
#[derive(Debug, Clone, Default)]
pub struct StressReport {
    /// Operations that succeeded and, for readers, saw a consistent snapshot.
    pub successful_ops: usize,
    /// Operations that failed or saw an inconsistent snapshot.
    pub failed_ops: usize,
    /// Wall-clock time of the run.
    pub elapsed: Duration,
}

impl StressReport {
    fn finish(successful_ops: usize, failed_ops: usize, started: Instant) -> Self {
        Self {
            successful_ops,
            failed_ops,
            elapsed: started.elapsed(),
        }
    }

    /// Whether every operation succeeded.
    pub fn is_clean(&self) -> bool {
        self.failed_ops == 0
    }
}

impl fmt::Display for StressReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ok, {} failed in {:?}",
            self.successful_ops, self.failed_ops, self.elapsed
        )
    }
}

/// Configuration for stress runs.
#[derive(Debug, Clone)]
pub struct StressConfig {
    /// Operations per thread.
    pub operations: usize,
    /// Number of concurrent threads.
    pub threads: usize,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            operations: 200,
            threads: 4,
        }
    }
}

/// Creates notes from several threads at once.
///
/// Returns the report and, per thread, the identifiers it was assigned in
/// order.
pub fn stress_concurrent_creates(
    table: &Table<Note>,
    config: &StressConfig,
) -> (StressReport, Vec<Vec<i64>>) {
    let failed = Arc::new(AtomicUsize::new(0));
    let started = Instant::now();

    let handles: Vec<_> = (0..config.threads)
        .map(|t| {
            let table = table.clone();
            let failed = Arc::clone(&failed);
            let operations = config.operations;

            thread::spawn(move || {
                let mut ids = Vec::with_capacity(operations);
                for i in 0..operations {
                    let mut note = Note::new(format!("t{t}-{i}"));
                    match table.create(&mut note) {
                        Ok(id) => ids.push(id),
                        Err(_) => {
                            failed.fetch_add(1, Ordering::Relaxed);
                        }
                    }
                }
                ids
            })
        })
        .collect();

    let ids: Vec<Vec<i64>> = handles
        .into_iter()
        .map(|h| h.join().expect("Stress thread panicked"))
        .collect();
    let successful = ids.iter().map(Vec::len).sum();
    let report = StressReport::finish(successful, failed.load(Ordering::Relaxed), started);
    (report, ids)
}

/// Runs writers and snapshot readers side by side.
///
/// Writers create notes, keeping every second one and deleting the rest
/// right away, and count the kept notes once their create has returned.
/// Each writer therefore has at most one note in flight that the count
/// doesn't cover yet. A reader loads every note and checks the snapshot
/// against the counts read around it:
///
/// - identifiers are positive and unique
/// - no kept note counted before the read is missing
/// - no note beyond the kept ones and one per writer is present
///
/// A reader that sees a lost or phantom write counts as a failure.
pub fn stress_readers_during_writes(table: &Table<Note>, config: &StressConfig) -> StressReport {
    let successful = Arc::new(AtomicUsize::new(0));
    let failed = Arc::new(AtomicUsize::new(0));
    let kept = Arc::new(AtomicUsize::new(0));
    let writers = config.threads.div_ceil(2);
    let baseline = table.count().unwrap_or(0);
    let started = Instant::now();

    let mut handles = Vec::new();
    for t in 0..config.threads {
        let table = table.clone();
        let successful = Arc::clone(&successful);
        let failed = Arc::clone(&failed);
        let kept = Arc::clone(&kept);
        let operations = config.operations;
        let writer = t % 2 == 0;

        handles.push(thread::spawn(move || {
            for i in 0..operations {
                let ok = if writer {
                    let mut note = Note::new(format!("w{t}-{i}"));
                    match table.create(&mut note) {
                        Ok(id) if i % 2 == 0 => table.delete(id).is_ok(),
                        Ok(_) => {
                            kept.fetch_add(1, Ordering::SeqCst);
                            true
                        }
                        Err(_) => false,
                    }
                } else {
                    let kept_before = kept.load(Ordering::SeqCst);
                    let snapshot = table.get_all();
                    let kept_after = kept.load(Ordering::SeqCst);
                    match snapshot {
                        Ok(notes) => {
                            let ids: HashSet<i64> = notes.iter().map(|n| n.id).collect();
                            ids.len() == notes.len()
                                && ids.iter().all(|&id| id > 0)
                                && notes.len() >= baseline + kept_before
                                && notes.len() <= baseline + kept_after + writers
                        }
                        Err(_) => false,
                    }
                };
                let counter = if ok { &successful } else { &failed };
                counter.fetch_add(1, Ordering::Relaxed);
            }
        }));
    }

    for handle in handles {
        handle.join().expect("Stress thread panicked");
    }

    StressReport::finish(
        successful.load(Ordering::Relaxed),
        failed.load(Ordering::Relaxed),
        started,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::TestDatabase;

    #[test]
    fn report_display() {
        let report = StressReport {
            successful_ops: 3,
            failed_ops: 1,
            elapsed: Duration::from_millis(5),
        };
        assert!(!report.is_clean());
        assert_eq!(report.to_string(), "3 ok, 1 failed in 5ms");
    }

    #[test]
    fn writers_keep_every_second_note() {
        let test_db = TestDatabase::memory();
        let notes = test_db.register::<Note>().unwrap();
        let report = stress_readers_during_writes(
            &notes,
            &StressConfig {
                operations: 10,
                threads: 2,
            },
        );
        assert!(report.is_clean(), "{report}");
        assert_eq!(notes.count().unwrap(), 5);
    }
}
