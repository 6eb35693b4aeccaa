//! Fixed-size worker pool that fans keys out to validators and collects results

use anyhow::{Context, Result};
use crossbeam_channel::{bounded, Receiver, Sender};
use indicatif::ProgressBar;

use super::validator::{Transport, ValidationResult, Validator};

/// Validate every key exactly once using `workers` threads
///
/// # Arguments
/// * `keys` - Keys to validate, already trimmed
/// * `workers` - Number of worker threads (must be at least 1)
/// * `validator` - Validator shared by all workers
///
/// # Returns
/// One result per input key, in no particular order
pub fn dispatch<T: Transport>(
    keys: &[String],
    workers: usize,
    validator: &Validator<T>,
) -> Result<Vec<ValidationResult>> {
    dispatch_with_progress(keys, workers, validator, &ProgressBar::hidden())
}

/// Same as [`dispatch`], ticking `progress` once per finished key
pub fn dispatch_with_progress<T: Transport>(
    keys: &[String],
    workers: usize,
    validator: &Validator<T>,
    progress: &ProgressBar,
) -> Result<Vec<ValidationResult>> {
    if workers == 0 {
        anyhow::bail!("Worker pool needs at least one worker");
    }

    // Both queues hold the whole key list, so neither side ever blocks on a full queue.
    let (job_tx, job_rx) = bounded::<&str>(keys.len());
    let (result_tx, result_rx) = bounded::<ValidationResult>(keys.len());

    for key in keys {
        if job_tx.send(key.as_str()).is_err() {
            anyhow::bail!("Job queue closed before all keys were queued");
        }
    }
    // Closing the queue: workers exit once it is drained.
    drop(job_tx);

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|idx| format!("key-worker-{}", idx))
        .build()
        .context("Failed to build worker pool")?;

    // The scope returns only after every spawned worker has exited.
    pool.scope(|scope| {
        for _ in 0..workers {
            let jobs = job_rx.clone();
            let results = result_tx.clone();
            scope.spawn(move |_| run_worker(&jobs, &results, validator, progress));
        }
    });

    // Last sender gone; draining below cannot block.
    drop(result_tx);

    let results: Vec<ValidationResult> = result_rx.iter().collect();
    debug_assert_eq!(results.len(), keys.len());
    Ok(results)
}

fn run_worker<T: Transport>(
    jobs: &Receiver<&str>,
    results: &Sender<ValidationResult>,
    validator: &Validator<T>,
    progress: &ProgressBar,
) {
    for key in jobs.iter() {
        let result = validator.validate(key);
        progress.inc(1);
        if results.send(result).is_err() {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::validator::TransportError;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::thread;
    use std::time::Duration;

    /// Rejects keys starting with "bad", fails transport for keys starting with "down"
    struct StubTransport {
        calls: AtomicUsize,
    }

    impl StubTransport {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl Transport for StubTransport {
        fn get(&self, url: &str) -> Result<String, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let key = url.rsplit('=').next().unwrap_or_default();
            if key.starts_with("down") {
                Err(TransportError::Request("connection refused".to_string()))
            } else if key.starts_with("bad") {
                Ok("Could not authenticate".to_string())
            } else {
                Ok(r#"{"status":"ok"}"#.to_string())
            }
        }
    }

    fn keys(n: usize) -> Vec<String> {
        (0..n)
            .map(|i| {
                if i % 3 == 0 {
                    format!("bad{}", i)
                } else {
                    format!("good{}", i)
                }
            })
            .collect()
    }

    fn classifications(results: &[ValidationResult]) -> HashMap<String, bool> {
        results
            .iter()
            .map(|r| (r.key.clone(), r.is_valid))
            .collect()
    }

    #[test]
    fn test_every_key_processed_once() {
        for workers in [1, 2, 4, 7, 16] {
            let validator = Validator::new(StubTransport::new(), "http://stub/?apiKey=");
            let input = keys(23);

            let results = dispatch(&input, workers, &validator).unwrap();

            assert_eq!(results.len(), input.len(), "workers = {}", workers);
            assert_eq!(validator.transport().calls.load(Ordering::SeqCst), input.len());

            let mut got: Vec<_> = results.iter().map(|r| r.key.clone()).collect();
            let mut want = input.clone();
            got.sort();
            want.sort();
            assert_eq!(got, want, "workers = {}", workers);
        }
    }

    #[test]
    fn test_keys_borrowed_from_short_lived_buffer() {
        let validator = Validator::new(StubTransport::new(), "http://stub/?apiKey=");
        let results = {
            let input: Vec<String> = "good1 bad2 good3".split(' ').map(String::from).collect();
            dispatch(&input, 2, &validator).unwrap()
        };

        assert_eq!(results.len(), 3);
        assert_eq!(results.iter().filter(|r| r.is_valid).count(), 2);
    }

    #[test]
    fn test_duplicate_keys_are_kept() {
        let validator = Validator::new(StubTransport::new(), "http://stub/?apiKey=");
        let input = vec!["good1".to_string(), "good1".to_string(), "bad1".to_string()];

        let results = dispatch(&input, 3, &validator).unwrap();

        assert_eq!(results.len(), 3);
        assert_eq!(results.iter().filter(|r| r.key == "good1").count(), 2);
    }

    #[test]
    fn test_worker_count_does_not_change_classification() {
        let input = keys(50);

        let serial = dispatch(&input, 1, &Validator::new(StubTransport::new(), "http://stub/?apiKey=")).unwrap();
        let parallel = dispatch(&input, 10, &Validator::new(StubTransport::new(), "http://stub/?apiKey=")).unwrap();

        assert_eq!(classifications(&serial), classifications(&parallel));
        let valid = serial.iter().filter(|r| r.is_valid).count();
        assert_eq!(valid, 33);
        assert_eq!(serial.len() - valid, 17);
    }

    #[test]
    fn test_more_workers_than_keys() {
        let validator = Validator::new(StubTransport::new(), "http://stub/?apiKey=");
        let input = keys(2);

        let results = dispatch(&input, 32, &validator).unwrap();
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn test_empty_key_list() {
        let validator = Validator::new(StubTransport::new(), "http://stub/?apiKey=");
        let results = dispatch(&[], 4, &validator).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_zero_workers_rejected() {
        let validator = Validator::new(StubTransport::new(), "http://stub/?apiKey=");
        assert!(dispatch(&keys(3), 0, &validator).is_err());
    }

    #[test]
    fn test_transport_failure_does_not_abort_pool() {
        let validator = Validator::new(StubTransport::new(), "http://stub/?apiKey=");
        let input = vec![
            "good1".to_string(),
            "down1".to_string(),
            "good2".to_string(),
            "down2".to_string(),
        ];

        let results = dispatch(&input, 2, &validator).unwrap();

        assert_eq!(results.len(), 4);
        let by_key = classifications(&results);
        assert!(by_key["good1"]);
        assert!(by_key["good2"]);
        assert!(!by_key["down1"]);
        assert!(!by_key["down2"]);
        assert_eq!(results.iter().filter(|r| r.error.is_some()).count(), 2);
    }

    #[test]
    fn test_progress_ticks_once_per_key() {
        let validator = Validator::new(StubTransport::new(), "http://stub/?apiKey=");
        let progress = ProgressBar::hidden();
        let input = keys(9);

        dispatch_with_progress(&input, 3, &validator, &progress).unwrap();
        assert_eq!(progress.position(), 9);
    }

    /// Sleeps inside every request and tracks how many are in flight at once
    struct SlowTransport {
        in_flight: AtomicUsize,
        peak: Mutex<usize>,
    }

    impl Transport for SlowTransport {
        fn get(&self, _url: &str) -> Result<String, TransportError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            {
                let mut peak = self.peak.lock().unwrap();
                *peak = (*peak).max(now);
            }
            thread::sleep(Duration::from_millis(50));
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(String::new())
        }
    }

    #[test]
    fn test_concurrency_bounded_by_worker_count() {
        let validator = Validator::new(
            SlowTransport {
                in_flight: AtomicUsize::new(0),
                peak: Mutex::new(0),
            },
            "http://stub/?apiKey=",
        );
        let input = keys(12);

        let results = dispatch(&input, 4, &validator).unwrap();
        assert_eq!(results.len(), 12);

        let peak = *validator.transport().peak.lock().unwrap();
        assert!(peak <= 4, "peak in-flight {} exceeds worker count", peak);
        assert!(peak > 1, "requests never overlapped");
    }
}
