//! Per-session stage memoization.
//!
//! First access computes; concurrent accesses for the same key block on
//! the per-key slot until the computation finishes, then share the value.
//! At most one in-process computation runs per key.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use weft_core::Result;

#[derive(Debug, Default)]
pub struct Memo {
    slots: Mutex<HashMap<String, Arc<Mutex<Option<PathBuf>>>>>,
}

impl Memo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the memoized value for `key`, running `compute` if no caller
    /// has produced it yet. Failures are not memoized; they abort the
    /// pipeline anyway.
    pub fn get_or_compute(
        &self,
        key: &str,
        compute: impl FnOnce() -> Result<PathBuf>,
    ) -> Result<PathBuf> {
        let slot = {
            let mut slots = self.slots.lock().unwrap();
            slots.entry(key.to_string()).or_default().clone()
        };
        // Outer map lock is released; only callers of this key contend here.
        let mut value = slot.lock().unwrap();
        if let Some(path) = value.as_ref() {
            return Ok(path.clone());
        }
        let path = compute()?;
        *value = Some(path.clone());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Barrier;

    #[test]
    fn test_computes_once() {
        let memo = Memo::new();
        let calls = AtomicUsize::new(0);
        let compute = || {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(PathBuf::from("/tmp/a"))
        };
        assert_eq!(memo.get_or_compute("k", compute).unwrap(), PathBuf::from("/tmp/a"));
        assert_eq!(
            memo.get_or_compute("k", || panic!("already memoized")).unwrap(),
            PathBuf::from("/tmp/a")
        );
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_distinct_keys_compute_separately() {
        let memo = Memo::new();
        memo.get_or_compute("a", || Ok(PathBuf::from("/a"))).unwrap();
        let b = memo.get_or_compute("b", || Ok(PathBuf::from("/b"))).unwrap();
        assert_eq!(b, PathBuf::from("/b"));
    }

    #[test]
    fn test_failure_not_memoized() {
        let memo = Memo::new();
        let err = memo.get_or_compute("k", || {
            Err(weft_core::WeftError::stage("merge", anyhow::anyhow!("boom")))
        });
        assert!(err.is_err());
        let ok = memo.get_or_compute("k", || Ok(PathBuf::from("/retry"))).unwrap();
        assert_eq!(ok, PathBuf::from("/retry"));
    }

    #[test]
    fn test_concurrent_callers_share_one_computation() {
        let memo = Arc::new(Memo::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let barrier = Arc::new(Barrier::new(4));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let memo = memo.clone();
                let calls = calls.clone();
                let barrier = barrier.clone();
                std::thread::spawn(move || {
                    barrier.wait();
                    memo.get_or_compute("shared", || {
                        calls.fetch_add(1, Ordering::SeqCst);
                        std::thread::sleep(std::time::Duration::from_millis(20));
                        Ok(PathBuf::from("/shared"))
                    })
                    .unwrap()
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), PathBuf::from("/shared"));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
