//! Best-effort retry of side effects such as deferred saves.

use std::collections::VecDeque;

use super::StorageResult;

/// A pending operation. It must be safe to run more than once.
pub struct RetryOp {
    label: String,
    attempts: u32,
    op: Box<dyn FnMut() -> StorageResult<()> + Send>,
}

impl RetryOp {
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    fn run(&mut self) -> bool {
        self.attempts += 1;
        match (self.op)() {
            Ok(()) => true,
            Err(e) => {
                log::warn!("{} failed (attempt {}): {}", self.label, self.attempts, e);
                false
            }
        }
    }
}

/// Runs operations immediately and keeps the failures for later.
///
/// Every queued operation is re-invoked on each [`process`](Self::process)
/// until it succeeds.
#[derive(Default)]
pub struct RetryQueue {
    pending: VecDeque<RetryOp>,
}

impl RetryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `op` now. Returns `true` on success; on failure the operation is
    /// queued and `false` is returned.
    pub fn exec<F>(&mut self, label: impl Into<String>, op: F) -> bool
    where
        F: FnMut() -> StorageResult<()> + Send + 'static,
    {
        let mut entry = RetryOp {
            label: label.into(),
            attempts: 0,
            op: Box::new(op),
        };
        if entry.run() {
            return true;
        }
        self.pending.push_back(entry);
        false
    }

    /// Retry every pending operation once, keeping those that fail again.
    /// Returns how many succeeded.
    pub fn process(&mut self) -> usize {
        let mut succeeded = 0;
        for _ in 0..self.pending.len() {
            let Some(mut entry) = self.pending.pop_front() else {
                break;
            };
            if entry.run() {
                log::debug!("{} succeeded after {} attempts", entry.label, entry.attempts);
                succeeded += 1;
            } else {
                self.pending.push_back(entry);
            }
        }
        succeeded
    }

    pub fn pending(&self) -> impl Iterator<Item = &RetryOp> {
        self.pending.iter()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StorageError;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_success_is_not_queued() {
        let mut queue = RetryQueue::new();
        assert!(queue.exec("save", || Ok(())));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_failure_is_retried_until_success() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);
        let mut queue = RetryQueue::new();

        let ok = queue.exec("save", move || {
            let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
            if n < 3 {
                Err(StorageError::Io("disk busy".to_string()))
            } else {
                Ok(())
            }
        });
        assert!(!ok);
        assert_eq!(queue.pending_len(), 1);

        assert_eq!(queue.process(), 0);
        assert_eq!(queue.pending().next().map(RetryOp::attempts), Some(2));

        assert_eq!(queue.process(), 1);
        assert!(queue.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_process_keeps_order_of_failures() {
        let mut queue = RetryQueue::new();
        queue.exec("a", || Err(StorageError::Other("a".to_string())));
        queue.exec("b", || Ok(()));
        queue.exec("c", || Err(StorageError::Other("c".to_string())));
        assert_eq!(queue.process(), 0);
        let labels: Vec<&str> = queue.pending().map(RetryOp::label).collect();
        assert_eq!(labels, vec!["a", "c"]);
    }
}
