use std::collections::VecDeque;
use std::sync::Mutex;

use chrono::{DateTime, Utc};

/// FIFO of detection instants waiting to be reported.
///
/// Unbounded: a caller that never polls lets entries pile up.
#[derive(Debug, Default)]
pub struct DetectionQueue {
    entries: Mutex<VecDeque<DateTime<Utc>>>,
}

impl DetectionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, at: DateTime<Utc>) {
        match self.entries.lock() {
            Ok(mut entries) => entries.push_back(at),
            Err(poisoned) => poisoned.into_inner().push_back(at),
        }
    }

    /// Remove and return the oldest detection, if any.
    pub fn pop(&self) -> Option<DateTime<Utc>> {
        match self.entries.lock() {
            Ok(mut entries) => entries.pop_front(),
            Err(poisoned) => poisoned.into_inner().pop_front(),
        }
    }

    pub fn len(&self) -> usize {
        match self.entries.lock() {
            Ok(entries) => entries.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use std::sync::Arc;

    #[test]
    fn test_pop_empty() {
        let queue = DetectionQueue::new();
        assert_eq!(queue.pop(), None);
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn test_fifo_order() {
        let queue = DetectionQueue::new();
        let base = Utc::now();
        let instants: Vec<_> = (0..5).map(|i| base + Duration::seconds(i)).collect();
        for at in &instants {
            queue.push(*at);
        }

        let drained: Vec<_> = std::iter::from_fn(|| queue.pop()).collect();
        assert_eq!(drained, instants);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_concurrent_pops_never_duplicate() {
        let queue = Arc::new(DetectionQueue::new());
        let base = Utc::now();
        for i in 0..1000 {
            queue.push(base + Duration::milliseconds(i));
        }

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let queue = queue.clone();
                std::thread::spawn(move || std::iter::from_fn(|| queue.pop()).collect::<Vec<_>>())
            })
            .collect();

        let mut all: Vec<_> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        all.sort();
        all.dedup();
        assert_eq!(all.len(), 1000);
    }
}
