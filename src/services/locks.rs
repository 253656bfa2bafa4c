use parking_lot::{lock_api::ArcMutexGuard, Mutex, RawMutex};
use std::{collections::HashMap, sync::Arc};

pub type WriteGuard = ArcMutexGuard<RawMutex, ()>;

/// Named single-writer locks around read-modify-write cycles.
///
/// Holders must take a catalog lock before the draft lock, never the reverse.
#[derive(Debug, Default)]
pub struct WriteLocks {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl WriteLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn acquire(&self, name: &str) -> WriteGuard {
        let lock = {
            let mut locks = self.locks.lock();
            locks.entry(name.to_string()).or_default().clone()
        };
        lock.lock_arc()
    }

    pub fn catalog(&self, locale: &str) -> WriteGuard {
        self.acquire(&format!("catalog:{locale}"))
    }

    pub fn draft(&self) -> WriteGuard {
        self.acquire("draft")
    }

    pub fn job(&self) -> WriteGuard {
        self.acquire("job")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    #[test]
    fn same_name_is_exclusive() {
        let locks = Arc::new(WriteLocks::new());
        let inside = Arc::new(AtomicUsize::new(0));
        let max_seen = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let locks = locks.clone();
                let inside = inside.clone();
                let max_seen = max_seen.clone();
                thread::spawn(move || {
                    for _ in 0..50 {
                        let _guard = locks.catalog("tr_TR");
                        let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                        max_seen.fetch_max(now, Ordering::SeqCst);
                        inside.fetch_sub(1, Ordering::SeqCst);
                    }
                })
            })
            .collect();

        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(max_seen.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn different_names_do_not_block() {
        let locks = WriteLocks::new();
        let _a = locks.catalog("en_US");
        let _b = locks.catalog("tr_TR");
        let _c = locks.draft();
    }
}
