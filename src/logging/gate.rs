//! One-time initialization gate
//!
//! `Uninitialized -> Initialized`, never back. The first caller to flip the
//! flag runs the startup sequence; everyone else returns immediately.

use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Default)]
pub struct InitGate {
    initialized: AtomicBool,
}

impl InitGate {
    pub const fn new() -> Self {
        Self {
            initialized: AtomicBool::new(false),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    /// Run `startup` if this call wins the transition. Returns whether it ran.
    pub fn run_once(&self, startup: impl FnOnce()) -> bool {
        if self.is_initialized() {
            return false;
        }
        if self
            .initialized
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return false;
        }
        startup();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::{Arc, Barrier};
    use std::thread;

    #[test]
    fn test_runs_once_sequential() {
        let gate = InitGate::new();
        let mut runs = 0;

        assert!(gate.run_once(|| runs += 1));
        assert!(!gate.run_once(|| runs += 1));
        assert_eq!(runs, 1);
        assert!(gate.is_initialized());
    }

    #[test]
    fn test_runs_once_concurrent() {
        const THREADS: usize = 16;
        let gate = Arc::new(InitGate::new());
        let runs = Arc::new(AtomicUsize::new(0));
        let barrier = Arc::new(Barrier::new(THREADS));

        let workers: Vec<_> = (0..THREADS)
            .map(|_| {
                let (gate, runs, barrier) = (gate.clone(), runs.clone(), barrier.clone());
                thread::spawn(move || {
                    barrier.wait();
                    gate.run_once(|| {
                        runs.fetch_add(1, Ordering::SeqCst);
                    })
                })
            })
            .collect();

        let winners = workers
            .into_iter()
            .map(|w| w.join().unwrap())
            .filter(|ran| *ran)
            .count();

        assert_eq!(winners, 1);
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }
}
