//! Reusable barrier built on a mutex and one condition variable.
//!
//! The barrier counts arrivals under the mutex. The participant that completes the
//! count resets it to zero, advances the generation and wakes everyone, all before it
//! lets go of the mutex. A waiter remembers the generation it arrived in and keeps
//! waiting until that generation has moved on, so spurious wakeups and back-to-back
//! reuse cannot release it early or twice.

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

/// Panic payload raised by [`Barrier::arrive_and_wait`] on a poisoned barrier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BarrierPoisoned;

/// What a participant learns when it is released.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BarrierWaitResult {
    leader: bool,
    generation: u64,
}

impl BarrierWaitResult {
    /// True for exactly one participant per generation: the last to arrive.
    pub fn is_leader(&self) -> bool {
        self.leader
    }

    /// Generation this participant arrived in.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Default)]
struct BarrierState {
    arrived: usize,
    generation: u64,
    poisoned: bool,
}

/// Cyclic barrier for a fixed number of participants.
#[derive(Debug)]
pub struct Barrier {
    state: Mutex<BarrierState>,
    released: Condvar,
    participants: usize,
}

impl Barrier {
    /// # Panics
    ///
    /// Panics if `participants == 0`.
    pub fn new(participants: usize) -> Self {
        assert!(participants > 0, "barrier needs at least one participant");
        Self {
            state: Mutex::new(BarrierState::default()),
            released: Condvar::new(),
            participants,
        }
    }

    /// Block until `participants` callers have arrived, then release them all.
    ///
    /// Precondition: exactly `participants` threads call this once per generation.
    /// Fewer callers block forever; more callers spill into the next generation.
    ///
    /// # Panics
    ///
    /// Panics with a [`BarrierPoisoned`] payload if the barrier is poisoned before
    /// this caller's generation completes.
    pub fn arrive_and_wait(&self) -> BarrierWaitResult {
        let mut state = self.lock();
        if state.poisoned {
            drop(state);
            std::panic::panic_any(BarrierPoisoned);
        }

        let generation = state.generation;
        state.arrived += 1;

        if state.arrived == self.participants {
            state.arrived = 0;
            state.generation = state.generation.wrapping_add(1);
            self.released.notify_all();
            return BarrierWaitResult {
                leader: true,
                generation,
            };
        }

        while state.generation == generation && !state.poisoned {
            state = self
                .released
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }

        if state.generation == generation {
            drop(state);
            std::panic::panic_any(BarrierPoisoned);
        }

        BarrierWaitResult {
            leader: false,
            generation,
        }
    }

    /// Release every waiter with a panic and make all later arrivals panic.
    pub fn poison(&self) {
        let mut state = self.lock();
        if !state.poisoned {
            state.poisoned = true;
            self.released.notify_all();
        }
    }

    pub fn is_poisoned(&self) -> bool {
        self.lock().poisoned
    }

    /// Number of completed generations.
    pub fn generation(&self) -> u64 {
        self.lock().generation
    }

    // Barrier state is only mutated before any panic point, so a poisoned std mutex
    // still guards consistent data.
    fn lock(&self) -> MutexGuard<'_, BarrierState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    fn hammer(participants: usize, waits: usize) {
        let barrier = Barrier::new(participants);
        let arrivals = AtomicUsize::new(0);
        let leaders = AtomicUsize::new(0);

        thread::scope(|scope| {
            for _ in 0..participants {
                scope.spawn(|| {
                    for k in 0..waits {
                        arrivals.fetch_add(1, Ordering::SeqCst);
                        let result = barrier.arrive_and_wait();
                        // Nobody leaves generation k before all of its arrivals
                        assert!(arrivals.load(Ordering::SeqCst) >= (k + 1) * participants);
                        assert_eq!(result.generation(), k as u64);
                        if result.is_leader() {
                            leaders.fetch_add(1, Ordering::SeqCst);
                        }
                    }
                });
            }
        });

        assert_eq!(leaders.load(Ordering::SeqCst), waits);
        assert_eq!(barrier.generation(), waits as u64);
    }

    #[test]
    fn test_single_participant_never_blocks() {
        hammer(1, 1);
        hammer(1, 100);
    }

    #[test]
    fn test_two_participants() {
        hammer(2, 1);
        hammer(2, 100);
    }

    #[test]
    fn test_ten_participants() {
        hammer(10, 1);
        hammer(10, 100);
    }

    #[test]
    fn test_waiter_blocks_until_last_arrival() {
        let barrier = Barrier::new(2);
        let released = AtomicUsize::new(0);

        thread::scope(|scope| {
            scope.spawn(|| {
                barrier.arrive_and_wait();
                released.fetch_add(1, Ordering::SeqCst);
            });

            thread::sleep(Duration::from_millis(50));
            assert_eq!(released.load(Ordering::SeqCst), 0);

            let result = barrier.arrive_and_wait();
            assert!(result.is_leader());
        });

        assert_eq!(released.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_poison_releases_waiters_with_panic() {
        let barrier = Barrier::new(3);

        thread::scope(|scope| {
            let waiter = scope.spawn(|| barrier.arrive_and_wait());

            while barrier.lock().arrived == 0 {
                thread::yield_now();
            }
            barrier.poison();

            let payload = waiter.join().unwrap_err();
            assert!(payload.is::<BarrierPoisoned>());
        });

        assert!(barrier.is_poisoned());
    }

    #[test]
    fn test_poisoned_barrier_rejects_new_arrivals() {
        let barrier = Barrier::new(1);
        barrier.poison();

        let payload = std::panic::catch_unwind(|| barrier.arrive_and_wait()).unwrap_err();

        assert!(payload.is::<BarrierPoisoned>());
        assert_eq!(barrier.generation(), 0);
    }

    #[test]
    #[should_panic(expected = "at least one participant")]
    fn test_zero_participants_panics() {
        let _ = Barrier::new(0);
    }
}
