//! Background chunk generation
//!
//! One worker thread drains a FIFO of requested positions. The active set,
//! the queue and the chunk arena share a single lock; the condition variable
//! is only used for the worker's idle wait. Terrain is generated with the
//! lock released, then inserted only if the position is still absent.

use std::collections::VecDeque;
use std::collections::hash_map::Entry;
use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use parking_lot::{Condvar, Mutex};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::core::chunk::Chunk;
use crate::core::position::ChunkPosition;
use crate::world::arena::{ChunkArena, ChunkHandle, Reservation};
use crate::world::generator::TerrainGenerator;

/// Result of handing a generated chunk back to the active set.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum InsertOutcome {
    Inserted(ChunkHandle),
    /// The position became active while this copy was generated; the copy went to the pool.
    Discarded,
}

#[derive(Default)]
pub(crate) struct SharedState {
    pub(crate) active: FxHashMap<ChunkPosition, ChunkHandle>,
    pub(crate) arena: ChunkArena,
    queue: VecDeque<ChunkPosition>,
    /// Queued or being generated by the worker.
    pending: FxHashSet<ChunkPosition>,
    stop: bool,
}

impl SharedState {
    /// Queues `position` unless it is already active, pending, or the worker has stopped.
    pub(crate) fn request(&mut self, position: ChunkPosition) -> bool {
        if self.stop || self.active.contains_key(&position) || !self.pending.insert(position) {
            return false;
        }
        self.queue.push_back(position);
        true
    }

    pub(crate) fn insert_if_absent(
        &mut self,
        reservation: Reservation,
        chunk: Chunk,
    ) -> InsertOutcome {
        match self.active.entry(reservation.position()) {
            Entry::Occupied(_) => {
                self.arena.discard(reservation, chunk);
                InsertOutcome::Discarded
            }
            Entry::Vacant(slot) => {
                let handle = self.arena.commit(reservation, chunk);
                slot.insert(handle);
                InsertOutcome::Inserted(handle)
            }
        }
    }

    /// Drops a still-queued request for `position` once it became active some other way.
    /// A request the worker already took stays pending until the worker settles it.
    fn withdraw_queued(&mut self, position: ChunkPosition) {
        let before = self.queue.len();
        self.queue.retain(|queued| *queued != position);
        if self.queue.len() != before {
            self.pending.remove(&position);
        }
    }

    pub(crate) fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub(crate) fn is_pending(&self, position: ChunkPosition) -> bool {
        self.pending.contains(&position)
    }
}

pub(crate) struct Shared {
    pub(crate) state: Mutex<SharedState>,
    wake: Condvar,
    pub(crate) generator: TerrainGenerator,
}

impl Shared {
    pub(crate) fn new(generator: TerrainGenerator) -> Self {
        Shared {
            state: Mutex::new(SharedState::default()),
            wake: Condvar::new(),
            generator,
        }
    }

    pub(crate) fn notify_worker(&self) {
        self.wake.notify_one();
    }

    /// Generates `position` with the lock released and inserts it if still absent.
    /// Returns `None` when the position was already active before any work started.
    /// `queued` marks a request taken off the worker queue, which clears its pending entry.
    pub(crate) fn generate(&self, position: ChunkPosition, queued: bool) -> Option<InsertOutcome> {
        let (reservation, mut chunk) = {
            let mut state = self.state.lock();
            if state.active.contains_key(&position) {
                if queued {
                    state.pending.remove(&position);
                }
                return None;
            }
            state.arena.acquire(position)
        };

        self.generator.generate_terrain(&mut chunk);

        let mut state = self.state.lock();
        if queued {
            state.pending.remove(&position);
        }
        let outcome = state.insert_if_absent(reservation, chunk);
        if !queued && matches!(outcome, InsertOutcome::Inserted(_)) {
            state.withdraw_queued(position);
        }
        Some(outcome)
    }
}

/// Owns the generation worker thread.
pub struct ChunkLoader {
    shared: Arc<Shared>,
    handle: Option<JoinHandle<()>>,
}

impl ChunkLoader {
    pub(crate) fn spawn(shared: Arc<Shared>) -> io::Result<Self> {
        let worker_shared = Arc::clone(&shared);
        let handle = thread::Builder::new()
            .name("chunk-gen".to_string())
            .spawn(move || run_worker(&worker_shared))?;

        Ok(ChunkLoader {
            shared,
            handle: Some(handle),
        })
    }

    /// Stops the worker and waits for it. Requests still queued are dropped.
    pub fn shutdown(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };

        let dropped = {
            let mut state = self.shared.state.lock();
            state.stop = true;
            let dropped = state.queue.len();
            state.queue.clear();
            state.pending.clear();
            dropped
        };
        self.shared.wake.notify_all();

        if handle.join().is_err() {
            tracing::error!("Chunk generation worker panicked");
        }
        tracing::debug!(dropped, "Chunk generation worker stopped");
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }
}

impl Drop for ChunkLoader {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run_worker(shared: &Shared) {
    loop {
        let position = {
            let mut state = shared.state.lock();
            while state.queue.is_empty() && !state.stop {
                shared.wake.wait(&mut state);
            }
            if state.stop {
                break;
            }
            match state.queue.pop_front() {
                Some(position) => position,
                None => continue,
            }
        };

        match shared.generate(position, true) {
            Some(InsertOutcome::Inserted(_)) => {
                tracing::trace!(x = position.x, z = position.z, "Generated chunk");
            }
            Some(InsertOutcome::Discarded) => {
                tracing::debug!(
                    x = position.x,
                    z = position.z,
                    "Chunk became active during generation, discarded to pool"
                );
            }
            None => {
                tracing::trace!(x = position.x, z = position.z, "Skipped request for active chunk");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_requests_are_ignored() {
        let mut state = SharedState::default();
        let pos = ChunkPosition::new(1, -1);
        assert!(state.request(pos));
        assert!(!state.request(pos));
        assert_eq!(state.queue.len(), 1);
        assert!(state.is_pending(pos));
        assert_eq!(state.pending_count(), 1);
    }

    #[test]
    fn requests_for_active_chunks_are_ignored() {
        let mut state = SharedState::default();
        let pos = ChunkPosition::new(0, 0);
        let (reservation, chunk) = state.arena.acquire(pos);
        state.insert_if_absent(reservation, chunk);
        assert!(!state.request(pos));
        assert_eq!(state.pending_count(), 0);
    }

    #[test]
    fn race_loser_goes_to_pool() {
        let mut state = SharedState::default();
        let pos = ChunkPosition::new(3, 3);
        let (first, first_chunk) = state.arena.acquire(pos);
        let (second, second_chunk) = state.arena.acquire(pos);

        let winner = state.insert_if_absent(first, first_chunk);
        assert!(matches!(winner, InsertOutcome::Inserted(_)));
        assert_eq!(state.insert_if_absent(second, second_chunk), InsertOutcome::Discarded);

        assert_eq!(state.active.len(), 1);
        assert_eq!(state.arena.len(), 1);
        assert_eq!(state.arena.pooled(), 1);
        if let InsertOutcome::Inserted(handle) = winner {
            assert_eq!(state.active[&pos], handle);
        }
    }

    #[test]
    fn synchronous_generation_withdraws_queued_request() {
        let shared = Shared::new(TerrainGenerator::new(11));
        let pos = ChunkPosition::new(-2, 4);
        let other = ChunkPosition::new(5, 5);
        {
            let mut state = shared.state.lock();
            assert!(state.request(pos));
            assert!(state.request(other));
        }

        let outcome = shared.generate(pos, false);
        assert!(matches!(outcome, Some(InsertOutcome::Inserted(_))));

        let state = shared.state.lock();
        assert!(state.active.contains_key(&pos));
        assert!(!state.is_pending(pos));
        assert_eq!(state.queue.iter().copied().collect::<Vec<_>>(), vec![other]);
        assert_eq!(state.pending_count(), 1);
    }

    #[test]
    fn synchronous_generation_leaves_in_flight_request_to_worker() {
        let shared = Shared::new(TerrainGenerator::new(11));
        let pos = ChunkPosition::new(0, 1);
        {
            let mut state = shared.state.lock();
            state.request(pos);
            // taken by the worker, not yet inserted
            assert_eq!(state.queue.pop_front(), Some(pos));
        }

        shared.generate(pos, false);
        assert!(shared.state.lock().is_pending(pos));

        assert_eq!(shared.generate(pos, true), None);
        assert!(!shared.state.lock().is_pending(pos));
    }

    #[test]
    fn worker_drains_queue_and_stops() {
        let shared = Arc::new(Shared::new(TerrainGenerator::new(3)));
        let mut loader = ChunkLoader::spawn(Arc::clone(&shared)).unwrap();
        {
            let mut state = shared.state.lock();
            for x in 0..3 {
                state.request(ChunkPosition::new(x, 0));
            }
        }
        shared.notify_worker();

        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(10);
        while shared.state.lock().active.len() < 3 && std::time::Instant::now() < deadline {
            thread::sleep(std::time::Duration::from_millis(5));
        }
        assert_eq!(shared.state.lock().active.len(), 3);
        assert_eq!(shared.state.lock().pending_count(), 0);

        loader.shutdown();
        assert!(!loader.is_running());
        assert!(!shared.state.lock().request(ChunkPosition::new(9, 9)));
    }
}
