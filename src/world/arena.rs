//! Slot arena holding every chunk the world has ever allocated.
//!
//! A slot is either live (its chunk is in the active set), pooled (retired
//! storage waiting on the free list), or checked out to a generator. Every
//! retirement bumps the slot's generation tag, so a [`ChunkHandle`] taken
//! before an eviction no longer resolves afterwards.

use crate::core::chunk::Chunk;
use crate::core::position::ChunkPosition;

/// Stable reference to an active chunk. Stale once that chunk is evicted.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ChunkHandle {
    position: ChunkPosition,
    slot: u32,
    generation: u32,
}

impl ChunkHandle {
    pub fn position(&self) -> ChunkPosition {
        self.position
    }
}

struct Slot {
    generation: u32,
    live: bool,
    chunk: Option<Chunk>,
}

/// Free list of retired slots, reused before the arena grows.
#[derive(Default)]
pub struct ChunkPool {
    free: Vec<u32>,
}

impl ChunkPool {
    fn push(&mut self, slot: u32) {
        self.free.push(slot);
    }

    fn pop(&mut self) -> Option<u32> {
        self.free.pop()
    }

    pub fn len(&self) -> usize {
        self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.free.is_empty()
    }
}

/// A chunk checked out of the arena for generation outside the lock.
#[must_use]
#[derive(Debug)]
pub struct Reservation {
    position: ChunkPosition,
    slot: u32,
}

impl Reservation {
    pub fn position(&self) -> ChunkPosition {
        self.position
    }
}

#[derive(Default)]
pub struct ChunkArena {
    slots: Vec<Slot>,
    pool: ChunkPool,
    live: usize,
}

impl ChunkArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pops retired storage (reset in place) or allocates a new slot, and hands
    /// its chunk out bound to `position`.
    pub fn acquire(&mut self, position: ChunkPosition) -> (Reservation, Chunk) {
        if let Some(slot) = self.pool.pop() {
            let chunk = match self.slots[slot as usize].chunk.take() {
                Some(mut chunk) => {
                    chunk.reset_for_reuse(position);
                    chunk
                }
                None => Chunk::new(position),
            };
            return (Reservation { position, slot }, chunk);
        }

        let slot = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            live: false,
            chunk: None,
        });
        (Reservation { position, slot }, Chunk::new(position))
    }

    /// Stores a generated chunk in its reserved slot and makes it live.
    pub fn commit(&mut self, reservation: Reservation, chunk: Chunk) -> ChunkHandle {
        let entry = &mut self.slots[reservation.slot as usize];
        entry.chunk = Some(chunk);
        entry.live = true;
        self.live += 1;
        ChunkHandle {
            position: reservation.position,
            slot: reservation.slot,
            generation: entry.generation,
        }
    }

    /// Returns checked-out storage straight to the pool without making it live.
    pub fn discard(&mut self, reservation: Reservation, chunk: Chunk) {
        self.slots[reservation.slot as usize].chunk = Some(chunk);
        self.pool.push(reservation.slot);
    }

    /// Moves a live chunk into the pool. Returns false for a stale handle.
    pub fn retire(&mut self, handle: ChunkHandle) -> bool {
        if self.get(handle).is_none() {
            return false;
        }
        let entry = &mut self.slots[handle.slot as usize];
        entry.live = false;
        entry.generation = entry.generation.wrapping_add(1);
        self.live -= 1;
        self.pool.push(handle.slot);
        true
    }

    pub fn get(&self, handle: ChunkHandle) -> Option<&Chunk> {
        let entry = self.slots.get(handle.slot as usize)?;
        if !entry.live || entry.generation != handle.generation {
            return None;
        }
        entry.chunk.as_ref()
    }

    pub fn get_mut(&mut self, handle: ChunkHandle) -> Option<&mut Chunk> {
        let entry = self.slots.get_mut(handle.slot as usize)?;
        if !entry.live || entry.generation != handle.generation {
            return None;
        }
        entry.chunk.as_mut()
    }

    /// Live chunks.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Retired chunks waiting for reuse.
    pub fn pooled(&self) -> usize {
        self.pool.len()
    }

    /// Slots ever allocated.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::block::BlockType;

    fn live_chunk(arena: &mut ChunkArena, pos: ChunkPosition) -> ChunkHandle {
        let (reservation, mut chunk) = arena.acquire(pos);
        chunk.set_block(1, 1, 1, BlockType::Stone);
        chunk.set_generated(true);
        arena.commit(reservation, chunk)
    }

    #[test]
    fn commit_then_get() {
        let mut arena = ChunkArena::new();
        let handle = live_chunk(&mut arena, ChunkPosition::new(2, 3));
        let chunk = arena.get(handle).unwrap();
        assert_eq!(chunk.position(), ChunkPosition::new(2, 3));
        assert_eq!(handle.position(), ChunkPosition::new(2, 3));
        assert_eq!(arena.len(), 1);
        assert_eq!(arena.pooled(), 0);
    }

    #[test]
    fn retired_handle_goes_stale() {
        let mut arena = ChunkArena::new();
        let handle = live_chunk(&mut arena, ChunkPosition::new(0, 0));
        assert!(arena.retire(handle));
        assert!(arena.get(handle).is_none());
        assert!(!arena.retire(handle));
        assert_eq!(arena.len(), 0);
        assert_eq!(arena.pooled(), 1);

        // Slot reuse under a new tag keeps the old handle stale
        let reused = live_chunk(&mut arena, ChunkPosition::new(5, 5));
        assert_eq!(arena.capacity(), 1);
        assert!(arena.get(handle).is_none());
        assert_eq!(arena.get(reused).unwrap().position(), ChunkPosition::new(5, 5));
    }

    #[test]
    fn reused_storage_is_reset() {
        let mut arena = ChunkArena::new();
        let handle = live_chunk(&mut arena, ChunkPosition::new(0, 0));
        arena.retire(handle);

        let (reservation, chunk) = arena.acquire(ChunkPosition::new(-4, 1));
        assert_eq!(chunk.block_count(), 0);
        assert!(!chunk.is_generated());
        assert_eq!(chunk.position(), ChunkPosition::new(-4, 1));
        assert_eq!(reservation.position(), ChunkPosition::new(-4, 1));
        assert_eq!(arena.pooled(), 0);
        arena.discard(reservation, chunk);
    }

    #[test]
    fn discard_returns_to_pool() {
        let mut arena = ChunkArena::new();
        let (reservation, chunk) = arena.acquire(ChunkPosition::new(1, 1));
        arena.discard(reservation, chunk);
        assert_eq!(arena.len(), 0);
        assert_eq!(arena.pooled(), 1);

        let (reservation, chunk) = arena.acquire(ChunkPosition::new(2, 2));
        assert_eq!(arena.capacity(), 1);
        arena.commit(reservation, chunk);
        assert_eq!(arena.len(), 1);
    }
}
