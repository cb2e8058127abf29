use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crate::constants::MAX_STREAM_RADIUS;
use crate::core::block::{Block, BlockType};
use crate::core::chunk::Chunk;
use crate::core::position::{BlockPosition, ChunkPosition};
use crate::error::WorldError;
use crate::settings::WorldSettings;
use crate::world::arena::ChunkHandle;
use crate::world::generator::TerrainGenerator;
use crate::world::loader::{ChunkLoader, InsertOutcome, Shared};

/// Counts from one streaming tick.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct StreamingStats {
    pub unloaded: usize,
    pub ready: usize,
    pub pending: usize,
}

/// The active set of chunks plus the worker that fills it.
///
/// Query and streaming methods are meant for a single logic thread. Chunks
/// are reached through [`ChunkHandle`]s, which stop resolving once their
/// chunk is evicted.
pub struct World {
    seed: u32,
    settings: WorldSettings,
    shared: Arc<Shared>,
    loader: ChunkLoader,
}

impl World {
    /// Seed 0 derives a seed from the current time; any other seed is used as is.
    pub fn new(seed: u32) -> Result<Self, WorldError> {
        Self::with_settings(&WorldSettings {
            seed,
            ..WorldSettings::default()
        })
    }

    pub fn with_settings(settings: &WorldSettings) -> Result<Self, WorldError> {
        settings.validate()?;
        let seed = resolve_seed(settings.seed);
        let shared = Arc::new(Shared::new(TerrainGenerator::new(seed)));
        let loader = ChunkLoader::spawn(Arc::clone(&shared)).map_err(WorldError::WorkerSpawn)?;

        tracing::info!(seed, "World created");

        Ok(World {
            seed,
            settings: settings.clone(),
            shared,
            loader,
        })
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    pub fn settings(&self) -> &WorldSettings {
        &self.settings
    }

    /// Air when the owning chunk is not active or `y` is out of range.
    pub fn get_block(&self, x: i32, y: i32, z: i32) -> Block {
        let pos = BlockPosition::new(x, y, z);
        let local = pos.local();
        let state = self.shared.state.lock();
        state
            .active
            .get(&pos.chunk_position())
            .and_then(|handle| state.arena.get(*handle))
            .map_or(Block::AIR, |chunk| chunk.get_block(local.x, local.y, local.z))
    }

    /// No-op when the owning chunk is not active; never generates it.
    pub fn set_block(&self, x: i32, y: i32, z: i32, block_type: BlockType) {
        let pos = BlockPosition::new(x, y, z);
        let local = pos.local();
        let mut state = self.shared.state.lock();
        let Some(handle) = state.active.get(&pos.chunk_position()).copied() else {
            return;
        };
        if let Some(chunk) = state.arena.get_mut(handle) {
            chunk.set_block(local.x, local.y, local.z, block_type);
        }
    }

    /// Generates `position` on the calling thread unless it is already active.
    pub fn generate_chunk(&self, position: ChunkPosition) {
        match self.shared.generate(position, false) {
            Some(InsertOutcome::Inserted(_)) => {
                tracing::debug!(x = position.x, z = position.z, "Generated chunk synchronously");
            }
            Some(InsertOutcome::Discarded) => {
                tracing::debug!(
                    x = position.x,
                    z = position.z,
                    "Worker finished chunk first, discarded to pool"
                );
            }
            None => {}
        }
    }

    /// Queues `position` for the worker unless it is active or already pending.
    pub fn request_chunk_generation(&self, position: ChunkPosition) {
        let queued = self.shared.state.lock().request(position);
        if queued {
            tracing::trace!(x = position.x, z = position.z, "Requested chunk");
            self.shared.notify_worker();
        }
    }

    /// Handles for the generated chunks in the square of side `2 * radius + 1`
    /// around `center`, in no particular order. Missing positions are queued and
    /// left out of this call's result. `radius` is clamped to `MAX_STREAM_RADIUS`.
    pub fn get_chunks_around(&self, center: ChunkPosition, radius: i32) -> Vec<ChunkHandle> {
        if radius < 0 {
            return Vec::new();
        }
        let radius = radius.min(MAX_STREAM_RADIUS);
        let side = (radius * 2 + 1) as usize;
        let mut chunks = Vec::with_capacity(side * side);
        let mut requested = 0usize;

        {
            let mut state = self.shared.state.lock();
            for pos in center.square(radius) {
                match state.active.get(&pos).copied() {
                    Some(handle) => {
                        if state.arena.get(handle).is_some_and(Chunk::is_generated) {
                            chunks.push(handle);
                        }
                    }
                    None => {
                        if state.request(pos) {
                            requested += 1;
                        }
                    }
                }
            }
        }

        if requested > 0 {
            tracing::trace!(requested, "Queued missing chunks");
            self.shared.notify_worker();
        }
        chunks
    }

    /// Evicts every active chunk farther than `max_distance` (Chebyshev) from
    /// `center` into the pool. Returns how many were evicted.
    pub fn unload_chunks_far_from(&self, center: ChunkPosition, max_distance: i32) -> usize {
        let mut state = self.shared.state.lock();
        let far: Vec<ChunkPosition> = state
            .active
            .keys()
            .filter(|pos| pos.chebyshev_distance(center) > max_distance)
            .copied()
            .collect();

        for pos in &far {
            if let Some(handle) = state.active.remove(pos) {
                state.arena.retire(handle);
            }
        }

        if !far.is_empty() {
            tracing::debug!(
                unloaded = far.len(),
                pooled = state.arena.pooled(),
                "Unloaded far chunks"
            );
        }
        far.len()
    }

    /// One streaming tick: unload beyond the unload distance, then load the load radius.
    pub fn update_streaming(&self, center: ChunkPosition) -> StreamingStats {
        let unloaded = self.unload_chunks_far_from(center, self.settings.unload_distance);
        let ready = self.get_chunks_around(center, self.settings.load_radius).len();
        StreamingStats {
            unloaded,
            ready,
            pending: self.pending_count(),
        }
    }

    /// Surface height at world column `(x, z)`, computed from noise alone.
    pub fn get_terrain_height(&self, x: i32, z: i32) -> i32 {
        self.shared.generator.terrain_height(x, z)
    }

    pub fn get_biome_at(&self, x: i32, z: i32) -> BlockType {
        self.shared.generator.biome_at(x, z)
    }

    pub fn get_chunk(&self, position: ChunkPosition) -> Option<ChunkHandle> {
        self.shared.state.lock().active.get(&position).copied()
    }

    pub fn contains_chunk(&self, position: ChunkPosition) -> bool {
        self.shared.state.lock().active.contains_key(&position)
    }

    /// Runs `f` on the chunk behind `handle` while holding the world lock.
    /// `None` if the handle is stale. `f` must not call back into the world.
    pub fn with_chunk<R>(&self, handle: ChunkHandle, f: impl FnOnce(&Chunk) -> R) -> Option<R> {
        let state = self.shared.state.lock();
        state.arena.get(handle).map(f)
    }

    /// Owned copy of the chunk behind `handle`, safe to keep across evictions.
    pub fn chunk_snapshot(&self, handle: ChunkHandle) -> Option<Chunk> {
        self.with_chunk(handle, Chunk::clone)
    }

    pub fn get_chunk_count(&self) -> usize {
        self.shared.state.lock().active.len()
    }

    pub fn pending_count(&self) -> usize {
        self.shared.state.lock().pending_count()
    }

    pub fn is_pending(&self, position: ChunkPosition) -> bool {
        self.shared.state.lock().is_pending(position)
    }

    pub fn pooled_chunk_count(&self) -> usize {
        self.shared.state.lock().arena.pooled()
    }

    /// Polls until the worker has nothing pending or `timeout` elapses.
    pub fn wait_until_idle(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            if self.pending_count() == 0 {
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            thread::sleep(Duration::from_millis(1));
        }
    }

    /// Stops the worker. Later requests are ignored; queries keep working.
    pub fn shutdown(&mut self) {
        if self.loader.is_running() {
            self.loader.shutdown();
            tracing::info!(seed = self.seed, "World shut down");
        }
    }
}

fn resolve_seed(seed: u32) -> u32 {
    if seed != 0 {
        return seed;
    }
    (chrono::Utc::now().timestamp() as u32).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::*;

    #[test]
    fn generate_chunk_twice_adds_one() {
        let world = World::new(7).unwrap();
        let origin = ChunkPosition::new(0, 0);
        world.generate_chunk(origin);
        assert_eq!(world.get_chunk_count(), 1);
        let handle = world.get_chunk(origin).unwrap();
        assert_eq!(world.with_chunk(handle, Chunk::is_generated), Some(true));

        world.generate_chunk(origin);
        assert_eq!(world.get_chunk_count(), 1);
        assert_eq!(world.get_chunk(origin), Some(handle));
        assert_eq!(world.with_chunk(handle, Chunk::is_generated), Some(true));
    }

    #[test]
    fn huge_radius_is_clamped() {
        let world = World::new(21).unwrap();
        let side = (MAX_STREAM_RADIUS * 2 + 1) as usize;

        assert!(world.get_chunks_around(ChunkPosition::new(0, 0), i32::MAX).is_empty());
        assert!(world.pending_count() + world.get_chunk_count() <= side * side);
        assert!(!world.is_pending(ChunkPosition::new(MAX_STREAM_RADIUS + 1, 0)));
        assert!(world.get_chunks_around(ChunkPosition::new(0, 0), i32::MIN).is_empty());

        let corner = ChunkPosition::new(i32::MAX, i32::MIN);
        world.get_chunks_around(corner, i32::MAX);
        assert!(world.pending_count() + world.get_chunk_count() <= 2 * side * side);
    }

    #[test]
    fn block_edit_scenario() {
        let world = World::new(7).unwrap();
        world.generate_chunk(ChunkPosition::new(0, 0));
        let handle = world.get_chunk(ChunkPosition::new(0, 0)).unwrap();

        world.set_block(3, 1, 3, BlockType::Stone);
        assert_eq!(world.get_block(3, 1, 3).block_type, BlockType::Stone);

        world.set_block(3, 1, 3, BlockType::Air);
        assert_eq!(world.get_block(3, 1, 3).block_type, BlockType::Air);
        let stored = world
            .with_chunk(handle, |chunk| {
                chunk
                    .iter_blocks()
                    .any(|(x, y, z, _)| (x, y, z) == (3, 1, 3))
            })
            .unwrap();
        assert!(!stored);
    }

    #[test]
    fn unloaded_chunks_read_air_and_ignore_writes() {
        let world = World::new(7).unwrap();
        assert_eq!(world.get_block(100, 1, 100), Block::AIR);
        world.set_block(100, 1, 100, BlockType::Stone);
        assert_eq!(world.get_block(100, 1, 100), Block::AIR);
        assert_eq!(world.get_chunk_count(), 0);
    }

    #[test]
    fn negative_world_coordinates_resolve() {
        let world = World::new(21).unwrap();
        world.generate_chunk(ChunkPosition::new(-1, -1));
        world.set_block(-1, WORLD_HEIGHT - 1, -8, BlockType::Snow);
        assert_eq!(world.get_block(-1, WORLD_HEIGHT - 1, -8).block_type, BlockType::Snow);

        let handle = world.get_chunk(ChunkPosition::new(-1, -1)).unwrap();
        let local = world
            .with_chunk(handle, |chunk| chunk.get_block(CHUNK_SIZE - 1, WORLD_HEIGHT - 1, 0))
            .unwrap();
        assert_eq!(local.block_type, BlockType::Snow);
    }

    #[test]
    fn bedrock_layer_matches_world_query() {
        let world = World::new(13).unwrap();
        world.generate_chunk(ChunkPosition::new(2, -2));
        let surface = world.get_terrain_height(16, -16);
        assert_eq!(world.get_block(16, 0, -16).block_type, BlockType::Stone);
        assert_eq!(world.get_block(16, surface, -16).block_type, world.get_biome_at(16, -16));
        assert_eq!(world.get_block(16, -1, -16), Block::AIR);
        assert_eq!(world.get_block(16, WORLD_HEIGHT, -16), Block::AIR);
    }

    #[test]
    fn zero_seed_is_replaced() {
        let world = World::new(0).unwrap();
        assert_ne!(world.seed(), 0);
        assert_eq!(World::new(99).unwrap().seed(), 99);
    }

    #[test]
    fn shutdown_stops_requests() {
        let mut world = World::new(4).unwrap();
        world.shutdown();
        world.shutdown();
        world.request_chunk_generation(ChunkPosition::new(1, 1));
        assert_eq!(world.pending_count(), 0);
        assert!(world.get_chunks_around(ChunkPosition::new(0, 0), 1).is_empty());

        // Synchronous generation does not need the worker
        world.generate_chunk(ChunkPosition::new(0, 0));
        assert_eq!(world.get_chunk_count(), 1);
    }
}
