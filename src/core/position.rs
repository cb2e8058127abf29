//! Chunk-space and block-space coordinates.

use serde::{Deserialize, Serialize};

use crate::constants::CHUNK_SIZE;

/// Floor division by the chunk width that stays correct for negative inputs.
#[inline]
fn block_to_chunk(v: i32) -> i32 {
    if v >= 0 {
        v / CHUNK_SIZE
    } else {
        (v + 1) / CHUNK_SIZE - 1
    }
}

/// Wraps a world block coordinate into `[0, CHUNK_SIZE)`.
#[inline]
pub fn world_to_local(x: i32, z: i32) -> (i32, i32) {
    (x.rem_euclid(CHUNK_SIZE), z.rem_euclid(CHUNK_SIZE))
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Default)]
#[derive(Serialize, Deserialize)]
pub struct ChunkPosition {
    pub x: i32,
    pub z: i32,
}

impl ChunkPosition {
    pub const fn new(x: i32, z: i32) -> Self {
        ChunkPosition { x, z }
    }

    /// Chunk column containing the world block column `(x, z)`.
    pub fn from_block(x: i32, z: i32) -> Self {
        ChunkPosition::new(block_to_chunk(x), block_to_chunk(z))
    }

    /// Saturates at `i32::MAX` for positions at opposite ends of the range.
    pub fn chebyshev_distance(&self, other: ChunkPosition) -> i32 {
        let distance = self.x.abs_diff(other.x).max(self.z.abs_diff(other.z));
        i32::try_from(distance).unwrap_or(i32::MAX)
    }

    /// World block coordinates of local (0, 0).
    pub fn origin_block(&self) -> (i32, i32) {
        (self.x.wrapping_mul(CHUNK_SIZE), self.z.wrapping_mul(CHUNK_SIZE))
    }

    /// Every position in the square of side `2 * radius + 1` around `self`.
    /// Empty for a negative radius. The square is cut off at the edges of the
    /// `i32` range instead of wrapping around.
    pub fn square(self, radius: i32) -> impl Iterator<Item = ChunkPosition> {
        let (min_z, max_z) = (self.z.saturating_sub(radius), self.z.saturating_add(radius));
        (self.x.saturating_sub(radius)..=self.x.saturating_add(radius))
            .flat_map(move |x| (min_z..=max_z).map(move |z| ChunkPosition::new(x, z)))
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Default)]
#[derive(Serialize, Deserialize)]
pub struct BlockPosition {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPosition {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        BlockPosition { x, y, z }
    }

    pub fn chunk_position(&self) -> ChunkPosition {
        ChunkPosition::from_block(self.x, self.z)
    }

    /// Offset inside the owning chunk; `y` is carried through unchanged.
    pub fn local(&self) -> BlockPosition {
        let (lx, lz) = world_to_local(self.x, self.z);
        BlockPosition::new(lx, self.y, lz)
    }
}
