use rustc_hash::FxHashMap;

use crate::constants::*;
use crate::core::block::{Block, BlockType};
use crate::core::position::ChunkPosition;

/// A `CHUNK_SIZE x WORLD_HEIGHT x CHUNK_SIZE` column of blocks.
///
/// Storage is sparse: only non-air blocks are recorded, so a missing entry
/// reads back as air. Each `(x, z)` column also carries a cached height, the
/// y of its topmost solid block as of generation. Later `set_block` edits do
/// not touch that cache.
#[derive(Clone, Debug)]
pub struct Chunk {
    position: ChunkPosition,
    generated: bool,
    blocks: FxHashMap<u16, Block>,
    heights: [i32; CHUNK_AREA],
}

impl Chunk {
    pub fn new(position: ChunkPosition) -> Self {
        Chunk {
            position,
            generated: false,
            blocks: FxHashMap::default(),
            heights: [0; CHUNK_AREA],
        }
    }

    #[inline]
    pub fn in_bounds(x: i32, y: i32, z: i32) -> bool {
        Self::column_in_bounds(x, z) && (0..WORLD_HEIGHT).contains(&y)
    }

    #[inline]
    pub fn column_in_bounds(x: i32, z: i32) -> bool {
        (0..CHUNK_SIZE).contains(&x) && (0..CHUNK_SIZE).contains(&z)
    }

    #[inline]
    pub fn local_index(x: i32, y: i32, z: i32) -> u16 {
        (x + z * CHUNK_SIZE + y * CHUNK_SIZE * CHUNK_SIZE) as u16
    }

    #[inline]
    fn column_index(x: i32, z: i32) -> usize {
        (x + z * CHUNK_SIZE) as usize
    }

    pub fn get_block(&self, x: i32, y: i32, z: i32) -> Block {
        if !Self::in_bounds(x, y, z) {
            return Block::AIR;
        }
        self.get_block_unchecked(x, y, z)
    }

    pub fn set_block(&mut self, x: i32, y: i32, z: i32, block_type: BlockType) {
        if Self::in_bounds(x, y, z) {
            self.set_block_unchecked(x, y, z, block_type);
        }
    }

    /// Caller guarantees `(x, y, z)` is inside the chunk.
    #[inline]
    pub fn get_block_unchecked(&self, x: i32, y: i32, z: i32) -> Block {
        debug_assert!(Self::in_bounds(x, y, z), "block ({x}, {y}, {z}) outside chunk");
        self.blocks
            .get(&Self::local_index(x, y, z))
            .copied()
            .unwrap_or(Block::AIR)
    }

    /// Caller guarantees `(x, y, z)` is inside the chunk. Writing air removes the entry.
    #[inline]
    pub fn set_block_unchecked(&mut self, x: i32, y: i32, z: i32, block_type: BlockType) {
        debug_assert!(Self::in_bounds(x, y, z), "block ({x}, {y}, {z}) outside chunk");
        let index = Self::local_index(x, y, z);
        if block_type == BlockType::Air {
            self.blocks.remove(&index);
        } else {
            self.blocks.insert(index, Block::new(block_type));
        }
    }

    /// Cached surface height of column `(x, z)`; 0 outside the chunk.
    pub fn height(&self, x: i32, z: i32) -> i32 {
        if !Self::column_in_bounds(x, z) {
            return 0;
        }
        self.heights[Self::column_index(x, z)]
    }

    pub fn set_height(&mut self, x: i32, z: i32, height: i32) {
        if Self::column_in_bounds(x, z) {
            self.heights[Self::column_index(x, z)] = height;
        }
    }

    pub fn max_height(&self) -> i32 {
        self.heights.iter().copied().max().unwrap_or(0)
    }

    pub fn position(&self) -> ChunkPosition {
        self.position
    }

    pub fn is_generated(&self) -> bool {
        self.generated
    }

    pub fn set_generated(&mut self, generated: bool) {
        self.generated = generated;
    }

    /// Number of explicitly stored (non-air) blocks.
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Stored blocks as `(x, y, z, block)` in local coordinates, unordered.
    pub fn iter_blocks(&self) -> impl Iterator<Item = (i32, i32, i32, Block)> + '_ {
        let layer = (CHUNK_SIZE * CHUNK_SIZE) as u16;
        let width = CHUNK_SIZE as u16;
        self.blocks.iter().map(move |(&index, &block)| {
            let y = index / layer;
            let rest = index % layer;
            (
                (rest % width) as i32,
                y as i32,
                (rest / width) as i32,
                block,
            )
        })
    }

    /// Clears blocks, heights and the generated flag, then rebinds the position.
    /// The block map keeps its allocated capacity.
    pub fn reset_for_reuse(&mut self, position: ChunkPosition) {
        self.blocks.clear();
        self.heights.fill(0);
        self.generated = false;
        self.position = position;
    }

    pub fn storage_capacity(&self) -> usize {
        self.blocks.capacity()
    }
}
