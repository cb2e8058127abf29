//! Thread-safe terrain generation using FastNoiseLite
//!
//! The noise-driven part of a chunk (surface, fill, caves) depends only on
//! the seed and the chunk position. Decorations consume one shared sequential
//! random stream, so regenerating an evicted chunk can place them differently.

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::constants::*;
use crate::core::block::BlockType;
use crate::core::chunk::Chunk;
use crate::world::noise::NoiseFields;

pub struct TerrainGenerator {
    noise: NoiseFields,
    decoration_rng: Mutex<StdRng>,
    seed: u32,
}

impl TerrainGenerator {
    pub fn new(seed: u32) -> Self {
        TerrainGenerator {
            noise: NoiseFields::new(seed),
            decoration_rng: Mutex::new(StdRng::seed_from_u64(u64::from(seed))),
            seed,
        }
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Surface y at world column `(x, z)`; needs no chunk.
    pub fn terrain_height(&self, x: i32, z: i32) -> i32 {
        self.noise.surface_height(x, z)
    }

    /// Surface block the biome field assigns to world column `(x, z)`.
    pub fn biome_at(&self, x: i32, z: i32) -> BlockType {
        self.noise.classify_biome(self.noise.biome(x, z))
    }

    /// Fills `chunk` in place and marks it generated. Expects an empty chunk.
    pub fn generate_terrain(&self, chunk: &mut Chunk) {
        let (base_x, base_z) = chunk.position().origin_block();

        // Pre-compute surface and biome per column
        let mut height_map = [[0i32; CHUNK_SIZE as usize]; CHUNK_SIZE as usize];
        let mut biome_map = [[BlockType::Air; CHUNK_SIZE as usize]; CHUNK_SIZE as usize];

        for lx in 0..CHUNK_SIZE {
            for lz in 0..CHUNK_SIZE {
                let world_x = base_x.wrapping_add(lx);
                let world_z = base_z.wrapping_add(lz);
                height_map[lx as usize][lz as usize] = self.noise.surface_height(world_x, world_z);
                biome_map[lx as usize][lz as usize] = self.biome_at(world_x, world_z);
            }
        }

        let max_surface = height_map
            .iter()
            .flatten()
            .copied()
            .fold(SURFACE_BASE, i32::max);
        let cave_floor = CAVE_FLOOR_MARGIN;
        let cave_roof = max_surface - CAVE_ROOF_MARGIN;

        let mut rng = self.decoration_rng.lock();

        for lx in 0..CHUNK_SIZE {
            for lz in 0..CHUNK_SIZE {
                let world_x = base_x.wrapping_add(lx);
                let world_z = base_z.wrapping_add(lz);
                let surface = height_map[lx as usize][lz as usize];
                let biome = biome_map[lx as usize][lz as usize];

                for y in 0..WORLD_HEIGHT {
                    let block = if y == 0 {
                        BlockType::Stone
                    } else if y < surface - SUBSURFACE_DEPTH {
                        let in_cave_band = y > cave_floor && y < cave_roof;
                        if in_cave_band && self.noise.cave(world_x, y, world_z) > CAVE_THRESHOLD {
                            BlockType::Air
                        } else {
                            BlockType::Stone
                        }
                    } else if y < surface {
                        BlockType::Dirt
                    } else if y == surface {
                        biome
                    } else {
                        break;
                    };

                    if block != BlockType::Air {
                        chunk.set_block_unchecked(lx, y, lz, block);
                    }
                }

                // One draw per column, whether or not a feature fits
                let roll = rng.random_range(0..FEATURE_ROLL_RANGE);
                let mut top = surface;
                if roll < FEATURE_CHANCE && surface + 1 < WORLD_HEIGHT {
                    if let Some(feature) = biome.decoration() {
                        chunk.set_block_unchecked(lx, surface + 1, lz, feature);
                        top = surface + 1;
                    }
                }
                chunk.set_height(lx, lz, top);
            }
        }

        chunk.set_generated(true);
    }
}
