//! Seeded noise fields driving terrain, biomes and caves.
//!
//! All three fields are pure functions of `(seed, coordinates)`. The biome
//! lookup table is filled once at construction and only read afterwards.

use fastnoise_lite::{FastNoiseLite, FractalType, NoiseType};

use crate::constants::*;
use crate::core::block::BlockType;

/// Ascending upper bounds of the biome bands. The last band is open-ended,
/// so together they partition `[-1, 1]`.
const BIOME_BANDS: [(f32, BlockType); 4] = [
    (-0.3, BlockType::Snow),
    (0.0, BlockType::BloodGrass),
    (0.4, BlockType::Grass),
    (0.7, BlockType::Sand),
];
const BIOME_TOP: BlockType = BlockType::DenseGrass;

pub struct NoiseFields {
    terrain: FastNoiseLite,
    biome: FastNoiseLite,
    caves: FastNoiseLite,
    biome_table: [BlockType; BIOME_TABLE_SIZE],
}

impl NoiseFields {
    pub fn new(seed: u32) -> Self {
        let mut biome_table = [BlockType::Air; BIOME_TABLE_SIZE];
        for (i, slot) in biome_table.iter_mut().enumerate() {
            let value = (i as f32 / BIOME_TABLE_SIZE as f32) * 2.0 - 1.0;
            *slot = band_for(value);
        }

        NoiseFields {
            terrain: Self::create_terrain_noise(seed),
            biome: Self::create_noise(seed.wrapping_add(1), NoiseType::Perlin, BIOME_FREQUENCY),
            caves: Self::create_noise(
                seed.wrapping_add(2),
                NoiseType::OpenSimplex2,
                CAVE_FREQUENCY,
            ),
            biome_table,
        }
    }

    fn create_terrain_noise(seed: u32) -> FastNoiseLite {
        let mut noise = FastNoiseLite::with_seed(seed as i32);
        noise.set_noise_type(Some(NoiseType::Perlin));
        noise.set_fractal_type(Some(FractalType::FBm));
        noise.set_fractal_octaves(Some(TERRAIN_OCTAVES));
        noise.set_fractal_lacunarity(Some(TERRAIN_LACUNARITY));
        noise.set_fractal_gain(Some(TERRAIN_GAIN));
        noise.set_frequency(Some(TERRAIN_FREQUENCY));
        noise
    }

    fn create_noise(seed: u32, noise_type: NoiseType, frequency: f32) -> FastNoiseLite {
        let mut noise = FastNoiseLite::with_seed(seed as i32);
        noise.set_noise_type(Some(noise_type));
        noise.set_frequency(Some(frequency));
        noise
    }

    pub fn terrain(&self, x: i32, z: i32) -> f32 {
        self.terrain.get_noise_2d(x as f32, z as f32)
    }

    pub fn biome(&self, x: i32, z: i32) -> f32 {
        self.biome.get_noise_2d(x as f32, z as f32)
    }

    pub fn cave(&self, x: i32, y: i32, z: i32) -> f32 {
        self.caves.get_noise_3d(x as f32, y as f32, z as f32)
    }

    /// Maps the terrain sample at `(x, z)` onto `[SURFACE_BASE, SURFACE_BASE + SURFACE_AMPLITUDE]`.
    pub fn surface_height(&self, x: i32, z: i32) -> i32 {
        surface_from_noise(self.terrain(x, z))
    }

    pub fn classify_biome(&self, value: f32) -> BlockType {
        let index = ((value + 1.0) * 0.5 * BIOME_TABLE_SIZE as f32) as i32;
        self.biome_table[index.clamp(0, BIOME_TABLE_SIZE as i32 - 1) as usize]
    }
}

pub fn surface_from_noise(value: f32) -> i32 {
    ((value + 1.0) * 0.5 * SURFACE_AMPLITUDE) as i32 + SURFACE_BASE
}

fn band_for(value: f32) -> BlockType {
    BIOME_BANDS
        .iter()
        .find(|(upper, _)| value < *upper)
        .map_or(BIOME_TOP, |(_, block)| *block)
}
