// World constants
pub const CHUNK_SIZE: i32 = 8;
pub const WORLD_HEIGHT: i32 = 32;
pub const CHUNK_AREA: usize = (CHUNK_SIZE * CHUNK_SIZE) as usize;
pub const CHUNK_VOLUME: usize = CHUNK_AREA * WORLD_HEIGHT as usize;

// Streaming radii, in chunks (Chebyshev)
pub const RENDER_RADIUS: i32 = 5;
pub const LOAD_RADIUS: i32 = 6;
pub const UNLOAD_DISTANCE: i32 = 9;
/// Largest radius `get_chunks_around` will walk; larger requests are clamped.
pub const MAX_STREAM_RADIUS: i32 = 64;

// Terrain shape
pub const SURFACE_BASE: i32 = 3;
pub const SURFACE_AMPLITUDE: f32 = 25.0;
pub const SUBSURFACE_DEPTH: i32 = 4;

// Caves carve only strictly between these margins
pub const CAVE_FLOOR_MARGIN: i32 = 2;
pub const CAVE_ROOF_MARGIN: i32 = 2;
pub const CAVE_THRESHOLD: f32 = 0.4;

// Decorative features: one draw in [0, 100) per column
pub const FEATURE_ROLL_RANGE: u32 = 100;
pub const FEATURE_CHANCE: u32 = 10;

pub const BIOME_TABLE_SIZE: usize = 1024;

// Noise configuration
pub const TERRAIN_FREQUENCY: f32 = 0.01;
pub const TERRAIN_OCTAVES: i32 = 4;
pub const TERRAIN_LACUNARITY: f32 = 2.0;
pub const TERRAIN_GAIN: f32 = 0.5;
pub const BIOME_FREQUENCY: f32 = 0.02;
pub const CAVE_FREQUENCY: f32 = 0.05;
