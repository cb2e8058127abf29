//! World generation and management modules
//! Contains noise, terrain generation, the chunk arena, background loading and world state.

pub mod arena;
pub mod generator;
pub mod loader;
pub mod noise;
pub mod terrain;

// Re-export commonly used types
pub use arena::{ChunkArena, ChunkHandle, ChunkPool, Reservation};
pub use generator::TerrainGenerator;
pub use loader::{ChunkLoader, InsertOutcome};
pub use noise::NoiseFields;
pub use terrain::{StreamingStats, World};
