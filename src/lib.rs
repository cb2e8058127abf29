// Core module with fundamental types
pub mod core;

// World module with generation, streaming and the chunk store
pub mod world;

// Other modules
pub mod constants;
pub mod error;
pub mod settings;

// Re-exports
pub use constants::*;
pub use self::core::{Block, BlockPosition, BlockType, Chunk, ChunkPosition, world_to_local};
pub use error::WorldError;
pub use settings::WorldSettings;
pub use world::{ChunkHandle, StreamingStats, TerrainGenerator, World};
