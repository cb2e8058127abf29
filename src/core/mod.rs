//! Core data structures for the world
//! Contains fundamental types like blocks, positions and chunks.

pub mod block;
pub mod chunk;
pub mod position;

// Re-export commonly used types
pub use block::{Block, BlockType};
pub use chunk::Chunk;
pub use position::{BlockPosition, ChunkPosition, world_to_local};
