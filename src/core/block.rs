use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
pub enum BlockType {
    #[default]
    Air,
    Grass,
    BloodGrass,
    Sand,
    Stone,
    Dirt,
    DirtAlt,
    DenseGrass,
    Snow,
    Water,
    DryTree,
    GrassTree,
    BloodTree,
}

impl BlockType {
    /// Everything except air occupies storage, water included.
    pub fn is_solid(&self) -> bool {
        *self != BlockType::Air
    }

    /// Air and liquids do not block movement or hide neighbouring faces.
    pub fn is_transparent(&self) -> bool {
        matches!(self, BlockType::Air | BlockType::Water)
    }

    pub fn is_decoration(&self) -> bool {
        matches!(
            self,
            BlockType::DryTree | BlockType::GrassTree | BlockType::BloodTree
        )
    }

    /// Decoration placed on top of a column whose surface is `self`.
    pub fn decoration(&self) -> Option<BlockType> {
        match self {
            BlockType::Sand | BlockType::Dirt => Some(BlockType::DryTree),
            BlockType::Grass | BlockType::DenseGrass => Some(BlockType::GrassTree),
            BlockType::BloodGrass => Some(BlockType::BloodTree),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
pub struct Block {
    pub block_type: BlockType,
}

impl Block {
    /// Sentinel returned for absent, unloaded, or out-of-range blocks.
    pub const AIR: Block = Block {
        block_type: BlockType::Air,
    };

    pub const fn new(block_type: BlockType) -> Self {
        Block { block_type }
    }

    pub fn is_solid(&self) -> bool {
        self.block_type.is_solid()
    }

    pub fn is_transparent(&self) -> bool {
        self.block_type.is_transparent()
    }
}

impl From<BlockType> for Block {
    fn from(block_type: BlockType) -> Self {
        Block::new(block_type)
    }
}
