//! Addresses into the document tree.
//!
//! Positions are structural (page index, block index, ...) rather than flat
//! integers. A [`crate::transform::Mapping`] carries them across a
//! transaction.

use serde::{Deserialize, Serialize};

/// A top-level block on a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockPos {
    pub page: usize,
    pub index: usize,
}

impl BlockPos {
    pub fn new(page: usize, index: usize) -> Self {
        Self { page, index }
    }
}

/// Any node the measurement provider can be asked about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodePos {
    /// A page container.
    Page(usize),
    /// A top-level block.
    Block(BlockPos),
    /// An item of the list at `block`.
    Item { block: BlockPos, item: usize },
    /// A character offset inside the paragraph or heading at `block`.
    Text { block: BlockPos, offset: usize },
}

impl NodePos {
    /// The page this position lives on.
    pub fn page(&self) -> usize {
        match self {
            NodePos::Page(page) => *page,
            NodePos::Block(block) | NodePos::Item { block, .. } | NodePos::Text { block, .. } => {
                block.page
            }
        }
    }
}

impl From<BlockPos> for NodePos {
    fn from(pos: BlockPos) -> Self {
        NodePos::Block(pos)
    }
}

impl NodePos {
    /// The block this position lives in, if it is below page level.
    pub fn block(&self) -> Option<BlockPos> {
        match self {
            NodePos::Page(_) => None,
            NodePos::Block(block) | NodePos::Item { block, .. } | NodePos::Text { block, .. } => {
                Some(*block)
            }
        }
    }

    /// The same position with its page index replaced.
    pub(crate) fn with_page(self, page: usize) -> Self {
        match self {
            NodePos::Page(_) => NodePos::Page(page),
            other => match other.block() {
                Some(block) => other.with_block(BlockPos::new(page, block.index)),
                None => other,
            },
        }
    }

    /// The same position with its block replaced. Page positions are
    /// returned unchanged.
    pub(crate) fn with_block(self, block: BlockPos) -> Self {
        match self {
            NodePos::Page(page) => NodePos::Page(page),
            NodePos::Block(_) => NodePos::Block(block),
            NodePos::Item { item, .. } => NodePos::Item { block, item },
            NodePos::Text { offset, .. } => NodePos::Text { block, offset },
        }
    }
}
