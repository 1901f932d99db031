//! Position remapping across applied steps.

use crate::model::{BlockPos, NodePos};

/// How a single applied step moved positions around.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepMap {
    Identity,
    PagesDeleted { start: usize, end: usize },
    PageInserted { index: usize },
    BlocksDeleted { page: usize, start: usize, end: usize },
    BlocksInserted { page: usize, index: usize, count: usize },
    Split { at: BlockPos, offset: usize },
}

impl StepMap {
    /// Map one position through this step. `None` means the position was
    /// deleted.
    pub fn map(&self, pos: NodePos) -> Option<NodePos> {
        match *self {
            StepMap::Identity => Some(pos),
            StepMap::PagesDeleted { start, end } => {
                let page = pos.page();
                if (start..end).contains(&page) {
                    None
                } else if page >= end {
                    Some(pos.with_page(page - (end - start)))
                } else {
                    Some(pos)
                }
            }
            StepMap::PageInserted { index } => {
                let page = pos.page();
                if page >= index {
                    Some(pos.with_page(page + 1))
                } else {
                    Some(pos)
                }
            }
            StepMap::BlocksDeleted { page, start, end } => match pos.block() {
                Some(block) if block.page == page => {
                    if (start..end).contains(&block.index) {
                        None
                    } else if block.index >= end {
                        Some(pos.with_block(BlockPos::new(page, block.index - (end - start))))
                    } else {
                        Some(pos)
                    }
                }
                _ => Some(pos),
            },
            StepMap::BlocksInserted { page, index, count } => match pos.block() {
                Some(block) if block.page == page && block.index >= index => {
                    Some(pos.with_block(BlockPos::new(page, block.index + count)))
                }
                _ => Some(pos),
            },
            StepMap::Split { at, offset } => {
                let tail = BlockPos::new(at.page, at.index + 1);
                match pos {
                    NodePos::Text { block, offset: o } if block == at && o >= offset => {
                        Some(NodePos::Text {
                            block: tail,
                            offset: o - offset,
                        })
                    }
                    NodePos::Item { block, item } if block == at && item >= offset => {
                        Some(NodePos::Item {
                            block: tail,
                            item: item - offset,
                        })
                    }
                    _ => match pos.block() {
                        Some(block) if block.page == at.page && block.index > at.index => {
                            Some(pos.with_block(BlockPos::new(block.page, block.index + 1)))
                        }
                        _ => Some(pos),
                    },
                }
            }
        }
    }
}

/// The composed effect of every step of a transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mapping {
    maps: Vec<StepMap>,
}

impl Mapping {
    pub(crate) fn push(&mut self, map: StepMap) {
        self.maps.push(map);
    }

    /// Map a position from the document before the transaction to the one
    /// after it.
    pub fn map(&self, pos: NodePos) -> Option<NodePos> {
        self.maps.iter().try_fold(pos, |pos, map| map.map(pos))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deleted_page_range_drops_and_shifts() {
        let map = StepMap::PagesDeleted { start: 1, end: 3 };
        assert_eq!(map.map(NodePos::Page(0)), Some(NodePos::Page(0)));
        assert_eq!(map.map(NodePos::Page(2)), None);
        assert_eq!(
            map.map(NodePos::Block(BlockPos::new(4, 2))),
            Some(NodePos::Block(BlockPos::new(2, 2)))
        );
    }

    #[test]
    fn block_maps_leave_page_positions_alone() {
        let map = StepMap::BlocksDeleted {
            page: 0,
            start: 0,
            end: 5,
        };
        assert_eq!(map.map(NodePos::Page(0)), Some(NodePos::Page(0)));
    }

    #[test]
    fn composed_mapping_stops_at_deletion() {
        let mut mapping = Mapping::default();
        mapping.push(StepMap::BlocksInserted {
            page: 0,
            index: 0,
            count: 1,
        });
        mapping.push(StepMap::BlocksDeleted {
            page: 0,
            start: 1,
            end: 2,
        });
        assert_eq!(mapping.map(NodePos::Block(BlockPos::new(0, 0))), None);
        assert_eq!(
            mapping.map(NodePos::Block(BlockPos::new(0, 3))),
            Some(NodePos::Block(BlockPos::new(0, 3)))
        );
    }
}
