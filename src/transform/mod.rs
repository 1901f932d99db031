//! # Transactions
//!
//! The only way the document changes. A [`Transaction`] is an ordered list of
//! [`Step`]s plus an [`Origin`] tag. Applying it is atomic: either every step
//! succeeds and a new document is produced together with a [`Mapping`] that
//! carries old positions to new ones, or nothing changes.
//!
//! The pagination engine tags everything it issues with [`Origin::Layout`] so
//! that its own writes don't schedule another reflow pass.

mod mapping;

pub use mapping::{Mapping, StepMap};

use crate::error::TransformError;
use crate::model::{Block, BlockPos, Document, Page};

/// Who issued a transaction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Origin {
    /// An edit made through the editing surface.
    #[default]
    User,
    /// A write made by the pagination engine.
    Layout,
}

/// A node attribute the engine knows how to set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attr {
    /// Number of the first item of an ordered list.
    ListStart(u32),
}

impl Attr {
    fn name(&self) -> &'static str {
        match self {
            Attr::ListStart(_) => "list-start",
        }
    }
}

/// One atomic mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Remove pages `start..end`.
    DeletePages { start: usize, end: usize },
    /// Insert a page so that it ends up at `index`.
    InsertPage { index: usize, page: Page },
    /// Remove blocks `start..end` of `page`.
    DeleteBlocks { page: usize, start: usize, end: usize },
    /// Insert blocks into `page` starting at `index`.
    InsertBlocks {
        page: usize,
        index: usize,
        blocks: Vec<Block>,
    },
    /// Split the block at `at` into two siblings. `offset` is a character
    /// offset for paragraphs and an item index for lists.
    Split { at: BlockPos, offset: usize },
    /// Set an attribute of the block at `at`.
    SetAttr { at: BlockPos, attr: Attr },
}

impl Step {
    fn apply(&self, doc: &mut Document) -> Result<StepMap, TransformError> {
        match self {
            Step::DeletePages { start, end } => {
                let count = doc.pages.len();
                if start > end || *end > count {
                    return Err(TransformError::PageOutOfRange { page: *end, count });
                }
                doc.pages.drain(*start..*end);
                Ok(StepMap::PagesDeleted {
                    start: *start,
                    end: *end,
                })
            }
            Step::InsertPage { index, page } => {
                let count = doc.pages.len();
                if *index > count {
                    return Err(TransformError::PageOutOfRange {
                        page: *index,
                        count,
                    });
                }
                doc.pages.insert(*index, page.clone());
                Ok(StepMap::PageInserted { index: *index })
            }
            Step::DeleteBlocks { page, start, end } => {
                let blocks = page_blocks(doc, *page)?;
                if start > end || *end > blocks.len() {
                    return Err(TransformError::BlockRangeOutOfRange {
                        page: *page,
                        start: *start,
                        end: *end,
                        count: blocks.len(),
                    });
                }
                blocks.drain(*start..*end);
                Ok(StepMap::BlocksDeleted {
                    page: *page,
                    start: *start,
                    end: *end,
                })
            }
            Step::InsertBlocks {
                page,
                index,
                blocks: new_blocks,
            } => {
                let blocks = page_blocks(doc, *page)?;
                if *index > blocks.len() {
                    return Err(TransformError::BlockRangeOutOfRange {
                        page: *page,
                        start: *index,
                        end: *index,
                        count: blocks.len(),
                    });
                }
                blocks.splice(*index..*index, new_blocks.iter().cloned());
                Ok(StepMap::BlocksInserted {
                    page: *page,
                    index: *index,
                    count: new_blocks.len(),
                })
            }
            Step::Split { at, offset } => {
                let blocks = page_blocks(doc, at.page)?;
                let count = blocks.len();
                let block = blocks
                    .get_mut(at.index)
                    .ok_or(TransformError::BlockRangeOutOfRange {
                        page: at.page,
                        start: at.index,
                        end: at.index + 1,
                        count,
                    })?;
                let kind = block.kind_name();
                let tail = block.split_off(*offset).ok_or(TransformError::InvalidSplit {
                    pos: *at,
                    offset: *offset,
                    kind,
                })?;
                blocks.insert(at.index + 1, tail);
                Ok(StepMap::Split {
                    at: *at,
                    offset: *offset,
                })
            }
            Step::SetAttr { at, attr } => {
                let blocks = page_blocks(doc, at.page)?;
                let count = blocks.len();
                let block = blocks
                    .get_mut(at.index)
                    .ok_or(TransformError::BlockRangeOutOfRange {
                        page: at.page,
                        start: at.index,
                        end: at.index + 1,
                        count,
                    })?;
                match (block, attr) {
                    (Block::List(list), Attr::ListStart(start)) => list.start = *start,
                    (other, attr) => {
                        return Err(TransformError::AttrMismatch {
                            pos: *at,
                            attr: attr.name(),
                            kind: other.kind_name(),
                        })
                    }
                }
                Ok(StepMap::Identity)
            }
        }
    }
}

fn page_blocks(doc: &mut Document, page: usize) -> Result<&mut Vec<Block>, TransformError> {
    let count = doc.pages.len();
    doc.pages
        .get_mut(page)
        .map(|p| &mut p.blocks)
        .ok_or(TransformError::PageOutOfRange { page, count })
}

/// An atomic, tagged list of steps.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transaction {
    pub origin: Origin,
    pub steps: Vec<Step>,
}

impl Transaction {
    pub fn new(origin: Origin) -> Self {
        Self {
            origin,
            steps: Vec::new(),
        }
    }

    /// An empty transaction tagged as a user edit.
    pub fn user() -> Self {
        Self::new(Origin::User)
    }

    /// An empty transaction tagged as a layout write.
    pub fn layout() -> Self {
        Self::new(Origin::Layout)
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    pub fn delete_pages(self, start: usize, end: usize) -> Self {
        self.step(Step::DeletePages { start, end })
    }

    pub fn insert_page(self, index: usize, page: Page) -> Self {
        self.step(Step::InsertPage { index, page })
    }

    pub fn delete_blocks(self, page: usize, start: usize, end: usize) -> Self {
        self.step(Step::DeleteBlocks { page, start, end })
    }

    pub fn insert_blocks(self, page: usize, index: usize, blocks: Vec<Block>) -> Self {
        self.step(Step::InsertBlocks {
            page,
            index,
            blocks,
        })
    }

    pub fn split(self, at: BlockPos, offset: usize) -> Self {
        self.step(Step::Split { at, offset })
    }

    pub fn set_attr(self, at: BlockPos, attr: Attr) -> Self {
        self.step(Step::SetAttr { at, attr })
    }

    /// Apply every step to a copy of `doc`.
    ///
    /// Returns the new document and the mapping from old to new positions.
    /// On error `doc` is untouched and no partial result escapes.
    pub fn apply(&self, doc: &Document) -> Result<(Document, Mapping), TransformError> {
        let mut next = doc.clone();
        let mut mapping = Mapping::default();
        for step in &self.steps {
            mapping.push(step.apply(&mut next)?);
        }
        if next.pages.is_empty() {
            return Err(TransformError::NoPagesLeft);
        }
        Ok((next, mapping))
    }
}
