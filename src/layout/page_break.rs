//! # Page Break Decisions
//!
//! What to do with a page once its first overflowing block is known, and the
//! layout transaction that carries the decision out.
//!
//! Only the *last* block of a page is ever split. Blocks after the overflow
//! point are evicted to the next page first, so the block that actually
//! crosses the boundary becomes last. Paragraphs split at a word boundary
//! near the body bottom, lists before the first item that crosses it.
//! Anything else (or a split that can't be placed) moves whole.

use super::bounds::BodyBounds;
use crate::measure::MeasurementProvider;
use crate::model::{Block, BlockPos, Document, List, NodePos, Page};
use crate::text::snap_to_whitespace;
use crate::transform::{Attr, Transaction};

/// Decide what to do when a page overflows.
#[derive(Debug, Clone, PartialEq)]
pub enum BreakDecision {
    /// Move blocks `from..` to the next page whole, keeping their order.
    MoveTrailing { from: usize },
    /// Split the last block (a paragraph) at this char offset. The tail is
    /// relocated by a later pass.
    SplitParagraph { offset: usize },
    /// Split the last block (a list) before this item and move the
    /// continuation to the next page.
    SplitList { item: usize },
    /// Move the last block to the next page whole.
    MoveLast,
}

/// Identity of a paragraph split, used to refuse doing the same split twice
/// in a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitKey {
    pub pos: BlockPos,
    pub offset: usize,
    pub doc_size: usize,
}

/// Everything a break decision reads.
pub struct BreakContext<'a> {
    pub doc: &'a Document,
    pub provider: &'a dyn MeasurementProvider,
    pub page: usize,
    pub bounds: BodyBounds,
    pub epsilon: f64,
    pub snap_window: usize,
    /// The last paragraph split performed by this engine.
    pub last_split: Option<SplitKey>,
}

/// Given the index of the first overflowing block on a page, decide how to
/// break.
pub fn decide_break(ctx: &BreakContext<'_>, overflow_index: usize) -> BreakDecision {
    let Some(page) = ctx.doc.page(ctx.page) else {
        return BreakDecision::MoveLast;
    };
    let last = page.blocks.len().saturating_sub(1);

    // Trailing blocks go first so the real candidate ends up last
    if overflow_index < last {
        return BreakDecision::MoveTrailing {
            from: overflow_index + 1,
        };
    }

    let pos = BlockPos::new(ctx.page, last);
    match &page.blocks[last] {
        Block::Paragraph { text } => match paragraph_split_offset(ctx, pos, text) {
            Some(offset) => BreakDecision::SplitParagraph { offset },
            None => BreakDecision::MoveLast,
        },
        Block::List(list) => match list_split_item(ctx, pos, list) {
            Some(item) => BreakDecision::SplitList { item },
            None => BreakDecision::MoveLast,
        },
        _ => BreakDecision::MoveLast,
    }
}

/// Where to split a paragraph that crosses the body bottom, if anywhere.
///
/// Hit-tests the body bottom against the rendered text, snaps to nearby
/// whitespace and rejects offsets at the paragraph edges or a split
/// identical to the previous one.
pub fn paragraph_split_offset(
    ctx: &BreakContext<'_>,
    pos: BlockPos,
    text: &str,
) -> Option<usize> {
    let hit = ctx.provider.text_offset_at(pos, ctx.bounds.bottom)?;
    if hit == 0 {
        // first line already crosses
        return None;
    }
    let offset = snap_to_whitespace(text, hit, ctx.snap_window)?;
    let len = text.chars().count();
    if offset == 0 || offset >= len {
        log::debug!("split of {:?} at {} lands on an edge, moving whole", pos, offset);
        return None;
    }

    let key = SplitKey {
        pos,
        offset,
        doc_size: ctx.doc.size(),
    };
    if ctx.last_split == Some(key) {
        log::debug!("refusing to repeat split of {:?} at {}", pos, offset);
        return None;
    }
    Some(offset)
}

/// Index of the first list item that crosses the body bottom, if splitting
/// there leaves at least one item behind and the continuation can still be
/// numbered.
pub fn list_split_item(ctx: &BreakContext<'_>, pos: BlockPos, list: &List) -> Option<usize> {
    let item = (0..list.items.len()).find(|&item| {
        ctx.provider
            .measure(NodePos::Item { block: pos, item })
            .is_some_and(|rect| rect.bottom > ctx.bounds.bottom + ctx.epsilon)
    })?;
    if item == 0 || (list.ordered && continuation_start(list, item).is_none()) {
        return None;
    }
    Some(item)
}

/// Number of the first item of a continuation split off before `item`.
/// `None` if it doesn't fit the numbering range.
fn continuation_start(list: &List, item: usize) -> Option<u32> {
    u32::try_from(item)
        .ok()
        .and_then(|item| list.start.checked_add(item))
}

/// Build the layout transaction for a decision on `page`.
pub fn break_transaction(doc: &Document, page: usize, decision: &BreakDecision) -> Transaction {
    let len = doc.page(page).map_or(0, |p| p.blocks.len());
    let last = len.saturating_sub(1);
    match decision {
        BreakDecision::MoveTrailing { from } => move_forward(doc, page, *from, len),
        BreakDecision::MoveLast => move_forward(doc, page, last, len),
        BreakDecision::SplitParagraph { offset } => {
            Transaction::layout().split(BlockPos::new(page, last), *offset)
        }
        BreakDecision::SplitList { item } => split_list(doc, page, last, *item),
    }
}

/// Split the list at `index` before `item`, renumber the continuation and
/// move it to the start of the next page, all in one transaction.
///
/// If the next page already opens with a list of the same kind (the rest of
/// an earlier split), the continuation is merged into its front and the
/// merged list takes the continuation's start.
fn split_list(doc: &Document, page: usize, index: usize, item: usize) -> Transaction {
    let at = BlockPos::new(page, index);
    let Some(Block::List(list)) = doc.block(at) else {
        return move_forward(doc, page, index, index + 1);
    };
    let Some(items) = list.items.get(item..).filter(|rest| item > 0 && !rest.is_empty()) else {
        return move_forward(doc, page, index, index + 1);
    };

    let tail = BlockPos::new(page, index + 1);
    let mut continuation = List {
        ordered: list.ordered,
        start: list.start,
        items: items.to_vec(),
    };

    let mut tx = Transaction::layout().split(at, item);
    if list.ordered {
        let Some(start) = continuation_start(list, item) else {
            return move_forward(doc, page, index, index + 1);
        };
        continuation.start = start;
        tx = tx.set_attr(tail, Attr::ListStart(start));
    }
    tx = tx.delete_blocks(page, tail.index, tail.index + 1);

    let next = doc
        .page(page + 1)
        .and_then(|p| p.blocks.first())
        .and_then(|block| match block {
            Block::List(next) if next.ordered == list.ordered => Some(next),
            _ => None,
        });
    match next {
        Some(next) => {
            log::debug!(
                "merging {} list items into the list opening page {}",
                continuation.items.len(),
                page + 1
            );
            continuation.items.extend(next.items.iter().cloned());
            tx.delete_blocks(page + 1, 0, 1)
                .insert_blocks(page + 1, 0, vec![Block::List(continuation)])
        }
        None => insert_on_next_page(tx, doc, page, vec![Block::List(continuation)]),
    }
}

/// Move blocks `start..end` of `page` to the start of the next page,
/// creating that page right after `page` if it doesn't exist.
pub fn move_forward(doc: &Document, page: usize, start: usize, end: usize) -> Transaction {
    let blocks = doc
        .page(page)
        .and_then(|p| p.blocks.get(start..end))
        .map(<[Block]>::to_vec)
        .unwrap_or_default();
    let tx = Transaction::layout().delete_blocks(page, start, end);
    insert_on_next_page(tx, doc, page, blocks)
}

fn insert_on_next_page(
    tx: Transaction,
    doc: &Document,
    page: usize,
    blocks: Vec<Block>,
) -> Transaction {
    if page + 1 < doc.page_count() {
        tx.insert_blocks(page + 1, 0, blocks)
    } else {
        tx.insert_page(page + 1, Page::new(blocks))
    }
}

/// Move the first block of page `page + 1` to the end of `page`.
pub fn pull_back(doc: &Document, page: usize) -> Transaction {
    let Some(block) = doc.page(page + 1).and_then(|p| p.blocks.first()) else {
        return Transaction::layout();
    };
    let end = doc.page(page).map_or(0, |p| p.blocks.len());
    Transaction::layout()
        .delete_blocks(page + 1, 0, 1)
        .insert_blocks(page, end, vec![block.clone()])
}

/// Remove trailing pages that are effectively empty. The first page always
/// stays.
pub fn cleanup_transaction(doc: &Document) -> Option<Transaction> {
    let keep = doc
        .pages
        .iter()
        .rposition(|p| !p.is_effectively_empty())
        .map_or(1, |last| last + 1);
    (keep < doc.page_count()).then(|| Transaction::layout().delete_pages(keep, doc.page_count()))
}
