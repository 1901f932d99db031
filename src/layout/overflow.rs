//! Overflow detection for a single page.

use super::bounds::BodyBounds;
use crate::measure::MeasurementProvider;
use crate::model::{BlockPos, NodePos, Page};

/// Result of scanning one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overflow {
    /// Every measured block ends inside the body.
    None,
    /// The block at this index is the first to end below the body.
    At(usize),
    /// The page's only block is taller than the body. Nothing can be done
    /// about it, so callers treat this like `None`.
    Degenerate,
}

/// Find the first block of `page` whose bottom edge passes the body bottom
/// by more than `epsilon`. Blocks that aren't rendered are skipped.
pub fn find_overflow(
    page: &Page,
    page_index: usize,
    provider: &dyn MeasurementProvider,
    bounds: BodyBounds,
    epsilon: f64,
) -> Overflow {
    let first = (0..page.blocks.len()).find(|&index| {
        provider
            .measure(NodePos::Block(BlockPos::new(page_index, index)))
            .is_some_and(|rect| rect.bottom > bounds.bottom + epsilon)
    });

    match first {
        None => Overflow::None,
        Some(_) if page.blocks.len() == 1 => Overflow::Degenerate,
        Some(index) => Overflow::At(index),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measure::{Rect, VerticalPadding};
    use crate::model::{Block, Document};

    /// Blocks of fixed heights stacked from y = 0 on page 0.
    struct Stack(Vec<f64>);

    impl MeasurementProvider for Stack {
        fn sync(&mut self, _doc: &Document) {}
        fn measure(&self, node: NodePos) -> Option<Rect> {
            let NodePos::Block(pos) = node else {
                return None;
            };
            let top: f64 = self.0[..pos.index].iter().sum();
            let h = *self.0.get(pos.index)?;
            Some(Rect {
                top,
                bottom: top + h,
                left: 0.0,
                right: 100.0,
            })
        }
        fn page_padding(&self, _page: usize) -> Option<VerticalPadding> {
            None
        }
        fn text_offset_at(&self, _block: BlockPos, _y: f64) -> Option<usize> {
            None
        }
    }

    fn page(n: usize) -> Page {
        Page::new((0..n).map(|_| Block::paragraph("x")).collect())
    }

    const BOUNDS: BodyBounds = BodyBounds {
        top: 0.0,
        bottom: 900.0,
    };

    #[test]
    fn nothing_overflows() {
        let stack = Stack(vec![200.0, 700.0]);
        assert_eq!(find_overflow(&page(2), 0, &stack, BOUNDS, 0.5), Overflow::None);
    }

    #[test]
    fn first_overflowing_block_is_reported() {
        let stack = Stack(vec![850.0, 150.0, 10.0]);
        assert_eq!(find_overflow(&page(3), 0, &stack, BOUNDS, 0.5), Overflow::At(1));
    }

    #[test]
    fn epsilon_absorbs_subpixel_overflow() {
        let stack = Stack(vec![850.0, 50.4]);
        assert_eq!(find_overflow(&page(2), 0, &stack, BOUNDS, 0.5), Overflow::None);
        let stack = Stack(vec![850.0, 50.6]);
        assert_eq!(find_overflow(&page(2), 0, &stack, BOUNDS, 0.5), Overflow::At(1));
    }

    #[test]
    fn lone_tall_block_is_degenerate() {
        let stack = Stack(vec![1400.0]);
        assert_eq!(
            find_overflow(&page(1), 0, &stack, BOUNDS, 0.5),
            Overflow::Degenerate
        );
    }
}
