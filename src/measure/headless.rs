//! Headless measurement backend.
//!
//! Lays the document out the way a simple stylesheet would render it, with
//! no display attached: pages stacked vertically with a gap, blocks stacked
//! from the body top, text wrapped at UAX#14 opportunities with a fixed
//! advance per character. Blocks are never clipped, so overflow shows up in
//! the geometry exactly as it would on screen.
//!
//! Used by the CLI and the test-suite, and as a reference for what a DOM
//! backend must report.

use serde::{Deserialize, Serialize};

use super::{MeasurementProvider, Rect, VerticalMargins, VerticalPadding};
use crate::config::LayoutConfig;
use crate::layout::bounds::ChromeHeights;
use crate::model::{Block, BlockPos, Document, NodePos};
use crate::text::{break_into_lines, LineSpan};

/// Font and spacing metrics of the headless backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HeadlessMetrics {
    /// Advance of every character at body size.
    pub char_width: f64,
    /// Line height at body size.
    pub line_height: f64,
    /// Bottom margin of every top-level block.
    pub block_spacing: f64,
    /// Left indent of list item content.
    pub list_indent: f64,
    /// Left indent of blockquote content.
    pub quote_indent: f64,
    /// Vertical padding inside each table cell, top and bottom.
    pub cell_padding: f64,
}

impl Default for HeadlessMetrics {
    fn default() -> Self {
        Self {
            char_width: 8.0,
            line_height: 24.0,
            block_spacing: 12.0,
            list_indent: 24.0,
            quote_indent: 16.0,
            cell_padding: 4.0,
        }
    }
}

/// Size multiplier for heading levels.
fn heading_scale(level: u8) -> f64 {
    match level {
        1 => 2.0,
        2 => 1.5,
        3 => 1.25,
        _ => 1.0,
    }
}

#[derive(Debug, Clone)]
struct PageGeom {
    rect: Rect,
    padding: VerticalPadding,
    blocks: Vec<BlockGeom>,
}

#[derive(Debug, Clone)]
struct BlockGeom {
    rect: Rect,
    margins: VerticalMargins,
    /// Wrapped lines of a paragraph or heading.
    lines: Vec<LineSpan>,
    line_height: f64,
    /// Item boxes of a list.
    items: Vec<Rect>,
}

/// A [`MeasurementProvider`] that computes geometry instead of reading it
/// from a display.
#[derive(Debug, Clone)]
pub struct HeadlessRenderer {
    config: LayoutConfig,
    metrics: HeadlessMetrics,
    chrome: ChromeHeights,
    pages: Vec<PageGeom>,
}

impl HeadlessRenderer {
    pub fn new(config: LayoutConfig, metrics: HeadlessMetrics) -> Self {
        let chrome = ChromeHeights::from_config(&config);
        Self {
            config,
            metrics,
            chrome,
            pages: Vec::new(),
        }
    }

    /// Render header and footer regions of the given heights. Takes effect
    /// on the next [`MeasurementProvider::sync`].
    pub fn set_chrome(&mut self, chrome: ChromeHeights) {
        self.chrome = chrome;
    }

    fn content_width(&self) -> f64 {
        (self.config.page_width() - self.config.padding.horizontal()).max(0.0)
    }

    fn layout_page(&self, index: usize, page: &crate::model::Page) -> PageGeom {
        let (page_w, page_h) = self.config.size.dimensions();
        let top = index as f64 * (page_h + self.config.page_gap);
        let rect = Rect {
            top,
            bottom: top + page_h,
            left: 0.0,
            right: page_w,
        };
        let padding = VerticalPadding {
            top: self.config.padding.top,
            bottom: self.config.padding.bottom,
        };

        let left = self.config.padding.left;
        let width = self.content_width();
        let mut y = top + padding.top + self.chrome.header;
        let mut blocks = Vec::with_capacity(page.blocks.len());

        for block in &page.blocks {
            let geom = self.layout_block(block, left, y, width);
            y = geom.rect.bottom + geom.margins.bottom;
            blocks.push(geom);
        }

        PageGeom {
            rect,
            padding,
            blocks,
        }
    }

    fn layout_block(&self, block: &Block, left: f64, top: f64, width: f64) -> BlockGeom {
        let m = &self.metrics;
        let mut lines = Vec::new();
        let mut items = Vec::new();
        let mut line_height = m.line_height;

        let height = match block {
            Block::Paragraph { text } => {
                lines = break_into_lines(text, width, |_| m.char_width);
                lines.len() as f64 * line_height
            }
            Block::Heading { level, text } => {
                let scale = heading_scale(*level);
                line_height = m.line_height * scale;
                lines = break_into_lines(text, width, |_| m.char_width * scale);
                lines.len() as f64 * line_height
            }
            Block::List(list) => {
                let mut y = top;
                for item in &list.items {
                    let h: f64 = item
                        .blocks
                        .iter()
                        .map(|b| self.block_height(b, width - m.list_indent))
                        .sum();
                    items.push(Rect {
                        top: y,
                        bottom: y + h,
                        left,
                        right: left + width,
                    });
                    y += h;
                }
                y - top
            }
            other => self.block_height(other, width),
        };

        BlockGeom {
            rect: Rect {
                top,
                bottom: top + height,
                left,
                right: left + width,
            },
            margins: VerticalMargins {
                top: 0.0,
                bottom: m.block_spacing,
            },
            lines,
            line_height,
            items,
        }
    }

    /// Height of a block laid out at `width`, for nested content.
    fn block_height(&self, block: &Block, width: f64) -> f64 {
        let m = &self.metrics;
        let width = width.max(m.char_width);
        match block {
            Block::Paragraph { text } => {
                break_into_lines(text, width, |_| m.char_width).len() as f64 * m.line_height
            }
            Block::Heading { level, text } => {
                let scale = heading_scale(*level);
                break_into_lines(text, width, |_| m.char_width * scale).len() as f64
                    * m.line_height
                    * scale
            }
            Block::List(list) => list
                .items
                .iter()
                .flat_map(|item| &item.blocks)
                .map(|b| self.block_height(b, width - m.list_indent))
                .sum(),
            Block::Table { rows } => rows
                .iter()
                .map(|row| {
                    let col_width = width / row.len().max(1) as f64;
                    let lines = row
                        .iter()
                        .map(|cell| break_into_lines(cell, col_width, |_| m.char_width).len())
                        .max()
                        .unwrap_or(1);
                    lines as f64 * m.line_height + 2.0 * m.cell_padding
                })
                .sum(),
            Block::Blockquote { blocks } => blocks
                .iter()
                .map(|b| self.block_height(b, width - m.quote_indent))
                .sum(),
        }
    }

    fn block_geom(&self, pos: BlockPos) -> Option<&BlockGeom> {
        self.pages.get(pos.page)?.blocks.get(pos.index)
    }
}

impl MeasurementProvider for HeadlessRenderer {
    fn sync(&mut self, doc: &Document) {
        self.pages = doc
            .pages
            .iter()
            .enumerate()
            .map(|(i, page)| self.layout_page(i, page))
            .collect();
    }

    fn measure(&self, node: NodePos) -> Option<Rect> {
        match node {
            NodePos::Page(page) => self.pages.get(page).map(|p| p.rect),
            NodePos::Block(pos) => self.block_geom(pos).map(|b| b.rect),
            NodePos::Item { block, item } => self.block_geom(block)?.items.get(item).copied(),
            NodePos::Text { block, offset } => {
                let geom = self.block_geom(block)?;
                let line = geom
                    .lines
                    .iter()
                    .rposition(|l| l.start <= offset)?;
                let top = geom.rect.top + line as f64 * geom.line_height;
                Some(Rect {
                    top,
                    bottom: top + geom.line_height,
                    left: geom.rect.left,
                    right: geom.rect.right,
                })
            }
        }
    }

    fn margins(&self, node: NodePos) -> VerticalMargins {
        match node {
            NodePos::Block(pos) => self.block_geom(pos).map(|b| b.margins).unwrap_or_default(),
            _ => VerticalMargins::default(),
        }
    }

    fn page_padding(&self, page: usize) -> Option<VerticalPadding> {
        self.pages.get(page).map(|p| p.padding)
    }

    fn text_offset_at(&self, block: BlockPos, y: f64) -> Option<usize> {
        let geom = self.block_geom(block)?;
        if geom.lines.is_empty() || y < geom.rect.top || y >= geom.rect.bottom {
            return None;
        }
        let line = ((y - geom.rect.top) / geom.line_height).floor() as usize;
        geom.lines.get(line).map(|l| l.start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Edges, PageSize};
    use crate::model::Page;

    fn renderer() -> HeadlessRenderer {
        let config = LayoutConfig {
            size: PageSize::Custom {
                width: 500.0,
                height: 1000.0,
            },
            padding: Edges::uniform(50.0),
            page_gap: 20.0,
            ..Default::default()
        };
        let metrics = HeadlessMetrics {
            char_width: 10.0,
            line_height: 50.0,
            block_spacing: 0.0,
            ..Default::default()
        };
        HeadlessRenderer::new(config, metrics)
    }

    #[test]
    fn pages_are_stacked_with_gap() {
        let mut r = renderer();
        r.sync(&Document::from_pages(vec![Page::default(), Page::default()]));
        let second = r.measure(NodePos::Page(1)).unwrap();
        assert_eq!(second.top, 1020.0);
        assert_eq!(second.bottom, 2020.0);
    }

    #[test]
    fn blocks_stack_from_body_top() {
        let mut r = renderer();
        let doc = Document::from_blocks(vec![
            Block::paragraph("one\ntwo"),
            Block::paragraph("three"),
        ]);
        r.sync(&doc);
        let first = r.measure(NodePos::Block(BlockPos::new(0, 0))).unwrap();
        let second = r.measure(NodePos::Block(BlockPos::new(0, 1))).unwrap();
        assert_eq!(first.top, 50.0);
        assert_eq!(first.bottom, 150.0);
        assert_eq!(second.top, 150.0);
        assert_eq!(second.bottom, 200.0);
    }

    #[test]
    fn header_pushes_body_down() {
        let mut r = renderer();
        r.set_chrome(ChromeHeights {
            header: 30.0,
            footer: 0.0,
        });
        r.sync(&Document::from_blocks(vec![Block::paragraph("x")]));
        let rect = r.measure(NodePos::Block(BlockPos::new(0, 0))).unwrap();
        assert_eq!(rect.top, 80.0);
    }

    #[test]
    fn hit_test_returns_line_start() {
        let mut r = renderer();
        // 40 chars per line at 400px content width
        let text = format!("{} {}", "a".repeat(39), "b".repeat(10));
        r.sync(&Document::from_blocks(vec![Block::paragraph(&text)]));
        let pos = BlockPos::new(0, 0);
        assert_eq!(r.text_offset_at(pos, 60.0), Some(0));
        assert_eq!(r.text_offset_at(pos, 120.0), Some(40));
        assert_eq!(r.text_offset_at(pos, 150.0), None);
        assert_eq!(r.text_offset_at(pos, 10.0), None);
    }

    #[test]
    fn list_items_are_measured() {
        let mut r = renderer();
        r.sync(&Document::from_blocks(vec![Block::list(
            true,
            1,
            &["a", "b", "c"],
        )]));
        let block = BlockPos::new(0, 0);
        let item = r.measure(NodePos::Item { block, item: 2 }).unwrap();
        assert_eq!(item.top, 150.0);
        assert_eq!(item.bottom, 200.0);
        assert_eq!(r.measure(NodePos::Block(block)).unwrap().height(), 150.0);
    }

    #[test]
    fn table_rows_include_cell_padding() {
        let mut r = renderer();
        r.sync(&Document::from_blocks(vec![Block::table(vec![
            vec!["a".into(), "b".into()],
            vec!["c".into(), "d".into()],
        ])]));
        let rect = r.measure(NodePos::Block(BlockPos::new(0, 0))).unwrap();
        assert_eq!(rect.height(), 2.0 * (50.0 + 8.0));
    }
}
