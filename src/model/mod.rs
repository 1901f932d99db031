//! # Document Model
//!
//! The structured document the pagination engine keeps partitioned. It is a
//! three-level tree: a [`Document`] holds [`Page`]s in reading order, and each
//! Page holds [`Block`]s. Blocks are the measurable units; some of them carry
//! nested structure of their own (list → list item → paragraph).
//!
//! The model is owned by the editing surface. The engine never writes it
//! directly; every change goes through a [`crate::transform::Transaction`].
//!
//! One invariant is enforced at construction: a Document always has at least
//! one Page. Deserialization accepts both the paged shape and the legacy flat
//! shape (`{ "blocks": [...] }`), which is wrapped into a single Page.

mod position;

pub use position::{BlockPos, NodePos};

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// A complete paged document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "DocumentRepr")]
pub struct Document {
    /// Pages in reading order. Never empty.
    pub pages: Vec<Page>,
}

/// Accepted input shapes. The flat shape predates page containers.
#[derive(Deserialize)]
#[serde(untagged)]
enum DocumentRepr {
    Paged { pages: Vec<Page> },
    Flat { blocks: Vec<Block> },
}

impl From<DocumentRepr> for Document {
    fn from(repr: DocumentRepr) -> Self {
        match repr {
            DocumentRepr::Paged { pages } => Document::from_pages(pages),
            DocumentRepr::Flat { blocks } => Document::from_blocks(blocks),
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// A document with a single empty page.
    pub fn new() -> Self {
        Self {
            pages: vec![Page::default()],
        }
    }

    /// Build from pages, inserting an empty page if none are given.
    pub fn from_pages(pages: Vec<Page>) -> Self {
        if pages.is_empty() {
            return Self::new();
        }
        Self { pages }
    }

    /// Wrap legacy flat content into a single page.
    pub fn from_blocks(blocks: Vec<Block>) -> Self {
        Self {
            pages: vec![Page { blocks }],
        }
    }

    /// Parse a document from JSON, accepting the paged or the flat shape.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn page(&self, index: usize) -> Option<&Page> {
        self.pages.get(index)
    }

    pub fn block(&self, pos: BlockPos) -> Option<&Block> {
        self.pages.get(pos.page)?.blocks.get(pos.index)
    }

    /// All leaf text in document order, without separators.
    ///
    /// Splitting and moving blocks must leave this string unchanged.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for page in &self.pages {
            for block in &page.blocks {
                block.collect_text(&mut out);
            }
        }
        out
    }

    /// Structural size: every node counts one, every character counts one.
    pub fn size(&self) -> usize {
        self.pages
            .iter()
            .map(|p| 1 + p.blocks.iter().map(Block::size).sum::<usize>())
            .sum()
    }
}

/// One physical page of output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub blocks: Vec<Block>,
}

impl Page {
    pub fn new(blocks: Vec<Block>) -> Self {
        Self { blocks }
    }

    /// No blocks, or a single empty paragraph (what an editor leaves behind
    /// after the user clears a page).
    pub fn is_effectively_empty(&self) -> bool {
        match self.blocks.as_slice() {
            [] => true,
            [only] => only.is_empty_paragraph(),
            _ => false,
        }
    }
}

/// An atomic, measurable unit of content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Block {
    Paragraph {
        #[serde(default)]
        text: String,
    },
    Heading {
        #[serde(default = "default_level")]
        level: u8,
        #[serde(default)]
        text: String,
    },
    List(List),
    Table {
        #[serde(default)]
        rows: Vec<Vec<String>>,
    },
    Blockquote {
        #[serde(default)]
        blocks: Vec<Block>,
    },
}

fn default_level() -> u8 {
    1
}

fn default_start() -> u32 {
    1
}

/// An ordered or bullet list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct List {
    #[serde(default)]
    pub ordered: bool,
    /// Number of the first item. Only meaningful when `ordered`.
    #[serde(default = "default_start")]
    pub start: u32,
    #[serde(default)]
    pub items: Vec<ListItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListItem {
    #[serde(default)]
    pub blocks: Vec<Block>,
}

impl ListItem {
    /// An item holding a single paragraph.
    pub fn text(text: &str) -> Self {
        Self {
            blocks: vec![Block::paragraph(text)],
        }
    }
}

impl Block {
    pub fn paragraph(text: &str) -> Self {
        Block::Paragraph {
            text: text.to_string(),
        }
    }

    pub fn heading(level: u8, text: &str) -> Self {
        Block::Heading {
            level,
            text: text.to_string(),
        }
    }

    /// A list whose items each hold one paragraph.
    pub fn list(ordered: bool, start: u32, items: &[&str]) -> Self {
        Block::List(List {
            ordered,
            start,
            items: items.iter().map(|t| ListItem::text(t)).collect(),
        })
    }

    pub fn table(rows: Vec<Vec<String>>) -> Self {
        Block::Table { rows }
    }

    /// Human-readable name of the variant, for logs and errors.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Block::Paragraph { .. } => "Paragraph",
            Block::Heading { .. } => "Heading",
            Block::List(_) => "List",
            Block::Table { .. } => "Table",
            Block::Blockquote { .. } => "Blockquote",
        }
    }

    pub fn is_empty_paragraph(&self) -> bool {
        matches!(self, Block::Paragraph { text } if text.is_empty())
    }

    pub fn text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Block::Paragraph { text } | Block::Heading { text, .. } => out.push_str(text),
            Block::List(list) => {
                for item in &list.items {
                    for block in &item.blocks {
                        block.collect_text(out);
                    }
                }
            }
            Block::Table { rows } => {
                for cell in rows.iter().flatten() {
                    out.push_str(cell);
                }
            }
            Block::Blockquote { blocks } => {
                for block in blocks {
                    block.collect_text(out);
                }
            }
        }
    }

    /// Structural size of this block (see [`Document::size`]).
    pub fn size(&self) -> usize {
        1 + match self {
            Block::Paragraph { text } | Block::Heading { text, .. } => text.chars().count(),
            Block::List(list) => list
                .items
                .iter()
                .map(|item| 1 + item.blocks.iter().map(Block::size).sum::<usize>())
                .sum(),
            Block::Table { rows } => rows
                .iter()
                .map(|row| 1 + row.iter().map(|c| 1 + c.chars().count()).sum::<usize>())
                .sum(),
            Block::Blockquote { blocks } => blocks.iter().map(Block::size).sum(),
        }
    }

    /// Split this block in place, returning the tail as a new sibling.
    ///
    /// For paragraphs `at` is a character offset strictly inside the text;
    /// for lists it is an item index strictly inside the item list. The tail
    /// list inherits the original's attributes unchanged; renumbering is a
    /// separate attribute step.
    pub(crate) fn split_off(&mut self, at: usize) -> Option<Block> {
        match self {
            Block::Paragraph { text } => {
                let byte = char_to_byte(text, at)?;
                if byte == 0 || byte >= text.len() {
                    return None;
                }
                let tail = text.split_off(byte);
                Some(Block::Paragraph { text: tail })
            }
            Block::List(list) => {
                if at == 0 || at >= list.items.len() {
                    return None;
                }
                let items = list.items.split_off(at);
                Some(Block::List(List {
                    ordered: list.ordered,
                    start: list.start,
                    items,
                }))
            }
            _ => None,
        }
    }
}

/// Byte index of the `offset`-th character. `offset == char count` maps to
/// the string length.
fn char_to_byte(text: &str, offset: usize) -> Option<usize> {
    text.char_indices()
        .map(|(b, _)| b)
        .chain(std::iter::once(text.len()))
        .nth(offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_page_list_gets_one_page() {
        let doc = Document::from_pages(vec![]);
        assert_eq!(doc.page_count(), 1);
        assert!(doc.pages[0].blocks.is_empty());
    }

    #[test]
    fn legacy_flat_json_is_wrapped_in_one_page() {
        let json = r#"{ "blocks": [
            { "type": "Paragraph", "text": "Hello" },
            { "type": "Heading", "level": 2, "text": "Title" }
        ] }"#;
        let doc = Document::from_json(json).unwrap();
        assert_eq!(doc.page_count(), 1);
        assert_eq!(doc.pages[0].blocks.len(), 2);
        assert_eq!(doc.pages[0].blocks[1], Block::heading(2, "Title"));
    }

    #[test]
    fn paged_json_round_trips_shape() {
        let json = r#"{ "pages": [
            { "blocks": [ { "type": "List", "ordered": true, "start": 3,
                            "items": [ { "blocks": [ { "type": "Paragraph", "text": "a" } ] } ] } ] },
            { "blocks": [] }
        ] }"#;
        let doc = Document::from_json(json).unwrap();
        assert_eq!(doc.page_count(), 2);
        match &doc.pages[0].blocks[0] {
            Block::List(list) => {
                assert!(list.ordered);
                assert_eq!(list.start, 3);
                assert_eq!(list.items.len(), 1);
            }
            other => panic!("expected list, got {}", other.kind_name()),
        }
    }

    #[test]
    fn empty_pages_json_still_has_a_page() {
        let doc = Document::from_json(r#"{ "pages": [] }"#).unwrap();
        assert_eq!(doc.page_count(), 1);
    }

    #[test]
    fn effectively_empty_page() {
        assert!(Page::default().is_effectively_empty());
        assert!(Page::new(vec![Block::paragraph("")]).is_effectively_empty());
        assert!(!Page::new(vec![Block::paragraph("x")]).is_effectively_empty());
        assert!(!Page::new(vec![Block::paragraph(""), Block::paragraph("")]).is_effectively_empty());
        assert!(!Page::new(vec![Block::heading(1, "")]).is_effectively_empty());
    }

    #[test]
    fn split_paragraph_at_char_offset() {
        let mut block = Block::paragraph("héllo world");
        let tail = block.split_off(5).unwrap();
        assert_eq!(block, Block::paragraph("héllo"));
        assert_eq!(tail, Block::paragraph(" world"));
    }

    #[test]
    fn split_paragraph_rejects_edges() {
        let mut block = Block::paragraph("abc");
        assert!(block.split_off(0).is_none());
        assert!(block.split_off(3).is_none());
        assert!(block.split_off(9).is_none());
        assert_eq!(block, Block::paragraph("abc"));
    }

    #[test]
    fn split_list_keeps_attributes() {
        let mut block = Block::list(true, 4, &["a", "b", "c"]);
        let tail = block.split_off(2).unwrap();
        match (&block, &tail) {
            (Block::List(head), Block::List(tail)) => {
                assert_eq!(head.items.len(), 2);
                assert_eq!(tail.items.len(), 1);
                assert_eq!(tail.start, 4);
                assert!(tail.ordered);
            }
            _ => panic!("expected two lists"),
        }
    }

    #[test]
    fn text_concatenates_leaves_in_order() {
        let doc = Document::from_pages(vec![
            Page::new(vec![
                Block::heading(1, "T"),
                Block::list(false, 1, &["a", "b"]),
            ]),
            Page::new(vec![
                Block::table(vec![vec!["c".into(), "d".into()]]),
                Block::Blockquote {
                    blocks: vec![Block::paragraph("e")],
                },
            ]),
        ]);
        assert_eq!(doc.text(), "Tabcde");
    }

    #[test]
    fn size_counts_nodes_and_chars() {
        let doc = Document::from_blocks(vec![Block::paragraph("abc")]);
        // page + paragraph + 3 chars
        assert_eq!(doc.size(), 5);
    }
}
