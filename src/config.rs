//! # Layout Configuration
//!
//! Static page geometry and the tuning constants of the reflow loop. The
//! geometry values double as the fallback the engine uses when a page's
//! padding can't be measured yet (first paint).
//!
//! All lengths are CSS pixels (96 per inch).

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Page geometry and reflow tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutConfig {
    /// Page size. Defaults to US Letter.
    pub size: PageSize,

    /// Page padding. Top and bottom bound the body vertically.
    pub padding: Edges,

    /// Vertical gap between consecutive pages on screen.
    pub page_gap: f64,

    /// Header height assumed until the header reports its own.
    pub header_height: f64,

    /// Footer height assumed until the footer reports its own.
    pub footer_height: f64,

    /// How far a block may poke past the body bottom before it counts as
    /// overflowing. Absorbs sub-pixel rounding.
    pub overflow_epsilon: f64,

    /// Room a pulled-back block must leave below it. Keeps push and pull
    /// from undoing each other on borderline heights.
    pub pull_buffer: f64,

    /// Upper bound on mutations issued by one reflow pass.
    pub max_moves: usize,

    /// How many characters either side of the hit position a paragraph
    /// split may travel to land on whitespace.
    pub snap_window: usize,

    /// Rendering frames to wait after a change before measuring.
    pub frames_before_reflow: u8,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            size: PageSize::Letter,
            padding: Edges::uniform(96.0), // 1 inch
            page_gap: 24.0,
            header_height: 0.0,
            footer_height: 0.0,
            overflow_epsilon: 0.5,
            pull_buffer: 2.0,
            max_moves: 200,
            snap_window: 30,
            frames_before_reflow: 2,
        }
    }
}

impl LayoutConfig {
    pub fn from_json(json: &str) -> Result<Self, Error> {
        serde_json::from_str(json).map_err(Error::config)
    }

    pub fn page_width(&self) -> f64 {
        self.size.dimensions().0
    }

    pub fn page_height(&self) -> f64 {
        self.size.dimensions().1
    }

    /// Page height minus padding, before header and footer are subtracted.
    pub fn padded_height(&self) -> f64 {
        self.page_height() - self.padding.vertical()
    }
}

/// Standard page sizes in CSS pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum PageSize {
    A4,
    A5,
    #[default]
    Letter,
    Legal,
    Tabloid,
    Custom {
        width: f64,
        height: f64,
    },
}

impl PageSize {
    /// Returns (width, height) in pixels.
    pub fn dimensions(&self) -> (f64, f64) {
        match self {
            PageSize::A4 => (793.7, 1122.5),
            PageSize::A5 => (559.4, 793.7),
            PageSize::Letter => (816.0, 1056.0),
            PageSize::Legal => (816.0, 1344.0),
            PageSize::Tabloid => (1056.0, 1632.0),
            PageSize::Custom { width, height } => (*width, *height),
        }
    }
}

/// Edge values (top, right, bottom, left).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Edges {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Edges {
    pub fn uniform(v: f64) -> Self {
        Self {
            top: v,
            right: v,
            bottom: v,
            left: v,
        }
    }

    pub fn horizontal(&self) -> f64 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f64 {
        self.top + self.bottom
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = LayoutConfig::from_json(r#"{ "size": "A4", "maxMoves": 10 }"#).unwrap();
        assert_eq!(config.size, PageSize::A4);
        assert_eq!(config.max_moves, 10);
        assert_eq!(config.snap_window, 30);
        assert_eq!(config.overflow_epsilon, 0.5);
    }

    #[test]
    fn invalid_config_names_the_config() {
        let err = LayoutConfig::from_json(r#"{ "maxMoves": "many" }"#).unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
        let message = err.to_string();
        assert!(message.starts_with("Failed to parse layout config"), "{}", message);
        assert!(message.contains("layout config schema"), "{}", message);
    }

    #[test]
    fn custom_size() {
        let config = LayoutConfig::from_json(
            r#"{ "size": { "Custom": { "width": 500, "height": 1000 } },
                 "padding": { "top": 50, "right": 50, "bottom": 50, "left": 50 } }"#,
        )
        .unwrap();
        assert_eq!(config.page_height(), 1000.0);
        assert_eq!(config.padded_height(), 900.0);
    }
}
