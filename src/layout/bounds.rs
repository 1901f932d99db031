//! Body bounds and header/footer height negotiation.
//!
//! The usable body of a page is what's left after padding and the header
//! and footer regions:
//!
//! ```text
//! body = pageHeight − header − footer − padding.top − padding.bottom
//! ```
//!
//! Header and footer measure their own content and report it; an empty
//! region reports 0 and collapses. Bounds are derived again on every query
//! from the latest report, never cached across edits.

use serde::{Deserialize, Serialize};

use crate::config::LayoutConfig;
use crate::measure::{MeasurementProvider, Rect, VerticalPadding};
use crate::model::NodePos;

/// Heights reported by the header and footer regions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ChromeHeights {
    pub header: f64,
    pub footer: f64,
}

impl ChromeHeights {
    /// Negative or non-finite reports collapse the region.
    pub fn new(header: f64, footer: f64) -> Self {
        let clamp = |v: f64| if v.is_finite() { v.max(0.0) } else { 0.0 };
        Self {
            header: clamp(header),
            footer: clamp(footer),
        }
    }

    /// The static defaults, used until the regions report.
    pub fn from_config(config: &LayoutConfig) -> Self {
        Self::new(config.header_height, config.footer_height)
    }

    /// Usable body height of a page under these heights.
    pub fn body_height(&self, config: &LayoutConfig) -> f64 {
        config.padded_height() - self.header - self.footer
    }
}

/// The usable vertical region of one page, in provider coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyBounds {
    pub top: f64,
    pub bottom: f64,
}

impl BodyBounds {
    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    /// Bounds of `page` from its measured box and padding.
    ///
    /// A page that isn't rendered yet is assumed to sit where the static
    /// geometry puts it, and padding that measures as zero (first paint) is
    /// replaced by the configured padding.
    pub fn resolve(
        provider: &dyn MeasurementProvider,
        page: usize,
        config: &LayoutConfig,
        chrome: ChromeHeights,
    ) -> Self {
        let page_h = config.page_height();
        let rect = provider
            .measure(NodePos::Page(page))
            .filter(|r| r.height() > 0.0)
            .unwrap_or_else(|| {
                log::debug!("page {} not measurable, using static geometry", page);
                let top = page as f64 * (page_h + config.page_gap);
                Rect {
                    top,
                    bottom: top + page_h,
                    left: 0.0,
                    right: config.page_width(),
                }
            });

        let padding = provider
            .page_padding(page)
            .filter(|p| !p.is_zero())
            .unwrap_or(VerticalPadding {
                top: config.padding.top,
                bottom: config.padding.bottom,
            });

        Self {
            top: rect.top + padding.top + chrome.header,
            bottom: rect.bottom - padding.bottom - chrome.footer,
        }
    }
}
