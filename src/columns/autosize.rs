//! Content-based column sizing.
//!
//! Text is measured through [`TextMeasurer`], so the same sizing rules work
//! for a canvas-backed browser host and a terminal host counting cells.

use crate::model::column::DEFAULT_COLUMN_WIDTH;
use unicode_width::UnicodeWidthStr;

/// Only this many leading rows are sampled when sizing a column.
pub const AUTOSIZE_SAMPLE_ROWS: usize = 100;

/// Average content width is scaled by this factor before comparing with the
/// header width.
pub const CONTENT_GROWTH: f64 = 1.2;

/// Font descriptor used when the caller has no preference.
pub const DEFAULT_FONT: &str = "14px sans-serif";

/// Measures rendered text width in pixels.
pub trait TextMeasurer {
    /// Width of `text` rendered in `font`, or `None` when measuring is
    /// unavailable.
    fn measure(&self, text: &str, font: &str) -> Option<f64>;
}

/// Measures text by terminal display cells.
///
/// Each cell counts `px_per_cell` pixels and `padding` is added once per
/// string, matching the cell padding of the rendered header or body cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellWidthMeasurer {
    /// Pixels per display cell.
    pub px_per_cell: f64,
    /// Pixels added to every measurement.
    pub padding: f64,
}

impl Default for CellWidthMeasurer {
    fn default() -> Self {
        Self {
            px_per_cell: 8.0,
            padding: 16.0,
        }
    }
}

impl TextMeasurer for CellWidthMeasurer {
    fn measure(&self, text: &str, _font: &str) -> Option<f64> {
        Some(text.width() as f64 * self.px_per_cell + self.padding)
    }
}

/// Measurer for hosts without text metrics; every query fails and sizing
/// falls back to [`DEFAULT_COLUMN_WIDTH`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NoMeasurer;

impl TextMeasurer for NoMeasurer {
    fn measure(&self, _text: &str, _font: &str) -> Option<f64> {
        None
    }
}

/// Measured statistics for one column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnMetrics {
    /// Header label width.
    pub header_width: f64,
    /// Mean width of the sampled values.
    pub average_content_width: f64,
    /// Widest of header and samples, capped at `max_width`.
    pub max_content_width: f64,
    /// Suggested integer width within bounds.
    pub recommended_width: u32,
}

/// Size a column from its header and up to [`AUTOSIZE_SAMPLE_ROWS`] values.
///
/// `recommended = round(clamp(max(header, avg * 1.2), min, max))`. With no
/// samples the average is taken as [`DEFAULT_COLUMN_WIDTH`]. When the
/// measurer is unavailable the recommendation is the default width.
pub fn measure_column<I, S>(
    measurer: &dyn TextMeasurer,
    font: &str,
    header: &str,
    values: I,
    min_width: u32,
    max_width: u32,
) -> ColumnMetrics
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let fallback = f64::from(DEFAULT_COLUMN_WIDTH);
    let Some(header_width) = measurer.measure(header, font) else {
        return ColumnMetrics {
            header_width: fallback,
            average_content_width: fallback,
            max_content_width: fallback,
            recommended_width: DEFAULT_COLUMN_WIDTH.clamp(min_width, max_width),
        };
    };

    let widths: Vec<f64> = values
        .into_iter()
        .take(AUTOSIZE_SAMPLE_ROWS)
        .map(|v| measurer.measure(v.as_ref(), font).unwrap_or(0.0))
        .collect();

    let average_content_width = if widths.is_empty() {
        fallback
    } else {
        widths.iter().sum::<f64>() / widths.len() as f64
    };
    let widest = widths
        .iter()
        .copied()
        .fold(header_width.max(f64::from(min_width)), f64::max);

    let recommended = header_width
        .max(average_content_width * CONTENT_GROWTH)
        .clamp(f64::from(min_width), f64::from(max_width));

    ColumnMetrics {
        header_width,
        average_content_width,
        max_content_width: widest.min(f64::from(max_width)),
        recommended_width: recommended.round() as u32,
    }
}
