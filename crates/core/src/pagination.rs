//! Splits a work's text into viewport-sized pages.
//!
//! Paragraph heights come from a [`ParagraphMeasure`], normally an offscreen
//! render at the current typography. [`LineMetrics`] is a font-metrics
//! estimate for hosts that cannot render.

use thiserror::Error;

use crate::model::{Work, WorkId};

/// Text of the single page shown for works without text.
pub const PLACEHOLDER_TEXT: &str = "Text unavailable";

/// Upper bound of paragraphs on one page of a long text.
pub const MAX_PARAGRAPHS_PER_PAGE: usize = 3;

/// Texts with at most this many paragraphs get one paragraph per page.
pub const SHORT_TEXT_PARAGRAPHS: usize = 5;

/// Share of the viewport assumed for a paragraph whose measurement failed.
const FALLBACK_HEIGHT_RATIO: f32 = 0.2;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum PaginationError {
    #[error("viewport dimensions must be positive")]
    InvalidViewport,

    #[error("font size and line height must be positive")]
    InvalidTypography,
}

/// Typography and viewport the reader is laid out with.
///
/// Any change here invalidates a previous pagination.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutSettings {
    font_size: f32,
    line_height: f32,
    viewport_width: f32,
    viewport_height: f32,
}

impl LayoutSettings {
    /// # Errors
    ///
    /// Returns `PaginationError` if any dimension is non-positive or not finite.
    pub fn new(
        font_size: f32,
        line_height: f32,
        viewport_width: f32,
        viewport_height: f32,
    ) -> Result<Self, PaginationError> {
        if !is_positive(font_size) || !is_positive(line_height) {
            return Err(PaginationError::InvalidTypography);
        }
        if !is_positive(viewport_width) || !is_positive(viewport_height) {
            return Err(PaginationError::InvalidViewport);
        }
        Ok(Self {
            font_size,
            line_height,
            viewport_width,
            viewport_height,
        })
    }

    #[must_use]
    pub fn font_size(&self) -> f32 {
        self.font_size
    }

    #[must_use]
    pub fn line_height(&self) -> f32 {
        self.line_height
    }

    #[must_use]
    pub fn viewport_width(&self) -> f32 {
        self.viewport_width
    }

    #[must_use]
    pub fn viewport_height(&self) -> f32 {
        self.viewport_height
    }
}

fn is_positive(v: f32) -> bool {
    v.is_finite() && v > 0.0
}

/// Rendered height of a paragraph under a layout.
pub trait ParagraphMeasure {
    fn height(&self, paragraph: &str, layout: &LayoutSettings) -> f32;
}

impl<F> ParagraphMeasure for F
where
    F: Fn(&str, &LayoutSettings) -> f32,
{
    fn height(&self, paragraph: &str, layout: &LayoutSettings) -> f32 {
        self(paragraph, layout)
    }
}

/// Estimates height from character count and average glyph width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineMetrics {
    /// Average glyph width as a fraction of the font size.
    pub glyph_width_ratio: f32,
}

impl Default for LineMetrics {
    fn default() -> Self {
        Self {
            glyph_width_ratio: 0.55,
        }
    }
}

impl ParagraphMeasure for LineMetrics {
    #[allow(clippy::cast_precision_loss)]
    fn height(&self, paragraph: &str, layout: &LayoutSettings) -> f32 {
        let glyph = (layout.font_size * self.glyph_width_ratio).max(f32::EPSILON);
        let per_line = (layout.viewport_width / glyph).floor().max(1.0);
        let chars = paragraph.chars().count().max(1) as f32;
        let lines = (chars / per_line).ceil();
        lines * layout.font_size * layout.line_height
    }
}

/// Non-blank lines of a text, each one paragraph.
#[must_use]
pub fn paragraphs(text: &str) -> Vec<&str> {
    text.split('\n')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect()
}

/// Pages of one work under one layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    pages: Vec<Vec<String>>,
    total_pages: u32,
    placeholder: bool,
}

impl Pagination {
    fn placeholder() -> Self {
        Self {
            pages: vec![vec![PLACEHOLDER_TEXT.to_owned()]],
            total_pages: 1,
            placeholder: true,
        }
    }

    #[must_use]
    pub fn pages(&self) -> &[Vec<String>] {
        &self.pages
    }

    /// Estimated page count, before reconciliation with persisted progress.
    #[must_use]
    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    /// Paragraphs of a 1-based page.
    #[must_use]
    pub fn page(&self, number: u32) -> Option<&[String]> {
        let index = usize::try_from(number).ok()?.checked_sub(1)?;
        self.pages.get(index).map(Vec::as_slice)
    }

    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.placeholder
    }
}

/// Lay out `text` into pages.
///
/// Short texts (at most [`SHORT_TEXT_PARAGRAPHS`] paragraphs) get one
/// paragraph per page. Longer texts fill a page while the cumulative height
/// fits the viewport and the page holds fewer than
/// [`MAX_PARAGRAPHS_PER_PAGE`] paragraphs. A paragraph taller than the
/// viewport gets a page of its own.
#[must_use]
pub fn paginate(text: &str, layout: &LayoutSettings, measure: &dyn ParagraphMeasure) -> Pagination {
    let paras = paragraphs(text);
    if paras.is_empty() {
        return Pagination::placeholder();
    }

    let pages: Vec<Vec<String>> = if paras.len() <= SHORT_TEXT_PARAGRAPHS {
        paras.iter().map(|p| vec![(*p).to_owned()]).collect()
    } else {
        fill_pages(&paras, layout, measure)
    };

    let floor = if paras.len() > SHORT_TEXT_PARAGRAPHS { 2 } else { 1 };
    let total_pages = u32::try_from(pages.len()).unwrap_or(u32::MAX).max(floor);

    Pagination {
        pages,
        total_pages,
        placeholder: false,
    }
}

fn fill_pages(
    paras: &[&str],
    layout: &LayoutSettings,
    measure: &dyn ParagraphMeasure,
) -> Vec<Vec<String>> {
    let viewport = layout.viewport_height;
    let fallback = viewport * FALLBACK_HEIGHT_RATIO;

    let mut pages: Vec<Vec<String>> = Vec::new();
    let mut current: Vec<String> = Vec::new();
    let mut current_height = 0.0_f32;

    for paragraph in paras {
        let measured = measure.height(paragraph, layout);
        let height = if is_positive(measured) { measured } else { fallback };

        let overflows = current_height + height > viewport;
        let full = current.len() >= MAX_PARAGRAPHS_PER_PAGE;
        if !current.is_empty() && (overflows || full) {
            pages.push(std::mem::take(&mut current));
            current_height = 0.0;
        }

        current.push((*paragraph).to_owned());
        current_height += height;
    }

    if !current.is_empty() {
        pages.push(current);
    }
    pages
}

/// Total pages after merging a fresh estimate with the persisted value.
///
/// The persisted count wins whenever it is not smaller, so a re-layout never
/// shrinks the book under an already recorded page.
#[must_use]
pub fn reconcile_total_pages(estimate: u32, persisted: Option<u32>) -> u32 {
    match persisted {
        Some(stored) if stored >= estimate => stored,
        _ => estimate,
    }
}

/// Caches the pagination of the open work and recomputes it when the work
/// or the layout changes.
#[derive(Debug, Default)]
pub struct Paginator {
    key: Option<(WorkId, LayoutSettings)>,
    current: Option<Pagination>,
    runs: u32,
}

impl Paginator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn paginate(
        &mut self,
        work: &Work,
        layout: &LayoutSettings,
        measure: &dyn ParagraphMeasure,
    ) -> &Pagination {
        let key = (work.id(), *layout);
        let stale = self.key.as_ref() != Some(&key);
        if stale || self.current.is_none() {
            self.runs += 1;
            self.key = Some(key);
            self.current = Some(paginate(work.full_text(), layout, measure));
        }
        self.current.get_or_insert_with(Pagination::placeholder)
    }

    /// How many times the estimator actually ran.
    #[must_use]
    pub fn runs(&self) -> u32 {
        self.runs
    }
}
