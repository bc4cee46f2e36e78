//! Stacked bar chart of per-class correct/incorrect counts.

use crate::color::Rgba;
use crate::error::{Error, Result};
use crate::eval::ClassDistributionEntry;
use crate::framebuffer::Framebuffer;

/// Horizontal stacked bars, one per actual class, in distribution order.
#[derive(Debug, Clone)]
pub struct DistributionChart<'a> {
    entries: &'a [ClassDistributionEntry],
    width: u32,
    bar_height: u32,
    gap: u32,
}

impl<'a> DistributionChart<'a> {
    /// Create a chart with default geometry.
    #[must_use]
    pub fn new(entries: &'a [ClassDistributionEntry]) -> Self {
        Self { entries, width: 400, bar_height: 20, gap: 6 }
    }

    /// Set the output width in pixels.
    #[must_use]
    pub fn width(mut self, width: u32) -> Self {
        self.width = width;
        self
    }

    /// Set the height of each bar in pixels.
    #[must_use]
    pub fn bar_height(mut self, height: u32) -> Self {
        self.bar_height = height;
        self
    }

    /// Pixel lengths of the correct and incorrect segments of each bar.
    ///
    /// Bars are scaled so the largest class spans the full width.
    #[must_use]
    pub fn segments(&self) -> Vec<(u32, u32)> {
        let max_total = self.entries.iter().fold(0, |max, e| max.max(e.total()));
        if max_total == 0 {
            return vec![(0, 0); self.entries.len()];
        }
        let scale = |count: u64| ((count as f64 / max_total as f64) * f64::from(self.width)).round() as u32;
        self.entries
            .iter()
            .map(|e| {
                let correct = scale(e.correct);
                let total = scale(e.total());
                (correct, total.saturating_sub(correct))
            })
            .collect()
    }

    /// Render to a new white framebuffer.
    ///
    /// # Errors
    ///
    /// Returns an error if there are no entries or the geometry is empty.
    pub fn to_framebuffer(&self) -> Result<Framebuffer> {
        if self.entries.is_empty() {
            return Err(Error::EmptyData);
        }
        let rows = self.entries.len() as u32;
        let height = rows * self.bar_height + (rows + 1) * self.gap;
        let mut fb = Framebuffer::new(self.width, height)?;
        fb.clear(Rgba::WHITE);

        for (i, (correct, incorrect)) in self.segments().into_iter().enumerate() {
            let y = self.gap + i as u32 * (self.bar_height + self.gap);
            fb.fill_rect(0, y, correct, self.bar_height, Rgba::CORRECT);
            fb.fill_rect(correct, y, incorrect, self.bar_height, Rgba::INCORRECT);
        }
        Ok(fb)
    }
}
