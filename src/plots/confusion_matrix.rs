//! Confusion matrix heatmap.
//!
//! Renders one square per `(actual, predicted)` pair: rows are actual
//! classes, columns are predicted classes, in class-set order. Cells take
//! their color from [`CellTint`], so correct predictions shade green,
//! incorrect ones red, and empty pairs stay white. Sparse matrices render
//! their missing pairs as empty cells.
//!
//! Cells shrink so the image side stays within [`MAX_DIMENSION`].

use std::collections::HashMap;

use crate::color::{CellTint, Rgba};
use crate::error::{Error, Result};
use crate::eval::ConfusionMatrix;
use crate::framebuffer::{Framebuffer, MAX_DIMENSION};

/// Builder for confusion matrix heatmaps.
#[derive(Debug, Clone)]
pub struct ConfusionHeatmap<'a> {
    matrix: &'a ConfusionMatrix,
    /// Edge length of one cell in pixels.
    cell_size: u32,
    /// Margin around the grid.
    margin: u32,
    /// Draw grid lines between cells.
    show_borders: bool,
    /// Outline the diagonal.
    highlight_diagonal: bool,
}

impl<'a> ConfusionHeatmap<'a> {
    /// Create a heatmap for `matrix` with default styling.
    #[must_use]
    pub fn new(matrix: &'a ConfusionMatrix) -> Self {
        Self { matrix, cell_size: 48, margin: 16, show_borders: true, highlight_diagonal: true }
    }

    /// Set the cell edge length in pixels.
    #[must_use]
    pub fn cell_size(mut self, size: u32) -> Self {
        self.cell_size = size;
        self
    }

    /// Set the margin around the grid.
    #[must_use]
    pub fn margin(mut self, margin: u32) -> Self {
        self.margin = margin;
        self
    }

    /// Enable or disable grid lines.
    #[must_use]
    pub fn borders(mut self, show: bool) -> Self {
        self.show_borders = show;
        self
    }

    /// Enable or disable the diagonal outline.
    #[must_use]
    pub fn highlight_diagonal(mut self, highlight: bool) -> Self {
        self.highlight_diagonal = highlight;
        self
    }

    /// Validate that there is something to draw.
    ///
    /// # Errors
    ///
    /// Returns an error if the matrix has no classes or the cell size is zero.
    pub fn build(self) -> Result<Self> {
        if self.matrix.classes().is_empty() {
            return Err(Error::EmptyData);
        }
        if self.cell_size == 0 {
            return Err(Error::InvalidDimensions { width: 0, height: 0 });
        }
        Ok(self)
    }

    /// Output size in pixels.
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        let grid = self.class_count().saturating_mul(self.effective_cell_size());
        let side = grid.saturating_add(self.margin.saturating_mul(2));
        (side, side)
    }

    /// Cell edge actually drawn: the configured size, reduced to fit the
    /// class count within [`MAX_DIMENSION`], never below one pixel.
    #[must_use]
    pub fn effective_cell_size(&self) -> u32 {
        let n = self.class_count().max(1);
        let room = MAX_DIMENSION.saturating_sub(self.margin.saturating_mul(2));
        self.cell_size.min(room / n).max(1)
    }

    fn class_count(&self) -> u32 {
        u32::try_from(self.matrix.classes().len()).unwrap_or(u32::MAX)
    }

    /// Tint of every grid position, row-major over the class set.
    #[must_use]
    pub fn grid(&self) -> Vec<CellTint> {
        let tints: HashMap<(&str, &str), CellTint> = self
            .matrix
            .tinted_cells()
            .map(|(cell, tint)| ((cell.actual.as_str(), cell.predicted.as_str()), tint))
            .collect();

        let classes = self.matrix.classes();
        classes
            .iter()
            .flat_map(|actual| classes.iter().map(move |predicted| (actual, predicted)))
            .map(|(a, p)| tints.get(&(a.as_str(), p.as_str())).copied().unwrap_or_default())
            .collect()
    }

    /// Render the heatmap into `fb`.
    ///
    /// # Errors
    ///
    /// Returns an error if the matrix is empty.
    pub fn render(&self, fb: &mut Framebuffer) -> Result<()> {
        let n = self.matrix.classes().len();
        if n == 0 {
            return Err(Error::EmptyData);
        }

        let size = self.effective_cell_size();
        for (i, tint) in self.grid().into_iter().enumerate() {
            let (x, y) = self.cell_origin(i / n, i % n);
            fb.fill_rect(x, y, size, size, tint.color());
            if self.show_borders && size > 2 {
                fb.stroke_rect(x, y, size, size, 1, Rgba::GRID);
            }
        }

        if self.highlight_diagonal && size > 2 {
            let thickness = (size / 16).max(1);
            for i in 0..n {
                let (x, y) = self.cell_origin(i, i);
                fb.stroke_rect(x, y, size, size, thickness, Rgba::rgb(50, 50, 50));
            }
        }

        Ok(())
    }

    /// Render to a new white framebuffer.
    ///
    /// # Errors
    ///
    /// Returns an error if the matrix is empty or the output size is zero.
    pub fn to_framebuffer(&self) -> Result<Framebuffer> {
        let (width, height) = self.dimensions();
        let mut fb = Framebuffer::new(width, height)?;
        fb.clear(Rgba::WHITE);
        self.render(&mut fb)?;
        Ok(fb)
    }

    fn cell_origin(&self, row: usize, col: usize) -> (u32, u32) {
        let size = self.effective_cell_size();
        (
            self.margin.saturating_add((col as u32).saturating_mul(size)),
            self.margin.saturating_add((row as u32).saturating_mul(size)),
        )
    }
}
