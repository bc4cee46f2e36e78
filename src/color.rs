//! Colors and confusion-cell tints.
//!
//! Diagonal (correct) cells are tinted green and off-diagonal (incorrect)
//! cells red, scaled by the cell's intensity relative to the largest count.
//! Zero-count cells stay untinted.

use crate::eval::matrix::ConfusionCell;

/// RGBA color with 8-bit components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgba {
    /// Red component (0-255).
    pub r: u8,
    /// Green component (0-255).
    pub g: u8,
    /// Blue component (0-255).
    pub b: u8,
    /// Alpha component (0-255, 255 = fully opaque).
    pub a: u8,
}

impl Rgba {
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);
    /// Opaque black.
    pub const BLACK: Self = Self::new(0, 0, 0, 255);
    /// Opaque white.
    pub const WHITE: Self = Self::new(255, 255, 255, 255);
    /// Full-intensity tint for correct predictions.
    pub const CORRECT: Self = Self::rgb(34, 139, 34);
    /// Full-intensity tint for incorrect predictions.
    pub const INCORRECT: Self = Self::rgb(200, 40, 40);
    /// Grid lines between cells.
    pub const GRID: Self = Self::rgb(100, 100, 100);

    /// Create a new RGBA color.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque RGB color (alpha = 255).
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Convert to array representation.
    #[must_use]
    pub const fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Linear interpolation between two colors.
    #[must_use]
    pub fn lerp(self, other: Self, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        let inv_t = 1.0 - t;

        Self::new(
            (f32::from(self.r) * inv_t + f32::from(other.r) * t) as u8,
            (f32::from(self.g) * inv_t + f32::from(other.g) * t) as u8,
            (f32::from(self.b) * inv_t + f32::from(other.b) * t) as u8,
            (f32::from(self.a) * inv_t + f32::from(other.a) * t) as u8,
        )
    }

    /// Rec. 709 luminance in `[0, 1]`.
    #[must_use]
    pub fn luminance(self) -> f32 {
        0.2126 * (f32::from(self.r) / 255.0)
            + 0.7152 * (f32::from(self.g) / 255.0)
            + 0.0722 * (f32::from(self.b) / 255.0)
    }
}

/// Display tint of a confusion cell, carrying its intensity in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum CellTint {
    /// Zero-count cell.
    #[default]
    None,
    /// Diagonal cell (actual == predicted).
    Correct(f32),
    /// Off-diagonal cell.
    Incorrect(f32),
}

impl CellTint {
    /// Tint for a cell at the given intensity.
    #[must_use]
    pub fn for_cell(cell: &ConfusionCell, intensity: f32) -> Self {
        if cell.count == 0 {
            Self::None
        } else if cell.is_correct() {
            Self::Correct(intensity)
        } else {
            Self::Incorrect(intensity)
        }
    }

    /// Background color over a white canvas.
    ///
    /// Non-zero cells keep a minimum visible tint even at low intensity.
    #[must_use]
    pub fn color(self) -> Rgba {
        const FLOOR: f32 = 0.15;
        match self {
            Self::None => Rgba::WHITE,
            Self::Correct(t) => Rgba::WHITE.lerp(Rgba::CORRECT, FLOOR + (1.0 - FLOOR) * t),
            Self::Incorrect(t) => Rgba::WHITE.lerp(Rgba::INCORRECT, FLOOR + (1.0 - FLOOR) * t),
        }
    }

    /// Foreground color that stays readable on [`Self::color`].
    #[must_use]
    pub fn text_color(self) -> Rgba {
        if self.color().luminance() < 0.5 {
            Rgba::WHITE
        } else {
            Rgba::BLACK
        }
    }
}
