//! Row-major pixel storage.
//!
//! A [`PixelGrid`] owns one contiguous allocation of `width * height` pixels and is
//! indexed by `(row, col)` through a stride of `width`. [`GridView`] is the borrowed,
//! read-only form that the blur kernel consumes; it can point into a `PixelGrid` or into
//! any other contiguous pixel slice with the same layout.

use crate::Pixel;

/// Owned image buffer with fixed dimensions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelGrid {
    width: usize,
    height: usize,
    pixels: Vec<Pixel>,
}

impl PixelGrid {
    /// Create a grid with every pixel black.
    pub fn new(width: usize, height: usize) -> Self {
        Self::filled(width, height, Pixel::BLACK)
    }

    /// Create a grid with every pixel set to `pixel`.
    pub fn filled(width: usize, height: usize, pixel: Pixel) -> Self {
        Self {
            width,
            height,
            pixels: vec![pixel; width * height],
        }
    }

    /// Wrap an existing row-major pixel vector.
    ///
    /// # Panics
    ///
    /// Panics if `pixels.len() != width * height`.
    pub fn from_pixels(width: usize, height: usize, pixels: Vec<Pixel>) -> Self {
        assert_eq!(
            pixels.len(),
            width * height,
            "pixel count does not match {width}x{height}"
        );
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Total number of pixels.
    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    pub fn get(&self, row: usize, col: usize) -> Pixel {
        self.pixels[self.index(row, col)]
    }

    pub fn set(&mut self, row: usize, col: usize, pixel: Pixel) {
        let index = self.index(row, col);
        self.pixels[index] = pixel;
    }

    pub fn row(&self, row: usize) -> &[Pixel] {
        let start = row * self.width;
        &self.pixels[start..start + self.width]
    }

    pub fn row_mut(&mut self, row: usize) -> &mut [Pixel] {
        let start = row * self.width;
        &mut self.pixels[start..start + self.width]
    }

    pub fn pixels(&self) -> &[Pixel] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [Pixel] {
        &mut self.pixels
    }

    pub fn into_pixels(self) -> Vec<Pixel> {
        self.pixels
    }

    /// Borrow the grid as a read-only view.
    pub fn view(&self) -> GridView<'_> {
        GridView::new(&self.pixels, self.width, self.height)
    }

    /// True if every pixel equals `pixel`.
    pub fn is_uniform(&self, pixel: Pixel) -> bool {
        self.pixels.iter().all(|&p| p == pixel)
    }

    #[inline]
    fn index(&self, row: usize, col: usize) -> usize {
        debug_assert!(row < self.height && col < self.width);
        row * self.width + col
    }
}

/// Borrowed row-major pixels plus their dimensions.
#[derive(Clone, Copy, Debug)]
pub struct GridView<'a> {
    pixels: &'a [Pixel],
    width: usize,
    height: usize,
}

impl<'a> GridView<'a> {
    /// # Panics
    ///
    /// Panics if `pixels.len() != width * height`.
    pub fn new(pixels: &'a [Pixel], width: usize, height: usize) -> Self {
        assert_eq!(pixels.len(), width * height);
        Self {
            pixels,
            width,
            height,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Pixel {
        self.pixels[row * self.width + col]
    }

    pub fn row(&self, row: usize) -> &'a [Pixel] {
        let start = row * self.width;
        &self.pixels[start..start + self.width]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_grid_is_black() {
        let grid = PixelGrid::new(4, 3);

        assert_eq!(grid.width(), 4);
        assert_eq!(grid.height(), 3);
        assert_eq!(grid.len(), 12);
        assert!(grid.is_uniform(Pixel::BLACK));
    }

    #[test]
    fn test_set_and_get_use_row_major_stride() {
        let mut grid = PixelGrid::new(3, 2);
        let red = Pixel::rgb(255, 0, 0);

        grid.set(1, 2, red);

        assert_eq!(grid.get(1, 2), red);
        assert_eq!(grid.pixels()[5], red);
        assert_eq!(grid.row(1)[2], red);
        assert_eq!(grid.get(0, 2), Pixel::BLACK);
    }

    #[test]
    fn test_row_mut_writes_only_that_row() {
        let mut grid = PixelGrid::new(2, 3);

        grid.row_mut(1).fill(Pixel::WHITE);

        assert_eq!(grid.row(0), &[Pixel::BLACK; 2]);
        assert_eq!(grid.row(1), &[Pixel::WHITE; 2]);
        assert_eq!(grid.row(2), &[Pixel::BLACK; 2]);
    }

    #[test]
    fn test_view_matches_grid() {
        let mut grid = PixelGrid::new(3, 3);
        grid.set(2, 1, Pixel::rgb(1, 2, 3));

        let view = grid.view();

        assert_eq!(view.width(), 3);
        assert_eq!(view.height(), 3);
        assert_eq!(view.get(2, 1), Pixel::rgb(1, 2, 3));
        assert_eq!(view.row(1), grid.row(1));
    }

    #[test]
    #[should_panic(expected = "pixel count does not match")]
    fn test_from_pixels_rejects_wrong_length() {
        let _ = PixelGrid::from_pixels(2, 2, vec![Pixel::BLACK; 3]);
    }
}
