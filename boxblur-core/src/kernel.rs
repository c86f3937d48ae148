//! 3x3 box blur on a torus.
//!
//! Each output channel is the mean of the nine input cells centred on the pixel, with
//! row and column indices wrapping at the image edges. The mean is rounded half-up:
//! `(sum / 9.0 + 0.5)` truncated to `u8`.
//!
//! The kernel only reads its source. Blurring a grid in place would feed
//! partially-updated neighbours into later pixels, so callers always write into a
//! second buffer.

use crate::{GridView, Pixel, PixelGrid, RowSpan};

/// Blur one pixel of `source`.
#[inline]
pub fn blur_pixel(source: GridView<'_>, row: usize, col: usize) -> Pixel {
    let (height, width) = (source.height(), source.width());
    let rows = [wrap_prev(row, height), row, wrap_next(row, height)];
    let cols = [wrap_prev(col, width), col, wrap_next(col, width)];

    let mut sum = [0u32; 3];
    for &r in &rows {
        let line = source.row(r);
        for &c in &cols {
            let p = line[c];
            sum[0] += u32::from(p.blue);
            sum[1] += u32::from(p.green);
            sum[2] += u32::from(p.red);
        }
    }

    Pixel {
        blue: mean_of_nine(sum[0]),
        green: mean_of_nine(sum[1]),
        red: mean_of_nine(sum[2]),
    }
}

/// Blur every pixel of `span` into `out`, which holds exactly those rows.
///
/// # Panics
///
/// Panics if `out.len() != span.len() * source.width()`.
pub fn blur_rows(source: GridView<'_>, span: RowSpan, out: &mut [Pixel]) {
    let width = source.width();
    assert_eq!(out.len(), span.len() * width, "output slice does not match span");

    for (line, row) in out.chunks_exact_mut(width.max(1)).zip(span.range()) {
        for (col, pixel) in line.iter_mut().enumerate() {
            *pixel = blur_pixel(source, row, col);
        }
    }
}

/// Single-threaded reference: one blur round over the whole grid.
pub fn blur_once(grid: &PixelGrid) -> PixelGrid {
    let mut out = PixelGrid::new(grid.width(), grid.height());
    let span = RowSpan::new(0, grid.height());
    blur_rows(grid.view(), span, out.pixels_mut());
    out
}

/// Single-threaded reference: `rounds` blur rounds, ping-ponging two buffers.
pub fn blur_rounds(grid: &PixelGrid, rounds: u32) -> PixelGrid {
    let mut current = grid.clone();
    let mut next = PixelGrid::new(grid.width(), grid.height());
    let span = RowSpan::new(0, grid.height());
    for _ in 0..rounds {
        blur_rows(current.view(), span, next.pixels_mut());
        std::mem::swap(&mut current, &mut next);
    }
    current
}

#[inline]
fn mean_of_nine(sum: u32) -> u8 {
    (f64::from(sum) / 9.0 + 0.5) as u8
}

#[inline]
fn wrap_prev(index: usize, len: usize) -> usize {
    if index == 0 {
        len - 1
    } else {
        index - 1
    }
}

#[inline]
fn wrap_next(index: usize, len: usize) -> usize {
    if index + 1 == len {
        0
    } else {
        index + 1
    }
}
