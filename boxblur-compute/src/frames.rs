//! Double-buffered frames shared by all workers.
//!
//! Two equally sized grids hold the *source* frame (read by every worker during a
//! round) and the *destination* frame (written during a round, each row by exactly
//! one worker). Which physical grid plays which role is a single shared index, so a
//! role swap is one store that every worker observes, never a copy of pixel data.
//!
//! The grids are accessed without locks. Soundness rests on the run protocol: the role
//! index only changes between barriers, no one writes the source grid, and destination
//! rows are handed out in disjoint spans. Both accessors are `unsafe` and state that
//! contract.

use boxblur_core::{GridView, Pixel, PixelGrid, RowSpan};
use std::cell::UnsafeCell;
use std::sync::atomic::{AtomicUsize, Ordering};

struct SharedGrid {
    cells: Box<[UnsafeCell<Pixel>]>,
}

impl SharedGrid {
    fn new(grid: PixelGrid) -> Self {
        Self {
            cells: grid.into_pixels().into_iter().map(UnsafeCell::new).collect(),
        }
    }

    fn into_pixels(self) -> Vec<Pixel> {
        self.cells
            .into_vec()
            .into_iter()
            .map(UnsafeCell::into_inner)
            .collect()
    }
}

pub struct FrameBuffers {
    grids: [SharedGrid; 2],
    source: AtomicUsize,
    width: usize,
    height: usize,
}

// SAFETY: concurrent access to the cells follows the contract on `source` and
// `destination_rows`; the role index is atomic.
unsafe impl Sync for FrameBuffers {}

impl FrameBuffers {
    /// Wrap `initial` plus a black scratch grid of the same size.
    ///
    /// `initial` starts in the destination role; the first [`swap_roles`] makes it the
    /// source of round one.
    ///
    /// [`swap_roles`]: FrameBuffers::swap_roles
    pub fn new(initial: PixelGrid) -> Self {
        let (width, height) = (initial.width(), initial.height());
        let scratch = PixelGrid::new(width, height);
        Self {
            grids: [SharedGrid::new(initial), SharedGrid::new(scratch)],
            source: AtomicUsize::new(1),
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

    /// Index (0 or 1) of the grid currently in the source role.
    pub fn source_index(&self) -> usize {
        // Role changes are ordered by the barrier that follows every swap.
        self.source.load(Ordering::Relaxed)
    }

    /// Exchange the source and destination roles.
    ///
    /// Called by a single thread while every other thread is between the two barriers
    /// that bracket the swap.
    pub fn swap_roles(&self) {
        self.source.fetch_xor(1, Ordering::Relaxed);
    }

    /// Read-only view of the source grid.
    ///
    /// # Safety
    ///
    /// For as long as the view lives, no thread may write the grid in the source role
    /// and no thread may call [`swap_roles`].
    ///
    /// [`swap_roles`]: FrameBuffers::swap_roles
    pub unsafe fn source(&self) -> GridView<'_> {
        let cells = &self.grids[self.source_index()].cells;
        // UnsafeCell<Pixel> has the layout of Pixel.
        let pixels = std::slice::from_raw_parts(cells.as_ptr().cast::<Pixel>(), cells.len());
        GridView::new(pixels, self.width, self.height)
    }

    /// Mutable access to the rows of `span` in the destination grid.
    ///
    /// # Safety
    ///
    /// For as long as the slice lives, no other thread may access these rows of the
    /// destination grid, and no thread may call [`swap_roles`].
    ///
    /// [`swap_roles`]: FrameBuffers::swap_roles
    #[allow(clippy::mut_from_ref)]
    pub unsafe fn destination_rows(&self, span: RowSpan) -> &mut [Pixel] {
        assert!(span.end <= self.height, "span {span:?} outside {} rows", self.height);
        let destination = &self.grids[self.source_index() ^ 1].cells;
        let cells = &destination[span.start * self.width..span.end * self.width];
        std::slice::from_raw_parts_mut(UnsafeCell::raw_get(cells.as_ptr()), cells.len())
    }

    /// Consume the buffers and return the grid in the destination role.
    pub fn into_destination(self) -> PixelGrid {
        let index = self.source_index() ^ 1;
        let [first, second] = self.grids;
        let chosen = if index == 0 { first } else { second };
        PixelGrid::from_pixels(self.width, self.height, chosen.into_pixels())
    }
}
