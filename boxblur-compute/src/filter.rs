use boxblur_core::{blur_rows, GridView, Pixel, RowSpan};

/// Per-row image operation run by every worker each round.
pub trait RowFilter: Sync {
    /// Compute the rows of `span` from `source` into `out`.
    ///
    /// `out` holds exactly `span.len() * source.width()` pixels. Implementations read
    /// only from `source`.
    fn filter_rows(&self, source: GridView<'_>, span: RowSpan, out: &mut [Pixel]);
}

/// Toroidal 3x3 box blur.
#[derive(Clone, Copy, Debug, Default)]
pub struct BoxBlur;

impl RowFilter for BoxBlur {
    fn filter_rows(&self, source: GridView<'_>, span: RowSpan, out: &mut [Pixel]) {
        blur_rows(source, span, out);
    }
}
