//! Single-line text layout: alignment and fit-to-box sizing

use crate::coords::Point;
use crate::{DrawnVariable, Variable};
use pdf_core::{align_offset, FontMetrics, PageSize};
use thiserror::Error;

/// Decrement used when shrinking text to fit its box
///
/// Tunable; kept at 0.2pt so generated files match earlier output.
pub const FIT_STEP: f64 = 0.2;

/// Why a variable was left out of a render
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SkipReason {
    #[error("anchor ({x}, {y}) is outside the {page_width}x{page_height} page")]
    OutOfBounds {
        x: f64,
        y: f64,
        page_width: f64,
        page_height: f64,
    },

    #[error("font size {0} is not drawable")]
    InvalidSize(f64),
}

/// Where and how large a line of text is drawn
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextLayout {
    /// Left edge of the text after alignment
    pub draw_x: f64,
    /// Baseline
    pub draw_y: f64,
    /// Font size actually used
    pub size: f64,
    /// Box occupied by the text
    pub drawn: DrawnVariable,
}

/// Grid steps tried past the computed size before giving up
const MAX_FIT_CORRECTIONS: usize = 8;

/// Largest size, in [`FIT_STEP`] decrements from the box height, at which
/// `text` is no wider than `width`
///
/// Widths scale linearly with size, so the size is solved for directly and
/// snapped down to the step grid; a few extra steps absorb rounding. Text
/// that never fits keeps the size derived from the height rather than
/// shrinking to nothing.
pub fn fit_size<M: FontMetrics + ?Sized>(metrics: &M, text: &str, width: f64, height: f64) -> f64 {
    let initial = metrics.size_at_height(height);
    if !(initial.is_finite() && initial > 0.0) {
        return initial;
    }

    let natural = metrics.width_of_text_at_size(text, initial);
    if natural <= width {
        return initial;
    }

    let target = initial * width / natural;
    let steps = ((initial - target) / FIT_STEP).ceil();
    let mut size = initial - steps * FIT_STEP;
    // At huge sizes the step is below float resolution
    if !(size > 0.0 && size <= target + FIT_STEP) {
        size = (target / FIT_STEP).floor() * FIT_STEP;
    }

    let fits = |size: f64| metrics.width_of_text_at_size(text, size) <= width;
    for _ in 0..MAX_FIT_CORRECTIONS {
        if size <= 0.0 || fits(size) {
            break;
        }
        size -= FIT_STEP;
    }

    if size > 0.0 && fits(size) {
        size
    } else {
        initial
    }
}

/// Lay out one line of text anchored at `anchor`
///
/// With a fit box the size comes from [`fit_size`]; otherwise `size` is
/// used as given.
pub fn layout_text<M: FontMetrics + ?Sized>(
    metrics: &M,
    text: &str,
    anchor: Point,
    size: f64,
    fit_box: Option<(f64, f64)>,
    alignment: crate::Alignment,
) -> TextLayout {
    let size = match fit_box {
        Some((width, height)) => fit_size(metrics, text, width, height),
        None => size,
    };

    let text_width = metrics.width_of_text_at_size(text, size);
    let draw_x = anchor.x + align_offset(text_width, alignment.into());

    TextLayout {
        draw_x,
        draw_y: anchor.y,
        size,
        drawn: DrawnVariable {
            x: draw_x,
            y: anchor.y,
            w: text_width,
            h: metrics.height_at_size(size),
        },
    }
}

/// Lay out `text` for a variable, or explain why it cannot be drawn
pub fn layout_variable<M: FontMetrics + ?Sized>(
    metrics: &M,
    variable: &Variable,
    text: &str,
    page: PageSize,
) -> Result<TextLayout, SkipReason> {
    check_bounds(Point::new(variable.x, variable.y), page)?;

    let layout = layout_text(
        metrics,
        text,
        Point::new(variable.x, variable.y),
        variable.size,
        variable.fit_box(),
        variable.alignment,
    );

    if !(layout.size.is_finite() && layout.size > 0.0) {
        return Err(SkipReason::InvalidSize(layout.size));
    }

    Ok(layout)
}

/// Anchors must lie on the page, edges included
pub fn check_bounds(anchor: Point, page: PageSize) -> Result<(), SkipReason> {
    let inside = (0.0..=page.width).contains(&anchor.x) && (0.0..=page.height).contains(&anchor.y);

    if inside {
        Ok(())
    } else {
        Err(SkipReason::OutOfBounds {
            x: anchor.x,
            y: anchor.y,
            page_width: page.width,
            page_height: page.height,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Alignment;
    use pretty_assertions::assert_eq;

    /// Every character is half an em wide; line height equals the size
    struct HalfEm;

    impl FontMetrics for HalfEm {
        fn width_of_text_at_size(&self, text: &str, size: f64) -> f64 {
            text.chars().count() as f64 * size * 0.5
        }

        fn height_at_size(&self, size: f64) -> f64 {
            size
        }

        fn size_at_height(&self, height: f64) -> f64 {
            height
        }
    }

    /// Text that is always 100pt wide, whatever the size
    struct Unshrinkable;

    impl FontMetrics for Unshrinkable {
        fn width_of_text_at_size(&self, _text: &str, _size: f64) -> f64 {
            100.0
        }

        fn height_at_size(&self, size: f64) -> f64 {
            size * 1.2
        }

        fn size_at_height(&self, height: f64) -> f64 {
            height / 1.2
        }
    }

    const PAGE: PageSize = PageSize {
        width: 595.0,
        height: 842.0,
    };

    #[test]
    fn test_alignment_offsets() {
        // "abcdefgh" at 10pt is 40pt wide
        let anchor = Point::new(100.0, 100.0);
        let draw_x = |alignment| layout_text(&HalfEm, "abcdefgh", anchor, 10.0, None, alignment).draw_x;

        assert_eq!(draw_x(Alignment::Left), 100.0);
        assert_eq!(draw_x(Alignment::Center), 80.0);
        assert_eq!(draw_x(Alignment::Right), 60.0);
    }

    #[test]
    fn test_drawn_box() {
        let layout = layout_text(
            &HalfEm,
            "abcd",
            Point::new(50.0, 70.0),
            12.0,
            None,
            Alignment::Right,
        );

        assert_eq!(
            layout.drawn,
            DrawnVariable {
                x: 26.0,
                y: 70.0,
                w: 24.0,
                h: 12.0
            }
        );
        assert_eq!(layout.draw_y, 70.0);
        assert_eq!(layout.size, 12.0);
    }

    #[test]
    fn test_fit_shrinks_to_box() {
        let initial = HalfEm.size_at_height(20.0);
        assert!(HalfEm.width_of_text_at_size("abcdefgh", initial) > 30.0);

        let size = fit_size(&HalfEm, "abcdefgh", 30.0, 20.0);

        assert!(size < initial);
        assert!(size > 0.0);
        assert!(HalfEm.width_of_text_at_size("abcdefgh", size) <= 30.0);
        // Within one step of the widest fitting size (7.5pt)
        assert!(size > 7.5 - FIT_STEP);
    }

    #[test]
    fn test_fit_huge_box_height() {
        for height in [1e6, 1e17] {
            let size = fit_size(&HalfEm, "abcd", 10.0, height);
            assert!(size > 5.0 - 2.0 * FIT_STEP && size <= 5.0, "{height}: {size}");
            assert!(HalfEm.width_of_text_at_size("abcd", size) <= 10.0);

            let font = pdf_core::StandardFont::Helvetica;
            let size = fit_size(&font, "John Doe", 10.0, height);
            assert!(size > 0.0, "{height}: {size}");
            assert!(font.width_of_text_at_size("John Doe", size) <= 10.0);
        }
    }

    #[test]
    fn test_fit_keeps_size_when_text_fits() {
        assert_eq!(fit_size(&HalfEm, "ab", 100.0, 20.0), 20.0);
    }

    #[test]
    fn test_unfittable_text_keeps_positive_size() {
        let size = fit_size(&Unshrinkable, "anything", 30.0, 24.0);
        assert_eq!(size, Unshrinkable.size_at_height(24.0));
        assert!(size > 0.0);
    }

    #[test]
    fn test_fit_box_overrides_size() {
        let layout = layout_text(
            &HalfEm,
            "ab",
            Point::new(10.0, 10.0),
            72.0,
            Some((100.0, 18.0)),
            Alignment::Left,
        );
        assert_eq!(layout.size, 18.0);
    }

    #[test]
    fn test_layout_variable_out_of_bounds() {
        let mut variable = Variable::new("k");
        variable.x = 600.0;
        variable.y = 100.0;

        let result = layout_variable(&HalfEm, &variable, "text", PAGE);
        assert_eq!(
            result,
            Err(SkipReason::OutOfBounds {
                x: 600.0,
                y: 100.0,
                page_width: 595.0,
                page_height: 842.0
            })
        );

        variable.x = 100.0;
        variable.y = -1.0;
        assert!(layout_variable(&HalfEm, &variable, "text", PAGE).is_err());
    }

    #[test]
    fn test_layout_variable_on_page_edge() {
        let mut variable = Variable::new("k");
        variable.x = 595.0;
        variable.y = 842.0;
        variable.alignment = Alignment::Right;

        let layout = layout_variable(&HalfEm, &variable, "ab", PAGE).unwrap();
        assert_eq!(layout.draw_x, 595.0 - 24.0);
    }

    #[test]
    fn test_layout_variable_invalid_size() {
        let mut variable = Variable::new("k");
        variable.x = 10.0;
        variable.y = 10.0;
        variable.size = 0.0;

        assert_eq!(
            layout_variable(&HalfEm, &variable, "ab", PAGE),
            Err(SkipReason::InvalidSize(0.0))
        );
    }
}
