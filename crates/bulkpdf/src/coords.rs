//! Mapping between viewport pixels and PDF page space
//!
//! The page is rasterised into a viewport (e.g. a canvas) whose intrinsic
//! size is the page size times a zoom `scale`. The viewport is shown inside
//! a display area of a different aspect ratio, so it is letterboxed: scaled
//! to fit and centred along the axis with slack.
//!
//! Viewport Y grows downwards, PDF Y grows upwards.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    fn is_usable(&self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Whether points outside the drawn region are rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Bounds {
    #[default]
    Checked,
    /// Needed for overlays that may extend past the visible page while dragging
    Unchecked,
}

/// Region of the display actually covered by the viewport
#[derive(Debug, Clone, Copy, PartialEq)]
struct Letterbox {
    drawn: Size,
    offset: Point,
}

impl Letterbox {
    fn fit(viewport: Size, display: Size) -> Option<Self> {
        if !viewport.is_usable() || !display.is_usable() {
            return None;
        }

        let viewport_aspect = viewport.width / viewport.height;
        let display_aspect = display.width / display.height;

        let letterbox = if viewport_aspect > display_aspect {
            let drawn_height = display.width / viewport_aspect;
            Letterbox {
                drawn: Size::new(display.width, drawn_height),
                offset: Point::new(0.0, (display.height - drawn_height) / 2.0),
            }
        } else {
            let drawn_width = display.height * viewport_aspect;
            Letterbox {
                drawn: Size::new(drawn_width, display.height),
                offset: Point::new((display.width - drawn_width) / 2.0, 0.0),
            }
        };
        Some(letterbox)
    }

    fn contains(&self, x: f64, y: f64) -> bool {
        (0.0..=self.drawn.width).contains(&x) && (0.0..=self.drawn.height).contains(&y)
    }
}

/// A viewport shown in a display area at a given zoom
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportMapping {
    /// Intrinsic pixel size of the rendered page
    pub viewport: Size,
    /// Size of the area the viewport is laid out in
    pub display: Size,
    /// Zoom applied when rendering the page into the viewport
    pub scale: f64,
}

impl ViewportMapping {
    pub fn new(viewport: Size, display: Size, scale: f64) -> Self {
        Self {
            viewport,
            display,
            scale,
        }
    }

    /// Display-area pixel position to PDF page coordinates
    pub fn to_document(&self, point: Point, bounds: Bounds) -> Option<Point> {
        to_document_space(self.viewport, self.display, point, self.scale, bounds)
    }

    /// PDF page coordinates to display-area pixel position
    pub fn to_viewport(&self, point: Point, bounds: Bounds) -> Option<Point> {
        to_viewport_space(self.viewport, self.display, point, self.scale, bounds)
    }
}

/// Map a display-area pixel position to PDF page coordinates
///
/// Returns `None` when the sizes or scale are degenerate, or when the
/// point falls in the letterbox padding and `bounds` is checked.
pub fn to_document_space(
    viewport: Size,
    display: Size,
    point: Point,
    scale: f64,
    bounds: Bounds,
) -> Option<Point> {
    if scale.is_nan() || scale <= 0.0 {
        return None;
    }
    let letterbox = Letterbox::fit(viewport, display)?;

    let x = point.x - letterbox.offset.x;
    let y = point.y - letterbox.offset.y;
    if bounds == Bounds::Checked && !letterbox.contains(x, y) {
        return None;
    }

    let scale_x = viewport.width / letterbox.drawn.width / scale;
    let scale_y = viewport.height / letterbox.drawn.height / scale;

    Some(Point::new(x * scale_x, (letterbox.drawn.height - y) * scale_y))
}

/// Map PDF page coordinates to a display-area pixel position
///
/// Inverse of [`to_document_space`].
pub fn to_viewport_space(
    viewport: Size,
    display: Size,
    point: Point,
    scale: f64,
    bounds: Bounds,
) -> Option<Point> {
    if scale.is_nan() || scale <= 0.0 {
        return None;
    }
    let letterbox = Letterbox::fit(viewport, display)?;

    let x = point.x * scale * letterbox.drawn.width / viewport.width;
    let y = letterbox.drawn.height - point.y * scale * letterbox.drawn.height / viewport.height;
    if bounds == Bounds::Checked && !letterbox.contains(x, y) {
        return None;
    }

    Some(Point::new(x + letterbox.offset.x, y + letterbox.offset.y))
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn assert_close(a: Point, b: Point) {
        assert!(
            (a.x - b.x).abs() < EPSILON && (a.y - b.y).abs() < EPSILON,
            "{a:?} != {b:?}"
        );
    }

    /// A US Letter page rendered at `scale` into displays of three shapes:
    /// matching, narrower than the viewport and wider than the viewport
    fn layouts(scale: f64) -> Vec<(Size, Size)> {
        let viewport = Size::new(612.0 * scale, 792.0 * scale);
        vec![
            (viewport, Size::new(306.0, 396.0)),
            (viewport, Size::new(400.0, 900.0)),
            (viewport, Size::new(1200.0, 500.0)),
        ]
    }

    #[test]
    fn test_round_trip_inside_drawn_region() {
        for scale in [0.5, 1.0, 1.5, 2.0] {
            for (viewport, display) in layouts(scale) {
                let letterbox = Letterbox::fit(viewport, display).unwrap();
                for (fx, fy) in [(0.1, 0.1), (0.5, 0.5), (0.9, 0.25), (0.33, 0.99)] {
                    let p = Point::new(
                        letterbox.offset.x + letterbox.drawn.width * fx,
                        letterbox.offset.y + letterbox.drawn.height * fy,
                    );
                    let doc = to_document_space(viewport, display, p, scale, Bounds::Checked)
                        .expect("inside drawn region");
                    let back = to_viewport_space(viewport, display, doc, scale, Bounds::Checked)
                        .expect("maps back inside");
                    assert_close(back, p);
                }
            }
        }
    }

    #[test]
    fn test_corners_and_y_flip() {
        // 100x50 page at scale 2 in a display of the same shape
        let viewport = Size::new(200.0, 100.0);
        let display = Size::new(400.0, 200.0);

        let bottom_left =
            to_document_space(viewport, display, Point::new(0.0, 200.0), 2.0, Bounds::Checked);
        assert_close(bottom_left.unwrap(), Point::new(0.0, 0.0));

        let top_right =
            to_document_space(viewport, display, Point::new(400.0, 0.0), 2.0, Bounds::Checked);
        assert_close(top_right.unwrap(), Point::new(100.0, 50.0));
    }

    #[test]
    fn test_pillarbox_offsets() {
        // Square viewport in a wide display: 100px of padding on each side
        let viewport = Size::new(100.0, 100.0);
        let display = Size::new(400.0, 200.0);
        let letterbox = Letterbox::fit(viewport, display).unwrap();

        assert_eq!(letterbox.drawn, Size::new(200.0, 200.0));
        assert_eq!(letterbox.offset, Point::new(100.0, 0.0));

        let doc = to_document_space(viewport, display, Point::new(200.0, 100.0), 1.0, Bounds::Checked);
        assert_close(doc.unwrap(), Point::new(50.0, 50.0));
    }

    #[test]
    fn test_letterbox_offsets() {
        // Wide viewport in a square display: padding above and below
        let viewport = Size::new(200.0, 100.0);
        let display = Size::new(100.0, 100.0);
        let letterbox = Letterbox::fit(viewport, display).unwrap();

        assert_eq!(letterbox.drawn, Size::new(100.0, 50.0));
        assert_eq!(letterbox.offset, Point::new(0.0, 25.0));
    }

    #[test]
    fn test_bounds_rejection() {
        let viewport = Size::new(100.0, 100.0);
        let display = Size::new(400.0, 200.0);

        // In the left padding
        let padding = Point::new(50.0, 100.0);
        assert_eq!(
            to_document_space(viewport, display, padding, 1.0, Bounds::Checked),
            None
        );
        let unchecked = to_document_space(viewport, display, padding, 1.0, Bounds::Unchecked)
            .expect("unchecked mode always maps");
        assert_close(unchecked, Point::new(-25.0, 50.0));

        // Past the right and top edges of the page
        let beyond = Point::new(150.0, 150.0);
        assert_eq!(
            to_viewport_space(viewport, display, beyond, 1.0, Bounds::Checked),
            None
        );
        let mapped = to_viewport_space(viewport, display, beyond, 1.0, Bounds::Unchecked).unwrap();
        assert_close(mapped, Point::new(400.0, -100.0));
    }

    #[test]
    fn test_degenerate_inputs() {
        let ok = Size::new(100.0, 100.0);
        let zero = Size::new(0.0, 100.0);
        let p = Point::new(10.0, 10.0);

        assert_eq!(to_document_space(zero, ok, p, 1.0, Bounds::Unchecked), None);
        assert_eq!(to_document_space(ok, zero, p, 1.0, Bounds::Unchecked), None);
        assert_eq!(to_document_space(ok, ok, p, 0.0, Bounds::Unchecked), None);
        assert_eq!(to_viewport_space(ok, ok, p, f64::NAN, Bounds::Unchecked), None);
    }

    #[test]
    fn test_mapping_matches_free_functions() {
        let mapping = ViewportMapping::new(Size::new(918.0, 1188.0), Size::new(500.0, 700.0), 1.5);
        let p = Point::new(250.0, 300.0);

        assert_eq!(
            mapping.to_document(p, Bounds::Checked),
            to_document_space(mapping.viewport, mapping.display, p, 1.5, Bounds::Checked)
        );
    }
}
