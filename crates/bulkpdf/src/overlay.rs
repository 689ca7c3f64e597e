//! Placeholder rectangles shown over the preview, and mapping drags on them
//! back to variable placements

use crate::coords::{Bounds, Point, ViewportMapping};
use crate::{Alignment, DrawnVariable, Variable, VariableUpdate};
use serde::Serialize;

/// A rectangle in display pixels, `top` growing downwards
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ViewRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

/// The part of a placeholder being dragged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragHandle {
    Move,
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
}

impl DragHandle {
    /// `rect` after dragging this handle by `(dx, dy)` pixels from where
    /// the drag started
    pub fn apply(self, rect: ViewRect, dx: f64, dy: f64) -> ViewRect {
        let ViewRect {
            mut left,
            mut top,
            mut width,
            mut height,
        } = rect;

        match self {
            DragHandle::Move => {
                left += dx;
                top += dy;
            }
            DragHandle::N => {
                top += dy;
                height -= dy;
            }
            DragHandle::NE => {
                top += dy;
                width += dx;
                height -= dy;
            }
            DragHandle::E => width += dx,
            DragHandle::SE => {
                width += dx;
                height += dy;
            }
            DragHandle::S => height += dy,
            DragHandle::SW => {
                left += dx;
                width -= dx;
                height += dy;
            }
            DragHandle::W => {
                left += dx;
                width -= dx;
            }
            DragHandle::NW => {
                left += dx;
                top += dy;
                width -= dx;
                height -= dy;
            }
        }

        ViewRect {
            left,
            top,
            width,
            height,
        }
    }
}

/// Where a variable's placeholder sits on screen
///
/// The box is the variable's own `w`/`h` where set, the drawn box
/// otherwise. Bounds are not checked since a placeholder may hang off the
/// visible page while it is dragged.
pub fn overlay_rect(
    mapping: &ViewportMapping,
    variable: &Variable,
    drawn: &DrawnVariable,
) -> Option<ViewRect> {
    let w = variable.w.filter(|w| *w > 0.0).unwrap_or(drawn.w);
    let h = variable.h.filter(|h| *h > 0.0).unwrap_or(drawn.h);

    let a = mapping.to_viewport(Point::new(variable.x, variable.y), Bounds::Unchecked)?;
    let b = mapping.to_viewport(Point::new(variable.x + w, variable.y + h), Bounds::Unchecked)?;

    let width = b.x - a.x;
    let height = a.y - b.y;
    let left = match variable.alignment {
        Alignment::Left => a.x,
        Alignment::Center => a.x - width / 2.0,
        Alignment::Right => a.x - width,
    };

    Some(ViewRect {
        left,
        top: b.y,
        width,
        height,
    })
}

/// The placement a dropped placeholder stands for
///
/// Returns `None` when a corner of the rectangle falls outside the page.
pub fn placement_from_rect(
    mapping: &ViewportMapping,
    rect: ViewRect,
    alignment: Alignment,
) -> Option<VariableUpdate> {
    let bottom_left = mapping.to_document(Point::new(rect.left, rect.top + rect.height), Bounds::Checked)?;
    let top_right = mapping.to_document(Point::new(rect.left + rect.width, rect.top), Bounds::Checked)?;

    let w = top_right.x - bottom_left.x;
    let h = top_right.y - bottom_left.y;
    let x = match alignment {
        Alignment::Left => bottom_left.x,
        Alignment::Center => bottom_left.x + w / 2.0,
        Alignment::Right => bottom_left.x + w,
    };

    Some(VariableUpdate::Placement {
        x,
        y: bottom_left.y,
        w,
        h,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::Size;
    use pretty_assertions::assert_eq;

    /// Page and display of the same size: pixels map 1:1 with a flipped Y
    fn identity() -> ViewportMapping {
        ViewportMapping::new(Size::new(600.0, 800.0), Size::new(600.0, 800.0), 1.0)
    }

    fn rect(left: f64, top: f64, width: f64, height: f64) -> ViewRect {
        ViewRect {
            left,
            top,
            width,
            height,
        }
    }

    #[test]
    fn test_drag_handles() {
        let start = rect(10.0, 20.0, 100.0, 50.0);

        assert_eq!(DragHandle::Move.apply(start, 5.0, -5.0), rect(15.0, 15.0, 100.0, 50.0));
        assert_eq!(DragHandle::N.apply(start, 5.0, -5.0), rect(10.0, 15.0, 100.0, 55.0));
        assert_eq!(DragHandle::NE.apply(start, 5.0, -5.0), rect(10.0, 15.0, 105.0, 55.0));
        assert_eq!(DragHandle::E.apply(start, 5.0, -5.0), rect(10.0, 20.0, 105.0, 50.0));
        assert_eq!(DragHandle::SE.apply(start, 5.0, -5.0), rect(10.0, 20.0, 105.0, 45.0));
        assert_eq!(DragHandle::S.apply(start, 5.0, -5.0), rect(10.0, 20.0, 100.0, 45.0));
        assert_eq!(DragHandle::SW.apply(start, 5.0, -5.0), rect(15.0, 20.0, 95.0, 45.0));
        assert_eq!(DragHandle::W.apply(start, 5.0, -5.0), rect(15.0, 20.0, 95.0, 50.0));
        assert_eq!(DragHandle::NW.apply(start, 5.0, -5.0), rect(15.0, 15.0, 95.0, 55.0));
    }

    #[test]
    fn test_overlay_rect_uses_drawn_box() {
        let mut variable = Variable::new("k");
        variable.x = 100.0;
        variable.y = 700.0;
        let drawn = DrawnVariable {
            x: 100.0,
            y: 700.0,
            w: 80.0,
            h: 20.0,
        };

        let r = overlay_rect(&identity(), &variable, &drawn).unwrap();
        assert_eq!(r, rect(100.0, 80.0, 80.0, 20.0));

        variable.w = Some(200.0);
        variable.h = Some(40.0);
        variable.alignment = Alignment::Center;
        let r = overlay_rect(&identity(), &variable, &drawn).unwrap();
        assert_eq!(r, rect(0.0, 60.0, 200.0, 40.0));
    }

    #[test]
    fn test_overlay_rect_may_leave_page() {
        let mut variable = Variable::new("k");
        variable.x = 590.0;
        variable.y = 10.0;
        let drawn = DrawnVariable {
            x: 590.0,
            y: 10.0,
            w: 50.0,
            h: 20.0,
        };

        let r = overlay_rect(&identity(), &variable, &drawn).unwrap();
        assert_eq!(r.width, 50.0);
        assert!(r.left + r.width > 600.0);
    }

    #[test]
    fn test_placement_round_trip() {
        let mut variable = Variable::new("k");
        variable.x = 300.0;
        variable.y = 400.0;
        variable.w = Some(120.0);
        variable.h = Some(30.0);
        variable.alignment = Alignment::Right;
        let drawn = DrawnVariable {
            x: 180.0,
            y: 400.0,
            w: 120.0,
            h: 30.0,
        };

        let r = overlay_rect(&identity(), &variable, &drawn).unwrap();
        let moved = DragHandle::Move.apply(r, 10.0, -20.0);

        assert_eq!(
            placement_from_rect(&identity(), moved, Alignment::Right),
            Some(VariableUpdate::Placement {
                x: 310.0,
                y: 420.0,
                w: 120.0,
                h: 30.0
            })
        );
    }

    #[test]
    fn test_placement_outside_page_rejected() {
        let off_page = rect(550.0, 100.0, 100.0, 20.0);
        assert_eq!(placement_from_rect(&identity(), off_page, Alignment::Left), None);
    }
}
