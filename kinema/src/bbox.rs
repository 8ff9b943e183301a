//! Axis aligned boxes of objects in their local, pre-rotation space

use kurbo::{Point, Rect, Vec2};

use crate::{
    bezop::rotate_about,
    clip::{ClipDimensions, PLACEHOLDER_CLIP_BOX},
    model::{Object, Placement, Shape},
    path::path_bounds,
};

/// Box of `object`, `None` if it has no geometry
pub fn bounding_box<C>(object: &Object, clips: &C) -> Option<Rect>
where
    C: ClipDimensions + ?Sized,
{
    shape_bounds(&object.shape, clips)
}

pub fn shape_bounds<C>(shape: &Shape, clips: &C) -> Option<Rect>
where
    C: ClipDimensions + ?Sized,
{
    let bounds = match shape {
        Shape::Rect {
            x,
            y,
            width,
            height,
            ..
        } => Rect::from_origin_size((*x, *y), (*width, *height)),
        Shape::Circle { cx, cy, r, .. } => Rect::new(cx - r, cy - r, cx + r, cy + r),
        Shape::Ellipse { cx, cy, rx, ry, .. } => Rect::new(cx - rx, cy - ry, cx + rx, cy + ry),
        Shape::Line { x1, y1, x2, y2, .. } => Rect::from_points((*x1, *y1), (*x2, *y2)),
        Shape::Path { x, y, d, .. } => path_bounds(d)? + Vec2::new(*x, *y),
        Shape::Text { .. } => return None,
        Shape::Group {
            x,
            y,
            scale_x,
            scale_y,
            children,
            ..
        } => place(children_bounds(children, clips)?, *x, *y, *scale_x, *scale_y),
        Shape::ClipInstance {
            x,
            y,
            scale_x,
            scale_y,
            clip_id,
            ..
        } => {
            let content = clips.clip_box(clip_id).unwrap_or(PLACEHOLDER_CLIP_BOX);
            place(content, *x, *y, *scale_x, *scale_y)
        }
    };
    Some(bounds.abs())
}

/// Union of the rotated boxes of `children`, in their parent's unscaled space
pub fn children_bounds<C>(children: &[Object], clips: &C) -> Option<Rect>
where
    C: ClipDimensions + ?Sized,
{
    children
        .iter()
        .filter_map(|child| rotated_bounds(&child.shape, clips))
        .reduce(|acc, r| acc.union(r))
}

/// Scale about the local origin, then move to `(x, y)`
fn place(content: Rect, x: f64, y: f64, scale_x: f64, scale_y: f64) -> Rect {
    Rect::new(
        x + content.x0 * scale_x,
        y + content.y0 * scale_y,
        x + content.x1 * scale_x,
        y + content.y1 * scale_y,
    )
}

/// The point `shape` rotates around given its box: `(x, y)` for groups and clip-instances, the
/// box center for everything else
pub fn rotation_origin(shape: &Shape, bounds: Rect) -> Point {
    if shape.rotates_around_position() {
        if let Some(position) = shape.position() {
            return position;
        }
    }
    bounds.center()
}

/// Corners of `bounds` rotated by `degrees` around `origin`.
///
/// Clockwise from the min corner in y-down space.
pub fn rotated_corners(bounds: Rect, degrees: f64, origin: Point) -> [Point; 4] {
    [
        Point::new(bounds.x0, bounds.y0),
        Point::new(bounds.x1, bounds.y0),
        Point::new(bounds.x1, bounds.y1),
        Point::new(bounds.x0, bounds.y1),
    ]
    .map(|p| rotate_about(p, origin, degrees))
}

/// Axis aligned box of `shape` after its own rotation
pub fn rotated_bounds<C>(shape: &Shape, clips: &C) -> Option<Rect>
where
    C: ClipDimensions + ?Sized,
{
    let bounds = shape_bounds(shape, clips)?;
    let corners = rotated_corners(bounds, shape.rotation(), rotation_origin(shape, bounds));
    Some(
        corners[1..]
            .iter()
            .fold(Rect::from_points(corners[0], corners[0]), |acc, p| {
                acc.union_pt(*p)
            }),
    )
}
