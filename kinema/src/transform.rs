//! Drag, rotate and scale of a single object.
//!
//! Every operation returns an [`AttrDelta`] holding the new values of the attributes it changes;
//! the shape passed in is never modified. Callers apply the delta for a preview and diff the
//! preview against the original on release.

use kurbo::{Affine, Point, Rect, Vec2};

use crate::{
    bbox::rotation_origin,
    bezop::{rect_to_rect, rotate_about, rotate_vec},
    model::{Attr, AttrDelta, Placement, Shape},
    path::{normalize_path, segments_bounds, to_path_string},
};

/// Sizes never shrink below this
pub const MIN_SIZE: f64 = 1.0;

/// A selection handle: four corners and four edge midpoints
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Handle {
    TopLeft,
    Top,
    TopRight,
    Right,
    BottomRight,
    Bottom,
    BottomLeft,
    Left,
}

impl Handle {
    pub const ALL: [Handle; 8] = [
        Handle::TopLeft,
        Handle::Top,
        Handle::TopRight,
        Handle::Right,
        Handle::BottomRight,
        Handle::Bottom,
        Handle::BottomLeft,
        Handle::Left,
    ];

    /// Which way each axis grows when this handle moves outward: -1, 0 or 1 in y-down space
    pub fn direction(&self) -> (f64, f64) {
        match self {
            Handle::TopLeft => (-1.0, -1.0),
            Handle::Top => (0.0, -1.0),
            Handle::TopRight => (1.0, -1.0),
            Handle::Right => (1.0, 0.0),
            Handle::BottomRight => (1.0, 1.0),
            Handle::Bottom => (0.0, 1.0),
            Handle::BottomLeft => (-1.0, 1.0),
            Handle::Left => (-1.0, 0.0),
        }
    }

    pub fn opposite(&self) -> Handle {
        match self {
            Handle::TopLeft => Handle::BottomRight,
            Handle::Top => Handle::Bottom,
            Handle::TopRight => Handle::BottomLeft,
            Handle::Right => Handle::Left,
            Handle::BottomRight => Handle::TopLeft,
            Handle::Bottom => Handle::Top,
            Handle::BottomLeft => Handle::TopRight,
            Handle::Left => Handle::Right,
        }
    }

    pub fn is_corner(&self) -> bool {
        let (x, y) = self.direction();
        x != 0.0 && y != 0.0
    }

    /// Where the handle sits as a fraction of the box, (0, 0) being the min corner
    pub fn fraction(&self) -> Vec2 {
        let (x, y) = self.direction();
        Vec2::new(0.5 + x / 2.0, 0.5 + y / 2.0)
    }

    /// Where the handle sits on `bounds`, before rotation
    pub fn point(&self, bounds: Rect) -> Point {
        let f = self.fraction();
        Point::new(
            bounds.x0 + f.x * bounds.width(),
            bounds.y0 + f.y * bounds.height(),
        )
    }
}

/// Moves the position fields of `shape` by `(dx, dy)`
pub fn drag_delta(shape: &Shape, dx: f64, dy: f64) -> AttrDelta {
    match shape {
        Shape::Rect { x, y, .. }
        | Shape::Path { x, y, .. }
        | Shape::Text { x, y, .. }
        | Shape::Group { x, y, .. }
        | Shape::ClipInstance { x, y, .. } => AttrDelta::new()
            .with(Attr::X, x + dx)
            .with(Attr::Y, y + dy),
        Shape::Circle { cx, cy, .. } | Shape::Ellipse { cx, cy, .. } => AttrDelta::new()
            .with(Attr::Cx, cx + dx)
            .with(Attr::Cy, cy + dy),
        Shape::Line { x1, y1, x2, y2, .. } => AttrDelta::new()
            .with(Attr::X1, x1 + dx)
            .with(Attr::Y1, y1 + dy)
            .with(Attr::X2, x2 + dx)
            .with(Attr::Y2, y2 + dy),
    }
}

/// `degrees` folded into [-180, 180]
pub fn shortest_turn(degrees: f64) -> f64 {
    let turn = degrees.rem_euclid(360.0);
    if turn > 180.0 {
        turn - 360.0
    } else {
        turn
    }
}

/// Position shift and final rotation that turn `shape` to `new_rotation` around `pivot`.
///
/// The rotation taken is the shortest one from the current angle.
pub fn rotation_shift(shape: &Shape, bounds: Rect, pivot: Point, new_rotation: f64) -> (Vec2, f64) {
    let old = shape.rotation();
    let new = old + shortest_turn(new_rotation - old);
    let origin = rotation_origin(shape, bounds);

    // where the pivot sits on the unrotated object, then where that spot ends up
    let local = rotate_about(pivot, origin, -old);
    let moved = rotate_about(local, origin, new);
    (pivot - moved, new)
}

/// Rotates `shape` to `new_rotation` degrees keeping the world point `pivot` fixed
pub fn rotate_delta(shape: &Shape, bounds: Rect, pivot: Point, new_rotation: f64) -> AttrDelta {
    let (shift, rotation) = rotation_shift(shape, bounds, pivot, new_rotation);
    drag_delta(shape, shift.x, shift.y).with(Attr::Rotation, rotation)
}

/// How a scale drag is constrained
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct ScaleModifiers {
    /// Grow both sides around the center instead of pinning the opposite side
    pub symmetric: bool,
    /// Keep the aspect ratio
    pub uniform: bool,
}

/// Resizes `shape` by dragging `handle` by `delta`, in world space.
///
/// The opposite side or corner stays fixed in world space, or the center when symmetric.
/// A degenerate `bounds` makes this a no-op.
pub fn scale_delta(
    shape: &Shape,
    bounds: Rect,
    handle: Handle,
    delta: Vec2,
    modifiers: ScaleModifiers,
) -> AttrDelta {
    let (w, h) = (bounds.width(), bounds.height());
    if !(w > 0.0 && h > 0.0 && w.is_finite() && h.is_finite()) {
        log::debug!("Not scaling a {} with degenerate box {bounds:?}", shape.kind());
        return AttrDelta::new();
    }
    if matches!(shape, Shape::Text { .. }) {
        log::debug!("Text is not scalable");
        return AttrDelta::new();
    }

    let rotation = shape.rotation();
    let local = rotate_vec(delta, -rotation);
    let (dir_x, dir_y) = handle.direction();
    let growth = if modifiers.symmetric { 2.0 } else { 1.0 };
    let mut fx = (w + local.x * dir_x * growth) / w;
    let mut fy = (h + local.y * dir_y * growth) / h;
    if modifiers.uniform {
        let f = if dir_x == 0.0 {
            fy
        } else if dir_y == 0.0 || (fx - 1.0).abs() >= (fy - 1.0).abs() {
            fx
        } else {
            fy
        };
        // Clamp before applying so the aspect ratio survives hitting the minimum size
        let f = f.max((MIN_SIZE / w).max(MIN_SIZE / h));
        fx = f;
        fy = f;
    }
    let size = Vec2::new((w * fx).max(MIN_SIZE), (h * fy).max(MIN_SIZE));

    let anchor = if modifiers.symmetric {
        Vec2::new(0.5, 0.5)
    } else {
        handle.opposite().fraction()
    };
    let origin = rotation_origin(shape, bounds);
    let anchor_world = rotate_about(
        Point::new(bounds.x0 + anchor.x * w, bounds.y0 + anchor.y * h),
        origin,
        rotation,
    );

    // Offset of the rotation origin from the min corner of the new box
    let new_scale = Vec2::new(
        shape.scale().x * size.x / w,
        shape.scale().y * size.y / h,
    );
    let origin_offset = match shape.position() {
        Some(position) if shape.rotates_around_position() => {
            let scale = shape.scale();
            Vec2::new(
                -new_scale.x * (bounds.x0 - position.x) / scale.x,
                -new_scale.y * (bounds.y0 - position.y) / scale.y,
            )
        }
        _ => size / 2.0,
    };
    let anchor_offset = Vec2::new(anchor.x * size.x, anchor.y * size.y);
    let min = anchor_world
        - origin_offset
        - rotate_vec(anchor_offset - origin_offset, rotation);
    let new_bounds = Rect::from_origin_size(min, size.to_size());

    fit_to_bounds(shape, bounds, new_bounds, new_scale)
}

/// Attribute values that make `shape`, whose box is `bounds`, occupy `new_bounds` instead
fn fit_to_bounds(shape: &Shape, bounds: Rect, new_bounds: Rect, new_scale: Vec2) -> AttrDelta {
    let center = new_bounds.center();
    match shape {
        Shape::Rect { .. } => AttrDelta::new()
            .with(Attr::X, new_bounds.x0)
            .with(Attr::Y, new_bounds.y0)
            .with(Attr::Width, new_bounds.width())
            .with(Attr::Height, new_bounds.height()),
        Shape::Circle { .. } => AttrDelta::new()
            .with(Attr::Cx, center.x)
            .with(Attr::Cy, center.y)
            .with(Attr::R, new_bounds.width().max(new_bounds.height()) / 2.0),
        Shape::Ellipse { .. } => AttrDelta::new()
            .with(Attr::Cx, center.x)
            .with(Attr::Cy, center.y)
            .with(Attr::Rx, new_bounds.width() / 2.0)
            .with(Attr::Ry, new_bounds.height() / 2.0),
        Shape::Line { x1, y1, x2, y2, .. } => {
            let transform = rect_to_rect(bounds, new_bounds);
            let p1 = transform * Point::new(*x1, *y1);
            let p2 = transform * Point::new(*x2, *y2);
            AttrDelta::new()
                .with(Attr::X1, p1.x)
                .with(Attr::Y1, p1.y)
                .with(Attr::X2, p2.x)
                .with(Attr::Y2, p2.y)
        }
        Shape::Path { d, .. } => {
            let segments = normalize_path(d);
            let Some(intrinsic) = segments_bounds(&segments) else {
                return AttrDelta::new();
            };
            let pivot = intrinsic.center().to_vec2();
            let transform = Affine::translate(-pivot)
                .then_scale_non_uniform(
                    new_bounds.width() / bounds.width(),
                    new_bounds.height() / bounds.height(),
                )
                .then_translate(pivot);
            let scaled: Vec<_> = segments.iter().map(|c| transform * *c).collect();
            let position = center - pivot;
            AttrDelta::new()
                .with(Attr::X, position.x)
                .with(Attr::Y, position.y)
                .with(Attr::D, to_path_string(&scaled))
        }
        Shape::Group { .. } | Shape::ClipInstance { .. } => {
            let scale = shape.scale();
            let position = shape.position().unwrap_or_default();
            let x = new_bounds.x0 - new_scale.x * (bounds.x0 - position.x) / scale.x;
            let y = new_bounds.y0 - new_scale.y * (bounds.y0 - position.y) / scale.y;
            AttrDelta::new()
                .with(Attr::X, x)
                .with(Attr::Y, y)
                .with(Attr::ScaleX, new_scale.x)
                .with(Attr::ScaleY, new_scale.y)
        }
        Shape::Text { .. } => AttrDelta::new(),
    }
}
