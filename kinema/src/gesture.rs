//! Pointer gestures that span many pointer-move events.
//!
//! A gesture keeps the shape as it was at pointer-down and produces a fresh delta against it on
//! every move. Nothing is written back until the caller commits on release.

use kurbo::{Point, Rect, Vec2};

use crate::{
    bbox::rotation_origin,
    bezop::rotate_about,
    model::{Attr, AttrDelta, Placement, Shape},
    transform::{drag_delta, rotation_shift, scale_delta, Handle, ScaleModifiers},
};

/// Rotation snaps to multiples of this many degrees unless told otherwise
pub const SNAP_DEGREES: f64 = 15.0;

/// What a rotation pivots around
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum PivotMode {
    /// The handle opposite the one grabbed
    #[default]
    OppositeCorner,
    /// The center of the rotated box
    Center,
}

/// Keys held during a rotation
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct RotateModifiers {
    pub center_pivot: bool,
    /// Don't snap
    pub free_angle: bool,
}

impl RotateModifiers {
    fn pivot_mode(&self) -> PivotMode {
        if self.center_pivot {
            PivotMode::Center
        } else {
            PivotMode::OppositeCorner
        }
    }
}

/// Degrees of the direction of `v`, positive turning +x toward +y
fn angle_of(v: Vec2) -> f64 {
    v.y.atan2(v.x).to_degrees()
}

pub fn snap_angle(degrees: f64) -> f64 {
    (degrees / SNAP_DEGREES).round() * SNAP_DEGREES
}

/// An interactive rotation by dragging a handle around a pivot.
///
/// Switching the pivot mid-gesture re-bases the gesture on the current preview and takes a new
/// reference angle, so the object doesn't jump when the modifier is pressed or released.
#[derive(Debug, Clone)]
pub struct RotateGesture {
    original: Shape,
    handle: Handle,
    mode: PivotMode,
    /// The shape rotation is measured from, the original until the pivot is switched
    base: Shape,
    base_bounds: Rect,
    pivot: Point,
    reference_angle: f64,
    preview: Shape,
    preview_shift: Vec2,
}

impl RotateGesture {
    /// Starts rotating `shape`, whose box is `bounds`, by grabbing `handle` at `pointer`
    pub fn new(
        shape: &Shape,
        bounds: Rect,
        handle: Handle,
        pointer: Point,
        modifiers: RotateModifiers,
    ) -> Self {
        let mode = modifiers.pivot_mode();
        let pivot = pivot_point(shape, bounds, handle, mode);
        Self {
            original: shape.clone(),
            handle,
            mode,
            base: shape.clone(),
            base_bounds: bounds,
            pivot,
            reference_angle: angle_of(pointer - pivot),
            preview: shape.clone(),
            preview_shift: Vec2::ZERO,
        }
    }

    pub fn mode(&self) -> PivotMode {
        self.mode
    }

    /// World position of the current pivot
    pub fn pivot(&self) -> Point {
        self.pivot
    }

    pub fn preview(&self) -> &Shape {
        &self.preview
    }

    /// Follows the pointer, returning the delta from the shape at pointer-down
    pub fn update(&mut self, pointer: Point, modifiers: RotateModifiers) -> AttrDelta {
        let mode = modifiers.pivot_mode();
        if mode != self.mode {
            self.switch_pivot(mode, pointer);
        }

        let turned = angle_of(pointer - self.pivot) - self.reference_angle;
        let mut rotation = self.base.rotation() + turned;
        if !modifiers.free_angle {
            rotation = snap_angle(rotation);
        }

        let (shift, rotation) = rotation_shift(&self.base, self.base_bounds, self.pivot, rotation);
        let delta = drag_delta(&self.base, shift.x, shift.y).with(Attr::Rotation, rotation);
        self.preview = self.base.apply(&delta);
        self.preview_shift = shift;
        self.original.diff(&self.preview)
    }

    fn switch_pivot(&mut self, mode: PivotMode, pointer: Point) {
        log::debug!("Rotation pivot {:?} -> {mode:?}", self.mode);
        self.base = self.preview.clone();
        // rotation leaves the local box alone, only the position shift moves it
        self.base_bounds = self.base_bounds + self.preview_shift;
        self.preview_shift = Vec2::ZERO;
        self.mode = mode;
        self.pivot = pivot_point(&self.base, self.base_bounds, self.handle, mode);
        self.reference_angle = angle_of(pointer - self.pivot);
    }

    /// What to write back on release
    pub fn commit(&self) -> AttrDelta {
        self.original.diff(&self.preview)
    }
}

fn pivot_point(shape: &Shape, bounds: Rect, handle: Handle, mode: PivotMode) -> Point {
    let local = match mode {
        PivotMode::Center => bounds.center(),
        PivotMode::OppositeCorner => handle.opposite().point(bounds),
    };
    rotate_about(local, rotation_origin(shape, bounds), shape.rotation())
}

/// An interactive resize by dragging a handle
#[derive(Debug, Clone)]
pub struct ScaleGesture {
    original: Shape,
    bounds: Rect,
    handle: Handle,
    start: Point,
    preview: Shape,
}

impl ScaleGesture {
    pub fn new(shape: &Shape, bounds: Rect, handle: Handle, pointer: Point) -> Self {
        Self {
            original: shape.clone(),
            bounds,
            handle,
            start: pointer,
            preview: shape.clone(),
        }
    }

    pub fn preview(&self) -> &Shape {
        &self.preview
    }

    /// Follows the pointer, returning the delta from the shape at pointer-down.
    /// Modifiers may change from one move to the next.
    pub fn update(&mut self, pointer: Point, modifiers: ScaleModifiers) -> AttrDelta {
        let delta = scale_delta(
            &self.original,
            self.bounds,
            self.handle,
            pointer - self.start,
            modifiers,
        );
        self.preview = self.original.apply(&delta);
        self.original.diff(&self.preview)
    }

    /// What to write back on release
    pub fn commit(&self) -> AttrDelta {
        self.original.diff(&self.preview)
    }
}
