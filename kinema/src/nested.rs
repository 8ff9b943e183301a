//! Editing inside groups and clip-instances
//!
//! Each container entered contributes `translate(x, y) · rotate(rotation) · scale(sx, sy)`. The
//! product, outermost first, maps the innermost container's local space to the canvas.

use kurbo::{Affine, Point, Vec2};

use crate::{
    clip::{ClipLibrary, DEFAULT_MAX_DEPTH},
    model::{Object, ObjectId, Placement, Shape},
};

/// Matrices with a determinant smaller than this are treated as singular
pub const SINGULAR_EPSILON: f64 = 1e-10;

/// Placement of one container
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ContainerFrame {
    pub position: Point,
    /// Degrees
    pub rotation: f64,
    pub scale: Vec2,
}

impl ContainerFrame {
    /// The frame of a group or clip-instance; `None` for anything that can't be entered
    pub fn from_shape(shape: &Shape) -> Option<Self> {
        if !shape.rotates_around_position() {
            return None;
        }
        Some(Self {
            position: shape.position()?,
            rotation: shape.rotation(),
            scale: shape.scale(),
        })
    }

    /// Local to parent
    pub fn affine(&self) -> Affine {
        Affine::translate(self.position.to_vec2())
            * Affine::rotate(self.rotation.to_radians())
            * Affine::scale_non_uniform(self.scale.x, self.scale.y)
    }
}

/// Local to world for a chain of containers listed outermost first
pub fn compose_affine(chain: &[ContainerFrame]) -> Affine {
    chain
        .iter()
        .fold(Affine::IDENTITY, |acc, frame| acc * frame.affine())
}

/// `None` when `affine` is too close to singular to invert
pub fn invert_affine(affine: Affine) -> Option<Affine> {
    if affine.determinant().abs() < SINGULAR_EPSILON {
        return None;
    }
    Some(affine.inverse())
}

/// Frames of the containers named by `path`, walking down from `objects` as shown at `frame`.
///
/// Groups are entered through their children. A clip-instance is entered through its clip's
/// content at the instance's local frame, so a path may run through any number of nested clips.
/// `None` if the path doesn't lead to a container.
pub fn container_chain(
    objects: &[Object],
    path: &[ObjectId],
    clips: &ClipLibrary,
    frame: u32,
) -> Option<Vec<ContainerFrame>> {
    let mut chain = Vec::with_capacity(path.len());
    descend(objects, path, clips, frame, &mut chain)?;
    Some(chain)
}

fn descend(
    level: &[Object],
    path: &[ObjectId],
    clips: &ClipLibrary,
    frame: u32,
    chain: &mut Vec<ContainerFrame>,
) -> Option<()> {
    let Some((id, rest)) = path.split_first() else {
        return Some(());
    };
    let obj = level.iter().find(|o| &o.id == id)?;
    chain.push(ContainerFrame::from_shape(&obj.shape)?);
    if rest.is_empty() {
        return Some(());
    }
    match &obj.shape {
        Shape::ClipInstance {
            clip_id, set_frame, ..
        } => {
            let local = clips.get(clip_id)?.local_frame(*set_frame, frame);
            // nested instances come back as groups, so the rest of the walk needs no library
            let content = clips
                .resolve_clip(clip_id, local, DEFAULT_MAX_DEPTH)
                .map_err(|e| log::debug!("Can't enter clip-instance '{id}': {e}"))
                .ok()?;
            descend(&content, rest, clips, local, chain)
        }
        shape => descend(shape.children(), rest, clips, frame, chain),
    }
}

/// Converts between canvas space and the local space of the innermost entered container
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct EditContext {
    world_from_local: Affine,
    local_from_world: Option<Affine>,
}

impl Default for EditContext {
    fn default() -> Self {
        Self::root()
    }
}

/// Applies only the linear part of `affine`, deltas don't translate
fn apply_linear(affine: Affine, v: Vec2) -> Vec2 {
    let [a, b, c, d, _, _] = affine.as_coeffs();
    Vec2::new(a * v.x + c * v.y, b * v.x + d * v.y)
}

impl EditContext {
    /// Editing directly on the canvas
    pub fn root() -> Self {
        Self {
            world_from_local: Affine::IDENTITY,
            local_from_world: Some(Affine::IDENTITY),
        }
    }

    pub fn new(chain: &[ContainerFrame]) -> Self {
        let world_from_local = compose_affine(chain);
        let local_from_world = invert_affine(world_from_local);
        if local_from_world.is_none() {
            log::debug!("Singular edit context {world_from_local:?}, deltas pass through");
        }
        Self {
            world_from_local,
            local_from_world,
        }
    }

    pub fn world_from_local(&self) -> Affine {
        self.world_from_local
    }

    /// Pointer delta on the canvas to a delta in local space, unchanged if singular
    pub fn delta_to_local(&self, delta: Vec2) -> Vec2 {
        match self.local_from_world {
            Some(inverse) => apply_linear(inverse, delta),
            None => delta,
        }
    }

    pub fn delta_to_world(&self, delta: Vec2) -> Vec2 {
        apply_linear(self.world_from_local, delta)
    }

    /// Canvas point to local space, unchanged if singular
    pub fn point_to_local(&self, point: Point) -> Point {
        match self.local_from_world {
            Some(inverse) => inverse * point,
            None => point,
        }
    }

    pub fn point_to_world(&self, point: Point) -> Point {
        self.world_from_local * point
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use kurbo::{Affine, Point, Rect, Vec2};

    use crate::{
        bbox::shape_bounds,
        clip::{Clip, ClipLibrary},
        model::{Attr, AttrDelta, Keyframe, Layer, Object, ObjectId, Shape},
        transform::{drag_delta, scale_delta, Handle, ScaleModifiers},
    };

    use super::{compose_affine, container_chain, invert_affine, ContainerFrame, EditContext};

    fn assert_near(expected: Vec2, actual: Vec2) {
        assert!((expected - actual).hypot() < 1e-9, "expected {expected:?} got {actual:?}");
    }

    fn ids(path: &[&str]) -> Vec<ObjectId> {
        path.iter().map(|s| ObjectId::from(*s)).collect()
    }

    fn one_frame_clip(objects: Vec<Object>) -> Clip {
        Clip {
            name: "clip".to_string(),
            layers: vec![Layer::with_keyframes("l", vec![Keyframe::new(1, objects)]).unwrap()],
            frame_count: 1,
        }
    }

    fn frame(x: f64, y: f64, rotation: f64, sx: f64, sy: f64) -> ContainerFrame {
        ContainerFrame {
            position: Point::new(x, y),
            rotation,
            scale: Vec2::new(sx, sy),
        }
    }

    #[test]
    fn only_containers_have_frames() {
        assert!(ContainerFrame::from_shape(&Shape::rect(0.0, 0.0, 1.0, 1.0)).is_none());
        let group = Shape::group(3.0, 4.0, vec![]).apply(&AttrDelta::new().with(Attr::ScaleY, 2.0));
        assert_eq!(
            Some(frame(3.0, 4.0, 0.0, 1.0, 2.0)),
            ContainerFrame::from_shape(&group)
        );
    }

    #[test]
    fn composes_outermost_first() {
        let outer = frame(100.0, 0.0, 90.0, 1.0, 1.0);
        let inner = frame(10.0, 0.0, 0.0, 2.0, 2.0);
        let affine = compose_affine(&[outer, inner]);
        // local (1, 0) -> inner (12, 0) -> rotated (0, 12) -> (100, 12)
        let p = affine * Point::new(1.0, 0.0);
        assert_near(Vec2::new(100.0, 12.0), p.to_vec2());
        assert_eq!(Affine::IDENTITY, compose_affine(&[]));
    }

    #[test]
    fn deltas_round_trip_through_context() {
        let context = EditContext::new(&[frame(50.0, 50.0, 30.0, 2.0, 0.5), frame(-5.0, 7.0, -75.0, 1.0, 3.0)]);
        let delta = Vec2::new(12.0, -4.0);
        let local = context.delta_to_local(delta);
        assert_near(delta, context.delta_to_world(local));

        let p = Point::new(3.0, 9.0);
        assert_near(p.to_vec2(), context.point_to_world(context.point_to_local(p)).to_vec2());
    }

    #[test]
    fn scaled_container_shrinks_deltas() {
        let context = EditContext::new(&[frame(100.0, 100.0, 0.0, 2.0, 4.0)]);
        assert_near(Vec2::new(5.0, 2.5), context.delta_to_local(Vec2::new(10.0, 10.0)));
    }

    #[test]
    fn singular_passes_through() {
        assert_eq!(None, invert_affine(Affine::scale_non_uniform(0.0, 1.0)));
        let context = EditContext::new(&[frame(10.0, 10.0, 45.0, 0.0, 1.0)]);
        let delta = Vec2::new(3.0, 4.0);
        assert_eq!(delta, context.delta_to_local(delta));
        assert_eq!(Point::new(1.0, 2.0), context.point_to_local(Point::new(1.0, 2.0)));
    }

    #[test]
    fn chain_from_ids() {
        let objects = vec![
            Object::new("r", Shape::rect(0.0, 0.0, 1.0, 1.0)),
            Object::new(
                "outer",
                Shape::group(
                    10.0,
                    0.0,
                    vec![
                        Object::new("inner", Shape::group(0.0, 5.0, vec![])),
                        Object::new("walker", Shape::clip_instance(1.0, 1.0, "walk")),
                    ],
                ),
            ),
        ];

        let clips = ClipLibrary::new();
        let chain = |path: &[&str]| container_chain(&objects, &ids(path), &clips, 1);

        assert_eq!(
            Some(vec![frame(10.0, 0.0, 0.0, 1.0, 1.0), frame(0.0, 5.0, 0.0, 1.0, 1.0)]),
            chain(&["outer", "inner"])
        );
        assert_eq!(2, chain(&["outer", "walker"]).unwrap().len());
        assert_eq!(Some(vec![]), chain(&[]));

        assert_eq!(None, chain(&["r"]));
        assert_eq!(None, chain(&["inner"]));
        // "walk" isn't in the library
        assert_eq!(None, chain(&["outer", "walker", "x"]));
    }

    #[test]
    fn chain_through_nested_clips() {
        let mut clips = ClipLibrary::new();
        clips.insert(
            "inner",
            one_frame_clip(vec![Object::new("knob", Shape::group(2.0, 0.0, vec![]))]),
        );
        clips.insert(
            "outer",
            one_frame_clip(vec![Object::new("in", Shape::clip_instance(10.0, 0.0, "inner"))]),
        );
        let objects = vec![Object::new(
            "o",
            Shape::clip_instance(100.0, 100.0, "outer")
                .apply(&AttrDelta::new().with(Attr::ScaleX, 2.0).with(Attr::ScaleY, 2.0)),
        )];

        let chain = container_chain(&objects, &ids(&["o", "in", "knob"]), &clips, 7).unwrap();
        assert_eq!(
            vec![
                frame(100.0, 100.0, 0.0, 2.0, 2.0),
                frame(10.0, 0.0, 0.0, 1.0, 1.0),
                frame(2.0, 0.0, 0.0, 1.0, 1.0),
            ],
            chain
        );
        // knob's origin: 100 + 2 * (10 + 2)
        let origin = compose_affine(&chain) * Point::ZERO;
        assert_near(Vec2::new(124.0, 100.0), origin.to_vec2());

        assert_eq!(None, container_chain(&objects, &ids(&["o", "knob"]), &clips, 1));
    }

    fn rotated_scaled_context() -> EditContext {
        EditContext::new(&[frame(100.0, 100.0, 90.0, 2.0, 2.0)])
    }

    fn local_bounds(shape: &Shape) -> Rect {
        shape_bounds(shape, &HashMap::<String, Rect>::new()).unwrap()
    }

    #[test]
    fn drag_inside_container_follows_pointer() {
        let context = rotated_scaled_context();
        let rect = Shape::rect(0.0, 0.0, 10.0, 10.0);
        let pointer = Vec2::new(0.0, 20.0);

        let local = context.delta_to_local(pointer);
        assert_near(Vec2::new(10.0, 0.0), local);
        let moved = rect.apply(&drag_delta(&rect, local.x, local.y));

        let before = context.point_to_world(local_bounds(&rect).origin());
        let after = context.point_to_world(local_bounds(&moved).origin());
        assert_near(pointer, after - before);
    }

    #[test]
    fn scale_inside_container_keeps_world_anchor() {
        let context = rotated_scaled_context();
        let rect = Shape::rect(0.0, 0.0, 10.0, 10.0);
        let b = local_bounds(&rect);
        let pointer = Vec2::new(-20.0, 20.0);

        let local = context.delta_to_local(pointer);
        let scaled = rect.apply(&scale_delta(
            &rect,
            b,
            Handle::BottomRight,
            local,
            ScaleModifiers::default(),
        ));
        let sb = local_bounds(&scaled);

        // the opposite corner doesn't move on the canvas, the dragged one follows the pointer
        let anchor = context.point_to_world(Point::new(b.x0, b.y0));
        assert_near(anchor.to_vec2(), context.point_to_world(Point::new(sb.x0, sb.y0)).to_vec2());
        let dragged = context.point_to_world(Point::new(sb.x1, sb.y1))
            - context.point_to_world(Point::new(b.x1, b.y1));
        assert_near(pointer, dragged);
        assert_near(Vec2::new(60.0, 140.0), context.point_to_world(Point::new(sb.x1, sb.y1)).to_vec2());
    }
}
