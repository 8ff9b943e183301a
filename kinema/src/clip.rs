//! Reusable clips: separately timed bundles of layers placed by clip-instances

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::hash::BuildHasher;

use kurbo::Rect;
use serde::{Deserialize, Serialize};

use crate::{
    bbox::rotated_bounds,
    error::Error,
    model::{Layer, Object, Shape},
    resolve::resolve_frame,
};

/// Box used for a clip-instance whose clip is unknown or has no content
pub const PLACEHOLDER_CLIP_BOX: Rect = Rect::new(0.0, 0.0, 100.0, 100.0);

/// How deep clips may nest when nobody says otherwise
pub const DEFAULT_MAX_DEPTH: usize = 16;

/// Looks up the content box of a clip by id
pub trait ClipDimensions {
    fn clip_box(&self, clip_id: &str) -> Option<Rect>;
}

impl<S: BuildHasher> ClipDimensions for HashMap<String, Rect, S> {
    fn clip_box(&self, clip_id: &str) -> Option<Rect> {
        self.get(clip_id).copied()
    }
}

impl ClipDimensions for BTreeMap<String, Rect> {
    fn clip_box(&self, clip_id: &str) -> Option<Rect> {
        self.get(clip_id).copied()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Clip {
    pub name: String,
    pub layers: Vec<Layer>,
    pub frame_count: u32,
}

impl Clip {
    /// The clip's own frame for an instance at `parent_frame`: the pinned frame if there is one,
    /// otherwise the parent frame wrapped into the clip's length
    pub fn local_frame(&self, set_frame: Option<u32>, parent_frame: u32) -> u32 {
        if let Some(frame) = set_frame {
            return frame;
        }
        let count = self.frame_count.max(1);
        (parent_frame.max(1) - 1) % count + 1
    }

    fn resolve_layers(&self, frame: u32) -> Vec<Object> {
        self.layers
            .iter()
            .filter(|layer| layer.visible)
            .flat_map(|layer| resolve_frame(layer, frame, Some(self.frame_count)))
            .collect()
    }
}

/// Clips by id
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClipLibrary {
    clips: BTreeMap<String, Clip>,
}

impl ClipLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: impl Into<String>, clip: Clip) {
        self.clips.insert(id.into(), clip);
    }

    pub fn get(&self, id: &str) -> Option<&Clip> {
        self.clips.get(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.clips.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    /// Objects of clip `id` at its own `frame`, nested clip-instances expanded.
    ///
    /// Every clip-instance in the result becomes a group with the instance's placement whose
    /// children are the nested clip's content at its local frame. Fails if a clip is unknown or
    /// nesting goes deeper than `max_depth`, which is what a clip containing itself does.
    pub fn resolve_clip(&self, id: &str, frame: u32, max_depth: usize) -> Result<Vec<Object>, Error> {
        self.resolve_nested(id, frame, 0, max_depth)
    }

    /// Replaces clip-instances within `object`, placed at `frame` of its parent, by their content
    pub fn expand_object(&self, object: Object, frame: u32, max_depth: usize) -> Result<Object, Error> {
        self.expand(object, frame, 0, max_depth)
    }

    fn resolve_nested(
        &self,
        id: &str,
        frame: u32,
        depth: usize,
        max_depth: usize,
    ) -> Result<Vec<Object>, Error> {
        if depth >= max_depth {
            log::warn!("Clip '{id}' hit the nesting limit of {max_depth}");
            return Err(Error::ClipDepthExceeded(id.to_string(), max_depth));
        }
        let clip = self
            .get(id)
            .ok_or_else(|| Error::UnknownClip(id.to_string()))?;
        clip.resolve_layers(frame)
            .into_iter()
            .map(|obj| self.expand(obj, frame, depth + 1, max_depth))
            .collect()
    }

    fn expand(&self, object: Object, frame: u32, depth: usize, max_depth: usize) -> Result<Object, Error> {
        let Object { id, shape, style } = object;
        let shape = match shape {
            Shape::Group {
                x,
                y,
                rotation,
                scale_x,
                scale_y,
                children,
            } => Shape::Group {
                x,
                y,
                rotation,
                scale_x,
                scale_y,
                children: children
                    .into_iter()
                    .map(|child| self.expand(child, frame, depth, max_depth))
                    .collect::<Result<_, _>>()?,
            },
            Shape::ClipInstance {
                x,
                y,
                rotation,
                scale_x,
                scale_y,
                clip_id,
                set_frame,
            } => {
                let clip = self
                    .get(&clip_id)
                    .ok_or_else(|| Error::UnknownClip(clip_id.clone()))?;
                let local = clip.local_frame(set_frame, frame);
                Shape::Group {
                    x,
                    y,
                    rotation,
                    scale_x,
                    scale_y,
                    children: self.resolve_nested(&clip_id, local, depth, max_depth)?,
                }
            }
            other => other,
        };
        Ok(Object { id, shape, style })
    }

    /// Union of the content of clip `id` at its first frame
    fn content_box(&self, id: &str, max_depth: usize) -> Option<Rect> {
        if max_depth == 0 {
            log::warn!("Clip '{id}' hit the nesting limit measuring its content");
            return None;
        }
        let clip = self.get(id)?;
        let nested = DepthLimited {
            library: self,
            max_depth: max_depth - 1,
        };
        clip.resolve_layers(1)
            .iter()
            .filter_map(|obj| rotated_bounds(&obj.shape, &nested))
            .reduce(|acc, r| acc.union(r))
    }

    /// Ids of clips referenced by instances anywhere in clip `id`
    fn references(&self, id: &str) -> BTreeSet<String> {
        let mut refs = BTreeSet::new();
        if let Some(clip) = self.get(id) {
            for layer in clip.layers.iter() {
                for keyframe in layer.keyframes() {
                    collect_clip_refs(&keyframe.objects, &mut refs);
                }
            }
        }
        refs
    }

    /// Rejects clips that contain an instance of themselves, directly or through other clips
    pub fn validate(&self) -> Result<(), Error> {
        let mut done = BTreeSet::new();
        for id in self.ids() {
            let mut stack = Vec::new();
            self.visit(id, &mut stack, &mut done)?;
        }
        Ok(())
    }

    fn visit(
        &self,
        id: &str,
        stack: &mut Vec<String>,
        done: &mut BTreeSet<String>,
    ) -> Result<(), Error> {
        if done.contains(id) {
            return Ok(());
        }
        if let Some(start) = stack.iter().position(|s| s == id) {
            let mut cycle = stack[start..].to_vec();
            cycle.push(id.to_string());
            return Err(Error::ClipCycle(id.to_string(), cycle));
        }
        stack.push(id.to_string());
        for child in self.references(id) {
            self.visit(&child, stack, done)?;
        }
        stack.pop();
        done.insert(id.to_string());
        Ok(())
    }
}

/// Clip boxes are measured at frame 1, nesting limited to [`DEFAULT_MAX_DEPTH`]
impl ClipDimensions for ClipLibrary {
    fn clip_box(&self, clip_id: &str) -> Option<Rect> {
        self.content_box(clip_id, DEFAULT_MAX_DEPTH)
    }
}

struct DepthLimited<'a> {
    library: &'a ClipLibrary,
    max_depth: usize,
}

impl ClipDimensions for DepthLimited<'_> {
    fn clip_box(&self, clip_id: &str) -> Option<Rect> {
        self.library.content_box(clip_id, self.max_depth)
    }
}

/// Clip ids of every instance in `objects`, including inside groups
pub fn collect_clip_refs(objects: &[Object], refs: &mut BTreeSet<String>) {
    for obj in objects {
        match &obj.shape {
            Shape::ClipInstance { clip_id, .. } => {
                refs.insert(clip_id.clone());
            }
            Shape::Group { children, .. } => collect_clip_refs(children, refs),
            _ => (),
        }
    }
}

#[cfg(test)]
mod tests {
    use kurbo::Rect;

    use crate::{
        error::Error,
        model::{Attr, AttrDelta, Keyframe, Layer, Object, ObjectKind, Shape},
    };

    use super::{Clip, ClipDimensions, ClipLibrary, DEFAULT_MAX_DEPTH};

    fn clip(frame_count: u32, keyframes: Vec<Keyframe>) -> Clip {
        Clip {
            name: "clip".to_string(),
            layers: vec![Layer::with_keyframes("l", keyframes).unwrap()],
            frame_count,
        }
    }

    fn library() -> ClipLibrary {
        let mut library = ClipLibrary::new();
        library.insert(
            "dot",
            clip(
                10,
                vec![
                    Keyframe::new(1, vec![Object::new("d", Shape::circle(0.0, 0.0, 5.0))]),
                    Keyframe::new(10, vec![Object::new("d", Shape::circle(90.0, 0.0, 5.0))]),
                ],
            ),
        );
        library.insert(
            "pair",
            clip(
                4,
                vec![Keyframe::new(
                    1,
                    vec![
                        Object::new("a", Shape::clip_instance(0.0, 0.0, "dot")),
                        Object::new(
                            "b",
                            Shape::clip_instance(100.0, 0.0, "dot")
                                .apply(&AttrDelta::new().with(Attr::SetFrame, 10.0)),
                        ),
                    ],
                )],
            ),
        );
        library
    }

    #[test]
    fn local_frames() {
        let dot = library().get("dot").unwrap().clone();
        assert_eq!(3, dot.local_frame(None, 3));
        assert_eq!(10, dot.local_frame(None, 10));
        assert_eq!(1, dot.local_frame(None, 11));
        assert_eq!(5, dot.local_frame(None, 25));
        assert_eq!(7, dot.local_frame(Some(7), 25));
    }

    #[test]
    fn content_box_at_first_frame() {
        let library = library();
        assert_eq!(Some(Rect::new(-5.0, -5.0, 5.0, 5.0)), library.clip_box("dot"));
        assert_eq!(Some(Rect::new(-5.0, -5.0, 105.0, 5.0)), library.clip_box("pair"));
        assert_eq!(None, library.clip_box("nope"));
    }

    #[test]
    fn resolve_expands_instances() {
        let library = library();
        let objects = library.resolve_clip("pair", 2, DEFAULT_MAX_DEPTH).unwrap();
        assert_eq!(2, objects.len());
        assert!(objects.iter().all(|o| o.kind() == ObjectKind::Group));
        // following the parent frame
        let a = objects[0].shape.children();
        let cx = a[0].shape.number(Attr::Cx).unwrap();
        assert!((cx - 10.0).abs() < 1e-9, "{cx}");
        // pinned to the last frame
        let b = objects[1].shape.children();
        assert_eq!(Some(90.0), b[0].shape.number(Attr::Cx));
        assert_eq!(Some(100.0), objects[1].shape.number(Attr::X));
    }

    #[test]
    fn unknown_clip() {
        assert!(matches!(
            library().resolve_clip("nope", 1, DEFAULT_MAX_DEPTH),
            Err(Error::UnknownClip(id)) if id == "nope"
        ));
    }

    fn cyclic() -> ClipLibrary {
        let mut library = library();
        library.insert(
            "a",
            clip(
                1,
                vec![Keyframe::new(
                    1,
                    vec![Object::new(
                        "g",
                        Shape::group(0.0, 0.0, vec![Object::new("i", Shape::clip_instance(0.0, 0.0, "b"))]),
                    )],
                )],
            ),
        );
        library.insert(
            "b",
            clip(
                1,
                vec![Keyframe::new(1, vec![Object::new("i", Shape::clip_instance(0.0, 0.0, "a"))])],
            ),
        );
        library
    }

    #[test]
    fn validate_finds_cycles() {
        assert!(library().validate().is_ok());
        match cyclic().validate() {
            Err(Error::ClipCycle(id, path)) => {
                assert_eq!("a", id);
                assert_eq!(vec!["a", "b", "a"], path);
            }
            other => panic!("expected a cycle, got {other:?}"),
        }
    }

    #[test]
    fn self_containing_clip_is_bounded() {
        let library = cyclic();
        assert!(matches!(
            library.resolve_clip("a", 1, 8),
            Err(Error::ClipDepthExceeded(_, 8))
        ));
        // measuring bottoms out at the placeholder rather than recursing forever
        assert_eq!(Some(Rect::new(0.0, 0.0, 100.0, 100.0)), library.clip_box("a"));
    }
}
