//! Objects, keyframes and layers
//!
//! An [`Object`] is a drawable primitive or container. Its geometry lives in a [`Shape`], one
//! variant per kind holding only the fields that kind has, plus an open `style` map for
//! everything else (fill, stroke, opacity, ...). Objects are values: nothing in this crate
//! edits them in place, operations return new shapes or an [`AttrDelta`] to apply.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

use crate::{
    ease::{EaseDirection, Tween},
    error::Error,
    value::AttrValue,
};

/// Stable identity of an object across keyframes and edits
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(pub String);

impl From<&str> for ObjectId {
    fn from(value: &str) -> Self {
        ObjectId(value.to_string())
    }
}

impl Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn one() -> f64 {
    1.0
}

fn is_zero(v: &f64) -> bool {
    *v == 0.0
}

fn is_one(v: &f64) -> bool {
    *v == 1.0
}

/// Geometry of an object, per kind
///
/// Rotation is in degrees. Groups and clip-instances rotate and scale around their `(x, y)`,
/// every other kind rotates around the center of its bounding box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum Shape {
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        #[serde(default, skip_serializing_if = "is_zero")]
        rotation: f64,
    },
    Circle {
        cx: f64,
        cy: f64,
        r: f64,
        #[serde(default, skip_serializing_if = "is_zero")]
        rotation: f64,
    },
    Ellipse {
        cx: f64,
        cy: f64,
        rx: f64,
        ry: f64,
        #[serde(default, skip_serializing_if = "is_zero")]
        rotation: f64,
    },
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        #[serde(default, skip_serializing_if = "is_zero")]
        rotation: f64,
    },
    /// Path data is offset by `(x, y)`
    Path {
        #[serde(default)]
        x: f64,
        #[serde(default)]
        y: f64,
        d: String,
        #[serde(default, skip_serializing_if = "is_zero")]
        rotation: f64,
    },
    Text {
        x: f64,
        y: f64,
        text: String,
        font_size: f64,
        #[serde(default, skip_serializing_if = "is_zero")]
        rotation: f64,
    },
    Group {
        #[serde(default)]
        x: f64,
        #[serde(default)]
        y: f64,
        #[serde(default, skip_serializing_if = "is_zero")]
        rotation: f64,
        #[serde(default = "one", skip_serializing_if = "is_one")]
        scale_x: f64,
        #[serde(default = "one", skip_serializing_if = "is_one")]
        scale_y: f64,
        children: Vec<Object>,
    },
    /// A placed reference into a clip library with its own timeline
    ClipInstance {
        #[serde(default)]
        x: f64,
        #[serde(default)]
        y: f64,
        #[serde(default, skip_serializing_if = "is_zero")]
        rotation: f64,
        #[serde(default = "one", skip_serializing_if = "is_one")]
        scale_x: f64,
        #[serde(default = "one", skip_serializing_if = "is_one")]
        scale_y: f64,
        clip_id: String,
        /// Pins the clip to one of its own frames instead of following the parent timeline
        #[serde(default, skip_serializing_if = "Option::is_none")]
        set_frame: Option<u32>,
    },
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Rect,
    Circle,
    Ellipse,
    Line,
    Path,
    Text,
    Group,
    ClipInstance,
}

impl Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ObjectKind::Rect => "rect",
            ObjectKind::Circle => "circle",
            ObjectKind::Ellipse => "ellipse",
            ObjectKind::Line => "line",
            ObjectKind::Path => "path",
            ObjectKind::Text => "text",
            ObjectKind::Group => "group",
            ObjectKind::ClipInstance => "clip-instance",
        };
        f.write_str(name)
    }
}

/// Names of the typed attributes a [`Shape`] may have
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Attr {
    X,
    Y,
    Width,
    Height,
    Cx,
    Cy,
    R,
    Rx,
    Ry,
    X1,
    Y1,
    X2,
    Y2,
    D,
    Text,
    FontSize,
    Rotation,
    ScaleX,
    ScaleY,
    SetFrame,
}

impl Attr {
    pub const ALL: [Attr; 20] = [
        Attr::X,
        Attr::Y,
        Attr::Width,
        Attr::Height,
        Attr::Cx,
        Attr::Cy,
        Attr::R,
        Attr::Rx,
        Attr::Ry,
        Attr::X1,
        Attr::Y1,
        Attr::X2,
        Attr::Y2,
        Attr::D,
        Attr::Text,
        Attr::FontSize,
        Attr::Rotation,
        Attr::ScaleX,
        Attr::ScaleY,
        Attr::SetFrame,
    ];

    /// Whether values between keyframes are interpolated rather than held
    pub fn is_tweened(&self) -> bool {
        !matches!(self, Attr::Text | Attr::SetFrame)
    }
}

/// New values for the attributes an operation changes
///
/// Applying a delta to the shape it was computed from yields the preview; diffing the preview
/// against the original yields the delta to commit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttrDelta(BTreeMap<Attr, AttrValue>);

impl AttrDelta {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, attr: Attr, value: impl Into<AttrValue>) {
        self.0.insert(attr, value.into());
    }

    pub fn with(mut self, attr: Attr, value: impl Into<AttrValue>) -> Self {
        self.set(attr, value);
        self
    }

    pub fn get(&self, attr: Attr) -> Option<&AttrValue> {
        self.0.get(&attr)
    }

    pub fn number(&self, attr: Attr) -> Option<f64> {
        self.get(attr).and_then(AttrValue::as_number)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Attr, &AttrValue)> {
        self.0.iter()
    }

    /// Entries of `later` win
    pub fn merge(mut self, later: AttrDelta) -> Self {
        self.0.extend(later.0);
        self
    }
}

impl FromIterator<(Attr, AttrValue)> for AttrDelta {
    fn from_iter<I: IntoIterator<Item = (Attr, AttrValue)>>(iter: I) -> Self {
        AttrDelta(iter.into_iter().collect())
    }
}

/// The handful of fields transforms need, regardless of kind
pub trait Placement {
    /// Rotation in degrees
    fn rotation(&self) -> f64;

    /// Scale factors; (1, 1) for kinds that resize by changing their geometry
    fn scale(&self) -> Vec2;

    /// Whether rotation happens around the declared `(x, y)` rather than the box center
    fn rotates_around_position(&self) -> bool;

    /// The declared `(x, y)` for kinds that have one
    fn position(&self) -> Option<Point>;
}

impl Placement for Shape {
    fn rotation(&self) -> f64 {
        match self {
            Shape::Rect { rotation, .. }
            | Shape::Circle { rotation, .. }
            | Shape::Ellipse { rotation, .. }
            | Shape::Line { rotation, .. }
            | Shape::Path { rotation, .. }
            | Shape::Text { rotation, .. }
            | Shape::Group { rotation, .. }
            | Shape::ClipInstance { rotation, .. } => *rotation,
        }
    }

    fn scale(&self) -> Vec2 {
        match self {
            Shape::Group {
                scale_x, scale_y, ..
            }
            | Shape::ClipInstance {
                scale_x, scale_y, ..
            } => Vec2::new(*scale_x, *scale_y),
            _ => Vec2::new(1.0, 1.0),
        }
    }

    fn rotates_around_position(&self) -> bool {
        matches!(self, Shape::Group { .. } | Shape::ClipInstance { .. })
    }

    fn position(&self) -> Option<Point> {
        match self {
            Shape::Rect { x, y, .. }
            | Shape::Path { x, y, .. }
            | Shape::Text { x, y, .. }
            | Shape::Group { x, y, .. }
            | Shape::ClipInstance { x, y, .. } => Some(Point::new(*x, *y)),
            Shape::Circle { cx, cy, .. } | Shape::Ellipse { cx, cy, .. } => {
                Some(Point::new(*cx, *cy))
            }
            Shape::Line { .. } => None,
        }
    }
}

/// Expands one table of `(shape pattern, attr) => field` arms into `field` and `field_mut`
macro_rules! numeric_fields {
    ($($arms:tt)*) => {
        fn field(&self, attr: Attr) -> Option<&f64> {
            Some(match (self, attr) {
                $($arms)*
                _ => return None,
            })
        }

        fn field_mut(&mut self, attr: Attr) -> Option<&mut f64> {
            Some(match (self, attr) {
                $($arms)*
                _ => return None,
            })
        }
    };
}

impl Shape {
    pub fn rect(x: f64, y: f64, width: f64, height: f64) -> Self {
        Shape::Rect {
            x,
            y,
            width,
            height,
            rotation: 0.0,
        }
    }

    pub fn circle(cx: f64, cy: f64, r: f64) -> Self {
        Shape::Circle {
            cx,
            cy,
            r,
            rotation: 0.0,
        }
    }

    pub fn ellipse(cx: f64, cy: f64, rx: f64, ry: f64) -> Self {
        Shape::Ellipse {
            cx,
            cy,
            rx,
            ry,
            rotation: 0.0,
        }
    }

    pub fn line(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Shape::Line {
            x1,
            y1,
            x2,
            y2,
            rotation: 0.0,
        }
    }

    pub fn path(x: f64, y: f64, d: impl Into<String>) -> Self {
        Shape::Path {
            x,
            y,
            d: d.into(),
            rotation: 0.0,
        }
    }

    pub fn text(x: f64, y: f64, text: impl Into<String>, font_size: f64) -> Self {
        Shape::Text {
            x,
            y,
            text: text.into(),
            font_size,
            rotation: 0.0,
        }
    }

    pub fn group(x: f64, y: f64, children: Vec<Object>) -> Self {
        Shape::Group {
            x,
            y,
            rotation: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            children,
        }
    }

    pub fn clip_instance(x: f64, y: f64, clip_id: impl Into<String>) -> Self {
        Shape::ClipInstance {
            x,
            y,
            rotation: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            clip_id: clip_id.into(),
            set_frame: None,
        }
    }

    pub fn kind(&self) -> ObjectKind {
        match self {
            Shape::Rect { .. } => ObjectKind::Rect,
            Shape::Circle { .. } => ObjectKind::Circle,
            Shape::Ellipse { .. } => ObjectKind::Ellipse,
            Shape::Line { .. } => ObjectKind::Line,
            Shape::Path { .. } => ObjectKind::Path,
            Shape::Text { .. } => ObjectKind::Text,
            Shape::Group { .. } => ObjectKind::Group,
            Shape::ClipInstance { .. } => ObjectKind::ClipInstance,
        }
    }

    /// Children of a group, empty for every other kind
    pub fn children(&self) -> &[Object] {
        match self {
            Shape::Group { children, .. } => children,
            _ => &[],
        }
    }

    numeric_fields! {
        (
            Shape::Rect { x, .. }
            | Shape::Path { x, .. }
            | Shape::Text { x, .. }
            | Shape::Group { x, .. }
            | Shape::ClipInstance { x, .. },
            Attr::X,
        ) => x,
        (
            Shape::Rect { y, .. }
            | Shape::Path { y, .. }
            | Shape::Text { y, .. }
            | Shape::Group { y, .. }
            | Shape::ClipInstance { y, .. },
            Attr::Y,
        ) => y,
        (Shape::Rect { width, .. }, Attr::Width) => width,
        (Shape::Rect { height, .. }, Attr::Height) => height,
        (Shape::Circle { cx, .. } | Shape::Ellipse { cx, .. }, Attr::Cx) => cx,
        (Shape::Circle { cy, .. } | Shape::Ellipse { cy, .. }, Attr::Cy) => cy,
        (Shape::Circle { r, .. }, Attr::R) => r,
        (Shape::Ellipse { rx, .. }, Attr::Rx) => rx,
        (Shape::Ellipse { ry, .. }, Attr::Ry) => ry,
        (Shape::Line { x1, .. }, Attr::X1) => x1,
        (Shape::Line { y1, .. }, Attr::Y1) => y1,
        (Shape::Line { x2, .. }, Attr::X2) => x2,
        (Shape::Line { y2, .. }, Attr::Y2) => y2,
        (Shape::Text { font_size, .. }, Attr::FontSize) => font_size,
        (
            Shape::Rect { rotation, .. }
            | Shape::Circle { rotation, .. }
            | Shape::Ellipse { rotation, .. }
            | Shape::Line { rotation, .. }
            | Shape::Path { rotation, .. }
            | Shape::Text { rotation, .. }
            | Shape::Group { rotation, .. }
            | Shape::ClipInstance { rotation, .. },
            Attr::Rotation,
        ) => rotation,
        (
            Shape::Group { scale_x, .. } | Shape::ClipInstance { scale_x, .. },
            Attr::ScaleX,
        ) => scale_x,
        (
            Shape::Group { scale_y, .. } | Shape::ClipInstance { scale_y, .. },
            Attr::ScaleY,
        ) => scale_y,
    }

    /// Numeric attribute value, `None` if this kind doesn't have it
    pub fn number(&self, attr: Attr) -> Option<f64> {
        self.field(attr).copied()
    }

    pub fn get(&self, attr: Attr) -> Option<AttrValue> {
        match (self, attr) {
            (Shape::Path { d, .. }, Attr::D) => Some(AttrValue::Text(d.clone())),
            (Shape::Text { text, .. }, Attr::Text) => Some(AttrValue::Text(text.clone())),
            (Shape::ClipInstance { set_frame, .. }, Attr::SetFrame) => {
                set_frame.map(|f| AttrValue::Number(f as f64))
            }
            _ => self.number(attr).map(AttrValue::Number),
        }
    }

    /// Sets an attribute; a kind without it or a value of the wrong kind is ignored
    pub fn set(&mut self, attr: Attr, value: &AttrValue) {
        match (self, attr, value) {
            (Shape::Path { d, .. }, Attr::D, AttrValue::Text(v)) => *d = v.clone(),
            (Shape::Text { text, .. }, Attr::Text, AttrValue::Text(v)) => *text = v.clone(),
            (Shape::ClipInstance { set_frame, .. }, Attr::SetFrame, AttrValue::Number(v)) => {
                *set_frame = Some(v.round().max(1.0) as u32)
            }
            (shape, attr, AttrValue::Number(v)) => {
                if let Some(field) = shape.field_mut(attr) {
                    *field = *v;
                }
            }
            _ => (),
        }
    }

    /// Every attribute this shape has, with its value
    pub fn attrs(&self) -> impl Iterator<Item = (Attr, AttrValue)> + '_ {
        Attr::ALL
            .into_iter()
            .filter_map(|attr| self.get(attr).map(|v| (attr, v)))
    }

    /// A copy with `delta` applied
    pub fn apply(&self, delta: &AttrDelta) -> Shape {
        let mut shape = self.clone();
        for (attr, value) in delta.iter() {
            shape.set(*attr, value);
        }
        shape
    }

    /// The attributes of `changed` that differ from `self`, i.e. what to commit
    pub fn diff(&self, changed: &Shape) -> AttrDelta {
        changed
            .attrs()
            .filter(|(attr, value)| self.get(*attr).as_ref() != Some(value))
            .collect()
    }
}

/// A drawable primitive or container
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Object {
    pub id: ObjectId,
    #[serde(flatten)]
    pub shape: Shape,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub style: BTreeMap<String, AttrValue>,
}

impl Object {
    pub fn new(id: impl Into<ObjectId>, shape: Shape) -> Self {
        Self {
            id: id.into(),
            shape,
            style: Default::default(),
        }
    }

    pub fn with_style(mut self, name: &str, value: impl Into<AttrValue>) -> Self {
        self.style.insert(name.to_string(), value.into());
        self
    }

    pub fn kind(&self) -> ObjectKind {
        self.shape.kind()
    }
}

/// The authored state of a layer at one frame, and how to get from it to the next keyframe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    /// 1-based
    pub frame: u32,
    #[serde(default)]
    pub objects: Vec<Object>,
    #[serde(default)]
    pub tween: Tween,
    #[serde(default)]
    pub ease: EaseDirection,
    /// After the last keyframe, tween back around to the first
    #[serde(default, rename = "loop")]
    pub looping: bool,
}

impl Keyframe {
    pub fn new(frame: u32, objects: Vec<Object>) -> Self {
        Self {
            frame,
            objects,
            tween: Tween::default(),
            ease: EaseDirection::default(),
            looping: false,
        }
    }

    pub fn tween(mut self, tween: Tween, ease: EaseDirection) -> Self {
        self.tween = tween;
        self.ease = ease;
        self
    }

    pub fn looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    pub fn object(&self, id: &ObjectId) -> Option<&Object> {
        self.objects.iter().find(|o| &o.id == id)
    }
}

fn default_true() -> bool {
    true
}

#[derive(Serialize, Deserialize)]
struct RawLayer {
    name: String,
    keyframes: Vec<Keyframe>,
    #[serde(default = "default_true")]
    visible: bool,
    #[serde(default)]
    locked: bool,
}

/// Keyframes of one layer. There is always at least one keyframe.
///
/// Keyframes are sorted by frame and frames are unique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawLayer", into = "RawLayer")]
pub struct Layer {
    pub name: String,
    keyframes: Vec<Keyframe>,
    pub visible: bool,
    pub locked: bool,
}

impl Layer {
    /// A layer with a single empty keyframe at frame 1
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            keyframes: vec![Keyframe::new(1, Vec::new())],
            visible: true,
            locked: false,
        }
    }

    pub fn with_keyframes(
        name: impl Into<String>,
        keyframes: Vec<Keyframe>,
    ) -> Result<Self, Error> {
        let mut keyframes = keyframes;
        if keyframes.is_empty() {
            return Err(Error::NoKeyframes);
        }
        keyframes.sort_by_key(|k| k.frame);
        if keyframes[0].frame == 0 {
            return Err(Error::FrameZero);
        }
        for window in keyframes.windows(2) {
            if window[0].frame == window[1].frame {
                return Err(Error::DuplicateKeyframe(window[0].frame));
            }
        }
        Ok(Self {
            name: name.into(),
            keyframes,
            visible: true,
            locked: false,
        })
    }

    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keyframes
    }

    pub fn keyframe(&self, frame: u32) -> Option<&Keyframe> {
        self.keyframes
            .binary_search_by_key(&frame, |k| k.frame)
            .ok()
            .map(|i| &self.keyframes[i])
    }

    /// Index of the keyframe in effect at `frame`: the last one at or before it
    pub fn active_index(&self, frame: u32) -> Option<usize> {
        self.keyframes
            .partition_point(|k| k.frame <= frame)
            .checked_sub(1)
    }

    /// Adds a keyframe, replacing any existing keyframe at the same frame
    pub fn insert_keyframe(&mut self, keyframe: Keyframe) -> Result<(), Error> {
        if keyframe.frame == 0 {
            return Err(Error::FrameZero);
        }
        match self
            .keyframes
            .binary_search_by_key(&keyframe.frame, |k| k.frame)
        {
            Ok(i) => self.keyframes[i] = keyframe,
            Err(i) => self.keyframes.insert(i, keyframe),
        }
        Ok(())
    }

    /// Removes the keyframe at `frame`; the last remaining keyframe can't be removed
    pub fn remove_keyframe(&mut self, frame: u32) -> Option<Keyframe> {
        if self.keyframes.len() == 1 {
            return None;
        }
        let i = self
            .keyframes
            .binary_search_by_key(&frame, |k| k.frame)
            .ok()?;
        Some(self.keyframes.remove(i))
    }
}

impl TryFrom<RawLayer> for Layer {
    type Error = Error;

    fn try_from(raw: RawLayer) -> Result<Self, Self::Error> {
        let mut layer = Layer::with_keyframes(raw.name, raw.keyframes)?;
        layer.visible = raw.visible;
        layer.locked = raw.locked;
        Ok(layer)
    }
}

impl From<Layer> for RawLayer {
    fn from(layer: Layer) -> Self {
        RawLayer {
            name: layer.name,
            keyframes: layer.keyframes,
            visible: layer.visible,
            locked: layer.locked,
        }
    }
}
