//! Keyframe interpolation and interactive transforms for 2D vector animation.
//!
//! Layers hold keyframes of objects; [`resolve_frame`] says what a layer shows at any frame.
//! The transform functions turn pointer gestures into attribute deltas, never touching the
//! objects they are given.

pub mod bbox;
mod bezop;
pub mod clip;
pub mod color;
pub mod ease;
pub mod error;
pub mod gesture;
pub mod matcher;
pub mod model;
pub mod morph;
pub mod nested;
pub mod path;
pub mod playback;
pub mod project;
pub mod resolve;
pub mod transform;
pub mod value;

pub use bbox::{bounding_box, rotated_corners};
pub use bezop::{rotate_about, rotate_vec};
pub use clip::{ClipDimensions, ClipLibrary};
pub use ease::{EaseDirection, Tween};
pub use error::{Error, PathError};
pub use matcher::match_segment_counts;
pub use model::{Attr, AttrDelta, Keyframe, Layer, Object, ObjectId, Shape};
pub use morph::morph_path;
pub use nested::{compose_affine, invert_affine, ContainerFrame, EditContext};
pub use path::normalize_path;
pub use project::Project;
pub use resolve::resolve_frame;
pub use transform::{drag_delta, rotate_delta, scale_delta, Handle, ScaleModifiers};
pub use value::{interpolate_attribute, AttrValue};
