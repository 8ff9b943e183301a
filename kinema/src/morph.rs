//! Shape interpolation between two path command strings

use crate::{
    bezop::lerp_cubic,
    matcher::match_segment_counts,
    path::{normalize_path, to_path_string},
};

/// Morphs path `a` toward path `b`.
///
/// `t <= 0` and `t >= 1` return the inputs verbatim. In between, both paths are normalized to
/// cubics, their segment counts matched, and every control point interpolated. If either side
/// has no geometry the result snaps to whichever side `t` is closer to.
pub fn morph_path(a: &str, b: &str, t: f64) -> String {
    if t <= 0.0 {
        return a.to_string();
    }
    if t >= 1.0 {
        return b.to_string();
    }

    let segments_a = normalize_path(a);
    let segments_b = normalize_path(b);
    if segments_a.is_empty() || segments_b.is_empty() {
        return if t < 0.5 { a.to_string() } else { b.to_string() };
    }

    let (segments_a, segments_b) = match_segment_counts(&segments_a, &segments_b);
    let morphed: Vec<_> = segments_a
        .iter()
        .zip(segments_b.iter())
        .map(|(a, b)| lerp_cubic(a, b, t))
        .collect();
    to_path_string(&morphed)
}
