//! Equalizes the segment counts of two paths so they can be morphed segment by segment

use kurbo::{CubicBez, ParamCurve};
use ordered_float::OrderedFloat;

use crate::bezop::approx_length;

/// Split the longest segment of `segments` in half until there are `target` of them
fn subdivide_to(segments: &mut Vec<CubicBez>, target: usize) {
    while segments.len() < target {
        let Some((longest, _)) = segments
            .iter()
            .enumerate()
            .max_by_key(|(_, c)| OrderedFloat(approx_length(c)))
        else {
            return;
        };
        let (left, right) = segments[longest].subdivide();
        segments.splice(longest..=longest, [left, right]);
    }
}

/// Returns two segment lists of equal length covering the same shapes as the inputs.
///
/// The shorter input grows by repeatedly halving its longest segment (De Casteljau at t=0.5),
/// which spreads new vertices where there is the most curve to cover. The longer input is
/// returned untouched. If either input is empty nothing is matched; callers are expected
/// to special case that rather than morph against nothing.
pub fn match_segment_counts(a: &[CubicBez], b: &[CubicBez]) -> (Vec<CubicBez>, Vec<CubicBez>) {
    let mut a = a.to_vec();
    let mut b = b.to_vec();
    if a.is_empty() || b.is_empty() {
        return (a, b);
    }
    if a.len() < b.len() {
        subdivide_to(&mut a, b.len());
    } else {
        subdivide_to(&mut b, a.len());
    }
    (a, b)
}
