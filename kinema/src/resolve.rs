//! What a layer shows at a given frame

use std::collections::BTreeMap;

use crate::{
    model::{Keyframe, Layer, Object},
    value::{interpolate_attribute, AttrValue},
};

/// Objects of `layer` at `frame`.
///
/// The keyframe in effect is the last one at or before `frame`; before the first keyframe the
/// layer shows nothing. Between two keyframes objects are matched by id and interpolated with
/// the earlier keyframe's tween. After the last keyframe the layer holds, unless that keyframe
/// loops and `total_frames` is known, in which case it tweens around to the first keyframe.
pub fn resolve_frame(layer: &Layer, frame: u32, total_frames: Option<u32>) -> Vec<Object> {
    let keyframes = layer.keyframes();
    let Some(i) = layer.active_index(frame) else {
        return Vec::new();
    };
    let active = &keyframes[i];

    let (target, span) = match keyframes.get(i + 1) {
        Some(next) => (next, next.frame - active.frame),
        None => match (active.looping, total_frames) {
            (true, Some(total)) => {
                let first = &keyframes[0];
                (first, first.frame.saturating_add(total).saturating_sub(active.frame))
            }
            _ => return active.objects.clone(),
        },
    };

    let offset = frame - active.frame;
    if offset == 0 || span == 0 {
        return active.objects.clone();
    }
    if offset >= span {
        return target.objects.clone();
    }

    let raw_t = offset as f64 / span as f64;
    let t = active.tween.ease(active.ease, raw_t);
    log::trace!(
        "Layer '{}' frame {frame}: {} -> {} raw {raw_t:.3} eased {t:.3}",
        layer.name,
        active.frame,
        target.frame
    );
    interpolate_keyframes(active, target, t)
}

/// Every object of `a` against its same-id counterpart in `b`; objects only in `b` are left out
pub fn interpolate_keyframes(a: &Keyframe, b: &Keyframe, t: f64) -> Vec<Object> {
    a.objects
        .iter()
        .map(|obj| match b.object(&obj.id) {
            Some(other) => interpolate_object(obj, other, t),
            None => obj.clone(),
        })
        .collect()
}

/// Interpolates two states of the same object.
///
/// Objects of different kinds hold `a`. Untweened attributes (text, a pinned clip frame), group
/// children and the clip reference hold `a` too. Style keys are the union of both sides; a key
/// only one side has keeps that side's value.
pub fn interpolate_object(a: &Object, b: &Object, t: f64) -> Object {
    if a.kind() != b.kind() {
        log::debug!(
            "'{}' changes kind from {} to {}, holding",
            a.id,
            a.kind(),
            b.kind()
        );
        return a.clone();
    }

    let mut shape = a.shape.clone();
    for (attr, value) in a.shape.attrs() {
        if !attr.is_tweened() {
            continue;
        }
        if let Some(other) = b.shape.get(attr) {
            shape.set(attr, &interpolate_attribute(&value, &other, t));
        }
    }

    Object {
        id: a.id.clone(),
        shape,
        style: interpolate_style(&a.style, &b.style, t),
    }
}

fn interpolate_style(
    a: &BTreeMap<String, AttrValue>,
    b: &BTreeMap<String, AttrValue>,
    t: f64,
) -> BTreeMap<String, AttrValue> {
    let mut style = b.clone();
    for (name, value) in a {
        let value = match b.get(name) {
            Some(other) => interpolate_attribute(value, other, t),
            None => value.clone(),
        };
        style.insert(name.clone(), value);
    }
    style
}

#[cfg(test)]
mod tests {
    use crate::{
        ease::{EaseDirection, Tween},
        model::{Attr, Keyframe, Layer, Object, Shape},
        value::AttrValue,
    };

    use super::{interpolate_object, resolve_frame};

    fn rect(id: &str, x: f64, y: f64) -> Object {
        Object::new(id, Shape::rect(x, y, 50.0, 50.0))
    }

    fn xy(objects: &[Object]) -> Vec<(f64, f64)> {
        objects
            .iter()
            .map(|o| {
                (
                    o.shape.number(Attr::X).unwrap(),
                    o.shape.number(Attr::Y).unwrap(),
                )
            })
            .collect()
    }

    fn two_keyframes(tween: Tween) -> Layer {
        Layer::with_keyframes(
            "l",
            vec![
                Keyframe::new(1, vec![rect("r", 200.0, 200.0)]).tween(tween, EaseDirection::In),
                Keyframe::new(15, vec![rect("r", 800.0, 400.0)])
                    .tween(Tween::Discrete, EaseDirection::In),
            ],
        )
        .unwrap()
    }

    #[test]
    fn linear_midpoint() {
        let layer = two_keyframes(Tween::Linear);
        assert_eq!(vec![(500.0, 300.0)], xy(&resolve_frame(&layer, 8, None)));
        assert_eq!(vec![(800.0, 400.0)], xy(&resolve_frame(&layer, 15, None)));
        assert_eq!(vec![(800.0, 400.0)], xy(&resolve_frame(&layer, 40, None)));
    }

    #[test]
    fn keyframes_resolve_exactly() {
        for tween in Tween::ALL {
            let layer = two_keyframes(tween);
            for kf in layer.keyframes() {
                assert_eq!(kf.objects, resolve_frame(&layer, kf.frame, Some(30)), "{tween}");
            }
        }
    }

    #[test]
    fn discrete_holds_until_next() {
        let layer = two_keyframes(Tween::Discrete);
        for frame in 1..15 {
            assert_eq!(
                layer.keyframes()[0].objects,
                resolve_frame(&layer, frame, None)
            );
        }
    }

    #[test]
    fn nothing_before_first_keyframe() {
        let layer =
            Layer::with_keyframes("l", vec![Keyframe::new(5, vec![rect("r", 0.0, 0.0)])]).unwrap();
        assert!(resolve_frame(&layer, 4, None).is_empty());
        assert_eq!(1, resolve_frame(&layer, 5, None).len());
    }

    #[test]
    fn matching_is_by_id() {
        let layer = Layer::with_keyframes(
            "l",
            vec![
                Keyframe::new(1, vec![rect("a", 0.0, 0.0), rect("gone", 5.0, 5.0)]),
                Keyframe::new(11, vec![rect("a", 100.0, 0.0), rect("new", 9.0, 9.0)]),
            ],
        )
        .unwrap();
        let mid = resolve_frame(&layer, 6, None);
        assert_eq!(vec![(50.0, 0.0), (5.0, 5.0)], xy(&mid));
        assert_eq!("gone", mid[1].id.0);

        let end = resolve_frame(&layer, 11, None);
        assert_eq!(vec!["a", "new"], end.iter().map(|o| o.id.0.as_str()).collect::<Vec<_>>());
    }

    #[test]
    fn loop_wraps_to_first() {
        let mut last = Keyframe::new(21, vec![rect("r", 100.0, 0.0)]).looping(true);
        last.tween = Tween::Linear;
        let layer =
            Layer::with_keyframes("l", vec![Keyframe::new(1, vec![rect("r", 0.0, 0.0)]), last])
                .unwrap();
        // span is (1 + 30) - 21 = 10
        assert_eq!(vec![(50.0, 0.0)], xy(&resolve_frame(&layer, 26, Some(30))));
        assert_eq!(vec![(100.0, 0.0)], xy(&resolve_frame(&layer, 26, None)));
    }

    #[test]
    fn looping_offset_keyframes() {
        let layer = Layer::with_keyframes(
            "l",
            vec![
                Keyframe::new(5, vec![rect("r", 0.0, 0.0)]),
                Keyframe::new(10, vec![rect("r", 40.0, 0.0)]).looping(true),
            ],
        )
        .unwrap();
        // span is (5 + 12) - 10 = 7
        let at = |frame| xy(&resolve_frame(&layer, frame, Some(12)))[0].0;
        assert_eq!(40.0, at(10));
        assert!((at(12) - (40.0 - 40.0 * 2.0 / 7.0)).abs() < 1e-9);
    }

    #[test]
    fn loop_span_saturates_on_huge_totals() {
        let layer = Layer::with_keyframes(
            "l",
            vec![
                Keyframe::new(1, vec![rect("r", 0.0, 0.0)]),
                Keyframe::new(3, vec![rect("r", 100.0, 0.0)])
                    .tween(Tween::Linear, EaseDirection::In)
                    .looping(true),
            ],
        )
        .unwrap();
        let x = xy(&resolve_frame(&layer, 4, Some(u32::MAX)))[0].0;
        assert!(x < 100.0 && x > 99.99, "{x}");
        assert_eq!(vec![(100.0, 0.0)], xy(&resolve_frame(&layer, 3, Some(u32::MAX))));
    }

    #[test]
    fn eased_progress() {
        let layer = Layer::with_keyframes(
            "l",
            vec![
                Keyframe::new(1, vec![rect("r", 0.0, 0.0)]).tween(Tween::Smooth, EaseDirection::In),
                Keyframe::new(11, vec![rect("r", 100.0, 0.0)]),
            ],
        )
        .unwrap();
        assert_eq!(vec![(25.0, 0.0)], xy(&resolve_frame(&layer, 6, None)));
    }

    #[test]
    fn mixed_kinds_hold() {
        let a = rect("x", 0.0, 0.0);
        let b = Object::new("x", Shape::circle(10.0, 10.0, 5.0));
        assert_eq!(a, interpolate_object(&a, &b, 0.5));
    }

    #[test]
    fn style_is_union() {
        let a = rect("r", 0.0, 0.0)
            .with_style("fill", "#000000")
            .with_style("font", "Arial");
        let b = rect("r", 10.0, 0.0)
            .with_style("fill", "#ffffff")
            .with_style("opacity", 0.5);
        let mid = interpolate_object(&a, &b, 0.5);
        assert_eq!(Some(&AttrValue::from("#808080")), mid.style.get("fill"));
        assert_eq!(Some(&AttrValue::from("Arial")), mid.style.get("font"));
        assert_eq!(Some(&AttrValue::Number(0.5)), mid.style.get("opacity"));
        assert_eq!(Some(5.0), mid.shape.number(Attr::X));
    }

    #[test]
    fn text_content_holds_but_size_tweens() {
        let a = Object::new("t", Shape::text(0.0, 0.0, "hello", 10.0));
        let b = Object::new("t", Shape::text(0.0, 0.0, "world", 20.0));
        let mid = interpolate_object(&a, &b, 0.5);
        assert_eq!(Shape::text(0.0, 0.0, "hello", 15.0), mid.shape);
    }

    #[test]
    fn paths_morph() {
        let a = Object::new("p", Shape::path(0.0, 0.0, "M0 0 L30 0"));
        let b = Object::new("p", Shape::path(10.0, 0.0, "M0 30 L30 30"));
        let mid = interpolate_object(&a, &b, 0.5);
        assert_eq!(Shape::path(5.0, 0.0, "M0 15 C10 15 20 15 30 15"), mid.shape);
    }
}
