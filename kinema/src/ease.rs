//! Named easing curves and the in/out/in-out direction wrapper
//!
//! Every base curve maps [0, 1] onto [0, 1] with `f(0) = 0` and `f(1) = 1`. Base curves are
//! "ease in" shaped; [`EaseDirection`] derives the other shapes from them.

use std::f64::consts::PI;
use std::fmt::{self, Display};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// How the frames between two keyframes are filled in
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tween {
    /// Hold the earlier keyframe until the next one
    Discrete,
    #[default]
    Linear,
    /// Quadratic
    Smooth,
    Cubic,
    Exponential,
    Circular,
    Elastic,
    Bounce,
}

impl Tween {
    pub const ALL: [Tween; 8] = [
        Tween::Discrete,
        Tween::Linear,
        Tween::Smooth,
        Tween::Cubic,
        Tween::Exponential,
        Tween::Circular,
        Tween::Elastic,
        Tween::Bounce,
    ];

    /// The un-wrapped curve; `None` for [`Tween::Discrete`] which has no curve
    pub fn base_curve(&self) -> Option<fn(f64) -> f64> {
        let curve: fn(f64) -> f64 = match self {
            Tween::Discrete => return None,
            Tween::Linear => linear,
            Tween::Smooth => smooth,
            Tween::Cubic => cubic,
            Tween::Exponential => exponential,
            Tween::Circular => circular,
            Tween::Elastic => elastic,
            Tween::Bounce => bounce,
        };
        Some(curve)
    }

    /// Eased interpolation parameter for raw progress `t`.
    ///
    /// Discrete always yields 0, the value of the earlier keyframe.
    pub fn ease(&self, direction: EaseDirection, t: f64) -> f64 {
        match self.base_curve() {
            Some(f) => direction.apply(f, t.clamp(0.0, 1.0)),
            None => 0.0,
        }
    }
}

impl FromStr for Tween {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "discrete" => Ok(Tween::Discrete),
            "linear" => Ok(Tween::Linear),
            "smooth" => Ok(Tween::Smooth),
            "cubic" => Ok(Tween::Cubic),
            "exponential" => Ok(Tween::Exponential),
            "circular" => Ok(Tween::Circular),
            "elastic" => Ok(Tween::Elastic),
            "bounce" => Ok(Tween::Bounce),
            _ => Err(()),
        }
    }
}

impl Display for Tween {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Tween::Discrete => "discrete",
            Tween::Linear => "linear",
            Tween::Smooth => "smooth",
            Tween::Cubic => "cubic",
            Tween::Exponential => "exponential",
            Tween::Circular => "circular",
            Tween::Elastic => "elastic",
            Tween::Bounce => "bounce",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EaseDirection {
    In,
    Out,
    #[default]
    InOut,
}

impl EaseDirection {
    pub fn apply(&self, f: impl Fn(f64) -> f64, t: f64) -> f64 {
        match self {
            EaseDirection::In => f(t),
            EaseDirection::Out => 1.0 - f(1.0 - t),
            EaseDirection::InOut => {
                if t < 0.5 {
                    f(2.0 * t) / 2.0
                } else {
                    (2.0 - f(2.0 * (1.0 - t))) / 2.0
                }
            }
        }
    }
}

impl FromStr for EaseDirection {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in" => Ok(EaseDirection::In),
            "out" => Ok(EaseDirection::Out),
            "in-out" => Ok(EaseDirection::InOut),
            _ => Err(()),
        }
    }
}

pub fn linear(t: f64) -> f64 {
    t
}

pub fn smooth(t: f64) -> f64 {
    t * t
}

pub fn cubic(t: f64) -> f64 {
    t * t * t
}

/// `2^(10(t-1))`, pinned to 0 at `t = 0`; not clamped elsewhere, so `f(0+)` is about 0.001
pub fn exponential(t: f64) -> f64 {
    if t == 0.0 {
        0.0
    } else {
        2f64.powf(10.0 * (t - 1.0))
    }
}

pub fn circular(t: f64) -> f64 {
    1.0 - (1.0 - t * t).max(0.0).sqrt()
}

/// Damped sine with a period of 0.3
pub fn elastic(t: f64) -> f64 {
    const FREQUENCY: f64 = 2.0 * PI / 3.0;
    if t == 0.0 {
        0.0
    } else if t == 1.0 {
        1.0
    } else {
        -(2f64.powf(10.0 * t - 10.0)) * ((t * 10.0 - 10.75) * FREQUENCY).sin()
    }
}

/// Four bounces settling at 1
pub fn bounce_out(t: f64) -> f64 {
    const N: f64 = 7.5625;
    const D: f64 = 2.75;
    if t < 1.0 / D {
        N * t * t
    } else if t < 2.0 / D {
        let t = t - 1.5 / D;
        N * t * t + 0.75
    } else if t < 2.5 / D {
        let t = t - 2.25 / D;
        N * t * t + 0.9375
    } else {
        let t = t - 2.625 / D;
        N * t * t + 0.984375
    }
}

pub fn bounce(t: f64) -> f64 {
    1.0 - bounce_out(1.0 - t)
}

#[cfg(test)]
mod tests {
    use super::{bounce, bounce_out, EaseDirection, Tween};

    const TOLERANCE: f64 = 1e-9;

    #[test]
    fn base_curves_pinned_at_ends() {
        for tween in Tween::ALL {
            let Some(f) = tween.base_curve() else {
                continue;
            };
            assert!(f(0.0).abs() < TOLERANCE, "{tween} f(0) = {}", f(0.0));
            assert!((f(1.0) - 1.0).abs() < TOLERANCE, "{tween} f(1) = {}", f(1.0));
        }
    }

    #[test]
    fn directions_pinned_at_ends() {
        for tween in Tween::ALL.into_iter().filter(|t| *t != Tween::Discrete) {
            for direction in [EaseDirection::In, EaseDirection::Out, EaseDirection::InOut] {
                let start = tween.ease(direction, 0.0);
                let end = tween.ease(direction, 1.0);
                assert!(start.abs() < TOLERANCE, "{tween} {direction:?} {start}");
                assert!((end - 1.0).abs() < TOLERANCE, "{tween} {direction:?} {end}");
            }
        }
    }

    #[test]
    fn out_mirrors_in() {
        for tween in Tween::ALL.into_iter().filter(|t| *t != Tween::Discrete) {
            let f = tween.base_curve().unwrap();
            for i in 0..=20 {
                let t = i as f64 / 20.0;
                let out = tween.ease(EaseDirection::Out, t);
                assert!((out - (1.0 - f(1.0 - t))).abs() < TOLERANCE, "{tween} at {t}");
            }
        }
    }

    #[test]
    fn in_out_is_symmetric_and_half_at_middle() {
        for tween in [Tween::Smooth, Tween::Cubic, Tween::Circular] {
            assert!((tween.ease(EaseDirection::InOut, 0.5) - 0.5).abs() < TOLERANCE);
            let early = tween.ease(EaseDirection::InOut, 0.2);
            let late = tween.ease(EaseDirection::InOut, 0.8);
            assert!((early + late - 1.0).abs() < TOLERANCE, "{tween}");
        }
    }

    #[test]
    fn discrete_holds() {
        for t in [0.0, 0.3, 0.99, 1.0] {
            assert_eq!(0.0, Tween::Discrete.ease(EaseDirection::In, t));
        }
    }

    #[test]
    fn known_values() {
        assert_eq!(0.25, Tween::Smooth.ease(EaseDirection::In, 0.5));
        assert_eq!(0.75, Tween::Smooth.ease(EaseDirection::Out, 0.5));
        assert_eq!(0.125, Tween::Cubic.ease(EaseDirection::In, 0.5));
        assert_eq!(2f64.powf(-5.0), Tween::Exponential.ease(EaseDirection::In, 0.5));
        assert_eq!(0.4, Tween::Linear.ease(EaseDirection::InOut, 0.4));
    }

    #[test]
    fn bounce_shape() {
        assert_eq!(0.75, bounce_out(1.5 / 2.75));
        // ease-in bounce is the mirrored ease-out bounce
        assert!((1.0 - bounce_out(0.7) - bounce(0.3)).abs() < TOLERANCE);
    }

    #[test]
    fn input_is_clamped() {
        assert_eq!(1.0, Tween::Linear.ease(EaseDirection::In, 1.5));
        assert_eq!(0.0, Tween::Cubic.ease(EaseDirection::In, -0.5));
    }

    #[test]
    fn names_round_trip() {
        for tween in Tween::ALL {
            assert_eq!(Ok(tween), tween.to_string().parse());
        }
        assert_eq!(Ok(EaseDirection::InOut), "in-out".parse());
        assert!("sproing".parse::<Tween>().is_err());
    }
}
