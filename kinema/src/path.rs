//! Path command strings to and from a uniform list of absolute cubic segments
//!
//! Every drawing command (line, horizontal, vertical, quadratic, smooth variants, elliptical arc)
//! is converted to one or more [`CubicBez`] so that morphing and bounding can treat a path as a
//! flat run of cubics.

use std::f64::consts::{FRAC_PI_2, PI};
use std::sync::OnceLock;

use kurbo::{CubicBez, ParamCurveExtrema, Point, Rect, Vec2};
use regex::Regex;

use crate::error::PathError;

/// Decimal places kept when writing coordinates back out
const PRECISION: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token<'a> {
    Command(char),
    Number(&'a str),
}

struct Tokens<'a> {
    tokens: Vec<(usize, Token<'a>)>,
    idx: usize,
}

impl<'a> Tokens<'a> {
    fn new(d: &'a str) -> Result<Self, PathError> {
        static TOKEN: OnceLock<Regex> = OnceLock::new();
        let token = TOKEN.get_or_init(|| {
            Regex::new(r"[MmLlHhVvCcSsQqTtAaZz]|[-+]?(?:\d+\.?\d*|\.\d+)(?:[eE][-+]?\d+)?|[^\s,]")
                .unwrap()
        });

        let tokens = token
            .find_iter(d)
            .map(|m| {
                let s = m.as_str();
                let first = s.chars().next().unwrap_or_default();
                if s.len() == 1 && "MmLlHhVvCcSsQqTtAaZz".contains(first) {
                    Ok((m.start(), Token::Command(first)))
                } else if first.is_ascii_digit() || matches!(first, '-' | '+' | '.') {
                    Ok((m.start(), Token::Number(s)))
                } else {
                    Err(PathError::UnexpectedToken(s.to_string(), m.start()))
                }
            })
            .collect::<Result<_, _>>()?;
        Ok(Self { tokens, idx: 0 })
    }

    fn next_command(&mut self) -> Result<Option<char>, PathError> {
        let Some((pos, token)) = self.tokens.get(self.idx) else {
            return Ok(None);
        };
        self.idx += 1;
        match token {
            Token::Command(c) => Ok(Some(*c)),
            Token::Number(n) => Err(PathError::UnexpectedToken(n.to_string(), *pos)),
        }
    }

    fn at_number(&self) -> bool {
        matches!(self.tokens.get(self.idx), Some((_, Token::Number(..))))
    }

    fn number(&mut self, cmd: char) -> Result<f64, PathError> {
        let Some((_, Token::Number(n))) = self.tokens.get(self.idx) else {
            return Err(PathError::MissingArguments(cmd));
        };
        self.idx += 1;
        Ok(n.parse::<f64>()?)
    }

    fn point(&mut self, cmd: char) -> Result<Point, PathError> {
        Ok(Point::new(self.number(cmd)?, self.number(cmd)?))
    }

    /// Arc flags may be packed against what follows, e.g. `a10 10 0 0110 10`
    fn flag(&mut self, cmd: char) -> Result<bool, PathError> {
        let Some((pos, Token::Number(n))) = self.tokens.get(self.idx).copied() else {
            return Err(PathError::MissingArguments(cmd));
        };
        let flag = match n.as_bytes().first() {
            Some(b'0') => false,
            Some(b'1') => true,
            _ => return Err(PathError::UnexpectedToken(n.to_string(), pos)),
        };
        if n.len() > 1 {
            self.tokens[self.idx] = (pos + 1, Token::Number(&n[1..]));
        } else {
            self.idx += 1;
        }
        Ok(flag)
    }
}

/// A cubic that traces the straight line from `from` to `to`
pub fn line_cubic(from: Point, to: Point) -> CubicBez {
    CubicBez::new(from, from.lerp(to, 1.0 / 3.0), from.lerp(to, 2.0 / 3.0), to)
}

/// Degree elevation of a quadratic with control point `ctrl`
fn quad_cubic(from: Point, ctrl: Point, to: Point) -> CubicBez {
    CubicBez::new(
        from,
        from + (ctrl - from) * (2.0 / 3.0),
        to + (ctrl - to) * (2.0 / 3.0),
        to,
    )
}

/// Angle between two vectors, signed by the direction of rotation from `u` to `v`
fn vector_angle(u: Vec2, v: Vec2) -> f64 {
    u.cross(v).atan2(u.dot(v))
}

/// Approximates an elliptical arc (endpoint parameterization) with cubics spanning at most 90° each
#[allow(clippy::too_many_arguments)]
pub fn arc_cubics(
    from: Point,
    rx: f64,
    ry: f64,
    x_axis_rotation: f64,
    large_arc: bool,
    sweep: bool,
    to: Point,
) -> Vec<CubicBez> {
    if from == to {
        return Vec::new();
    }
    let (mut rx, mut ry) = (rx.abs(), ry.abs());
    if rx == 0.0 || ry == 0.0 {
        return vec![line_cubic(from, to)];
    }

    let (sin_phi, cos_phi) = x_axis_rotation.to_radians().sin_cos();
    let half = (from - to) / 2.0;
    let x1p = cos_phi * half.x + sin_phi * half.y;
    let y1p = -sin_phi * half.x + cos_phi * half.y;

    // Scale up radii that cannot span the endpoints
    let lambda = (x1p * x1p) / (rx * rx) + (y1p * y1p) / (ry * ry);
    if lambda > 1.0 {
        rx *= lambda.sqrt();
        ry *= lambda.sqrt();
    }

    let num = rx * rx * ry * ry - rx * rx * y1p * y1p - ry * ry * x1p * x1p;
    let den = rx * rx * y1p * y1p + ry * ry * x1p * x1p;
    let mut coef = (num / den).max(0.0).sqrt();
    if large_arc == sweep {
        coef = -coef;
    }
    let cxp = coef * rx * y1p / ry;
    let cyp = -coef * ry * x1p / rx;
    let mid = from.midpoint(to);
    let center = Point::new(
        cos_phi * cxp - sin_phi * cyp + mid.x,
        sin_phi * cxp + cos_phi * cyp + mid.y,
    );

    let start_vec = Vec2::new((x1p - cxp) / rx, (y1p - cyp) / ry);
    let end_vec = Vec2::new((-x1p - cxp) / rx, (-y1p - cyp) / ry);
    let theta1 = vector_angle(Vec2::new(1.0, 0.0), start_vec);
    let mut sweep_angle = vector_angle(start_vec, end_vec);
    if !sweep && sweep_angle > 0.0 {
        sweep_angle -= 2.0 * PI;
    } else if sweep && sweep_angle < 0.0 {
        sweep_angle += 2.0 * PI;
    }

    // Tolerance keeps an exact half turn from becoming three pieces
    let pieces = ((sweep_angle.abs() / FRAC_PI_2) - 1e-9).ceil().max(1.0) as usize;
    let step = sweep_angle / pieces as f64;
    let k = 4.0 / 3.0 * (step / 4.0).tan();

    let on_ellipse = |x: f64, y: f64| {
        Point::new(
            center.x + rx * x * cos_phi - ry * y * sin_phi,
            center.y + rx * x * sin_phi + ry * y * cos_phi,
        )
    };

    let mut cubics = Vec::with_capacity(pieces);
    let mut p0 = from;
    for i in 0..pieces {
        let a1 = theta1 + step * i as f64;
        let a2 = a1 + step;
        let (s1, c1) = a1.sin_cos();
        let (s2, c2) = a2.sin_cos();
        let p3 = if i + 1 == pieces {
            to
        } else {
            on_ellipse(c2, s2)
        };
        cubics.push(CubicBez::new(
            p0,
            on_ellipse(c1 - k * s1, s1 + k * c1),
            on_ellipse(c2 + k * s2, s2 - k * c2),
            p3,
        ));
        p0 = p3;
    }
    cubics
}

#[derive(Default)]
struct PathBuilder {
    segments: Vec<CubicBez>,
    current: Point,
    subpath_start: Point,
    /// Second control point of the previous segment when it came from a cubic command
    last_cubic_ctrl: Option<Point>,
    /// Control point of the previous segment when it came from a quadratic command
    last_quad_ctrl: Option<Point>,
}

impl PathBuilder {
    fn resolve(&self, relative: bool, p: Point) -> Point {
        if relative {
            self.current + p.to_vec2()
        } else {
            p
        }
    }

    fn push(&mut self, segment: CubicBez) {
        self.current = segment.p3;
        self.segments.push(segment);
    }

    fn move_to(&mut self, p: Point) {
        self.current = p;
        self.subpath_start = p;
        self.clear_ctrl();
    }

    fn line_to(&mut self, p: Point) {
        self.push(line_cubic(self.current, p));
        self.clear_ctrl();
    }

    fn cubic_to(&mut self, c1: Point, c2: Point, p: Point) {
        self.push(CubicBez::new(self.current, c1, c2, p));
        self.last_cubic_ctrl = Some(c2);
        self.last_quad_ctrl = None;
    }

    fn quad_to(&mut self, ctrl: Point, p: Point) {
        self.push(quad_cubic(self.current, ctrl, p));
        self.last_cubic_ctrl = None;
        self.last_quad_ctrl = Some(ctrl);
    }

    fn reflect(&self, ctrl: Option<Point>) -> Point {
        match ctrl {
            Some(c) => self.current + (self.current - c),
            None => self.current,
        }
    }

    fn close(&mut self) {
        if self.current != self.subpath_start {
            self.push(line_cubic(self.current, self.subpath_start));
        }
        self.current = self.subpath_start;
        self.clear_ctrl();
    }

    fn clear_ctrl(&mut self) {
        self.last_cubic_ctrl = None;
        self.last_quad_ctrl = None;
    }
}

/// Parses a path command string into absolute cubic segments.
///
/// A closed subpath gets an explicit trailing line back to its start unless it already ends there.
pub fn parse_path(d: &str) -> Result<Vec<CubicBez>, PathError> {
    let mut tokens = Tokens::new(d)?;
    let mut builder = PathBuilder::default();
    let mut first = true;

    while let Some(cmd) = tokens.next_command()? {
        if first && !matches!(cmd, 'M' | 'm') {
            return Err(PathError::MustStartWithMove(cmd));
        }
        first = false;
        let relative = cmd.is_ascii_lowercase();

        if matches!(cmd, 'Z' | 'z') {
            builder.close();
            continue;
        }
        if !tokens.at_number() {
            return Err(PathError::MissingArguments(cmd));
        }

        let mut repeat = 0;
        while tokens.at_number() {
            match cmd.to_ascii_uppercase() {
                'M' => {
                    let p = builder.resolve(relative, tokens.point(cmd)?);
                    // Pairs after the first are implicit lines
                    if repeat == 0 {
                        builder.move_to(p);
                    } else {
                        builder.line_to(p);
                    }
                }
                'L' => {
                    let p = builder.resolve(relative, tokens.point(cmd)?);
                    builder.line_to(p);
                }
                'H' => {
                    let x = tokens.number(cmd)?;
                    let x = if relative { builder.current.x + x } else { x };
                    builder.line_to(Point::new(x, builder.current.y));
                }
                'V' => {
                    let y = tokens.number(cmd)?;
                    let y = if relative { builder.current.y + y } else { y };
                    builder.line_to(Point::new(builder.current.x, y));
                }
                'C' => {
                    let c1 = builder.resolve(relative, tokens.point(cmd)?);
                    let c2 = builder.resolve(relative, tokens.point(cmd)?);
                    let p = builder.resolve(relative, tokens.point(cmd)?);
                    builder.cubic_to(c1, c2, p);
                }
                'S' => {
                    let c1 = builder.reflect(builder.last_cubic_ctrl);
                    let c2 = builder.resolve(relative, tokens.point(cmd)?);
                    let p = builder.resolve(relative, tokens.point(cmd)?);
                    builder.cubic_to(c1, c2, p);
                }
                'Q' => {
                    let ctrl = builder.resolve(relative, tokens.point(cmd)?);
                    let p = builder.resolve(relative, tokens.point(cmd)?);
                    builder.quad_to(ctrl, p);
                }
                'T' => {
                    let ctrl = builder.reflect(builder.last_quad_ctrl);
                    let p = builder.resolve(relative, tokens.point(cmd)?);
                    builder.quad_to(ctrl, p);
                }
                'A' => {
                    let rx = tokens.number(cmd)?;
                    let ry = tokens.number(cmd)?;
                    let rotation = tokens.number(cmd)?;
                    let large_arc = tokens.flag(cmd)?;
                    let sweep = tokens.flag(cmd)?;
                    let p = builder.resolve(relative, tokens.point(cmd)?);
                    let from = builder.current;
                    for cubic in arc_cubics(from, rx, ry, rotation, large_arc, sweep, p) {
                        builder.push(cubic);
                    }
                    builder.current = p;
                    builder.clear_ctrl();
                }
                _ => unreachable!("tokenizer only yields path commands"),
            }
            repeat += 1;
        }
    }

    if first {
        return Err(PathError::Empty);
    }
    Ok(builder.segments)
}

/// Normalizes a path command string, treating anything unreadable as "no shape".
pub fn normalize_path(d: &str) -> Vec<CubicBez> {
    parse_path(d).unwrap_or_else(|e| {
        log::debug!("Treating path {d:?} as empty: {e}");
        Vec::new()
    })
}

/// The tight box around a run of segments, `None` if there are none.
pub fn segments_bounds(segments: &[CubicBez]) -> Option<Rect> {
    segments
        .iter()
        .map(|c| c.bounding_box())
        .reduce(|acc, e| acc.union(e))
}

/// The intrinsic box of a path command string, `None` if it draws nothing.
pub fn path_bounds(d: &str) -> Option<Rect> {
    segments_bounds(&normalize_path(d))
}

fn fmt_coord(v: f64) -> String {
    let rounded = (v * PRECISION).round() / PRECISION;
    if rounded == 0.0 {
        // no "-0"
        "0".to_string()
    } else {
        format!("{rounded}")
    }
}

/// Writes segments as one move followed by one cubic command per segment.
pub fn to_path_string(segments: &[CubicBez]) -> String {
    let Some(first) = segments.first() else {
        return String::new();
    };
    let mut d = format!("M{} {}", fmt_coord(first.p0.x), fmt_coord(first.p0.y));
    for c in segments {
        d.push_str(&format!(
            " C{} {} {} {} {} {}",
            fmt_coord(c.p1.x),
            fmt_coord(c.p1.y),
            fmt_coord(c.p2.x),
            fmt_coord(c.p2.y),
            fmt_coord(c.p3.x),
            fmt_coord(c.p3.y)
        ));
    }
    d
}
