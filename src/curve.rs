//! Bezier curve primitives, their bounds, ray crossings and intersections

use crate::{
    ArrayIter, PathError, Point, Rect, Scalar, Shape, Transform, EPSILON, POINT_TOLERANCE, clamp,
    quadratic_solve,
};
use std::{fmt, str::FromStr};

pub type CurveExtremities = ArrayIter<[Option<Scalar>; 6]>;

/// Maximum subdivision depth used while counting ray crossings of a curve.
/// Deeper than that curve is treated as a line between its end points.
pub const CROSSINGS_MAX_DEPTH: usize = 52;

/// Curve is considered a line if its control points are closer than
/// `sqrt(LINE_TOLERANCE_SQ)` to the line between its end points.
pub const LINE_TOLERANCE_SQ: Scalar = 0.01;

/// Subdivision limit for intersection and distance search
const SEARCH_MAX_DEPTH: usize = 32;

/// Set of operations common to all bezier curves.
pub trait Curve: Sized + Into<Segment> {
    /// Convert curve to an iterator over line segments with desired flatness
    fn flatten(&self, tr: Transform, flatness: Scalar) -> CurveFlattenIter {
        CurveFlattenIter::new(self.transform(tr), flatness)
    }

    /// Correspond to maximum deviation of the curve from the straight line
    /// `f = max |curve(t) - line(curve_start, curve_end)(t)|`. This function
    /// actually returns `16.0 * f^2` to avoid unneeded division and square root.
    fn flatness(&self) -> Scalar;

    /// Apply affine transformation to the curve
    fn transform(&self, tr: Transform) -> Self;

    /// Point at which curve starts
    fn start(&self) -> Point;

    /// Point at which curve ends
    fn end(&self) -> Point;

    /// Evaluate curve at parameter value `t` in (0.0..=1.0)
    fn at(&self, t: Scalar) -> Point;

    /// Optimized version of `Curve::split_at(0.5)`
    fn split(&self) -> (Self, Self) {
        self.split_at(0.5)
    }

    /// Split the curve at parameter value `t`
    fn split_at(&self, t: Scalar) -> (Self, Self);

    /// Extend provided `init` rectangle with the bounding box of the curve
    fn bbox(&self, init: Option<Rect>) -> Rect;

    /// Identical curve but directed from end to start, instead of start to end.
    fn reverse(&self) -> Self;

    /// Find all extremities of the curve `curve'(t)_x = 0 || curve'(t)_y = 0`
    fn extremities(&self) -> CurveExtremities;

    /// Signed number of crossings between the curve and the ray going from
    /// `(px, py)` in the direction of positive x. Downward (increasing y)
    /// crossings count as `+1` and upward as `-1`.
    fn crossings(&self, px: Scalar, py: Scalar) -> i32;
}

pub struct CurveFlattenIter {
    flatness: Scalar,
    stack: Vec<Segment>,
}

impl CurveFlattenIter {
    pub fn new(segment: impl Into<Segment>, flatness: Scalar) -> Self {
        Self {
            flatness: 16.0 * flatness * flatness,
            stack: vec![segment.into()],
        }
    }
}

impl Iterator for CurveFlattenIter {
    type Item = Line;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let segment = self.stack.pop()?;
            if segment.flatness() < self.flatness {
                return Some(Line([segment.start(), segment.end()]));
            }
            let (s0, s1) = segment.split();
            self.stack.push(s1);
            self.stack.push(s0);
        }
    }
}

/// Extend `init` (if any) with the rectangle spanning `p0` and `p1`
fn bbox_init(p0: Point, p1: Point, init: Option<Rect>) -> Rect {
    let mut bbox = Rect::from_points(p0, p1);
    if let Some(init) = init {
        bbox.add_rect(&init);
    }
    bbox
}

/// Squared distance from `p` to the line segment `p0 -> p1`
fn line_distance_sq(p0: Point, p1: Point, p: Point) -> Scalar {
    let dir = p1 - p0;
    let len_sq = dir.dot(dir);
    let t = if len_sq < EPSILON {
        0.0
    } else {
        clamp((p - p0).dot(dir) / len_sq, 0.0, 1.0)
    };
    p.dist_sq(p0 + t * dir)
}

/// Crossings of the ray from `(px, py)` with the line `(x0, y0) -> (x1, y1)`
///
/// Horizontal position is half-open: points exactly at the line start counted
/// as below it, exactly at the end as above. This makes vertices shared by two
/// lines of the same path counted exactly once.
pub fn line_crossings(p0: Point, p1: Point, px: Scalar, py: Scalar) -> i32 {
    let Point([x0, y0]) = p0;
    let Point([x1, y1]) = p1;
    if (py < y0 && py < y1) || (py >= y0 && py >= y1) || (px >= x0 && px >= x1) {
        return 0;
    }
    let dir = if y0 < y1 { 1 } else { -1 };
    if px < x0 && px < x1 {
        return dir;
    }
    let xint = x0 + (py - y0) * (x1 - x0) / (y1 - y0);
    if px >= xint { 0 } else { dir }
}

/// Crossings for quadratic and cubic curves by recursive subdivision
fn curve_crossings(segment: Segment, px: Scalar, py: Scalar, level: usize) -> i32 {
    let points = segment.points();
    if points.iter().all(|p| py < p.y())
        || points.iter().all(|p| py >= p.y())
        || points.iter().all(|p| px >= p.x())
    {
        return 0;
    }
    let (start, end) = (segment.start(), segment.end());
    if points.iter().all(|p| px < p.x()) {
        // curve lies completely to the right, only its end points matter
        return if py >= start.y() && py < end.y() {
            1
        } else if py < start.y() && py >= end.y() {
            -1
        } else {
            0
        };
    }
    if level > CROSSINGS_MAX_DEPTH {
        return line_crossings(start, end, px, py);
    }
    let (s0, s1) = segment.split();
    if s0.end().is_nan() {
        return 0;
    }
    curve_crossings(s0, px, py, level + 1) + curve_crossings(s1, px, py, level + 1)
}

// -----------------------------------------------------------------------------
// Line
// -----------------------------------------------------------------------------

/// Line segment curve
#[derive(Clone, Copy, PartialEq)]
pub struct Line(pub [Point; 2]);

impl fmt::Debug for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Line([p0, p1]) = self;
        write!(f, "Line {:?} {:?}", p0, p1)
    }
}

impl Line {
    pub fn new(p0: impl Into<Point>, p1: impl Into<Point>) -> Self {
        Self([p0.into(), p1.into()])
    }

    /// Length of the line
    pub fn length(&self) -> Scalar {
        let Self([p0, p1]) = self;
        p0.dist(*p1)
    }

    /// Start and end points of the line
    pub fn points(&self) -> [Point; 2] {
        self.0
    }

    /// Find intersection of two lines
    ///
    /// Returns pair of `t` parameters for this line and the other line.
    /// Found by solving `self.at(t0) == other.at(t1)`. Actual intersection of
    /// line segments can be found by making sure that `0.0 <= t0 <= 1.0 && 0.0 <= t1 <= 1.0`.
    /// Parallel and collinear lines have no intersection.
    pub fn intersect(&self, other: Line) -> Option<(Scalar, Scalar)> {
        let Line([Point([x1, y1]), Point([x2, y2])]) = *self;
        let Line([Point([x3, y3]), Point([x4, y4])]) = other;
        let det = (x4 - x3) * (y1 - y2) - (x1 - x2) * (y4 - y3);
        if det.abs() < EPSILON {
            return None;
        }
        let t0 = ((y3 - y4) * (x1 - x3) + (x4 - x3) * (y1 - y3)) / det;
        let t1 = ((y1 - y2) * (x1 - x3) + (x2 - x1) * (y1 - y3)) / det;
        Some((t0, t1))
    }

    /// Find intersection parameters of two line segments, end points included
    pub fn intersect_segment(&self, other: Line) -> Option<(Scalar, Scalar)> {
        const SLACK: Scalar = 1e-9;
        let (t0, t1) = self.intersect(other)?;
        let range = -SLACK..=1.0 + SLACK;
        if range.contains(&t0) && range.contains(&t1) {
            Some((clamp(t0, 0.0, 1.0), clamp(t1, 0.0, 1.0)))
        } else {
            None
        }
    }

    /// Parameter of the projection of `point` onto the line
    pub fn project(&self, point: Point) -> Option<Scalar> {
        let dir = self.direction();
        let len_sq = dir.dot(dir);
        if len_sq < EPSILON {
            return None;
        }
        Some((point - self.start()).dot(dir) / len_sq)
    }

    /// End points of the overlap of two collinear line segments
    ///
    /// Every end point of either line lying on the other line is reported as
    /// a pair of parameters, same as `intersect_segment` does. Lines farther
    /// apart than `POINT_TOLERANCE` are not collinear and have no overlap.
    pub fn overlap(self, other: Line) -> impl Iterator<Item = (Scalar, Scalar)> {
        const SLACK: Scalar = 1e-9;
        let dir = self.direction();
        let length = dir.length();
        let collinear = length > EPSILON
            && [other.start(), other.end()]
                .into_iter()
                .all(|p| (dir.cross(p - self.start()) / length).abs() < POINT_TOLERANCE);
        let candidates = [
            other.project(self.start()).map(|t1| (0.0, t1)),
            other.project(self.end()).map(|t1| (1.0, t1)),
            self.project(other.start()).map(|t0| (t0, 0.0)),
            self.project(other.end()).map(|t0| (t0, 1.0)),
        ];
        let range = -SLACK..=1.0 + SLACK;
        candidates
            .into_iter()
            .flatten()
            .filter(move |(t0, t1)| collinear && range.contains(t0) && range.contains(t1))
            .map(|(t0, t1)| (clamp(t0, 0.0, 1.0), clamp(t1, 0.0, 1.0)))
    }

    /// Find intersection point between two line segments
    pub fn intersect_point(&self, other: Line) -> Option<Point> {
        let (t0, _) = self.intersect_segment(other)?;
        Some(self.at(t0))
    }

    /// Direction vector associated with the line segment
    pub fn direction(&self) -> Point {
        self.end() - self.start()
    }
}

impl Curve for Line {
    fn flatness(&self) -> Scalar {
        0.0
    }

    fn transform(&self, tr: Transform) -> Self {
        let Line([p0, p1]) = self;
        Self([tr.apply(*p0), tr.apply(*p1)])
    }

    fn start(&self) -> Point {
        self.0[0]
    }

    fn end(&self) -> Point {
        self.0[1]
    }

    fn at(&self, t: Scalar) -> Point {
        let Self([p0, p1]) = *self;
        (1.0 - t) * p0 + t * p1
    }

    fn split_at(&self, t: Scalar) -> (Self, Self) {
        let Self([p0, p1]) = *self;
        let mid = self.at(t);
        (Self([p0, mid]), Self([mid, p1]))
    }

    fn bbox(&self, init: Option<Rect>) -> Rect {
        let Self([p0, p1]) = *self;
        bbox_init(p0, p1, init)
    }

    fn reverse(&self) -> Self {
        let Self([p0, p1]) = *self;
        Self([p1, p0])
    }

    fn extremities(&self) -> CurveExtremities {
        CurveExtremities::new()
    }

    fn crossings(&self, px: Scalar, py: Scalar) -> i32 {
        let Self([p0, p1]) = *self;
        line_crossings(p0, p1, px, py)
    }
}

// -----------------------------------------------------------------------------
// Quadratic bezier curve
// -----------------------------------------------------------------------------

/// Quadratic bezier curve
///
/// Polynomial form:
/// `(1 - t) ^ 2 * p0 + 2 * (1 - t) * t * p1 + t ^ 2 * p2`
#[derive(Clone, Copy, PartialEq)]
pub struct Quad(pub [Point; 3]);

impl fmt::Debug for Quad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Quad([p0, p1, p2]) = self;
        write!(f, "Quad {:?} {:?} {:?}", p0, p1, p2)
    }
}

impl Quad {
    pub fn new(p0: impl Into<Point>, p1: impl Into<Point>, p2: impl Into<Point>) -> Self {
        Self([p0.into(), p1.into(), p2.into()])
    }

    pub fn points(&self) -> [Point; 3] {
        self.0
    }

    /// Reflection of the control point used by SVG smooth commands
    pub fn smooth(&self) -> Point {
        let Quad([_p0, p1, p2]) = *self;
        2.0 * p2 - p1
    }
}

impl Curve for Quad {
    /// Flatness criteria for the quadratic curve
    ///
    /// It is equal to `f = max d(t) where d(t) = |q(t) - l(t)|, l(t) = (1 - t) * p0 + t * p2`
    /// for q(t) bezier2 curve with p{0..2} control points, which reduces to
    /// `f^2 = 1/16 |2 * p1 - p0 - p2|^2`.
    fn flatness(&self) -> Scalar {
        let Self([p0, p1, p2]) = *self;
        let Point([x, y]) = 2.0 * p1 - p0 - p2;
        x * x + y * y
    }

    fn transform(&self, tr: Transform) -> Self {
        let Quad([p0, p1, p2]) = self;
        Self([tr.apply(*p0), tr.apply(*p1), tr.apply(*p2)])
    }

    fn start(&self) -> Point {
        self.0[0]
    }

    fn end(&self) -> Point {
        self.0[2]
    }

    fn at(&self, t: Scalar) -> Point {
        let Self([p0, p1, p2]) = *self;
        let (t1, t_1) = (t, 1.0 - t);
        let (t2, t_2) = (t1 * t1, t_1 * t_1);
        t_2 * p0 + 2.0 * t1 * t_1 * p1 + t2 * p2
    }

    /// Optimized version of `split_at(0.5)`
    fn split(&self) -> (Self, Self) {
        let Self([p0, p1, p2]) = *self;
        let mid = 0.25 * (p0 + 2.0 * p1 + p2);
        (
            Self([p0, 0.5 * (p0 + p1), mid]),
            Self([mid, 0.5 * (p1 + p2), p2]),
        )
    }

    fn split_at(&self, t: Scalar) -> (Self, Self) {
        // de Casteljau
        let Self([p0, p1, p2]) = *self;
        let t_1 = 1.0 - t;
        let c0 = t_1 * p0 + t * p1;
        let c1 = t_1 * p1 + t * p2;
        let mid = t_1 * c0 + t * c1;
        (Self([p0, c0, mid]), Self([mid, c1, p2]))
    }

    fn bbox(&self, init: Option<Rect>) -> Rect {
        let Self([p0, p1, p2]) = *self;
        let mut bbox = bbox_init(p0, p2, init);
        if bbox.covers(p1.x(), p1.y()) {
            return bbox;
        }
        for t in self.extremities() {
            let Point([x, y]) = self.at(t);
            bbox.add(x, y);
        }
        bbox
    }

    fn reverse(&self) -> Self {
        let Self([p0, p1, p2]) = *self;
        Self([p2, p1, p0])
    }

    fn extremities(&self) -> CurveExtremities {
        let mut result = CurveExtremities::new();
        let Self([p0, p1, p2]) = *self;
        let Point([a0, a1]) = p2 - 2.0 * p1 + p0;
        let Point([b0, b1]) = p1 - p0;
        // curve'(t)_x = 0
        if a0.abs() > EPSILON {
            let t0 = -b0 / a0;
            if t0 > 0.0 && t0 < 1.0 {
                result.push(t0)
            }
        }
        // curve'(t)_y = 0
        if a1.abs() > EPSILON {
            let t1 = -b1 / a1;
            if t1 > 0.0 && t1 < 1.0 {
                result.push(t1)
            }
        }
        result
    }

    fn crossings(&self, px: Scalar, py: Scalar) -> i32 {
        curve_crossings((*self).into(), px, py, 0)
    }
}

// -----------------------------------------------------------------------------
// Cubic bezier curve
// -----------------------------------------------------------------------------

/// Cubic bezier curve
///
/// Polynomial form:
/// `(1 - t) ^ 3 * p0 + 3 * (1 - t) ^ 2 * t * p1 + 3 * (1 - t) * t ^ 2 * p2 + t ^ 3 * p3`
#[derive(Clone, Copy, PartialEq)]
pub struct Cubic(pub [Point; 4]);

impl fmt::Debug for Cubic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Cubic([p0, p1, p2, p3]) = self;
        write!(f, "Cubic {:?} {:?} {:?} {:?}", p0, p1, p2, p3)
    }
}

impl Cubic {
    pub fn new(
        p0: impl Into<Point>,
        p1: impl Into<Point>,
        p2: impl Into<Point>,
        p3: impl Into<Point>,
    ) -> Self {
        Self([p0.into(), p1.into(), p2.into(), p3.into()])
    }

    pub fn points(&self) -> [Point; 4] {
        self.0
    }

    /// Reflection of the second control point used by SVG smooth commands
    pub fn smooth(&self) -> Point {
        let Cubic([_p0, _p1, p2, p3]) = *self;
        2.0 * p3 - p2
    }
}

impl Curve for Cubic {
    /// Flatness criteria for the cubic curve
    /// This function actually returns `16 * flatness^2`
    ///
    /// Upper bound `f^2 <= 1/16 (max{u_x^2, v_x^2} + max{u_y^2, v_y^2})` where
    /// `u = 3 * b1 - 2 * b0 - b3` and `v = 3 * b2 - b0 - 2 * b3`.
    ///
    /// [Linear Approximation of Bezier Curve](https://hcklbrrfnn.files.wordpress.com/2012/08/bez.pdf)
    fn flatness(&self) -> Scalar {
        let Self([p0, p1, p2, p3]) = *self;
        let u = 3.0 * p1 - 2.0 * p0 - p3;
        let v = 3.0 * p2 - p0 - 2.0 * p3;
        (u.x() * u.x()).max(v.x() * v.x()) + (u.y() * u.y()).max(v.y() * v.y())
    }

    fn transform(&self, tr: Transform) -> Self {
        let Cubic([p0, p1, p2, p3]) = self;
        Self([tr.apply(*p0), tr.apply(*p1), tr.apply(*p2), tr.apply(*p3)])
    }

    fn start(&self) -> Point {
        self.0[0]
    }

    fn end(&self) -> Point {
        self.0[3]
    }

    fn at(&self, t: Scalar) -> Point {
        let Self([p0, p1, p2, p3]) = *self;
        let (t1, t_1) = (t, 1.0 - t);
        let (t2, t_2) = (t1 * t1, t_1 * t_1);
        let (t3, t_3) = (t2 * t1, t_2 * t_1);
        t_3 * p0 + 3.0 * t1 * t_2 * p1 + 3.0 * t2 * t_1 * p2 + t3 * p3
    }

    /// Optimized version of `split_at(0.5)`
    fn split(&self) -> (Self, Self) {
        let Self([p0, p1, p2, p3]) = *self;
        let mid = 0.125 * p0 + 0.375 * p1 + 0.375 * p2 + 0.125 * p3;
        let c0 = Self([
            p0,
            0.5 * p0 + 0.5 * p1,
            0.25 * p0 + 0.5 * p1 + 0.25 * p2,
            mid,
        ]);
        let c1 = Self([
            mid,
            0.25 * p1 + 0.5 * p2 + 0.25 * p3,
            0.5 * p2 + 0.5 * p3,
            p3,
        ]);
        (c0, c1)
    }

    fn split_at(&self, t: Scalar) -> (Self, Self) {
        // de Casteljau
        let Self([p0, p1, p2, p3]) = *self;
        let t_1 = 1.0 - t;
        let a0 = t_1 * p0 + t * p1;
        let a1 = t_1 * p1 + t * p2;
        let a2 = t_1 * p2 + t * p3;
        let b0 = t_1 * a0 + t * a1;
        let b1 = t_1 * a1 + t * a2;
        let mid = t_1 * b0 + t * b1;
        (Self([p0, a0, b0, mid]), Self([mid, b1, a2, p3]))
    }

    fn bbox(&self, init: Option<Rect>) -> Rect {
        let Self([p0, p1, p2, p3]) = *self;
        let mut bbox = bbox_init(p0, p3, init);
        if bbox.covers(p1.x(), p1.y()) && bbox.covers(p2.x(), p2.y()) {
            return bbox;
        }
        for t in self.extremities() {
            let Point([x, y]) = self.at(t);
            bbox.add(x, y);
        }
        bbox
    }

    fn reverse(&self) -> Self {
        let Self([p0, p1, p2, p3]) = *self;
        Self([p3, p2, p1, p0])
    }

    fn extremities(&self) -> CurveExtremities {
        let Self([p0, p1, p2, p3]) = *self;
        let Point([a0, a1]) = -1.0 * p0 + 3.0 * p1 - 3.0 * p2 + p3;
        let Point([b0, b1]) = 2.0 * p0 - 4.0 * p1 + 2.0 * p2;
        let Point([c0, c1]) = p1 - p0;

        // Solve for `curve'(t)_x = 0 || curve'(t)_y = 0`, NaN never passes the filter
        quadratic_solve(a0, b0, c0)
            .chain(quadratic_solve(a1, b1, c1))
            .filter(|t| *t > 0.0 && *t < 1.0)
            .collect::<CurveExtremities>()
    }

    fn crossings(&self, px: Scalar, py: Scalar) -> i32 {
        curve_crossings((*self).into(), px, py, 0)
    }
}

impl From<Quad> for Cubic {
    fn from(quad: Quad) -> Self {
        let Quad([p0, p1, p2]) = quad;
        Self([
            p0,
            (1.0 / 3.0) * p0 + (2.0 / 3.0) * p1,
            (2.0 / 3.0) * p1 + (1.0 / 3.0) * p2,
            p2,
        ])
    }
}

impl FromStr for Cubic {
    type Err = PathError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let segment = Segment::from_str(text)?;
        segment.to_cubic().ok_or_else(|| PathError::Conversion {
            reason: "first element of the path is not a cubic".to_string(),
        })
    }
}

// -----------------------------------------------------------------------------
// Segment
// -----------------------------------------------------------------------------

/// Parameters of an intersection point on the first (`h0`) and the second (`h1`) segment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegHit {
    pub h0: Scalar,
    pub h1: Scalar,
}

impl SegHit {
    fn swap(self) -> Self {
        Self {
            h0: self.h1,
            h1: self.h0,
        }
    }
}

/// `Segment` is an enum of either `Line`, `Quad` or `Cubic`
#[derive(Clone, Copy, PartialEq)]
pub enum Segment {
    Line(Line),
    Quad(Quad),
    Cubic(Cubic),
}

impl Segment {
    /// Control points of the segment, including end points
    pub fn points(&self) -> &[Point] {
        match self {
            Segment::Line(Line(points)) => points,
            Segment::Quad(Quad(points)) => points,
            Segment::Cubic(Cubic(points)) => points,
        }
    }

    /// Mutable access to control points, used to snap end points
    pub fn points_mut(&mut self) -> &mut [Point] {
        match self {
            Segment::Line(Line(points)) => points,
            Segment::Quad(Quad(points)) => points,
            Segment::Cubic(Cubic(points)) => points,
        }
    }

    /// Line connecting end points of the segment
    pub fn chord(&self) -> Line {
        Line([self.start(), self.end()])
    }

    /// Whether all control points are close enough to the chord
    pub fn is_line(&self) -> bool {
        match self {
            Segment::Line(_) => true,
            _ => {
                let (start, end) = (self.start(), self.end());
                let points = self.points();
                points[1..points.len() - 1]
                    .iter()
                    .all(|p| line_distance_sq(start, end, *p) < LINE_TOLERANCE_SQ)
            }
        }
    }

    /// Whether point at `t` is farther than `POINT_TOLERANCE` from both end points
    pub fn is_interior(&self, t: Scalar) -> bool {
        if !(t > 0.0 && t < 1.0) {
            return false;
        }
        let point = self.at(t);
        !point.is_near(self.start(), POINT_TOLERANCE)
            && !point.is_near(self.end(), POINT_TOLERANCE)
    }

    /// Split segment at parameter `t`, self becomes `[0, t]` part and `[t, 1]` part is returned
    pub fn split_off(&mut self, t: Scalar) -> Segment {
        let (head, tail) = self.split_at(t);
        *self = head;
        tail
    }

    /// Signed area between the segment and the origin (Green's theorem)
    ///
    /// Summed over a closed outline gives the area it encloses, positive
    /// when the outline goes clockwise with y axis pointing down.
    pub fn signed_area(&self) -> Scalar {
        match *self {
            Segment::Line(Line([p0, p1])) => p0.cross(p1) * 0.5,
            Segment::Quad(Quad([p0, p1, p2])) => {
                (p0.x() * (2.0 * p1.y() + p2.y()) + 2.0 * p1.x() * (p2.y() - p0.y())
                    - p2.x() * (p0.y() + 2.0 * p1.y()))
                    * (1.0 / 6.0)
            }
            Segment::Cubic(Cubic([p0, p1, p2, p3])) => {
                (p0.x() * (6.0 * p1.y() + 3.0 * p2.y() + p3.y())
                    + 3.0
                        * (p1.x() * (-2.0 * p0.y() + p2.y() + p3.y())
                            - p2.x() * (p0.y() + p1.y() - 2.0 * p3.y()))
                    - p3.x() * (p0.y() + 3.0 * p1.y() + 6.0 * p2.y()))
                    * (1.0 / 20.0)
            }
        }
    }

    /// Squared distance from the point to the closest point of the segment
    pub fn distance_sq(&self, point: Point) -> Scalar {
        fn distance_sq_rec(segment: Segment, point: Point, depth: usize) -> Scalar {
            if depth >= SEARCH_MAX_DEPTH || segment.is_line() {
                return line_distance_sq(segment.start(), segment.end(), point);
            }
            let (s0, s1) = segment.split();
            distance_sq_rec(s0, point, depth + 1).min(distance_sq_rec(s1, point, depth + 1))
        }
        distance_sq_rec(*self, point, 0)
    }

    /// Same kind of segment with all control points within `POINT_TOLERANCE`
    pub fn approx_eq(&self, other: &Segment) -> bool {
        let (ps0, ps1) = (self.points(), other.points());
        ps0.len() == ps1.len()
            && ps0
                .iter()
                .zip(ps1)
                .all(|(p0, p1)| p0.is_near(*p1, POINT_TOLERANCE))
    }

    /// Approximately equal to `other` in either direction
    pub fn matches(&self, other: &Segment) -> bool {
        self.approx_eq(other) || self.approx_eq(&other.reverse())
    }

    /// Find an intersection of two segments, end points included
    ///
    /// Lines are solved directly, curves are subdivided until they are flat
    /// enough to be treated as lines. Only a single intersection is reported,
    /// collinear lines report end points of their overlap.
    pub fn hit(&self, other: &Segment) -> Option<SegHit> {
        self.hit_where(other, |_| true)
    }

    /// Find an intersection of two segments which satisfies the `accept` predicate
    pub fn hit_where(&self, other: &Segment, accept: impl Fn(SegHit) -> bool) -> Option<SegHit> {
        match (self, other) {
            (Segment::Line(l0), Segment::Line(l1)) => l0
                .intersect_segment(*l1)
                .into_iter()
                .chain(l0.overlap(*l1))
                .map(|(h0, h1)| SegHit { h0, h1 })
                .find(|hit| accept(*hit)),
            (Segment::Line(_), _) => {
                // subdivide the curve, which is always the first argument
                let accept = |hit: SegHit| accept(hit.swap());
                hit_rec(*other, (0.0, 1.0), *self, (0.0, 1.0), 0, &accept).map(SegHit::swap)
            }
            _ => hit_rec(*self, (0.0, 1.0), *other, (0.0, 1.0), 0, &accept),
        }
    }

    /// Convert to line if it is a line variant of the segment
    pub fn to_line(&self) -> Option<Line> {
        match self {
            Segment::Line(line) => Some(*line),
            _ => None,
        }
    }

    /// Convert to quad if it is a quad variant of the segment
    pub fn to_quad(&self) -> Option<Quad> {
        match self {
            Segment::Quad(quad) => Some(*quad),
            _ => None,
        }
    }

    /// Convert to cubic if it is a cubic variant of the segment
    pub fn to_cubic(&self) -> Option<Cubic> {
        match self {
            Segment::Cubic(cubic) => Some(*cubic),
            _ => None,
        }
    }
}

/// Recursive intersection search, `s0` spans `r0` range of the original
/// first segment and `s1` spans `r1` range of the original second segment.
fn hit_rec(
    s0: Segment,
    r0: (Scalar, Scalar),
    s1: Segment,
    r1: (Scalar, Scalar),
    depth: usize,
    accept: &dyn Fn(SegHit) -> bool,
) -> Option<SegHit> {
    if !s0.bbox(None).touches(&s1.bbox(None)) {
        return None;
    }
    let flat0 = depth >= SEARCH_MAX_DEPTH || s0.is_line();
    let flat1 = depth >= SEARCH_MAX_DEPTH || s1.is_line();
    let lerp = |(lo, hi): (Scalar, Scalar), t: Scalar| lo + (hi - lo) * t;
    let mid = |(lo, hi): (Scalar, Scalar)| (lo + hi) / 2.0;
    match (flat0, flat1) {
        (true, true) => {
            let (t0, t1) = s0.chord().intersect_segment(s1.chord())?;
            let hit = SegHit {
                h0: lerp(r0, t0),
                h1: lerp(r1, t1),
            };
            accept(hit).then_some(hit)
        }
        (false, _) => {
            let (a, b) = s0.split();
            let m = mid(r0);
            hit_rec(a, (r0.0, m), s1, r1, depth + 1, accept)
                .or_else(|| hit_rec(b, (m, r0.1), s1, r1, depth + 1, accept))
        }
        (true, false) => {
            let (a, b) = s1.split();
            let m = mid(r1);
            hit_rec(s0, r0, a, (r1.0, m), depth + 1, accept)
                .or_else(|| hit_rec(s0, r0, b, (m, r1.1), depth + 1, accept))
        }
    }
}

impl fmt::Debug for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Line(line) => line.fmt(f),
            Segment::Quad(quad) => quad.fmt(f),
            Segment::Cubic(cubic) => cubic.fmt(f),
        }
    }
}

impl FromStr for Segment {
    type Err = PathError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let path: crate::Path = text.parse()?;
        path.path_iter(None)
            .segments(false)
            .next()
            .ok_or_else(|| PathError::Conversion {
                reason: "path does not contain any segments".to_string(),
            })
    }
}

impl Curve for Segment {
    fn flatness(&self) -> Scalar {
        match self {
            Segment::Line(line) => line.flatness(),
            Segment::Quad(quad) => quad.flatness(),
            Segment::Cubic(cubic) => cubic.flatness(),
        }
    }

    fn transform(&self, tr: Transform) -> Self {
        match self {
            Segment::Line(line) => line.transform(tr).into(),
            Segment::Quad(quad) => quad.transform(tr).into(),
            Segment::Cubic(cubic) => cubic.transform(tr).into(),
        }
    }

    fn start(&self) -> Point {
        match self {
            Segment::Line(line) => line.start(),
            Segment::Quad(quad) => quad.start(),
            Segment::Cubic(cubic) => cubic.start(),
        }
    }

    fn end(&self) -> Point {
        match self {
            Segment::Line(line) => line.end(),
            Segment::Quad(quad) => quad.end(),
            Segment::Cubic(cubic) => cubic.end(),
        }
    }

    fn at(&self, t: Scalar) -> Point {
        match self {
            Segment::Line(line) => line.at(t),
            Segment::Quad(quad) => quad.at(t),
            Segment::Cubic(cubic) => cubic.at(t),
        }
    }

    fn split(&self) -> (Self, Self) {
        match self {
            Segment::Line(line) => {
                let (l0, l1) = line.split();
                (l0.into(), l1.into())
            }
            Segment::Quad(quad) => {
                let (q0, q1) = quad.split();
                (q0.into(), q1.into())
            }
            Segment::Cubic(cubic) => {
                let (c0, c1) = cubic.split();
                (c0.into(), c1.into())
            }
        }
    }

    fn split_at(&self, t: Scalar) -> (Self, Self) {
        match self {
            Segment::Line(line) => {
                let (l0, l1) = line.split_at(t);
                (l0.into(), l1.into())
            }
            Segment::Quad(quad) => {
                let (q0, q1) = quad.split_at(t);
                (q0.into(), q1.into())
            }
            Segment::Cubic(cubic) => {
                let (c0, c1) = cubic.split_at(t);
                (c0.into(), c1.into())
            }
        }
    }

    fn bbox(&self, init: Option<Rect>) -> Rect {
        match self {
            Segment::Line(line) => line.bbox(init),
            Segment::Quad(quad) => quad.bbox(init),
            Segment::Cubic(cubic) => cubic.bbox(init),
        }
    }

    fn reverse(&self) -> Self {
        match self {
            Segment::Line(line) => line.reverse().into(),
            Segment::Quad(quad) => quad.reverse().into(),
            Segment::Cubic(cubic) => cubic.reverse().into(),
        }
    }

    fn extremities(&self) -> CurveExtremities {
        match self {
            Segment::Line(line) => line.extremities(),
            Segment::Quad(quad) => quad.extremities(),
            Segment::Cubic(cubic) => cubic.extremities(),
        }
    }

    fn crossings(&self, px: Scalar, py: Scalar) -> i32 {
        match self {
            Segment::Line(line) => line.crossings(px, py),
            Segment::Quad(quad) => quad.crossings(px, py),
            Segment::Cubic(cubic) => cubic.crossings(px, py),
        }
    }
}

impl From<Line> for Segment {
    fn from(line: Line) -> Self {
        Self::Line(line)
    }
}

impl From<Quad> for Segment {
    fn from(quad: Quad) -> Self {
        Self::Quad(quad)
    }
}

impl From<Cubic> for Segment {
    fn from(cubic: Cubic) -> Self {
        Self::Cubic(cubic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert_approx_eq;

    fn assert_bbox_covers(segment: Segment) {
        let bbox = segment.bbox(None);
        for i in 0..=100 {
            let Point([x, y]) = segment.at(i as Scalar / 100.0);
            assert!(
                bbox.inset(-1e-9, -1e-9).covers(x, y),
                "{:?} does not cover {},{} of {:?}",
                bbox,
                x,
                y,
                segment
            );
        }
    }

    #[test]
    fn test_split() {
        let q = Quad::new((0.0, 0.0), (8.0, 5.0), (4.0, 0.0));
        let (ql, qr) = q.split();
        assert_eq!((ql, qr), q.split_at(0.5));

        let c = Cubic::new((3.0, 7.0), (2.0, 8.0), (0.0, 3.0), (6.0, 5.0));
        let (cl, cr) = c.split();
        let (al, ar) = c.split_at(0.5);
        for (p0, p1) in cl.points().iter().zip(al.points().iter()) {
            assert!(p0.is_near(*p1, 1e-12));
        }
        for (p0, p1) in cr.points().iter().zip(ar.points().iter()) {
            assert!(p0.is_near(*p1, 1e-12));
        }

        let (c0, c1) = c.split_at(0.3);
        assert!(c0.end().is_near(c.at(0.3), 1e-12));
        assert!(c0.at(0.5).is_near(c.at(0.15), 1e-12));
        assert!(c1.at(0.5).is_near(c.at(0.65), 1e-12));

        let mut segment: Segment = Line::new((0.0, 0.0), (10.0, 0.0)).into();
        let tail = segment.split_off(0.25);
        assert_eq!(segment, Line::new((0.0, 0.0), (2.5, 0.0)).into());
        assert_eq!(tail, Line::new((2.5, 0.0), (10.0, 0.0)).into());
    }

    #[test]
    fn test_bbox() {
        let cubic = Cubic::new((106.0, 0.0), (0.0, 100.0), (382.0, 216.0), (324.0, 14.0));
        let bbox = cubic.bbox(None);
        assert_approx_eq!(bbox.x(), 87.308, 0.001);
        assert_approx_eq!(bbox.y(), 0.0, 0.001);
        assert_approx_eq!(bbox.width(), 242.724, 0.001);
        assert_approx_eq!(bbox.height(), 125.140, 0.001);

        let quad = Quad::new((30.0, 90.0), (220.0, 200.0), (120.0, 50.0));
        let bbox = quad.bbox(None);
        assert_approx_eq!(bbox.x(), 30.0, 0.001);
        assert_approx_eq!(bbox.y(), 50.0, 0.001);
        assert_approx_eq!(bbox.width(), 124.483, 0.001);
        assert_approx_eq!(bbox.height(), 86.538, 0.001);

        let cubic = Cubic::new((0.0, 0.0), (10.0, -3.0), (-4.0, -3.0), (6.0, 0.0));
        let bbox = cubic.bbox(None);
        assert_approx_eq!(bbox.x(), 0.0);
        assert_approx_eq!(bbox.y(), -2.25);
        assert_approx_eq!(bbox.width(), 6.0);
        assert_approx_eq!(bbox.height(), 2.25);

        let init = Rect::new(-10.0, -10.0, 1.0, 1.0);
        let bbox = Line::new((0.0, 0.0), (5.0, 5.0)).bbox(Some(init));
        assert_eq!(bbox, Rect::new(-10.0, -10.0, 15.0, 15.0));
    }

    #[test]
    fn test_bbox_s_curve() {
        let cubic = Cubic::new((0.0, 0.0), (30.0, -50.0), (70.0, 150.0), (100.0, 100.0));
        let bbox = cubic.bbox(None);
        let ends = Rect::from_points(cubic.start(), cubic.end());
        assert!(bbox.contains_rect(&ends));
        assert!(bbox.y() < ends.y());
        assert!(bbox.max_y() > ends.max_y());
        assert!(bbox.height() > ends.height());
    }

    #[test]
    fn test_bbox_covers_samples() {
        let segments: [Segment; 4] = [
            Line::new((3.0, -1.0), (-7.0, 4.0)).into(),
            Quad::new((0.0, 0.0), (50.0, -80.0), (100.0, 10.0)).into(),
            Cubic::new((0.0, 0.0), (30.0, -50.0), (70.0, 150.0), (100.0, 100.0)).into(),
            Cubic::new((10.0, 10.0), (-40.0, 60.0), (90.0, -20.0), (0.0, 0.0)).into(),
        ];
        for segment in segments {
            assert_bbox_covers(segment);
            assert_bbox_covers(segment.reverse());
        }
    }

    #[test]
    fn test_line_crossings() {
        let down = Line::new((0.0, 0.0), (0.0, 10.0));
        assert_eq!(down.crossings(-1.0, 5.0), 1);
        assert_eq!(down.reverse().crossings(-1.0, 5.0), -1);
        assert_eq!(down.crossings(1.0, 5.0), 0);
        // half-open in y
        assert_eq!(down.crossings(-1.0, 0.0), 1);
        assert_eq!(down.crossings(-1.0, 10.0), 0);
        // on the line itself is not a crossing
        assert_eq!(down.crossings(0.0, 5.0), 0);

        let diag = Line::new((0.0, 0.0), (10.0, 10.0));
        assert_eq!(diag.crossings(4.0, 5.0), 1);
        assert_eq!(diag.crossings(6.0, 5.0), 0);
        // horizontal lines never cross horizontal rays
        assert_eq!(Line::new((0.0, 3.0), (10.0, 3.0)).crossings(-1.0, 3.0), 0);
    }

    #[test]
    fn test_curve_crossings() {
        // arch opened to the left: ray from inside crosses it once
        let quad = Quad::new((0.0, 0.0), (20.0, 5.0), (0.0, 10.0));
        assert_eq!(quad.crossings(5.0, 5.0), 1);
        assert_eq!(quad.crossings(11.0, 5.0), 0);
        assert_eq!(quad.reverse().crossings(5.0, 5.0), -1);
        // ray below the arch
        assert_eq!(quad.crossings(5.0, 11.0), 0);

        // cubic which crosses the same horizontal line three times
        let cubic = Cubic::new((0.0, 0.0), (100.0, 100.0), (-100.0, -100.0), (0.0, 10.0));
        let total: i32 = [-200.0, 200.0]
            .iter()
            .map(|px| cubic.crossings(*px, 5.0))
            .sum();
        assert_eq!(total, 1);
        assert_eq!(cubic.crossings(-200.0, 5.0), 1);

        let nan = Cubic::new((0.0, 0.0), (Scalar::NAN, 5.0), (1.0, 7.0), (3.0, 10.0));
        assert_eq!(nan.crossings(1.0, 5.0), 0);
    }

    #[test]
    fn test_line_hit() {
        let l0: Segment = Line::new((0.0, 0.0), (10.0, 10.0)).into();
        let l1: Segment = Line::new((0.0, 10.0), (10.0, 0.0)).into();
        let hit = l0.hit(&l1).unwrap();
        assert_approx_eq!(hit.h0, 0.5, 1e-9);
        assert_approx_eq!(hit.h1, 0.5, 1e-9);

        // end points are included
        let l2: Segment = Line::new((10.0, 10.0), (20.0, 0.0)).into();
        let hit = l0.hit(&l2).unwrap();
        assert_approx_eq!(hit.h0, 1.0, 1e-9);
        assert_approx_eq!(hit.h1, 0.0, 1e-9);

        // parallel lines
        let l3: Segment = Line::new((0.0, 1.0), (10.0, 11.0)).into();
        assert!(l0.hit(&l3).is_none());

        // collinear lines hit at the ends of their overlap
        let l4: Segment = Line::new((5.0, 5.0), (15.0, 15.0)).into();
        assert_eq!(l0.hit(&l4), Some(SegHit { h0: 1.0, h1: 0.5 }));
        assert_eq!(
            l0.hit_where(&l4, |hit| hit.h0 < 1.0),
            Some(SegHit { h0: 0.5, h1: 0.0 })
        );
        let l5: Segment = Line::new((20.0, 20.0), (30.0, 30.0)).into();
        assert!(l0.hit(&l5).is_none());

        // rejected by predicate
        assert!(l0.hit_where(&l2, |hit| hit.h0 < 0.9).is_none());
    }

    #[test]
    fn test_line_overlap() {
        let line = Line::new((0.0, 0.0), (20.0, 0.0));
        let overlap: Vec<_> = line.overlap(Line::new((10.0, 0.0), (30.0, 0.0))).collect();
        assert_eq!(overlap, vec![(1.0, 0.5), (0.5, 0.0)]);

        // contained line reports both of its ends
        let overlap: Vec<_> = line.overlap(Line::new((15.0, 0.0), (5.0, 0.0))).collect();
        assert_eq!(overlap, vec![(0.75, 0.0), (0.25, 1.0)]);

        assert_eq!(line.overlap(Line::new((0.0, 1.0), (20.0, 1.0))).count(), 0);
        assert_eq!(line.overlap(Line::new((5.0, 0.0), (5.0, 10.0))).count(), 0);
        assert_eq!(line.project(Point::new(5.0, 3.0)), Some(0.25));
        assert_eq!(Line::new((1.0, 1.0), (1.0, 1.0)).project(Point::new(0.0, 0.0)), None);
    }

    #[test]
    fn test_curve_hit() {
        let quad: Segment = Quad::new((0.0, 0.0), (50.0, 100.0), (100.0, 0.0)).into();
        let line: Segment = Line::new((0.0, 25.0), (100.0, 25.0)).into();

        let hit = quad.hit(&line).unwrap();
        let p0 = quad.at(hit.h0);
        let p1 = line.at(hit.h1);
        assert!(p0.is_near(p1, POINT_TOLERANCE));
        assert_approx_eq!(p0.y(), 25.0, POINT_TOLERANCE);

        // swapped arguments report swapped parameters
        let swapped = line.hit(&quad).unwrap();
        assert!(line.at(swapped.h0).is_near(quad.at(swapped.h1), POINT_TOLERANCE));

        // second intersection can be found with a predicate
        let second = quad.hit_where(&line, |hit| hit.h0 > 0.5).unwrap();
        assert!(quad.at(second.h0).x() > 50.0);

        let far: Segment = Line::new((0.0, 60.0), (100.0, 60.0)).into();
        assert!(quad.hit(&far).is_none());

        let cubic: Segment =
            Cubic::new((0.0, 50.0), (30.0, -50.0), (70.0, 150.0), (100.0, 50.0)).into();
        let hit = quad.hit(&cubic).unwrap();
        assert!(quad.at(hit.h0).is_near(cubic.at(hit.h1), 2.0 * POINT_TOLERANCE));
    }

    #[test]
    fn test_distance() {
        let line: Segment = Line::new((0.0, 0.0), (10.0, 0.0)).into();
        assert_approx_eq!(line.distance_sq(Point::new(5.0, 3.0)), 9.0, 1e-9);
        assert_approx_eq!(line.distance_sq(Point::new(13.0, 4.0)), 25.0, 1e-9);

        let quad: Segment = Quad::new((0.0, 0.0), (50.0, 100.0), (100.0, 0.0)).into();
        // apex of the quad is at (50, 50)
        let dist = quad.distance_sq(Point::new(50.0, 60.0)).sqrt();
        assert_approx_eq!(dist, 10.0, 0.1);
    }

    #[test]
    fn test_signed_area() {
        // parabolic segment encloses 2/3 of its bounding box
        let quad: Segment = Quad::new((0.0, 0.0), (50.0, 100.0), (100.0, 0.0)).into();
        let chord: Segment = Line::new((100.0, 0.0), (0.0, 0.0)).into();
        let area = quad.signed_area() + chord.signed_area();
        assert_approx_eq!(area.abs(), 10000.0 / 3.0, 1e-9);
        // same curve as a cubic
        let cubic: Segment = Cubic::from(quad.to_quad().unwrap()).into();
        assert_approx_eq!(cubic.signed_area(), quad.signed_area(), 1e-9);
        // reversed outline flips the sign
        let reversed = quad.reverse().signed_area() + chord.reverse().signed_area();
        assert_approx_eq!(reversed, -area, 1e-9);
    }

    #[test]
    fn test_matches() {
        let c0: Segment = Cubic::new((0.0, 0.0), (1.0, 2.0), (3.0, 2.0), (4.0, 0.0)).into();
        let c1: Segment = Cubic::new((4.05, 0.0), (3.0, 2.0), (1.0, 2.0), (0.0, 0.05)).into();
        assert!(!c0.approx_eq(&c1));
        assert!(c0.matches(&c1));
        assert!(!c0.matches(&c0.chord().into()));
    }

    #[test]
    fn test_flatten() {
        let quad = Quad::new((0.0, 0.0), (50.0, 100.0), (100.0, 0.0));
        let lines: Vec<_> = quad.flatten(Transform::identity(), 0.05).collect();
        assert!(lines.len() > 4);
        assert_eq!(lines[0].start(), quad.start());
        assert_eq!(lines[lines.len() - 1].end(), quad.end());
        for pair in lines.windows(2) {
            assert_eq!(pair[0].end(), pair[1].start());
        }
    }

    #[test]
    fn test_parse() {
        let cubic: Cubic = "M8,-1 C1,3 6,-3 9,1".parse().unwrap();
        assert_eq!(cubic, Cubic::new((8.0, -1.0), (1.0, 3.0), (6.0, -3.0), (9.0, 1.0)));
        assert!("M0,0 L1,1".parse::<Cubic>().is_err());
    }
}
