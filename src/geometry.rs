use crate::clamp;
use bytemuck::{Pod, Zeroable};
use std::{
    fmt,
    ops::{Add, Div, Mul, Neg, Sub},
};

pub type Scalar = f64;
pub const EPSILON: f64 = f64::EPSILON;
pub const PI: f64 = std::f64::consts::PI;

/// Two points closer than this on both axes are considered the same point
/// when segments are compared or joined.
pub const POINT_TOLERANCE: Scalar = 0.1;

/// Format floats in a compact way suitable for SVG path
pub fn scalar_fmt(f: &mut fmt::Formatter<'_>, value: Scalar) -> fmt::Result {
    let value_abs = value.abs();
    if value_abs.fract() < EPSILON {
        write!(f, "{}", value.trunc() as i64)
    } else if value_abs > 9999.0 || value_abs <= 0.0001 {
        write!(f, "{:.3e}", value)
    } else {
        let ten: Scalar = 10.0;
        let round = ten.powi(6 - (value_abs.trunc() + 1.0).log10().ceil() as i32);
        write!(f, "{}", (value * round).round() / round)
    }
}

/// Value representing a 2D point or vector.
#[derive(Clone, Copy, PartialEq, Default, Pod, Zeroable)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct Point(pub [Scalar; 2]);

impl fmt::Debug for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Point([x, y]) = self;
        scalar_fmt(f, *x)?;
        write!(f, ",")?;
        scalar_fmt(f, *y)?;
        Ok(())
    }
}

impl Point {
    #[inline]
    pub const fn new(x: Scalar, y: Scalar) -> Self {
        Self([x, y])
    }

    /// Get `x` component of the point
    #[inline]
    pub fn x(self) -> Scalar {
        self.0[0]
    }

    /// Get `y` component of the point
    #[inline]
    pub fn y(self) -> Scalar {
        self.0[1]
    }

    /// Get length of the vector (distance from the origin)
    pub fn length(self) -> Scalar {
        let Self([x, y]) = self;
        x.hypot(y)
    }

    /// Distance between two points
    pub fn dist(self, other: Self) -> Scalar {
        (self - other).length()
    }

    /// Squared distance between two points
    pub fn dist_sq(self, other: Self) -> Scalar {
        let Self([dx, dy]) = self - other;
        dx * dx + dy * dy
    }

    /// Dot product between two vectors
    pub fn dot(self, other: Self) -> Scalar {
        let Self([x0, y0]) = self;
        let Self([x1, y1]) = other;
        x0 * x1 + y0 * y1
    }

    /// Cross product between two vectors
    pub fn cross(self, other: Self) -> Scalar {
        let Self([x0, y0]) = self;
        let Self([x1, y1]) = other;
        x0 * y1 - y0 * x1
    }

    /// Convert vector to a unit size vector, if length is not zero
    pub fn normalize(self) -> Option<Point> {
        let Self([x, y]) = self;
        let length = self.length();
        if length < EPSILON {
            None
        } else {
            Some(Self([x / length, y / length]))
        }
    }

    /// Calculate angle (from self to the other) between two vectors
    pub fn angle_between(self, other: Self) -> Option<Scalar> {
        let angle = clamp(self.cos_between(other)?, -1.0, 1.0).acos();
        if self.cross(other) < 0.0 {
            Some(-angle)
        } else {
            Some(angle)
        }
    }

    /// Cosine of the angle (from self to the other) between to vectors
    pub fn cos_between(self, other: Self) -> Option<Scalar> {
        let lengths = self.length() * other.length();
        if lengths < EPSILON {
            None
        } else {
            Some(self.dot(other) / lengths)
        }
    }

    /// Determine if self is close to the other within the margin of error (EPSILON)
    pub fn is_close_to(self, other: Point) -> bool {
        self.is_near(other, EPSILON)
    }

    /// Determine if both coordinates differ from the other point by less than `tolerance`
    pub fn is_near(self, other: Point, tolerance: Scalar) -> bool {
        let Self([x0, y0]) = self;
        let Self([x1, y1]) = other;
        (x0 - x1).abs() < tolerance && (y0 - y1).abs() < tolerance
    }

    /// Whether any of the coordinates is NaN
    pub fn is_nan(self) -> bool {
        self.x().is_nan() || self.y().is_nan()
    }
}

impl From<(Scalar, Scalar)> for Point {
    #[inline]
    fn from(xy: (Scalar, Scalar)) -> Self {
        Self([xy.0, xy.1])
    }
}

impl Mul<Point> for Scalar {
    type Output = Point;

    #[inline]
    fn mul(self, other: Point) -> Self::Output {
        let Point([x, y]) = other;
        Point([self * x, self * y])
    }
}

impl Div<Scalar> for Point {
    type Output = Point;

    #[inline]
    fn div(self, rhs: Scalar) -> Self::Output {
        let Point([x, y]) = self;
        Point([x / rhs, y / rhs])
    }
}

impl Add for Point {
    type Output = Point;

    #[inline]
    fn add(self, other: Point) -> Self::Output {
        let Point([x0, y0]) = self;
        let Point([x1, y1]) = other;
        Point([x0 + x1, y0 + y1])
    }
}

impl Sub for Point {
    type Output = Point;

    #[inline]
    fn sub(self, other: Point) -> Self::Output {
        let Point([x0, y0]) = self;
        let Point([x1, y1]) = other;
        Point([x0 - x1, y0 - y1])
    }
}

impl Neg for Point {
    type Output = Point;

    #[inline]
    fn neg(self) -> Self::Output {
        let Point([x, y]) = self;
        Point([-x, -y])
    }
}

/// 2D affine transformation
///
/// Stored as an array [m00, m01, m02, m10, m11, m12] but semantically corresponds to
/// a matrix:
/// ┌             ┐
/// │ m00 m01 m02 │
/// │ m10 m11 m12 │
/// │   0   0   1 │
/// └             ┘
///
/// In the conventional `(a, b, c, d, tx, ty)` notation `a = m00`, `b = m10`,
/// `c = m01`, `d = m11`, `tx = m02` and `ty = m12`.
///
/// Builder methods (`translate`, `rotate`, ...) modify the transform in place and
/// apply the new operation *before* the existing one, so the last call in a chain
/// is the first to act on a point.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Transform([Scalar; 6]);

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    /// Identity transformation
    pub const fn identity() -> Self {
        Self([1.0, 0.0, 0.0, 0.0, 1.0, 0.0])
    }

    /// Create transformation from `(a, b, c, d, tx, ty)` components
    pub const fn new(a: Scalar, b: Scalar, c: Scalar, d: Scalar, tx: Scalar, ty: Scalar) -> Self {
        Self([a, c, tx, b, d, ty])
    }

    pub fn new_translate(tx: Scalar, ty: Scalar) -> Self {
        Self([1.0, 0.0, tx, 0.0, 1.0, ty])
    }

    pub fn new_scale(sx: Scalar, sy: Scalar) -> Self {
        Self([sx, 0.0, 0.0, 0.0, sy, 0.0])
    }

    /// Rotation by angle `a` (radians) around the origin
    pub fn new_rotate(a: Scalar) -> Self {
        let (sin, cos) = a.sin_cos();
        Self([cos, -sin, 0.0, sin, cos, 0.0])
    }

    pub fn a(&self) -> Scalar {
        self.0[0]
    }

    pub fn b(&self) -> Scalar {
        self.0[3]
    }

    pub fn c(&self) -> Scalar {
        self.0[1]
    }

    pub fn d(&self) -> Scalar {
        self.0[4]
    }

    pub fn tx(&self) -> Scalar {
        self.0[2]
    }

    pub fn ty(&self) -> Scalar {
        self.0[5]
    }

    /// Whether this transform leaves every point unchanged
    pub fn is_identity(&self) -> bool {
        *self == Self::identity()
    }

    /// Whether this transform only translates and scales (no rotation or skew)
    pub fn is_simple(&self) -> bool {
        self.b() == 0.0 && self.c() == 0.0
    }

    /// Apply this transformation to a point
    pub fn apply(&self, point: Point) -> Point {
        let Self([m00, m01, m02, m10, m11, m12]) = self;
        let Point([x, y]) = point;
        Point([x * m00 + y * m01 + m02, x * m10 + y * m11 + m12])
    }

    /// Transform interleaved `x, y` pairs in place
    ///
    /// A trailing odd coordinate is left untouched.
    pub fn transform_coords(&self, coords: &mut [Scalar]) {
        let even = coords.len() & !1;
        let points: &mut [Point] = bytemuck::cast_slice_mut(&mut coords[..even]);
        for point in points {
            *point = self.apply(*point);
        }
    }

    /// Bounding rectangle of the transformed corners of `rect`
    pub fn transform_rect(&self, rect: Rect) -> Rect {
        if self.is_identity() {
            return rect;
        }
        let [p0, p1, p2, p3] = rect.points().map(|p| self.apply(p));
        let mut result = Rect::from_points(p0, p1);
        result.add(p2.x(), p2.y());
        result.add(p3.x(), p3.y());
        result
    }

    /// Find the inverse transformation
    pub fn invert(&self) -> Option<Self> {
        // inv([[M, v], [0, 1]]) = [[inv(M), - inv(M) * v], [0, 1]]
        let Self([m00, m01, m02, m10, m11, m12]) = self;
        let det = m00 * m11 - m10 * m01;
        if det.abs() <= EPSILON {
            return None;
        }
        let o00 = m11 / det;
        let o01 = -m01 / det;
        let o10 = -m10 / det;
        let o11 = m00 / det;
        let o02 = -o00 * m02 - o01 * m12;
        let o12 = -o10 * m02 - o11 * m12;
        Some(Self([o00, o01, o02, o10, o11, o12]))
    }

    /// Inverse transformation, or identity if this one is singular
    pub fn inverse(&self) -> Self {
        self.invert().unwrap_or_default()
    }

    /// Apply translation by `[tx, ty]` before self
    pub fn translate(&mut self, tx: Scalar, ty: Scalar) -> &mut Self {
        self.concat(Self::new_translate(tx, ty))
    }

    /// Apply scale transformation by `[sx, sy]` before self
    pub fn scale(&mut self, sx: Scalar, sy: Scalar) -> &mut Self {
        self.concat(Self::new_scale(sx, sy))
    }

    /// Apply rotation by `a` angle (radians) around the origin before self
    pub fn rotate(&mut self, a: Scalar) -> &mut Self {
        self.concat(Self::new_rotate(a))
    }

    /// Apply rotation around point `p` by angle `a` before self
    pub fn rotate_around(&mut self, a: Scalar, p: impl Into<Point>) -> &mut Self {
        let p = p.into();
        self.translate(p.x(), p.y())
            .rotate(a)
            .translate(-p.x(), -p.y())
    }

    /// Apply skew transformation by `[ax, ay]` angles before self
    pub fn skew(&mut self, ax: Scalar, ay: Scalar) -> &mut Self {
        self.concat(Self([1.0, ax.tan(), 0.0, ay.tan(), 1.0, 0.0]))
    }

    /// `self = self * other`, `other` acts on points first
    pub fn concat(&mut self, other: Transform) -> &mut Self {
        *self = self.matmul(other);
        self
    }

    /// `self = other * self`, `other` acts on points last
    pub fn multiply(&mut self, other: Transform) -> &mut Self {
        *self = other.matmul(*self);
        self
    }

    /// Multiply transformations in matrix form
    pub fn matmul(&self, other: Transform) -> Self {
        let Self([s00, s01, s02, s10, s11, s12]) = self;
        let Self([o00, o01, o02, o10, o11, o12]) = other;

        // s00, s01, s02 | o00, o01, o02
        // s10, s11, s12 | o10, o11, o12
        // 0  , 0  , 1   | 0  , 0  , 1
        Self([
            s00 * o00 + s01 * o10,
            s00 * o01 + s01 * o11,
            s00 * o02 + s01 * o12 + s02,
            s10 * o00 + s11 * o10,
            s10 * o01 + s11 * o11,
            s10 * o02 + s11 * o12 + s12,
        ])
    }

    /// Find transformation that maps `src` rectangle onto `dst` (non-uniform scale).
    ///
    /// Degenerate source dimensions are not scaled.
    pub fn fit(src: Rect, dst: Rect) -> Transform {
        let sx = if src.width() > EPSILON {
            dst.width() / src.width()
        } else {
            1.0
        };
        let sy = if src.height() > EPSILON {
            dst.height() / src.height()
        } else {
            1.0
        };
        *Transform::identity()
            .translate(dst.x(), dst.y())
            .scale(sx, sy)
            .translate(-src.x(), -src.y())
    }
}

impl Mul<Transform> for Transform {
    type Output = Transform;

    fn mul(self, other: Transform) -> Self::Output {
        self.matmul(other)
    }
}

/// Axis aligned rectangle
///
/// Used both as a shape and as a bounds accumulator. A rectangle with
/// non-positive width or height is empty.
#[derive(Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    x: Scalar,
    y: Scalar,
    width: Scalar,
    height: Scalar,
}

impl Rect {
    pub const fn new(x: Scalar, y: Scalar, width: Scalar, height: Scalar) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Zero sized rectangle at the origin
    pub const fn empty() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }

    /// Construct rectangle which includes points `p0` and `p1`
    pub fn from_points(p0: impl Into<Point>, p1: impl Into<Point>) -> Self {
        let Point([x0, y0]) = p0.into();
        let Point([x1, y1]) = p1.into();
        let (x0, x1) = if x0 <= x1 { (x0, x1) } else { (x1, x0) };
        let (y0, y1) = if y0 <= y1 { (y0, y1) } else { (y1, y0) };
        Self::new(x0, y0, x1 - x0, y1 - y0)
    }

    #[inline]
    pub fn x(&self) -> Scalar {
        self.x
    }

    #[inline]
    pub fn y(&self) -> Scalar {
        self.y
    }

    #[inline]
    pub fn width(&self) -> Scalar {
        self.width
    }

    #[inline]
    pub fn height(&self) -> Scalar {
        self.height
    }

    #[inline]
    pub fn max_x(&self) -> Scalar {
        self.x + self.width
    }

    #[inline]
    pub fn max_y(&self) -> Scalar {
        self.y + self.height
    }

    #[inline]
    pub fn mid_x(&self) -> Scalar {
        self.x + self.width / 2.0
    }

    #[inline]
    pub fn mid_y(&self) -> Scalar {
        self.y + self.height / 2.0
    }

    /// Point with minimal values of x and y coordinates
    pub fn min(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Point with maximum values of x and y coordinates
    pub fn max(&self) -> Point {
        Point::new(self.max_x(), self.max_y())
    }

    pub fn mid(&self) -> Point {
        Point::new(self.mid_x(), self.mid_y())
    }

    /// Corners in clockwise order (y axis pointing down) starting at the minimum
    pub fn points(&self) -> [Point; 4] {
        [
            Point::new(self.x, self.y),
            Point::new(self.max_x(), self.y),
            Point::new(self.max_x(), self.max_y()),
            Point::new(self.x, self.max_y()),
        ]
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Determine if the point is inside of the rectangle, edges included
    pub fn covers(&self, x: Scalar, y: Scalar) -> bool {
        self.x <= x && x <= self.max_x() && self.y <= y && y <= self.max_y()
    }

    /// Determine if `other` lies completely inside of this rectangle
    pub fn contains_rect(&self, other: &Rect) -> bool {
        self.covers(other.x, other.y) && self.covers(other.max_x(), other.max_y())
    }

    /// Determine if interiors of the rectangles overlap (touching edges do not count)
    pub fn intersects_rect(&self, other: &Rect) -> bool {
        self.x < other.max_x()
            && other.x < self.max_x()
            && self.y < other.max_y()
            && other.y < self.max_y()
    }

    /// Determine if rectangles overlap or touch
    pub fn touches(&self, other: &Rect) -> bool {
        self.x <= other.max_x()
            && other.x <= self.max_x()
            && self.y <= other.max_y()
            && other.y <= self.max_y()
    }

    /// Rectangle shared by both rectangles, zero sized if they do not overlap
    pub fn intersect_rect(&self, other: &Rect) -> Rect {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let width = (self.max_x().min(other.max_x()) - x).max(0.0);
        let height = (self.max_y().min(other.max_y()) - y).max(0.0);
        Rect::new(x, y, width, height)
    }

    /// Extend rectangle so it would contain provided point
    pub fn add(&mut self, x: Scalar, y: Scalar) {
        let x0 = self.x.min(x);
        let y0 = self.y.min(y);
        let x1 = self.max_x().max(x);
        let y1 = self.max_y().max(y);
        *self = Rect::new(x0, y0, x1 - x0, y1 - y0);
    }

    /// Extend rectangle so it would contain `other`, even if either of them is empty
    pub fn add_rect(&mut self, other: &Rect) {
        self.add(other.x, other.y);
        self.add(other.max_x(), other.max_y());
    }

    /// Union with `other`, where an empty rectangle does not contribute
    pub fn union(&mut self, other: &Rect) {
        if other.is_empty() {
            return;
        }
        if self.is_empty() {
            *self = *other;
        } else {
            self.add_rect(other);
        }
    }

    /// Shrink (or grow if negative) rectangle by `dx` and `dy` on each side
    pub fn inset(&self, dx: Scalar, dy: Scalar) -> Rect {
        Rect::new(
            self.x + dx,
            self.y + dy,
            self.width - 2.0 * dx,
            self.height - 2.0 * dy,
        )
    }

    pub fn offset(&self, dx: Scalar, dy: Scalar) -> Rect {
        Rect::new(self.x + dx, self.y + dy, self.width, self.height)
    }
}

impl fmt::Debug for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rect x=")?;
        scalar_fmt(f, self.x)?;
        write!(f, ", y=")?;
        scalar_fmt(f, self.y)?;
        write!(f, ", w=")?;
        scalar_fmt(f, self.width)?;
        write!(f, ", h=")?;
        scalar_fmt(f, self.height)
    }
}
