use crate::{Cubic, Curve, EPSILON, PI, Path, PathIter, Point, Rect, Scalar, Shape, Transform};
use std::fmt;

/// Elliptical Arc
#[derive(Clone, Copy, PartialEq)]
pub struct EllipArc {
    /// center of the ellipse
    center: Point,
    /// radius along x-axis before the rotation
    rx: Scalar,
    /// radius along y-axis before the rotation
    ry: Scalar,
    /// rotation
    phi: Scalar,
    /// angular start
    eta: Scalar,
    /// angular size
    eta_delta: Scalar,
}

impl fmt::Debug for EllipArc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Arc center:{:?} radius:{:?} phi:{:.3?} eta:{:.3?} eta_delta:{:.3?}",
            self.center,
            Point([self.rx, self.ry]),
            self.phi,
            self.eta,
            self.eta_delta
        )
    }
}

impl EllipArc {
    /// Axis aligned arc starting at angle `eta` and covering `eta_delta` (radians)
    ///
    /// Positive angles go from the x-axis towards the y-axis.
    pub fn new(center: Point, rx: Scalar, ry: Scalar, eta: Scalar, eta_delta: Scalar) -> Self {
        Self {
            center,
            rx,
            ry,
            phi: 0.0,
            eta,
            eta_delta,
        }
    }

    /// Convert arc from SVG arguments to parametric curve
    ///
    /// This code mostly comes from arc implementation notes from svg sepc
    /// (Arc to Parametric)[https://www.w3.org/TR/SVG/implnote.html#ArcImplementationNotes]
    pub fn new_param(
        src: Point,
        dst: Point,
        rx: Scalar,
        ry: Scalar,
        x_axis_rot: Scalar,
        large_flag: bool,
        sweep_flag: bool,
    ) -> Option<Self> {
        let rx = rx.abs();
        let ry = ry.abs();
        if rx < EPSILON || ry < EPSILON || src.is_close_to(dst) {
            return None;
        }
        let phi = x_axis_rot * PI / 180.0;

        // Eq 5.1
        let Point([x1, y1]) = Transform::new_rotate(-phi).apply(0.5 * (src - dst));
        // scale/normalize radii
        let s = (x1 / rx).powi(2) + (y1 / ry).powi(2);
        let (rx, ry) = if s > 1.0 {
            let s = s.sqrt();
            (rx * s, ry * s)
        } else {
            (rx, ry)
        };
        // Eq 5.2
        let sq = ((rx * ry).powi(2) / ((rx * y1).powi(2) + (ry * x1).powi(2)) - 1.0)
            .max(0.0)
            .sqrt();
        let sq = if large_flag == sweep_flag { -sq } else { sq };
        let center = sq * Point([rx * y1 / ry, -ry * x1 / rx]);
        let Point([cx, cy]) = center;
        // Eq 5.3 convert center to initail coordinates
        let center = Transform::new_rotate(phi).apply(center) + 0.5 * (dst + src);
        // Eq 5.5-6
        let v0 = Point([1.0, 0.0]);
        let v1 = Point([(x1 - cx) / rx, (y1 - cy) / ry]);
        let v2 = Point([(-x1 - cx) / rx, (-y1 - cy) / ry]);
        // initial angle
        let eta = v0.angle_between(v1)?;
        //delta angle to be covered when t changes from 0..1
        let eta_delta = v1.angle_between(v2)?.rem_euclid(2.0 * PI);
        let eta_delta = if !sweep_flag && eta_delta > 0.0 {
            eta_delta - 2.0 * PI
        } else if sweep_flag && eta_delta < 0.0 {
            eta_delta + 2.0 * PI
        } else {
            eta_delta
        };

        Some(Self {
            center,
            rx,
            ry,
            phi,
            eta,
            eta_delta,
        })
    }

    pub fn at(&self, t: Scalar) -> Point {
        let (angle_sin, angle_cos) = (self.eta + t * self.eta_delta).sin_cos();
        let point = Point([self.rx * angle_cos, self.ry * angle_sin]);
        Transform::new_rotate(self.phi).apply(point) + self.center
    }

    pub fn start(&self) -> Point {
        self.at(0.0)
    }

    pub fn end(&self) -> Point {
        self.at(1.0)
    }

    pub fn bbox(&self, init: Option<Rect>) -> Rect {
        let start = self.start();
        let init = match init {
            Some(mut bbox) => {
                bbox.add(start.x(), start.y());
                bbox
            }
            None => Rect::from_points(start, start),
        };
        self.to_cubics()
            .fold(init, |bbox, cubic| cubic.bbox(Some(bbox)))
    }

    pub fn reverse(&self) -> Self {
        Self {
            center: self.center,
            rx: self.rx,
            ry: self.ry,
            phi: self.phi,
            eta: self.eta + self.eta_delta,
            eta_delta: -self.eta_delta,
        }
    }

    /// Convert elliptic arc to an iterator over Cubic segments
    pub fn to_cubics(&self) -> EllipArcCubicIter {
        EllipArcCubicIter::new(*self)
    }

    /// Append cubics of the arc to the path, the path must already be at the start of the arc
    pub(crate) fn append_to(&self, path: &mut Path) {
        for Cubic([_, p1, p2, p3]) in self.to_cubics() {
            path.cubic_to(p1, p2, p3);
        }
    }
}

/// Approximate arc with a sequnce of cubic bezier curves
///
/// [Drawing an elliptical arc using polylines, quadratic or cubic Bezier curves]
/// (http://www.spaceroots.org/documents/ellipse/elliptical-arc.pdf)
/// [Approximating Arcs Using Cubic Bézier Curves]
/// (https://www.joecridge.me/content/pdf/bezier-arcs.pdf)
///
/// We are using following formula to split arc segment from `eta_1` to `eta_2`
/// to achieve good approximation arc is split in segments smaller then `pi / 2`.
///     P0 = A(eta_1)
///     P1 = P0 + alpha * A'(eta_1)
///     P2 = P3 - alpha * A'(eta_2)
///     P3 = A(eta_2)
/// where
///     A - arc parametrized by angle
///     A' - derivative of arc parametrized by angle
///     eta_1 = eta
///     eta_2 = eta + eta_delta
///     alpha = sin(eta_2 - eta_1) * (sqrt(4 + 3 * tan((eta_2 - eta_1) / 2) ** 2) - 1) / 3
pub struct EllipArcCubicIter {
    arc: EllipArc,
    phi_tr: Transform,
    segment_delta: Scalar,
    segment_index: Scalar,
    segment_count: Scalar,
}

impl EllipArcCubicIter {
    fn new(arc: EllipArc) -> Self {
        let phi_tr = Transform::new_rotate(arc.phi);
        let segment_max_angle = PI / 2.0; // maximum `eta_delta` of a segment
        let segment_count = (arc.eta_delta.abs() / segment_max_angle).ceil();
        // degenerate arcs produce no segments
        let segment_count = if segment_count.is_finite() {
            segment_count
        } else {
            0.0
        };
        let segment_delta = arc.eta_delta / segment_count;
        Self {
            arc,
            phi_tr,
            segment_delta,
            segment_index: 0.0,
            segment_count: segment_count - 1.0,
        }
    }

    fn at(&self, alpha: Scalar) -> (Point, Point) {
        let (sin, cos) = alpha.sin_cos();
        let at = self
            .phi_tr
            .apply(Point([self.arc.rx * cos, self.arc.ry * sin]))
            + self.arc.center;
        let at_deriv = self
            .phi_tr
            .apply(Point([-self.arc.rx * sin, self.arc.ry * cos]));
        (at, at_deriv)
    }
}

impl Iterator for EllipArcCubicIter {
    type Item = Cubic;

    fn next(&mut self) -> Option<Self::Item> {
        if self.segment_index > self.segment_count {
            return None;
        }
        let eta_1 = self.arc.eta + self.segment_delta * self.segment_index;
        let eta_2 = eta_1 + self.segment_delta;
        self.segment_index += 1.0;

        let sq = (4.0 + 3.0 * ((eta_2 - eta_1) / 2.0).tan().powi(2)).sqrt();
        let alpha = (eta_2 - eta_1).sin() * (sq - 1.0) / 3.0;
        let (p0, d0) = self.at(eta_1);
        let (p3, d3) = self.at(eta_2);
        let p1 = p0 + alpha * d0;
        let p2 = p3 - alpha * d3;
        Some(Cubic([p0, p1, p2, p3]))
    }
}

// -----------------------------------------------------------------------------
// Ellipse
// -----------------------------------------------------------------------------

/// Ellipse inscribed into a rectangle
///
/// Outline starts at `(max_x, mid_y)` and consists of four cubic quarter arcs
/// going towards `(mid_x, max_y)` first.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ellipse {
    rect: Rect,
}

impl Ellipse {
    pub fn new(x: Scalar, y: Scalar, width: Scalar, height: Scalar) -> Self {
        Self::from_rect(Rect::new(x, y, width, height))
    }

    pub fn from_rect(rect: Rect) -> Self {
        Self { rect }
    }

    /// Circle with the given center and radius
    pub fn circle(center: impl Into<Point>, radius: Scalar) -> Self {
        let Point([x, y]) = center.into();
        Self::new(x - radius, y - radius, 2.0 * radius, 2.0 * radius)
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn center(&self) -> Point {
        self.rect.mid()
    }

    fn to_path(&self) -> Path {
        let mut path = Path::new();
        if self.rect.is_empty() {
            return path;
        }
        let (x, y) = (self.rect.x(), self.rect.y());
        let (mid_x, mid_y) = (self.rect.mid_x(), self.rect.mid_y());
        let (max_x, max_y) = (self.rect.max_x(), self.rect.max_y());
        let start = Point::new(max_x, mid_y);
        path.move_to(start)
            .arc_to_corner((max_x, max_y), (mid_x, max_y))
            .arc_to_corner((x, max_y), (x, mid_y))
            .arc_to_corner((x, y), (mid_x, y))
            .arc_to_corner((max_x, y), start)
            .close();
        path
    }
}

impl Shape for Ellipse {
    fn path_iter(&self, transform: Option<Transform>) -> PathIter<'_> {
        PathIter::new(self.to_path().commands().to_vec(), transform)
    }

    fn bounds(&self) -> Rect {
        self.rect
    }
}

// -----------------------------------------------------------------------------
// Arc
// -----------------------------------------------------------------------------

/// How the gap of a partial arc is closed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ArcClosure {
    /// Outline is left open
    Open,
    /// End points are connected with a straight line
    Chord,
    /// End points are connected through the center
    #[default]
    Pie,
}

/// Segment of an ellipse inscribed into a rectangle
///
/// Angles are in degrees, positive sweep goes from the x-axis towards the
/// y-axis. Non-zero `hole_ratio` cuts an inner ellipse scaled by the ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Arc {
    rect: Rect,
    start: Scalar,
    sweep: Scalar,
    hole_ratio: Scalar,
    closure: ArcClosure,
}

impl Arc {
    pub fn new(
        x: Scalar,
        y: Scalar,
        width: Scalar,
        height: Scalar,
        start: Scalar,
        sweep: Scalar,
    ) -> Self {
        Self {
            rect: Rect::new(x, y, width, height),
            start,
            sweep,
            hole_ratio: 0.0,
            closure: ArcClosure::default(),
        }
    }

    pub fn with_hole_ratio(self, hole_ratio: Scalar) -> Self {
        Self { hole_ratio, ..self }
    }

    pub fn with_closure(self, closure: ArcClosure) -> Self {
        Self { closure, ..self }
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn start_angle(&self) -> Scalar {
        self.start
    }

    pub fn sweep_angle(&self) -> Scalar {
        self.sweep
    }

    pub fn hole_ratio(&self) -> Scalar {
        self.hole_ratio
    }

    pub fn closure(&self) -> ArcClosure {
        self.closure
    }

    /// Arc of the ellipse scaled by `ratio`
    fn arc(&self, ratio: Scalar, start: Scalar, sweep: Scalar) -> EllipArc {
        EllipArc::new(
            self.rect.mid(),
            ratio * self.rect.width() / 2.0,
            ratio * self.rect.height() / 2.0,
            start.to_radians(),
            sweep.to_radians(),
        )
    }

    fn to_path(&self) -> Path {
        let end_angle = self.start + self.sweep;
        let full = self.sweep.abs() >= 360.0;
        let outer = self.arc(1.0, self.start, self.sweep);

        let mut path = Path::new();
        if self.closure == ArcClosure::Pie && !full {
            let inner = self.arc(self.hole_ratio, self.start, self.sweep);
            path.move_to(inner.start());
            path.line_to(outer.start());
        } else {
            path.move_to(outer.start());
        }
        outer.append_to(&mut path);

        if self.hole_ratio > 0.0 {
            let inner = self.arc(self.hole_ratio, end_angle, -self.sweep);
            if full {
                path.close();
                path.move_to(inner.start());
            } else {
                path.line_to(inner.start());
            }
            inner.append_to(&mut path);
        }

        if self.closure != ArcClosure::Open || self.hole_ratio > 0.0 {
            path.close();
        }
        path
    }
}

impl Shape for Arc {
    fn path_iter(&self, transform: Option<Transform>) -> PathIter<'_> {
        PathIter::new(self.to_path().commands().to_vec(), transform)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PathCommand, PathVerb, assert_approx_eq};

    #[test]
    fn test_ellip_arc_param() {
        let arc = EllipArc::new_param(
            Point::new(0.0, 0.0),
            Point::new(20.0, 0.0),
            10.0,
            10.0,
            0.0,
            false,
            true,
        )
        .unwrap();
        assert!(arc.start().is_near(Point::new(0.0, 0.0), 1e-9));
        assert!(arc.end().is_near(Point::new(20.0, 0.0), 1e-9));
        assert_eq!(arc.to_cubics().count(), 2);

        // radii too small to reach the destination are scaled
        let arc = EllipArc::new_param(
            Point::new(0.0, 0.0),
            Point::new(20.0, 0.0),
            1.0,
            1.0,
            0.0,
            false,
            true,
        )
        .unwrap();
        assert!(arc.end().is_near(Point::new(20.0, 0.0), 1e-9));

        // degenerate arcs
        assert!(
            EllipArc::new_param(Point::new(0.0, 0.0), Point::new(0.0, 0.0), 1.0, 1.0, 0.0, false, true)
                .is_none()
        );
        assert!(
            EllipArc::new_param(Point::new(0.0, 0.0), Point::new(1.0, 0.0), 0.0, 1.0, 0.0, false, true)
                .is_none()
        );
    }

    #[test]
    fn test_ellip_arc_bbox() {
        let arc = EllipArc::new(Point::new(0.0, 0.0), 2.0, 1.0, 0.0, PI);
        let bbox = arc.bbox(None);
        assert_approx_eq!(bbox.x(), -2.0, 1e-6);
        assert_approx_eq!(bbox.y(), 0.0, 1e-6);
        assert_approx_eq!(bbox.width(), 4.0, 1e-6);
        assert_approx_eq!(bbox.height(), 1.0, 1e-6);

        let empty = EllipArc::new(Point::new(1.0, 1.0), 2.0, 1.0, 0.0, 0.0);
        assert_eq!(empty.to_cubics().count(), 0);
        assert_eq!(empty.bbox(None), Rect::new(3.0, 1.0, 0.0, 0.0));
        assert!(empty.reverse().end().is_near(empty.start(), 1e-9));
    }

    #[test]
    fn test_ellipse_path() {
        let ellipse = Ellipse::new(0.0, 0.0, 4.0, 2.0);
        let commands: Vec<_> = ellipse.path_iter(None).collect();
        assert_eq!(commands.len(), 6);
        assert_eq!(commands[0], PathCommand::MoveTo(Point::new(4.0, 1.0)));
        assert_eq!(commands[5], PathCommand::Close);
        // last quarter is snapped to the start
        assert_eq!(commands[4].end_point(), Some(Point::new(4.0, 1.0)));
        // first quarter goes towards the bottom
        let p = commands[1].end_point().unwrap();
        assert!(p.is_near(Point::new(2.0, 2.0), 1e-9));

        assert_eq!(ellipse.bounds(), Rect::new(0.0, 0.0, 4.0, 2.0));
        let computed = ellipse.path_iter(None).bounds();
        assert_approx_eq!(computed.x(), 0.0, 1e-9);
        assert_approx_eq!(computed.max_x(), 4.0, 1e-9);
        assert_approx_eq!(computed.max_y(), 2.0, 1e-9);
    }

    #[test]
    fn test_ellipse_contains() {
        let ellipse = Ellipse::new(0.0, 0.0, 2.0, 2.0);
        assert!(ellipse.contains(1.0, 1.0));
        assert!(!ellipse.contains(0.0, 0.0));
        assert!(!ellipse.contains(2.0, 2.0));
        assert!(ellipse.contains(1.5, 1.5));
        assert!(!ellipse.contains(1.8, 1.8));
        assert_approx_eq!(ellipse.area(), PI, 1e-2);

        let circle = Ellipse::circle((5.0, 5.0), 1.0);
        assert_eq!(circle.rect(), Rect::new(4.0, 4.0, 2.0, 2.0));
        assert_eq!(circle.center(), Point::new(5.0, 5.0));
    }

    #[test]
    fn test_ellipse_radius() {
        let circle = Ellipse::circle((0.0, 0.0), 100.0);
        assert_approx_eq!(circle.area(), PI * 1e4, 20.0);
        // middle of a quarter stays on the circle
        let Some(PathCommand::CubicTo(p1, p2, p3)) = circle.path_iter(None).nth(1) else {
            panic!("cubic expected");
        };
        let mid = Cubic([Point::new(100.0, 0.0), p1, p2, p3]).at(0.5);
        assert_approx_eq!(mid.length(), 100.0, 1e-2);

        assert_eq!(Ellipse::new(5.0, 5.0, 0.0, 10.0).path_iter(None).count(), 0);
        assert_eq!(Ellipse::new(5.0, 5.0, 10.0, 0.0).segments().count(), 0);
    }

    #[test]
    fn test_arc_pie() {
        let arc = Arc::new(0.0, 0.0, 2.0, 2.0, 0.0, 90.0);
        let verbs: Vec<_> = arc.path_iter(None).map(|cmd| cmd.verb()).collect();
        assert_eq!(
            verbs,
            vec![
                PathVerb::MoveTo,
                PathVerb::LineTo,
                PathVerb::CubicTo,
                PathVerb::Close
            ]
        );
        let commands: Vec<_> = arc.path_iter(None).collect();
        // pie starts at the center
        assert_eq!(commands[0], PathCommand::MoveTo(Point::new(1.0, 1.0)));
        assert!(commands[2].end_point().unwrap().is_near(Point::new(1.0, 2.0), 1e-9));

        assert!(arc.contains(1.5, 1.5));
        assert!(!arc.contains(0.5, 0.5));
        assert!(!arc.contains(1.5, 0.5));
        assert_approx_eq!(arc.area(), PI / 4.0, 1e-2);
    }

    #[test]
    fn test_arc_closure() {
        let chord = Arc::new(0.0, 0.0, 2.0, 2.0, 0.0, 180.0).with_closure(ArcClosure::Chord);
        let commands: Vec<_> = chord.path_iter(None).collect();
        assert_eq!(commands[0], PathCommand::MoveTo(Point::new(2.0, 1.0)));
        assert_eq!(commands.len(), 4);
        assert_eq!(commands[3], PathCommand::Close);
        assert_approx_eq!(chord.area(), PI / 2.0, 1e-2);

        let open = chord.with_closure(ArcClosure::Open);
        assert_eq!(open.path_iter(None).count(), 3);
        assert!(!open.is_closed());
        assert!(chord.is_closed());
    }

    #[test]
    fn test_arc_hole() {
        let ring = Arc::new(0.0, 0.0, 4.0, 4.0, 0.0, 360.0).with_hole_ratio(0.5);
        let verbs: Vec<_> = ring.path_iter(None).map(|cmd| cmd.verb()).collect();
        assert_eq!(verbs.iter().filter(|v| **v == PathVerb::MoveTo).count(), 2);
        assert_eq!(verbs.iter().filter(|v| **v == PathVerb::Close).count(), 2);
        // hole is wound in the opposite direction
        assert!(!ring.contains(2.0, 2.0));
        assert!(ring.contains(3.5, 2.0));
        assert_approx_eq!(ring.area(), 4.0 * PI - PI, 5e-2);

        let half = Arc::new(0.0, 0.0, 4.0, 4.0, 0.0, 180.0).with_hole_ratio(0.5);
        let commands: Vec<_> = half.path_iter(None).collect();
        assert_eq!(commands[0], PathCommand::MoveTo(Point::new(3.0, 2.0)));
        assert!(half.contains(2.0, 3.5));
        assert!(!half.contains(2.0, 2.5));
    }
}
