//! Shape trait and the algorithms shared by all shapes
use crate::{
    CommandsDisplay, Cubic, Curve, DEFAULT_FLATNESS, Path, PathCommand, PathIter, Point, Quad,
    Rect, Scalar, Segment, SegmentIter, Transform,
};

/// Closed or open 2D outline described by a sequence of path commands
///
/// Only `path_iter` is required, all other operations are derived from it
/// and can be overridden when a shape knows a faster way. Containment uses
/// the non-zero winding rule.
pub trait Shape {
    /// Iterator over path commands of the shape, optionally transformed
    fn path_iter(&self, transform: Option<Transform>) -> PathIter<'_>;

    /// Rectangle equivalent to this shape, enables rectangle specific fast paths
    fn as_rect(&self) -> Option<Rect> {
        None
    }

    /// Bounding box of the shape, curves are bound by their extrema
    fn bounds(&self) -> Rect {
        self.path_iter(None).bounds()
    }

    /// Segments of the shape with all subpaths closed
    fn segments(&self) -> SegmentIter<'_> {
        self.path_iter(None).segments(true)
    }

    /// Signed number of crossings between the outline and the ray going from
    /// `(x, y)` in the direction of positive x
    fn crossings(&self, x: Scalar, y: Scalar) -> i32 {
        self.segments()
            .map(|segment| segment.crossings(x, y))
            .sum()
    }

    /// Whether the point is inside of the shape
    fn contains(&self, x: Scalar, y: Scalar) -> bool {
        self.bounds().covers(x, y) && self.crossings(x, y) != 0
    }

    fn contains_point(&self, point: Point) -> bool {
        self.contains(point.x(), point.y())
    }

    /// Whether all segments of `other` are inside of this shape
    fn contains_shape(&self, other: &dyn Shape) -> bool {
        outline_contains(self, other.bounds(), other.segments())
    }

    /// Segment is contained if both its end points are contained and
    /// it does not cross the outline
    fn contains_segment(&self, segment: &Segment) -> bool {
        self.contains_point(segment.start())
            && self.contains_point(segment.end())
            && !self.crosses_segment(segment)
    }

    /// Whether any segment of the outline hits `segment`
    fn crosses_segment(&self, segment: &Segment) -> bool {
        if !self.bounds().touches(&segment.bbox(None)) {
            return false;
        }
        self.segments().any(|own| own.hit(segment).is_some())
    }

    /// Segment either crosses the outline or lies inside of the shape
    fn intersects_segment(&self, segment: &Segment) -> bool {
        self.crosses_segment(segment) || self.contains_point(segment.start())
    }

    /// Whether shapes share any area or outline points
    ///
    /// Shapes with merely touching bounds never intersect.
    fn intersects(&self, other: &dyn Shape) -> bool {
        if let (Some(r0), Some(r1)) = (self.as_rect(), other.as_rect()) {
            return r0.intersects_rect(&r1);
        }
        let (bounds0, bounds1) = (self.bounds(), other.bounds());
        if !bounds0.intersects_rect(&bounds1) {
            return false;
        }
        let segments0: Vec<Segment> = self.segments().collect();
        for s1 in other.segments() {
            if segments0.iter().any(|s0| s0.hit(&s1).is_some()) {
                return true;
            }
        }
        outline_contains(self, bounds1, other.segments())
            || outline_contains(other, bounds0, segments0.into_iter())
    }

    /// Distance from the point to the closest point of the outline
    fn distance(&self, x: Scalar, y: Scalar) -> Scalar {
        let point = Point::new(x, y);
        self.segments()
            .map(|segment| segment.distance_sq(point))
            .fold(Scalar::INFINITY, Scalar::min)
            .sqrt()
    }

    /// Whether the point is inside of the shape or under its outline stroked
    /// with `line_width`
    ///
    /// Thin lines (up to a single unit) do not extend the shape.
    fn contains_stroked(&self, x: Scalar, y: Scalar, line_width: Scalar) -> bool {
        if line_width <= 1.0 {
            return self.contains(x, y);
        }
        let half = line_width / 2.0;
        self.bounds().inset(-half, -half).covers(x, y)
            && (self.contains(x, y) || self.distance(x, y) <= half)
    }

    /// Whether the point is under the outline stroked with `line_width`
    fn hits_stroke(&self, x: Scalar, y: Scalar, line_width: Scalar) -> bool {
        let half = line_width / 2.0;
        self.bounds().inset(-half, -half).covers(x, y) && self.distance(x, y) <= half
    }

    /// Whether `other` intersects this shape with its outline stroked with `line_width`
    fn intersects_stroked(&self, other: &dyn Shape, line_width: Scalar) -> bool {
        if line_width <= 1.0 {
            return self.intersects(other);
        }
        let half = line_width / 2.0;
        if !self.bounds().inset(-half, -half).intersects_rect(&other.bounds()) {
            return false;
        }
        // closest points of disjoint outlines include a vertex of one of them
        self.intersects(other)
            || vertex_within(other, self, half)
            || vertex_within(self, other, half)
    }

    /// Whether segments of the outline meet only at their end points
    fn is_simple(&self) -> bool {
        let segments: Vec<Segment> = self.segments().collect();
        segments.iter().enumerate().all(|(index, s0)| {
            segments[index + 1..].iter().all(|s1| {
                s0.hit_where(s1, |hit| s0.is_interior(hit.h0) || s1.is_interior(hit.h1))
                    .is_none()
            })
        })
    }

    /// Length of the closed outline, approximated by flattening
    fn arc_length(&self) -> Scalar {
        self.segments()
            .flat_map(|segment| segment.flatten(Transform::identity(), DEFAULT_FLATNESS))
            .map(|line| line.length())
            .sum()
    }

    /// Area enclosed by the outline
    ///
    /// Signed areas of all subpaths are summed, so oppositely wound
    /// subpaths cut holes.
    fn area(&self) -> Scalar {
        self.segments()
            .map(|segment| segment.signed_area())
            .sum::<Scalar>()
            .abs()
    }

    /// Whether every subpath is closed, either explicitly or by ending at its start
    fn is_closed(&self) -> bool {
        let mut start = Point::default();
        let mut last = Point::default();
        let mut closed = true;
        for cmd in self.path_iter(None) {
            match cmd {
                PathCommand::MoveTo(p) => {
                    if !closed && !last.is_close_to(start) {
                        return false;
                    }
                    start = p;
                    closed = true;
                }
                PathCommand::Close => closed = true,
                cmd => {
                    last = cmd.end_point().unwrap_or(last);
                    closed = false;
                }
            }
        }
        closed || last.is_close_to(start)
    }

    /// Whether the shape consists of lines only
    fn is_flat(&self) -> bool {
        self.path_iter(None).all(|cmd| {
            !matches!(cmd, PathCommand::QuadTo(..) | PathCommand::CubicTo(..))
        })
    }

    /// Same outline with curves replaced by lines
    fn flat(&self) -> Path {
        let mut path = Path::new();
        let mut start = Point::default();
        let mut current = Point::default();
        for cmd in self.path_iter(None) {
            let segment: Segment = match cmd {
                PathCommand::MoveTo(p) => {
                    path.move_to(p);
                    start = p;
                    current = p;
                    continue;
                }
                PathCommand::LineTo(p) => {
                    path.line_to(p);
                    current = p;
                    continue;
                }
                PathCommand::Close => {
                    path.close();
                    current = start;
                    continue;
                }
                PathCommand::QuadTo(p1, p2) => Quad([current, p1, p2]).into(),
                PathCommand::CubicTo(p1, p2, p3) => Cubic([current, p1, p2, p3]).into(),
            };
            for line in segment.flatten(Transform::identity(), DEFAULT_FLATNESS) {
                path.line_to(line.end());
            }
            current = segment.end();
        }
        path
    }

    /// Whether drawing commands appear in a single subpath only
    fn is_single_path(&self) -> bool {
        let mut moves = 0;
        for cmd in self.path_iter(None) {
            match cmd {
                PathCommand::MoveTo(_) => moves += 1,
                PathCommand::Close => {}
                _ if moves > 1 => return false,
                _ => {}
            }
        }
        true
    }

    /// Start of the first subpath that draws anything
    fn first_move_to(&self) -> Option<Point> {
        let mut result = None;
        for cmd in self.path_iter(None) {
            match cmd {
                PathCommand::MoveTo(p) => result = Some(p),
                PathCommand::Close => {}
                _ => break,
            }
        }
        result
    }

    /// Copy of the shape transformed by `tr`
    fn copy_for(&self, tr: Transform) -> Path {
        self.path_iter(Some(tr)).collect()
    }

    /// Copy of the shape scaled and moved so its bounds match `rect`
    fn copy_for_rect(&self, rect: Rect) -> Path {
        self.copy_for(Transform::fit(self.bounds(), rect))
    }

    /// SVG path data with one command per line
    fn to_svg_string(&self) -> String {
        let commands: Vec<PathCommand> = self.path_iter(None).collect();
        if commands.is_empty() {
            return String::new();
        }
        format!("{}\n", CommandsDisplay::new(&commands, "\n"))
    }
}

/// Whether `container` contains every segment of an outline with `bounds`
fn outline_contains(
    container: &(impl Shape + ?Sized),
    bounds: Rect,
    mut segments: impl Iterator<Item = Segment>,
) -> bool {
    if let Some(rect) = container.as_rect() {
        return rect.contains_rect(&bounds);
    }
    container.bounds().contains_rect(&bounds)
        && segments.all(|segment| container.contains_segment(&segment))
}

/// Whether any vertex of the flattened outline of `from` is within `distance` of `to`
fn vertex_within(
    from: &(impl Shape + ?Sized),
    to: &(impl Shape + ?Sized),
    distance: Scalar,
) -> bool {
    from.flat()
        .path_iter(None)
        .filter_map(|cmd| cmd.end_point())
        .any(|p| to.distance(p.x(), p.y()) <= distance)
}
