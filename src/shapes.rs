//! Basic shapes: rectangles, rounded rectangles and polygons
use crate::{EPSILON, Line, PI, Path, PathCommand, PathIter, Point, Rect, Scalar, Shape, Transform};

impl Shape for Rect {
    fn path_iter(&self, transform: Option<Transform>) -> PathIter<'_> {
        if self.is_empty() {
            return PathIter::new(Vec::new(), transform);
        }
        let [p0, p1, p2, p3] = self.points();
        let commands = vec![
            PathCommand::MoveTo(p0),
            PathCommand::LineTo(p1),
            PathCommand::LineTo(p2),
            PathCommand::LineTo(p3),
            PathCommand::Close,
        ];
        PathIter::new(commands, transform)
    }

    fn as_rect(&self) -> Option<Rect> {
        Some(*self)
    }

    fn bounds(&self) -> Rect {
        *self
    }

    /// Half-open containment, points on the right and bottom edges are outside
    fn contains(&self, x: Scalar, y: Scalar) -> bool {
        self.x() <= x && x < self.max_x() && self.y() <= y && y < self.max_y()
    }
}

// -----------------------------------------------------------------------------
// RoundRect
// -----------------------------------------------------------------------------

/// Rectangle with rounded corners
///
/// Radius is clamped to half of the width and height, each corner can be
/// rounded individually.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoundRect {
    rect: Rect,
    radius: Scalar,
    // rounded corners in order nw, ne, se, sw
    corners: [bool; 4],
}

impl RoundRect {
    pub fn new(x: Scalar, y: Scalar, width: Scalar, height: Scalar, radius: Scalar) -> Self {
        Self::from_rect(Rect::new(x, y, width, height), radius)
    }

    pub fn from_rect(rect: Rect, radius: Scalar) -> Self {
        Self {
            rect,
            radius,
            corners: [true; 4],
        }
    }

    /// Copy with only the selected corners rounded
    pub fn with_corners(self, nw: bool, ne: bool, se: bool, sw: bool) -> Self {
        Self {
            corners: [nw, ne, se, sw],
            ..self
        }
    }

    pub fn with_radius(self, radius: Scalar) -> Self {
        Self { radius, ..self }
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn radius(&self) -> Scalar {
        self.radius
    }

    /// Rounded corners in order `nw, ne, se, sw`
    pub fn corners(&self) -> [bool; 4] {
        self.corners
    }

    fn to_path(&self) -> Path {
        let rect = self.rect;
        let mut path = Path::new();
        if rect.width() < 0.0 || rect.height() < 0.0 {
            return path;
        }
        let rw = self.radius.min(rect.width() / 2.0);
        let rh = self.radius.min(rect.height() / 2.0);
        let [nw, ne, se, sw] = self.corners;
        let (x, y, max_x, max_y) = (rect.x(), rect.y(), rect.max_x(), rect.max_y());

        path.move_to((if nw { x + rw } else { x }, y));
        if ne {
            path.line_to((max_x - rw, y))
                .arc_to_corner((max_x, y), (max_x, y + rh));
        } else {
            path.line_to((max_x, y));
        }
        if se {
            path.line_to((max_x, max_y - rh))
                .arc_to_corner((max_x, max_y), (max_x - rw, max_y));
        } else {
            path.line_to((max_x, max_y));
        }
        if sw {
            path.line_to((x + rw, max_y))
                .arc_to_corner((x, max_y), (x, max_y - rh));
        } else {
            path.line_to((x, max_y));
        }
        if nw {
            path.line_to((x, y + rh))
                .arc_to_corner((x, y), (x + rw, y));
        }
        path.close();
        path
    }
}

impl Shape for RoundRect {
    fn path_iter(&self, transform: Option<Transform>) -> PathIter<'_> {
        if self.radius <= 0.0 {
            return self.rect.path_iter(transform);
        }
        PathIter::new(self.to_path().commands().to_vec(), transform)
    }

    fn bounds(&self) -> Rect {
        self.rect
    }
}

// -----------------------------------------------------------------------------
// Polygon
// -----------------------------------------------------------------------------

/// Closed polygon defined by its vertices
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Polygon {
    points: Vec<Point>,
}

impl Polygon {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    pub fn point(&self, index: usize) -> Option<Point> {
        self.points.get(index).copied()
    }

    pub fn last_point(&self) -> Option<Point> {
        self.points.last().copied()
    }

    pub fn add_point(&mut self, point: impl Into<Point>) {
        self.points.push(point.into());
    }

    /// Replace vertex at `index`, returns the previous value
    pub fn set_point(&mut self, index: usize, point: impl Into<Point>) -> Option<Point> {
        let slot = self.points.get_mut(index)?;
        Some(std::mem::replace(slot, point.into()))
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    /// Side starting at vertex `index`
    fn side(&self, index: usize) -> Line {
        let count = self.points.len();
        Line([self.points[index % count], self.points[(index + 1) % count]])
    }

    /// Whether sides of the polygon do not intersect each other
    ///
    /// Polygons with less than three vertices are never simple.
    pub fn is_simple(&self) -> bool {
        let count = self.points.len();
        if count < 3 {
            return false;
        }
        for i in 0..count - 1 {
            let side = self.side(i);
            let next = self.side(i + 1);
            // next side doubles back over this one
            let (d0, d1) = (side.direction(), next.direction());
            if d0.cross(d1).abs() < EPSILON && d0.dot(d1) < 0.0 {
                return false;
            }
            for k in i + 2..count {
                // first and last sides share a vertex
                if i == 0 && k == count - 1 {
                    continue;
                }
                if side.intersect_segment(self.side(k)).is_some() {
                    return false;
                }
            }
        }
        true
    }

    /// Unsigned angle (radians) between sides meeting at vertex `index`
    pub fn angle_at(&self, index: usize) -> Scalar {
        let count = self.points.len();
        if count < 3 {
            return 0.0;
        }
        let index = index % count;
        let point = self.points[index];
        let prev = self.points[(index + count - 1) % count];
        let next = self.points[(index + 1) % count];
        let (v0, v1) = (prev - point, next - point);
        v0.cross(v1).abs().atan2(v0.dot(v1))
    }

    /// Convex polygons turn exactly once around while walking the sides
    pub fn is_convex(&self) -> bool {
        let count = self.points.len();
        if count < 3 {
            return true;
        }
        let exterior: Scalar = (0..count).map(|index| PI - self.angle_at(index)).sum();
        (exterior - 2.0 * PI).abs() < 1e-6
    }
}

impl From<Vec<Point>> for Polygon {
    fn from(points: Vec<Point>) -> Self {
        Self::new(points)
    }
}

impl FromIterator<Point> for Polygon {
    fn from_iter<T: IntoIterator<Item = Point>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Commands of a closed polygon
fn polygon_commands(points: &[Point], commands: &mut Vec<PathCommand>) {
    if let Some((first, rest)) = points.split_first() {
        commands.push(PathCommand::MoveTo(*first));
        commands.extend(rest.iter().map(|p| PathCommand::LineTo(*p)));
        commands.push(PathCommand::Close);
    }
}

impl Shape for Polygon {
    fn path_iter(&self, transform: Option<Transform>) -> PathIter<'_> {
        let mut commands = Vec::with_capacity(self.points.len() + 1);
        polygon_commands(&self.points, &mut commands);
        PathIter::new(commands, transform)
    }

    fn is_simple(&self) -> bool {
        Polygon::is_simple(self)
    }

    fn bounds(&self) -> Rect {
        let mut points = self.points.iter();
        let Some(first) = points.next() else {
            return Rect::empty();
        };
        points.fold(Rect::from_points(*first, *first), |mut bounds, p| {
            bounds.add(p.x(), p.y());
            bounds
        })
    }
}

// -----------------------------------------------------------------------------
// PolygonList
// -----------------------------------------------------------------------------

/// Sequence of closed polygons forming a single shape
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PolygonList {
    polygons: Vec<Polygon>,
}

impl PolygonList {
    pub fn new(polygons: Vec<Polygon>) -> Self {
        Self { polygons }
    }

    /// Polygons approximating the flattened outline of the shape
    pub fn from_shape(shape: &(impl Shape + ?Sized)) -> Self {
        let mut list = PolygonList::default();
        for cmd in shape.flat().path_iter(None) {
            match cmd {
                PathCommand::MoveTo(p) => list.move_to(p),
                PathCommand::LineTo(p) => list.line_to(p),
                // flat path contains lines only, all polygons are closed
                _ => {}
            }
        }
        list.polygons.retain(|polygon| polygon.point_count() > 1);
        list
    }

    pub fn polygons(&self) -> &[Polygon] {
        &self.polygons
    }

    pub fn polygon_count(&self) -> usize {
        self.polygons.len()
    }

    pub fn add_polygon(&mut self, polygon: Polygon) {
        self.polygons.push(polygon);
    }

    pub fn last_point(&self) -> Option<Point> {
        self.polygons.last()?.last_point()
    }

    /// Start a new polygon, replaces the start of a polygon without sides
    pub fn move_to(&mut self, point: impl Into<Point>) {
        let point = point.into();
        match self.polygons.last_mut() {
            Some(polygon) if polygon.point_count() == 1 => {
                polygon.set_point(0, point);
            }
            _ => self.polygons.push(Polygon::new(vec![point])),
        }
    }

    /// Add vertex to the current polygon, returning to its first vertex is ignored
    pub fn line_to(&mut self, point: impl Into<Point>) {
        let point = point.into();
        if self.polygons.is_empty() {
            self.move_to(Point::default());
        }
        if let Some(polygon) = self.polygons.last_mut() {
            if polygon.point(0) == Some(point) {
                return;
            }
            polygon.add_point(point);
        }
    }
}

impl From<Vec<Polygon>> for PolygonList {
    fn from(polygons: Vec<Polygon>) -> Self {
        Self::new(polygons)
    }
}

impl Shape for PolygonList {
    fn path_iter(&self, transform: Option<Transform>) -> PathIter<'_> {
        let mut commands = Vec::new();
        for polygon in self.polygons.iter() {
            polygon_commands(polygon.points(), &mut commands);
        }
        PathIter::new(commands, transform)
    }

    fn bounds(&self) -> Rect {
        let mut polygons = self.polygons.iter().filter(|p| p.point_count() > 0);
        let Some(first) = polygons.next() else {
            return Rect::empty();
        };
        polygons.fold(first.bounds(), |mut bounds, polygon| {
            bounds.add_rect(&polygon.bounds());
            bounds
        })
    }
}
