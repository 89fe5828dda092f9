//! Boolean operations (add, subtract, intersect) on shapes
//!
//! Outlines of both shapes are converted to segment lists and split at every
//! mutual intersection, so that the outlines meet only at segment end points.
//! Resulting outline is then traced by walking from segment to segment,
//! picking at each junction a segment which belongs to the result.
use crate::{Curve, POINT_TOLERANCE, Path, Point, Scalar, Segment, Shape};
use std::fmt;

/// Maximum number of segments a single boolean operation walk can produce
pub const MAX_WALK_SEGMENTS: usize = 30;

/// Parameter step used to estimate segment direction
const SIDE_STEP: Scalar = 1e-3;

/// Distance from a shared segment at which its sides are tested
const SIDE_OFFSET: Scalar = POINT_TOLERANCE / 2.0;

/// Boolean operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeOp {
    /// Union of both shapes
    Add,
    /// Area of the first shape not covered by the second one
    Subtract,
    /// Area covered by both shapes
    Intersect,
}

impl fmt::Display for ShapeOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ShapeOp::Add => "add",
            ShapeOp::Subtract => "subtract",
            ShapeOp::Intersect => "intersect",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ShapeOpError {
    /// No segment of the first shape can start the walk
    NoSeed { op: ShapeOp },
    /// Walk produced too many segments, `partial` contains the result so far
    SegmentLimit { op: ShapeOp, partial: Path },
}

impl fmt::Display for ShapeOpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShapeOpError::NoSeed { op } => {
                write!(f, "[{}] failed to find a segment to start from", op)
            }
            ShapeOpError::SegmentLimit { op, .. } => write!(
                f,
                "[{}] walk exceeded {} segments",
                op, MAX_WALK_SEGMENTS
            ),
        }
    }
}

impl std::error::Error for ShapeOpError {}

impl From<ShapeOpError> for std::io::Error {
    fn from(error: ShapeOpError) -> Self {
        Self::other(error)
    }
}

/// Boolean operations on shapes
///
/// Plain variants never fail, they log a warning and fall back to the first
/// shape (no seed) or to the partial result (segment limit). Checked `try_*`
/// variants report these conditions as errors instead.
pub struct ShapeMaker;

impl ShapeMaker {
    /// Area covered by both shapes
    pub fn intersect(a: &dyn Shape, b: &dyn Shape) -> Path {
        Self::apply(ShapeOp::Intersect, a, b).unwrap_or_else(recover)
    }

    /// Area covered by either of the shapes
    pub fn add(a: &dyn Shape, b: &dyn Shape) -> Path {
        Self::apply(ShapeOp::Add, a, b).unwrap_or_else(recover)
    }

    /// Area of `a` not covered by `b`
    pub fn subtract(a: &dyn Shape, b: &dyn Shape) -> Path {
        Self::apply(ShapeOp::Subtract, a, b).unwrap_or_else(recover)
    }

    pub fn try_intersect(a: &dyn Shape, b: &dyn Shape) -> Result<Path, ShapeOpError> {
        Self::apply(ShapeOp::Intersect, a, b).map_err(|failure| failure.error)
    }

    pub fn try_add(a: &dyn Shape, b: &dyn Shape) -> Result<Path, ShapeOpError> {
        Self::apply(ShapeOp::Add, a, b).map_err(|failure| failure.error)
    }

    pub fn try_subtract(a: &dyn Shape, b: &dyn Shape) -> Result<Path, ShapeOpError> {
        Self::apply(ShapeOp::Subtract, a, b).map_err(|failure| failure.error)
    }

    /// Apply boolean operation `op` to a pair of shapes
    pub fn apply_op(op: ShapeOp, a: &dyn Shape, b: &dyn Shape) -> Path {
        Self::apply(op, a, b).unwrap_or_else(recover)
    }

    /// Same outline split into loops which do not cross each other
    ///
    /// Outline is split at every self intersection and each closed loop
    /// becomes a separate subpath. Simple shapes are returned unchanged.
    pub fn make_simple(shape: &dyn Shape) -> Path {
        tracing::debug_span!("[make_simple]").in_scope(|| {
            let mut list = SegmentList::new(shape);
            if !split_self(&mut list.segments) {
                return Path::from_shape(shape);
            }
            let loops = extract_loops(list.segments);
            tracing::debug!("[make_simple] {} segments", loops.len());
            rebuild(&loops)
        })
    }

    fn apply(op: ShapeOp, a: &dyn Shape, b: &dyn Shape) -> Result<Path, OpFailure> {
        tracing::debug_span!("[shape_op]", %op).in_scope(|| {
            if let Some(path) = fast_path(op, a, b) {
                return Ok(path);
            }
            let mut seg_a = SegmentList::new(a);
            let mut seg_b = SegmentList::new(b);
            if let Some(path) = identical(op, &seg_a, &seg_b) {
                return Ok(path);
            }
            if let Some(path) = containment(op, a, b, &seg_a) {
                return Ok(path);
            }

            split_mutual(&mut seg_a, &mut seg_b);
            if let Some(path) = identical(op, &seg_a, &seg_b) {
                return Ok(path);
            }

            let lists = [&seg_a, &seg_b];
            let Some((owner, seed)) = find_seed(op, lists) else {
                tracing::warn!("[shape_op] {}: no seed segment found", op);
                return Err(OpFailure {
                    error: ShapeOpError::NoSeed { op },
                    fallback: Path::from_shape(a),
                });
            };
            let walk = walk(op, lists, owner, seed);
            let path = rebuild(&walk.segments);
            if walk.aborted {
                tracing::warn!(
                    "[shape_op] {}: aborted after {} segments",
                    op,
                    walk.segments.len()
                );
                return Err(OpFailure {
                    error: ShapeOpError::SegmentLimit {
                        op,
                        partial: path.clone(),
                    },
                    fallback: path,
                });
            }
            tracing::debug!("[shape_op] {}: {} segments", op, walk.segments.len());
            Ok(path)
        })
    }
}

/// Failed operation together with the path plain variants return
struct OpFailure {
    error: ShapeOpError,
    fallback: Path,
}

fn recover(failure: OpFailure) -> Path {
    failure.fallback
}

// -----------------------------------------------------------------------------
// Fast paths
// -----------------------------------------------------------------------------

/// Rectangles and disjoint shapes
fn fast_path(op: ShapeOp, a: &dyn Shape, b: &dyn Shape) -> Option<Path> {
    if let (ShapeOp::Intersect, Some(ra), Some(rb)) = (op, a.as_rect(), b.as_rect()) {
        tracing::debug!("[shape_op] rectangles intersection");
        let rect = ra.intersect_rect(&rb);
        if rect.is_empty() {
            return Some(Path::new());
        }
        return Some(Path::from_shape(&rect));
    }
    if a.intersects(b) {
        return None;
    }
    tracing::debug!("[shape_op] {}: shapes are disjoint", op);
    let path = match op {
        ShapeOp::Intersect => Path::new(),
        ShapeOp::Subtract => Path::from_shape(a),
        ShapeOp::Add => {
            let mut path = Path::from_shape(a);
            append_oriented(&mut path, b, signed_area(a.segments()) >= 0.0);
            path
        }
    };
    Some(path)
}

/// One shape contains the other
fn containment(
    op: ShapeOp,
    a: &dyn Shape,
    b: &dyn Shape,
    seg_a: &SegmentList,
) -> Option<Path> {
    if a.contains_shape(b) {
        tracing::debug!("[shape_op] {}: first shape contains second", op);
        let path = match op {
            ShapeOp::Intersect => Path::from_shape(b),
            ShapeOp::Add => Path::from_shape(a),
            ShapeOp::Subtract => {
                // hole is wound in the opposite direction
                let mut path = Path::from_shape(a);
                append_oriented(&mut path, b, seg_a.signed_area() < 0.0);
                path
            }
        };
        return Some(path);
    }
    if b.contains_shape(a) {
        tracing::debug!("[shape_op] {}: second shape contains first", op);
        let path = match op {
            ShapeOp::Intersect => Path::from_shape(a),
            ShapeOp::Add => Path::from_shape(b),
            ShapeOp::Subtract => Path::new(),
        };
        return Some(path);
    }
    None
}

/// Both outlines consist of the same segments
fn identical(op: ShapeOp, seg_a: &SegmentList, seg_b: &SegmentList) -> Option<Path> {
    let same = !seg_a.segments.is_empty()
        && seg_a.segments.len() == seg_b.segments.len()
        && seg_a.segments.iter().all(|segment| seg_b.has_seg(segment));
    if !same {
        return None;
    }
    tracing::debug!("[shape_op] {}: outlines are identical", op);
    match op {
        ShapeOp::Add | ShapeOp::Intersect => Some(Path::from_shape(seg_a.shape)),
        ShapeOp::Subtract => Some(Path::new()),
    }
}

/// Append `shape` to the `path` so its area has the requested sign
fn append_oriented(path: &mut Path, shape: &dyn Shape, positive: bool) {
    if (signed_area(shape.segments()) >= 0.0) == positive {
        path.append_shape(shape);
    } else {
        path.append_shape(&Path::from_shape(shape).reverse());
    }
}

fn signed_area(segments: impl IntoIterator<Item = Segment>) -> Scalar {
    segments.into_iter().map(|segment| segment.signed_area()).sum()
}

// -----------------------------------------------------------------------------
// Segment lists
// -----------------------------------------------------------------------------

/// Closed outline of a shape as a list of segments
struct SegmentList<'a> {
    shape: &'a dyn Shape,
    segments: Vec<Segment>,
}

impl<'a> SegmentList<'a> {
    fn new(shape: &'a dyn Shape) -> Self {
        let segments = shape
            .segments()
            .filter(|segment| {
                let start = segment.start();
                segment.points().iter().any(|p| *p != start)
            })
            .collect();
        Self { shape, segments }
    }

    fn signed_area(&self) -> Scalar {
        signed_area(self.segments.iter().copied())
    }

    /// Point is either one of the end points or it is inside of the outline
    fn contains(&self, point: Point) -> bool {
        if self
            .segments
            .iter()
            .any(|segment| segment.end().is_near(point, POINT_TOLERANCE))
        {
            return true;
        }
        self.winding(point) != 0
    }

    /// Non-zero winding of the outline around the point
    fn winding(&self, point: Point) -> i32 {
        self.segments
            .iter()
            .map(|segment| segment.crossings(point.x(), point.y()))
            .sum()
    }

    fn contains_mid(&self, segment: &Segment) -> bool {
        self.contains(segment.at(0.5))
    }

    /// Contains matching segment in either direction
    fn has_seg(&self, segment: &Segment) -> bool {
        self.segments.iter().any(|other| other.matches(segment))
    }

    /// Segments connected to `point`, oriented so they start at it
    fn joined_at(&self, point: Point) -> impl Iterator<Item = Segment> + '_ {
        self.segments.iter().flat_map(move |segment| {
            let start = segment
                .start()
                .is_near(point, POINT_TOLERANCE)
                .then_some(*segment);
            let end = segment
                .end()
                .is_near(point, POINT_TOLERANCE)
                .then(|| segment.reverse());
            start.into_iter().chain(end)
        })
    }
}

/// End point of the segment closest to `point`
fn nearest_end(segment: &Segment, point: Point) -> Point {
    let (start, end) = (segment.start(), segment.end());
    if start.dist_sq(point) <= end.dist_sq(point) {
        start
    } else {
        end
    }
}

fn set_end(segment: &mut Segment, point: Point) {
    if let Some(last) = segment.points_mut().last_mut() {
        *last = point;
    }
}

fn set_start(segment: &mut Segment, point: Point) {
    if let Some(first) = segment.points_mut().first_mut() {
        *first = point;
    }
}

/// Split segments of both lists at their mutual intersections
///
/// Tails are inserted right after the split segment, and split points are
/// snapped so both lists share exactly the same junctions. A split pair is
/// tested again, as its heads can still have another intersection.
fn split_mutual(seg_a: &mut SegmentList, seg_b: &mut SegmentList) {
    let (list_a, list_b) = (&mut seg_a.segments, &mut seg_b.segments);
    let mut i = 0;
    while i < list_a.len() {
        let mut j = 0;
        while j < list_b.len() {
            let (s0, s1) = (list_a[i], list_b[j]);
            let hit = s0.hit_where(&s1, |hit| s0.is_interior(hit.h0) || s1.is_interior(hit.h1));
            let Some(hit) = hit else {
                j += 1;
                continue;
            };
            let split0 = s0.is_interior(hit.h0);
            let split1 = s1.is_interior(hit.h1);
            let junction = if split0 {
                let tail = list_a[i].split_off(hit.h0);
                list_a.insert(i + 1, tail);
                list_a[i].end()
            } else {
                nearest_end(&s0, s1.at(hit.h1))
            };
            if split1 {
                let tail = list_b[j].split_off(hit.h1);
                list_b.insert(j + 1, tail);
                set_end(&mut list_b[j], junction);
                set_start(&mut list_b[j + 1], junction);
            } else {
                // snap the split point of the first list to the existing junction
                let junction = nearest_end(&s1, junction);
                set_end(&mut list_a[i], junction);
                set_start(&mut list_a[i + 1], junction);
            }
        }
        i += 1;
    }
}

/// Split segments of the list wherever the outline intersects itself
///
/// Returns `false` if the outline is already simple.
fn split_self(segments: &mut Vec<Segment>) -> bool {
    let mut split = false;
    let mut i = 0;
    while i < segments.len() {
        let mut j = i + 1;
        while j < segments.len() {
            let (s0, s1) = (segments[i], segments[j]);
            let hit = s0.hit_where(&s1, |hit| s0.is_interior(hit.h0) || s1.is_interior(hit.h1));
            let Some(hit) = hit else {
                j += 1;
                continue;
            };
            split = true;
            let (split0, split1) = (s0.is_interior(hit.h0), s1.is_interior(hit.h1));
            let mut junction = if split0 {
                s0.at(hit.h0)
            } else {
                nearest_end(&s0, s1.at(hit.h1))
            };
            if split1 {
                let tail = segments[j].split_off(hit.h1);
                segments.insert(j + 1, tail);
                set_end(&mut segments[j], junction);
                set_start(&mut segments[j + 1], junction);
            } else {
                junction = nearest_end(&s1, junction);
            }
            if split0 {
                let tail = segments[i].split_off(hit.h0);
                segments.insert(i + 1, tail);
                set_end(&mut segments[i], junction);
                set_start(&mut segments[i + 1], junction);
            }
            // head of the segment is tested against the rest again
            j = i + 1;
        }
        i += 1;
    }
    split
}

/// Move closed loops out of the chain of segments
///
/// Whenever a segment ends at the start of one of the preceding segments,
/// the run between them is a loop and is moved to the result as a whole.
fn extract_loops(mut segments: Vec<Segment>) -> Vec<Segment> {
    let mut loops = Vec::with_capacity(segments.len());
    let mut i = 0;
    while i < segments.len() {
        let end = segments[i].end();
        match (0..i).find(|j| segments[*j].start().is_near(end, POINT_TOLERANCE)) {
            Some(j) => {
                loops.extend(segments.drain(j..=i));
                i = j;
            }
            None => i += 1,
        }
    }
    loops.extend(segments);
    loops
}

// -----------------------------------------------------------------------------
// Walk
// -----------------------------------------------------------------------------

/// Index of the list owning current segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Owner {
    A,
    B,
}

impl Owner {
    fn index(self) -> usize {
        match self {
            Owner::A => 0,
            Owner::B => 1,
        }
    }

    fn other(self) -> Self {
        match self {
            Owner::A => Owner::B,
            Owner::B => Owner::A,
        }
    }
}

/// Whether segment present in both outlines separates the result from the rest
///
/// Points slightly off the middle of the segment on both sides are tested, the
/// segment is a boundary if exactly one of them is in the result.
fn bounds_result(op: ShapeOp, lists: [&SegmentList; 2], segment: &Segment) -> bool {
    let tangent = segment.at(0.5 + SIDE_STEP) - segment.at(0.5 - SIDE_STEP);
    let Some(Point([tx, ty])) = tangent.normalize() else {
        return false;
    };
    let normal = SIDE_OFFSET * Point::new(-ty, tx);
    let mid = segment.at(0.5);
    let in_result = |point: Point| {
        let in_a = lists[0].winding(point) != 0;
        let in_b = lists[1].winding(point) != 0;
        match op {
            ShapeOp::Add => in_a || in_b,
            ShapeOp::Subtract => in_a && !in_b,
            ShapeOp::Intersect => in_a && in_b,
        }
    };
    in_result(mid + normal) != in_result(mid - normal)
}

/// Segment which belongs to the result and the list owning it
///
/// Segments of the first shape are tried first. Subtraction can also start
/// from a segment of the second shape inside of the first one, which is the
/// case when the first outline lies entirely on the second one.
fn find_seed(op: ShapeOp, lists: [&SegmentList; 2]) -> Option<(Owner, Segment)> {
    let [seg_a, seg_b] = lists;
    let seed_a = seg_a.segments.iter().find(|segment| {
        if seg_b.has_seg(segment) {
            return bounds_result(op, lists, segment);
        }
        match op {
            ShapeOp::Add | ShapeOp::Subtract => !seg_b.contains_mid(segment),
            ShapeOp::Intersect => seg_b.contains_mid(segment),
        }
    });
    if let Some(segment) = seed_a {
        return Some((Owner::A, *segment));
    }
    if op != ShapeOp::Subtract {
        return None;
    }
    seg_b
        .segments
        .iter()
        .find(|segment| !seg_a.has_seg(segment) && seg_a.contains_mid(segment))
        .map(|segment| (Owner::B, *segment))
}

/// Whether segment of the `owner` list continues the result
fn accepts(
    op: ShapeOp,
    owner: Owner,
    lists: [&SegmentList; 2],
    result: &[Segment],
    segment: &Segment,
) -> bool {
    if result.iter().any(|emitted| emitted.matches(segment)) {
        return false;
    }
    let other = lists[owner.other().index()];
    if other.has_seg(segment) {
        return bounds_result(op, lists, segment);
    }
    match op {
        ShapeOp::Add => !other.contains_mid(segment),
        ShapeOp::Subtract => (owner == Owner::A) != other.contains_mid(segment),
        ShapeOp::Intersect => other.contains(segment.end()) && other.contains_mid(segment),
    }
}

fn next_segment(
    op: ShapeOp,
    owner: Owner,
    lists: [&SegmentList; 2],
    result: &[Segment],
    point: Point,
) -> Option<Segment> {
    lists[owner.index()]
        .joined_at(point)
        .find(|segment| accepts(op, owner, lists, result, segment))
}

struct Walk {
    segments: Vec<Segment>,
    aborted: bool,
}

/// Trace the result starting from the `seed` segment of the `owner` list
fn walk(op: ShapeOp, lists: [&SegmentList; 2], mut owner: Owner, seed: Segment) -> Walk {
    let mut segments = vec![seed];
    let mut current = seed;
    loop {
        let point = current.end();
        let next = match next_segment(op, owner, lists, &segments, point) {
            Some(segment) => Some(segment),
            None => {
                let next = next_segment(op, owner.other(), lists, &segments, point);
                if next.is_some() {
                    owner = owner.other();
                }
                next
            }
        };
        let Some(mut next) = next else {
            return Walk {
                segments,
                aborted: false,
            };
        };
        if segments.len() >= MAX_WALK_SEGMENTS {
            return Walk {
                segments,
                aborted: true,
            };
        }
        set_start(&mut next, point);
        segments.push(next);
        current = next;
    }
}

/// Replay segments into a path, closing subpaths which return to their start
fn rebuild(segments: &[Segment]) -> Path {
    let mut path = Path::new();
    let mut start: Option<Point> = None;
    let mut current: Option<Point> = None;
    for segment in segments {
        let mut segment = *segment;
        match current {
            Some(point) if point.is_near(segment.start(), POINT_TOLERANCE) => {
                set_start(&mut segment, point);
            }
            _ => {
                path.move_to(segment.start());
                start = Some(segment.start());
            }
        }
        match start {
            Some(first) if segment.end().is_near(first, POINT_TOLERANCE) => {
                if !matches!(segment, Segment::Line(_)) {
                    set_end(&mut segment, first);
                    path.append_segment(segment);
                }
                path.close();
                start = None;
                current = None;
            }
            _ => {
                path.append_segment(segment);
                current = Some(segment.end());
            }
        }
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Ellipse, PI, Polygon, Rect, assert_approx_eq};

    fn square(x: Scalar, y: Scalar, size: Scalar) -> Path {
        Path::from_shape(&Rect::new(x, y, size, size))
    }

    #[test]
    fn test_rects_intersect() {
        let a = Rect::new(0.0, 0.0, 200.0, 200.0);
        let b = Rect::new(100.0, 100.0, 200.0, 200.0);
        let result = ShapeMaker::intersect(&a, &b);
        assert_eq!(result.bounds(), Rect::new(100.0, 100.0, 100.0, 100.0));
        assert_approx_eq!(result.area(), 10000.0);

        let far = Rect::new(500.0, 500.0, 10.0, 10.0);
        assert!(ShapeMaker::intersect(&a, &far).is_empty());
    }

    #[test]
    fn test_rect_minus_ellipse() {
        let rect = Rect::new(0.0, 0.0, 200.0, 200.0);
        let ellipse = Ellipse::new(125.0, 125.0, 200.0, 200.0);
        let result = ShapeMaker::try_subtract(&rect, &ellipse).unwrap();
        assert!(!result.is_empty());
        let bounds = result.bounds();
        assert_approx_eq!(bounds.x(), 0.0, 1e-6);
        assert_approx_eq!(bounds.y(), 0.0, 1e-6);
        assert_approx_eq!(bounds.width(), 200.0, 1e-6);
        assert_approx_eq!(bounds.height(), 200.0, 1e-6);
        assert!(result.area() < 40000.0);
        assert!(result.area() > 30000.0);
        assert!(result.contains(10.0, 10.0));
        assert!(!result.contains(190.0, 190.0));
        assert!(result.is_closed());
    }

    #[test]
    fn test_overlapping_squares() {
        let a = square(0.0, 0.0, 20.0);
        let b = square(10.0, 10.0, 20.0);

        let union = ShapeMaker::try_add(&a, &b).unwrap();
        assert_approx_eq!(union.area(), 700.0, 1e-6);
        assert!(union.contains(5.0, 5.0));
        assert!(union.contains(25.0, 25.0));
        assert!(!union.contains(25.0, 5.0));

        let inter = ShapeMaker::try_intersect(&a, &b).unwrap();
        assert_approx_eq!(inter.area(), 100.0, 1e-6);
        assert!(inter.contains(15.0, 15.0));
        assert!(!inter.contains(5.0, 5.0));

        let diff = ShapeMaker::try_subtract(&a, &b).unwrap();
        assert_approx_eq!(diff.area(), 300.0, 1e-6);
        assert!(diff.contains(5.0, 5.0));
        assert!(!diff.contains(15.0, 15.0));
    }

    #[test]
    fn test_shared_edges() {
        // top and bottom edges of the squares lie on the same lines
        let a = Path::from_shape(&Rect::new(0.0, 0.0, 20.0, 20.0));
        let b = Path::from_shape(&Rect::new(10.0, 0.0, 20.0, 20.0));

        let inter = ShapeMaker::try_intersect(&a, &b).unwrap();
        assert_approx_eq!(inter.area(), 200.0, 1e-6);
        assert_eq!(inter.bounds(), Rect::new(10.0, 0.0, 10.0, 20.0));
        assert!(inter.is_closed());

        let diff = ShapeMaker::try_subtract(&a, &b).unwrap();
        assert_approx_eq!(diff.area(), 200.0, 1e-6);
        assert_eq!(diff.bounds(), Rect::new(0.0, 0.0, 10.0, 20.0));
        assert!(diff.is_closed());
        assert!(diff.contains(5.0, 5.0));
        assert!(!diff.contains(15.0, 5.0));

        let union = ShapeMaker::try_add(&a, &b).unwrap();
        assert_approx_eq!(union.area(), 600.0, 1e-6);
        assert_eq!(union.bounds(), Rect::new(0.0, 0.0, 30.0, 20.0));
        assert!(union.is_closed());
    }

    #[test]
    fn test_subtract_hole() -> Result<(), crate::PathError> {
        // outline of the first shape lies on the outer outline of the ring
        let square = Path::from_shape(&Rect::new(0.0, 0.0, 30.0, 30.0));
        let ring: Path = "M0 0 L30 0 L30 30 L0 30 Z M10 10 L10 20 L20 20 L20 10 Z".parse()?;
        let diff = ShapeMaker::try_subtract(&square, &ring).unwrap();
        assert_approx_eq!(diff.area(), 100.0, 1e-6);
        assert_eq!(diff.bounds(), Rect::new(10.0, 10.0, 10.0, 10.0));
        assert!(diff.contains(15.0, 15.0));
        assert!(!diff.contains(5.0, 5.0));
        Ok(())
    }

    #[test]
    fn test_nan_terminates() {
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        let nan_rect = Rect::new(Scalar::NAN, 0.0, 10.0, 10.0);
        let nan_ellipse = Ellipse::new(Scalar::NAN, 0.0, 10.0, 10.0);
        assert!(ShapeMaker::try_add(&nan_rect, &rect).is_ok());
        assert!(ShapeMaker::try_add(&rect, &nan_ellipse).is_ok());
        assert!(ShapeMaker::intersect(&rect, &nan_ellipse).is_empty());
        assert_eq!(ShapeMaker::subtract(&rect, &nan_ellipse), Path::from_shape(&rect));
    }

    #[test]
    fn test_square_and_circle() {
        let a = square(0.0, 0.0, 20.0);
        let b = Ellipse::circle((20.0, 20.0), 10.0);
        let quarter = 25.0 * PI;

        let inter = ShapeMaker::try_intersect(&a, &b).unwrap();
        assert_approx_eq!(inter.area(), quarter, 0.1);
        let inter_rev = ShapeMaker::try_intersect(&b, &a).unwrap();
        assert_approx_eq!(inter_rev.area(), inter.area(), 1e-6);
        assert!(inter.area() <= a.area().min(b.area()));

        let union = ShapeMaker::try_add(&a, &b).unwrap();
        assert_approx_eq!(union.area(), 400.0 + 4.0 * quarter - quarter, 0.1);
        assert!(union.area() >= a.area().max(b.area()));
        assert!(union.contains(25.0, 25.0));
        assert!(union.contains(5.0, 5.0));

        let diff = ShapeMaker::try_subtract(&a, &b).unwrap();
        assert_approx_eq!(diff.area(), 400.0 - quarter, 0.1);
        assert!(!diff.contains(18.0, 18.0));
        assert!(diff.contains(2.0, 2.0));
    }

    #[test]
    fn test_identical() {
        let circle = Ellipse::circle((0.0, 0.0), 10.0);
        assert!(ShapeMaker::subtract(&circle, &circle).is_empty());
        assert_approx_eq!(ShapeMaker::add(&circle, &circle).area(), circle.area(), 1e-9);
        assert_approx_eq!(
            ShapeMaker::intersect(&circle, &circle).area(),
            circle.area(),
            1e-9
        );

        let a = square(0.0, 0.0, 10.0);
        assert!(ShapeMaker::subtract(&a, &a).is_empty());
    }

    #[test]
    fn test_disjoint() {
        let a = square(0.0, 0.0, 10.0);
        let b = square(20.0, 0.0, 10.0);
        let union = ShapeMaker::add(&a, &b);
        assert_approx_eq!(union.area(), 200.0, 1e-9);
        assert!(union.contains(25.0, 5.0));

        // opposite orientation is fixed so areas do not cancel out
        let union = ShapeMaker::add(&a, &b.reverse());
        assert_approx_eq!(union.area(), 200.0, 1e-9);

        assert_eq!(ShapeMaker::subtract(&a, &b), a);
        assert!(ShapeMaker::intersect(&a, &b).is_empty());
    }

    #[test]
    fn test_containment() {
        let big = Rect::new(0.0, 0.0, 100.0, 100.0);
        let small = Ellipse::circle((50.0, 50.0), 10.0);

        let union = ShapeMaker::add(&big, &small);
        assert_eq!(union, Path::from_shape(&big));
        let union = ShapeMaker::add(&small, &big);
        assert_eq!(union, Path::from_shape(&big));

        let inter = ShapeMaker::intersect(&big, &small);
        assert_eq!(inter, Path::from_shape(&small));

        let hole = ShapeMaker::subtract(&big, &small);
        assert_approx_eq!(hole.area(), 10000.0 - small.area(), 1e-6);
        assert!(!hole.contains(50.0, 50.0));
        assert!(hole.contains(5.0, 5.0));

        assert!(ShapeMaker::subtract(&small, &big).is_empty());
    }

    #[test]
    fn test_no_seed() {
        // corners overlap by less than the point tolerance
        let a = square(0.0, 0.0, 10.0);
        let b = square(9.95, 9.95, 10.0);
        let error = ShapeMaker::try_intersect(&a, &b).unwrap_err();
        assert_eq!(
            error,
            ShapeOpError::NoSeed {
                op: ShapeOp::Intersect
            }
        );
        assert_eq!(error.to_string(), "[intersect] failed to find a segment to start from");
        // falls back to the first shape
        assert_eq!(ShapeMaker::intersect(&a, &b), a);
    }

    #[test]
    fn test_segment_limit() {
        let polygon: Polygon = (0..40)
            .map(|index| {
                let angle = 2.0 * PI * index as Scalar / 40.0;
                Point::new(50.0 * angle.cos(), 50.0 * angle.sin())
            })
            .collect();
        let rect = square(40.0, -5.0, 20.0);
        let error = ShapeMaker::try_add(&polygon, &rect).unwrap_err();
        let ShapeOpError::SegmentLimit { op, partial } = error else {
            panic!("segment limit expected");
        };
        assert_eq!(op, ShapeOp::Add);
        assert!(!partial.is_empty());
        // plain variant keeps the partial result
        assert_eq!(ShapeMaker::add(&polygon, &rect), partial);
    }

    #[test]
    fn test_make_simple() -> Result<(), crate::PathError> {
        let bowtie: Path = "M0 0 L10 10 L10 0 L0 10 Z".parse()?;
        assert!(!bowtie.is_simple());
        let simple = ShapeMaker::make_simple(&bowtie);
        assert!(simple.is_simple());
        assert!(simple.is_closed());
        let moves = simple
            .path_iter(None)
            .filter(|cmd| cmd.verb() == crate::PathVerb::MoveTo)
            .count();
        assert_eq!(moves, 2);
        assert_eq!(simple.segments().count(), 6);
        for (x, y) in [(8.0, 5.0), (2.0, 5.0), (5.0, 2.0), (5.0, 8.0)] {
            assert_eq!(simple.contains(x, y), bowtie.contains(x, y));
        }
        assert!(simple.contains(8.0, 5.0));
        assert!(!simple.contains(5.0, 2.0));

        // simple shapes are left as they are
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert_eq!(ShapeMaker::make_simple(&rect), Path::from_shape(&rect));
        Ok(())
    }

    #[test]
    fn test_op_display() {
        assert_eq!(ShapeOp::Add.to_string(), "add");
        assert_eq!(ShapeOp::Subtract.to_string(), "subtract");
        let path = ShapeMaker::apply_op(ShapeOp::Intersect, &square(0.0, 0.0, 10.0), &square(5.0, 5.0, 10.0));
        assert_approx_eq!(path.area(), 25.0, 1e-6);
    }
}
