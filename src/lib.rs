//! Small 2D geometry library built around shapes described by path commands.
//!
//! Main features:
//!  - Lines, quadratic and cubic bezier curves with exact bounds and ray crossings
//!  - Shapes: rectangles, ellipses, arcs, rounded rectangles, polygons and paths
//!  - Non-zero winding containment and shape intersection tests
//!  - Boolean operations (add, subtract, intersect) with `ShapeMaker`
//!  - SVG path parsing and generation
//!
#![deny(warnings)]

mod curve;
mod ellipse;
mod geometry;
mod path;
mod shape;
mod shape_maker;
mod shapes;
mod utils;

pub use curve::{
    CROSSINGS_MAX_DEPTH, Cubic, Curve, CurveExtremities, CurveFlattenIter, LINE_TOLERANCE_SQ,
    Line, Quad, SegHit, Segment, line_crossings,
};
pub use ellipse::{Arc, ArcClosure, EllipArc, EllipArcCubicIter, Ellipse};
pub use geometry::{EPSILON, PI, POINT_TOLERANCE, Point, Rect, Scalar, Transform, scalar_fmt};
pub use path::{
    CORNER_ARC_MAGIC, DEFAULT_FLATNESS, Path, PathCommand, PathError, PathIter, PathVerb,
    SegmentIter,
};
pub use shape::Shape;
pub use shape_maker::{MAX_WALK_SEGMENTS, ShapeMaker, ShapeOp, ShapeOpError};
pub use shapes::{Polygon, PolygonList, RoundRect};

use path::CommandsDisplay;
use utils::{ArrayIter, clamp, quadratic_solve};
