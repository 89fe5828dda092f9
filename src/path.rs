use crate::{
    Cubic, Curve, EllipArc, Line, Point, Quad, Rect, Scalar, Segment, Shape, Transform,
    scalar_fmt,
};
use std::{borrow::Cow, fmt, str::FromStr};

/// Default flatness used when curves are converted to lines
pub const DEFAULT_FLATNESS: Scalar = 0.05;

/// Control point factor used to approximate a quarter of a circle with a cubic
/// in `Path::arc_to_corner`
pub const CORNER_ARC_MAGIC: Scalar = 0.5523;

/// Kind of the path command, as reported by `PathIter::next_coords`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathVerb {
    MoveTo,
    LineTo,
    QuadTo,
    CubicTo,
    Close,
}

impl PathVerb {
    /// Number of points associated with the verb
    pub fn point_count(self) -> usize {
        match self {
            PathVerb::MoveTo | PathVerb::LineTo => 1,
            PathVerb::QuadTo => 2,
            PathVerb::CubicTo => 3,
            PathVerb::Close => 0,
        }
    }
}

/// Single path command, points are absolute
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PathCommand {
    MoveTo(Point),
    LineTo(Point),
    QuadTo(Point, Point),
    CubicTo(Point, Point, Point),
    Close,
}

impl PathCommand {
    pub fn verb(&self) -> PathVerb {
        match self {
            PathCommand::MoveTo(_) => PathVerb::MoveTo,
            PathCommand::LineTo(_) => PathVerb::LineTo,
            PathCommand::QuadTo(..) => PathVerb::QuadTo,
            PathCommand::CubicTo(..) => PathVerb::CubicTo,
            PathCommand::Close => PathVerb::Close,
        }
    }

    /// Point where the command leaves the pen, `None` for `Close`
    pub fn end_point(&self) -> Option<Point> {
        match *self {
            PathCommand::MoveTo(p)
            | PathCommand::LineTo(p)
            | PathCommand::QuadTo(_, p)
            | PathCommand::CubicTo(_, _, p) => Some(p),
            PathCommand::Close => None,
        }
    }

    pub fn transform(&self, tr: Transform) -> Self {
        match *self {
            PathCommand::MoveTo(p) => PathCommand::MoveTo(tr.apply(p)),
            PathCommand::LineTo(p) => PathCommand::LineTo(tr.apply(p)),
            PathCommand::QuadTo(p1, p2) => PathCommand::QuadTo(tr.apply(p1), tr.apply(p2)),
            PathCommand::CubicTo(p1, p2, p3) => {
                PathCommand::CubicTo(tr.apply(p1), tr.apply(p2), tr.apply(p3))
            }
            PathCommand::Close => PathCommand::Close,
        }
    }

    /// Write points of the command into `coords` as `x, y` pairs
    pub fn write_coords(&self, coords: &mut [Scalar; 6]) -> PathVerb {
        let points: &mut [Point] = bytemuck::cast_slice_mut(&mut coords[..]);
        match *self {
            PathCommand::MoveTo(p) | PathCommand::LineTo(p) => points[0] = p,
            PathCommand::QuadTo(p1, p2) => {
                points[0] = p1;
                points[1] = p2;
            }
            PathCommand::CubicTo(p1, p2, p3) => {
                points[0] = p1;
                points[1] = p2;
                points[2] = p3;
            }
            PathCommand::Close => {}
        }
        self.verb()
    }
}

/// Cursor over path commands of a shape
///
/// Iterator is single pass, request a new one from the shape to traverse it
/// again. Commands are either borrowed from the shape or generated on demand.
#[derive(Clone)]
pub struct PathIter<'a> {
    commands: Cow<'a, [PathCommand]>,
    index: usize,
    transform: Option<Transform>,
}

impl fmt::Debug for PathIter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PathIter")
            .field("remaining", &(self.commands.len() - self.index))
            .field("transform", &self.transform)
            .finish()
    }
}

impl<'a> PathIter<'a> {
    pub fn new(commands: impl Into<Cow<'a, [PathCommand]>>, transform: Option<Transform>) -> Self {
        Self {
            commands: commands.into(),
            index: 0,
            transform: transform.filter(|tr| !tr.is_identity()),
        }
    }

    /// Whether there are commands left
    pub fn has_next(&self) -> bool {
        self.index < self.commands.len()
    }

    /// Advance the cursor, writing the points of the command into `coords`
    ///
    /// Returns `PathVerb::Close` without touching `coords` once exhausted.
    pub fn next_coords(&mut self, coords: &mut [Scalar; 6]) -> PathVerb {
        match Iterator::next(self) {
            Some(cmd) => cmd.write_coords(coords),
            None => PathVerb::Close,
        }
    }

    /// Convert commands into segments
    ///
    /// If `close_subpaths` is set, subpaths that are not explicitly closed are
    /// closed with a line as it is done for fill operations.
    pub fn segments(self, close_subpaths: bool) -> SegmentIter<'a> {
        SegmentIter {
            iter: self,
            close_subpaths,
            start: Point::default(),
            current: Point::default(),
            open: false,
            pending: None,
        }
    }

    /// Bounding box of the remaining commands
    ///
    /// First `MoveTo` initializes the box and curves are bound by their extrema.
    pub fn bounds(self) -> Rect {
        let mut bounds: Option<Rect> = None;
        let mut current = Point::default();
        let mut start = Point::default();
        for cmd in self {
            let segment: Segment = match cmd {
                PathCommand::MoveTo(p) => {
                    bounds = Some(match bounds {
                        None => Rect::from_points(p, p),
                        Some(mut bounds) => {
                            bounds.add(p.x(), p.y());
                            bounds
                        }
                    });
                    current = p;
                    start = p;
                    continue;
                }
                PathCommand::LineTo(p) => Line([current, p]).into(),
                PathCommand::QuadTo(p1, p2) => Quad([current, p1, p2]).into(),
                PathCommand::CubicTo(p1, p2, p3) => Cubic([current, p1, p2, p3]).into(),
                PathCommand::Close => {
                    current = start;
                    continue;
                }
            };
            current = segment.end();
            bounds = Some(segment.bbox(bounds));
        }
        bounds.unwrap_or_else(Rect::empty)
    }
}

impl Iterator for PathIter<'_> {
    type Item = PathCommand;

    fn next(&mut self) -> Option<Self::Item> {
        let cmd = *self.commands.get(self.index)?;
        self.index += 1;
        match self.transform {
            Some(tr) => Some(cmd.transform(tr)),
            None => Some(cmd),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let size = self.commands.len() - self.index;
        (size, Some(size))
    }
}

/// Iterator over segments of a path, see `PathIter::segments`
pub struct SegmentIter<'a> {
    iter: PathIter<'a>,
    close_subpaths: bool,
    start: Point,
    current: Point,
    // subpath has segments after its start or the last close
    open: bool,
    pending: Option<Point>,
}

impl SegmentIter<'_> {
    /// Line closing current subpath, if it is not closed already
    ///
    /// Subpath is closed at most once, even if its points are NaN.
    fn close_line(&mut self) -> Option<Segment> {
        let open = std::mem::replace(&mut self.open, false);
        let current = std::mem::replace(&mut self.current, self.start);
        if !open || current == self.start {
            return None;
        }
        Some(Line([current, self.start]).into())
    }
}

impl Iterator for SegmentIter<'_> {
    type Item = Segment;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(start) = self.pending.take() {
                self.start = start;
                self.current = start;
                self.open = false;
            }
            let cmd = match self.iter.next() {
                Some(cmd) => cmd,
                None if self.close_subpaths => return self.close_line(),
                None => return None,
            };
            let segment: Segment = match cmd {
                PathCommand::MoveTo(p) => {
                    self.pending = Some(p);
                    if self.close_subpaths {
                        if let Some(line) = self.close_line() {
                            return Some(line);
                        }
                    }
                    continue;
                }
                PathCommand::LineTo(p) => Line([self.current, p]).into(),
                PathCommand::QuadTo(p1, p2) => Quad([self.current, p1, p2]).into(),
                PathCommand::CubicTo(p1, p2, p3) => Cubic([self.current, p1, p2, p3]).into(),
                PathCommand::Close => match self.close_line() {
                    Some(line) => return Some(line),
                    None => continue,
                },
            };
            self.current = segment.end();
            self.open = true;
            return Some(segment);
        }
    }
}

// -----------------------------------------------------------------------------
// Path
// -----------------------------------------------------------------------------

/// Append-only sequence of path commands
///
/// The first command is always `MoveTo`. Drawing commands on an empty path
/// start at the origin, and drawing after `Close` starts a new subpath at the
/// start of the closed one.
#[derive(Clone, PartialEq, Default)]
pub struct Path {
    commands: Vec<PathCommand>,
    // start of the current subpath
    start: Point,
}

impl fmt::Debug for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.commands.is_empty() {
            write!(f, "Empty")
        } else {
            fmt::Display::fmt(self, f)
        }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", CommandsDisplay::new(&self.commands, " "))
    }
}

/// Formats commands in SVG path notation separated by `sep`
pub(crate) struct CommandsDisplay<'a> {
    commands: &'a [PathCommand],
    sep: &'a str,
}

impl<'a> CommandsDisplay<'a> {
    pub(crate) fn new(commands: &'a [PathCommand], sep: &'a str) -> Self {
        Self { commands, sep }
    }
}

impl fmt::Display for CommandsDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let write_points = |f: &mut fmt::Formatter<'_>, name: &str, points: &[Point]| {
            write!(f, "{}", name)?;
            for (index, point) in points.iter().enumerate() {
                if index != 0 {
                    write!(f, " ")?;
                }
                scalar_fmt(f, point.x())?;
                write!(f, " ")?;
                scalar_fmt(f, point.y())?;
            }
            Ok(())
        };
        for (index, cmd) in self.commands.iter().enumerate() {
            if index != 0 {
                write!(f, "{}", self.sep)?;
            }
            match *cmd {
                PathCommand::MoveTo(p) => write_points(f, "M", &[p])?,
                PathCommand::LineTo(p) => write_points(f, "L", &[p])?,
                PathCommand::QuadTo(p1, p2) => write_points(f, "Q", &[p1, p2])?,
                PathCommand::CubicTo(p1, p2, p3) => write_points(f, "C", &[p1, p2, p3])?,
                PathCommand::Close => write!(f, "Z")?,
            }
        }
        Ok(())
    }
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create path replaying commands of the shape
    pub fn from_shape(shape: &(impl Shape + ?Sized)) -> Self {
        let mut path = Path::new();
        path.append_shape(shape);
        path
    }

    pub fn commands(&self) -> &[PathCommand] {
        &self.commands
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Number of commands in the path
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Current position of the pen, `None` for an empty path
    pub fn last_point(&self) -> Option<Point> {
        match self.commands.last()? {
            PathCommand::Close => Some(self.start),
            cmd => cmd.end_point(),
        }
    }

    /// Make sure that a drawing command can be appended
    fn ensure_subpath(&mut self) -> Point {
        match self.commands.last().copied() {
            None => {
                self.move_to(Point::default());
                Point::default()
            }
            Some(PathCommand::Close) => {
                let start = self.start;
                self.commands.push(PathCommand::MoveTo(start));
                start
            }
            Some(cmd) => cmd.end_point().unwrap_or(self.start),
        }
    }

    /// Start a new subpath at the point
    pub fn move_to(&mut self, p: impl Into<Point>) -> &mut Self {
        let p = p.into();
        match self.commands.last_mut() {
            Some(PathCommand::MoveTo(last)) => {
                tracing::debug!("[path:move_to] consecutive move replaces {:?}", last);
                *last = p;
            }
            _ => self.commands.push(PathCommand::MoveTo(p)),
        }
        self.start = p;
        self
    }

    pub fn line_to(&mut self, p: impl Into<Point>) -> &mut Self {
        self.ensure_subpath();
        self.commands.push(PathCommand::LineTo(p.into()));
        self
    }

    pub fn quad_to(&mut self, p1: impl Into<Point>, p2: impl Into<Point>) -> &mut Self {
        self.ensure_subpath();
        self.commands.push(PathCommand::QuadTo(p1.into(), p2.into()));
        self
    }

    /// Quad with control point reflected from the previous quad
    pub fn quad_smooth_to(&mut self, p2: impl Into<Point>) -> &mut Self {
        let current = self.ensure_subpath();
        let p1 = match self.commands.last() {
            Some(PathCommand::QuadTo(p1, p2)) => Quad([current, *p1, *p2]).smooth(),
            _ => current,
        };
        self.quad_to(p1, p2)
    }

    pub fn cubic_to(
        &mut self,
        p1: impl Into<Point>,
        p2: impl Into<Point>,
        p3: impl Into<Point>,
    ) -> &mut Self {
        self.ensure_subpath();
        self.commands
            .push(PathCommand::CubicTo(p1.into(), p2.into(), p3.into()));
        self
    }

    /// Cubic with first control point reflected from the previous cubic
    pub fn cubic_smooth_to(&mut self, p2: impl Into<Point>, p3: impl Into<Point>) -> &mut Self {
        let current = self.ensure_subpath();
        let p1 = match self.commands.last() {
            Some(PathCommand::CubicTo(p1, p2, p3)) => Cubic([current, *p1, *p2, *p3]).smooth(),
            _ => current,
        };
        self.cubic_to(p1, p2, p3)
    }

    /// Rounded corner from the current point to `p`, bending towards `corner`
    ///
    /// Approximates a quarter of an ellipse if `corner` forms a right angle.
    pub fn arc_to_corner(&mut self, corner: impl Into<Point>, p: impl Into<Point>) -> &mut Self {
        let (corner, p) = (corner.into(), p.into());
        let last = self.ensure_subpath();
        let p1 = last + CORNER_ARC_MAGIC * (corner - last);
        let p2 = p + CORNER_ARC_MAGIC * (corner - p);
        self.cubic_to(p1, p2, p)
    }

    /// SVG elliptical arc from the current point to `p`
    ///
    /// Degenerates to a line if the arc can not be constructed.
    pub fn arc_to(
        &mut self,
        radii: impl Into<Point>,
        x_axis_rot: Scalar,
        large: bool,
        sweep: bool,
        p: impl Into<Point>,
    ) -> &mut Self {
        let radii: Point = radii.into();
        let p = p.into();
        let src = self.ensure_subpath();
        match EllipArc::new_param(src, p, radii.x(), radii.y(), x_axis_rot, large, sweep) {
            None => self.line_to(p),
            Some(arc) => {
                for cubic in arc.to_cubics() {
                    let Cubic([_, p1, p2, p3]) = cubic;
                    self.cubic_to(p1, p2, p3);
                }
                self
            }
        }
    }

    /// Close current subpath, closing an empty subpath is ignored
    pub fn close(&mut self) -> &mut Self {
        match self.commands.last().copied() {
            None | Some(PathCommand::MoveTo(_)) | Some(PathCommand::Close) => {
                tracing::debug!("[path:close] ignored, no open subpath");
            }
            Some(_) => self.commands.push(PathCommand::Close),
        }
        self
    }

    /// Append a segment, starting a new subpath if it is not connected to the current point
    pub fn append_segment(&mut self, segment: Segment) -> &mut Self {
        let connected = match self.commands.last() {
            None | Some(PathCommand::Close) => false,
            Some(cmd) => cmd.end_point() == Some(segment.start()),
        };
        if !connected {
            self.move_to(segment.start());
        }
        match segment {
            Segment::Line(Line([_, p1])) => self.line_to(p1),
            Segment::Quad(Quad([_, p1, p2])) => self.quad_to(p1, p2),
            Segment::Cubic(Cubic([_, p1, p2, p3])) => self.cubic_to(p1, p2, p3),
        }
    }

    /// Append all commands of the shape
    pub fn append_shape(&mut self, shape: &(impl Shape + ?Sized)) -> &mut Self {
        self.extend(shape.path_iter(None));
        self
    }

    /// Same path with all subpaths reversed
    pub fn reverse(&self) -> Path {
        // (start, segments, closed) of each subpath
        let mut subpaths: Vec<(Point, Vec<Segment>, bool)> = Vec::new();
        let mut current = Point::default();
        for cmd in self.commands.iter() {
            let segment: Segment = match *cmd {
                PathCommand::MoveTo(p) => {
                    subpaths.push((p, Vec::new(), false));
                    current = p;
                    continue;
                }
                PathCommand::Close => {
                    if let Some((start, segments, closed)) = subpaths.last_mut() {
                        if current != *start {
                            segments.push(Line([current, *start]).into());
                        }
                        *closed = true;
                        current = *start;
                    }
                    continue;
                }
                PathCommand::LineTo(p) => Line([current, p]).into(),
                PathCommand::QuadTo(p1, p2) => Quad([current, p1, p2]).into(),
                PathCommand::CubicTo(p1, p2, p3) => Cubic([current, p1, p2, p3]).into(),
            };
            current = segment.end();
            if let Some((_, segments, _)) = subpaths.last_mut() {
                segments.push(segment);
            }
        }

        let mut result = Path::new();
        for (start, segments, closed) in subpaths {
            match segments.last() {
                None => {
                    result.move_to(start);
                }
                Some(last) => {
                    result.move_to(last.end());
                    for segment in segments.iter().rev() {
                        result.append_segment(segment.reverse());
                    }
                    if closed {
                        result.close();
                    }
                }
            }
        }
        result
    }

    /// Apply transformation to all points of the path
    pub fn transform(&self, tr: Transform) -> Path {
        Path {
            commands: self.commands.iter().map(|cmd| cmd.transform(tr)).collect(),
            start: tr.apply(self.start),
        }
    }
}

impl Extend<PathCommand> for Path {
    fn extend<T: IntoIterator<Item = PathCommand>>(&mut self, iter: T) {
        for cmd in iter {
            match cmd {
                PathCommand::MoveTo(p) => self.move_to(p),
                PathCommand::LineTo(p) => self.line_to(p),
                PathCommand::QuadTo(p1, p2) => self.quad_to(p1, p2),
                PathCommand::CubicTo(p1, p2, p3) => self.cubic_to(p1, p2, p3),
                PathCommand::Close => self.close(),
            };
        }
    }
}

impl FromIterator<PathCommand> for Path {
    fn from_iter<T: IntoIterator<Item = PathCommand>>(iter: T) -> Self {
        let mut path = Path::new();
        path.extend(iter);
        path
    }
}

impl Shape for Path {
    fn path_iter(&self, transform: Option<Transform>) -> PathIter<'_> {
        PathIter::new(&self.commands[..], transform)
    }
}

impl FromStr for Path {
    type Err = PathError;

    fn from_str(text: &str) -> Result<Path, Self::Err> {
        tracing::debug_span!("[parse]").in_scope(|| {
            let mut path = Path::new();
            PathParser::new(text.as_bytes()).parse(&mut path)?;
            tracing::debug!("[path:commands_count] {}", path.len());
            Ok(path)
        })
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Path {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Path {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let text: Cow<'de, str> = serde::Deserialize::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathError {
    /// SVG path data could not be parsed
    Parse { reason: String, offset: usize },
    /// Path does not have the expected content
    Conversion { reason: String },
}

impl fmt::Display for PathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathError::Parse { reason, offset } => {
                write!(f, "failed to parse path at {}: {}", offset, reason)
            }
            PathError::Conversion { reason } => write!(f, "path conversion failed: {}", reason),
        }
    }
}

impl From<PathError> for std::io::Error {
    fn from(error: PathError) -> Self {
        Self::new(std::io::ErrorKind::InvalidData, error)
    }
}

impl std::error::Error for PathError {}

/// Parser of SVG path data
#[derive(Debug)]
struct PathParser<'a> {
    // text containing unparsed path
    text: &'a [u8],
    // current offset in the text
    offset: usize,
    // previous command, used for implicit repetition
    prev_cmd: Option<u8>,
    // position from which next command starts
    position: Point,
}

impl<'a> PathParser<'a> {
    fn new(text: &'a [u8]) -> PathParser<'a> {
        Self {
            text,
            offset: 0,
            prev_cmd: None,
            position: Point::default(),
        }
    }

    fn error(&self, reason: impl Into<String>) -> PathError {
        PathError::Parse {
            offset: self.offset,
            reason: reason.into(),
        }
    }

    fn current(&self) -> Option<u8> {
        self.text.get(self.offset).copied()
    }

    fn is_eof(&self) -> bool {
        self.offset >= self.text.len()
    }

    fn skip_separators(&mut self) {
        while let Some(b' ' | b'\t' | b'\r' | b'\n' | b',') = self.current() {
            self.offset += 1;
        }
    }

    /// Consume digits, returns true if at least one was found
    fn skip_digits(&mut self) -> bool {
        let start = self.offset;
        while let Some(b'0'..=b'9') = self.current() {
            self.offset += 1;
        }
        self.offset > start
    }

    fn skip_sign(&mut self) {
        if let Some(b'-' | b'+') = self.current() {
            self.offset += 1;
        }
    }

    fn parse_scalar(&mut self) -> Result<Scalar, PathError> {
        self.skip_separators();
        let start = self.offset;
        self.skip_sign();
        let whole = self.skip_digits();
        let fraction = if self.current() == Some(b'.') {
            self.offset += 1;
            self.skip_digits()
        } else {
            false
        };
        if !whole && !fraction {
            return Err(self.error("failed to parse scalar"));
        }
        if let Some(b'e' | b'E') = self.current() {
            self.offset += 1;
            self.skip_sign();
            if !self.skip_digits() {
                return Err(self.error("failed to parse scalar exponent"));
            }
        }
        std::str::from_utf8(&self.text[start..self.offset])
            .ok()
            .and_then(|text| text.parse().ok())
            .ok_or_else(|| self.error("invalid scalar"))
    }

    fn is_relative(&self) -> bool {
        self.prev_cmd.is_some_and(|cmd| cmd.is_ascii_lowercase())
    }

    /// Parse pair of scalars, relative commands are offset by the current position
    fn parse_point(&mut self) -> Result<Point, PathError> {
        let x = self.parse_scalar()?;
        let y = self.parse_scalar()?;
        if self.is_relative() {
            Ok(Point::new(x, y) + self.position)
        } else {
            Ok(Point::new(x, y))
        }
    }

    /// Parse SVG flag `0|1` used by elliptic arc command
    fn parse_flag(&mut self) -> Result<bool, PathError> {
        self.skip_separators();
        let flag = match self.current() {
            Some(b'0') => false,
            Some(b'1') => true,
            _ => return Err(self.error("failed to parse flag")),
        };
        self.offset += 1;
        Ok(flag)
    }

    fn parse_cmd(&mut self) -> Result<u8, PathError> {
        match self.current() {
            Some(
                cmd @ (b'M' | b'm' | b'L' | b'l' | b'V' | b'v' | b'H' | b'h' | b'C' | b'c'
                | b'S' | b's' | b'Q' | b'q' | b'T' | b't' | b'A' | b'a' | b'Z' | b'z'),
            ) => {
                self.offset += 1;
                // coordinates following a move are implicit lines
                self.prev_cmd = match cmd {
                    b'm' => Some(b'l'),
                    b'M' => Some(b'L'),
                    b'Z' | b'z' => None,
                    _ => Some(cmd),
                };
                Ok(cmd)
            }
            _ => self
                .prev_cmd
                .ok_or_else(|| self.error("failed to parse path command")),
        }
    }

    fn parse(mut self, path: &mut Path) -> Result<(), PathError> {
        loop {
            self.skip_separators();
            if self.is_eof() {
                break;
            }
            self.position = path.last_point().unwrap_or_default();
            let cmd = self.parse_cmd()?;
            let relative = cmd.is_ascii_lowercase();
            let offset = if relative {
                self.position
            } else {
                Point::default()
            };
            match cmd.to_ascii_uppercase() {
                b'M' => {
                    let x = self.parse_scalar()?;
                    let y = self.parse_scalar()?;
                    path.move_to(Point::new(x, y) + offset);
                }
                b'L' => {
                    path.line_to(self.parse_point()?);
                }
                b'V' => {
                    let y = self.parse_scalar()?;
                    path.line_to(Point::new(self.position.x(), y + offset.y()));
                }
                b'H' => {
                    let x = self.parse_scalar()?;
                    path.line_to(Point::new(x + offset.x(), self.position.y()));
                }
                b'Q' => {
                    let p1 = self.parse_point()?;
                    let p2 = self.parse_point()?;
                    path.quad_to(p1, p2);
                }
                b'T' => {
                    path.quad_smooth_to(self.parse_point()?);
                }
                b'C' => {
                    let p1 = self.parse_point()?;
                    let p2 = self.parse_point()?;
                    let p3 = self.parse_point()?;
                    path.cubic_to(p1, p2, p3);
                }
                b'S' => {
                    let p2 = self.parse_point()?;
                    let p3 = self.parse_point()?;
                    path.cubic_smooth_to(p2, p3);
                }
                b'A' => {
                    let rx = self.parse_scalar()?;
                    let ry = self.parse_scalar()?;
                    let x_axis_rot = self.parse_scalar()?;
                    let large = self.parse_flag()?;
                    let sweep = self.parse_flag()?;
                    let dst = self.parse_point()?;
                    path.arc_to((rx, ry), x_axis_rot, large, sweep, dst);
                }
                _ => {
                    path.close();
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert_approx_eq;

    const SQUIRREL: &str = r#"
    M12 1C9.79 1 8 2.31 8 3.92c0 1.94.5 3.03 0 6.08 0-4.5-2.77-6.34-4-6.34.05-.5-.48
    -.66-.48-.66s-.22.11-.3.34c-.27-.31-.56-.27-.56-.27l-.13.58S.7 4.29 .68 6.87c.2.33
    1.53.6 2.47.43.89.05.67.79.47.99C2.78 9.13 2 8 1 8S0 9 1 9s1 1 3 1c-3.09 1.2 0 4 0 4
    H3c-1 0-1 1-1 1h6c3 0 5-1 5-3.47 0-.85-.43-1.79 -1-2.53-1.11-1.46.23-2.68 1-2
    .77.68 3 1 3-2 0-2.21-1.79-4-4-4zM2.5 6 c-.28 0-.5-.22-.5-.5s.22-.5.5-.5.5.22.5.5
    -.22.5-.5.5z
    "#;

    #[test]
    fn test_bounds() -> Result<(), PathError> {
        let path: Path = SQUIRREL.parse()?;
        let bbox = path.bounds();
        assert_approx_eq!(bbox.x(), 0.25, 1e-9);
        assert_approx_eq!(bbox.y(), 1.0, 1e-9);
        assert_approx_eq!(bbox.width(), 15.75, 1e-9);
        assert_approx_eq!(bbox.height(), 14.0, 1e-9);

        // lone move defines zero sized bounds
        let mut path = Path::new();
        path.move_to((3.0, 4.0));
        assert_eq!(path.bounds(), Rect::new(3.0, 4.0, 0.0, 0.0));
        assert_eq!(Path::new().bounds(), Rect::empty());
        Ok(())
    }

    #[test]
    fn test_parse() -> Result<(), PathError> {
        let path: Path = "M10 20 l5,5 h5 V40 q1 1 2 0 t2 0 C1 2 3 4 5 6 s1 1 2 2 z m1 1 L2 2".parse()?;
        let expected = [
            PathCommand::MoveTo(Point::new(10.0, 20.0)),
            PathCommand::LineTo(Point::new(15.0, 25.0)),
            PathCommand::LineTo(Point::new(20.0, 25.0)),
            PathCommand::LineTo(Point::new(20.0, 40.0)),
            PathCommand::QuadTo(Point::new(21.0, 41.0), Point::new(22.0, 40.0)),
            PathCommand::QuadTo(Point::new(23.0, 39.0), Point::new(24.0, 40.0)),
            PathCommand::CubicTo(Point::new(1.0, 2.0), Point::new(3.0, 4.0), Point::new(5.0, 6.0)),
            PathCommand::CubicTo(Point::new(7.0, 8.0), Point::new(6.0, 7.0), Point::new(7.0, 8.0)),
            PathCommand::Close,
            PathCommand::MoveTo(Point::new(11.0, 21.0)),
            PathCommand::LineTo(Point::new(2.0, 2.0)),
        ];
        assert_eq!(path.commands(), &expected[..]);

        // implicit line after move
        let path: Path = "M0 0 10 0 10 10".parse()?;
        assert_eq!(path.len(), 3);
        assert_eq!(path.commands()[2], PathCommand::LineTo(Point::new(10.0, 10.0)));

        // numbers without separators
        let path: Path = "M.5.5-1e1-2".parse()?;
        assert_eq!(path.commands()[1], PathCommand::LineTo(Point::new(-10.0, -2.0)));

        assert!(matches!(
            "M0 0 L1".parse::<Path>(),
            Err(PathError::Parse { .. })
        ));
        assert!(matches!(
            "X0 0".parse::<Path>(),
            Err(PathError::Parse { offset: 0, .. })
        ));
        Ok(())
    }

    #[test]
    fn test_parse_arc() -> Result<(), PathError> {
        let path: Path = "M0 0 A10 10 0 0 1 20 0".parse()?;
        let last = path.last_point().unwrap();
        assert!(last.is_near(Point::new(20.0, 0.0), 1e-9));
        assert!(path.commands()[1..]
            .iter()
            .all(|cmd| cmd.verb() == PathVerb::CubicTo));
        // positive sweep goes through the top of the circle (y axis down)
        let bbox = path.bounds();
        assert_approx_eq!(bbox.width(), 20.0, 1e-3);
        assert_approx_eq!(bbox.height(), 10.0, 1e-3);
        assert_approx_eq!(bbox.y(), -10.0, 1e-3);
        Ok(())
    }

    #[test]
    fn test_display() -> Result<(), PathError> {
        let text = "M0 0 L10 0 Q15 5 10 10 C5 15 0 10 0.5 5.25 Z";
        let path: Path = text.parse()?;
        assert_eq!(path.to_string(), text);
        assert_eq!(format!("{:?}", Path::new()), "Empty");
        let parsed: Path = path.to_string().parse()?;
        assert_eq!(parsed, path);
        Ok(())
    }

    #[test]
    fn test_builder() {
        let mut path = Path::new();
        // drawing on the empty path starts at the origin
        path.line_to((10.0, 0.0));
        assert_eq!(path.commands()[0], PathCommand::MoveTo(Point::default()));

        // closing empty subpath is ignored
        let mut empty = Path::new();
        empty.close();
        assert!(empty.is_empty());
        empty.move_to((1.0, 1.0)).close();
        assert_eq!(empty.len(), 1);

        // consecutive moves collapse
        empty.move_to((2.0, 2.0));
        assert_eq!(empty.commands(), &[PathCommand::MoveTo(Point::new(2.0, 2.0))]);

        // drawing after close starts at the subpath start
        path.line_to((10.0, 10.0)).close().line_to((5.0, 5.0));
        assert_eq!(
            &path.commands()[3..],
            &[
                PathCommand::Close,
                PathCommand::MoveTo(Point::default()),
                PathCommand::LineTo(Point::new(5.0, 5.0)),
            ]
        );
        assert_eq!(path.last_point(), Some(Point::new(5.0, 5.0)));
    }

    #[test]
    fn test_arc_to_corner() {
        let mut path = Path::new();
        path.move_to((0.0, 10.0)).arc_to_corner((0.0, 0.0), (10.0, 0.0));
        let expected = PathCommand::CubicTo(
            Point::new(0.0, 10.0 - 10.0 * CORNER_ARC_MAGIC),
            Point::new(10.0 - 10.0 * CORNER_ARC_MAGIC, 0.0),
            Point::new(10.0, 0.0),
        );
        assert_eq!(path.commands()[1], expected);
    }

    #[test]
    fn test_path_iter() -> Result<(), PathError> {
        let path: Path = "M0 0 L10 0 Q20 0 20 10 C20 20 10 20 0 20 Z".parse()?;

        // re-requested iterators yield the same commands
        let first: Vec<_> = path.path_iter(None).collect();
        let second: Vec<_> = path.path_iter(None).collect();
        assert_eq!(first, second);
        assert_eq!(first, path.commands());

        let mut iter = path.path_iter(Some(Transform::new_translate(1.0, 2.0)));
        let mut coords = [0.0; 6];
        let mut verbs = Vec::new();
        while iter.has_next() {
            verbs.push(iter.next_coords(&mut coords));
            if verbs.len() == 3 {
                assert_eq!(coords[..4], [21.0, 2.0, 21.0, 12.0]);
            }
        }
        assert_eq!(
            verbs,
            vec![
                PathVerb::MoveTo,
                PathVerb::LineTo,
                PathVerb::QuadTo,
                PathVerb::CubicTo,
                PathVerb::Close
            ]
        );
        assert_eq!(coords[..6], [21.0, 22.0, 11.0, 22.0, 1.0, 22.0]);
        assert_eq!(iter.next_coords(&mut coords), PathVerb::Close);
        Ok(())
    }

    #[test]
    fn test_segments() -> Result<(), PathError> {
        let path: Path = "M0 0 L10 0 L10 10 M20 20 L30 20 L20 30 Z".parse()?;
        let open: Vec<_> = path.path_iter(None).segments(false).collect();
        assert_eq!(open.len(), 5);
        let closed: Vec<_> = path.path_iter(None).segments(true).collect();
        assert_eq!(closed.len(), 6);
        assert_eq!(
            closed[2],
            Segment::from(Line::new((10.0, 10.0), (0.0, 0.0)))
        );
        assert_eq!(
            closed[5],
            Segment::from(Line::new((20.0, 30.0), (20.0, 20.0)))
        );
        Ok(())
    }

    #[test]
    fn test_segments_nan() {
        let rect = Rect::new(Scalar::NAN, 0.0, 10.0, 10.0);
        assert_eq!(rect.segments().count(), 4);
        let ellipse = crate::Ellipse::new(Scalar::NAN, 0.0, 10.0, 10.0);
        assert_eq!(ellipse.segments().count(), 5);

        let mut path = Path::new();
        path.move_to((Scalar::NAN, 0.0))
            .line_to((10.0, 0.0))
            .line_to((10.0, 10.0))
            .move_to((20.0, Scalar::NAN))
            .line_to((30.0, 0.0));
        assert_eq!(path.segments().count(), 5);
        assert_eq!(path.path_iter(None).segments(false).count(), 3);
        assert!(path.area().is_nan());
    }

    #[test]
    fn test_reverse() -> Result<(), PathError> {
        let path: Path = "M0 0 L10 0 Q20 0 20 10 Z M30 30 L40 40".parse()?;
        let reversed = path.reverse();
        assert_eq!(
            reversed.to_string(),
            "M0 0 L20 10 Q20 0 10 0 L0 0 Z M40 40 L30 30"
        );
        assert_eq!(
            reversed.reverse().to_string(),
            "M0 0 L10 0 Q20 0 20 10 L0 0 Z M30 30 L40 40"
        );
        Ok(())
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde() -> Result<(), Box<dyn std::error::Error>> {
        let path: Path = "M0 0 L10 0 L10 10 Z".parse()?;
        let json = serde_json::to_string(&path)?;
        assert_eq!(json, "\"M0 0 L10 0 L10 10 Z\"");
        let restored: Path = serde_json::from_str(&json)?;
        assert_eq!(restored, path);

        let cmd: PathCommand = serde_json::from_str(r#"{"LineTo":[1.0,2.0]}"#)?;
        assert_eq!(cmd, PathCommand::LineTo(Point::new(1.0, 2.0)));
        assert!(serde_json::from_str::<Path>("\"M0 0 L\"").is_err());
        Ok(())
    }
}
