//! Command-style 2D path construction.
//!
//! A [`SketchPath`] records move / line / arc / close commands the way a
//! pen plotter would draw them. Arcs are given by their end point and a
//! signed radius; [`SketchPath::to_segments`] resolves each arc into an
//! explicit center and direction.
//!
//! Sign convention: a positive radius puts the center to the left of the
//! chord from start to end, so the arc turns counter-clockwise. A negative
//! radius puts the center on the right and the arc turns clockwise. The
//! shorter of the two possible arcs is always taken.

use lenscap_kernel_math::{Point2, Point3, Tolerance, Vec2, Vec3};

use crate::{SketchError, SketchProfile, SketchSegment};

/// A single drawing command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    /// Lift the pen and place it at a point.
    MoveTo(Point2),
    /// Straight line from the current point.
    LineTo(Point2),
    /// Circular arc from the current point with a signed radius.
    ArcTo {
        /// End point of the arc.
        end: Point2,
        /// Signed radius (positive = counter-clockwise).
        radius: f64,
    },
    /// Return to the first point of the path.
    Close,
}

/// An ordered list of drawing commands describing one closed loop.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SketchPath {
    commands: Vec<PathCommand>,
}

impl SketchPath {
    /// Create an empty path.
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
        }
    }

    /// Append a move command.
    pub fn move_to(&mut self, x: f64, y: f64) -> &mut Self {
        self.commands.push(PathCommand::MoveTo(Point2::new(x, y)));
        self
    }

    /// Append a straight line.
    pub fn line_to(&mut self, x: f64, y: f64) -> &mut Self {
        self.commands.push(PathCommand::LineTo(Point2::new(x, y)));
        self
    }

    /// Append an arc ending at `(x, y)` with the given signed radius.
    pub fn radius_arc_to(&mut self, x: f64, y: f64, radius: f64) -> &mut Self {
        self.commands.push(PathCommand::ArcTo {
            end: Point2::new(x, y),
            radius,
        });
        self
    }

    /// Close the loop.
    pub fn close(&mut self) -> &mut Self {
        self.commands.push(PathCommand::Close);
        self
    }

    /// The recorded commands.
    pub fn commands(&self) -> &[PathCommand] {
        &self.commands
    }

    /// Number of commands, including the final close.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// True if no commands were recorded.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// True if the last command is [`PathCommand::Close`].
    pub fn is_closed(&self) -> bool {
        matches!(self.commands.last(), Some(PathCommand::Close))
    }

    /// Resolve commands into line and arc segments.
    ///
    /// Closing adds a line back to the first point unless the pen is
    /// already there.
    ///
    /// # Errors
    ///
    /// - `PathNotStarted` if the first command is not a move
    /// - `UnexpectedMove` for a second move
    /// - `CommandAfterClose` if anything follows the close
    /// - `ArcRadiusTooSmall` if an arc cannot reach its end point
    /// - `DegenerateSegment` for zero-length lines or arcs
    /// - `NotClosed` if the path never closes
    pub fn to_segments(&self) -> Result<Vec<SketchSegment>, SketchError> {
        let tol = Tolerance::DEFAULT;
        let first = match self.commands.first() {
            Some(PathCommand::MoveTo(p)) => *p,
            _ => return Err(SketchError::PathNotStarted),
        };

        let mut segments = Vec::with_capacity(self.commands.len());
        let mut current = first;
        let mut closed = false;

        for (i, cmd) in self.commands.iter().enumerate().skip(1) {
            if closed {
                return Err(SketchError::CommandAfterClose(i));
            }
            match *cmd {
                PathCommand::MoveTo(_) => return Err(SketchError::UnexpectedMove(i)),
                PathCommand::LineTo(end) => {
                    if tol.points2_equal(&current, &end) {
                        return Err(SketchError::DegenerateSegment(segments.len()));
                    }
                    segments.push(SketchSegment::Line {
                        start: current,
                        end,
                    });
                    current = end;
                }
                PathCommand::ArcTo { end, radius } => {
                    if tol.points2_equal(&current, &end) || tol.is_zero(radius) {
                        return Err(SketchError::DegenerateSegment(segments.len()));
                    }
                    let center = arc_center(current, end, radius, i)?;
                    segments.push(SketchSegment::Arc {
                        start: current,
                        end,
                        center,
                        ccw: radius > 0.0,
                    });
                    current = end;
                }
                PathCommand::Close => {
                    if !tol.points2_equal(&current, &first) {
                        segments.push(SketchSegment::Line {
                            start: current,
                            end: first,
                        });
                        current = first;
                    }
                    closed = true;
                }
            }
        }

        if !closed {
            return Err(SketchError::NotClosed((current - first).norm()));
        }
        if segments.is_empty() {
            return Err(SketchError::EmptyProfile);
        }
        Ok(segments)
    }

    /// Resolve the path and place it on a sketch plane.
    pub fn to_profile(
        &self,
        origin: Point3,
        x_dir: Vec3,
        y_dir: Vec3,
    ) -> Result<SketchProfile, SketchError> {
        SketchProfile::new(origin, x_dir, y_dir, self.to_segments()?)
    }
}

/// Center of the minor arc from `start` to `end` with signed `radius`.
fn arc_center(
    start: Point2,
    end: Point2,
    radius: f64,
    index: usize,
) -> Result<Point2, SketchError> {
    let chord = end - start;
    let chord_len = chord.norm();
    let half_chord = chord_len / 2.0;
    let r = radius.abs();

    if r + Tolerance::DEFAULT.linear < half_chord {
        return Err(SketchError::ArcRadiusTooSmall {
            index,
            radius,
            half_chord,
        });
    }

    let mid = start + chord / 2.0;
    let left = Vec2::new(-chord.y, chord.x) / chord_len;
    let offset = (r * r - half_chord * half_chord).max(0.0).sqrt();
    Ok(mid + left * offset * radius.signum())
}
