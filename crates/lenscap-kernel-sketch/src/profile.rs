//! 2D sketch profile types.

use std::f64::consts::PI;

use lenscap_kernel_math::{angle_between_2d, Dir3, Point2, Point3, Tolerance, Vec2, Vec3};

use crate::SketchError;

/// A segment of a 2D sketch profile.
#[derive(Debug, Clone, PartialEq)]
pub enum SketchSegment {
    /// A line segment from start to end.
    Line {
        /// Start point in 2D sketch coordinates.
        start: Point2,
        /// End point in 2D sketch coordinates.
        end: Point2,
    },
    /// A circular arc from start to end around a center.
    Arc {
        /// Start point in 2D sketch coordinates.
        start: Point2,
        /// End point in 2D sketch coordinates.
        end: Point2,
        /// Center of the arc in 2D sketch coordinates.
        center: Point2,
        /// If true, arc goes counter-clockwise from start to end.
        ccw: bool,
    },
}

impl SketchSegment {
    /// Get the start point of this segment.
    pub fn start(&self) -> Point2 {
        match self {
            SketchSegment::Line { start, .. } => *start,
            SketchSegment::Arc { start, .. } => *start,
        }
    }

    /// Get the end point of this segment.
    pub fn end(&self) -> Point2 {
        match self {
            SketchSegment::Line { end, .. } => *end,
            SketchSegment::Arc { end, .. } => *end,
        }
    }

    /// Radius of an arc, `None` for lines.
    pub fn radius(&self) -> Option<f64> {
        match self {
            SketchSegment::Line { .. } => None,
            SketchSegment::Arc { start, center, .. } => Some((start - center).norm()),
        }
    }

    /// Check if this segment is degenerate (zero length).
    pub fn is_degenerate(&self) -> bool {
        let tol = Tolerance::DEFAULT;
        match self {
            SketchSegment::Line { start, end } => (end - start).norm() < tol.linear,
            SketchSegment::Arc {
                start, end, center, ..
            } => {
                // Degenerate if start == end or radius is zero
                let r1 = (start - center).norm();
                let r2 = (end - center).norm();
                r1 < tol.linear || r2 < tol.linear || (end - start).norm() < tol.linear
            }
        }
    }

    /// Get the length of this segment.
    pub fn length(&self) -> f64 {
        match self {
            SketchSegment::Line { start, end } => (end - start).norm(),
            SketchSegment::Arc { start, center, .. } => {
                (start - center).norm() * self.sweep_angle().abs()
            }
        }
    }

    /// Signed sweep angle of an arc (positive counter-clockwise), zero for lines.
    pub fn sweep_angle(&self) -> f64 {
        let SketchSegment::Arc {
            start,
            end,
            center,
            ccw,
        } = self
        else {
            return 0.0;
        };
        let d_start = start - center;
        let d_end = end - center;
        let start_angle = d_start.y.atan2(d_start.x);
        let end_angle = d_end.y.atan2(d_end.x);
        let mut angle = end_angle - start_angle;
        if *ccw {
            if angle < 0.0 {
                angle += 2.0 * PI;
            }
        } else if angle > 0.0 {
            angle -= 2.0 * PI;
        }
        angle
    }

    /// Angle of the arc start as seen from its center, zero for lines.
    pub fn start_angle(&self) -> f64 {
        match self {
            SketchSegment::Line { .. } => 0.0,
            SketchSegment::Arc { start, center, .. } => {
                let d = start - center;
                d.y.atan2(d.x)
            }
        }
    }

    /// Check whether an arc passes through the direction `angle` (radians,
    /// measured at its center). Always false for lines.
    pub fn arc_contains_angle(&self, angle: f64) -> bool {
        let SketchSegment::Arc { ccw, .. } = self else {
            return false;
        };
        let sweep = self.sweep_angle().abs();
        let offset = if *ccw {
            angle - self.start_angle()
        } else {
            self.start_angle() - angle
        };
        offset.rem_euclid(2.0 * PI) <= sweep + Tolerance::DEFAULT.angular
    }

    /// Point at parameter `t` in `[0, 1]` along the segment.
    pub fn point_at(&self, t: f64) -> Point2 {
        match self {
            SketchSegment::Line { start, end } => start + (end - start) * t,
            SketchSegment::Arc { start, center, .. } => {
                let r = (start - center).norm();
                let a = self.start_angle() + self.sweep_angle() * t;
                Point2::new(center.x + r * a.cos(), center.y + r * a.sin())
            }
        }
    }

    /// Unit tangent in the direction of travel at the start point.
    pub fn start_tangent(&self) -> Vec2 {
        match self {
            SketchSegment::Line { start, end } => (end - start).normalize(),
            SketchSegment::Arc {
                start, center, ccw, ..
            } => arc_tangent(start, center, *ccw),
        }
    }

    /// Unit tangent in the direction of travel at the end point.
    pub fn end_tangent(&self) -> Vec2 {
        match self {
            SketchSegment::Line { start, end } => (end - start).normalize(),
            SketchSegment::Arc {
                end, center, ccw, ..
            } => arc_tangent(end, center, *ccw),
        }
    }

    /// The same segment traversed in the opposite direction.
    pub fn reversed(&self) -> Self {
        match *self {
            SketchSegment::Line { start, end } => SketchSegment::Line {
                start: end,
                end: start,
            },
            SketchSegment::Arc {
                start,
                end,
                center,
                ccw,
            } => SketchSegment::Arc {
                start: end,
                end: start,
                center,
                ccw: !ccw,
            },
        }
    }

    /// Contribution of this segment to `½∮(x dy − y dx)`.
    fn area_term(&self) -> f64 {
        match self {
            SketchSegment::Line { start, end } => 0.5 * (start.x * end.y - end.x * start.y),
            SketchSegment::Arc {
                start, end, center, ..
            } => {
                let r = (start - center).norm();
                0.5 * (center.x * (end.y - start.y) - center.y * (end.x - start.x)
                    + r * r * self.sweep_angle())
            }
        }
    }
}

fn arc_tangent(p: &Point2, center: &Point2, ccw: bool) -> Vec2 {
    let d = p - center;
    let t = Vec2::new(-d.y, d.x).normalize();
    if ccw {
        t
    } else {
        -t
    }
}

/// Signed area enclosed by a closed chain of segments.
///
/// Positive when the loop runs counter-clockwise. Arcs contribute their
/// exact circular-segment area.
pub fn signed_area(segments: &[SketchSegment]) -> f64 {
    segments.iter().map(SketchSegment::area_term).sum()
}

/// A closed 2D profile on a sketch plane.
///
/// The profile is defined in a local 2D coordinate system with an origin
/// point in 3D and two orthogonal direction vectors (x_dir, y_dir).
#[derive(Debug, Clone)]
pub struct SketchProfile {
    /// Origin point of the sketch plane in 3D.
    pub origin: Point3,
    /// Unit vector along the local X axis.
    pub x_dir: Dir3,
    /// Unit vector along the local Y axis.
    pub y_dir: Dir3,
    /// Unit normal to the sketch plane (x_dir × y_dir).
    pub normal: Dir3,
    /// The segments forming the closed profile.
    pub segments: Vec<SketchSegment>,
}

impl SketchProfile {
    /// Create a new sketch profile.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The profile has no segments
    /// - Any segment is degenerate, or an arc's endpoints lie at different radii
    /// - The profile is not closed or consecutive segments do not share endpoints
    pub fn new(
        origin: Point3,
        x_dir: Vec3,
        y_dir: Vec3,
        segments: Vec<SketchSegment>,
    ) -> Result<Self, SketchError> {
        let (Some(first), Some(last)) = (segments.first(), segments.last()) else {
            return Err(SketchError::EmptyProfile);
        };

        let tol = Tolerance::DEFAULT;
        for (i, seg) in segments.iter().enumerate() {
            if seg.is_degenerate() {
                return Err(SketchError::DegenerateSegment(i));
            }
            if let SketchSegment::Arc {
                start, end, center, ..
            } = seg
            {
                let delta = ((start - center).norm() - (end - center).norm()).abs();
                if delta > tol.linear {
                    return Err(SketchError::InconsistentArc { index: i, delta });
                }
            }
        }

        let gap = (last.end() - first.start()).norm();
        if gap > tol.linear {
            return Err(SketchError::NotClosed(gap));
        }

        for pair in segments.windows(2) {
            let continuity_gap = (pair[1].start() - pair[0].end()).norm();
            if continuity_gap > tol.linear {
                return Err(SketchError::NotClosed(continuity_gap));
            }
        }

        let x = Dir3::new_normalize(x_dir);
        let y = Dir3::new_normalize(y_dir);
        let n = Dir3::new_normalize(x_dir.cross(&y_dir));

        Ok(Self {
            origin,
            x_dir: x,
            y_dir: y,
            normal: n,
            segments,
        })
    }

    /// Create a rectangular profile.
    ///
    /// The rectangle has corners at:
    /// - `(0, 0)`, `(width, 0)`, `(width, height)`, `(0, height)` in local coords
    ///
    /// Segments go counter-clockwise when viewed from the +normal direction.
    pub fn rectangle(origin: Point3, x_dir: Vec3, y_dir: Vec3, width: f64, height: f64) -> Self {
        let p0 = Point2::new(0.0, 0.0);
        let p1 = Point2::new(width, 0.0);
        let p2 = Point2::new(width, height);
        let p3 = Point2::new(0.0, height);

        Self {
            origin,
            x_dir: Dir3::new_normalize(x_dir),
            y_dir: Dir3::new_normalize(y_dir),
            normal: Dir3::new_normalize(x_dir.cross(&y_dir)),
            segments: vec![
                SketchSegment::Line { start: p0, end: p1 },
                SketchSegment::Line { start: p1, end: p2 },
                SketchSegment::Line { start: p2, end: p3 },
                SketchSegment::Line { start: p3, end: p0 },
            ],
        }
    }

    /// Map a 2D point in sketch coordinates to 3D.
    pub fn to_3d(&self, p: Point2) -> Point3 {
        self.origin + p.x * self.x_dir.as_ref() + p.y * self.y_dir.as_ref()
    }

    /// Map a 3D point to 2D sketch coordinates.
    pub fn to_2d(&self, p: Point3) -> Point2 {
        let d = p - self.origin;
        Point2::new(d.dot(self.x_dir.as_ref()), d.dot(self.y_dir.as_ref()))
    }

    /// Get all segment endpoints (unique vertices of the profile).
    pub fn vertices_2d(&self) -> Vec<Point2> {
        self.segments.iter().map(|s| s.start()).collect()
    }

    /// Check if all segments are lines (no arcs).
    pub fn is_line_only(&self) -> bool {
        self.segments
            .iter()
            .all(|s| matches!(s, SketchSegment::Line { .. }))
    }

    /// Signed enclosed area in sketch coordinates (positive = counter-clockwise).
    pub fn signed_area(&self) -> f64 {
        signed_area(&self.segments)
    }

    /// Verify G1 continuity wherever an arc meets its neighbours.
    ///
    /// Junctions between two straight lines are treated as intended
    /// corners and are not checked.
    pub fn check_tangency(&self, tol: &Tolerance) -> Result<(), SketchError> {
        let n = self.segments.len();
        for i in 0..n {
            let here = &self.segments[i];
            let next = &self.segments[(i + 1) % n];
            let involves_arc = matches!(here, SketchSegment::Arc { .. })
                || matches!(next, SketchSegment::Arc { .. });
            if !involves_arc {
                continue;
            }
            let angle = angle_between_2d(&here.end_tangent(), &next.start_tangent());
            if angle > tol.angular {
                return Err(SketchError::TangentDiscontinuity { index: i, angle });
            }
        }
        Ok(())
    }

    /// Get the number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Check if the profile is empty.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn quarter_arc() -> SketchSegment {
        SketchSegment::Arc {
            start: Point2::new(5.0, 0.0),
            end: Point2::new(0.0, 5.0),
            center: Point2::origin(),
            ccw: true,
        }
    }

    #[test]
    fn test_rectangle_profile() {
        let profile = SketchProfile::rectangle(Point3::origin(), Vec3::x(), Vec3::y(), 10.0, 5.0);
        assert_eq!(profile.segments.len(), 4);
        assert!(profile.is_line_only());
        assert_relative_eq!(profile.signed_area(), 50.0);
    }

    #[test]
    fn test_to_3d_mapping() {
        let profile =
            SketchProfile::rectangle(Point3::new(10.0, 0.0, 0.0), Vec3::y(), Vec3::z(), 5.0, 3.0);

        let p0 = profile.to_3d(Point2::new(0.0, 0.0));
        assert!((p0 - Point3::new(10.0, 0.0, 0.0)).norm() < 1e-12);

        // x_dir=Y, y_dir=Z
        let p1 = profile.to_3d(Point2::new(5.0, 3.0));
        assert!((p1 - Point3::new(10.0, 5.0, 3.0)).norm() < 1e-12);
        assert!((profile.to_2d(p1) - Point2::new(5.0, 3.0)).norm() < 1e-12);
    }

    #[test]
    fn test_not_closed_error() {
        let segments = vec![
            SketchSegment::Line {
                start: Point2::new(0.0, 0.0),
                end: Point2::new(10.0, 0.0),
            },
            SketchSegment::Line {
                start: Point2::new(10.0, 0.0),
                end: Point2::new(10.0, 10.0),
            },
        ];

        let result = SketchProfile::new(Point3::origin(), Vec3::x(), Vec3::y(), segments);
        assert!(matches!(result, Err(SketchError::NotClosed(_))));
    }

    #[test]
    fn test_degenerate_segment_error() {
        let segments = vec![SketchSegment::Line {
            start: Point2::new(0.0, 0.0),
            end: Point2::new(0.0, 0.0),
        }];

        let result = SketchProfile::new(Point3::origin(), Vec3::x(), Vec3::y(), segments);
        assert!(matches!(result, Err(SketchError::DegenerateSegment(0))));
    }

    #[test]
    fn test_empty_profile_error() {
        let result = SketchProfile::new(Point3::origin(), Vec3::x(), Vec3::y(), vec![]);
        assert!(matches!(result, Err(SketchError::EmptyProfile)));
    }

    #[test]
    fn test_inconsistent_arc_error() {
        let segments = vec![
            SketchSegment::Arc {
                start: Point2::new(5.0, 0.0),
                end: Point2::new(0.0, 6.0),
                center: Point2::origin(),
                ccw: true,
            },
            SketchSegment::Line {
                start: Point2::new(0.0, 6.0),
                end: Point2::new(5.0, 0.0),
            },
        ];
        let result = SketchProfile::new(Point3::origin(), Vec3::x(), Vec3::y(), segments);
        assert!(matches!(
            result,
            Err(SketchError::InconsistentArc { index: 0, .. })
        ));
    }

    #[test]
    fn test_segment_length() {
        let line = SketchSegment::Line {
            start: Point2::new(0.0, 0.0),
            end: Point2::new(3.0, 4.0),
        };
        assert_relative_eq!(line.length(), 5.0);
        assert_relative_eq!(quarter_arc().length(), 5.0 * PI / 2.0, epsilon = 1e-10);
    }

    #[test]
    fn test_arc_tangents_follow_direction() {
        let arc = quarter_arc();
        let t0 = arc.start_tangent();
        let t1 = arc.end_tangent();
        assert!((t0 - Vec2::new(0.0, 1.0)).norm() < 1e-12);
        assert!((t1 - Vec2::new(-1.0, 0.0)).norm() < 1e-12);

        let back = arc.reversed();
        assert!((back.start_tangent() - Vec2::new(1.0, 0.0)).norm() < 1e-12);
        assert_relative_eq!(back.sweep_angle(), -PI / 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_arc_contains_angle() {
        let arc = quarter_arc();
        assert!(arc.arc_contains_angle(PI / 4.0));
        assert!(arc.arc_contains_angle(0.0));
        assert!(!arc.arc_contains_angle(PI));
        assert!(!arc.arc_contains_angle(-PI / 4.0));

        let cw = arc.reversed();
        assert!(cw.arc_contains_angle(PI / 4.0));
        assert!(!cw.arc_contains_angle(PI));
    }

    #[test]
    fn test_point_at_midpoint() {
        let mid = quarter_arc().point_at(0.5);
        let expected = 5.0 * (PI / 4.0).cos();
        assert_relative_eq!(mid.x, expected, epsilon = 1e-12);
        assert_relative_eq!(mid.y, expected, epsilon = 1e-12);
    }

    #[test]
    fn test_signed_area_quarter_disk() {
        let segments = vec![
            SketchSegment::Line {
                start: Point2::origin(),
                end: Point2::new(5.0, 0.0),
            },
            quarter_arc(),
            SketchSegment::Line {
                start: Point2::new(0.0, 5.0),
                end: Point2::origin(),
            },
        ];
        assert_relative_eq!(signed_area(&segments), 25.0 * PI / 4.0, epsilon = 1e-10);

        let reversed: Vec<_> = segments.iter().rev().map(|s| s.reversed()).collect();
        assert_relative_eq!(signed_area(&reversed), -25.0 * PI / 4.0, epsilon = 1e-10);
    }

    #[test]
    fn test_tangency_detects_kink() {
        // Quarter disk: both arc junctions are 90° corners.
        let segments = vec![
            SketchSegment::Line {
                start: Point2::origin(),
                end: Point2::new(5.0, 0.0),
            },
            quarter_arc(),
            SketchSegment::Line {
                start: Point2::new(0.0, 5.0),
                end: Point2::origin(),
            },
        ];
        let profile =
            SketchProfile::new(Point3::origin(), Vec3::x(), Vec3::y(), segments).unwrap();
        let result = profile.check_tangency(&Tolerance::TANGENCY);
        assert!(matches!(
            result,
            Err(SketchError::TangentDiscontinuity { index: 0, .. })
        ));
    }

    #[test]
    fn test_tangency_accepts_rounded_corner() {
        // Square with one filleted corner at (10, 0), radius 2.
        let segments = vec![
            SketchSegment::Line {
                start: Point2::new(0.0, 0.0),
                end: Point2::new(8.0, 0.0),
            },
            SketchSegment::Arc {
                start: Point2::new(8.0, 0.0),
                end: Point2::new(10.0, 2.0),
                center: Point2::new(8.0, 2.0),
                ccw: true,
            },
            SketchSegment::Line {
                start: Point2::new(10.0, 2.0),
                end: Point2::new(10.0, 10.0),
            },
            SketchSegment::Line {
                start: Point2::new(10.0, 10.0),
                end: Point2::new(0.0, 10.0),
            },
            SketchSegment::Line {
                start: Point2::new(0.0, 10.0),
                end: Point2::new(0.0, 0.0),
            },
        ];
        let profile =
            SketchProfile::new(Point3::origin(), Vec3::x(), Vec3::y(), segments).unwrap();
        assert!(profile.check_tangency(&Tolerance::TANGENCY).is_ok());
        assert!(!profile.is_line_only());
    }
}
