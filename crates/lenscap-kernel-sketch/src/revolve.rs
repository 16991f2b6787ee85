//! Revolve operation: create a solid by rotating a profile a full turn
//! around an axis lying in the sketch plane.
//!
//! The result keeps the exact surfaces of revolution instead of a faceted
//! approximation. Every profile segment off the axis becomes one face;
//! its two end points sweep the circles that bound it. Segments lying on
//! the axis sweep nothing and produce no face.

use std::f64::consts::PI;

use lenscap_kernel_math::{Dir3, Point2, Point3, Tolerance, Vec2, Vec3};
use tracing::debug;

use crate::{signed_area, SketchError, SketchProfile, SketchSegment};

/// Axis of revolution with a radial reference direction.
///
/// Points of the solid are addressed in meridian coordinates `(r, h)`:
/// distance from the axis and height along it, measured in the half-plane
/// spanned by `direction` and `radial`.
#[derive(Debug, Clone, Copy)]
pub struct RevolveAxis {
    /// A point on the axis.
    pub origin: Point3,
    /// Unit direction of the axis.
    pub direction: Dir3,
    /// Unit direction in the sketch plane, perpendicular to the axis,
    /// pointing towards the profile.
    pub radial: Dir3,
}

impl RevolveAxis {
    /// Third basis vector, `direction × radial`.
    pub fn binormal(&self) -> Vec3 {
        self.direction.as_ref().cross(self.radial.as_ref())
    }

    /// Map meridian coordinates `(r, h)` at angle `theta` to 3D.
    pub fn point_at(&self, rh: Point2, theta: f64) -> Point3 {
        let (s, c) = theta.sin_cos();
        self.origin
            + rh.y * self.direction.as_ref()
            + rh.x * (c * self.radial.as_ref() + s * self.binormal())
    }

    /// Point on the axis at height `h`.
    pub fn axis_point(&self, h: f64) -> Point3 {
        self.origin + h * self.direction.as_ref()
    }
}

/// Analytic surface swept by one profile segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RevolvedSurface {
    /// Segment perpendicular to the axis: a disk or annulus.
    Plane {
        /// Height of the plane along the axis.
        height: f64,
    },
    /// Segment parallel to the axis.
    Cylinder {
        /// Distance from the axis.
        radius: f64,
    },
    /// Segment inclined to the axis.
    Cone {
        /// Height of the reference circle.
        height: f64,
        /// Radius of the reference circle (the wider end of the segment).
        radius: f64,
        /// Half-angle of the cone in radians.
        semi_angle: f64,
        /// True if the cone widens in the +axis direction.
        widens_along_axis: bool,
    },
    /// Arc centered on the axis.
    Sphere {
        /// Height of the sphere center.
        center_height: f64,
        /// Sphere radius.
        radius: f64,
    },
    /// Arc centered off the axis.
    Torus {
        /// Height of the tube center circle.
        center_height: f64,
        /// Distance from the axis to the tube center.
        major_radius: f64,
        /// Tube radius.
        minor_radius: f64,
    },
}

impl RevolvedSurface {
    /// Short name used in logs and summaries.
    pub fn kind(&self) -> &'static str {
        match self {
            RevolvedSurface::Plane { .. } => "plane",
            RevolvedSurface::Cylinder { .. } => "cylinder",
            RevolvedSurface::Cone { .. } => "cone",
            RevolvedSurface::Sphere { .. } => "sphere",
            RevolvedSurface::Torus { .. } => "torus",
        }
    }

    /// True for surfaces that close on themselves around the axis and
    /// need a seam edge.
    pub fn is_periodic(&self) -> bool {
        !matches!(self, RevolvedSurface::Plane { .. })
    }
}

/// One face of a revolved solid.
#[derive(Debug, Clone, PartialEq)]
pub struct RevolvedFace {
    /// The surface the face lies on.
    pub surface: RevolvedSurface,
    /// The generating profile segment in meridian coordinates `(r, h)`.
    pub generator: SketchSegment,
    /// Index of the generating segment in [`RevolvedSolid::meridian`].
    pub index: usize,
    /// True if the outward face normal agrees with the surface normal.
    pub same_sense: bool,
}

impl RevolvedFace {
    /// The two circles bounding the face as `(radius, height)`, at the
    /// start and end of the generator. A zero radius is an axis point.
    pub fn bounding_circles(&self) -> [(f64, f64); 2] {
        let (a, b) = (self.generator.start(), self.generator.end());
        [(a.x, a.y), (b.x, b.y)]
    }
}

/// Boundary representation of a full revolution.
#[derive(Debug, Clone)]
pub struct RevolvedSolid {
    /// The axis and radial frame.
    pub axis: RevolveAxis,
    /// Profile in meridian coordinates, counter-clockwise, closed.
    pub meridian: Vec<SketchSegment>,
    /// Faces, in profile order.
    pub faces: Vec<RevolvedFace>,
}

impl RevolvedSolid {
    /// Distinct profile vertices in meridian coordinates, in profile order.
    pub fn meridian_vertices(&self) -> Vec<Point2> {
        self.meridian.iter().map(|s| s.start()).collect()
    }

    /// Number of circular edges (profile vertices off the axis).
    pub fn num_circles(&self) -> usize {
        let tol = Tolerance::DEFAULT;
        self.meridian
            .iter()
            .filter(|s| !tol.is_zero(s.start().x))
            .count()
    }

    /// Exact enclosed volume.
    ///
    /// Pappus' theorem written as a boundary integral: `V = 2π ∮ r²/2 dh`
    /// over the counter-clockwise meridian.
    pub fn volume(&self) -> f64 {
        2.0 * PI * self.meridian.iter().map(half_r_squared_dh).sum::<f64>()
    }

    /// Axis-aligned bounding box as `(min, max)`.
    pub fn bounding_box(&self) -> ([f64; 3], [f64; 3]) {
        let a = self.axis.direction.as_ref();
        let mut min = [0.0; 3];
        let mut max = [0.0; 3];
        for k in 0..3 {
            // A circle of radius r at height h spans h·a_k ± r·√(1 − a_k²)
            // in world coordinate k.
            let spread = (1.0 - a[k] * a[k]).max(0.0).sqrt();
            let upper = support(&self.meridian, Vec2::new(spread, a[k]));
            let lower = support(&self.meridian, Vec2::new(spread, -a[k]));
            max[k] = self.axis.origin[k] + upper;
            min[k] = self.axis.origin[k] - lower;
        }
        (min, max)
    }

    /// Count faces by surface kind, e.g. `[("plane", 3), ("torus", 4)]`.
    pub fn face_summary(&self) -> Vec<(&'static str, usize)> {
        let mut out: Vec<(&'static str, usize)> = Vec::new();
        for face in &self.faces {
            let kind = face.surface.kind();
            match out.iter_mut().find(|(k, _)| *k == kind) {
                Some((_, n)) => *n += 1,
                None => out.push((kind, 1)),
            }
        }
        out
    }
}

/// `∫ r²/2 dh` along one meridian segment.
fn half_r_squared_dh(seg: &SketchSegment) -> f64 {
    match seg {
        SketchSegment::Line { start, end } => {
            let (r0, r1) = (start.x, end.x);
            (end.y - start.y) * (r0 * r0 + r0 * r1 + r1 * r1) / 6.0
        }
        SketchSegment::Arc { start, center, .. } => {
            let rho = (start - center).norm();
            let cr = center.x;
            let t0 = seg.start_angle();
            let t1 = t0 + seg.sweep_angle();
            let antiderivative = |t: f64| {
                let s = t.sin();
                cr * cr * s
                    + 2.0 * cr * rho * (t / 2.0 + (2.0 * t).sin() / 4.0)
                    + rho * rho * (s - s * s * s / 3.0)
            };
            rho / 2.0 * (antiderivative(t1) - antiderivative(t0))
        }
    }
}

/// Largest value of `w · (r, h)` over the meridian.
fn support(meridian: &[SketchSegment], w: Vec2) -> f64 {
    let mut best = f64::MIN;
    for seg in meridian {
        for p in [seg.start(), seg.end()] {
            best = best.max(w.x * p.x + w.y * p.y);
        }
        if let SketchSegment::Arc { start, center, .. } = seg {
            let norm = w.norm();
            if norm > 0.0 && seg.arc_contains_angle(w.y.atan2(w.x)) {
                let rho = (start - center).norm();
                best = best.max(w.x * center.x + w.y * center.y + rho * norm);
            }
        }
    }
    best
}

/// Revolve a closed profile a full turn around an axis.
///
/// # Arguments
///
/// * `profile` - The closed 2D profile to revolve
/// * `axis_origin` - A point on the axis of revolution, in the sketch plane
/// * `axis_dir` - Direction of the axis, parallel to the sketch plane
///
/// # Errors
///
/// - `ZeroAxis` if the axis direction is zero
/// - `AxisNotInPlane` if the axis leaves the sketch plane
/// - `AxisIntersection` if the profile reaches the far side of the axis
/// - `NotRevolvable` if the whole profile lies on the axis
/// - `DegenerateTorus` if an arc sweeps both halves of a spindle torus
///
/// # Example
///
/// ```
/// use lenscap_kernel_sketch::{SketchProfile, revolve};
/// use lenscap_kernel_math::{Point3, Vec3};
///
/// // Rectangle from r = 5 to r = 8, 10 tall, in the XZ plane
/// let profile = SketchProfile::rectangle(
///     Point3::new(5.0, 0.0, 0.0),
///     Vec3::x(),
///     Vec3::z(),
///     3.0, 10.0,
/// );
///
/// let solid = revolve(&profile, Point3::origin(), Vec3::z()).unwrap();
/// let expected = std::f64::consts::PI * (64.0 - 25.0) * 10.0;
/// assert!((solid.volume() - expected).abs() < 1e-9);
/// ```
pub fn revolve(
    profile: &SketchProfile,
    axis_origin: Point3,
    axis_dir: Vec3,
) -> Result<RevolvedSolid, SketchError> {
    let tol = Tolerance::DEFAULT;

    if profile.is_empty() {
        return Err(SketchError::EmptyProfile);
    }
    if axis_dir.norm() < 1e-12 {
        return Err(SketchError::ZeroAxis);
    }
    let axis = Dir3::new_normalize(axis_dir);
    let normal = profile.normal.as_ref();

    if axis.as_ref().dot(normal).abs() > 1e-9
        || (axis_origin - profile.origin).dot(normal).abs() > tol.linear
    {
        return Err(SketchError::AxisNotInPlane);
    }

    // Radial direction: in the plane, perpendicular to the axis, oriented
    // towards the profile.
    let mut radial = normal.cross(axis.as_ref()).normalize();
    // Vertices plus arc midpoints, so a profile closed by an arc along the
    // axis still shows which side it lies on.
    let radii: Vec<f64> = profile
        .segments
        .iter()
        .flat_map(|seg| match seg {
            SketchSegment::Line { start, .. } => vec![*start],
            SketchSegment::Arc { start, .. } => vec![*start, seg.point_at(0.5)],
        })
        .map(|p| (profile.to_3d(p) - axis_origin).dot(&radial))
        .collect();
    let r_min = radii.iter().copied().fold(f64::MAX, f64::min);
    let r_max = radii.iter().copied().fold(f64::MIN, f64::max);
    if r_min < -tol.linear && r_max > tol.linear {
        return Err(SketchError::AxisIntersection);
    }
    if r_max <= tol.linear {
        if r_min >= -tol.linear {
            return Err(SketchError::NotRevolvable);
        }
        radial = -radial;
    }
    let frame = RevolveAxis {
        origin: axis_origin,
        direction: axis,
        radial: Dir3::new_normalize(radial),
    };

    // (radial, axis) is a right-handed 2D frame when its normal agrees with
    // the sketch normal; otherwise arc directions flip.
    let keeps_handedness = frame.radial.as_ref().cross(axis.as_ref()).dot(normal) > 0.0;
    let to_meridian = |p: Point2| -> Point2 {
        let d = profile.to_3d(p) - axis_origin;
        let r = d.dot(frame.radial.as_ref());
        Point2::new(if r.abs() < tol.linear { 0.0 } else { r }, d.dot(axis.as_ref()))
    };

    let mut meridian: Vec<SketchSegment> = profile
        .segments
        .iter()
        .map(|seg| match *seg {
            SketchSegment::Line { start, end } => SketchSegment::Line {
                start: to_meridian(start),
                end: to_meridian(end),
            },
            SketchSegment::Arc {
                start,
                end,
                center,
                ccw,
            } => SketchSegment::Arc {
                start: to_meridian(start),
                end: to_meridian(end),
                center: to_meridian(center),
                ccw: ccw == keeps_handedness,
            },
        })
        .collect();

    for seg in &meridian {
        if let SketchSegment::Arc { start, center, .. } = seg {
            let rho = (start - center).norm();
            if center.x - rho < -tol.linear && seg.arc_contains_angle(PI) {
                return Err(SketchError::AxisIntersection);
            }
        }
    }

    if signed_area(&meridian) < 0.0 {
        meridian = meridian.iter().rev().map(SketchSegment::reversed).collect();
    }

    let mut faces = Vec::with_capacity(meridian.len());
    for (i, seg) in meridian.iter().enumerate() {
        if let Some(face) = classify(seg, i, &tol)? {
            faces.push(face);
        }
    }

    debug!(
        segments = meridian.len(),
        faces = faces.len(),
        "revolved profile"
    );

    Ok(RevolvedSolid {
        axis: frame,
        meridian,
        faces,
    })
}

/// Build the face swept by one counter-clockwise meridian segment.
///
/// The outward normal of the segment is `(dh, −dr)`; the surface normal
/// of every analytic surface points away from the axis (or away from the
/// sphere/tube center), which fixes `same_sense`.
fn classify(
    seg: &SketchSegment,
    index: usize,
    tol: &Tolerance,
) -> Result<Option<RevolvedFace>, SketchError> {
    let face = match *seg {
        SketchSegment::Line { start, end } => {
            let dr = end.x - start.x;
            let dh = end.y - start.y;
            if tol.is_zero(start.x) && tol.is_zero(end.x) {
                return Ok(None);
            }
            if tol.is_zero(dh) {
                RevolvedFace {
                    surface: RevolvedSurface::Plane { height: start.y },
                    generator: seg.clone(),
                    index,
                    same_sense: dr < 0.0,
                }
            } else if tol.is_zero(dr) {
                RevolvedFace {
                    surface: RevolvedSurface::Cylinder { radius: start.x },
                    generator: seg.clone(),
                    index,
                    same_sense: dh > 0.0,
                }
            } else {
                let wide = if start.x > end.x { start } else { end };
                RevolvedFace {
                    surface: RevolvedSurface::Cone {
                        height: wide.y,
                        radius: wide.x,
                        semi_angle: (dr.abs() / dh.abs()).atan(),
                        widens_along_axis: dr / dh > 0.0,
                    },
                    generator: seg.clone(),
                    index,
                    same_sense: dh > 0.0,
                }
            }
        }
        SketchSegment::Arc {
            start, center, ccw, ..
        } => {
            let rho = (start - center).norm();
            let surface = if tol.is_zero(center.x) {
                RevolvedSurface::Sphere {
                    center_height: center.y,
                    radius: rho,
                }
            } else {
                if center.x < rho - tol.linear && tube_side(seg, center, tol).is_none() {
                    return Err(SketchError::DegenerateTorus(index));
                }
                RevolvedSurface::Torus {
                    center_height: center.y,
                    major_radius: center.x,
                    minor_radius: rho,
                }
            };
            RevolvedFace {
                surface,
                generator: seg.clone(),
                index,
                same_sense: ccw,
            }
        }
    };
    Ok(Some(face))
}

/// Half of its tube an arc stays in: `Some(true)` away from the axis,
/// `Some(false)` towards it, `None` if it passes over the top or bottom.
fn tube_side(seg: &SketchSegment, center: Point2, tol: &Tolerance) -> Option<bool> {
    let a = seg.start().x - center.x;
    let b = seg.end().x - center.x;
    if a > -tol.linear && b > -tol.linear && !seg.arc_contains_angle(PI) {
        Some(true)
    } else if a < tol.linear && b < tol.linear && !seg.arc_contains_angle(0.0) {
        Some(false)
    } else {
        None
    }
}
