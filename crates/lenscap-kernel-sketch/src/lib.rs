#![warn(missing_docs)]

//! Sketch-based operations for the lenscap kernel.
//!
//! A closed 2D path is drawn with move / line / signed-radius arc / close
//! commands, resolved into line and arc segments, checked for tangent
//! continuity, and revolved a full turn about an axis into an analytic
//! boundary representation.
//!
//! # Example
//!
//! ```
//! use lenscap_kernel_sketch::{revolve, SketchPath};
//! use lenscap_kernel_math::{Point3, Vec3};
//!
//! // Rectangle 5..8 mm from the axis, 10 mm tall, drawn in the XZ plane
//! let mut path = SketchPath::new();
//! path.move_to(5.0, 0.0)
//!     .line_to(8.0, 0.0)
//!     .line_to(8.0, 10.0)
//!     .line_to(5.0, 10.0)
//!     .close();
//! let profile = path.to_profile(Point3::origin(), Vec3::x(), Vec3::z()).unwrap();
//!
//! // Revolve 360° about Z → hollow cylinder
//! let solid = revolve(&profile, Point3::origin(), Vec3::z()).unwrap();
//! assert_eq!(solid.faces.len(), 4);
//! ```

mod path;
mod profile;
mod revolve;

pub use path::{PathCommand, SketchPath};
pub use profile::{signed_area, SketchProfile, SketchSegment};
pub use revolve::{revolve, RevolveAxis, RevolvedFace, RevolvedSolid, RevolvedSurface};

use thiserror::Error;

/// Errors from sketch-based operations.
#[derive(Debug, Clone, Error)]
pub enum SketchError {
    /// The profile is not closed (gap between first and last segment).
    #[error("profile is not closed: gap of {0:.6} mm")]
    NotClosed(f64),

    /// A segment is degenerate (zero length).
    #[error("degenerate segment at index {0}")]
    DegenerateSegment(usize),

    /// An arc whose endpoints are not equidistant from its center.
    #[error("arc at index {index} is inconsistent: endpoint radii differ by {delta:.6} mm")]
    InconsistentArc {
        /// Segment index.
        index: usize,
        /// Difference between start and end radius.
        delta: f64,
    },

    /// A path did not begin with a move command.
    #[error("path must start with a move command")]
    PathNotStarted,

    /// A second move command inside a single path.
    #[error("unexpected move command at index {0}: a profile is a single loop")]
    UnexpectedMove(usize),

    /// A command follows the close command.
    #[error("command at index {0} follows the close command")]
    CommandAfterClose(usize),

    /// Arc radius too small to span its chord.
    #[error(
        "arc at command {index}: radius {radius} cannot span a chord of half-length {half_chord:.6}"
    )]
    ArcRadiusTooSmall {
        /// Command index.
        index: usize,
        /// Requested signed radius.
        radius: f64,
        /// Half of the chord length.
        half_chord: f64,
    },

    /// Adjacent segments meet at an arc without matching tangents.
    #[error("tangent discontinuity after segment {index}: {angle:.3e} rad")]
    TangentDiscontinuity {
        /// Index of the segment ending at the junction.
        index: usize,
        /// Angle between the two tangents in radians.
        angle: f64,
    },

    /// Revolution axis has zero length.
    #[error("revolution axis is zero")]
    ZeroAxis,

    /// Revolution axis does not lie in the sketch plane.
    #[error("revolution axis does not lie in the sketch plane")]
    AxisNotInPlane,

    /// Profile crosses the revolution axis.
    #[error("profile intersects the revolution axis")]
    AxisIntersection,

    /// Profile lies entirely on the axis.
    #[error("profile has no extent away from the revolution axis")]
    NotRevolvable,

    /// An arc crosses between the two halves of a spindle torus.
    #[error("arc at index {0} sweeps both halves of a spindle torus")]
    DegenerateTorus(usize),

    /// Profile has no segments.
    #[error("profile has no segments")]
    EmptyProfile,
}
