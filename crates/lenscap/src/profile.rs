//! The cap's half cross-section as a closed sketch path.

use lenscap_kernel_math::{Point3, Tolerance, Vec3};
use lenscap_kernel_sketch::{SketchPath, SketchProfile};
use tracing::debug;

use crate::params::{CapError, CapParams};
use crate::CadError;

/// Build the drawing commands for the half-profile.
///
/// The loop runs counter-clockwise in the `(radius, height)` plane,
/// starting on the axis at the underside: outer floor, outer wall up,
/// rim inward, inner wall down, inner floor back to the axis. Convex
/// corners use a positive radius, the concave floor corner a negative one.
///
/// Parameters are validated first; nothing is drawn for invalid input.
pub fn cap_path(params: &CapParams) -> Result<SketchPath, CapError> {
    params.validate()?;

    let ir = params.inner_radius();
    let or = params.outer_radius();
    let h = params.height;
    let bottom = params.bottom_thickness();
    let f = &params.fillets;

    debug!(
        inner_radius = ir,
        outer_radius = or,
        height = h,
        bottom,
        "building cap profile"
    );

    let mut path = SketchPath::new();
    path.move_to(0.0, 0.0)
        .line_to(or - f.outer_bottom, 0.0)
        .radius_arc_to(or, f.outer_bottom, f.outer_bottom)
        .line_to(or, h - f.outer_rim)
        .radius_arc_to(or - f.outer_rim, h, f.outer_rim)
        .line_to(ir + f.inner_rim, h)
        .radius_arc_to(ir, h - f.inner_rim, f.inner_rim)
        .line_to(ir, bottom + f.inner_bottom)
        .radius_arc_to(ir - f.inner_bottom, bottom, -f.inner_bottom)
        .line_to(0.0, bottom)
        .close();
    Ok(path)
}

/// Resolve the half-profile onto the XZ plane (x = radius, z = height).
///
/// Every junction that involves a fillet must be tangent-continuous.
pub fn cap_profile(params: &CapParams) -> Result<SketchProfile, CadError> {
    let path = cap_path(params)?;
    let profile = path.to_profile(Point3::origin(), Vec3::x(), Vec3::z())?;
    profile.check_tangency(&Tolerance::TANGENCY)?;
    debug!(segments = profile.len(), "cap profile resolved");
    Ok(profile)
}
