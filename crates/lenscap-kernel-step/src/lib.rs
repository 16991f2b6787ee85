#![warn(missing_docs)]

//! STEP file export for the lenscap kernel.
//!
//! Writes revolved solids as ISO 10303-21 files. Targets AP214
//! (Automotive Design), the most common mechanical CAD protocol. Faces
//! keep their exact surfaces: planes, cylinders, cones, spheres and tori.
//!
//! # Example
//!
//! ```no_run
//! use lenscap_kernel_math::{Point3, Vec3};
//! use lenscap_kernel_sketch::{revolve, SketchProfile};
//! use lenscap_kernel_step::write_step;
//!
//! let profile = SketchProfile::rectangle(
//!     Point3::new(5.0, 0.0, 0.0), Vec3::x(), Vec3::z(), 3.0, 10.0,
//! );
//! let solid = revolve(&profile, Point3::origin(), Vec3::z()).unwrap();
//! write_step(&solid, "ring.step").unwrap();
//! ```

mod error;
mod writer;

pub use error::StepError;
pub use writer::{
    write_step, write_step_to_buffer, write_step_to_buffer_with_options,
    write_step_with_options, StepOptions,
};
