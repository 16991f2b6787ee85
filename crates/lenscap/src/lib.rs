#![warn(missing_docs)]

//! Parametric slip-on lens cap generator.
//!
//! A lens cap is a solid of revolution: one closed half-profile with its
//! four corner fillets drawn in, revolved a full turn about the Z axis.
//! The exact solid is written to STEP; a tessellated copy goes to STL.
//!
//! # Example
//!
//! ```rust,no_run
//! use lenscap::{CapParams, ExportOptions, LensCap};
//!
//! let cap = LensCap::new(CapParams::new(75.0, 2.0, 20.0)).unwrap();
//! let summary = cap.export(".", &ExportOptions::default()).unwrap();
//! assert!(summary.watertight);
//! ```

use std::path::{Path, PathBuf};

use lenscap_kernel_math::{Point3, Vec3};
use lenscap_kernel_sketch::{revolve, RevolvedSolid, SketchError, SketchProfile};
use lenscap_kernel_step::{StepError, StepOptions};
use lenscap_kernel_tessellate::{compute_mesh_volume, is_watertight, tessellate_solid, TriangleMesh};
use thiserror::Error;
use tracing::{debug, info, warn};

pub mod export;
pub mod params;
pub mod profile;

pub use export::{output_stem, ExportOptions, ExportSummary, StlFormat};
pub use lenscap_kernel_tessellate::TessellationParams;
pub use params::{CapError, CapParams, FilletRadii};
pub use profile::{cap_path, cap_profile};

/// Errors returned by cap construction and export.
#[derive(Error, Debug)]
pub enum CadError {
    /// Invalid dimensions or fillet radii.
    #[error(transparent)]
    Cap(#[from] CapError),
    /// The profile could not be resolved or revolved.
    #[error("geometry error: {0}")]
    Sketch(#[from] SketchError),
    /// STEP export failed.
    #[error("STEP export failed: {0}")]
    Step(#[from] StepError),
    /// The parameter file is not valid TOML or has unknown keys.
    #[error("invalid parameter file: {0}")]
    Config(#[from] toml::de::Error),
    /// An I/O error occurred during export.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A validated lens cap with its profile and exact solid.
#[derive(Debug, Clone)]
pub struct LensCap {
    /// Human-readable name, used for export file names and metadata.
    pub name: String,
    params: CapParams,
    profile: SketchProfile,
    solid: RevolvedSolid,
}

impl LensCap {
    /// Validate the parameters and build the solid.
    pub fn new(params: CapParams) -> Result<Self, CadError> {
        let profile = cap_profile(&params)?;
        let solid = revolve(&profile, Point3::origin(), Vec3::z())?;
        debug!(faces = ?solid.face_summary(), "cap solid built");
        Ok(Self {
            name: output_stem(params.inner_diameter),
            params,
            profile,
            solid,
        })
    }

    /// The parameters the cap was built from.
    pub fn params(&self) -> &CapParams {
        &self.params
    }

    /// The resolved half-profile on the XZ plane.
    pub fn profile(&self) -> &SketchProfile {
        &self.profile
    }

    /// The exact boundary representation.
    pub fn solid(&self) -> &RevolvedSolid {
        &self.solid
    }

    /// Exact volume in mm³.
    pub fn volume(&self) -> f64 {
        self.solid.volume()
    }

    /// Axis-aligned bounding box as `(min, max)`.
    pub fn bounding_box(&self) -> ([f64; 3], [f64; 3]) {
        self.solid.bounding_box()
    }

    /// Tessellate the solid.
    pub fn to_mesh(&self, params: &TessellationParams) -> TriangleMesh {
        tessellate_solid(&self.solid, params)
    }

    /// Encode a mesh of the cap as STL.
    pub fn to_stl(&self, format: StlFormat, params: &TessellationParams) -> Vec<u8> {
        let mesh = self.to_mesh(params);
        match format {
            StlFormat::Binary => export::stl::to_stl_bytes(&mesh, &self.name),
            StlFormat::Ascii => export::stl::to_stl_ascii(&mesh, &self.name).into_bytes(),
        }
    }

    /// Write STL to file.
    pub fn write_stl(
        &self,
        path: impl AsRef<Path>,
        format: StlFormat,
        params: &TessellationParams,
    ) -> Result<(), CadError> {
        std::fs::write(path, self.to_stl(format, params))?;
        Ok(())
    }

    fn step_options(&self) -> StepOptions {
        StepOptions {
            product_name: self.name.clone(),
            ..StepOptions::default()
        }
    }

    /// Encode the exact solid as STEP.
    pub fn to_step(&self) -> Result<Vec<u8>, CadError> {
        Ok(lenscap_kernel_step::write_step_to_buffer_with_options(
            &self.solid,
            &self.step_options(),
        )?)
    }

    /// Write STEP to file.
    pub fn write_step(&self, path: impl AsRef<Path>) -> Result<(), CadError> {
        lenscap_kernel_step::write_step_with_options(&self.solid, path, &self.step_options())?;
        Ok(())
    }

    /// Write `<name>.step` and `<name>.stl` into `dir`.
    ///
    /// Both files are encoded in memory before either is written.
    pub fn export(
        &self,
        dir: impl AsRef<Path>,
        options: &ExportOptions,
    ) -> Result<ExportSummary, CadError> {
        let dir = dir.as_ref();
        let step = self.to_step()?;
        let mesh = self.to_mesh(&options.tessellation);
        let stl = match options.stl_format {
            StlFormat::Binary => export::stl::to_stl_bytes(&mesh, &self.name),
            StlFormat::Ascii => export::stl::to_stl_ascii(&mesh, &self.name).into_bytes(),
        };

        let watertight = is_watertight(&mesh);
        if !watertight {
            warn!(name = %self.name, "STL mesh is not watertight");
        }

        let step_path: PathBuf = dir.join(format!("{}.step", self.name));
        let stl_path: PathBuf = dir.join(format!("{}.stl", self.name));
        std::fs::write(&step_path, step)?;
        info!(path = %step_path.display(), "wrote STEP");
        std::fs::write(&stl_path, stl)?;
        info!(path = %stl_path.display(), triangles = mesh.num_triangles(), "wrote STL");

        Ok(ExportSummary {
            step_path,
            stl_path,
            stl_format: options.stl_format,
            volume: self.volume(),
            mesh_volume: compute_mesh_volume(&mesh),
            triangles: mesh.num_triangles(),
            watertight,
            faces: self
                .solid
                .face_summary()
                .into_iter()
                .map(|(kind, n)| (kind.to_string(), n))
                .collect(),
            bounding_box: self.bounding_box(),
        })
    }
}
