//! Export formats and output naming.
//!
//! - [`stl`]: binary and ASCII STL from a tessellated mesh
//! - STEP is written by `lenscap_kernel_step` from the exact solid

pub mod stl;

use std::path::PathBuf;

use lenscap_kernel_tessellate::TessellationParams;
use serde::Serialize;

/// File stem for a cap, derived from its inner diameter.
///
/// One decimal is kept and the decimal point becomes `_`:
/// `75.0` → `slip_on_cap_ID75_0`.
pub fn output_stem(inner_diameter: f64) -> String {
    format!("slip_on_cap_ID{:.1}", inner_diameter).replace('.', "_")
}

/// STL encoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StlFormat {
    /// Little-endian binary STL.
    #[default]
    Binary,
    /// Human-readable ASCII STL.
    Ascii,
}

/// Options for [`crate::LensCap::export`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ExportOptions {
    /// STL encoding.
    pub stl_format: StlFormat,
    /// Mesh resolution for the STL file.
    pub tessellation: TessellationParams,
}

/// What an export wrote, for logs and the `--json` report.
#[derive(Debug, Clone, Serialize)]
pub struct ExportSummary {
    /// Path of the STEP file.
    pub step_path: PathBuf,
    /// Path of the STL file.
    pub stl_path: PathBuf,
    /// STL encoding used.
    pub stl_format: StlFormat,
    /// Exact volume of the solid in mm³.
    pub volume: f64,
    /// Volume enclosed by the STL mesh in mm³.
    pub mesh_volume: f64,
    /// Number of STL triangles.
    pub triangles: usize,
    /// True if every mesh edge is shared by exactly two triangles.
    pub watertight: bool,
    /// Face count per surface kind.
    pub faces: Vec<(String, usize)>,
    /// Axis-aligned bounding box as `(min, max)`.
    pub bounding_box: ([f64; 3], [f64; 3]),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_stem() {
        assert_eq!(output_stem(75.0), "slip_on_cap_ID75_0");
        assert_eq!(output_stem(52.5), "slip_on_cap_ID52_5");
        assert!(!output_stem(58.25).contains('.'));
    }
}
