//! Cap dimensions, fillet radii and their validation.
//!
//! All lengths are millimetres. Parameters can be built in code or read
//! from a TOML file:
//!
//! ```toml
//! inner_diameter = 75.0
//! wall = 2.0
//! height = 20.0
//! bottom = 2.0          # optional, defaults to `wall`
//!
//! [fillets]             # optional, each key optional
//! inner_bottom = 0.8
//! outer_bottom = 1.0
//! outer_rim = 0.9
//! inner_rim = 0.9
//! ```

use std::path::Path;

use lenscap_kernel_math::Tolerance;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::CadError;

/// Shortest straight run the profile may keep between two fillets.
///
/// Twice the sketch tolerance, so the run stays above it once the
/// end points are rounded in profile coordinates.
const MIN_STRAIGHT: f64 = 2.0 * Tolerance::DEFAULT.linear;

/// Invalid cap dimensions or fillet radii.
///
/// Every variant is raised before any geometry is built.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CapError {
    /// A dimension is not finite or too small to draw.
    #[error("{name} must be a finite length of at least {min} mm, got {value}", min = MIN_STRAIGHT)]
    NonPositive {
        /// Parameter name.
        name: &'static str,
        /// Offending value.
        value: f64,
    },

    /// The floor is as thick as the whole cap.
    #[error("bottom thickness {bottom} must be less than the height {height}")]
    BottomTooThick {
        /// Bottom thickness.
        bottom: f64,
        /// Total height.
        height: f64,
    },

    /// The two fillets on one wall meet or overlap.
    #[error("height {height} leaves no straight {side} wall: the fillets need more than {required}")]
    HeightTooShort {
        /// `"outer"` or `"inner"`.
        side: &'static str,
        /// Height taken up by the fillets (and floor, for the inner wall).
        required: f64,
        /// Total height.
        height: f64,
    },

    /// The inner bottom fillet swallows the whole floor.
    #[error("inner bottom fillet {radius} must be less than the inner radius {inner_radius}")]
    InnerFilletTooLarge {
        /// Inner bottom fillet radius.
        radius: f64,
        /// Inner radius of the cap.
        inner_radius: f64,
    },

    /// `R_in >= min(bottom, wall)`.
    #[error("inner bottom fillet R_in = {radius} must be less than min(bottom, wall) = {limit}")]
    InnerBottomFillet {
        /// Inner bottom fillet radius.
        radius: f64,
        /// `min(bottom, wall)`.
        limit: f64,
    },

    /// `R_out >= wall`.
    #[error("outer bottom fillet R_out = {radius} must be less than the wall thickness {wall}")]
    OuterBottomFillet {
        /// Outer bottom fillet radius.
        radius: f64,
        /// Wall thickness.
        wall: f64,
    },

    /// `R_top_out >= wall`.
    #[error("outer rim fillet R_top_out = {radius} must be less than the wall thickness {wall}")]
    OuterRimFillet {
        /// Outer rim fillet radius.
        radius: f64,
        /// Wall thickness.
        wall: f64,
    },

    /// `R_top_in >= wall`.
    #[error("inner rim fillet R_top_in = {radius} must be less than the wall thickness {wall}")]
    InnerRimFillet {
        /// Inner rim fillet radius.
        radius: f64,
        /// Wall thickness.
        wall: f64,
    },

    /// `R_top_out + R_top_in >= wall`.
    #[error(
        "rim fillets overlap: R_top_out + R_top_in = {outer} + {inner} must be less than the wall thickness {wall}"
    )]
    RimFilletsOverlap {
        /// Outer rim fillet radius.
        outer: f64,
        /// Inner rim fillet radius.
        inner: f64,
        /// Wall thickness.
        wall: f64,
    },
}

/// Corner radii of the cap profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilletRadii {
    /// Concave corner between the inner wall and the floor (`R_in`).
    pub inner_bottom: f64,
    /// Convex corner between the outer wall and the underside (`R_out`).
    pub outer_bottom: f64,
    /// Outer edge of the rim (`R_top_out`).
    pub outer_rim: f64,
    /// Inner edge of the rim (`R_top_in`).
    pub inner_rim: f64,
}

impl Default for FilletRadii {
    fn default() -> Self {
        Self {
            inner_bottom: 0.8,
            outer_bottom: 1.0,
            outer_rim: 0.9,
            inner_rim: 0.9,
        }
    }
}

/// Dimensions of a slip-on lens cap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CapParams {
    /// Inner diameter: the diameter of the lens barrel the cap slips over.
    pub inner_diameter: f64,
    /// Wall thickness.
    pub wall: f64,
    /// Total height, floor included.
    pub height: f64,
    /// Floor thickness; equal to `wall` when `None`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bottom: Option<f64>,
    /// Corner radii.
    pub fillets: FilletRadii,
}

impl Default for CapParams {
    fn default() -> Self {
        Self {
            inner_diameter: 75.0,
            wall: 2.0,
            height: 20.0,
            bottom: None,
            fillets: FilletRadii::default(),
        }
    }
}

impl CapParams {
    /// Three-parameter cap with default fillets; the floor is as thick as the wall.
    pub fn new(inner_diameter: f64, wall: f64, height: f64) -> Self {
        Self {
            inner_diameter,
            wall,
            height,
            ..Self::default()
        }
    }

    /// Set an explicit floor thickness.
    pub fn with_bottom(mut self, bottom: f64) -> Self {
        self.bottom = Some(bottom);
        self
    }

    /// Replace the corner radii.
    pub fn with_fillets(mut self, fillets: FilletRadii) -> Self {
        self.fillets = fillets;
        self
    }

    /// Parse parameters from TOML text. Missing keys take their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self, CadError> {
        Ok(toml::from_str(s)?)
    }

    /// Read parameters from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, CadError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Floor thickness.
    pub fn bottom_thickness(&self) -> f64 {
        self.bottom.unwrap_or(self.wall)
    }

    /// `IR = ID / 2`.
    pub fn inner_radius(&self) -> f64 {
        self.inner_diameter / 2.0
    }

    /// `OR = IR + wall`.
    pub fn outer_radius(&self) -> f64 {
        self.inner_radius() + self.wall
    }

    /// Check dimensions, then the fillet radii.
    pub fn validate(&self) -> Result<(), CapError> {
        self.validate_dimensions()?;
        self.validate_fillets()
    }

    fn validate_dimensions(&self) -> Result<(), CapError> {
        let f = &self.fillets;
        let bottom = self.bottom_thickness();
        let values = [
            ("inner diameter", self.inner_diameter),
            ("wall thickness", self.wall),
            ("height", self.height),
            ("bottom thickness", bottom),
            ("inner bottom fillet", f.inner_bottom),
            ("outer bottom fillet", f.outer_bottom),
            ("outer rim fillet", f.outer_rim),
            ("inner rim fillet", f.inner_rim),
        ];
        for (name, value) in values {
            if !value.is_finite() || value < MIN_STRAIGHT {
                return Err(CapError::NonPositive { name, value });
            }
        }

        if bottom >= self.height {
            return Err(CapError::BottomTooThick {
                bottom,
                height: self.height,
            });
        }
        let outer = f.outer_bottom + f.outer_rim;
        if self.height - outer < MIN_STRAIGHT {
            return Err(CapError::HeightTooShort {
                side: "outer",
                required: outer,
                height: self.height,
            });
        }
        let inner = bottom + f.inner_bottom + f.inner_rim;
        if self.height - inner < MIN_STRAIGHT {
            return Err(CapError::HeightTooShort {
                side: "inner",
                required: inner,
                height: self.height,
            });
        }
        if self.inner_radius() - f.inner_bottom < MIN_STRAIGHT {
            return Err(CapError::InnerFilletTooLarge {
                radius: f.inner_bottom,
                inner_radius: self.inner_radius(),
            });
        }
        Ok(())
    }

    fn validate_fillets(&self) -> Result<(), CapError> {
        let f = &self.fillets;
        let wall = self.wall;

        let limit = self.bottom_thickness().min(wall);
        if f.inner_bottom >= limit {
            return Err(CapError::InnerBottomFillet {
                radius: f.inner_bottom,
                limit,
            });
        }
        if f.outer_bottom >= wall {
            return Err(CapError::OuterBottomFillet {
                radius: f.outer_bottom,
                wall,
            });
        }
        if f.outer_rim >= wall {
            return Err(CapError::OuterRimFillet {
                radius: f.outer_rim,
                wall,
            });
        }
        if f.inner_rim >= wall {
            return Err(CapError::InnerRimFillet {
                radius: f.inner_rim,
                wall,
            });
        }
        if wall - f.outer_rim - f.inner_rim < MIN_STRAIGHT {
            return Err(CapError::RimFilletsOverlap {
                outer: f.outer_rim,
                inner: f.inner_rim,
                wall,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_fillets(
        inner_bottom: f64,
        outer_bottom: f64,
        outer_rim: f64,
        inner_rim: f64,
    ) -> CapParams {
        CapParams::default().with_fillets(FilletRadii {
            inner_bottom,
            outer_bottom,
            outer_rim,
            inner_rim,
        })
    }

    #[test]
    fn test_defaults() {
        let p = CapParams::default();
        assert_eq!(p.inner_diameter, 75.0);
        assert_eq!(p.wall, 2.0);
        assert_eq!(p.height, 20.0);
        assert_eq!(p.bottom_thickness(), 2.0);
        assert_eq!(p.fillets, FilletRadii::default());
        assert!(p.validate().is_ok());
    }

    #[test]
    fn test_derived_radii() {
        let p = CapParams::new(75.0, 2.0, 20.0);
        assert_eq!(p.inner_radius(), 37.5);
        assert_eq!(p.outer_radius(), 39.5);
        assert_eq!(p.outer_radius() - p.inner_radius(), p.wall);
    }

    #[test]
    fn test_bottom_defaults_to_wall() {
        let p = CapParams::new(50.0, 3.0, 15.0);
        assert_eq!(p.bottom_thickness(), 3.0);
        assert_eq!(p.with_bottom(1.5).bottom_thickness(), 1.5);
    }

    #[test]
    fn test_inner_bottom_fillet_limit() {
        let err = with_fillets(2.0, 1.0, 0.9, 0.9).validate().unwrap_err();
        assert_eq!(
            err,
            CapError::InnerBottomFillet {
                radius: 2.0,
                limit: 2.0
            }
        );

        // A thinner floor tightens the limit.
        let p = with_fillets(1.2, 1.0, 0.9, 0.9).with_bottom(1.0);
        assert!(matches!(
            p.validate(),
            Err(CapError::InnerBottomFillet { limit, .. }) if limit == 1.0
        ));
    }

    #[test]
    fn test_outer_bottom_fillet_limit() {
        let err = with_fillets(0.8, 2.5, 0.9, 0.9).validate().unwrap_err();
        assert!(matches!(err, CapError::OuterBottomFillet { .. }));
        assert!(err.to_string().contains("R_out = 2.5"));
    }

    #[test]
    fn test_outer_rim_fillet_limit() {
        let err = with_fillets(0.8, 1.0, 2.0, 0.5).validate().unwrap_err();
        assert!(matches!(err, CapError::OuterRimFillet { .. }));
    }

    #[test]
    fn test_inner_rim_fillet_limit() {
        let err = with_fillets(0.8, 1.0, 0.5, 3.0).validate().unwrap_err();
        assert!(matches!(err, CapError::InnerRimFillet { .. }));
    }

    #[test]
    fn test_rim_fillets_overlap() {
        assert!(with_fillets(0.8, 1.0, 0.9, 0.9).validate().is_ok());
        let err = with_fillets(0.8, 1.0, 0.9, 1.2).validate().unwrap_err();
        assert!(matches!(err, CapError::RimFilletsOverlap { .. }));
        assert!(err.to_string().contains("rim fillets overlap"));
    }

    #[test]
    fn test_rim_fillets_leaving_sub_tolerance_top_face() {
        let p = with_fillets(0.8, 1.0, 0.9999999, 1.0);
        assert!(matches!(
            p.validate(),
            Err(CapError::RimFilletsOverlap { .. })
        ));
        assert!(with_fillets(0.8, 1.0, 0.99, 1.0).validate().is_ok());
    }

    #[test]
    fn test_walls_leaving_sub_tolerance_straight() {
        // Outer wall: 1.0 + 0.9 fillets on a 1.9000001 tall cap.
        let p = CapParams::new(75.0, 2.0, 1.9000001).with_bottom(0.5);
        assert!(matches!(
            p.validate(),
            Err(CapError::HeightTooShort { side: "outer", .. })
        ));

        // Inner wall: 2.0 floor + 0.8 + 0.9 fillets.
        let p = CapParams::new(75.0, 2.0, 3.7000001);
        assert!(matches!(
            p.validate(),
            Err(CapError::HeightTooShort { side: "inner", .. })
        ));

        // Inner floor: 0.8 fillet on a 0.8000001 inner radius.
        let p = CapParams::new(1.6000002, 2.0, 20.0);
        assert!(matches!(
            p.validate(),
            Err(CapError::InnerFilletTooLarge { .. })
        ));
    }

    #[test]
    fn test_non_positive_dimensions() {
        let err = CapParams::new(0.0, 2.0, 20.0).validate().unwrap_err();
        assert_eq!(
            err,
            CapError::NonPositive {
                name: "inner diameter",
                value: 0.0
            }
        );
        assert!(CapParams::new(75.0, f64::NAN, 20.0).validate().is_err());
        assert!(with_fillets(0.8, -1.0, 0.9, 0.9).validate().is_err());

        // Positive but below what the sketch can resolve.
        let err = with_fillets(0.8, 1.0, 1e-7, 0.9).validate().unwrap_err();
        assert!(matches!(
            err,
            CapError::NonPositive {
                name: "outer rim fillet",
                ..
            }
        ));
        assert!(err.to_string().contains("at least 0.000002 mm"));
    }

    #[test]
    fn test_height_checks() {
        let err = CapParams::new(75.0, 2.0, 2.0).validate().unwrap_err();
        assert!(matches!(err, CapError::BottomTooThick { .. }));

        let err = CapParams::new(75.0, 2.0, 3.5).validate().unwrap_err();
        assert!(matches!(
            err,
            CapError::HeightTooShort { side: "inner", .. }
        ));
    }

    #[test]
    fn test_inner_fillet_larger_than_floor_disk() {
        let p = CapParams::new(1.0, 2.0, 20.0);
        assert!(matches!(
            p.validate(),
            Err(CapError::InnerFilletTooLarge { .. })
        ));
    }

    #[test]
    fn test_toml_full() {
        let p = CapParams::from_toml_str(
            r#"
            inner_diameter = 58.0
            wall = 1.5
            height = 12.0
            bottom = 1.2

            [fillets]
            inner_bottom = 0.5
            outer_bottom = 0.7
            outer_rim = 0.6
            inner_rim = 0.6
            "#,
        )
        .unwrap();
        assert_eq!(p.inner_diameter, 58.0);
        assert_eq!(p.bottom_thickness(), 1.2);
        assert_eq!(p.fillets.outer_bottom, 0.7);
        assert!(p.validate().is_ok());
    }

    #[test]
    fn test_toml_partial_uses_defaults() {
        let p = CapParams::from_toml_str("inner_diameter = 62.0\n[fillets]\nouter_rim = 0.5\n")
            .unwrap();
        assert_eq!(p.inner_diameter, 62.0);
        assert_eq!(p.wall, 2.0);
        assert_eq!(p.bottom, None);
        assert_eq!(p.fillets.outer_rim, 0.5);
        assert_eq!(p.fillets.inner_rim, 0.9);
    }

    #[test]
    fn test_toml_rejects_unknown_keys() {
        assert!(matches!(
            CapParams::from_toml_str("diameter = 62.0\n"),
            Err(CadError::Config(_))
        ));
        assert!(CapParams::from_toml_str("[fillets]\nrim = 0.5\n").is_err());
    }

    #[test]
    fn test_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cap.toml");
        std::fs::write(&path, "height = 25.0\n").unwrap();
        let p = CapParams::from_toml_file(&path).unwrap();
        assert_eq!(p.height, 25.0);

        let missing = CapParams::from_toml_file(dir.path().join("missing.toml"));
        assert!(matches!(missing, Err(CadError::Io(_))));
    }
}
