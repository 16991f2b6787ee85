//! STEP file writer: converts a revolved solid to an AP214 file.
//!
//! Topology of the exported shell:
//! - one `VERTEX_POINT` per profile vertex, placed in the reference
//!   half-plane (angle zero)
//! - one closed circle `EDGE_CURVE` per vertex off the axis
//! - one seam `EDGE_CURVE` per curved face, the generating line or arc
//! - one `ADVANCED_FACE` per profile segment off the axis

use std::path::Path;

use chrono::{DateTime, Utc};
use lenscap_kernel_math::{Point2, Point3, Tolerance, Vec3};
use lenscap_kernel_sketch::{
    RevolveAxis, RevolvedFace, RevolvedSolid, RevolvedSurface, SketchSegment,
};
use tracing::debug;

use crate::error::StepError;

/// Metadata written to the STEP header and product structure.
#[derive(Debug, Clone)]
pub struct StepOptions {
    /// Product and solid name.
    pub product_name: String,
    /// Author name for file metadata.
    pub author: String,
    /// Organization name for file metadata.
    pub organization: String,
    /// Header timestamp; the current time if `None`.
    pub timestamp: Option<DateTime<Utc>>,
}

impl Default for StepOptions {
    fn default() -> Self {
        Self {
            product_name: "part".to_string(),
            author: String::new(),
            organization: String::new(),
            timestamp: None,
        }
    }
}

/// Write a revolved solid to a STEP file.
pub fn write_step(solid: &RevolvedSolid, path: impl AsRef<Path>) -> Result<(), StepError> {
    write_step_with_options(solid, path, &StepOptions::default())
}

/// Write a revolved solid to a STEP file with header options.
pub fn write_step_with_options(
    solid: &RevolvedSolid,
    path: impl AsRef<Path>,
    options: &StepOptions,
) -> Result<(), StepError> {
    let data = write_step_to_buffer_with_options(solid, options)?;
    std::fs::write(path, data)?;
    Ok(())
}

/// Write a revolved solid to an in-memory STEP file.
pub fn write_step_to_buffer(solid: &RevolvedSolid) -> Result<Vec<u8>, StepError> {
    write_step_to_buffer_with_options(solid, &StepOptions::default())
}

/// Write a revolved solid to an in-memory STEP file with header options.
pub fn write_step_to_buffer_with_options(
    solid: &RevolvedSolid,
    options: &StepOptions,
) -> Result<Vec<u8>, StepError> {
    if solid.faces.is_empty() {
        return Err(StepError::EmptySolid);
    }
    let mut writer = StepWriter::new();
    let name = escape(&options.product_name);
    let brep = writer.add_solid(solid, &name)?;
    writer.add_product(&name, brep);
    debug!(entities = writer.entities.len(), "built STEP data section");
    Ok(writer.finish(options).into_bytes())
}

/// Format a real the way STEP expects: always with a decimal point.
fn real(x: f64) -> String {
    let s = format!("{:.9}", x);
    let s = s.trim_end_matches('0');
    match s {
        "-0." => "0.".to_string(),
        _ => s.to_string(),
    }
}

fn logical(b: bool) -> &'static str {
    if b {
        ".T."
    } else {
        ".F."
    }
}

fn escape(s: &str) -> String {
    s.replace('\'', "''")
}

fn id_list(ids: &[usize]) -> String {
    ids.iter()
        .map(|id| format!("#{id}"))
        .collect::<Vec<_>>()
        .join(",")
}

/// Entity builder for the DATA section.
struct StepWriter {
    entities: Vec<String>,
    next_id: usize,
}

impl StepWriter {
    fn new() -> Self {
        Self {
            entities: Vec::new(),
            next_id: 1,
        }
    }

    fn add_entity(&mut self, entity: impl Into<String>) -> usize {
        let id = self.next_id;
        self.next_id += 1;
        self.entities.push(format!("#{} = {};", id, entity.into()));
        id
    }

    fn point(&mut self, p: &Point3) -> usize {
        self.add_entity(format!(
            "CARTESIAN_POINT('',({},{},{}))",
            real(p.x),
            real(p.y),
            real(p.z)
        ))
    }

    fn direction(&mut self, v: &Vec3) -> usize {
        let v = v.normalize();
        self.add_entity(format!(
            "DIRECTION('',({},{},{}))",
            real(v.x),
            real(v.y),
            real(v.z)
        ))
    }

    fn placement(&mut self, origin: &Point3, z: &Vec3, x: &Vec3) -> usize {
        let p = self.point(origin);
        let dz = self.direction(z);
        let dx = self.direction(x);
        self.add_entity(format!("AXIS2_PLACEMENT_3D('',#{p},#{dz},#{dx})"))
    }

    fn oriented_edge(&mut self, edge: usize, orientation: bool) -> usize {
        self.add_entity(format!(
            "ORIENTED_EDGE('',*,*,#{edge},{})",
            logical(orientation)
        ))
    }

    fn bound(&mut self, edges: &[(usize, bool)], outer: bool) -> usize {
        let oriented: Vec<usize> = edges
            .iter()
            .map(|&(edge, orientation)| self.oriented_edge(edge, orientation))
            .collect();
        let loop_id = self.add_entity(format!("EDGE_LOOP('',({}))", id_list(&oriented)));
        let kind = if outer { "FACE_OUTER_BOUND" } else { "FACE_BOUND" };
        self.add_entity(format!("{kind}('',#{loop_id},.T.)"))
    }

    /// Add the shell of a revolved solid, returning the `MANIFOLD_SOLID_BREP` id.
    fn add_solid(&mut self, solid: &RevolvedSolid, name: &str) -> Result<usize, StepError> {
        let tol = Tolerance::DEFAULT;
        let axis = &solid.axis;
        let a = axis.direction.into_inner();
        let e1 = axis.radial.into_inner();
        let vertices = solid.meridian_vertices();

        let mut vertex_ids = Vec::with_capacity(vertices.len());
        let mut circle_ids = Vec::with_capacity(vertices.len());
        for v in &vertices {
            if !v.x.is_finite() || !v.y.is_finite() {
                return Err(StepError::invalid_geometry(format!(
                    "non-finite profile vertex ({}, {})",
                    v.x, v.y
                )));
            }
            let p = self.point(&axis.point_at(*v, 0.0));
            let vertex = self.add_entity(format!("VERTEX_POINT('',#{p})"));
            vertex_ids.push(vertex);

            let circle = if tol.is_zero(v.x) {
                None
            } else {
                let placement = self.placement(&axis.axis_point(v.y), &a, &e1);
                let curve = self.add_entity(format!("CIRCLE('',#{placement},{})", real(v.x)));
                Some(self.add_entity(format!(
                    "EDGE_CURVE('',#{vertex},#{vertex},#{curve},.T.)"
                )))
            };
            circle_ids.push(circle);
        }

        let n = vertices.len();
        let mut face_ids = Vec::with_capacity(solid.faces.len());
        for face in &solid.faces {
            let i = face.index;
            let j = (i + 1) % n;
            let surface = self.surface(axis, face);

            let bounds = if face.surface.is_periodic() {
                let seam = self.seam(axis, &face.generator, vertex_ids[i], vertex_ids[j])?;
                let mut edges = Vec::with_capacity(4);
                if let Some(c) = circle_ids[i] {
                    edges.push((c, true));
                }
                edges.push((seam, true));
                if let Some(c) = circle_ids[j] {
                    edges.push((c, false));
                }
                edges.push((seam, false));
                vec![self.bound(&edges, true)]
            } else {
                let mut rings: Vec<(f64, usize, bool)> = [(i, true), (j, false)]
                    .into_iter()
                    .filter_map(|(k, orientation)| {
                        circle_ids[k].map(|c| (vertices[k].x, c, orientation))
                    })
                    .collect();
                rings.sort_by(|x, y| y.0.total_cmp(&x.0));
                rings
                    .iter()
                    .enumerate()
                    .map(|(rank, &(_, c, orientation))| self.bound(&[(c, orientation)], rank == 0))
                    .collect()
            };

            face_ids.push(self.add_entity(format!(
                "ADVANCED_FACE('',({}),#{surface},{})",
                id_list(&bounds),
                logical(face.same_sense)
            )));
        }

        let shell = self.add_entity(format!("CLOSED_SHELL('',({}))", id_list(&face_ids)));
        Ok(self.add_entity(format!("MANIFOLD_SOLID_BREP('{name}',#{shell})")))
    }

    fn surface(&mut self, axis: &RevolveAxis, face: &RevolvedFace) -> usize {
        let a = axis.direction.into_inner();
        let e1 = axis.radial.into_inner();
        match face.surface {
            RevolvedSurface::Plane { height } => {
                let placement = self.placement(&axis.axis_point(height), &a, &e1);
                self.add_entity(format!("PLANE('',#{placement})"))
            }
            RevolvedSurface::Cylinder { radius } => {
                let placement = self.placement(&axis.origin, &a, &e1);
                self.add_entity(format!(
                    "CYLINDRICAL_SURFACE('',#{placement},{})",
                    real(radius)
                ))
            }
            RevolvedSurface::Cone {
                height,
                radius,
                semi_angle,
                widens_along_axis,
            } => {
                // STEP cones widen along the placement axis.
                let z = if widens_along_axis { a } else { -a };
                let placement = self.placement(&axis.axis_point(height), &z, &e1);
                self.add_entity(format!(
                    "CONICAL_SURFACE('',#{placement},{},{})",
                    real(radius),
                    real(semi_angle)
                ))
            }
            RevolvedSurface::Sphere {
                center_height,
                radius,
            } => {
                let placement = self.placement(&axis.axis_point(center_height), &a, &e1);
                self.add_entity(format!(
                    "SPHERICAL_SURFACE('',#{placement},{})",
                    real(radius)
                ))
            }
            RevolvedSurface::Torus {
                center_height,
                major_radius,
                minor_radius,
            } => {
                let placement = self.placement(&axis.axis_point(center_height), &a, &e1);
                if minor_radius > major_radius {
                    // Spindle torus: keep the half of the tube the face lies on.
                    let select_outer = face.generator.point_at(0.5).x >= major_radius;
                    self.add_entity(format!(
                        "DEGENERATE_TOROIDAL_SURFACE('',#{placement},{},{},{})",
                        real(major_radius),
                        real(minor_radius),
                        logical(select_outer)
                    ))
                } else {
                    self.add_entity(format!(
                        "TOROIDAL_SURFACE('',#{placement},{},{})",
                        real(major_radius),
                        real(minor_radius)
                    ))
                }
            }
        }
    }

    /// Seam edge: the generator in the reference half-plane, from `v0` to `v1`.
    fn seam(
        &mut self,
        axis: &RevolveAxis,
        generator: &SketchSegment,
        v0: usize,
        v1: usize,
    ) -> Result<usize, StepError> {
        let to_3d = |p: Point2| axis.point_at(p, 0.0);
        match *generator {
            SketchSegment::Line { start, end } => {
                let p0 = to_3d(start);
                let d = to_3d(end) - p0;
                let length = d.norm();
                if length < Tolerance::DEFAULT.linear {
                    return Err(StepError::invalid_geometry("zero-length seam line"));
                }
                let origin = self.point(&p0);
                let dir = self.direction(&d);
                let vector = self.add_entity(format!("VECTOR('',#{dir},{})", real(length)));
                let line = self.add_entity(format!("LINE('',#{origin},#{vector})"));
                Ok(self.add_entity(format!("EDGE_CURVE('',#{v0},#{v1},#{line},.T.)")))
            }
            SketchSegment::Arc {
                start, center, ccw, ..
            } => {
                // Counter-clockwise in (r, h) is positive rotation about radial × axis.
                let normal = axis.radial.as_ref().cross(axis.direction.as_ref());
                let placement = self.placement(&to_3d(center), &normal, axis.radial.as_ref());
                let curve = self.add_entity(format!(
                    "CIRCLE('',#{placement},{})",
                    real((start - center).norm())
                ));
                Ok(self.add_entity(format!(
                    "EDGE_CURVE('',#{v0},#{v1},#{curve},{})",
                    logical(ccw)
                )))
            }
        }
    }

    /// Add the AP214 product structure around a solid.
    fn add_product(&mut self, name: &str, brep: usize) -> usize {
        let app_ctx = self.add_entity(
            "APPLICATION_CONTEXT('core data for automotive mechanical design processes')",
        );
        self.add_entity(format!(
            "APPLICATION_PROTOCOL_DEFINITION('international standard','automotive_design',2000,#{app_ctx})"
        ));
        let prod_ctx = self.add_entity(format!("PRODUCT_CONTEXT('',#{app_ctx},'mechanical')"));
        let product = self.add_entity(format!("PRODUCT('{name}','{name}','',(#{prod_ctx}))"));
        let formation = self.add_entity(format!("PRODUCT_DEFINITION_FORMATION('','',#{product})"));
        let def_ctx = self.add_entity(format!(
            "PRODUCT_DEFINITION_CONTEXT('part definition',#{app_ctx},'design')"
        ));
        let definition = self.add_entity(format!(
            "PRODUCT_DEFINITION('design','',#{formation},#{def_ctx})"
        ));
        let def_shape = self.add_entity(format!("PRODUCT_DEFINITION_SHAPE('','',#{definition})"));

        let length_unit = self.add_entity("(LENGTH_UNIT() NAMED_UNIT(*) SI_UNIT(.MILLI.,.METRE.))");
        let angle_unit = self.add_entity("(NAMED_UNIT(*) PLANE_ANGLE_UNIT() SI_UNIT($,.RADIAN.))");
        let solid_angle_unit =
            self.add_entity("(NAMED_UNIT(*) SI_UNIT($,.STERADIAN.) SOLID_ANGLE_UNIT())");
        let uncertainty = self.add_entity(format!(
            "UNCERTAINTY_MEASURE_WITH_UNIT(LENGTH_MEASURE(1.E-06),#{length_unit},'distance_accuracy_value','confusion accuracy')"
        ));
        let rep_ctx = self.add_entity(format!(
            "(GEOMETRIC_REPRESENTATION_CONTEXT(3) GLOBAL_UNCERTAINTY_ASSIGNED_CONTEXT((#{uncertainty})) GLOBAL_UNIT_ASSIGNED_CONTEXT((#{length_unit},#{angle_unit},#{solid_angle_unit})) REPRESENTATION_CONTEXT('','3D'))"
        ));

        let world = self.placement(&Point3::origin(), &Vec3::z(), &Vec3::x());
        let shape_rep = self.add_entity(format!(
            "ADVANCED_BREP_SHAPE_REPRESENTATION('{name}',(#{world},#{brep}),#{rep_ctx})"
        ));
        self.add_entity(format!("SHAPE_DEFINITION_REPRESENTATION(#{def_shape},#{shape_rep})"))
    }

    /// Generate the complete STEP file.
    fn finish(self, options: &StepOptions) -> String {
        let timestamp = options
            .timestamp
            .unwrap_or_else(Utc::now)
            .format("%Y-%m-%dT%H:%M:%S");
        let name = escape(&options.product_name);

        let mut output = String::new();
        output.push_str("ISO-10303-21;\n");
        output.push_str("HEADER;\n");
        output.push_str(&format!("FILE_DESCRIPTION(('{name}'),'2;1');\n"));
        output.push_str(&format!(
            "FILE_NAME('{name}.step','{timestamp}',('{}'),('{}'),'lenscap','lenscap {}','');\n",
            escape(&options.author),
            escape(&options.organization),
            env!("CARGO_PKG_VERSION")
        ));
        output.push_str("FILE_SCHEMA(('AUTOMOTIVE_DESIGN { 1 0 10303 214 1 1 1 1 }'));\n");
        output.push_str("ENDSEC;\n");
        output.push_str("DATA;\n");
        for entity in &self.entities {
            output.push_str(entity);
            output.push('\n');
        }
        output.push_str("ENDSEC;\n");
        output.push_str("END-ISO-10303-21;\n");
        output
    }
}
