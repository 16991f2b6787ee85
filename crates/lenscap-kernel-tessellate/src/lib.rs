#![warn(missing_docs)]

//! Revolved solid to triangle mesh tessellation for the lenscap kernel.
//!
//! The meridian profile is sampled into a closed polyline (line segments
//! keep their end points, arcs are subdivided), then every polyline point
//! is swept into a ring of vertices around the axis. Points on the axis
//! collapse to a single vertex. Neighbouring rings are stitched into
//! quad bands, or triangle fans where one side sits on the axis, so the
//! resulting mesh is closed and shares every vertex.

use std::collections::HashMap;
use std::f64::consts::PI;

use lenscap_kernel_math::{Point2, Point3, Tolerance, Transform, Vec3};
use lenscap_kernel_sketch::{RevolvedSolid, SketchSegment};
use tracing::debug;

/// Output triangle mesh for rendering and export.
#[derive(Debug, Clone)]
pub struct TriangleMesh {
    /// Flat array of vertex positions: `[x0, y0, z0, x1, y1, z1, ...]` (f32).
    pub vertices: Vec<f32>,
    /// Flat array of triangle indices: `[i0, i1, i2, ...]` (u32).
    pub indices: Vec<u32>,
    /// Flat array of vertex normals: `[nx0, ny0, nz0, ...]` (f32). Same length as vertices.
    pub normals: Vec<f32>,
}

impl TriangleMesh {
    /// Create an empty mesh.
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            indices: Vec::new(),
            normals: Vec::new(),
        }
    }

    /// Number of triangles.
    pub fn num_triangles(&self) -> usize {
        self.indices.len() / 3
    }

    /// Number of vertices.
    pub fn num_vertices(&self) -> usize {
        self.vertices.len() / 3
    }

    /// Position of vertex `i` in double precision.
    pub fn vertex(&self, i: usize) -> [f64; 3] {
        [
            self.vertices[3 * i] as f64,
            self.vertices[3 * i + 1] as f64,
            self.vertices[3 * i + 2] as f64,
        ]
    }

    /// Iterate over triangles as three vertex positions each.
    pub fn triangles(&self) -> impl Iterator<Item = [[f64; 3]; 3]> + '_ {
        self.indices.chunks_exact(3).map(move |tri| {
            [
                self.vertex(tri[0] as usize),
                self.vertex(tri[1] as usize),
                self.vertex(tri[2] as usize),
            ]
        })
    }

    /// Merge another mesh into this one.
    pub fn merge(&mut self, other: &TriangleMesh) {
        let offset = self.num_vertices() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.normals.extend_from_slice(&other.normals);
        self.indices.extend(other.indices.iter().map(|&i| i + offset));
    }

    fn push_vertex(&mut self, p: Point3) -> u32 {
        let index = self.num_vertices() as u32;
        self.vertices.extend_from_slice(&[p.x as f32, p.y as f32, p.z as f32]);
        index
    }
}

impl Default for TriangleMesh {
    fn default() -> Self {
        Self::new()
    }
}

/// Tessellation parameters controlling mesh quality.
#[derive(Debug, Clone, Copy)]
pub struct TessellationParams {
    /// Number of segments around the axis.
    pub circle_segments: u32,
    /// Number of segments per quarter turn of a profile arc.
    pub arc_segments: u32,
}

impl Default for TessellationParams {
    fn default() -> Self {
        Self {
            circle_segments: 128,
            arc_segments: 8,
        }
    }
}

impl TessellationParams {
    /// Create params from a segment count hint (used for circular features).
    pub fn from_segments(segments: u32) -> Self {
        Self {
            circle_segments: segments.max(3),
            arc_segments: (segments / 16).max(2),
        }
    }
}

/// Sample the meridian into a closed polyline in `(r, h)` coordinates.
///
/// The last point connects back to the first.
fn meridian_polyline(meridian: &[SketchSegment], arc_segments: u32) -> Vec<Point2> {
    let mut points = Vec::new();
    for seg in meridian {
        points.push(seg.start());
        if let SketchSegment::Arc { .. } = seg {
            let quarters = seg.sweep_angle().abs() / (PI / 2.0);
            let n = ((quarters * arc_segments as f64).ceil() as usize).max(1);
            for i in 1..n {
                points.push(seg.point_at(i as f64 / n as f64));
            }
        }
    }
    points
}

/// Vertex indices of one polyline point swept around the axis.
enum Ring {
    Axis(u32),
    Circle(Vec<u32>),
}

/// Tessellate a revolved solid into a closed triangle mesh.
pub fn tessellate_solid(solid: &RevolvedSolid, params: &TessellationParams) -> TriangleMesh {
    let tol = Tolerance::DEFAULT;
    let n = params.circle_segments.max(3) as usize;
    let axis = &solid.axis;
    let rotations: Vec<Transform> = (0..n)
        .map(|j| {
            let theta = 2.0 * PI * j as f64 / n as f64;
            Transform::rotation_about_line(&axis.origin, &axis.direction, theta)
        })
        .collect();

    let polyline = meridian_polyline(&solid.meridian, params.arc_segments.max(1));
    let mut mesh = TriangleMesh::new();

    let rings: Vec<Ring> = polyline
        .iter()
        .map(|p| {
            if tol.is_zero(p.x) {
                Ring::Axis(mesh.push_vertex(axis.axis_point(p.y)))
            } else {
                let base = axis.point_at(*p, 0.0);
                Ring::Circle(
                    rotations
                        .iter()
                        .map(|rot| mesh.push_vertex(rot.apply_point(&base)))
                        .collect(),
                )
            }
        })
        .collect();

    for k in 0..rings.len() {
        let a = &rings[k];
        let b = &rings[(k + 1) % rings.len()];
        for j in 0..n {
            let jn = (j + 1) % n;
            match (a, b) {
                (Ring::Circle(a), Ring::Circle(b)) => {
                    mesh.indices.extend_from_slice(&[a[j], a[jn], b[j]]);
                    mesh.indices.extend_from_slice(&[a[jn], b[jn], b[j]]);
                }
                (Ring::Axis(a), Ring::Circle(b)) => {
                    mesh.indices.extend_from_slice(&[*a, b[jn], b[j]]);
                }
                (Ring::Circle(a), Ring::Axis(b)) => {
                    mesh.indices.extend_from_slice(&[a[j], a[jn], *b]);
                }
                (Ring::Axis(_), Ring::Axis(_)) => break,
            }
        }
    }

    compute_vertex_normals(&mut mesh);

    debug!(
        rings = rings.len(),
        vertices = mesh.num_vertices(),
        triangles = mesh.num_triangles(),
        "tessellated revolved solid"
    );

    mesh
}

/// Tessellate with a single segment count hint.
pub fn tessellate(solid: &RevolvedSolid, segments: u32) -> TriangleMesh {
    tessellate_solid(solid, &TessellationParams::from_segments(segments))
}

/// Area-weighted vertex normals accumulated from the adjacent triangles.
fn compute_vertex_normals(mesh: &mut TriangleMesh) {
    let mut acc = vec![Vec3::zeros(); mesh.num_vertices()];
    for tri in mesh.indices.chunks_exact(3) {
        let [p0, p1, p2] = [tri[0], tri[1], tri[2]].map(|i| {
            let v = mesh.vertex(i as usize);
            Vec3::new(v[0], v[1], v[2])
        });
        let face_normal = (p1 - p0).cross(&(p2 - p0));
        for &i in tri {
            acc[i as usize] += face_normal;
        }
    }
    mesh.normals = acc
        .into_iter()
        .flat_map(|n| {
            let n = n.try_normalize(1e-20).unwrap_or_else(Vec3::zeros);
            [n.x as f32, n.y as f32, n.z as f32]
        })
        .collect();
}

/// Signed volume of a triangle mesh using the divergence theorem.
///
/// Positive for a closed mesh with outward-facing triangles.
pub fn compute_mesh_volume(mesh: &TriangleMesh) -> f64 {
    let mut vol = 0.0;
    for [v0, v1, v2] in mesh.triangles() {
        vol += v0[0] * (v1[1] * v2[2] - v2[1] * v1[2])
            - v1[0] * (v0[1] * v2[2] - v2[1] * v0[2])
            + v2[0] * (v0[1] * v1[2] - v1[1] * v0[2]);
    }
    vol / 6.0
}

/// Total surface area of a triangle mesh.
pub fn compute_mesh_surface_area(mesh: &TriangleMesh) -> f64 {
    mesh.triangles()
        .map(|[v0, v1, v2]| {
            let e1 = Vec3::new(v1[0] - v0[0], v1[1] - v0[1], v1[2] - v0[2]);
            let e2 = Vec3::new(v2[0] - v0[0], v2[1] - v0[1], v2[2] - v0[2]);
            e1.cross(&e2).norm() / 2.0
        })
        .sum()
}

/// Check that every directed edge is matched by exactly one opposite edge.
///
/// This holds for a closed, consistently oriented, manifold mesh.
pub fn is_watertight(mesh: &TriangleMesh) -> bool {
    let mut edges: HashMap<(u32, u32), i32> = HashMap::new();
    for tri in mesh.indices.chunks_exact(3) {
        for (a, b) in [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
            if a == b {
                return false;
            }
            let (key, delta) = if a < b { ((a, b), 1) } else { ((b, a), -1) };
            let count = edges.entry(key).or_insert(0);
            if *count == delta {
                return false;
            }
            *count += delta;
        }
    }
    !mesh.indices.is_empty() && edges.values().all(|&c| c == 0)
}
