//! STL export (binary and ASCII).

use lenscap_kernel_tessellate::TriangleMesh;

/// Unit facet normal from the triangle winding; `+Z` for degenerate facets.
fn facet_normal(v: &[[f32; 3]; 3]) -> [f32; 3] {
    let e1 = [v[1][0] - v[0][0], v[1][1] - v[0][1], v[1][2] - v[0][2]];
    let e2 = [v[2][0] - v[0][0], v[2][1] - v[0][1], v[2][2] - v[0][2]];
    let nx = e1[1] * e2[2] - e1[2] * e2[1];
    let ny = e1[2] * e2[0] - e1[0] * e2[2];
    let nz = e1[0] * e2[1] - e1[1] * e2[0];
    let len = (nx * nx + ny * ny + nz * nz).sqrt();
    if len > 1e-10 {
        [nx / len, ny / len, nz / len]
    } else {
        [0.0, 0.0, 1.0]
    }
}

fn facets(mesh: &TriangleMesh) -> impl Iterator<Item = [[f32; 3]; 3]> + '_ {
    let verts = &mesh.vertices;
    mesh.indices.chunks_exact(3).map(move |tri| {
        [tri[0], tri[1], tri[2]].map(|i| {
            let i = i as usize * 3;
            [verts[i], verts[i + 1], verts[i + 2]]
        })
    })
}

/// Encode a mesh as binary STL: 80-byte header, triangle count, then
/// 50 bytes per triangle.
pub fn to_stl_bytes(mesh: &TriangleMesh, name: &str) -> Vec<u8> {
    let num_triangles = mesh.num_triangles();
    let mut data = Vec::with_capacity(84 + num_triangles * 50);

    let mut header = [b' '; 80];
    let title = format!("lenscap STL export: {name}");
    let len = title.len().min(80);
    header[..len].copy_from_slice(&title.as_bytes()[..len]);
    data.extend_from_slice(&header);
    data.extend_from_slice(&(num_triangles as u32).to_le_bytes());

    for v in facets(mesh) {
        for c in facet_normal(&v) {
            data.extend_from_slice(&c.to_le_bytes());
        }
        for p in v {
            for c in p {
                data.extend_from_slice(&c.to_le_bytes());
            }
        }
        // Attribute byte count
        data.extend_from_slice(&0u16.to_le_bytes());
    }

    data
}

/// Encode a mesh as ASCII STL.
pub fn to_stl_ascii(mesh: &TriangleMesh, name: &str) -> String {
    let mut out = format!("solid {name}\n");
    for v in facets(mesh) {
        let n = facet_normal(&v);
        out.push_str(&format!("  facet normal {:e} {:e} {:e}\n", n[0], n[1], n[2]));
        out.push_str("    outer loop\n");
        for p in v {
            out.push_str(&format!("      vertex {:e} {:e} {:e}\n", p[0], p[1], p[2]));
        }
        out.push_str("    endloop\n");
        out.push_str("  endfacet\n");
    }
    out.push_str(&format!("endsolid {name}\n"));
    out
}
