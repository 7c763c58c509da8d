//! Surface mesh spaces and triangle meshes.
//!
//! A per-vertex scalar field only has meaning together with the exact mesh it was sampled onto:
//! its length equals the vertex count and the vertex order is the positional identity.

use std::fmt;
use std::path::Path;

use nalgebra::Point3;

use crate::error::{Result, VolsurfError};
use crate::fs_surface::read_surf;
use crate::gifti::read_gifti_mesh;
use crate::hemi::Hemisphere;

/// The topology family of a standard surface mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeshFamily {
    /// The HCP fs_LR meshes, used as the native waypoint between volume and canonical surface.
    FsLR,
    /// The FreeSurfer fsaverage meshes, the canonical target.
    Fsaverage,
}

/// Mesh resolution, named by the approximate vertex count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeshDensity {
    D3k,
    D4k,
    D8k,
    D10k,
    D32k,
    D41k,
    D164k,
}

impl MeshDensity {
    pub fn label(&self) -> &'static str {
        match self {
            MeshDensity::D3k => "3k",
            MeshDensity::D4k => "4k",
            MeshDensity::D8k => "8k",
            MeshDensity::D10k => "10k",
            MeshDensity::D32k => "32k",
            MeshDensity::D41k => "41k",
            MeshDensity::D164k => "164k",
        }
    }
}

/// A standard mesh space for one hemisphere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshSpace {
    pub family: MeshFamily,
    pub density: MeshDensity,
    pub hemi: Hemisphere,
}

impl MeshSpace {
    pub fn new(family: MeshFamily, density: MeshDensity, hemi: Hemisphere) -> MeshSpace {
        MeshSpace { family, density, hemi }
    }

    /// The canonical target space: fsaverage at its highest density.
    pub fn canonical(hemi: Hemisphere) -> MeshSpace {
        MeshSpace::new(MeshFamily::Fsaverage, MeshDensity::D164k, hemi)
    }

    /// The native waypoint space of the two-stage chain: fsLR 164k.
    pub fn native(hemi: Hemisphere) -> MeshSpace {
        MeshSpace::new(MeshFamily::FsLR, MeshDensity::D164k, hemi)
    }

    /// The number of vertices of meshes in this space, if the family defines the density.
    pub fn vertex_count(&self) -> Option<usize> {
        match (self.family, self.density) {
            (MeshFamily::Fsaverage, MeshDensity::D3k) => Some(2562),
            (MeshFamily::Fsaverage, MeshDensity::D10k) => Some(10242),
            (MeshFamily::Fsaverage, MeshDensity::D41k) => Some(40962),
            (MeshFamily::Fsaverage, MeshDensity::D164k) => Some(163842),
            (MeshFamily::FsLR, MeshDensity::D4k) => Some(3002),
            (MeshFamily::FsLR, MeshDensity::D8k) => Some(7842),
            (MeshFamily::FsLR, MeshDensity::D32k) => Some(32492),
            (MeshFamily::FsLR, MeshDensity::D164k) => Some(163842),
            _ => None,
        }
    }
}

impl fmt::Display for MeshSpace {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let family = match self.family {
            MeshFamily::FsLR => "fsLR",
            MeshFamily::Fsaverage => "fsaverage",
        };
        write!(f, "{}.{}-{}", self.hemi, family, self.density.label())
    }
}


/// A triangular brain mesh. Vertex coordinates and face vertex indices are stored flat, 3 per
/// element.
#[derive(Debug, PartialEq, Clone)]
pub struct BrainMesh {
    pub vertices: Vec<f32>,
    pub faces: Vec<i32>,
}

impl BrainMesh {
    /// Construct a mesh, checking that the flat arrays hold whole triples and all face indices are
    /// valid.
    pub fn new(vertices: Vec<f32>, faces: Vec<i32>) -> Result<BrainMesh> {
        if vertices.len() % 3 != 0 || faces.len() % 3 != 0 {
            return Err(VolsurfError::ShapeMismatch(
                String::from("mesh arrays (multiple of 3)"),
                vec![vertices.len() / 3 * 3, faces.len() / 3 * 3],
                vec![vertices.len(), faces.len()],
            ));
        }
        let num_vertices = vertices.len() / 3;
        if let Some(bad) = faces.iter().find(|&&f| f < 0 || f as usize >= num_vertices) {
            return Err(VolsurfError::InvalidMapping(format!(
                "face references vertex {} of a mesh with {} vertices",
                bad, num_vertices
            )));
        }
        Ok(BrainMesh { vertices, faces })
    }

    pub fn num_vertices(&self) -> usize {
        self.vertices.len() / 3
    }

    pub fn num_faces(&self) -> usize {
        self.faces.len() / 3
    }

    pub fn vertex(&self, idx: usize) -> [f32; 3] {
        [self.vertices[idx * 3], self.vertices[idx * 3 + 1], self.vertices[idx * 3 + 2]]
    }

    /// Vertex `idx` as a double precision point.
    pub fn point(&self, idx: usize) -> Point3<f64> {
        let v = self.vertex(idx);
        Point3::new(v[0] as f64, v[1] as f64, v[2] as f64)
    }

    pub fn face(&self, idx: usize) -> [usize; 3] {
        let f = &self.faces[idx * 3..idx * 3 + 3];
        [f[0] as usize, f[1] as usize, f[2] as usize]
    }
}


/// Read a mesh from a GIFTI surface ('.surf.gii', '.gii') or a FreeSurfer surf file (anything
/// else).
pub fn read_mesh<P: AsRef<Path>>(path: P) -> Result<BrainMesh> {
    let name = path
        .as_ref()
        .file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    if name.ends_with(".gii") || name.ends_with(".gii.gz") {
        read_gifti_mesh(path)
    } else {
        Ok(read_surf(path)?.mesh)
    }
}


#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn canonical_and_native_spaces_have_164k_vertices() {
        assert_eq!(Some(163842), MeshSpace::canonical(Hemisphere::Left).vertex_count());
        assert_eq!(Some(163842), MeshSpace::native(Hemisphere::Right).vertex_count());
        let sparse = MeshSpace::new(MeshFamily::FsLR, MeshDensity::D41k, Hemisphere::Left);
        assert_eq!(None, sparse.vertex_count());
        assert_eq!("rh.fsaverage-164k", MeshSpace::canonical(Hemisphere::Right).to_string());
    }

    #[test]
    fn faces_must_reference_existing_vertices() {
        let verts = vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
        assert!(BrainMesh::new(verts.clone(), vec![0, 1, 2]).is_ok());
        assert!(BrainMesh::new(verts.clone(), vec![0, 1, 3]).is_err());
        assert!(BrainMesh::new(verts, vec![0, 1]).is_err());
    }

    #[test]
    fn vertices_and_faces_are_accessed_as_triples() {
        let vertices = vec![0.0, 0.0, 0.0, 1.0, 2.0, 3.0, 0.0, 1.0, 0.0];
        let mesh = BrainMesh::new(vertices, vec![2, 1, 0]).unwrap();
        assert_eq!(3, mesh.num_vertices());
        assert_eq!(1, mesh.num_faces());
        assert_eq!([1.0, 2.0, 3.0], mesh.vertex(1));
        assert_eq!(Point3::new(1.0, 2.0, 3.0), mesh.point(1));
        assert_eq!([2, 1, 0], mesh.face(0));
    }
}
