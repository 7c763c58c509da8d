//! Barycentric resampling between registered spherical meshes.
//!
//! Two meshes of the same hemisphere are in vertex correspondence when their spheres have been
//! registered to each other. Each target sphere vertex is then located inside a triangle of the
//! source sphere, and its value is the barycentric blend of that triangle's three source values. If
//! no containing triangle is found among the faces around the nearest source vertex, the nearest
//! vertex value is used.

use nalgebra::{distance_squared, Point3, Vector3};

use crate::error::{Result, VolsurfError};
use crate::mesh::BrainMesh;

const BARY_TOLERANCE: f64 = 1e-7;

/// Central projection of a mesh vertex onto the unit sphere. The origin stays at the origin.
fn on_unit_sphere(mesh: &BrainMesh, idx: usize) -> Point3<f64> {
    let dir = mesh.point(idx).coords.try_normalize(0.0).unwrap_or_else(Vector3::zeros);
    Point3::from(dir)
}

/// Uniform grid over the unit cube holding the source vertices, for nearest vertex queries.
struct VertexGrid {
    cells: Vec<Vec<usize>>,
    res: usize,
    cell_size: f64,
}

impl VertexGrid {
    fn new(points: &[Point3<f64>]) -> VertexGrid {
        let res = ((points.len() as f64).cbrt().ceil() as usize).max(1).min(128);
        let cell_size = 2.0 / res as f64;
        let mut cells = vec![Vec::new(); res * res * res];
        let mut grid = VertexGrid { cells: Vec::new(), res, cell_size };
        for (idx, p) in points.iter().enumerate() {
            let c = grid.cell_of(p);
            cells[grid.flat(c)].push(idx);
        }
        grid.cells = cells;
        grid
    }

    fn cell_of(&self, p: &Point3<f64>) -> [usize; 3] {
        let mut c = [0usize; 3];
        for d in 0..3 {
            let f = ((p[d] + 1.0) / self.cell_size).floor();
            c[d] = (f.max(0.0) as usize).min(self.res - 1);
        }
        c
    }

    fn flat(&self, c: [usize; 3]) -> usize {
        (c[0] * self.res + c[1]) * self.res + c[2]
    }

    /// Index of the source vertex closest to `q`. Ties go to the lowest index.
    fn nearest(&self, points: &[Point3<f64>], q: &Point3<f64>) -> Option<usize> {
        let center = self.cell_of(q);
        let mut best: Option<(f64, usize)> = None;
        for ring in 0..=self.res {
            let r = ring as isize;
            for dx in -r..=r {
                for dy in -r..=r {
                    for dz in -r..=r {
                        if dx.abs() != r && dy.abs() != r && dz.abs() != r {
                            continue;
                        }
                        let c = [
                            center[0] as isize + dx,
                            center[1] as isize + dy,
                            center[2] as isize + dz,
                        ];
                        if c.iter().any(|&v| v < 0 || v >= self.res as isize) {
                            continue;
                        }
                        let cell = self.flat([c[0] as usize, c[1] as usize, c[2] as usize]);
                        for &idx in self.cells[cell].iter() {
                            let d = distance_squared(&points[idx], q);
                            let better = match best {
                                None => true,
                                Some((bd, bi)) => d < bd || (d == bd && idx < bi),
                            };
                            if better {
                                best = Some((d, idx));
                            }
                        }
                    }
                }
            }
            if let Some((bd, _)) = best {
                let reach = ring as f64 * self.cell_size;
                if bd.sqrt() <= reach {
                    break;
                }
            }
        }
        best.map(|(_, idx)| idx)
    }
}

/// Barycentric coordinates of the central projection of `q` onto triangle `(a, b, c)`,
/// or `None` if the ray from the origin through `q` misses it.
fn project_barycentric(
    q: &Point3<f64>,
    a: &Point3<f64>,
    b: &Point3<f64>,
    c: &Point3<f64>,
) -> Option<[f64; 3]> {
    let v0 = b - a;
    let v1 = c - a;
    let n = v0.cross(&v1);
    let denom = n.dot(&q.coords);
    if denom.abs() < 1e-15 {
        return None;
    }
    let t = n.dot(&a.coords) / denom;
    if t <= 0.0 {
        return None;
    }
    let v2 = q.coords * t - a.coords;
    let d00 = v0.dot(&v0);
    let d01 = v0.dot(&v1);
    let d11 = v1.dot(&v1);
    let d20 = v2.dot(&v0);
    let d21 = v2.dot(&v1);
    let det = d00 * d11 - d01 * d01;
    if det.abs() < 1e-20 {
        return None;
    }
    let v = (d11 * d20 - d01 * d21) / det;
    let w = (d00 * d21 - d01 * d20) / det;
    let u = 1.0 - v - w;
    if u >= -BARY_TOLERANCE && v >= -BARY_TOLERANCE && w >= -BARY_TOLERANCE {
        Some([u, v, w])
    } else {
        None
    }
}

/// Interpolation weights from a source sphere to every vertex of a target sphere.
#[derive(Debug, Clone, PartialEq)]
pub struct SphereCorrespondence {
    pub num_source: usize,
    /// Per target vertex: three source vertex indices and their weights.
    pub weights: Vec<([usize; 3], [f64; 3])>,
}

impl SphereCorrespondence {
    /// Compute the correspondence from `source` to `target`. Both meshes are projected onto the
    /// unit sphere.
    pub fn compute(source: &BrainMesh, target: &BrainMesh) -> Result<SphereCorrespondence> {
        if source.num_vertices() == 0 {
            return Err(VolsurfError::InvalidMapping(String::from("source sphere has no vertices")));
        }
        let points: Vec<Point3<f64>> =
            (0..source.num_vertices()).map(|i| on_unit_sphere(source, i)).collect();

        let mut vertex_faces: Vec<Vec<usize>> = vec![Vec::new(); source.num_vertices()];
        for f in 0..source.num_faces() {
            for &v in source.face(f).iter() {
                vertex_faces[v].push(f);
            }
        }

        let grid = VertexGrid::new(&points);
        let mut weights = Vec::with_capacity(target.num_vertices());
        for t in 0..target.num_vertices() {
            let q = on_unit_sphere(target, t);
            let nearest = grid
                .nearest(&points, &q)
                .ok_or_else(|| {
                    VolsurfError::InvalidMapping(String::from("no source vertex found"))
                })?;

            let mut found: Option<([usize; 3], [f64; 3])> = None;
            let mut candidates: Vec<usize> = vertex_faces[nearest].clone();
            for &f in vertex_faces[nearest].iter() {
                for &v in source.face(f).iter() {
                    candidates.extend(vertex_faces[v].iter().copied());
                }
            }
            for f in candidates {
                let tri = source.face(f);
                let (a, b, c) = (&points[tri[0]], &points[tri[1]], &points[tri[2]]);
                if let Some(bary) = project_barycentric(&q, a, b, c) {
                    found = Some((tri, bary));
                    break;
                }
            }
            weights.push(found.unwrap_or(([nearest, nearest, nearest], [1.0, 0.0, 0.0])));
        }
        Ok(SphereCorrespondence { num_source: source.num_vertices(), weights })
    }

    /// Apply the correspondence to per-vertex source values. Non-finite source values are left out
    /// of the blend; a target vertex whose contributing values are all non-finite gets NaN.
    pub fn apply(&self, values: &[f32]) -> Result<Vec<f32>> {
        if values.len() != self.num_source {
            return Err(VolsurfError::VertexCountMismatch(
                String::from("field on the source sphere"),
                self.num_source,
                values.len(),
            ));
        }
        Ok(self
            .weights
            .iter()
            .map(|(idx, w)| {
                let mut acc = 0.0f64;
                let mut total = 0.0f64;
                for k in 0..3 {
                    let v = values[idx[k]];
                    if w[k] > 0.0 && v.is_finite() {
                        acc += w[k] * v as f64;
                        total += w[k];
                    }
                }
                if total > 0.0 {
                    (acc / total) as f32
                } else {
                    f32::NAN
                }
            })
            .collect())
    }
}


#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn octahedron(radius: f32) -> BrainMesh {
        let r = radius;
        BrainMesh::new(
            vec![r, 0.0, 0.0, -r, 0.0, 0.0, 0.0, r, 0.0, 0.0, -r, 0.0, 0.0, 0.0, r, 0.0, 0.0, -r],
            vec![0, 2, 4, 2, 1, 4, 1, 3, 4, 3, 0, 4, 2, 0, 5, 1, 2, 5, 3, 1, 5, 0, 3, 5],
        ).unwrap()
    }

    #[test]
    fn identical_spheres_map_vertices_onto_themselves() {
        let src = octahedron(100.0);
        let corr = SphereCorrespondence::compute(&src, &octahedron(1.0)).unwrap();
        let values = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let out = corr.apply(&values).unwrap();
        for (a, b) in values.iter().zip(out.iter()) {
            assert_abs_diff_eq!(*a, *b, epsilon = 1e-5);
        }
    }

    #[test]
    fn face_centres_get_the_mean_of_the_corners() {
        let src = octahedron(100.0);
        let target = BrainMesh::new(vec![1.0, 1.0, 1.0, -1.0, -1.0, -1.0], Vec::new()).unwrap();
        let corr = SphereCorrespondence::compute(&src, &target).unwrap();
        let out = corr.apply(&[3.0, 0.0, 6.0, 0.0, 9.0, 0.0]).unwrap();
        assert_abs_diff_eq!(6.0, out[0], epsilon = 1e-5);
        assert_abs_diff_eq!(0.0, out[1], epsilon = 1e-5);
    }

    #[test]
    fn value_count_must_match_the_source_sphere() {
        let corr = SphereCorrespondence::compute(&octahedron(1.0), &octahedron(1.0)).unwrap();
        assert!(corr.apply(&[1.0, 2.0]).is_err());
    }

    #[test]
    fn nan_source_values_do_not_spread() {
        let corr = SphereCorrespondence::compute(&octahedron(1.0), &octahedron(1.0)).unwrap();
        let out = corr.apply(&[f32::NAN, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        assert!(out[0].is_nan());
        assert_abs_diff_eq!(2.0, out[1], epsilon = 1e-5);
    }
}
