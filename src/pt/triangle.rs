use super::*;

/// Flat vertex / normal / uv arrays and per-face index triples plus per-face
/// material id (§3). Immutable once loaded.
#[derive(Debug)]
pub struct TriangleMesh {
    pub positions: Vec<Point3>,
    pub normals: Vec<Normal>,
    pub tex_coords: Vec<Point2>,
    pub faces: Vec<[u32; 3]>,
    pub material_ids: Vec<u32>,
}

impl TriangleMesh {
    pub fn face_count(&self) -> u32 {
        self.faces.len() as u32
    }

    pub fn face_positions(&self, face: u32) -> [Point3; 3] {
        let f = self.faces[face as usize];
        [
            self.positions[f[0] as usize],
            self.positions[f[1] as usize],
            self.positions[f[2] as usize],
        ]
    }

    pub fn face_normals(&self, face: u32) -> [Normal; 3] {
        let f = self.faces[face as usize];
        [
            self.normals[f[0] as usize],
            self.normals[f[1] as usize],
            self.normals[f[2] as usize],
        ]
    }

    pub fn face_tex_coords(&self, face: u32) -> [Point2; 3] {
        if self.tex_coords.is_empty() {
            return [point![0.0, 0.0], point![1.0, 0.0], point![1.0, 1.0]];
        }
        let f = self.faces[face as usize];
        [
            self.tex_coords[f[0] as usize],
            self.tex_coords[f[1] as usize],
            self.tex_coords[f[2] as usize],
        ]
    }

    pub fn face_area(&self, face: u32) -> f32 {
        let [a, b, c] = self.face_positions(face);
        0.5 * (b - a).cross(&(c - a)).norm()
    }
}

/// A scene primitive (§3): a cheap handle into a mesh's face, a material
/// reference, and an optional back-reference to the `AreaLight` it emits as.
/// Non-owning by construction: ids index into the owning `Scene`'s arrays
/// rather than holding pointers, which keeps the Triangle <-> AreaLight cycle
/// (§9) acyclic in ownership terms.
#[derive(Clone, Copy, Debug)]
pub struct Triangle {
    pub mesh: u32,
    pub face: u32,
    pub material: u32,
    pub area_light: Option<u32>,
}

/// Barycentrics returned from a hit: (1-u-v, u, v).
pub type Barycentrics = Vec3;

/// Möller-Trumbore ray/triangle intersection (§4.1). Rejects |det| < 1e-5 as
/// degenerate (`NumericDegenerate`, §7) by returning `None`.
pub fn intersect_triangle(
    ray: &Ray,
    positions: &[Point3; 3],
) -> Option<(f32, Barycentrics)> {
    const EPSILON: f32 = 1e-5;

    let edge1 = positions[1] - positions[0];
    let edge2 = positions[2] - positions[0];
    let pvec = ray.dir.cross(&edge2);
    let det = edge1.dot(&pvec);
    if det.abs() < EPSILON {
        return None;
    }
    let inv_det = 1.0 / det;

    let tvec = ray.origin - positions[0];
    let u = tvec.dot(&pvec) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let qvec = tvec.cross(&edge1);
    let v = ray.dir.dot(&qvec) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = edge2.dot(&qvec) * inv_det;
    if t < ray.t_min || t > ray.t_max {
        return None;
    }

    Some((t, vector![1.0 - u - v, u, v]))
}

/// After a hit (§3): world-space position, shading and geometric normal, uv,
/// tangent frame, and a non-owning reference to the hit primitive.
#[derive(Clone, Copy, Debug)]
pub struct Intersection {
    pub p: Point3,
    pub n: Normal,
    pub ng: Normal,
    pub uv: Point2,
    pub tangent: sampling::OrthonormalBasis,
    pub shape: u32,
    pub t: f32,
}

impl Intersection {
    pub fn spawn_ray(&self, dir: Normal) -> Ray {
        // Offset along the geometric normal to avoid immediate self-intersection.
        let sign = if dir.dot(&self.ng) >= 0.0 { 1.0 } else { -1.0 };
        let origin = self.p + sign * 1e-4 * self.ng.into_inner();
        Ray::new(origin, dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_s2_triangle_hit() {
        let positions = [
            point![0.0, 0.0, 0.0],
            point![1.0, 0.0, 0.0],
            point![0.0, 1.0, 0.0],
        ];
        let ray = Ray::new(point![0.25, 0.25, 1.0], normal!(0.0, 0.0, -1.0));
        let (t, bary) = intersect_triangle(&ray, &positions).expect("expected a hit");
        assert_abs_diff_eq!(t, 1.0, epsilon = 1e-4);
        assert_abs_diff_eq!(bary.x, 0.5, epsilon = 1e-4);
        assert_abs_diff_eq!(bary.y, 0.25, epsilon = 1e-4);
        assert_abs_diff_eq!(bary.z, 0.25, epsilon = 1e-4);
    }

    #[test]
    fn test_barycentrics_sum_to_one() {
        let positions = [
            point![0.0, 0.0, 0.0],
            point![2.0, 0.0, 0.0],
            point![0.0, 3.0, 0.0],
        ];
        let ray = Ray::new(point![0.5, 0.5, 1.0], normal!(0.0, 0.0, -1.0));
        let (_, bary) = intersect_triangle(&ray, &positions).expect("expected a hit");
        assert_abs_diff_eq!(bary.x + bary.y + bary.z, 1.0, epsilon = 1e-4);
    }

    #[test]
    fn test_degenerate_determinant_rejected() {
        // Ray parallel to the triangle plane: determinant ~ 0.
        let positions = [
            point![0.0, 0.0, 0.0],
            point![1.0, 0.0, 0.0],
            point![0.0, 1.0, 0.0],
        ];
        let ray = Ray::new(point![0.25, 0.25, 1.0], normal!(1.0, 0.0, 0.0));
        assert!(intersect_triangle(&ray, &positions).is_none());
    }
}
