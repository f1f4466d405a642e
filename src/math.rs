use super::*;

//
// Type aliases
//
// This codebase's retrieved modules reference `Point3`/`Vec3`/`Mat3`/`Mat4`/`Normal`
// and the `vector!`/`point!`/`normal!` macros pervasively but without a defining
// module in the retrieval; they are defined here, thin wrappers over `nalgebra`.
//

pub type Vec2 = na::Vector2<f32>;
pub type Vec3 = na::Vector3<f32>;
pub type Vec3u = na::Vector3<u32>;
pub type Vec3b = na::Vector3<bool>;
pub type Point2 = na::Point2<f32>;
pub type Point3 = na::Point3<f32>;
pub type Mat3 = na::Matrix3<f32>;
pub type Mat4 = na::Matrix4<f32>;
pub type Normal = na::Unit<na::Vector3<f32>>;

macro_rules! vector {
    ($($xs:expr),+ $(,)?) => {
        na::vector![$($xs),+]
    };
}

macro_rules! point {
    ($($xs:expr),+ $(,)?) => {
        na::point![$($xs),+]
    };
}

macro_rules! normal {
    ($v:expr) => {
        na::Unit::new_normalize($v)
    };
    ($($xs:expr),+ $(,)?) => {
        na::Unit::new_normalize(na::vector![$($xs),+])
    };
}

pub(crate) use normal;
pub(crate) use point;
pub(crate) use vector;

pub const X_AXIS: Vec3 = Vec3::new(1.0, 0.0, 0.0);
pub const Y_AXIS: Vec3 = Vec3::new(0.0, 1.0, 0.0);
pub const Z_AXIS: Vec3 = Vec3::new(0.0, 0.0, 1.0);

//
// Interpolation
//

pub fn lerp_scalar<T: num::Float>(a: T, b: T, t: T) -> T {
    a * (T::one() - t) + b * t
}

pub fn lerp_color(a: &ColorRgb, b: &ColorRgb, t: f32) -> ColorRgb {
    ColorRgb::new(
        lerp_scalar(a.r(), b.r(), t),
        lerp_scalar(a.g(), b.g(), t),
        lerp_scalar(a.b(), b.b(), t),
    )
}

//
// Geometric
//

pub fn reflect_vector(v: &Vec3, n: &Vec3) -> Vec3 {
    (2.0 * v.dot(n) * n - v).normalize()
}

/// Power heuristic with exponent 2, used throughout MIS weighting (§4.9, §4.10).
pub fn power_heuristic(nf: f32, f_pdf: f32, ng: f32, g_pdf: f32) -> f32 {
    let f = nf * f_pdf;
    let g = ng * g_pdf;
    if (f * f + g * g) == 0.0 {
        0.0
    } else {
        (f * f) / (f * f + g * g)
    }
}

/// Balance-heuristic weighted mixture of two densities, used by the modified-Phong
/// BSDF's combined diffuse/specular pdf (§4.4).
pub fn mix(a: f32, b: f32, t: f32) -> f32 {
    lerp_scalar(a, b, t)
}

//
// Tests
//

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_ulps_eq;

    #[test]
    fn test_lerp_scalar() {
        assert_ulps_eq!(lerp_scalar(0.0, 1.0, 0.0), 0.0, max_ulps = 1);
        assert_ulps_eq!(lerp_scalar(0.0, 1.0, 0.5), 0.5, max_ulps = 1);
        assert_ulps_eq!(lerp_scalar(0.0, 1.0, 1.0), 1.0, max_ulps = 1);
    }

    #[test]
    fn test_lerp_color() {
        let a = ColorRgb::BLACK;
        let b = ColorRgb::WHITE;
        let c = lerp_color(&a, &b, 0.5);
        assert_ulps_eq!(c.r(), 0.5, max_ulps = 1);
        assert_ulps_eq!(c.g(), 0.5, max_ulps = 1);
        assert_ulps_eq!(c.b(), 0.5, max_ulps = 1);
    }

    #[test]
    fn test_reflect_vector() {
        let v = vector![1.0, 1.0, 0.0].normalize();
        let n = vector![0.0, 1.0, 0.0];
        let r = reflect_vector(&v, &n);
        assert_ulps_eq!(v.x, -r.x, max_ulps = 1);
        assert_ulps_eq!(v.y, r.y, max_ulps = 1);
        assert_ulps_eq!(v.z, r.z, max_ulps = 1);
    }

    #[test]
    fn test_power_heuristic_sums_to_reasonable_range() {
        let w = power_heuristic(1.0, 0.5, 1.0, 0.5);
        assert_ulps_eq!(w, 0.5, max_ulps = 2);
    }
}
