use super::*;

/// Local shading frame with the normal on the Y axis (`tangent, normal, bitangent`
/// columns), built sign-robustly per Duff et al., "Building an Orthonormal Basis,
/// Revisited" (https://graphics.pixar.com/library/OrthonormalB/paper.pdf).
#[derive(Clone, Copy, Debug)]
pub struct OrthonormalBasis {
    world_from_local: Mat3,
    local_from_world: Mat3,
}

impl OrthonormalBasis {
    pub fn new(n: &Normal) -> Self {
        let sign = f32::copysign(1.0, n.z);
        let a = -1.0 / (sign + n.z);
        let b = n.x * n.y * a;
        let t = normal!(1.0 + sign * n.x * n.x * a, sign * b, -sign * n.x);
        let b = normal!(b, sign + n.y * n.y * a, -n.y);

        let world_from_local =
            Mat3::from_columns(&[t.into_inner(), n.into_inner(), b.into_inner()]);
        let local_from_world = world_from_local.transpose();
        Self {
            world_from_local,
            local_from_world,
        }
    }

    pub fn world_from_local(&self) -> &Mat3 {
        &self.world_from_local
    }

    pub fn local_from_world(&self) -> &Mat3 {
        &self.local_from_world
    }

    pub fn to_local(&self, v: &Vec3) -> Vec3 {
        self.local_from_world * v
    }

    pub fn to_world(&self, v: &Vec3) -> Vec3 {
        self.world_from_local * v
    }

    pub fn tangent(&self) -> Normal {
        na::Unit::new_unchecked(self.world_from_local.column(0).into())
    }

    pub fn normal(&self) -> Normal {
        na::Unit::new_unchecked(self.world_from_local.column(1).into())
    }

    pub fn bitangent(&self) -> Normal {
        na::Unit::new_unchecked(self.world_from_local.column(2).into())
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum HemisphereSampler {
    Uniform,
    Cosine,
}

impl HemisphereSampler {
    pub fn sample(self, s: f32, t: f32) -> Normal {
        let dir = match self {
            HemisphereSampler::Uniform => hemisphere_uniform(s, t),
            HemisphereSampler::Cosine => hemisphere_cosine(s, t),
        };
        normal!(dir)
    }

    pub fn pdf(self, cos_theta: f32) -> f32 {
        match self {
            HemisphereSampler::Uniform => hemisphere_uniform_pdf(),
            HemisphereSampler::Cosine => hemisphere_cosine_pdf(cos_theta),
        }
    }
}

impl Default for HemisphereSampler {
    fn default() -> Self {
        Self::Cosine
    }
}

pub fn hemisphere_uniform(s: f32, t: f32) -> Vec3 {
    let u = std::f32::consts::TAU * s;
    let v = f32::sqrt(f32::max(0.0, 1.0 - t * t));
    let px = v * f32::cos(u);
    let py = t;
    let pz = v * f32::sin(u);
    vector![px, py, pz]
}

pub fn hemisphere_uniform_pdf() -> f32 {
    std::f32::consts::FRAC_1_PI * 0.5
}

pub fn concentric_disk(s: f32, t: f32) -> Vec2 {
    let s = 2.0 * s - 1.0;
    let t = 2.0 * t - 1.0;
    if s == 0.0 && t == 0.0 {
        return vector![0.0, 0.0];
    }

    let (r, theta) = if f32::abs(s) > f32::abs(t) {
        (s, (std::f32::consts::FRAC_PI_4) * (t / s))
    } else {
        (t, (std::f32::consts::FRAC_PI_2) - (std::f32::consts::FRAC_PI_4) * (s / t))
    };

    vector![r * f32::cos(theta), r * f32::sin(theta)]
}

pub fn hemisphere_cosine(s: f32, t: f32) -> Vec3 {
    let d = concentric_disk(s, t);
    let y = f32::sqrt(f32::max(0.0, 1.0 - d.x * d.x - d.y * d.y));
    vector![d.x, y, d.y]
}

pub fn hemisphere_cosine_pdf(cos_theta: f32) -> f32 {
    cos_theta.max(0.0) * std::f32::consts::FRAC_1_PI
}

/// Importance-sample the modified-Phong specular lobe `cos(theta)^n` around the
/// local +Y axis (§4.4): `cos(theta) = u^(1/(n+1))`, `phi = 2*pi*v`.
pub fn phong_lobe(n: f32, s: f32, t: f32) -> Vec3 {
    let cos_theta = s.powf(1.0 / (n + 1.0));
    let sin_theta = f32::sqrt(f32::max(0.0, 1.0 - cos_theta * cos_theta));
    let phi = std::f32::consts::TAU * t;
    vector![sin_theta * phi.cos(), cos_theta, sin_theta * phi.sin()]
}

/// pdf of a direction sampled by [`phong_lobe`], measured around the local +Y axis.
pub fn phong_lobe_pdf(n: f32, cos_theta: f32) -> f32 {
    if cos_theta <= 0.0 {
        0.0
    } else {
        (n + 1.0) * std::f32::consts::FRAC_1_PI * 0.5 * cos_theta.powf(n)
    }
}

/// Uniformly sample a triangle (§4.1, area light sampling), returning barycentrics.
pub fn triangle_uniform(s: f32, t: f32) -> (f32, f32) {
    let su = s.sqrt();
    (1.0 - su, t * su)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_orthonormal_basis_is_orthonormal() {
        let n = normal!(0.3, 0.7, -0.4);
        let onb = OrthonormalBasis::new(&n);
        let t = onb.tangent();
        let b = onb.bitangent();
        assert_abs_diff_eq!(t.dot(&n), 0.0, epsilon = 1e-5);
        assert_abs_diff_eq!(b.dot(&n), 0.0, epsilon = 1e-5);
        assert_abs_diff_eq!(t.dot(&b), 0.0, epsilon = 1e-5);
        assert_abs_diff_eq!(onb.normal().into_inner(), n.into_inner(), epsilon = 1e-5);
    }

    #[test]
    fn test_hemisphere_cosine_pdf_is_positive_on_upper_hemisphere() {
        let samples = 256;
        for i in 0..samples {
            let s = (i as f32 + 0.5) / samples as f32;
            let t = ((i * 7919) % samples) as f32 / samples as f32;
            let dir = hemisphere_cosine(s, t);
            let pdf = hemisphere_cosine_pdf(dir.y);
            assert!(pdf > 0.0);
        }
    }

    #[test]
    fn test_phong_lobe_concentrates_at_high_exponent() {
        let dir = phong_lobe(1000.0, 0.5, 0.5);
        assert!(dir.y > 0.9);
    }

    #[test]
    fn test_triangle_uniform_in_bounds() {
        let (b0, b1) = triangle_uniform(0.3, 0.6);
        assert!(b0 >= 0.0 && b0 <= 1.0);
        assert!(b1 >= 0.0 && b1 <= 1.0);
        assert!(b0 + b1 <= 1.0 + 1e-6);
    }
}
