use super::*;

/// A modified-Phong material (§4.4), after Lafortune, Eric P. and Yves D.
/// Willems, "Using the modified Phong reflectance model for physically based
/// rendering" (1994).
#[derive(Clone, Debug)]
pub struct Material {
    pub name: String,
    pub diffuse: ColorRgb,
    pub specular: ColorRgb,
    pub shininess: f32,
}

/// A BSDF sample: incoming direction, its combined pdf, and the BRDF value.
#[derive(Clone, Copy, Debug)]
pub struct BrdfSample {
    pub wi: Normal,
    pub pdf: f32,
    pub f: ColorRgb,
}

impl Material {
    pub fn new(name: impl Into<String>, diffuse: ColorRgb, specular: ColorRgb, shininess: f32) -> Self {
        Self {
            name: name.into(),
            diffuse,
            specular,
            shininess,
        }
    }

    /// `pSpec = sum(Ks) / (sum(Kd) + sum(Ks))`, the lobe-selection probability.
    fn spec_prob(&self) -> Option<f32> {
        let sum_kd = self.diffuse.sum();
        let sum_ks = self.specular.sum();
        let sum = sum_kd + sum_ks;
        if sum == 0.0 {
            None
        } else {
            Some(sum_ks / sum)
        }
    }

    /// Lambert diffuse plus Phong specular lobe, evaluated at world-space `wo`
    /// (pointing away from the surface, towards where the ray came from) and
    /// `wi` (the sampled/queried incoming direction), around shading normal `n`.
    pub fn brdf(&self, wo: &Vec3, wi: &Vec3, n: &Normal) -> ColorRgb {
        let diffuse = self.diffuse * std::f32::consts::FRAC_1_PI;

        let r = reflect_vector(wo, n);
        let cos_rv = wi.dot(&r).max(0.0);
        let normalization = (self.shininess + 2.0) * std::f32::consts::FRAC_1_PI * 0.5;
        let specular = self.specular * (normalization * cos_rv.powf(self.shininess));

        diffuse + specular
    }

    /// Combined diffuse/specular pdf at `wi`, the balance-heuristic mixture
    /// weighted by [`Self::spec_prob`].
    pub fn pdf(&self, wo: &Vec3, wi: &Vec3, n: &Normal) -> f32 {
        let Some(spec_prob) = self.spec_prob() else {
            return 0.0;
        };

        let r = reflect_vector(wo, n);
        let cos_rv = wi.dot(&r).max(0.0);
        let pdf_spec =
            (self.shininess + 1.0) * std::f32::consts::FRAC_1_PI * 0.5 * cos_rv.powf(self.shininess);

        let cos_theta = wi.dot(n).abs();
        let pdf_diff = cos_theta * std::f32::consts::FRAC_1_PI;

        mix(pdf_diff, pdf_spec, spec_prob)
    }

    /// Importance-samples the BSDF: with probability `spec_prob` samples the
    /// Phong lobe around the mirror direction of `wo`, otherwise samples a
    /// cosine-weighted hemisphere around the shading normal. `tangent` is the
    /// shading-normal frame at the hit point, used for the diffuse lobe.
    pub fn sample_brdf(
        &self,
        wo: &Vec3,
        n: &Normal,
        tangent: &sampling::OrthonormalBasis,
        uc: f32,
        u: (f32, f32),
    ) -> Option<BrdfSample> {
        let spec_prob = self.spec_prob()?;

        let r = reflect_vector(wo, n);
        let wi = if uc < spec_prob {
            let lobe_frame = sampling::OrthonormalBasis::new(&normal!(r));
            let local = sampling::phong_lobe(self.shininess, u.0, u.1);
            lobe_frame.to_world(&local)
        } else {
            let local = sampling::hemisphere_cosine(u.0, u.1);
            tangent.to_world(&local)
        }
        .normalize();

        let cos_theta = wi.dot(n);
        if cos_theta < 0.0 {
            return None;
        }

        let cos_rv = wi.dot(&r).max(0.0);
        let pow_rv = cos_rv.powf(self.shininess);

        let pdf_diff = cos_theta * std::f32::consts::FRAC_1_PI;
        let pdf_spec = (self.shininess + 1.0) * std::f32::consts::FRAC_1_PI * 0.5 * pow_rv;
        let pdf = mix(pdf_diff, pdf_spec, spec_prob);
        if pdf <= 0.0 {
            return None;
        }

        let f = self.diffuse * std::f32::consts::FRAC_1_PI
            + self.specular * ((self.shininess + 2.0) * std::f32::consts::FRAC_1_PI * 0.5 * pow_rv);

        Some(BrdfSample {
            wi: normal!(wi),
            pdf,
            f,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn test_onb() -> sampling::OrthonormalBasis {
        sampling::OrthonormalBasis::new(&normal!(0.0, 1.0, 0.0))
    }

    #[test]
    fn test_black_material_has_no_spec_prob() {
        let m = Material::new("black", ColorRgb::BLACK, ColorRgb::BLACK, 1.0);
        assert!(m.spec_prob().is_none());
        let onb = test_onb();
        let n = normal!(0.0, 1.0, 0.0);
        assert!(m
            .sample_brdf(&vector![0.0, 1.0, 0.0], &n, &onb, 0.5, (0.3, 0.4))
            .is_none());
    }

    #[test]
    fn test_sample_brdf_stays_above_hemisphere() {
        let m = Material::new("plastic", ColorRgb::new(0.6, 0.6, 0.6), ColorRgb::new(0.2, 0.2, 0.2), 32.0);
        let onb = test_onb();
        let n = normal!(0.0, 1.0, 0.0);
        let wo = vector![0.0, 1.0, 0.0];
        for i in 0..16 {
            let u = (i as f32 / 16.0, ((i * 7) % 16) as f32 / 16.0);
            if let Some(sample) = m.sample_brdf(&wo, &n, &onb, 0.1, u) {
                assert!(sample.wi.y >= -1e-5);
                assert!(sample.pdf > 0.0);
            }
        }
    }

    #[test]
    fn test_pdf_matches_sampled_direction_order_of_magnitude() {
        let m = Material::new("plastic", ColorRgb::new(0.6, 0.6, 0.6), ColorRgb::new(0.2, 0.2, 0.2), 32.0);
        let onb = test_onb();
        let n = normal!(0.0, 1.0, 0.0);
        let wo = vector![0.0, 1.0, 0.0];
        let sample = m
            .sample_brdf(&wo, &n, &onb, 0.9, (0.5, 0.5))
            .expect("diffuse lobe should produce a sample");
        let pdf = m.pdf(&wo, &sample.wi, &n);
        assert_abs_diff_eq!(pdf, sample.pdf, epsilon = 1e-3);
    }
}
