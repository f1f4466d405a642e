use super::*;

/// A radiance sample returned by [`AreaLight::sample_li`] (§4.5). `pdf` is a
/// solid-angle density (`pdf_area * r^2 / cos_theta_light`).
#[derive(Clone, Copy, Debug)]
pub struct LightLiSample {
    pub radiance: ColorRgb,
    pub wi: Normal,
    pub p: Point3,
    pub n: Normal,
    pub pdf: f32,
}

/// A particle-emission sample returned by [`AreaLight::sample_le`] for BDPT
/// light subpaths (§4.10).
pub struct LightLeSample {
    pub radiance: ColorRgb,
    pub ray: Ray,
    pub n: Normal,
    pub pdf_pos: f32,
    pub pdf_dir: f32,
}

/// A diffuse area light bound to a single triangle (§4.5): emits `radiance`
/// uniformly over the hemisphere above its shading normal.
#[derive(Clone, Copy, Debug)]
pub struct AreaLight {
    pub shape: u32,
    pub radiance: ColorRgb,
    area: f32,
}

impl AreaLight {
    pub fn new(shape: u32, radiance: ColorRgb, area: f32) -> Self {
        Self {
            shape,
            radiance,
            area,
        }
    }

    pub fn power(&self) -> ColorRgb {
        self.radiance * self.area * std::f32::consts::PI
    }

    /// Emitted radiance leaving surface normal `n` towards `w`: one-sided, zero
    /// on the back face.
    pub fn l(&self, n: &Normal, w: &Vec3) -> ColorRgb {
        if n.dot(w) > 0.0 {
            self.radiance
        } else {
            ColorRgb::BLACK
        }
    }

    /// Samples a point on the light and converts its area-measure pdf to solid
    /// angle as seen from `surf_p`/`surf_n`. `light_p`/`light_n`/`light_pdf_area`
    /// come from [`Triangle`] area sampling (§4.1).
    pub fn sample_li(
        &self,
        surf_p: &Point3,
        surf_n: &Normal,
        light_p: &Point3,
        light_n: &Normal,
        light_pdf_area: f32,
    ) -> Option<LightLiSample> {
        let d = light_p - surf_p;
        let distance = d.norm();
        if distance == 0.0 {
            return None;
        }
        let wi = d / distance;
        let cos_light = light_n.dot(&-wi);
        let cos_surf = surf_n.dot(&wi);
        if cos_light <= 0.0 || cos_surf <= 0.0 {
            return None;
        }

        let pdf = light_pdf_area * distance * distance / cos_light;
        Some(LightLiSample {
            radiance: self.radiance,
            wi: normal!(wi),
            p: *light_p,
            n: *light_n,
            pdf,
        })
    }

    /// Solid-angle pdf of hitting this light's sampled point along `ray`, given
    /// the shape's area-measure pdf (`1 / area` for a single triangle).
    pub fn pdf_li(&self, light_p: &Point3, light_n: &Normal, ray: &Ray) -> f32 {
        let distance = (light_p - ray.origin).norm();
        let cos_light = light_n.dot(&-ray.dir);
        if cos_light <= 0.0 {
            return 0.0;
        }
        (1.0 / self.area) * distance * distance / cos_light
    }

    /// Samples an emitted particle: position via `shape_sample`, direction via
    /// cosine-weighted hemisphere sampling around the shading normal.
    pub fn sample_le(
        &self,
        shape_p: Point3,
        shape_n: Normal,
        shape_pdf_area: f32,
        u_dir: (f32, f32),
    ) -> LightLeSample {
        let onb = sampling::OrthonormalBasis::new(&shape_n);
        let local_dir = sampling::hemisphere_cosine(u_dir.0, u_dir.1);
        let pdf_dir = sampling::hemisphere_cosine_pdf(local_dir.y);
        let dir = normal!(onb.to_world(&local_dir));
        let origin = shape_p + 1e-4 * shape_n.into_inner();
        LightLeSample {
            radiance: self.radiance,
            ray: Ray::new(origin, dir),
            n: shape_n,
            pdf_pos: shape_pdf_area,
            pdf_dir,
        }
    }
}

/// Picks among the scene's area lights with uniform probability (§4.5).
#[derive(Clone, Debug)]
pub struct UniformLightSelector {
    light_count: usize,
}

impl UniformLightSelector {
    pub fn new(light_count: usize) -> Self {
        Self { light_count }
    }

    pub fn select(&self, u: f32) -> Option<usize> {
        if self.light_count == 0 {
            return None;
        }
        let index = ((u * self.light_count as f32) as usize).min(self.light_count - 1);
        Some(index)
    }

    pub fn pdf(&self) -> f32 {
        if self.light_count == 0 {
            0.0
        } else {
            1.0 / self.light_count as f32
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_l_is_one_sided() {
        let light = AreaLight::new(0, ColorRgb::WHITE, 1.0);
        let n = normal!(0.0, 1.0, 0.0);
        assert!(!light.l(&n, &vector![0.0, 1.0, 0.0]).is_black());
        assert!(light.l(&n, &vector![0.0, -1.0, 0.0]).is_black());
    }

    #[test]
    fn test_sample_li_rejects_back_facing_surface() {
        let light = AreaLight::new(0, ColorRgb::WHITE, 1.0);
        let surf_p = point![0.0, 0.0, 0.0];
        let surf_n = normal!(0.0, -1.0, 0.0);
        let light_p = point![0.0, 1.0, 0.0];
        let light_n = normal!(0.0, -1.0, 0.0);
        assert!(light
            .sample_li(&surf_p, &surf_n, &light_p, &light_n, 1.0)
            .is_none());
    }

    #[test]
    fn test_sample_li_accepted_pdf_positive() {
        let light = AreaLight::new(0, ColorRgb::WHITE, 1.0);
        let surf_p = point![0.0, 0.0, 0.0];
        let surf_n = normal!(0.0, 1.0, 0.0);
        let light_p = point![0.0, 1.0, 0.0];
        let light_n = normal!(0.0, -1.0, 0.0);
        let sample = light
            .sample_li(&surf_p, &surf_n, &light_p, &light_n, 1.0)
            .expect("front-facing sample should be accepted");
        assert_abs_diff_eq!(sample.wi.y, 1.0, epsilon = 1e-5);
        assert!(sample.pdf > 0.0);
    }

    #[test]
    fn test_uniform_light_selector_pdf() {
        let selector = UniformLightSelector::new(4);
        assert_abs_diff_eq!(selector.pdf(), 0.25, epsilon = 1e-6);
        assert_eq!(selector.select(0.0), Some(0));
        assert_eq!(selector.select(0.999), Some(3));
    }
}
