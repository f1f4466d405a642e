use super::*;

/// Maximum unidirectional path depth (§6 CLI default).
pub const PATH_MAX_DEPTH: u32 = 16;

/// Bounce after which Russian roulette starts culling low-throughput paths.
const RR_START_BOUNCE: u32 = 3;
const RR_MIN_SURVIVAL: f32 = 0.05;

/// Next-event-estimation light sample at a surface hit (§4.9): picks a light
/// uniformly, area-samples a point on it, tests visibility with the usual
/// `eps * n` offset at both ends, evaluates the BRDF and geometry term, and
/// MIS-weights the result against the BSDF-sampling strategy with the power
/// heuristic (exponent 2).
fn sample_ld(scene: &Scene, sampler: &mut Sampler, its: &Intersection, wo: &Vec3) -> ColorRgb {
    let Some(light_idx) = scene.light_selector().select(sampler.sample_1d()) else {
        return ColorRgb::BLACK;
    };
    let select_pdf = scene.light_selector().pdf();
    let light = &scene.lights()[light_idx];
    let (shape_p, shape_n, shape_pdf_area) = scene.sample_shape(light.shape, sampler.sample_2d());

    let Some(ls) = light.sample_li(&its.p, &its.n, &shape_p, &shape_n, shape_pdf_area) else {
        return ColorRgb::BLACK;
    };
    if ls.pdf <= 0.0 || ls.radiance.is_black() {
        return ColorRgb::BLACK;
    }
    if !scene.unoccluded(&its.p, &its.n, &ls.p, &ls.n) {
        return ColorRgb::BLACK;
    }

    let material = scene.material(its.shape);
    let cos_theta = its.n.dot(&ls.wi).abs();
    let f = material.brdf(wo, &ls.wi, &its.n) * cos_theta;
    if f.is_black() {
        return ColorRgb::BLACK;
    }

    let light_pdf = ls.pdf * select_pdf;
    let brdf_pdf = material.pdf(wo, &ls.wi, &its.n);
    let weight = power_heuristic(1.0, light_pdf, 1.0, brdf_pdf);
    f * ls.radiance * (weight / light_pdf)
}

/// Unidirectional path integrator (§4.9): next-event estimation at every
/// bounce, MIS-weighted against BSDF sampling for the emitter hits a BSDF
/// sample can also land on, Russian roulette past [`RR_START_BOUNCE`].
pub fn path_li(scene: &Scene, sampler: &mut Sampler, mut ray: Ray, max_depth: u32) -> ColorRgb {
    let mut l = ColorRgb::BLACK;
    let mut beta = ColorRgb::WHITE;
    let mut prev_bsdf_pdf = 1.0f32;

    for bounce in 0..max_depth {
        let Some(its) = scene.intersect(&ray) else {
            break;
        };
        let wo = (-ray.dir.into_inner()).normalize();

        if let Some(light) = scene.light(its.shape) {
            let le = light.l(&its.n, &wo);
            if !le.is_black() {
                let weight = if bounce == 0 {
                    1.0
                } else {
                    let light_pdf =
                        light.pdf_li(&its.p, &its.n, &ray) * scene.light_selector().pdf();
                    power_heuristic(1.0, prev_bsdf_pdf, 1.0, light_pdf)
                };
                l += beta * le * weight;
            }
        }

        l += beta * sample_ld(scene, sampler, &its, &wo);

        let material = scene.material(its.shape);
        let uc = sampler.sample_1d();
        let u = sampler.sample_2d();
        let Some(bs) = material.sample_brdf(&wo, &its.n, &its.tangent, uc, u) else {
            break;
        };
        if bs.f.is_black() || bs.pdf <= 0.0 {
            break;
        }

        let cos_theta = its.n.dot(&bs.wi).abs();
        beta *= bs.f * (cos_theta / bs.pdf);
        prev_bsdf_pdf = bs.pdf;

        if bounce >= RR_START_BOUNCE {
            let survival = beta.max_component().clamp(RR_MIN_SURVIVAL, 1.0);
            if sampler.sample_1d() > survival {
                break;
            }
            beta /= survival;
        }

        ray = its.spawn_ray(bs.wi);
    }

    l
}

/// Absolute shading normal as a color, one BVH query deep, no MIS (§4.9 AOVs).
pub fn geometry_li(scene: &Scene, ray: &Ray) -> ColorRgb {
    match scene.intersect(ray) {
        Some(its) => ColorRgb::new(its.n.x.abs(), its.n.y.abs(), its.n.z.abs()),
        None => ColorRgb::BLACK,
    }
}

/// The material's diffuse reflectance at the hit, one BVH query deep, no MIS
/// (§4.9 AOVs). There is no texture sampling in this material model, so this
/// stands in for the original's uv-sampled base color.
pub fn base_color_li(scene: &Scene, ray: &Ray) -> ColorRgb {
    match scene.intersect(ray) {
        Some(its) => scene.material(its.shape).diffuse,
        None => ColorRgb::BLACK,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_power_heuristic_used_by_sample_ld_is_normalized() {
        assert!(power_heuristic(1.0, 1.0, 1.0, 1.0) <= 1.0);
    }
}
