use super::*;

/// Radiance importance sample returned by [`Camera::sample_li`] for BDPT light
/// subpaths connecting directly to the lens (§4.10).
pub struct CameraLiSample {
    pub importance: ColorRgb,
    pub wi: Normal,
    pub p: Point3,
    pub pdf: f32,
}

/// A pinhole camera (§4.3), grounded in the original's `Camera` (eye/lookat/up,
/// vertical fov, near/far) but expressed directly in terms of its basis vectors
/// rather than a sample/camera/world matrix stack.
#[derive(Clone, Debug)]
pub struct Camera {
    eye: Point3,
    forward: Normal,
    right: Normal,
    up: Normal,
    width: u32,
    height: u32,
    half_width: f32,
    half_height: f32,
    near: f32,
    far: f32,
}

impl Camera {
    pub const DEFAULT_NEAR: f32 = 0.01;
    pub const DEFAULT_FAR: f32 = 10000.0;

    pub fn new(
        eye: Point3,
        lookat: Point3,
        up: Vec3,
        fov_y_degrees: f32,
        width: u32,
        height: u32,
    ) -> Self {
        let forward = normal!(lookat - eye);
        let right = normal!(forward.cross(&up));
        let up = normal!(right.cross(&forward));

        let aspect = width as f32 / height as f32;
        let half_height = (fov_y_degrees.to_radians() * 0.5).tan();
        let half_width = aspect * half_height;

        Self {
            eye,
            forward,
            right,
            up,
            width,
            height,
            half_width,
            half_height,
            near: Self::DEFAULT_NEAR,
            far: Self::DEFAULT_FAR,
        }
    }

    pub fn eye(&self) -> Point3 {
        self.eye
    }

    pub fn forward(&self) -> Normal {
        self.forward
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Area of the image rectangle at one unit of distance along `forward`,
    /// used by [`Camera::le`]/[`Camera::pdf_le`] (eq. 16.4 in PBRT-v3).
    fn sample_area(&self) -> f32 {
        4.0 * self.half_width * self.half_height
    }

    /// Returns the camera-space direction (not yet normalized to a ray) for a
    /// continuous film-plane sample `(sx, sy)` in `[0, width] x [0, height]`.
    fn film_to_direction(&self, sx: f32, sy: f32) -> Vec3 {
        let ndc_x = (2.0 * sx / self.width as f32 - 1.0) * self.half_width;
        let ndc_y = (1.0 - 2.0 * sy / self.height as f32) * self.half_height;
        ndc_x * self.right.into_inner() + ndc_y * self.up.into_inner() + self.forward.into_inner()
    }

    /// Generates the primary ray through film-plane sample `(sx, sy)`.
    pub fn sample_ray(&self, sx: f32, sy: f32) -> Ray {
        let dir = normal!(self.film_to_direction(sx, sy));
        Ray::with_range(self.eye, dir, self.near, self.far)
    }

    /// Projects a world point onto the film plane; `None` if it falls outside
    /// the visible frustum (used by BDPT's `s == 1` camera-connection strategy).
    pub fn project(&self, p: &Point3) -> Option<Point2> {
        let v = p - self.eye;
        let z = v.dot(&self.forward);
        if z <= self.near || z > self.far {
            return None;
        }
        let x = v.dot(&self.right) / z;
        let y = v.dot(&self.up) / z;
        if x.abs() > self.half_width || y.abs() > self.half_height {
            return None;
        }
        let sx = (x / self.half_width * 0.5 + 0.5) * self.width as f32;
        let sy = (1.0 - (y / self.half_height * 0.5 + 0.5)) * self.height as f32;
        Some(point![sx, sy])
    }

    /// Camera importance `W_e(w)` for a direction leaving the lens (eq. 16.4,
    /// PBRT-v3, "The Path-Space Measurement Equation").
    pub fn le(&self, w: &Normal) -> ColorRgb {
        let cos_theta = self.forward.dot(w);
        if cos_theta <= 0.0 {
            return ColorRgb::BLACK;
        }
        let cos_theta2 = cos_theta * cos_theta;
        let value = 1.0 / (self.sample_area() * cos_theta2 * cos_theta2);
        ColorRgb::new(value, value, value)
    }

    /// Solid-angle pdf of `ray.dir` under the camera's importance distribution.
    pub fn pdf_le(&self, dir: &Normal) -> f32 {
        let cos_theta = self.forward.dot(dir);
        if cos_theta <= 0.0 {
            return 0.0;
        }
        1.0 / (self.sample_area() * cos_theta * cos_theta * cos_theta)
    }

    /// Samples the lens point visible from `p`, for BDPT light subpaths that
    /// connect directly to the camera (`t == 1`).
    pub fn sample_li(&self, p: &Point3) -> CameraLiSample {
        let d = self.eye - p;
        let dist = d.norm();
        let wi = normal!(-d);
        let cos_theta = self.forward.dot(&wi).abs();
        let pdf = dist * dist / cos_theta.max(1e-8);
        let importance = self.le(&wi);
        CameraLiSample {
            importance,
            wi,
            p: self.eye,
            pdf,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn test_camera() -> Camera {
        Camera::new(
            point![0.0, 0.0, -5.0],
            point![0.0, 0.0, 0.0],
            vector![0.0, 1.0, 0.0],
            40.0,
            640,
            480,
        )
    }

    #[test]
    fn test_center_ray_points_at_forward() {
        let camera = test_camera();
        let ray = camera.sample_ray(320.0, 240.0);
        assert_abs_diff_eq!(ray.dir.dot(&camera.forward()), 1.0, epsilon = 1e-3);
    }

    #[test]
    fn test_project_roundtrips_center() {
        let camera = test_camera();
        let p = camera.eye() + 5.0 * camera.forward().into_inner();
        let projected = camera.project(&p).expect("center should project");
        assert_abs_diff_eq!(projected.x, 320.0, epsilon = 1.0);
        assert_abs_diff_eq!(projected.y, 240.0, epsilon = 1.0);
    }

    #[test]
    fn test_le_zero_behind_camera() {
        let camera = test_camera();
        let behind = normal!(-camera.forward().into_inner());
        assert!(camera.le(&behind).is_black());
    }

    #[test]
    fn test_sample_li_nonzero_for_centered_point() {
        let camera = test_camera();
        let p = camera.eye() + 5.0 * camera.forward().into_inner();
        let sample = camera.sample_li(&p);
        assert!(!sample.importance.is_black());
        assert!(sample.pdf > 0.0);
    }
}
