use super::*;

#[derive(Clone, Copy, Debug)]
pub struct Ray {
    pub origin: Point3,
    pub dir: Normal,
    pub dir_inv: Vec3,
    pub t_min: f32,
    pub t_max: f32,
}

impl Ray {
    pub fn new(origin: Point3, dir: Normal) -> Self {
        Self::with_range(origin, dir, 1e-4, f32::INFINITY)
    }

    pub fn with_range(origin: Point3, dir: Normal, t_min: f32, t_max: f32) -> Self {
        let d = dir.into_inner();
        Self {
            origin,
            dir,
            dir_inv: vector![1.0 / d.x, 1.0 / d.y, 1.0 / d.z],
            t_min,
            t_max,
        }
    }

    pub fn at(&self, t: f32) -> Point3 {
        self.origin + t * self.dir.into_inner()
    }
}
