use super::*;

#[repr(C)]
#[derive(Pod, Zeroable, Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    extents: [Point3; 2],
}

impl Aabb {
    #[inline]
    pub fn new() -> Self {
        Self {
            extents: [
                Vec3::repeat(f32::MAX).into(),
                Vec3::repeat(-f32::MAX).into(),
            ],
        }
    }

    #[inline]
    pub fn from_min_max(min: &Point3, max: &Point3) -> Self {
        Self {
            extents: [*min, *max],
        }
    }

    pub fn from_points<'a, Iter>(points: Iter) -> Self
    where
        Iter: IntoIterator<Item = &'a Point3>,
    {
        let mut aabb = Self::new();
        for point in points {
            aabb.extend(point);
        }
        aabb
    }

    #[inline]
    pub fn min(&self) -> Point3 {
        self.extents[0]
    }

    #[inline]
    pub fn max(&self) -> Point3 {
        self.extents[1]
    }

    #[inline]
    pub fn center(&self) -> Point3 {
        na::center(&self.min(), &self.max())
    }

    #[inline]
    pub fn extents(&self) -> Vec3 {
        self.max() - self.min()
    }

    /// `empty()` iff `max.x < min.x` (§3). The source this is modeled after has one
    /// occurrence of this check with no return statement; that bug is not reproduced.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.max().x < self.min().x
    }

    pub fn extend(&mut self, point: &Point3) {
        self.extents[0] = self.min().coords.inf(&point.coords).into();
        self.extents[1] = self.max().coords.sup(&point.coords).into();
    }

    pub fn merge(&mut self, other: &Aabb) {
        self.extents[0] = self.min().inf(&other.min());
        self.extents[1] = self.max().sup(&other.max());
    }

    pub fn merged(&self, other: &Aabb) -> Self {
        Self {
            extents: [self.min().inf(&other.min()), self.max().sup(&other.max())],
        }
    }

    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min().x <= other.max().x
            && self.max().x >= other.min().x
            && self.min().y <= other.max().y
            && self.max().y >= other.min().y
            && self.min().z <= other.max().z
            && self.max().z >= other.min().z
    }

    /// True argmax among (width, height, depth). The source this is modeled after
    /// has a bug where this always returns 0; that bug is not reproduced.
    pub fn max_axis(&self) -> usize {
        let e = self.extents();
        if e.x > e.y && e.x > e.z {
            0
        } else if e.y > e.z {
            1
        } else {
            2
        }
    }

    pub fn surface_area(&self) -> f32 {
        let e = self.extents();
        2.0 * (e.x * e.y + e.x * e.z + e.y * e.z)
    }

    pub fn half_surface_area(&self) -> f32 {
        let e = self.extents();
        e.x * e.y + e.x * e.z + e.y * e.z
    }

    /// Slab-method ray/AABB intersection test against `[ray.t_min, ray.t_max]`.
    pub fn hit(&self, ray: &Ray) -> bool {
        let mut t_min = ray.t_min;
        let mut t_max = ray.t_max;
        for axis in 0..3 {
            let inv_d = 1.0 / ray.dir[axis];
            let mut t0 = (self.min()[axis] - ray.origin[axis]) * inv_d;
            let mut t1 = (self.max()[axis] - ray.origin[axis]) * inv_d;
            if inv_d < 0.0 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_min = t_min.max(t0);
            t_max = t_max.min(t1);
            if t_max < t_min {
                return false;
            }
        }
        true
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_s1_aabb_hit_and_miss() {
        let aabb = Aabb::from_min_max(&point![0.0, 0.0, 0.0], &point![1.0, 1.0, 1.0]);
        let hit_ray = Ray::new(point![-1.0, 0.5, 0.5], normal!(1.0, 0.0, 0.0));
        assert!(aabb.hit(&hit_ray));
        let miss_ray = Ray::new(point![2.0, 0.5, 0.5], normal!(1.0, 0.0, 0.0));
        assert!(!aabb.hit(&miss_ray));
    }

    #[test]
    fn test_empty_aabb_invariant() {
        let empty = Aabb::new();
        assert!(empty.is_empty());
        let full = Aabb::from_min_max(&point![0.0, 0.0, 0.0], &point![1.0, 1.0, 1.0]);
        assert!(!full.is_empty());
    }

    #[test]
    fn test_max_axis_is_true_argmax() {
        let aabb = Aabb::from_min_max(&point![0.0, 0.0, 0.0], &point![1.0, 5.0, 2.0]);
        assert_eq!(aabb.max_axis(), 1);
    }
}
