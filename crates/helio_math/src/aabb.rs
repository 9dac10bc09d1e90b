use crate::{Interval, Vec3};

/// Axis-aligned bounding box stored as min/max corner points.
///
/// Used both for BVH pruning and for the per-axis min/max combination rules
/// of boolean solids.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Create an AABB from two corner points (in any order).
    pub fn from_points(a: Vec3, b: Vec3) -> Self {
        let mut aabb = Self {
            min: a.min(b),
            max: a.max(b),
        };
        aabb.pad_to_minimums();
        aabb
    }

    /// Grow this box to also enclose `other`.
    pub fn extend(&mut self, other: &Aabb) {
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }

    /// The smallest box enclosing both inputs.
    pub fn surrounding(a: &Aabb, b: &Aabb) -> Self {
        Self {
            min: a.min.min(b.min),
            max: a.max.max(b.max),
        }
    }

    /// Test whether a ray hits this box within the given parameter interval.
    ///
    /// Slab method, one axis at a time.
    pub fn hit(&self, origin: Vec3, direction: Vec3, mut ray_t: Interval) -> bool {
        for axis in 0..3 {
            let adinv = 1.0 / direction[axis];
            let mut t0 = (self.min[axis] - origin[axis]) * adinv;
            let mut t1 = (self.max[axis] - origin[axis]) * adinv;
            if adinv < 0.0 {
                std::mem::swap(&mut t0, &mut t1);
            }
            ray_t.min = t0.max(ray_t.min);
            ray_t.max = t1.min(ray_t.max);
            if ray_t.max <= ray_t.min {
                return false;
            }
        }
        true
    }

    /// Returns the center point of the box.
    ///
    /// Meaningless for boxes with infinite corners; check [`Self::is_finite`]
    /// first when the result feeds arithmetic.
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Whether both corners are finite.
    pub fn is_finite(&self) -> bool {
        self.min.is_finite() && self.max.is_finite()
    }

    /// Returns the index (0=X, 1=Y, 2=Z) of the axis with the longest extent.
    pub fn longest_axis(&self) -> usize {
        let size = self.max - self.min;
        if size.x > size.y && size.x > size.z {
            0
        } else if size.y > size.z {
            1
        } else {
            2
        }
    }

    /// Move the box by an offset vector.
    pub fn translate(&self, offset: Vec3) -> Aabb {
        Aabb {
            min: self.min + offset,
            max: self.max + offset,
        }
    }

    /// Pad near-degenerate axes so flat geometry still has volume.
    fn pad_to_minimums(&mut self) {
        let delta = 0.0001;
        for axis in 0..3 {
            if self.max[axis] - self.min[axis] < delta {
                self.min[axis] -= delta / 2.0;
                self.max[axis] += delta / 2.0;
            }
        }
    }

    /// A box that contains nothing (extend() from here works).
    pub const EMPTY: Aabb = Aabb {
        min: Vec3::INFINITY,
        max: Vec3::NEG_INFINITY,
    };

    /// A box that contains everything.
    pub const UNIVERSE: Aabb = Aabb {
        min: Vec3::NEG_INFINITY,
        max: Vec3::INFINITY,
    };
}
