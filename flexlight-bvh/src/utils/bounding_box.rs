use std::ops::{Add, AddAssign};

use glam::{vec3, Affine3A, Vec3};

use crate::Axis;

/// Axis-aligned bounding box.
///
/// A default (empty) box has `min = +inf` and `max = -inf`, so that folding
/// any point into it yields a box around just that point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    min: Vec3,
    max: Vec3,
}

impl BoundingBox {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    pub fn min(&self) -> Vec3 {
        self.min
    }

    pub fn max(&self) -> Vec3 {
        self.max
    }

    pub fn extent(&self) -> Vec3 {
        self.max() - self.min()
    }

    pub fn center(&self) -> Vec3 {
        (self.min() + self.max()) * 0.5
    }

    pub fn half_area(&self) -> f32 {
        if !self.is_set() {
            return 0.0;
        }

        let extent = self.extent();

        extent.x * extent.y + extent.y * extent.z + extent.z * extent.x
    }

    /// Returns whether at least one point has been folded into this box.
    pub fn is_set(&self) -> bool {
        self.min.cmple(self.max).all()
    }

    pub fn is_finite(&self) -> bool {
        self.min.is_finite() && self.max.is_finite()
    }

    /// Returns the axis with the largest extent; on ties the earlier axis (in
    /// x, y, z order) wins.
    pub fn longest_axis(&self) -> Axis {
        let extent = self.extent();

        Axis::all()
            .fold(None, |best: Option<Axis>, axis| match best {
                Some(best) if extent[best] >= extent[axis] => Some(best),
                _ => Some(axis),
            })
            .unwrap_or(Axis::X)
    }

    /// Cuts the box with a plane perpendicular to `axis`, returning the lower
    /// and the upper half; both halves share the plane.
    pub fn split(&self, axis: Axis, at: f32) -> (Self, Self) {
        let mut lower_max = self.max;
        let mut upper_min = self.min;

        lower_max[axis] = at;
        upper_min[axis] = at;

        (Self::new(self.min, lower_max), Self::new(upper_min, self.max))
    }

    /// Grows the box by `bias` on all six faces.
    pub fn biased(&self, bias: f32) -> Self {
        if !self.is_set() {
            return *self;
        }

        Self::new(self.min - Vec3::splat(bias), self.max + Vec3::splat(bias))
    }

    /// Inclusive point test, with `bias` tolerance on every face.
    pub fn contains(&self, point: Vec3, bias: f32) -> bool {
        let min = self.min - Vec3::splat(bias);
        let max = self.max + Vec3::splat(bias);

        min.cmple(point).all() && point.cmple(max).all()
    }

    /// Returns whether `other` lies entirely inside this box.
    ///
    /// Since both boxes are axis-aligned, testing `other`'s corners is
    /// equivalent to testing every point `other` was built from.
    pub fn contains_box(&self, other: &Self, bias: f32) -> bool {
        self.contains(other.min, bias) && self.contains(other.max, bias)
    }

    /// Returns whether both boxes share at least one point.
    pub fn overlaps(&self, other: &Self, bias: f32) -> bool {
        let min = self.min - Vec3::splat(bias);
        let max = self.max + Vec3::splat(bias);

        min.cmple(other.max).all() && other.min.cmple(max).all()
    }

    /// Transforms all eight corners of the box and returns a box around them.
    pub fn with_transform(&self, transform: Affine3A) -> Self {
        (0..8)
            .map(|i| {
                let point = vec3(
                    if i & 1 > 0 { self.max.x } else { self.min.x },
                    if i & 2 > 0 { self.max.y } else { self.min.y },
                    if i & 4 > 0 { self.max.z } else { self.min.z },
                );

                transform.transform_point3(point)
            })
            .collect()
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::new(Vec3::splat(f32::INFINITY), Vec3::splat(f32::NEG_INFINITY))
    }
}

impl Add<Vec3> for BoundingBox {
    type Output = Self;

    fn add(mut self, rhs: Vec3) -> Self::Output {
        self += rhs;
        self
    }
}

impl AddAssign<Vec3> for BoundingBox {
    fn add_assign(&mut self, rhs: Vec3) {
        self.min = self.min.min(rhs);
        self.max = self.max.max(rhs);
    }
}

impl FromIterator<Vec3> for BoundingBox {
    fn from_iter<T>(iter: T) -> Self
    where
        T: IntoIterator<Item = Vec3>,
    {
        let mut this = Self::default();

        for item in iter {
            this += item;
        }

        this
    }
}

impl Add<Self> for BoundingBox {
    type Output = Self;

    fn add(mut self, rhs: Self) -> Self::Output {
        self += rhs;
        self
    }
}

impl AddAssign<Self> for BoundingBox {
    fn add_assign(&mut self, rhs: Self) {
        if rhs.is_set() {
            *self += rhs.min;
            *self += rhs.max;
        }
    }
}

impl FromIterator<Self> for BoundingBox {
    fn from_iter<T>(iter: T) -> Self
    where
        T: IntoIterator<Item = Self>,
    {
        let mut this = Self::default();

        for item in iter {
            this += item;
        }

        this
    }
}
