use glam::Vec3;

use crate::{BoundingBox, BvhElement};

/// Triangle of a mesh prototype.
///
/// `id` is the triangle's index within its prototype; the path tracer adds
/// the prototype's global triangle offset on its own.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Triangle {
    pub a: Vec3,
    pub b: Vec3,
    pub c: Vec3,
    pub id: u32,
}

impl Triangle {
    pub fn new(a: Vec3, b: Vec3, c: Vec3, id: u32) -> Self {
        Self { a, b, c, id }
    }

    pub fn vertices(&self) -> [Vec3; 3] {
        [self.a, self.b, self.c]
    }

    pub fn center(&self) -> Vec3 {
        (self.a + self.b + self.c) / 3.0
    }

    pub fn area(&self) -> f32 {
        (self.b - self.a).cross(self.c - self.a).length() * 0.5
    }
}

impl BvhElement for Triangle {
    fn id(&self) -> u32 {
        self.id
    }

    fn bounds(&self) -> BoundingBox {
        self.vertices().into_iter().collect()
    }

    fn is_finite(&self) -> bool {
        self.vertices().iter().all(|vertex| vertex.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use glam::vec3;

    use super::*;

    #[test]
    fn geometry() {
        let target = Triangle::new(
            vec3(0.0, 0.0, 0.0),
            vec3(2.0, 0.0, 0.0),
            vec3(0.0, 2.0, 0.0),
            3,
        );

        assert_eq!(3, target.id());
        assert_relative_eq!(2.0, target.area());
        assert_relative_eq!(vec3(2.0 / 3.0, 2.0 / 3.0, 0.0), target.center());
        assert_eq!(Vec3::ZERO, target.bounds().min());
        assert_eq!(vec3(2.0, 2.0, 0.0), target.bounds().max());
        assert!(target.is_finite());
    }

    #[test]
    fn non_finite() {
        let target = Triangle::new(
            vec3(0.0, f32::NAN, 0.0),
            vec3(2.0, 0.0, 0.0),
            vec3(0.0, 2.0, 0.0),
            0,
        );

        assert!(!target.is_finite());
    }
}
