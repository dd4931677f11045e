use glam::{Affine3A, Vec3};

use crate::{BoundingBox, BvhElement, INSTANCE_BIAS};

/// Placement of a mesh prototype in the scene, as seen by the instance tree.
pub trait SceneInstance {
    /// Untransformed bounding box of the instance's prototype.
    fn local_bounds(&self) -> BoundingBox;

    /// Rotation/scale matrix plus translation of the instance.
    fn transform(&self) -> Affine3A;
}

impl<T> SceneInstance for &T
where
    T: SceneInstance,
{
    fn local_bounds(&self) -> BoundingBox {
        T::local_bounds(self)
    }

    fn transform(&self) -> Affine3A {
        T::transform(self)
    }
}

/// Scene instance together with its world-space bounding box and its
/// sequential id.
#[derive(Clone, Debug)]
pub struct IndexedInstance<I> {
    pub instance: I,
    pub bounds: BoundingBox,
    pub id: u32,
}

impl<I> IndexedInstance<I>
where
    I: SceneInstance,
{
    pub fn new(instance: I, id: u32) -> Self {
        let transform = instance.transform();

        // NaNs would get silently swallowed by min/max while folding corners
        let bounds = if transform.is_finite() {
            instance
                .local_bounds()
                .with_transform(transform)
                .biased(INSTANCE_BIAS)
        } else {
            BoundingBox::new(Vec3::NAN, Vec3::NAN)
        };

        Self {
            instance,
            bounds,
            id,
        }
    }
}

impl<I> IndexedInstance<I> {
    /// Surface-area estimate of the world-space bounding box.
    pub fn area(&self) -> f32 {
        2.0 * self.bounds.half_area()
    }
}

impl<I> BvhElement for IndexedInstance<I> {
    fn id(&self) -> u32 {
        self.id
    }

    fn bounds(&self) -> BoundingBox {
        self.bounds
    }

    fn is_finite(&self) -> bool {
        self.bounds.is_set() && self.bounds.is_finite()
    }
}
