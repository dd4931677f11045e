use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use crate::{
    BVH_KIND_INTERNAL, BVH_KIND_LEAF, BVH_MAX_CHILDREN, BVH_NO_CHILD,
};

/// One row of the `bvh` array.
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
#[cfg_attr(not(target_arch = "spirv"), derive(Debug, PartialEq, Eq))]
pub struct BvhRow {
    pub kind: u32,
    pub slots: [u32; BVH_MAX_CHILDREN],
}

impl BvhRow {
    pub fn internal() -> Self {
        Self {
            kind: BVH_KIND_INTERNAL,
            slots: [BVH_NO_CHILD; BVH_MAX_CHILDREN],
        }
    }

    pub fn leaf() -> Self {
        Self {
            kind: BVH_KIND_LEAF,
            slots: [BVH_NO_CHILD; BVH_MAX_CHILDREN],
        }
    }

    pub fn is_internal(&self) -> bool {
        self.kind == BVH_KIND_INTERNAL
    }

    pub fn is_leaf(&self) -> bool {
        self.kind == BVH_KIND_LEAF
    }

    /// Number of occupied slots; slots are always filled front-to-back.
    pub fn len(&self) -> usize {
        let mut len = 0;

        while len < BVH_MAX_CHILDREN && self.slots[len] != BVH_NO_CHILD {
            len += 1;
        }

        len
    }
}

/// One row of the `bounding_vertices` array.
///
/// Slot `i` holds the bounding box of whatever slot `i` of the matching
/// [`BvhRow`] references.
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
#[cfg_attr(not(target_arch = "spirv"), derive(Debug, PartialEq))]
pub struct BoundingRow {
    pub slots: [[f32; 6]; BVH_MAX_CHILDREN],
}

impl BoundingRow {
    pub fn set(&mut self, slot: usize, min: Vec3, max: Vec3) {
        self.slots[slot] = [min.x, min.y, min.z, max.x, max.y, max.z];
    }

    pub fn min(&self, slot: usize) -> Vec3 {
        let [x, y, z, ..] = self.slots[slot];

        Vec3::new(x, y, z)
    }

    pub fn max(&self, slot: usize) -> Vec3 {
        let [.., x, y, z] = self.slots[slot];

        Vec3::new(x, y, z)
    }
}
