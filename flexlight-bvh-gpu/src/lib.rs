//! Serialized BVH layout shared by the tree builder and the traversal shader.

#![cfg_attr(target_arch = "spirv", no_std)]
#![allow(clippy::len_without_is_empty)]

mod bvh_ptr;
mod bvh_row;
mod bvh_view;

pub use self::bvh_ptr::*;
pub use self::bvh_row::*;
pub use self::bvh_view::*;

/// Maximum number of slots (child nodes or leaf elements) per serialized node.
pub const BVH_MAX_CHILDREN: usize = 4;

/// Number of `u32`s per row of the `bvh` array: kind + one id per slot.
pub const BVH_ROW_LEN: usize = 1 + BVH_MAX_CHILDREN;

/// Number of `f32`s per row of the `bounding_vertices` array: `min.xyz` and
/// `max.xyz` per slot.
pub const BOUNDING_ROW_LEN: usize = 6 * BVH_MAX_CHILDREN;

/// Value stored in unused slots.
pub const BVH_NO_CHILD: u32 = u32::MAX;

/// Row kind of a leaf; its slots reference elements (triangles, instances).
pub const BVH_KIND_LEAF: u32 = 0;

/// Row kind of an internal node; its slots reference other rows.
pub const BVH_KIND_INTERNAL: u32 = 1;
