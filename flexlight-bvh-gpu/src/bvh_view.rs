use crate::{BoundingRow, BvhPtr, BvhRow};

/// Read-only view over serialized BVH arrays, addressed the way a traversal
/// kernel addresses them.
#[derive(Clone, Copy)]
pub struct BvhView<'a> {
    rows: &'a [BvhRow],
    bounds: &'a [BoundingRow],
}

impl<'a> BvhView<'a> {
    /// Returns `None` if either array is not a whole number of rows or if
    /// both arrays don't have the same number of rows.
    pub fn new(bvh: &'a [u32], bounding_vertices: &'a [f32]) -> Option<Self> {
        let rows: &[BvhRow] = bytemuck::try_cast_slice(bvh).ok()?;
        let bounds: &[BoundingRow] =
            bytemuck::try_cast_slice(bounding_vertices).ok()?;

        if rows.len() != bounds.len() {
            return None;
        }

        Some(Self { rows, bounds })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn row(&self, ptr: BvhPtr) -> BvhRow {
        self.rows[ptr.get() as usize]
    }

    pub fn bounds(&self, ptr: BvhPtr) -> BoundingRow {
        self.bounds[ptr.get() as usize]
    }
}
