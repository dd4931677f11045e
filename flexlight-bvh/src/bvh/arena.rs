use std::hash::Hash;

use bytemuck::Zeroable;
use derivative::Derivative;
use fxhash::FxHashMap;

use crate::gpu::{
    BoundingRow, BvhRow, BvhView, BOUNDING_ROW_LEN, BVH_ROW_LEN,
};
use crate::{BvhArrays, Error, Result};

/// Where a tree has been placed inside [`BvhArena`], in rows.
///
/// Rows keep their tree-local child references, so a consumer walking the
/// arena has to add `offset` to every pointer it follows (see
/// [`BvhPtr::offset()`](crate::gpu::BvhPtr::offset)).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BvhPlacement {
    pub offset: u32,
    pub len: u32,
}

impl BvhPlacement {
    /// Row right past the placement.
    pub fn end(&self) -> u32 {
        self.offset + self.len
    }
}

/// Shared buffer holding many serialized trees (e.g. all mesh prototypes'
/// triangle trees), so that they can be uploaded as a single pair of arrays.
///
/// Rows freed by [`Self::remove()`] get reused by subsequent insertions.
#[derive(Derivative)]
#[derivative(Debug, Default(bound = ""))]
pub struct BvhArena<K> {
    #[derivative(Debug = "ignore")]
    bvh: Vec<u32>,
    #[derivative(Debug = "ignore")]
    bounding_vertices: Vec<f32>,
    free: FreeRows,
    placements: FxHashMap<K, BvhPlacement>,
}

impl<K> BvhArena<K>
where
    K: Hash + Eq,
{
    /// Copies `arrays` into the arena, replacing whatever tree was stored
    /// under `key` before.
    ///
    /// Fails without touching the arena if `arrays` aren't made of the same
    /// number of whole rows.
    pub fn insert(&mut self, key: K, arrays: &BvhArrays) -> Result<BvhPlacement> {
        let rows = BvhView::new(&arrays.bvh, &arrays.bounding_vertices)
            .ok_or(Error::MalformedArrays {
                bvh: arrays.bvh.len(),
                bounding_vertices: arrays.bounding_vertices.len(),
            })?
            .len();

        let len = u32::try_from(rows)
            .map_err(|_| Error::TooManyElements { count: rows })?;

        self.remove(&key);

        let placement = if len == 0 {
            BvhPlacement { offset: 0, len: 0 }
        } else if let Some(placement) = self.free.reserve(len) {
            placement
        } else {
            self.grow(len)?
        };

        self.write(placement, &arrays.bvh, &arrays.bounding_vertices);
        self.placements.insert(key, placement);

        log::trace!(
            "Tree placed in arena; offset = {}, len = {}",
            placement.offset,
            placement.len
        );

        Ok(placement)
    }

    /// Frees rows of the tree stored under `key`, returning where it used to
    /// live.
    pub fn remove(&mut self, key: &K) -> Option<BvhPlacement> {
        let placement = self.placements.remove(key)?;

        // Freed rows stay well-formed empty leaves
        let (bvh, bounding_vertices) = empty_rows(placement.len as usize);

        self.write(placement, &bvh, &bounding_vertices);
        self.free.release(placement);

        Some(placement)
    }

    pub fn placement(&self, key: &K) -> Option<BvhPlacement> {
        self.placements.get(key).copied()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.placements.contains_key(key)
    }
}

impl<K> BvhArena<K> {
    pub fn bvh(&self) -> &[u32] {
        &self.bvh
    }

    pub fn bounding_vertices(&self) -> &[f32] {
        &self.bounding_vertices
    }

    /// Number of rows, including free ones.
    pub fn len(&self) -> usize {
        self.bvh.len() / BVH_ROW_LEN
    }

    pub fn is_empty(&self) -> bool {
        self.bvh.is_empty()
    }

    /// Number of rows not occupied by any tree.
    pub fn free_rows(&self) -> u32 {
        self.free.len()
    }

    /// Makes room for `len` rows at the end of the buffers; if the buffers
    /// already end with free rows, those get reused first.
    fn grow(&mut self, len: u32) -> Result<BvhPlacement> {
        let end = self.len();

        let Some(end) = u32::try_from(end)
            .ok()
            .filter(|end| end.checked_add(len).is_some())
        else {
            return Err(Error::TooManyElements {
                count: end + len as usize,
            });
        };

        let tail = self.free.take_tail(end);
        let missing = (len - tail) as usize;
        let (bvh, bounding_vertices) = empty_rows(missing);

        self.bvh.extend(bvh);
        self.bounding_vertices.extend(bounding_vertices);

        Ok(BvhPlacement {
            offset: end - tail,
            len,
        })
    }

    fn write(&mut self, at: BvhPlacement, bvh: &[u32], bounding_vertices: &[f32]) {
        let offset = at.offset as usize;
        let len = at.len as usize;

        self.bvh[offset * BVH_ROW_LEN..][..len * BVH_ROW_LEN]
            .copy_from_slice(bvh);

        self.bounding_vertices[offset * BOUNDING_ROW_LEN..]
            [..len * BOUNDING_ROW_LEN]
            .copy_from_slice(bounding_vertices);
    }
}

fn empty_rows(len: usize) -> (Vec<u32>, Vec<f32>) {
    let bvh = vec![BvhRow::leaf(); len];
    let bounding_vertices = vec![BoundingRow::zeroed(); len];

    (
        bytemuck::cast_slice::<BvhRow, u32>(&bvh).to_vec(),
        bytemuck::cast_slice::<BoundingRow, f32>(&bounding_vertices).to_vec(),
    )
}

/// Free row ranges of the arena, sorted by offset; neighbouring ranges are
/// merged as soon as they're released, so no two ranges ever touch.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct FreeRows {
    ranges: Vec<BvhPlacement>,
}

impl FreeRows {
    fn release(&mut self, rows: BvhPlacement) {
        if rows.len == 0 {
            return;
        }

        let idx = self
            .ranges
            .partition_point(|range| range.offset < rows.offset);

        self.ranges.insert(idx, rows);

        if let Some(next) = self.ranges.get(idx + 1).copied() {
            if self.ranges[idx].end() == next.offset {
                self.ranges[idx].len += next.len;
                self.ranges.remove(idx + 1);
            }
        }

        if idx > 0 && self.ranges[idx - 1].end() == self.ranges[idx].offset {
            self.ranges[idx - 1].len += self.ranges[idx].len;
            self.ranges.remove(idx);
        }
    }

    /// Carves `len` rows out of the first range big enough to hold them.
    fn reserve(&mut self, len: u32) -> Option<BvhPlacement> {
        let idx = self.ranges.iter().position(|range| range.len >= len)?;
        let range = &mut self.ranges[idx];

        let rows = BvhPlacement {
            offset: range.offset,
            len,
        };

        range.offset += len;
        range.len -= len;

        if range.len == 0 {
            self.ranges.remove(idx);
        }

        Some(rows)
    }

    /// Removes the range ending exactly at `end` (if there's one) and returns
    /// its length.
    fn take_tail(&mut self, end: u32) -> u32 {
        match self.ranges.last() {
            Some(last) if last.end() == end => {
                self.ranges.pop().map_or(0, |last| last.len)
            }
            _ => 0,
        }
    }

    fn len(&self) -> u32 {
        self.ranges.iter().map(|range| range.len).sum()
    }
}
