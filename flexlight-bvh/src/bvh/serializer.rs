use std::slice;

use bytemuck::Zeroable;

use crate::gpu::{BoundingRow, BvhRow, BOUNDING_ROW_LEN, BVH_ROW_LEN};
use crate::{measure, Bvh, BvhElement, BvhTree};

/// Tree flattened into the two arrays consumed by the traversal shader.
///
/// Both arrays consist of rows, one per node or leaf; row `k` of each array
/// describes the node with id `k`, the root being row 0:
///
/// - `bvh` rows are [`BvhRow`]s: `[kind, slot0, slot1, slot2, slot3]`, where
///   `kind` is `1` for nodes (slots reference children rows) and `0` for
///   leaves (slots hold element ids); unused slots are
///   [`BVH_NO_CHILD`](crate::gpu::BVH_NO_CHILD).
///
/// - `bounding_vertices` rows are [`BoundingRow`]s: for each slot, the
///   `min.xyz, max.xyz` of whatever that slot references; unused slots are
///   zero.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BvhArrays {
    pub bounding_vertices: Vec<f32>,
    pub bvh: Vec<u32>,
}

impl BvhArrays {
    /// Number of rows.
    pub fn len(&self) -> usize {
        self.bvh.len() / BVH_ROW_LEN
    }

    pub fn is_empty(&self) -> bool {
        self.bvh.is_empty()
    }

    pub fn clear(&mut self) {
        self.bounding_vertices.clear();
        self.bvh.clear();
    }

    fn push(&mut self, row: BvhRow, bounds: BoundingRow) {
        self.bvh
            .extend_from_slice(bytemuck::cast_slice(slice::from_ref(&row)));

        self.bounding_vertices
            .extend_from_slice(bytemuck::cast_slice(slice::from_ref(&bounds)));
    }
}

impl<T> Bvh<T>
where
    T: BvhElement,
{
    pub fn to_arrays(&self) -> BvhArrays {
        let mut out = BvhArrays::default();

        self.serialize(&mut out);
        out
    }

    /// Serializes the tree into `out`, replacing whatever was there.
    pub fn serialize(&self, out: &mut BvhArrays) {
        measure("bvh-serialize", || {
            out.clear();
            out.bvh.reserve(self.len() * BVH_ROW_LEN);
            out.bounding_vertices.reserve(self.len() * BOUNDING_ROW_LEN);

            self.walk(|tree| {
                assert_eq!(
                    out.len(),
                    tree.id() as usize,
                    "node's id doesn't match its row"
                );

                let (row, bounds) = serialize_tree(tree);

                out.push(row, bounds);
            });
        });

        log::debug!(
            "BVH serialized; rows = {}, bvh = {} B, bounding-vertices = {} B",
            out.len(),
            out.bvh.len() * 4,
            out.bounding_vertices.len() * 4,
        );
    }
}

fn serialize_tree<T>(tree: &BvhTree<T>) -> (BvhRow, BoundingRow)
where
    T: BvhElement,
{
    let mut bounds = BoundingRow::zeroed();

    let row = match tree {
        BvhTree::Node(node) => {
            let mut row = BvhRow::internal();

            for (slot, child) in node.iter().enumerate() {
                let child_bounds = child.bounds();

                row.slots[slot] = child.id();
                bounds.set(slot, child_bounds.min(), child_bounds.max());
            }

            row
        }

        BvhTree::Leaf(leaf) => {
            let mut row = BvhRow::leaf();

            for (slot, element) in leaf.iter().enumerate() {
                let element_bounds = element.bounds();

                row.slots[slot] = element.id();
                bounds.set(slot, element_bounds.min(), element_bounds.max());
            }

            row
        }
    };

    (row, bounds)
}

/// Decodes every row of `arrays` and checks it against the node whose id
/// addresses it.
#[cfg(test)]
pub(crate) fn assert_rows_match<T>(bvh: &Bvh<T>, arrays: &BvhArrays)
where
    T: BvhElement,
{
    use glam::Vec3;

    use crate::gpu::{BvhPtr, BvhView, BVH_MAX_CHILDREN, BVH_NO_CHILD};

    let view = BvhView::new(&arrays.bvh, &arrays.bounding_vertices).unwrap();

    assert_eq!(bvh.len(), view.len());

    bvh.walk(|tree| {
        let ptr = BvhPtr::new(tree.id());
        let row = view.row(ptr);
        let bounds = view.bounds(ptr);

        let expected: Vec<_> = match tree {
            BvhTree::Node(node) => {
                assert!(row.is_internal(), "row #{} isn't a node", tree.id());

                node.iter()
                    .map(|child| (child.id(), child.bounds()))
                    .collect()
            }

            BvhTree::Leaf(leaf) => {
                assert!(row.is_leaf(), "row #{} isn't a leaf", tree.id());

                leaf.iter()
                    .map(|element| (element.id(), element.bounds()))
                    .collect()
            }
        };

        assert_eq!(expected.len(), row.len());

        for slot in 0..BVH_MAX_CHILDREN {
            if let Some((id, expected_bounds)) = expected.get(slot) {
                assert_eq!(*id, row.slots[slot]);
                assert_eq!(expected_bounds.min(), bounds.min(slot));
                assert_eq!(expected_bounds.max(), bounds.max(slot));
            } else {
                assert_eq!(BVH_NO_CHILD, row.slots[slot]);
                assert_eq!(Vec3::ZERO, bounds.min(slot));
                assert_eq!(Vec3::ZERO, bounds.max(slot));
            }
        }
    });
}
