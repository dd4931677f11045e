use std::slice;

use crate::{BoundingBox, BvhElement, TraversalOrder, BVH_MAX_LEAVES_PER_NODE};

/// Leaf of the tree, holding up to [`BVH_MAX_LEAVES_PER_NODE`] elements.
#[derive(Clone, Debug)]
pub struct BvhLeaf<T> {
    pub(crate) children: Vec<T>,
    pub(crate) bounds: BoundingBox,
    pub(crate) id: u32,
}

impl<T> BvhLeaf<T> {
    pub fn children(&self) -> &[T] {
        &self.children
    }

    pub fn bounds(&self) -> BoundingBox {
        self.bounds
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn iter(&self) -> slice::Iter<'_, T> {
        self.children.iter()
    }
}

impl<'a, T> IntoIterator for &'a BvhLeaf<T> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Internal node of the tree.
///
/// After a regular split the children are, in order: elements from below the
/// splitting plane, elements straddling it, elements from above it (empty
/// groups are skipped). After a forced fan-out there are up to four children
/// of roughly equal size.
#[derive(Clone, Debug)]
pub struct BvhNode<T> {
    pub(crate) children: Vec<BvhTree<T>>,
    pub(crate) bounds: BoundingBox,
    pub(crate) id: u32,
}

impl<T> BvhNode<T> {
    pub fn children(&self) -> &[BvhTree<T>] {
        &self.children
    }

    /// Union of the children's bounding boxes.
    pub fn bounds(&self) -> BoundingBox {
        self.bounds
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn iter(&self) -> slice::Iter<'_, BvhTree<T>> {
        self.children.iter()
    }
}

impl<'a, T> IntoIterator for &'a BvhNode<T> {
    type Item = &'a BvhTree<T>;
    type IntoIter = slice::Iter<'a, BvhTree<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[derive(Clone, Debug)]
pub enum BvhTree<T> {
    Leaf(BvhLeaf<T>),
    Node(BvhNode<T>),
}

impl<T> BvhTree<T> {
    pub fn bounds(&self) -> BoundingBox {
        match self {
            BvhTree::Leaf(leaf) => leaf.bounds,
            BvhTree::Node(node) => node.bounds,
        }
    }

    pub fn id(&self) -> u32 {
        match self {
            BvhTree::Leaf(leaf) => leaf.id,
            BvhTree::Node(node) => node.id,
        }
    }

    pub(crate) fn set_id(&mut self, id: u32) {
        match self {
            BvhTree::Leaf(leaf) => leaf.id = id,
            BvhTree::Node(node) => node.id = id,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, BvhTree::Leaf(_))
    }
}

/// Tree built over elements of type `T`.
#[derive(Clone, Debug)]
pub struct Bvh<T> {
    pub(crate) root: BvhTree<T>,
    pub(crate) order: TraversalOrder,
}

impl<T> Bvh<T> {
    pub fn root(&self) -> &BvhTree<T> {
        &self.root
    }

    /// Order in which the tree's ids were assigned (and in which it gets
    /// serialized).
    pub fn order(&self) -> TraversalOrder {
        self.order
    }

    pub fn bounds(&self) -> BoundingBox {
        self.root.bounds()
    }

    /// Number of nodes and leaves, i.e. the number of serialized rows.
    pub fn len(&self) -> usize {
        let mut len = 0;

        self.walk(|_| len += 1);

        len
    }

    /// Number of levels; a lone leaf has depth 1.
    pub fn depth(&self) -> usize {
        fn depth<T>(tree: &BvhTree<T>) -> usize {
            match tree {
                BvhTree::Leaf(_) => 1,
                BvhTree::Node(node) => {
                    1 + node.iter().map(depth).max().unwrap_or_default()
                }
            }
        }

        depth(&self.root)
    }
}

impl<T> Bvh<T>
where
    T: BvhElement,
{
    /// Checks the tree's structural invariants, panicking if any is broken:
    ///
    /// - leaves hold at most [`BVH_MAX_LEAVES_PER_NODE`] elements,
    /// - nodes have at least one child,
    /// - every child (and every element) fits its parent's bounding box,
    /// - ids follow the tree's traversal order, starting at zero.
    pub fn validate(&self, bias: f32) {
        fn validate<T>(tree: &BvhTree<T>, bias: f32)
        where
            T: BvhElement,
        {
            let bounds = tree.bounds();

            match tree {
                BvhTree::Leaf(leaf) => {
                    assert!(leaf.len() <= BVH_MAX_LEAVES_PER_NODE);

                    for element in leaf {
                        assert!(
                            bounds.contains_box(&element.bounds(), bias),
                            "element #{} escapes leaf #{}",
                            element.id(),
                            leaf.id
                        );
                    }
                }

                BvhTree::Node(node) => {
                    assert!(!node.children.is_empty());

                    for child in node {
                        assert!(
                            bounds.contains_box(&child.bounds(), bias),
                            "node #{} escapes node #{}",
                            child.id(),
                            node.id
                        );

                        validate(child, bias);
                    }
                }
            }
        }

        validate(&self.root, bias);

        let mut next_id = 0;

        self.walk(|tree| {
            assert_eq!(next_id, tree.id(), "ids don't follow {:?}", self.order);
            next_id += 1;
        });
    }
}
