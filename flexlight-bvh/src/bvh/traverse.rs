use std::collections::VecDeque;

use crate::{Bvh, BvhLeaf, BvhTree, TraversalOrder};

impl<T> BvhTree<T> {
    /// Visits the tree in pre-order: a node, then each of its subtrees.
    pub fn walk_depth_first<'a>(&'a self, f: &mut impl FnMut(&'a BvhTree<T>)) {
        f(self);

        if let BvhTree::Node(node) = self {
            for child in node {
                child.walk_depth_first(f);
            }
        }
    }

    /// Visits the tree level by level, each level left-to-right.
    pub fn walk_breadth_first<'a>(
        &'a self,
        f: &mut impl FnMut(&'a BvhTree<T>),
    ) {
        let mut queue = VecDeque::from([self]);

        while let Some(tree) = queue.pop_front() {
            f(tree);

            if let BvhTree::Node(node) = tree {
                queue.extend(node.iter());
            }
        }
    }

    /// Reassigns ids, starting from zero, in the given order.
    pub(crate) fn renumber(&mut self, order: TraversalOrder) {
        fn depth_first<T>(tree: &mut BvhTree<T>, next_id: &mut u32) {
            tree.set_id(*next_id);
            *next_id += 1;

            if let BvhTree::Node(node) = tree {
                for child in &mut node.children {
                    depth_first(child, next_id);
                }
            }
        }

        match order {
            TraversalOrder::DepthFirst => {
                depth_first(self, &mut 0);
            }

            TraversalOrder::BreadthFirst => {
                let mut queue = VecDeque::from([self]);
                let mut next_id = 0;

                while let Some(tree) = queue.pop_front() {
                    tree.set_id(next_id);
                    next_id += 1;

                    if let BvhTree::Node(node) = tree {
                        queue.extend(node.children.iter_mut());
                    }
                }
            }
        }
    }
}

impl<T> Bvh<T> {
    /// Visits every node and leaf in the tree's own order, i.e. in the order
    /// of ids and serialized rows.
    pub fn walk<'a>(&'a self, mut f: impl FnMut(&'a BvhTree<T>)) {
        match self.order {
            TraversalOrder::DepthFirst => self.root.walk_depth_first(&mut f),
            TraversalOrder::BreadthFirst => {
                self.root.walk_breadth_first(&mut f)
            }
        }
    }

    /// Returns all leaves, in the tree's order.
    pub fn leaves(&self) -> Vec<&BvhLeaf<T>> {
        let mut leaves = Vec::new();

        self.walk(|tree| {
            if let BvhTree::Leaf(leaf) = tree {
                leaves.push(leaf);
            }
        });

        leaves
    }

    /// Returns all elements stored in the tree, leaf by leaf.
    pub fn elements(&self) -> impl Iterator<Item = &T> + '_ {
        self.leaves().into_iter().flat_map(|leaf| leaf.iter())
    }
}
